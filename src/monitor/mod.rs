//! The monitoring state loop
//!
//! Each iteration walks the same fixed stages: internet probe, router probe,
//! rate fetch, convert and render, sleep. Any failed stage renders its frame,
//! sleeps the same fixed interval and restarts the iteration — infinite
//! retry, no backoff, no counter. Partial samples are never rendered. SIGINT
//! is the only way out: it blanks the display, writes the two-line cancel
//! notice once and returns success.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use log::{debug, error, info, warn};

use crate::collectors::{Probe, RateSource, cpu, units};
use crate::config::Config;
use crate::display::DisplayRenderer;
use crate::models::{ConnectivityState, RuntimeSample};

/// Fixed pacing between iterations; the only delay mechanism in the loop
const LOOP_INTERVAL: Duration = Duration::from_secs(2);

/// Drives the collectors and the renderer on a fixed interval
pub struct MonitorLoop<R, P> {
    config: Config,
    rates: R,
    probe: P,
    renderer: DisplayRenderer,
    interval: Duration,
}

impl<R: RateSource, P: Probe> MonitorLoop<R, P> {
    pub fn new(config: Config, rates: R, probe: P, renderer: DisplayRenderer) -> Self {
        Self::with_interval(config, rates, probe, renderer, LOOP_INTERVAL)
    }

    /// Same loop with a caller-chosen interval; tests shrink it to keep
    /// retry scenarios fast.
    pub fn with_interval(
        config: Config,
        rates: R,
        probe: P,
        renderer: DisplayRenderer,
        interval: Duration,
    ) -> Self {
        Self {
            config,
            rates,
            probe,
            renderer,
            interval,
        }
    }

    /// Runs until SIGINT. Transient collaborator failures never end the
    /// loop; only a broken display connection propagates out.
    pub async fn run(&mut self) -> Result<()> {
        let interrupt = tokio::signal::ctrl_c();
        tokio::pin!(interrupt);

        loop {
            tokio::select! {
                _ = &mut interrupt => return self.shutdown(),
                result = self.tick() => result?,
            }
        }
    }

    /// One full iteration including its trailing sleep. Public so tests can
    /// drive the loop without signal delivery.
    pub async fn tick(&mut self) -> Result<()> {
        let state = ConnectivityState {
            internet_reachable: self.probe.is_internet_reachable().await,
            router_reachable: false,
        };

        if !state.internet_reachable {
            error!("The network cannot be reached. Please check your router.");
            self.renderer
                .render_no_network()
                .context("rendering no-network frame")?;
            self.sleep().await;
            return Ok(());
        }

        let state = ConnectivityState {
            router_reachable: self
                .probe
                .is_router_reachable(&self.config.router_address)
                .await,
            ..state
        };

        if !state.router_reachable {
            warn!(
                "FritzBox cannot be reached at {}.",
                self.config.router_address
            );
            self.renderer
                .render_no_router(&self.config.router_address)
                .context("rendering no-router frame")?;
            self.sleep().await;
            return Ok(());
        }

        debug!("connectivity ok: {state:?}, fetching transmission rate");
        let (raw_upload, raw_download) = match self.rates.fetch_transmission_rate().await {
            Ok(pair) => pair,
            Err(e) => {
                error!("Failed reading FritzBox information: {e}");
                self.sleep().await;
                return Ok(());
            }
        };

        let sample = self.build_sample(&raw_upload, &raw_download);
        info!(
            "Upload: {} MBit/s ({} %) | Download: {} MBit/s ({} %)",
            sample.upload_mbit, sample.upload_percent, sample.download_mbit, sample.download_percent
        );

        self.renderer
            .render_header(&sample, &self.config.router_address)
            .context("rendering console header")?;
        self.renderer
            .render_gauge(sample.upload_percent, sample.download_percent)
            .context("rendering gauge frame")?;

        self.sleep().await;
        Ok(())
    }

    fn build_sample(&self, raw_upload: &str, raw_download: &str) -> RuntimeSample {
        let upload_mbit = units::to_mbit(raw_upload);
        let download_mbit = units::to_mbit(raw_download);

        RuntimeSample {
            timestamp: Local::now(),
            cpu_temp_celsius: cpu::cpu_temperature(),
            upload_mbit,
            download_mbit,
            upload_percent: units::to_percent(upload_mbit, self.config.max_upload_mbit),
            download_percent: units::to_percent(download_mbit, self.config.max_download_mbit),
        }
    }

    fn shutdown(&mut self) -> Result<()> {
        warn!("SIGINT or CTRL-C detected. Please wait until the service has stopped.");
        self.renderer
            .render_cancel()
            .context("rendering cancel frame")?;
        Ok(())
    }

    async fn sleep(&self) {
        tokio::time::sleep(self.interval).await;
    }
}
