//! Signal-driven shutdown of the monitor loop.
//!
//! Lives in its own test binary because signal delivery is process-global:
//! the test raises a real SIGINT against itself and relies on the loop's
//! handler being the only one installed.

#![cfg(target_os = "linux")]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fritz_watcher::collectors::{Probe, RateFetchError, RateSource};
use fritz_watcher::config::Config;
use fritz_watcher::display::{DisplayError, DisplayRenderer, Screen};
use fritz_watcher::monitor::MonitorLoop;
use nix::sys::signal::{Signal, raise};

/// Screen stub that records every call for later assertions
#[derive(Clone, Default)]
struct RecordingScreen {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingScreen {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl Screen for RecordingScreen {
    fn write_line(&mut self, line: u8, text: &str) -> Result<(), DisplayError> {
        self.events
            .lock()
            .unwrap()
            .push(format!("line{line}:{}", text.trim_end()));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.events.lock().unwrap().push("clear".to_string());
        Ok(())
    }

    fn backlight(&mut self, _on: bool) -> Result<(), DisplayError> {
        Ok(())
    }

    fn load_glyphs(&mut self, _glyphs: &[[u8; 8]; 6]) -> Result<(), DisplayError> {
        Ok(())
    }
}

struct AlwaysUpProbe;

#[async_trait]
impl Probe for AlwaysUpProbe {
    async fn is_internet_reachable(&self) -> bool {
        true
    }

    async fn is_router_reachable(&self, _address: &str) -> bool {
        true
    }
}

/// Rate source that always succeeds and counts how often it was asked
struct CountingRateSource {
    attempts: Arc<AtomicU32>,
}

#[async_trait]
impl RateSource for CountingRateSource {
    async fn fetch_transmission_rate(&self) -> Result<(String, String), RateFetchError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Ok(("55.3 KB".to_string(), "1.2 MB".to_string()))
    }
}

#[tokio::test]
async fn sigint_mid_sleep_writes_one_cancel_frame_and_stops() {
    let attempts = Arc::new(AtomicU32::new(0));
    let screen = RecordingScreen::default();
    let renderer = DisplayRenderer::new(Box::new(screen.clone()));
    let mut monitor = MonitorLoop::with_interval(
        Config {
            router_address: "192.168.178.1".into(),
            user: "monitor".into(),
            password: "s3cret!".into(),
            max_upload_mbit: 40.0,
            max_download_mbit: 100.0,
        },
        CountingRateSource {
            attempts: attempts.clone(),
        },
        AlwaysUpProbe,
        renderer,
        Duration::from_secs(1),
    );

    let handle = tokio::spawn(async move { monitor.run().await });

    // The first iteration finishes its probes and fetch immediately and
    // spends the rest of the interval asleep; the interrupt lands there.
    tokio::time::sleep(Duration::from_millis(300)).await;
    raise(Signal::SIGINT).expect("raising SIGINT failed");

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("loop did not stop after the interrupt")
        .expect("loop task panicked");
    result.expect("interrupted loop must return success");

    let attempts_at_exit = attempts.load(Ordering::SeqCst);
    assert_eq!(attempts_at_exit, 1, "interrupt must preempt the sleep");

    let events = screen.events();
    let cancel_frames = events.iter().filter(|e| e.contains("Manual cancel.")).count();
    assert_eq!(cancel_frames, 1, "exactly one cancel frame expected");
    assert_eq!(
        &events[events.len() - 3..],
        &[
            "clear".to_string(),
            "line1:Manual cancel.".to_string(),
            "line2:Exiting app.".to_string(),
        ],
        "cancel notice must be the final display output"
    );

    // No iteration may run after the loop has returned.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(attempts.load(Ordering::SeqCst), attempts_at_exit);
}
