//! Transmission-rate retrieval from the router's UPnP status interface
//!
//! The FritzBox exposes its WAN byte rates through the IGD control endpoint
//! on port 49000 (`GetAddonInfos` on `WANCommonIFC1`). The fetcher issues one
//! SOAP call per loop iteration and hands back the rate pair in the
//! interface's native human-readable form; the unit converter owns turning
//! those strings into Mbit/s.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use thiserror::Error;

const CONTROL_PATH: &str = "/igdupnp/control/WANCommonIFC1";
const SERVICE_TYPE: &str = "urn:schemas-upnp-org:service:WANCommonInterfaceConfig:1";
const ACTION: &str = "GetAddonInfos";

/// Kept well under the loop's 2 s sleep so a hung router can never stall
/// an iteration indefinitely
const FETCH_TIMEOUT: Duration = Duration::from_millis(1500);

/// Transient failure talking to the router's status interface
///
/// The monitor loop reports these and retries on the next iteration; none of
/// them is fatal and none of them touches the stored credentials.
#[derive(Debug, Error)]
pub enum RateFetchError {
    #[error("router status request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("router rejected the configured credentials (HTTP {0})")]
    Auth(u16),

    #[error("unexpected router response: {0}")]
    Protocol(String),
}

/// Source of the current (upload, download) rate pair
///
/// The strings are in the collaborator's native format, e.g. `"756 B"`,
/// `"55.3 KB"` or `"1.2 MB"`.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_transmission_rate(&self) -> Result<(String, String), RateFetchError>;
}

/// SOAP client for the FritzBox IGD status endpoint
pub struct FritzRateFetcher {
    client: reqwest::Client,
    control_url: String,
    user: String,
    password: String,
}

impl FritzRateFetcher {
    pub fn new(
        router_address: &str,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, RateFetchError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            control_url: format!("http://{router_address}:49000{CONTROL_PATH}"),
            user: user.into(),
            password: password.into(),
        })
    }

    fn soap_body() -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"
            s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
  <s:Body>
    <u:{ACTION} xmlns:u="{SERVICE_TYPE}" />
  </s:Body>
</s:Envelope>"#
        )
    }
}

#[async_trait]
impl RateSource for FritzRateFetcher {
    async fn fetch_transmission_rate(&self) -> Result<(String, String), RateFetchError> {
        let response = self
            .client
            .post(&self.control_url)
            .header("Content-Type", r#"text/xml; charset="utf-8""#)
            .header("SoapAction", format!("{SERVICE_TYPE}#{ACTION}"))
            .basic_auth(&self.user, Some(&self.password))
            .body(Self::soap_body())
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(RateFetchError::Auth(status.as_u16()));
        }
        if !status.is_success() {
            return Err(RateFetchError::Protocol(format!(
                "HTTP {status} from {}",
                self.control_url
            )));
        }

        let body = response.text().await?;
        let upload_bps = extract_rate(&body, "NewByteSendRate")?;
        let download_bps = extract_rate(&body, "NewByteReceiveRate")?;
        debug!("router reports {upload_bps} B/s up, {download_bps} B/s down");

        Ok((format_rate(upload_bps), format_rate(download_bps)))
    }
}

fn extract_rate(body: &str, tag: &str) -> Result<u64, RateFetchError> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = body
        .find(&open)
        .ok_or_else(|| RateFetchError::Protocol(format!("missing element {tag}")))?
        + open.len();
    let end = body[start..]
        .find(&close)
        .ok_or_else(|| RateFetchError::Protocol(format!("unterminated element {tag}")))?;

    body[start..start + end]
        .trim()
        .parse()
        .map_err(|_| RateFetchError::Protocol(format!("non-numeric value in {tag}")))
}

/// Renders a byte rate the way the status interface presents it to humans.
///
/// The byte form keeps its space before the unit while the larger units drop
/// it; the unit converter relies on exactly these shapes.
pub fn format_rate(bytes_per_second: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;

    let rate = bytes_per_second as f64;
    if rate < KB {
        format!("{bytes_per_second} B")
    } else if rate < MB {
        format!("{:.1} KB", rate / KB)
    } else {
        format!("{:.1} MB", rate / MB)
    }
}
