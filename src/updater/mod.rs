//! Startup self-update check
//!
//! A single unauthenticated read of a plaintext version file, compared
//! numerically against the running major.minor. Whatever happens here, the
//! monitor starts: a newer version or a failed fetch only produces log
//! output.

use std::time::Duration;

use log::{error, info, warn};
use thiserror::Error;

const UPDATE_URL: &str =
    "https://raw.githubusercontent.com/maxi07/fritz-watcher/main/doc/version";
const PROJECT_URL: &str = "https://github.com/maxi07/fritz-watcher";
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Non-fatal failure of the outbound version check
#[derive(Debug, Error)]
pub enum UpdateCheckError {
    #[error("version fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote version '{0}' is not a number")]
    Parse(String),
}

/// The running version as a comparable major.minor number.
pub fn running_version() -> f64 {
    let version = env!("CARGO_PKG_VERSION");
    let numeric: String = version
        .split('.')
        .take(2)
        .collect::<Vec<_>>()
        .join(".");
    numeric.parse().unwrap_or(0.0)
}

/// Fetches the published version number and warns when it is newer than the
/// running one. Never blocks startup: the caller proceeds regardless.
pub async fn check_update(internet_reachable: bool) {
    if !internet_reachable {
        warn!("No network, skipping update check.");
        return;
    }

    match fetch_latest().await {
        Ok(latest) if latest > running_version() => {
            warn!("There is an update available.");
            warn!("Head over to {PROJECT_URL} to get the hottest features.");
        }
        Ok(_) => {
            info!(
                "Application is running latest version {}.",
                env!("CARGO_PKG_VERSION")
            );
        }
        Err(e) => {
            error!("An error occured while searching for updates: {e}");
        }
    }
}

async fn fetch_latest() -> Result<f64, UpdateCheckError> {
    let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
    let text = client
        .get(UPDATE_URL)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    text.trim()
        .parse()
        .map_err(|_| UpdateCheckError::Parse(text.trim().to_string()))
}
