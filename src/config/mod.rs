//! Persisted configuration for the monitor
//!
//! One installation owns one config file. It is created interactively on the
//! first run, stored as TOML with a `[FritzBox]` record of string-typed
//! values (the password as a vault token co-located with its key), and
//! re-loaded unchanged on every later start. There is no update path besides
//! deleting the file.

pub mod vault;

use std::fmt;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use vault::CredentialError;

/// Fatal problem with the persisted configuration
///
/// Every variant ends the process with the configuration exit code after
/// reporting which part failed; the monitor never runs on a partial config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at {0}")]
    NotFound(PathBuf),

    #[error("failed reading config file: {0}")]
    Io(#[from] io::Error),

    #[error("failed parsing config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed writing config file: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("config field '{field}' is invalid: {reason}")]
    Field {
        field: &'static str,
        reason: String,
    },

    #[error("failed decrypting stored password: {0}")]
    Credential(#[from] CredentialError),
}

/// Runtime configuration, immutable for the process lifetime
///
/// The password is held decrypted in memory only; `Debug` redacts it so it
/// can never leak through logging.
#[derive(Clone)]
pub struct Config {
    /// Host or IP of the router, non-empty
    pub router_address: String,
    /// Router login user
    pub user: String,
    /// Router login password, decrypted
    pub password: String,
    /// Normalization ceiling for the upload gauge, Mbit/s, positive
    pub max_upload_mbit: f64,
    /// Normalization ceiling for the download gauge, Mbit/s, positive
    pub max_download_mbit: f64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("router_address", &self.router_address)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("max_upload_mbit", &self.max_upload_mbit)
            .field("max_download_mbit", &self.max_download_mbit)
            .finish()
    }
}

/// On-disk record, field names fixed by the installation format
#[derive(Debug, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(rename = "FritzBox")]
    fritz_box: FritzBoxRecord,
}

#[derive(Debug, Serialize, Deserialize)]
struct FritzBoxRecord {
    #[serde(rename = "fritzUser")]
    fritz_user: String,
    /// Vault token, base64 text
    #[serde(rename = "fritzPass")]
    fritz_pass: String,
    /// Vault key, base64 text, stored next to the token it opens
    key: String,
    #[serde(rename = "maxUpload")]
    max_upload: String,
    #[serde(rename = "maxDownload")]
    max_download: String,
    ip: String,
}

/// Loads, creates and persists the configuration record
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new("config.toml")
    }
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Reads and decrypts the persisted record.
    ///
    /// A missing file is reported as [`ConfigError::NotFound`] so the caller
    /// can fall back to interactive creation; everything else is fatal.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let file: ConfigFile = toml::from_str(&text)?;
        let record = file.fritz_box;

        if record.ip.trim().is_empty() {
            return Err(ConfigError::Field {
                field: "ip",
                reason: "router address must not be empty".into(),
            });
        }
        if record.fritz_user.trim().is_empty() {
            return Err(ConfigError::Field {
                field: "fritzUser",
                reason: "user must not be empty".into(),
            });
        }

        let key = vault::decode_key(&record.key)?;
        let password = vault::decrypt(&record.fritz_pass, &key)?;
        let max_upload_mbit = parse_ceiling("maxUpload", &record.max_upload)?;
        let max_download_mbit = parse_ceiling("maxDownload", &record.max_download)?;

        info!("Config successfully loaded from {}", self.path.display());
        Ok(Config {
            router_address: record.ip,
            user: record.fritz_user,
            password,
            max_upload_mbit,
            max_download_mbit,
        })
    }

    /// Encrypts the password under a fresh vault key and writes the record.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let key = vault::generate_key();
        let token = vault::encrypt(&config.password, &key)?;

        let file = ConfigFile {
            fritz_box: FritzBoxRecord {
                fritz_user: config.user.clone(),
                fritz_pass: token,
                key: vault::encode_key(&key),
                max_upload: format_ceiling(config.max_upload_mbit),
                max_download: format_ceiling(config.max_download_mbit),
                ip: config.router_address.clone(),
            },
        };

        std::fs::write(&self.path, toml::to_string_pretty(&file)?)?;
        info!("Stored a new config file at {}", self.path.display());
        Ok(())
    }

    /// Collects a full configuration from the operator and persists it.
    ///
    /// `discovered` carries the router address found by hostname discovery,
    /// if any; otherwise the address is prompted like every other field.
    /// Each prompt repeats until the answer is usable.
    pub fn create_interactive(
        &self,
        discovered: Option<String>,
    ) -> Result<Config, ConfigError> {
        warn!("Config does not exist, creating new file.");

        let router_address = match discovered {
            Some(ip) => {
                println!("Detected FritzBox at {ip}");
                ip
            }
            None => prompt_non_empty("Please enter your FritzBox address (e.g. 192.168.178.1): ")?,
        };

        let user = prompt_non_empty("Please enter your FritzBox username: ")?;
        let password = prompt_non_empty("Please enter your FritzBox password: ")?;
        let max_upload_mbit =
            prompt_positive_number("Please enter your maximum upload in MBit/s (eg. 100): ")?;
        let max_download_mbit =
            prompt_positive_number("Please enter your maximum download in MBit/s (eg. 50): ")?;

        let config = Config {
            router_address,
            user,
            password,
            max_upload_mbit,
            max_download_mbit,
        };
        self.save(&config)?;
        Ok(config)
    }
}

fn parse_ceiling(field: &'static str, raw: &str) -> Result<f64, ConfigError> {
    let value: f64 = raw.trim().parse().map_err(|_| ConfigError::Field {
        field,
        reason: format!("'{raw}' is not a number"),
    })?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Field {
            field,
            reason: format!("ceiling must be positive, got {value}"),
        })
    }
}

fn format_ceiling(value: f64) -> String {
    // Whole ceilings are stored without a trailing ".0", matching the
    // hand-entered values the record format grew up with.
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn prompt(label: &str) -> Result<String, ConfigError> {
    print!("{label}");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

fn prompt_non_empty(label: &str) -> Result<String, ConfigError> {
    loop {
        let answer = prompt(label)?;
        if !answer.is_empty() {
            return Ok(answer);
        }
    }
}

fn prompt_positive_number(label: &str) -> Result<f64, ConfigError> {
    loop {
        match prompt(label)?.parse::<f64>() {
            Ok(value) if value > 0.0 => return Ok(value),
            _ => println!("Please enter a positive number."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        Config {
            router_address: "192.168.178.1".into(),
            user: "monitor".into(),
            password: "s3cret!".into(),
            max_upload_mbit: 40.0,
            max_download_mbit: 100.0,
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::new(dir.path().join("config.toml"));
        assert!(matches!(store.load(), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::new(dir.path().join("config.toml"));
        store.save(&sample_config()).expect("save failed");

        let loaded = store.load().expect("load failed");
        assert_eq!(loaded.router_address, "192.168.178.1");
        assert_eq!(loaded.user, "monitor");
        assert_eq!(loaded.password, "s3cret!");
        assert_eq!(loaded.max_upload_mbit, 40.0);
        assert_eq!(loaded.max_download_mbit, 100.0);
    }

    #[test]
    fn stored_password_is_not_plaintext() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::new(dir.path().join("config.toml"));
        store.save(&sample_config()).expect("save failed");

        let text = std::fs::read_to_string(store.path()).expect("read failed");
        assert!(!text.contains("s3cret!"));
        assert!(text.contains("[FritzBox]"));
        assert!(text.contains("fritzPass"));
    }

    #[test]
    fn tampered_password_field_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::new(dir.path().join("config.toml"));
        store.save(&sample_config()).expect("save failed");

        let text = std::fs::read_to_string(store.path()).expect("read failed");
        let mut file: ConfigFile = toml::from_str(&text).expect("parse failed");
        file.fritz_box.fritz_pass = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".into();
        std::fs::write(store.path(), toml::to_string_pretty(&file).unwrap()).unwrap();

        assert!(matches!(store.load(), Err(ConfigError::Credential(_))));
    }

    #[test]
    fn non_numeric_ceiling_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::new(dir.path().join("config.toml"));
        store.save(&sample_config()).expect("save failed");

        let text = std::fs::read_to_string(store.path()).expect("read failed");
        let mut file: ConfigFile = toml::from_str(&text).expect("parse failed");
        file.fritz_box.max_upload = "fast".into();
        std::fs::write(store.path(), toml::to_string_pretty(&file).unwrap()).unwrap();

        match store.load() {
            Err(ConfigError::Field { field, .. }) => assert_eq!(field, "maxUpload"),
            other => panic!("expected field error, got {other:?}"),
        }
    }

    #[test]
    fn debug_never_shows_the_password() {
        let rendered = format!("{:?}", sample_config());
        assert!(!rendered.contains("s3cret!"));
        assert!(rendered.contains("<redacted>"));
    }
}
