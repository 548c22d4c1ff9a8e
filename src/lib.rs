pub mod cli;
pub mod collectors;
pub mod config;
pub mod display;
pub mod models;
pub mod monitor;
pub mod updater;

pub use config::{Config, ConfigStore};
pub use monitor::MonitorLoop;
