use std::path::PathBuf;

use clap::Parser;

/// Command-line surface of the monitor
///
/// Running without flags starts the monitor loop. `--version` is handled
/// manually so it prints the bare version number and exits before any other
/// initialization, matching the installed tooling that parses it.
#[derive(Parser, Debug)]
#[command(author = "Maximilian Krause")]
#[command(disable_version_flag = true)]
#[command(about = "FritzBox throughput monitor for a 16x2 I2C character display")]
#[command(
    long_about = "Polls a FritzBox router for its current upload and download rate every two \
seconds, normalizes both against configured bandwidth ceilings and renders them as gauge bars \
on an attached 16x2 character LCD. On the first run a configuration is collected interactively \
and stored with an encrypted router password."
)]
pub struct Cli {
    /// Prints the version and exits
    #[arg(short = 'v', long = "version", help = "Prints the version")]
    pub version: bool,

    /// Keeps the display backlight off for the whole process lifetime
    #[arg(
        short = 'b',
        long = "backlightoff",
        help = "Turns off the backlight of the lcd"
    )]
    pub backlight_off: bool,

    /// Location of the persisted configuration record
    #[arg(long, default_value = "config.toml", help = "Path to the config file")]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_invocation() {
        let cli = Cli::parse_from(["fw"]);
        assert!(!cli.version);
        assert!(!cli.backlight_off);
        assert_eq!(cli.config, PathBuf::from("config.toml"));
    }

    #[test]
    fn parses_version_flags() {
        assert!(Cli::parse_from(["fw", "--version"]).version);
        assert!(Cli::parse_from(["fw", "-v"]).version);
    }

    #[test]
    fn parses_backlight_flags() {
        assert!(Cli::parse_from(["fw", "--backlightoff"]).backlight_off);
        assert!(Cli::parse_from(["fw", "-b"]).backlight_off);
    }
}
