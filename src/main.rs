use std::io::{self, BufRead, Write as _};
use std::process;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use log::{error, info, warn};

use fritz_watcher::cli::Cli;
use fritz_watcher::collectors::{FritzRateFetcher, NetProbe, Probe, probe};
use fritz_watcher::config::{ConfigError, ConfigStore};
use fritz_watcher::display::{DisplayRenderer, NullScreen, Screen};
use fritz_watcher::monitor::MonitorLoop;
use fritz_watcher::updater;

/// Operator declined to continue without a confirmed display connection
#[cfg(target_os = "linux")]
const EXIT_DISPLAY_DECLINED: i32 = 1;
/// Missing privileges for the I2C bus
const EXIT_PRIVILEGES: i32 = 2;
/// Malformed or undecryptable persisted configuration
const EXIT_CONFIG: i32 = 3;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    println!("Welcome to the FritzBox network monitor!");
    ensure_privileges();

    let mut renderer = DisplayRenderer::new(open_screen());
    renderer.setup(!cli.backlight_off)?;
    if cli.backlight_off {
        warn!("Option: Backlight turned off!");
    }
    renderer.render_boot(env!("CARGO_PKG_VERSION"))?;
    tokio::time::sleep(Duration::from_millis(1500)).await;

    let probe = NetProbe;
    let online = probe.is_internet_reachable().await;
    updater::check_update(online).await;

    let store = ConfigStore::new(cli.config);
    renderer.render_config_progress("Reading config")?;
    let config = match store.load() {
        Ok(config) => {
            renderer.render_config_progress("Config loaded")?;
            config
        }
        Err(ConfigError::NotFound(_)) => {
            renderer.render_config_progress("Creating config")?;
            println!("Detecting your FritzBox...");
            let discovered = probe::discover_router().await;
            if discovered.is_none() {
                warn!("No FritzBox could be detected.");
            }
            match store.create_interactive(discovered) {
                Ok(config) => {
                    renderer.render_config_progress("Stored config")?;
                    config
                }
                Err(e) => fatal_config_error(&mut renderer, e),
            }
        }
        Err(e) => fatal_config_error(&mut renderer, e),
    };

    let fetcher =
        match FritzRateFetcher::new(&config.router_address, &config.user, &config.password) {
            Ok(fetcher) => fetcher,
            Err(e) => {
                error!("Failed preparing the FritzBox client: {e}");
                fatal_shutdown(&mut renderer, EXIT_CONFIG);
            }
        };
    renderer.render_ip_banner(&config.router_address)?;

    info!("Starting monitor loop for {}", config.router_address);
    MonitorLoop::new(config, fetcher, probe, renderer).run().await
}

/// Reports a fatal configuration problem and ends the process with the
/// configuration exit code.
fn fatal_config_error(renderer: &mut DisplayRenderer, err: ConfigError) -> ! {
    error!("Failed reading config.");
    error!("{err}");
    fatal_shutdown(renderer, EXIT_CONFIG);
}

/// Every fatal path after display init funnels through here so the
/// peripheral is left blanked, whatever frame was standing.
fn fatal_shutdown(renderer: &mut DisplayRenderer, code: i32) -> ! {
    let _ = renderer.blank();
    process::exit(code);
}

/// The I2C bus on the target host is root-only; refuse early instead of
/// failing halfway through display init.
fn ensure_privileges() {
    #[cfg(target_os = "linux")]
    if !nix::unistd::geteuid().is_root() {
        error!("Please run this tool with sudo.");
        process::exit(EXIT_PRIVILEGES);
    }
}

/// Opens the physical display, falling back to an interactive choice when it
/// cannot be reached: continue blind on a [`NullScreen`] or shut down.
fn open_screen() -> Box<dyn Screen> {
    println!("Loading lcd drivers...");

    #[cfg(target_os = "linux")]
    {
        use fritz_watcher::display::lcd::{self, LcdScreen};
        match LcdScreen::open(lcd::DEFAULT_BUS, lcd::DEFAULT_ADDR) {
            Ok(screen) => return Box::new(screen),
            Err(e) => {
                error!("The connection to the display failed: {e}");
                error!("Please check your connection for all pins.");
                error!("From bash you can run i2cdetect -y 1");
                if !confirm("Would you like to proceed anyway (More errors might occur)? [y/n] ") {
                    println!("Shutting down... Bye!");
                    process::exit(EXIT_DISPLAY_DECLINED);
                }
                println!("Will continue...");
            }
        }
    }

    #[cfg(not(target_os = "linux"))]
    warn!("No I2C display support on this platform, continuing without display.");

    Box::new(NullScreen)
}

/// Asks a yes/no question on the console, repeating until the answer is one.
#[cfg(target_os = "linux")]
fn confirm(question: &str) -> bool {
    let stdin = io::stdin();
    loop {
        print!("{question}");
        let _ = io::stdout().flush();
        let mut answer = String::new();
        if stdin.lock().read_line(&mut answer).is_err() {
            return false;
        }
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return true,
            "n" | "no" => return false,
            _ => println!("Please choose yes or no"),
        }
    }
}
