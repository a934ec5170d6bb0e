//! RBN Filter CLI - Stream spots from the Reverse Beacon Network and print
//! the ones matching the given filters.

use anyhow::{Result, bail};
use clap::Parser;
use rbn_filter::{
    client::{RbnClient, RbnClientConfig},
    config::Config,
    feed::{FeedStats, process_line},
    filter::FilterConfig,
    record::Record,
};
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// RBN Filter - Stream and filter spots from the Reverse Beacon Network
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Your callsign, sent at login
    #[arg(short, long, env = "RBN_CALLSIGN")]
    call: Option<String>,

    /// Telnet host
    #[arg(short = 'H', long, env = "RBN_HOST")]
    host: Option<String>,

    /// Telnet port
    #[arg(short, long, env = "RBN_PORT")]
    port: Option<u16>,

    /// Connection timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Config file (default: ~/.config/rbn-filter/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Filter transmitting station (regex, matched at the start)
    #[arg(long)]
    de: Option<String>,

    /// Filter skimming station (regex, matched at the start)
    #[arg(long)]
    dx: Option<String>,

    /// Filter band (comma-separated, e.g. 20,40 or ~160 to exclude)
    #[arg(long, allow_hyphen_values = true)]
    band: Option<String>,

    /// Filter mode (comma-separated, ~ to exclude)
    #[arg(long)]
    mode: Option<String>,

    /// Filter record type (comma-separated, ~ to exclude)
    #[arg(long = "type")]
    record_type: Option<String>,

    /// Filter frequency in kHz (ranges: <=X >=X /=X =X <X >X X-Y, comma-separated)
    #[arg(long, allow_hyphen_values = true)]
    frequency: Option<String>,

    /// Filter speed (ranges)
    #[arg(long, allow_hyphen_values = true)]
    speed: Option<String>,

    /// Filter signal strength in dB (ranges)
    #[arg(long, allow_hyphen_values = true)]
    snr: Option<String>,

    /// Print matches as JSON lines
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn filter_config(&self) -> FilterConfig {
        FilterConfig {
            de: self.de.clone(),
            dx: self.dx.clone(),
            band: self.band.clone(),
            mode: self.mode.clone(),
            record_type: self.record_type.clone(),
            frequency: self.frequency.clone(),
            speed: self.speed.clone(),
            signal_strength: self.snr.clone(),
        }
    }
}

/// Format one matching record for stdout.
fn render(record: &Record, json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string(record)?)
    } else {
        Ok(record.to_string())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the matched records.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(args.config.as_deref())?;
    config.filters = std::mem::take(&mut config.filters).merge(args.filter_config());
    let json = args.json || config.json;

    // Filters compile before any network activity.
    let filters = config.filter_set()?;

    let Some(callsign) = args.call.clone().or(config.callsign.clone()) else {
        bail!("A callsign is required (--call, RBN_CALLSIGN or the config file)");
    };

    let client_config = RbnClientConfig {
        host: args.host.clone().unwrap_or(config.host),
        port: args.port.unwrap_or(config.port),
        callsign,
        connect_timeout: Duration::from_secs(args.timeout.unwrap_or(config.connect_timeout)),
    };

    info!("RBN Filter starting...");
    info!("Callsign: {}", client_config.callsign);
    info!("Server: {}:{}", client_config.host, client_config.port);
    if filters.is_unconstrained() {
        warn!("No filters given, every spot will be printed");
    }

    let client = RbnClient::new(client_config);
    let mut feed = client.connect().await?;
    let mut stats = FeedStats::default();

    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }

            line = feed.next_line() => {
                match line? {
                    Some(line) => {
                        if let Some(record) = process_line(&line, &filters, &mut stats) {
                            println!("{}", render(&record, json)?);
                        }
                    }
                    None => {
                        info!("Connection closed by server");
                        break;
                    }
                }
            }
        }
    }

    info!("Session summary: {}", stats);

    Ok(())
}
