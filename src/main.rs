use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use port_probe::export::{default_csv_path, write_results_csv, write_results_json};
use port_probe::ports::{self, PortPreset, PortSelection};
use port_probe::table::render_page;
use port_probe::view::{self, ViewState};
use port_probe::{pager, ScanConfig, Scanner};

/// port-probe — check which TCP and UDP ports of a host answer.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "port-probe",
    version,
    about = "Check which TCP and UDP ports of a host answer.",
    long_about = None
)]
struct Cli {
    /// Hostname or IPv4/IPv6 address to probe.
    target: String,

    /// Named port block to scan (default: well-known).
    #[arg(long, value_enum, conflicts_with_all = ["range", "ports", "ports_file"])]
    preset: Option<PortPreset>,

    /// Inclusive port range, e.g. 1000-2000.
    #[arg(long, conflicts_with_all = ["ports", "ports_file"])]
    range: Option<String>,

    /// Comma-separated ports and ranges, e.g. 22,80,8000-8010. Duplicates are kept.
    #[arg(long, conflicts_with = "ports_file", allow_hyphen_values = true)]
    ports: Option<String>,

    /// Path to a ports list file (one port or range per line).
    #[arg(long = "ports-file")]
    ports_file: Option<PathBuf>,

    /// Per-probe timeout in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = 1000)]
    timeout_ms: u64,

    /// Max ports probed at once (0 = no limit).
    #[arg(long, default_value_t = 1000)]
    concurrency: usize,

    /// Payload sent by the UDP probe.
    #[arg(long, default_value = "test")]
    payload: String,

    /// Show closed ports as well.
    #[arg(long = "show-all", default_value_t = false)]
    show_all: bool,

    /// Rows per column in the result table.
    #[arg(long = "page-size", default_value_t = 20)]
    page_size: usize,

    /// Browse results with line commands read from stdin.
    #[arg(long, default_value_t = false)]
    interactive: bool,

    /// Write CSV results; without a path, PortsTo<target>.csv in the current directory.
    #[arg(long, num_args = 0..=1)]
    csv: Option<Option<PathBuf>>,

    /// Write results as pretty JSON to this path.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn selection(&self) -> Result<PortSelection> {
        if let Some(range) = &self.range {
            return Ok(ports::parse_range(range)?);
        }
        if let Some(list) = &self.ports {
            return Ok(PortSelection::List(ports::parse_port_list(list)?));
        }
        if let Some(path) = &self.ports_file {
            return Ok(PortSelection::List(ports::load_ports_from_path(path)?));
        }
        Ok(self.preset.unwrap_or(PortPreset::WellKnown).selection())
    }

    fn config(&self) -> ScanConfig {
        ScanConfig::default()
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_concurrency(self.concurrency)
            .with_payload(self.payload.as_bytes())
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Cancel `token` once `signal` fires. A handler that cannot be installed leaves the
/// scan running.
async fn cancel_on_signal<F>(signal: F, token: CancellationToken)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => token.cancel(),
        Err(e) => warn!(error = %e, "cannot listen for Ctrl-C; scan is not interruptible"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let selection = cli.selection()?;
    let scanner = Scanner::new(cli.config());
    info!(host = %cli.target, ports = selection.len(), "configuration loaded");

    println!("Scanning {} port(s) on {}...", selection.len(), cli.target);

    // Ctrl-C aborts the whole scan; there is no partial result.
    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(tokio::signal::ctrl_c(), cancel.clone()));

    let report = tokio::select! {
        res = scanner.scan(&cli.target, &selection) => {
            res.with_context(|| format!("scan of {} failed", cli.target))?
        }
        _ = cancel.cancelled() => bail!("scan aborted"),
    };

    println!(
        "Scan complete: {} open of {} probed on {} ({})",
        report.open_count(),
        report.len(),
        report.target,
        report
            .addresses
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let csv_path = match &cli.csv {
        Some(Some(path)) => Some(path.clone()),
        Some(None) => Some(default_csv_path(&report.target)?),
        None => None,
    };
    if let Some(path) = &csv_path {
        write_results_csv(path, &report.results)?;
        println!("Results exported to {}", path.display());
    }
    if let Some(path) = cli.output.as_deref() {
        write_results_json(path, &report)?;
        println!("Wrote JSON results to {}", path.display());
    }

    let state = ViewState {
        show_all: cli.show_all,
        ..ViewState::new(cli.page_size)
    };
    if cli.interactive {
        let save_to = match csv_path {
            Some(p) => p,
            None => default_csv_path(&report.target)?,
        };
        pager::run(&report, state, &save_to, io::stdin().lock(), io::stdout().lock())?;
    } else {
        // Non-interactive: print every row in a single page.
        let state = ViewState {
            page_size: view::filtered(&report.results, state.show_all)
                .len()
                .div_ceil(3)
                .max(1),
            ..state
        };
        print!("{}", render_page(&report.target, &report.results, state));
    }

    Ok(())
}
