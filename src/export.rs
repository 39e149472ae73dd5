use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::types::{PortResult, ScanReport};

#[derive(Serialize)]
struct CsvRow {
    #[serde(rename = "Port")]
    port: u16,
    #[serde(rename = "TCP")]
    tcp: &'static str,
    #[serde(rename = "UDP")]
    udp: &'static str,
}

impl From<&PortResult> for CsvRow {
    fn from(r: &PortResult) -> Self {
        Self {
            port: r.port(),
            tcp: state_label(r.tcp_open()),
            udp: state_label(r.udp_open()),
        }
    }
}

pub fn state_label(open: bool) -> &'static str {
    if open {
        "Open"
    } else {
        "Closed"
    }
}

/// `PortsTo127-0-0-1.csv` for target `127.0.0.1`. Separators that are not valid in
/// file names on every platform (`.`, `:`, brackets) become `-` or are dropped.
pub fn default_csv_name(target: &str) -> String {
    let name: String = target
        .chars()
        .filter(|c| !matches!(c, '[' | ']'))
        .map(|c| if matches!(c, '.' | ':') { '-' } else { c })
        .collect();
    format!("PortsTo{name}.csv")
}

pub fn default_csv_path(target: &str) -> Result<PathBuf> {
    let dir = std::env::current_dir().context("cannot determine current directory")?;
    Ok(dir.join(default_csv_name(target)))
}

/// Write every result as `Port,TCP,UDP` rows, in collection order.
pub fn write_csv<W: Write>(writer: W, results: &[PortResult]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for r in results {
        wtr.serialize(CsvRow::from(r))?;
    }
    if results.is_empty() {
        wtr.write_record(["Port", "TCP", "UDP"])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_results_csv(path: &Path, results: &[PortResult]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create CSV file: {}", path.display()))?;
    write_csv(file, results)
}

pub fn write_results_json(path: &Path, report: &ScanReport) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create JSON file: {}", path.display()))?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}
