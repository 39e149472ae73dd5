use anyhow::{Context, Result};
use clap::ValueEnum;
use std::fs;
use std::path::Path;

use crate::error::{ScanError, ScanResult};

/// What to scan: an inclusive range or an explicit, ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSelection {
    Range { start: u16, end: u16 },
    List(Vec<u16>),
}

impl PortSelection {
    /// Number of results a scan of this selection produces.
    pub fn len(&self) -> usize {
        match self {
            PortSelection::Range { start, end } => {
                (*end as usize + 1).saturating_sub(*start as usize)
            }
            PortSelection::List(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Well-known IANA port blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PortPreset {
    /// 0-1023
    WellKnown,
    /// 1024-49151
    Registered,
    /// 49152-65535
    Dynamic,
    /// 0-65535
    All,
}

impl PortPreset {
    pub fn bounds(self) -> (u16, u16) {
        match self {
            PortPreset::WellKnown => (0, 1023),
            PortPreset::Registered => (1024, 49151),
            PortPreset::Dynamic => (49152, 65535),
            PortPreset::All => (0, 65535),
        }
    }

    pub fn selection(self) -> PortSelection {
        let (start, end) = self.bounds();
        PortSelection::Range { start, end }
    }
}

/// Check a raw `(start, end)` pair and narrow it to ports.
pub fn validate_range(start: i64, end: i64) -> ScanResult<(u16, u16)> {
    let s = validate_port(start)?;
    let e = validate_port(end)?;
    if s > e {
        return Err(ScanError::InvalidRange { start, end });
    }
    Ok((s, e))
}

/// Check raw integers and narrow them to ports, keeping order and duplicates.
pub fn validate_ports(values: &[i64]) -> ScanResult<Vec<u16>> {
    values.iter().map(|&v| validate_port(v)).collect()
}

pub fn validate_port(value: i64) -> ScanResult<u16> {
    u16::try_from(value).map_err(|_| ScanError::PortOutOfRange { value })
}

/// Parse `start-end` into a range selection.
pub fn parse_range(s: &str) -> ScanResult<PortSelection> {
    let (a, b) = split_range(s.trim()).ok_or_else(|| ScanError::InvalidPort {
        input: s.to_string(),
    })?;
    let (start, end) = validate_range(parse_raw(a)?, parse_raw(b)?)?;
    Ok(PortSelection::Range { start, end })
}

/// Parse a port list into an ordered list of ports (0..=65535).
///
/// Items are separated by commas or newlines and may be:
/// - a single port number: `80`
/// - an inclusive range: `8000-8010`
///
/// Everything after `#` on a line is ignored. Duplicates are kept.
pub fn parse_port_list(s: &str) -> ScanResult<Vec<u16>> {
    let mut out: Vec<u16> = Vec::new();

    for raw_line in s.lines() {
        let line = raw_line.split('#').next().unwrap_or("");
        for item in line.split(',').map(str::trim) {
            if item.is_empty() {
                continue;
            }

            if let Some((a, b)) = split_range(item) {
                let (start, end) = validate_range(parse_raw(a)?, parse_raw(b)?)?;
                out.extend(start..=end);
                continue;
            }

            out.push(validate_port(parse_raw(item)?)?);
        }
    }

    if out.is_empty() {
        return Err(ScanError::EmptyPortList);
    }
    Ok(out)
}

/// Load a port list from a file path. Errors if the file cannot be read or parsed.
pub fn load_ports_from_path(path: impl AsRef<Path>) -> Result<Vec<u16>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read ports file: {}", path.display()))?;
    parse_port_list(&content).with_context(|| format!("invalid ports file: {}", path.display()))
}

// A leading '-' belongs to a negative number, not a range.
fn split_range(item: &str) -> Option<(&str, &str)> {
    item.split_once('-')
        .filter(|(a, _)| !a.trim().is_empty())
        .map(|(a, b)| (a.trim(), b.trim()))
}

fn parse_raw(s: &str) -> ScanResult<i64> {
    s.trim().parse::<i64>().map_err(|_| ScanError::InvalidPort {
        input: s.to_string(),
    })
}
