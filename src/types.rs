use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Outcome of probing one requested port over TCP and UDP.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortResult {
    port: u16,
    tcp_open: bool,
    udp_open: bool,
}

impl PortResult {
    pub fn new(port: u16, tcp_open: bool, udp_open: bool) -> Self {
        Self {
            port,
            tcp_open,
            udp_open,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn tcp_open(&self) -> bool {
        self.tcp_open
    }

    pub fn udp_open(&self) -> bool {
        self.udp_open
    }

    /// True when either protocol answered.
    pub fn any_open(&self) -> bool {
        self.tcp_open || self.udp_open
    }
}

/// A completed scan: the resolved target and one result per requested port, in request order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub target: String,
    /// Resolved addresses, in the order TCP connects try them.
    pub addresses: Vec<IpAddr>,
    pub started_at: String,
    pub finished_at: String,
    pub results: Vec<PortResult>,
}

impl ScanReport {
    pub fn open_count(&self) -> usize {
        self.results.iter().filter(|r| r.any_open()).count()
    }

    pub fn open_only(&self) -> impl Iterator<Item = &PortResult> {
        self.results.iter().filter(|r| r.any_open())
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
