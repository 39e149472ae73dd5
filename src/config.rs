use std::time::Duration;

/// Per-probe timeout used when nothing else is configured.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Upper bound for in-flight units when a concurrency limit is set.
pub const MAX_CONCURRENCY: usize = 5_000;

pub const DEFAULT_CONCURRENCY: usize = 1_000;

pub const DEFAULT_UDP_PAYLOAD: &[u8] = b"test";

/// Settings shared by every probe of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Time budget for each TCP connect and each UDP round-trip.
    pub probe_timeout: Duration,
    /// Maximum number of ports probed at once. `None` launches every unit immediately.
    pub concurrency: Option<usize>,
    /// Datagram sent by the UDP probe.
    pub udp_payload: Vec<u8>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            concurrency: Some(DEFAULT_CONCURRENCY),
            udp_payload: DEFAULT_UDP_PAYLOAD.to_vec(),
        }
    }
}

impl ScanConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// `0` removes the limit; other values are clamped to `1..=MAX_CONCURRENCY`.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = match concurrency {
            0 => None,
            n => Some(n.clamp(1, MAX_CONCURRENCY)),
        };
        self
    }

    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.udp_payload = payload.into();
        self
    }
}
