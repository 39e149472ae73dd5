use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::ports::PortSelection;
use crate::probe::{tcp_probe, udp_probe};
use crate::types::{PortResult, ScanReport};
use ::time::{format_description::well_known, OffsetDateTime};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::lookup_host;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Probes a target's ports over TCP and UDP, one concurrent unit per requested port.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Probe every port in `[start, end]`. Results come back in ascending port order.
    pub async fn scan_range(&self, target: &str, start: u16, end: u16) -> ScanResult<ScanReport> {
        if start > end {
            return Err(ScanError::InvalidRange {
                start: start.into(),
                end: end.into(),
            });
        }
        let ports: Vec<u16> = (start..=end).collect();
        self.run(target, &ports).await
    }

    /// Probe `ports` in the given order. Duplicates are probed and reported separately.
    pub async fn scan_ports(&self, target: &str, ports: &[u16]) -> ScanResult<ScanReport> {
        self.run(target, ports).await
    }

    pub async fn scan(&self, target: &str, selection: &PortSelection) -> ScanResult<ScanReport> {
        match selection {
            PortSelection::Range { start, end } => self.scan_range(target, *start, *end).await,
            PortSelection::List(ports) => self.scan_ports(target, ports).await,
        }
    }

    async fn run(&self, target: &str, ports: &[u16]) -> ScanResult<ScanReport> {
        let addresses = resolve_target(target).await?;
        self.probe_all(target, addresses, ports).await
    }

    async fn probe_all(
        &self,
        target: &str,
        addresses: Vec<IpAddr>,
        ports: &[u16],
    ) -> ScanResult<ScanReport> {
        let started_at = now_iso_like();
        info!(host = %target, ?addresses, ports = ports.len(), "scan started");
        let tcp_addrs: Arc<[IpAddr]> = Arc::from(addresses.as_slice());
        let Some(udp_addr) = udp_address(&addresses) else {
            return Err(no_addresses(target));
        };

        let sem = self.config.concurrency.map(|n| Arc::new(Semaphore::new(n.max(1))));
        let timeout = self.config.probe_timeout;
        let payload: Arc<[u8]> = Arc::from(self.config.udp_payload.as_slice());
        let mut set = JoinSet::new();

        for (idx, &port) in ports.iter().enumerate() {
            let permit = match &sem {
                Some(sem) => Some(
                    sem.clone()
                        .acquire_owned()
                        .await
                        .expect("semaphore is never closed"),
                ),
                None => None,
            };
            let payload = payload.clone();
            let tcp_addrs = tcp_addrs.clone();

            set.spawn(async move {
                let _permit = permit; // keep permit until both probes finish
                let result = probe_port(&tcp_addrs, udp_addr, port, &payload, timeout).await;
                (idx, result)
            });
        }

        // Completion order is arbitrary; each unit writes back into its request slot.
        let mut slots: Vec<Option<PortResult>> = vec![None; ports.len()];
        while let Some(joined) = set.join_next().await {
            let (idx, result) = joined?;
            slots[idx] = Some(result);
        }
        let results: Vec<PortResult> = slots.into_iter().flatten().collect();
        debug_assert_eq!(results.len(), ports.len());

        let report = ScanReport {
            target: target.to_string(),
            addresses,
            started_at,
            finished_at: now_iso_like(),
            results,
        };
        info!(
            host = %target,
            scanned = report.len(),
            open = report.open_count(),
            "scan finished"
        );
        Ok(report)
    }
}

/// Run the TCP and UDP probes for one port side by side.
async fn probe_port(
    tcp_addrs: &[IpAddr],
    udp_addr: IpAddr,
    port: u16,
    payload: &[u8],
    timeout: Duration,
) -> PortResult {
    let tcp_targets: Vec<SocketAddr> = tcp_addrs
        .iter()
        .map(|&ip| SocketAddr::new(ip, port))
        .collect();
    let (tcp, udp) = tokio::join!(
        tcp_probe(&tcp_targets, timeout),
        udp_probe(SocketAddr::new(udp_addr, port), payload, timeout)
    );
    debug!(port, ?tcp, ?udp, "probed");
    PortResult::new(port, tcp.is_open(), udp.is_open())
}

/// UDP has no handshake to fall through on, so one address is used: the first IPv4
/// one if there is any.
fn udp_address(addresses: &[IpAddr]) -> Option<IpAddr> {
    addresses
        .iter()
        .copied()
        .find(IpAddr::is_ipv4)
        .or_else(|| addresses.first().copied())
}

fn no_addresses(target: &str) -> ScanError {
    ScanError::Resolution {
        target: target.to_string(),
        source: io::Error::new(io::ErrorKind::NotFound, "no addresses found"),
    }
}

/// Resolve a hostname or IP literal to every address the probes may use, in
/// resolver order with duplicates removed. Never returns an empty list.
pub async fn resolve_target(target: &str) -> ScanResult<Vec<IpAddr>> {
    let host = target.trim().trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(vec![ip]);
    }
    let resolution_error = |source| ScanError::Resolution {
        target: target.to_string(),
        source,
    };
    if host.is_empty() {
        return Err(resolution_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "empty target",
        )));
    }

    let mut addresses: Vec<IpAddr> = Vec::new();
    for addr in lookup_host((host, 0)).await.map_err(resolution_error)? {
        if !addresses.contains(&addr.ip()) {
            addresses.push(addr.ip());
        }
    }
    if addresses.is_empty() {
        return Err(no_addresses(target));
    }
    Ok(addresses)
}

fn now_iso_like() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
