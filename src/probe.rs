//! Single-port reachability probes.
//!
//! Each probe is raced against its own timer with `tokio::time::timeout`. Whatever
//! loses the race is dropped, which also closes its socket.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::{TcpStream, UdpSocket};
use tokio::time;

/// Why a probe ended the way it did. Only [`ProbeOutcome::Open`] counts as open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Open,
    Refused,
    TimedOut,
    Failed(io::ErrorKind),
}

impl ProbeOutcome {
    pub fn is_open(self) -> bool {
        matches!(self, ProbeOutcome::Open)
    }
}

impl From<io::Error> for ProbeOutcome {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::ConnectionRefused => ProbeOutcome::Refused,
            io::ErrorKind::TimedOut => ProbeOutcome::TimedOut,
            kind => ProbeOutcome::Failed(kind),
        }
    }
}

/// Try a TCP handshake with each of `addrs` in order until one succeeds. The whole
/// attempt shares one `timeout`. Nothing is sent or read on success.
pub async fn tcp_probe(addrs: &[SocketAddr], timeout: Duration) -> ProbeOutcome {
    match time::timeout(timeout, TcpStream::connect(addrs)).await {
        Ok(Ok(_stream)) => ProbeOutcome::Open,
        Ok(Err(e)) => e.into(),
        Err(_) => ProbeOutcome::TimedOut,
    }
}

/// Send `payload` to `addr` and wait for any datagram back.
///
/// The reply is not inspected. A silent port and a filtered one look the same here,
/// so `Open` means "something answered" and nothing stronger.
pub async fn udp_probe(addr: SocketAddr, payload: &[u8], timeout: Duration) -> ProbeOutcome {
    let socket = match connected_udp_socket(addr).await {
        Ok(s) => s,
        Err(e) => return e.into(),
    };
    if let Err(e) = socket.send(payload).await {
        return e.into();
    }

    let mut buf = [0u8; 1500];
    match time::timeout(timeout, socket.recv(&mut buf)).await {
        Ok(Ok(_)) => ProbeOutcome::Open,
        Ok(Err(e)) => e.into(),
        Err(_) => ProbeOutcome::TimedOut,
    }
}

async fn connected_udp_socket(addr: SocketAddr) -> io::Result<UdpSocket> {
    let local = match addr.ip() {
        IpAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        IpAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
    };
    let socket = UdpSocket::bind(local).await?;
    socket.connect(addr).await?;
    Ok(socket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    const SHORT: Duration = Duration::from_millis(500);

    #[tokio::test]
    async fn tcp_open_with_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        assert_eq!(tcp_probe(&[addr], SHORT).await, ProbeOutcome::Open);
    }

    #[tokio::test]
    async fn tcp_falls_through_to_later_address() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let live = listener.local_addr().unwrap();
        // Same port on an address nothing listens on, tried first.
        let dead = SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), live.port());
        assert_eq!(tcp_probe(&[dead, live], SHORT).await, ProbeOutcome::Open);
    }

    #[tokio::test]
    async fn tcp_timer_decides_when_connect_is_slower() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // The handshake cannot finish on the first poll, so a zero budget always expires.
        assert_eq!(
            tcp_probe(&[addr], Duration::ZERO).await,
            ProbeOutcome::TimedOut
        );
    }

    #[tokio::test]
    async fn tcp_without_addresses_is_not_open() {
        assert!(!tcp_probe(&[], SHORT).await.is_open());
    }

    #[tokio::test]
    async fn tcp_closed_without_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        assert!(!tcp_probe(&[addr], SHORT).await.is_open());
    }

    #[tokio::test]
    async fn udp_open_with_echo() {
        let echo = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = echo.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            if let Ok((n, peer)) = echo.recv_from(&mut buf).await {
                let _ = echo.send_to(&buf[..n], peer).await;
            }
        });
        assert_eq!(udp_probe(addr, b"test", SHORT).await, ProbeOutcome::Open);
    }

    #[tokio::test]
    async fn udp_silent_port_is_not_open() {
        // Bound but never answers.
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = silent.local_addr().unwrap();
        let outcome = udp_probe(addr, b"test", Duration::from_millis(200)).await;
        assert_eq!(outcome, ProbeOutcome::TimedOut);
        drop(silent);
    }

    #[test]
    fn refused_maps_to_refused() {
        let e = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert_eq!(ProbeOutcome::from(e), ProbeOutcome::Refused);
        let e = io::Error::from(io::ErrorKind::AddrNotAvailable);
        assert_eq!(
            ProbeOutcome::from(e),
            ProbeOutcome::Failed(io::ErrorKind::AddrNotAvailable)
        );
    }
}
