use std::time::{Duration, Instant};

use port_probe::{ScanConfig, ScanError, Scanner};
use tokio::net::{TcpListener, UdpSocket};

fn fast_scanner() -> Scanner {
    Scanner::new(ScanConfig::default().with_timeout(Duration::from_millis(300)))
}

#[tokio::test]
async fn range_has_one_result_per_port_in_ascending_order() {
    let report = fast_scanner()
        .scan_range("127.0.0.1", 40000, 40009)
        .await
        .unwrap();
    let ports: Vec<u16> = report.results.iter().map(|r| r.port()).collect();
    assert_eq!(ports, (40000..=40009).collect::<Vec<u16>>());
}

#[tokio::test]
async fn single_port_range() {
    let report = fast_scanner().scan_range("127.0.0.1", 9, 9).await.unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report.results[0].port(), 9);
}

#[tokio::test]
async fn list_keeps_order_and_duplicates() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open = listener.local_addr().unwrap().port();

    let requested = [open, 1, open, 0, 1];
    let report = fast_scanner()
        .scan_ports("127.0.0.1", &requested)
        .await
        .unwrap();

    let ports: Vec<u16> = report.results.iter().map(|r| r.port()).collect();
    assert_eq!(ports, requested.to_vec());
    assert!(report.results[0].tcp_open());
    assert!(report.results[2].tcp_open());
}

#[tokio::test]
async fn closed_tcp_port_settles_within_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let scanner = Scanner::new(ScanConfig::default());
    let start = Instant::now();
    let report = scanner.scan_ports("127.0.0.1", &[port]).await.unwrap();
    assert!(!report.results[0].tcp_open());
    assert!(start.elapsed() < Duration::from_millis(1900));
}

#[tokio::test]
async fn udp_echo_is_open_and_silent_socket_is_not() {
    let echo = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let echo_port = echo.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut buf = [0u8; 64];
        while let Ok((n, peer)) = echo.recv_from(&mut buf).await {
            let _ = echo.send_to(&buf[..n], peer).await;
        }
    });
    let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let silent_port = silent.local_addr().unwrap().port();

    let report = fast_scanner()
        .scan_ports("127.0.0.1", &[echo_port, silent_port])
        .await
        .unwrap();
    assert!(report.results[0].udp_open());
    assert!(!report.results[1].udp_open());
    drop(silent);
}

#[tokio::test]
async fn repeated_scans_are_stable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let scanner = fast_scanner();

    let first = scanner.scan_ports("127.0.0.1", &[port]).await.unwrap();
    let second = scanner.scan_ports("127.0.0.1", &[port]).await.unwrap();
    assert_eq!(first.results, second.results);
}

#[tokio::test]
async fn unbounded_and_single_worker_give_same_order() {
    let ports: Vec<u16> = (41000..41020).rev().collect();
    let cfg = ScanConfig::default().with_timeout(Duration::from_millis(200));

    let unbounded = Scanner::new(cfg.clone().with_concurrency(0))
        .scan_ports("127.0.0.1", &ports)
        .await
        .unwrap();
    let serial = Scanner::new(cfg.with_concurrency(1))
        .scan_ports("127.0.0.1", &ports)
        .await
        .unwrap();

    let a: Vec<u16> = unbounded.results.iter().map(|r| r.port()).collect();
    let b: Vec<u16> = serial.results.iter().map(|r| r.port()).collect();
    assert_eq!(a, ports);
    assert_eq!(b, ports);
}

#[tokio::test]
async fn unresolvable_target_is_a_single_error() {
    let err = fast_scanner()
        .scan_range("no-such-host.invalid", 1, 1000)
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::Resolution { .. }));
    assert!(!err.is_validation());
}

#[tokio::test]
async fn reversed_range_is_rejected() {
    let err = fast_scanner()
        .scan_range("127.0.0.1", 5, 2)
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn empty_list_yields_empty_report() {
    let report = fast_scanner().scan_ports("127.0.0.1", &[]).await.unwrap();
    assert!(report.is_empty());
}

#[tokio::test]
async fn unit_waits_one_timeout_not_two() {
    // Open TCP listener and silent UDP socket sharing one port number.
    let (listener, silent) = loop {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        if let Ok(udp) = UdpSocket::bind(("127.0.0.1", port)).await {
            break (listener, udp);
        }
    };
    let port = listener.local_addr().unwrap().port();
    let timeout = Duration::from_millis(400);

    let start = Instant::now();
    let report = Scanner::new(ScanConfig::default().with_timeout(timeout))
        .scan_ports("127.0.0.1", &[port])
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert!(report.results[0].tcp_open());
    assert!(!report.results[0].udp_open());
    assert!(elapsed >= timeout, "{elapsed:?}");
    assert!(elapsed < timeout * 2, "{elapsed:?}");
    drop(silent);
}
