use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;

use netprobe_common::config::{PingConfig, ScanConfig};
use netprobe_common::probe::{PortState, ProbeStatus};
use netprobe_core::ping::{self, EchoProber};
use netprobe_core::scan;

/// Answers every echo instantly.
struct AlwaysUp;

#[async_trait]
impl EchoProber for AlwaysUp {
    async fn echo(
        &self,
        _addr: IpAddr,
        _seq: u16,
        _timeout: Duration,
    ) -> anyhow::Result<Option<Duration>> {
        Ok(Some(Duration::from_millis(1)))
    }
}

#[tokio::test]
async fn ping_emits_one_report_per_target() {
    let cfg = PingConfig {
        count: 1,
        timeout: Duration::from_millis(50),
        interval: Duration::ZERO,
        concurrency: 4,
    };
    let reports = ping::ping_hosts(
        vec!["localhost".to_string(), "host.invalid".to_string()],
        cfg,
        Arc::new(AlwaysUp),
    )
    .await
    .expect("ping batch failed");

    assert_eq!(reports.len(), 2);

    let unresolved = reports
        .iter()
        .find(|r| r.host == "host.invalid")
        .expect("missing report for the unresolvable host");
    assert_eq!(unresolved.status, ProbeStatus::ResolutionFailed);
    assert_eq!(unresolved.loss_pct, 100.0);

    let resolved = reports
        .iter()
        .find(|r| r.host == "localhost")
        .expect("missing report for localhost");
    assert_eq!(resolved.status, ProbeStatus::Ok);
}

#[tokio::test]
async fn scan_reports_only_the_listening_port() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open_port = listener.local_addr().unwrap().port();

    let closed_port = {
        let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
        probe.local_addr().unwrap().port()
    };

    let cfg = ScanConfig {
        timeout: Duration::from_millis(500),
        concurrency: 4,
    };
    let hits = scan::scan_ports(
        "127.0.0.1".to_string(),
        vec![open_port, closed_port],
        &cfg,
    )
    .await;

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].port, open_port);
    assert_eq!(hits[0].state, PortState::Open);
}
