//! TCP connect scanning.
//!
//! A full three-way handshake per port: a completed connection means
//! open, anything else (refused, timed out, unreachable) means the port
//! simply does not appear in the results.

use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

use netprobe_common::config::ScanConfig;
use netprobe_common::probe::{PortState, ScanHit};

use crate::dispatcher::Dispatcher;

/// Probes every port on `host` concurrently, at most `cfg.concurrency`
/// connections in flight, and returns the open ones in completion
/// order. Callers sort by port number for display.
pub async fn scan_ports(host: String, ports: Vec<u16>, cfg: &ScanConfig) -> Vec<ScanHit> {
    let dispatcher = Dispatcher::new(cfg.concurrency);
    let connect_timeout = cfg.timeout;

    dispatcher
        .run_collect(ports, move |port: u16| {
            let host = host.clone();
            async move {
                match timeout(connect_timeout, TcpStream::connect((host.as_str(), port))).await {
                    Ok(Ok(stream)) => {
                        drop(stream);
                        Some(ScanHit {
                            port,
                            state: PortState::Open,
                        })
                    }
                    Ok(Err(e)) => {
                        trace!("port {port} closed: {e}");
                        None
                    }
                    Err(_) => {
                        trace!("port {port} filtered (no answer)");
                        None
                    }
                }
            }
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn reports_only_the_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open_port = listener.local_addr().unwrap().port();

        // Bind and immediately drop a second socket so its port is
        // known to be closed.
        let closed_port = {
            let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
            probe.local_addr().unwrap().port()
        };

        let cfg = ScanConfig {
            timeout: Duration::from_millis(500),
            concurrency: 8,
        };
        let hits = scan_ports("127.0.0.1".to_string(), vec![open_port, closed_port], &cfg).await;

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].port, open_port);
        assert_eq!(hits[0].state, PortState::Open);
    }

    #[tokio::test]
    async fn empty_port_list_yields_no_hits() {
        let cfg = ScanConfig::default();
        let hits = scan_ports("127.0.0.1".to_string(), Vec::new(), &cfg).await;
        assert!(hits.is_empty());
    }
}
