//! Local subnet discovery.
//!
//! One echo per candidate address on the local /24. Addresses that
//! answer get a best-effort reverse lookup; everything else is silently
//! absent from the results.

use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::trace;

use netprobe_common::config::SweepConfig;
use netprobe_common::network::subnet::LocalSubnet;
use netprobe_common::probe::SweepDevice;

use crate::dispatcher::Dispatcher;
use crate::ping::EchoProber;
use crate::resolve;

/// Invoked with the running device count each time a host answers, so
/// the caller can keep a progress display current.
pub type FoundCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Sweeps the subnet's host addresses (.1 through .254, excluding the
/// local machine) and returns every device that answered an echo.
///
/// Transport errors on individual addresses are treated the same as
/// timeouts: the address is not reachable.
pub async fn sweep_subnet(
    subnet: &LocalSubnet,
    cfg: &SweepConfig,
    prober: Arc<dyn EchoProber>,
    on_found: Option<FoundCallback>,
) -> Vec<SweepDevice> {
    let dispatcher = Dispatcher::new(cfg.concurrency);
    let echo_timeout = cfg.timeout;
    let found = Arc::new(AtomicUsize::new(0));

    dispatcher
        .run_collect(subnet.host_addresses(), move |ip| {
            let prober = Arc::clone(&prober);
            let on_found = on_found.clone();
            let found = Arc::clone(&found);
            async move {
                let rtt = match prober.echo(IpAddr::V4(ip), 0, echo_timeout).await {
                    Ok(Some(rtt)) => rtt,
                    Ok(None) => return None,
                    Err(e) => {
                        trace!("probe of {ip} failed: {e:#}");
                        return None;
                    }
                };

                let hostname = resolve::reverse_lookup(IpAddr::V4(ip)).await;
                if let Some(callback) = on_found {
                    callback(found.fetch_add(1, Ordering::SeqCst) + 1);
                }
                Some(SweepDevice {
                    ip,
                    hostname,
                    latency: rtt,
                })
            }
        })
        .await
}
