use std::net::IpAddr;

use anyhow::{Context, bail};
use tracing::{info, warn};

use netprobe_common::config::TraceConfig;
use netprobe_core::resolve;
use netprobe_core::trace::{self, RawIcmpTransport};

use crate::terminal::print;
use crate::terminal::table::Table;

pub async fn run(host: &str, max_hops: u8) -> anyhow::Result<()> {
    if !is_root::is_root() {
        bail!("tracing requires raw ICMP sockets; run as administrator/root");
    }

    let addr = resolve::resolve_host(host).await?;
    let IpAddr::V4(dest) = addr else {
        bail!("tracing IPv6 destinations is not supported");
    };

    let cfg = TraceConfig {
        max_hops,
        ..Default::default()
    };
    info!("Traceroute to {host} ({dest}), {max_hops} hops max");

    let outcome = tokio::task::spawn_blocking(move || {
        let mut transport = RawIcmpTransport::open(dest)?;
        trace::walk(&mut transport, &cfg, resolve::reverse_lookup_blocking)
    })
    .await
    .context("trace task failed")??;

    let mut table = Table::new(&["Hop", "IP Address", "Hostname", "RTT (ms)", "Status"]);
    for hop in &outcome.hops {
        let addr = hop
            .addr
            .map(|a| a.to_string())
            .unwrap_or_else(|| "*".to_string());
        let hostname = hop.hostname.clone().unwrap_or_else(|| addr.clone());
        let rtt = match hop.rtt {
            Some(rtt) => format!("{:.2}", rtt.as_secs_f64() * 1000.0),
            None => "*".to_string(),
        };
        table.add_row(vec![
            hop.ttl.to_string(),
            addr,
            hostname,
            rtt,
            hop.kind.to_string(),
        ]);
    }
    table.render();

    if outcome.reached {
        print::success("Trace complete!");
    } else {
        warn!("Max hops reached without reaching the destination");
    }
    Ok(())
}
