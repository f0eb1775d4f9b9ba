use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use netprobe_common::config::PingConfig;
use netprobe_core::ping::{self, SurgeProber};

use crate::terminal::print;
use crate::terminal::table::Table;

pub async fn run(hosts: Vec<String>, count: u32, timeout: u64, interval: u64) -> anyhow::Result<()> {
    let cfg = PingConfig {
        count,
        timeout: Duration::from_secs(timeout),
        interval: Duration::from_secs(interval),
        ..Default::default()
    };

    info!(
        "Pinging {} host(s), {} echo(es) each",
        hosts.len(),
        cfg.count
    );

    let prober = Arc::new(SurgeProber::new()?);
    let reports = ping::ping_hosts(hosts, cfg, prober).await?;

    let mut table = Table::new(&[
        "Host",
        "IP",
        "Packet Loss",
        "Avg Latency",
        "Max Latency",
        "Min Latency",
    ]);
    for report in &reports {
        let ip = match report.ip {
            Some(ip) => ip.to_string(),
            None => "Resolution Failed".to_string(),
        };
        table.add_row(vec![
            report.host.clone(),
            ip,
            format!("{:.2}%", report.loss_pct),
            format!("{:.2?}", report.avg_rtt),
            format!("{:.2?}", report.max_rtt),
            format!("{:.2?}", report.min_rtt),
        ]);
    }
    table.render();

    print::success(&format!("Pinged {} host(s).", reports.len()));
    Ok(())
}
