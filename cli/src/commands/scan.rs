use std::time::Duration;

use tracing::{error, info, warn};

use netprobe_common::config::ScanConfig;
use netprobe_common::network::ports;
use netprobe_core::scan;

use crate::terminal::print;
use crate::terminal::table::Table;

pub async fn run(host: String, port_spec: &str, timeout: u64) -> anyhow::Result<()> {
    let ports = ports::parse_port_spec(port_spec);
    if ports.is_empty() {
        error!("no valid ports parsed, check the --ports flag");
        return Ok(());
    }

    info!("Starting scan against {host} ({} ports)", ports.len());

    let cfg = ScanConfig {
        timeout: Duration::from_secs(timeout),
        ..Default::default()
    };
    let mut hits = scan::scan_ports(host, ports, &cfg).await;

    if hits.is_empty() {
        warn!("No open ports found");
        return Ok(());
    }
    hits.sort_by_key(|hit| hit.port);

    let mut table = Table::new(&["Port", "Protocol", "Status"]);
    for hit in &hits {
        table.add_row(vec![
            hit.port.to_string(),
            "TCP".to_string(),
            hit.state.to_string(),
        ]);
    }
    table.render();

    print::success(&format!("Scan complete. Found {} open ports.", hits.len()));
    Ok(())
}
