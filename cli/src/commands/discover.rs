use std::sync::Arc;
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use netprobe_common::config::SweepConfig;
use netprobe_common::network::subnet;
use netprobe_core::ping::SurgeProber;
use netprobe_core::sweep::{self, FoundCallback};

use crate::terminal::print;
use crate::terminal::table::Table;

pub async fn run(timeout_ms: u64) -> anyhow::Result<()> {
    info!("Detecting local network...");
    let local = subnet::detect_local_subnet()?;
    print::success(&format!("Local IP: {}", local.local_ip));
    info!(
        "Scanning range {}.1 - {}.254",
        local.prefix(),
        local.prefix()
    );

    if !is_root::is_root() {
        warn!("not running as root, unprivileged ping sockets may be unavailable");
    }

    let cfg = SweepConfig {
        timeout: Duration::from_millis(timeout_ms),
        ..Default::default()
    };
    let prober = Arc::new(SurgeProber::new()?);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.blue} {msg}").unwrap());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Sweeping subnet...");

    let on_found: FoundCallback = {
        let spinner = spinner.clone();
        Arc::new(move |found| {
            spinner.set_message(format!(
                "Identified {} device(s) so far...",
                found.to_string().green().bold()
            ));
        })
    };

    let mut devices = sweep::sweep_subnet(&local, &cfg, prober, Some(on_found)).await;
    spinner.finish_and_clear();

    if devices.is_empty() {
        warn!("No devices found (is a firewall blocking pings?)");
        return Ok(());
    }
    devices.sort_by_key(|device| device.ip);

    let mut table = Table::new(&["IP Address", "Hostname", "Latency"]);
    for device in &devices {
        table.add_row(vec![
            device.ip.to_string(),
            device
                .hostname
                .clone()
                .unwrap_or_else(|| "(Unknown)".to_string()),
            format!("{:.2?}", device.latency),
        ]);
    }
    table.render();

    print::success(&format!("Discovery complete. Found {} device(s).", devices.len()));
    Ok(())
}
