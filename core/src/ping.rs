//! Multi-host ICMP echo probing.
//!
//! Each host becomes one probe task under the shared dispatcher. The
//! echo transport is injected through [`EchoProber`] so the engine can
//! be exercised without raw-socket privileges; the real implementation
//! rides on `surge-ping`.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use surge_ping::{Client, Config, PingIdentifier, PingSequence, SurgeError};
use tracing::debug;

use netprobe_common::config::PingConfig;
use netprobe_common::probe::PingReport;

use crate::dispatcher::Dispatcher;
use crate::resolve;

/// Payload carried by ping echoes (standard 56-byte ping body).
const ECHO_PAYLOAD: [u8; 56] = [0u8; 56];

/// A single timed ICMP echo against one address.
///
/// `Ok(Some(rtt))` is a reply, `Ok(None)` a timeout; `Err` means the
/// transport itself failed, which is fatal for a whole ping batch but
/// swallowed per address during sweeps.
#[async_trait]
pub trait EchoProber: Send + Sync {
    async fn echo(
        &self,
        addr: IpAddr,
        seq: u16,
        timeout: Duration,
    ) -> anyhow::Result<Option<Duration>>;
}

/// Echo prober backed by `surge-ping`'s ICMP client.
pub struct SurgeProber {
    client: Client,
}

impl SurgeProber {
    /// Opens the ICMP socket. This is the privileged step: failure here
    /// aborts the operation before any probe is sent.
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::new(&Config::default())
            .context("failed to open ICMP socket (elevated privileges are usually required)")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl EchoProber for SurgeProber {
    async fn echo(
        &self,
        addr: IpAddr,
        seq: u16,
        timeout: Duration,
    ) -> anyhow::Result<Option<Duration>> {
        let mut pinger = self.client.pinger(addr, PingIdentifier(rand::random())).await;
        pinger.timeout(timeout);

        match pinger.ping(PingSequence(seq), &ECHO_PAYLOAD).await {
            Ok((_reply, rtt)) => Ok(Some(rtt)),
            Err(SurgeError::Timeout { .. }) => Ok(None),
            Err(e) => Err(e).with_context(|| format!("echo to {addr} failed")),
        }
    }
}

/// Pings every host concurrently, at most `cfg.concurrency` in flight,
/// and returns exactly one report per host that resolved.
///
/// A host that fails resolution still yields a report, marked
/// `ResolutionFailed` with 100% loss. Any other task failure fails the
/// batch once all tasks have finished.
pub async fn ping_hosts(
    hosts: Vec<String>,
    cfg: PingConfig,
    prober: Arc<dyn EchoProber>,
) -> anyhow::Result<Vec<PingReport>> {
    let dispatcher = Dispatcher::new(cfg.concurrency);

    dispatcher
        .run_all(hosts, move |host: String| {
            let prober = Arc::clone(&prober);
            let cfg = cfg.clone();
            async move {
                let report = ping_one(host, &cfg, prober.as_ref()).await?;
                Ok(Some(report))
            }
        })
        .await
}

async fn ping_one(
    host: String,
    cfg: &PingConfig,
    prober: &dyn EchoProber,
) -> anyhow::Result<PingReport> {
    let addr = match resolve::resolve_host(&host).await {
        Ok(addr) => addr,
        Err(e) => {
            debug!("resolution failed for {host}: {e:#}");
            return Ok(PingReport::resolution_failed(host));
        }
    };

    let mut rtts = Vec::with_capacity(cfg.count as usize);
    for seq in 0..cfg.count {
        if seq > 0 {
            tokio::time::sleep(cfg.interval).await;
        }
        if let Some(rtt) = prober.echo(addr, seq as u16, cfg.timeout).await? {
            rtts.push(rtt);
        }
    }

    Ok(PingReport::from_rtts(host, addr, cfg.count, &rtts))
}
