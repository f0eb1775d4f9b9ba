//! Typed probe outcomes.
//!
//! Everything here is append-only data: a worker creates a value, hands
//! it to the shared aggregate, and nothing mutates it afterwards.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Terminal status of a single probe task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    Ok,
    Timeout,
    ResolutionFailed,
    Error,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProbeStatus::Ok => "ok",
            ProbeStatus::Timeout => "timeout",
            ProbeStatus::ResolutionFailed => "resolution failed",
            ProbeStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Aggregated outcome of pinging one host.
#[derive(Debug, Clone)]
pub struct PingReport {
    pub host: String,
    pub ip: Option<IpAddr>,
    /// Packet loss as a percentage in [0, 100].
    pub loss_pct: f64,
    pub min_rtt: Duration,
    pub avg_rtt: Duration,
    pub max_rtt: Duration,
    pub status: ProbeStatus,
}

impl PingReport {
    /// Report for a host that never resolved to an address. Recorded
    /// with maximal loss instead of failing the batch.
    pub fn resolution_failed(host: String) -> Self {
        Self {
            host,
            ip: None,
            loss_pct: 100.0,
            min_rtt: Duration::ZERO,
            avg_rtt: Duration::ZERO,
            max_rtt: Duration::ZERO,
            status: ProbeStatus::ResolutionFailed,
        }
    }

    /// Builds a report from the round-trip times of the echoes that
    /// came back out of `sent` requests.
    pub fn from_rtts(host: String, ip: IpAddr, sent: u32, rtts: &[Duration]) -> Self {
        let received = rtts.len() as u32;
        let lost = sent.saturating_sub(received);
        let loss_pct = if sent == 0 {
            0.0
        } else {
            f64::from(lost) * 100.0 / f64::from(sent)
        };

        let min_rtt = rtts.iter().min().copied().unwrap_or_default();
        let max_rtt = rtts.iter().max().copied().unwrap_or_default();
        let avg_rtt = if received == 0 {
            Duration::ZERO
        } else {
            rtts.iter().sum::<Duration>() / received
        };

        let status = if received == 0 {
            ProbeStatus::Timeout
        } else {
            ProbeStatus::Ok
        };

        Self {
            host,
            ip: Some(ip),
            loss_pct,
            min_rtt,
            avg_rtt,
            max_rtt,
            status,
        }
    }
}

/// Port states reported by connect probes. The scanner only ever emits
/// `Open`; the remaining states exist for rendering completeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortState {
    Open,
    Closed,
    Filtered,
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PortState::Open => "Open",
            PortState::Closed => "Closed",
            PortState::Filtered => "Filtered",
        };
        f.write_str(s)
    }
}

/// One confirmed port from a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanHit {
    pub port: u16,
    pub state: PortState,
}

/// One live device found by the subnet sweep.
#[derive(Debug, Clone)]
pub struct SweepDevice {
    pub ip: Ipv4Addr,
    pub hostname: Option<String>,
    pub latency: Duration,
}

/// Classification of one traceroute hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopKind {
    /// The probe expired in transit; an intermediate router answered.
    Router,
    /// The destination itself answered; the walk is done.
    Destination,
    Timeout,
    ParseError,
    /// A well-formed reply of an unexpected ICMP type.
    Other(u8),
}

impl fmt::Display for HopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HopKind::Router => f.write_str("Router"),
            HopKind::Destination => f.write_str("Destination"),
            HopKind::Timeout => f.write_str("Timeout"),
            HopKind::ParseError => f.write_str("Parse Error"),
            HopKind::Other(raw) => write!(f, "Type: {raw}"),
        }
    }
}

/// One step of a traceroute. Produced strictly in increasing TTL order
/// and never reordered.
#[derive(Debug, Clone)]
pub struct HopProbe {
    pub ttl: u8,
    pub addr: Option<IpAddr>,
    /// Best-effort reverse lookup; renderers fall back to the address.
    pub hostname: Option<String>,
    pub rtt: Option<Duration>,
    pub kind: HopKind,
}
