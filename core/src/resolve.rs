//! Resolution helpers shared by the probing engines.

use std::net::IpAddr;

use netprobe_common::error::ProbeError;

/// Resolves a hostname to a single address, preferring IPv4. Failure
/// surfaces as [`ProbeError::Resolution`] so callers can tell a bad
/// name apart from a broken transport.
pub async fn resolve_host(host: &str) -> anyhow::Result<IpAddr> {
    let addrs: Vec<IpAddr> = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|_| ProbeError::Resolution(host.to_string()))?
        .map(|sock| sock.ip())
        .collect();

    let addr = addrs
        .iter()
        .copied()
        .find(IpAddr::is_ipv4)
        .or_else(|| addrs.first().copied())
        .ok_or_else(|| ProbeError::Resolution(host.to_string()))?;
    Ok(addr)
}

/// Best-effort reverse lookup; `None` when the address has no usable
/// PTR record.
pub fn reverse_lookup_blocking(ip: IpAddr) -> Option<String> {
    dns_lookup::lookup_addr(&ip)
        .ok()
        .map(|name| name.trim_end_matches('.').to_string())
}

/// Async wrapper around [`reverse_lookup_blocking`] for use inside
/// probe tasks.
pub async fn reverse_lookup(ip: IpAddr) -> Option<String> {
    tokio::task::spawn_blocking(move || reverse_lookup_blocking(ip))
        .await
        .ok()
        .flatten()
}
