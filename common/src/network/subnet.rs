//! Local /24 derivation for the discovery sweep.

use std::net::Ipv4Addr;

use pnet::datalink;
use pnet::ipnetwork::IpNetwork;

/// The address this machine answers on, from which the sweep range is
/// derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalSubnet {
    pub local_ip: Ipv4Addr,
}

impl LocalSubnet {
    /// First three octets of the local address, e.g. `"192.168.1"`.
    pub fn prefix(&self) -> String {
        let o = self.local_ip.octets();
        format!("{}.{}.{}", o[0], o[1], o[2])
    }

    /// Every host address of the /24 (`.1` through `.254`), excluding
    /// the local machine itself.
    pub fn host_addresses(&self) -> Vec<Ipv4Addr> {
        let o = self.local_ip.octets();
        (1..=254u8)
            .map(|h| Ipv4Addr::new(o[0], o[1], o[2], h))
            .filter(|ip| *ip != self.local_ip)
            .collect()
    }
}

/// Derives the local subnet from the machine's non-loopback IPv4
/// interface addresses.
pub fn detect_local_subnet() -> anyhow::Result<LocalSubnet> {
    let candidates: Vec<Ipv4Addr> = datalink::interfaces()
        .iter()
        .filter(|iface| !iface.is_loopback())
        .flat_map(|iface| iface.ips.iter())
        .filter_map(|net| match net {
            IpNetwork::V4(v4) => Some(v4.ip()),
            IpNetwork::V6(_) => None,
        })
        .collect();

    match choose_local_ip(&candidates) {
        Some(local_ip) => Ok(LocalSubnet { local_ip }),
        None => anyhow::bail!("no active local IPv4 address found"),
    }
}

/// Address preference: link-local (169.254/16) never qualifies, the
/// first 192.168/16 address wins outright, 10/8 beats every remaining
/// candidate, otherwise the first usable address is taken.
fn choose_local_ip(candidates: &[Ipv4Addr]) -> Option<Ipv4Addr> {
    let mut ordered: Vec<Ipv4Addr> = Vec::new();

    for &ip in candidates {
        let o = ip.octets();
        if o[0] == 169 && o[1] == 254 {
            continue;
        }
        if o[0] == 192 && o[1] == 168 {
            return Some(ip);
        }
        if o[0] == 10 {
            ordered.insert(0, ip);
        } else {
            ordered.push(ip);
        }
    }

    ordered.first().copied()
}
