//! ICMP hop discovery (traceroute).
//!
//! Unlike the other probes, the trace walk is strictly sequential: the
//! TTL for hop N+1 only goes out after hop N has answered or timed out.
//! The wire plumbing is injected through [`TraceTransport`] so the walk
//! itself can be tested with scripted replies; the real transport uses
//! two raw ICMP sockets, one for stamped echo requests with a per-probe
//! TTL and one listening for whatever comes back.

use std::mem::MaybeUninit;
use std::net::{IpAddr, Ipv4Addr, SocketAddrV4};
use std::time::{Duration, Instant};

use anyhow::Context;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tracing::debug;

use netprobe_common::config::TraceConfig;
use netprobe_common::error::ProbeError;
use netprobe_common::probe::{HopKind, HopProbe};
use netprobe_protocols::icmp::{self, ReplyKind};

/// What came back for one TTL.
pub enum ReplyEvent {
    Packet { bytes: Vec<u8>, from: IpAddr },
    TimedOut,
}

/// Wire operations the walk depends on. Synchronous by design: the walk
/// runs inside `spawn_blocking` and raw sockets block on receive.
pub trait TraceTransport {
    fn send_echo(&mut self, ttl: u8, seq: u16) -> anyhow::Result<()>;
    fn recv_reply(&mut self, timeout: Duration) -> ReplyEvent;
}

pub struct TraceOutcome {
    pub hops: Vec<HopProbe>,
    pub reached: bool,
}

/// Walks TTLs from 1 to `cfg.max_hops`, recording one hop row per TTL,
/// and stops early once the destination itself answers.
///
/// A send failure is fatal (the socket is broken for every later hop
/// too); an unparseable reply is recorded as its own hop row and the
/// walk continues.
pub fn walk<T, R>(transport: &mut T, cfg: &TraceConfig, resolve: R) -> anyhow::Result<TraceOutcome>
where
    T: TraceTransport,
    R: Fn(IpAddr) -> Option<String>,
{
    let mut hops = Vec::new();

    for ttl in 1..=cfg.max_hops {
        let sent_at = Instant::now();
        transport
            .send_echo(ttl, u16::from(ttl))
            .with_context(|| format!("failed to send probe (ttl {ttl})"))?;

        let (bytes, from) = match transport.recv_reply(cfg.reply_timeout) {
            ReplyEvent::Packet { bytes, from } => (bytes, from),
            ReplyEvent::TimedOut => {
                hops.push(HopProbe {
                    ttl,
                    addr: None,
                    hostname: None,
                    rtt: None,
                    kind: HopKind::Timeout,
                });
                continue;
            }
        };
        let rtt = sent_at.elapsed();

        let kind = match icmp::classify_reply(&bytes) {
            Ok(ReplyKind::TimeExceeded) => HopKind::Router,
            Ok(ReplyKind::EchoReply) => HopKind::Destination,
            Ok(ReplyKind::Other(raw)) => HopKind::Other(raw),
            Err(e) => {
                debug!("unparseable reply from {from} at ttl {ttl}: {e}");
                hops.push(HopProbe {
                    ttl,
                    addr: Some(from),
                    hostname: None,
                    rtt: None,
                    kind: HopKind::ParseError,
                });
                continue;
            }
        };

        let reached = kind == HopKind::Destination;
        hops.push(HopProbe {
            ttl,
            addr: Some(from),
            hostname: resolve(from),
            rtt: Some(rtt),
            kind,
        });

        if reached {
            return Ok(TraceOutcome { hops, reached: true });
        }
    }

    Ok(TraceOutcome {
        hops,
        reached: false,
    })
}

/// Raw-socket transport for real traces. Requires privileges to open.
pub struct RawIcmpTransport {
    sender: Socket,
    listener: Socket,
    dest: SockAddr,
    identifier: u16,
}

impl RawIcmpTransport {
    pub fn open(dest: Ipv4Addr) -> anyhow::Result<Self> {
        let sender = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))
            .context("failed to open raw ICMP send socket (run as administrator/root)")?;
        let listener = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))
            .context("failed to open raw ICMP listen socket (run as administrator/root)")?;
        listener
            .bind(&SockAddr::from(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)))
            .context("failed to bind ICMP listen socket")?;

        Ok(Self {
            sender,
            listener,
            dest: SockAddr::from(SocketAddrV4::new(dest, 0)),
            identifier: icmp::echo_identifier(),
        })
    }
}

impl TraceTransport for RawIcmpTransport {
    fn send_echo(&mut self, ttl: u8, seq: u16) -> anyhow::Result<()> {
        // TTL lives on the socket, not the packet, so it must be set
        // again before every send.
        self.sender
            .set_ttl(u32::from(ttl))
            .map_err(ProbeError::Transport)?;

        let request = icmp::build_echo_request(self.identifier, seq, icmp::TRACE_PAYLOAD)?;
        self.sender
            .send_to(&request, &self.dest)
            .map_err(ProbeError::Transport)?;
        Ok(())
    }

    fn recv_reply(&mut self, timeout: Duration) -> ReplyEvent {
        if self.listener.set_read_timeout(Some(timeout)).is_err() {
            return ReplyEvent::TimedOut;
        }

        let mut buffer = [MaybeUninit::<u8>::uninit(); 1500];
        let (len, peer) = match self.listener.recv_from(&mut buffer) {
            Ok(received) => received,
            Err(_) => return ReplyEvent::TimedOut,
        };
        let Some(from) = peer.as_socket().map(|sock| sock.ip()) else {
            return ReplyEvent::TimedOut;
        };

        // recv_from initialized the first `len` bytes.
        let datagram = unsafe { std::slice::from_raw_parts(buffer.as_ptr().cast::<u8>(), len) };
        ReplyEvent::Packet {
            bytes: icmp::strip_ipv4_header(datagram).to_vec(),
            from,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Plays back a fixed sequence of replies, one per send.
    struct Scripted {
        replies: VecDeque<ReplyEvent>,
        sent_ttls: Vec<u8>,
        fail_send: bool,
    }

    impl Scripted {
        fn new(replies: Vec<ReplyEvent>) -> Self {
            Self {
                replies: replies.into(),
                sent_ttls: Vec::new(),
                fail_send: false,
            }
        }
    }

    impl TraceTransport for Scripted {
        fn send_echo(&mut self, ttl: u8, _seq: u16) -> anyhow::Result<()> {
            if self.fail_send {
                anyhow::bail!("network is down");
            }
            self.sent_ttls.push(ttl);
            Ok(())
        }

        fn recv_reply(&mut self, _timeout: Duration) -> ReplyEvent {
            self.replies.pop_front().unwrap_or(ReplyEvent::TimedOut)
        }
    }

    fn icmp_bytes(icmp_type: u8) -> Vec<u8> {
        let mut bytes = vec![0u8; 8];
        bytes[0] = icmp_type;
        bytes
    }

    fn packet(icmp_type: u8, last_octet: u8) -> ReplyEvent {
        ReplyEvent::Packet {
            bytes: icmp_bytes(icmp_type),
            from: IpAddr::V4(Ipv4Addr::new(10, 0, 0, last_octet)),
        }
    }

    fn no_names(_: IpAddr) -> Option<String> {
        None
    }

    #[test]
    fn walk_stops_at_the_destination() {
        let mut transport = Scripted::new(vec![packet(11, 1), packet(11, 2), packet(0, 3)]);
        let cfg = TraceConfig::default();

        let outcome = walk(&mut transport, &cfg, no_names).unwrap();

        assert!(outcome.reached);
        assert_eq!(outcome.hops.len(), 3);
        assert_eq!(transport.sent_ttls, vec![1, 2, 3]);
        assert_eq!(outcome.hops[0].kind, HopKind::Router);
        assert_eq!(outcome.hops[1].kind, HopKind::Router);
        assert_eq!(outcome.hops[2].kind, HopKind::Destination);
        assert_eq!(
            outcome.hops[2].addr,
            Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 3)))
        );
        assert!(outcome.hops[2].rtt.is_some());
    }

    #[test]
    fn walk_exhausts_the_ttl_budget_on_silence() {
        let mut transport = Scripted::new(Vec::new());
        let cfg = TraceConfig {
            max_hops: 5,
            reply_timeout: Duration::from_millis(1),
        };

        let outcome = walk(&mut transport, &cfg, no_names).unwrap();

        assert!(!outcome.reached);
        assert_eq!(outcome.hops.len(), 5);
        assert_eq!(transport.sent_ttls, vec![1, 2, 3, 4, 5]);
        assert!(outcome.hops.iter().all(|h| h.kind == HopKind::Timeout));
        assert!(outcome.hops.iter().all(|h| h.addr.is_none()));
    }

    #[test]
    fn malformed_replies_become_their_own_hop_row() {
        let mut transport = Scripted::new(vec![
            ReplyEvent::Packet {
                bytes: vec![0xde],
                from: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9)),
            },
            packet(0, 3),
        ]);
        let cfg = TraceConfig::default();

        let outcome = walk(&mut transport, &cfg, no_names).unwrap();

        assert!(outcome.reached);
        assert_eq!(outcome.hops[0].kind, HopKind::ParseError);
        assert_eq!(
            outcome.hops[0].addr,
            Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9)))
        );
        assert!(outcome.hops[0].rtt.is_none());
    }

    #[test]
    fn unexpected_message_types_keep_their_raw_value() {
        let mut transport = Scripted::new(vec![packet(13, 1), packet(0, 3)]);
        let cfg = TraceConfig::default();

        let outcome = walk(&mut transport, &cfg, no_names).unwrap();

        assert_eq!(outcome.hops[0].kind, HopKind::Other(13));
        assert!(outcome.reached);
    }

    #[test]
    fn send_failure_aborts_the_walk() {
        let mut transport = Scripted::new(Vec::new());
        transport.fail_send = true;

        let outcome = walk(&mut transport, &TraceConfig::default(), no_names);
        assert!(outcome.is_err());
    }

    #[test]
    fn hostname_resolution_is_attached_to_answering_hops() {
        let mut transport = Scripted::new(vec![packet(0, 3)]);
        let cfg = TraceConfig::default();

        let outcome = walk(&mut transport, &cfg, |ip| Some(format!("host-{ip}"))).unwrap();

        assert_eq!(
            outcome.hops[0].hostname.as_deref(),
            Some("host-10.0.0.3")
        );
    }
}
