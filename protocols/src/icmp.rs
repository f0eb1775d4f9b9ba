//! ICMP echo construction and reply classification.
//!
//! The trace walk builds its echo requests by hand so it can stamp its
//! own identifier and sequence numbers, and classifies replies from the
//! raw ICMP bytes arriving on the listening socket.

use netprobe_common::error::ProbeError;
use pnet::packet::MutablePacket;
use pnet::packet::icmp::echo_request::{IcmpCodes, MutableEchoRequestPacket};
use pnet::packet::icmp::{IcmpPacket, IcmpTypes, checksum};
use pnet::packet::ipv4::Ipv4Packet;

/// ICMP header size (fixed).
pub const ICMP_HEADER_SIZE: usize = 8;

/// Payload carried by trace probes.
pub const TRACE_PAYLOAD: &[u8] = b"NETPROBE";

/// Message classes the hop-discovery walk reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    EchoReply,
    TimeExceeded,
    /// Any other well-formed message, carrying the raw type value.
    Other(u8),
}

/// Identifier stamped into outgoing echo requests so replies can be
/// told apart from other processes' traffic.
pub fn echo_identifier() -> u16 {
    std::process::id() as u16
}

/// Builds an ICMP Echo Request with the given identifier, sequence
/// number and payload, checksum included.
pub fn build_echo_request(
    identifier: u16,
    sequence: u16,
    payload: &[u8],
) -> Result<Vec<u8>, ProbeError> {
    let mut buffer = vec![0u8; ICMP_HEADER_SIZE + payload.len()];

    {
        let mut packet = MutableEchoRequestPacket::new(&mut buffer)
            .ok_or_else(|| ProbeError::Parse("echo request buffer too small".into()))?;
        packet.set_icmp_type(IcmpTypes::EchoRequest);
        packet.set_icmp_code(IcmpCodes::NoCode);
        packet.set_identifier(identifier);
        packet.set_sequence_number(sequence);
        packet.payload_mut()[..payload.len()].copy_from_slice(payload);
    }

    let cksum = {
        let view = IcmpPacket::new(&buffer)
            .ok_or_else(|| ProbeError::Parse("echo request buffer too small".into()))?;
        checksum(&view)
    };
    if let Some(mut packet) = MutableEchoRequestPacket::new(&mut buffer) {
        packet.set_checksum(cksum);
    }

    Ok(buffer)
}

/// Classifies raw ICMP reply bytes by message type.
pub fn classify_reply(bytes: &[u8]) -> Result<ReplyKind, ProbeError> {
    let packet = IcmpPacket::new(bytes).ok_or_else(|| {
        ProbeError::Parse(format!("truncated ICMP message ({} bytes)", bytes.len()))
    })?;

    let kind = match packet.get_icmp_type() {
        IcmpTypes::EchoReply => ReplyKind::EchoReply,
        IcmpTypes::TimeExceeded => ReplyKind::TimeExceeded,
        other => ReplyKind::Other(other.0),
    };
    Ok(kind)
}

/// Strips the IPv4 header from a raw datagram, yielding the embedded
/// ICMP bytes. Raw ICMP sockets deliver the full IP packet on receive.
/// Input that does not parse as IPv4 is returned unchanged so the
/// classifier can report it as malformed.
pub fn strip_ipv4_header(datagram: &[u8]) -> &[u8] {
    match Ipv4Packet::new(datagram) {
        Some(ip) => {
            let header_len = usize::from(ip.get_header_length()) * 4;
            if header_len > 0 && datagram.len() >= header_len {
                &datagram[header_len..]
            } else {
                datagram
            }
        }
        None => datagram,
    }
}
