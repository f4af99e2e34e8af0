// Copyright (C) 2024-present The Routebench Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Extraction of TCP segments from captured link-layer frames.
//!
//! Anything that is not a well-formed Ethernet/IP/TCP stack is silently
//! dropped; the BPF filter has already narrowed the capture to the
//! session's TCP connection, so everything else is noise.

use crate::{source::RawPacket, FlowKey};
use chrono::{DateTime, Utc};
use pdu::{Ethernet, EthernetPdu, Ipv4, Ipv4Pdu, Ipv6, Ipv6Pdu, Tcp, TcpPdu};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// A TCP segment attributed to its flow, in capture order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpSegment {
    pub flow: FlowKey,
    pub timestamp: DateTime<Utc>,
    /// Raw TCP sequence number of the first payload octet (or of the SYN)
    pub seq: u32,
    pub syn: bool,
    pub payload: Vec<u8>,
}

/// Dissect a captured frame down to its TCP segment, if it carries one.
pub fn extract_tcp_segment(packet: &RawPacket) -> Option<TcpSegment> {
    let eth = EthernetPdu::new(&packet.data).ok()?;
    match eth.inner().ok()? {
        Ethernet::Ipv4(ipv4) => from_ipv4(ipv4, packet.timestamp),
        Ethernet::Ipv6(ipv6) => from_ipv6(ipv6, packet.timestamp),
        _ => None,
    }
}

fn from_ipv4(pdu: Ipv4Pdu<'_>, timestamp: DateTime<Utc>) -> Option<TcpSegment> {
    let src_ip = IpAddr::V4(Ipv4Addr::from(pdu.source_address()));
    let dst_ip = IpAddr::V4(Ipv4Addr::from(pdu.destination_address()));
    match pdu.inner().ok()? {
        Ipv4::Tcp(tcp) => from_tcp(tcp, src_ip, dst_ip, timestamp),
        _ => None,
    }
}

fn from_ipv6(pdu: Ipv6Pdu<'_>, timestamp: DateTime<Utc>) -> Option<TcpSegment> {
    let src_ip = IpAddr::V6(Ipv6Addr::from(pdu.source_address()));
    let dst_ip = IpAddr::V6(Ipv6Addr::from(pdu.destination_address()));
    match pdu.inner().ok()? {
        Ipv6::Tcp(tcp) => from_tcp(tcp, src_ip, dst_ip, timestamp),
        _ => None,
    }
}

fn from_tcp(
    tcp: TcpPdu<'_>,
    src_ip: IpAddr,
    dst_ip: IpAddr,
    timestamp: DateTime<Utc>,
) -> Option<TcpSegment> {
    let Tcp::Raw(payload) = tcp.inner().ok()?;
    Some(TcpSegment {
        flow: FlowKey {
            src_ip,
            src_port: tcp.source_port(),
            dst_ip,
            dst_port: tcp.destination_port(),
        },
        timestamp,
        seq: tcp.sequence_number(),
        syn: tcp.syn(),
        payload: payload.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::ipv4_tcp_frame;

    #[test]
    fn test_extract_tcp_segment() {
        let src = (Ipv4Addr::new(10, 0, 0, 2), 179);
        let dst = (Ipv4Addr::new(10, 0, 0, 1), 33000);
        let packet = RawPacket {
            timestamp: Utc::now(),
            data: ipv4_tcp_frame(src, dst, 1000, false, &[0xde, 0xad, 0xbe, 0xef]),
        };
        let segment = extract_tcp_segment(&packet).unwrap();
        assert_eq!(segment.flow.src_ip, IpAddr::V4(src.0));
        assert_eq!(segment.flow.src_port, 179);
        assert_eq!(segment.flow.dst_ip, IpAddr::V4(dst.0));
        assert_eq!(segment.flow.dst_port, 33000);
        assert_eq!(segment.seq, 1000);
        assert!(!segment.syn);
        assert_eq!(segment.payload, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_syn_flag() {
        let packet = RawPacket {
            timestamp: Utc::now(),
            data: ipv4_tcp_frame(
                (Ipv4Addr::new(10, 0, 0, 1), 33000),
                (Ipv4Addr::new(10, 0, 0, 2), 179),
                500,
                true,
                &[],
            ),
        };
        let segment = extract_tcp_segment(&packet).unwrap();
        assert!(segment.syn);
        assert!(segment.payload.is_empty());
    }

    #[test]
    fn test_non_ip_frame_dropped() {
        // ARP ethertype
        let mut data = vec![0x00; 14];
        data[12] = 0x08;
        data[13] = 0x06;
        data.resize(60, 0x00);
        let packet = RawPacket {
            timestamp: Utc::now(),
            data,
        };
        assert_eq!(extract_tcp_segment(&packet), None);
    }

    #[test]
    fn test_truncated_frame_dropped() {
        let packet = RawPacket {
            timestamp: Utc::now(),
            data: vec![0x00; 10],
        };
        assert_eq!(extract_tcp_segment(&packet), None);
    }
}
