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

//! Representation for BGP Open message

use crate::iana::{BgpCapabilityCode, BgpOpenMessageParameterType};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// BGP Open message as defined by [RFC4271](https://datatracker.ietf.org/doc/html/rfc4271#section-4.2).
/// Optional parameters are kept as opaque type/value pairs; a passive
/// observer only needs to extract capability codes from them.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BgpOpenMessage {
    my_as: u16,
    hold_time: u16,
    bgp_id: Ipv4Addr,
    params: Vec<BgpOpenMessageParameter>,
}

impl BgpOpenMessage {
    pub const fn new(
        my_as: u16,
        hold_time: u16,
        bgp_id: Ipv4Addr,
        params: Vec<BgpOpenMessageParameter>,
    ) -> Self {
        Self {
            my_as,
            hold_time,
            bgp_id,
            params,
        }
    }

    pub const fn my_as(&self) -> u16 {
        self.my_as
    }

    pub const fn hold_time(&self) -> u16 {
        self.hold_time
    }

    pub const fn bgp_id(&self) -> Ipv4Addr {
        self.bgp_id
    }

    pub const fn params(&self) -> &Vec<BgpOpenMessageParameter> {
        &self.params
    }

    /// Capability codes advertised in the capabilities optional parameters.
    /// Truncated capability TLVs are ignored.
    pub fn capability_codes(&self) -> Vec<u8> {
        let mut codes = Vec::new();
        for param in &self.params {
            if param.param_type() != BgpOpenMessageParameterType::Capability as u8 {
                continue;
            }
            let mut buf = param.value();
            while buf.len() >= 2 {
                codes.push(buf[0]);
                let tlv_len = 2 + buf[1] as usize;
                if tlv_len > buf.len() {
                    break;
                }
                buf = &buf[tlv_len..];
            }
        }
        codes
    }

    /// Check if the speaker advertised the Four-octet AS number capability
    /// defined by [RFC6793](https://datatracker.ietf.org/doc/html/rfc6793).
    pub fn advertises_four_octet_as(&self) -> bool {
        self.capability_codes()
            .iter()
            .any(|code| *code == BgpCapabilityCode::FourOctetAs as u8)
    }
}

/// A single BGP Open optional parameter, carried as an opaque value.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BgpOpenMessageParameter {
    param_type: u8,
    value: Vec<u8>,
}

impl BgpOpenMessageParameter {
    pub const fn new(param_type: u8, value: Vec<u8>) -> Self {
        Self { param_type, value }
    }

    pub const fn param_type(&self) -> u8 {
        self.param_type
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_codes() {
        let open = BgpOpenMessage::new(
            64512,
            180,
            Ipv4Addr::new(10, 0, 0, 1),
            vec![BgpOpenMessageParameter::new(
                BgpOpenMessageParameterType::Capability as u8,
                vec![0x01, 0x04, 0x00, 0x01, 0x00, 0x01, 0x41, 0x04, 0x00, 0x00, 0xfc, 0x00],
            )],
        );
        assert_eq!(open.capability_codes(), vec![0x01, 0x41]);
        assert!(open.advertises_four_octet_as());
    }

    #[test]
    fn test_no_capabilities() {
        let open = BgpOpenMessage::new(64512, 180, Ipv4Addr::new(10, 0, 0, 1), vec![]);
        assert!(open.capability_codes().is_empty());
        assert!(!open.advertises_four_octet_as());
    }

    #[test]
    fn test_truncated_capability_tlv_ignored() {
        let open = BgpOpenMessage::new(
            64512,
            180,
            Ipv4Addr::new(10, 0, 0, 1),
            vec![BgpOpenMessageParameter::new(
                BgpOpenMessageParameterType::Capability as u8,
                vec![0x41, 0x04, 0x00],
            )],
        );
        // code is visible but the truncated value stops the scan
        assert_eq!(open.capability_codes(), vec![0x41]);
    }
}
