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

//! Representation for BGP Update message

use crate::{
    nlri::Ipv4Unicast,
    path_attribute::{PathAttribute, PathAttributeValue},
};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// BGP Update message as defined by [RFC4271](https://datatracker.ietf.org/doc/html/rfc4271#section-4.3)
///
/// ```text
/// +-----------------------------------------------------+
/// |   Withdrawn Routes Length (2 octets)                |
/// +-----------------------------------------------------+
/// |   Withdrawn Routes (variable)                       |
/// +-----------------------------------------------------+
/// |   Total Path Attribute Length (2 octets)            |
/// +-----------------------------------------------------+
/// |   Path Attributes (variable)                        |
/// +-----------------------------------------------------+
/// |   Network Layer Reachability Information (variable) |
/// +-----------------------------------------------------+
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BgpUpdateMessage {
    withdrawn_routes: Vec<Ipv4Unicast>,
    path_attributes: Vec<PathAttribute>,
    nlri: Vec<Ipv4Unicast>,
}

impl BgpUpdateMessage {
    pub const fn new(
        withdrawn_routes: Vec<Ipv4Unicast>,
        path_attributes: Vec<PathAttribute>,
        nlri: Vec<Ipv4Unicast>,
    ) -> Self {
        Self {
            withdrawn_routes,
            path_attributes,
            nlri,
        }
    }

    pub const fn withdrawn_routes(&self) -> &Vec<Ipv4Unicast> {
        &self.withdrawn_routes
    }

    pub const fn path_attributes(&self) -> &Vec<PathAttribute> {
        &self.path_attributes
    }

    pub const fn nlri(&self) -> &Vec<Ipv4Unicast> {
        &self.nlri
    }

    /// The `NEXT_HOP` path attribute, if the message carries one.
    pub fn next_hop(&self) -> Option<IpAddr> {
        self.path_attributes.iter().find_map(|attr| match attr.value() {
            PathAttributeValue::NextHop(next_hop) => Some(IpAddr::V4(next_hop.next_hop())),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_attribute::NextHop;
    use std::net::Ipv4Addr;

    #[test]
    fn test_next_hop_extraction() {
        let attr = PathAttribute::from(
            false,
            true,
            false,
            false,
            PathAttributeValue::NextHop(NextHop::new(Ipv4Addr::new(10, 0, 0, 1))),
        )
        .unwrap();
        let update = BgpUpdateMessage::new(vec![], vec![attr], vec![]);
        assert_eq!(
            update.next_hop(),
            Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)))
        );

        let empty = BgpUpdateMessage::new(vec![], vec![], vec![]);
        assert_eq!(empty.next_hop(), None);
    }
}
