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

//! Network Layer Reachability Information (NLRI) types

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

/// A unicast IPv4 network prefix. Construction is validated: multicast and
/// broadcast networks are rejected.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Ipv4Unicast(Ipv4Net);

/// The network is not a valid IPv4 unicast prefix. The carried value is the
/// rejected network.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct InvalidIpv4UnicastNetwork(pub Ipv4Net);

impl Ipv4Unicast {
    pub fn from_net(net: Ipv4Net) -> Result<Self, InvalidIpv4UnicastNetwork> {
        if net.addr().is_multicast() || net.addr().is_broadcast() {
            return Err(InvalidIpv4UnicastNetwork(net));
        }
        Ok(Self(net))
    }

    pub const fn address(&self) -> Ipv4Net {
        self.0
    }
}

impl TryFrom<Ipv4Net> for Ipv4Unicast {
    type Error = InvalidIpv4UnicastNetwork;

    fn try_from(net: Ipv4Net) -> Result<Self, Self::Error> {
        Self::from_net(net)
    }
}
