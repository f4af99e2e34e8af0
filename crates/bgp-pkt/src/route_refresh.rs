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

//! Representation for BGP Route Refresh message

use serde::{Deserialize, Serialize};

/// BGP Route Refresh message as defined by
/// [RFC2918](https://datatracker.ietf.org/doc/html/rfc2918) with the
/// operation subtypes of [RFC7313](https://datatracker.ietf.org/doc/html/rfc7313).
/// Address family and operation are carried raw.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BgpRouteRefreshMessage {
    afi: u16,
    op: u8,
    safi: u8,
}

impl BgpRouteRefreshMessage {
    pub const fn new(afi: u16, op: u8, safi: u8) -> Self {
        Self { afi, op, safi }
    }

    pub const fn afi(&self) -> u16 {
        self.afi
    }

    pub const fn op(&self) -> u8 {
        self.op
    }

    pub const fn safi(&self) -> u8 {
        self.safi
    }
}
