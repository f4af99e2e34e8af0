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

//! Serializer for BGP Route Refresh message

use crate::route_refresh::BgpRouteRefreshMessage;
use byteorder::{NetworkEndian, WriteBytesExt};
use routebench_parse_utils::WritablePdu;

#[derive(Eq, PartialEq, Clone, Debug)]
pub enum BgpRouteRefreshMessageWritingError {
    StdIOError(String),
}

impl From<std::io::Error> for BgpRouteRefreshMessageWritingError {
    fn from(err: std::io::Error) -> Self {
        Self::StdIOError(err.to_string())
    }
}

impl WritablePdu<BgpRouteRefreshMessageWritingError> for BgpRouteRefreshMessage {
    /// 2-octet AFI + 1-octet operation + 1-octet SAFI
    const BASE_LENGTH: usize = 4;

    fn len(&self) -> usize {
        Self::BASE_LENGTH
    }

    fn write<T: std::io::Write>(
        &self,
        writer: &mut T,
    ) -> Result<(), BgpRouteRefreshMessageWritingError> {
        writer.write_u16::<NetworkEndian>(self.afi())?;
        writer.write_u8(self.op())?;
        writer.write_u8(self.safi())?;
        Ok(())
    }
}
