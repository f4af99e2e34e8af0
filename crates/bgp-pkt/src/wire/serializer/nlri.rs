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

//! Serializer for BGP NLRI types

use crate::{nlri::Ipv4Unicast, wire::serializer::round_len};
use byteorder::WriteBytesExt;
use routebench_parse_utils::WritablePdu;

#[derive(Eq, PartialEq, Clone, Debug)]
pub enum Ipv4UnicastWritingError {
    StdIOError(String),
}

impl From<std::io::Error> for Ipv4UnicastWritingError {
    fn from(err: std::io::Error) -> Self {
        Self::StdIOError(err.to_string())
    }
}

impl WritablePdu<Ipv4UnicastWritingError> for Ipv4Unicast {
    /// One octet for the prefix length
    const BASE_LENGTH: usize = 1;

    fn len(&self) -> usize {
        Self::BASE_LENGTH + round_len(self.address().prefix_len()) as usize
    }

    fn write<T: std::io::Write>(&self, writer: &mut T) -> Result<(), Ipv4UnicastWritingError> {
        let net = self.address();
        let octets = round_len(net.prefix_len()) as usize;
        writer.write_u8(net.prefix_len())?;
        writer.write_all(&net.network().octets()[..octets])?;
        Ok(())
    }
}
