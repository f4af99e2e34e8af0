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

//! Serializer for BGP Open message

use crate::open::{BgpOpenMessage, BgpOpenMessageParameter};
use byteorder::{NetworkEndian, WriteBytesExt};
use routebench_parse_utils::WritablePdu;

#[derive(Eq, PartialEq, Clone, Debug)]
pub enum BgpOpenMessageWritingError {
    StdIOError(String),
}

impl From<std::io::Error> for BgpOpenMessageWritingError {
    fn from(err: std::io::Error) -> Self {
        Self::StdIOError(err.to_string())
    }
}

impl WritablePdu<BgpOpenMessageWritingError> for BgpOpenMessage {
    /// 1-octet version + 2-octet AS + 2-octet hold time + 4-octet BGP ID
    /// + 1-octet optional parameters length
    const BASE_LENGTH: usize = 10;

    fn len(&self) -> usize {
        Self::BASE_LENGTH + self.params().iter().map(|p| p.len()).sum::<usize>()
    }

    fn write<T: std::io::Write>(&self, writer: &mut T) -> Result<(), BgpOpenMessageWritingError> {
        writer.write_u8(4)?;
        writer.write_u16::<NetworkEndian>(self.my_as())?;
        writer.write_u16::<NetworkEndian>(self.hold_time())?;
        writer.write_all(&self.bgp_id().octets())?;
        let params_len = self.params().iter().map(|p| p.len()).sum::<usize>();
        writer.write_u8(params_len as u8)?;
        for param in self.params() {
            param.write(writer)?;
        }
        Ok(())
    }
}

impl WritablePdu<BgpOpenMessageWritingError> for BgpOpenMessageParameter {
    /// 1-octet type + 1-octet length
    const BASE_LENGTH: usize = 2;

    fn len(&self) -> usize {
        Self::BASE_LENGTH + self.value().len()
    }

    fn write<T: std::io::Write>(&self, writer: &mut T) -> Result<(), BgpOpenMessageWritingError> {
        writer.write_u8(self.param_type())?;
        writer.write_u8(self.value().len() as u8)?;
        writer.write_all(self.value())?;
        Ok(())
    }
}
