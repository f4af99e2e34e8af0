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

//! Serializer for BGP Update message

use crate::{
    wire::serializer::{
        nlri::Ipv4UnicastWritingError, path_attribute::PathAttributeWritingError,
    },
    BgpUpdateMessage,
};
use byteorder::{NetworkEndian, WriteBytesExt};
use routebench_parse_utils::WritablePdu;

#[derive(Eq, PartialEq, Clone, Debug)]
pub enum BgpUpdateMessageWritingError {
    StdIOError(String),
    Ipv4UnicastError(Ipv4UnicastWritingError),
    PathAttributeError(PathAttributeWritingError),
}

impl From<std::io::Error> for BgpUpdateMessageWritingError {
    fn from(err: std::io::Error) -> Self {
        Self::StdIOError(err.to_string())
    }
}

impl From<Ipv4UnicastWritingError> for BgpUpdateMessageWritingError {
    fn from(err: Ipv4UnicastWritingError) -> Self {
        Self::Ipv4UnicastError(err)
    }
}

impl From<PathAttributeWritingError> for BgpUpdateMessageWritingError {
    fn from(err: PathAttributeWritingError) -> Self {
        Self::PathAttributeError(err)
    }
}

impl WritablePdu<BgpUpdateMessageWritingError> for BgpUpdateMessage {
    /// 2-octet withdrawn routes length + 2-octet path attributes length
    const BASE_LENGTH: usize = 4;

    fn len(&self) -> usize {
        let withdrawn_len = self.withdrawn_routes().iter().map(|w| w.len()).sum::<usize>();
        let path_attrs_len = self.path_attributes().iter().map(|a| a.len()).sum::<usize>();
        let nlri_len = self.nlri().iter().map(|n| n.len()).sum::<usize>();
        Self::BASE_LENGTH + withdrawn_len + path_attrs_len + nlri_len
    }

    fn write<T: std::io::Write>(
        &self,
        writer: &mut T,
    ) -> Result<(), BgpUpdateMessageWritingError> {
        let withdrawn_len = self.withdrawn_routes().iter().map(|w| w.len()).sum::<usize>();
        writer.write_u16::<NetworkEndian>(withdrawn_len as u16)?;
        for withdrawn in self.withdrawn_routes() {
            withdrawn.write(writer)?;
        }
        let attrs_len = self.path_attributes().iter().map(|a| a.len()).sum::<usize>();
        writer.write_u16::<NetworkEndian>(attrs_len as u16)?;
        for attr in self.path_attributes() {
            attr.write(writer)?;
        }
        for nlri in self.nlri() {
            nlri.write(writer)?;
        }
        Ok(())
    }
}
