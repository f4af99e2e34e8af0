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

//! Serializer for BGP Notification message

use crate::notification::BgpNotificationMessage;
use byteorder::WriteBytesExt;
use routebench_parse_utils::WritablePdu;

#[derive(Eq, PartialEq, Clone, Debug)]
pub enum BgpNotificationMessageWritingError {
    StdIOError(String),
}

impl From<std::io::Error> for BgpNotificationMessageWritingError {
    fn from(err: std::io::Error) -> Self {
        Self::StdIOError(err.to_string())
    }
}

impl WritablePdu<BgpNotificationMessageWritingError> for BgpNotificationMessage {
    /// 1-octet code + 1-octet subcode
    const BASE_LENGTH: usize = 2;

    fn len(&self) -> usize {
        Self::BASE_LENGTH + self.value().len()
    }

    fn write<T: std::io::Write>(
        &self,
        writer: &mut T,
    ) -> Result<(), BgpNotificationMessageWritingError> {
        writer.write_u8(self.code())?;
        writer.write_u8(self.subcode())?;
        writer.write_all(self.value())?;
        Ok(())
    }
}
