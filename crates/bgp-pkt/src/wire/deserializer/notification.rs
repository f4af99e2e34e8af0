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

//! Deserializer for BGP Notification message

use crate::notification::BgpNotificationMessage;
use nom::{error::ErrorKind, number::complete::be_u8, IResult};
use routebench_parse_utils::{located_parsing_error, ReadablePdu, Span};

/// BGP Notification message parsing errors
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum BgpNotificationMessageParsingError {
    /// Errors triggered by the nom parser, see [ErrorKind] for
    /// additional information.
    NomError(ErrorKind),
}

located_parsing_error!(
    LocatedBgpNotificationMessageParsingError,
    BgpNotificationMessageParsingError
);

impl<'a> ReadablePdu<'a, LocatedBgpNotificationMessageParsingError<'a>> for BgpNotificationMessage {
    fn from_wire(
        buf: Span<'a>,
    ) -> IResult<Span<'a>, Self, LocatedBgpNotificationMessageParsingError<'a>> {
        let (buf, code) = be_u8(buf)?;
        let (buf, subcode) = be_u8(buf)?;
        let (buf, value) = nom::combinator::rest(buf)?;
        Ok((
            buf,
            BgpNotificationMessage::new(code, subcode, value.to_vec()),
        ))
    }
}
