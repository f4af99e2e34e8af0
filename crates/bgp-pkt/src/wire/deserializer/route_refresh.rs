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

//! Deserializer for BGP Route Refresh message

use crate::route_refresh::BgpRouteRefreshMessage;
use nom::{
    error::ErrorKind,
    number::complete::{be_u16, be_u8},
    IResult,
};
use routebench_parse_utils::{located_parsing_error, ReadablePdu, Span};

/// BGP Route Refresh message parsing errors
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum BgpRouteRefreshMessageParsingError {
    /// Errors triggered by the nom parser, see [ErrorKind] for
    /// additional information.
    NomError(ErrorKind),
}

located_parsing_error!(
    LocatedBgpRouteRefreshMessageParsingError,
    BgpRouteRefreshMessageParsingError
);

impl<'a> ReadablePdu<'a, LocatedBgpRouteRefreshMessageParsingError<'a>> for BgpRouteRefreshMessage {
    fn from_wire(
        buf: Span<'a>,
    ) -> IResult<Span<'a>, Self, LocatedBgpRouteRefreshMessageParsingError<'a>> {
        let (buf, afi) = be_u16(buf)?;
        let (buf, op) = be_u8(buf)?;
        let (buf, safi) = be_u8(buf)?;
        Ok((buf, BgpRouteRefreshMessage::new(afi, op, safi)))
    }
}
