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

//! Deserializer for BGP Open message

use crate::open::{BgpOpenMessage, BgpOpenMessageParameter};
use nom::{
    error::ErrorKind,
    number::complete::{be_u16, be_u32, be_u8},
    IResult,
};
use routebench_parse_utils::{
    located_from_external, located_parsing_error, parse_till_empty, ReadablePdu, Span,
};
use std::net::Ipv4Addr;

/// BGP version carried in the Open message. Only BGP-4 is supported.
const BGP_VERSION: u8 = 4;

/// BGP Open message parsing errors
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum BgpOpenMessageParsingError {
    /// Errors triggered by the nom parser, see [ErrorKind] for
    /// additional information.
    NomError(ErrorKind),
    UnsupportedVersionNumber(u8),
}

located_parsing_error!(LocatedBgpOpenMessageParsingError, BgpOpenMessageParsingError);

located_from_external!(
    BgpOpenMessageParsingError,
    LocatedBgpOpenMessageParsingError,
    std::convert::identity
);

impl<'a> ReadablePdu<'a, LocatedBgpOpenMessageParsingError<'a>> for BgpOpenMessage {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedBgpOpenMessageParsingError<'a>> {
        let (buf, _) = nom::combinator::map_res(be_u8, |x| {
            if x == BGP_VERSION {
                Ok(x)
            } else {
                Err(BgpOpenMessageParsingError::UnsupportedVersionNumber(x))
            }
        })(buf)?;
        let (buf, my_as) = be_u16(buf)?;
        let (buf, hold_time) = be_u16(buf)?;
        let (buf, bgp_id) = be_u32(buf)?;
        let bgp_id = Ipv4Addr::from(bgp_id);
        let (buf, params_buf) = nom::multi::length_data(be_u8)(buf)?;
        let (_, params) = parse_till_empty(params_buf)?;
        Ok((buf, BgpOpenMessage::new(my_as, hold_time, bgp_id, params)))
    }
}

impl<'a> ReadablePdu<'a, LocatedBgpOpenMessageParsingError<'a>> for BgpOpenMessageParameter {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedBgpOpenMessageParsingError<'a>> {
        let (buf, param_type) = be_u8(buf)?;
        let (buf, value_buf) = nom::multi::length_data(be_u8)(buf)?;
        Ok((
            buf,
            BgpOpenMessageParameter::new(param_type, value_buf.to_vec()),
        ))
    }
}
