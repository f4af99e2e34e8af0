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

//! Deserializer for BGP Update message

use crate::{
    wire::deserializer::{
        nlri::{Ipv4UnicastParsingError, LocatedIpv4UnicastParsingError},
        path_attribute::{LocatedPathAttributeParsingError, PathAttributeParsingError},
    },
    BgpUpdateMessage,
};
use nom::{error::ErrorKind, number::complete::be_u16, IResult};
use routebench_parse_utils::{
    located_error_from, located_parsing_error, parse_till_empty_into_located,
    parse_till_empty_into_with_one_input_located, ReadablePduWithOneInput, Span,
};

/// BGP Update message parsing errors
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum BgpUpdateMessageParsingError {
    /// Errors triggered by the nom parser, see [ErrorKind] for
    /// additional information.
    NomError(ErrorKind),
    PathAttributeError(PathAttributeParsingError),
    Ipv4UnicastError(Ipv4UnicastParsingError),
}

located_parsing_error!(
    LocatedBgpUpdateMessageParsingError,
    BgpUpdateMessageParsingError
);

located_error_from!(
    LocatedPathAttributeParsingError,
    LocatedBgpUpdateMessageParsingError,
    BgpUpdateMessageParsingError::PathAttributeError
);
located_error_from!(
    LocatedIpv4UnicastParsingError,
    LocatedBgpUpdateMessageParsingError,
    BgpUpdateMessageParsingError::Ipv4UnicastError
);

impl<'a> ReadablePduWithOneInput<'a, bool, LocatedBgpUpdateMessageParsingError<'a>>
    for BgpUpdateMessage
{
    fn from_wire(
        buf: Span<'a>,
        asn4: bool,
    ) -> IResult<Span<'a>, Self, LocatedBgpUpdateMessageParsingError<'a>> {
        let (buf, withdrawn_buf) = nom::multi::length_data(be_u16)(buf)?;
        let (_, withdrawn_routes) = parse_till_empty_into_located(withdrawn_buf)?;
        let (buf, path_attributes_buf) = nom::multi::length_data(be_u16)(buf)?;
        let (_, path_attributes) =
            parse_till_empty_into_with_one_input_located(path_attributes_buf, asn4)?;
        let (buf, nlri_vec) = parse_till_empty_into_located(buf)?;
        Ok((
            buf,
            BgpUpdateMessage::new(withdrawn_routes, path_attributes, nlri_vec),
        ))
    }
}
