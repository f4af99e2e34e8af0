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

//! Deserializer for BGP NLRI types

use crate::{
    nlri::{InvalidIpv4UnicastNetwork, Ipv4Unicast},
    wire::deserializer::{Ipv4PrefixParsingError, LocatedIpv4PrefixParsingError},
};
use ipnet::Ipv4Net;
use nom::{error::ErrorKind, IResult};
use routebench_parse_utils::{
    located_error_from, located_parsing_error, parse_into_located, ReadablePdu, Span,
};

/// IPv4 unicast NLRI parsing errors
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum Ipv4UnicastParsingError {
    /// Errors triggered by the nom parser, see [ErrorKind] for
    /// additional information.
    NomError(ErrorKind),
    Ipv4PrefixError(Ipv4PrefixParsingError),
    InvalidUnicastNetwork(InvalidIpv4UnicastNetwork),
}

located_parsing_error!(LocatedIpv4UnicastParsingError, Ipv4UnicastParsingError);

located_error_from!(
    LocatedIpv4PrefixParsingError,
    LocatedIpv4UnicastParsingError,
    Ipv4UnicastParsingError::Ipv4PrefixError
);

impl<'a> ReadablePdu<'a, LocatedIpv4UnicastParsingError<'a>> for Ipv4Unicast {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedIpv4UnicastParsingError<'a>> {
        let input = buf;
        let (buf, net) = parse_into_located::<
            LocatedIpv4PrefixParsingError<'_>,
            LocatedIpv4UnicastParsingError<'_>,
            Ipv4Net,
        >(buf)?;
        match Ipv4Unicast::from_net(net) {
            Ok(unicast) => Ok((buf, unicast)),
            Err(err) => Err(nom::Err::Error(LocatedIpv4UnicastParsingError::new(
                input,
                Ipv4UnicastParsingError::InvalidUnicastNetwork(err),
            ))),
        }
    }
}
