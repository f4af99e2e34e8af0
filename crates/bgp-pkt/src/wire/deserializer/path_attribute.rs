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

//! Deserializer for BGP Path Attributes

use crate::{
    iana::{PathAttributeType, UndefinedPathAttributeType},
    path_attribute::*,
};
use nom::{
    error::ErrorKind,
    number::complete::{be_u16, be_u32, be_u8},
    IResult,
};
use routebench_parse_utils::{
    located_error_from, located_from_external, located_parsing_error, parse_into_located_one_input,
    parse_into_located_two_inputs, parse_till_empty, ReadablePdu, ReadablePduWithOneInput,
    ReadablePduWithTwoInputs, Span,
};
use std::net::Ipv4Addr;

const OPTIONAL_PATH_ATTRIBUTE_MASK: u8 = 0x80;
const TRANSITIVE_PATH_ATTRIBUTE_MASK: u8 = 0x40;
const PARTIAL_PATH_ATTRIBUTE_MASK: u8 = 0x20;
const EXTENDED_LENGTH_PATH_ATTRIBUTE_MASK: u8 = 0x10;
const ORIGIN_LEN: u16 = 1;
const NEXT_HOP_LEN: u16 = 4;
const MULTI_EXIT_DISCRIMINATOR_LEN: u16 = 4;
const LOCAL_PREFERENCE_LEN: u16 = 4;
const ATOMIC_AGGREGATE_LEN: u16 = 0;

#[inline]
const fn check_length(attr_len: PathAttributeLength, expected: u16) -> bool {
    match attr_len {
        PathAttributeLength::U8(len) => len as u16 == expected,
        PathAttributeLength::U16(len) => len == expected,
    }
}

/// BGP Path Attribute parsing errors
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum PathAttributeParsingError {
    /// Errors triggered by the nom parser, see [ErrorKind] for
    /// additional information.
    NomError(ErrorKind),
    OriginError(OriginParsingError),
    AsPathError(AsPathParsingError),
    NextHopError(NextHopParsingError),
    MultiExitDiscriminatorError(MultiExitDiscriminatorParsingError),
    LocalPreferenceError(LocalPreferenceParsingError),
    AtomicAggregateError(AtomicAggregateParsingError),
    UnknownAttributeError(UnknownAttributeParsingError),
    InvalidPathAttribute(InvalidPathAttribute, PathAttributeValue),
}

located_parsing_error!(LocatedPathAttributeParsingError, PathAttributeParsingError);

located_error_from!(
    LocatedOriginParsingError,
    LocatedPathAttributeParsingError,
    PathAttributeParsingError::OriginError
);
located_error_from!(
    LocatedAsPathParsingError,
    LocatedPathAttributeParsingError,
    PathAttributeParsingError::AsPathError
);
located_error_from!(
    LocatedNextHopParsingError,
    LocatedPathAttributeParsingError,
    PathAttributeParsingError::NextHopError
);
located_error_from!(
    LocatedMultiExitDiscriminatorParsingError,
    LocatedPathAttributeParsingError,
    PathAttributeParsingError::MultiExitDiscriminatorError
);
located_error_from!(
    LocatedLocalPreferenceParsingError,
    LocatedPathAttributeParsingError,
    PathAttributeParsingError::LocalPreferenceError
);
located_error_from!(
    LocatedAtomicAggregateParsingError,
    LocatedPathAttributeParsingError,
    PathAttributeParsingError::AtomicAggregateError
);
located_error_from!(
    LocatedUnknownAttributeParsingError,
    LocatedPathAttributeParsingError,
    PathAttributeParsingError::UnknownAttributeError
);

impl<'a> ReadablePduWithOneInput<'a, bool, LocatedPathAttributeParsingError<'a>> for PathAttribute {
    fn from_wire(
        buf: Span<'a>,
        asn4: bool,
    ) -> IResult<Span<'a>, Self, LocatedPathAttributeParsingError<'a>> {
        let (buf, attributes) = be_u8(buf)?;
        let buf_before_code = buf;
        let (buf, code) = be_u8(buf)?;
        let optional = attributes & OPTIONAL_PATH_ATTRIBUTE_MASK == OPTIONAL_PATH_ATTRIBUTE_MASK;
        let transitive =
            attributes & TRANSITIVE_PATH_ATTRIBUTE_MASK == TRANSITIVE_PATH_ATTRIBUTE_MASK;
        let partial = attributes & PARTIAL_PATH_ATTRIBUTE_MASK == PARTIAL_PATH_ATTRIBUTE_MASK;
        let extended_length =
            attributes & EXTENDED_LENGTH_PATH_ATTRIBUTE_MASK == EXTENDED_LENGTH_PATH_ATTRIBUTE_MASK;
        let (buf, value) = match PathAttributeType::try_from(code) {
            Ok(PathAttributeType::Origin) => {
                let (buf, value) = parse_into_located_one_input(buf, extended_length)?;
                (buf, PathAttributeValue::Origin(value))
            }
            Ok(PathAttributeType::AsPath) => {
                let (buf, value) = parse_into_located_two_inputs(buf, extended_length, asn4)?;
                (buf, PathAttributeValue::AsPath(value))
            }
            Ok(PathAttributeType::NextHop) => {
                let (buf, value) = parse_into_located_one_input(buf, extended_length)?;
                (buf, PathAttributeValue::NextHop(value))
            }
            Ok(PathAttributeType::MultiExitDiscriminator) => {
                let (buf, value) = parse_into_located_one_input(buf, extended_length)?;
                (buf, PathAttributeValue::MultiExitDiscriminator(value))
            }
            Ok(PathAttributeType::LocalPreference) => {
                let (buf, value) = parse_into_located_one_input(buf, extended_length)?;
                (buf, PathAttributeValue::LocalPreference(value))
            }
            Ok(PathAttributeType::AtomicAggregate) => {
                let (buf, value) = parse_into_located_one_input(buf, extended_length)?;
                (buf, PathAttributeValue::AtomicAggregate(value))
            }
            // Recognized but unmodeled types are carried raw, starting over
            // from the code octet
            Ok(_code) => {
                let (buf, value) = parse_into_located_one_input(buf_before_code, extended_length)?;
                (buf, PathAttributeValue::UnknownAttribute(value))
            }
            Err(UndefinedPathAttributeType(_code)) => {
                let (buf, value) = parse_into_located_one_input(buf_before_code, extended_length)?;
                (buf, PathAttributeValue::UnknownAttribute(value))
            }
        };
        let attr = match PathAttribute::from(optional, transitive, partial, extended_length, value)
        {
            Ok(attr) => attr,
            Err((value, err)) => {
                return Err(nom::Err::Error(LocatedPathAttributeParsingError::new(
                    buf,
                    PathAttributeParsingError::InvalidPathAttribute(err, value),
                )));
            }
        };
        Ok((buf, attr))
    }
}

#[derive(Eq, PartialEq, Clone, Debug)]
pub enum OriginParsingError {
    /// Errors triggered by the nom parser, see [ErrorKind] for
    /// additional information.
    NomError(ErrorKind),
    InvalidOriginLength(PathAttributeLength),
    UndefinedOrigin(UndefinedOrigin),
}

located_parsing_error!(LocatedOriginParsingError, OriginParsingError);

located_from_external!(
    UndefinedOrigin,
    LocatedOriginParsingError,
    OriginParsingError::UndefinedOrigin
);

impl<'a> ReadablePduWithOneInput<'a, bool, LocatedOriginParsingError<'a>> for Origin {
    fn from_wire(
        buf: Span<'a>,
        extended_length: bool,
    ) -> IResult<Span<'a>, Self, LocatedOriginParsingError<'a>> {
        let input = buf;
        let (buf, length) = parse_attribute_length(buf, extended_length)?;
        if !check_length(length, ORIGIN_LEN) {
            return Err(nom::Err::Error(LocatedOriginParsingError::new(
                input,
                OriginParsingError::InvalidOriginLength(length),
            )));
        }
        let (buf, origin) = nom::combinator::map_res(be_u8, Origin::try_from)(buf)?;
        Ok((buf, origin))
    }
}

#[derive(Eq, PartialEq, Clone, Debug)]
pub enum AsPathParsingError {
    /// Errors triggered by the nom parser, see [ErrorKind] for
    /// additional information.
    NomError(ErrorKind),
    /// RFC 7606: An AS_PATH is considered malformed, if it has a Path Segment
    /// Length field of zero.
    ZeroSegmentLength,
    InvalidAsPathLength {
        expecting: usize,
        found: usize,
    },
    UndefinedAsPathSegmentType(UndefinedAsPathSegmentType),
}

located_parsing_error!(LocatedAsPathParsingError, AsPathParsingError);

located_from_external!(
    UndefinedAsPathSegmentType,
    LocatedAsPathParsingError,
    AsPathParsingError::UndefinedAsPathSegmentType
);

impl<'a> ReadablePduWithTwoInputs<'a, bool, bool, LocatedAsPathParsingError<'a>> for AsPath {
    fn from_wire(
        buf: Span<'a>,
        extended_length: bool,
        asn4: bool,
    ) -> IResult<Span<'a>, Self, LocatedAsPathParsingError<'a>> {
        let (buf, segments_buf) = if extended_length {
            nom::multi::length_data(be_u16)(buf)?
        } else {
            nom::multi::length_data(be_u8)(buf)?
        };
        if asn4 {
            let (_, segments) = parse_till_empty(segments_buf)?;
            Ok((buf, Self::As4PathSegments(segments)))
        } else {
            let (_, segments) = parse_till_empty(segments_buf)?;
            Ok((buf, Self::As2PathSegments(segments)))
        }
    }
}

impl<'a> ReadablePdu<'a, LocatedAsPathParsingError<'a>> for As2PathSegment {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedAsPathParsingError<'a>> {
        let (buf, segment_type) =
            nom::combinator::map_res(be_u8, AsPathSegmentType::try_from)(buf)?;
        let before = buf;
        let (buf, count) = be_u8(buf)?;
        if count == 0 {
            return Err(nom::Err::Error(LocatedAsPathParsingError::new(
                before,
                AsPathParsingError::ZeroSegmentLength,
            )));
        }
        let count = count as usize;
        let expecting = count * 2;
        if buf.len() < expecting {
            return Err(nom::Err::Error(LocatedAsPathParsingError::new(
                buf,
                AsPathParsingError::InvalidAsPathLength {
                    expecting,
                    found: buf.len(),
                },
            )));
        }
        let (buf, as_numbers) = nom::multi::many_m_n(count, count, be_u16)(buf)?;
        Ok((buf, As2PathSegment::new(segment_type, as_numbers)))
    }
}

impl<'a> ReadablePdu<'a, LocatedAsPathParsingError<'a>> for As4PathSegment {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedAsPathParsingError<'a>> {
        let (buf, segment_type) =
            nom::combinator::map_res(be_u8, AsPathSegmentType::try_from)(buf)?;
        let before = buf;
        let (buf, count) = be_u8(buf)?;
        if count == 0 {
            return Err(nom::Err::Error(LocatedAsPathParsingError::new(
                before,
                AsPathParsingError::ZeroSegmentLength,
            )));
        }
        let count = count as usize;
        let expecting = count * 4;
        if buf.len() < expecting {
            return Err(nom::Err::Error(LocatedAsPathParsingError::new(
                buf,
                AsPathParsingError::InvalidAsPathLength {
                    expecting,
                    found: buf.len(),
                },
            )));
        }
        let (buf, as_numbers) = nom::multi::many_m_n(count, count, be_u32)(buf)?;
        Ok((buf, As4PathSegment::new(segment_type, as_numbers)))
    }
}

#[derive(Eq, PartialEq, Clone, Debug)]
pub enum NextHopParsingError {
    /// Errors triggered by the nom parser, see [ErrorKind] for
    /// additional information.
    NomError(ErrorKind),
    InvalidNextHopLength(PathAttributeLength),
}

located_parsing_error!(LocatedNextHopParsingError, NextHopParsingError);

impl<'a> ReadablePduWithOneInput<'a, bool, LocatedNextHopParsingError<'a>> for NextHop {
    fn from_wire(
        buf: Span<'a>,
        extended_length: bool,
    ) -> IResult<Span<'a>, Self, LocatedNextHopParsingError<'a>> {
        let input = buf;
        let (buf, length) = parse_attribute_length(buf, extended_length)?;
        if !check_length(length, NEXT_HOP_LEN) {
            return Err(nom::Err::Error(LocatedNextHopParsingError::new(
                input,
                NextHopParsingError::InvalidNextHopLength(length),
            )));
        }
        let (buf, address) = be_u32(buf)?;
        Ok((buf, NextHop::new(Ipv4Addr::from(address))))
    }
}

#[derive(Eq, PartialEq, Clone, Debug)]
pub enum MultiExitDiscriminatorParsingError {
    /// Errors triggered by the nom parser, see [ErrorKind] for
    /// additional information.
    NomError(ErrorKind),
    InvalidLength(PathAttributeLength),
}

located_parsing_error!(
    LocatedMultiExitDiscriminatorParsingError,
    MultiExitDiscriminatorParsingError
);

impl<'a> ReadablePduWithOneInput<'a, bool, LocatedMultiExitDiscriminatorParsingError<'a>>
    for MultiExitDiscriminator
{
    fn from_wire(
        buf: Span<'a>,
        extended_length: bool,
    ) -> IResult<Span<'a>, Self, LocatedMultiExitDiscriminatorParsingError<'a>> {
        let input = buf;
        let (buf, length) = parse_attribute_length(buf, extended_length)?;
        if !check_length(length, MULTI_EXIT_DISCRIMINATOR_LEN) {
            return Err(nom::Err::Error(
                LocatedMultiExitDiscriminatorParsingError::new(
                    input,
                    MultiExitDiscriminatorParsingError::InvalidLength(length),
                ),
            ));
        }
        let (buf, metric) = be_u32(buf)?;
        Ok((buf, MultiExitDiscriminator::new(metric)))
    }
}

#[derive(Eq, PartialEq, Clone, Debug)]
pub enum LocalPreferenceParsingError {
    /// Errors triggered by the nom parser, see [ErrorKind] for
    /// additional information.
    NomError(ErrorKind),
    InvalidLength(PathAttributeLength),
}

located_parsing_error!(LocatedLocalPreferenceParsingError, LocalPreferenceParsingError);

impl<'a> ReadablePduWithOneInput<'a, bool, LocatedLocalPreferenceParsingError<'a>>
    for LocalPreference
{
    fn from_wire(
        buf: Span<'a>,
        extended_length: bool,
    ) -> IResult<Span<'a>, Self, LocatedLocalPreferenceParsingError<'a>> {
        let input = buf;
        let (buf, length) = parse_attribute_length(buf, extended_length)?;
        if !check_length(length, LOCAL_PREFERENCE_LEN) {
            return Err(nom::Err::Error(LocatedLocalPreferenceParsingError::new(
                input,
                LocalPreferenceParsingError::InvalidLength(length),
            )));
        }
        let (buf, pref) = be_u32(buf)?;
        Ok((buf, LocalPreference::new(pref)))
    }
}

#[derive(Eq, PartialEq, Clone, Debug)]
pub enum AtomicAggregateParsingError {
    /// Errors triggered by the nom parser, see [ErrorKind] for
    /// additional information.
    NomError(ErrorKind),
    InvalidLength(PathAttributeLength),
}

located_parsing_error!(LocatedAtomicAggregateParsingError, AtomicAggregateParsingError);

impl<'a> ReadablePduWithOneInput<'a, bool, LocatedAtomicAggregateParsingError<'a>>
    for AtomicAggregate
{
    fn from_wire(
        buf: Span<'a>,
        extended_length: bool,
    ) -> IResult<Span<'a>, Self, LocatedAtomicAggregateParsingError<'a>> {
        let input = buf;
        let (buf, length) = parse_attribute_length(buf, extended_length)?;
        if !check_length(length, ATOMIC_AGGREGATE_LEN) {
            return Err(nom::Err::Error(LocatedAtomicAggregateParsingError::new(
                input,
                AtomicAggregateParsingError::InvalidLength(length),
            )));
        }
        Ok((buf, AtomicAggregate))
    }
}

#[derive(Eq, PartialEq, Clone, Debug)]
pub enum UnknownAttributeParsingError {
    /// Errors triggered by the nom parser, see [ErrorKind] for
    /// additional information.
    NomError(ErrorKind),
}

located_parsing_error!(LocatedUnknownAttributeParsingError, UnknownAttributeParsingError);

/// The buffer starts over at the attribute code octet so the raw value
/// keeps the code it was carried with.
impl<'a> ReadablePduWithOneInput<'a, bool, LocatedUnknownAttributeParsingError<'a>>
    for UnknownAttribute
{
    fn from_wire(
        buf: Span<'a>,
        extended_length: bool,
    ) -> IResult<Span<'a>, Self, LocatedUnknownAttributeParsingError<'a>> {
        let (buf, code) = be_u8(buf)?;
        let (buf, value_buf) = if extended_length {
            nom::multi::length_data(be_u16)(buf)?
        } else {
            nom::multi::length_data(be_u8)(buf)?
        };
        Ok((buf, UnknownAttribute::new(code, value_buf.to_vec())))
    }
}

#[inline]
fn parse_attribute_length<'a, E: nom::error::ParseError<Span<'a>>>(
    buf: Span<'a>,
    extended_length: bool,
) -> IResult<Span<'a>, PathAttributeLength, E> {
    if extended_length {
        let (buf, raw) = be_u16(buf)?;
        Ok((buf, PathAttributeLength::U16(raw)))
    } else {
        let (buf, raw) = be_u8(buf)?;
        Ok((buf, PathAttributeLength::U8(raw)))
    }
}
