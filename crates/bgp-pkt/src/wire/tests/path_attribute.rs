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

//! Wire serde tests for BGP path attributes.

use crate::{
    path_attribute::{
        As2PathSegment, As4PathSegment, AsPath, AsPathSegmentType, AtomicAggregate,
        InvalidPathAttribute, LocalPreference, MultiExitDiscriminator, NextHop, Origin,
        PathAttribute, PathAttributeLength, PathAttributeValue, UndefinedOrigin,
        UnknownAttribute,
    },
    wire::{
        deserializer::path_attribute::{
            AsPathParsingError, LocatedPathAttributeParsingError, OriginParsingError,
            PathAttributeParsingError,
        },
        serializer::path_attribute::PathAttributeWritingError,
    },
};
use routebench_parse_utils::test_helpers::{
    span_at, test_parse_error_with_one_input, test_parsed_completely_with_one_input, test_write,
};
use std::net::Ipv4Addr;

#[test]
fn test_origin() -> Result<(), PathAttributeWritingError> {
    let good_wire = [0x40, 0x01, 0x01, 0x00];

    let expected = PathAttribute::from(
        false,
        true,
        false,
        false,
        PathAttributeValue::Origin(Origin::IGP),
    )
    .unwrap();
    test_parsed_completely_with_one_input(&good_wire, false, &expected);
    test_write(&expected, &good_wire)?;
    Ok(())
}

#[test]
fn test_origin_extended_length() -> Result<(), PathAttributeWritingError> {
    let good_wire = [0x50, 0x01, 0x00, 0x01, 0x02];

    let expected = PathAttribute::from(
        false,
        true,
        false,
        true,
        PathAttributeValue::Origin(Origin::Incomplete),
    )
    .unwrap();
    test_parsed_completely_with_one_input(&good_wire, false, &expected);
    test_write(&expected, &good_wire)?;
    Ok(())
}

#[test]
fn test_origin_undefined_value() {
    let bad_wire = [0x40, 0x01, 0x01, 0x09];

    test_parse_error_with_one_input::<bool, PathAttribute, LocatedPathAttributeParsingError<'_>>(
        &bad_wire,
        false,
        &nom::Err::Error(LocatedPathAttributeParsingError::new(
            span_at(3, &bad_wire[3..]),
            PathAttributeParsingError::OriginError(OriginParsingError::UndefinedOrigin(
                UndefinedOrigin(9),
            )),
        )),
    );
}

#[test]
fn test_origin_invalid_length() {
    let bad_wire = [0x40, 0x01, 0x02, 0x00, 0x00];

    test_parse_error_with_one_input::<bool, PathAttribute, LocatedPathAttributeParsingError<'_>>(
        &bad_wire,
        false,
        &nom::Err::Error(LocatedPathAttributeParsingError::new(
            span_at(2, &bad_wire[2..]),
            PathAttributeParsingError::OriginError(OriginParsingError::InvalidOriginLength(
                PathAttributeLength::U8(2),
            )),
        )),
    );
}

#[test]
fn test_origin_invalid_flags() {
    // ORIGIN is well-known, the optional flag must not be set
    let bad_wire = [0xc0, 0x01, 0x01, 0x00];

    test_parse_error_with_one_input::<bool, PathAttribute, LocatedPathAttributeParsingError<'_>>(
        &bad_wire,
        false,
        &nom::Err::Error(LocatedPathAttributeParsingError::new(
            span_at(4, &bad_wire[4..]),
            PathAttributeParsingError::InvalidPathAttribute(
                InvalidPathAttribute::InvalidOptionalFlagValue(true),
                PathAttributeValue::Origin(Origin::IGP),
            ),
        )),
    );
}

#[test]
fn test_as2_path() -> Result<(), PathAttributeWritingError> {
    let good_wire = [0x40, 0x02, 0x06, 0x02, 0x02, 0xfc, 0x00, 0xfc, 0x01];

    let expected = PathAttribute::from(
        false,
        true,
        false,
        false,
        PathAttributeValue::AsPath(AsPath::As2PathSegments(vec![As2PathSegment::new(
            AsPathSegmentType::AsSequence,
            vec![64512, 64513],
        )])),
    )
    .unwrap();
    test_parsed_completely_with_one_input(&good_wire, false, &expected);
    test_write(&expected, &good_wire)?;
    Ok(())
}

#[test]
fn test_as4_path() -> Result<(), PathAttributeWritingError> {
    let good_wire = [
        0x40, 0x02, 0x0a, 0x02, 0x02, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00,
    ];

    let expected = PathAttribute::from(
        false,
        true,
        false,
        false,
        PathAttributeValue::AsPath(AsPath::As4PathSegments(vec![As4PathSegment::new(
            AsPathSegmentType::AsSequence,
            vec![65536, 131072],
        )])),
    )
    .unwrap();
    test_parsed_completely_with_one_input(&good_wire, true, &expected);
    test_write(&expected, &good_wire)?;
    Ok(())
}

#[test]
fn test_empty_as_path() -> Result<(), PathAttributeWritingError> {
    // locally originated route, the AS_PATH is present but empty
    let good_wire = [0x40, 0x02, 0x00];

    let expected = PathAttribute::from(
        false,
        true,
        false,
        false,
        PathAttributeValue::AsPath(AsPath::As2PathSegments(vec![])),
    )
    .unwrap();
    test_parsed_completely_with_one_input(&good_wire, false, &expected);
    test_write(&expected, &good_wire)?;
    Ok(())
}

#[test]
fn test_as_path_zero_segment_length() {
    let bad_wire = [0x40, 0x02, 0x02, 0x02, 0x00];

    test_parse_error_with_one_input::<bool, PathAttribute, LocatedPathAttributeParsingError<'_>>(
        &bad_wire,
        false,
        &nom::Err::Error(LocatedPathAttributeParsingError::new(
            span_at(4, &bad_wire[4..]),
            PathAttributeParsingError::AsPathError(AsPathParsingError::ZeroSegmentLength),
        )),
    );
}

#[test]
fn test_as_path_truncated_segment() {
    // segment claims two AS numbers but carries only one
    let bad_wire = [0x40, 0x02, 0x04, 0x02, 0x02, 0xfc, 0x00];

    test_parse_error_with_one_input::<bool, PathAttribute, LocatedPathAttributeParsingError<'_>>(
        &bad_wire,
        false,
        &nom::Err::Error(LocatedPathAttributeParsingError::new(
            span_at(5, &bad_wire[5..]),
            PathAttributeParsingError::AsPathError(AsPathParsingError::InvalidAsPathLength {
                expecting: 4,
                found: 2,
            }),
        )),
    );
}

#[test]
fn test_next_hop() -> Result<(), PathAttributeWritingError> {
    let good_wire = [0x40, 0x03, 0x04, 0x0a, 0x00, 0x00, 0x01];

    let expected = PathAttribute::from(
        false,
        true,
        false,
        false,
        PathAttributeValue::NextHop(NextHop::new(Ipv4Addr::new(10, 0, 0, 1))),
    )
    .unwrap();
    test_parsed_completely_with_one_input(&good_wire, false, &expected);
    test_write(&expected, &good_wire)?;
    Ok(())
}

#[test]
fn test_multi_exit_discriminator() -> Result<(), PathAttributeWritingError> {
    let good_wire = [0x80, 0x04, 0x04, 0x00, 0x00, 0x00, 0x64];

    let expected = PathAttribute::from(
        true,
        false,
        false,
        false,
        PathAttributeValue::MultiExitDiscriminator(MultiExitDiscriminator::new(100)),
    )
    .unwrap();
    test_parsed_completely_with_one_input(&good_wire, false, &expected);
    test_write(&expected, &good_wire)?;
    Ok(())
}

#[test]
fn test_local_preference() -> Result<(), PathAttributeWritingError> {
    let good_wire = [0x40, 0x05, 0x04, 0x00, 0x00, 0x00, 0x64];

    let expected = PathAttribute::from(
        false,
        true,
        false,
        false,
        PathAttributeValue::LocalPreference(LocalPreference::new(100)),
    )
    .unwrap();
    test_parsed_completely_with_one_input(&good_wire, false, &expected);
    test_write(&expected, &good_wire)?;
    Ok(())
}

#[test]
fn test_atomic_aggregate() -> Result<(), PathAttributeWritingError> {
    let good_wire = [0x40, 0x06, 0x00];

    let expected = PathAttribute::from(
        false,
        true,
        false,
        false,
        PathAttributeValue::AtomicAggregate(AtomicAggregate),
    )
    .unwrap();
    test_parsed_completely_with_one_input(&good_wire, false, &expected);
    test_write(&expected, &good_wire)?;
    Ok(())
}

#[test]
fn test_unmodeled_attribute_carried_raw() -> Result<(), PathAttributeWritingError> {
    // AGGREGATOR is a recognized code but not modeled, carried raw
    let good_wire = [0xc0, 0x07, 0x06, 0xfc, 0x00, 0x0a, 0x00, 0x00, 0x01];

    let expected = PathAttribute::from(
        true,
        true,
        false,
        false,
        PathAttributeValue::UnknownAttribute(UnknownAttribute::new(
            7,
            vec![0xfc, 0x00, 0x0a, 0x00, 0x00, 0x01],
        )),
    )
    .unwrap();
    test_parsed_completely_with_one_input(&good_wire, false, &expected);
    test_write(&expected, &good_wire)?;
    Ok(())
}

#[test]
fn test_undefined_attribute_carried_raw() -> Result<(), PathAttributeWritingError> {
    let good_wire = [0xc0, 0x63, 0x02, 0xaa, 0xbb];

    let expected = PathAttribute::from(
        true,
        true,
        false,
        false,
        PathAttributeValue::UnknownAttribute(UnknownAttribute::new(0x63, vec![0xaa, 0xbb])),
    )
    .unwrap();
    test_parsed_completely_with_one_input(&good_wire, false, &expected);
    test_write(&expected, &good_wire)?;
    Ok(())
}
