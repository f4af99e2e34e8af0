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

//! Wire serde tests for whole BGP messages.

mod path_attribute;

use crate::{
    codec::BGP_MESSAGE_MARKER,
    iana::UndefinedBgpMessageType,
    notification::BgpNotificationMessage,
    open::{BgpOpenMessage, BgpOpenMessageParameter},
    route_refresh::BgpRouteRefreshMessage,
    wire::{
        deserializer::{
            BgpMessageParsingError, BgpParsingContext, LocatedBgpMessageParsingError,
        },
        serializer::BgpMessageWritingError,
    },
    BgpMessage,
};
use routebench_parse_utils::test_helpers::{
    combine, span_at, test_parse_error_with_one_input, test_parsed_completely_with_one_input,
    test_write,
};
use std::net::Ipv4Addr;

#[test]
fn test_keep_alive() -> Result<(), BgpMessageWritingError> {
    let good_wire = combine(vec![&BGP_MESSAGE_MARKER, &[0x00, 0x13, 0x04]]);

    let mut ctx = BgpParsingContext::default();
    test_parsed_completely_with_one_input(&good_wire, &mut ctx, &BgpMessage::KeepAlive);
    test_write(&BgpMessage::KeepAlive, &good_wire)?;
    Ok(())
}

#[test]
fn test_connection_not_synchronized() {
    // first marker octet is zeroed
    let bad_wire = combine(vec![&[0x00; 16], &[0x00, 0x13, 0x04]]);

    let mut ctx = BgpParsingContext::default();
    test_parse_error_with_one_input::<
        &mut BgpParsingContext,
        BgpMessage,
        LocatedBgpMessageParsingError<'_>,
    >(
        &bad_wire,
        &mut ctx,
        &nom::Err::Error(LocatedBgpMessageParsingError::new(
            span_at(0, &bad_wire),
            BgpMessageParsingError::ConnectionNotSynchronized(0),
        )),
    );
}

#[test]
fn test_bad_message_length() {
    // declared length is below the 19-octet minimum
    let bad_wire = combine(vec![&BGP_MESSAGE_MARKER, &[0x00, 0x12, 0x04]]);

    let mut ctx = BgpParsingContext::default();
    test_parse_error_with_one_input::<
        &mut BgpParsingContext,
        BgpMessage,
        LocatedBgpMessageParsingError<'_>,
    >(
        &bad_wire,
        &mut ctx,
        &nom::Err::Error(LocatedBgpMessageParsingError::new(
            span_at(16, &bad_wire[16..]),
            BgpMessageParsingError::BadMessageLength(18),
        )),
    );
}

#[test]
fn test_keep_alive_length_overflow() {
    // KEEPALIVE above the 4096-octet cap, with a body to match
    let mut bad_wire = combine(vec![&BGP_MESSAGE_MARKER, &[0x10, 0x01, 0x04]]);
    bad_wire.resize(4097, 0x00);

    let mut ctx = BgpParsingContext::default();
    test_parse_error_with_one_input::<
        &mut BgpParsingContext,
        BgpMessage,
        LocatedBgpMessageParsingError<'_>,
    >(
        &bad_wire,
        &mut ctx,
        &nom::Err::Error(LocatedBgpMessageParsingError::new(
            span_at(16, &bad_wire[16..]),
            BgpMessageParsingError::BadMessageLength(4097),
        )),
    );
}

#[test]
fn test_undefined_message_type() {
    let bad_wire = combine(vec![&BGP_MESSAGE_MARKER, &[0x00, 0x13, 0x63]]);

    let mut ctx = BgpParsingContext::default();
    test_parse_error_with_one_input::<
        &mut BgpParsingContext,
        BgpMessage,
        LocatedBgpMessageParsingError<'_>,
    >(
        &bad_wire,
        &mut ctx,
        &nom::Err::Error(LocatedBgpMessageParsingError::new(
            span_at(18, &bad_wire[18..19]),
            BgpMessageParsingError::UndefinedBgpMessageType(UndefinedBgpMessageType(0x63)),
        )),
    );
}

#[test]
fn test_open() -> Result<(), BgpMessageWritingError> {
    let good_wire = combine(vec![
        &BGP_MESSAGE_MARKER,
        &[0x00, 0x25, 0x01],
        &[0x04, 0xfc, 0x00, 0x00, 0xb4, 0x0a, 0x00, 0x00, 0x01, 0x08],
        &[0x02, 0x06, 0x41, 0x04, 0x00, 0x00, 0xfc, 0x00],
    ]);

    let expected = BgpMessage::Open(BgpOpenMessage::new(
        64512,
        180,
        Ipv4Addr::new(10, 0, 0, 1),
        vec![BgpOpenMessageParameter::new(
            2,
            vec![0x41, 0x04, 0x00, 0x00, 0xfc, 0x00],
        )],
    ));

    let mut ctx = BgpParsingContext::default();
    let parsed = test_parsed_completely_with_one_input(&good_wire, &mut ctx, &expected);
    match parsed {
        BgpMessage::Open(open) => assert!(open.advertises_four_octet_as()),
        _ => unreachable!(),
    }
    test_write(&expected, &good_wire)?;
    Ok(())
}

#[test]
fn test_notification() -> Result<(), BgpMessageWritingError> {
    // Cease / Administrative Shutdown with two data octets
    let good_wire = combine(vec![
        &BGP_MESSAGE_MARKER,
        &[0x00, 0x17, 0x03],
        &[0x06, 0x02, 0xaa, 0xbb],
    ]);

    let expected =
        BgpMessage::Notification(BgpNotificationMessage::new(6, 2, vec![0xaa, 0xbb]));
    let mut ctx = BgpParsingContext::default();
    test_parsed_completely_with_one_input(&good_wire, &mut ctx, &expected);
    test_write(&expected, &good_wire)?;
    Ok(())
}

#[test]
fn test_route_refresh() -> Result<(), BgpMessageWritingError> {
    let good_wire = combine(vec![
        &BGP_MESSAGE_MARKER,
        &[0x00, 0x17, 0x05],
        &[0x00, 0x01, 0x00, 0x01],
    ]);

    let expected = BgpMessage::RouteRefresh(BgpRouteRefreshMessage::new(1, 0, 1));
    let mut ctx = BgpParsingContext::default();
    test_parsed_completely_with_one_input(&good_wire, &mut ctx, &expected);
    test_write(&expected, &good_wire)?;
    Ok(())
}
