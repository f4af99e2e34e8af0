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

//! Deserializer library for BGP's wire protocol

pub mod nlri;
pub mod notification;
pub mod open;
pub mod path_attribute;
pub mod route_refresh;
pub mod update;

use ipnet::Ipv4Net;
use nom::{
    error::ErrorKind,
    number::complete::{be_u128, be_u16, be_u8},
    IResult,
};
use std::net::Ipv4Addr;

use routebench_parse_utils::{
    located_error_from, located_from_external, located_parsing_error, parse_into_located,
    parse_into_located_one_input, ReadablePdu, ReadablePduWithOneInput, ReadablePduWithTwoInputs,
    Span,
};

use crate::{
    iana::{BgpMessageType, UndefinedBgpMessageType},
    wire::deserializer::{
        notification::{
            BgpNotificationMessageParsingError, LocatedBgpNotificationMessageParsingError,
        },
        open::{BgpOpenMessageParsingError, LocatedBgpOpenMessageParsingError},
        route_refresh::{
            BgpRouteRefreshMessageParsingError, LocatedBgpRouteRefreshMessageParsingError,
        },
        update::{BgpUpdateMessageParsingError, LocatedBgpUpdateMessageParsingError},
    },
    BgpMessage,
};

/// Min message size in BGP is 19 octets. They're counted from the 16-octet
/// synchronization marker, 2-octet length, and 1 octet for type.
pub const BGP_MIN_MESSAGE_LENGTH: u16 = 19;

/// [RFC4271](https://datatracker.ietf.org/doc/html/rfc4271) defined max length as 4096.
/// *Note*, this only applies to [`BgpMessage::Open`] and
/// [`BgpMessage::KeepAlive`] according to the updated
/// [RFC8654 Extended Message Support for BGP](https://datatracker.ietf.org/doc/html/rfc8654)
pub const BGP_MAX_MESSAGE_LENGTH: u16 = 4096;

/// Per-session state the parser needs: whether the speakers negotiated
/// four-octet AS numbers, which changes the wire format of `AS_PATH`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BgpParsingContext {
    asn4: bool,
}

impl BgpParsingContext {
    pub const fn new(asn4: bool) -> Self {
        Self { asn4 }
    }

    pub const fn asn4(&self) -> bool {
        self.asn4
    }

    pub fn set_asn4(&mut self, value: bool) {
        self.asn4 = value
    }
}

impl Default for BgpParsingContext {
    fn default() -> Self {
        Self::new(false)
    }
}

/// IPv4 prefix parsing errors
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum Ipv4PrefixParsingError {
    /// Errors triggered by the nom parser, see [ErrorKind] for
    /// additional information.
    NomError(ErrorKind),
    InvalidIpv4PrefixLen(u8),
}

located_parsing_error!(LocatedIpv4PrefixParsingError, Ipv4PrefixParsingError);

impl<'a> ReadablePdu<'a, LocatedIpv4PrefixParsingError<'a>> for Ipv4Net {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, LocatedIpv4PrefixParsingError<'a>> {
        let input = buf;
        let (buf, prefix_len) = be_u8(buf)?;
        <Self as ReadablePduWithTwoInputs<u8, Span<'_>, LocatedIpv4PrefixParsingError<'_>>>::from_wire(
            buf, prefix_len, input,
        )
    }
}

impl<'a> ReadablePduWithTwoInputs<'a, u8, Span<'a>, LocatedIpv4PrefixParsingError<'a>> for Ipv4Net {
    /// A second version that assumes the prefix length has been read
    /// elsewhere in the message
    fn from_wire(
        buf: Span<'a>,
        prefix_len: u8,
        prefix_location: Span<'a>,
    ) -> IResult<Span<'a>, Self, LocatedIpv4PrefixParsingError<'a>> {
        // The prefix value must fall into the octet boundary, even if the
        // prefix_len doesn't. For example, prefix_len=19 => prefix_size=3
        let prefix_size = if prefix_len >= u8::MAX - 7 {
            u8::MAX
        } else {
            prefix_len.div_ceil(8)
        };
        let (buf, prefix) = nom::bytes::complete::take(prefix_size.min(4))(buf)?;
        // Fill the unread bits with zeros
        let mut network = [0; 4];
        prefix.iter().enumerate().for_each(|(i, v)| network[i] = *v);
        let addr = Ipv4Addr::from(network);

        match Ipv4Net::new(addr, prefix_len) {
            Ok(net) => Ok((buf, net)),
            Err(_) => Err(nom::Err::Error(LocatedIpv4PrefixParsingError::new(
                prefix_location,
                Ipv4PrefixParsingError::InvalidIpv4PrefixLen(prefix_len),
            ))),
        }
    }
}

/// BGP Message Parsing errors
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum BgpMessageParsingError {
    /// Errors triggered by the nom parser, see [ErrorKind] for
    /// additional information.
    NomError(ErrorKind),

    /// The first 16 bytes of a BGP message are NOT all set to `1`.
    /// For simplicity, we carry the equivalent [`u128`] value that was
    /// invalid instead of the whole buffer
    ConnectionNotSynchronized(u128),

    /// Couldn't recognize the type octet in the BgpMessage, see
    /// [UndefinedBgpMessageType]
    UndefinedBgpMessageType(UndefinedBgpMessageType),

    /// BGP Message length is not in the defined \[min, max\] range for the
    /// given message type
    BadMessageLength(u16),

    OpenError(BgpOpenMessageParsingError),

    UpdateError(BgpUpdateMessageParsingError),

    NotificationError(BgpNotificationMessageParsingError),

    RouteRefreshError(BgpRouteRefreshMessageParsingError),
}

located_parsing_error!(LocatedBgpMessageParsingError, BgpMessageParsingError);

located_error_from!(
    LocatedBgpOpenMessageParsingError,
    LocatedBgpMessageParsingError,
    BgpMessageParsingError::OpenError
);
located_error_from!(
    LocatedBgpUpdateMessageParsingError,
    LocatedBgpMessageParsingError,
    BgpMessageParsingError::UpdateError
);
located_error_from!(
    LocatedBgpNotificationMessageParsingError,
    LocatedBgpMessageParsingError,
    BgpMessageParsingError::NotificationError
);
located_error_from!(
    LocatedBgpRouteRefreshMessageParsingError,
    LocatedBgpMessageParsingError,
    BgpMessageParsingError::RouteRefreshError
);
located_from_external!(
    UndefinedBgpMessageType,
    LocatedBgpMessageParsingError,
    BgpMessageParsingError::UndefinedBgpMessageType
);
located_from_external!(
    BgpMessageParsingError,
    LocatedBgpMessageParsingError,
    std::convert::identity
);

/// Parse [`BgpMessage`] length and type, then check that the length of a BGP
/// message is valid according to its type, taking into consideration both
/// rules at [RFC4271](https://datatracker.ietf.org/doc/html/rfc4271)
/// and [RFC8654 Extended Message Support for BGP](https://datatracker.ietf.org/doc/html/rfc8654).
#[inline]
fn parse_bgp_message_length_and_type(
    buf: Span<'_>,
) -> IResult<Span<'_>, (u16, BgpMessageType, Span<'_>), LocatedBgpMessageParsingError<'_>> {
    let pre_len_buf = buf;
    let (buf, length) = be_u16(buf)?;

    // Fail early if the message length is not valid
    if length < BGP_MIN_MESSAGE_LENGTH {
        return Err(nom::Err::Error(LocatedBgpMessageParsingError::new(
            pre_len_buf,
            BgpMessageParsingError::BadMessageLength(length),
        )));
    }

    // Only read the subset that is defined by the length
    let remainder_result = nom::bytes::complete::take::<
        u16,
        Span<'_>,
        LocatedBgpMessageParsingError<'_>,
    >(length - 18)(buf);
    let (remainder_buf, buf) = match remainder_result {
        Ok((remainder_buf, buf)) => (remainder_buf, buf),
        Err(_) => {
            return Err(nom::Err::Error(LocatedBgpMessageParsingError::new(
                pre_len_buf,
                BgpMessageParsingError::BadMessageLength(length),
            )));
        }
    };
    let (buf, message_type) = nom::combinator::map_res(be_u8, BgpMessageType::try_from)(buf)?;

    match message_type {
        BgpMessageType::Open | BgpMessageType::KeepAlive => {
            if !(BGP_MIN_MESSAGE_LENGTH..=BGP_MAX_MESSAGE_LENGTH).contains(&length) {
                return Err(nom::Err::Error(LocatedBgpMessageParsingError::new(
                    pre_len_buf,
                    BgpMessageParsingError::BadMessageLength(length),
                )));
            }
        }
        BgpMessageType::Update | BgpMessageType::Notification | BgpMessageType::RouteRefresh => {}
    }
    Ok((buf, (length, message_type, remainder_buf)))
}

impl<'a> ReadablePduWithOneInput<'a, &mut BgpParsingContext, LocatedBgpMessageParsingError<'a>>
    for BgpMessage
{
    fn from_wire(
        buf: Span<'a>,
        ctx: &mut BgpParsingContext,
    ) -> IResult<Span<'a>, Self, LocatedBgpMessageParsingError<'a>> {
        let (buf, _) = nom::combinator::map_res(be_u128, |x| {
            if x == u128::MAX {
                Ok(x)
            } else {
                Err(BgpMessageParsingError::ConnectionNotSynchronized(x))
            }
        })(buf)?;

        // Parse length and type together, since the length validation
        // depends on the type of the message
        let (buf, (_, message_type, remainder_buf)) = parse_bgp_message_length_and_type(buf)?;
        let (buf, msg) = match message_type {
            BgpMessageType::Open => {
                let (buf, open) = parse_into_located(buf)?;
                (buf, BgpMessage::Open(open))
            }
            BgpMessageType::Update => {
                let (buf, update) = parse_into_located_one_input(buf, ctx.asn4())?;
                (buf, BgpMessage::Update(update))
            }
            BgpMessageType::Notification => {
                let (buf, notification) = parse_into_located(buf)?;
                (buf, BgpMessage::Notification(notification))
            }
            BgpMessageType::KeepAlive => (buf, BgpMessage::KeepAlive),
            BgpMessageType::RouteRefresh => {
                let (buf, route_refresh) = parse_into_located(buf)?;
                (buf, BgpMessage::RouteRefresh(route_refresh))
            }
        };

        // Make sure we consumed the full BGP message as specified by its length
        if !buf.is_empty() {
            return Err(nom::Err::Error(LocatedBgpMessageParsingError::new(
                buf,
                BgpMessageParsingError::NomError(ErrorKind::NonEmpty),
            )));
        }
        Ok((remainder_buf, msg))
    }
}
