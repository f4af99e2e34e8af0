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

//! Framing and decoding of BGP messages out of a reassembled TCP byte
//! stream.
//!
//! Unlike a codec sitting on a session socket, a passive observer can join
//! the stream mid-session, so framing starts by hunting for the 16-octet
//! all-ones synchronization marker instead of assuming the buffer begins at
//! a message boundary.

use byteorder::{ByteOrder, NetworkEndian};
use bytes::{Buf, BytesMut};
use nom::Needed;
use tokio_util::codec::Decoder;

use crate::{
    wire::deserializer::{BgpMessageParsingError, BgpParsingContext, BGP_MIN_MESSAGE_LENGTH},
    BgpMessage,
};
use routebench_parse_utils::{LocatedParsingError, ReadablePduWithOneInput, Span};

/// The 16-octet synchronization marker that opens every BGP message
pub const BGP_MESSAGE_MARKER: [u8; 16] = [0xff; 16];

/// Scan the buffer for the next complete BGP message frame.
///
/// Finds the first `0xff` octet, verifies the full marker (advancing one
/// octet on mismatch), reads the 2-octet big-endian total length, and
/// splits off exactly `length` octets starting at the marker. Returns
/// `None` when no complete frame is buffered yet; in that case the cursor
/// does not move past the candidate marker (or at all, when no marker
/// octet is buffered), so calling again on an un-grown buffer never makes
/// progress and never loses data.
///
/// A declared length below the 19-octet protocol minimum cannot be a real
/// message header; the candidate octet is skipped so the scan always
/// advances.
pub fn next_frame(buf: &mut BytesMut) -> Option<BytesMut> {
    let mut start = 0usize;
    loop {
        let candidate = match buf[start..].iter().position(|b| *b == 0xff) {
            Some(pos) => start + pos,
            // nothing buffered begins a marker yet; leave the buffer
            // untouched and wait for more data
            None => return None,
        };
        let available = buf.len() - candidate;
        if available < BGP_MESSAGE_MARKER.len() + 2 {
            buf.advance(candidate);
            return None;
        }
        if buf[candidate..candidate + BGP_MESSAGE_MARKER.len()] != BGP_MESSAGE_MARKER {
            start = candidate + 1;
            continue;
        }
        let length = NetworkEndian::read_u16(&buf[candidate + 16..candidate + 18]) as usize;
        if length < BGP_MIN_MESSAGE_LENGTH as usize {
            start = candidate + 1;
            continue;
        }
        if available < length {
            buf.advance(candidate);
            return None;
        }
        buf.advance(candidate);
        return Some(buf.split_to(length));
    }
}

/// Decoder that frames and parses BGP messages out of one direction of a
/// reassembled TCP stream.
#[derive(Debug, Clone, Default)]
pub struct BgpCodec {
    ctx: BgpParsingContext,
}

impl BgpCodec {
    pub const fn new(asn4: bool) -> Self {
        Self {
            ctx: BgpParsingContext::new(asn4),
        }
    }

    pub const fn ctx(&self) -> &BgpParsingContext {
        &self.ctx
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BgpCodecDecoderError {
    IoError(String),
    Incomplete(Option<usize>),
    BgpMessageParsingError(BgpMessageParsingError),
}

impl From<std::io::Error> for BgpCodecDecoderError {
    fn from(error: std::io::Error) -> Self {
        Self::IoError(error.to_string())
    }
}

impl Decoder for BgpCodec {
    type Item = BgpMessage;
    type Error = BgpCodecDecoderError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let frame = match next_frame(buf) {
            Some(frame) => frame,
            None => return Ok(None),
        };
        // The frame is already consumed from the buffer, so a parse error
        // never stalls the stream: the caller logs it and moves on to the
        // next frame.
        match BgpMessage::from_wire(Span::new(&frame), &mut self.ctx) {
            Ok((_span, msg)) => {
                if let BgpMessage::Open(ref open) = msg {
                    let asn4 = open.advertises_four_octet_as();
                    tracing::debug!(asn4, "observed OPEN, updating AS number width");
                    self.ctx.set_asn4(asn4);
                }
                Ok(Some(msg))
            }
            Err(error) => Err(match error {
                nom::Err::Incomplete(needed) => {
                    let needed = match needed {
                        Needed::Unknown => None,
                        Needed::Size(size) => Some(size.get()),
                    };
                    BgpCodecDecoderError::Incomplete(needed)
                }
                nom::Err::Error(error) | nom::Err::Failure(error) => {
                    BgpCodecDecoderError::BgpMessageParsingError(error.error().clone())
                }
            }),
        }
    }
}
