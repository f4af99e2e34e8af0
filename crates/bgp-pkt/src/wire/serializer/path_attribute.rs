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

//! Serializer for BGP Path Attributes

use crate::{iana::PathAttributeType, path_attribute::*};
use byteorder::{NetworkEndian, WriteBytesExt};
use routebench_parse_utils::{WritablePdu, WritablePduWithOneInput};

#[derive(Eq, PartialEq, Clone, Debug)]
pub enum PathAttributeWritingError {
    StdIOError(String),
    OriginError(OriginWritingError),
    AsPathError(AsPathWritingError),
    NextHopError(NextHopWritingError),
    MultiExitDiscriminatorError(MultiExitDiscriminatorWritingError),
    LocalPreferenceError(LocalPreferenceWritingError),
    AtomicAggregateError(AtomicAggregateWritingError),
    UnknownAttributeError(UnknownAttributeWritingError),
}

impl From<std::io::Error> for PathAttributeWritingError {
    fn from(err: std::io::Error) -> Self {
        Self::StdIOError(err.to_string())
    }
}

macro_rules! value_writing_error {
    ($error:ident, $variant:ident) => {
        #[derive(Eq, PartialEq, Clone, Debug)]
        pub enum $error {
            StdIOError(String),
        }

        impl From<std::io::Error> for $error {
            fn from(err: std::io::Error) -> Self {
                Self::StdIOError(err.to_string())
            }
        }

        impl From<$error> for PathAttributeWritingError {
            fn from(err: $error) -> Self {
                Self::$variant(err)
            }
        }
    };
}

value_writing_error!(OriginWritingError, OriginError);
value_writing_error!(AsPathWritingError, AsPathError);
value_writing_error!(NextHopWritingError, NextHopError);
value_writing_error!(MultiExitDiscriminatorWritingError, MultiExitDiscriminatorError);
value_writing_error!(LocalPreferenceWritingError, LocalPreferenceError);
value_writing_error!(AtomicAggregateWritingError, AtomicAggregateError);
value_writing_error!(UnknownAttributeWritingError, UnknownAttributeError);

/// Number of octets the attribute length field occupies
#[inline]
const fn length_field_len(extended_length: bool) -> usize {
    if extended_length {
        2
    } else {
        1
    }
}

#[inline]
fn write_length<T: std::io::Write>(
    writer: &mut T,
    extended_length: bool,
    len: usize,
) -> Result<(), std::io::Error> {
    if extended_length {
        writer.write_u16::<NetworkEndian>(len as u16)?;
    } else {
        writer.write_u8(len as u8)?;
    }
    Ok(())
}

impl WritablePdu<PathAttributeWritingError> for PathAttribute {
    /// 1-octet flags + 1-octet type code
    const BASE_LENGTH: usize = 2;

    fn len(&self) -> usize {
        let value_len = match self.value() {
            PathAttributeValue::Origin(value) => value.len(self.extended_length()),
            PathAttributeValue::AsPath(value) => value.len(self.extended_length()),
            PathAttributeValue::NextHop(value) => value.len(self.extended_length()),
            PathAttributeValue::MultiExitDiscriminator(value) => {
                value.len(self.extended_length())
            }
            PathAttributeValue::LocalPreference(value) => value.len(self.extended_length()),
            PathAttributeValue::AtomicAggregate(value) => value.len(self.extended_length()),
            // unknown attributes carry their own code octet
            PathAttributeValue::UnknownAttribute(value) => {
                value.len(self.extended_length()) - 1
            }
        };
        Self::BASE_LENGTH + value_len
    }

    fn write<T: std::io::Write>(&self, writer: &mut T) -> Result<(), PathAttributeWritingError> {
        let mut attributes = 0x00u8;
        if self.optional() {
            attributes |= 0b1000_0000;
        }
        if self.transitive() {
            attributes |= 0b0100_0000;
        }
        if self.partial() {
            attributes |= 0b0010_0000;
        }
        if self.extended_length() {
            attributes |= 0b0001_0000;
        }
        writer.write_u8(attributes)?;
        match self.value() {
            PathAttributeValue::Origin(value) => {
                writer.write_u8(PathAttributeType::Origin.into())?;
                value.write(writer, self.extended_length())?;
            }
            PathAttributeValue::AsPath(value) => {
                writer.write_u8(PathAttributeType::AsPath.into())?;
                value.write(writer, self.extended_length())?;
            }
            PathAttributeValue::NextHop(value) => {
                writer.write_u8(PathAttributeType::NextHop.into())?;
                value.write(writer, self.extended_length())?;
            }
            PathAttributeValue::MultiExitDiscriminator(value) => {
                writer.write_u8(PathAttributeType::MultiExitDiscriminator.into())?;
                value.write(writer, self.extended_length())?;
            }
            PathAttributeValue::LocalPreference(value) => {
                writer.write_u8(PathAttributeType::LocalPreference.into())?;
                value.write(writer, self.extended_length())?;
            }
            PathAttributeValue::AtomicAggregate(value) => {
                writer.write_u8(PathAttributeType::AtomicAggregate.into())?;
                value.write(writer, self.extended_length())?;
            }
            PathAttributeValue::UnknownAttribute(value) => {
                value.write(writer, self.extended_length())?;
            }
        }
        Ok(())
    }
}

impl WritablePduWithOneInput<bool, OriginWritingError> for Origin {
    const BASE_LENGTH: usize = 1;

    fn len(&self, extended_length: bool) -> usize {
        Self::BASE_LENGTH + length_field_len(extended_length)
    }

    fn write<W: std::io::Write>(
        &self,
        writer: &mut W,
        extended_length: bool,
    ) -> Result<(), OriginWritingError> {
        write_length(writer, extended_length, Self::BASE_LENGTH)?;
        writer.write_u8((*self).into())?;
        Ok(())
    }
}

impl WritablePduWithOneInput<bool, AsPathWritingError> for AsPath {
    const BASE_LENGTH: usize = 0;

    fn len(&self, extended_length: bool) -> usize {
        let segments_len = match self {
            Self::As2PathSegments(segments) => segments
                .iter()
                .map(|s| 2 + 2 * s.as_numbers().len())
                .sum::<usize>(),
            Self::As4PathSegments(segments) => segments
                .iter()
                .map(|s| 2 + 4 * s.as_numbers().len())
                .sum::<usize>(),
        };
        length_field_len(extended_length) + segments_len
    }

    fn write<W: std::io::Write>(
        &self,
        writer: &mut W,
        extended_length: bool,
    ) -> Result<(), AsPathWritingError> {
        let segments_len = self.len(extended_length) - length_field_len(extended_length);
        write_length(writer, extended_length, segments_len)?;
        match self {
            Self::As2PathSegments(segments) => {
                for segment in segments {
                    writer.write_u8(segment.segment_type().into())?;
                    writer.write_u8(segment.as_numbers().len() as u8)?;
                    for asn in segment.as_numbers() {
                        writer.write_u16::<NetworkEndian>(*asn)?;
                    }
                }
            }
            Self::As4PathSegments(segments) => {
                for segment in segments {
                    writer.write_u8(segment.segment_type().into())?;
                    writer.write_u8(segment.as_numbers().len() as u8)?;
                    for asn in segment.as_numbers() {
                        writer.write_u32::<NetworkEndian>(*asn)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl WritablePduWithOneInput<bool, NextHopWritingError> for NextHop {
    const BASE_LENGTH: usize = 4;

    fn len(&self, extended_length: bool) -> usize {
        Self::BASE_LENGTH + length_field_len(extended_length)
    }

    fn write<W: std::io::Write>(
        &self,
        writer: &mut W,
        extended_length: bool,
    ) -> Result<(), NextHopWritingError> {
        write_length(writer, extended_length, Self::BASE_LENGTH)?;
        writer.write_all(&self.next_hop().octets())?;
        Ok(())
    }
}

impl WritablePduWithOneInput<bool, MultiExitDiscriminatorWritingError> for MultiExitDiscriminator {
    const BASE_LENGTH: usize = 4;

    fn len(&self, extended_length: bool) -> usize {
        Self::BASE_LENGTH + length_field_len(extended_length)
    }

    fn write<W: std::io::Write>(
        &self,
        writer: &mut W,
        extended_length: bool,
    ) -> Result<(), MultiExitDiscriminatorWritingError> {
        write_length(writer, extended_length, Self::BASE_LENGTH)?;
        writer.write_u32::<NetworkEndian>(self.metric())?;
        Ok(())
    }
}

impl WritablePduWithOneInput<bool, LocalPreferenceWritingError> for LocalPreference {
    const BASE_LENGTH: usize = 4;

    fn len(&self, extended_length: bool) -> usize {
        Self::BASE_LENGTH + length_field_len(extended_length)
    }

    fn write<W: std::io::Write>(
        &self,
        writer: &mut W,
        extended_length: bool,
    ) -> Result<(), LocalPreferenceWritingError> {
        write_length(writer, extended_length, Self::BASE_LENGTH)?;
        writer.write_u32::<NetworkEndian>(self.value())?;
        Ok(())
    }
}

impl WritablePduWithOneInput<bool, AtomicAggregateWritingError> for AtomicAggregate {
    const BASE_LENGTH: usize = 0;

    fn len(&self, extended_length: bool) -> usize {
        Self::BASE_LENGTH + length_field_len(extended_length)
    }

    fn write<W: std::io::Write>(
        &self,
        writer: &mut W,
        extended_length: bool,
    ) -> Result<(), AtomicAggregateWritingError> {
        write_length(writer, extended_length, Self::BASE_LENGTH)?;
        Ok(())
    }
}

impl WritablePduWithOneInput<bool, UnknownAttributeWritingError> for UnknownAttribute {
    /// 1-octet code
    const BASE_LENGTH: usize = 1;

    fn len(&self, extended_length: bool) -> usize {
        Self::BASE_LENGTH + length_field_len(extended_length) + self.value().len()
    }

    fn write<W: std::io::Write>(
        &self,
        writer: &mut W,
        extended_length: bool,
    ) -> Result<(), UnknownAttributeWritingError> {
        writer.write_u8(self.code())?;
        write_length(writer, extended_length, self.value().len())?;
        writer.write_all(self.value())?;
        Ok(())
    }
}
