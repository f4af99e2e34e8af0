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

//! Contains the definitions for the [`PathAttribute`] subset that can be
//! carried in [`crate::update::BgpUpdateMessage`].

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use strum_macros::{Display, FromRepr};

/// General properties to check the validity of a given path attribute value
pub trait PathAttributeValueProperties {
    /// Check the validity of the `optional` bit in the [`PathAttribute`]:
    ///  - `Some(true)` optional must be set to `true`.
    ///  - `Some(false)` optional must be set to `false`.
    ///  - `None` optional can be set to either `true` or `false`.
    fn can_be_optional() -> Option<bool>;

    /// Check the validity of the `transitive` bit in the [`PathAttribute`]:
    ///  - `Some(true)` transitive must be set to `true`.
    ///  - `Some(false)` transitive must be set to `false`.
    ///  - `None` transitive can be set to either `true` or `false`.
    fn can_be_transitive() -> Option<bool>;

    /// Check the validity of the `partial` bit in the [`PathAttribute`]:
    ///  - `Some(true)` partial must be set to `true`.
    ///  - `Some(false)` partial must be set to `false`.
    ///  - `None` partial can be set to either `true` or `false`.
    fn can_be_partial() -> Option<bool>;
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum InvalidPathAttribute {
    InvalidOptionalFlagValue(bool),
    InvalidTransitiveFlagValue(bool),
    InvalidPartialFlagValue(bool),
}

/// Path Attribute
///
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Attr. Flags  |Attr. Type Code| Path value (variable)
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PathAttribute {
    /// Optional bit defines whether the attribute is optional (if set to
    /// `true`) or well-known (if set to `false`).
    optional: bool,

    /// Transitive bit defines whether an optional attribute is transitive (if
    /// set to `true`) or non-transitive (if set to `false`). For well-known
    /// attributes, the Transitive bit MUST be set to `true`.
    transitive: bool,
    partial: bool,
    extended_length: bool,
    value: PathAttributeValue,
}

impl PathAttribute {
    pub fn from(
        optional: bool,
        transitive: bool,
        partial: bool,
        extended_length: bool,
        value: PathAttributeValue,
    ) -> Result<PathAttribute, (PathAttributeValue, InvalidPathAttribute)> {
        if value
            .can_be_optional()
            .map(|x| x != optional)
            .unwrap_or(false)
        {
            return Err((
                value,
                InvalidPathAttribute::InvalidOptionalFlagValue(optional),
            ));
        }
        if value
            .can_be_transitive()
            .map(|x| x != transitive)
            .unwrap_or(false)
        {
            return Err((
                value,
                InvalidPathAttribute::InvalidTransitiveFlagValue(transitive),
            ));
        }
        if value
            .can_be_partial()
            .map(|x| x != partial)
            .unwrap_or(false)
        {
            return Err((
                value,
                InvalidPathAttribute::InvalidPartialFlagValue(partial),
            ));
        }
        Ok(PathAttribute {
            optional,
            transitive,
            partial,
            extended_length,
            value,
        })
    }

    pub const fn value(&self) -> &PathAttributeValue {
        &self.value
    }

    pub const fn optional(&self) -> bool {
        self.optional
    }

    pub const fn transitive(&self) -> bool {
        self.transitive
    }

    /// Partial bit defines whether the information contained in the optional
    /// transitive attribute is partial (if set to `true`) or complete (if
    /// set to `false`).
    pub const fn partial(&self) -> bool {
        self.partial
    }

    /// Extended Length bit defines whether the Attribute Length is one octet
    /// (if set to `false`) or two octets (if set to `true`).
    pub const fn extended_length(&self) -> bool {
        self.extended_length
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum PathAttributeValue {
    Origin(Origin),
    AsPath(AsPath),
    NextHop(NextHop),
    MultiExitDiscriminator(MultiExitDiscriminator),
    LocalPreference(LocalPreference),
    AtomicAggregate(AtomicAggregate),
    UnknownAttribute(UnknownAttribute),
}

impl PathAttributeValue {
    pub fn can_be_optional(&self) -> Option<bool> {
        match self {
            Self::Origin(_) => Origin::can_be_optional(),
            Self::AsPath(_) => AsPath::can_be_optional(),
            Self::NextHop(_) => NextHop::can_be_optional(),
            Self::MultiExitDiscriminator(_) => MultiExitDiscriminator::can_be_optional(),
            Self::LocalPreference(_) => LocalPreference::can_be_optional(),
            Self::AtomicAggregate(_) => AtomicAggregate::can_be_optional(),
            Self::UnknownAttribute(_) => UnknownAttribute::can_be_optional(),
        }
    }

    pub fn can_be_transitive(&self) -> Option<bool> {
        match self {
            Self::Origin(_) => Origin::can_be_transitive(),
            Self::AsPath(_) => AsPath::can_be_transitive(),
            Self::NextHop(_) => NextHop::can_be_transitive(),
            Self::MultiExitDiscriminator(_) => MultiExitDiscriminator::can_be_transitive(),
            Self::LocalPreference(_) => LocalPreference::can_be_transitive(),
            Self::AtomicAggregate(_) => AtomicAggregate::can_be_transitive(),
            Self::UnknownAttribute(_) => UnknownAttribute::can_be_transitive(),
        }
    }

    pub fn can_be_partial(&self) -> Option<bool> {
        match self {
            Self::Origin(_) => Origin::can_be_partial(),
            Self::AsPath(_) => AsPath::can_be_partial(),
            Self::NextHop(_) => NextHop::can_be_partial(),
            Self::MultiExitDiscriminator(_) => MultiExitDiscriminator::can_be_partial(),
            Self::LocalPreference(_) => LocalPreference::can_be_partial(),
            Self::AtomicAggregate(_) => AtomicAggregate::can_be_partial(),
            Self::UnknownAttribute(_) => UnknownAttribute::can_be_partial(),
        }
    }
}

/// Path attribute length field. One octet normally, two octets when the
/// extended-length flag is set.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum PathAttributeLength {
    U8(u8),
    U16(u16),
}

impl From<PathAttributeLength> for u16 {
    fn from(value: PathAttributeLength) -> Self {
        match value {
            PathAttributeLength::U8(len) => len.into(),
            PathAttributeLength::U16(len) => len,
        }
    }
}

/// ORIGIN is a well-known mandatory attribute that defines the origin of the
/// path information.
#[repr(u8)]
#[derive(Display, FromRepr, Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Origin {
    IGP = 0,
    EGP = 1,
    Incomplete = 2,
}

impl PathAttributeValueProperties for Origin {
    fn can_be_optional() -> Option<bool> {
        Some(false)
    }

    fn can_be_transitive() -> Option<bool> {
        Some(true)
    }

    fn can_be_partial() -> Option<bool> {
        Some(false)
    }
}

impl From<Origin> for u8 {
    fn from(value: Origin) -> Self {
        value as u8
    }
}

/// Error type used in [`TryFrom`] for [`Origin`].
/// The value carried is the undefined value being parsed
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct UndefinedOrigin(pub u8);

impl TryFrom<u8> for Origin {
    type Error = UndefinedOrigin;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match Self::from_repr(value) {
            Some(val) => Ok(val),
            None => Err(UndefinedOrigin(value)),
        }
    }
}

/// `AS_PATH` is a well-known mandatory attribute that is composed of a
/// sequence of AS path segments. Whether segments carry two or four octet AS
/// numbers depends on the Four-octet AS capability negotiated on the session.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum AsPath {
    As2PathSegments(Vec<As2PathSegment>),
    As4PathSegments(Vec<As4PathSegment>),
}

impl PathAttributeValueProperties for AsPath {
    fn can_be_optional() -> Option<bool> {
        Some(false)
    }

    fn can_be_transitive() -> Option<bool> {
        Some(true)
    }

    fn can_be_partial() -> Option<bool> {
        Some(false)
    }
}

/// AS path segment type as defined by [RFC4271](https://datatracker.ietf.org/doc/html/rfc4271#section-4.3)
#[repr(u8)]
#[derive(Display, FromRepr, Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum AsPathSegmentType {
    AsSet = 1,
    AsSequence = 2,
}

impl From<AsPathSegmentType> for u8 {
    fn from(value: AsPathSegmentType) -> Self {
        value as u8
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct UndefinedAsPathSegmentType(pub u8);

impl TryFrom<u8> for AsPathSegmentType {
    type Error = UndefinedAsPathSegmentType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match Self::from_repr(value) {
            Some(val) => Ok(val),
            None => Err(UndefinedAsPathSegmentType(value)),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct As2PathSegment {
    segment_type: AsPathSegmentType,
    as_numbers: Vec<u16>,
}

impl As2PathSegment {
    pub const fn new(segment_type: AsPathSegmentType, as_numbers: Vec<u16>) -> Self {
        Self {
            segment_type,
            as_numbers,
        }
    }

    pub const fn segment_type(&self) -> AsPathSegmentType {
        self.segment_type
    }

    pub fn as_numbers(&self) -> &[u16] {
        &self.as_numbers
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct As4PathSegment {
    segment_type: AsPathSegmentType,
    as_numbers: Vec<u32>,
}

impl As4PathSegment {
    pub const fn new(segment_type: AsPathSegmentType, as_numbers: Vec<u32>) -> Self {
        Self {
            segment_type,
            as_numbers,
        }
    }

    pub const fn segment_type(&self) -> AsPathSegmentType {
        self.segment_type
    }

    pub fn as_numbers(&self) -> &[u32] {
        &self.as_numbers
    }
}

/// `NEXT_HOP` is a well-known mandatory attribute carrying the IPv4 address
/// of the router that should be used as the next hop to the destinations
/// listed in the UPDATE.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct NextHop(Ipv4Addr);

impl NextHop {
    pub const fn new(next_hop: Ipv4Addr) -> Self {
        Self(next_hop)
    }

    pub const fn next_hop(&self) -> Ipv4Addr {
        self.0
    }
}

impl PathAttributeValueProperties for NextHop {
    fn can_be_optional() -> Option<bool> {
        Some(false)
    }

    fn can_be_transitive() -> Option<bool> {
        Some(true)
    }

    fn can_be_partial() -> Option<bool> {
        Some(false)
    }
}

/// `MULTI_EXIT_DISC` is an optional non-transitive attribute used to
/// discriminate among multiple exit points to a neighboring AS.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct MultiExitDiscriminator(u32);

impl MultiExitDiscriminator {
    pub const fn new(metric: u32) -> Self {
        Self(metric)
    }

    pub const fn metric(&self) -> u32 {
        self.0
    }
}

impl PathAttributeValueProperties for MultiExitDiscriminator {
    fn can_be_optional() -> Option<bool> {
        Some(true)
    }

    fn can_be_transitive() -> Option<bool> {
        Some(false)
    }

    fn can_be_partial() -> Option<bool> {
        Some(false)
    }
}

/// `LOCAL_PREF` is a well-known attribute conveying the originating
/// speaker's degree of preference for an advertised route.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct LocalPreference(u32);

impl LocalPreference {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl PathAttributeValueProperties for LocalPreference {
    fn can_be_optional() -> Option<bool> {
        Some(false)
    }

    fn can_be_transitive() -> Option<bool> {
        Some(true)
    }

    fn can_be_partial() -> Option<bool> {
        Some(false)
    }
}

/// `ATOMIC_AGGREGATE` is a well-known discretionary attribute with no value.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct AtomicAggregate;

impl PathAttributeValueProperties for AtomicAggregate {
    fn can_be_optional() -> Option<bool> {
        Some(false)
    }

    fn can_be_transitive() -> Option<bool> {
        Some(true)
    }

    fn can_be_partial() -> Option<bool> {
        Some(false)
    }
}

/// Path attributes this crate doesn't model are carried raw: attribute code
/// plus the unparsed value octets.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct UnknownAttribute {
    code: u8,
    value: Vec<u8>,
}

impl UnknownAttribute {
    pub const fn new(code: u8, value: Vec<u8>) -> Self {
        Self { code, value }
    }

    pub const fn code(&self) -> u8 {
        self.code
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

impl PathAttributeValueProperties for UnknownAttribute {
    fn can_be_optional() -> Option<bool> {
        None
    }

    fn can_be_transitive() -> Option<bool> {
        None
    }

    fn can_be_partial() -> Option<bool> {
        None
    }
}
