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

//! Helper traits and functions to make parsing and serializing wire
//! protocols easier.

use nom::IResult;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

/// Located input buffer. Keeps track of the absolute offset into the
/// original input, which parsing errors carry for diagnostics.
pub type Span<'a> = nom_locate::LocatedSpan<&'a [u8]>;

/// Generic trait for a parsing error that carries the location in the
/// input buffer at which the error occurred.
pub trait LocatedParsingError {
    type Span;
    type Error;

    fn span(&self) -> &Self::Span;
    fn error(&self) -> &Self::Error;
}

/// Generic trait for Readable Protocol Data Unit that doesn't need any
/// external input while parsing the packet.
pub trait ReadablePdu<'a, ErrorType> {
    fn from_wire(buf: Span<'a>) -> IResult<Span<'a>, Self, ErrorType>
    where
        Self: Sized;
}

/// Generic trait for Readable Protocol Data Unit that needs one external
/// input while parsing the packet.
pub trait ReadablePduWithOneInput<'a, T, ErrorType> {
    fn from_wire(buf: Span<'a>, input: T) -> IResult<Span<'a>, Self, ErrorType>
    where
        Self: Sized;
}

/// Generic trait for Readable Protocol Data Unit that needs two external
/// inputs while parsing the packet.
pub trait ReadablePduWithTwoInputs<'a, T, U, ErrorType> {
    fn from_wire(buf: Span<'a>, input1: T, input2: U) -> IResult<Span<'a>, Self, ErrorType>
    where
        Self: Sized;
}

/// Generic trait for Writable Protocol Data Unit that doesn't need any
/// external input while writing the packet.
pub trait WritablePdu<ErrorType> {
    const BASE_LENGTH: usize;

    /// The total length of the object when serialized to the wire.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write<T: std::io::Write>(&self, writer: &mut T) -> Result<(), ErrorType>
    where
        Self: Sized;
}

/// Generic trait for Writable Protocol Data Unit that needs one external
/// input while writing the packet.
pub trait WritablePduWithOneInput<T, ErrorType> {
    const BASE_LENGTH: usize;

    fn len(&self, input: T) -> usize;

    fn write<W: std::io::Write>(&self, writer: &mut W, input: T) -> Result<(), ErrorType>
    where
        Self: Sized;
}

/// Generate the located companion of a parsing error enum: a struct
/// pairing the error with the [Span] at which it occurred, wired into
/// [nom::error::ParseError] so nom combinators can construct it. The
/// error enum must have a `NomError(nom::error::ErrorKind)` variant.
#[macro_export]
macro_rules! located_parsing_error {
    ($located:ident, $error:ident) => {
        #[derive(Eq, PartialEq, Clone, Debug)]
        pub struct $located<'a> {
            span: $crate::Span<'a>,
            error: $error,
        }

        impl<'a> $located<'a> {
            pub const fn new(span: $crate::Span<'a>, error: $error) -> Self {
                Self { span, error }
            }
        }

        impl<'a> $crate::LocatedParsingError for $located<'a> {
            type Span = $crate::Span<'a>;
            type Error = $error;

            fn span(&self) -> &Self::Span {
                &self.span
            }

            fn error(&self) -> &Self::Error {
                &self.error
            }
        }

        impl<'a> nom::error::ParseError<$crate::Span<'a>> for $located<'a> {
            fn from_error_kind(input: $crate::Span<'a>, kind: nom::error::ErrorKind) -> Self {
                Self::new(input, $error::NomError(kind))
            }

            fn append(
                _input: $crate::Span<'a>,
                _kind: nom::error::ErrorKind,
                other: Self,
            ) -> Self {
                other
            }
        }
    };
}

/// Generate a `From` conversion between two located errors, wrapping the
/// inner error value into the given variant of the outer error enum.
#[macro_export]
macro_rules! located_error_from {
    ($source:ident, $target:ident, $variant:expr) => {
        impl<'a> From<$source<'a>> for $target<'a> {
            fn from(value: $source<'a>) -> Self {
                let span = *$crate::LocatedParsingError::span(&value);
                let error = $crate::LocatedParsingError::error(&value).clone();
                Self::new(span, $variant(error))
            }
        }
    };
}

/// Generate a [nom::error::FromExternalError] impl so `map_res` can lift
/// an external error type into the given variant of a located error.
#[macro_export]
macro_rules! located_from_external {
    ($external:ident, $located:ident, $variant:expr) => {
        impl<'a> nom::error::FromExternalError<$crate::Span<'a>, $external> for $located<'a> {
            fn from_external_error(
                input: $crate::Span<'a>,
                _kind: nom::error::ErrorKind,
                error: $external,
            ) -> Self {
                Self::new(input, $variant(error))
            }
        }
    };
}

/// Keep repeating the parser till the buf is empty.
#[inline]
pub fn parse_till_empty<'a, T: ReadablePdu<'a, E>, E>(buf: Span<'a>) -> IResult<Span<'a>, Vec<T>, E> {
    let mut buf = buf;
    let mut ret = Vec::new();
    while !buf.is_empty() {
        let (tmp, element) = T::from_wire(buf)?;
        ret.push(element);
        buf = tmp;
    }
    Ok((buf, ret))
}

/// Run the parser and convert its located error into the caller's
/// located error type.
#[inline]
pub fn parse_into_located<'a, L1: Into<L2>, L2, T: ReadablePdu<'a, L1>>(
    buf: Span<'a>,
) -> IResult<Span<'a>, T, L2> {
    convert_parsing_error(T::from_wire(buf))
}

/// Like [parse_into_located] for parsers that take one external input.
#[inline]
pub fn parse_into_located_one_input<'a, I, L1: Into<L2>, L2, T: ReadablePduWithOneInput<'a, I, L1>>(
    buf: Span<'a>,
    input: I,
) -> IResult<Span<'a>, T, L2> {
    convert_parsing_error(T::from_wire(buf, input))
}

/// Like [parse_into_located] for parsers that take two external inputs.
#[inline]
pub fn parse_into_located_two_inputs<
    'a,
    I1,
    I2,
    L1: Into<L2>,
    L2,
    T: ReadablePduWithTwoInputs<'a, I1, I2, L1>,
>(
    buf: Span<'a>,
    input1: I1,
    input2: I2,
) -> IResult<Span<'a>, T, L2> {
    convert_parsing_error(T::from_wire(buf, input1, input2))
}

/// Keep repeating the parser till the buf is empty, converting the
/// located error into the caller's located error type.
#[inline]
pub fn parse_till_empty_into_located<'a, L1: Into<L2>, L2, T: ReadablePdu<'a, L1>>(
    buf: Span<'a>,
) -> IResult<Span<'a>, Vec<T>, L2> {
    let mut buf = buf;
    let mut ret = Vec::new();
    while !buf.is_empty() {
        let (tmp, element) = parse_into_located(buf)?;
        ret.push(element);
        buf = tmp;
    }
    Ok((buf, ret))
}

/// Like [parse_till_empty_into_located] for parsers that take one
/// external input. The input must be cheap to clone; it's cloned on each
/// iteration.
#[inline]
pub fn parse_till_empty_into_with_one_input_located<
    'a,
    I: Clone,
    L1: Into<L2>,
    L2,
    T: ReadablePduWithOneInput<'a, I, L1>,
>(
    buf: Span<'a>,
    input: I,
) -> IResult<Span<'a>, Vec<T>, L2> {
    let mut buf = buf;
    let mut ret = Vec::new();
    while !buf.is_empty() {
        let (tmp, element) = parse_into_located_one_input(buf, input.clone())?;
        ret.push(element);
        buf = tmp;
    }
    Ok((buf, ret))
}

#[inline]
fn convert_parsing_error<'a, L1: Into<L2>, L2, T>(
    result: IResult<Span<'a>, T, L1>,
) -> IResult<Span<'a>, T, L2> {
    match result {
        Ok(value) => Ok(value),
        Err(nom::Err::Incomplete(needed)) => Err(nom::Err::Incomplete(needed)),
        Err(nom::Err::Error(error)) => Err(nom::Err::Error(error.into())),
        Err(nom::Err::Failure(failure)) => Err(nom::Err::Failure(failure.into())),
    }
}
