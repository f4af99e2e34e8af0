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

//! Assertion helpers shared by the wire serde tests.

use crate::{
    ReadablePdu, ReadablePduWithOneInput, ReadablePduWithTwoInputs, Span, WritablePdu,
    WritablePduWithOneInput,
};
use std::fmt::Debug;

/// Concatenate a sequence of byte slices into one owned wire buffer.
pub fn combine(v: Vec<&[u8]>) -> Vec<u8> {
    v.iter()
        .flat_map(|x| x.iter())
        .cloned()
        .collect::<Vec<u8>>()
}

/// Build a [Span] positioned at an arbitrary absolute offset, for
/// constructing expected located errors.
pub fn span_at(offset: usize, fragment: &[u8]) -> Span<'_> {
    unsafe { Span::new_from_raw_offset(offset, 1, fragment, ()) }
}

/// Assert the buffer parses without error and is fully consumed, and the
/// parsed value equals the expected one.
pub fn test_parsed_completely<'a, T, E>(input: &'a [u8], expected: &T) -> T
where
    T: ReadablePdu<'a, E> + PartialEq + Debug,
    E: Debug,
{
    let parsed = T::from_wire(Span::new(input));
    assert!(parsed.is_ok(), "unexpected parse error: {parsed:?}");
    let (remainder, value) = parsed.unwrap();
    assert_eq!(&value, expected);
    assert!(
        remainder.is_empty(),
        "unparsed trailing bytes: {remainder:?}"
    );
    value
}

/// [test_parsed_completely] for parsers that take one external input.
pub fn test_parsed_completely_with_one_input<'a, I, T, E>(
    input: &'a [u8],
    parser_input: I,
    expected: &T,
) -> T
where
    T: ReadablePduWithOneInput<'a, I, E> + PartialEq + Debug,
    E: Debug,
{
    let parsed = T::from_wire(Span::new(input), parser_input);
    assert!(parsed.is_ok(), "unexpected parse error: {parsed:?}");
    let (remainder, value) = parsed.unwrap();
    assert_eq!(&value, expected);
    assert!(
        remainder.is_empty(),
        "unparsed trailing bytes: {remainder:?}"
    );
    value
}

/// [test_parsed_completely] for parsers that take two external inputs.
pub fn test_parsed_completely_with_two_inputs<'a, I1, I2, T, E>(
    input: &'a [u8],
    input1: I1,
    input2: I2,
    expected: &T,
) -> T
where
    T: ReadablePduWithTwoInputs<'a, I1, I2, E> + PartialEq + Debug,
    E: Debug,
{
    let parsed = T::from_wire(Span::new(input), input1, input2);
    assert!(parsed.is_ok(), "unexpected parse error: {parsed:?}");
    let (remainder, value) = parsed.unwrap();
    assert_eq!(&value, expected);
    assert!(
        remainder.is_empty(),
        "unparsed trailing bytes: {remainder:?}"
    );
    value
}

/// Assert the buffer fails to parse with exactly the expected error.
pub fn test_parse_error<'a, T, E>(input: &'a [u8], expected_err: &nom::Err<E>)
where
    T: ReadablePdu<'a, E> + Debug,
    E: Debug + PartialEq,
{
    let parsed = T::from_wire(Span::new(input));
    match parsed {
        Ok(value) => panic!("expected parse error, got: {value:?}"),
        Err(err) => assert_eq!(&err, expected_err),
    }
}

/// [test_parse_error] for parsers that take one external input.
pub fn test_parse_error_with_one_input<'a, I, T, E>(
    input: &'a [u8],
    parser_input: I,
    expected_err: &nom::Err<E>,
) where
    T: ReadablePduWithOneInput<'a, I, E> + Debug,
    E: Debug + PartialEq,
{
    let parsed = T::from_wire(Span::new(input), parser_input);
    match parsed {
        Ok(value) => panic!("expected parse error, got: {value:?}"),
        Err(err) => assert_eq!(&err, expected_err),
    }
}

/// Assert the value serializes to exactly the expected wire bytes and
/// that its computed length matches.
pub fn test_write<T, E>(value: &T, expected: &[u8]) -> Result<(), E>
where
    T: WritablePdu<E>,
    E: Debug,
{
    let mut buf = Vec::with_capacity(value.len());
    value.write(&mut buf)?;
    assert_eq!(buf, expected);
    assert_eq!(value.len(), expected.len());
    Ok(())
}

/// [test_write] for writers that take one external input.
pub fn test_write_with_one_input<T, I: Copy, E>(
    value: &T,
    input: I,
    expected: &[u8],
) -> Result<(), E>
where
    T: WritablePduWithOneInput<I, E>,
    E: Debug,
{
    let mut buf = Vec::with_capacity(value.len(input));
    value.write(&mut buf, input)?;
    assert_eq!(buf, expected);
    assert_eq!(value.len(input), expected.len());
    Ok(())
}
