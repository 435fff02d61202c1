//! Tuple-list literal parsing.
//!
//! Stations and devices are entered as a list of numeric tuples, for example
//! `[(0, 0, 10), (20, 20, 5)]` or `[(0, 0), (100, 100)]`. The outer sequence
//! may use `[...]` or `(...)` (or be left bare with top-level commas), inner
//! entries may be tuples or lists, and trailing commas are allowed.
//!
//! As with Python literals, a parenthesized single value without a trailing
//! comma is grouping, not a tuple: `(5)` is the number 5 and `((0, 0, 10))`
//! is a single tuple rather than a list holding one.
//!
//! Nothing is coerced. Wrong arity, non-numeric values and non-finite numbers
//! are all rejected, as are stations whose power could overflow and brackets
//! nested deeper than [`MAX_DEPTH`].

use thiserror::Error;

use crate::model::{Device, LinkStation};

/// Deepest bracket nesting accepted. Valid input needs two levels; the rest
/// leaves room for redundant grouping parentheses.
pub const MAX_DEPTH: usize = 32;

/// Errors that can occur when parsing a tuple-list literal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TupleError {
    #[error("empty input")]
    EmptyInput,

    #[error("unexpected end of input, expected {0}")]
    UnexpectedEnd(&'static str),

    #[error("unexpected '{found}' at position {pos}, expected {expected}")]
    UnexpectedChar {
        pos: usize,
        found: char,
        expected: &'static str,
    },

    #[error("invalid number '{text}' at position {pos}")]
    InvalidNumber { pos: usize, text: String },

    #[error("number '{text}' at position {pos} is not finite")]
    NonFinite { pos: usize, text: String },

    #[error("expected a sequence of tuples, found a single number")]
    NotASequence,

    #[error("entry {index} is a bare number, expected a tuple")]
    NotATuple { index: usize },

    #[error("entry {index} has {found} values, expected {expected}")]
    WrongArity {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("entry {index} contains a nested sequence where a number was expected")]
    Nested { index: usize },

    #[error("brackets nested more than {limit} deep at position {pos}")]
    TooDeep { pos: usize, limit: usize },

    #[error("entry {index} has a reach too large for its power to be represented")]
    ReachTooLarge { index: usize },
}

/// Parses `(x, y, reach)` tuples into stations.
pub fn parse_stations(input: &str) -> Result<Vec<LinkStation>, TupleError> {
    parse_entries::<3>(input)?
        .into_iter()
        .enumerate()
        .map(|(index, [x, y, reach])| {
            let station = LinkStation::new(x, y, reach);
            if station.has_finite_power() {
                Ok(station)
            } else {
                Err(TupleError::ReachTooLarge { index })
            }
        })
        .collect()
}

/// Parses `(x, y)` tuples into devices.
pub fn parse_devices(input: &str) -> Result<Vec<Device>, TupleError> {
    Ok(parse_entries::<2>(input)?
        .into_iter()
        .map(|[x, y]| Device::new(x, y))
        .collect())
}

/// Parses a sequence of fixed-arity numeric tuples.
pub fn parse_entries<const N: usize>(input: &str) -> Result<Vec<[f64; N]>, TupleError> {
    let items = match parse_literal(input)? {
        Literal::Number(_) => return Err(TupleError::NotASequence),
        Literal::Seq(items) => items,
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let values = match item {
                Literal::Number(_) => return Err(TupleError::NotATuple { index }),
                Literal::Seq(values) => values,
            };
            if values.len() != N {
                return Err(TupleError::WrongArity {
                    index,
                    expected: N,
                    found: values.len(),
                });
            }
            let mut entry = [0.0; N];
            for (slot, value) in entry.iter_mut().zip(values) {
                match value {
                    Literal::Number(n) => *slot = n,
                    Literal::Seq(_) => return Err(TupleError::Nested { index }),
                }
            }
            Ok(entry)
        })
        .collect()
}

/// A parsed literal: a number or a (possibly nested) sequence.
#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Number(f64),
    Seq(Vec<Literal>),
}

/// Parses a whole input string into a literal tree.
fn parse_literal(input: &str) -> Result<Literal, TupleError> {
    if input.trim().is_empty() {
        return Err(TupleError::EmptyInput);
    }

    let mut cursor = Cursor {
        src: input,
        pos: 0,
        depth: 0,
    };
    let first = cursor.value()?;
    cursor.skip_ws();

    match cursor.peek() {
        None => Ok(first),
        Some(',') => {
            // Bare top-level tuple: `(0, 0), (1, 1)`
            cursor.bump();
            let (mut rest, _) = cursor.items(None)?;
            let mut items = vec![first];
            items.append(&mut rest);
            Ok(Literal::Seq(items))
        }
        Some(found) => Err(TupleError::UnexpectedChar {
            pos: cursor.pos,
            found,
            expected: "',' or end of input",
        }),
    }
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn value(&mut self) -> Result<Literal, TupleError> {
        self.skip_ws();
        match self.peek() {
            None => Err(TupleError::UnexpectedEnd("a number, '(' or '['")),
            Some('[') => {
                let (items, _) = self.nested(']')?;
                Ok(Literal::Seq(items))
            }
            Some('(') => {
                let (mut items, trailing_comma) = self.nested(')')?;
                if items.len() == 1 && !trailing_comma {
                    Ok(items.remove(0))
                } else {
                    Ok(Literal::Seq(items))
                }
            }
            Some(c) if c.is_ascii_digit() || matches!(c, '+' | '-' | '.') => self.number(),
            Some(found) => Err(TupleError::UnexpectedChar {
                pos: self.pos,
                found,
                expected: "a number, '(' or '['",
            }),
        }
    }

    /// Consumes an opening bracket and parses its items up to `close`.
    fn nested(&mut self, close: char) -> Result<(Vec<Literal>, bool), TupleError> {
        if self.depth == MAX_DEPTH {
            return Err(TupleError::TooDeep {
                pos: self.pos,
                limit: MAX_DEPTH,
            });
        }
        self.bump();
        self.depth += 1;
        let parsed = self.items(Some(close));
        self.depth -= 1;
        parsed
    }

    /// Parses comma-separated values up to `close` (or end of input when
    /// `close` is `None`). The opening bracket is already consumed.
    /// Returns the items and whether the last one was followed by a comma.
    fn items(&mut self, close: Option<char>) -> Result<(Vec<Literal>, bool), TupleError> {
        let mut items = Vec::new();
        let mut trailing_comma = false;

        loop {
            self.skip_ws();
            if self.peek() == close {
                self.bump();
                return Ok((items, trailing_comma));
            }

            items.push(self.value()?);
            trailing_comma = false;
            self.skip_ws();

            match self.peek() {
                Some(',') => {
                    self.bump();
                    trailing_comma = true;
                }
                c if c == close => {}
                None => return Err(TupleError::UnexpectedEnd("',' or a closing bracket")),
                Some(found) => {
                    return Err(TupleError::UnexpectedChar {
                        pos: self.pos,
                        found,
                        expected: "',' or a closing bracket",
                    })
                }
            }
        }
    }

    fn number(&mut self) -> Result<Literal, TupleError> {
        let start = self.pos;
        if matches!(self.peek(), Some('+' | '-')) {
            self.bump();
        }

        let mut prev = None;
        while let Some(c) = self.peek() {
            let exponent_sign = matches!(c, '+' | '-') && matches!(prev, Some('e' | 'E'));
            if !(c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '_') || exponent_sign) {
                break;
            }
            prev = Some(c);
            self.bump();
        }

        let text = &self.src[start..self.pos];
        let invalid = || TupleError::InvalidNumber {
            pos: start,
            text: text.to_string(),
        };

        if !underscores_between_digits(text) {
            return Err(invalid());
        }
        let value: f64 = text.replace('_', "").parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(TupleError::NonFinite {
                pos: start,
                text: text.to_string(),
            });
        }
        Ok(Literal::Number(value))
    }
}

/// Digit separators are only allowed between two digits (`1_000`).
fn underscores_between_digits(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.iter().enumerate().all(|(i, &b)| {
        b != b'_'
            || (i > 0
                && i + 1 < bytes.len()
                && bytes[i - 1].is_ascii_digit()
                && bytes[i + 1].is_ascii_digit())
    })
}
