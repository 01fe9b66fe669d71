//! Tokenizer for `Tag;key=value;key=value` settings strings
//!
//! Keys are positional: each field must appear in the order the effect
//! declares, so the reader asks for the next key by name and fails if the
//! input disagrees.

use std::fmt;
use std::str::{FromStr, Split};

use crate::error::SettingsParseError;

type ParseResult<T> = std::result::Result<T, SettingsParseError>;

/// Sequential reader over the fields of one settings string
pub(crate) struct FieldReader<'a> {
    fields: Split<'a, char>,
}

impl<'a> FieldReader<'a> {
    /// Check the leading tag and position the reader at the first field.
    pub(crate) fn open(input: &'a str, tag: &'static str) -> ParseResult<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SettingsParseError::Empty);
        }

        let mut fields = input.split(';');
        let found = fields.next().unwrap_or_default();
        if found != tag {
            return Err(SettingsParseError::WrongTag {
                expected: tag,
                found: found.to_string(),
            });
        }

        Ok(Self { fields })
    }

    /// Read the next field, which must be named `key`, as a `T`.
    pub(crate) fn next<T: FromStr>(&mut self, key: &str) -> ParseResult<T> {
        let raw = self.next_raw(key)?;
        raw.parse().map_err(|_| SettingsParseError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        })
    }

    /// Read the next field as an integer flag (`0` or `1`).
    pub(crate) fn next_flag(&mut self, key: &str) -> ParseResult<bool> {
        match self.next_raw(key)? {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(SettingsParseError::InvalidValue {
                key: key.to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// Read the next field and map it through `convert`.
    pub(crate) fn next_with<T, U: FromStr>(
        &mut self,
        key: &str,
        convert: impl FnOnce(U) -> Option<T>,
    ) -> ParseResult<T> {
        let raw = self.next_raw(key)?;
        raw.parse()
            .ok()
            .and_then(convert)
            .ok_or_else(|| SettingsParseError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
            })
    }

    /// Fail if anything follows the last expected field.
    pub(crate) fn finish(mut self) -> ParseResult<()> {
        match self.fields.next() {
            None => Ok(()),
            Some(extra) => Err(SettingsParseError::TrailingField(extra.to_string())),
        }
    }

    fn next_raw(&mut self, key: &str) -> ParseResult<&'a str> {
        let field = self
            .fields
            .next()
            .ok_or_else(|| SettingsParseError::MissingField(key.to_string()))?;

        let (found, value) = field.split_once('=').unwrap_or((field, ""));
        if found != key {
            return Err(SettingsParseError::UnexpectedKey {
                expected: key.to_string(),
                found: found.to_string(),
            });
        }
        Ok(value)
    }
}

/// Appends `;key=value` fields after a tag
pub(crate) struct FieldWriter<'a, 'f> {
    out: &'a mut fmt::Formatter<'f>,
}

impl<'a, 'f> FieldWriter<'a, 'f> {
    pub(crate) fn open(out: &'a mut fmt::Formatter<'f>, tag: &str) -> Result<Self, fmt::Error> {
        out.write_str(tag)?;
        Ok(Self { out })
    }

    pub(crate) fn field(&mut self, key: &str, value: impl fmt::Display) -> fmt::Result {
        write!(self.out, ";{}={}", key, value)
    }

    pub(crate) fn flag(&mut self, key: &str, value: bool) -> fmt::Result {
        self.field(key, u8::from(value))
    }
}
