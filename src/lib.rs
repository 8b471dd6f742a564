//! Layered setup.cfg-style configuration.
//!
//! A [`Document`] is parsed once from text and is immutable afterwards. Values
//! are stored as raw strings and coerced explicitly by typed accessors such as
//! [`Document::get_list`] and [`Document::get_rule_set`]. Several documents can
//! be layered with [`merge::merge_all`].
//!
//! ```
//! use layercfg::Document;
//!
//! let doc = Document::parse("[flake8]\nignore = W503,W504,I100\n")?;
//! let ignore = doc.get_rule_set("flake8", "ignore").expect("valid rule codes");
//! assert_eq!(ignore.iter().collect::<Vec<_>>(), ["W503", "W504", "I100"]);
//! # Ok::<(), layercfg::ParseError>(())
//! ```

#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]

pub mod discover;
mod error;
pub mod interpolate;
pub mod merge;
mod parser;
mod section;
mod value;

use std::io::Read;
use std::path::Path;
use std::{char, fmt, fs};

use tracing::debug;

pub use error::{ParseError, ValidationError};
pub use section::{Entry, Section};
pub use value::{RuleSet, Value, ValueKind};

use interpolate::Interpolator;
use parser::Parser;
use value::{describe_options, is_rule_code, parse_bool, split_list};

/// Byte Order Mark (BOM) is used to signal the endianness of an encoding. The order `0xFF 0xFE`
/// strongly suggests that the encoding is using little-endian byte order.
///
/// <https://en.wikipedia.org/wiki/Byte_order_mark>
const BOM_UTF16_LE: &[u8] = &[0xFF, 0xFE];
const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];

/// An immutable, ordered collection of uniquely named sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let sections = Parser::new(text).into_sections()?;
        debug!(sections = sections.len(), "parsed document");
        Ok(Self { sections })
    }

    pub fn from_bytes(buffer: &[u8]) -> Result<Self, ParseError> {
        Self::parse(&decode_data(buffer))
    }

    pub fn from_reader<R>(reader: &mut R) -> Result<Self, ParseError>
    where
        R: Read,
    {
        let mut buffer = Vec::with_capacity(4096);
        reader.read_to_end(&mut buffer)?;
        Self::from_bytes(&buffer)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let buffer = fs::read(path.as_ref())?;
        Self::from_bytes(&buffer)
    }

    pub(crate) fn from_sections(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Merge `overlay` on top of `self`. See [`merge::merge`].
    #[must_use]
    pub fn merge(&self, overlay: &Document) -> Document {
        merge::merge(self, overlay)
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name() == name)
    }

    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    #[must_use]
    pub fn contains_key(&self, section: &str, key: &str) -> bool {
        self.section(section).is_some_and(|s| s.contains_key(key))
    }

    /// The stored value, untrimmed and uninterpreted.
    #[must_use]
    pub fn raw(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?.get(key)
    }

    /// Trimmed raw value, or `default` when absent.
    #[must_use]
    pub fn get_scalar<'a>(&'a self, section: &str, key: &str, default: &'a str) -> &'a str {
        self.raw(section, key).map_or(default, str::trim)
    }

    /// Elements split on newlines, commas and whitespace. Empty when absent.
    #[must_use]
    pub fn get_list(&self, section: &str, key: &str) -> Vec<&str> {
        self.raw(section, key).map(split_list).unwrap_or_default()
    }

    /// Deduplicated rule codes, validated against the rule code grammar.
    pub fn get_rule_set(&self, section: &str, key: &str) -> Result<RuleSet, ValidationError> {
        let mut rules = RuleSet::new();

        for token in self.get_list(section, key) {
            if !is_rule_code(token) {
                return Err(ValidationError::InvalidRuleCode {
                    section: section.to_owned(),
                    key: key.to_owned(),
                    token: token.to_owned(),
                });
            }
            rules.insert(token);
        }

        Ok(rules)
    }

    pub fn get_bool(
        &self,
        section: &str,
        key: &str,
        default: bool,
    ) -> Result<bool, ValidationError> {
        let Some(value) = self.raw(section, key).map(str::trim) else {
            return Ok(default);
        };

        parse_bool(value).ok_or_else(|| ValidationError::InvalidBool {
            section: section.to_owned(),
            key: key.to_owned(),
            value: value.to_owned(),
        })
    }

    pub fn get_int(
        &self,
        section: &str,
        key: &str,
        default: i64,
    ) -> Result<i64, ValidationError> {
        let Some(value) = self.raw(section, key).map(str::trim) else {
            return Ok(default);
        };

        value.parse().map_err(|_| ValidationError::InvalidInt {
            section: section.to_owned(),
            key: key.to_owned(),
            value: value.to_owned(),
        })
    }

    /// The value if it is one of `allowed`, or `default` when absent.
    pub fn get_choice<'a>(
        &'a self,
        section: &str,
        key: &str,
        allowed: &[&str],
        default: &'a str,
    ) -> Result<&'a str, ValidationError> {
        let value = self.get_scalar(section, key, default);

        if allowed.contains(&value) {
            Ok(value)
        } else {
            Err(ValidationError::InvalidChoice {
                section: section.to_owned(),
                key: key.to_owned(),
                value: value.to_owned(),
                options: describe_options(allowed),
            })
        }
    }

    /// The trimmed value with `%(name)s` references expanded from the same section or `[DEFAULT]`.
    pub fn get_interpolated(
        &self,
        section: &str,
        key: &str,
    ) -> Result<Option<String>, ValidationError> {
        let Some(value) = self.raw(section, key) else {
            return Ok(None);
        };

        Interpolator::new(self, section, key)
            .expand(value.trim(), 0)
            .map(Some)
    }

    /// Typed lookup; `None` when the key is absent.
    pub fn get(
        &self,
        section: &str,
        key: &str,
        kind: ValueKind,
    ) -> Result<Option<Value>, ValidationError> {
        if !self.contains_key(section, key) {
            return Ok(None);
        }

        let value = match kind {
            ValueKind::Scalar => Value::from(self.get_scalar(section, key, "").to_owned()),
            ValueKind::List => Value::from(
                self.get_list(section, key)
                    .into_iter()
                    .map(str::to_owned)
                    .collect::<Vec<_>>(),
            ),
            ValueKind::RuleSet => Value::from(self.get_rule_set(section, key)?),
        };

        Ok(Some(value))
    }
}

/// Canonical text form; parsing it again yields an equal document.
impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{section}")?;
        }
        Ok(())
    }
}

// Python tooling writes UTF-8, but files saved from some Windows editors are UTF-16 LE.
fn decode_data(data: &[u8]) -> String {
    if let Some(rest) = data.strip_prefix(BOM_UTF16_LE) {
        let utf16 = rest
            .chunks_exact(2)
            .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
            .collect::<Vec<u16>>();

        char::decode_utf16(utf16)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect::<String>()
    } else {
        let data = data.strip_prefix(BOM_UTF8).unwrap_or(data);
        String::from_utf8_lossy(data).into_owned()
    }
}
