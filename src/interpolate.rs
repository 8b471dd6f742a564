use std::cell::Cell;
use std::iter::Peekable;
use std::str::Chars;

use crate::Document;
use crate::error::ValidationError;

/// Section consulted when a reference is not defined in the requesting section.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Maximum nesting of `%(name)s` references before giving up, which also stops cycles.
pub const MAX_DEPTH: usize = 10;

/// Maximum number of references expanded for one lookup, which bounds fan-out.
pub const MAX_EXPANSIONS: usize = 1000;

/// Expands `%(name)s` references for a single (section, key) lookup.
pub(crate) struct Interpolator<'a> {
    document: &'a Document,
    section: &'a str,
    key: &'a str,
    expansions: Cell<usize>,
}

impl<'a> Interpolator<'a> {
    pub(crate) fn new(document: &'a Document, section: &'a str, key: &'a str) -> Self {
        Self {
            document,
            section,
            key,
            expansions: Cell::new(0),
        }
    }

    pub(crate) fn expand(&self, value: &str, depth: usize) -> Result<String, ValidationError> {
        if depth > MAX_DEPTH {
            return Err(ValidationError::InterpolationDepth {
                section: self.section.to_owned(),
                key: self.key.to_owned(),
                max: MAX_DEPTH,
            });
        }

        let mut result = String::with_capacity(value.len());
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                result.push(c);
                continue;
            }

            match chars.next() {
                // Escaped percent: %%
                Some('%') => result.push('%'),
                Some('(') => {
                    let name = self.read_reference(&mut chars, value)?;
                    self.count_expansion()?;
                    let replacement =
                        self.lookup(&name)
                            .ok_or_else(|| ValidationError::MissingReference {
                                section: self.section.to_owned(),
                                key: self.key.to_owned(),
                                reference: name.clone(),
                            })?;
                    result.push_str(&self.expand(replacement, depth + 1)?);
                }
                _ => return Err(self.invalid(value)),
            }
        }

        Ok(result)
    }

    /// Read `name)s` after an opening `%(`.
    fn read_reference(
        &self,
        chars: &mut Peekable<Chars<'_>>,
        value: &str,
    ) -> Result<String, ValidationError> {
        let mut name = String::new();

        loop {
            match chars.next() {
                Some(')') => break,
                Some(c) => name.push(c),
                None => return Err(self.invalid(value)),
            }
        }

        if name.is_empty() || chars.next() != Some('s') {
            return Err(self.invalid(value));
        }

        Ok(name)
    }

    fn count_expansion(&self) -> Result<(), ValidationError> {
        let count = self.expansions.get() + 1;
        if count > MAX_EXPANSIONS {
            return Err(ValidationError::InterpolationTooLarge {
                section: self.section.to_owned(),
                key: self.key.to_owned(),
                max: MAX_EXPANSIONS,
            });
        }
        self.expansions.set(count);
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<&'a str> {
        self.document
            .raw(self.section, name)
            .or_else(|| self.document.raw(DEFAULT_SECTION, name))
            .map(str::trim)
    }

    fn invalid(&self, value: &str) -> ValidationError {
        ValidationError::InvalidInterpolation {
            section: self.section.to_owned(),
            key: self.key.to_owned(),
            value: value.to_owned(),
        }
    }
}
