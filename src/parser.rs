use std::iter::Enumerate;
use std::str::Lines;

use tracing::{trace, warn};

use crate::error::ParseError;
use crate::section::Section;

const MAX_SECTION_NAME_LEN: usize = 255;

/// Represents an on-going parse.
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    lines: Enumerate<Lines<'a>>,
    sections: Vec<Section>,
    current: Option<usize>,
    last_key: Option<String>,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            sections: Vec::with_capacity(16),
            current: None,
            last_key: None,
        }
    }
}

impl Parser<'_> {
    /// Consume the input and return its sections in order of first appearance.
    pub fn into_sections(mut self) -> Result<Vec<Section>, ParseError> {
        while let Some((index, raw)) = self.lines.next() {
            self.parse_line(index + 1, raw)?;
        }

        Ok(self.sections)
    }

    fn parse_line(&mut self, line: usize, raw: &str) -> Result<(), ParseError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() || is_comment(trimmed) {
            return Ok(());
        }

        let indented = raw.starts_with(char::is_whitespace);

        if !indented && trimmed.starts_with('[') {
            let name = parse_section_header(trimmed, line)?;
            self.open_section(name, line);
            return Ok(());
        }

        let Some(current) = self.current else {
            return Err(ParseError::OrphanEntry { line });
        };

        if indented {
            // Continuation lines belong to the most recent key, even when they contain `=`.
            let entry = match self.last_key.as_deref() {
                Some(key) => self.sections[current].entry_mut(key),
                None => None,
            }
            .ok_or(ParseError::ContinuationWithoutKey { line })?;
            entry.push_line(trimmed);
            return Ok(());
        }

        let Some(equal) = trimmed.find('=') else {
            return Err(ParseError::MissingDelimiter {
                line,
                text: trimmed.to_owned(),
            });
        };

        let key = trimmed[..equal].trim();
        if key.is_empty() {
            return Err(ParseError::EmptyKey { line });
        }
        let value = trimmed[equal + 1..].trim();

        let section = &mut self.sections[current];
        if section.set(key.to_owned(), value.to_owned()).is_some() {
            warn!(section = section.name(), key, line, "duplicate key replaces earlier value");
        }
        self.last_key = Some(key.to_owned());

        Ok(())
    }

    /// Duplicate headers reopen the existing section so names stay unique.
    fn open_section(&mut self, name: String, line: usize) {
        self.last_key = None;

        if let Some(i) = self.sections.iter().position(|s| s.name() == name) {
            warn!(section = %name, line, "reopening section declared earlier");
            self.current = Some(i);
        } else {
            trace!(section = %name, line, "section");
            self.sections.push(Section::new(name, Vec::with_capacity(8)));
            self.current = Some(self.sections.len() - 1);
        }
    }
}

fn is_comment(trimmed: &str) -> bool {
    trimmed.starts_with('#') || trimmed.starts_with(';')
}

/// Parse a `[name]` line. Only whitespace or a comment may follow the closing bracket.
fn parse_section_header(trimmed: &str, line: usize) -> Result<String, ParseError> {
    let malformed = || ParseError::MalformedHeader {
        line,
        text: trimmed.to_owned(),
    };

    let inner = &trimmed[1..];
    let close = inner.find(']').ok_or_else(malformed)?;
    let name = &inner[..close];
    let rest = inner[close + 1..].trim_start();

    if name.contains('[') || !(rest.is_empty() || is_comment(rest)) {
        return Err(malformed());
    }

    let name = name.trim();
    if name.is_empty() {
        return Err(ParseError::SectionNameEmpty { line });
    } else if name.chars().count() > MAX_SECTION_NAME_LEN {
        return Err(ParseError::SectionNameTooLong { line });
    }

    Ok(name.to_owned())
}
