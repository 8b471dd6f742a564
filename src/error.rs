use std::io;

use thiserror::Error;

/// Errors raised while loading a document. Any of these aborts the load.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read data")]
    ReadFailure {
        #[from]
        source: io::Error,
    },

    #[error("line {line}: malformed section header: {text:?}")]
    MalformedHeader { line: usize, text: String },

    #[error("line {line}: section name cannot be empty")]
    SectionNameEmpty { line: usize },

    #[error("line {line}: section name cannot exceed 255 characters")]
    SectionNameTooLong { line: usize },

    #[error("line {line}: entry found before any section header")]
    OrphanEntry { line: usize },

    #[error("line {line}: key cannot be empty")]
    EmptyKey { line: usize },

    #[error("line {line}: expected `key = value`, got {text:?}")]
    MissingDelimiter { line: usize, text: String },

    #[error("line {line}: continuation line does not follow a key")]
    ContinuationWithoutKey { line: usize },
}

impl ParseError {
    /// Line number the error was raised on, if it came from the text itself.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match *self {
            Self::ReadFailure { .. } => None,
            Self::MalformedHeader { line, .. }
            | Self::SectionNameEmpty { line }
            | Self::SectionNameTooLong { line }
            | Self::OrphanEntry { line }
            | Self::EmptyKey { line }
            | Self::MissingDelimiter { line, .. }
            | Self::ContinuationWithoutKey { line } => Some(line),
        }
    }
}

/// Errors raised by a typed accessor. They are scoped to a single key; the
/// rest of the document stays queryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("[{section}] {key}: invalid rule code {token:?}")]
    InvalidRuleCode {
        section: String,
        key: String,
        token: String,
    },

    #[error("[{section}] {key}: not a boolean: {value:?}")]
    InvalidBool {
        section: String,
        key: String,
        value: String,
    },

    #[error("[{section}] {key}: not an integer: {value:?}")]
    InvalidInt {
        section: String,
        key: String,
        value: String,
    },

    #[error("Invalid value for [{section}] {key}. {options}, but got '{value}' instead.")]
    InvalidChoice {
        section: String,
        key: String,
        value: String,
        options: String,
    },

    #[error("[{section}] {key}: bad interpolation syntax in {value:?}")]
    InvalidInterpolation {
        section: String,
        key: String,
        value: String,
    },

    #[error("[{section}] {key}: interpolation references unknown key {reference:?}")]
    MissingReference {
        section: String,
        key: String,
        reference: String,
    },

    #[error("[{section}] {key}: interpolation expands more than {max} references")]
    InterpolationTooLarge {
        section: String,
        key: String,
        max: usize,
    },

    #[error("[{section}] {key}: interpolation nested deeper than {max} levels")]
    InterpolationDepth {
        section: String,
        key: String,
        max: usize,
    },
}
