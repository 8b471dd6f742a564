use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Letter prefix plus optional digits, or a glob containing `*`; either may be negated with `!`.
static RULE_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^!?(?:[A-Za-z]+[0-9]*|[A-Za-z0-9]*\*[A-Za-z0-9*]*)$")
        .expect("rule code pattern is valid")
});

/// How a raw value should be interpreted by [`crate::Document::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Scalar,
    List,
    RuleSet,
}

/// A raw value after typed coercion.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Scalar(String),
    List(Vec<String>),
    RuleSet(RuleSet),
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::List(value)
    }
}

impl From<RuleSet> for Value {
    fn from(value: RuleSet) -> Self {
        Value::RuleSet(value)
    }
}

/// Insertion-ordered, duplicate-free set of rule codes such as `E501` or `W5*`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    codes: Vec<String>,
}

impl RuleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `code` unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, code: impl Into<String>) -> bool {
        let code = code.into();
        if self.contains(&code) {
            return false;
        }
        self.codes.push(code);
        true
    }

    /// Exact token membership.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    /// Whether a reported code such as `E501` is covered by this set.
    ///
    /// Plain tokens match by prefix (`E` covers `E501`), globs match with `*` as a
    /// wildcard, and any matching `!` token excludes the code outright.
    #[must_use]
    pub fn matches(&self, code: &str) -> bool {
        let mut selected = false;

        for token in &self.codes {
            let (negated, pattern) = match token.strip_prefix('!') {
                Some(pattern) => (true, pattern),
                None => (false, token.as_str()),
            };

            if pattern_matches(pattern, code) {
                if negated {
                    return false;
                }
                selected = true;
            }
        }

        selected
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.codes.join(","))
    }
}

fn pattern_matches(pattern: &str, code: &str) -> bool {
    if pattern.contains('*') {
        glob_matches(pattern.as_bytes(), code.as_bytes())
    } else {
        code.starts_with(pattern)
    }
}

/// `*`-only glob matching with single-star backtracking.
fn glob_matches(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut star = None::<(usize, usize)>;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            star = Some((p, t));
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some((sp, st)) = star {
            p = sp + 1;
            t = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&b| b == b'*')
}

/// Split a raw value on newlines, commas and whitespace, dropping empty elements.
pub(crate) fn split_list(raw: &str) -> Vec<&str> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect()
}

pub(crate) fn is_rule_code(token: &str) -> bool {
    RULE_CODE.is_match(token)
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

/// "Allowed values are 'a', 'b', and 'c'" or "The only allowed value is 'a'".
pub(crate) fn describe_options(allowed: &[&str]) -> String {
    match allowed {
        [] => "No values are allowed".to_owned(),
        [only] => format!("The only allowed value is '{only}'"),
        [init @ .., last] => {
            let init = init
                .iter()
                .map(|v| format!("'{v}'"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("Allowed values are {init}, and '{last}'")
        }
    }
}
