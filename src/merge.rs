//! Layering of documents, e.g. a user-level file underneath a project-level one.
//!
//! Later layers override earlier ones key by key within the same section. A key
//! written as `+name` is additive: its list elements are appended to `name`,
//! deduplicated in first-seen order.

use tracing::debug;

use crate::Document;
use crate::section::Section;
use crate::value::split_list;

/// Prefix marking an additive key.
pub const ADDITIVE_PREFIX: char = '+';

/// Merge `overlay` on top of `base`.
#[must_use]
pub fn merge(base: &Document, overlay: &Document) -> Document {
    merge_all([base, overlay])
}

/// Merge documents in order; each one overrides those before it.
///
/// Additive keys are folded into their plain names, so the result never
/// contains a `+name` key.
#[must_use]
pub fn merge_all<'a, I>(documents: I) -> Document
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut sections = Vec::<Section>::new();

    for document in documents {
        apply(&mut sections, document);
    }

    Document::from_sections(sections)
}

fn apply(sections: &mut Vec<Section>, layer: &Document) {
    for incoming in layer.sections() {
        let index = if let Some(i) = sections.iter().position(|s| s.name() == incoming.name()) {
            i
        } else {
            sections.push(Section::new(incoming.name(), Vec::new()));
            sections.len() - 1
        };
        let target = &mut sections[index];

        for entry in incoming.entries() {
            match additive_name(entry.key()) {
                Some(name) => append(target, name, entry.value()),
                None => {
                    let previous = target.set(entry.key().to_owned(), entry.value().to_owned());
                    if previous.is_some_and(|p| p != entry.value()) {
                        debug!(section = target.name(), key = entry.key(), "override");
                    }
                }
            }
        }
    }
}

fn additive_name(key: &str) -> Option<&str> {
    key.strip_prefix(ADDITIVE_PREFIX)
        .map(str::trim_start)
        .filter(|name| !name.is_empty())
}

fn append(target: &mut Section, name: &str, value: &str) {
    let mut items = Vec::<&str>::new();
    let existing = target.get(name).map(split_list).unwrap_or_default();

    for item in existing.iter().chain(split_list(value).iter()) {
        if !items.contains(item) {
            items.push(*item);
        }
    }

    debug!(section = target.name(), key = name, count = items.len(), "append");
    // One line, so no item can land at the start of a continuation line and read as a comment.
    let merged = items.join(",");
    target.set(name.to_owned(), merged);
}
