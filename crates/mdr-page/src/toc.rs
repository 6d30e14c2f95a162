//! Table of contents.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::PageError;

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Heading text.
    pub value: String,
    /// Anchor ID of the heading.
    pub id: String,
    /// Heading level (2-6; the page title is the only level 1).
    pub level: u8,
    /// Nested entries.
    #[serde(default)]
    pub children: Vec<TocEntry>,
}

impl TocEntry {
    /// Create a leaf entry.
    #[must_use]
    pub fn new(value: impl Into<String>, id: impl Into<String>, level: u8) -> Self {
        Self {
            value: value.into(),
            id: id.into(),
            level,
            children: Vec::new(),
        }
    }

    /// This entry followed by all descendants, depth-first.
    #[must_use]
    pub fn flatten(&self) -> Vec<&TocEntry> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.flatten());
        }
        out
    }
}

/// Check levels and anchor uniqueness across a whole table of contents.
pub(crate) fn validate(entries: &[TocEntry]) -> Result<(), PageError> {
    let mut seen = HashSet::new();
    for entry in entries {
        validate_entry(entry, 1, &mut seen)?;
    }
    Ok(())
}

fn validate_entry<'a>(
    entry: &'a TocEntry,
    parent_level: u8,
    seen: &mut HashSet<&'a str>,
) -> Result<(), PageError> {
    if !(2..=6).contains(&entry.level) {
        return Err(PageError::Validation(format!(
            "toc entry '{}' has level {}, expected 2-6",
            entry.id, entry.level
        )));
    }
    if entry.level <= parent_level {
        return Err(PageError::Validation(format!(
            "toc entry '{}' (level {}) is not deeper than its parent (level {parent_level})",
            entry.id, entry.level
        )));
    }
    if entry.id.is_empty() {
        return Err(PageError::Validation(format!(
            "toc entry '{}' has an empty id",
            entry.value
        )));
    }
    if !seen.insert(entry.id.as_str()) {
        return Err(PageError::Validation(format!(
            "duplicate toc id '{}'",
            entry.id
        )));
    }
    for child in &entry.children {
        validate_entry(child, entry.level, seen)?;
    }
    Ok(())
}
