//! Page bundle model and loading.

use std::path::Path;

use mdr_renderer::NodeDescription;
use serde::{Deserialize, Serialize};

use crate::toc::{self, TocEntry};
use crate::PageError;

/// Author-supplied front matter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontMatter {
    /// Page title.
    #[serde(default)]
    pub title: String,
    /// Label used in the sidebar (defaults to the title).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar_label: Option<String>,
    /// URL slug relative to the docs root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Override for the "edit this page" URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_edit_url: Option<String>,
}

/// Link to a neighbouring page in the sidebar order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub title: String,
    pub permalink: String,
}

/// Metadata computed by the documentation build.
///
/// All fields are optional; missing ones read as empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocMetadata {
    /// Document ID (source path without extension).
    pub id: String,
    /// Resolved title (takes precedence over the front matter title).
    pub title: String,
    /// Short description, usually the first paragraph.
    pub description: String,
    /// Absolute URL path of the page.
    pub permalink: String,
    /// "Edit this page" URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_url: Option<String>,
    /// Sidebar the page belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidebar: Option<String>,
    /// Previous page in sidebar order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<NavLink>,
    /// Next page in sidebar order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<NavLink>,
    /// Tags attached to the page.
    pub tags: Vec<String>,
}

/// One compiled documentation page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageBundle {
    #[serde(default)]
    pub front_matter: FrontMatter,
    #[serde(default)]
    pub metadata: DocMetadata,
    #[serde(default)]
    pub toc: Vec<TocEntry>,
    /// Top-level content nodes in document order.
    #[serde(default)]
    pub content: Vec<NodeDescription>,
}

impl PageBundle {
    /// Parse a bundle from JSON.
    ///
    /// # Errors
    ///
    /// Returns `PageError::Json` if the JSON is malformed or a node lacks a tag.
    pub fn from_json(json: &str) -> Result<Self, PageError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a bundle file.
    ///
    /// # Errors
    ///
    /// Returns `PageError::Io` if the file cannot be read, `PageError::Json`
    /// if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, PageError> {
        let content = std::fs::read_to_string(path)?;
        let bundle = Self::from_json(&content)?;
        tracing::debug!(
            path = %path.display(),
            nodes = bundle.content.len(),
            "Loaded page bundle"
        );
        Ok(bundle)
    }

    /// Page title: metadata title if set, otherwise the front matter title.
    #[must_use]
    pub fn title(&self) -> &str {
        if self.metadata.title.is_empty() {
            &self.front_matter.title
        } else {
            &self.metadata.title
        }
    }

    /// Sidebar label, defaulting to the title.
    #[must_use]
    pub fn sidebar_label(&self) -> &str {
        self.front_matter
            .sidebar_label
            .as_deref()
            .unwrap_or_else(|| self.title())
    }

    /// Check that the bundle is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns `PageError::Validation` if the title is empty or the table of
    /// contents has out-of-range levels, children not deeper than their
    /// parent, or duplicate anchor IDs.
    pub fn validate(&self) -> Result<(), PageError> {
        if self.title().trim().is_empty() {
            return Err(PageError::Validation("page title cannot be empty".to_owned()));
        }
        toc::validate(&self.toc)
    }
}
