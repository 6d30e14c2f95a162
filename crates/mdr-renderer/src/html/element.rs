//! HTML element tree produced by the built-in host.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::escape_html;
use crate::util::is_valid_name;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// HTML attribute map. `None` renders as a bare attribute (`<input disabled>`).
pub type HtmlAttributes = BTreeMap<String, Option<String>>;

/// Rendered node of the HTML host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Element {
    /// An element with a tag name.
    Tag {
        name: String,
        attributes: HtmlAttributes,
        children: Vec<Element>,
    },
    /// Text, escaped on output.
    Text(String),
    /// Pre-built markup emitted verbatim (icons).
    Raw(String),
    /// Children without a wrapping element.
    Fragment(Vec<Element>),
}

impl Element {
    /// Create an element without attributes.
    #[must_use]
    pub fn tag(name: impl Into<String>, children: Vec<Element>) -> Self {
        Self::Tag {
            name: name.into(),
            attributes: HtmlAttributes::new(),
            children,
        }
    }

    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Set an attribute. No-op on anything but [`Element::Tag`].
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Tag { attributes, .. } = &mut self {
            attributes.insert(key.into(), Some(value.into()));
        }
        self
    }

    /// Merge attributes, overwriting existing keys. No-op on anything but
    /// [`Element::Tag`].
    #[must_use]
    pub fn with_attrs(mut self, extra: HtmlAttributes) -> Self {
        if let Self::Tag { attributes, .. } = &mut self {
            attributes.extend(extra);
        }
        self
    }

    /// Tag name, for [`Element::Tag`].
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Tag { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Attribute value, for [`Element::Tag`]. Bare attributes read as `""`.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Self::Tag { attributes, .. } => attributes
                .get(key)
                .map(|value| value.as_deref().unwrap_or("")),
            _ => None,
        }
    }

    /// Child elements (empty for text and raw markup).
    #[must_use]
    pub fn children(&self) -> &[Element] {
        match self {
            Self::Tag { children, .. } | Self::Fragment(children) => children,
            Self::Text(_) | Self::Raw(_) => &[],
        }
    }

    /// Concatenated text of this element and its descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Raw(_) => {}
            Self::Tag { children, .. } | Self::Fragment(children) => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Serialize to HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(256);
        self.write_html(&mut out);
        out
    }

    /// Serialize to HTML, appending to `out`.
    ///
    /// Attributes whose key is not a valid attribute name are skipped.
    pub fn write_html(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(&escape_html(text)),
            Self::Raw(markup) => out.push_str(markup),
            Self::Fragment(children) => {
                for child in children {
                    child.write_html(out);
                }
            }
            Self::Tag {
                name,
                attributes,
                children,
            } => {
                out.push('<');
                out.push_str(name);
                for (key, value) in attributes.iter().filter(|(key, _)| is_valid_name(key)) {
                    match value {
                        Some(value) => {
                            write!(out, r#" {key}="{}""#, escape_html(value)).unwrap();
                        }
                        None => {
                            out.push(' ');
                            out.push_str(key);
                        }
                    }
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&name.as_str()) {
                    return;
                }
                for child in children {
                    child.write_html(out);
                }
                write!(out, "</{name}>").unwrap();
            }
        }
    }
}
