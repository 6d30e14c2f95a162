//! Default renderers of the HTML host.

#![allow(clippy::unnecessary_wraps)]

use crate::util::is_valid_name;
use crate::{PropMap, PropValue, Props, RenderError, heading_level};

use super::element::{Element, HtmlAttributes};

// SVG icons for admonitions (GitHub Octicons-style, 16x16)
const SVG_INFO: &str = r#"<svg class="admonition-icon" viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path d="M0 8a8 8 0 1 1 16 0A8 8 0 0 1 0 8Zm8-6.5a6.5 6.5 0 1 0 0 13 6.5 6.5 0 0 0 0-13ZM6.5 7.75A.75.75 0 0 1 7.25 7h1a.75.75 0 0 1 .75.75v2.75h.25a.75.75 0 0 1 0 1.5h-2a.75.75 0 0 1 0-1.5h.25v-2h-.25a.75.75 0 0 1-.75-.75ZM8 6a1 1 0 1 1 0-2 1 1 0 0 1 0 2Z"></path></svg>"#;
const SVG_LIGHTBULB: &str = r#"<svg class="admonition-icon" viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path d="M8 1.5c-2.363 0-4 1.69-4 3.75 0 .984.424 1.625.984 2.304l.214.253c.223.264.47.556.673.848.284.411.537.896.621 1.49a.75.75 0 0 1-1.484.211c-.04-.282-.163-.547-.37-.847a8.456 8.456 0 0 0-.542-.68c-.084-.1-.173-.205-.268-.32C3.201 7.75 2.5 6.766 2.5 5.25 2.5 2.31 4.863 0 8 0s5.5 2.31 5.5 5.25c0 1.516-.701 2.5-1.328 3.259-.095.115-.184.22-.268.319-.207.245-.383.453-.541.681-.208.3-.33.565-.37.847a.751.751 0 0 1-1.485-.212c.084-.593.337-1.078.621-1.489.203-.292.45-.584.673-.848.075-.088.147-.173.213-.253.561-.679.985-1.32.985-2.304 0-2.06-1.637-3.75-4-3.75ZM5.75 12h4.5a.75.75 0 0 1 0 1.5h-4.5a.75.75 0 0 1 0-1.5ZM6 15.25a.75.75 0 0 1 .75-.75h2.5a.75.75 0 0 1 0 1.5h-2.5a.75.75 0 0 1-.75-.75Z"></path></svg>"#;
const SVG_ALERT: &str = r#"<svg class="admonition-icon" viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path d="M6.457 1.047c.659-1.234 2.427-1.234 3.086 0l6.082 11.378A1.75 1.75 0 0 1 14.082 15H1.918a1.75 1.75 0 0 1-1.543-2.575Zm1.763.707a.25.25 0 0 0-.44 0L1.698 13.132a.25.25 0 0 0 .22.368h12.164a.25.25 0 0 0 .22-.368Zm.53 3.996v2.5a.75.75 0 0 1-1.5 0v-2.5a.75.75 0 0 1 1.5 0ZM9 11a1 1 0 1 1-2 0 1 1 0 0 1 2 0Z"></path></svg>"#;
const SVG_STOP: &str = r#"<svg class="admonition-icon" viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path d="M4.47.22A.749.749 0 0 1 5 0h6c.199 0 .389.079.53.22l4.25 4.25c.141.14.22.331.22.53v6a.749.749 0 0 1-.22.53l-4.25 4.25A.749.749 0 0 1 11 16H5a.749.749 0 0 1-.53-.22L.22 11.53A.749.749 0 0 1 0 11V5c0-.199.079-.389.22-.53Zm.84 1.28L1.5 5.31v5.38l3.81 3.81h5.38l3.81-3.81V5.31L10.69 1.5ZM8 4a.75.75 0 0 1 .75.75v3.5a.75.75 0 0 1-1.5 0v-3.5A.75.75 0 0 1 8 4Zm0 8a1 1 0 1 1 0-2 1 1 0 0 1 0 2Z"></path></svg>"#;

/// Admonition flavor (`:::note`, `:::caution`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdmonitionKind {
    Note,
    Tip,
    Info,
    Caution,
    Danger,
}

impl AdmonitionKind {
    /// Parse a kind name; unknown names fall back to [`AdmonitionKind::Note`].
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "tip" => Self::Tip,
            "info" => Self::Info,
            "caution" | "warning" => Self::Caution,
            "danger" => Self::Danger,
            _ => Self::Note,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Tip => "tip",
            Self::Info => "info",
            Self::Caution => "caution",
            Self::Danger => "danger",
        }
    }

    /// Alert flavor class (`alert--{flavor}`).
    fn alert(self) -> &'static str {
        match self {
            Self::Note => "secondary",
            Self::Tip => "success",
            Self::Info => "info",
            Self::Caution => "warning",
            Self::Danger => "danger",
        }
    }

    fn icon(self) -> &'static str {
        match self {
            Self::Note | Self::Info => SVG_INFO,
            Self::Tip => SVG_LIGHTBULB,
            Self::Caution => SVG_ALERT,
            Self::Danger => SVG_STOP,
        }
    }
}

/// Convert forwarded props to HTML attributes, skipping `skip` keys.
///
/// Strings pass as-is, numbers are formatted, `true` becomes a bare
/// attribute, `false` is omitted. Nodes, lists and maps have no HTML form
/// and are dropped, as are keys that are not valid attribute names.
/// `className` is written as `class`.
pub(crate) fn html_attributes(attributes: &PropMap<Element>, skip: &[&str]) -> HtmlAttributes {
    attributes
        .iter()
        .filter(|(key, _)| !skip.contains(&key.as_str()) && is_valid_name(key))
        .filter_map(|(key, value)| {
            let key = if key == "className" { "class" } else { key.as_str() };
            let value = match value {
                PropValue::String(s) => Some(s.clone()),
                PropValue::Integer(n) => Some(n.to_string()),
                PropValue::Number(n) => Some(n.to_string()),
                PropValue::Bool(true) => None,
                PropValue::Bool(false)
                | PropValue::List(_)
                | PropValue::Node(_)
                | PropValue::Map(_) => return None,
            };
            Some((key.to_owned(), value))
        })
        .collect()
}

/// A tag that cannot be written as an HTML element name.
#[derive(Debug, thiserror::Error)]
#[error("not a valid element name: {0:?}")]
pub struct InvalidElementName(pub String);

/// Element named after `name` with all forwarded attributes except `skip`.
fn element(name: &str, props: Props<'_, Element>, skip: &[&str]) -> Element {
    let attributes = html_attributes(&props.attributes, skip);
    Element::tag(name, props.children).with_attrs(attributes)
}

/// Fallback for tags without a binding: emits the tag name literally.
///
/// # Errors
///
/// Returns [`InvalidElementName`] when the tag is not a letter followed by
/// letters, digits, `-`, `_`, `.` or `:`.
pub fn passthrough(props: Props<'_, Element>) -> Result<Element, RenderError> {
    let name = props.tag;
    if !is_valid_name(name) {
        return Err(RenderError::new(InvalidElementName(name.to_owned())));
    }
    Ok(element(name, props, &[]))
}

pub(crate) fn wrapper(props: Props<'_, Element>) -> Result<Element, RenderError> {
    Ok(Element::Fragment(props.children))
}

pub(crate) fn text(props: Props<'_, Element>) -> Result<Element, RenderError> {
    Ok(Element::Text(props.get_str("value").unwrap_or_default().to_owned()))
}

pub(crate) fn paragraph(props: Props<'_, Element>) -> Result<Element, RenderError> {
    Ok(element("p", props, &[]))
}

pub(crate) fn heading(props: Props<'_, Element>) -> Result<Element, RenderError> {
    let level = heading_level(props.tag)
        .ok_or_else(|| RenderError::new(format!("not a heading tag: {}", props.tag)))?;
    Ok(element(&format!("h{level}"), props, &[]))
}

pub(crate) fn link(props: Props<'_, Element>) -> Result<Element, RenderError> {
    Ok(element("a", props, &[]))
}

pub(crate) fn code_block(props: Props<'_, Element>) -> Result<Element, RenderError> {
    let attributes = html_attributes(&props.attributes, &["language", "code"]);
    let language = props.get_str("language").map(str::to_owned);
    let code = match props.get_str("code") {
        Some(code) => vec![Element::text(code)],
        None => props.children,
    };
    let mut inner = Element::tag("code", code);
    if let Some(language) = language {
        inner = inner.with_attr("class", format!("language-{language}"));
    }
    Ok(Element::tag("pre", vec![inner]).with_attrs(attributes))
}

pub(crate) fn table(props: Props<'_, Element>) -> Result<Element, RenderError> {
    Ok(element("table", props, &[]))
}

pub(crate) fn list(props: Props<'_, Element>) -> Result<Element, RenderError> {
    let name = if props.flag("ordered") { "ol" } else { "ul" };
    Ok(element(name, props, &["ordered"]))
}

pub(crate) fn list_item(props: Props<'_, Element>) -> Result<Element, RenderError> {
    Ok(element("li", props, &[]))
}

pub(crate) fn emphasis(props: Props<'_, Element>) -> Result<Element, RenderError> {
    Ok(element("em", props, &[]))
}

pub(crate) fn strong(props: Props<'_, Element>) -> Result<Element, RenderError> {
    Ok(element("strong", props, &[]))
}

pub(crate) fn blockquote(props: Props<'_, Element>) -> Result<Element, RenderError> {
    Ok(element("blockquote", props, &[]))
}

pub(crate) fn image(props: Props<'_, Element>) -> Result<Element, RenderError> {
    Ok(element("img", props, &[]))
}

pub(crate) fn thematic_break(props: Props<'_, Element>) -> Result<Element, RenderError> {
    Ok(element("hr", props, &[]))
}

/// Admonition renderer, with or without the kind icon.
///
/// Title comes from the `title` attribute (string or built node), defaulting
/// to the kind name.
pub(crate) fn admonition(
    icons: bool,
) -> impl Fn(Props<'_, Element>) -> Result<Element, RenderError> {
    move |props: Props<'_, Element>| {
        let kind = AdmonitionKind::parse(props.get_str("kind").unwrap_or("note"));
        let title = match props.attributes.get("title") {
            Some(PropValue::Node(node)) => node.clone(),
            Some(PropValue::String(s)) => Element::text(s),
            _ => Element::text(kind.as_str()),
        };

        let mut heading = Vec::with_capacity(2);
        if icons {
            let icon = Element::Raw(kind.icon().to_owned());
            heading.push(Element::tag("span", vec![icon]).with_attr("class", "admonition-icon"));
        }
        heading.push(title);

        let class = format!(
            "admonition admonition-{} alert alert--{}",
            kind.as_str(),
            kind.alert()
        );
        let attributes = html_attributes(&props.attributes, &["kind", "title", "className"]);
        Ok(Element::tag(
            "div",
            vec![
                Element::tag("div", vec![Element::tag("h5", heading)])
                    .with_attr("class", "admonition-heading"),
                Element::tag("div", props.children).with_attr("class", "admonition-content"),
            ],
        )
        .with_attrs(attributes)
        .with_attr("class", class))
    }
}
