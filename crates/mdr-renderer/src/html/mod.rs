//! Built-in HTML host.
//!
//! Renders node descriptions into an [`Element`] tree that serializes to
//! semantic HTML5. Standard tags get dedicated renderers; everything else goes
//! through [`passthrough`], which emits the tag name literally.
//!
//! | Tag | Output |
//! |-----|--------|
//! | `wrapper` | children, no element |
//! | `text` | the `value` attribute |
//! | `paragraph` | `<p>` |
//! | `heading-1`..`heading-6` | `<h1>`..`<h6>` |
//! | `link` | `<a>` |
//! | `inline-code` | alias of `code` |
//! | `code-block` | `<pre><code class="language-…">` |
//! | `table` | `<table>` |
//! | `list` | `<ol>` if `ordered`, else `<ul>` |
//! | `list-item`, `emphasis`, `strong`, `blockquote` | `<li>`, `<em>`, `<strong>`, `<blockquote>` |
//! | `image`, `thematic-break` | `<img>`, `<hr>` |
//! | `admonition` | Docusaurus-style admonition `<div>` |

mod element;
mod renderers;

use std::sync::Arc;

pub use element::{Element, HtmlAttributes};
pub use renderers::{AdmonitionKind, InvalidElementName, passthrough};

use crate::{Overrides, Registry, RegistryCell};

/// Tuning knobs of the default HTML renderers.
#[derive(Clone, Copy, Debug)]
pub struct HtmlOptions {
    /// Render the kind icon in admonition headings.
    pub admonition_icons: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            admonition_icons: true,
        }
    }
}

/// Default bindings of the HTML host.
#[must_use]
pub fn default_overrides(options: HtmlOptions) -> Overrides<Element> {
    let mut overrides = Overrides::new()
        .render_with("wrapper", renderers::wrapper)
        .render_with("text", renderers::text)
        .render_with("paragraph", renderers::paragraph)
        .render_with("link", renderers::link)
        .alias("inline-code", "code")
        .render_with("code-block", renderers::code_block)
        .render_with("table", renderers::table)
        .render_with("list", renderers::list)
        .render_with("list-item", renderers::list_item)
        .render_with("emphasis", renderers::emphasis)
        .render_with("strong", renderers::strong)
        .render_with("blockquote", renderers::blockquote)
        .render_with("image", renderers::image)
        .render_with("thematic-break", renderers::thematic_break)
        .render_with("admonition", renderers::admonition(options.admonition_icons));
    for level in 1..=6 {
        overrides = overrides.render_with(format!("heading-{level}"), renderers::heading);
    }
    overrides
}

/// Build a fresh root registry with the default HTML bindings.
#[must_use]
pub fn new_registry(options: HtmlOptions) -> Registry<Element> {
    Registry::with_defaults(passthrough, default_overrides(options))
}

/// Build a fresh root registry with default options.
#[must_use]
pub fn new_default_registry() -> Registry<Element> {
    new_registry(HtmlOptions::default())
}

static DEFAULT_REGISTRY: RegistryCell<Element> = RegistryCell::new();

/// Process-wide default registry, created on first use.
pub fn default_registry() -> &'static Arc<Registry<Element>> {
    DEFAULT_REGISTRY.get_or_init(new_default_registry)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{NodeDescription, build};

    fn render(node: &NodeDescription, registry: &Arc<Registry<Element>>) -> String {
        build(node, registry).unwrap().to_html()
    }

    fn hello() -> NodeDescription {
        NodeDescription::new("paragraph").with_child(NodeDescription::text("hello"))
    }

    #[test]
    fn test_default_registry_is_shared() {
        assert!(Arc::ptr_eq(default_registry(), default_registry()));
    }

    #[test]
    fn test_paragraph_wraps_text() {
        assert_eq!(render(&hello(), default_registry()), "<p>hello</p>");
    }

    #[test]
    fn test_paragraph_override_keeps_text() {
        let overrides = Overrides::new().render_with("paragraph", |props| {
            Ok(Element::tag("div", props.children).with_attr("class", "para"))
        });
        let scoped = Registry::extend(default_registry(), &overrides);

        assert_eq!(render(&hello(), &scoped), r#"<div class="para">hello</div>"#);
        assert_eq!(render(&hello(), default_registry()), "<p>hello</p>");
    }

    #[test]
    fn test_inline_code_alias() {
        let node = NodeDescription::new("inline-code").with_child(NodeDescription::text("ACCOUNTADMIN"));
        assert_eq!(render(&node, default_registry()), "<code>ACCOUNTADMIN</code>");
    }

    #[test]
    fn test_local_inline_code_override() {
        let code = || NodeDescription::new("inline-code").with_child(NodeDescription::text("x"));
        let doc = NodeDescription::new("wrapper").with_children([
            NodeDescription::new("paragraph")
                .with_component("inline-code", "kbd")
                .with_child(code()),
            NodeDescription::new("paragraph").with_child(code()),
        ]);

        assert_eq!(
            render(&doc, default_registry()),
            "<p><kbd>x</kbd></p><p><code>x</code></p>"
        );
    }

    #[test]
    fn test_unknown_tag_renders_literally() {
        let node = NodeDescription::new("custom-widget")
            .with_attr("data-kind", "chart")
            .with_attr("interactive", true);
        assert_eq!(
            render(&node, default_registry()),
            r#"<custom-widget data-kind="chart" interactive></custom-widget>"#
        );
    }

    #[test]
    fn test_catch_all_override() {
        let overrides = Overrides::new().alias(crate::CATCH_ALL, "div");
        let scoped = Registry::extend(default_registry(), &overrides);
        let node = NodeDescription::new("custom-widget").with_attr("id", "w");
        assert_eq!(render(&node, &scoped), r#"<div id="w"></div>"#);
    }

    #[test]
    fn test_table_cells_pass_through() {
        let row = NodeDescription::new("tr").with_children([
            NodeDescription::new("td").with_child(NodeDescription::text("table_pattern")),
            NodeDescription::new("td").with_attr("align", "left"),
        ]);
        let table = NodeDescription::new("table").with_child(NodeDescription::new("tbody").with_child(row));
        assert_eq!(
            render(&table, default_registry()),
            r#"<table><tbody><tr><td>table_pattern</td><td align="left"></td></tr></tbody></table>"#
        );
    }

    #[test]
    fn test_admonition_without_icons() {
        let registry = Arc::new(new_registry(HtmlOptions {
            admonition_icons: false,
        }));
        let node = NodeDescription::new("admonition")
            .with_attr("kind", "note")
            .with_attr("title", NodeDescription::new("strong").with_child(NodeDescription::text("Heads up")))
            .with_child(hello());
        assert_eq!(
            render(&node, &registry),
            concat!(
                r#"<div class="admonition admonition-note alert alert--secondary">"#,
                r#"<div class="admonition-heading"><h5><strong>Heads up</strong></h5></div>"#,
                r#"<div class="admonition-content"><p>hello</p></div></div>"#
            )
        );
    }

    #[test]
    fn test_wrapper_is_transparent() {
        let doc = NodeDescription::new("wrapper").with_children([
            NodeDescription::new("heading-1")
                .with_attr("id", "snowflake")
                .with_child(NodeDescription::text("Snowflake")),
            NodeDescription::new("thematic-break"),
        ]);
        assert_eq!(
            render(&doc, default_registry()),
            r#"<h1 id="snowflake">Snowflake</h1><hr>"#
        );
    }

    #[test]
    fn test_link_and_image() {
        let doc = NodeDescription::new("paragraph").with_children([
            NodeDescription::new("link")
                .with_attr("href", "/docs/metadata-ingestion")
                .with_child(NodeDescription::text("guide")),
            NodeDescription::new("image").with_attr("src", "a.png").with_attr("alt", "A"),
        ]);
        assert_eq!(
            render(&doc, default_registry()),
            r#"<p><a href="/docs/metadata-ingestion">guide</a><img alt="A" src="a.png"></p>"#
        );
    }
}
