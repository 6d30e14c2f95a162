//! Page rendering.

use std::sync::Arc;

use mdr_renderer::html::Element;
use mdr_renderer::{NodeDescription, Registry, build};

use crate::bundle::{NavLink, PageBundle};
use crate::toc::TocEntry;
use crate::PageError;

/// Tag of the node that wraps the whole page body.
const WRAPPER_TAG: &str = "wrapper";

/// Result of rendering a page bundle.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedPage<N> {
    pub title: String,
    pub description: String,
    pub permalink: String,
    pub toc: Vec<TocEntry>,
    pub previous: Option<NavLink>,
    pub next: Option<NavLink>,
    /// Rendered `wrapper` node holding the page content.
    pub body: N,
}

impl PageBundle {
    /// The node tree that [`render`](Self::render) builds: the content
    /// wrapped in a `wrapper` node with `title`, `description` and
    /// `permalink` attributes.
    #[must_use]
    pub fn root(&self) -> NodeDescription {
        NodeDescription::new(WRAPPER_TAG)
            .with_attr("title", self.title())
            .with_attr("description", self.metadata.description.as_str())
            .with_attr("permalink", self.metadata.permalink.as_str())
            .with_children(self.content.iter().cloned())
    }

    /// Render the page content through `registry`.
    ///
    /// An override for `wrapper` can lay out the whole page; see
    /// [`root`](Self::root).
    ///
    /// # Errors
    ///
    /// Returns `PageError::Build` if a content node is malformed or a
    /// renderer fails.
    pub fn render<N>(&self, registry: &Arc<Registry<N>>) -> Result<RenderedPage<N>, PageError> {
        let title = self.title().to_owned();
        let body = build(&self.root(), registry)?;
        tracing::debug!(title = %title, nodes = self.content.len(), "Rendered page");

        Ok(RenderedPage {
            title,
            description: self.metadata.description.clone(),
            permalink: self.metadata.permalink.clone(),
            toc: self.toc.clone(),
            previous: self.metadata.previous.clone(),
            next: self.metadata.next.clone(),
            body,
        })
    }
}

impl RenderedPage<Element> {
    /// Serialize the page as an HTML fragment: table of contents, article,
    /// and pagination links. Empty sections are omitted.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if !self.toc.is_empty() {
            parts.push(
                Element::tag("nav", vec![toc_list(&self.toc)])
                    .with_attr("class", "table-of-contents"),
            );
        }
        parts.push(Element::tag("article", vec![self.body.clone()]));
        if let Some(pagination) = self.pagination() {
            parts.push(pagination);
        }
        Element::Fragment(parts).to_html()
    }

    fn pagination(&self) -> Option<Element> {
        if self.previous.is_none() && self.next.is_none() {
            return None;
        }
        let link = |nav: &NavLink, class: &str, label: &str| {
            Element::tag(
                "a",
                vec![
                    Element::tag("div", vec![Element::text(label)])
                        .with_attr("class", "pagination-nav__sublabel"),
                    Element::tag("div", vec![Element::text(&nav.title)])
                        .with_attr("class", "pagination-nav__label"),
                ],
            )
            .with_attr("class", format!("pagination-nav__link pagination-nav__link--{class}"))
            .with_attr("href", &nav.permalink)
        };

        let mut links = Vec::with_capacity(2);
        if let Some(previous) = &self.previous {
            links.push(link(previous, "prev", "Previous"));
        }
        if let Some(next) = &self.next {
            links.push(link(next, "next", "Next"));
        }
        Some(
            Element::tag("nav", links)
                .with_attr("class", "pagination-nav")
                .with_attr("aria-label", "Docs pages"),
        )
    }
}

fn toc_list(entries: &[TocEntry]) -> Element {
    let items = entries
        .iter()
        .map(|entry| {
            let mut children = vec![
                Element::tag("a", vec![Element::text(&entry.value)])
                    .with_attr("href", format!("#{}", entry.id)),
            ];
            if !entry.children.is_empty() {
                children.push(toc_list(&entry.children));
            }
            Element::tag("li", children)
        })
        .collect();
    Element::tag("ul", items)
}
