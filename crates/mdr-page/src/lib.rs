//! Documentation page bundles.
//!
//! A [`PageBundle`] is the static half of a compiled documentation page:
//! front matter, document metadata (permalink, edit URL, sidebar neighbours),
//! the table of contents, and the pre-parsed content tree. Rendering hands the
//! content to [`mdr_renderer`] wrapped in a `wrapper` node, so hosts can
//! replace the page layout through the same registry as every other tag.
//!
//! # Example
//!
//! ```
//! use mdr_page::PageBundle;
//! use mdr_renderer::html;
//!
//! let bundle = PageBundle::from_json(r#"{
//!     "front_matter": {"title": "Snowflake"},
//!     "content": [{"tag": "paragraph", "children": [{"tag": "text", "attributes": {"value": "Hi"}}]}]
//! }"#).unwrap();
//!
//! let page = bundle.render(html::default_registry()).unwrap();
//! assert_eq!(page.title, "Snowflake");
//! assert_eq!(page.body.to_html(), "<p>Hi</p>");
//! ```

mod bundle;
mod render;
mod toc;

pub use bundle::{DocMetadata, FrontMatter, NavLink, PageBundle};
pub use render::RenderedPage;
pub use toc::TocEntry;

use mdr_renderer::BuildError;

/// Error type for page bundle operations.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// I/O error while reading a bundle.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The bundle is not valid JSON or does not match the bundle shape.
    #[error("Invalid page bundle: {0}")]
    Json(#[from] serde_json::Error),
    /// The bundle parsed but is inconsistent.
    #[error("Page validation error: {0}")]
    Validation(String),
    /// Building the content tree failed.
    #[error(transparent)]
    Build(#[from] BuildError),
}
