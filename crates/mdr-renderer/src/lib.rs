//! Component-composition runtime for pre-parsed documentation content.
//!
//! This crate turns a tree of [`NodeDescription`]s (produced by an upstream
//! extended-markdown parser) into a tree of rendered nodes by dispatching each
//! tag to a [`Renderer`] looked up in a [`Registry`].
//!
//! # Architecture
//!
//! - [`Registry`]: immutable tag → renderer mapping. [`Registry::extend`] layers
//!   overrides over a base registry without mutating it, so nested scopes and
//!   concurrent builds never observe each other's overrides.
//! - [`build`]: pure, post-order tree walk. Children and nested attribute nodes
//!   are built first, then the resolved renderer receives them through [`Props`].
//! - [`RegistryCell`]: single-assignment, process-wide home for a host's
//!   default registry.
//!
//! The rendered node type is a generic parameter: hosts pick whatever
//! representation they need. The [`html`] module provides a ready-made host
//! producing an [`html::Element`] tree that serializes to HTML.
//!
//! # Example
//!
//! ```
//! use mdr_renderer::{NodeDescription, Overrides, Registry, build, html};
//!
//! let doc = NodeDescription::new("paragraph").with_child(NodeDescription::text("hello"));
//!
//! let registry = html::default_registry();
//! let element = build(&doc, registry).unwrap();
//! assert_eq!(element.to_html(), "<p>hello</p>");
//!
//! let overrides = Overrides::new().alias("paragraph", "section");
//! let scoped = Registry::extend(registry, &overrides);
//! assert_eq!(build(&doc, &scoped).unwrap().to_html(), "<section>hello</section>");
//! ```

mod builder;
pub mod html;
mod node;
mod props;
mod registry;
mod renderer;
mod util;

pub use builder::{BuildError, Resolution, build, build_all, build_with};
pub use node::{AttributeValue, Attributes, NodeDescription, NodeRef, RESERVED_ATTRIBUTES};
pub use props::{PropMap, PropValue, Props};
pub use registry::{
    Binding, CATCH_ALL, MAX_ALIAS_DEPTH, Overrides, Registry, RegistryCell, Resolved,
};
pub use renderer::{RenderError, Renderer, renderer_fn};
pub use util::{escape_html, heading_level};
