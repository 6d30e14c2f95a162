//! Tag → renderer registry with copy-on-extend overrides.
//!
//! A [`Registry`] is never mutated after construction. [`Registry::extend`]
//! stacks a new layer of [`Overrides`] on top of a shared base, so each scope
//! sees its own effective mapping while the base (and every sibling scope)
//! stays exactly as it was.
//!
//! # Resolution order
//!
//! For a tag `t` whose parent tag is `p`:
//!
//! 1. `"p.t"` (parent-qualified key)
//! 2. `"t"`
//! 3. [`CATCH_ALL`] (`"*"`)
//! 4. the registry's passthrough renderer
//!
//! Keys are looked up through all layers, innermost first. A [`Binding::Alias`]
//! restarts resolution at step 2 with the alias target; after
//! [`MAX_ALIAS_DEPTH`] hops the passthrough is used.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::Renderer;

/// Reserved key whose binding handles every tag without a binding of its own.
pub const CATCH_ALL: &str = "*";

/// Maximum number of alias hops followed during resolution.
pub const MAX_ALIAS_DEPTH: usize = 8;

/// What a tag is bound to.
pub enum Binding<N> {
    /// A renderer.
    Renderer(Arc<dyn Renderer<N>>),
    /// Another tag whose binding should be used instead.
    ///
    /// If the target has no binding, the passthrough renders it under the
    /// target's name, so `"inline-code" → "code"` yields a literal `code`.
    Alias(String),
}

impl<N> Clone for Binding<N> {
    fn clone(&self) -> Self {
        match self {
            Self::Renderer(r) => Self::Renderer(Arc::clone(r)),
            Self::Alias(target) => Self::Alias(target.clone()),
        }
    }
}

impl<N> PartialEq for Binding<N> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Renderer(a), Self::Renderer(b)) => Arc::ptr_eq(a, b),
            (Self::Alias(a), Self::Alias(b)) => a == b,
            _ => false,
        }
    }
}

impl<N> fmt::Debug for Binding<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Renderer(r) => write!(f, "Renderer({:p})", Arc::as_ptr(r)),
            Self::Alias(target) => f.debug_tuple("Alias").field(target).finish(),
        }
    }
}

/// A set of bindings to layer over a registry.
///
/// # Example
///
/// ```
/// use mdr_renderer::{Overrides, Props, html::Element};
///
/// let overrides = Overrides::new()
///     .alias("inline-code", "kbd")
///     .render_with("admonition", |props: Props<'_, Element>| {
///         Ok(Element::tag("aside", props.children))
///     });
/// assert_eq!(overrides.len(), 2);
/// ```
pub struct Overrides<N> {
    entries: HashMap<String, Binding<N>>,
}

impl<N> Default for Overrides<N> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<N> Clone for Overrides<N> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<N> fmt::Debug for Overrides<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<N> Overrides<N> {
    /// Create an empty set of overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `tag` to a binding, replacing any previous one.
    #[must_use]
    pub fn bind(mut self, tag: impl Into<String>, binding: Binding<N>) -> Self {
        self.entries.insert(tag.into(), binding);
        self
    }

    /// Bind `tag` to a renderer.
    #[must_use]
    pub fn renderer(self, tag: impl Into<String>, renderer: impl Renderer<N> + 'static) -> Self {
        self.bind(tag, Binding::Renderer(Arc::new(renderer)))
    }

    /// Bind `tag` to a shared renderer.
    #[must_use]
    pub fn shared(self, tag: impl Into<String>, renderer: Arc<dyn Renderer<N>>) -> Self {
        self.bind(tag, Binding::Renderer(renderer))
    }

    /// Bind `tag` to a closure.
    #[must_use]
    pub fn render_with<F>(self, tag: impl Into<String>, f: F) -> Self
    where
        F: Fn(crate::Props<'_, N>) -> Result<N, crate::RenderError> + Send + Sync + 'static,
    {
        self.shared(tag, crate::renderer_fn(f))
    }

    /// Redirect `tag` to `target`.
    #[must_use]
    pub fn alias(self, tag: impl Into<String>, target: impl Into<String>) -> Self {
        self.bind(tag, Binding::Alias(target.into()))
    }

    /// Build overrides made only of aliases (e.g. from configuration).
    #[must_use]
    pub fn aliases<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |acc, (tag, target)| acc.alias(tag, target))
    }

    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&Binding<N>> {
        self.entries.get(tag)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over bound tags.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Outcome of resolving a tag: the renderer to call and the tag to hand it.
pub struct Resolved<N> {
    renderer: Arc<dyn Renderer<N>>,
    tag: String,
    passthrough: bool,
}

impl<N> Resolved<N> {
    /// Renderer to invoke.
    #[must_use]
    pub fn renderer(&self) -> &Arc<dyn Renderer<N>> {
        &self.renderer
    }

    /// Tag to pass as [`Props::tag`](crate::Props::tag): the requested tag,
    /// or the final alias target.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Whether nothing matched and the registry's passthrough was chosen.
    #[must_use]
    pub fn is_passthrough(&self) -> bool {
        self.passthrough
    }
}

impl<N> PartialEq for Resolved<N> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.renderer, &other.renderer) && self.tag == other.tag
    }
}

impl<N> fmt::Debug for Resolved<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("renderer", &Arc::as_ptr(&self.renderer))
            .field("tag", &self.tag)
            .field("passthrough", &self.passthrough)
            .finish()
    }
}

/// Immutable tag → renderer mapping.
///
/// Shared as `Arc<Registry<N>>`. See the [module docs](self) for the
/// resolution order.
pub struct Registry<N> {
    entries: HashMap<String, Binding<N>>,
    parent: Option<Arc<Registry<N>>>,
    passthrough: Arc<dyn Renderer<N>>,
}

impl<N> fmt::Debug for Registry<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.entries)
            .field("depth", &self.depth())
            .finish_non_exhaustive()
    }
}

impl<N> Registry<N> {
    /// Create an empty root registry; every tag resolves to `passthrough`.
    #[must_use]
    pub fn new(passthrough: impl Renderer<N> + 'static) -> Self {
        Self {
            entries: HashMap::new(),
            parent: None,
            passthrough: Arc::new(passthrough),
        }
    }

    /// Create a root registry from a passthrough renderer and default bindings.
    #[must_use]
    pub fn with_defaults(passthrough: impl Renderer<N> + 'static, defaults: Overrides<N>) -> Self {
        Self {
            entries: defaults.entries,
            ..Self::new(passthrough)
        }
    }

    /// Layer `overrides` over `base`.
    ///
    /// Neither argument is modified. With no overrides the base itself is
    /// returned, which is behaviorally identical.
    #[must_use]
    pub fn extend(base: &Arc<Self>, overrides: &Overrides<N>) -> Arc<Self> {
        if overrides.is_empty() {
            return Arc::clone(base);
        }
        Arc::new(Self {
            entries: overrides.entries.clone(),
            parent: Some(Arc::clone(base)),
            passthrough: Arc::clone(&base.passthrough),
        })
    }

    /// Number of layers, the root counting as one.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.parent.as_ref().map_or(0, |p| p.depth())
    }

    /// Binding for an exact key, searching from the innermost layer out.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Binding<N>> {
        self.entries
            .get(key)
            .or_else(|| self.parent.as_ref().and_then(|p| p.get(key)))
    }

    /// Whether any layer binds `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The built-in fallback renderer (not the catch-all binding).
    #[must_use]
    pub fn passthrough(&self) -> &Arc<dyn Renderer<N>> {
        &self.passthrough
    }

    /// Resolve a tag with no parent context. Never fails.
    #[must_use]
    pub fn resolve(&self, tag: &str) -> Resolved<N> {
        self.resolve_in(tag, None)
    }

    /// Resolve a tag appearing under `parent`. Never fails.
    #[must_use]
    pub fn resolve_in(&self, tag: &str, parent: Option<&str>) -> Resolved<N> {
        if let Some(parent) = parent
            && let Some(binding) = self.get(&format!("{parent}.{tag}"))
        {
            return self.follow(tag, binding, 0);
        }
        self.resolve_plain(tag, 0)
    }

    fn resolve_plain(&self, tag: &str, hops: usize) -> Resolved<N> {
        match self.get(tag) {
            Some(binding) => self.follow(tag, binding, hops),
            None => self.fallback(tag, hops),
        }
    }

    fn follow(&self, tag: &str, binding: &Binding<N>, hops: usize) -> Resolved<N> {
        match binding {
            Binding::Renderer(renderer) => Resolved {
                renderer: Arc::clone(renderer),
                tag: tag.to_owned(),
                passthrough: false,
            },
            Binding::Alias(target) if hops < MAX_ALIAS_DEPTH => {
                self.resolve_plain(target, hops + 1)
            }
            Binding::Alias(target) => self.builtin(target),
        }
    }

    fn fallback(&self, tag: &str, hops: usize) -> Resolved<N> {
        match self.get(CATCH_ALL) {
            Some(Binding::Renderer(renderer)) => Resolved {
                renderer: Arc::clone(renderer),
                tag: tag.to_owned(),
                passthrough: false,
            },
            Some(Binding::Alias(target)) if hops < MAX_ALIAS_DEPTH && target != tag => {
                self.resolve_plain(target, hops + 1)
            }
            _ => self.builtin(tag),
        }
    }

    fn builtin(&self, tag: &str) -> Resolved<N> {
        Resolved {
            renderer: Arc::clone(&self.passthrough),
            tag: tag.to_owned(),
            passthrough: true,
        }
    }
}

/// Single-assignment, process-wide home for a default registry.
///
/// Intended for `static` use by a host:
///
/// ```
/// use mdr_renderer::{Registry, RegistryCell, html::{self, Element}};
///
/// static DEFAULTS: RegistryCell<Element> = RegistryCell::new();
///
/// let first = DEFAULTS.initialize(html::new_default_registry());
/// let again = DEFAULTS.initialize(Registry::new(html::passthrough));
/// assert!(std::sync::Arc::ptr_eq(first, again));
/// ```
pub struct RegistryCell<N> {
    cell: OnceLock<Arc<Registry<N>>>,
}

impl<N> Default for RegistryCell<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> RegistryCell<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Store `registry` unless one is already stored; return the stored one.
    ///
    /// Later calls are no-ops and drop their argument.
    pub fn initialize(&self, registry: Registry<N>) -> &Arc<Registry<N>> {
        self.get_or_init(|| registry)
    }

    /// Like [`initialize`](Self::initialize), building the registry only if
    /// the cell is still empty.
    pub fn get_or_init(&self, init: impl FnOnce() -> Registry<N>) -> &Arc<Registry<N>> {
        self.cell.get_or_init(|| Arc::new(init()))
    }

    /// The stored registry, if initialized.
    #[must_use]
    pub fn get(&self) -> Option<&Arc<Registry<N>>> {
        self.cell.get()
    }
}
