//! Renderer trait.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::Props;

/// Turns one node's props (attributes plus already-built children) into a
/// rendered node of type `N`.
///
/// Renderers are shared between threads through [`Registry`](crate::Registry),
/// hence `Send + Sync`. Any `Fn(Props<'_, N>) -> Result<N, RenderError>`
/// closure is a renderer.
///
/// # Example
///
/// ```
/// use mdr_renderer::{Props, RenderError, Renderer};
///
/// struct Upper;
///
/// impl Renderer<String> for Upper {
///     fn render(&self, props: Props<'_, String>) -> Result<String, RenderError> {
///         Ok(props.children.concat().to_uppercase())
///     }
/// }
/// ```
pub trait Renderer<N>: Send + Sync {
    /// Render a node.
    ///
    /// # Errors
    ///
    /// Any error is propagated unchanged to the caller of
    /// [`build`](crate::build).
    fn render(&self, props: Props<'_, N>) -> Result<N, RenderError>;
}

impl<N, F> Renderer<N> for F
where
    F: Fn(Props<'_, N>) -> Result<N, RenderError> + Send + Sync,
{
    fn render(&self, props: Props<'_, N>) -> Result<N, RenderError> {
        self(props)
    }
}

/// Wrap a closure as a shareable renderer.
///
/// Saves spelling out the closure's argument type.
pub fn renderer_fn<N, F>(f: F) -> Arc<dyn Renderer<N>>
where
    F: Fn(Props<'_, N>) -> Result<N, RenderError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Failure raised by a renderer.
///
/// Wraps the renderer's own error; `Display` and `source` are delegated so
/// the failure reaches the caller as if unwrapped.
pub struct RenderError(Box<dyn Error + Send + Sync>);

impl RenderError {
    /// Wrap any error (or message) raised while rendering.
    pub fn new(error: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self(error.into())
    }

    /// Borrow the wrapped error as a concrete type.
    #[must_use]
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }

    /// Unwrap the original error.
    #[must_use]
    pub fn into_inner(self) -> Box<dyn Error + Send + Sync> {
        self.0
    }
}

impl fmt::Debug for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}
