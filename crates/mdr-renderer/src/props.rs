//! Arguments handed to a [`Renderer`](crate::Renderer).

use std::collections::BTreeMap;

use crate::NodeRef;

/// Forwarded attributes with nested descriptions already built.
pub type PropMap<N> = BTreeMap<String, PropValue<N>>;

/// Attribute value as seen by a renderer.
///
/// Mirrors [`AttributeValue`](crate::AttributeValue), except that nested node
/// descriptions have been built into rendered nodes.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue<N> {
    Bool(bool),
    Integer(i64),
    Number(f64),
    String(String),
    List(Vec<PropValue<N>>),
    Node(N),
    Map(BTreeMap<String, PropValue<N>>),
}

impl<N> PropValue<N> {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Floating-point payload. Integers are not converted.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_node(&self) -> Option<&N> {
        match self {
            Self::Node(n) => Some(n),
            _ => None,
        }
    }
}

/// Everything a renderer receives for one node.
///
/// `tag` is the node's tag, or the alias target when resolution followed an
/// alias (so a passthrough renderer emits the aliased name).
#[derive(Debug)]
pub struct Props<'a, N> {
    /// Tag the renderer should produce.
    pub tag: &'a str,
    /// Forwarded (non-reserved) attributes.
    pub attributes: PropMap<N>,
    /// Reference handle from the description (or its `ref` attribute),
    /// untouched.
    pub node_ref: Option<&'a NodeRef>,
    /// Built children in document order.
    pub children: Vec<N>,
}

impl<N> Props<'_, N> {
    /// String attribute lookup.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(PropValue::as_str)
    }

    /// Boolean attribute lookup; absent or non-boolean reads as `false`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.attributes
            .get(key)
            .and_then(PropValue::as_bool)
            .unwrap_or(false)
    }
}
