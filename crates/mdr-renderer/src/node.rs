//! Node descriptions: the serialized document tree consumed by the builder.

use std::collections::BTreeMap;

/// Attribute keys consumed by resolution and never forwarded to renderers
/// as ordinary attributes.
///
/// - `components`: inline component scope, a map of tag to alias merged
///   under [`NodeDescription::components`]
/// - `parent`: explicit parent tag for parent-qualified lookup (a string)
/// - `ref`: reference handle (a string), used when
///   [`NodeDescription::node_ref`] is unset
///
/// The builder rejects a reserved attribute of the wrong shape.
pub const RESERVED_ATTRIBUTES: &[&str] = &["components", "parent", "ref"];

/// One unit of document structure: tag, attributes, ordered children.
///
/// Descriptions are immutable inputs. The builder never mutates them.
///
/// With the `serde` feature enabled the serialized form is:
///
/// ```json
/// {
///   "tag": "paragraph",
///   "attributes": { "id": "intro" },
///   "children": [{ "tag": "text", "attributes": { "value": "Hi" } }],
///   "components": { "inline-code": "kbd" },
///   "ref": "intro-paragraph"
/// }
/// ```
///
/// Only `tag` is required. A missing `tag` is rejected at deserialization,
/// an empty one at build time.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeDescription {
    /// Semantic tag name (e.g. "paragraph", "heading-2", "admonition").
    pub tag: String,
    /// Attributes forwarded to the renderer (minus [`RESERVED_ATTRIBUTES`]).
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Attributes::is_empty")
    )]
    pub attributes: Attributes,
    /// Children in rendering order.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub children: Vec<NodeDescription>,
    /// Inline component scope: tag → alias tag, applied to this node and
    /// its whole subtree.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "BTreeMap::is_empty")
    )]
    pub components: BTreeMap<String, String>,
    /// Caller-supplied handle for imperative access to the rendered node.
    #[cfg_attr(
        feature = "serde",
        serde(default, rename = "ref", skip_serializing_if = "Option::is_none")
    )]
    pub node_ref: Option<NodeRef>,
}

impl NodeDescription {
    /// Create a node with the given tag and nothing else.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Create a `text` node carrying `value`.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::new("text").with_attr("value", AttributeValue::String(value.into()))
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key, value);
        self
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: NodeDescription) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children, preserving their order.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeDescription>) -> Self {
        self.children.extend(children);
        self
    }

    /// Redirect `tag` to `alias` within this node's subtree.
    #[must_use]
    pub fn with_component(mut self, tag: impl Into<String>, alias: impl Into<String>) -> Self {
        self.components.insert(tag.into(), alias.into());
        self
    }

    /// Attach a reference handle.
    #[must_use]
    pub fn with_ref(mut self, node_ref: impl Into<NodeRef>) -> Self {
        self.node_ref = Some(node_ref.into());
        self
    }
}

/// Opaque reference handle forwarded to the renderer untouched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct NodeRef(String);

impl NodeRef {
    /// Create a reference handle.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The handle's identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeRef {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Attribute value as produced by the upstream parser.
///
/// Serialized untagged. Whole numbers that fit an `i64` deserialize as
/// [`Integer`](Self::Integer) and keep their exact value; anything else
/// numeric (fractions, integers beyond `i64`) becomes a [`Number`](Self::Number),
/// which rounds integers above 2^53. An object with a `tag` field is a
/// [`Node`](Self::Node), any other object a [`Map`](Self::Map).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum AttributeValue {
    /// Boolean flag (e.g. `ordered` on lists).
    Bool(bool),
    /// Whole number (e.g. table column count, list start).
    Integer(i64),
    /// Floating-point value.
    Number(f64),
    /// Plain string.
    String(String),
    /// Ordered list of values.
    List(Vec<AttributeValue>),
    /// Nested description, built before the renderer sees it.
    Node(Box<NodeDescription>),
    /// String-keyed values, ordered by key.
    Map(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    /// String payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for AttributeValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<NodeDescription> for AttributeValue {
    fn from(node: NodeDescription) -> Self {
        Self::Node(Box::new(node))
    }
}

impl From<Vec<AttributeValue>> for AttributeValue {
    fn from(values: Vec<AttributeValue>) -> Self {
        Self::List(values)
    }
}

impl From<BTreeMap<String, AttributeValue>> for AttributeValue {
    fn from(entries: BTreeMap<String, AttributeValue>) -> Self {
        Self::Map(entries)
    }
}

/// Attribute map of a [`NodeDescription`], ordered by key.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Attributes(BTreeMap<String, AttributeValue>);

impl Attributes {
    /// Create an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an attribute.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up an attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(key)
    }

    /// Look up a string attribute.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttributeValue::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over all attributes, reserved ones included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over the attributes that are forwarded to renderers.
    pub fn forwarded(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.iter().filter(|(k, _)| !is_reserved(k))
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Whether `key` is consumed by resolution rather than forwarded.
pub(crate) fn is_reserved(key: &str) -> bool {
    RESERVED_ATTRIBUTES.contains(&key)
}
