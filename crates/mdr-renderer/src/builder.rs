//! Element builder: turns a [`NodeDescription`] tree into rendered nodes.
//!
//! The walk is depth-first and post-order: nested attribute nodes and children
//! are built before their owner's renderer runs, so renderers only ever see
//! built values. An inline component scope on a node is layered over the
//! incoming registry and threaded through that node's whole subtree.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::node::AttributeValue;
use crate::{NodeDescription, NodeRef, Overrides, PropMap, PropValue, Props, Registry, RenderError};

/// Error returned by [`build`].
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A node without a tag, or with a reserved attribute of the wrong
    /// shape. `path` locates it: child indices from the root, `@name` for
    /// attribute values (e.g. `/2/@label`).
    #[error("Malformed node at {path}: {reason}")]
    MalformedNode { path: String, reason: String },
    /// A renderer failed; its error is passed through unchanged.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// One tag resolution made during [`build_with`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution<'a> {
    /// Tag as written in the description.
    pub tag: &'a str,
    /// Parent used for parent-qualified lookup (structural or explicit).
    pub parent: Option<&'a str>,
    /// Tag handed to the renderer, after aliases.
    pub resolved: &'a str,
    /// Nothing matched in the registry in scope; the passthrough renders it.
    pub passthrough: bool,
}

/// Build one node (and its subtree) against `registry`.
///
/// # Errors
///
/// Returns [`BuildError::MalformedNode`] for an empty tag or a malformed
/// reserved attribute anywhere in the tree (detected before that node's
/// children are built), and [`BuildError::Render`] when a renderer fails.
pub fn build<N>(node: &NodeDescription, registry: &Arc<Registry<N>>) -> Result<N, BuildError> {
    Builder::new(None).node(node, registry, None)
}

/// Like [`build`], calling `observe` with every resolution just before its
/// renderer runs (post-order).
///
/// # Errors
///
/// See [`build`].
pub fn build_with<N>(
    node: &NodeDescription,
    registry: &Arc<Registry<N>>,
    observe: &mut dyn FnMut(&Resolution<'_>),
) -> Result<N, BuildError> {
    Builder::new(Some(observe)).node(node, registry, None)
}

/// Build a sequence of root nodes, stopping at the first failure.
///
/// Error paths start with the root's index in `nodes`.
///
/// # Errors
///
/// See [`build`].
pub fn build_all<N>(
    nodes: &[NodeDescription],
    registry: &Arc<Registry<N>>,
) -> Result<Vec<N>, BuildError> {
    let mut builder = Builder::new(None);
    let mut built = Vec::with_capacity(nodes.len());
    for (index, node) in nodes.iter().enumerate() {
        builder.path.push(index.to_string());
        built.push(builder.node(node, registry, None)?);
        builder.path.pop();
    }
    Ok(built)
}

/// Tracks the position of the node being built, for error reporting.
struct Builder<'o> {
    path: Vec<String>,
    observe: Option<&'o mut dyn FnMut(&Resolution<'_>)>,
}

impl<'o> Builder<'o> {
    fn new(observe: Option<&'o mut dyn FnMut(&Resolution<'_>)>) -> Self {
        Self {
            path: Vec::new(),
            observe,
        }
    }

    fn node<N>(
        &mut self,
        node: &NodeDescription,
        registry: &Arc<Registry<N>>,
        parent: Option<&str>,
    ) -> Result<N, BuildError> {
        if node.tag.trim().is_empty() {
            return Err(self.malformed(None, "tag is empty"));
        }

        let scope = self.scope(node)?;
        let scoped;
        let registry = if scope.is_empty() {
            registry
        } else {
            scoped = Registry::extend(registry, &Overrides::aliases(scope.iter()));
            &scoped
        };

        let parent = match node.attributes.get("parent") {
            None => parent,
            Some(AttributeValue::String(explicit)) => Some(explicit.as_str()),
            Some(_) => return Err(self.malformed(Some("parent"), "expected a tag name")),
        };

        let attr_ref = match node.attributes.get("ref") {
            None => None,
            Some(AttributeValue::String(id)) => Some(NodeRef::new(id.as_str())),
            Some(_) => return Err(self.malformed(Some("ref"), "expected a string")),
        };
        let node_ref = node.node_ref.as_ref().or(attr_ref.as_ref());

        let mut attributes = PropMap::new();
        for (key, value) in node.attributes.forwarded() {
            self.path.push(format!("@{key}"));
            let value = self.value(value, registry, &node.tag)?;
            self.path.pop();
            attributes.insert(key.to_owned(), value);
        }

        let mut children = Vec::with_capacity(node.children.len());
        for (index, child) in node.children.iter().enumerate() {
            self.path.push(index.to_string());
            children.push(self.node(child, registry, Some(&node.tag))?);
            self.path.pop();
        }

        let resolved = registry.resolve_in(&node.tag, parent);
        if let Some(observe) = &mut self.observe {
            observe(&Resolution {
                tag: &node.tag,
                parent,
                resolved: resolved.tag(),
                passthrough: resolved.is_passthrough(),
            });
        }
        let rendered = resolved.renderer().render(Props {
            tag: resolved.tag(),
            attributes,
            node_ref,
            children,
        })?;
        Ok(rendered)
    }

    /// Inline component scope of `node`: its `components` attribute (a map
    /// of tag to alias) overlaid by [`NodeDescription::components`].
    fn scope<'n>(
        &self,
        node: &'n NodeDescription,
    ) -> Result<Cow<'n, BTreeMap<String, String>>, BuildError> {
        let Some(value) = node.attributes.get("components") else {
            return Ok(Cow::Borrowed(&node.components));
        };
        let AttributeValue::Map(entries) = value else {
            return Err(self.malformed(Some("components"), "expected a map of tag to alias"));
        };

        let mut merged = BTreeMap::new();
        for (tag, alias) in entries {
            let Some(alias) = alias.as_str() else {
                return Err(self.malformed(
                    Some("components"),
                    &format!("alias for '{tag}' is not a tag name"),
                ));
            };
            merged.insert(tag.clone(), alias.to_owned());
        }
        merged.extend(
            node.components
                .iter()
                .map(|(tag, alias)| (tag.clone(), alias.clone())),
        );
        Ok(Cow::Owned(merged))
    }

    fn value<N>(
        &mut self,
        value: &AttributeValue,
        registry: &Arc<Registry<N>>,
        owner: &str,
    ) -> Result<PropValue<N>, BuildError> {
        Ok(match value {
            AttributeValue::Bool(b) => PropValue::Bool(*b),
            AttributeValue::Integer(n) => PropValue::Integer(*n),
            AttributeValue::Number(n) => PropValue::Number(*n),
            AttributeValue::String(s) => PropValue::String(s.clone()),
            AttributeValue::List(items) => {
                let mut built = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    self.path.push(index.to_string());
                    built.push(self.value(item, registry, owner)?);
                    self.path.pop();
                }
                PropValue::List(built)
            }
            AttributeValue::Node(node) => PropValue::Node(self.node(node, registry, Some(owner))?),
            AttributeValue::Map(entries) => {
                let mut built = BTreeMap::new();
                for (key, item) in entries {
                    self.path.push(key.clone());
                    built.insert(key.clone(), self.value(item, registry, owner)?);
                    self.path.pop();
                }
                PropValue::Map(built)
            }
        })
    }

    /// Error for the current node, or for its reserved attribute `key`.
    fn malformed(&self, key: Option<&str>, reason: &str) -> BuildError {
        let mut path = format!("/{}", self.path.join("/"));
        if let Some(key) = key {
            if !path.ends_with('/') {
                path.push('/');
            }
            path.push('@');
            path.push_str(key);
        }
        BuildError::MalformedNode {
            path,
            reason: reason.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use rayon::prelude::*;

    use super::*;
    use crate::{Renderer, renderer_fn};

    /// Everything a renderer was given, plus which renderer it was.
    #[derive(Clone, Debug, PartialEq)]
    struct Rec {
        by: &'static str,
        tag: String,
        attributes: PropMap<Rec>,
        node_ref: Option<NodeRef>,
        children: Vec<Rec>,
    }

    fn recorder(by: &'static str) -> Arc<dyn Renderer<Rec>> {
        renderer_fn(move |p: Props<'_, Rec>| {
            Ok(Rec {
                by,
                tag: p.tag.to_owned(),
                attributes: p.attributes,
                node_ref: p.node_ref.cloned(),
                children: p.children,
            })
        })
    }

    fn registry() -> Arc<Registry<Rec>> {
        let pass = recorder("pass");
        let defaults = Overrides::new()
            .shared("paragraph", recorder("paragraph"))
            .shared("text", recorder("text"))
            .shared("inline-code", recorder("code"))
            .shared("kbd", recorder("kbd"));
        Arc::new(Registry::with_defaults(
            move |p: Props<'_, Rec>| pass.render(p),
            defaults,
        ))
    }

    fn shape(node: &NodeDescription) -> (String, Vec<(String, Vec<()>)>) {
        (
            node.tag.clone(),
            node.children
                .iter()
                .map(|c| (c.tag.clone(), vec![(); c.children.len()]))
                .collect(),
        )
    }

    fn rec_shape(rec: &Rec) -> (String, Vec<(String, Vec<()>)>) {
        (
            rec.tag.clone(),
            rec.children
                .iter()
                .map(|c| (c.tag.clone(), vec![(); c.children.len()]))
                .collect(),
        )
    }

    fn depth(node: &NodeDescription) -> usize {
        1 + node.children.iter().map(depth).max().unwrap_or(0)
    }

    fn rec_depth(rec: &Rec) -> usize {
        1 + rec.children.iter().map(rec_depth).max().unwrap_or(0)
    }

    fn sample() -> NodeDescription {
        NodeDescription::new("wrapper").with_children([
            NodeDescription::new("heading-1")
                .with_attr("id", "snowflake")
                .with_child(NodeDescription::text("Snowflake")),
            NodeDescription::new("paragraph").with_children([
                NodeDescription::text("run "),
                NodeDescription::new("inline-code")
                    .with_child(NodeDescription::text("pip install 'acryl-datahub[snowflake]'")),
                NodeDescription::text("."),
            ]),
            NodeDescription::new("table").with_child(
                NodeDescription::new("tr").with_children([
                    NodeDescription::new("td").with_attr("align", "left"),
                    NodeDescription::new("td"),
                ]),
            ),
        ])
    }

    #[test]
    fn test_structure_is_preserved() {
        let doc = sample();
        let rec = build(&doc, &registry()).unwrap();

        assert_eq!(rec_shape(&rec), shape(&doc));
        assert_eq!(rec_depth(&rec), depth(&doc));
        assert_eq!(rec_shape(&rec.children[2]), shape(&doc.children[2]));
        assert_eq!(rec.children[1].children[1].by, "code");
        assert_eq!(rec.by, "pass");
    }

    #[test]
    fn test_attributes_forwarded_unchanged() {
        let doc = NodeDescription::new("code-block")
            .with_attr("language", "yaml")
            .with_attr("showLineNumbers", true)
            .with_attr("start", 3)
            .with_attr("parent", "pre")
            .with_attr("tabs", vec![AttributeValue::from("a"), AttributeValue::from(false)]);
        let rec = build(&doc, &registry()).unwrap();

        let mut expected = PropMap::new();
        expected.insert("language".to_owned(), PropValue::String("yaml".to_owned()));
        expected.insert("showLineNumbers".to_owned(), PropValue::Bool(true));
        expected.insert("start".to_owned(), PropValue::Integer(3));
        expected.insert(
            "tabs".to_owned(),
            PropValue::List(vec![
                PropValue::String("a".to_owned()),
                PropValue::Bool(false),
            ]),
        );
        assert_eq!(rec.attributes, expected);
    }

    #[test]
    fn test_nested_attribute_nodes_are_built() {
        let doc = NodeDescription::new("admonition")
            .with_attr("title", NodeDescription::new("inline-code").with_child(NodeDescription::text("x")));
        let rec = build(&doc, &registry()).unwrap();

        let title = rec.attributes["title"].as_node().unwrap();
        assert_eq!(title.by, "code");
        assert_eq!(title.children[0].by, "text");
    }

    #[test]
    fn test_reference_handle_forwarded() {
        let doc = NodeDescription::new("paragraph")
            .with_ref("intro")
            .with_child(NodeDescription::text("hi"));
        let rec = build(&doc, &registry()).unwrap();

        assert_eq!(rec.node_ref, Some(NodeRef::new("intro")));
        assert_eq!(rec.children[0].node_ref, None);
        assert!(!rec.attributes.contains_key("ref"));
    }

    #[test]
    fn test_reference_handle_from_attribute() {
        let doc = NodeDescription::new("wrapper").with_children([
            NodeDescription::new("paragraph").with_attr("ref", "handle"),
            NodeDescription::new("paragraph")
                .with_ref("field")
                .with_attr("ref", "attribute"),
        ]);
        let rec = build(&doc, &registry()).unwrap();

        assert_eq!(rec.children[0].node_ref, Some(NodeRef::new("handle")));
        assert_eq!(rec.children[1].node_ref, Some(NodeRef::new("field")));
        assert!(!rec.children[0].attributes.contains_key("ref"));
    }

    #[test]
    fn test_components_attribute_scopes_subtree() {
        let scope: BTreeMap<String, AttributeValue> = [
            ("inline-code".to_owned(), AttributeValue::from("samp")),
            ("text".to_owned(), AttributeValue::from("kbd")),
        ]
        .into_iter()
        .collect();
        let doc = NodeDescription::new("wrapper").with_children([
            NodeDescription::new("paragraph")
                .with_attr("components", scope)
                .with_component("inline-code", "kbd")
                .with_children([NodeDescription::new("inline-code"), NodeDescription::text("t")]),
            NodeDescription::new("paragraph").with_child(NodeDescription::new("inline-code")),
        ]);
        let rec = build(&doc, &registry()).unwrap();

        // The components field wins over the attribute for the same tag.
        assert_eq!(rec.children[0].children[0].by, "kbd");
        assert_eq!(rec.children[0].children[1].by, "kbd");
        assert_eq!(rec.children[0].children[1].tag, "kbd");
        assert_eq!(rec.children[1].children[0].by, "code");
        assert!(!rec.children[0].attributes.contains_key("components"));
    }

    #[test]
    fn test_malformed_reserved_attributes_rejected() {
        let wrap = |node: NodeDescription| NodeDescription::new("wrapper").with_child(node);

        let doc = wrap(NodeDescription::new("paragraph").with_attr("components", "ignored"));
        let err = build(&doc, &registry()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed node at /0/@components: expected a map of tag to alias"
        );

        let scope: BTreeMap<String, AttributeValue> =
            [("inline-code".to_owned(), AttributeValue::from(1))].into_iter().collect();
        let doc = wrap(NodeDescription::new("paragraph").with_attr("components", scope));
        let err = build(&doc, &registry()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed node at /0/@components: alias for 'inline-code' is not a tag name"
        );

        let err = build(&NodeDescription::new("paragraph").with_attr("ref", 7), &registry()).unwrap_err();
        assert_eq!(err.to_string(), "Malformed node at /@ref: expected a string");

        let doc = wrap(NodeDescription::new("paragraph").with_attr("parent", true));
        let err = build(&doc, &registry()).unwrap_err();
        assert_eq!(err.to_string(), "Malformed node at /0/@parent: expected a tag name");
    }

    #[test]
    fn test_map_attributes_are_built() {
        let style: BTreeMap<String, AttributeValue> = [
            ("width".to_owned(), AttributeValue::from(2)),
            ("label".to_owned(), AttributeValue::from(NodeDescription::new("inline-code"))),
        ]
        .into_iter()
        .collect();
        let doc = NodeDescription::new("figure").with_attr("style", style);
        let rec = build(&doc, &registry()).unwrap();

        let PropValue::Map(built) = &rec.attributes["style"] else {
            panic!("expected a map");
        };
        assert_eq!(built["width"], PropValue::Integer(2));
        assert_eq!(built["label"].as_node().unwrap().by, "code");

        let doc = NodeDescription::new("figure").with_attr(
            "style",
            [("label".to_owned(), AttributeValue::from(NodeDescription::new("")))]
                .into_iter()
                .collect::<BTreeMap<_, _>>(),
        );
        let err = build(&doc, &registry()).unwrap_err();
        assert_eq!(err.to_string(), "Malformed node at /@style/label: tag is empty");
    }

    #[test]
    fn test_build_with_reports_each_resolution() {
        let doc = NodeDescription::new("wrapper").with_children([
            NodeDescription::new("paragraph")
                .with_component("inline-code", "kbd")
                .with_child(NodeDescription::new("inline-code")),
            NodeDescription::new("paragraph").with_child(NodeDescription::new("inline-code")),
            NodeDescription::new("inline-code").with_attr("parent", "paragraph"),
        ]);
        let mut seen = Vec::new();
        let rec = build_with(&doc, &registry(), &mut |r: &Resolution<'_>| {
            seen.push((
                r.parent.map(str::to_owned),
                r.tag.to_owned(),
                r.resolved.to_owned(),
                r.passthrough,
            ));
        })
        .unwrap();

        let entry = |parent: Option<&str>, tag: &str, resolved: &str, passthrough: bool| {
            (parent.map(str::to_owned), tag.to_owned(), resolved.to_owned(), passthrough)
        };
        assert_eq!(
            seen,
            [
                entry(Some("paragraph"), "inline-code", "kbd", false),
                entry(Some("wrapper"), "paragraph", "paragraph", false),
                entry(Some("paragraph"), "inline-code", "inline-code", false),
                entry(Some("wrapper"), "paragraph", "paragraph", false),
                entry(Some("paragraph"), "inline-code", "inline-code", false),
                entry(None, "wrapper", "wrapper", true),
            ]
        );
        assert_eq!(rec, build(&doc, &registry()).unwrap());
    }

    #[test]
    fn test_paragraph_override_leaves_text_alone() {
        let doc = NodeDescription::new("paragraph").with_child(NodeDescription::text("hello"));
        let base = registry();
        let plain = build(&doc, &base).unwrap();

        let scoped = Registry::extend(&base, &Overrides::new().shared("paragraph", recorder("custom")));
        let custom = build(&doc, &scoped).unwrap();

        assert_eq!(plain.by, "paragraph");
        assert_eq!(custom.by, "custom");
        assert_eq!(custom.children, plain.children);
    }

    #[test]
    fn test_inline_scope_applies_to_subtree_only() {
        let code = || NodeDescription::new("inline-code").with_child(NodeDescription::text("x"));
        let doc = NodeDescription::new("wrapper").with_children([
            NodeDescription::new("paragraph")
                .with_component("inline-code", "kbd")
                .with_child(NodeDescription::new("emphasis").with_child(code())),
            NodeDescription::new("paragraph").with_child(code()),
        ]);
        let rec = build(&doc, &registry()).unwrap();

        assert_eq!(rec.children[0].children[0].children[0].by, "kbd");
        assert_eq!(rec.children[0].children[0].children[0].tag, "kbd");
        assert_eq!(rec.children[1].children[0].by, "code");
        assert!(!rec.children[0].attributes.contains_key("components"));
    }

    #[test]
    fn test_inline_scope_reaches_attribute_nodes() {
        let doc = NodeDescription::new("admonition")
            .with_component("inline-code", "kbd")
            .with_attr("title", NodeDescription::new("inline-code"));
        let rec = build(&doc, &registry()).unwrap();

        assert_eq!(rec.attributes["title"].as_node().unwrap().by, "kbd");
    }

    #[test]
    fn test_unknown_tag_passes_through() {
        let doc = NodeDescription::new("custom-widget")
            .with_attr("color", "red")
            .with_child(NodeDescription::text("inside"));
        let rec = build(&doc, &registry()).unwrap();

        assert_eq!(rec.by, "pass");
        assert_eq!(rec.tag, "custom-widget");
        assert_eq!(rec.attributes["color"], PropValue::String("red".to_owned()));
        assert_eq!(rec.children.len(), 1);
    }

    #[test]
    fn test_parent_qualified_binding() {
        let base = registry();
        let scoped = Registry::extend(&base, &Overrides::new().shared("table.paragraph", recorder("cell")));
        let doc = NodeDescription::new("wrapper").with_children([
            NodeDescription::new("table").with_child(NodeDescription::new("paragraph")),
            NodeDescription::new("paragraph"),
            NodeDescription::new("paragraph").with_attr("parent", "table"),
        ]);
        let rec = build(&doc, &scoped).unwrap();

        assert_eq!(rec.children[0].children[0].by, "cell");
        assert_eq!(rec.children[1].by, "paragraph");
        assert_eq!(rec.children[2].by, "cell");
        assert!(!rec.children[2].attributes.contains_key("parent"));
    }

    #[test]
    fn test_empty_tag_rejected_before_children() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let registry: Arc<Registry<Rec>> = Arc::new(Registry::new(move |p: Props<'_, Rec>| {
            counter.fetch_add(1, Ordering::SeqCst);
            recorder("pass").render(p)
        }));

        let doc = NodeDescription::new("").with_child(NodeDescription::text("never"));
        let err = build(&doc, &registry).unwrap_err();

        assert!(matches!(err, BuildError::MalformedNode { ref path, .. } if path == "/"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_malformed_path_points_at_node() {
        let doc = NodeDescription::new("wrapper").with_children([
            NodeDescription::new("paragraph"),
            NodeDescription::new("list").with_child(NodeDescription::new("  ")),
        ]);
        let err = build(&doc, &registry()).unwrap_err();
        assert_eq!(err.to_string(), "Malformed node at /1/0: tag is empty");

        let doc = NodeDescription::new("admonition").with_attr("title", NodeDescription::new(""));
        let err = build(&doc, &registry()).unwrap_err();
        assert_eq!(err.to_string(), "Malformed node at /@title: tag is empty");
    }

    #[test]
    fn test_renderer_failure_propagates() {
        #[derive(Debug, thiserror::Error)]
        #[error("table has no header row")]
        struct NoHeader;

        let base = registry();
        let scoped = Registry::extend(
            &base,
            &Overrides::new().render_with("table", |_: Props<'_, Rec>| Err(RenderError::new(NoHeader))),
        );
        let doc = NodeDescription::new("wrapper").with_child(NodeDescription::new("table"));
        let err = build(&doc, &scoped).unwrap_err();

        assert_eq!(err.to_string(), "table has no header row");
        let BuildError::Render(inner) = err else {
            panic!("expected render error");
        };
        assert!(inner.downcast_ref::<NoHeader>().is_some());
    }

    #[test]
    fn test_build_all_indexes_roots() {
        let nodes = [NodeDescription::new("paragraph"), NodeDescription::new("")];
        let err = build_all(&nodes, &registry()).unwrap_err();
        assert_eq!(err.to_string(), "Malformed node at /1: tag is empty");

        let built = build_all(&nodes[..1], &registry()).unwrap();
        assert_eq!(built.len(), 1);
    }

    #[test]
    fn test_concurrent_builds_share_registry() {
        let base = registry();
        let doc = sample();
        let expected = build(&doc, &base).unwrap();

        let results: Vec<Rec> = (0..16)
            .into_par_iter()
            .map(|i| {
                let overrides = Overrides::new().shared(format!("unused-{i}"), recorder("x"));
                let scoped = Registry::extend(&base, &overrides);
                build(&doc, &scoped).unwrap()
            })
            .collect();

        assert!(results.iter().all(|r| *r == expected));
        assert_eq!(base.depth(), 1);
    }
}
