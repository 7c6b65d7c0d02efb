//! Lazy element tree over a decoded manifest, for interactive display.
//!
//! A [`RenderNode`] only resolves its own attributes and the identity of its children.
//! Each child becomes a `RenderNode` when it is projected, typically when the user
//! expands it. Projection is pure: projecting the same node again gives an equal result.

use crate::manifest::classify::{partition, partition_root, Attribute, ChildRef, ROOT_TAG};
use crate::manifest::error::{ManifestError, ManifestResult};
use crate::manifest::value::{ManifestNode, ManifestValue};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq)]
pub struct RenderNode<'a> {
    tag: &'static str,
    attributes: Vec<Attribute>,
    children: Vec<ChildRef<'a>>,
}

impl<'a> RenderNode<'a> {
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Unexpanded children, in document order.
    pub fn children(&self) -> &[ChildRef<'a>] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Project the child at `index`.
    pub fn child(&self, index: usize) -> Option<RenderNode<'a>> {
        self.children.get(index).map(ChildRef::project)
    }

    /// Walk the subtree in document order, projecting each node as it is reached.
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants {
            pending: vec![(0, self.clone())],
        }
    }

    /// Project the whole subtree at once into an owned tree.
    pub fn materialize(&self) -> RenderTree {
        RenderTree {
            tag: self.tag.to_string(),
            attributes: self.attributes.clone(),
            children: self
                .children
                .iter()
                .map(|child| child.project().materialize())
                .collect(),
        }
    }
}

impl<'a> ChildRef<'a> {
    pub fn project(&self) -> RenderNode<'a> {
        project(self.tag, self.node)
    }
}

/// Project one element of the manifest.
pub fn project<'a>(tag: &'static str, node: &'a ManifestNode) -> RenderNode<'a> {
    let parts = partition(node);
    RenderNode {
        tag,
        attributes: parts.attributes,
        children: parts.children,
    }
}

/// Project the `<manifest>` root, with the same namespace declaration the XML writer adds.
pub fn project_root(root: &ManifestNode) -> RenderNode<'_> {
    let parts = partition_root(root);
    RenderNode {
        tag: ROOT_TAG,
        attributes: parts.attributes,
        children: parts.children,
    }
}

pub fn project_manifest(root: &ManifestValue) -> ManifestResult<RenderNode<'_>> {
    match root {
        ManifestValue::Node(node) => Ok(project_root(node)),
        other => Err(ManifestError::MissingRoot(other.kind())),
    }
}

/// Pre-order iterator yielding `(depth, node)` pairs relative to the starting node.
pub struct Descendants<'a> {
    pending: Vec<(usize, RenderNode<'a>)>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (usize, RenderNode<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.pending.pop()?;
        for child in node.children.iter().rev() {
            self.pending.push((depth + 1, child.project()));
        }
        Some((depth, node))
    }
}

/// Fully built, owned copy of a projected subtree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderTree {
    pub tag: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<RenderTree>,
}
