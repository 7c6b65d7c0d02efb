//! Expand/collapse state for the manifest tree display.
//!
//! The projection in [`crate::manifest::tree`] carries no UI state. [`TreeView`] keeps the
//! set of expanded nodes, keyed by their [`NodePath`], and turns a projection plus that set
//! into the lines currently visible.

use crate::manifest::classify::Attribute;
use crate::manifest::tree::RenderNode;
use crate::manifest::xml::XML_DECLARATION;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

const VIEW_INDENT: &str = "  ";

/// Child indices leading from the root to a node. The root is the empty path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        NodePath(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        NodePath(indices)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Follow the path from `root`, projecting each step.
    pub fn resolve<'a>(&self, root: &RenderNode<'a>) -> Option<RenderNode<'a>> {
        let mut current = root.clone();
        for &index in &self.0 {
            current = current.child(index)?;
        }
        Some(current)
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(value: Vec<usize>) -> Self {
        NodePath(value)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for index in &self.0 {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LineKind {
    Declaration,
    /// Element without children, `<tag a="v" />`.
    Leaf,
    /// Element with hidden children, `<tag a="v"> ... </tag>`.
    Collapsed,
    /// Opening tag of an expanded element.
    Open,
    /// Closing tag of an expanded element.
    Close,
}

/// One visible line of the tree display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ViewLine {
    pub kind: LineKind,
    pub depth: usize,
    /// Node the line belongs to; `None` for the declaration.
    pub path: Option<NodePath>,
    pub text: String,
}

impl fmt::Display for ViewLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.depth {
            f.write_str(VIEW_INDENT)?;
        }
        match self.kind {
            LineKind::Open => write!(f, "▼ {}", self.text),
            LineKind::Collapsed => write!(f, "▶ {}", self.text),
            _ => f.write_str(&self.text),
        }
    }
}

/// Expansion state of a manifest tree display. The root starts expanded, everything
/// else collapsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeView {
    expanded: BTreeSet<NodePath>,
}

impl Default for TreeView {
    fn default() -> Self {
        TreeView::new()
    }
}

impl TreeView {
    pub fn new() -> Self {
        let mut expanded = BTreeSet::new();
        expanded.insert(NodePath::root());
        TreeView { expanded }
    }

    pub fn is_expanded(&self, path: &NodePath) -> bool {
        self.expanded.contains(path)
    }

    /// Flip the node's state and return the new one.
    pub fn toggle(&mut self, path: &NodePath) -> bool {
        if self.expanded.remove(path) {
            false
        } else {
            self.expanded.insert(path.clone());
            true
        }
    }

    pub fn expand(&mut self, path: NodePath) {
        self.expanded.insert(path);
    }

    pub fn collapse(&mut self, path: &NodePath) {
        self.expanded.remove(path);
    }

    /// Expand every element that has children.
    pub fn expand_all(&mut self, root: &RenderNode<'_>) {
        let mut pending = vec![(NodePath::root(), root.clone())];
        while let Some((path, node)) = pending.pop() {
            if !node.has_children() {
                continue;
            }
            for (index, child) in node.children().iter().enumerate() {
                pending.push((path.child(index), child.project()));
            }
            self.expanded.insert(path);
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Lines currently visible for `root`. Only expanded nodes have their children
    /// projected.
    pub fn render_lines(&self, root: &RenderNode<'_>) -> Vec<ViewLine> {
        let mut lines = vec![ViewLine {
            kind: LineKind::Declaration,
            depth: 0,
            path: None,
            text: XML_DECLARATION.to_string(),
        }];
        self.render_node(root, NodePath::root(), &mut lines);
        lines
    }

    pub fn render_text(&self, root: &RenderNode<'_>) -> String {
        self.render_lines(root)
            .iter()
            .map(ViewLine::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_node(&self, node: &RenderNode<'_>, path: NodePath, lines: &mut Vec<ViewLine>) {
        let depth = path.depth();
        let open = open_tag(node.tag(), node.attributes());

        if !node.has_children() {
            lines.push(ViewLine {
                kind: LineKind::Leaf,
                depth,
                path: Some(path),
                text: format!("{open} />"),
            });
            return;
        }

        if !self.is_expanded(&path) {
            lines.push(ViewLine {
                kind: LineKind::Collapsed,
                depth,
                path: Some(path),
                text: format!("{open}> ... </{}>", node.tag()),
            });
            return;
        }

        lines.push(ViewLine {
            kind: LineKind::Open,
            depth,
            path: Some(path.clone()),
            text: format!("{open}>"),
        });
        for (index, child) in node.children().iter().enumerate() {
            self.render_node(&child.project(), path.child(index), lines);
        }
        lines.push(ViewLine {
            kind: LineKind::Close,
            depth,
            path: Some(path),
            text: format!("</{}>", node.tag()),
        });
    }
}

/// `<tag a="v" b="w"` without the closing bracket. Values are shown as decoded.
fn open_tag(tag: &str, attributes: &[Attribute]) -> String {
    let mut text = format!("<{tag}");
    for attr in attributes {
        text.push_str(&format!(" {}=\"{}\"", attr.name, attr.value));
    }
    text
}
