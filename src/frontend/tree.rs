//! Syntax tree for display
//!
//! Nodes live in an arena owned by the tree; children are ordered id lists
//! and the parent link is a plain id used for navigation only.

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Index of a node inside its [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    label: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

/// Labeled ordered tree, rooted at `inicio`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
}

impl SyntaxTree {
    /// Create a tree holding only the `inicio` root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                label: "inicio".to_string(),
                children: Vec::new(),
                parent: None,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a new child under `parent` and return its id
    pub fn push_child(&mut self, parent: NodeId, label: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            label: label.into(),
            children: Vec::new(),
            parent: Some(parent),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn label(&self, id: NodeId) -> &str {
        &self.nodes[id.0].label
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Labels of the direct children of `id`
    pub fn child_labels(&self, id: NodeId) -> Vec<&str> {
        self.children(id).iter().map(|c| self.label(*c)).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Render as an indented outline, two spaces per level
    pub fn to_outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(self.root(), 0, &mut out);
        out
    }

    fn write_outline(&self, id: NodeId, depth: usize, out: &mut String) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(self.label(id));
        out.push('\n');
        for child in self.children(id) {
            self.write_outline(*child, depth + 1, out);
        }
    }
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowed view of one node, serialized as `{label, children}`
struct NodeView<'a> {
    tree: &'a SyntaxTree,
    id: NodeId,
}

impl Serialize for NodeView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let children: Vec<NodeView<'_>> = self
            .tree
            .children(self.id)
            .iter()
            .map(|id| NodeView {
                tree: self.tree,
                id: *id,
            })
            .collect();
        let mut state = serializer.serialize_struct("Node", 2)?;
        state.serialize_field("label", self.tree.label(self.id))?;
        state.serialize_field("children", &children)?;
        state.end()
    }
}

impl Serialize for SyntaxTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        NodeView {
            tree: self,
            id: self.root(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_navigate() {
        let mut tree = SyntaxTree::new();
        let root = tree.root();
        let si = tree.push_child(root, "si x == 1 entonces");
        let leaf = tree.push_child(si, "imprimir x");

        assert_eq!(tree.label(root), "inicio");
        assert_eq!(tree.parent(leaf), Some(si));
        assert_eq!(tree.parent(si), Some(root));
        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.child_labels(si), vec!["imprimir x"]);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_outline() {
        let mut tree = SyntaxTree::new();
        let root = tree.root();
        let si = tree.push_child(root, "si a == 2 entonces");
        tree.push_child(si, "imprimir a");
        tree.push_child(root, "fin");

        assert_eq!(
            tree.to_outline(),
            "inicio\n  si a == 2 entonces\n    imprimir a\n  fin\n"
        );
    }

    #[test]
    fn test_serializes_nested() {
        let mut tree = SyntaxTree::new();
        let root = tree.root();
        tree.push_child(root, "fin");

        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "label": "inicio",
                "children": [{ "label": "fin", "children": [] }]
            })
        );
    }
}
