//! Read-only view over a Pipeline spec, backed either by the parse tree of
//! the open document or by a fetched definition decoded into JSON.

use serde_json::Value;

use crate::parse::{NodeId, NodeKind, ParseTree};

pub trait SpecSource: Copy {
    /// Value under `key` when `self` is a mapping.
    fn field(self, key: &str) -> Option<Self>;
    /// Items when `self` is a sequence; empty otherwise.
    fn items(self) -> Vec<Self>;
    /// Decoded scalar text.
    fn text(self) -> Option<String>;
    fn is_mapping(self) -> bool;
    /// Start offset in the document text, for tree-backed sources.
    fn offset(self) -> Option<usize>;

    fn field_text(self, key: &str) -> Option<String> {
        self.field(key).and_then(|value| value.text())
    }

    fn field_items(self, key: &str) -> Vec<Self> {
        self.field(key).map(|value| value.items()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TreeNode<'t> {
    pub tree: &'t ParseTree,
    pub id: NodeId,
}

impl<'t> TreeNode<'t> {
    pub fn new(tree: &'t ParseTree, id: NodeId) -> Self {
        Self { tree, id }
    }
}

impl SpecSource for TreeNode<'_> {
    fn field(self, key: &str) -> Option<Self> {
        self.tree
            .find_value(self.id, key)
            .map(|id| TreeNode::new(self.tree, id))
    }

    fn items(self) -> Vec<Self> {
        self.tree
            .items(self.id)
            .iter()
            .map(|&id| TreeNode::new(self.tree, id))
            .collect()
    }

    fn text(self) -> Option<String> {
        self.tree.scalar_text(self.id).map(str::to_string)
    }

    fn is_mapping(self) -> bool {
        self.tree.kind(self.id) == NodeKind::Mapping
    }

    fn offset(self) -> Option<usize> {
        Some(self.tree.node(self.id).start)
    }
}

impl SpecSource for &Value {
    fn field(self, key: &str) -> Option<Self> {
        self.as_object()?.get(key).filter(|value| !value.is_null())
    }

    fn items(self) -> Vec<Self> {
        match self {
            Value::Array(items) => items.iter().collect(),
            _ => Vec::new(),
        }
    }

    fn text(self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn is_mapping(self) -> bool {
        self.is_object()
    }

    fn offset(self) -> Option<usize> {
        None
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn json_source_reads_fields_and_items() {
        let spec = json!({ "tasks": [{ "name": "a", "retries": 2 }], "finally": null });
        let spec = &spec;
        let tasks = spec.field_items("tasks");
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].is_mapping());
        assert_eq!(tasks[0].field_text("name").as_deref(), Some("a"));
        assert_eq!(tasks[0].field_text("retries").as_deref(), Some("2"));
        assert!(spec.field("finally").is_none());
        assert!(spec.offset().is_none());
    }

    #[test]
    fn tree_source_decodes_scalars() {
        let mut tree = ParseTree::new();
        let k = tree.scalar("name", 0, 4);
        let v = tree.scalar("'a'", 6, 9);
        let pair = tree.pair(k, Some(v), 0, 9);
        let map = tree.mapping(vec![pair], "", 0, 9);

        let node = TreeNode::new(&tree, map);
        assert!(node.is_mapping());
        assert_eq!(node.field_text("name").as_deref(), Some("a"));
        assert_eq!(node.offset(), Some(0));
        assert!(node.field_items("tasks").is_empty());
    }
}
