//! Arena form of the generic YAML parse tree.
//!
//! The tree is produced by an external parser (see [`super::YamlParser`]) or
//! converted from the host's JSON form (see [`super::raw`]). Offsets are
//! character offsets into the document text, ranges are half-open.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Scalar,
    Mapping,
    Sequence,
    Pair,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeBody {
    Scalar,
    /// Pair nodes, in source order.
    Mapping(Vec<NodeId>),
    Sequence(Vec<NodeId>),
    /// A key without a value yet (`name:`) has `value: None`.
    Pair { key: NodeId, value: Option<NodeId> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNode {
    pub raw: String,
    pub start: usize,
    pub end: usize,
    pub parent: Option<NodeId>,
    pub body: NodeBody,
}

impl ParsedNode {
    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::Scalar => NodeKind::Scalar,
            NodeBody::Mapping(_) => NodeKind::Mapping,
            NodeBody::Sequence(_) => NodeKind::Sequence,
            NodeBody::Pair { .. } => NodeKind::Pair,
        }
    }

    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseTree {
    nodes: Vec<ParsedNode>,
}

impl ParseTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids are only minted by this tree, so lookups by id cannot miss.
    pub fn node(&self, id: NodeId) -> &ParsedNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind()
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    pub fn scalar(&mut self, raw: impl Into<String>, start: usize, end: usize) -> NodeId {
        self.push(raw.into(), start, end, NodeBody::Scalar)
    }

    pub fn pair(&mut self, key: NodeId, value: Option<NodeId>, start: usize, end: usize) -> NodeId {
        let raw = self.node(key).raw.clone();
        let id = self.push(raw, start, end, NodeBody::Pair { key, value });
        self.adopt(id, std::iter::once(key).chain(value));
        id
    }

    pub fn mapping(
        &mut self,
        pairs: Vec<NodeId>,
        raw: impl Into<String>,
        start: usize,
        end: usize,
    ) -> NodeId {
        let children = pairs.clone();
        let id = self.push(raw.into(), start, end, NodeBody::Mapping(pairs));
        self.adopt(id, children);
        id
    }

    pub fn sequence(
        &mut self,
        items: Vec<NodeId>,
        raw: impl Into<String>,
        start: usize,
        end: usize,
    ) -> NodeId {
        let children = items.clone();
        let id = self.push(raw.into(), start, end, NodeBody::Sequence(items));
        self.adopt(id, children);
        id
    }

    fn push(&mut self, raw: String, start: usize, end: usize, body: NodeBody) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(ParsedNode {
            raw,
            start,
            end,
            parent: None,
            body,
        });
        id
    }

    fn adopt(&mut self, parent: NodeId, children: impl IntoIterator<Item = NodeId>) {
        for child in children {
            self.nodes[child.index()].parent = Some(parent);
        }
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Pair nodes of a mapping; empty for anything else.
    pub fn pairs(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).body {
            NodeBody::Mapping(pairs) => pairs,
            _ => &[],
        }
    }

    /// Items of a sequence; empty for anything else.
    pub fn items(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).body {
            NodeBody::Sequence(items) => items,
            _ => &[],
        }
    }

    pub fn pair_parts(&self, id: NodeId) -> Option<(NodeId, Option<NodeId>)> {
        match self.node(id).body {
            NodeBody::Pair { key, value } => Some((key, value)),
            _ => None,
        }
    }

    /// The pair of `map` whose decoded key equals `key`.
    pub fn find_pair(&self, map: NodeId, key: &str) -> Option<NodeId> {
        self.pairs(map).iter().copied().find(|&pair| {
            self.pair_parts(pair)
                .is_some_and(|(k, _)| unquote(&self.node(k).raw) == key)
        })
    }

    /// The value node stored under `key` in `map`.
    pub fn find_value(&self, map: NodeId, key: &str) -> Option<NodeId> {
        self.find_pair(map, key)
            .and_then(|pair| self.pair_parts(pair))
            .and_then(|(_, value)| value)
    }

    /// Decoded text of a scalar node, `None` for containers.
    pub fn scalar_text(&self, id: NodeId) -> Option<&str> {
        let node = self.node(id);
        match node.body {
            NodeBody::Scalar => Some(unquote(&node.raw)),
            _ => None,
        }
    }

    /// Decoded text of the scalar stored under `key` in `map`.
    pub fn find_text(&self, map: NodeId, key: &str) -> Option<&str> {
        self.find_value(map, key).and_then(|v| self.scalar_text(v))
    }

    /// Start offset of the key when `id` is the value half of a pair.
    pub fn key_start(&self, id: NodeId) -> Option<usize> {
        let parent = self.node(id).parent?;
        match self.pair_parts(parent)? {
            (key, Some(value)) if value == id => Some(self.node(key).start),
            _ => None,
        }
    }

    /// Convert a subtree to a JSON value. Scalars become decoded strings.
    pub fn to_json(&self, id: NodeId) -> Value {
        let node = self.node(id);
        match &node.body {
            NodeBody::Scalar => Value::String(unquote(&node.raw).to_string()),
            NodeBody::Sequence(items) => {
                Value::Array(items.iter().map(|&item| self.to_json(item)).collect())
            }
            NodeBody::Mapping(pairs) => {
                let mut map = Map::new();
                for &pair in pairs {
                    if let Some((key, value)) = self.pair_parts(pair) {
                        let key = unquote(&self.node(key).raw).to_string();
                        let value = value.map(|v| self.to_json(v)).unwrap_or(Value::Null);
                        map.insert(key, value);
                    }
                }
                Value::Object(map)
            }
            NodeBody::Pair { value, .. } => value.map(|v| self.to_json(v)).unwrap_or(Value::Null),
        }
    }
}

/// Strip one layer of matching surrounding quotes.
pub fn unquote(raw: &str) -> &str {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

/// One YAML document of a (possibly multi-document) text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlDocument {
    /// Top-level nodes; normally a single mapping.
    pub nodes: Vec<NodeId>,
    /// Parser diagnostics, passed through untouched.
    pub errors: Vec<String>,
    pub start: usize,
    pub end: usize,
}

impl YamlDocument {
    pub fn root_mapping(&self, tree: &ParseTree) -> Option<NodeId> {
        self.nodes
            .iter()
            .copied()
            .find(|&id| tree.kind(id) == NodeKind::Mapping)
    }

    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocuments {
    pub tree: ParseTree,
    pub documents: Vec<YamlDocument>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // name: "build"
    fn single_pair() -> (ParseTree, NodeId) {
        let mut tree = ParseTree::new();
        let key = tree.scalar("name", 0, 4);
        let value = tree.scalar("\"build\"", 6, 13);
        let pair = tree.pair(key, Some(value), 0, 13);
        let map = tree.mapping(vec![pair], "name: \"build\"", 0, 13);
        (tree, map)
    }

    #[test]
    fn unquote_strips_one_matching_layer() {
        assert_eq!(unquote("\"a\""), "a");
        assert_eq!(unquote("'a'"), "a");
        assert_eq!(unquote("\"'a'\""), "'a'");
        assert_eq!(unquote("\"a'"), "\"a'");
        assert_eq!(unquote("\""), "\"");
        assert_eq!(unquote("plain"), "plain");
    }

    #[test]
    fn builders_link_parents() {
        let (tree, map) = single_pair();
        let pair = tree.pairs(map)[0];
        let (key, value) = tree.pair_parts(pair).unwrap();
        assert_eq!(tree.node(pair).parent, Some(map));
        assert_eq!(tree.node(key).parent, Some(pair));
        assert_eq!(tree.node(value.unwrap()).parent, Some(pair));
        assert_eq!(tree.node(map).parent, None);
    }

    #[test]
    fn find_text_decodes_quotes() {
        let (tree, map) = single_pair();
        assert_eq!(tree.find_text(map, "name"), Some("build"));
        assert_eq!(tree.find_text(map, "missing"), None);
    }

    #[test]
    fn key_start_points_at_the_pair_key() {
        let (tree, map) = single_pair();
        let value = tree.find_value(map, "name").unwrap();
        assert_eq!(tree.key_start(value), Some(0));
        assert_eq!(tree.key_start(map), None);
    }

    #[test]
    fn to_json_converts_nested_nodes() {
        let mut tree = ParseTree::new();
        let k = tree.scalar("items", 0, 5);
        let a = tree.scalar("a", 9, 10);
        let b = tree.scalar("'b'", 13, 16);
        let seq = tree.sequence(vec![a, b], "- a\n- 'b'", 7, 16);
        let pair = tree.pair(k, Some(seq), 0, 16);
        let empty_key = tree.scalar("none", 17, 21);
        let empty = tree.pair(empty_key, None, 17, 22);
        let map = tree.mapping(vec![pair, empty], "", 0, 22);

        let json = tree.to_json(map);
        assert_eq!(json, serde_json::json!({ "items": ["a", "b"], "none": null }));
    }
}
