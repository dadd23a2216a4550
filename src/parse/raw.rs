//! Host JSON form of the parse tree (the editor's `node-yaml-parser` output).
//!
//! ```json
//! { "documents": [ { "nodes": [...], "errors": [...],
//!                    "startPosition": 0, "endPosition": 42 } ] }
//! ```
//!
//! Nodes are tagged by `kind` (`SCALAR`, `MAPPING`, `SEQ`, `PAIR`).

use serde::Deserialize;
use serde_json::Value;

use super::tree::{NodeId, ParseTree, ParsedDocuments, YamlDocument};
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocuments {
    #[serde(default)]
    pub documents: Vec<RawDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub errors: Vec<Value>,
    pub start_position: usize,
    pub end_position: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub kind: String,
    #[serde(default)]
    pub raw: String,
    pub start_position: usize,
    pub end_position: usize,
    #[serde(default)]
    pub mappings: Vec<RawNode>,
    #[serde(default)]
    pub items: Vec<Option<RawNode>>,
    #[serde(default)]
    pub key: Option<Box<RawNode>>,
    #[serde(default)]
    pub value: Option<Box<RawNode>>,
}

impl RawDocuments {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::malformed(format!("invalid tree JSON: {e}")))
    }

    /// Move the nested host tree into the arena.
    pub fn into_parsed(self) -> Result<ParsedDocuments> {
        let mut tree = ParseTree::new();
        let mut documents = Vec::with_capacity(self.documents.len());

        for doc in self.documents {
            check_range(doc.start_position, doc.end_position, "document")?;
            let nodes = doc
                .nodes
                .iter()
                .map(|node| lower_node(&mut tree, node))
                .collect::<Result<Vec<_>>>()?;
            let errors = doc.errors.iter().map(error_text).collect();
            documents.push(YamlDocument {
                nodes,
                errors,
                start: doc.start_position,
                end: doc.end_position,
            });
        }

        Ok(ParsedDocuments { tree, documents })
    }
}

/// Parse the host tree JSON straight into the arena form.
pub fn parse_tree_json(json: &str) -> Result<ParsedDocuments> {
    RawDocuments::from_json(json)?.into_parsed()
}

fn lower_node(tree: &mut ParseTree, node: &RawNode) -> Result<NodeId> {
    check_range(node.start_position, node.end_position, &node.kind)?;
    let (start, end) = (node.start_position, node.end_position);

    match node.kind.as_str() {
        "SCALAR" => Ok(tree.scalar(node.raw.clone(), start, end)),
        "MAPPING" => {
            let pairs = node
                .mappings
                .iter()
                .map(|pair| lower_node(tree, pair))
                .collect::<Result<Vec<_>>>()?;
            Ok(tree.mapping(pairs, node.raw.clone(), start, end))
        }
        "SEQ" => {
            // `- ` with nothing after it comes through as a null item.
            let items = node
                .items
                .iter()
                .flatten()
                .map(|item| lower_node(tree, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(tree.sequence(items, node.raw.clone(), start, end))
        }
        "PAIR" => {
            let key = node
                .key
                .as_deref()
                .ok_or_else(|| Error::malformed(format!("pair at {start} has no key")))?;
            let key = lower_node(tree, key)?;
            let value = node
                .value
                .as_deref()
                .map(|value| lower_node(tree, value))
                .transpose()?;
            Ok(tree.pair(key, value, start, end))
        }
        other => Err(Error::malformed(format!("unknown node kind '{other}' at {start}"))),
    }
}

fn check_range(start: usize, end: usize, what: &str) -> Result<()> {
    if start > end {
        return Err(Error::malformed(format!("{what} range {start}..{end} is inverted")));
    }
    Ok(())
}

fn error_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}
