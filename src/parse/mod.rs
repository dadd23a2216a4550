//! Parse phase: the generic YAML parse tree, its host JSON form, position
//! conversion and the per-document cache.
//!
//! YAML text is never tokenized here. A [`YamlParser`] collaborator turns text
//! into [`ParsedDocuments`]; the editor host does the same and hands the result
//! over as JSON (see [`raw`]).

pub mod cache;
pub mod lines;
pub mod raw;
pub mod tree;

pub use cache::{CacheEntry, ParseTreeCache, TextDocument, VersionedText};
pub use lines::{LineTable, Position};
pub use raw::parse_tree_json;
pub use tree::{NodeId, NodeKind, ParseTree, ParsedDocuments, ParsedNode, YamlDocument, unquote};

/// Text → parse tree. Parser diagnostics go into [`YamlDocument::errors`],
/// parsing itself never fails.
pub trait YamlParser {
    fn parse(&self, text: &str) -> ParsedDocuments;
}

impl<F> YamlParser for F
where
    F: Fn(&str) -> ParsedDocuments,
{
    fn parse(&self, text: &str) -> ParsedDocuments {
        self(text)
    }
}
