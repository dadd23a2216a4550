//! Per-document parse-tree cache.
//!
//! Entries are keyed by an opaque document identity and refreshed only when
//! the document's version counter changes. The semantic element trees of an
//! entry are built on first use and dropped together with the entry.

use std::borrow::Cow;
use std::cell::OnceCell;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt::Debug;
use std::hash::Hash;

use tracing::debug;

use super::YamlParser;
use super::lines::LineTable;
use super::tree::ParsedDocuments;
use crate::error::Result;
use crate::model::{ElementId, TknDocument};

/// An editor document: text plus a monotonically bumped version counter.
pub trait TextDocument {
    fn version(&self) -> i64;
    fn text(&self) -> Cow<'_, str>;
}

/// Owned text snapshot, used by the host bindings and in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedText {
    pub version: i64,
    pub text: String,
}

impl VersionedText {
    pub fn new(version: i64, text: impl Into<String>) -> Self {
        Self {
            version,
            text: text.into(),
        }
    }
}

impl TextDocument for VersionedText {
    fn version(&self) -> i64 {
        self.version
    }

    fn text(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.text)
    }
}

#[derive(Debug)]
pub struct CacheEntry {
    pub version: i64,
    pub parsed: ParsedDocuments,
    pub lines: LineTable,
    semantic: OnceCell<Vec<TknDocument>>,
}

impl CacheEntry {
    pub fn new(version: i64, parsed: ParsedDocuments, lines: LineTable) -> Self {
        Self {
            version,
            parsed,
            lines,
            semantic: OnceCell::new(),
        }
    }

    /// Semantic trees of the entry's supported Tekton documents.
    pub fn semantic_documents(&self) -> &[TknDocument] {
        self.semantic.get_or_init(|| {
            self.parsed
                .documents
                .iter()
                .filter_map(|doc| TknDocument::build(&self.parsed.tree, doc))
                .collect()
        })
    }

    /// The most specific element at a 0-based `(line, column)`.
    ///
    /// `Err` when the position is not inside the text at all; `Ok(None)` when
    /// it falls outside every semantic document.
    pub fn element_at(&self, line: usize, column: usize) -> Result<Option<(&TknDocument, ElementId)>> {
        let offset = self.lines.position_to_offset(line, column)?;
        Ok(self
            .semantic_documents()
            .iter()
            .find_map(|doc| doc.find_element(offset).map(|id| (doc, id))))
    }
}

pub struct ParseTreeCache<K, P> {
    parser: P,
    entries: HashMap<K, CacheEntry>,
}

impl<K, P> ParseTreeCache<K, P>
where
    K: Eq + Hash + Clone + Debug,
    P: YamlParser,
{
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            entries: HashMap::new(),
        }
    }

    /// Return the entry for `key`, re-parsing when it is missing or stale.
    pub fn ensure(&mut self, key: &K, document: &impl TextDocument) -> &CacheEntry {
        let version = document.version();
        match self.entries.entry(key.clone()) {
            Entry::Occupied(mut slot) => {
                if slot.get().version != version {
                    debug!(?key, from = slot.get().version, to = version, "re-parsing document");
                    slot.insert(parse_entry(&self.parser, version, document));
                }
                slot.into_mut()
            }
            Entry::Vacant(slot) => {
                debug!(?key, version, "parsing document");
                slot.insert(parse_entry(&self.parser, version, document))
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn version(&self, key: &K) -> Option<i64> {
        self.entries.get(key).map(|entry| entry.version)
    }

    pub fn invalidate(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_entry<P: YamlParser>(parser: &P, version: i64, document: &impl TextDocument) -> CacheEntry {
    let text = document.text();
    CacheEntry::new(version, parser.parse(&text), LineTable::from_text(&text))
}
