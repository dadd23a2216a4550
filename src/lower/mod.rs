//! Lowering phase: Pipeline / PipelineRun spec → declared task list.
//!
//! Specs come either from the open document's parse tree or from a fetched
//! definition; both are read through [`source::SpecSource`].

pub mod extract;
pub mod reference;
pub mod resolve;
pub mod source;

use serde_json::Value;
use tracing::debug;

pub use extract::{extract_tasks, sink_set};
pub use source::{SpecSource, TreeNode};

use crate::ir::DeclaredTask;
use crate::parse::{ParseTree, YamlDocument};
use crate::tekton::{TektonYamlType, root_mapping, tekton_type};

/// Declared tasks of a Pipeline, or of a PipelineRun with an inline
/// `pipelineSpec`. Any other document yields no tasks.
pub fn pipeline_tasks(tree: &ParseTree, doc: &YamlDocument) -> Vec<DeclaredTask> {
    let Some(spec) = tree_spec(tree, doc) else {
        debug!("document has no pipeline spec");
        return Vec::new();
    };
    extract_tasks(spec)
}

/// The spec container the extractor works on, when the document has one.
pub fn tree_spec<'t>(tree: &'t ParseTree, doc: &YamlDocument) -> Option<TreeNode<'t>> {
    let root = TreeNode::new(tree, root_mapping(tree, doc)?);
    let spec = root.field("spec")?;
    match tekton_type(tree, doc)? {
        TektonYamlType::Pipeline => Some(spec),
        TektonYamlType::PipelineRun => spec.field("pipelineSpec"),
        _ => None,
    }
}

/// Declared tasks of a fetched Pipeline or PipelineRun object.
pub fn definition_tasks(definition: &Value) -> Vec<DeclaredTask> {
    let Some(spec) = definition.field("spec") else {
        return Vec::new();
    };
    match definition.field_text("kind").as_deref() {
        Some("PipelineRun") => spec.field("pipelineSpec").map(extract_tasks).unwrap_or_default(),
        _ => extract_tasks(spec),
    }
}
