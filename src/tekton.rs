//! Tekton document detection and document-level queries over the parse tree.

use serde::Serialize;
use tracing::trace;

use crate::graph::overlay::get_run_state;
use crate::graph::status::TaskRunStatus;
use crate::ir::RunState;
use crate::parse::{NodeId, ParseTree, ParsedDocuments, YamlDocument};

pub const TEKTON_API_GROUP: &str = "tekton.dev/";
pub const TRIGGERS_API_GROUP: &str = "triggers.tekton.dev/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TektonYamlType {
    Task,
    TaskRun,
    Pipeline,
    PipelineRun,
    PipelineResource,
    ClusterTask,
    Condition,
    TriggerBinding,
    TriggerTemplate,
    ClusterTriggerBinding,
    EventListener,
}

impl TektonYamlType {
    pub fn from_kind(kind: &str) -> Option<Self> {
        let ty = match kind {
            "Task" => TektonYamlType::Task,
            "TaskRun" => TektonYamlType::TaskRun,
            "Pipeline" => TektonYamlType::Pipeline,
            "PipelineRun" => TektonYamlType::PipelineRun,
            "PipelineResource" => TektonYamlType::PipelineResource,
            "ClusterTask" => TektonYamlType::ClusterTask,
            "Condition" => TektonYamlType::Condition,
            "TriggerBinding" => TektonYamlType::TriggerBinding,
            "TriggerTemplate" => TektonYamlType::TriggerTemplate,
            "ClusterTriggerBinding" => TektonYamlType::ClusterTriggerBinding,
            "EventListener" => TektonYamlType::EventListener,
            _ => return None,
        };
        Some(ty)
    }
}

/// Resource declared in `spec.resources` of a Pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaredResource {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
}

fn is_tekton_api(api_version: &str) -> bool {
    api_version.starts_with(TEKTON_API_GROUP) || api_version.starts_with(TRIGGERS_API_GROUP)
}

/// The top-level mapping of a document.
pub fn root_mapping(tree: &ParseTree, doc: &YamlDocument) -> Option<NodeId> {
    doc.root_mapping(tree)
}

/// Type of the first top-level mapping that is a recognized Tekton resource.
pub fn tekton_type(tree: &ParseTree, doc: &YamlDocument) -> Option<TektonYamlType> {
    doc.nodes.iter().find_map(|&node| {
        let api_version = tree.find_text(node, "apiVersion")?;
        if !is_tekton_api(api_version) {
            return None;
        }
        TektonYamlType::from_kind(tree.find_text(node, "kind")?)
    })
}

pub fn tekton_documents(parsed: &ParsedDocuments, ty: TektonYamlType) -> Vec<&YamlDocument> {
    parsed
        .documents
        .iter()
        .filter(|doc| tekton_type(&parsed.tree, doc) == Some(ty))
        .collect()
}

pub fn metadata_name(tree: &ParseTree, doc: &YamlDocument) -> Option<String> {
    let root = root_mapping(tree, doc)?;
    let metadata = tree.find_value(root, "metadata")?;
    tree.find_text(metadata, "name").map(str::to_string)
}

fn spec(tree: &ParseTree, doc: &YamlDocument) -> Option<NodeId> {
    tree.find_value(root_mapping(tree, doc)?, "spec")
}

fn pipeline_spec(tree: &ParseTree, doc: &YamlDocument) -> Option<NodeId> {
    match tekton_type(tree, doc)? {
        TektonYamlType::Pipeline => spec(tree, doc),
        _ => None,
    }
}

fn task_nodes(tree: &ParseTree, doc: &YamlDocument) -> Vec<NodeId> {
    pipeline_spec(tree, doc)
        .and_then(|spec| tree.find_value(spec, "tasks"))
        .map(|tasks| tree.items(tasks).to_vec())
        .unwrap_or_default()
}

pub fn declared_resources(tree: &ParseTree, doc: &YamlDocument) -> Vec<DeclaredResource> {
    let Some(resources) = pipeline_spec(tree, doc).and_then(|spec| tree.find_value(spec, "resources"))
    else {
        return Vec::new();
    };

    tree.items(resources)
        .iter()
        .filter(|&&res| !tree.pairs(res).is_empty())
        .map(|&res| DeclaredResource {
            name: tree.find_text(res, "name").map(str::to_string),
            resource_type: tree.find_text(res, "type").map(str::to_string),
        })
        .collect()
}

pub fn pipeline_task_names(tree: &ParseTree, doc: &YamlDocument) -> Vec<String> {
    task_nodes(tree, doc)
        .into_iter()
        .filter_map(|task| tree.find_text(task, "name"))
        .map(str::to_string)
        .collect()
}

pub fn pipeline_task_ref_names(tree: &ParseTree, doc: &YamlDocument) -> Vec<String> {
    task_nodes(tree, doc)
        .into_iter()
        .filter_map(|task| tree.find_value(task, "taskRef"))
        .filter_map(|task_ref| tree.find_text(task_ref, "name"))
        .map(str::to_string)
        .collect()
}

pub fn pipeline_run_name(tree: &ParseTree, doc: &YamlDocument) -> Option<String> {
    match tekton_type(tree, doc)? {
        TektonYamlType::PipelineRun => metadata_name(tree, doc),
        _ => None,
    }
}

/// `spec.pipelineRef.name` of a PipelineRun.
pub fn pipeline_ref_name(tree: &ParseTree, doc: &YamlDocument) -> Option<String> {
    if tekton_type(tree, doc)? != TektonYamlType::PipelineRun {
        return None;
    }
    let pipeline_ref = tree.find_value(spec(tree, doc)?, "pipelineRef")?;
    tree.find_text(pipeline_ref, "name").map(str::to_string)
}

/// State of a PipelineRun from the `status` embedded in its own document.
pub fn pipeline_run_state(tree: &ParseTree, doc: &YamlDocument) -> RunState {
    let status = root_mapping(tree, doc)
        .and_then(|root| tree.find_value(root, "status"))
        .map(|status| tree.to_json(status))
        .and_then(|json| match serde_json::from_value::<TaskRunStatus>(json) {
            Ok(status) => Some(status),
            Err(err) => {
                trace!(%err, "ignoring unreadable pipelinerun status");
                None
            }
        });
    get_run_state(status.as_ref())
}
