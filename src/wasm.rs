//! WASM entry points for the editor host.
//!
//! The host parses YAML itself and passes its parse tree as JSON (see
//! [`crate::parse::raw`]). Fetched Pipeline and run text is passed in as-is.

use chrono::{DateTime, Utc};
use wasm_bindgen::prelude::*;

use crate::config::GraphOptions;
use crate::error::Error;
use crate::graph::{self, NodeOrEdge, PipelineRunStatus};
use crate::ir::DeclaredTask;
use crate::lower::{extract_tasks, pipeline_tasks, tree_spec};
use crate::model::{Definition, ElementId, ElementType, ElementValue, TknDocument};
use crate::parse::{LineTable, ParsedDocuments, parse_tree_json};
use crate::preview::fetched_definition_tasks;
use crate::tekton::{TektonYamlType, tekton_documents};

/// Graph of the first Pipeline in the tree.
/// Returns `{status: "success", graph}` or `{status: "errors", errors}`.
#[wasm_bindgen]
pub fn pipeline_graph(tree_json: &str, options_json: &str) -> JsValue {
    let result = pipeline_graph_inner(tree_json, options_json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn pipeline_graph_inner(tree_json: &str, options_json: &str) -> GraphResult {
    let parsed = match parse_tree_json(tree_json) {
        Ok(parsed) => parsed,
        Err(e) => return GraphResult::Errors(vec![ErrorDto::from(e)]),
    };
    let options = GraphOptions::from_json(options_json);

    let tasks = tekton_documents(&parsed, TektonYamlType::Pipeline)
        .first()
        .map(|doc| pipeline_tasks(&parsed.tree, doc))
        .unwrap_or_default();
    GraphResult::Success(graph::pipeline_graph(&tasks, options))
}

/// Graph of the first PipelineRun in the tree, overlaid with run status.
///
/// `pipeline_json` is the fetched Pipeline for runs that reference one by
/// name; `status_json` is the fetched PipelineRun or its bare status.
#[wasm_bindgen]
pub fn pipeline_run_graph(
    tree_json: &str,
    pipeline_json: Option<String>,
    status_json: Option<String>,
    now_ms: f64,
    options_json: &str,
) -> JsValue {
    let result = pipeline_run_graph_inner(
        tree_json,
        pipeline_json.as_deref(),
        status_json.as_deref(),
        now_ms,
        options_json,
    );
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn pipeline_run_graph_inner(
    tree_json: &str,
    pipeline_json: Option<&str>,
    status_json: Option<&str>,
    now_ms: f64,
    options_json: &str,
) -> GraphResult {
    let parsed = match parse_tree_json(tree_json) {
        Ok(parsed) => parsed,
        Err(e) => return GraphResult::Errors(vec![ErrorDto::from(e)]),
    };
    let options = GraphOptions::from_json(options_json);
    let now = DateTime::<Utc>::from_timestamp_millis(now_ms as i64).unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    let tasks = run_tasks(&parsed, pipeline_json);
    let status = status_json.and_then(PipelineRunStatus::from_text);
    GraphResult::Success(graph::pipeline_run_graph(&tasks, status.as_ref(), now, options))
}

/// Inline spec of the run when it has one, else the fetched Pipeline.
fn run_tasks(parsed: &ParsedDocuments, pipeline_json: Option<&str>) -> Vec<DeclaredTask> {
    let inline = tekton_documents(parsed, TektonYamlType::PipelineRun)
        .first()
        .and_then(|doc| tree_spec(&parsed.tree, doc))
        .map(extract_tasks);
    match (inline, pipeline_json) {
        (Some(tasks), _) => tasks,
        (None, Some(text)) => fetched_definition_tasks(text),
        (None, None) => Vec::new(),
    }
}

/// Most specific element at a 0-based `(line, column)`, or `null`.
///
/// Columns and the tree's offsets are UTF-16 code units, as the host indexes them.
#[wasm_bindgen]
pub fn find_element(tree_json: &str, text: &str, line: usize, column: usize) -> JsValue {
    let result = find_element_inner(tree_json, text, line, column);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn find_element_inner(tree_json: &str, text: &str, line: usize, column: usize) -> ElementResult {
    let parsed = match parse_tree_json(tree_json) {
        Ok(parsed) => parsed,
        Err(e) => return ElementResult::Errors(vec![ErrorDto::from(e)]),
    };
    let lines = LineTable::from_text_utf16(text);
    let offset = match lines.position_to_offset(line, column) {
        Ok(offset) => offset,
        Err(e) => return ElementResult::Errors(vec![ErrorDto::from(e)]),
    };

    let found = parsed
        .documents
        .iter()
        .filter_map(|doc| TknDocument::build(&parsed.tree, doc))
        .find_map(|doc| {
            let id = doc.find_element(offset)?;
            Some(ElementDto::new(&doc, id, offset))
        });
    ElementResult::Success(found)
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Serialize)]
struct ErrorDto {
    code: String,
    message: String,
}

impl From<Error> for ErrorDto {
    fn from(e: Error) -> Self {
        ErrorDto {
            code: e.code().to_string(),
            message: e.to_string(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ElementDto {
    #[serde(rename = "type")]
    ty: ElementType,
    start: usize,
    end: usize,
    value: Option<ElementValue>,
    definition: Option<Definition>,
    task_name: Option<String>,
}

impl ElementDto {
    fn new(doc: &TknDocument, id: ElementId, offset: usize) -> Self {
        let element = doc.element(id);
        ElementDto {
            ty: element.ty,
            start: element.start,
            end: element.end,
            value: element.value.clone(),
            definition: doc.definition(id),
            task_name: doc.task_name_at(offset),
        }
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(tag = "status")]
enum GraphResult {
    #[serde(rename = "success")]
    Success(Vec<NodeOrEdge>),
    #[serde(rename = "errors")]
    Errors(Vec<ErrorDto>),
}

#[derive(Debug, serde::Serialize)]
#[serde(tag = "status")]
enum ElementResult {
    #[serde(rename = "success")]
    Success(Option<ElementDto>),
    #[serde(rename = "errors")]
    Errors(Vec<ErrorDto>),
}
