use serde::Serialize;

use crate::parse::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u32);

impl ElementId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Closed set of Tekton constructs the element tree knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementType {
    Document,
    Pipeline,
    PipelineRun,
    PipelineRunSpec,
    PipelineRef,
    Metadata,
    Param,
    Params,
    PipelineSpec,
    PipelineResources,
    PipelineResource,
    PipelineTasks,
    PipelineFinally,
    PipelineTask,
    PipelineTaskRef,
    Value,
    ParamSpecs,
    ParamSpec,
    StringArray,
    PipelineWorkspaces,
    PipelineWorkspace,
    PipelineTaskConditions,
    PipelineTaskCondition,
    PipelineTaskInputResources,
    PipelineTaskInputResource,
    PipelineTaskInputResourceFrom,
    PipelineTaskRunAfter,
    PipelineTaskResources,
    PipelineTaskOutputsResource,
    PipelineTaskOutputsResources,
    PipelineTaskParams,
    PipelineTaskWorkspace,
    PipelineTaskWorkspaces,
    PipelineTaskWhens,
    PipelineTaskWhen,
    PipelineTaskWhenValues,
    EmbeddedTask,
    TaskResults,
    TaskResult,
}

impl ElementType {
    pub fn is_leaf(self) -> bool {
        matches!(self, ElementType::Value)
    }
}

/// Kind named by a `taskRef`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TaskRefKind {
    Task,
    ClusterTask,
    Other(String),
}

impl TaskRefKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Task" => TaskRefKind::Task,
            "ClusterTask" => TaskRefKind::ClusterTask,
            other => TaskRefKind::Other(other.to_string()),
        }
    }
}

/// Decoded value of a leaf element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ElementValue {
    Str(String),
    Bool(bool),
    Int(i64),
    RefKind(TaskRefKind),
}

/// Where a child sits in its parent: a named field or a sequence index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Field(&'static str),
    Item(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub ty: ElementType,
    pub start: usize,
    pub end: usize,
    pub parent: Option<ElementId>,
    /// Backing parse node; the document element has none.
    pub node: Option<NodeId>,
    /// Start of the mapping key when the element is a pair value.
    pub key_start: Option<usize>,
    pub slots: Vec<(Slot, Option<ElementId>)>,
    pub value: Option<ElementValue>,
}

impl Element {
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Present children, in declaration order.
    pub fn children(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.slots.iter().filter_map(|(_, child)| *child)
    }

    pub fn field(&self, name: &str) -> Option<ElementId> {
        self.slots.iter().find_map(|(slot, child)| match slot {
            Slot::Field(field) if *field == name => *child,
            _ => None,
        })
    }

    pub fn text(&self) -> Option<&str> {
        match &self.value {
            Some(ElementValue::Str(text)) => Some(text),
            _ => None,
        }
    }
}
