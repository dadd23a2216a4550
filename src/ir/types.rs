//! Task graph IR.
//!
//! Extraction lowers a Pipeline spec into a flat list of [`DeclaredTask`]s
//! (real tasks plus synthetic guard nodes), the overlay decorates them into
//! [`PipelineRunTask`]s, and the serializer flattens those for the renderer.

use serde::{Serialize, Serializer};

// =============================================================================
// DECLARED TASKS
// =============================================================================

/// What a graph node stands for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaskKind {
    Task,
    ClusterTask,
    /// Synthetic guard for one `conditions[]` entry.
    Condition,
    /// Synthetic guard for one `when[]` entry.
    When,
    /// A `taskRef.kind` this crate does not know about, kept verbatim.
    Other(String),
    /// Neither `taskRef` nor `taskSpec` was declared.
    #[default]
    Unknown,
}

impl TaskKind {
    pub fn from_ref_kind(kind: &str) -> Self {
        match kind {
            "Task" => TaskKind::Task,
            "ClusterTask" => TaskKind::ClusterTask,
            other => TaskKind::Other(other.to_string()),
        }
    }

    /// Renderer `type` string; `None` for [`TaskKind::Unknown`].
    pub fn as_type(&self) -> Option<&str> {
        match self {
            TaskKind::Task => Some("Task"),
            TaskKind::ClusterTask => Some("ClusterTask"),
            TaskKind::Condition => Some("Condition"),
            TaskKind::When => Some("When"),
            TaskKind::Other(kind) => Some(kind),
            TaskKind::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TaskKind::Unknown)
    }
}

impl Serialize for TaskKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_type() {
            Some(kind) => serializer.serialize_str(kind),
            None => serializer.serialize_none(),
        }
    }
}

/// A statically extracted task node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredTask {
    /// Unique within one extraction, except for repeated guards (see DESIGN.md).
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_ref: Option<String>,
    #[serde(skip_serializing_if = "TaskKind::is_unknown")]
    pub kind: TaskKind,
    /// Predecessor ids, in first-seen order, without duplicates.
    pub run_after: Vec<String>,
    /// Start offset of the task's YAML node, when it came from a parse tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(rename = "final")]
    pub is_final: bool,
}

impl DeclaredTask {
    pub fn add_run_after(&mut self, id: impl Into<String>) {
        push_unique(&mut self.run_after, id.into());
    }
}

/// Append `id` unless it is already present.
pub fn push_unique(ids: &mut Vec<String>, id: String) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

// =============================================================================
// RUN STATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum RunState {
    Started,
    Finished,
    Failed,
    Cancelled,
    #[default]
    Unknown,
}

/// A declared task decorated with live run data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunTask {
    #[serde(flatten)]
    pub task: DeclaredTask,
    pub state: RunState,
    /// RFC 3339 timestamps, copied verbatim from the status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_steps: Option<usize>,
}

impl From<DeclaredTask> for PipelineRunTask {
    fn from(task: DeclaredTask) -> Self {
        Self {
            task,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_after_keeps_first_seen_order() {
        let mut task = DeclaredTask::default();
        task.add_run_after("b");
        task.add_run_after("a");
        task.add_run_after("b");
        assert_eq!(task.run_after, vec!["b", "a"]);
    }

    #[test]
    fn unknown_kind_is_omitted_from_json() {
        let task = DeclaredTask {
            id: Some("lint".into()),
            name: Some("lint".into()),
            ..DeclaredTask::default()
        };
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("kind").is_none());

        let json = serde_json::to_value(TaskKind::Other("Custom".into())).unwrap();
        assert_eq!(json, "Custom");
    }
}
