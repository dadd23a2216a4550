//! Wire types of a PipelineRun `status` as returned by the cluster.
//!
//! Every field is optional; unknown fields are ignored. Maps keep the order
//! the cluster sent them in.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineRunStatus {
    /// Keyed by TaskRun name.
    pub task_runs: IndexMap<String, TaskRunEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskRunEntry {
    pub pipeline_task_name: Option<String>,
    pub status: Option<TaskRunStatus>,
    /// Keyed by condition-check name.
    pub condition_checks: IndexMap<String, ConditionCheck>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskRunStatus {
    pub conditions: Vec<StatusCondition>,
    pub start_time: Option<String>,
    pub completion_time: Option<String>,
    pub steps: Option<Vec<StepState>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusCondition {
    #[serde(rename = "type")]
    pub condition_type: Option<String>,
    pub status: Option<String>,
    pub reason: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StepState {
    pub name: Option<String>,
    pub terminated: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConditionCheck {
    pub condition_name: Option<String>,
    pub status: Option<TaskRunStatus>,
}

impl PipelineRunStatus {
    /// Read fetched run text, YAML or JSON. Accepts a whole PipelineRun
    /// object or a bare status object; unreadable text is "no data".
    pub fn from_text(text: &str) -> Option<Self> {
        let mut value: serde_yaml::Value = match serde_yaml::from_str(text) {
            Ok(value) => value,
            Err(err) => {
                debug!(%err, "run status is not valid YAML");
                return None;
            }
        };
        if let Some(status) = value.get_mut("status") {
            value = std::mem::replace(status, serde_yaml::Value::Null);
        }
        match serde_yaml::from_value(value) {
            Ok(status) => Some(status),
            Err(err) => {
                debug!(%err, "run status has an unexpected shape");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_whole_pipelinerun_yaml() {
        let text = "\
apiVersion: tekton.dev/v1beta1
kind: PipelineRun
metadata:
  name: run-1
status:
  taskRuns:
    run-1-build-abc:
      pipelineTaskName: build
      status:
        startTime: '2021-01-01T00:00:00Z'
        steps:
          - name: step-one
            terminated:
              exitCode: 0
          - name: step-two
";
        let status = PipelineRunStatus::from_text(text).unwrap();
        let entry = &status.task_runs["run-1-build-abc"];
        assert_eq!(entry.pipeline_task_name.as_deref(), Some("build"));
        let run = entry.status.as_ref().unwrap();
        assert_eq!(run.start_time.as_deref(), Some("2021-01-01T00:00:00Z"));
        let steps = run.steps.as_ref().unwrap();
        assert!(steps[0].terminated.is_some());
        assert!(steps[1].terminated.is_none());
    }

    #[test]
    fn reads_bare_status_json() {
        let text = r#"{ "taskRuns": { "r": { "pipelineTaskName": "a",
            "conditionChecks": { "c": { "conditionName": "file-exists",
                "status": { "conditions": [{ "status": "True" }] } } } } } }"#;
        let status = PipelineRunStatus::from_text(text).unwrap();
        let check = &status.task_runs["r"].condition_checks["c"];
        assert_eq!(check.condition_name.as_deref(), Some("file-exists"));
    }

    #[test]
    fn task_runs_keep_document_order() {
        let text = "taskRuns:\n  zz-retry:\n    pipelineTaskName: a\n  aa-first:\n    pipelineTaskName: b\n";
        let status = PipelineRunStatus::from_text(text).unwrap();
        let names: Vec<_> = status.task_runs.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zz-retry", "aa-first"]);
    }

    #[test]
    fn unreadable_text_is_no_data() {
        assert_eq!(PipelineRunStatus::from_text("taskRuns: [unclosed"), None);
        assert_eq!(PipelineRunStatus::from_text("taskRuns: 3"), None);
    }
}
