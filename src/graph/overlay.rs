//! Merge live run status onto declared tasks.

use tracing::trace;

use super::status::{PipelineRunStatus, TaskRunStatus};
use crate::ir::{DeclaredTask, PipelineRunTask, RunState, TaskKind};

const CANCELLED_REASON: &str = "TaskRunCancelled";

/// State of one task run. Later rules override earlier ones: a start time
/// makes it `Started`, then the first condition decides the final outcome.
pub fn get_run_state(status: Option<&TaskRunStatus>) -> RunState {
    let Some(status) = status else {
        return RunState::Unknown;
    };

    let mut state = RunState::Unknown;
    if status.start_time.is_some() {
        state = RunState::Started;
    }
    if let Some(condition) = status.conditions.first() {
        match condition.status.as_deref() {
            Some("True") => state = RunState::Finished,
            Some("False") if condition.reason.as_deref() == Some(CANCELLED_REASON) => {
                state = RunState::Cancelled
            }
            Some("False") => state = RunState::Failed,
            _ => {}
        }
    }
    state
}

/// The status record describing `task`.
///
/// Condition guards are matched through the owning task run's condition
/// checks and use the check's own status; everything else is matched by
/// pipeline task name.
pub fn find_status<'s>(task: &DeclaredTask, status: &'s PipelineRunStatus) -> Option<&'s TaskRunStatus> {
    let name = task.name.as_deref()?;
    let found = match task.kind {
        TaskKind::Condition => status.task_runs.values().find_map(|entry| {
            entry
                .condition_checks
                .values()
                .find(|check| check.condition_name.as_deref() == Some(name))
                .and_then(|check| check.status.as_ref())
        }),
        _ => status
            .task_runs
            .values()
            .find(|entry| entry.pipeline_task_name.as_deref() == Some(name))
            .and_then(|entry| entry.status.as_ref()),
    };
    if found.is_none() {
        trace!(task = name, "no run status for task");
    }
    found
}

/// Decorate every task with its run data. Without a status every task is
/// `Unknown`.
pub fn overlay(tasks: &[DeclaredTask], status: Option<&PipelineRunStatus>) -> Vec<PipelineRunTask> {
    tasks
        .iter()
        .map(|task| {
            let run = status.and_then(|status| find_status(task, status));
            decorate(task.clone(), run)
        })
        .collect()
}

fn decorate(task: DeclaredTask, run: Option<&TaskRunStatus>) -> PipelineRunTask {
    let mut decorated = PipelineRunTask::from(task);
    decorated.state = get_run_state(run);
    if let Some(run) = run {
        decorated.start_time = run.start_time.clone();
        decorated.completion_time = run.completion_time.clone();
        if let Some(steps) = &run.steps {
            decorated.steps_count = Some(steps.len());
            decorated.finished_steps = Some(steps.iter().filter(|step| step.terminated.is_some()).count());
        }
    }
    decorated
}
