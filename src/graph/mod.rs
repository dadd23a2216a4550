//! Graph phase: run-state overlay and node/edge serialization.

pub mod humanize;
pub mod overlay;
pub mod serialize;
pub mod status;

use chrono::{DateTime, Utc};

pub use overlay::{get_run_state, overlay};
pub use serialize::{Decoration, EdgeData, GraphData, NodeData, NodeOrEdge, to_graph};
pub use status::{PipelineRunStatus, TaskRunStatus};

use crate::config::GraphOptions;
use crate::ir::{DeclaredTask, PipelineRunTask};

/// Graph of a Pipeline without run data: no states, plain labels.
pub fn pipeline_graph(tasks: &[DeclaredTask], options: GraphOptions) -> Vec<NodeOrEdge> {
    let tasks: Vec<PipelineRunTask> = tasks.iter().cloned().map(PipelineRunTask::from).collect();
    let decoration = Decoration {
        with_state: false,
        now: DateTime::<Utc>::UNIX_EPOCH,
        options,
    };
    to_graph(&tasks, &decoration)
}

/// Graph of a PipelineRun: tasks overlaid with `status`, timed against `now`.
pub fn pipeline_run_graph(
    tasks: &[DeclaredTask],
    status: Option<&PipelineRunStatus>,
    now: DateTime<Utc>,
    options: GraphOptions,
) -> Vec<NodeOrEdge> {
    let runs = overlay(tasks, status);
    let decoration = Decoration {
        with_state: true,
        now,
        options,
    };
    to_graph(&runs, &decoration)
}
