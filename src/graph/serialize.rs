//! Flatten overlaid tasks into the renderer's node/edge list.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use tracing::debug;

use super::humanize::humanize;
use crate::config::GraphOptions;
use crate::ir::{PipelineRunTask, RunState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeOrEdge {
    pub data: GraphData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GraphData {
    Node(NodeData),
    Edge(EdgeData),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub id: Option<String>,
    pub label: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<RunState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeData {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<RunState>,
}

impl NodeOrEdge {
    pub fn as_node(&self) -> Option<&NodeData> {
        match &self.data {
            GraphData::Node(node) => Some(node),
            GraphData::Edge(_) => None,
        }
    }

    pub fn as_edge(&self) -> Option<&EdgeData> {
        match &self.data {
            GraphData::Edge(edge) => Some(edge),
            GraphData::Node(_) => None,
        }
    }
}

/// What the serializer puts on nodes and edges besides structure.
#[derive(Debug, Clone, Copy)]
pub struct Decoration {
    pub with_state: bool,
    pub now: DateTime<Utc>,
    pub options: GraphOptions,
}

/// Task graph keyed by task id. The first task with a given id owns it.
struct TaskGraph {
    graph: DiGraph<usize, ()>,
    nodes: Vec<NodeIndex>,
}

impl TaskGraph {
    fn build(tasks: &[PipelineRunTask]) -> Self {
        let mut graph = DiGraph::new();
        let mut by_id: HashMap<&str, NodeIndex> = HashMap::new();
        let mut nodes = Vec::with_capacity(tasks.len());

        for (index, task) in tasks.iter().enumerate() {
            let node = graph.add_node(index);
            nodes.push(node);
            if let Some(id) = task.task.id.as_deref() {
                by_id.entry(id).or_insert(node);
            }
        }

        for (index, task) in tasks.iter().enumerate() {
            let Some(id) = task.task.id.as_deref() else {
                continue;
            };
            for dep in &task.task.run_after {
                if dep == id {
                    debug!(task = id, "ignoring runAfter on itself");
                    continue;
                }
                match by_id.get(dep.as_str()) {
                    Some(&source) => {
                        graph.add_edge(source, nodes[index], ());
                    }
                    None => debug!(task = id, dep = %dep, "dropping dangling runAfter"),
                }
            }
        }

        Self { graph, nodes }
    }

    /// Task indices of the predecessors of `index`, in `run_after` order.
    fn predecessors(&self, index: usize) -> Vec<usize> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(self.nodes[index], Direction::Incoming)
            .collect();
        edges.sort_by_key(|edge| edge.id());
        edges.iter().map(|edge| self.graph[edge.source()]).collect()
    }
}

/// Each task's node followed by its incoming edges.
pub fn to_graph(tasks: &[PipelineRunTask], decoration: &Decoration) -> Vec<NodeOrEdge> {
    let graph = TaskGraph::build(tasks);
    let mut result = Vec::with_capacity(tasks.len() * 2);

    for (index, task) in tasks.iter().enumerate() {
        result.push(NodeOrEdge {
            data: GraphData::Node(node_data(task, decoration)),
        });

        let Some(target) = task.task.id.as_deref() else {
            continue;
        };
        for dep_index in graph.predecessors(index) {
            let dep = &tasks[dep_index];
            let Some(source) = dep.task.id.as_deref() else {
                continue;
            };
            result.push(NodeOrEdge {
                data: GraphData::Edge(EdgeData {
                    id: format!("{source}-{target}"),
                    source: source.to_string(),
                    target: target.to_string(),
                    state: decoration.with_state.then_some(dep.state),
                }),
            });
        }
    }

    result
}

fn node_data(task: &PipelineRunTask, decoration: &Decoration) -> NodeData {
    NodeData {
        id: task.task.id.clone(),
        label: label(task, decoration),
        kind: task.task.kind.as_type().map(str::to_string),
        task_ref: task.task.task_ref.clone(),
        state: decoration.with_state.then_some(task.state),
    }
}

/// Task name, then ` (finished/total)`, then the elapsed time.
pub fn label(task: &PipelineRunTask, decoration: &Decoration) -> String {
    let mut label = task.task.name.clone().unwrap_or_default();

    if decoration.options.step_progress {
        if let (Some(finished), Some(total)) = (task.finished_steps, task.steps_count) {
            label.push_str(&format!(" ({finished}/{total})"));
        }
    }

    if decoration.options.elapsed_time {
        if let Some(elapsed) = elapsed(task, decoration.now) {
            label.push(' ');
            label.push_str(&elapsed);
        }
    }

    label
}

/// `completion - start` once finished, `now - start` while running.
fn elapsed(task: &PipelineRunTask, now: DateTime<Utc>) -> Option<String> {
    let start = parse_time(task.start_time.as_deref()?)?;
    let end = match task.completion_time.as_deref() {
        Some(completion) => parse_time(completion)?,
        None => now,
    };
    Some(humanize(end - start))
}

fn parse_time(text: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(text) {
        Ok(time) => Some(time.with_timezone(&Utc)),
        Err(err) => {
            debug!(%err, time = text, "unreadable timestamp");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::ir::{DeclaredTask, TaskKind};

    fn task(id: &str, run_after: &[&str]) -> PipelineRunTask {
        PipelineRunTask::from(DeclaredTask {
            id: Some(id.into()),
            name: Some(id.into()),
            kind: TaskKind::Task,
            run_after: run_after.iter().map(|s| s.to_string()).collect(),
            ..DeclaredTask::default()
        })
    }

    fn decoration() -> Decoration {
        Decoration {
            with_state: true,
            now: Utc.with_ymd_and_hms(2021, 1, 1, 0, 5, 0).unwrap(),
            options: GraphOptions::default(),
        }
    }

    #[test]
    fn dangling_run_after_is_dropped() {
        let tasks = vec![task("a", &[]), task("b", &["a", "ghost"])];
        let out = to_graph(&tasks, &decoration());
        let edges: Vec<_> = out.iter().filter_map(NodeOrEdge::as_edge).collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].id, "a-b");
        assert_eq!(edges[0].state, Some(RunState::Unknown));
    }

    #[test]
    fn run_after_on_itself_draws_no_edge() {
        let tasks = vec![task("a", &[]), task("loop", &["loop", "a"])];
        let out = to_graph(&tasks, &decoration());
        let edges: Vec<_> = out.iter().filter_map(NodeOrEdge::as_edge).map(|edge| edge.id.as_str()).collect();
        assert_eq!(edges, vec!["a-loop"]);
    }

    #[test]
    fn edges_follow_their_target_in_run_after_order() {
        let tasks = vec![task("a", &[]), task("b", &[]), task("c", &["b", "a"])];
        let out = to_graph(&tasks, &decoration());
        let ids: Vec<String> = out
            .iter()
            .map(|item| match &item.data {
                GraphData::Node(node) => node.id.clone().unwrap_or_default(),
                GraphData::Edge(edge) => edge.id.clone(),
            })
            .collect();
        assert_eq!(ids, vec!["a", "b", "c", "b-c", "a-c"]);
    }

    #[test]
    fn label_shows_progress_and_running_time() {
        let mut running = task("build", &[]);
        running.state = RunState::Started;
        running.start_time = Some("2021-01-01T00:03:30Z".into());
        running.steps_count = Some(3);
        running.finished_steps = Some(1);
        assert_eq!(label(&running, &decoration()), "build (1/3) 1m 30s");

        running.completion_time = Some("2021-01-01T00:04:00Z".into());
        assert_eq!(label(&running, &decoration()), "build (1/3) 30s");
    }

    #[test]
    fn label_features_can_be_switched_off() {
        let mut running = task("build", &[]);
        running.start_time = Some("2021-01-01T00:03:30Z".into());
        running.steps_count = Some(1);
        running.finished_steps = Some(1);
        let mut decoration = decoration();
        decoration.options = GraphOptions {
            step_progress: false,
            elapsed_time: false,
        };
        assert_eq!(label(&running, &decoration), "build");
    }

    #[test]
    fn unknown_kind_has_no_type() {
        let mut bare = task("bare", &[]);
        bare.task.kind = TaskKind::Unknown;
        let out = to_graph(&[bare], &decoration());
        let json = serde_json::to_value(&out).unwrap();
        assert!(json[0]["data"].get("type").is_none());
        assert_eq!(json[0]["data"]["state"], "Unknown");
    }
}
