//! Pipeline and PipelineRun previews for open documents.
//!
//! [`PipelinePreview`] owns the parse-tree cache. Run previews may need two
//! fetches from the cluster (the referenced Pipeline, then the run status).
//! They are awaited one after the other. If the document changes while they
//! are in flight, the result is reported as [`Preview::Stale`].

use std::fmt::Debug;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::config::GraphOptions;
use crate::error::Result;
use crate::graph::{self, NodeOrEdge, PipelineRunStatus};
use crate::ir::DeclaredTask;
use crate::lower::{definition_tasks, extract_tasks, pipeline_tasks, tree_spec};
use crate::parse::{ParseTreeCache, TextDocument, YamlParser};
use crate::tekton::{TektonYamlType, pipeline_ref_name, pipeline_run_name, tekton_documents};

/// Cluster access through the CLI. Both calls return raw YAML or JSON text.
#[allow(async_fn_in_trait)]
pub trait TektonClient {
    async fn pipeline_definition(&self, name: &str) -> Result<String>;
    async fn pipeline_run(&self, name: &str) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    Graph(Vec<NodeOrEdge>),
    /// The document was edited while fetching; nothing to show.
    Stale,
}

/// What a PipelineRun document says before anything is fetched.
struct RunPlan {
    run_name: Option<String>,
    inline_tasks: Option<Vec<DeclaredTask>>,
    pipeline_ref: Option<String>,
}

pub struct PipelinePreview<K, P> {
    cache: ParseTreeCache<K, P>,
    options: GraphOptions,
}

impl<K, P> PipelinePreview<K, P>
where
    K: Eq + Hash + Clone + Debug,
    P: YamlParser,
{
    pub fn new(parser: P, options: GraphOptions) -> Self {
        Self {
            cache: ParseTreeCache::new(parser),
            options,
        }
    }

    pub fn cache(&self) -> &ParseTreeCache<K, P> {
        &self.cache
    }

    pub fn invalidate(&mut self, key: &K) -> bool {
        self.cache.invalidate(key)
    }

    /// Graph of the first Pipeline in the document.
    pub fn pipeline_graph(&mut self, key: &K, doc: &impl TextDocument) -> Vec<NodeOrEdge> {
        let entry = self.cache.ensure(key, doc);
        let parsed = &entry.parsed;
        let tasks = tekton_documents(parsed, TektonYamlType::Pipeline)
            .first()
            .map(|pipeline| pipeline_tasks(&parsed.tree, pipeline))
            .unwrap_or_default();
        graph::pipeline_graph(&tasks, self.options)
    }

    /// Graph of the first PipelineRun in the document, overlaid with its
    /// live status.
    pub async fn pipeline_run_graph<C: TektonClient>(
        &mut self,
        key: &K,
        doc: &impl TextDocument,
        client: &C,
        now: DateTime<Utc>,
    ) -> Result<Preview> {
        let version = doc.version();
        let Some(plan) = self.run_plan(key, doc) else {
            return Ok(Preview::Graph(Vec::new()));
        };

        let tasks = match (plan.inline_tasks, plan.pipeline_ref) {
            (Some(tasks), _) => tasks,
            (None, Some(pipeline)) => {
                let text = client.pipeline_definition(&pipeline).await?;
                fetched_definition_tasks(&text)
            }
            (None, None) => Vec::new(),
        };

        let status = match plan.run_name {
            Some(run) => PipelineRunStatus::from_text(&client.pipeline_run(&run).await?),
            None => None,
        };

        if doc.version() != version {
            debug!(?key, from = version, to = doc.version(), "discarding stale run preview");
            return Ok(Preview::Stale);
        }

        Ok(Preview::Graph(graph::pipeline_run_graph(
            &tasks,
            status.as_ref(),
            now,
            self.options,
        )))
    }

    fn run_plan(&mut self, key: &K, doc: &impl TextDocument) -> Option<RunPlan> {
        let entry = self.cache.ensure(key, doc);
        let parsed = &entry.parsed;
        let run = *tekton_documents(parsed, TektonYamlType::PipelineRun).first()?;
        Some(RunPlan {
            run_name: pipeline_run_name(&parsed.tree, run),
            inline_tasks: tree_spec(&parsed.tree, run).map(extract_tasks),
            pipeline_ref: pipeline_ref_name(&parsed.tree, run),
        })
    }
}

/// Tasks of fetched Pipeline text; unreadable text has none.
pub fn fetched_definition_tasks(text: &str) -> Vec<DeclaredTask> {
    match serde_yaml::from_str::<Value>(text) {
        Ok(definition) => definition_tasks(&definition),
        Err(err) => {
            debug!(%err, "fetched pipeline is not valid YAML");
            Vec::new()
        }
    }
}
