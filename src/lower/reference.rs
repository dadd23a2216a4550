//! Mine `$(tasks.<name>.results.<result>)` substitutions out of strings.
//!
//! This is a narrow pattern match, not an expression evaluator: aliases and
//! nested substitutions are not resolved, and `$(params.…)` / `$(context.…)`
//! never count as dependencies.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

const RESULT_REF_PATTERN: &str = r"\$\(tasks\.([^.)\s]+)\.results\.([^.)\s]+)\)";

static RESULT_REF: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(RESULT_REF_PATTERN)
        .map_err(|e| warn!(pattern = RESULT_REF_PATTERN, error = %e, "invalid result reference regex"))
        .ok()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultRef<'a> {
    pub task: &'a str,
    pub result: &'a str,
}

/// Every result reference in `input`, in order of appearance.
pub fn result_refs(input: &str) -> Vec<ResultRef<'_>> {
    let Some(re) = RESULT_REF.as_ref() else {
        return Vec::new();
    };
    re.captures_iter(input)
        .filter_map(|caps| {
            Some(ResultRef {
                task: caps.get(1)?.as_str(),
                result: caps.get(2)?.as_str(),
            })
        })
        .collect()
}

/// Names of the tasks whose results `input` consumes, first-seen order.
pub fn referenced_tasks(input: &str) -> Vec<String> {
    let mut tasks: Vec<String> = Vec::new();
    for r in result_refs(input) {
        if !tasks.iter().any(|t| t == r.task) {
            tasks.push(r.task.to_string());
        }
    }
    tasks
}
