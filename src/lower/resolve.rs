//! Run-after base set of one pipeline task.

use super::reference::referenced_tasks;
use super::source::SpecSource;
use crate::ir::push_unique;

/// Predecessors implied by the task itself, before guards are applied:
/// explicit `runAfter`, `resources.inputs[].from` producers, and tasks whose
/// results are substituted into `params[].value`.
pub fn base_run_after<S: SpecSource>(task: S) -> Vec<String> {
    let mut ids = Vec::new();

    for entry in task.field_items("runAfter") {
        if let Some(id) = entry.text() {
            push_unique(&mut ids, id);
        }
    }

    if let Some(resources) = task.field("resources") {
        for input in resources.field_items("inputs") {
            for producer in resource_producers(input) {
                push_unique(&mut ids, producer);
            }
        }
    }

    for param in task.field_items("params") {
        for text in param_strings(param) {
            for id in referenced_tasks(&text) {
                push_unique(&mut ids, id);
            }
        }
    }

    ids
}

/// `from:` entries of one resource binding.
pub fn resource_producers<S: SpecSource>(binding: S) -> Vec<String> {
    binding
        .field_items("from")
        .into_iter()
        .filter_map(|from| from.text())
        .collect()
}

/// Producers named by the resource bindings of one `conditions[]` entry.
pub fn condition_producers<S: SpecSource>(condition: S) -> Vec<String> {
    let mut ids = Vec::new();
    for binding in condition.field_items("resources") {
        for producer in resource_producers(binding) {
            push_unique(&mut ids, producer);
        }
    }
    ids
}

/// A task with `conditions` or `when` entries is ordered only through them.
pub fn has_guards<S: SpecSource>(task: S) -> bool {
    !task.field_items("conditions").is_empty() || !task.field_items("when").is_empty()
}

/// String value of a param, or the string items of an array value.
fn param_strings<S: SpecSource>(param: S) -> Vec<String> {
    let Some(value) = param.field("value") else {
        return Vec::new();
    };
    match value.text() {
        Some(text) => vec![text],
        None => value.items().into_iter().filter_map(|item| item.text()).collect(),
    }
}
