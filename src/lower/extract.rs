//! Flatten a Pipeline spec into declared tasks, synthetic guard nodes and
//! `finally` tasks.

use tracing::debug;

use super::reference::referenced_tasks;
use super::resolve::{base_run_after, condition_producers, has_guards};
use super::source::SpecSource;
use crate::ir::{DeclaredTask, TaskKind, push_unique};

/// Extract every task of `spec`, main list first, then `finally`.
///
/// Each main-list task is followed by the guard nodes synthesized from its
/// `conditions` and `when` entries.
pub fn extract_tasks<S: SpecSource>(spec: S) -> Vec<DeclaredTask> {
    let mut tasks = Vec::new();

    for entry in spec.field_items("tasks") {
        if !entry.is_mapping() {
            debug!(offset = ?entry.offset(), "skipping non-mapping task entry");
            continue;
        }

        let mut task = declare_task(entry);
        let base = base_run_after(entry);
        let guards = guard_tasks(entry, task.name.as_deref(), &base);

        if has_guards(entry) {
            for guard in &guards {
                if let Some(id) = &guard.id {
                    task.add_run_after(id.clone());
                }
            }
        } else {
            task.run_after = base;
        }

        tasks.push(task);
        tasks.extend(guards);
    }

    let sinks = sink_set(&tasks);

    for entry in spec.field_items("finally") {
        if !entry.is_mapping() {
            debug!(offset = ?entry.offset(), "skipping non-mapping finally entry");
            continue;
        }
        let mut task = declare_task(entry);
        task.is_final = true;
        task.run_after = sinks.clone();
        tasks.push(task);
    }

    tasks
}

/// Name, ref and kind of one task entry; `run_after` is left empty.
pub fn declare_task<S: SpecSource>(entry: S) -> DeclaredTask {
    let name = entry.field_text("name");
    let (task_ref, kind) = match entry.field("taskRef") {
        Some(task_ref) => {
            let kind = task_ref
                .field_text("kind")
                .map(|kind| TaskKind::from_ref_kind(&kind))
                .unwrap_or(TaskKind::Task);
            (task_ref.field_text("name"), kind)
        }
        None if entry.field("taskSpec").is_some() => (None, TaskKind::Task),
        None => (None, TaskKind::Unknown),
    };

    DeclaredTask {
        id: name.clone(),
        name,
        task_ref,
        kind,
        run_after: Vec::new(),
        position: entry.offset(),
        is_final: false,
    }
}

/// Condition and when nodes guarding one task. Each inherits the owner's
/// base set.
fn guard_tasks<S: SpecSource>(entry: S, owner: Option<&str>, base: &[String]) -> Vec<DeclaredTask> {
    let mut guards = Vec::new();

    for condition in entry.field_items("conditions") {
        let condition_ref = condition.field_text("conditionRef");
        let mut run_after = condition_producers(condition);
        for id in base {
            push_unique(&mut run_after, id.clone());
        }
        guards.push(DeclaredTask {
            id: condition_ref.clone(),
            name: condition_ref,
            task_ref: None,
            kind: TaskKind::Condition,
            run_after,
            position: condition.offset(),
            is_final: false,
        });
    }

    for when in entry.field_items("when") {
        let input = when.field_text("input");
        let input_text = input.as_deref().unwrap_or_default();
        let mut run_after = referenced_tasks(input_text);
        for id in base {
            push_unique(&mut run_after, id.clone());
        }
        guards.push(DeclaredTask {
            id: Some(format!("{}:{}", owner.unwrap_or_default(), input_text)),
            name: input,
            task_ref: None,
            kind: TaskKind::When,
            run_after,
            position: when.offset(),
            is_final: false,
        });
    }

    guards
}

/// Ids of the main list that no other main-list task runs after.
pub fn sink_set(tasks: &[DeclaredTask]) -> Vec<String> {
    let mut sinks = Vec::new();
    for (index, task) in tasks.iter().enumerate() {
        let Some(id) = &task.id else {
            continue;
        };
        let referenced = tasks
            .iter()
            .enumerate()
            .any(|(other, t)| other != index && t.run_after.contains(id));
        if !referenced {
            push_unique(&mut sinks, id.clone());
        }
    }
    sinks
}
