//! Navigation over the element tree: go-to-definition targets, enclosing
//! task lookup and the `taskRef` range used by the "inline task spec" action.

use serde::Serialize;

use super::types::{ElementId, ElementType, Slot, TaskRefKind};
use super::TknDocument;

/// Cluster-side resource kinds a reference can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClusterResource {
    Task,
    ClusterTask,
    Condition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "target", rename_all = "camelCase")]
pub enum Definition {
    /// A range in the same document.
    Local { start: usize, end: usize },
    /// A resource that lives in the cluster, resolved by the host.
    Cluster { kind: ClusterResource, name: String },
}

impl TknDocument {
    /// Where the reference under `id` points to, if it is a reference at all.
    pub fn definition(&self, id: ElementId) -> Option<Definition> {
        if self.ty(id) != ElementType::Value {
            return None;
        }
        let parent = self.parent(id)?;
        let value = self.text(id)?;

        match (self.ty(parent), self.slot_of(id)?) {
            (ElementType::PipelineTaskRunAfter | ElementType::PipelineTaskInputResourceFrom, _) => {
                let task = self.find_task_by_name(value)?;
                self.local(self.field(task, "name")?)
            }
            (
                ElementType::PipelineTaskInputResource | ElementType::PipelineTaskOutputsResource,
                Slot::Field("resource"),
            ) => {
                let resource = self.find_resource_declaration(value)?;
                self.local(self.field(resource, "name")?)
            }
            (ElementType::PipelineTaskRef, Slot::Field("name")) => {
                let kind = match self.task_ref_kind(parent) {
                    TaskRefKind::ClusterTask => ClusterResource::ClusterTask,
                    TaskRefKind::Task | TaskRefKind::Other(_) => ClusterResource::Task,
                };
                Some(Definition::Cluster {
                    kind,
                    name: value.to_string(),
                })
            }
            (ElementType::PipelineTaskCondition, Slot::Field("conditionRef")) => Some(Definition::Cluster {
                kind: ClusterResource::Condition,
                name: value.to_string(),
            }),
            _ => None,
        }
    }

    fn local(&self, id: ElementId) -> Option<Definition> {
        let element = self.element(id);
        Some(Definition::Local {
            start: element.start,
            end: element.end,
        })
    }

    /// Pipeline task (main list or `finally`) with the given name.
    pub fn find_task_by_name(&self, name: &str) -> Option<ElementId> {
        self.elements()
            .filter(|(_, element)| element.ty == ElementType::PipelineTask)
            .map(|(id, _)| id)
            .find(|&id| self.field_text(id, "name") == Some(name))
    }

    /// Resource declared in `spec.resources` with the given name.
    pub fn find_resource_declaration(&self, name: &str) -> Option<ElementId> {
        self.elements()
            .filter(|(_, element)| element.ty == ElementType::PipelineResource)
            .map(|(id, _)| id)
            .find(|&id| self.field_text(id, "name") == Some(name))
    }

    pub fn enclosing_task(&self, id: ElementId) -> Option<ElementId> {
        self.ancestors(id)
            .find(|&ancestor| self.ty(ancestor) == ElementType::PipelineTask)
    }

    /// Range from the `taskRef:` key to the end of its value.
    pub fn task_ref_range(&self, task: ElementId) -> Option<(usize, usize)> {
        let task_ref = self.element(self.field(task, "taskRef")?);
        Some((task_ref.key_start.unwrap_or(task_ref.start), task_ref.end))
    }

    /// Name of the task under `pos`, or the condition ref when `pos` is
    /// inside one of the task's conditions.
    pub fn task_name_at(&self, pos: usize) -> Option<String> {
        let found = self.find_element(pos)?;
        self.ancestors(found).find_map(|id| match self.ty(id) {
            ElementType::PipelineTaskCondition => self.field_text(id, "conditionRef").map(str::to_string),
            ElementType::PipelineTask => self.field_text(id, "name").map(str::to_string),
            _ => None,
        })
    }
}
