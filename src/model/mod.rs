//! Semantic element tree: a typed, position-addressable view of one Tekton
//! document.
//!
//! Elements live in an arena ([`TknDocument`]) built eagerly from the parse
//! tree. Each element carries its [`ElementType`], the range of its backing
//! parse node, a parent link and an ordered list of child slots, where a slot
//! may be empty when the YAML omits that field.

mod build;
pub mod navigate;
pub mod types;

pub use navigate::{ClusterResource, Definition};
pub use types::{Element, ElementId, ElementType, ElementValue, Slot, TaskRefKind};

use crate::error::Result;
use crate::parse::{LineTable, ParseTree, YamlDocument};
use crate::tekton::{TektonYamlType, tekton_type};
use build::Builder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TknDocument {
    yaml_type: TektonYamlType,
    elements: Vec<Element>,
    root: ElementId,
}

impl TknDocument {
    /// Build the element tree of a Pipeline or PipelineRun document.
    /// Other documents have no semantic tree.
    pub fn build(tree: &ParseTree, doc: &YamlDocument) -> Option<Self> {
        let yaml_type = tekton_type(tree, doc)?;
        let body_type = match yaml_type {
            TektonYamlType::Pipeline => ElementType::Pipeline,
            TektonYamlType::PipelineRun => ElementType::PipelineRun,
            _ => return None,
        };
        let root_map = doc.root_mapping(tree)?;

        let mut builder = Builder::new(tree);
        let root = builder.document(doc.start, doc.end);
        let body = builder.mapping(body_type, root_map);
        builder.attach(root, Slot::Field("body"), Some(body));

        Some(Self {
            yaml_type,
            elements: builder.finish(),
            root,
        })
    }

    pub fn yaml_type(&self) -> TektonYamlType {
        self.yaml_type
    }

    /// The document element.
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// The Pipeline or PipelineRun element under the document.
    pub fn body(&self) -> Option<ElementId> {
        self.element(self.root).field("body")
    }

    /// Ids are only handed out by this document.
    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.index()]
    }

    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(index, element)| (ElementId(index as u32), element))
    }

    pub fn ty(&self, id: ElementId) -> ElementType {
        self.element(id).ty
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.element(id).parent
    }

    /// `id` itself, then each ancestor up to the document element.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(Some(id), |&id| self.parent(id))
    }

    pub fn field(&self, id: ElementId, name: &str) -> Option<ElementId> {
        self.element(id).field(name)
    }

    /// Follow a chain of field names.
    pub fn path(&self, id: ElementId, fields: &[&str]) -> Option<ElementId> {
        fields
            .iter()
            .try_fold(id, |current, name| self.field(current, name))
    }

    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.element(id).text()
    }

    pub fn field_text(&self, id: ElementId, name: &str) -> Option<&str> {
        self.field(id, name).and_then(|child| self.text(child))
    }

    /// The slot `id` occupies in its parent.
    pub fn slot_of(&self, id: ElementId) -> Option<Slot> {
        let parent = self.parent(id)?;
        self.element(parent)
            .slots
            .iter()
            .find_map(|&(slot, child)| (child == Some(id)).then_some(slot))
    }

    /// Kind of a `taskRef` element; `Task` when the field is absent.
    pub fn task_ref_kind(&self, task_ref: ElementId) -> TaskRefKind {
        match self.field(task_ref, "kind").and_then(|kind| self.element(kind).value.as_ref()) {
            Some(ElementValue::RefKind(kind)) => kind.clone(),
            _ => TaskRefKind::Task,
        }
    }

    /// Most specific element whose range contains `pos`.
    ///
    /// Containers are returned when the position falls in text none of their
    /// children cover, such as whitespace or a key without a value yet.
    pub fn find_element(&self, pos: usize) -> Option<ElementId> {
        self.find_from(self.root, pos)
    }

    fn find_from(&self, id: ElementId, pos: usize) -> Option<ElementId> {
        let element = self.element(id);
        if !element.contains(pos) {
            return None;
        }
        if element.ty.is_leaf() {
            return Some(id);
        }

        for child in element.children() {
            let candidate = self.element(child);
            if !candidate.contains(pos) {
                continue;
            }
            if candidate.ty.is_leaf() {
                return Some(child);
            }
            return Some(self.find_from(child, pos).unwrap_or(child));
        }

        Some(id)
    }

    /// [`Self::find_element`] for a 0-based `(line, column)`.
    pub fn find_element_at(&self, lines: &LineTable, line: usize, column: usize) -> Result<Option<ElementId>> {
        let pos = lines.position_to_offset(line, column)?;
        Ok(self.find_element(pos))
    }
}
