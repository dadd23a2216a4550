//! Eager construction of the element arena from a parse tree.
//!
//! Every container type has a fixed field table; each field names the mapping
//! key it reads and the shape of the element built from the value under it.

use super::types::{Element, ElementId, ElementType, ElementValue, Slot, TaskRefKind};
use crate::parse::{NodeId, NodeKind, ParseTree};

#[derive(Debug, Clone, Copy)]
enum Shape {
    Text,
    Flag,
    Number,
    RefKind,
    Map(ElementType),
    List(ElementType, Item),
    /// A string, or a sequence of strings.
    TextOrList,
}

#[derive(Debug, Clone, Copy)]
enum Item {
    Text,
    Map(ElementType),
}

fn fields(ty: ElementType) -> &'static [(&'static str, Shape)] {
    use ElementType as T;
    use Shape::*;

    match ty {
        T::Pipeline => &[
            ("kind", Text),
            ("apiVersion", Text),
            ("metadata", Map(T::Metadata)),
            ("spec", Map(T::PipelineSpec)),
        ],
        T::PipelineRun => &[
            ("kind", Text),
            ("apiVersion", Text),
            ("metadata", Map(T::Metadata)),
            ("spec", Map(T::PipelineRunSpec)),
        ],
        T::PipelineRunSpec => &[
            ("pipelineRef", Map(T::PipelineRef)),
            ("pipelineSpec", Map(T::PipelineSpec)),
            ("params", List(T::Params, Item::Map(T::Param))),
            ("serviceAccountName", Text),
            ("timeout", Text),
        ],
        T::PipelineRef | T::Metadata => &[("name", Text)],
        T::PipelineSpec => &[
            ("tasks", List(T::PipelineTasks, Item::Map(T::PipelineTask))),
            ("finally", List(T::PipelineFinally, Item::Map(T::PipelineTask))),
            ("description", Text),
            ("resources", List(T::PipelineResources, Item::Map(T::PipelineResource))),
            ("params", List(T::ParamSpecs, Item::Map(T::ParamSpec))),
            ("workspaces", List(T::PipelineWorkspaces, Item::Map(T::PipelineWorkspace))),
        ],
        T::PipelineResource => &[("name", Text), ("type", Text), ("optional", Flag)],
        T::PipelineTask => &[
            ("name", Text),
            ("taskRef", Map(T::PipelineTaskRef)),
            ("taskSpec", Map(T::EmbeddedTask)),
            ("conditions", List(T::PipelineTaskConditions, Item::Map(T::PipelineTaskCondition))),
            ("when", List(T::PipelineTaskWhens, Item::Map(T::PipelineTaskWhen))),
            ("retries", Number),
            ("runAfter", List(T::PipelineTaskRunAfter, Item::Text)),
            ("resources", Map(T::PipelineTaskResources)),
            ("params", List(T::PipelineTaskParams, Item::Map(T::Param))),
            ("workspaces", List(T::PipelineTaskWorkspaces, Item::Map(T::PipelineTaskWorkspace))),
            ("timeout", Text),
        ],
        T::PipelineTaskRef => &[("name", Text), ("kind", RefKind)],
        T::PipelineTaskCondition => &[
            ("conditionRef", Text),
            ("params", List(T::Params, Item::Map(T::Param))),
            (
                "resources",
                List(T::PipelineTaskInputResources, Item::Map(T::PipelineTaskInputResource)),
            ),
        ],
        T::PipelineTaskInputResource => &[
            ("name", Text),
            ("resource", Text),
            ("from", List(T::PipelineTaskInputResourceFrom, Item::Text)),
        ],
        T::PipelineTaskResources => &[
            (
                "inputs",
                List(T::PipelineTaskInputResources, Item::Map(T::PipelineTaskInputResource)),
            ),
            (
                "outputs",
                List(T::PipelineTaskOutputsResources, Item::Map(T::PipelineTaskOutputsResource)),
            ),
        ],
        T::PipelineTaskOutputsResource => &[("name", Text), ("resource", Text)],
        T::Param => &[("name", Text), ("value", TextOrList)],
        T::ParamSpec => &[
            ("name", Text),
            ("type", Text),
            ("description", Text),
            ("default", TextOrList),
        ],
        T::PipelineWorkspace => &[("name", Text), ("description", Text)],
        T::PipelineTaskWorkspace => &[("name", Text), ("workspace", Text)],
        T::PipelineTaskWhen => &[
            ("input", Text),
            ("operator", Text),
            ("values", List(T::PipelineTaskWhenValues, Item::Text)),
        ],
        T::EmbeddedTask => &[
            ("description", Text),
            ("params", List(T::ParamSpecs, Item::Map(T::ParamSpec))),
            ("results", List(T::TaskResults, Item::Map(T::TaskResult))),
        ],
        T::TaskResult => &[("name", Text), ("description", Text)],
        // Sequences are filled item by item; the document element is wired by hand.
        T::Document
        | T::Value
        | T::Params
        | T::PipelineResources
        | T::PipelineTasks
        | T::PipelineFinally
        | T::ParamSpecs
        | T::StringArray
        | T::PipelineWorkspaces
        | T::PipelineTaskConditions
        | T::PipelineTaskInputResources
        | T::PipelineTaskInputResourceFrom
        | T::PipelineTaskRunAfter
        | T::PipelineTaskOutputsResources
        | T::PipelineTaskParams
        | T::PipelineTaskWorkspaces
        | T::PipelineTaskWhens
        | T::PipelineTaskWhenValues
        | T::TaskResults => &[],
    }
}

pub(super) struct Builder<'t> {
    tree: &'t ParseTree,
    elements: Vec<Element>,
}

impl<'t> Builder<'t> {
    pub fn new(tree: &'t ParseTree) -> Self {
        Self {
            tree,
            elements: Vec::new(),
        }
    }

    pub fn finish(self) -> Vec<Element> {
        self.elements
    }

    /// Synthetic root spanning the whole YAML document.
    pub fn document(&mut self, start: usize, end: usize) -> ElementId {
        self.push(Element {
            ty: ElementType::Document,
            start,
            end,
            parent: None,
            node: None,
            key_start: None,
            slots: Vec::new(),
            value: None,
        })
    }

    pub fn attach(&mut self, parent: ElementId, slot: Slot, child: Option<ElementId>) {
        if let Some(child) = child {
            self.elements[child.index()].parent = Some(parent);
        }
        self.elements[parent.index()].slots.push((slot, child));
    }

    /// Container element for a mapping node, with its field table filled in.
    pub fn mapping(&mut self, ty: ElementType, node: NodeId) -> ElementId {
        let tree = self.tree;
        let id = self.node_element(ty, node, None);
        for &(key, shape) in fields(ty) {
            let child = tree.find_value(node, key).map(|value| self.shape(shape, value));
            self.attach(id, Slot::Field(key), child);
        }
        id
    }

    fn shape(&mut self, shape: Shape, node: NodeId) -> ElementId {
        match shape {
            Shape::Text => self.text(node),
            Shape::Flag => {
                let value = self.raw(node) == "true";
                self.node_element(ElementType::Value, node, Some(ElementValue::Bool(value)))
            }
            Shape::Number => {
                let value = self.raw(node).trim().parse().ok().map(ElementValue::Int);
                self.node_element(ElementType::Value, node, value)
            }
            Shape::RefKind => {
                let kind = TaskRefKind::parse(self.decoded(node));
                self.node_element(ElementType::Value, node, Some(ElementValue::RefKind(kind)))
            }
            Shape::Map(ty) => self.mapping(ty, node),
            Shape::List(ty, item) => self.list(ty, item, node),
            Shape::TextOrList => match self.tree.kind(node) {
                NodeKind::Sequence => self.list(ElementType::StringArray, Item::Text, node),
                _ => self.text(node),
            },
        }
    }

    fn list(&mut self, ty: ElementType, item: Item, node: NodeId) -> ElementId {
        let tree = self.tree;
        let id = self.node_element(ty, node, None);
        for (index, &child) in tree.items(node).iter().enumerate() {
            let element = match item {
                Item::Text => self.text(child),
                Item::Map(ty) => self.mapping(ty, child),
            };
            self.attach(id, Slot::Item(index), Some(element));
        }
        id
    }

    fn text(&mut self, node: NodeId) -> ElementId {
        let value = ElementValue::Str(self.decoded(node).to_string());
        self.node_element(ElementType::Value, node, Some(value))
    }

    fn raw(&self, node: NodeId) -> &'t str {
        let tree = self.tree;
        &tree.node(node).raw
    }

    fn decoded(&self, node: NodeId) -> &'t str {
        crate::parse::unquote(self.raw(node))
    }

    fn node_element(&mut self, ty: ElementType, node: NodeId, value: Option<ElementValue>) -> ElementId {
        let parsed = self.tree.node(node);
        self.push(Element {
            ty,
            start: parsed.start,
            end: parsed.end,
            parent: None,
            node: Some(node),
            key_start: self.tree.key_start(node),
            slots: Vec::new(),
            value,
        })
    }

    fn push(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        self.elements.push(element);
        id
    }
}
