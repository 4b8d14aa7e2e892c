//! Projection of a syntax tree onto store entries
//!
//! Visited nodes are elements, fragments, and the text and expression
//! containers sitting directly inside them. Each visited node's parent is the
//! nearest visited ancestor; top-level statements become entries under the
//! file root only when they contain something visited. Elements are numbered
//! in document order for the preview, including elements inside attribute
//! values, which are numbered but not visited.

use crate::data::NodeData;
use crate::file::IdGenerator;
use reshaper_syntax::{AttrValue, Attribute, NodeKind, Part, SyntaxNode, SyntaxTree};
use std::sync::Arc;

/// A node to write, in document order
#[derive(Debug)]
pub(crate) struct BuiltEntry {
    pub id: String,
    pub parent: String,
    pub data: NodeData,
}

#[derive(Debug, Default)]
pub(crate) struct BuildOutput {
    pub entries: Vec<BuiltEntry>,
    /// Correlation index → id for visited elements
    pub correlation: Vec<(usize, String)>,
}

pub(crate) struct TreeBuilder<'a> {
    ids: IdGenerator,
    class_attribute: &'a str,
    element_count: usize,
    output: BuildOutput,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(ids: IdGenerator, class_attribute: &'a str) -> Self {
        Self {
            ids,
            class_attribute,
            element_count: 0,
            output: BuildOutput::default(),
        }
    }

    pub fn build(mut self, tree: &SyntaxTree, root_id: &str) -> BuildOutput {
        for part in &tree.body {
            if let Part::Node(statement) = part {
                self.statement(statement, root_id);
            }
        }
        self.output
    }

    fn statement(&mut self, statement: &Arc<SyntaxNode>, root_id: &str) {
        let NodeKind::Other(other) = &statement.kind else {
            self.visit(statement, root_id, false);
            return;
        };

        let mark = self.output.entries.len();
        let id = self.push(root_id, NodeData::syntax_node(statement.clone()));
        self.parts(&other.parts, &id);

        // Pure code without markup stays out of the tree
        if self.output.entries.len() == mark + 1 {
            self.output.entries.pop();
        }
    }

    fn parts(&mut self, parts: &[Part], parent: &str) {
        for part in parts {
            if let Part::Node(node) = part {
                self.visit(node, parent, false);
            }
        }
    }

    fn visit(&mut self, node: &Arc<SyntaxNode>, parent: &str, in_markup: bool) {
        match &node.kind {
            NodeKind::Element(element) => {
                let index = self.element_count;
                self.element_count += 1;

                let mut data = NodeData::syntax_node(node.clone());
                data.class_name = element
                    .string_attribute(self.class_attribute)
                    .map(str::to_string);
                let id = self.push(parent, data);
                self.output.correlation.push((index, id.clone()));

                for attr in &element.attributes {
                    self.count_attribute(attr);
                }
                for child in &element.children {
                    self.visit(child, &id, true);
                }
            }
            NodeKind::Fragment(fragment) => {
                let id = self.push(parent, NodeData::syntax_node(node.clone()));
                for child in &fragment.children {
                    self.visit(child, &id, true);
                }
            }
            NodeKind::Text(text) if in_markup => {
                let mut data = NodeData::syntax_node(node.clone());
                data.text = Some(text.value.clone());
                self.push(parent, data);
            }
            NodeKind::Wrapper(wrapper) if in_markup => {
                let id = self.push(parent, NodeData::syntax_node(node.clone()));
                self.parts(&wrapper.expression, &id);
            }
            NodeKind::Wrapper(wrapper) => self.parts(&wrapper.expression, parent),
            NodeKind::Other(other) => self.parts(&other.parts, parent),
            NodeKind::Text(_) => {}
        }
    }

    fn push(&mut self, parent: &str, data: NodeData) -> String {
        let id = self.ids.new_id();
        self.output.entries.push(BuiltEntry {
            id: id.clone(),
            parent: parent.to_string(),
            data,
        });
        id
    }

    fn count_attribute(&mut self, attr: &Attribute) {
        match attr {
            Attribute::Named {
                value: Some(AttrValue::Expression(parts)),
                ..
            }
            | Attribute::Spread { expression: parts } => self.count_parts(parts),
            _ => {}
        }
    }

    fn count_parts(&mut self, parts: &[Part]) {
        for part in parts {
            if let Part::Node(node) = part {
                self.count(node);
            }
        }
    }

    fn count(&mut self, node: &SyntaxNode) {
        match &node.kind {
            NodeKind::Element(element) => {
                self.element_count += 1;
                for attr in &element.attributes {
                    self.count_attribute(attr);
                }
                for child in &element.children {
                    self.count(child);
                }
            }
            NodeKind::Fragment(fragment) => {
                for child in &fragment.children {
                    self.count(child);
                }
            }
            NodeKind::Wrapper(wrapper) => self.count_parts(&wrapper.expression),
            NodeKind::Other(other) => self.count_parts(&other.parts),
            NodeKind::Text(_) => {}
        }
    }
}
