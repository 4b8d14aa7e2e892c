//! Rebuilding a syntax tree from the current store state
//!
//! Pure function of the store: elements keep their original head with the
//! class overlay applied and take their children from the store in current
//! order; text takes its overlay; code-bearing nodes (statements, expression
//! containers) keep their original parts and splice in the reconstruction of
//! each embedded node that is still one of their store children.

use crate::data::NodeData;
use crate::parenting::Parenting;
use crate::store::Store;
use reshaper_syntax::{Fragment, NodeKind, Other, Part, SyntaxNode, SyntaxTree, Text, Wrapper};
use std::rc::Rc;
use std::sync::Arc;

pub(crate) struct Reconstructor<'a> {
    pub store: &'a Store<NodeData>,
    pub parenting: &'a Parenting<NodeData>,
    pub class_attribute: &'a str,
}

impl Reconstructor<'_> {
    pub fn tree(&self, root_id: &str, original: &SyntaxTree) -> SyntaxTree {
        let children = self.children(root_id);
        SyntaxTree {
            body: self.splice(&original.body, &children),
        }
    }

    pub fn node(&self, id: &str) -> Option<Arc<SyntaxNode>> {
        let data = self.store.get(id)?;
        let syntax = data.syntax()?;
        let children = self.children(id);

        let kind = match &syntax.kind {
            NodeKind::Element(element) => {
                let mut element = element.clone();
                if let Some(class_name) = &data.class_name {
                    if element.string_attribute(self.class_attribute) != Some(class_name.as_str()) {
                        element.set_string_attribute(self.class_attribute, class_name);
                    }
                }
                element.children = self.markup_children(&children);
                NodeKind::Element(element)
            }
            NodeKind::Fragment(_) => NodeKind::Fragment(Fragment {
                children: self.markup_children(&children),
            }),
            NodeKind::Text(text) => NodeKind::Text(Text {
                value: data.text.clone().unwrap_or_else(|| text.value.clone()),
            }),
            NodeKind::Wrapper(wrapper) => NodeKind::Wrapper(Wrapper {
                spread: wrapper.spread,
                expression: self.splice(&wrapper.expression, &children),
            }),
            NodeKind::Other(other) => NodeKind::Other(Other {
                parts: self.splice(&other.parts, &children),
            }),
        };

        Some(Arc::new(SyntaxNode::new(syntax.loc, kind)))
    }

    fn children(&self, id: &str) -> Vec<(String, Rc<NodeData>)> {
        self.parenting
            .get_children(id)
            .items
            .iter()
            .filter_map(|child| Some((child.clone(), self.store.get(child)?)))
            .collect()
    }

    fn markup_children(&self, children: &[(String, Rc<NodeData>)]) -> Vec<Arc<SyntaxNode>> {
        children.iter().filter_map(|(id, _)| self.node(id)).collect()
    }

    fn splice(&self, parts: &[Part], children: &[(String, Rc<NodeData>)]) -> Vec<Part> {
        parts
            .iter()
            .map(|part| {
                let Part::Node(original) = part else {
                    return part.clone();
                };
                children
                    .iter()
                    .find(|(_, data)| {
                        data.syntax()
                            .map_or(false, |syntax| syntax.same_source(original))
                    })
                    .and_then(|(id, _)| self.node(id))
                    .map(Part::Node)
                    .unwrap_or_else(|| part.clone())
            })
            .collect()
    }
}
