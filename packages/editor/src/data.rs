use crate::parenting::Parented;
use reshaper_syntax::{NodeKind, SyntaxKind, SyntaxNode, SyntaxTree};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Syntax a store entry was built from
#[derive(Debug, Clone)]
pub enum NodeSource {
    /// File root: the whole parsed tree
    File(Arc<SyntaxTree>),
    /// A visited node within the file
    Syntax(Arc<SyntaxNode>),
}

/// Record stored per tree node
///
/// `class_name` and `text` are editable overlays applied on top of the
/// original syntax when the tree is reconstructed.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub parent: Option<String>,
    pub order: Option<String>,
    pub source: NodeSource,
    pub class_name: Option<String>,
    pub text: Option<String>,
}

impl NodeData {
    pub fn file(tree: Arc<SyntaxTree>) -> Self {
        Self {
            parent: None,
            order: None,
            source: NodeSource::File(tree),
            class_name: None,
            text: None,
        }
    }

    pub fn syntax_node(node: Arc<SyntaxNode>) -> Self {
        Self {
            parent: None,
            order: None,
            source: NodeSource::Syntax(node),
            class_name: None,
            text: None,
        }
    }

    pub fn syntax(&self) -> Option<&Arc<SyntaxNode>> {
        match &self.source {
            NodeSource::Syntax(node) => Some(node),
            NodeSource::File(_) => None,
        }
    }

    /// Kind of the underlying syntax; `None` for file roots
    pub fn kind(&self) -> Option<SyntaxKind> {
        self.syntax().map(|node| node.kind())
    }

    pub fn is_file(&self) -> bool {
        matches!(self.source, NodeSource::File(_))
    }

    /// Whether children are spliced into code parts rather than listed as
    /// markup, which fixes them to their original place
    pub fn splices_children(&self) -> bool {
        self.is_file()
            || matches!(
                self.kind(),
                Some(SyntaxKind::Wrapper) | Some(SyntaxKind::Other)
            )
    }

    /// Copy of this record placed under `parent` at `order`
    pub fn with_position(&self, parent: &str, order: String) -> Self {
        Self {
            parent: Some(parent.to_string()),
            order: Some(order),
            ..self.clone()
        }
    }

    /// Short human-readable description used by outlines
    pub fn label(&self, id: &str) -> String {
        let Some(node) = self.syntax() else {
            return id.strip_prefix("file:").unwrap_or(id).to_string();
        };

        match &node.kind {
            NodeKind::Element(element) => {
                let mut label = element.name.clone();
                if let Some(class_name) = &self.class_name {
                    for class in class_name.split_whitespace() {
                        label.push('.');
                        label.push_str(class);
                    }
                }
                label
            }
            NodeKind::Fragment(_) => "<>".to_string(),
            NodeKind::Text(text) => {
                let value = self.text.as_deref().unwrap_or(&text.value);
                format!("{:?}", value.trim())
            }
            NodeKind::Wrapper(wrapper) if wrapper.spread => "{...}".to_string(),
            NodeKind::Wrapper(_) => "{}".to_string(),
            NodeKind::Other(_) => "statement".to_string(),
        }
    }
}

impl Parented for NodeData {
    fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    fn order_key(&self) -> Option<&str> {
        self.order.as_deref()
    }
}

/// Plain snapshot of a subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineNode {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// Labels only, indented two spaces per level
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(0, &mut out);
        out
    }

    fn render_into(&self, depth: usize, out: &mut String) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&self.label);
        out.push('\n');
        for child in &self.children {
            child.render_into(depth + 1, out);
        }
    }
}
