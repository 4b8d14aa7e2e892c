use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A point in the source text
///
/// `line` is 1-based, `column` is the 0-based character offset within the line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

/// Source range of a syntax node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

/// Root of a parsed source file
///
/// The body interleaves raw code (whitespace, comments) with top-level
/// statements, which are always `Other` nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyntaxTree {
    pub body: Vec<Part>,
}

impl SyntaxTree {
    /// Top-level statements in source order
    pub fn statements(&self) -> impl Iterator<Item = &Arc<SyntaxNode>> {
        self.body.iter().filter_map(Part::as_node)
    }
}

/// A slice of code: either verbatim source text or an embedded syntax node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Part {
    Code(String),
    Node(Arc<SyntaxNode>),
}

impl Part {
    pub fn as_node(&self) -> Option<&Arc<SyntaxNode>> {
        match self {
            Part::Node(node) => Some(node),
            Part::Code(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub loc: Location,
    pub kind: NodeKind,
}

/// Closed set of node kinds the editor distinguishes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    /// Markup element (`<div>…</div>`, `<img />`)
    Element(Element),
    /// Markup fragment (`<>…</>`)
    Fragment(Fragment),
    /// Literal text between tags
    Text(Text),
    /// Expression container or spread child directly inside markup
    Wrapper(Wrapper),
    /// Anything else, e.g. a top-level statement
    Other(Other),
}

/// Discriminant of [`NodeKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyntaxKind {
    Element,
    Fragment,
    Text,
    Wrapper,
    Other,
}

impl NodeKind {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeKind::Element(_) => SyntaxKind::Element,
            NodeKind::Fragment(_) => SyntaxKind::Fragment,
            NodeKind::Text(_) => SyntaxKind::Text,
            NodeKind::Wrapper(_) => SyntaxKind::Wrapper,
            NodeKind::Other(_) => SyntaxKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Arc<SyntaxNode>>,
    pub self_closing: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub children: Vec<Arc<SyntaxNode>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wrapper {
    pub spread: bool,
    pub expression: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Other {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Attribute {
    Named {
        name: String,
        value: Option<AttrValue>,
    },
    Spread {
        expression: Vec<Part>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    String { value: String, quote: Quote },
    Expression(Vec<Part>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quote {
    Double,
    Single,
}

impl Quote {
    pub fn as_char(self) -> char {
        match self {
            Quote::Double => '"',
            Quote::Single => '\'',
        }
    }
}

impl SyntaxNode {
    pub fn new(loc: Location, kind: NodeKind) -> Self {
        Self { loc, kind }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind.kind()
    }

    /// True when both nodes were produced from the same source range and kind.
    ///
    /// Reconstructed nodes keep the location of the node they were rebuilt from,
    /// so this is the identity used to splice edits back into a tree.
    pub fn same_source(&self, other: &SyntaxNode) -> bool {
        self.loc == other.loc && self.kind() == other.kind()
    }

    /// Markup children (empty for non-structural nodes)
    pub fn children(&self) -> &[Arc<SyntaxNode>] {
        match &self.kind {
            NodeKind::Element(element) => &element.children,
            NodeKind::Fragment(fragment) => &fragment.children,
            _ => &[],
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self.kind, NodeKind::Element(_) | NodeKind::Fragment(_))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name() == Some(name))
    }

    /// Value of a string-literal attribute; `None` for expressions or absent attributes
    pub fn string_attribute(&self, name: &str) -> Option<&str> {
        match self.attribute(name)? {
            Attribute::Named {
                value: Some(AttrValue::String { value, .. }),
                ..
            } => Some(value),
            _ => None,
        }
    }

    /// Replace the value of `name` with a string literal, appending the attribute if absent
    ///
    /// A value containing both quote characters cannot be written as a
    /// markup string and becomes a `{"..."}` expression instead.
    pub fn set_string_attribute(&mut self, name: &str, value: &str) {
        let new_value = Some(match (value.contains('"'), value.contains('\'')) {
            (true, true) => AttrValue::Expression(vec![Part::Code(string_literal(value))]),
            (true, false) => AttrValue::String {
                value: value.to_string(),
                quote: Quote::Single,
            },
            _ => AttrValue::String {
                value: value.to_string(),
                quote: Quote::Double,
            },
        });

        for attr in &mut self.attributes {
            if let Attribute::Named { name: existing, value } = attr {
                if existing == name {
                    *value = new_value;
                    return;
                }
            }
        }

        self.attributes.push(Attribute::Named {
            name: name.to_string(),
            value: new_value,
        });
    }
}

impl Attribute {
    pub fn name(&self) -> Option<&str> {
        match self {
            Attribute::Named { name, .. } => Some(name),
            Attribute::Spread { .. } => None,
        }
    }
}

/// Double-quoted script string literal for `value`
fn string_literal(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('"');
    for c in value.chars() {
        match c {
            '"' => literal.push_str("\\\""),
            '\\' => literal.push_str("\\\\"),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            _ => literal.push(c),
        }
    }
    literal.push('"');
    literal
}
