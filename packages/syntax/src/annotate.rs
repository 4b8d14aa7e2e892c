//! Preview tagging
//!
//! Rewrites a tree so every element carries `attribute="{path}:{index}"`,
//! numbering elements in document order. The rendered preview reports these
//! tags back, which lets the editor map a rendered element to its node.

use crate::ast::*;
use std::sync::Arc;

/// Attribute the preview reads element locations from
pub const DEFAULT_TAG_ATTRIBUTE: &str = "data-reshaper-loc";

/// Build the preview tag for the element numbered `index` in `path`
pub fn format_tag(path: &str, index: usize) -> String {
    format!("{}:{}", path, index)
}

/// Split a preview tag into path and index. Paths may contain `:`.
pub fn parse_tag(tag: &str) -> Option<(&str, usize)> {
    let (path, index) = tag.rsplit_once(':')?;
    Some((path, index.parse().ok()?))
}

/// Tag every element of `tree`. Elements that already carry `attribute`
/// keep their value but still consume an index.
pub fn annotate(tree: &SyntaxTree, path: &str, attribute: &str) -> SyntaxTree {
    let mut annotator = Annotator {
        path,
        attribute,
        count: 0,
    };
    SyntaxTree {
        body: annotator.parts(&tree.body),
    }
}

struct Annotator<'a> {
    path: &'a str,
    attribute: &'a str,
    count: usize,
}

impl Annotator<'_> {
    fn parts(&mut self, parts: &[Part]) -> Vec<Part> {
        parts
            .iter()
            .map(|part| match part {
                Part::Code(code) => Part::Code(code.clone()),
                Part::Node(node) => Part::Node(self.node(node)),
            })
            .collect()
    }

    fn children(&mut self, children: &[Arc<SyntaxNode>]) -> Vec<Arc<SyntaxNode>> {
        children.iter().map(|child| self.node(child)).collect()
    }

    fn node(&mut self, node: &Arc<SyntaxNode>) -> Arc<SyntaxNode> {
        let kind = match &node.kind {
            NodeKind::Element(element) => {
                let index = self.count;
                self.count += 1;

                let mut element = element.clone();
                if element.attribute(self.attribute).is_none() {
                    element.set_string_attribute(self.attribute, &format_tag(self.path, index));
                }
                element.attributes = element
                    .attributes
                    .iter()
                    .map(|attr| self.attribute_value(attr))
                    .collect();
                element.children = self.children(&element.children);
                NodeKind::Element(element)
            }
            NodeKind::Fragment(fragment) => NodeKind::Fragment(Fragment {
                children: self.children(&fragment.children),
            }),
            NodeKind::Wrapper(wrapper) => NodeKind::Wrapper(Wrapper {
                spread: wrapper.spread,
                expression: self.parts(&wrapper.expression),
            }),
            NodeKind::Other(other) => NodeKind::Other(Other {
                parts: self.parts(&other.parts),
            }),
            NodeKind::Text(_) => return node.clone(),
        };
        Arc::new(SyntaxNode::new(node.loc, kind))
    }

    fn attribute_value(&mut self, attr: &Attribute) -> Attribute {
        match attr {
            Attribute::Named {
                name,
                value: Some(AttrValue::Expression(parts)),
            } => Attribute::Named {
                name: name.clone(),
                value: Some(AttrValue::Expression(self.parts(parts))),
            },
            Attribute::Spread { expression } => Attribute::Spread {
                expression: self.parts(expression),
            },
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, print};

    #[test]
    fn test_annotate_numbers_in_document_order() {
        let tree = parse("x = <div icon={<i />}><p>hi</p></div>;").unwrap();
        let tagged = annotate(&tree, "src/App.tsx", DEFAULT_TAG_ATTRIBUTE);
        assert_eq!(
            print(&tagged),
            "x = <div icon={<i data-reshaper-loc=\"src/App.tsx:1\" />} data-reshaper-loc=\"src/App.tsx:0\"><p data-reshaper-loc=\"src/App.tsx:2\">hi</p></div>;"
        );
    }

    #[test]
    fn test_existing_tags_are_kept() {
        let tree = parse("x = <div data-reshaper-loc=\"keep\"><b /></div>;").unwrap();
        let tagged = annotate(&tree, "a", DEFAULT_TAG_ATTRIBUTE);
        assert_eq!(
            print(&tagged),
            "x = <div data-reshaper-loc=\"keep\"><b data-reshaper-loc=\"a:1\" /></div>;"
        );
    }

    #[test]
    fn test_parse_tag_splits_on_last_colon() {
        assert_eq!(parse_tag("C:/src/App.tsx:12"), Some(("C:/src/App.tsx", 12)));
        assert_eq!(parse_tag("nocolon"), None);
        assert_eq!(parse_tag("a:b"), None);
    }
}
