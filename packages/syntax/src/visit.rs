use crate::ast::*;

/// Visitor pattern for traversing syntax trees immutably
///
/// Default implementations walk the whole tree in document order: an element,
/// then the code in its attribute values, then its children. Override
/// specific visit_* methods to act on nodes, calling the matching `walk_*`
/// function to keep descending. Borrows carry the tree's lifetime, so a
/// visitor may keep references to the nodes it sees.
pub trait Visitor<'a>: Sized {
    fn visit_tree(&mut self, tree: &'a SyntaxTree) {
        walk_tree(self, tree);
    }

    fn visit_node(&mut self, node: &'a SyntaxNode) {
        walk_node(self, node);
    }

    fn visit_part(&mut self, part: &'a Part) {
        walk_part(self, part);
    }
}

pub fn walk_tree<'a, V: Visitor<'a>>(visitor: &mut V, tree: &'a SyntaxTree) {
    for part in &tree.body {
        visitor.visit_part(part);
    }
}

pub fn walk_part<'a, V: Visitor<'a>>(visitor: &mut V, part: &'a Part) {
    if let Part::Node(node) = part {
        visitor.visit_node(node);
    }
}

pub fn walk_node<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a SyntaxNode) {
    match &node.kind {
        NodeKind::Element(element) => {
            for attr in &element.attributes {
                walk_attribute(visitor, attr);
            }
            for child in &element.children {
                visitor.visit_node(child);
            }
        }
        NodeKind::Fragment(fragment) => {
            for child in &fragment.children {
                visitor.visit_node(child);
            }
        }
        NodeKind::Wrapper(wrapper) => {
            for part in &wrapper.expression {
                visitor.visit_part(part);
            }
        }
        NodeKind::Other(other) => {
            for part in &other.parts {
                visitor.visit_part(part);
            }
        }
        NodeKind::Text(_) => {}
    }
}

pub fn walk_attribute<'a, V: Visitor<'a>>(visitor: &mut V, attr: &'a Attribute) {
    let parts = match attr {
        Attribute::Named {
            value: Some(AttrValue::Expression(parts)),
            ..
        } => parts,
        Attribute::Spread { expression } => expression,
        _ => return,
    };
    for part in parts {
        visitor.visit_part(part);
    }
}

/// Collects elements in document order
#[derive(Default)]
pub struct ElementCollector<'a> {
    pub elements: Vec<&'a SyntaxNode>,
}

impl<'a> ElementCollector<'a> {
    pub fn collect(tree: &'a SyntaxTree) -> Vec<&'a SyntaxNode> {
        let mut collector = Self::default();
        collector.visit_tree(tree);
        collector.elements
    }
}

impl<'a> Visitor<'a> for ElementCollector<'a> {
    fn visit_node(&mut self, node: &'a SyntaxNode) {
        if node.kind() == SyntaxKind::Element {
            self.elements.push(node);
        }
        walk_node(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    struct TextCounter {
        count: usize,
    }

    impl<'a> Visitor<'a> for TextCounter {
        fn visit_node(&mut self, node: &'a SyntaxNode) {
            if node.kind() == SyntaxKind::Text {
                self.count += 1;
            }
            walk_node(self, node);
        }
    }

    #[test]
    fn test_visitor_reaches_nested_markup() {
        let tree = parse("x = <div>a{list.map(i => <b>{i}c</b>)}</div>;").unwrap();
        let mut counter = TextCounter { count: 0 };
        counter.visit_tree(&tree);
        assert_eq!(counter.count, 2);
    }

    #[test]
    fn test_elements_in_document_order() {
        let tree =
            parse("x = <div icon={<svg />}><p /></div>;\ny = <span />;").unwrap();
        let names: Vec<_> = ElementCollector::collect(&tree)
            .into_iter()
            .filter_map(|node| node.as_element().map(|e| e.name.as_str()))
            .collect();
        assert_eq!(names, vec!["div", "svg", "p", "span"]);
    }
}
