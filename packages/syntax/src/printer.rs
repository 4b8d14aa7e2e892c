use crate::ast::*;

/// Print a syntax tree back to source text
///
/// Code and expression containers are reproduced verbatim. Text is too,
/// except that `{`, `}` and `<` are written as `{"{"}` so edited text cannot
/// open markup or code. Tags are printed canonically: one space before each
/// attribute and ` />` for empty self-closing elements. Printing a parsed
/// tree is idempotent.
pub fn print(tree: &SyntaxTree) -> String {
    let mut printer = Printer::default();
    printer.write_parts(&tree.body);
    printer.output
}

/// Print a single node
pub fn print_node(node: &SyntaxNode) -> String {
    let mut printer = Printer::default();
    printer.write_node(node);
    printer.output
}

#[derive(Default)]
struct Printer {
    output: String,
}

impl Printer {
    fn write_parts(&mut self, parts: &[Part]) {
        for part in parts {
            match part {
                Part::Code(code) => self.output.push_str(code),
                Part::Node(node) => self.write_node(node),
            }
        }
    }

    fn write_node(&mut self, node: &SyntaxNode) {
        match &node.kind {
            NodeKind::Element(element) => self.write_element(element),
            NodeKind::Fragment(fragment) => {
                self.output.push_str("<>");
                for child in &fragment.children {
                    self.write_node(child);
                }
                self.output.push_str("</>");
            }
            NodeKind::Text(text) => self.write_text(&text.value),
            NodeKind::Wrapper(wrapper) => {
                self.output.push('{');
                if wrapper.spread {
                    self.output.push_str("...");
                }
                self.write_parts(&wrapper.expression);
                self.output.push('}');
            }
            NodeKind::Other(other) => self.write_parts(&other.parts),
        }
    }

    fn write_text(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '{' | '}' | '<' => {
                    self.output.push_str("{\"");
                    self.output.push(c);
                    self.output.push_str("\"}");
                }
                _ => self.output.push(c),
            }
        }
    }

    fn write_element(&mut self, element: &Element) {
        self.output.push('<');
        self.output.push_str(&element.name);

        for attr in &element.attributes {
            self.output.push(' ');
            self.write_attribute(attr);
        }

        // An element that gained children is no longer self-closing
        if element.self_closing && element.children.is_empty() {
            self.output.push_str(" />");
            return;
        }

        self.output.push('>');
        for child in &element.children {
            self.write_node(child);
        }
        self.output.push_str("</");
        self.output.push_str(&element.name);
        self.output.push('>');
    }

    fn write_attribute(&mut self, attr: &Attribute) {
        match attr {
            Attribute::Named { name, value } => {
                self.output.push_str(name);
                match value {
                    Some(AttrValue::String { value, quote }) => {
                        let quote = quote.as_char();
                        self.output.push('=');
                        self.output.push(quote);
                        self.output.push_str(value);
                        self.output.push(quote);
                    }
                    Some(AttrValue::Expression(parts)) => {
                        self.output.push_str("={");
                        self.write_parts(parts);
                        self.output.push('}');
                    }
                    None => {}
                }
            }
            Attribute::Spread { expression } => {
                self.output.push_str("{...");
                self.write_parts(expression);
                self.output.push('}');
            }
        }
    }
}
