use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{next_code_token, next_tag_token, CodeToken, TagToken};
use std::ops::Range;
use std::sync::Arc;

/// Identifiers after which a `<` opens markup rather than comparing
const MARKUP_KEYWORDS: &[&str] = &[
    "return", "yield", "default", "await", "case", "in", "of", "typeof", "void", "else", "do",
    "throw",
];

/// Parse a source file into a syntax tree
pub fn parse(source: &str) -> ParseResult<SyntaxTree> {
    let tree = Parser::new(source).parse_tree()?;
    tracing::debug!(bytes = source.len(), statements = tree.statements().count(), "parsed source");
    Ok(tree)
}

/// What terminates a run of code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeEnd {
    /// A top-level statement: `;` or a block-closing `}` at the end of a line
    Statement,
    /// The `}` closing an expression container or attribute expression
    Brace,
}

/// Recursive descent parser for script files with embedded markup
pub struct Parser<'src> {
    source: &'src str,
    lines: LineIndex,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
        }
    }

    pub fn parse_tree(&self) -> ParseResult<SyntaxTree> {
        let mut body = Vec::new();
        let mut pos = 0;

        while let Some((_, span)) = next_code_token(self.source, pos) {
            push_code(&mut body, self.slice(pos..span.start));
            let statement = self.parse_statement(span.start)?;
            pos = statement.loc.end.offset;
            body.push(Part::Node(Arc::new(statement)));
        }

        push_code(&mut body, self.slice(pos..self.source.len()));
        Ok(SyntaxTree { body })
    }

    fn parse_statement(&self, start: usize) -> ParseResult<SyntaxNode> {
        let (parts, end) = self.parse_code(start, CodeEnd::Statement)?;
        Ok(SyntaxNode::new(
            self.location(start, end),
            NodeKind::Other(Other { parts }),
        ))
    }

    /// Scan code from `start`, lifting embedded markup into nodes.
    ///
    /// Returns the parts and the end offset. For `CodeEnd::Brace` the end is
    /// the offset of the closing `}`, which is not consumed.
    fn parse_code(&self, start: usize, until: CodeEnd) -> ParseResult<(Vec<Part>, usize)> {
        let mut parts = Vec::new();
        let mut depth = 0usize;
        let mut code_start = start;
        let mut pos = start;
        let mut markup_allowed = true;

        loop {
            let Some((token, span)) = next_code_token(self.source, pos) else {
                if until == CodeEnd::Statement && depth == 0 {
                    push_code(&mut parts, self.slice(code_start..pos));
                    return Ok((parts, pos));
                }
                let expected = if until == CodeEnd::Brace && depth == 0 {
                    "}"
                } else {
                    "closing bracket"
                };
                return Err(ParseError::unexpected_eof(self.source.len(), expected));
            };

            match token {
                Some(CodeToken::Lt) if markup_allowed && self.starts_markup(span.end) => {
                    push_code(&mut parts, self.slice(code_start..span.start));
                    let node = self.parse_markup(span.start)?;
                    pos = node.loc.end.offset;
                    code_start = pos;
                    parts.push(Part::Node(Arc::new(node)));
                    markup_allowed = false;
                    continue;
                }
                Some(t) if t.opens() => depth += 1,
                Some(t) if t.closes() => {
                    if depth == 0 {
                        if until == CodeEnd::Brace && t == CodeToken::RBrace {
                            push_code(&mut parts, self.slice(code_start..span.start));
                            return Ok((parts, span.start));
                        }
                        return Err(ParseError::unexpected_token(
                            span.start,
                            "expression",
                            self.slice(span),
                        ));
                    }
                    depth -= 1;
                    if depth == 0
                        && until == CodeEnd::Statement
                        && t == CodeToken::RBrace
                        && self.ends_line(span.end)
                    {
                        push_code(&mut parts, self.slice(code_start..span.end));
                        return Ok((parts, span.end));
                    }
                }
                Some(CodeToken::Semi) if depth == 0 && until == CodeEnd::Statement => {
                    push_code(&mut parts, self.slice(code_start..span.end));
                    return Ok((parts, span.end));
                }
                _ => {}
            }

            markup_allowed = self.allows_markup(token, &span);
            pos = span.end;
        }
    }

    /// Parse an element or fragment starting at its `<`
    fn parse_markup(&self, start: usize) -> ParseResult<SyntaxNode> {
        let after_lt = start + 1;

        if self.rest(after_lt).starts_with('>') {
            let (children, end) = self.parse_children(after_lt + 1, None, start)?;
            return Ok(SyntaxNode::new(
                self.location(start, end),
                NodeKind::Fragment(Fragment { children }),
            ));
        }

        let (name, mut pos) = match next_tag_token(self.source, after_lt) {
            Some((Some(TagToken::Name), span)) => (self.slice(span.clone()).to_string(), span.end),
            Some((_, span)) => {
                return Err(ParseError::unexpected_token(
                    span.start,
                    "tag name",
                    self.slice(span),
                ))
            }
            None => return Err(ParseError::unexpected_eof(self.source.len(), "tag name")),
        };

        let mut attributes = Vec::new();

        loop {
            let Some((token, span)) = next_tag_token(self.source, pos) else {
                return Err(ParseError::unclosed_element(start, name));
            };

            match token {
                Some(TagToken::Name) => {
                    let attr_name = self.slice(span.clone()).to_string();
                    pos = span.end;
                    let value = match next_tag_token(self.source, pos) {
                        Some((Some(TagToken::Eq), eq)) => {
                            let (value, next) = self.parse_attribute_value(eq.end)?;
                            pos = next;
                            Some(value)
                        }
                        _ => None,
                    };
                    attributes.push(Attribute::Named {
                        name: attr_name,
                        value,
                    });
                }
                Some(TagToken::LBrace) => {
                    let Some(code_start) = self.spread_start(span.end) else {
                        return Err(ParseError::invalid_syntax(
                            span.start,
                            "expected `{...expression}` in tag",
                        ));
                    };
                    let (expression, close) = self.parse_code(code_start, CodeEnd::Brace)?;
                    attributes.push(Attribute::Spread { expression });
                    pos = close + 1;
                }
                Some(TagToken::Slash) => {
                    let end = self.expect_gt(span.end)?;
                    return Ok(SyntaxNode::new(
                        self.location(start, end),
                        NodeKind::Element(Element {
                            name,
                            attributes,
                            children: Vec::new(),
                            self_closing: true,
                        }),
                    ));
                }
                Some(TagToken::Gt) => {
                    let (children, end) = self.parse_children(span.end, Some(&name), start)?;
                    return Ok(SyntaxNode::new(
                        self.location(start, end),
                        NodeKind::Element(Element {
                            name,
                            attributes,
                            children,
                            self_closing: false,
                        }),
                    ));
                }
                _ => {
                    return Err(ParseError::unexpected_token(
                        span.start,
                        "attribute",
                        self.slice(span),
                    ))
                }
            }
        }
    }

    fn parse_attribute_value(&self, pos: usize) -> ParseResult<(AttrValue, usize)> {
        match next_tag_token(self.source, pos) {
            Some((Some(TagToken::StringLit), span)) => {
                let raw = self.slice(span.clone());
                let quote = if raw.starts_with('\'') {
                    Quote::Single
                } else {
                    Quote::Double
                };
                let value = raw[1..raw.len() - 1].to_string();
                Ok((AttrValue::String { value, quote }, span.end))
            }
            Some((Some(TagToken::LBrace), span)) => {
                let (expression, close) = self.parse_code(span.end, CodeEnd::Brace)?;
                Ok((AttrValue::Expression(expression), close + 1))
            }
            Some((_, span)) => Err(ParseError::unexpected_token(
                span.start,
                "attribute value",
                self.slice(span),
            )),
            None => Err(ParseError::unexpected_eof(
                self.source.len(),
                "attribute value",
            )),
        }
    }

    /// Scan markup children up to and including the closing tag
    fn parse_children(
        &self,
        mut pos: usize,
        name: Option<&str>,
        open_start: usize,
    ) -> ParseResult<(Vec<Arc<SyntaxNode>>, usize)> {
        let mut children = Vec::new();

        loop {
            let rest = self.rest(pos);
            let Some(offset) = rest.find(|c: char| c == '<' || c == '{') else {
                return Err(ParseError::unclosed_element(
                    open_start,
                    name.unwrap_or_default(),
                ));
            };
            let at = pos + offset;

            if offset > 0 {
                children.push(Arc::new(SyntaxNode::new(
                    self.location(pos, at),
                    NodeKind::Text(Text {
                        value: rest[..offset].to_string(),
                    }),
                )));
            }

            if self.rest(at).starts_with('{') {
                let wrapper = self.parse_wrapper(at)?;
                pos = wrapper.loc.end.offset;
                children.push(Arc::new(wrapper));
                continue;
            }

            if self.rest(at).starts_with("</") {
                let end = self.parse_closing_tag(at, name)?;
                return Ok((children, end));
            }

            if !self.starts_markup(at + 1) {
                return Err(ParseError::invalid_syntax(at, "unexpected `<` in markup text"));
            }

            let child = self.parse_markup(at)?;
            pos = child.loc.end.offset;
            children.push(Arc::new(child));
        }
    }

    fn parse_closing_tag(&self, at: usize, name: Option<&str>) -> ParseResult<usize> {
        let mut pos = at + 2;

        if let Some(expected) = name {
            match next_tag_token(self.source, pos) {
                Some((Some(TagToken::Name), span)) if self.slice(span.clone()) == expected => {
                    pos = span.end;
                }
                Some((_, span)) => {
                    return Err(ParseError::invalid_syntax(
                        span.start,
                        format!("expected </{}>", expected),
                    ))
                }
                None => {
                    return Err(ParseError::unexpected_eof(
                        self.source.len(),
                        format!("</{}>", expected),
                    ))
                }
            }
        }

        self.expect_gt(pos)
    }

    /// Parse an expression container `{expr}` or spread child `{...expr}`
    fn parse_wrapper(&self, at: usize) -> ParseResult<SyntaxNode> {
        let inner = at + 1;
        let (spread, code_start) = match self.spread_start(inner) {
            Some(code_start) => (true, code_start),
            None => (false, inner),
        };
        let (expression, close) = self.parse_code(code_start, CodeEnd::Brace)?;
        Ok(SyntaxNode::new(
            self.location(at, close + 1),
            NodeKind::Wrapper(Wrapper { spread, expression }),
        ))
    }

    fn expect_gt(&self, pos: usize) -> ParseResult<usize> {
        match next_tag_token(self.source, pos) {
            Some((Some(TagToken::Gt), span)) => Ok(span.end),
            Some((_, span)) => Err(ParseError::unexpected_token(span.start, ">", self.slice(span))),
            None => Err(ParseError::unexpected_eof(self.source.len(), ">")),
        }
    }

    /// Offset just past `...` if the text after `pos` starts a spread
    fn spread_start(&self, pos: usize) -> Option<usize> {
        let rest = self.rest(pos);
        let trimmed = rest.trim_start();
        trimmed
            .starts_with("...")
            .then(|| pos + (rest.len() - trimmed.len()) + 3)
    }

    /// A `<` opens markup only when followed by a tag name or `>`
    fn starts_markup(&self, after_lt: usize) -> bool {
        match self.rest(after_lt).chars().next() {
            Some(c) => c.is_ascii_alphabetic() || c == '_' || c == '$' || c == '>',
            None => false,
        }
    }

    fn allows_markup(&self, token: Option<CodeToken>, span: &Range<usize>) -> bool {
        match token {
            Some(CodeToken::Ident) => MARKUP_KEYWORDS.contains(&self.slice(span.clone())),
            Some(t) if t.opens() => true,
            Some(CodeToken::Semi | CodeToken::Punct | CodeToken::Gt | CodeToken::Lt) => true,
            _ => false,
        }
    }

    /// True if only whitespace or a line comment follows `pos` on its line
    fn ends_line(&self, pos: usize) -> bool {
        let line = self.rest(pos).split('\n').next().unwrap_or_default().trim();
        line.is_empty() || line.starts_with("//")
    }

    fn location(&self, start: usize, end: usize) -> Location {
        Location {
            start: self.lines.position(self.source, start),
            end: self.lines.position(self.source, end),
        }
    }

    fn slice(&self, range: Range<usize>) -> &'src str {
        self.source.get(range).unwrap_or_default()
    }

    fn rest(&self, pos: usize) -> &'src str {
        self.source.get(pos..).unwrap_or_default()
    }
}

fn push_code(parts: &mut Vec<Part>, code: &str) {
    if !code.is_empty() {
        parts.push(Part::Code(code.to_string()));
    }
}

/// Byte offset to line/column lookup
struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { line_starts }
    }

    fn position(&self, source: &str, offset: usize) -> Position {
        let line = self.line_starts.partition_point(|&start| start <= offset).max(1);
        let line_start = self.line_starts[line - 1];
        let column = source
            .get(line_start..offset)
            .map(|s| s.chars().count())
            .unwrap_or_default();

        Position {
            offset,
            line: line as u32,
            column: column as u32,
        }
    }
}
