//! Syntax layer for the reshaper editor
//!
//! Parses script files with embedded markup into a closed syntax tree, prints
//! trees back to source, and tags elements for the live preview.

pub mod annotate;
pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod visit;

pub use annotate::{annotate, format_tag, parse_tag, DEFAULT_TAG_ATTRIBUTE};
pub use ast::*;
#[cfg(feature = "pretty-errors")]
pub use error::format_error;
pub use error::{ParseError, ParseResult};
pub use parser::{parse, Parser};
pub use printer::{print, print_node};
pub use visit::{ElementCollector, Visitor};
