//! shsyntax - A POSIX shell parser
//!
//! This library parses shell scripts in a single pass, producing an AST
//! that can be used for analysis or interpretation.
//!
//! ```
//! let file = shsyntax::parse_str("echo hello | wc -c", "demo.sh").unwrap();
//! assert_eq!(file.stmts.len(), 1);
//! ```

pub mod ast;
pub mod parser;

pub use ast::types::*;
pub use parser::{
    parse, parse_str, ParseError, Parser, ParserOptions, Position, Token, MAX_PARSER_DEPTH,
};
