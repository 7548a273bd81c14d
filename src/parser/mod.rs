//! Parser module for shell source
//!
//! The lexer and the recursive descent parser share one `Parser` value; the
//! files below each add a group of methods to it.

pub mod types;
pub mod token;
pub mod reader;
pub mod lexer;
pub mod word_parser;
pub mod arithmetic_parser;
pub mod command_parser;
pub mod compound_parser;
pub mod heredoc;
pub mod parser;

// Re-exports
pub use types::{ParseError, ParserOptions, Position, Result, MAX_PARSER_DEPTH};
pub use token::Token;
pub use parser::{parse, parse_str, Parser};
