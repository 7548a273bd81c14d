//! Parser Types and Constants
//!
//! Error values, options and limits shared by the parser modules.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::ast::types::Pos;
use crate::parser::token::{readable, Token};

/// Max nesting of statements, word parts and arithmetic operands
pub const MAX_PARSER_DEPTH: usize = 100;

pub type Result<T> = std::result::Result<T, ParseError>;

/// Where an error happened, with the display name of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub filename: String,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(filename: &str, pos: Pos) -> Self {
        Self {
            filename: filename.to_string(),
            line: pos.line,
            column: pos.column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.filename.is_empty() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "{}:{}:{}", self.filename, self.line, self.column)
        }
    }
}

/// The single error a failed parse reports.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{at}: {source}")]
    Io {
        at: Position,
        #[source]
        source: io::Error,
    },

    #[error("{at}: reached {found} without closing quote {quote}")]
    UnclosedQuote {
        at: Position,
        found: String,
        quote: &'static str,
    },

    #[error("{at}: reached {found} without matching token {left} with {right}")]
    Unmatched {
        at: Position,
        found: String,
        left: &'static str,
        right: &'static str,
    },

    #[error("{at}: {keyword} statement must end with {end:?}")]
    MissingEnd {
        at: Position,
        keyword: &'static str,
        end: &'static str,
    },

    #[error("{at}: {} must be followed by {right}", readable(.left))]
    MissingFollow {
        at: Position,
        left: String,
        right: String,
    },

    #[error("{at}: invalid {what}: {name}")]
    InvalidIdentifier {
        at: Position,
        what: &'static str,
        name: String,
    },

    #[error("{at}: {found} {hint}")]
    InvalidStatementStart {
        at: Position,
        found: String,
        hint: &'static str,
    },

    #[error("{at}: {message}")]
    Syntax { at: Position, message: String },

    #[error("{at}: unclosed here-document, expected {delimiter:?}")]
    UnclosedHeredoc { at: Position, delimiter: String },

    #[error("{at}: nesting is deeper than {limit} levels")]
    NestingTooDeep { at: Position, limit: usize },
}

impl ParseError {
    pub fn position(&self) -> &Position {
        match self {
            Self::Io { at, .. }
            | Self::UnclosedQuote { at, .. }
            | Self::Unmatched { at, .. }
            | Self::MissingEnd { at, .. }
            | Self::MissingFollow { at, .. }
            | Self::InvalidIdentifier { at, .. }
            | Self::InvalidStatementStart { at, .. }
            | Self::Syntax { at, .. }
            | Self::UnclosedHeredoc { at, .. }
            | Self::NestingTooDeep { at, .. } => at,
        }
    }
}

/// Tunables for a single parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_PARSER_DEPTH,
        }
    }
}

/// Spelling used in messages for the token found where something else was
/// expected.
pub(crate) fn found_str(tok: Token, val: &str) -> String {
    match tok {
        Token::Lit => format!("{val:?}"),
        _ => tok.as_str().to_string(),
    }
}
