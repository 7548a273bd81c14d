//! Abstract Syntax Tree (AST) Types for POSIX shell
//!
//! Architecture:
//!   Input bytes → Reader → Lexer ⇄ Parser → AST

pub mod types;
pub mod walk;
