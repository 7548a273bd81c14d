//! Abstract Syntax Tree (AST) Types for POSIX shell
//!
//! This module defines the syntax tree produced by the parser.
//! Every node records the position of its first byte; nodes own all of
//! their data, nothing borrows from the input once parsing is done.

use serde::Serialize;

use crate::parser::token::Token;

// =============================================================================
// BASE TYPES
// =============================================================================

/// A 1-based line/column position in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
}

impl Pos {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position of the byte following `b`.
    pub fn advance(&mut self, b: u8) {
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl Default for Pos {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

// =============================================================================
// FILE & STATEMENTS
// =============================================================================

/// Root node: a parsed source file.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct File {
    pub name: String,
    pub stmts: Vec<Stmt>,
}

/// A statement: an optional command node wrapped with its assignments,
/// redirections and flags.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Stmt {
    pub pos: Pos,
    pub negated: bool,
    pub assigns: Vec<Assign>,
    pub redirects: Vec<Redirect>,
    pub node: Option<Node>,
    pub background: bool,
}

impl Stmt {
    pub fn at(pos: Pos) -> Self {
        Self {
            pos,
            ..Default::default()
        }
    }

    /// A statement with nothing in it is never a parse result.
    pub fn is_empty(&self) -> bool {
        !self.negated && self.node.is_none() && self.assigns.is_empty() && self.redirects.is_empty()
    }
}

/// Union of all command node types
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Node {
    Command(Command),
    Subshell(Subshell),
    Block(Block),
    If(IfStmt),
    While(WhileStmt),
    Until(UntilStmt),
    For(ForStmt),
    Case(CaseStmt),
    FuncDecl(FuncDecl),
    Binary(BinaryCmd),
}

/// Simple command: its words in order, the first one being the name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    pub args: Vec<Word>,
}

/// `( stmts )`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subshell {
    pub lparen: Pos,
    pub rparen: Pos,
    pub stmts: Vec<Stmt>,
}

/// `{ stmts; }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub lbrace: Pos,
    pub rbrace: Pos,
    pub stmts: Vec<Stmt>,
}

// =============================================================================
// CONTROL FLOW
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfStmt {
    pub if_pos: Pos,
    pub fi_pos: Pos,
    pub conds: Vec<Stmt>,
    pub then_stmts: Vec<Stmt>,
    pub elifs: Vec<Elif>,
    pub else_stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Elif {
    pub elif_pos: Pos,
    pub conds: Vec<Stmt>,
    pub then_stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhileStmt {
    pub while_pos: Pos,
    pub done_pos: Pos,
    pub conds: Vec<Stmt>,
    pub do_stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UntilStmt {
    pub until_pos: Pos,
    pub done_pos: Pos,
    pub conds: Vec<Stmt>,
    pub do_stmts: Vec<Stmt>,
}

/// `for name [in words]; do stmts; done`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForStmt {
    pub for_pos: Pos,
    pub done_pos: Pos,
    pub name: Lit,
    pub word_list: Vec<Word>,
    pub do_stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseStmt {
    pub case_pos: Pos,
    pub esac_pos: Pos,
    pub word: Word,
    pub pattern_lists: Vec<PatternList>,
}

/// `pat1 | pat2 ) stmts ;;`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternList {
    pub patterns: Vec<Word>,
    pub stmts: Vec<Stmt>,
}

/// Function definition. `bash_style` is set for the `function name` form,
/// in which case `pos` is the position of the keyword.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncDecl {
    pub pos: Pos,
    pub bash_style: bool,
    pub name: Lit,
    pub body: Box<Stmt>,
}

/// `x && y`, `x || y` and `x | y`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryCmd {
    pub op: Token,
    pub op_pos: Pos,
    pub x: Box<Stmt>,
    pub y: Box<Stmt>,
}

impl Drop for BinaryCmd {
    // Long `&&`, `||` and `|` chains are unlinked one node at a time.
    fn drop(&mut self) {
        let mut pending = vec![std::mem::take(&mut *self.x), std::mem::take(&mut *self.y)];
        while let Some(mut stmt) = pending.pop() {
            if let Some(Node::Binary(mut b)) = stmt.node.take() {
                pending.push(std::mem::take(&mut *b.x));
                pending.push(std::mem::take(&mut *b.y));
            }
        }
    }
}

// =============================================================================
// ASSIGNMENTS & REDIRECTIONS
// =============================================================================

/// `name=value`; `value` is absent for `name=`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assign {
    pub name: Lit,
    pub value: Option<Word>,
}

/// `[n]op word`. For here-documents the word holds the delimiter spelling
/// followed by a newline and the body, as a single literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Redirect {
    pub n: Option<Lit>,
    pub op: Token,
    pub op_pos: Pos,
    pub word: Word,
}

impl Redirect {
    pub fn is_heredoc(&self) -> bool {
        matches!(self.op, Token::Heredoc | Token::DHeredoc)
    }
}

// =============================================================================
// WORDS
// =============================================================================

/// A word is never empty: "no word" is `None`, not a word without parts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Word {
    pub parts: Vec<WordPart>,
}

impl Word {
    pub fn pos(&self) -> Pos {
        self.parts.first().map(WordPart::pos).unwrap_or_default()
    }

    /// The value of a word made of a single literal.
    pub fn lit(&self) -> Option<&str> {
        match self.parts.as_slice() {
            [WordPart::Lit(l)] => Some(&l.value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum WordPart {
    Lit(Lit),
    SglQuoted(SglQuoted),
    DblQuoted(DblQuoted),
    ParamExp(ParamExp),
    CmdSubst(CmdSubst),
    ArithmExp(ArithmExp),
}

impl WordPart {
    pub fn pos(&self) -> Pos {
        match self {
            Self::Lit(l) => l.pos,
            Self::SglQuoted(q) => q.quote,
            Self::DblQuoted(q) => q.quote,
            Self::ParamExp(p) => p.dollar,
            Self::CmdSubst(c) => c.left,
            Self::ArithmExp(a) => a.dollar,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lit {
    pub pos: Pos,
    pub value: String,
}

impl Lit {
    pub fn new(pos: Pos, value: impl Into<String>) -> Self {
        Self {
            pos,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SglQuoted {
    pub quote: Pos,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DblQuoted {
    pub quote: Pos,
    pub parts: Vec<WordPart>,
}

/// `$name` (short) or `${[#]name[op word]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamExp {
    pub dollar: Pos,
    pub short: bool,
    pub length: bool,
    pub param: Lit,
    pub exp: Option<Expansion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expansion {
    pub op: Token,
    pub word: Option<Word>,
}

/// `$(stmts)` or `` `stmts` ``
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CmdSubst {
    pub backquoted: bool,
    pub left: Pos,
    pub right: Pos,
    pub stmts: Vec<Stmt>,
}

/// `$(( x ))`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArithmExp {
    pub dollar: Pos,
    pub rparen: Pos,
    pub x: Option<ArithmExpr>,
}

// =============================================================================
// ARITHMETIC
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ArithmExpr {
    Word(Word),
    Unary(Box<UnaryArithm>),
    Paren(Box<ParenArithm>),
    Binary(Box<BinaryArithm>),
}

/// Prefix `+x`/`-x`, or postfix `x++`/`x--` when `post` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnaryArithm {
    pub op_pos: Pos,
    pub op: Token,
    pub post: bool,
    pub x: ArithmExpr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParenArithm {
    pub lparen: Pos,
    pub rparen: Pos,
    pub x: ArithmExpr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryArithm {
    pub op_pos: Pos,
    pub op: Token,
    pub x: ArithmExpr,
    pub y: ArithmExpr,
}

impl Drop for BinaryArithm {
    // the right operand of a flat expression can be arbitrarily long
    fn drop(&mut self) {
        let mut next = std::mem::replace(&mut self.y, ArithmExpr::Word(Word { parts: Vec::new() }));
        while let ArithmExpr::Binary(mut b) = next {
            next = std::mem::replace(&mut b.y, ArithmExpr::Word(Word { parts: Vec::new() }));
        }
    }
}
