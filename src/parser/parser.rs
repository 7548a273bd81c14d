//! Recursive Descent Parser for shell source
//!
//! The parser pulls tokens from the lexer one at a time, with the current
//! and the previous token available, and builds the AST as it goes.
//!
//! Grammar (simplified):
//!   file         ::= stmt*
//!   stmt         ::= pipeline ((&&|'||') pipeline)* [&] [;]
//!   pipeline     ::= [!] (assign|redirect)* [command (| command)*]
//!   command      ::= simple_cmd | compound_cmd | func_decl
//!   simple_cmd   ::= word (word|redirect)*
//!   compound_cmd ::= if | while | until | for | case | ( stmts ) | { stmts }

use std::io::Read;

use log::debug;

use crate::ast::types::{BinaryCmd, File, Lit, Node, Pos, Stmt};
use crate::parser::heredoc::PendingHeredoc;
use crate::parser::lexer::{Lexeme, Stop};
use crate::parser::reader::ByteReader;
use crate::parser::token::Token;
use crate::parser::types::{found_str, ParseError, ParserOptions, Position, Result};

/// Parse a whole program read from `reader`. `name` only shows up in error
/// messages and in the returned [`File`].
pub fn parse<R: Read>(reader: R, name: &str) -> Result<File> {
    Parser::new(reader, name).parse()
}

/// Parse a program held in memory.
pub fn parse_str(src: &str, name: &str) -> Result<File> {
    parse(src.as_bytes(), name)
}

pub struct Parser<R> {
    pub(crate) reader: ByteReader<R>,
    name: String,
    options: ParserOptions,

    /// Blanks came before the current token
    pub(crate) spaced: bool,
    /// A newline came before the current token
    pub(crate) new_line: bool,

    pub(crate) cur: Lexeme,
    pub(crate) prev: Lexeme,

    pub(crate) stops: Vec<Stop>,

    // here-documents
    pub(crate) stop_newline: bool,
    pub(crate) heredocs: Vec<PendingHeredoc>,
    pub(crate) resolved: Vec<(Pos, Lit)>,
    pub(crate) truncated: Option<ParseError>,

    depth: usize,
}

impl<R: Read> Parser<R> {
    pub fn new(reader: R, name: &str) -> Self {
        Self {
            reader: ByteReader::new(reader),
            name: name.to_string(),
            options: ParserOptions::default(),
            spaced: false,
            new_line: false,
            cur: Lexeme::default(),
            prev: Lexeme::default(),
            stops: Vec::new(),
            stop_newline: false,
            heredocs: Vec::new(),
            resolved: Vec::new(),
            truncated: None,
            depth: 0,
        }
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse the entire input. The first error ends the parse.
    pub fn parse(mut self) -> Result<File> {
        debug!("parsing {:?}", self.name);
        match self.parse_file() {
            Ok(stmts) => {
                debug!("parsed {:?}: {} statements", self.name, stmts.len());
                Ok(File {
                    name: self.name,
                    stmts,
                })
            }
            Err(e) => {
                debug!("parse of {:?} failed: {}", self.name, e);
                Err(e)
            }
        }
    }

    fn parse_file(&mut self) -> Result<Vec<Stmt>> {
        self.next()?;
        let mut stmts = self.stmts(&[])?;
        if !self.heredocs.is_empty() {
            // input ended on the line that opened them
            self.do_heredocs()?;
        }
        self.fill_heredocs(&mut stmts);
        match self.truncated.take() {
            Some(err) => Err(err),
            None => Ok(stmts),
        }
    }

    // =========================================================================
    // ERRORS
    // =========================================================================

    pub(crate) fn position(&self, pos: Pos) -> Position {
        Position::new(&self.name, pos)
    }

    pub(crate) fn syntax_err(&self, pos: Pos, message: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            at: self.position(pos),
            message: message.into(),
        }
    }

    pub(crate) fn follow_err(&self, pos: Pos, left: &str, right: &str) -> ParseError {
        ParseError::MissingFollow {
            at: self.position(pos),
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    pub(crate) fn matching_err(&self, pos: Pos, left: &'static str, right: &'static str) -> ParseError {
        ParseError::Unmatched {
            at: self.position(pos),
            found: self.found(),
            left,
            right,
        }
    }

    /// The current token, spelled for messages.
    pub(crate) fn found(&self) -> String {
        found_str(self.cur.tok, &self.cur.val)
    }

    /// Run `f` one nesting level deeper.
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.options.max_depth {
            return Err(ParseError::NestingTooDeep {
                at: self.position(self.cur.pos),
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // =========================================================================
    // EXPECTATIONS
    // =========================================================================

    pub(crate) fn want_follow(&mut self, lpos: Pos, left: &str, tok: Token) -> Result<()> {
        if !self.got(tok)? {
            return Err(self.follow_err(lpos, left, &format!("{:?}", tok.as_str())));
        }
        Ok(())
    }

    pub(crate) fn want_follow_stmt(&mut self, lpos: Pos, left: &str) -> Result<Stmt> {
        match self.got_stmt(false, &[])? {
            Some(s) => Ok(s),
            None => Err(self.follow_err(lpos, left, "a statement")),
        }
    }

    /// A statement list after `left`; an empty one is fine when a `;` or a
    /// newline follows `left` directly.
    pub(crate) fn want_follow_stmts(&mut self, left: Token, stops: &[Token]) -> Result<Vec<Stmt>> {
        if self.got_same_line(Token::Semicolon)? {
            return Ok(Vec::new());
        }
        let stmts = self.stmts(stops)?;
        if stmts.is_empty() && !self.new_line {
            return Err(self.follow_err(self.prev.pos, left.as_str(), "a statement list"));
        }
        Ok(stmts)
    }

    /// The keyword closing a compound command; returns its position.
    pub(crate) fn want_stmt_end(&mut self, start: Pos, start_tok: Token, tok: Token) -> Result<Pos> {
        if !self.got(tok)? {
            return Err(ParseError::MissingEnd {
                at: self.position(start),
                keyword: start_tok.as_str(),
                end: tok.as_str(),
            });
        }
        Ok(self.prev.pos)
    }

    pub(crate) fn want_quote(&mut self, lpos: Pos, tok: Token) -> Result<()> {
        if !self.got(tok)? {
            return Err(ParseError::UnclosedQuote {
                at: self.position(lpos),
                found: self.found(),
                quote: tok.as_str(),
            });
        }
        Ok(())
    }

    /// The closing token of a pair opened at `lpos`; returns its position.
    pub(crate) fn want_matched(&mut self, lpos: Pos, left: Token, right: Token) -> Result<Pos> {
        if !self.got(right)? {
            return Err(self.matching_err(lpos, left.as_str(), right.as_str()));
        }
        Ok(self.prev.pos)
    }

    // =========================================================================
    // STATEMENT LISTS
    // =========================================================================

    pub(crate) fn stmts(&mut self, stops: &[Token]) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.eof()? && !self.peek_any(stops)? {
            match self.got_stmt(true, stops)? {
                Some(s) => stmts.push(s),
                None => return Err(self.invalid_stmt_start()?),
            }
        }
        Ok(stmts)
    }

    /// A statement list inside a new stop context, entered on the current
    /// token.
    pub(crate) fn stmts_nested(&mut self, stop: Stop) -> Result<Vec<Stmt>> {
        self.enter_stop(stop)?;
        let stmts = self.stmts(stop.tokens())?;
        self.pop_stop();
        Ok(stmts)
    }

    fn invalid_stmt_start(&mut self) -> Result<ParseError> {
        let hint = if self.peek_any(&[Token::Semicolon, Token::And, Token::Or, Token::LAnd, Token::LOr])? {
            "can only immediately follow a statement"
        } else if self.peek(Token::RBrace)? {
            "can only be used to close a block"
        } else if self.peek(Token::RParen)? {
            "can only be used to close a subshell"
        } else {
            "is not a valid start for a statement"
        };
        let found = match self.cur.tok {
            Token::Lit => self.cur.val.clone(),
            tok => tok.as_str().to_string(),
        };
        Ok(ParseError::InvalidStatementStart {
            at: self.position(self.cur.pos),
            found,
            hint,
        })
    }

    /// Parse one statement with its `&&`/`||` chain and terminator. With
    /// `want_stop`, whatever follows must end the statement.
    pub(crate) fn got_stmt(&mut self, want_stop: bool, stops: &[Token]) -> Result<Option<Stmt>> {
        self.nested(|p| p.got_stmt_inner(want_stop, stops))
    }

    fn got_stmt_inner(&mut self, want_stop: bool, stops: &[Token]) -> Result<Option<Stmt>> {
        let Some(mut s) = self.got_pipeline()? else {
            return Ok(None);
        };
        if matches!(s.node, Some(Node::FuncDecl(_))) {
            return Ok(Some(s));
        }
        loop {
            if want_stop && !self.peek_any(stops)? && !self.peek_stop()? {
                return Err(self.syntax_err(
                    self.cur.pos,
                    "statements must be separated by &, ; or a newline",
                ));
            }
            if !(self.got_same_line(Token::LAnd)? || self.got_same_line(Token::LOr)?) {
                break;
            }
            // left-biased: a && b || c is (a && b) || c
            let op = self.prev.tok;
            let op_pos = self.prev.pos;
            let Some(y) = self.got_pipeline()? else {
                return Err(self.follow_err(op_pos, op.as_str(), "a statement"));
            };
            let pos = s.pos;
            s = Stmt {
                pos,
                node: Some(Node::Binary(BinaryCmd {
                    op,
                    op_pos,
                    x: Box::new(s),
                    y: Box::new(y),
                })),
                ..Stmt::default()
            };
        }
        if self.got_same_line(Token::And)? {
            s.background = true;
        }
        self.got_same_line(Token::Semicolon)?;
        Ok(Some(s))
    }

    /// Leading assignments and redirects, then a pipe chain of commands.
    fn got_pipeline(&mut self) -> Result<Option<Stmt>> {
        if self.peek(Token::RBrace)? {
            // don't let it be a literal
            return Ok(None);
        }
        let mut s = Stmt::at(self.cur.pos);
        s.negated = self.got(Token::Not)?;
        loop {
            if let Some(i) = self.assign_split()? {
                let assign = self.assign(i)?;
                s.assigns.push(assign);
            } else if self.peek_redir()? {
                let redirect = self.redirect()?;
                s.redirects.push(redirect);
            } else {
                break;
            }
            if self.new_line {
                return Ok(Some(s));
            }
        }
        if self.got_command(&mut s)? && self.got_same_line(Token::Or)? {
            s = self.pipe_chain(s)?;
        }
        Ok(if s.is_empty() { None } else { Some(s) })
    }

    /// `x | ...` after the first `|` has been consumed. The commands are
    /// collected in a loop and folded so that pipes nest to the right.
    fn pipe_chain(&mut self, mut x: Stmt) -> Result<Stmt> {
        // negation applies to the whole pipeline
        let negated = std::mem::take(&mut x.negated);
        let mut links = Vec::new();
        let mut last = x;
        loop {
            let op_pos = self.prev.pos;
            self.skip_comments()?;
            let mut y = Stmt::at(self.cur.pos);
            if !self.got_command(&mut y)? {
                return Err(self.follow_err(op_pos, Token::Or.as_str(), "a statement"));
            }
            links.push((op_pos, std::mem::replace(&mut last, y)));
            if !self.got_same_line(Token::Or)? {
                break;
            }
        }

        let mut pipe = last;
        while let Some((op_pos, x)) = links.pop() {
            pipe = Stmt {
                pos: x.pos,
                node: Some(Node::Binary(BinaryCmd {
                    op: Token::Or,
                    op_pos,
                    x: Box::new(x),
                    y: Box::new(pipe),
                })),
                ..Stmt::default()
            };
        }
        pipe.negated = negated;
        Ok(pipe)
    }

    /// A command node into `s`, followed by its trailing redirects.
    fn got_command(&mut self, s: &mut Stmt) -> Result<bool> {
        let node = if self.peek(Token::LParen)? {
            self.subshell()?
        } else if self.got(Token::LBrace)? {
            self.block()?
        } else if self.got(Token::If)? {
            self.if_stmt()?
        } else if self.got(Token::While)? {
            self.while_stmt()?
        } else if self.got(Token::Until)? {
            self.until_stmt()?
        } else if self.got(Token::For)? {
            self.for_stmt()?
        } else if self.got(Token::Case)? {
            self.case_stmt()?
        } else if self.peek_any(&[
            Token::Lit,
            Token::Dollar,
            Token::DblQuote,
            Token::SglQuote,
            Token::Backquote,
        ])? {
            self.cmd_or_func(s)?
        } else {
            return Ok(false);
        };
        s.node = Some(node);
        if !self.new_line {
            while self.peek_redir()? {
                let redirect = self.redirect()?;
                s.redirects.push(redirect);
            }
        }
        Ok(true)
    }

    // =========================================================================
    // STOP DETECTION
    // =========================================================================

    /// End of input, a newline or a `;`.
    pub(crate) fn peek_end(&mut self) -> Result<bool> {
        Ok(self.eof()? || self.new_line || self.peek(Token::Semicolon)?)
    }

    /// Whether the current token ends the words of a command.
    pub(crate) fn peek_stop(&mut self) -> Result<bool> {
        if self.peek_end()? || self.peek_any(&[Token::And, Token::Or, Token::LAnd, Token::LOr])? {
            return Ok(true);
        }
        for i in (0..self.stops.len()).rev() {
            let stop = self.stops[i];
            if self.peek_any(stop.tokens())? {
                return Ok(true);
            }
            if stop.is_boundary() {
                break;
            }
        }
        Ok(false)
    }
}
