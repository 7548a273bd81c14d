//! Lexer for shell source
//!
//! The lexer is not a separate pass: the parser pulls one token at a time
//! with `next()` and the classification of each byte depends on the stop
//! context stack the parser has pushed (double quotes, backquotes,
//! parameter braces, arithmetic parens).
//!
//! Classification order for the byte `b` ahead of the cursor:
//!   1. newline while a here-document delimiter is being read -> Stopped
//!   2. `}` or a parameter operator inside `${...}`
//!   3. `#` outside double quotes -> comment up to the end of the line
//!   4. an arithmetic operator inside `$((...))`
//!   5. a reserved byte (only `` ` ``, `"` and `$` between double quotes)
//!   6. anything else starts a literal run

use std::io::Read;
use std::mem;

use crate::parser::parser::Parser;
use crate::parser::token::{
    is_arithm_op_byte, is_param_op_byte, is_reserved_byte, is_space, is_word_break, Token,
};
use crate::parser::types::{ParseError, Result};
use crate::ast::types::Pos;

/// Nesting contexts that change how bytes are tokenized and which tokens
/// end a statement list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    DblQuote,
    Backquote,
    /// `$(...)` and `( ... )`
    Paren,
    /// Statements of one `case` item
    CaseItem,
    /// Right after `${`, where operators are tokenized
    ParamOp,
    /// The word after a parameter operator, up to `}`
    ParamClose,
    /// Inside `$((...))`
    Arithm,
}

impl Stop {
    /// Tokens that end a statement list opened in this context.
    pub fn tokens(self) -> &'static [Token] {
        match self {
            Self::DblQuote => &[Token::DblQuote],
            Self::Backquote => &[Token::Backquote],
            Self::Paren => &[Token::RParen],
            Self::CaseItem => &[Token::DSemicolon, Token::Esac],
            Self::ParamClose => &[Token::RBrace],
            Self::ParamOp | Self::Arithm => &[],
        }
    }

    /// Stop detection never looks through these to outer contexts.
    pub fn is_boundary(self) -> bool {
        matches!(self, Self::Backquote | Self::ParamClose)
    }
}

/// A token with its text and position. `blank_start` and `start` are
/// capture offsets before and after the blanks preceding the token.
#[derive(Debug, Clone)]
pub struct Lexeme {
    pub tok: Token,
    pub val: String,
    pub pos: Pos,
    pub blank_start: usize,
    pub start: usize,
}

impl Default for Lexeme {
    fn default() -> Self {
        // placeholder until the first token is read
        Self {
            tok: Token::Stopped,
            val: String::new(),
            pos: Pos::default(),
            blank_start: 0,
            start: 0,
        }
    }
}

impl<R: Read> Parser<R> {
    // =========================================================================
    // TOKEN PRODUCTION
    // =========================================================================

    /// Advance to the next token, keeping the current one as `prev`.
    pub(crate) fn next(&mut self) -> Result<()> {
        self.advance(true)
    }

    /// Read the next token. Without `shift` the current token is replaced
    /// but not remembered, which is how comments disappear.
    fn advance(&mut self, shift: bool) -> Result<()> {
        if self.cur.tok == Token::Eof {
            return Ok(());
        }
        let last = self.cur.tok;
        if shift {
            self.prev = mem::take(&mut self.cur);
        }
        self.cur.blank_start = self.reader.captured_len();
        self.spaced = false;
        self.new_line = false;

        let b = loop {
            if self.reader.read_only(b"\\\n") {
                continue;
            }
            let Some(b) = self.reader.peek_byte() else {
                return self.reached_eof();
            };
            if self.stop_newline && b == b'\n' {
                self.cur.pos = self.reader.pos();
                self.set_tok(Token::Stopped);
                return Ok(());
            }
            if self.quoted(Stop::DblQuote) || !is_space(b) {
                break b;
            }
            self.reader.read_byte();
            self.spaced = true;
            if b == b'\n' {
                self.new_line = true;
                if !self.heredocs.is_empty() {
                    self.do_heredocs()?;
                }
            }
        };
        self.cur.pos = self.reader.pos();
        self.cur.start = self.reader.captured_len();

        if (self.quoted(Stop::ParamClose) && b == b'}')
            || (self.quoted(Stop::ParamOp) && is_param_op_byte(b))
        {
            // '}' is a token only in this context
            if self.reader.read_only(b"}") {
                self.set_tok(Token::RBrace);
            } else {
                self.do_token(b);
            }
        } else if b == b'#' && !self.quoted(Stop::DblQuote) {
            let (line, _) = self.reader.read_until(b"\n");
            self.cur.tok = Token::Comment;
            self.cur.val = String::from_utf8_lossy(&line).into_owned();
        } else if self.quoted(Stop::Arithm) && is_arithm_op_byte(b) {
            self.do_token(b);
        } else if is_reserved_byte(b) {
            // Between double quotes only expansions and the closing quote
            // are tokens; `$(` still opens a substitution
            if self.quoted(Stop::DblQuote)
                && !matches!(b, b'`' | b'"' | b'$')
                && !(last == Token::Dollar && b == b'(')
            {
                self.read_lit();
            } else {
                self.do_token(b);
            }
        } else if last == Token::Dollar && !self.spaced && !self.quoted(Stop::ParamOp) {
            self.read_param_name();
        } else {
            self.read_lit();
        }
        Ok(())
    }

    fn reached_eof(&mut self) -> Result<()> {
        if let Some(source) = self.reader.take_error() {
            return Err(ParseError::Io {
                at: self.position(self.reader.pos()),
                source,
            });
        }
        self.cur.pos = self.reader.pos();
        self.set_tok(Token::Eof);
        Ok(())
    }

    pub(crate) fn set_tok(&mut self, tok: Token) {
        self.cur.tok = tok;
        self.cur.val = tok.as_str().to_string();
    }

    fn set_lit(&mut self, bytes: Vec<u8>) {
        self.cur.tok = Token::Lit;
        self.cur.val = String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
    }

    /// Make `tok` the current token without reading it from the input; the
    /// caller has already consumed its bytes.
    pub(crate) fn shift_tok(&mut self, tok: Token, pos: Pos) {
        self.prev = mem::take(&mut self.cur);
        self.cur.pos = pos;
        self.set_tok(tok);
        self.spaced = false;
        self.new_line = false;
    }

    /// Consume the operator starting with `b`.
    fn do_token(&mut self, b: u8) {
        self.reader.read_byte();
        let arithm = self.quoted(Stop::Arithm);
        let r = &mut self.reader;
        let tok = match b {
            b'\'' => Token::SglQuote,
            b'"' => Token::DblQuote,
            b'`' => Token::Backquote,
            b'$' => Token::Dollar,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b'}' => Token::RBrace,
            b'&' if r.read_only(b"&") => Token::LAnd,
            b'&' => Token::And,
            b'|' if r.read_only(b"|") => Token::LOr,
            b'|' => Token::Or,
            b';' if r.read_only(b";") => Token::DSemicolon,
            b';' => Token::Semicolon,
            b'<' if arithm && r.read_only(b"<") => Token::Shl,
            b'<' if arithm && r.read_only(b"=") => Token::Leq,
            b'<' if arithm => Token::Less,
            b'<' if r.read_only(b"<<") => Token::WHeredoc,
            b'<' if r.read_only(b"<-") => Token::DHeredoc,
            b'<' if r.read_only(b"<") => Token::Heredoc,
            b'<' if r.read_only(b"&") => Token::DplIn,
            b'<' if r.read_only(b">") => Token::RdrInOut,
            b'<' => Token::Less,
            b'>' if arithm && r.read_only(b">") => Token::Shr,
            b'>' if arithm && r.read_only(b"=") => Token::Geq,
            b'>' if arithm => Token::Great,
            b'>' if r.read_only(b">") => Token::Append,
            b'>' if r.read_only(b"&") => Token::DplOut,
            b'>' => Token::Great,
            b'#' if r.read_only(b"#") => Token::DHash,
            b'#' => Token::Hash,
            b':' if r.read_only(b"-") => Token::ColonSub,
            b':' if r.read_only(b"+") => Token::ColonAdd,
            b':' if r.read_only(b"=") => Token::ColonAssign,
            b':' if r.read_only(b"?") => Token::ColonQuest,
            b':' => Token::Colon,
            b'?' => Token::Quest,
            b'%' if !arithm && r.read_only(b"%") => Token::DRem,
            b'%' => Token::Rem,
            b'+' if arithm && r.read_only(b"+") => Token::Inc,
            b'+' => Token::Add,
            b'-' if arithm && r.read_only(b"-") => Token::Dec,
            b'-' => Token::Sub,
            b'=' if arithm && r.read_only(b"=") => Token::Eql,
            b'=' => Token::Assign,
            b'!' if r.read_only(b"=") => Token::Neq,
            b'!' => Token::Not,
            b'*' => Token::Mul,
            b'/' => Token::Quo,
            b'^' => Token::Xor,
            other => return self.set_lit(vec![other]),
        };
        self.set_tok(tok);
    }

    // =========================================================================
    // LITERALS
    // =========================================================================

    fn read_lit(&mut self) {
        let bytes = self.read_lit_bytes();
        self.set_lit(bytes);
    }

    fn read_lit_bytes(&mut self) -> Vec<u8> {
        if self.quoted(Stop::Arithm) {
            self.spaced = true;
        }
        let mut bytes = Vec::new();
        loop {
            if self.reader.read_only(b"\\") {
                // escaped byte, or a line continuation
                match self.reader.read_byte() {
                    Some(b'\n') => {}
                    Some(b) => bytes.extend([b'\\', b]),
                    None => bytes.push(b'\\'),
                }
                continue;
            }
            match self.reader.peek_byte() {
                Some(b) if !self.ends_lit(b) => {
                    self.reader.read_byte();
                    bytes.push(b);
                }
                _ => return bytes,
            }
        }
    }

    fn ends_lit(&self, b: u8) -> bool {
        if b == b'$' || b == b'`' {
            return true;
        }
        match self.stops.last() {
            Some(Stop::ParamClose) if b == b'}' => true,
            Some(Stop::ParamOp) if is_param_op_byte(b) => true,
            Some(Stop::DblQuote) => b == b'"',
            Some(Stop::Arithm) if is_arithm_op_byte(b) => true,
            _ => is_reserved_byte(b) || is_space(b),
        }
    }

    /// The name right after a bare `$`: an identifier run or a single byte.
    /// Whatever follows is read as the next literal.
    fn read_param_name(&mut self) {
        if self.quoted(Stop::Arithm) {
            self.spaced = true;
        }
        let mut bytes = Vec::new();
        match self.reader.peek_byte() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => {
                while let Some(b) = self.reader.peek_byte() {
                    if !(b.is_ascii_alphanumeric() || b == b'_') {
                        break;
                    }
                    self.reader.read_byte();
                    bytes.push(b);
                }
            }
            Some(b'\\') => bytes = self.read_lit_bytes(),
            Some(b) if b >= 0x80 => {
                // one whole UTF-8 character
                let len = match b {
                    0xC0..=0xDF => 2,
                    0xE0..=0xEF => 3,
                    0xF0..=0xF7 => 4,
                    _ => 1,
                };
                bytes.extend(self.reader.read_byte());
                while bytes.len() < len && self.reader.peek_byte().is_some_and(|c| c & 0xC0 == 0x80) {
                    bytes.extend(self.reader.read_byte());
                }
            }
            Some(_) => bytes.extend(self.reader.read_byte()),
            None => {}
        }
        self.set_lit(bytes);
    }

    // =========================================================================
    // LOOKAHEAD
    // =========================================================================

    pub(crate) fn quoted(&self, stop: Stop) -> bool {
        self.stops.last() == Some(&stop)
    }

    pub(crate) fn enter_stop(&mut self, stop: Stop) -> Result<()> {
        self.stops.push(stop);
        self.next()
    }

    pub(crate) fn pop_stop(&mut self) {
        self.stops.pop();
    }

    pub(crate) fn skip_comments(&mut self) -> Result<()> {
        while self.cur.tok == Token::Comment {
            self.advance(false)?;
        }
        Ok(())
    }

    pub(crate) fn peek(&mut self, tok: Token) -> Result<bool> {
        self.skip_comments()?;
        Ok(self.cur.tok == tok || self.peek_reserved_word(tok))
    }

    /// Reserved words are literals spelled like the keyword and followed
    /// by a word boundary.
    fn peek_reserved_word(&mut self, tok: Token) -> bool {
        tok.is_reserved_word()
            && self.cur.tok == Token::Lit
            && self.cur.val == tok.as_str()
            && self.peek_spaced()
    }

    /// Whether the byte after the current token ends a word.
    pub(crate) fn peek_spaced(&mut self) -> bool {
        match self.reader.peek_byte() {
            Some(b) => is_space(b) || is_word_break(b),
            None => true,
        }
    }

    pub(crate) fn peek_any(&mut self, toks: &[Token]) -> Result<bool> {
        for &tok in toks {
            if self.peek(tok)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub(crate) fn got(&mut self, tok: Token) -> Result<bool> {
        if self.peek(tok)? {
            self.next()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub(crate) fn got_same_line(&mut self, tok: Token) -> Result<bool> {
        if self.new_line {
            return Ok(false);
        }
        self.got(tok)
    }

    pub(crate) fn eof(&mut self) -> Result<bool> {
        self.skip_comments()?;
        Ok(self.cur.tok == Token::Eof)
    }
}
