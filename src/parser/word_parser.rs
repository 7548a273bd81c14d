//! Word Parser
//!
//! A word is a run of adjacent parts: literals, quoted strings, parameter
//! expansions, command substitutions and arithmetic expansions. Parts that
//! contain statements re-enter the statement parser.

use std::io::Read;

use crate::ast::types::{
    ArithmExp, CmdSubst, DblQuoted, Expansion, Lit, ParamExp, Pos, SglQuoted, Word, WordPart,
};
use crate::parser::lexer::Stop;
use crate::parser::parser::Parser;
use crate::parser::token::Token;
use crate::parser::types::{ParseError, Result};

impl<R: Read> Parser<R> {
    /// A word starting at the current token, or `None` when no part does.
    pub(crate) fn got_word(&mut self) -> Result<Option<Word>> {
        let parts = self.read_parts()?;
        Ok(if parts.is_empty() {
            None
        } else {
            Some(Word { parts })
        })
    }

    pub(crate) fn want_follow_word(&mut self, left: &str) -> Result<Word> {
        match self.got_word()? {
            Some(w) => Ok(w),
            None => Err(self.follow_err(self.prev.pos, left, "a word")),
        }
    }

    fn read_parts(&mut self) -> Result<Vec<WordPart>> {
        let mut parts = Vec::new();
        while let Some(part) = self.word_part()? {
            parts.push(part);
            // only adjacent parts join
            if self.spaced {
                break;
            }
        }
        Ok(parts)
    }

    fn word_part(&mut self) -> Result<Option<WordPart>> {
        self.nested(|p| p.word_part_inner())
    }

    fn word_part_inner(&mut self) -> Result<Option<WordPart>> {
        if self.peek(Token::Dollar)? {
            if self.dollar_is_lit() {
                self.next()?;
                return Ok(Some(self.prev_lit()));
            }
            return self.dollar().map(Some);
        }
        if self.got(Token::Lit)? {
            return Ok(Some(self.prev_lit()));
        }
        if self.peek(Token::SglQuote)? {
            return self.sgl_quoted().map(Some);
        }
        if !self.quoted(Stop::DblQuote) && self.peek(Token::DblQuote)? {
            let quote = self.cur.pos;
            self.enter_stop(Stop::DblQuote)?;
            let parts = self.read_parts()?;
            self.pop_stop();
            self.want_quote(quote, Token::DblQuote)?;
            return Ok(Some(WordPart::DblQuoted(DblQuoted { quote, parts })));
        }
        if !self.quoted(Stop::Backquote) && self.peek(Token::Backquote)? {
            let left = self.cur.pos;
            let stmts = self.stmts_nested(Stop::Backquote)?;
            self.want_quote(left, Token::Backquote)?;
            return Ok(Some(WordPart::CmdSubst(CmdSubst {
                backquoted: true,
                left,
                right: self.prev.pos,
                stmts,
            })));
        }
        Ok(None)
    }

    fn prev_lit(&self) -> WordPart {
        WordPart::Lit(Lit::new(self.prev.pos, self.prev.val.clone()))
    }

    /// A `$` that starts nothing is just a character.
    fn dollar_is_lit(&mut self) -> bool {
        if self.reader.peek_any(b"(") {
            return false;
        }
        if self.reader.peek_any(b"'\"`") || self.peek_spaced() {
            return true;
        }
        let in_param = self.quoted(Stop::ParamOp) || self.quoted(Stop::ParamClose);
        in_param && self.reader.peek_any(b"}")
    }

    fn sgl_quoted(&mut self) -> Result<WordPart> {
        let quote = self.cur.pos;
        let (bytes, found) = self.reader.read_until(b"'");
        if !found {
            if let Some(source) = self.reader.take_error() {
                return Err(ParseError::Io {
                    at: self.position(self.reader.pos()),
                    source,
                });
            }
            return Err(ParseError::UnclosedQuote {
                at: self.position(quote),
                found: Token::Eof.as_str().to_string(),
                quote: Token::SglQuote.as_str(),
            });
        }
        self.reader.read_only(b"'");
        self.next()?;
        Ok(WordPart::SglQuoted(SglQuoted {
            quote,
            value: String::from_utf8_lossy(&bytes).into_owned(),
        }))
    }

    // =========================================================================
    // DOLLAR EXPANSIONS
    // =========================================================================

    fn dollar(&mut self) -> Result<WordPart> {
        let dpos = self.cur.pos;
        if self.reader.peek_any(b"{") {
            return self.param_exp(dpos);
        }
        let hash_pos = self.reader.pos();
        if self.reader.read_only(b"#") {
            self.shift_tok(Token::Hash, hash_pos);
        } else {
            self.next()?;
        }
        let lpos = self.cur.pos;
        if self.peek(Token::LParen)? && self.reader.read_only(b"(") {
            return self.arithm_exp(dpos, lpos);
        }
        if self.peek(Token::LParen)? {
            let stmts = self.stmts_nested(Stop::Paren)?;
            let right = self.want_matched(lpos, Token::LParen, Token::RParen)?;
            return Ok(WordPart::CmdSubst(CmdSubst {
                backquoted: false,
                left: dpos,
                right,
                stmts,
            }));
        }
        self.next()?;
        Ok(WordPart::ParamExp(ParamExp {
            dollar: dpos,
            short: true,
            length: false,
            param: Lit::new(self.prev.pos, self.prev.val.clone()),
            exp: None,
        }))
    }

    /// `$((` has been read; the second paren is consumed.
    fn arithm_exp(&mut self, dollar: Pos, lpos: Pos) -> Result<WordPart> {
        self.enter_stop(Stop::Arithm)?;
        let x = self.arithm_expr("((")?;
        if !self.peek_arithm_end()? {
            return Err(self.matching_err(lpos, "((", "))"));
        }
        let rparen = self.cur.pos;
        self.reader.read_only(b")");
        self.pop_stop();
        self.next()?;
        Ok(WordPart::ArithmExp(ArithmExp { dollar, rparen, x }))
    }

    fn param_exp(&mut self, dollar: Pos) -> Result<WordPart> {
        let lpos = self.reader.pos();
        self.reader.read_only(b"{");
        self.enter_stop(Stop::ParamOp)?;
        let mut length = self.got(Token::Hash)?;
        let param = match self.got_param_lit()? {
            Some(param) => param,
            // ${#} is the number of positional parameters
            None if length && self.peek(Token::RBrace)? => {
                length = false;
                Lit::new(self.prev.pos, Token::Hash.as_str())
            }
            None => {
                return Err(self.syntax_err(dollar, "parameter expansion requires a literal"));
            }
        };
        if self.peek(Token::RBrace)? {
            self.pop_stop();
            self.next()?;
            return Ok(WordPart::ParamExp(ParamExp {
                dollar,
                short: false,
                length,
                param,
                exp: None,
            }));
        }
        if length {
            return Err(self.syntax_err(dollar, r#"string lengths must be like "${#foo}""#));
        }
        let op = self.cur.tok;
        if !op.is_param_op() {
            return Err(self.matching_err(lpos, "{", "}"));
        }
        self.pop_stop();
        self.enter_stop(Stop::ParamClose)?;
        let word = self.got_word()?;
        self.pop_stop();
        if !self.got(Token::RBrace)? {
            return Err(self.matching_err(lpos, "{", "}"));
        }
        Ok(WordPart::ParamExp(ParamExp {
            dollar,
            short: false,
            length: false,
            param,
            exp: Some(Expansion { op, word }),
        }))
    }

    fn got_param_lit(&mut self) -> Result<Option<Lit>> {
        if self.got(Token::Lit)? || self.got(Token::Dollar)? || self.got(Token::Quest)? {
            return Ok(Some(Lit::new(self.prev.pos, self.prev.val.clone())));
        }
        Ok(None)
    }
}
