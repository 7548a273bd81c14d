//! Simple Command Parser
//!
//! Handles assignments, redirections, plain commands and function
//! declarations.

use std::io::Read;

use lazy_static::lazy_static;
use regex_lite::Regex;

use crate::ast::types::{Assign, Command, FuncDecl, Lit, Node, Pos, Redirect, Stmt, Word, WordPart};
use crate::parser::heredoc::PendingHeredoc;
use crate::parser::parser::Parser;
use crate::parser::token::Token;
use crate::parser::types::{ParseError, Result};

lazy_static! {
    static ref IDENT_RE: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();
}

pub fn is_identifier(s: &str) -> bool {
    IDENT_RE.is_match(s)
}

impl<R: Read> Parser<R> {
    // =========================================================================
    // ASSIGNMENTS
    // =========================================================================

    /// Byte index of the `=` when the current literal starts an assignment.
    pub(crate) fn assign_split(&mut self) -> Result<Option<usize>> {
        if !self.peek(Token::Lit)? {
            return Ok(None);
        }
        let Some(i) = self.cur.val.find('=') else {
            return Ok(None);
        };
        Ok(is_identifier(&self.cur.val[..i]).then_some(i))
    }

    pub(crate) fn assign(&mut self, i: usize) -> Result<Assign> {
        let pos = self.cur.pos;
        let name = Lit::new(pos, &self.cur.val[..i]);
        let rest = &self.cur.val[i + 1..];
        let mut parts = Vec::new();
        if !rest.is_empty() {
            let start = Pos::new(pos.line, pos.column + i + 1);
            parts.push(WordPart::Lit(Lit::new(start, rest)));
        }
        self.next()?;
        if !self.spaced {
            if let Some(word) = self.got_word()? {
                parts.extend(word.parts);
            }
        }
        let value = if parts.is_empty() {
            None
        } else {
            Some(Word { parts })
        };
        Ok(Assign { name, value })
    }

    // =========================================================================
    // REDIRECTIONS
    // =========================================================================

    pub(crate) fn peek_redir(&mut self) -> Result<bool> {
        if self.peek(Token::Lit)? {
            // a file descriptor number glued to the operator, as in 2>err
            let digits = !self.cur.val.is_empty() && self.cur.val.bytes().all(|b| b.is_ascii_digit());
            return Ok(digits && self.reader.peek_any(b"<>"));
        }
        Ok(self.cur.tok.is_redirect())
    }

    pub(crate) fn redirect(&mut self) -> Result<Redirect> {
        let n = if self.got(Token::Lit)? {
            Some(Lit::new(self.prev.pos, self.prev.val.clone()))
        } else {
            None
        };
        let op = self.cur.tok;
        let op_pos = self.cur.pos;
        let word = match op {
            Token::Heredoc | Token::DHeredoc => self.heredoc_word(op, op_pos)?,
            _ => {
                self.next()?;
                self.want_follow_word(op.as_str())?
            }
        };
        Ok(Redirect { n, op, op_pos, word })
    }

    /// The delimiter word of a here-document. The rest of the line is still
    /// parsed normally; the body is read once the line ends.
    fn heredoc_word(&mut self, op: Token, op_pos: Pos) -> Result<Word> {
        self.reader.start_capture();
        self.stop_newline = true;
        self.next()?;
        let start = self.cur.start;
        let word = self.want_follow_word(op.as_str())?;
        let end = self.cur.blank_start;
        self.stop_newline = false;
        let raw = self.reader.finish_capture(start, end);
        self.heredocs.push(PendingHeredoc {
            op_pos,
            word_pos: word.pos(),
            raw,
            strip_tabs: op == Token::DHeredoc,
        });
        self.got(Token::Stopped)?;
        Ok(word)
    }

    // =========================================================================
    // COMMANDS
    // =========================================================================

    /// A simple command, or a function declaration if the first word is
    /// followed by `()` or preceded by `function`. Redirects among the
    /// words go to `s`.
    pub(crate) fn cmd_or_func(&mut self, s: &mut Stmt) -> Result<Node> {
        if self.got(Token::Function)? {
            let fpos = self.prev.pos;
            let w = self.want_follow_word(Token::Function.as_str())?;
            if self.got_same_line(Token::LParen)? {
                self.want_follow(w.pos(), "foo(", Token::RParen)?;
            }
            return self.func_decl(w, fpos, true);
        }
        let Some(w) = self.got_word()? else {
            return Err(self.syntax_err(self.cur.pos, "a command can only contain words and redirects"));
        };
        if self.got_same_line(Token::LParen)? {
            self.want_follow(w.pos(), "foo(", Token::RParen)?;
            let pos = w.pos();
            return self.func_decl(w, pos, false);
        }
        let mut args = vec![w];
        while !self.peek_stop()? {
            if self.peek_redir()? {
                let redirect = self.redirect()?;
                s.redirects.push(redirect);
            } else if let Some(w) = self.got_word()? {
                args.push(w);
            } else {
                return Err(self.syntax_err(
                    self.cur.pos,
                    "a command can only contain words and redirects",
                ));
            }
        }
        Ok(Node::Command(Command { args }))
    }

    fn func_decl(&mut self, w: Word, pos: Pos, bash_style: bool) -> Result<Node> {
        let name = match w.lit() {
            Some(name) if is_identifier(name) => Lit::new(w.pos(), name),
            _ => {
                return Err(ParseError::InvalidIdentifier {
                    at: self.position(pos),
                    what: "func name",
                    name: lit_spelling(&w),
                })
            }
        };
        let body = self.want_follow_stmt(pos, "foo()")?;
        Ok(Node::FuncDecl(FuncDecl {
            pos,
            bash_style,
            name,
            body: Box::new(body),
        }))
    }

    /// Words up to the end of the line or a `;`, which is consumed.
    pub(crate) fn word_list(&mut self) -> Result<Vec<Word>> {
        let mut words = Vec::new();
        while !self.peek_end()? {
            match self.got_word()? {
                Some(w) => words.push(w),
                None => {
                    return Err(self.syntax_err(self.cur.pos, "word list can only contain words"))
                }
            }
        }
        self.got_same_line(Token::Semicolon)?;
        Ok(words)
    }
}

/// Literal text of a word for messages; expansions are left out.
fn lit_spelling(w: &Word) -> String {
    w.parts
        .iter()
        .map(|part| match part {
            WordPart::Lit(l) => l.value.as_str(),
            WordPart::SglQuoted(q) => q.value.as_str(),
            _ => "",
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;
    use pretty_assertions::assert_eq;

    fn first(src: &str) -> Stmt {
        let mut file = parse_str(src, "").unwrap();
        assert_eq!(file.stmts.len(), 1, "input {src:?}");
        file.stmts.remove(0)
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("foo_1"));
        assert!(is_identifier("_"));
        assert!(!is_identifier("1foo"));
        assert!(!is_identifier("foo-bar"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_parse_assignments() {
        let s = first("a=1 b= c=$x d");
        assert_eq!(s.assigns.len(), 3);
        assert_eq!(s.assigns[0].name.value, "a");
        assert_eq!(s.assigns[0].value.as_ref().and_then(Word::lit), Some("1"));
        assert_eq!(s.assigns[0].value.as_ref().map(Word::pos), Some(Pos::new(1, 3)));
        assert!(s.assigns[1].value.is_none());
        let c = s.assigns[2].value.as_ref().unwrap();
        assert!(matches!(c.parts[0], WordPart::ParamExp(_)));
        assert!(matches!(s.node, Some(Node::Command(_))));
    }

    #[test]
    fn test_parse_assignment_only() {
        let s = first("FOO=bar");
        assert!(s.node.is_none());
        assert_eq!(s.assigns.len(), 1);
    }

    #[test]
    fn test_parse_reserved_prefix_is_assignment() {
        let s = first("iffy=1");
        assert!(s.node.is_none());
        assert_eq!(s.assigns[0].name.value, "iffy");
    }

    #[test]
    fn test_parse_not_an_assignment() {
        let s = first("echo a=b");
        assert!(s.assigns.is_empty());
        let s = first("1a=b");
        assert!(s.assigns.is_empty());
    }

    #[test]
    fn test_parse_redirects() {
        let s = first("cmd <in >out 2>>err >&2");
        assert_eq!(s.redirects.len(), 4);
        let ops: Vec<Token> = s.redirects.iter().map(|r| r.op).collect();
        assert_eq!(ops, vec![Token::Less, Token::Great, Token::Append, Token::DplOut]);
        assert_eq!(s.redirects[2].n.as_ref().map(|n| n.value.as_str()), Some("2"));
        assert_eq!(s.redirects[2].word.lit(), Some("err"));
        assert!(s.redirects[0].n.is_none());
    }

    #[test]
    fn test_parse_fd_needs_digits() {
        let s = first("foo>bar");
        assert!(s.redirects[0].n.is_none());
        match &s.node {
            Some(Node::Command(c)) => assert_eq!(c.args[0].lit(), Some("foo")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_redirect_only() {
        let s = first(">out");
        assert!(s.node.is_none());
        assert_eq!(s.redirects.len(), 1);
    }

    #[test]
    fn test_parse_redirect_before_command() {
        let s = first("<in cat");
        assert_eq!(s.redirects.len(), 1);
        assert!(matches!(s.node, Some(Node::Command(_))));
    }

    #[test]
    fn test_parse_redirect_missing_word() {
        let err = parse_str("echo >", "").unwrap_err();
        assert_eq!(err.to_string(), "1:6: > must be followed by a word");
    }

    #[test]
    fn test_parse_func_decls() {
        let s = first("foo() { bar; }");
        match &s.node {
            Some(Node::FuncDecl(fd)) => {
                assert_eq!(fd.name.value, "foo");
                assert!(!fd.bash_style);
                assert!(matches!(fd.body.node, Some(Node::Block(_))));
            }
            other => panic!("unexpected {other:?}"),
        }

        let s = first("function foo { bar; }");
        match &s.node {
            Some(Node::FuncDecl(fd)) => {
                assert!(fd.bash_style);
                assert_eq!(fd.pos, Pos::new(1, 1));
                assert_eq!(fd.name.pos, Pos::new(1, 10));
            }
            other => panic!("unexpected {other:?}"),
        }

        let s = first("function foo() bar");
        assert!(matches!(s.node, Some(Node::FuncDecl(_))));
    }

    #[test]
    fn test_parse_func_decl_errors() {
        let err = parse_str("foo-bar() { a; }", "").unwrap_err();
        assert_eq!(err.to_string(), "1:1: invalid func name: foo-bar");
        let err = parse_str("foo(", "").unwrap_err();
        assert_eq!(err.to_string(), "1:1: \"foo(\" must be followed by \")\"");
        let err = parse_str("foo()", "").unwrap_err();
        assert_eq!(err.to_string(), "1:1: \"foo()\" must be followed by a statement");
    }

    #[test]
    fn test_parse_command_rejects_stray_paren() {
        let err = parse_str("echo a (", "").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }
}
