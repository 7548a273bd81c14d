//! Compound Command Parser
//!
//! Handles parsing of compound commands: if, while, until, for, case,
//! subshell, block. Each is entered after its opening keyword or brace has
//! been seen, and a missing closing keyword is reported at the opening one.

use std::io::Read;

use crate::ast::types::{
    Block, CaseStmt, Elif, ForStmt, IfStmt, Lit, Node, PatternList, Subshell, UntilStmt,
    WhileStmt,
};
use crate::parser::command_parser::is_identifier;
use crate::parser::lexer::Stop;
use crate::parser::parser::Parser;
use crate::parser::token::Token;
use crate::parser::types::{ParseError, Result};

impl<R: Read> Parser<R> {
    /// Parse a subshell, starting at its `(`
    pub(crate) fn subshell(&mut self) -> Result<Node> {
        let lparen = self.cur.pos;
        let stmts = self.stmts_nested(Stop::Paren)?;
        let rparen = self.want_matched(lparen, Token::LParen, Token::RParen)?;
        Ok(Node::Subshell(Subshell { lparen, rparen, stmts }))
    }

    /// Parse a block after its `{`
    pub(crate) fn block(&mut self) -> Result<Node> {
        let lbrace = self.prev.pos;
        let stmts = self.stmts(&[Token::RBrace])?;
        let rbrace = self.want_matched(lbrace, Token::LBrace, Token::RBrace)?;
        Ok(Node::Block(Block { lbrace, rbrace, stmts }))
    }

    /// Parse an if statement after `if`
    pub(crate) fn if_stmt(&mut self) -> Result<Node> {
        let if_pos = self.prev.pos;
        let conds = self.want_follow_stmts(Token::If, &[Token::Then])?;
        self.want_follow(if_pos, "if [stmts]", Token::Then)?;
        let then_stmts = self.want_follow_stmts(Token::Then, &[Token::Fi, Token::Elif, Token::Else])?;

        let mut elifs = Vec::new();
        while self.got(Token::Elif)? {
            let elif_pos = self.prev.pos;
            let conds = self.want_follow_stmts(Token::Elif, &[Token::Then])?;
            self.want_follow(elif_pos, "elif [stmts]", Token::Then)?;
            let then_stmts =
                self.want_follow_stmts(Token::Then, &[Token::Fi, Token::Elif, Token::Else])?;
            elifs.push(Elif {
                elif_pos,
                conds,
                then_stmts,
            });
        }

        let else_stmts = if self.got(Token::Else)? {
            self.want_follow_stmts(Token::Else, &[Token::Fi])?
        } else {
            Vec::new()
        };
        let fi_pos = self.want_stmt_end(if_pos, Token::If, Token::Fi)?;
        Ok(Node::If(IfStmt {
            if_pos,
            fi_pos,
            conds,
            then_stmts,
            elifs,
            else_stmts,
        }))
    }

    /// Parse a while loop after `while`
    pub(crate) fn while_stmt(&mut self) -> Result<Node> {
        let while_pos = self.prev.pos;
        let conds = self.want_follow_stmts(Token::While, &[Token::Do])?;
        self.want_follow(while_pos, "while [stmts]", Token::Do)?;
        let do_stmts = self.want_follow_stmts(Token::Do, &[Token::Done])?;
        let done_pos = self.want_stmt_end(while_pos, Token::While, Token::Done)?;
        Ok(Node::While(WhileStmt {
            while_pos,
            done_pos,
            conds,
            do_stmts,
        }))
    }

    /// Parse an until loop after `until`
    pub(crate) fn until_stmt(&mut self) -> Result<Node> {
        let until_pos = self.prev.pos;
        let conds = self.want_follow_stmts(Token::Until, &[Token::Do])?;
        self.want_follow(until_pos, "until [stmts]", Token::Do)?;
        let do_stmts = self.want_follow_stmts(Token::Do, &[Token::Done])?;
        let done_pos = self.want_stmt_end(until_pos, Token::Until, Token::Done)?;
        Ok(Node::Until(UntilStmt {
            until_pos,
            done_pos,
            conds,
            do_stmts,
        }))
    }

    /// Parse a for loop after `for`
    pub(crate) fn for_stmt(&mut self) -> Result<Node> {
        let for_pos = self.prev.pos;
        if !self.got(Token::Lit)? {
            return Err(self.follow_err(for_pos, Token::For.as_str(), "a literal"));
        }
        let name = Lit::new(self.prev.pos, self.prev.val.clone());
        if !is_identifier(&name.value) {
            return Err(ParseError::InvalidIdentifier {
                at: self.position(name.pos),
                what: "for name",
                name: name.value,
            });
        }

        let word_list = if self.got(Token::In)? {
            self.word_list()?
        } else {
            if !self.got_same_line(Token::Semicolon)? && !self.new_line {
                return Err(self.follow_err(for_pos, "for foo", r#""in", ; or a newline"#));
            }
            Vec::new()
        };

        self.want_follow(for_pos, "for foo [in words]", Token::Do)?;
        let do_stmts = self.want_follow_stmts(Token::Do, &[Token::Done])?;
        let done_pos = self.want_stmt_end(for_pos, Token::For, Token::Done)?;
        Ok(Node::For(ForStmt {
            for_pos,
            done_pos,
            name,
            word_list,
            do_stmts,
        }))
    }

    /// Parse a case statement after `case`
    pub(crate) fn case_stmt(&mut self) -> Result<Node> {
        let case_pos = self.prev.pos;
        let word = self.want_follow_word(Token::Case.as_str())?;
        self.want_follow(case_pos, "case x", Token::In)?;
        let pattern_lists = self.pat_lists()?;
        let esac_pos = self.want_stmt_end(case_pos, Token::Case, Token::Esac)?;
        Ok(Node::Case(CaseStmt {
            case_pos,
            esac_pos,
            word,
            pattern_lists,
        }))
    }

    fn pat_lists(&mut self) -> Result<Vec<PatternList>> {
        let mut lists = Vec::new();
        if self.got_same_line(Token::Semicolon)? {
            return Ok(lists);
        }
        while !self.eof()? && !self.peek(Token::Esac)? {
            // optional leading paren
            self.got(Token::LParen)?;
            let mut patterns = Vec::new();
            while !self.eof()? {
                let Some(w) = self.got_word()? else {
                    return Err(self.syntax_err(self.cur.pos, "case patterns must consist of words"));
                };
                patterns.push(w);
                if self.peek(Token::RParen)? {
                    break;
                }
                if !self.got(Token::Or)? {
                    return Err(self.syntax_err(self.cur.pos, "case patterns must be separated with |"));
                }
            }
            // entering the item consumes the `)`
            let stmts = self.stmts_nested(Stop::CaseItem)?;
            lists.push(PatternList { patterns, stmts });
            if !self.got(Token::DSemicolon)? {
                break;
            }
        }
        Ok(lists)
    }
}
