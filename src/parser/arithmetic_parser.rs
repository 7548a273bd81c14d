//! Arithmetic Expression Parser
//!
//! Parses the inside of `$(( ... ))`. There is no precedence table: an
//! operand is read, and if an operator follows, everything after it is
//! parsed as the right-hand side. `1*2+3` therefore groups as `1*(2+3)`.
//!
//!   expr    ::= operand [binop expr]
//!   operand ::= ( expr ) [++|--] | + expr | - expr | word [++|--]

use std::io::Read;

use crate::ast::types::{ArithmExpr, BinaryArithm, ParenArithm, UnaryArithm};
use crate::parser::parser::Parser;
use crate::parser::token::Token;
use crate::parser::types::Result;

impl<R: Read> Parser<R> {
    /// An expression, or `None` if the arithmetic expansion or paren ends
    /// right away. `following` names what came before, for messages.
    ///
    /// Operands and operators are collected left to right and folded from
    /// the right, so only parens and prefix operators add nesting.
    pub(crate) fn arithm_expr(&mut self, following: &str) -> Result<Option<ArithmExpr>> {
        if self.eof()? || self.peek_arithm_end()? {
            return Ok(None);
        }
        let mut chain = Vec::new();
        let mut following = following;
        let last = loop {
            let left = self.arithm_operand(following)?;
            if self.eof()? || self.peek(Token::RParen)? {
                break left;
            }

            let op = self.cur.tok;
            let op_pos = self.cur.pos;
            if !op.is_arithm_binary() {
                return Err(self.syntax_err(
                    op_pos,
                    format!("not a valid arithmetic operator: {}", self.found()),
                ));
            }
            self.next()?;
            if self.eof()? || self.peek_arithm_end()? {
                return Err(self.follow_err(op_pos, op.as_str(), "an expression"));
            }
            chain.push((left, op, op_pos));
            following = op.as_str();
        };

        let mut y = last;
        while let Some((x, op, op_pos)) = chain.pop() {
            y = ArithmExpr::Binary(Box::new(BinaryArithm { op_pos, op, x, y }));
        }
        Ok(Some(y))
    }

    /// A parenthesized expression, a prefix operator applied to the rest of
    /// the expression, or a word; then an optional postfix `++`/`--`.
    fn arithm_operand(&mut self, following: &str) -> Result<ArithmExpr> {
        let mut x = if self.got(Token::LParen)? {
            let lparen = self.prev.pos;
            let x = if self.peek(Token::RParen)? {
                None
            } else {
                self.nested(|p| p.arithm_expr(Token::LParen.as_str()))?
            };
            let Some(x) = x else {
                return Err(self.syntax_err(lparen, "parentheses must enclose an expression"));
            };
            let rparen = self.want_matched(lparen, Token::LParen, Token::RParen)?;
            ArithmExpr::Paren(Box::new(ParenArithm { lparen, rparen, x }))
        } else if self.got(Token::Add)? || self.got(Token::Sub)? {
            let op = self.prev.tok;
            let op_pos = self.prev.pos;
            let Some(x) = self.nested(|p| p.arithm_expr(op.as_str()))? else {
                return Err(self.follow_err(op_pos, op.as_str(), "an expression"));
            };
            ArithmExpr::Unary(Box::new(UnaryArithm {
                op_pos,
                op,
                post: false,
                x,
            }))
        } else {
            ArithmExpr::Word(self.want_follow_word(following)?)
        };

        if self.got(Token::Inc)? || self.got(Token::Dec)? {
            x = ArithmExpr::Unary(Box::new(UnaryArithm {
                op_pos: self.prev.pos,
                op: self.prev.tok,
                post: true,
                x,
            }));
        }
        Ok(x)
    }

    /// At the `))` closing an arithmetic expansion.
    pub(crate) fn peek_arithm_end(&mut self) -> Result<bool> {
        Ok(self.peek(Token::RParen)? && self.reader.peek_any(b")"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::types::{Node, Pos, WordPart};
    use crate::parser::parse_str;
    use crate::parser::types::ParseError;
    use pretty_assertions::assert_eq;

    fn arithm(src: &str) -> Option<ArithmExpr> {
        let file = parse_str(&format!("echo $(({src}))"), "").unwrap();
        let Some(Node::Command(cmd)) = &file.stmts[0].node else {
            panic!("unexpected {:?}", file.stmts[0]);
        };
        match &cmd.args[1].parts[0] {
            WordPart::ArithmExp(ae) => ae.x.clone(),
            other => panic!("unexpected {other:?}"),
        }
    }

    /// Render the tree with explicit grouping.
    fn shape(x: &ArithmExpr) -> String {
        match x {
            ArithmExpr::Word(w) => match &w.parts[0] {
                WordPart::Lit(l) => l.value.clone(),
                WordPart::ParamExp(pe) => format!("${}", pe.param.value),
                other => format!("{other:?}"),
            },
            ArithmExpr::Unary(u) if u.post => format!("({}{})", shape(&u.x), u.op),
            ArithmExpr::Unary(u) => format!("({}{})", u.op, shape(&u.x)),
            ArithmExpr::Paren(p) => format!("[{}]", shape(&p.x)),
            ArithmExpr::Binary(b) => format!("({} {} {})", shape(&b.x), b.op, shape(&b.y)),
        }
    }

    fn parse_shape(src: &str) -> String {
        shape(&arithm(src).unwrap())
    }

    #[test]
    fn test_parse_operand() {
        assert_eq!(parse_shape("1"), "1");
        assert_eq!(parse_shape(" 42 "), "42");
        assert_eq!(parse_shape("$a"), "$a");
    }

    #[test]
    fn test_parse_empty() {
        assert!(arithm("").is_none());
        assert!(arithm("  ").is_none());
    }

    #[test]
    fn test_parse_right_recursive_shape() {
        assert_eq!(parse_shape("1+2"), "(1 + 2)");
        assert_eq!(parse_shape("1*2+3"), "(1 * (2 + 3))");
        assert_eq!(parse_shape("1 - 2 - 3"), "(1 - (2 - 3))");
    }

    #[test]
    fn test_parse_operators() {
        for op in ["+", "-", "*", "/", "%", "^", "<", ">", "<=", ">=", "==", "!=", "<<", ">>", "&", "|", "&&", "||", "="] {
            assert_eq!(parse_shape(&format!("a {op} b")), format!("(a {op} b)"), "op {op}");
        }
    }

    #[test]
    fn test_parse_long_flat_expression() {
        let n = 500;
        let terms: Vec<String> = (0..n).map(|i| i.to_string()).collect();
        let x = arithm(&terms.join(" + ")).unwrap();
        let mut seen = Vec::new();
        let mut cur = &x;
        while let ArithmExpr::Binary(b) = cur {
            assert_eq!(b.op, Token::Add);
            seen.push(shape(&b.x));
            cur = &b.y;
        }
        seen.push(shape(cur));
        assert_eq!(seen, terms);
    }

    #[test]
    fn test_parse_nested_parens_hit_depth_limit() {
        let src = format!("echo $(( {}1{} ))", "(".repeat(150), ")".repeat(150));
        let err = parse_str(&src, "").unwrap_err();
        assert!(matches!(err, ParseError::NestingTooDeep { limit: 100, .. }));
    }

    #[test]
    fn test_parse_unary_and_postfix() {
        assert_eq!(parse_shape("-1"), "(-1)");
        assert_eq!(parse_shape("+-a"), "(+(-a))");
        assert_eq!(parse_shape("a++"), "(a++)");
        assert_eq!(parse_shape("a-- + 1"), "((a--) + 1)");
    }

    #[test]
    fn test_parse_parens() {
        assert_eq!(parse_shape("(1+2)*3"), "([(1 + 2)] * 3)");
        let Some(ArithmExpr::Paren(p)) = arithm("(1)") else {
            panic!("expected a paren");
        };
        assert_eq!(p.lparen, Pos::new(1, 9));
        assert_eq!(p.rparen, Pos::new(1, 11));
    }

    #[test]
    fn test_parse_arithm_exp_positions() {
        let file = parse_str("echo $((1))", "").unwrap();
        let Some(Node::Command(cmd)) = &file.stmts[0].node else {
            panic!("unexpected {:?}", file.stmts[0]);
        };
        let WordPart::ArithmExp(ae) = &cmd.args[1].parts[0] else {
            panic!("unexpected {:?}", cmd.args[1]);
        };
        assert_eq!(ae.dollar, Pos::new(1, 6));
        assert_eq!(ae.rparen, Pos::new(1, 10));
    }

    #[test]
    fn test_parse_arithm_errors() {
        let err = parse_str("echo $(( () ))", "").unwrap_err();
        assert_eq!(err.to_string(), "1:10: parentheses must enclose an expression");
        let err = parse_str("echo $((1 +))", "").unwrap_err();
        assert_eq!(err.to_string(), "1:11: + must be followed by an expression");
        let err = parse_str("echo $((1 2))", "").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
        let err = parse_str("echo $((1", "").unwrap_err();
        assert_eq!(err.to_string(), "1:7: reached EOF without matching token (( with ))");
    }
}
