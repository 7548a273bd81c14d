//! Here-document bodies
//!
//! A `<<` or `<<-` redirect only records its delimiter while the line is
//! parsed. The bodies are read raw, in order, as soon as the line's newline
//! is consumed, and written into the redirect words once the tree is built.

use std::io::Read;

use log::trace;

use crate::ast::types::{Lit, Pos, Stmt, Word, WordPart};
use crate::ast::walk::walk_redirects_mut;
use crate::parser::parser::Parser;
use crate::parser::types::{ParseError, Result};

/// A here-document whose body has not been read yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingHeredoc {
    pub op_pos: Pos,
    pub word_pos: Pos,
    /// Source spelling of the delimiter word
    pub raw: String,
    pub strip_tabs: bool,
}

impl<R: Read> Parser<R> {
    /// Read the bodies of all pending here-documents. The input is right
    /// after the newline that ended their line.
    pub(crate) fn do_heredocs(&mut self) -> Result<()> {
        for hd in std::mem::take(&mut self.heredocs) {
            let end = unquote_delimiter(&hd.raw);
            trace!("reading here-document body until {end:?}");
            let (mut lines, closed) = self.read_heredoc_content(&end, hd.strip_tabs)?;
            if !closed {
                lines.push(end.clone());
                if self.truncated.is_none() {
                    self.truncated = Some(ParseError::UnclosedHeredoc {
                        at: self.position(hd.op_pos),
                        delimiter: end,
                    });
                }
            }
            let value = format!("{}\n{}", hd.raw, lines.join("\n"));
            self.resolved.push((hd.op_pos, Lit::new(hd.word_pos, value)));
        }
        Ok(())
    }

    /// Lines up to the end marker, which is consumed but not returned. The
    /// flag is false when the input ended first.
    fn read_heredoc_content(&mut self, end: &str, strip_tabs: bool) -> Result<(Vec<String>, bool)> {
        let mut lines = Vec::new();
        while self.reader.peek_byte().is_some() {
            let (bytes, _) = self.reader.read_until(b"\n");
            self.reader.read_only(b"\n");
            let mut line = String::from_utf8_lossy(&bytes).into_owned();
            if strip_tabs {
                line = line.trim_start_matches('\t').to_string();
            }
            if line == end {
                return Ok((lines, true));
            }
            lines.push(line);
        }
        if let Some(source) = self.reader.take_error() {
            return Err(ParseError::Io {
                at: self.position(self.reader.pos()),
                source,
            });
        }
        Ok((lines, false))
    }

    /// Replace each here-document word with its delimiter and body.
    pub(crate) fn fill_heredocs(&mut self, stmts: &mut [Stmt]) {
        if self.resolved.is_empty() {
            return;
        }
        let resolved = &mut self.resolved;
        walk_redirects_mut(stmts, &mut |redirect| {
            if !redirect.is_heredoc() {
                return;
            }
            if let Some(i) = resolved.iter().position(|(pos, _)| *pos == redirect.op_pos) {
                let (_, lit) = resolved.swap_remove(i);
                redirect.word = Word {
                    parts: vec![WordPart::Lit(lit)],
                };
            }
        });
    }
}

/// The end marker for a delimiter spelling: quotes and backslashes removed.
pub fn unquote_delimiter(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;

    for c in raw.chars() {
        if escaped {
            out.push(c);
            escaped = false;
            continue;
        }
        if in_single {
            if c == '\'' {
                in_single = false;
            } else {
                out.push(c);
            }
            continue;
        }
        match c {
            '\\' => escaped = true,
            '\'' if !in_double => in_single = true,
            '"' => in_double = !in_double,
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::types::Redirect;
    use crate::parser::parse_str;
    use pretty_assertions::assert_eq;

    fn heredocs(src: &str) -> Vec<Redirect> {
        let mut file = parse_str(src, "").unwrap();
        let mut out = Vec::new();
        walk_redirects_mut(&mut file.stmts, &mut |r| {
            if r.is_heredoc() {
                out.push(r.clone());
            }
        });
        out
    }

    fn body(r: &Redirect) -> &str {
        r.word.lit().unwrap()
    }

    #[test]
    fn test_unquote_delimiter() {
        assert_eq!(unquote_delimiter("EOF"), "EOF");
        assert_eq!(unquote_delimiter("'EOF'"), "EOF");
        assert_eq!(unquote_delimiter("\"E\"O\\F"), "EOF");
        assert_eq!(unquote_delimiter("'a\\b'"), "a\\b");
        assert_eq!(unquote_delimiter("\"it's\""), "it's");
    }

    #[test]
    fn test_heredoc_body() {
        let hds = heredocs("cat <<EOF\nhello\nEOF\n");
        assert_eq!(hds.len(), 1);
        assert_eq!(body(&hds[0]), "EOF\nhello");
        assert_eq!(hds[0].op_pos, Pos::new(1, 5));
        assert_eq!(hds[0].word.pos(), Pos::new(1, 7));
    }

    #[test]
    fn test_heredoc_body_keeps_lines_verbatim() {
        let hds = heredocs("cat <<EOF\n  $x 'y'\n\n# not a comment\nEOF");
        assert_eq!(body(&hds[0]), "EOF\n  $x 'y'\n\n# not a comment");
    }

    #[test]
    fn test_heredoc_quoted_delimiter() {
        let hds = heredocs("cat <<'EOF'\n$x\nEOF\n");
        assert_eq!(body(&hds[0]), "'EOF'\n$x");
    }

    #[test]
    fn test_heredoc_strip_tabs() {
        let hds = heredocs("cat <<-EOF\n\thello\n\t\tworld\n\tEOF\n");
        assert_eq!(hds[0].op, crate::parser::Token::DHeredoc);
        assert_eq!(body(&hds[0]), "EOF\nhello\nworld");
    }

    #[test]
    fn test_heredoc_two_on_one_line() {
        let hds = heredocs("cat <<A <<B\na\nA\nb\nB\n");
        let bodies: Vec<_> = hds.iter().map(body).collect();
        assert_eq!(bodies, vec!["A\na", "B\nb"]);
    }

    #[test]
    fn test_heredoc_rest_of_line_still_parsed() {
        let file = parse_str("cat <<EOF | wc -l\nhi\nEOF\necho done\n", "").unwrap();
        assert_eq!(file.stmts.len(), 2);
        assert!(matches!(file.stmts[0].node, Some(crate::ast::types::Node::Binary(_))));
        let hds = heredocs("cat <<EOF | wc -l\nhi\nEOF\necho done\n");
        assert_eq!(body(&hds[0]), "EOF\nhi");
    }

    #[test]
    fn test_heredoc_in_cmd_subst() {
        let hds = heredocs("echo $(cat <<EOF\nhi\nEOF\n)");
        assert_eq!(hds.len(), 1);
        assert_eq!(body(&hds[0]), "EOF\nhi");
    }

    #[test]
    fn test_heredoc_unclosed() {
        let err = parse_str("cat <<EOF\nhello\n", "").unwrap_err();
        assert_eq!(err.to_string(), "1:5: unclosed here-document, expected \"EOF\"");
        let err = parse_str("cat <<EOF", "").unwrap_err();
        assert!(matches!(err, ParseError::UnclosedHeredoc { .. }));
    }

    #[test]
    fn test_heredoc_syntax_error_reported_first() {
        let err = parse_str("( cat <<EOF\n", "").unwrap_err();
        assert_eq!(err.to_string(), "1:1: reached EOF without matching token ( with )");
    }
}
