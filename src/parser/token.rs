//! Tokens and byte classes
//!
//! The token set is small: operators, quoting markers, parameter and
//! arithmetic operators, and the reserved words. Reserved words are never
//! produced by the lexer directly; they arrive as literals and are matched
//! by spelling plus a word-boundary check (see `Parser::peek`).

use std::fmt;

use serde::{Serialize, Serializer};

/// Token types for the shell lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    // End of input
    Eof,

    // Literal runs and comments
    Lit,
    Comment,
    /// Newline reached while reading a here-document delimiter
    Stopped,

    // Quoting and expansion markers
    Dollar,    // $
    DblQuote,  // "
    SglQuote,  // '
    Backquote, // `

    // Operators
    And,        // &
    LAnd,       // &&
    Or,         // |
    LOr,        // ||
    Semicolon,  // ;
    DSemicolon, // ;;
    LParen,     // (
    RParen,     // )
    LBrace,     // {
    RBrace,     // }

    // Redirections
    Less,     // <
    Great,    // >
    Append,   // >>
    Heredoc,  // <<
    DHeredoc, // <<-
    WHeredoc, // <<<
    DplIn,    // <&
    DplOut,   // >&
    RdrInOut, // <>

    // Parameter expansion operators
    Hash,        // #
    DHash,       // ##
    Colon,       // :
    ColonSub,    // :-
    ColonAdd,    // :+
    ColonAssign, // :=
    ColonQuest,  // :?
    Quest,       // ?
    Rem,         // %
    DRem,        // %%

    // Arithmetic operators
    Add,    // +
    Sub,    // -
    Inc,    // ++
    Dec,    // --
    Mul,    // *
    Quo,    // /
    Xor,    // ^
    Not,    // !
    Assign, // =
    Eql,    // ==
    Neq,    // !=
    Leq,    // <=
    Geq,    // >=
    Shl,    // <<
    Shr,    // >>

    // Reserved words
    If,
    Then,
    Elif,
    Else,
    Fi,
    While,
    Until,
    Do,
    Done,
    For,
    In,
    Case,
    Esac,
    Function,
}

impl Token {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eof => "EOF",
            Self::Lit => "LIT",
            Self::Comment => "COMMENT",
            Self::Stopped => "STOPPED",
            Self::Dollar => "$",
            Self::DblQuote => "\"",
            Self::SglQuote => "'",
            Self::Backquote => "`",
            Self::And => "&",
            Self::LAnd => "&&",
            Self::Or => "|",
            Self::LOr => "||",
            Self::Semicolon => ";",
            Self::DSemicolon => ";;",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::Less => "<",
            Self::Great => ">",
            Self::Append => ">>",
            Self::Heredoc => "<<",
            Self::DHeredoc => "<<-",
            Self::WHeredoc => "<<<",
            Self::DplIn => "<&",
            Self::DplOut => ">&",
            Self::RdrInOut => "<>",
            Self::Hash => "#",
            Self::DHash => "##",
            Self::Colon => ":",
            Self::ColonSub => ":-",
            Self::ColonAdd => ":+",
            Self::ColonAssign => ":=",
            Self::ColonQuest => ":?",
            Self::Quest => "?",
            Self::Rem => "%",
            Self::DRem => "%%",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Inc => "++",
            Self::Dec => "--",
            Self::Mul => "*",
            Self::Quo => "/",
            Self::Xor => "^",
            Self::Not => "!",
            Self::Assign => "=",
            Self::Eql => "==",
            Self::Neq => "!=",
            Self::Leq => "<=",
            Self::Geq => ">=",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::If => "if",
            Self::Then => "then",
            Self::Elif => "elif",
            Self::Else => "else",
            Self::Fi => "fi",
            Self::While => "while",
            Self::Until => "until",
            Self::Do => "do",
            Self::Done => "done",
            Self::For => "for",
            Self::In => "in",
            Self::Case => "case",
            Self::Esac => "esac",
            Self::Function => "function",
        }
    }

    /// Tokens that are spelled as plain words and only recognized at a word
    /// boundary.
    pub fn is_reserved_word(&self) -> bool {
        matches!(
            self,
            Self::If
                | Self::Then
                | Self::Elif
                | Self::Else
                | Self::Fi
                | Self::While
                | Self::Until
                | Self::Do
                | Self::Done
                | Self::For
                | Self::In
                | Self::Case
                | Self::Esac
                | Self::Function
                | Self::LBrace
                | Self::RBrace
                | Self::Not
        )
    }

    pub fn is_redirect(&self) -> bool {
        matches!(
            self,
            Self::Less
                | Self::Great
                | Self::Append
                | Self::Heredoc
                | Self::DHeredoc
                | Self::WHeredoc
                | Self::DplIn
                | Self::DplOut
                | Self::RdrInOut
        )
    }

    /// Operators accepted between two operands of an arithmetic expression.
    pub fn is_arithm_binary(&self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::Sub
                | Self::Mul
                | Self::Quo
                | Self::Rem
                | Self::Xor
                | Self::Less
                | Self::Great
                | Self::Leq
                | Self::Geq
                | Self::Eql
                | Self::Neq
                | Self::Shl
                | Self::Shr
                | Self::And
                | Self::Or
                | Self::LAnd
                | Self::LOr
                | Self::Assign
        )
    }

    /// Operators that may follow the name in `${name op word}`.
    pub fn is_param_op(&self) -> bool {
        matches!(
            self,
            Self::Hash
                | Self::DHash
                | Self::Colon
                | Self::ColonSub
                | Self::ColonAdd
                | Self::ColonAssign
                | Self::ColonQuest
                | Self::Sub
                | Self::Add
                | Self::Assign
                | Self::Quest
                | Self::Rem
                | Self::DRem
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Bytes that form or start a token
pub fn is_reserved_byte(b: u8) -> bool {
    matches!(
        b,
        b'&' | b'>' | b'<' | b'|' | b';' | b'(' | b')' | b'$' | b'"' | b'\'' | b'`'
    )
}

/// Subset of the reserved bytes that end a word
pub fn is_word_break(b: u8) -> bool {
    matches!(b, b'&' | b'>' | b'<' | b'|' | b';' | b'(' | b')')
}

/// Bytes tokenized inside `${...}`
pub fn is_param_op_byte(b: u8) -> bool {
    matches!(
        b,
        b'}' | b'#' | b':' | b'-' | b'+' | b'=' | b'?' | b'%'
    )
}

/// Bytes tokenized inside `$((...))`
pub fn is_arithm_op_byte(b: u8) -> bool {
    matches!(b, b'+' | b'-' | b'!' | b'*' | b'/' | b'%' | b'^' | b'=')
}

pub fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n')
}

/// Quote `s` when it reads like a word, leave operators like `&` or `}` bare.
pub fn readable(s: &str) -> String {
    match s.bytes().next() {
        Some(b'a'..=b'z') => format!("{s:?}"),
        _ => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_words_are_word_tokens() {
        assert!(Token::If.is_reserved_word());
        assert!(Token::RBrace.is_reserved_word());
        assert!(!Token::Semicolon.is_reserved_word());
        assert_eq!(Token::Function.as_str(), "function");
    }

    #[test]
    fn test_byte_classes() {
        assert!(is_reserved_byte(b'$'));
        assert!(!is_word_break(b'$'));
        assert!(is_word_break(b';'));
        assert!(is_param_op_byte(b'}'));
        assert!(is_arithm_op_byte(b'*'));
        assert!(!is_arithm_op_byte(b'<'));
    }

    #[test]
    fn test_readable_quotes_words_only() {
        assert_eq!(readable("if"), "\"if\"");
        assert_eq!(readable("&&"), "&&");
        assert_eq!(readable("for foo"), "\"for foo\"");
    }
}
