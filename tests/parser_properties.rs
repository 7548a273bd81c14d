//! Property-based and behavioral tests for the parser
//!
//! Uses proptest to generate inputs and check that parsing never panics and
//! that valid scripts come back with the structure they were built from.

use std::thread;

use proptest::prelude::*;
use shsyntax::ast::walk::{walk_redirects_mut, walk_words};
use shsyntax::{parse_str, File, Node, ParseError, Stmt, Token, WordPart};

/// Parse on a thread with a generous stack, so deep inputs hit the nesting
/// limit rather than the test harness stack size.
fn parse_big_stack(src: String) -> Result<File, ParseError> {
    thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(move || parse_str(&src, "prop.sh"))
        .unwrap()
        .join()
        .unwrap()
}

fn command_args(s: &Stmt) -> Vec<String> {
    match &s.node {
        Some(Node::Command(c)) => c
            .args
            .iter()
            .map(|w| w.lit().unwrap_or("<complex>").to_string())
            .collect(),
        other => panic!("not a command: {other:?}"),
    }
}

/// Strategies for generating shell-like input
mod strategies {
    use proptest::prelude::*;

    /// Generate arbitrary strings (may be invalid shell)
    pub fn arbitrary_string() -> impl Strategy<Value = String> {
        prop::string::string_regex(".{0,100}").unwrap()
    }

    /// Arbitrary text biased towards shell operators and quotes
    pub fn shellish_string() -> impl Strategy<Value = String> {
        prop::string::string_regex("[a-z $(){}'\"`;&|<>#=:+%\\-\\\\\n]{0,80}").unwrap()
    }

    /// Generate valid identifiers
    pub fn identifier() -> impl Strategy<Value = String> {
        prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_]{0,20}").unwrap()
    }

    /// Generate simple words (alphanumeric + some special chars)
    pub fn word() -> impl Strategy<Value = String> {
        prop::string::string_regex("[a-zA-Z0-9_./-]{1,30}").unwrap()
    }

    /// Words mixing quotes and expansions
    pub fn rich_word() -> impl Strategy<Value = String> {
        prop_oneof![
            word(),
            word().prop_map(|w| format!("\"{}\"", w)),
            word().prop_map(|w| format!("'{}'", w)),
            identifier().prop_map(|n| format!("${}", n)),
            (identifier(), word()).prop_map(|(n, w)| format!("${{{}:-{}}}", n, w)),
            word().prop_map(|w| format!("$(echo {})", w)),
            word().prop_map(|w| format!("`echo {}`", w)),
            Just("$((1 + 2))".to_string()),
            Just("\"\"".to_string()),
        ]
    }

    /// A simple command whose name is never a reserved word
    pub fn command() -> impl Strategy<Value = String> {
        (
            prop_oneof![Just("echo"), Just("true"), Just("ls"), Just("cat")],
            prop::collection::vec(word(), 0..4),
        )
            .prop_map(|(name, args)| {
                let mut parts = vec![name.to_string()];
                parts.extend(args);
                parts.join(" ")
            })
    }

    /// Generate a variable assignment
    pub fn assignment() -> impl Strategy<Value = String> {
        (identifier(), word()).prop_map(|(name, value)| format!("{}={}", name, value))
    }

    /// One or more statements joined by newlines or semicolons
    pub fn simple_script() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(prop_oneof![command(), assignment()], 1..8)
    }

    /// Lines for a here-document body that never match the `EOF` marker
    pub fn heredoc_lines() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(prop::string::string_regex("[a-z $'\"]{0,20}").unwrap(), 0..6)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The parser returns a result for any input, it never panics
    #[test]
    fn never_panics_on_arbitrary_input(input in strategies::arbitrary_string()) {
        let _ = parse_big_stack(input);
    }

    #[test]
    fn never_panics_on_shellish_input(input in strategies::shellish_string()) {
        let _ = parse_big_stack(input);
    }

    /// Statements come back in source order, one per line
    #[test]
    fn simple_scripts_keep_statement_order(lines in strategies::simple_script(), semi in any::<bool>()) {
        let sep = if semi { "; " } else { "\n" };
        let src = lines.join(sep);
        let file = parse_str(&src, "").unwrap();
        prop_assert_eq!(file.stmts.len(), lines.len());
        for (stmt, line) in file.stmts.iter().zip(&lines) {
            if stmt.node.is_some() {
                prop_assert_eq!(command_args(stmt).join(" "), line.clone());
            } else {
                prop_assert_eq!(stmt.assigns.len(), 1);
                prop_assert_eq!(format!("{}=", stmt.assigns[0].name.value), line[..=line.find('=').unwrap()].to_string());
            }
        }
    }

    /// Every parsed word has at least one part
    #[test]
    fn words_are_never_empty(words in prop::collection::vec(strategies::rich_word(), 1..6)) {
        let src = format!("echo {}", words.join(" "));
        let file = parse_str(&src, "").unwrap();
        let mut count = 0;
        walk_words(&file.stmts, &mut |w| {
            assert!(!w.parts.is_empty(), "empty word in {src:?}");
            count += 1;
        });
        prop_assert!(count > words.len());
    }

    /// Here-document bodies are stored byte for byte
    #[test]
    fn heredoc_bodies_are_preserved(lines in strategies::heredoc_lines()) {
        let src = format!("cat <<EOF\n{}EOF\n", lines.iter().map(|l| format!("{l}\n")).collect::<String>());
        let mut file = parse_str(&src, "").unwrap();
        let mut bodies = Vec::new();
        walk_redirects_mut(&mut file.stmts, &mut |r| bodies.push(r.word.lit().map(str::to_string)));
        prop_assert_eq!(bodies, vec![Some(format!("EOF\n{}", lines.join("\n")))]);
    }
}

#[test]
fn test_heredoc_round_trip() {
    let mut file = parse_str("cat <<EOF\nhello\nEOF\n", "").unwrap();
    let mut values = Vec::new();
    walk_redirects_mut(&mut file.stmts, &mut |r| {
        assert_eq!(r.op, Token::Heredoc);
        values.push(r.word.lit().unwrap_or_default().to_string());
    });
    assert_eq!(values, vec!["EOF\nhello"]);
}

#[test]
fn test_unmatched_paren_reports_opening_position() {
    let err = parse_str("( echo hi", "").unwrap_err();
    let at = err.position();
    assert_eq!((at.line, at.column), (1, 1));
    assert!(matches!(err, ParseError::Unmatched { .. }));
}

#[test]
fn test_reserved_word_needs_boundary() {
    let file = parse_str("iffy=1", "").unwrap();
    assert_eq!(file.stmts.len(), 1);
    let s = &file.stmts[0];
    assert!(s.node.is_none());
    assert_eq!(s.assigns[0].name.value, "iffy");
    assert_eq!(s.assigns[0].value.as_ref().and_then(|w| w.lit()), Some("1"));
}

#[test]
fn test_operator_in_double_quotes() {
    let file = parse_str("\"a;b\"", "").unwrap();
    assert_eq!(file.stmts.len(), 1);
    let Some(Node::Command(cmd)) = &file.stmts[0].node else {
        panic!("expected a command");
    };
    assert_eq!(cmd.args.len(), 1);
    let WordPart::DblQuoted(dq) = &cmd.args[0].parts[0] else {
        panic!("expected double quotes");
    };
    match dq.parts.as_slice() {
        [WordPart::Lit(l)] => assert_eq!(l.value, "a;b"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_and_or_chain_is_left_biased() {
    let file = parse_str("a && b || c", "").unwrap();
    let Some(Node::Binary(top)) = &file.stmts[0].node else {
        panic!("expected a binary command");
    };
    assert_eq!(top.op, Token::LOr);
    assert_eq!(command_args(&top.y), vec!["c"]);
    let Some(Node::Binary(left)) = &top.x.node else {
        panic!("expected a binary command");
    };
    assert_eq!(left.op, Token::LAnd);
}

#[test]
fn test_background_statement() {
    let file = parse_str("sleep 1 &\necho done", "").unwrap();
    assert_eq!(file.stmts.len(), 2);
    assert!(file.stmts[0].background);
    assert!(!file.stmts[1].background);
    assert_eq!(command_args(&file.stmts[0]), vec!["sleep", "1"]);
    assert_eq!(command_args(&file.stmts[1]), vec!["echo", "done"]);
}

#[test]
fn test_deep_nesting_is_an_error() {
    let depth = 500;
    let src = format!("{}a{}", "(".repeat(depth), ")".repeat(depth));
    let err = parse_big_stack(src).unwrap_err();
    assert!(matches!(err, ParseError::NestingTooDeep { limit: 100, .. }));

    let src = format!("echo {}x{}", "$(echo ".repeat(depth), ")".repeat(depth));
    let err = parse_big_stack(src).unwrap_err();
    assert!(matches!(err, ParseError::NestingTooDeep { .. }));
}

#[test]
fn test_script_with_every_construct() {
    let src = r#"#!/bin/sh
# setup
set -e
name=${1:-world}
greet() {
    echo "hello, $name" >&2
}
if [ -n "$name" ]; then
    greet
elif true; then :
else
    exit 1
fi
for f in *.txt; do
    case $f in
    a*|b*) echo "$f" | wc -c ;;
    *) cat "$f" <<-END
	body $f
	END
        ;;
    esac
done
while false; do break; done
until true; do :; done
( cd /tmp && ls ) || echo `pwd`
{ x=$((1 + 2)); echo $x; } > out 2>&1 &
"#;
    let file = parse_str(src, "all.sh").unwrap();
    let kinds: Vec<&str> = file
        .stmts
        .iter()
        .map(|s| match &s.node {
            None => "assign",
            Some(Node::Command(_)) => "command",
            Some(Node::FuncDecl(_)) => "func",
            Some(Node::If(_)) => "if",
            Some(Node::For(_)) => "for",
            Some(Node::While(_)) => "while",
            Some(Node::Until(_)) => "until",
            Some(Node::Binary(_)) => "binary",
            Some(Node::Block(_)) => "block",
            Some(other) => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["command", "assign", "func", "if", "for", "while", "until", "binary", "block"]
    );
    assert!(file.stmts[8].background);
    assert_eq!(file.stmts[8].redirects.len(), 2);
}
