//! Depth-first traversal over the syntax tree.
//!
//! The parser uses [`walk_redirects_mut`] to back-fill here-document bodies
//! once they have been read; [`walk_words`] is the read-only counterpart.

use super::types::{ArithmExpr, Node, Redirect, Stmt, Word, WordPart};

/// Calls `f` on every word under `stmts`, including words nested inside
/// quotes, expansions and command substitutions.
pub fn walk_words<'a>(stmts: &'a [Stmt], f: &mut dyn FnMut(&'a Word)) {
    for stmt in stmts {
        walk_stmt(stmt, f);
    }
}

/// `&&`, `||` and `|` chains go through an explicit stack, since they can be
/// far longer than anything else is deep.
fn walk_stmt<'a>(stmt: &'a Stmt, f: &mut dyn FnMut(&'a Word)) {
    let mut pending = vec![stmt];
    while let Some(stmt) = pending.pop() {
        for assign in &stmt.assigns {
            if let Some(value) = &assign.value {
                walk_word(value, f);
            }
        }
        for redirect in &stmt.redirects {
            walk_word(&redirect.word, f);
        }
        let Some(node) = &stmt.node else {
            continue;
        };
        match node {
            Node::Command(cmd) => cmd.args.iter().for_each(|w| walk_word(w, f)),
            Node::Subshell(s) => walk_words(&s.stmts, f),
            Node::Block(b) => walk_words(&b.stmts, f),
            Node::If(is) => {
                walk_words(&is.conds, f);
                walk_words(&is.then_stmts, f);
                for elif in &is.elifs {
                    walk_words(&elif.conds, f);
                    walk_words(&elif.then_stmts, f);
                }
                walk_words(&is.else_stmts, f);
            }
            Node::While(ws) => {
                walk_words(&ws.conds, f);
                walk_words(&ws.do_stmts, f);
            }
            Node::Until(us) => {
                walk_words(&us.conds, f);
                walk_words(&us.do_stmts, f);
            }
            Node::For(fs) => {
                fs.word_list.iter().for_each(|w| walk_word(w, f));
                walk_words(&fs.do_stmts, f);
            }
            Node::Case(cs) => {
                walk_word(&cs.word, f);
                for pl in &cs.pattern_lists {
                    pl.patterns.iter().for_each(|w| walk_word(w, f));
                    walk_words(&pl.stmts, f);
                }
            }
            Node::FuncDecl(fd) => pending.push(&fd.body),
            Node::Binary(b) => {
                pending.push(&b.y);
                pending.push(&b.x);
            }
        }
    }
}

fn walk_word<'a>(word: &'a Word, f: &mut dyn FnMut(&'a Word)) {
    f(word);
    for part in &word.parts {
        walk_part(part, f);
    }
}

fn walk_part<'a>(part: &'a WordPart, f: &mut dyn FnMut(&'a Word)) {
    match part {
        WordPart::DblQuoted(dq) => dq.parts.iter().for_each(|p| walk_part(p, f)),
        WordPart::ParamExp(pe) => {
            if let Some(word) = pe.exp.as_ref().and_then(|e| e.word.as_ref()) {
                walk_word(word, f);
            }
        }
        WordPart::CmdSubst(cs) => walk_words(&cs.stmts, f),
        WordPart::ArithmExp(ae) => {
            if let Some(x) = &ae.x {
                walk_arithm(x, f);
            }
        }
        WordPart::Lit(_) | WordPart::SglQuoted(_) => {}
    }
}

fn walk_arithm<'a>(x: &'a ArithmExpr, f: &mut dyn FnMut(&'a Word)) {
    match x {
        ArithmExpr::Word(w) => walk_word(w, f),
        ArithmExpr::Unary(u) => walk_arithm(&u.x, f),
        ArithmExpr::Paren(p) => walk_arithm(&p.x, f),
        ArithmExpr::Binary(b) => {
            walk_arithm(&b.x, f);
            walk_arithm(&b.y, f);
        }
    }
}

/// Calls `f` on every redirect under `stmts`, outer statements first.
pub fn walk_redirects_mut(stmts: &mut [Stmt], f: &mut dyn FnMut(&mut Redirect)) {
    for stmt in stmts {
        redirects_in_stmt(stmt, f);
    }
}

fn redirects_in_stmt(stmt: &mut Stmt, f: &mut dyn FnMut(&mut Redirect)) {
    let mut pending = vec![stmt];
    while let Some(stmt) = pending.pop() {
        for redirect in &mut stmt.redirects {
            f(redirect);
            redirects_in_word(&mut redirect.word, f);
        }
        for assign in &mut stmt.assigns {
            if let Some(value) = &mut assign.value {
                redirects_in_word(value, f);
            }
        }
        let Some(node) = &mut stmt.node else {
            continue;
        };
        match node {
            Node::Command(cmd) => cmd.args.iter_mut().for_each(|w| redirects_in_word(w, f)),
            Node::Subshell(s) => walk_redirects_mut(&mut s.stmts, f),
            Node::Block(b) => walk_redirects_mut(&mut b.stmts, f),
            Node::If(is) => {
                walk_redirects_mut(&mut is.conds, f);
                walk_redirects_mut(&mut is.then_stmts, f);
                for elif in &mut is.elifs {
                    walk_redirects_mut(&mut elif.conds, f);
                    walk_redirects_mut(&mut elif.then_stmts, f);
                }
                walk_redirects_mut(&mut is.else_stmts, f);
            }
            Node::While(ws) => {
                walk_redirects_mut(&mut ws.conds, f);
                walk_redirects_mut(&mut ws.do_stmts, f);
            }
            Node::Until(us) => {
                walk_redirects_mut(&mut us.conds, f);
                walk_redirects_mut(&mut us.do_stmts, f);
            }
            Node::For(fs) => {
                fs.word_list.iter_mut().for_each(|w| redirects_in_word(w, f));
                walk_redirects_mut(&mut fs.do_stmts, f);
            }
            Node::Case(cs) => {
                redirects_in_word(&mut cs.word, f);
                for pl in &mut cs.pattern_lists {
                    pl.patterns.iter_mut().for_each(|w| redirects_in_word(w, f));
                    walk_redirects_mut(&mut pl.stmts, f);
                }
            }
            Node::FuncDecl(fd) => pending.push(&mut fd.body),
            Node::Binary(b) => {
                pending.push(&mut b.y);
                pending.push(&mut b.x);
            }
        }
    }
}

fn redirects_in_word(word: &mut Word, f: &mut dyn FnMut(&mut Redirect)) {
    for part in &mut word.parts {
        redirects_in_part(part, f);
    }
}

fn redirects_in_part(part: &mut WordPart, f: &mut dyn FnMut(&mut Redirect)) {
    match part {
        WordPart::DblQuoted(dq) => dq.parts.iter_mut().for_each(|p| redirects_in_part(p, f)),
        WordPart::ParamExp(pe) => {
            if let Some(word) = pe.exp.as_mut().and_then(|e| e.word.as_mut()) {
                redirects_in_word(word, f);
            }
        }
        WordPart::CmdSubst(cs) => walk_redirects_mut(&mut cs.stmts, f),
        WordPart::ArithmExp(ae) => {
            if let Some(x) = &mut ae.x {
                redirects_in_arithm(x, f);
            }
        }
        WordPart::Lit(_) | WordPart::SglQuoted(_) => {}
    }
}

fn redirects_in_arithm(x: &mut ArithmExpr, f: &mut dyn FnMut(&mut Redirect)) {
    match x {
        ArithmExpr::Word(w) => redirects_in_word(w, f),
        ArithmExpr::Unary(u) => redirects_in_arithm(&mut u.x, f),
        ArithmExpr::Paren(p) => redirects_in_arithm(&mut p.x, f),
        ArithmExpr::Binary(b) => {
            redirects_in_arithm(&mut b.x, f);
            redirects_in_arithm(&mut b.y, f);
        }
    }
}
