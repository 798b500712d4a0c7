//! Per-line substitution for unified-diff text.
//!
//! Header lines carry file paths and get the slash-delimited spellings
//! rewritten. Added lines carry new source and get the dotted spellings
//! rewritten. Everything else describes the unrenamed base and must be left
//! byte-identical so the patch still applies.
//!
//! Matching is plain substring replacement. Occurrences inside string
//! literals or comments are rewritten as well.

use std::borrow::Cow;

use crate::mapping::{RenameRule, RuleSet};

const HEADER_PREFIXES: [&str; 3] = ["diff --git ", "+++ ", "--- "];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Header,
    Added,
    Unchanged,
}

impl LineKind {
    pub fn classify(line: &str) -> Self {
        // `+++ ` also starts with `+`, so headers are checked first.
        if HEADER_PREFIXES.iter().any(|p| line.starts_with(p)) {
            LineKind::Header
        } else if line.starts_with('+') {
            LineKind::Added
        } else {
            LineKind::Unchanged
        }
    }
}

pub fn rewrite_line<'a>(line: &'a str, rules: &RuleSet) -> Cow<'a, str> {
    match LineKind::classify(line) {
        LineKind::Header => replace_all(line, rules, |r| (&r.old_file_path, &r.new_file_path)),
        LineKind::Added => replace_all(line, rules, |r| (&r.old_fq_name, &r.new_fq_name)),
        LineKind::Unchanged => Cow::Borrowed(line),
    }
}

/// Applies every rule in order, each one to the output of the previous.
fn replace_all<'a, F>(line: &'a str, rules: &RuleSet, pick: F) -> Cow<'a, str>
where
    F: for<'r> Fn(&'r RenameRule) -> (&'r String, &'r String),
{
    let mut acc = Cow::Borrowed(line);
    for rule in rules {
        let (from, to) = pick(rule);
        if acc.contains(from.as_str()) {
            acc = Cow::Owned(acc.replace(from.as_str(), to));
        }
    }
    acc
}
