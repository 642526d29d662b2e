use super::Rewrite;
use crate::encoding::{DOCUMENT_SUFFIX, percent_encode};
use regex::Regex;
use std::sync::OnceLock;

/// `[[target]]` or `[[target|alias]]`; group 1 is everything between the brackets.
///
/// The inner text is a run of non-`]` characters, so a reference containing a
/// literal `]` cannot be expressed: it is cut short at the first `]`.
pub fn bracket_link_regex() -> &'static Regex {
    static BRACKET_LINK: OnceLock<Regex> = OnceLock::new();
    BRACKET_LINK
        .get_or_init(|| Regex::new(r"\[\[([^\]]+)\]\]").expect("Invalid bracket link regex"))
}

/// A parsed bracket-link: the referenced document and the text shown for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketLink<'a> {
    pub reference: &'a str,
    pub display: &'a str,
}

impl<'a> BracketLink<'a> {
    /// Parse the text between `[[` and `]]`.
    ///
    /// Splits on the first `|`; without one the reference doubles as the
    /// display text. Both sides are trimmed.
    pub fn parse(inner: &'a str) -> Self {
        let (reference, display) = inner.split_once('|').unwrap_or((inner, inner));
        Self {
            reference: reference.trim(),
            display: display.trim(),
        }
    }

    /// Link path for the reference: fully percent-encoded plus `.md`.
    ///
    /// Escapes already present in the reference are encoded again; the repair
    /// rule collapses the resulting nesting.
    pub fn path(&self) -> String {
        format!("{}{DOCUMENT_SUFFIX}", percent_encode(self.reference))
    }

    /// Standard-form rendering: `[display](path)`.
    pub fn to_standard(&self) -> String {
        format!("[{}]({})", self.display, self.path())
    }
}

/// Convert every bracket-link in `text` to a standard markdown link.
pub fn convert(text: &str) -> Rewrite<'_> {
    let mut changed = 0;
    let text = bracket_link_regex().replace_all(text, |caps: &regex::Captures<'_>| {
        changed += 1;
        BracketLink::parse(&caps[1]).to_standard()
    });
    Rewrite { text, changed }
}

/// Count `[[` openers that are not part of a parseable bracket-link.
///
/// Run against text that has already been through [`convert`], this is the
/// number of link-like fragments no rule understood, such as an unterminated
/// `[[` or an empty `[[]]`.
pub fn count_unparsed(text: &str) -> usize {
    let mut unparsed = 0;
    let mut last_end = 0;
    for link in bracket_link_regex().find_iter(text) {
        unparsed += text[last_end..link.start()].matches("[[").count();
        last_end = link.end();
    }
    unparsed + text[last_end..].matches("[[").count()
}
