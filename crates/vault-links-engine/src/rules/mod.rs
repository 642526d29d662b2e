//! Text-to-text link rules.
//!
//! Every rule is a pure function over the whole document text. Link detection
//! is a flat regular-expression match: code fences, escapes and nested
//! brackets are not understood, so links inside code blocks are rewritten
//! like any other.

pub mod bracket;
pub mod normalize;
pub mod remap;
pub mod repair;
pub mod spaces;

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Result of applying one rule to a document's text.
#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite<'a> {
    /// The rewritten text, borrowed when nothing matched.
    pub text: Cow<'a, str>,
    /// How many links (or encoded sequences, for repair) actually changed.
    pub changed: usize,
}

impl<'a> Rewrite<'a> {
    pub fn unchanged(text: &'a str) -> Self {
        Self {
            text: Cow::Borrowed(text),
            changed: 0,
        }
    }
}

/// `[displayText](path)`; group 1 is the display text, group 2 the path.
pub fn standard_link_regex() -> &'static Regex {
    static STANDARD_LINK: OnceLock<Regex> = OnceLock::new();
    STANDARD_LINK.get_or_init(|| {
        Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("Invalid standard link regex")
    })
}

/// Whether a link path points outside the vault (`https://…`, `mailto:…`).
pub fn is_external(path: &str) -> bool {
    static URL_SCHEME: OnceLock<Regex> = OnceLock::new();
    let url_scheme = URL_SCHEME.get_or_init(|| {
        Regex::new(r"^(?:[A-Za-z][A-Za-z0-9+.\-]*://|(?i:mailto|tel|data):)")
            .expect("Invalid URL scheme regex")
    });
    url_scheme.is_match(path)
}

/// Rewrite the path of every standard-form link with `fix_path`.
///
/// `fix_path` returns `None` to leave a link alone. Links whose rewritten
/// path equals the current one are not counted as changed.
pub(crate) fn rewrite_standard_paths<'a, F>(text: &'a str, mut fix_path: F) -> Rewrite<'a>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut changed = 0;
    let text = standard_link_regex().replace_all(text, |caps: &regex::Captures<'_>| {
        let display = &caps[1];
        let path = &caps[2];
        match fix_path(path) {
            Some(fixed) if fixed != path => {
                changed += 1;
                format!("[{display}]({fixed})")
            }
            _ => caps[0].to_string(),
        }
    });
    Rewrite { text, changed }
}
