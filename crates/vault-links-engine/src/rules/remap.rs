//! Rewrite cross-references after documents move to new folders.

use super::Rewrite;
use super::normalize::normalize_path;
use crate::encoding::DOCUMENT_SUFFIX;
use regex::Regex;
use relative_path::{RelativePath, RelativePathBuf};
use std::borrow::Cow;

#[derive(Debug, thiserror::Error)]
pub enum RemapError {
    #[error("Remap source must not be empty")]
    EmptySource,
    #[error("Remap target for '{name}' must be a vault-relative path, got '{target}'")]
    InvalidTarget { name: String, target: String },
    #[error("Invalid remap pattern for '{name}': {error}")]
    Pattern { name: String, error: regex::Error },
}

#[derive(Debug, Clone)]
struct RemapEntry {
    source: String,
    pattern: Regex,
    target: RelativePathBuf,
}

/// Old reference names mapped to their new vault-relative location.
///
/// Targets are stored without the `.md` suffix. Every source also matches its
/// single-encoded spelling (`Auth System` and `Auth%20System`).
#[derive(Debug, Clone, Default)]
pub struct RemapTable {
    entries: Vec<RemapEntry>,
}

impl RemapTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(old name, new target)` pairs.
    pub fn from_pairs<I, S, T>(pairs: I) -> Result<Self, RemapError>
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut table = Self::new();
        for (source, target) in pairs {
            table.insert(source.as_ref(), target.as_ref())?;
        }
        Ok(table)
    }

    /// Map `source` (with or without `.md`) to `target`.
    pub fn insert(&mut self, source: &str, target: &str) -> Result<(), RemapError> {
        let source = source.trim();
        let source = source.strip_suffix(DOCUMENT_SUFFIX).unwrap_or(source);
        if source.is_empty() {
            return Err(RemapError::EmptySource);
        }

        let target = target.trim();
        let target = target.strip_suffix(DOCUMENT_SUFFIX).unwrap_or(target);
        if target.is_empty() || target.starts_with('/') {
            return Err(RemapError::InvalidTarget {
                name: source.to_string(),
                target: target.to_string(),
            });
        }
        let target = RelativePathBuf::from(target).normalize();

        self.push(source, target.clone())?;
        let encoded = source.replace(' ', "%20");
        if encoded != source && !self.contains(&encoded) {
            self.push(&encoded, target)?;
        }
        Ok(())
    }

    fn push(&mut self, source: &str, target: RelativePathBuf) -> Result<(), RemapError> {
        let pattern = format!(
            r"\[([^\]]+)\]\({}(?:{})?\)",
            regex::escape(source),
            regex::escape(DOCUMENT_SUFFIX)
        );
        let pattern = Regex::new(&pattern).map_err(|error| RemapError::Pattern {
            name: source.to_string(),
            error,
        })?;
        self.entries.push(RemapEntry {
            source: source.to_string(),
            pattern,
            target,
        });
        Ok(())
    }

    /// Whether `source` (exact spelling) is already mapped.
    pub fn contains(&self, source: &str) -> bool {
        self.entries.iter().any(|entry| entry.source == source)
    }

    /// Number of patterns, counting the automatic encoded spellings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrite links to remapped documents, relative to `document`'s folder.
    pub fn apply<'a>(&self, text: &'a str, document: &RelativePath) -> Rewrite<'a> {
        let folder = document.parent().unwrap_or(RelativePath::new(""));
        let mut current = Cow::Borrowed(text);
        let mut changed = 0;

        for entry in &self.entries {
            let link_path = remapped_link_path(folder, &entry.target);
            let replaced = match entry
                .pattern
                .replace_all(&current, |caps: &regex::Captures<'_>| {
                    let rewritten = format!("[{}]({link_path})", &caps[1]);
                    if rewritten != caps[0] {
                        changed += 1;
                    }
                    rewritten
                }) {
                Cow::Owned(replaced) => Some(replaced),
                Cow::Borrowed(_) => None,
            };
            if let Some(replaced) = replaced {
                current = Cow::Owned(replaced);
            }
        }

        Rewrite {
            text: current,
            changed,
        }
    }
}

/// Path from `folder` to `target`, with the document name percent-encoded.
fn remapped_link_path(folder: &RelativePath, target: &RelativePath) -> String {
    let relative = folder.relative(target);
    normalize_path(&format!("{relative}{DOCUMENT_SUFFIX}")).into_owned()
}
