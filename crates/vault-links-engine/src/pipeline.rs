//! The link transform pipeline: an ordered list of rules run over one document.
//!
//! Each historical entry point is a [`Preset`], a fixed rule order. The
//! pipeline keeps no state between documents; the only "state" is the
//! encoding level already present in the text, which repeated runs converge
//! to one.

use crate::encoding::encoding_level;
use crate::rules::remap::RemapTable;
use crate::rules::{self, Rewrite, bracket, is_external, normalize, repair, spaces};
use relative_path::RelativePath;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// One transform step.
#[derive(Debug, Clone)]
pub enum Rule {
    /// `[[target|alias]]` to `[alias](target.md)`
    Bracket,
    /// Re-encode the document name of relative link paths
    Normalize,
    /// Collapse known over-encoded sequences
    Repair,
    /// Encode literal spaces in relative document links
    Spaces,
    /// Point links at documents that moved
    Remap(RemapTable),
}

impl Rule {
    pub fn apply<'a>(&self, text: &'a str, document: &RelativePath) -> Rewrite<'a> {
        match self {
            Rule::Bracket => bracket::convert(text),
            Rule::Normalize => normalize::normalize(text),
            Rule::Repair => repair::repair(text),
            Rule::Spaces => spaces::encode_spaces(text),
            Rule::Remap(table) => table.apply(text, document),
        }
    }
}

/// Named rule sequences, one per link-fixing workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Bracket conversion, then repair and space encoding. Safe to run on
    /// every commit.
    #[default]
    Convert,
    /// Re-encode every relative document link, then repair.
    Normalize,
    /// Repair over-encoding, then encode remaining spaces.
    Repair,
    /// Normalization, bracket conversion and repair.
    Full,
    /// Remap moved documents, then repair.
    Migrate,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Convert,
        Preset::Normalize,
        Preset::Repair,
        Preset::Full,
        Preset::Migrate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Convert => "convert",
            Preset::Normalize => "normalize",
            Preset::Repair => "repair",
            Preset::Full => "full",
            Preset::Migrate => "migrate",
        }
    }

    /// Build the pipeline for this preset. `remap` is only used by `Migrate`.
    pub fn pipeline(self, remap: &RemapTable) -> Pipeline {
        let rules = match self {
            Preset::Convert => vec![Rule::Bracket, Rule::Repair, Rule::Spaces],
            Preset::Normalize => vec![Rule::Normalize, Rule::Repair],
            Preset::Repair => vec![Rule::Repair, Rule::Spaces],
            // Normalize before converting so fresh links are encoded once only
            Preset::Full => vec![Rule::Normalize, Rule::Bracket, Rule::Repair],
            Preset::Migrate => vec![Rule::Remap(remap.clone()), Rule::Repair],
        };
        Pipeline::new(rules)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown preset '{0}' (expected one of: convert, normalize, repair, full, migrate)")]
pub struct UnknownPreset(pub String);

impl FromStr for Preset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPreset(s.to_string()))
    }
}

/// Per-document counts of what the pipeline changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformReport {
    pub bracket_links: usize,
    pub normalized_paths: usize,
    pub repaired_sequences: usize,
    pub space_fixes: usize,
    pub remapped_links: usize,
    /// `[[` openers left in the output that no rule could parse.
    pub suspected_unparsed: usize,
    /// Deepest encoding level among relative link paths in the output.
    pub max_encoding_level: u8,
}

impl TransformReport {
    fn record(&mut self, rule: &Rule, changed: usize) {
        let counter = match rule {
            Rule::Bracket => &mut self.bracket_links,
            Rule::Normalize => &mut self.normalized_paths,
            Rule::Repair => &mut self.repaired_sequences,
            Rule::Spaces => &mut self.space_fixes,
            Rule::Remap(_) => &mut self.remapped_links,
        };
        *counter += changed;
    }

    /// Total number of rewrites across all rules.
    pub fn total_changes(&self) -> usize {
        self.bracket_links
            + self.normalized_paths
            + self.repaired_sequences
            + self.space_fixes
            + self.remapped_links
    }

    /// Human-readable change lines, one per rule that did something.
    pub fn describe(&self) -> Vec<String> {
        [
            (self.bracket_links, "bracket [[links]] converted"),
            (self.normalized_paths, "link paths re-encoded"),
            (self.repaired_sequences, "over-encoded sequences repaired"),
            (self.space_fixes, "unencoded spaces fixed"),
            (self.remapped_links, "links pointed at moved documents"),
        ]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{count} {label}"))
        .collect()
    }
}

/// Output of running a pipeline over one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub text: String,
    pub report: TransformReport,
}

/// An ordered list of rules applied one after another.
#[derive(Debug, Clone)]
pub struct Pipeline {
    rules: Vec<Rule>,
}

impl Pipeline {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Run every rule over `text`, which lives at `document` inside the vault.
    pub fn apply(&self, text: &str, document: &RelativePath) -> Transformed {
        let mut report = TransformReport::default();
        let mut current = Cow::Borrowed(text);

        for rule in &self.rules {
            let (next, changed) = match rule.apply(&current, document) {
                Rewrite {
                    text: Cow::Owned(next),
                    changed,
                } => (Some(next), changed),
                Rewrite { changed, .. } => (None, changed),
            };
            report.record(rule, changed);
            if let Some(next) = next {
                current = Cow::Owned(next);
            }
        }

        report.suspected_unparsed = bracket::count_unparsed(&current);
        report.max_encoding_level = max_link_encoding_level(&current);

        Transformed {
            text: current.into_owned(),
            report,
        }
    }
}

/// Deepest encoding level found in the paths of relative standard-form links.
pub fn max_link_encoding_level(text: &str) -> u8 {
    rules::standard_link_regex()
        .captures_iter(text)
        .filter_map(|caps| caps.get(2))
        .map(|path| path.as_str())
        .filter(|path| !is_external(path))
        .map(encoding_level)
        .max()
        .unwrap_or(0)
}
