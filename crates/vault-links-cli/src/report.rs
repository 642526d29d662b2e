// Human-readable run summaries. Not a machine-parseable format.

use std::fmt;
use std::path::Path;
use vault_links_engine::{Preset, RunSummary};

const MAX_LISTED: usize = 10;

fn display_path<'a>(path: &'a Path, root: &Path) -> std::path::Display<'a> {
    path.strip_prefix(root).unwrap_or(path).display()
}

/// Per-document lines and the closing summary for one run.
pub struct Summary<'a> {
    pub summary: &'a RunSummary,
    pub root: &'a Path,
    pub preset: Preset,
    pub dry_run: bool,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.summary;

        for modified in &summary.modified {
            writeln!(f, "Updated: {}", display_path(&modified.path, self.root))?;
            for change in modified.report.describe() {
                writeln!(f, "   - {change}")?;
            }
        }
        for failed in &summary.failed {
            writeln!(
                f,
                "Failed: {} ({})",
                display_path(&failed.path, self.root),
                failed.error
            )?;
        }

        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(
            f,
            "{}: {} documents checked, {} modified, {} unchanged, {} failed",
            self.preset,
            summary.total(),
            summary.modified.len(),
            summary.unchanged.len(),
            summary.failed.len()
        )?;
        if summary.suspected_unparsed > 0 {
            writeln!(
                f,
                "{} link-like fragments could not be parsed (see warnings above)",
                summary.suspected_unparsed
            )?;
        }

        if !summary.has_changes() {
            return writeln!(f, "All links are already in standard form.");
        }

        if self.dry_run {
            return writeln!(f, "Dry run: no files were written.");
        }

        if summary.modified.len() > MAX_LISTED {
            writeln!(
                f,
                "Modified {} files (showing first {MAX_LISTED}):",
                summary.modified.len()
            )?;
        } else {
            writeln!(f, "Modified files:")?;
        }
        for modified in summary.modified.iter().take(MAX_LISTED) {
            writeln!(f, "   - {}", display_path(&modified.path, self.root))?;
        }
        if summary.modified.len() > MAX_LISTED {
            writeln!(f, "   ... and {} more", summary.modified.len() - MAX_LISTED)?;
        }

        if self.preset == Preset::Convert {
            writeln!(f, "Next steps:")?;
            writeln!(f, "   git add -u    # Stage the converted files")?;
            writeln!(f, "   git commit    # Commit the changes")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use vault_links_engine::{ModifiedDocument, TransformReport};

    fn render(summary: &RunSummary, root: &Path, preset: Preset, dry_run: bool) -> String {
        Summary {
            summary,
            root,
            preset,
            dry_run,
        }
        .to_string()
    }

    fn modified(root: &Path, name: &str) -> ModifiedDocument {
        ModifiedDocument {
            path: root.join(name),
            report: TransformReport {
                bracket_links: 2,
                ..TransformReport::default()
            },
        }
    }

    #[test]
    fn test_summary_without_changes() {
        let root = PathBuf::from("/vault");
        let summary = RunSummary {
            unchanged: vec![root.join("a.md")],
            ..RunSummary::default()
        };

        let out = render(&summary, &root, Preset::Convert, false);

        assert!(out.contains("convert: 1 documents checked, 0 modified"));
        assert!(out.contains("All links are already in standard form."));
        assert!(!out.contains("git add"));
    }

    #[test]
    fn test_summary_lists_changes_relative_to_root() {
        let root = PathBuf::from("/vault");
        let summary = RunSummary {
            modified: vec![modified(&root, "notes/a.md")],
            ..RunSummary::default()
        };

        let out = render(&summary, &root, Preset::Convert, false);

        assert!(out.contains("Updated: notes/a.md\n   - 2 bracket [[links]] converted"));
        assert!(out.contains("git add -u"));
    }

    #[test]
    fn test_summary_truncates_long_lists() {
        let root = PathBuf::from("/vault");
        let summary = RunSummary {
            modified: (0..12)
                .map(|i| modified(&root, &format!("note-{i:02}.md")))
                .collect(),
            ..RunSummary::default()
        };

        let out = render(&summary, &root, Preset::Repair, false);

        assert!(out.contains("Modified 12 files (showing first 10):"));
        assert!(out.contains("   ... and 2 more"));
        assert!(!out.contains("git add"));
    }

    #[test]
    fn test_dry_run_summary() {
        let root = PathBuf::from("/vault");
        let summary = RunSummary {
            modified: vec![modified(&root, "a.md")],
            suspected_unparsed: 3,
            ..RunSummary::default()
        };

        let out = render(&summary, &root, Preset::Full, true);

        assert!(out.contains("Dry run: no files were written."));
        assert!(out.contains("3 link-like fragments could not be parsed"));
    }
}
