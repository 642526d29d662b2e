use crate::encoding::DOCUMENT_EXTENSION;
use crate::models::Document;
use crate::pipeline::{Pipeline, TransformReport};
use relative_path::{RelativePath, RelativePathBuf};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid vault directory: {0}")]
    InvalidVaultDir(String),
    #[error("Not valid UTF-8 text: {0}")]
    NotUtf8(PathBuf),
    #[error("{path} is outside the vault at {root}")]
    OutsideVault { path: PathBuf, root: PathBuf },
}

/// Read a markdown file and return its content
pub fn read_file(relative_path: &RelativePath, vault_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(vault_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(|e| match e.kind() {
        std::io::ErrorKind::InvalidData => IoError::NotUtf8(absolute_path),
        _ => IoError::Io(e),
    })
}

/// Write content to a markdown file
pub fn write_file(
    relative_path: &RelativePath,
    vault_root: &Path,
    content: &str,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(vault_root);

    // Create parent directories if they don't exist
    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(&absolute_path, content).map_err(IoError::Io)
}

/// Scan for markdown files in the vault, skipping hidden files and directories
pub fn scan_markdown_files(vault_root: &Path) -> Result<Vec<PathBuf>, IoError> {
    if !vault_root.exists() {
        return Err(IoError::InvalidVaultDir(
            "vault directory not found".to_string(),
        ));
    }

    let mut files = Vec::new();
    scan_directory_recursive(vault_root, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if is_hidden(&path) {
            continue;
        }

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if is_markdown_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

/// `.git`, `.obsidian`, `.trash` and dotfiles
fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

/// Whether `path` has the document extension
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == DOCUMENT_EXTENSION)
}

pub fn validate_vault_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidVaultDir(
            "Directory does not exist".to_string(),
        ));
    }

    Ok(())
}

/// Express `path` relative to the vault root
pub fn relative_to_vault(path: &Path, vault_root: &Path) -> Result<RelativePathBuf, IoError> {
    let outside = || IoError::OutsideVault {
        path: path.to_path_buf(),
        root: vault_root.to_path_buf(),
    };
    let stripped = path.strip_prefix(vault_root).map_err(|_| outside())?;
    RelativePathBuf::from_path(stripped).map_err(|_| outside())
}

/// Load the document at `path` (which must live under `vault_root`)
pub fn load_document(path: &Path, vault_root: &Path) -> Result<Document, IoError> {
    let relative_path = relative_to_vault(path, vault_root)?;
    let content = read_file(&relative_path, vault_root)?;
    Ok(Document::new(relative_path, content))
}

/// Whether changed documents are written back to disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    Write,
    DryRun,
}

/// What happened to a single document
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// Content changed (and was written, unless in dry-run mode)
    Modified(TransformReport),
    /// Pipeline output matched the input; the file was not touched
    Unchanged(TransformReport),
}

/// Run the pipeline over one document, writing it back only if it changed
pub fn process_file(
    path: &Path,
    vault_root: &Path,
    pipeline: &Pipeline,
    mode: WriteMode,
) -> Result<FileOutcome, IoError> {
    let mut document = load_document(path, vault_root)?;
    let transformed = pipeline.apply(document.content(), document.relative_path());
    let report = transformed.report;

    if report.suspected_unparsed > 0 {
        log::warn!(
            "{}: {} link-like fragment(s) could not be parsed",
            document.relative_path(),
            report.suspected_unparsed
        );
    }
    if report.max_encoding_level > 1 {
        log::warn!(
            "{}: links still carry {} levels of percent-encoding",
            document.relative_path(),
            report.max_encoding_level
        );
    }

    if !document.set_content(transformed.text) {
        log::debug!("Unchanged: {}", document.relative_path());
        return Ok(FileOutcome::Unchanged(report));
    }

    match mode {
        WriteMode::Write => {
            write_file(document.relative_path(), vault_root, document.content())?;
            log::info!("Updated links in: {}", document.relative_path());
        }
        WriteMode::DryRun => {
            log::info!("Would update links in: {}", document.relative_path());
        }
    }
    Ok(FileOutcome::Modified(report))
}

/// A document the pipeline changed
#[derive(Debug, Clone, PartialEq)]
pub struct ModifiedDocument {
    pub path: PathBuf,
    pub report: TransformReport,
}

/// A document that could not be processed
#[derive(Debug)]
pub struct FailedDocument {
    pub path: PathBuf,
    pub error: IoError,
}

/// Result of processing a batch of documents
#[derive(Debug, Default)]
pub struct RunSummary {
    pub modified: Vec<ModifiedDocument>,
    pub unchanged: Vec<PathBuf>,
    pub failed: Vec<FailedDocument>,
    /// Sum of unparsed link-like fragments across all documents
    pub suspected_unparsed: usize,
}

impl RunSummary {
    pub fn has_changes(&self) -> bool {
        !self.modified.is_empty()
    }

    /// Number of documents that were read, whether or not they failed
    pub fn total(&self) -> usize {
        self.modified.len() + self.unchanged.len() + self.failed.len()
    }

    /// Whether documents were attempted and none of them could be processed
    pub fn all_failed(&self) -> bool {
        !self.failed.is_empty() && self.failed.len() == self.total()
    }

    /// Fold the results of another batch into this one
    pub fn merge(&mut self, other: RunSummary) {
        self.modified.extend(other.modified);
        self.unchanged.extend(other.unchanged);
        self.failed.extend(other.failed);
        self.suspected_unparsed += other.suspected_unparsed;
    }
}

/// Process documents one at a time; a failing document never stops the run
pub fn process_files(
    files: &[PathBuf],
    vault_root: &Path,
    pipeline: &Pipeline,
    mode: WriteMode,
) -> RunSummary {
    let mut summary = RunSummary::default();

    for path in files {
        match process_file(path, vault_root, pipeline, mode) {
            Ok(FileOutcome::Modified(report)) => {
                summary.suspected_unparsed += report.suspected_unparsed;
                summary.modified.push(ModifiedDocument {
                    path: path.clone(),
                    report,
                });
            }
            Ok(FileOutcome::Unchanged(report)) => {
                summary.suspected_unparsed += report.suspected_unparsed;
                summary.unchanged.push(path.clone());
            }
            Err(error) => {
                log::error!("Failed to process {}: {error}", path.display());
                summary.failed.push(FailedDocument {
                    path: path.clone(),
                    error,
                });
            }
        }
    }

    summary
}

/// Scan the whole vault and process every markdown document in it
pub fn process_vault(
    vault_root: &Path,
    pipeline: &Pipeline,
    mode: WriteMode,
) -> Result<RunSummary, IoError> {
    validate_vault_dir(vault_root)?;
    let files = scan_markdown_files(vault_root)?;
    log::info!(
        "Found {} markdown files in {}",
        files.len(),
        vault_root.display()
    );
    Ok(process_files(&files, vault_root, pipeline, mode))
}
