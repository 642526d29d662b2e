use relative_path::{RelativePath, RelativePathBuf};

/// A markdown document loaded from the vault
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    relative_path: RelativePathBuf,
    content: String,
}

impl Document {
    /// Create a document from its vault-relative path and text
    pub fn new(relative_path: RelativePathBuf, content: impl Into<String>) -> Self {
        Self {
            relative_path,
            content: content.into(),
        }
    }

    /// Get the relative path
    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the content, returning true if it actually changed
    pub fn set_content(&mut self, content: String) -> bool {
        if content == self.content {
            return false;
        }
        self.content = content;
        true
    }
}
