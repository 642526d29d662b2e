use super::{Rewrite, is_external, rewrite_standard_paths};
use crate::encoding::encode_document_name;
use std::borrow::Cow;

/// Re-encode the document name at the end of a relative link path.
///
/// Only the final segment is touched, and only when it ends in `.md`. A name
/// that is already single-encoded is returned as it was.
/// Directory segments pass through as-is: directory names are assumed never
/// to contain reserved characters. External URLs are returned unchanged.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_external(path) {
        return Cow::Borrowed(path);
    }

    let (directory, file_name) = match path.rsplit_once('/') {
        Some((directory, file_name)) => (Some(directory), file_name),
        None => (None, path),
    };

    match (directory, encode_document_name(file_name)) {
        (_, None) => Cow::Borrowed(path),
        (Some(directory), Some(encoded)) => Cow::Owned(format!("{directory}/{encoded}")),
        (None, Some(encoded)) => Cow::Owned(encoded),
    }
}

/// Normalize the path of every standard-form link in `text`.
pub fn normalize(text: &str) -> Rewrite<'_> {
    rewrite_standard_paths(text, |path| match normalize_path(path) {
        Cow::Owned(fixed) => Some(fixed),
        Cow::Borrowed(_) => None,
    })
}
