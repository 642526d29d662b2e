use super::{Rewrite, is_external, rewrite_standard_paths};
use crate::encoding::DOCUMENT_SUFFIX;

/// Replace literal spaces with `%20` in relative document links.
///
/// A cheaper alternative to full normalization for documents that are already
/// mostly correct: no other reserved character is touched.
pub fn encode_spaces(text: &str) -> Rewrite<'_> {
    rewrite_standard_paths(text, |path| {
        let needs_fix = !is_external(path) && path.ends_with(DOCUMENT_SUFFIX) && path.contains(' ');
        needs_fix.then(|| path.replace(' ', "%20"))
    })
}
