//! Percent-encoding helpers shared by the link rules.
//!
//! [`percent_encode`] is naive: an input that already contains `%XX` escapes
//! gets its `%` encoded again (`%20` becomes `%2520`). The repair rule collapses
//! the nesting this produces. [`encode_document_name`] undoes one layer first,
//! so a name that is already single-encoded comes back unchanged.

use std::borrow::Cow;

/// File extension of documents in a vault, without the leading dot.
pub const DOCUMENT_EXTENSION: &str = "md";

/// Suffix appended to link paths that point at a document.
pub const DOCUMENT_SUFFIX: &str = ".md";

/// Percent-encode every byte except ASCII alphanumerics and `-_.~`.
///
/// Spaces, `/`, `:` and `%` are all encoded.
pub fn percent_encode(input: &str) -> Cow<'_, str> {
    urlencoding::encode(input)
}

/// Percent-encode `input` after decoding one layer of existing escapes.
///
/// Escapes that decode to invalid UTF-8 are treated as literal text.
pub fn reencode(input: &str) -> Cow<'_, str> {
    match urlencoding::decode(input) {
        Ok(decoded) => Cow::Owned(percent_encode(&decoded).into_owned()),
        Err(_) => percent_encode(input),
    }
}

/// Percent-encode a document file name, keeping its `.md` suffix readable.
///
/// Returns `None` when `file_name` does not end in the document suffix.
pub fn encode_document_name(file_name: &str) -> Option<String> {
    let stem = file_name.strip_suffix(DOCUMENT_SUFFIX)?;
    Some(format!("{}{DOCUMENT_SUFFIX}", reencode(stem)))
}

/// Number of nested percent-encoding applications visible in `path`.
///
/// `0` means no escapes at all, `1` means correctly single-encoded, and every
/// extra `%25` prefix in front of an escape adds one more level. The result is
/// the deepest escape found anywhere in the string.
pub fn encoding_level(path: &str) -> u8 {
    let bytes = path.as_bytes();
    let mut deepest = 0u8;

    for (index, _) in path.match_indices('%') {
        let mut rest = bytes.get(index + 1..).unwrap_or_default();
        let mut level = 0u8;
        while is_hex_pair(rest) {
            level = level.saturating_add(1);
            // `%25` followed by another hex pair is one more nesting level.
            if rest.starts_with(b"25") && is_hex_pair(rest.get(2..).unwrap_or_default()) {
                rest = rest.get(2..).unwrap_or_default();
            } else {
                break;
            }
        }
        deepest = deepest.max(level);
    }

    deepest
}

fn is_hex_pair(bytes: &[u8]) -> bool {
    matches!(bytes, [a, b, ..] if a.is_ascii_hexdigit() && b.is_ascii_hexdigit())
}
