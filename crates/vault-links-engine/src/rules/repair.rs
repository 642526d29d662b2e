use super::Rewrite;
use std::borrow::Cow;

/// Known over-encoded sequences and their single-encoded form.
///
/// Ordered most-nested first within each character so a quadruple encoding is
/// never half-collapsed into a triple one. Nesting deeper than four levels is
/// not covered. To handle a newly discovered encoding mistake, add a row.
pub const REPAIR_TABLE: &[(&str, &str)] = &[
    // space
    ("%25252520", "%20"),
    ("%252520", "%20"),
    ("%2520", "%20"),
    // forward slash
    ("%2525252F", "%2F"),
    ("%25252F", "%2F"),
    ("%252F", "%2F"),
    // colon
    ("%2525253A", "%3A"),
    ("%25253A", "%3A"),
    ("%253A", "%3A"),
];

/// Collapse every over-encoded sequence in `text` to single encoding.
///
/// Works on the whole text, not just link paths. `changed` counts replaced
/// sequences.
pub fn repair(text: &str) -> Rewrite<'_> {
    let mut repaired = Cow::Borrowed(text);
    let mut changed = 0;

    for (over_encoded, single) in REPAIR_TABLE {
        let hits = repaired.matches(over_encoded).count();
        if hits > 0 {
            changed += hits;
            repaired = Cow::Owned(repaired.replace(over_encoded, single));
        }
    }

    Rewrite {
        text: repaired,
        changed,
    }
}
