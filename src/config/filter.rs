//! Allow/block evaluation for a single domain item.
//!
//! Names are matched case-insensitively. When the raw strings differ, a
//! leading decorative prefix (emoji, symbol glyphs and the separator that
//! follows them) is stripped from both sides before comparing again, so a
//! calendar titled `"✈️ Travel"` matches a configured `"Travel"` and the
//! other way round. Identifiers are compared verbatim, ignoring case only.
//!
//! The evaluator never looks at `enabled`; callers check that first (see
//! [`DomainAccess::permits`]).

use super::types::{DomainAccess, FilterMode};

/// Whether an item with display `name` and optional stable `id` passes the
/// domain's filter.
pub fn is_allowed(name: &str, id: Option<&str>, access: &DomainAccess) -> bool {
    match access.mode {
        FilterMode::All => true,
        FilterMode::Allowlist => matches_any(name, id, &access.items),
        FilterMode::Blocklist => !matches_any(name, id, &access.items),
    }
}

/// Keep the items that pass the filter, preserving input order.
///
/// `name_of` and `id_of` extract the display name and stable identifier, so
/// the evaluator stays independent of concrete item types.
pub fn filter<'a, T, N, I>(
    items: &'a [T],
    access: &DomainAccess,
    name_of: N,
    id_of: I,
) -> Vec<&'a T>
where
    N: Fn(&T) -> &str,
    I: Fn(&T) -> Option<&str>,
{
    items
        .iter()
        .filter(|item| is_allowed(name_of(item), id_of(item), access))
        .collect()
}

/// Strip a leading decorative prefix.
///
/// The prefix is a maximal run of non-ASCII, non-alphanumeric scalars
/// (emoji, pictographs, symbols, ZWJ, variation selectors, skin-tone
/// modifiers, regional indicators, keycap combiners) followed by any
/// whitespace or ASCII punctuation. A keycap emoji such as `1️⃣` or `#️⃣`
/// counts as decoration even though its base is ASCII. Strings without a
/// decorative lead are returned with leading whitespace trimmed and nothing
/// else removed.
pub fn strip_decorative_prefix(s: &str) -> &str {
    let s = s.trim_start();
    let rest = strip_keycap_base(s).unwrap_or(s);
    if !rest.chars().next().is_some_and(is_decorative) {
        return s;
    }

    let start = rest
        .char_indices()
        .find(|&(_, c)| !(is_decorative(c) || c.is_whitespace() || c.is_ascii_punctuation()))
        .map_or(rest.len(), |(idx, _)| idx);
    &rest[start..]
}

/// Drop the ASCII base of a leading keycap sequence (`[0-9#*]` followed by
/// U+FE0F or U+20E3), leaving the combiners for the decorative run.
fn strip_keycap_base(s: &str) -> Option<&str> {
    let mut chars = s.chars();
    let base = chars.next()?;
    let next = chars.next()?;
    let keycap =
        matches!(base, '0'..='9' | '#' | '*') && matches!(next, '\u{FE0F}' | '\u{20E3}');
    keycap.then(|| &s[base.len_utf8()..])
}

/// Lowercased, prefix-stripped form used for the relaxed comparison.
pub fn match_key(s: &str) -> String {
    strip_decorative_prefix(s).to_lowercase()
}

fn is_decorative(c: char) -> bool {
    !c.is_ascii() && !c.is_alphanumeric()
}

fn matches_any(name: &str, id: Option<&str>, items: &[String]) -> bool {
    if items.is_empty() {
        return false;
    }

    let name_lower = name.to_lowercase();
    if items.iter().any(|item| item.to_lowercase() == name_lower) {
        return true;
    }

    if let Some(id) = id {
        let id_lower = id.to_lowercase();
        if items.iter().any(|item| item.to_lowercase() == id_lower) {
            return true;
        }
    }

    // A name that is nothing but decoration must not match every other
    // decoration-only entry.
    let key = match_key(name);
    if key.is_empty() {
        return false;
    }
    items.iter().any(|item| match_key(item) == key)
}
