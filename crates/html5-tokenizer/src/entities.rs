//! Character-reference resolution (spec §4.2, component 2).
//!
//! Two independent pieces live here:
//!
//! - Numeric reference code-point mapping: the Windows-1252 override table,
//!   the invalid-number set (surrogates, > U+10FFFF, NUL), and the
//!   invalid-range set (noncharacters, flagged C0/C1 controls).
//! - Named reference lookup: longest-prefix matching against a table of
//!   entity names.
//!
//! Per spec §1, "the entity-name dictionary's contents" are explicitly out
//! of scope ("specified only as an opaque lookup service"); the full
//! ~2,200-name HTML5 table is not reproduced here. The lookup *mechanism*
//! (longest-prefix match, including names that are valid without a
//! trailing `;`) is fully implemented against a representative subset,
//! mirroring the teacher's own `entities::decode_entities`, which ships
//! only "a tiny named set" with the same caveat. A production deployment
//! would swap `NAMED_REFERENCES` for the full generated table (see
//! `sirreal-wp-html-api-rs`'s `entities`/`gen-entities` crates for the
//! shape such a table takes: a build-time-generated map keyed by name).

use crate::error::ParseErrorCode;
use std::collections::HashMap;

lazy_static::lazy_static! {
    /// Representative subset of the named character reference table,
    /// keyed by the full reference name *without* the leading `&`.
    /// Names without a trailing `;` are legacy references (HTML Living
    /// Standard "named character references" table marks these `Y`/blank in
    /// its "without a semicolon" column); everything else requires `;`.
    static ref NAMED_REFERENCES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        // Legacy, semicolon-optional references.
        m.insert("amp", "&");
        m.insert("amp;", "&");
        m.insert("lt", "<");
        m.insert("lt;", "<");
        m.insert("gt", ">");
        m.insert("gt;", ">");
        m.insert("quot", "\"");
        m.insert("quot;", "\"");
        m.insert("apos;", "'");
        m.insert("nbsp", "\u{00A0}");
        m.insert("nbsp;", "\u{00A0}");
        m.insert("copy", "\u{00A9}");
        m.insert("copy;", "\u{00A9}");
        m.insert("reg", "\u{00AE}");
        m.insert("reg;", "\u{00AE}");
        // Semicolon-required references.
        m.insert("hellip;", "\u{2026}");
        m.insert("mdash;", "\u{2014}");
        m.insert("ndash;", "\u{2013}");
        m.insert("trade;", "\u{2122}");
        m.insert("times;", "\u{00D7}");
        m.insert("divide;", "\u{00F7}");
        m.insert("frac12;", "\u{00BD}");
        m.insert("frac14;", "\u{00BC}");
        m.insert("plusmn;", "\u{00B1}");
        m.insert("laquo;", "\u{00AB}");
        m.insert("raquo;", "\u{00BB}");
        m.insert("euro;", "\u{20AC}");
        m.insert("bull;", "\u{2022}");
        m.insert("middot;", "\u{00B7}");
        m.insert("deg;", "\u{00B0}");
        m.insert("sect;", "\u{00A7}");
        m.insert("para;", "\u{00B6}");
        m.insert("larr;", "\u{2190}");
        m.insert("rarr;", "\u{2192}");
        m.insert("uarr;", "\u{2191}");
        m.insert("darr;", "\u{2193}");
        m.insert("alpha;", "\u{03B1}");
        m.insert("beta;", "\u{03B2}");
        m.insert("gamma;", "\u{03B3}");
        m.insert("delta;", "\u{03B4}");
        m.insert("pi;", "\u{03C0}");
        m.insert("sigma;", "\u{03C3}");
        m.insert("omega;", "\u{03C9}");
        m.insert("infin;", "\u{221E}");
        m.insert("ne;", "\u{2260}");
        m.insert("le;", "\u{2264}");
        m.insert("ge;", "\u{2265}");
        m
    };

    /// Windows-1252 override table: numeric references in 0x80..=0x9F map
    /// to the Windows-1252 code page's glyph at that byte rather than the
    /// corresponding C1 control, per the HTML parsing error-recovery rules.
    static ref WINDOWS_1252_OVERRIDES: HashMap<u32, char> = {
        let table: &[(u32, char)] = &[
            (0x80, '\u{20AC}'), (0x82, '\u{201A}'), (0x83, '\u{0192}'),
            (0x84, '\u{201E}'), (0x85, '\u{2026}'), (0x86, '\u{2020}'),
            (0x87, '\u{2021}'), (0x88, '\u{02C6}'), (0x89, '\u{2030}'),
            (0x8A, '\u{0160}'), (0x8B, '\u{2039}'), (0x8C, '\u{0152}'),
            (0x8E, '\u{017D}'), (0x91, '\u{2018}'), (0x92, '\u{2019}'),
            (0x93, '\u{201C}'), (0x94, '\u{201D}'), (0x95, '\u{2022}'),
            (0x96, '\u{2013}'), (0x97, '\u{2014}'), (0x98, '\u{02DC}'),
            (0x99, '\u{2122}'), (0x9A, '\u{0161}'), (0x9B, '\u{203A}'),
            (0x9C, '\u{0153}'), (0x9E, '\u{017E}'), (0x9F, '\u{0178}'),
        ];
        table.iter().copied().collect()
    };
}

/// Longest-prefix match of `candidate` (the full buffered name, which may
/// or may not end in `;`) against the named-reference table.
///
/// Returns `(matched_len_in_chars, replacement)` for the longest prefix of
/// `candidate` that is itself a table key. The caller is responsible for
/// stepping the source cursor back to just past the matched length (spec
/// §4.2's "back-off" procedure).
pub fn longest_named_prefix(candidate: &str) -> Option<(usize, &'static str)> {
    let mut best: Option<(usize, &'static str)> = None;
    for (&name, &replacement) in NAMED_REFERENCES.iter() {
        if candidate.starts_with(name) {
            let len = name.chars().count();
            if best.is_none_or(|(best_len, _)| len > best_len) {
                best = Some((len, replacement));
            }
        }
    }
    best
}

/// Whether `name` (with or without trailing `;`) is a known reference name
/// at all, used by tests and by callers that want an existence check
/// without committing to the longest-prefix result.
pub fn is_known_reference_name(name: &str) -> bool {
    NAMED_REFERENCES.contains_key(name)
}

/// Outcome of mapping a numeric character reference's code point to an
/// actual `char`, per spec §4.2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NumericResolution {
    pub character: char,
    pub error: Option<ParseErrorCode>,
}

/// Map a parsed numeric-reference code point to a character and an
/// optional associated error, per spec §4.2's three-tier table.
pub fn resolve_numeric_code_point(cp: u32) -> NumericResolution {
    if cp == 0 || crate::char_class::is_surrogate(cp) || cp > 0x10FFFF {
        return NumericResolution {
            character: crate::char_class::REPLACEMENT_CHARACTER,
            error: Some(ParseErrorCode::InvalidNumber),
        };
    }
    if let Some(&replacement) = WINDOWS_1252_OVERRIDES.get(&cp) {
        return NumericResolution {
            character: replacement,
            error: Some(ParseErrorCode::InvalidCode),
        };
    }
    // `cp` is valid and not a surrogate here, so this always succeeds.
    let character = char::from_u32(cp).unwrap_or(crate::char_class::REPLACEMENT_CHARACTER);
    if crate::char_class::is_noncharacter(cp) || crate::char_class::is_flagged_control(cp) {
        return NumericResolution {
            character,
            error: Some(ParseErrorCode::InvalidRange),
        };
    }
    NumericResolution {
        character,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_prefix_prefers_longer_match() {
        // "amp;" and "amp" are both valid keys; the full buffer should win.
        assert_eq!(longest_named_prefix("amp;"), Some((4, "&")));
        assert_eq!(longest_named_prefix("ampersand"), Some((3, "&")));
    }

    #[test]
    fn longest_prefix_misses_on_unknown_name() {
        assert_eq!(longest_named_prefix("notarealentity;"), None);
    }

    #[test]
    fn semicolon_required_entities_do_not_match_without_it() {
        assert_eq!(longest_named_prefix("hellip"), None);
        assert_eq!(longest_named_prefix("hellip;"), Some((7, "\u{2026}")));
    }

    #[test]
    fn numeric_resolution_replaces_null_and_surrogates() {
        assert_eq!(
            resolve_numeric_code_point(0).character,
            crate::char_class::REPLACEMENT_CHARACTER
        );
        assert_eq!(
            resolve_numeric_code_point(0xD800).error,
            Some(ParseErrorCode::InvalidNumber)
        );
    }

    #[test]
    fn numeric_resolution_applies_windows_1252_override() {
        let res = resolve_numeric_code_point(0x80);
        assert_eq!(res.character, '\u{20AC}');
        assert_eq!(res.error, Some(ParseErrorCode::InvalidCode));
    }

    #[test]
    fn numeric_resolution_flags_noncharacters_but_still_returns_them() {
        let res = resolve_numeric_code_point(0xFFFE);
        assert_eq!(res.character, '\u{FFFE}');
        assert_eq!(res.error, Some(ParseErrorCode::InvalidRange));
    }

    #[test]
    fn numeric_resolution_passes_through_ordinary_code_points() {
        let res = resolve_numeric_code_point(0x41);
        assert_eq!(res.character, 'A');
        assert_eq!(res.error, None);
    }
}
