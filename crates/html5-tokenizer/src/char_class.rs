//! ASCII character classification used throughout the tokenizer.
//!
//! These mirror the predicates the HTML Living Standard states inline
//! ("ASCII alpha", "ASCII upper hex digit", ...) rather than reaching for
//! `char::is_alphanumeric`, which is Unicode-aware and wrong for markup
//! grammar (e.g. tag names only ever fold `A-Z`/`a-z`, never `Ⱥ`/`ⱥ`).

/// U+0000 NULL is replaced with U+FFFD in most tokenizer contexts.
pub const NULL: char = '\u{0000}';
pub const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

#[inline]
pub fn is_ascii_upper_alpha(ch: char) -> bool {
    ch.is_ascii_uppercase()
}

#[inline]
pub fn is_ascii_alpha(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

#[inline]
pub fn is_ascii_alphanumeric(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
}

#[inline]
pub fn is_ascii_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

#[inline]
pub fn is_ascii_hex_digit(ch: char) -> bool {
    ch.is_ascii_hexdigit()
}

/// Whitespace per the "space characters" production: tab, LF, FF, CR, space.
///
/// Note this is *not* `char::is_whitespace` (which would also match U+00A0
/// and friends).
#[inline]
pub fn is_space_character(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

/// Name characters for a character-reference name buffer: ASCII alphanumeric.
#[inline]
pub fn is_reference_name_char(ch: char) -> bool {
    is_ascii_alphanumeric(ch)
}

/// Characters that terminate a tag name and dispatch to the next sub-state.
#[inline]
pub fn is_tag_name_stop(ch: char) -> bool {
    ch == '>' || ch == '/' || is_space_character(ch)
}

/// Surrogate code points: never valid in a numeric character reference.
#[inline]
pub fn is_surrogate(cp: u32) -> bool {
    (0xD800..=0xDFFF).contains(&cp)
}

/// Noncharacters per the Unicode standard, used by the "invalid-range" check:
/// U+FDD0..=U+FDEF, and the last two code points of every plane
/// (U+xFFFE/U+xFFFF for x in 0..=0x10).
#[inline]
pub fn is_noncharacter(cp: u32) -> bool {
    (0xFDD0..=0xFDEF).contains(&cp) || matches!(cp & 0xFFFE, 0xFFFE)
}

/// The "control character reference" set the spec flags with *invalid-range*:
/// C0 controls other than space, plus a handful of C1 controls not already
/// covered by the Windows-1252 override table.
#[inline]
pub fn is_flagged_control(cp: u32) -> bool {
    matches!(cp, 0x01..=0x08 | 0x0B | 0x0D..=0x1F | 0x7F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_characters_match_spec_set() {
        for ch in ['\t', '\n', '\x0C', '\r', ' '] {
            assert!(is_space_character(ch));
        }
        assert!(!is_space_character('\u{00A0}'));
    }

    #[test]
    fn tag_name_stop_set() {
        assert!(is_tag_name_stop('>'));
        assert!(is_tag_name_stop('/'));
        assert!(is_tag_name_stop(' '));
        assert!(!is_tag_name_stop('a'));
    }

    #[test]
    fn surrogates_detected() {
        assert!(is_surrogate(0xD800));
        assert!(is_surrogate(0xDFFF));
        assert!(!is_surrogate(0xE000));
    }

    #[test]
    fn noncharacters_detected() {
        assert!(is_noncharacter(0xFFFE));
        assert!(is_noncharacter(0xFDD0));
        assert!(!is_noncharacter(0x41));
    }
}
