//! Random-access character cursor over decoded input (spec §3, §6).
//!
//! `TextSource` is the tokenizer's only view of the document: a finite
//! sequence of `char`s with a mutable index, supporting read-and-advance,
//! bounded peek, step-back, and absolute seek. CR and CR-LF are folded to
//! LF here so every other component only ever observes normalized text,
//! per spec §3 ("CR and CR LF collapse to LF before reaching the
//! tokenizer").
//!
//! Byte decoding is out of scope (spec §1): a `TextSource` is constructed
//! from an already-decoded `&str`/`String`.

use crate::position::{Position, PositionTracker};

/// Sentinel returned for reads past the end of input, distinct from any
/// valid input character. Matches the convention used by reference HTML
/// tokenizers (U+FFFF, a noncharacter that can never be produced by valid
/// UTF-8 decoding of a well-formed document).
pub const EOF: char = '\u{FFFF}';

/// One step of forward consumption, recorded so `back()` can undo it exactly.
#[derive(Clone, Copy, Debug)]
struct ConsumedStep {
    /// The raw (pre-normalization) character at the position this step
    /// started from.
    raw: char,
    /// True if this step was a CR immediately followed by LF, so it
    /// consumed two raw characters from the buffer.
    absorbed_lf: bool,
}

/// A finite, randomly addressable sequence of characters.
///
/// Invariants (spec §3): `index` is always in `[0, len]`; `read_current` at
/// `index == len` returns [`EOF`]; `seek` is well-defined for any index in
/// range.
#[derive(Clone, Debug)]
pub struct TextSource {
    raw: Vec<char>,
    /// Index into `raw`, in raw (pre-normalization) character units.
    raw_index: usize,
    position: PositionTracker,
    /// History of forward steps taken from the start of the buffer, used to
    /// make `back()` the exact inverse of `advance()` (spec §4.1) without
    /// re-deriving normalization backwards from raw bytes alone.
    history: Vec<ConsumedStep>,
}

impl TextSource {
    pub fn new(text: &str) -> Self {
        Self {
            raw: text.chars().collect(),
            raw_index: 0,
            position: PositionTracker::new(),
            history: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Current logical index: the number of forward steps taken so far.
    /// This is what `seek` expects and what `index()` reports (spec §6).
    pub fn index(&self) -> usize {
        self.history.len()
    }

    pub fn position(&self) -> Position {
        self.position.position()
    }

    /// Read the character at the current index without advancing.
    pub fn peek(&self) -> char {
        self.peek_raw_normalized(self.raw_index)
    }

    /// Read up to `n` characters ahead without advancing the index. Shorter
    /// than `n` if EOF is reached first; never includes the EOF sentinel.
    pub fn peek_n(&self, n: usize) -> String {
        let mut out = String::with_capacity(n);
        let mut idx = self.raw_index;
        for _ in 0..n {
            if idx >= self.raw.len() {
                break;
            }
            let ch = self.raw[idx];
            if ch == '\r' {
                out.push('\n');
                idx += if self.raw.get(idx + 1) == Some(&'\n') {
                    2
                } else {
                    1
                };
            } else {
                out.push(ch);
                idx += 1;
            }
        }
        out
    }

    /// Read the current character and advance past it.
    pub fn read(&mut self) -> char {
        if self.raw_index >= self.raw.len() {
            return EOF;
        }
        let raw = self.raw[self.raw_index];
        let absorbed_lf = raw == '\r' && self.raw.get(self.raw_index + 1) == Some(&'\n');
        let logical = if raw == '\r' { '\n' } else { raw };

        self.position.advance(raw, absorbed_lf);
        self.raw_index += if absorbed_lf { 2 } else { 1 };
        self.history.push(ConsumedStep { raw, absorbed_lf });

        logical
    }

    /// Step back by `n` logical characters (spec §6 `step-back-N`).
    ///
    /// Each step undoes exactly one prior `read()`, including its effect on
    /// the raw index and the position tracker, so `seek(idx)` afterward is
    /// consistent with having never read past `idx` (spec invariant 2).
    pub fn back(&mut self, n: usize) {
        for _ in 0..n {
            let Some(step) = self.history.pop() else {
                // Stepping back past the start is a caller bug; the
                // producer contract only promises validity for reachable
                // indices.
                panic!("TextSource::back called with no prior read to undo");
            };
            let raw_len = step.raw.len_utf8();
            self.position.back(step.raw, raw_len);
            self.raw_index -= if step.absorbed_lf { 2 } else { 1 };
        }
    }

    /// Move to an absolute logical index previously observed via `index()`.
    ///
    /// Implemented by replaying from the nearer of (start, current index)
    /// rather than re-deriving raw offsets arithmetically, since CRLF
    /// collapsing makes the raw-to-logical mapping non-uniform (spec §9).
    pub fn seek(&mut self, target: usize) {
        assert!(
            target <= self.history.len() || target <= self.len(),
            "seek target out of range"
        );
        if target <= self.index() {
            let steps = self.index() - target;
            self.back(steps);
        } else {
            while self.index() < target && self.raw_index < self.raw.len() {
                self.read();
            }
        }
    }

    fn peek_raw_normalized(&self, raw_index: usize) -> char {
        match self.raw.get(raw_index) {
            None => EOF,
            Some(&'\r') => '\n',
            Some(&ch) => ch,
        }
    }
}

impl std::ops::Index<usize> for TextSource {
    type Output = char;

    /// Returns the character at absolute raw index `i`, or a reference to
    /// the EOF sentinel when `i` is out of range.
    ///
    /// This deliberately does not panic on out-of-range `i`, unlike typical
    /// `Index` impls: spec §6 defines `source[i]` as always producing a
    /// character value, with EOF acting as the in-band out-of-range marker.
    fn index(&self, i: usize) -> &char {
        match self.raw.get(i) {
            Some(ch) if *ch != '\r' => ch,
            Some(_) => &'\n',
            None => &EOF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_plain_text() {
        let mut src = TextSource::new("abc");
        assert_eq!(src.read(), 'a');
        assert_eq!(src.read(), 'b');
        assert_eq!(src.read(), 'c');
        assert_eq!(src.read(), EOF);
    }

    #[test]
    fn cr_is_reported_as_lf() {
        let mut src = TextSource::new("a\rb");
        assert_eq!(src.read(), 'a');
        assert_eq!(src.read(), '\n');
        assert_eq!(src.read(), 'b');
    }

    #[test]
    fn crlf_collapses_to_single_lf() {
        let mut src = TextSource::new("a\r\nb");
        assert_eq!(src.read(), 'a');
        assert_eq!(src.read(), '\n');
        assert_eq!(src.read(), 'b');
        assert_eq!(src.read(), EOF);
    }

    #[test]
    fn peek_does_not_advance() {
        let mut src = TextSource::new("ab");
        assert_eq!(src.peek(), 'a');
        assert_eq!(src.peek(), 'a');
        assert_eq!(src.read(), 'a');
        assert_eq!(src.peek(), 'b');
    }

    #[test]
    fn peek_n_folds_crlf_and_stops_at_eof() {
        let src = TextSource::new("a\r\nbc");
        assert_eq!(src.peek_n(10), "a\nbc");
    }

    #[test]
    fn back_then_read_reproduces_same_characters() {
        let mut src = TextSource::new("a\r\nbc");
        let a = src.read();
        let nl = src.read();
        let b = src.read();
        src.back(2);
        assert_eq!(src.read(), nl);
        assert_eq!(src.read(), b);
        let _ = a;
    }

    #[test]
    fn seek_to_start_resets_position() {
        let mut src = TextSource::new("a\nbc");
        src.read();
        src.read();
        src.read();
        src.seek(0);
        assert_eq!(src.index(), 0);
        assert_eq!(src.position(), Position::START);
        assert_eq!(src.read(), 'a');
    }

    #[test]
    fn seek_forward_from_start_matches_direct_read() {
        let mut direct = TextSource::new("abcdef");
        direct.read();
        direct.read();
        direct.read();
        let direct_pos = direct.position();

        let mut seeked = TextSource::new("abcdef");
        seeked.seek(3);
        assert_eq!(seeked.position(), direct_pos);
        assert_eq!(seeked.index(), 3);
    }

    #[test]
    fn index_operator_returns_eof_sentinel_out_of_range() {
        let src = TextSource::new("a");
        assert_eq!(src[0], 'a');
        assert_eq!(src[5], EOF);
    }

    // Invariant 2 (spec §8): for any reachable index, the position reported
    // after a read -> back -> read sequence equals the position reported by
    // a direct read to that index.
    #[quickcheck_macros::quickcheck]
    fn back_is_exact_inverse_of_read(s: String) -> bool {
        let mut src = TextSource::new(&s);
        let len = src.len();
        let mut positions = Vec::with_capacity(len + 1);
        positions.push(src.position());
        for _ in 0..len {
            src.read();
            positions.push(src.position());
        }
        for i in (0..len).rev() {
            src.back(1);
            if src.position() != positions[i] {
                return false;
            }
        }
        true
    }
}
