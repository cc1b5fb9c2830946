//! Line/column/offset tracking with CRLF normalization (spec §3, §4.1).
//!
//! The tracker observes the *raw* characters the source yields and reports
//! the *normalized* position a consumer would see after CR/CRLF -> LF
//! folding, without requiring the source itself to do any folding. This
//! keeps `TextSource` a dumb random-access buffer (§6) while letting
//! `back()` stay the exact inverse of `advance()`, which a source-level
//! fold could not guarantee on its own (folding loses the information
//! needed to un-fold one step at a time).

/// A single (line, column) position, 1-based line, 0-based column, plus the
/// absolute offset into the source that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Position {
    pub const START: Position = Position {
        line: 1,
        column: 0,
        offset: 0,
    };
}

/// What happened to a raw character as it passed through normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fold {
    /// Reported verbatim; column advances by one.
    Plain,
    /// A bare CR, or a CR LF pair collapsed to a single LF; line advances.
    Newline { absorbed_lf: bool },
}

/// Tracks (line, column, offset) across forward and backward motion.
///
/// Invariant (spec §3): for any offset reachable by `advance`/`back`, the
/// position reported is identical to the position reached by advancing from
/// the start. This is maintained by pushing the previous column onto a
/// stack on every newline and popping it on the matching `back`.
#[derive(Clone, Debug)]
pub struct PositionTracker {
    position: Position,
    column_stack: Vec<u32>,
    /// Whether the *previous* forward step absorbed a following LF (i.e. it
    /// was the CR half of a CRLF pair), so `back` knows whether to also
    /// rewind the raw offset past that LF.
    absorbed_lf_stack: Vec<bool>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self {
            position: Position::START,
            column_stack: Vec::new(),
            absorbed_lf_stack: Vec::new(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Record the forward consumption of one raw input character.
    ///
    /// `raw` is the character exactly as read from the source (before any
    /// CR/LF folding); `absorbed_lf` is true when this step is a CR that is
    /// immediately followed by LF, so the caller will additionally advance
    /// the raw offset past that LF without a second call to `advance`.
    pub fn advance(&mut self, raw: char, absorbed_lf: bool) {
        self.position.offset += if absorbed_lf {
            raw.len_utf8() + 1
        } else {
            raw.len_utf8()
        };
        if raw == '\n' || raw == '\r' {
            self.column_stack.push(self.position.column);
            self.absorbed_lf_stack.push(absorbed_lf);
            self.position.line += 1;
            self.position.column = 1;
        } else {
            self.position.column += 1;
        }
    }

    /// Undo the most recent `advance`. Panics if there is nothing to undo
    /// below the start position, which would indicate a caller bug (stepping
    /// back past offset 0).
    pub fn back(&mut self, raw: char, raw_byte_len: usize) {
        if raw == '\n' || raw == '\r' {
            let absorbed_lf = self
                .absorbed_lf_stack
                .pop()
                .expect("back() past a newline with no matching advance()");
            let prev_column = self
                .column_stack
                .pop()
                .expect("back() past a newline with no matching advance()");
            self.position.line -= 1;
            self.position.column = prev_column;
            self.position.offset -= if absorbed_lf {
                raw_byte_len + 1
            } else {
                raw_byte_len
            };
        } else {
            self.position.column -= 1;
            self.position.offset -= raw_byte_len;
        }
    }
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_is_line_1_column_0() {
        let tracker = PositionTracker::new();
        assert_eq!(tracker.position(), Position::START);
    }

    #[test]
    fn advance_over_plain_chars_increments_column() {
        let mut tracker = PositionTracker::new();
        tracker.advance('a', false);
        tracker.advance('b', false);
        let pos = tracker.position();
        assert_eq!((pos.line, pos.column), (1, 2));
    }

    #[test]
    fn advance_over_newline_resets_column_and_increments_line() {
        let mut tracker = PositionTracker::new();
        tracker.advance('a', false);
        tracker.advance('\n', false);
        let pos = tracker.position();
        assert_eq!((pos.line, pos.column), (2, 1));
    }

    #[test]
    fn back_is_exact_inverse_of_advance_across_newline() {
        let mut tracker = PositionTracker::new();
        tracker.advance('a', false);
        tracker.advance('\n', false);
        tracker.advance('b', false);
        let after_b = tracker.position();
        assert_eq!((after_b.line, after_b.column), (2, 2));

        tracker.back('b', 1);
        tracker.back('\n', 1);
        let back_to_a = tracker.position();
        assert_eq!((back_to_a.line, back_to_a.column), (1, 1));

        tracker.back('a', 1);
        assert_eq!(tracker.position(), Position::START);
    }

    #[test]
    fn crlf_pair_absorbs_lf_and_back_consumes_one_raw_step() {
        let mut tracker = PositionTracker::new();
        // "a\r\nb" with CR absorbing the following LF.
        tracker.advance('a', false);
        tracker.advance('\r', true);
        tracker.advance('b', false);
        let pos = tracker.position();
        assert_eq!(pos.offset, "a\r\n".len() + 1);

        tracker.back('b', 1);
        tracker.back('\r', 1);
        let pos = tracker.position();
        assert_eq!(pos.offset, 1);
        assert_eq!((pos.line, pos.column), (1, 1));
    }
}
