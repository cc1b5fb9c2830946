//! Character-reference resolution (spec §4.2, component 2).
//!
//! Both numeric (`&#…`) and named (`&name…`) forms are resolved
//! synchronously inside a single call from whichever state read the `&`
//! (`Data`, `RCData`, or an attribute-value state): the character-reference
//! states in [`TokenizerState`](super::TokenizerState) exist only to name
//! the spec's states, not to be dispatched through `step()` (see the
//! `unreachable!` arm in `mod.rs`). This mirrors the teacher's
//! `entities::decode_entities` fast path, generalized to the full
//! numeric/named grammar and the attribute-value back-off rule spec §4.2
//! requires.

use super::Tokenizer;
use crate::char_class;
use crate::entities;
use crate::error::{FatalParseError, ParseErrorCode};
use crate::text_source::EOF;

impl Tokenizer {
    /// Entry point called right after the state that read `&` advanced past
    /// it. `self.return_state` and `self.char_ref_in_attribute` must already
    /// be set by the caller (spec §4.2's two call sites: data/RCData, and
    /// quoted/unquoted attribute values).
    pub(super) fn consume_character_reference(&mut self) -> Result<(), FatalParseError> {
        let start_index = self.source.index();
        match self.peek() {
            '#' => self.consume_numeric_character_reference(start_index),
            c if char_class::is_reference_name_char(c) => {
                self.consume_named_character_reference(start_index)
            }
            _ => {
                self.append_char_ref_text("&");
                self.transition(self.return_state);
                Ok(())
            }
        }
    }

    fn consume_named_character_reference(&mut self, start_index: usize) -> Result<(), FatalParseError> {
        let mut buffer = String::new();
        loop {
            if buffer.chars().count() >= 31 {
                break;
            }
            let ch = self.read();
            if ch == ';' {
                buffer.push(ch);
                break;
            }
            if char_class::is_reference_name_char(ch) {
                buffer.push(ch);
            } else {
                if ch != EOF {
                    self.back(1);
                }
                break;
            }
        }

        match entities::longest_named_prefix(&buffer) {
            Some((matched_len, replacement)) => {
                let ends_with_semicolon = buffer.chars().nth(matched_len - 1) == Some(';');
                self.seek(start_index + matched_len);
                if !ends_with_semicolon {
                    if self.char_ref_in_attribute {
                        let next = self.peek();
                        if next == '=' || char_class::is_ascii_alphanumeric(next) {
                            if next == '=' {
                                self.report(ParseErrorCode::AttributeEqualsFound)?;
                            }
                            self.seek(start_index);
                            self.append_char_ref_text("&");
                            self.transition(self.return_state);
                            return Ok(());
                        }
                    }
                    self.report(ParseErrorCode::NotTerminated)?;
                }
                self.append_char_ref_text(replacement);
                self.transition(self.return_state);
                Ok(())
            }
            None => {
                self.seek(start_index);
                self.append_char_ref_text("&");
                self.transition(self.return_state);
                Ok(())
            }
        }
    }

    fn consume_numeric_character_reference(&mut self, start_index: usize) -> Result<(), FatalParseError> {
        self.read(); // consume '#'
        let is_hex = matches!(self.peek(), 'x' | 'X');
        if is_hex {
            self.read();
        }

        self.char_ref_code = 0;
        let mut digit_count = 0usize;
        loop {
            let ch = self.peek();
            let digit = if is_hex { ch.to_digit(16) } else { ch.to_digit(10) };
            match digit {
                Some(d) => {
                    self.read();
                    digit_count += 1;
                    self.char_ref_code = self
                        .char_ref_code
                        .saturating_mul(if is_hex { 16 } else { 10 })
                        .saturating_add(d);
                }
                None => break,
            }
        }

        if digit_count == 0 {
            self.report(ParseErrorCode::WrongNumber)?;
            self.seek(start_index);
            self.append_char_ref_text("&");
            self.transition(self.return_state);
            return Ok(());
        }

        if self.peek() == ';' {
            self.read();
        } else {
            self.report(ParseErrorCode::SemicolonMissing)?;
        }

        let resolution = entities::resolve_numeric_code_point(self.char_ref_code);
        if let Some(code) = resolution.error {
            self.report(code)?;
        }
        let mut text = [0u8; 4];
        self.append_char_ref_text(resolution.character.encode_utf8(&mut text));
        self.transition(self.return_state);
        Ok(())
    }

    fn append_char_ref_text(&mut self, text: &str) {
        if self.char_ref_in_attribute {
            self.current_attr_value.push_str(text);
        } else {
            for ch in text.chars() {
                self.push_text_char(ch);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::token::TokenKind;
    use crate::tokenizer::Tokenizer;

    fn first_text(input: &str) -> String {
        let mut tok = Tokenizer::from_str(input);
        tok.read_next().unwrap();
        match &tok.current().unwrap().kind {
            TokenKind::Text(text) => text.clone(),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn named_reference_with_semicolon_resolves() {
        assert_eq!(first_text("&amp;"), "&");
        assert_eq!(first_text("&hellip;"), "\u{2026}");
    }

    #[test]
    fn legacy_named_reference_without_semicolon_resolves() {
        assert_eq!(first_text("&amp rest"), "& rest");
    }

    #[test]
    fn unknown_name_falls_back_to_literal_ampersand() {
        assert_eq!(first_text("&notarealentity;"), "&notarealentity;");
    }

    #[test]
    fn ampersand_followed_by_non_name_char_is_literal() {
        assert_eq!(first_text("& foo"), "& foo");
    }

    #[test]
    fn decimal_numeric_reference_resolves() {
        assert_eq!(first_text("&#65;"), "A");
    }

    #[test]
    fn hex_numeric_reference_resolves() {
        assert_eq!(first_text("&#x41;"), "A");
    }

    #[test]
    fn numeric_reference_without_digits_is_literal() {
        assert_eq!(first_text("&#;"), "&#;");
    }

    #[test]
    fn numeric_reference_missing_semicolon_is_reprocessed() {
        assert_eq!(first_text("&#65A"), "AA");
    }

    #[test]
    fn long_name_without_semicolon_backs_off_to_longest_prefix() {
        // "ampersand" has no entry, but its first three characters "amp"
        // is a valid legacy (semicolon-optional) reference.
        assert_eq!(first_text("&ampersand"), "&ersand");
    }

    #[test]
    fn attribute_value_legacy_reference_aborts_before_equals() {
        let mut tok = Tokenizer::from_str(r#"<a b="&amp=2">"#);
        tok.read_next().unwrap();
        match &tok.current().unwrap().kind {
            TokenKind::StartTag { attributes, .. } => {
                assert_eq!(attributes[0].value, "&amp=2");
            }
            other => panic!("expected start tag, got {other:?}"),
        }
    }
}
