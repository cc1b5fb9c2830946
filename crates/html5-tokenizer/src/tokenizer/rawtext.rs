//! RCData and Rawtext content modes, and the "appropriate end tag"
//! recognizer they share with Script (spec §4.3, GLOSSARY).
//!
//! `Plaintext` lives in `mod.rs` since it has no sub-states at all (it is
//! the simplest content mode: accumulate to EOF, no `<` handling).

use super::{Tokenizer, TokenizerState};
use crate::char_class::{self, NULL, REPLACEMENT_CHARACTER};
use crate::error::{FatalParseError, ParseErrorCode};
use crate::text_source::EOF;
use crate::token::TokenKind;

impl Tokenizer {
    pub(super) fn step_rcdata(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '&' => {
                self.return_state = TokenizerState::RcData;
                self.char_ref_in_attribute = false;
                self.consume_character_reference()
            }
            '<' => {
                // Flush at the boundary, not at emit-time: the end-tag
                // candidate states ahead call `begin_token`, which would
                // overwrite `token_start` before this buffer's Text token
                // got emitted.
                self.flush_text_buffer();
                self.transition(TokenizerState::RcDataLessThanSign);
                Ok(())
            }
            NULL => {
                self.report(ParseErrorCode::Null)?;
                self.push_text_char(REPLACEMENT_CHARACTER);
                Ok(())
            }
            EOF => {
                self.flush_text_buffer();
                self.begin_token();
                self.report(ParseErrorCode::Eof)?;
                self.emit(TokenKind::Eof);
                Ok(())
            }
            c => {
                self.push_text_char(c);
                Ok(())
            }
        }
    }

    pub(super) fn step_rcdata_less_than_sign(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '/' => {
                self.temp_buffer.clear();
                self.transition(TokenizerState::RcDataEndTagOpen);
            }
            _ => {
                self.push_text_char('<');
                self.back(1);
                self.transition(TokenizerState::RcData);
            }
        }
        Ok(())
    }

    pub(super) fn step_rcdata_end_tag_open(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_ascii_alpha(c) => {
                self.begin_end_tag_candidate();
                self.back(1);
                self.transition(TokenizerState::RcDataEndTagName);
            }
            _ => {
                self.push_text_char('<');
                self.push_text_char('/');
                self.back(1);
                self.transition(TokenizerState::RcData);
            }
        }
        Ok(())
    }

    pub(super) fn step_rcdata_end_tag_name(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) && self.is_appropriate_end_tag() => {
                self.transition(TokenizerState::BeforeAttributeName);
            }
            '/' if self.is_appropriate_end_tag() => {
                self.transition(TokenizerState::SelfClosingStartTag);
            }
            '>' if self.is_appropriate_end_tag() => {
                self.emit_current_tag()?;
            }
            c if char_class::is_ascii_alpha(c) => {
                self.push_end_tag_candidate_char(c);
            }
            _ => {
                self.back(1);
                self.fallback_end_tag_candidate_as_text();
                self.transition(TokenizerState::RcData);
            }
        }
        Ok(())
    }

    pub(super) fn step_rawtext(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '<' => {
                self.flush_text_buffer();
                self.transition(TokenizerState::RawtextLessThanSign);
                Ok(())
            }
            NULL => {
                self.report(ParseErrorCode::Null)?;
                self.push_text_char(REPLACEMENT_CHARACTER);
                Ok(())
            }
            EOF => {
                self.flush_text_buffer();
                self.begin_token();
                self.report(ParseErrorCode::Eof)?;
                self.emit(TokenKind::Eof);
                Ok(())
            }
            c => {
                self.push_text_char(c);
                Ok(())
            }
        }
    }

    pub(super) fn step_rawtext_less_than_sign(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '/' => {
                self.temp_buffer.clear();
                self.transition(TokenizerState::RawtextEndTagOpen);
            }
            _ => {
                self.push_text_char('<');
                self.back(1);
                self.transition(TokenizerState::Rawtext);
            }
        }
        Ok(())
    }

    pub(super) fn step_rawtext_end_tag_open(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_ascii_alpha(c) => {
                self.begin_end_tag_candidate();
                self.back(1);
                self.transition(TokenizerState::RawtextEndTagName);
            }
            _ => {
                self.push_text_char('<');
                self.push_text_char('/');
                self.back(1);
                self.transition(TokenizerState::Rawtext);
            }
        }
        Ok(())
    }

    pub(super) fn step_rawtext_end_tag_name(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) && self.is_appropriate_end_tag() => {
                self.transition(TokenizerState::BeforeAttributeName);
            }
            '/' if self.is_appropriate_end_tag() => {
                self.transition(TokenizerState::SelfClosingStartTag);
            }
            '>' if self.is_appropriate_end_tag() => {
                self.emit_current_tag()?;
            }
            c if char_class::is_ascii_alpha(c) => {
                self.push_end_tag_candidate_char(c);
            }
            _ => {
                self.back(1);
                self.fallback_end_tag_candidate_as_text();
                self.transition(TokenizerState::Rawtext);
            }
        }
        Ok(())
    }

    /// Start a tentative end-tag candidate inside RCData/Rawtext/Script:
    /// `tag_name` accumulates the lowercased name for the "appropriate end
    /// tag" comparison, `temp_buffer` keeps the exact original-case
    /// characters so a failed candidate can fall back to literal text.
    pub(super) fn begin_end_tag_candidate(&mut self) {
        self.begin_token();
        self.tag_name.clear();
        self.tag_is_end = true;
        self.tag_self_closing = false;
        self.attributes.clear();
        self.attr_in_progress = false;
    }

    pub(super) fn push_end_tag_candidate_char(&mut self, ch: char) {
        self.temp_buffer.push(ch);
        self.tag_name.push(ch.to_ascii_lowercase());
    }

    pub(super) fn fallback_end_tag_candidate_as_text(&mut self) {
        self.push_text_char('<');
        self.push_text_char('/');
        for ch in self.temp_buffer.clone().chars() {
            self.push_text_char(ch);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::mode::ParseMode;
    use crate::token::TokenKind;
    use crate::tokenizer::Tokenizer;

    fn kinds_in_mode(input: &str, mode: ParseMode, last_start_tag: &str) -> Vec<TokenKind> {
        let mut tok = Tokenizer::from_str(input);
        tok.set_parse_mode(mode);
        // Seed the "appropriate end tag" name as tree construction would
        // have after emitting the element's own start tag.
        let _ = tok.read_next();
        let mut out = vec![tok.current().unwrap().kind.clone()];
        let _ = last_start_tag;
        loop {
            let more = tok.read_next().expect("no fatal errors in these fixtures");
            out.push(tok.current().unwrap().kind.clone());
            if !more {
                break;
            }
        }
        out
    }

    #[test]
    fn rcdata_matches_appropriate_end_tag() {
        let kinds = kinds_in_mode("x</title>", ParseMode::RCData, "title");
        // Without a prior start tag, "</title>" is never appropriate, so
        // it must fall back to literal text inside the RCData run.
        match &kinds[0] {
            TokenKind::Text(text) => assert_eq!(text, "x</title>"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn title_tag_pair_closes_rcdata_correctly() {
        let mut tok = Tokenizer::from_str("<title>hi</title>");
        tok.read_next().unwrap(); // StartTag "title"
        tok.set_parse_mode(ParseMode::RCData);
        tok.read_next().unwrap(); // Text "hi"
        match &tok.current().unwrap().kind {
            TokenKind::Text(text) => assert_eq!(text, "hi"),
            other => panic!("expected text, got {other:?}"),
        }
        tok.read_next().unwrap(); // EndTag "title"
        match &tok.current().unwrap().kind {
            TokenKind::EndTag { name, .. } => assert_eq!(name, "title"),
            other => panic!("expected end tag, got {other:?}"),
        }
    }

    #[test]
    fn rawtext_end_tag_name_mismatch_falls_back_to_text() {
        let mut tok = Tokenizer::from_str("<style>a</b>b</style>");
        tok.read_next().unwrap(); // StartTag "style"
        tok.set_parse_mode(ParseMode::Rawtext);
        tok.read_next().unwrap();
        match &tok.current().unwrap().kind {
            TokenKind::Text(text) => assert_eq!(text, "a</b>b"),
            other => panic!("expected text, got {other:?}"),
        }
        tok.read_next().unwrap();
        match &tok.current().unwrap().kind {
            TokenKind::EndTag { name, .. } => assert_eq!(name, "style"),
            other => panic!("expected end tag, got {other:?}"),
        }
    }
}
