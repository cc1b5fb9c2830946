//! Script-data and its escape/double-escape sub-states (spec §4.3,
//! GLOSSARY "script-data escape hierarchy").
//!
//! `temp_buffer` plays two roles here: while forming an end-tag candidate
//! it holds original-case characters (as in `rawtext.rs`); while forming a
//! double-escape start/end it holds the candidate word being compared
//! against the literal `"script"`, per the WHATWG algorithm.

use super::{Tokenizer, TokenizerState};
use crate::char_class::{self, NULL, REPLACEMENT_CHARACTER};
use crate::error::{FatalParseError, ParseErrorCode};
use crate::text_source::EOF;
use crate::token::TokenKind;

impl Tokenizer {
    pub(super) fn step_script_data(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '<' => {
                // Same boundary flush as Data/RCData/Rawtext: the end-tag
                // candidate states ahead overwrite `token_start` via
                // `begin_token` before this text would otherwise be emitted.
                self.flush_text_buffer();
                self.transition(TokenizerState::ScriptDataLessThanSign);
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

    pub(super) fn step_script_data_less_than_sign(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '/' => {
                self.temp_buffer.clear();
                self.transition(TokenizerState::ScriptDataEndTagOpen);
            }
            '!' => {
                self.push_text_char('<');
                self.push_text_char('!');
                self.transition(TokenizerState::ScriptDataEscapeStart);
            }
            _ => {
                self.push_text_char('<');
                self.back(1);
                self.transition(TokenizerState::ScriptData);
            }
        }
        Ok(())
    }

    pub(super) fn step_script_data_end_tag_open(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_ascii_alpha(c) => {
                self.begin_end_tag_candidate();
                self.back(1);
                self.transition(TokenizerState::ScriptDataEndTagName);
            }
            _ => {
                self.push_text_char('<');
                self.push_text_char('/');
                self.back(1);
                self.transition(TokenizerState::ScriptData);
            }
        }
        Ok(())
    }

    pub(super) fn step_script_data_end_tag_name(&mut self) -> Result<(), FatalParseError> {
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
                self.transition(TokenizerState::ScriptData);
            }
        }
        Ok(())
    }

    pub(super) fn step_script_data_escape_start(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '-' => {
                self.push_text_char('-');
                self.transition(TokenizerState::ScriptDataEscapeStartDash);
            }
            _ => {
                self.back(1);
                self.transition(TokenizerState::ScriptData);
            }
        }
        Ok(())
    }

    pub(super) fn step_script_data_escape_start_dash(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '-' => {
                self.push_text_char('-');
                self.transition(TokenizerState::ScriptDataEscapedDashDash);
            }
            _ => {
                self.back(1);
                self.transition(TokenizerState::ScriptData);
            }
        }
        Ok(())
    }

    pub(super) fn step_script_data_escaped(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '-' => {
                self.push_text_char('-');
                self.transition(TokenizerState::ScriptDataEscapedDash);
            }
            '<' => {
                self.transition(TokenizerState::ScriptDataEscapedLessThanSign);
            }
            NULL => {
                self.report(ParseErrorCode::Null)?;
                self.push_text_char(REPLACEMENT_CHARACTER);
            }
            EOF => {
                self.flush_text_buffer();
                self.begin_token();
                self.report(ParseErrorCode::Eof)?;
                self.emit(TokenKind::Eof);
            }
            c => self.push_text_char(c),
        }
        Ok(())
    }

    pub(super) fn step_script_data_escaped_dash(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '-' => {
                self.push_text_char('-');
                self.transition(TokenizerState::ScriptDataEscapedDashDash);
            }
            '<' => {
                self.transition(TokenizerState::ScriptDataEscapedLessThanSign);
            }
            NULL => {
                self.report(ParseErrorCode::Null)?;
                self.push_text_char(REPLACEMENT_CHARACTER);
                self.transition(TokenizerState::ScriptDataEscaped);
            }
            EOF => {
                self.flush_text_buffer();
                self.begin_token();
                self.report(ParseErrorCode::Eof)?;
                self.emit(TokenKind::Eof);
            }
            c => {
                self.push_text_char(c);
                self.transition(TokenizerState::ScriptDataEscaped);
            }
        }
        Ok(())
    }

    pub(super) fn step_script_data_escaped_dash_dash(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '-' => {
                self.push_text_char('-');
            }
            '<' => {
                self.transition(TokenizerState::ScriptDataEscapedLessThanSign);
            }
            '>' => {
                self.push_text_char('>');
                self.transition(TokenizerState::ScriptData);
            }
            NULL => {
                self.report(ParseErrorCode::Null)?;
                self.push_text_char(REPLACEMENT_CHARACTER);
                self.transition(TokenizerState::ScriptDataEscaped);
            }
            EOF => {
                self.flush_text_buffer();
                self.begin_token();
                self.report(ParseErrorCode::Eof)?;
                self.emit(TokenKind::Eof);
            }
            c => {
                self.push_text_char(c);
                self.transition(TokenizerState::ScriptDataEscaped);
            }
        }
        Ok(())
    }

    pub(super) fn step_script_data_escaped_less_than_sign(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '/' => {
                self.temp_buffer.clear();
                self.transition(TokenizerState::ScriptDataEscapedEndTagOpen);
            }
            c if char_class::is_ascii_alpha(c) => {
                self.temp_buffer.clear();
                self.push_text_char('<');
                self.back(1);
                self.transition(TokenizerState::ScriptDataDoubleEscapeStart);
            }
            _ => {
                self.push_text_char('<');
                self.back(1);
                self.transition(TokenizerState::ScriptDataEscaped);
            }
        }
        Ok(())
    }

    pub(super) fn step_script_data_escaped_end_tag_open(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_ascii_alpha(c) => {
                self.begin_end_tag_candidate();
                self.back(1);
                self.transition(TokenizerState::ScriptDataEscapedEndTagName);
            }
            _ => {
                self.push_text_char('<');
                self.push_text_char('/');
                self.back(1);
                self.transition(TokenizerState::ScriptDataEscaped);
            }
        }
        Ok(())
    }

    pub(super) fn step_script_data_escaped_end_tag_name(&mut self) -> Result<(), FatalParseError> {
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
                self.transition(TokenizerState::ScriptDataEscaped);
            }
        }
        Ok(())
    }

    pub(super) fn step_script_data_double_escape_start(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) || c == '/' || c == '>' => {
                self.push_text_char(ch);
                if self.temp_buffer.eq_ignore_ascii_case("script") {
                    self.transition(TokenizerState::ScriptDataDoubleEscaped);
                } else {
                    self.transition(TokenizerState::ScriptDataEscaped);
                }
            }
            c if char_class::is_ascii_alpha(c) => {
                self.temp_buffer.push(c.to_ascii_lowercase());
                self.push_text_char(c);
            }
            _ => {
                self.back(1);
                self.transition(TokenizerState::ScriptDataEscaped);
            }
        }
        Ok(())
    }

    pub(super) fn step_script_data_double_escaped(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '-' => {
                self.push_text_char('-');
                self.transition(TokenizerState::ScriptDataDoubleEscapedDash);
            }
            '<' => {
                self.push_text_char('<');
                self.transition(TokenizerState::ScriptDataDoubleEscapedLessThanSign);
            }
            NULL => {
                self.report(ParseErrorCode::Null)?;
                self.push_text_char(REPLACEMENT_CHARACTER);
            }
            EOF => {
                self.flush_text_buffer();
                self.begin_token();
                self.report(ParseErrorCode::Eof)?;
                self.emit(TokenKind::Eof);
            }
            c => self.push_text_char(c),
        }
        Ok(())
    }

    pub(super) fn step_script_data_double_escaped_dash(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '-' => {
                self.push_text_char('-');
                self.transition(TokenizerState::ScriptDataDoubleEscapedDashDash);
            }
            '<' => {
                self.push_text_char('<');
                self.transition(TokenizerState::ScriptDataDoubleEscapedLessThanSign);
            }
            NULL => {
                self.report(ParseErrorCode::Null)?;
                self.push_text_char(REPLACEMENT_CHARACTER);
                self.transition(TokenizerState::ScriptDataDoubleEscaped);
            }
            EOF => {
                self.flush_text_buffer();
                self.begin_token();
                self.report(ParseErrorCode::Eof)?;
                self.emit(TokenKind::Eof);
            }
            c => {
                self.push_text_char(c);
                self.transition(TokenizerState::ScriptDataDoubleEscaped);
            }
        }
        Ok(())
    }

    pub(super) fn step_script_data_double_escaped_dash_dash(
        &mut self,
    ) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '-' => {
                self.push_text_char('-');
            }
            '<' => {
                self.push_text_char('<');
                self.transition(TokenizerState::ScriptDataDoubleEscapedLessThanSign);
            }
            '>' => {
                self.push_text_char('>');
                self.transition(TokenizerState::ScriptData);
            }
            NULL => {
                self.report(ParseErrorCode::Null)?;
                self.push_text_char(REPLACEMENT_CHARACTER);
                self.transition(TokenizerState::ScriptDataDoubleEscaped);
            }
            EOF => {
                self.flush_text_buffer();
                self.begin_token();
                self.report(ParseErrorCode::Eof)?;
                self.emit(TokenKind::Eof);
            }
            c => {
                self.push_text_char(c);
                self.transition(TokenizerState::ScriptDataDoubleEscaped);
            }
        }
        Ok(())
    }

    pub(super) fn step_script_data_double_escaped_less_than_sign(
        &mut self,
    ) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '/' => {
                self.temp_buffer.clear();
                self.push_text_char('/');
                self.transition(TokenizerState::ScriptDataDoubleEscapeEnd);
            }
            _ => {
                self.back(1);
                self.transition(TokenizerState::ScriptDataDoubleEscaped);
            }
        }
        Ok(())
    }

    pub(super) fn step_script_data_double_escape_end(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) || c == '/' || c == '>' => {
                self.push_text_char(ch);
                if self.temp_buffer.eq_ignore_ascii_case("script") {
                    self.transition(TokenizerState::ScriptDataEscaped);
                } else {
                    self.transition(TokenizerState::ScriptDataDoubleEscaped);
                }
            }
            c if char_class::is_ascii_alpha(c) => {
                self.temp_buffer.push(c.to_ascii_lowercase());
                self.push_text_char(c);
            }
            _ => {
                self.back(1);
                self.transition(TokenizerState::ScriptDataDoubleEscaped);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::mode::ParseMode;
    use crate::token::TokenKind;
    use crate::tokenizer::Tokenizer;

    fn script_text(input: &str) -> String {
        let mut tok = Tokenizer::from_str(input);
        tok.read_next().unwrap(); // StartTag "script" (auto-enters Script mode)
        assert_eq!(tok.parse_mode(), ParseMode::Script);
        let mut text = String::new();
        loop {
            let more = tok.read_next().expect("no fatal errors in these fixtures");
            match &tok.current().unwrap().kind {
                TokenKind::Text(t) => text.push_str(t),
                TokenKind::EndTag { name, .. } => {
                    assert_eq!(name, "script");
                    break;
                }
                other => panic!("unexpected token {other:?}"),
            }
            if !more {
                break;
            }
        }
        text
    }

    #[test]
    fn plain_script_body_is_text() {
        assert_eq!(script_text("<script>var x = 1;</script>"), "var x = 1;");
    }

    #[test]
    fn escaped_script_comment_hides_embedded_tag() {
        // Inside an escaped comment, "</script>" does not close the element
        // because the comment-opening "<!--" has not yet been matched by
        // a "-->" and the double-escape name "script" was never started.
        let text = script_text("<script><!--var x = '<a>';--></script>");
        assert_eq!(text, "<!--var x = '<a>';-->");
    }

    #[test]
    fn double_escaped_script_tag_is_literal_text() {
        // "<script>" inside the escaped comment enters double-escaped
        // mode, so the embedded "</script>" there is literal text, not a
        // real closing tag; only the outer "</script>" closes the element.
        let text = script_text("<script><!--<script>x</script>y--></script>");
        assert_eq!(text, "<!--<script>x</script>y-->");
    }

    #[test]
    fn script_end_tag_name_mismatch_falls_back_to_text() {
        let text = script_text("<script>a</b>b</script>");
        assert_eq!(text, "a</b>b");
    }
}
