//! Tag open/name and the attribute sub-machine (spec §4.3).
//!
//! Grounded on the teacher's `tokenizer::tag`, which already implemented
//! `TagOpen`/`TagName` against the same `TokenizerState` enum this crate
//! extends; the attribute sub-machine and self-closing handling are new.

use super::{Quote, Tokenizer, TokenizerState};
use crate::char_class::{self, NULL, REPLACEMENT_CHARACTER};
use crate::error::ParseErrorCode;
use crate::error::FatalParseError;
use crate::text_source::EOF;
use crate::token::TokenKind;

impl Tokenizer {
    pub(super) fn step_tag_open(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '!' => {
                self.transition(TokenizerState::MarkupDeclarationOpen);
            }
            '/' => {
                self.transition(TokenizerState::EndTagOpen);
            }
            '?' => {
                self.report(ParseErrorCode::BogusComment)?;
                self.comment_text.clear();
                self.comment_downlevel_revealed = false;
                self.back(1);
                self.transition(TokenizerState::BogusComment);
            }
            EOF => {
                self.push_text_char('<');
                self.begin_token();
                self.report(ParseErrorCode::Eof)?;
                self.emit(TokenKind::Eof);
            }
            c if char_class::is_ascii_alpha(c) => {
                self.begin_tag(false);
                self.back(1);
                self.transition(TokenizerState::TagName);
            }
            _ => {
                self.report(ParseErrorCode::AmbiguousOpenTag)?;
                self.push_text_char('<');
                self.back(1);
                self.transition(TokenizerState::Data);
            }
        }
        Ok(())
    }

    pub(super) fn step_end_tag_open(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_ascii_alpha(c) => {
                self.begin_tag(true);
                self.back(1);
                self.transition(TokenizerState::TagName);
            }
            '>' => {
                self.report(ParseErrorCode::TagClosedWrong)?;
                self.transition(TokenizerState::Data);
            }
            EOF => {
                self.push_text_char('<');
                self.push_text_char('/');
                self.begin_token();
                self.report(ParseErrorCode::Eof)?;
                self.emit(TokenKind::Eof);
            }
            _ => {
                self.report(ParseErrorCode::AmbiguousOpenTag)?;
                self.comment_text.clear();
                self.comment_downlevel_revealed = false;
                self.back(1);
                self.transition(TokenizerState::BogusComment);
            }
        }
        Ok(())
    }

    pub(super) fn step_tag_name(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) => {
                self.transition(TokenizerState::BeforeAttributeName);
            }
            '/' => {
                self.transition(TokenizerState::SelfClosingStartTag);
            }
            '>' => {
                self.emit_current_tag()?;
            }
            c if char_class::is_ascii_upper_alpha(c) => {
                self.tag_name.push(c.to_ascii_lowercase());
            }
            NULL => {
                self.report(ParseErrorCode::Null)?;
                self.tag_name.push(REPLACEMENT_CHARACTER);
            }
            EOF => {
                self.begin_token();
                self.report(ParseErrorCode::Eof)?;
                self.emit(TokenKind::Eof);
            }
            c => self.tag_name.push(c),
        }
        Ok(())
    }

    pub(super) fn step_before_attribute_name(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) => {}
            '/' | '>' | EOF => {
                self.back(1);
                self.transition(TokenizerState::AfterAttributeName);
            }
            '=' => {
                self.report(ParseErrorCode::AttributeEqualsFound)?;
                self.start_new_attribute()?;
                self.current_attr_name.push('=');
                self.transition(TokenizerState::AttributeName);
            }
            _ => {
                self.start_new_attribute()?;
                self.back(1);
                self.transition(TokenizerState::AttributeName);
            }
        }
        Ok(())
    }

    pub(super) fn step_attribute_name(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) || c == '/' || c == '>' || c == EOF => {
                self.finish_attribute_name()?;
                self.back(1);
                self.transition(TokenizerState::AfterAttributeName);
            }
            '=' => {
                self.finish_attribute_name()?;
                self.transition(TokenizerState::BeforeAttributeValue);
            }
            c if char_class::is_ascii_upper_alpha(c) => {
                self.current_attr_name.push(c.to_ascii_lowercase());
            }
            NULL => {
                self.report(ParseErrorCode::Null)?;
                self.current_attr_name.push(REPLACEMENT_CHARACTER);
            }
            '"' | '\'' | '<' => {
                self.report(ParseErrorCode::AttributeNameInvalid)?;
                self.current_attr_name.push(ch);
            }
            c => self.current_attr_name.push(c),
        }
        Ok(())
    }

    pub(super) fn step_after_attribute_name(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) => {}
            '/' => {
                self.transition(TokenizerState::SelfClosingStartTag);
            }
            '=' => {
                self.transition(TokenizerState::BeforeAttributeValue);
            }
            '>' => {
                self.emit_current_tag()?;
            }
            EOF => {
                self.begin_token();
                self.report(ParseErrorCode::Eof)?;
                self.emit(TokenKind::Eof);
            }
            _ => {
                self.start_new_attribute()?;
                self.back(1);
                self.transition(TokenizerState::AttributeName);
            }
        }
        Ok(())
    }

    pub(super) fn step_before_attribute_value(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) => {}
            '"' => {
                self.current_attr_has_value = true;
                self.transition(TokenizerState::AttributeValueDoubleQuoted);
            }
            '\'' => {
                self.current_attr_has_value = true;
                self.transition(TokenizerState::AttributeValueSingleQuoted);
            }
            '>' => {
                self.report(ParseErrorCode::AttributeValueInvalid)?;
                self.emit_current_tag()?;
            }
            _ => {
                self.current_attr_has_value = true;
                self.back(1);
                self.transition(TokenizerState::AttributeValueUnquoted);
            }
        }
        Ok(())
    }

    pub(super) fn step_attribute_value_quoted(&mut self, quote: Quote) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if quote.matches(c) => {
                self.transition(TokenizerState::AfterAttributeValueQuoted);
            }
            '&' => {
                self.return_state = self.state;
                self.char_ref_in_attribute = true;
                self.consume_character_reference()?;
            }
            NULL => {
                self.report(ParseErrorCode::Null)?;
                self.current_attr_value.push(REPLACEMENT_CHARACTER);
            }
            EOF => {
                self.begin_token();
                self.report(ParseErrorCode::Eof)?;
                self.emit(TokenKind::Eof);
            }
            c => self.current_attr_value.push(c),
        }
        Ok(())
    }

    pub(super) fn step_attribute_value_unquoted(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) => {
                self.transition(TokenizerState::BeforeAttributeName);
            }
            '&' => {
                self.return_state = TokenizerState::AttributeValueUnquoted;
                self.char_ref_in_attribute = true;
                self.consume_character_reference()?;
            }
            '>' => {
                self.emit_current_tag()?;
            }
            NULL => {
                self.report(ParseErrorCode::Null)?;
                self.current_attr_value.push(REPLACEMENT_CHARACTER);
            }
            '"' | '\'' | '<' | '=' | '`' => {
                self.report(ParseErrorCode::AttributeValueInvalid)?;
                self.current_attr_value.push(ch);
            }
            EOF => {
                self.begin_token();
                self.report(ParseErrorCode::Eof)?;
                self.emit(TokenKind::Eof);
            }
            c => self.current_attr_value.push(c),
        }
        Ok(())
    }

    pub(super) fn step_after_attribute_value_quoted(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) => {
                self.transition(TokenizerState::BeforeAttributeName);
            }
            '/' => {
                self.transition(TokenizerState::SelfClosingStartTag);
            }
            '>' => {
                self.emit_current_tag()?;
            }
            EOF => {
                self.begin_token();
                self.report(ParseErrorCode::Eof)?;
                self.emit(TokenKind::Eof);
            }
            _ => {
                self.report(ParseErrorCode::AttributeValueInvalid)?;
                self.back(1);
                self.transition(TokenizerState::BeforeAttributeName);
            }
        }
        Ok(())
    }

    pub(super) fn step_self_closing_start_tag(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '>' => {
                self.tag_self_closing = true;
                self.emit_current_tag()?;
            }
            EOF => {
                self.begin_token();
                self.report(ParseErrorCode::Eof)?;
                self.emit(TokenKind::Eof);
            }
            _ => {
                self.report(ParseErrorCode::ClosingSlashMisplaced)?;
                self.back(1);
                self.transition(TokenizerState::BeforeAttributeName);
            }
        }
        Ok(())
    }

    fn begin_tag(&mut self, is_end: bool) {
        self.begin_token();
        self.tag_name.clear();
        self.tag_is_end = is_end;
        self.tag_self_closing = false;
        self.attributes.clear();
        self.attr_in_progress = false;
    }

    fn start_new_attribute(&mut self) -> Result<(), FatalParseError> {
        self.finish_current_attribute()?;
        self.attr_in_progress = true;
        self.current_attr_name.clear();
        self.current_attr_value.clear();
        self.current_attr_has_value = false;
        Ok(())
    }

    fn finish_attribute_name(&mut self) -> Result<(), FatalParseError> {
        if self.attr_in_progress
            && self
                .attributes
                .iter()
                .any(|a| a.name == self.current_attr_name)
        {
            self.report(ParseErrorCode::AttributeDuplicateOmitted)?;
        }
        Ok(())
    }

    pub(super) fn finish_current_attribute(&mut self) -> Result<(), FatalParseError> {
        if !self.attr_in_progress {
            return Ok(());
        }
        self.attr_in_progress = false;
        let duplicate = self
            .attributes
            .iter()
            .any(|a| a.name == self.current_attr_name);
        if !duplicate {
            let name = std::mem::take(&mut self.current_attr_name);
            let value = std::mem::take(&mut self.current_attr_value);
            self.attributes.push(crate::token::Attribute { name, value });
        } else {
            self.current_attr_name.clear();
            self.current_attr_value.clear();
        }
        self.current_attr_has_value = false;
        Ok(())
    }

    pub(super) fn emit_current_tag(&mut self) -> Result<(), FatalParseError> {
        self.finish_current_attribute()?;
        if self.tag_is_end {
            if !self.attributes.is_empty() {
                self.report(ParseErrorCode::EndTagCannotHaveAttributes)?;
            }
            if self.tag_self_closing {
                self.report(ParseErrorCode::EndTagCannotBeSelfClosed)?;
            }
            let name = std::mem::take(&mut self.tag_name);
            self.attributes.clear();
            let self_closing = self.tag_self_closing;
            self.emit(TokenKind::EndTag { name, self_closing });
            self.transition(TokenizerState::Data);
        } else {
            self.record_last_start_tag();
            let name = std::mem::take(&mut self.tag_name);
            // Spec §3: a start tag's name alone decides the next content
            // mode here; RCData/Rawtext are only ever entered by an
            // external `set_parse_mode` call from tree construction.
            if name.eq_ignore_ascii_case("script") {
                self.set_parse_mode(crate::mode::ParseMode::Script);
            } else if name.eq_ignore_ascii_case("plaintext") {
                self.set_parse_mode(crate::mode::ParseMode::Plaintext);
            } else {
                self.set_parse_mode(crate::mode::ParseMode::PCData);
            }
            let attributes = std::mem::take(&mut self.attributes);
            let self_closing = self.tag_self_closing;
            self.emit(TokenKind::StartTag {
                name,
                attributes,
                self_closing,
            });
        }
        self.tag_self_closing = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;

    fn tokens(input: &str) -> Vec<crate::token::TokenKind> {
        let mut tok = Tokenizer::from_str(input);
        let mut out = Vec::new();
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
    fn simple_tag_pair() {
        let kinds = tokens("<p>hi</p>");
        assert_eq!(
            kinds,
            vec![
                TokenKind::StartTag {
                    name: "p".into(),
                    attributes: vec![],
                    self_closing: false,
                },
                TokenKind::Text("hi".into()),
                TokenKind::EndTag {
                    name: "p".into(),
                    self_closing: false,
                },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn self_closing_void_tag() {
        let kinds = tokens("<br/>");
        assert_eq!(
            kinds,
            vec![
                TokenKind::StartTag {
                    name: "br".into(),
                    attributes: vec![],
                    self_closing: true,
                },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn attribute_with_entity_in_value() {
        let kinds = tokens(r#"<a href="&amp;">"#);
        assert_eq!(
            kinds,
            vec![
                TokenKind::StartTag {
                    name: "a".into(),
                    attributes: vec![crate::token::Attribute {
                        name: "href".into(),
                        value: "&".into(),
                    }],
                    self_closing: false,
                },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn duplicate_attribute_is_omitted() {
        let kinds = tokens(r#"<p a="1" a="2">"#);
        match &kinds[0] {
            TokenKind::StartTag { attributes, .. } => {
                assert_eq!(attributes.len(), 1);
                assert_eq!(attributes[0].value, "1");
            }
            other => panic!("expected start tag, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_yields_single_eof() {
        let kinds = tokens("");
        assert_eq!(kinds, vec![TokenKind::Eof]);
    }

    #[test]
    fn dangling_less_than_at_eof_is_text_then_eof() {
        let kinds = tokens("<");
        assert_eq!(kinds, vec![TokenKind::Text("<".into()), TokenKind::Eof]);
    }
}
