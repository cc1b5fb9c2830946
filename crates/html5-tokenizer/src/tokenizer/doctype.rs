//! Doctype states 52-67 (spec §4.3).

use super::{Quote, Tokenizer, TokenizerState};
use crate::char_class::{self, NULL, REPLACEMENT_CHARACTER};
use crate::error::{FatalParseError, ParseErrorCode};
use crate::text_source::EOF;
use crate::token::TokenKind;

impl Tokenizer {
    pub(super) fn step_doctype(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) => {
                self.transition(TokenizerState::BeforeDoctypeName);
            }
            '>' => {
                self.back(1);
                self.transition(TokenizerState::BeforeDoctypeName);
            }
            EOF => {
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit(TokenKind::Eof);
            }
            _ => {
                self.report(ParseErrorCode::DoctypeUnexpected)?;
                self.back(1);
                self.transition(TokenizerState::BeforeDoctypeName);
            }
        }
        Ok(())
    }

    pub(super) fn step_before_doctype_name(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) => {}
            c if char_class::is_ascii_upper_alpha(c) => {
                self.doctype_name = Some(c.to_ascii_lowercase().to_string());
                self.transition(TokenizerState::DoctypeName);
            }
            NULL => {
                self.report(ParseErrorCode::Null)?;
                self.doctype_name = Some(REPLACEMENT_CHARACTER.to_string());
                self.transition(TokenizerState::DoctypeName);
            }
            '>' => {
                self.report(ParseErrorCode::DoctypeUnexpected)?;
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.transition(TokenizerState::Data);
            }
            EOF => {
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit(TokenKind::Eof);
            }
            c => {
                self.doctype_name = Some(c.to_string());
                self.transition(TokenizerState::DoctypeName);
            }
        }
        Ok(())
    }

    pub(super) fn step_doctype_name(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) => {
                self.transition(TokenizerState::AfterDoctypeName);
            }
            '>' => {
                self.emit_doctype();
                self.transition(TokenizerState::Data);
            }
            c if char_class::is_ascii_upper_alpha(c) => {
                self.doctype_name.get_or_insert_with(String::new).push(c.to_ascii_lowercase());
            }
            NULL => {
                self.report(ParseErrorCode::Null)?;
                self.doctype_name.get_or_insert_with(String::new).push(REPLACEMENT_CHARACTER);
            }
            EOF => {
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit(TokenKind::Eof);
            }
            c => {
                self.doctype_name.get_or_insert_with(String::new).push(c);
            }
        }
        Ok(())
    }

    pub(super) fn step_after_doctype_name(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) => {}
            '>' => {
                self.emit_doctype();
                self.transition(TokenizerState::Data);
            }
            EOF => {
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit(TokenKind::Eof);
            }
            _ => {
                self.back(1);
                if self.peek_n(6).eq_ignore_ascii_case("public") {
                    for _ in 0..6 {
                        self.read();
                    }
                    self.transition(TokenizerState::AfterDoctypePublicKeyword);
                } else if self.peek_n(6).eq_ignore_ascii_case("system") {
                    for _ in 0..6 {
                        self.read();
                    }
                    self.transition(TokenizerState::AfterDoctypeSystemKeyword);
                } else {
                    self.report(ParseErrorCode::DoctypeUnexpectedAfterName)?;
                    self.doctype_force_quirks = true;
                    self.transition(TokenizerState::BogusDoctype);
                }
            }
        }
        Ok(())
    }

    pub(super) fn step_after_doctype_public_keyword(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) => {
                self.transition(TokenizerState::BeforeDoctypePublicIdentifier);
            }
            '"' => {
                self.report(ParseErrorCode::DoctypePublicInvalid)?;
                self.doctype_public_id = Some(String::new());
                self.transition(TokenizerState::DoctypePublicIdentifierDoubleQuoted);
            }
            '\'' => {
                self.report(ParseErrorCode::DoctypePublicInvalid)?;
                self.doctype_public_id = Some(String::new());
                self.transition(TokenizerState::DoctypePublicIdentifierSingleQuoted);
            }
            '>' => {
                self.report(ParseErrorCode::DoctypePublicInvalid)?;
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.transition(TokenizerState::Data);
            }
            EOF => {
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit(TokenKind::Eof);
            }
            _ => {
                self.report(ParseErrorCode::DoctypePublicInvalid)?;
                self.doctype_force_quirks = true;
                self.back(1);
                self.transition(TokenizerState::BogusDoctype);
            }
        }
        Ok(())
    }

    pub(super) fn step_before_doctype_public_identifier(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) => {}
            '"' => {
                self.doctype_public_id = Some(String::new());
                self.transition(TokenizerState::DoctypePublicIdentifierDoubleQuoted);
            }
            '\'' => {
                self.doctype_public_id = Some(String::new());
                self.transition(TokenizerState::DoctypePublicIdentifierSingleQuoted);
            }
            '>' => {
                self.report(ParseErrorCode::DoctypePublicInvalid)?;
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.transition(TokenizerState::Data);
            }
            EOF => {
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit(TokenKind::Eof);
            }
            _ => {
                self.report(ParseErrorCode::DoctypePublicInvalid)?;
                self.doctype_force_quirks = true;
                self.back(1);
                self.transition(TokenizerState::BogusDoctype);
            }
        }
        Ok(())
    }

    pub(super) fn step_doctype_public_identifier_quoted(&mut self, quote: Quote) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if quote.matches(c) => {
                self.transition(TokenizerState::AfterDoctypePublicIdentifier);
            }
            NULL => {
                self.report(ParseErrorCode::Null)?;
                self.doctype_public_id.get_or_insert_with(String::new).push(REPLACEMENT_CHARACTER);
            }
            '>' => {
                self.report(ParseErrorCode::DoctypePublicInvalid)?;
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.transition(TokenizerState::Data);
            }
            EOF => {
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit(TokenKind::Eof);
            }
            c => {
                self.doctype_public_id.get_or_insert_with(String::new).push(c);
            }
        }
        Ok(())
    }

    pub(super) fn step_after_doctype_public_identifier(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) => {
                self.transition(TokenizerState::BetweenDoctypePublicAndSystemIdentifiers);
            }
            '>' => {
                self.emit_doctype();
                self.transition(TokenizerState::Data);
            }
            '"' => {
                self.report(ParseErrorCode::DoctypeSystemInvalid)?;
                self.doctype_system_id = Some(String::new());
                self.transition(TokenizerState::DoctypeSystemIdentifierDoubleQuoted);
            }
            '\'' => {
                self.report(ParseErrorCode::DoctypeSystemInvalid)?;
                self.doctype_system_id = Some(String::new());
                self.transition(TokenizerState::DoctypeSystemIdentifierSingleQuoted);
            }
            EOF => {
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit(TokenKind::Eof);
            }
            _ => {
                self.report(ParseErrorCode::DoctypeSystemInvalid)?;
                self.doctype_force_quirks = true;
                self.back(1);
                self.transition(TokenizerState::BogusDoctype);
            }
        }
        Ok(())
    }

    pub(super) fn step_between_doctype_public_and_system_identifiers(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) => {}
            '>' => {
                self.emit_doctype();
                self.transition(TokenizerState::Data);
            }
            '"' => {
                self.doctype_system_id = Some(String::new());
                self.transition(TokenizerState::DoctypeSystemIdentifierDoubleQuoted);
            }
            '\'' => {
                self.doctype_system_id = Some(String::new());
                self.transition(TokenizerState::DoctypeSystemIdentifierSingleQuoted);
            }
            EOF => {
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit(TokenKind::Eof);
            }
            _ => {
                self.report(ParseErrorCode::DoctypeSystemInvalid)?;
                self.doctype_force_quirks = true;
                self.back(1);
                self.transition(TokenizerState::BogusDoctype);
            }
        }
        Ok(())
    }

    pub(super) fn step_after_doctype_system_keyword(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) => {
                self.transition(TokenizerState::BeforeDoctypeSystemIdentifier);
            }
            '"' => {
                self.report(ParseErrorCode::DoctypeSystemInvalid)?;
                self.doctype_system_id = Some(String::new());
                self.transition(TokenizerState::DoctypeSystemIdentifierDoubleQuoted);
            }
            '\'' => {
                self.report(ParseErrorCode::DoctypeSystemInvalid)?;
                self.doctype_system_id = Some(String::new());
                self.transition(TokenizerState::DoctypeSystemIdentifierSingleQuoted);
            }
            '>' => {
                self.report(ParseErrorCode::DoctypeSystemInvalid)?;
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.transition(TokenizerState::Data);
            }
            EOF => {
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit(TokenKind::Eof);
            }
            _ => {
                self.report(ParseErrorCode::DoctypeSystemInvalid)?;
                self.doctype_force_quirks = true;
                self.back(1);
                self.transition(TokenizerState::BogusDoctype);
            }
        }
        Ok(())
    }

    pub(super) fn step_before_doctype_system_identifier(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) => {}
            '"' => {
                self.doctype_system_id = Some(String::new());
                self.transition(TokenizerState::DoctypeSystemIdentifierDoubleQuoted);
            }
            '\'' => {
                self.doctype_system_id = Some(String::new());
                self.transition(TokenizerState::DoctypeSystemIdentifierSingleQuoted);
            }
            '>' => {
                self.report(ParseErrorCode::DoctypeSystemInvalid)?;
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.transition(TokenizerState::Data);
            }
            EOF => {
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit(TokenKind::Eof);
            }
            _ => {
                self.report(ParseErrorCode::DoctypeSystemInvalid)?;
                self.doctype_force_quirks = true;
                self.back(1);
                self.transition(TokenizerState::BogusDoctype);
            }
        }
        Ok(())
    }

    pub(super) fn step_doctype_system_identifier_quoted(&mut self, quote: Quote) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if quote.matches(c) => {
                self.transition(TokenizerState::AfterDoctypeSystemIdentifier);
            }
            NULL => {
                self.report(ParseErrorCode::Null)?;
                self.doctype_system_id.get_or_insert_with(String::new).push(REPLACEMENT_CHARACTER);
            }
            '>' => {
                self.report(ParseErrorCode::DoctypeSystemInvalid)?;
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.transition(TokenizerState::Data);
            }
            EOF => {
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit(TokenKind::Eof);
            }
            c => {
                self.doctype_system_id.get_or_insert_with(String::new).push(c);
            }
        }
        Ok(())
    }

    pub(super) fn step_after_doctype_system_identifier(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            c if char_class::is_space_character(c) => {}
            '>' => {
                self.emit_doctype();
                self.transition(TokenizerState::Data);
            }
            EOF => {
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit(TokenKind::Eof);
            }
            _ => {
                // Spec: this does not set force-quirks; it is purely
                // recovery from trailing junk after a well-formed doctype.
                self.report(ParseErrorCode::DoctypeInvalidCharacter)?;
                self.back(1);
                self.transition(TokenizerState::BogusDoctype);
            }
        }
        Ok(())
    }

    pub(super) fn step_bogus_doctype(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '>' => {
                self.emit_doctype();
                self.transition(TokenizerState::Data);
            }
            NULL => {
                self.report(ParseErrorCode::Null)?;
            }
            EOF => {
                self.emit_doctype();
                self.emit(TokenKind::Eof);
            }
            _ => {}
        }
        Ok(())
    }

    pub(super) fn emit_doctype(&mut self) {
        let name = self.doctype_name.take();
        let public_id = self.doctype_public_id.take();
        let system_id = self.doctype_system_id.take();
        let force_quirks = std::mem::take(&mut self.doctype_force_quirks);
        self.emit(TokenKind::Doctype {
            name,
            public_id,
            system_id,
            force_quirks,
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::token::TokenKind;
    use crate::tokenizer::Tokenizer;

    fn doctype(input: &str) -> TokenKind {
        let mut tok = Tokenizer::from_str(input);
        tok.read_next().expect("no fatal errors in these fixtures");
        tok.current().unwrap().kind.clone()
    }

    #[test]
    fn simple_doctype() {
        match doctype("<!DOCTYPE html>") {
            TokenKind::Doctype {
                name, force_quirks, ..
            } => {
                assert_eq!(name.as_deref(), Some("html"));
                assert!(!force_quirks);
            }
            other => panic!("expected doctype, got {other:?}"),
        }
    }

    #[test]
    fn doctype_with_public_and_system_identifiers() {
        let input = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#;
        match doctype(input) {
            TokenKind::Doctype {
                name,
                public_id,
                system_id,
                force_quirks,
            } => {
                assert_eq!(name.as_deref(), Some("html"));
                assert_eq!(public_id.as_deref(), Some("-//W3C//DTD HTML 4.01//EN"));
                assert_eq!(system_id.as_deref(), Some("http://www.w3.org/TR/html4/strict.dtd"));
                assert!(!force_quirks);
            }
            other => panic!("expected doctype, got {other:?}"),
        }
    }

    #[test]
    fn doctype_without_name_forces_quirks() {
        match doctype("<!DOCTYPE>") {
            TokenKind::Doctype {
                name, force_quirks, ..
            } => {
                assert_eq!(name, None);
                assert!(force_quirks);
            }
            other => panic!("expected doctype, got {other:?}"),
        }
    }

    #[test]
    fn garbage_after_name_forces_quirks_and_goes_bogus() {
        match doctype("<!DOCTYPE html GARBAGE>") {
            TokenKind::Doctype {
                name, force_quirks, ..
            } => {
                assert_eq!(name.as_deref(), Some("html"));
                assert!(force_quirks);
            }
            other => panic!("expected doctype, got {other:?}"),
        }
    }

    #[test]
    fn mismatched_quotes_are_not_treated_as_closing() {
        let input = r#"<!DOCTYPE html PUBLIC "abc'>"#;
        match doctype(input) {
            TokenKind::Doctype { public_id, .. } => {
                // The mismatched `'` is content, not a terminator; EOF force-quirks the token.
                assert_eq!(public_id.as_deref(), Some("abc'"));
            }
            other => panic!("expected doctype, got {other:?}"),
        }
    }
}
