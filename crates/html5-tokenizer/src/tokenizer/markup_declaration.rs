//! Markup declaration dispatch, bogus comments, and CDATA sections
//! (spec §4.3 "Markup-Declaration", GLOSSARY "CDATA section").
//!
//! `ContinuesWithInsensitive`/`ContinuesWithSensitive` (spec §9's open
//! question) are kept genuinely distinct here: `--` and `[CDATA[` are
//! matched case-sensitively, `doctype` case-insensitively, per the spec's
//! own note that implementers "should honor the names".

use super::{Tokenizer, TokenizerState};
use crate::char_class::REPLACEMENT_CHARACTER;
use crate::error::{FatalParseError, ParseErrorCode};
use crate::text_source::EOF;
use crate::token::TokenKind;

impl Tokenizer {
    pub(super) fn step_markup_declaration_open(&mut self) -> Result<(), FatalParseError> {
        // Whatever text preceded `<!` must be flushed before `begin_token`
        // below overwrites `token_start` for the comment/doctype/CDATA
        // token about to start; otherwise it would end up emitted after
        // that token instead of before it.
        self.flush_text_buffer();
        if self.peek_n(2) == "--" {
            self.read();
            self.read();
            self.comment_text.clear();
            self.comment_downlevel_revealed = false;
            self.begin_token();
            self.transition(TokenizerState::CommentStart);
            return Ok(());
        }
        if self.peek_n(7).eq_ignore_ascii_case("doctype") {
            for _ in 0..7 {
                self.read();
            }
            self.doctype_name = None;
            self.doctype_public_id = None;
            self.doctype_system_id = None;
            self.doctype_force_quirks = false;
            self.begin_token();
            self.transition(TokenizerState::Doctype);
            return Ok(());
        }
        if self.accept_character_data() && self.peek_n(7) == "[CDATA[" {
            for _ in 0..7 {
                self.read();
            }
            self.begin_token();
            self.transition(TokenizerState::CdataSection);
            return Ok(());
        }

        self.report(ParseErrorCode::UndefinedMarkupDeclaration)?;
        self.comment_text.clear();
        self.comment_downlevel_revealed = self.peek() == '[';
        self.begin_token();
        self.transition(TokenizerState::BogusComment);
        Ok(())
    }

    pub(super) fn step_bogus_comment(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '>' => {
                self.emit_comment();
                self.transition(TokenizerState::Data);
            }
            crate::char_class::NULL => {
                self.report(ParseErrorCode::Null)?;
                self.comment_text.push(REPLACEMENT_CHARACTER);
            }
            EOF => {
                self.report(ParseErrorCode::Eof)?;
                self.emit_comment();
                self.emit(TokenKind::Eof);
            }
            c => self.comment_text.push(c),
        }
        Ok(())
    }

    pub(super) fn step_cdata_section(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            ']' => {
                self.transition(TokenizerState::CdataSectionBracket);
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

    pub(super) fn step_cdata_section_bracket(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            ']' => {
                self.transition(TokenizerState::CdataSectionEnd);
            }
            _ => {
                self.push_text_char(']');
                self.back(1);
                self.transition(TokenizerState::CdataSection);
            }
        }
        Ok(())
    }

    pub(super) fn step_cdata_section_end(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            ']' => {
                self.push_text_char(']');
            }
            '>' => {
                self.transition(TokenizerState::Data);
            }
            _ => {
                self.push_text_char(']');
                self.push_text_char(']');
                self.back(1);
                self.transition(TokenizerState::CdataSection);
            }
        }
        Ok(())
    }

    pub(super) fn emit_comment(&mut self) {
        let text = std::mem::take(&mut self.comment_text);
        let downlevel_revealed_conditional = std::mem::take(&mut self.comment_downlevel_revealed);
        self.emit(TokenKind::Comment {
            text,
            downlevel_revealed_conditional,
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::token::TokenKind;
    use crate::tokenizer::Tokenizer;

    fn kinds(input: &str) -> Vec<TokenKind> {
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
    fn unrecognized_declaration_becomes_bogus_comment() {
        let kinds = kinds("<!foo>bar");
        match &kinds[0] {
            TokenKind::Comment { text, .. } => assert_eq!(text, "foo"),
            other => panic!("expected comment, got {other:?}"),
        }
    }

    #[test]
    fn downlevel_revealed_conditional_is_flagged() {
        let kinds = kinds("<![if !IE]>x<![endif]>");
        match &kinds[0] {
            TokenKind::Comment {
                downlevel_revealed_conditional,
                ..
            } => assert!(*downlevel_revealed_conditional),
            other => panic!("expected comment, got {other:?}"),
        }
    }

    #[test]
    fn doctype_keyword_is_case_insensitive() {
        let kinds = kinds("<!DocType html>");
        match &kinds[0] {
            TokenKind::Doctype { name, .. } => assert_eq!(name.as_deref(), Some("html")),
            other => panic!("expected doctype, got {other:?}"),
        }
    }

    #[test]
    fn cdata_section_emitted_as_text_when_accepted() {
        let mut tok = Tokenizer::from_str("<![CDATA[<b>]]>rest");
        tok.set_accept_character_data(true);
        tok.read_next().unwrap();
        match &tok.current().unwrap().kind {
            TokenKind::Text(text) => assert_eq!(text, "<b>"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn cdata_section_without_acceptance_is_bogus_comment() {
        let kinds = kinds("<![CDATA[x]]>");
        match &kinds[0] {
            TokenKind::Comment { .. } => {}
            other => panic!("expected bogus comment, got {other:?}"),
        }
    }
}
