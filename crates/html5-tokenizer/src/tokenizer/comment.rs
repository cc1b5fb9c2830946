//! Comment states 46-51 (spec §4.3).
//!
//! The nested `<!--`-inside-a-comment warning states from the full HTML
//! Living Standard grammar are deliberately not modeled: spec §4.3 names
//! exactly six comment states (`CommentStart`, `CommentStartDash`,
//! `Comment`, `CommentEndDash`, `CommentEnd`, `CommentEndBang`), matching
//! `TokenizerState`'s comment variants one-to-one, so nested-comment
//! detection is out of scope here (recorded in DESIGN.md).

use super::{Tokenizer, TokenizerState};
use crate::char_class::{NULL, REPLACEMENT_CHARACTER};
use crate::error::{FatalParseError, ParseErrorCode};
use crate::text_source::EOF;
use crate::token::TokenKind;

impl Tokenizer {
    pub(super) fn step_comment_start(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '-' => {
                self.transition(TokenizerState::CommentStartDash);
            }
            '>' => {
                self.report(ParseErrorCode::TagClosedWrong)?;
                self.emit_comment();
                self.transition(TokenizerState::Data);
            }
            _ => {
                self.back(1);
                self.transition(TokenizerState::Comment);
            }
        }
        Ok(())
    }

    pub(super) fn step_comment_start_dash(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '-' => {
                self.transition(TokenizerState::CommentEnd);
            }
            '>' => {
                self.report(ParseErrorCode::TagClosedWrong)?;
                self.emit_comment();
                self.transition(TokenizerState::Data);
            }
            EOF => {
                self.report(ParseErrorCode::Eof)?;
                self.emit_comment();
                self.emit(TokenKind::Eof);
            }
            _ => {
                self.comment_text.push('-');
                self.back(1);
                self.transition(TokenizerState::Comment);
            }
        }
        Ok(())
    }

    pub(super) fn step_comment(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '-' => {
                self.transition(TokenizerState::CommentEndDash);
            }
            NULL => {
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

    pub(super) fn step_comment_end_dash(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '-' => {
                self.transition(TokenizerState::CommentEnd);
            }
            EOF => {
                self.report(ParseErrorCode::CommentEndedWithDash)?;
                self.emit_comment();
                self.emit(TokenKind::Eof);
            }
            _ => {
                self.comment_text.push('-');
                self.back(1);
                self.transition(TokenizerState::Comment);
            }
        }
        Ok(())
    }

    pub(super) fn step_comment_end(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '>' => {
                self.emit_comment();
                self.transition(TokenizerState::Data);
            }
            '!' => {
                self.transition(TokenizerState::CommentEndBang);
            }
            '-' => {
                self.comment_text.push('-');
            }
            EOF => {
                self.report(ParseErrorCode::Eof)?;
                self.emit_comment();
                self.emit(TokenKind::Eof);
            }
            _ => {
                self.comment_text.push_str("--");
                self.back(1);
                self.transition(TokenizerState::Comment);
            }
        }
        Ok(())
    }

    pub(super) fn step_comment_end_bang(&mut self) -> Result<(), FatalParseError> {
        let ch = self.read();
        match ch {
            '-' => {
                self.comment_text.push_str("--!");
                self.transition(TokenizerState::CommentEndDash);
            }
            '>' => {
                self.report(ParseErrorCode::CommentEndedWithEm)?;
                self.emit_comment();
                self.transition(TokenizerState::Data);
            }
            EOF => {
                self.report(ParseErrorCode::Eof)?;
                self.emit_comment();
                self.emit(TokenKind::Eof);
            }
            _ => {
                self.report(ParseErrorCode::CommentEndedUnexpected)?;
                self.comment_text.push_str("--!");
                self.back(1);
                self.transition(TokenizerState::Comment);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ParseErrorCode;
    use crate::token::TokenKind;
    use crate::tokenizer::Tokenizer;

    fn comment_text(input: &str) -> (String, bool) {
        let mut tok = Tokenizer::from_str(input);
        tok.read_next().expect("no fatal errors in these fixtures");
        match &tok.current().unwrap().kind {
            TokenKind::Comment {
                text,
                downlevel_revealed_conditional,
            } => (text.clone(), *downlevel_revealed_conditional),
            other => panic!("expected comment, got {other:?}"),
        }
    }

    #[test]
    fn empty_comment() {
        assert_eq!(comment_text("<!---->").0, "");
    }

    #[test]
    fn abrupt_empty_comment_reports_tag_closed_wrong() {
        let mut tok = Tokenizer::from_str("<!-->");
        let errors = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let errors_clone = errors.clone();
        tok.set_error_observer(Some(Box::new(move |e| errors_clone.borrow_mut().push(e.code))));
        tok.read_next().unwrap();
        assert_eq!(comment_text("<!-->").0, "");
        assert_eq!(errors.borrow().as_slice(), [ParseErrorCode::TagClosedWrong]);
    }

    #[test]
    fn three_dash_abrupt_comment_also_reports_tag_closed_wrong() {
        let mut tok = Tokenizer::from_str("<!--->");
        let errors = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let errors_clone = errors.clone();
        tok.set_error_observer(Some(Box::new(move |e| errors_clone.borrow_mut().push(e.code))));
        tok.read_next().unwrap();
        assert_eq!(errors.borrow().as_slice(), [ParseErrorCode::TagClosedWrong]);
    }

    #[test]
    fn internal_double_dash_run_is_preserved_as_content() {
        assert_eq!(comment_text("<!-- -- -->").0, " -- ");
    }

    #[test]
    fn em_dash_close_reports_comment_ended_with_em() {
        let mut tok = Tokenizer::from_str("<!--x--!>");
        let errors = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let errors_clone = errors.clone();
        tok.set_error_observer(Some(Box::new(move |e| errors_clone.borrow_mut().push(e.code))));
        tok.read_next().unwrap();
        match &tok.current().unwrap().kind {
            TokenKind::Comment { text, .. } => assert_eq!(text, "x"),
            other => panic!("expected comment, got {other:?}"),
        }
        assert_eq!(errors.borrow().as_slice(), [ParseErrorCode::CommentEndedWithEm]);
    }
}
