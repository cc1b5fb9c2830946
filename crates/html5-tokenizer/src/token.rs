//! The emitted token taxonomy (spec §3, component 9).
//!
//! Grounded on the teacher's `html5::shared::token` (`Attribute`,
//! `AttributeValue`, `Token`), adapted from span-based/atom-interned fields
//! to owned `String`s: this crate has no document-lifetime `Input`/
//! `AtomTable` to borrow from or intern into (tree construction, which
//! would want that, is out of scope per spec §1), so tokens own their text
//! outright. See DESIGN.md for the open-question resolution.

use crate::position::Position;

/// An HTML attribute. Names are ASCII-lowercased during tokenization
/// (spec §3); duplicates within one tag are dropped at emit time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Text(String),
    StartTag {
        name: String,
        attributes: Vec<Attribute>,
        self_closing: bool,
    },
    EndTag {
        name: String,
        /// Recorded per spec §4.5/§8: a `/` before `>` on an end tag is a
        /// parse error, but the flag is still exposed for the consumer.
        self_closing: bool,
    },
    Comment {
        text: String,
        /// True when the comment was opened with `<![` (a downlevel-revealed
        /// conditional comment body), spec §3/GLOSSARY.
        downlevel_revealed_conditional: bool,
    },
    Doctype {
        name: Option<String>,
        public_id: Option<String>,
        system_id: Option<String>,
        force_quirks: bool,
    },
    Eof,
}

/// A token together with the position where it began (spec §3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub position: Position,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(position: Position, kind: TokenKind) -> Self {
        Self { position, kind }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    pub fn as_start_tag(&self) -> Option<(&str, &[Attribute], bool)> {
        match &self.kind {
            TokenKind::StartTag {
                name,
                attributes,
                self_closing,
            } => Some((name, attributes, *self_closing)),
            _ => None,
        }
    }

    pub fn as_end_tag(&self) -> Option<(&str, bool)> {
        match &self.kind {
            TokenKind::EndTag { name, self_closing } => Some((name, *self_closing)),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Text(text) => Some(text),
            _ => None,
        }
    }
}
