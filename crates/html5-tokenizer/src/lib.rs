//! A streaming HTML5 tokenizer implementing WHATWG tokenization
//! (HTML Living Standard §8.2.4).
//!
//! This crate is the tokenization stage only: it turns a decoded Unicode
//! document into a stream of [`Token`]s with position information,
//! resolving character references and tracking SVG/MathML foreign content
//! along the way. Tree construction, CSS tokenization, byte-stream
//! decoding, and HTTP fetching are all out of scope and left to a
//! consumer built on top of this crate.
//!
//! ```
//! use html5_tokenizer::Tokenizer;
//!
//! let mut tokenizer = Tokenizer::from_str("<p>hi</p>");
//! while tokenizer.read_next().unwrap() {
//!     println!("{:?}", tokenizer.current().unwrap());
//! }
//! ```

mod buffer_pool;
mod char_class;
mod entities;
mod error;
mod foreign;
mod mode;
mod position;
mod text_source;
mod token;
mod tokenizer;

pub use buffer_pool::BufferPool;
pub use error::{ErrorChannel, ErrorPolicy, FatalParseError, ParseError, ParseErrorCode};
pub use foreign::{ForeignContentWrapper, TokenSource};
pub use mode::ParseMode;
pub use position::Position;
pub use text_source::TextSource;
pub use token::{Attribute, Token, TokenKind};
pub use tokenizer::{Quote, Tokenizer, TokenizerState};
