//! rillc-lex - Lexical analysis for the Rill language.
//!
//! Two layers:
//! - [`Reader`] - a rune stream over the source text with newline
//!   normalization, position tracking, and one-rune lookback.
//! - [`Lexer`] / [`Scanner`] - the token stream. `Scanner` is the facade the
//!   parser drives: it is primed on construction and exposes the current
//!   token plus `advance`.

pub mod lexer;
pub mod reader;
pub mod token;

pub use lexer::{LexError, Lexer, Scanner};
pub use reader::Reader;
pub use token::{Token, TokenKind};
