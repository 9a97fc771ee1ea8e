//! The lexer proper.
//!
//! Single pass, no backtracking beyond the reader's one-rune lookback.
//! Spaces are skipped; runs of line breaks (and the blank lines between them)
//! collapse into a single `Newline` token. Each token's position is the
//! position of its first rune.

use thiserror::Error;

use rillc_util::Position;

use crate::reader::Reader;
use crate::token::{Token, TokenKind};

/// Lexical failure. The pipeline aborts on the first one.
#[derive(Debug, Error)]
pub enum LexError {
    #[error("missing closing {quote} quote for string starting at {pos}")]
    UnterminatedString { quote: char, pos: Position },
}

/// Turns runes into tokens.
pub struct Lexer<'a> {
    reader: Reader<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            reader: Reader::new(source),
        }
    }

    /// Returns the next token, skipping spaces and comments.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            let pos = self.reader.position();
            match self.reader.read_rune() {
                None => return Ok(Token::new(TokenKind::End, "", pos)),
                Some(c) if c != '\n' && c != '\r' && c.is_whitespace() => continue,
                Some(c) => return self.lex_at(c, pos),
            }
        }
    }

    fn lex_at(&mut self, first: char, start: Position) -> Result<Token, LexError> {
        match first {
            '\n' | '\r' => Ok(self.lex_newline_run(start)),
            '/' => self.lex_slash(start),
            '"' | '\'' => self.lex_string(first, start),
            c if c.is_alphabetic() => Ok(self.lex_identifier(c, start)),
            c if c.is_ascii_digit() => Ok(self.lex_int(c, start)),
            '@' => Ok(Token::new(TokenKind::At, "@", start)),
            '(' => Ok(Token::new(TokenKind::LeftParen, "(", start)),
            ')' => Ok(Token::new(TokenKind::RightParen, ")", start)),
            '{' => Ok(Token::new(TokenKind::LeftBrace, "{", start)),
            '}' => Ok(Token::new(TokenKind::RightBrace, "}", start)),
            ',' => Ok(Token::new(TokenKind::Comma, ",", start)),
            ':' => Ok(Token::new(TokenKind::Colon, ":", start)),
            ';' => Ok(Token::new(TokenKind::Semicolon, ";", start)),
            '.' => Ok(Token::new(TokenKind::Dot, ".", start)),
            '!' => Ok(Token::new(TokenKind::Exclaim, "!", start)),
            '?' => Ok(Token::new(TokenKind::Question, "?", start)),
            '+' | '-' | '*' | '<' => Ok(Token::new(TokenKind::BinOp, first.to_string(), start)),
            c => Ok(Token::new(TokenKind::Unknown, c.to_string(), start)),
        }
    }

    /// Collapses the current run of line breaks and blank lines into one
    /// `Newline` token, or `End` when only whitespace remains.
    fn lex_newline_run(&mut self, start: Position) -> Token {
        loop {
            match self.reader.read_rune() {
                None => return Token::new(TokenKind::End, "", start),
                Some(c) if c.is_whitespace() => continue,
                Some(_) => {
                    self.reader.unread_rune();
                    return Token::new(TokenKind::Newline, "", start);
                }
            }
        }
    }

    /// `//` comments are discarded (their newline still counts); `///` starts
    /// a doc comment whose trailing newline run is swallowed.
    fn lex_slash(&mut self, start: Position) -> Result<Token, LexError> {
        match self.reader.read_rune() {
            Some('/') => {}
            Some(_) => {
                self.reader.unread_rune();
                return Ok(Token::new(TokenKind::Unknown, "/", start));
            }
            None => return Ok(Token::new(TokenKind::Unknown, "/", start)),
        }
        let mut c = self.reader.read_rune();
        if c == Some('/') {
            return Ok(self.lex_doc_comment(start));
        }
        // Plain line comment: drop everything up to the newline and let the
        // newline produce its own token.
        while !matches!(c, None | Some('\n') | Some('\r')) {
            c = self.reader.read_rune();
        }
        if c.is_some() {
            self.reader.unread_rune();
        }
        self.next_token()
    }

    fn lex_doc_comment(&mut self, start: Position) -> Token {
        // Redundant slashes beyond the third are part of the marker.
        let mut c = self.reader.read_rune();
        while c == Some('/') {
            c = self.reader.read_rune();
        }
        let mut text = String::new();
        loop {
            match c {
                None | Some('\n') | Some('\r') => break,
                Some(ch) => text.push(ch),
            }
            c = self.reader.read_rune();
        }
        // Swallow the newline run so a doc comment does not also produce a
        // Newline token.
        while matches!(c, Some('\n') | Some('\r')) {
            c = self.reader.read_rune();
        }
        if c.is_some() {
            self.reader.unread_rune();
        }
        Token::new(TokenKind::DocComment, format!("///{}", text.trim()), start)
    }

    fn lex_identifier(&mut self, first: char, start: Position) -> Token {
        let mut ident = String::new();
        ident.push(first);
        loop {
            match self.reader.read_rune() {
                Some(c) if c.is_alphabetic() || c.is_ascii_digit() || c == '_' => ident.push(c),
                Some(_) => {
                    self.reader.unread_rune();
                    break;
                }
                None => break,
            }
        }
        Token::new(TokenKind::Identifier, ident, start)
    }

    fn lex_int(&mut self, first: char, start: Position) -> Token {
        let mut digits = String::new();
        digits.push(first);
        loop {
            match self.reader.read_rune() {
                Some(c) if c.is_ascii_digit() => digits.push(c),
                Some(_) => {
                    self.reader.unread_rune();
                    break;
                }
                None => break,
            }
        }
        Token::new(TokenKind::Int, digits, start)
    }

    /// Lexes a quoted string. The token value keeps the surrounding quotes;
    /// `\n` and `\r` expand, any other escape keeps both characters.
    fn lex_string(&mut self, quote: char, start: Position) -> Result<Token, LexError> {
        let mut value = String::new();
        value.push(quote);
        loop {
            match self.reader.read_rune() {
                None => return Err(LexError::UnterminatedString { quote, pos: start }),
                Some(c) if c == quote => {
                    value.push(quote);
                    return Ok(Token::new(TokenKind::Str, value, start));
                }
                Some('\\') => match self.reader.read_rune() {
                    None => return Err(LexError::UnterminatedString { quote, pos: start }),
                    Some('n') => value.push('\n'),
                    Some('r') => value.push('\r'),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                },
                Some(c) => value.push(c),
            }
        }
    }
}

/// The token-stream facade the parser drives.
///
/// Construction primes the scanner past any leading whitespace and loads the
/// first token; `advance` returns the previous current token.
pub struct Scanner<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Result<Self, LexError> {
        let mut lexer = Lexer::new(source);
        // Leading blank lines must not produce a Newline token.
        loop {
            match lexer.reader.read_rune() {
                Some(c) if c.is_whitespace() => continue,
                Some(_) => {
                    lexer.reader.unread_rune();
                    break;
                }
                None => break,
            }
        }
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// The token under the cursor.
    pub fn current(&self) -> &Token {
        &self.current
    }

    /// Consumes the current token and returns it, loading the next one.
    pub fn advance(&mut self) -> Result<Token, LexError> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }
}
