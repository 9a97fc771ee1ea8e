//! Recursive-descent parser.
//!
//! One token of lookahead, driven off [`rillc_lex::Scanner`]. Statements are
//! separated by newlines or commas; a body ends at `}` or end of input. Any
//! unexpected token aborts the parse with a message citing its position.

use thiserror::Error;

use rillc_lex::{LexError, Scanner, Token, TokenKind};
use rillc_util::{Position, Span};

use crate::ast::{Apply, Callee, Function, Node, NodeKind, TypeExpr};

/// Syntactic failure. The first one aborts the parse.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("unexpected {found} at {pos}, expected {expected}")]
    Unexpected {
        expected: String,
        found: String,
        pos: Position,
    },

    #[error("integer literal {value:?} at {pos} does not fit in 64 bits")]
    IntOutOfRange { value: String, pos: Position },
}

/// Parses a whole source text into its top-level statements.
pub fn parse(source: &str) -> Result<Vec<Node>, ParseError> {
    Parser::new(source)?.parse()
}

pub struct Parser<'a> {
    scanner: Scanner<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self, ParseError> {
        Ok(Self {
            scanner: Scanner::new(source)?,
        })
    }

    /// Entry point: parses statements until end of input.
    pub fn parse(&mut self) -> Result<Vec<Node>, ParseError> {
        let nodes = self.parse_body()?;
        if self.current().kind == TokenKind::RightBrace {
            return Err(self.unexpected("a statement"));
        }
        Ok(nodes)
    }

    fn current(&self) -> &Token {
        self.scanner.current()
    }

    fn advance(&mut self) -> Result<Token, ParseError> {
        Ok(self.scanner.advance()?)
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.current().kind == kind {
            self.advance()
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let tok = self.current();
        ParseError::Unexpected {
            expected: expected.to_string(),
            found: tok.to_string(),
            pos: tok.pos,
        }
    }

    fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.current().pos)
    }

    /// Parses statements until `}` or end of input; the terminator is left
    /// for the caller.
    fn parse_body(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut statements = Vec::new();
        loop {
            match self.current().kind {
                TokenKind::End | TokenKind::RightBrace => return Ok(statements),
                TokenKind::Newline | TokenKind::Comma | TokenKind::DocComment => {
                    self.advance()?;
                }
                TokenKind::At | TokenKind::Identifier => {
                    statements.push(self.parse_named_statement()?);
                }
                TokenKind::LeftParen | TokenKind::LeftBrace => {
                    statements.push(self.parse_anonymous_statement()?);
                }
                _ => return Err(self.unexpected("a statement")),
            }
        }
    }

    /// A statement beginning with an identifier or `@`: a labeled
    /// declaration, a call, or a reference.
    fn parse_named_statement(&mut self) -> Result<Node, ParseError> {
        let start = self.current().pos;
        if self.current().kind == TokenKind::At {
            return self.parse_reference_or_apply(None, start);
        }

        let ident = self.advance()?;
        if self.current().kind != TokenKind::Colon {
            // Call or reference; dotted continuations attach to the name.
            let callee = self.parse_dotted_name(ident.value)?;
            return self.parse_apply_tail(None, callee, start);
        }
        self.advance()?; // eat ':'

        let mut node = self.parse_declaration(Some(ident.value), start)?;

        // A labeled function literal can be applied on the spot:
        // `foo: (msg: @str){ ... }("hi")` declares `foo` as the partial
        // application, and the literal itself stays anonymous.
        if self.current().kind == TokenKind::LeftParen
            && matches!(node.kind, NodeKind::Function(_))
        {
            let label = node.name.take();
            let args = self.parse_paren_args()?;
            node = Node::new(
                label,
                self.span_from(start),
                NodeKind::Apply(Apply {
                    callee: Callee::Func(Box::new(node)),
                    args,
                }),
            );
        }
        Ok(node)
    }

    /// A statement beginning with `(` or `{`: an anonymous function or type,
    /// optionally applied on the spot.
    fn parse_anonymous_statement(&mut self) -> Result<Node, ParseError> {
        let start = self.current().pos;
        let node = self.parse_function_or_type(None, start)?;

        match self.current().kind {
            TokenKind::LeftParen if matches!(node.kind, NodeKind::Function(_)) => {
                let args = self.parse_paren_args()?;
                Ok(Node::new(
                    None,
                    self.span_from(start),
                    NodeKind::Apply(Apply {
                        callee: Callee::Func(Box::new(node)),
                        args,
                    }),
                ))
            }
            TokenKind::Newline
            | TokenKind::Comma
            | TokenKind::End
            | TokenKind::RightBrace => Ok(node),
            _ => Err(self.unexpected("a call, newline, or end of body")),
        }
    }

    /// A declaration right-hand side: function or type literal, integer,
    /// string, or a name (optionally applied).
    fn parse_declaration(
        &mut self,
        name: Option<String>,
        start: Position,
    ) -> Result<Node, ParseError> {
        match self.current().kind {
            TokenKind::LeftParen | TokenKind::LeftBrace => {
                self.parse_function_or_type(name, start)
            }
            TokenKind::Int => self.parse_int(name, start),
            TokenKind::Str => self.parse_str(name, start),
            TokenKind::Identifier | TokenKind::At => self.parse_reference_or_apply(name, start),
            _ => Err(self.unexpected("a declaration")),
        }
    }

    fn parse_int(&mut self, name: Option<String>, start: Position) -> Result<Node, ParseError> {
        let tok = self.advance()?;
        let value = tok.value.parse::<i64>().map_err(|_| ParseError::IntOutOfRange {
            value: tok.value.clone(),
            pos: tok.pos,
        })?;
        Ok(Node::new(name, self.span_from(start), NodeKind::Int(value)))
    }

    fn parse_str(&mut self, name: Option<String>, start: Position) -> Result<Node, ParseError> {
        let tok = self.advance()?;
        // The lexer keeps the surrounding quotes; strip them here.
        let inner = tok.value[1..tok.value.len() - 1].to_string();
        Ok(Node::new(name, self.span_from(start), NodeKind::Str(inner)))
    }

    /// A name use: `@?identifier(.identifier)*`, with arguments when a `(`
    /// follows and as a zero-argument application otherwise.
    fn parse_reference_or_apply(
        &mut self,
        name: Option<String>,
        start: Position,
    ) -> Result<Node, ParseError> {
        let mut callee = String::new();
        if self.current().kind == TokenKind::At {
            self.advance()?;
            callee.push('@');
        }
        let ident = self.expect(TokenKind::Identifier, "an identifier")?;
        callee.push_str(&ident.value);
        let callee = self.parse_dotted_name(callee)?;
        self.parse_apply_tail(name, callee, start)
    }

    /// Dotted continuations concatenate into a single atomic name.
    fn parse_dotted_name(&mut self, mut base: String) -> Result<String, ParseError> {
        while self.current().kind == TokenKind::Dot {
            self.advance()?;
            let part = self.expect(TokenKind::Identifier, "an identifier after '.'")?;
            base.push('.');
            base.push_str(&part.value);
        }
        Ok(base)
    }

    /// Arguments for a resolved callee name; absent parentheses make a
    /// zero-argument application (a reference).
    fn parse_apply_tail(
        &mut self,
        name: Option<String>,
        callee: String,
        start: Position,
    ) -> Result<Node, ParseError> {
        let args = if self.current().kind == TokenKind::LeftParen {
            self.parse_paren_args()?
        } else {
            Vec::new()
        };
        Ok(Node::new(
            name,
            self.span_from(start),
            NodeKind::Apply(Apply {
                callee: Callee::Name(callee),
                args,
            }),
        ))
    }

    /// `( arg, arg, ... )` where each argument is declaration-shaped.
    fn parse_paren_args(&mut self) -> Result<Vec<Node>, ParseError> {
        self.expect(TokenKind::LeftParen, "'('")?;
        let mut args = Vec::new();
        if self.current().kind == TokenKind::RightParen {
            self.advance()?;
            return Ok(args);
        }
        loop {
            let start = self.current().pos;
            args.push(self.parse_declaration(None, start)?);
            match self.current().kind {
                TokenKind::Comma => {
                    self.advance()?;
                }
                TokenKind::RightParen => break,
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }
        self.advance()?; // eat ')'
        Ok(args)
    }

    /// A leading `(...)` is a parameter list when `{` follows and a
    /// standalone type expression when it does not; a bare `{ body }` is a
    /// zero-parameter function.
    fn parse_function_or_type(
        &mut self,
        name: Option<String>,
        start: Position,
    ) -> Result<Node, ParseError> {
        let mut params = Vec::new();
        if self.current().kind == TokenKind::LeftParen {
            let ty = self.parse_type(None)?;
            if self.current().kind != TokenKind::LeftBrace {
                return Ok(Node::new(name, self.span_from(start), NodeKind::Type(ty)));
            }
            params = ty.values;
        }

        self.expect(TokenKind::LeftBrace, "'{'")?;
        let body = self.parse_body()?;
        self.expect(TokenKind::RightBrace, "'}'")?;
        Ok(Node::new(
            name,
            self.span_from(start),
            NodeKind::Function(Function { params, body }),
        ))
    }

    /// Type grammar: `@?Identifier '!'?` leaf, `()` empty, or
    /// `( T1, T2, ... )` with comma/newline separators. A `name:` prefix
    /// names a child (parameter lists).
    fn parse_type(&mut self, name: Option<String>) -> Result<TypeExpr, ParseError> {
        let start = self.current().pos;
        let mut prefix = "";
        if self.current().kind == TokenKind::At {
            self.advance()?;
            prefix = "@";
        }

        match self.current().kind {
            TokenKind::Identifier => {
                let ident = self.advance()?;
                if prefix.is_empty() && self.current().kind == TokenKind::Colon {
                    self.advance()?; // eat ':'
                    let mut ty = self.parse_type(None)?;
                    ty.name = Some(ident.value);
                    return Ok(ty);
                }
                let comptime = if self.current().kind == TokenKind::Exclaim {
                    self.advance()?;
                    true
                } else {
                    false
                };
                Ok(TypeExpr {
                    name,
                    value: Some(format!("{}{}", prefix, ident.value)),
                    values: Vec::new(),
                    comptime,
                    span: self.span_from(start),
                })
            }
            TokenKind::LeftParen if prefix.is_empty() => {
                self.advance()?; // eat '('
                let mut values = Vec::new();
                while self.current().kind != TokenKind::RightParen {
                    if self.current().kind == TokenKind::End {
                        return Err(self.unexpected("')' closing a type"));
                    }
                    values.push(self.parse_type(None)?);
                    if matches!(self.current().kind, TokenKind::Comma | TokenKind::Newline) {
                        self.advance()?;
                    }
                }
                self.advance()?; // eat ')'
                Ok(TypeExpr {
                    name,
                    value: None,
                    values,
                    comptime: false,
                    span: self.span_from(start),
                })
            }
            _ => Err(self.unexpected("a type")),
        }
    }
}
