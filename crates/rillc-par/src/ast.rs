//! AST node definitions.
//!
//! Five variants cover the whole language: integer literal, string literal,
//! type expression, function, and application. A label `name:` attaches to
//! whatever its right-hand side parses to, so every variant carries an
//! optional name. A bare reference to a name is an [`Apply`] with no
//! arguments; the reference/call distinction collapses to arity.

use rillc_util::Span;

/// One AST node: an optional label, a source range, and the variant payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// Set when this node is the right-hand side of `name:`.
    pub name: Option<String>,
    pub span: Span,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(name: Option<String>, span: Span, kind: NodeKind) -> Self {
        Self { name, span, kind }
    }

    /// The label, or `""` for anonymous nodes.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// The node variant payload.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Integer literal.
    Int(i64),
    /// String literal, quotes stripped and escapes expanded.
    Str(String),
    /// Type expression.
    Type(TypeExpr),
    /// Function literal.
    Function(Function),
    /// Application of a callee to zero or more arguments.
    Apply(Apply),
}

/// A function literal: parameter list and brace-delimited body.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub params: Vec<TypeExpr>,
    pub body: Vec<Node>,
}

/// An application. With arguments it is a call site or partial application;
/// with none it is a reference.
#[derive(Clone, Debug, PartialEq)]
pub struct Apply {
    pub callee: Callee,
    pub args: Vec<Node>,
}

/// What is being applied.
#[derive(Clone, Debug, PartialEq)]
pub enum Callee {
    /// A (possibly `@`-prefixed, possibly dotted) name, a single atomic key.
    Name(String),
    /// An anonymous function literal applied on the spot.
    Func(Box<Node>),
}

/// A type expression.
///
/// A leaf carries `value` (e.g. `@int`, `str`); a parenthesized callback type
/// carries `values` (its parameter types); `name` labels a child inside a
/// parameter list (`x: @int`); `comptime` records a trailing `!`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct TypeExpr {
    pub name: Option<String>,
    pub value: Option<String>,
    pub values: Vec<TypeExpr>,
    pub comptime: bool,
    pub span: Span,
}

impl TypeExpr {
    /// True for `()` and `(T1, ..., Tn)` forms.
    pub fn is_callback(&self) -> bool {
        self.value.is_none()
    }
}
