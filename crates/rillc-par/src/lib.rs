//! rillc-par - Syntactic analysis for the Rill language.
//!
//! A recursive-descent parser with one token of lookahead. The whole surface
//! of the language is labeled and anonymous functions; the AST accordingly has
//! only five node variants, and every use of a name is an application with
//! zero or more arguments.
//!
//! The parser aborts on the first error; there is no recovery and partial
//! results are discarded.

pub mod ast;
pub mod dump;
pub mod parser;

pub use ast::{Apply, Callee, Function, Node, NodeKind, TypeExpr};
pub use parser::{parse, ParseError, Parser};
