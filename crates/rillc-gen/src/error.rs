//! Error types for IR lowering.
//!
//! Leaf variants carry the source position where one is known; the wrapper
//! variants (`InDeclaration`, `InArgument`, `InParameter`, `InBuiltin`) chain
//! through `source()` so a failure reads as a path from the top-level
//! statement down to the offending node.

use thiserror::Error;

use rillc_util::Position;

/// Error type for IR lowering.
#[derive(Debug, Error)]
pub enum LowerError {
    /// A name not found in inner scope, outer scope, or the builtin table
    #[error("name {name:?} not found in this scope at {pos}")]
    UnknownName { name: String, pos: Position },

    /// The same name declared twice in one scope
    #[error("{name:?} is already declared in this scope")]
    DuplicateName { name: String },

    /// A value that cannot be called where a call was required
    #[error("{name:?} is not callable")]
    NotCallable { name: String },

    /// A value used where a type was required
    #[error("{name:?} is not a type")]
    NotAType { name: String },

    /// A type used where a value was required
    #[error("{name:?} is not a value")]
    NotAValue { name: String },

    /// An application with the wrong number of arguments
    #[error("{callee:?} expects {expected} arguments, got {got}")]
    ArityMismatch {
        callee: String,
        expected: usize,
        got: usize,
    },

    /// A function argument wider than the callback parameter receiving it
    #[error("argument takes {got} parameters, but the callback parameter accepts {expected}")]
    CallbackArity { expected: usize, got: usize },

    /// An unlabeled literal or type at statement position
    #[error("anonymous {kind} statement is not supported at {pos}")]
    AnonymousStatement { kind: &'static str, pos: Position },

    /// A function literal parameter without a binding name
    #[error("parameter at {pos} has no name")]
    UnnamedParameter { pos: Position },

    /// `@printf` needs a literal format string to specialize on
    #[error("@printf first argument must be a compile-time string literal at {pos}")]
    PrintfFormat { pos: Position },

    /// A conversion the `@printf` lowering cannot type
    #[error("specifier {spec:?} is not supported in @printf")]
    PrintfSpecifier { spec: String },

    /// `@prompt` needs a literal integer limit to specialize on
    #[error("@prompt limit must be a compile-time integer literal at {pos}")]
    PromptLimit { pos: Position },

    /// Context: failure inside a labeled declaration
    #[error("in declaration of {name:?}")]
    InDeclaration {
        name: String,
        #[source]
        source: Box<LowerError>,
    },

    /// Context: failure lowering an argument
    #[error("in argument {index}")]
    InArgument {
        index: usize,
        #[source]
        source: Box<LowerError>,
    },

    /// Context: failure lowering a parameter
    #[error("in parameter {index}")]
    InParameter {
        index: usize,
        #[source]
        source: Box<LowerError>,
    },

    /// Context: failure specializing a builtin
    #[error("specializing builtin {name:?}")]
    InBuiltin {
        name: String,
        #[source]
        source: Box<LowerError>,
    },
}

impl LowerError {
    pub fn in_declaration(name: &str) -> impl FnOnce(LowerError) -> LowerError + '_ {
        move |e| LowerError::InDeclaration {
            name: name.to_string(),
            source: Box::new(e),
        }
    }

    pub fn in_argument(index: usize) -> impl FnOnce(LowerError) -> LowerError {
        move |e| LowerError::InArgument {
            index,
            source: Box::new(e),
        }
    }

    pub fn in_parameter(index: usize) -> impl FnOnce(LowerError) -> LowerError {
        move |e| LowerError::InParameter {
            index,
            source: Box::new(e),
        }
    }

    pub fn in_builtin(name: &str) -> impl FnOnce(LowerError) -> LowerError + '_ {
        move |e| LowerError::InBuiltin {
            name: name.to_string(),
            source: Box::new(e),
        }
    }
}

/// Result type alias for lowering operations.
pub type Result<T> = std::result::Result<T, LowerError>;
