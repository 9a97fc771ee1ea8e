//! rillc-gen - IR lowering for the Rill compiler.
//!
//! Walks the AST under a tree of lexical contexts and emits a textual IR
//! module: name resolution through nested scopes, compile-time partial
//! application, builtin specialization with memoized wrappers, and the
//! promotion of captured outer values into module slots so every emitted
//! function is flat and closed.

mod builtins;
pub mod context;
pub mod error;
pub mod lower;

pub use context::{Binding, Context};
pub use error::LowerError;
pub use lower::{lower, Lowerer};

use thiserror::Error;

/// Failure anywhere in the source-to-IR pipeline.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("error parsing source")]
    Parse(#[from] rillc_par::ParseError),

    #[error("error generating IR")]
    Lower(#[from] LowerError),
}

/// Runs the whole pipeline: source text in, textual IR out.
pub fn generate_ir(source: &str) -> Result<String, CompileError> {
    let nodes = rillc_par::parse(source)?;
    let module = lower::lower(&nodes)?;
    Ok(module.to_string())
}
