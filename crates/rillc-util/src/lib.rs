//! rillc-util - Shared utilities for the Rill compiler.
//!
//! This crate holds the pieces every pipeline stage needs: source positions
//! and spans, and the printf format-specifier parser used when specializing
//! the `@printf` builtin.

pub mod fmtspec;
pub mod span;

pub use fmtspec::{parse_printf_format, PrintfSpec};
pub use span::{Position, Span};
