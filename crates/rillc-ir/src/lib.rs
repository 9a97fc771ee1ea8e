//! rillc-ir - The textual IR the compiler emits.
//!
//! A small static-single-assignment module model in the well-known LLVM
//! textual dialect: named global constants and capture slots, external
//! declarations, and function definitions made of labeled blocks. The model
//! only carries what the Rill lowerer emits; printing it (`Display` on
//! [`Module`]) produces the exact text a downstream assembler consumes.

pub mod emit;
pub mod module;
pub mod ty;

pub use module::{
    Block, FuncId, Function, Global, GlobalInit, Inst, LocalName, Module, Param, Pred, Value,
};
pub use ty::{FnSig, Ty};
