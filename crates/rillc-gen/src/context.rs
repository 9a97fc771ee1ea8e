//! Lowering contexts and scope bindings.
//!
//! A [`Context`] mirrors one emitted function: its dotted identifier path,
//! its current block, the declarations introduced in its own scope (`inner`),
//! and a snapshot-union of every enclosing scope (`outer`). Both maps keep
//! insertion order; capture promotion walks `outer` in that order, so the
//! emitted stores and loads are deterministic.

use indexmap::IndexMap;

use rillc_ir::{FuncId, Ty};

use crate::error::{LowerError, Result};

/// What a name in scope stands for. One uniform table covers type aliases,
/// constants, and callables; parameters and promoted captures carry the extra
/// detail the promotion pass needs.
#[derive(Clone, Debug)]
pub enum Binding {
    /// A type alias (builtin primitive, user type, callback type).
    Ty(Ty),
    /// A 32-bit integer constant.
    Int(i64),
    /// A string constant, addressed through its global.
    Str { global: String, len: u64 },
    /// A module function.
    Func(FuncId),
    /// A parameter of this context's emitted function.
    Param { name: String, ty: Ty },
    /// A captured value reloaded from a module slot in this context's entry
    /// block.
    Load { slot: String, ty: Ty, name: String },
}

/// One emitted function's lexical scope during lowering.
#[derive(Debug)]
pub struct Context {
    /// Dotted identifier path (`main`, `main.foo`, `main.foo.0`, ...).
    pub id: String,
    /// The function this context emits into.
    pub func: FuncId,
    /// The block new instructions append to.
    pub block: usize,
    /// Declarations introduced in this scope, insertion-ordered.
    pub inner: IndexMap<String, Binding>,
    /// Snapshot-union of the enclosing scopes, transformed on capture.
    pub outer: IndexMap<String, Binding>,
    /// Counter naming anonymous nested entities.
    counter: u32,
}

impl Context {
    /// The root context (`main`).
    pub fn root(id: impl Into<String>, func: FuncId, block: usize) -> Self {
        Self {
            id: id.into(),
            func,
            block,
            inner: IndexMap::new(),
            outer: IndexMap::new(),
            counter: 0,
        }
    }

    /// Raw child constructor; capture promotion is the lowerer's job since it
    /// emits instructions.
    pub fn child(
        id: String,
        func: FuncId,
        block: usize,
        inner: IndexMap<String, Binding>,
        outer: IndexMap<String, Binding>,
    ) -> Self {
        Self {
            id,
            func,
            block,
            inner,
            outer,
            counter: 0,
        }
    }

    /// The next anonymous child name in this scope (`0`, `1`, ...).
    pub fn next_anon(&mut self) -> String {
        let n = self.counter;
        self.counter += 1;
        n.to_string()
    }

    /// Declares `name` in this scope. Redeclaration is fatal.
    pub fn add(&mut self, name: &str, binding: Binding) -> Result<()> {
        assert!(!name.is_empty(), "declaring an empty name in {}", self.id);
        if self.inner.contains_key(name) {
            return Err(LowerError::DuplicateName {
                name: name.to_string(),
            });
        }
        self.inner.insert(name.to_string(), binding);
        Ok(())
    }

    /// Looks `name` up: this scope first, then the captured outer snapshot.
    /// Builtins are the lowerer's fallback.
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.inner.get(name).or_else(|| self.outer.get(name))
    }
}
