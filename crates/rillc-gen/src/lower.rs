//! AST-to-IR lowering.
//!
//! The lowerer walks statements under a stack of contexts rooted at `main`.
//! Name resolution goes inner scope, outer snapshot, builtin table. Every
//! name use is an application: zero arguments resolve to the named value,
//! a *named* application becomes a wrapper function (compile-time partial
//! application), and an unnamed application at statement position becomes a
//! direct call.
//!
//! Capture promotion happens at context creation: each enclosing parameter
//! still visible gets a typed module slot, a `store` in the parent's block,
//! and a named `load` in the child's entry block, so every emitted function
//! only touches its own parameters, module-level entities, and its own entry
//! loads.

use indexmap::IndexMap;

use rillc_ir::{FuncId, LocalName, Module, Param, Ty, Value};
use rillc_par::{Apply, Callee, Function as FnNode, Node, NodeKind, TypeExpr};
use rillc_util::Span;
use rustc_hash::FxHashMap;

use crate::context::{Binding, Context};
use crate::error::{LowerError, Result};

/// Lowers a parsed program into an IR module.
pub fn lower(nodes: &[Node]) -> Result<Module> {
    Lowerer::new().lower(nodes)
}

/// Carries the module being built and the builtin memo table.
///
/// The memo lives here, per module, so compiling twice from fresh lowerers
/// yields byte-identical output.
pub struct Lowerer {
    pub(crate) module: Module,
    pub(crate) builtins: FxHashMap<String, Binding>,
}

impl Default for Lowerer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lowerer {
    pub fn new() -> Self {
        Self {
            module: Module::new(),
            builtins: FxHashMap::default(),
        }
    }

    /// Builds `main` (returning `i32 0`) around the top-level statements.
    pub fn lower(mut self, nodes: &[Node]) -> Result<Module> {
        let main = self.module.add_func("main", Ty::I32, vec![], false);
        let entry = self.module.func_mut(main).add_block("entry");
        let mut ctx = Context::root("main", main, entry);
        self.handle_body(&mut ctx, nodes, Some(Value::Int(0)))?;
        Ok(self.module)
    }

    /// Lowers one statement list and closes the block with `ret`.
    fn handle_body(&mut self, ctx: &mut Context, nodes: &[Node], ret: Option<Value>) -> Result<()> {
        for node in nodes {
            match &node.kind {
                NodeKind::Function(func) => match node.name.as_deref() {
                    Some(name) => {
                        let fid = self
                            .handle_function(ctx, Some(name), func)
                            .map_err(LowerError::in_declaration(name))?;
                        ctx.add(name, Binding::Func(fid))?;
                    }
                    None => {
                        // An anonymous function statement is called on the
                        // spot, so it must not expect arguments.
                        let fid = self.handle_function(ctx, None, func)?;
                        let params = self.module.func(fid).params.len();
                        if params != 0 {
                            return Err(LowerError::ArityMismatch {
                                callee: self.module.func(fid).name.clone(),
                                expected: params,
                                got: 0,
                            });
                        }
                        let value = self.module.func(fid).as_value();
                        self.module
                            .func_mut(ctx.func)
                            .emit_call(ctx.block, value, vec![]);
                    }
                },
                NodeKind::Apply(apply) => match node.name.as_deref() {
                    None => self.handle_statement_apply(ctx, apply, node.span)?,
                    Some(name) => {
                        let binding = self
                            .handle_named_apply(ctx, name, apply, node.span)
                            .map_err(LowerError::in_declaration(name))?;
                        ctx.add(name, binding)?;
                    }
                },
                NodeKind::Int(value) => match node.name.as_deref() {
                    None => {
                        return Err(LowerError::AnonymousStatement {
                            kind: "int literal",
                            pos: node.span.start,
                        })
                    }
                    Some(name) => ctx.add(name, Binding::Int(*value))?,
                },
                NodeKind::Str(text) => match node.name.as_deref() {
                    None => {
                        return Err(LowerError::AnonymousStatement {
                            kind: "string literal",
                            pos: node.span.start,
                        })
                    }
                    Some(name) => {
                        let (global, len) =
                            self.module.add_string_global(Some(name.to_string()), text);
                        ctx.add(name, Binding::Str { global, len })?;
                    }
                },
                NodeKind::Type(ty) => match node.name.as_deref() {
                    None => {
                        return Err(LowerError::AnonymousStatement {
                            kind: "type",
                            pos: node.span.start,
                        })
                    }
                    Some(name) => {
                        let lowered = self
                            .handle_type_expr(ctx, ty, Some(name))
                            .map_err(LowerError::in_declaration(name))?;
                        ctx.add(name, Binding::Ty(lowered))?;
                    }
                },
            }
        }
        self.module.func_mut(ctx.func).emit_ret(ctx.block, ret);
        Ok(())
    }

    /// Lowers a function literal into its own IR function and context.
    fn handle_function(
        &mut self,
        ctx: &mut Context,
        name: Option<&str>,
        func: &FnNode,
    ) -> Result<FuncId> {
        let short = match name {
            Some(n) => n.to_string(),
            None => ctx.next_anon(),
        };
        let mut params = Vec::with_capacity(func.params.len());
        for (i, p) in func.params.iter().enumerate() {
            params.push(
                self.handle_param(ctx, p)
                    .map_err(LowerError::in_parameter(i))?,
            );
        }
        let fid = self
            .module
            .add_func(format!("{}.{}", ctx.id, short), Ty::Void, params, false);
        let entry = self.module.func_mut(fid).add_block("entry");
        let mut child = self.new_context(ctx, &short, fid, entry);
        // The function can refer to itself.
        child.add(&short, Binding::Func(fid))?;
        self.handle_body(&mut child, &func.body, None)?;
        Ok(fid)
    }

    /// Creates a child context: snapshot the parent scope and promote
    /// captures so the child's emitted function stays closed.
    fn new_context(
        &mut self,
        parent: &mut Context,
        short: &str,
        func: FuncId,
        entry: usize,
    ) -> Context {
        let id = format!("{}.{}", parent.id, short);

        let mut outer = parent.outer.clone();
        for (key, binding) in &parent.inner {
            outer.insert(key.clone(), binding.clone());
        }

        let mut inner: IndexMap<String, Binding> = IndexMap::new();
        for p in self.module.func(func).params.clone() {
            inner.insert(
                p.name.clone(),
                Binding::Param {
                    name: p.name,
                    ty: p.ty,
                },
            );
        }

        let keys: Vec<String> = outer.keys().cloned().collect();
        for key in keys {
            if inner.contains_key(&key) {
                continue; // shadowed by the child's own parameter
            }
            match outer[&key].clone() {
                Binding::Param { name, ty } => {
                    // The child cannot reach the parent's stack: park the
                    // parameter in a module slot before the child runs and
                    // reload it in the child's entry block.
                    let slot = self.module.add_slot_global(ty.clone());
                    let value = Value::Param {
                        name,
                        ty: ty.clone(),
                    };
                    self.module
                        .func_mut(parent.func)
                        .emit_store(parent.block, value, &slot);
                    self.module
                        .func_mut(func)
                        .emit_load(entry, ty.clone(), &slot, &key);
                    outer.insert(
                        key.clone(),
                        Binding::Load {
                            slot,
                            ty,
                            name: key,
                        },
                    );
                }
                Binding::Load { slot, ty, .. } => {
                    // Already parked by an enclosing function: forward with a
                    // fresh load from the same slot.
                    self.module
                        .func_mut(func)
                        .emit_load(entry, ty.clone(), &slot, &key);
                    outer.insert(
                        key.clone(),
                        Binding::Load {
                            slot,
                            ty,
                            name: key,
                        },
                    );
                }
                _ => {}
            }
        }
        Context::child(id, func, entry, inner, outer)
    }

    /// An unnamed application at statement position: a direct call.
    fn handle_statement_apply(&mut self, ctx: &mut Context, apply: &Apply, span: Span) -> Result<()> {
        let (callee, display) = match &apply.callee {
            Callee::Func(node) => {
                let func = expect_function(node);
                let fid = self.handle_function(ctx, None, func)?;
                (self.module.func(fid).as_value(), self.module.func(fid).name.clone())
            }
            Callee::Name(name) => {
                let binding = self.resolve_binding(ctx, name, Some(apply), span)?;
                (self.binding_callable(&binding, name)?, name.clone())
            }
        };
        let sig = callee
            .ty()
            .fn_sig()
            .cloned()
            .expect("callable resolution yields a function type");

        let arity_ok = if sig.variadic {
            apply.args.len() >= sig.params.len()
        } else {
            apply.args.len() == sig.params.len()
        };
        if !arity_ok {
            return Err(LowerError::ArityMismatch {
                callee: display,
                expected: sig.params.len(),
                got: apply.args.len(),
            });
        }

        let mut args = Vec::with_capacity(apply.args.len());
        for (i, arg) in apply.args.iter().enumerate() {
            let value = self
                .handle_value(ctx, arg, sig.params.get(i))
                .map_err(LowerError::in_argument(i))?;
            args.push(value);
        }
        self.module
            .func_mut(ctx.func)
            .emit_call(ctx.block, callee, args);
        Ok(())
    }

    /// A named application: an alias when it is a bare reference to a
    /// non-callable, a wrapper function otherwise.
    fn handle_named_apply(
        &mut self,
        ctx: &mut Context,
        name: &str,
        apply: &Apply,
        span: Span,
    ) -> Result<Binding> {
        if apply.args.is_empty() {
            if let Callee::Name(callee) = &apply.callee {
                let binding = self.resolve_binding(ctx, callee, Some(apply), span)?;
                if !matches!(binding, Binding::Func(_)) {
                    return Ok(binding);
                }
            }
        }
        let wrapper = self.handle_apply(ctx, Some(name), apply, span)?;
        Ok(Binding::Func(wrapper))
    }

    /// An application in value position: emit a wrapper function taking the
    /// callee's trailing parameters and forwarding the supplied arguments.
    fn handle_apply(
        &mut self,
        ctx: &mut Context,
        name: Option<&str>,
        apply: &Apply,
        span: Span,
    ) -> Result<FuncId> {
        let (callee_fid, display) = match &apply.callee {
            Callee::Func(node) => {
                let func = expect_function(node);
                let fid = self.handle_function(ctx, None, func)?;
                (fid, self.module.func(fid).name.clone())
            }
            Callee::Name(callee) => {
                let binding = self.resolve_binding(ctx, callee, Some(apply), span)?;
                match binding {
                    Binding::Func(fid) => (fid, callee.clone()),
                    _ => {
                        return Err(LowerError::NotCallable {
                            name: callee.clone(),
                        })
                    }
                }
            }
        };

        let callee_params = self.module.func(callee_fid).params.clone();
        let callee_value = self.module.func(callee_fid).as_value();
        let variadic = self.module.func(callee_fid).variadic;
        if apply.args.len() > callee_params.len() && !variadic {
            return Err(LowerError::ArityMismatch {
                callee: display,
                expected: callee_params.len(),
                got: apply.args.len(),
            });
        }

        let mut args = Vec::with_capacity(callee_params.len());
        for (i, arg) in apply.args.iter().enumerate() {
            let formal = callee_params.get(i).map(|p| p.ty.clone());
            let value = self
                .handle_value(ctx, arg, formal.as_ref())
                .map_err(LowerError::in_argument(i))?;
            args.push(value);
        }

        let trailing: Vec<Param> = if apply.args.len() >= callee_params.len() {
            Vec::new()
        } else {
            callee_params[apply.args.len()..].to_vec()
        };

        let short = match name {
            Some(n) => n.to_string(),
            None => ctx.next_anon(),
        };
        let wrapper =
            self.module
                .add_func(format!("{}.{}", ctx.id, short), Ty::Void, trailing.clone(), false);
        let entry = self.module.func_mut(wrapper).add_block("entry");
        let wctx = self.new_context(ctx, &short, wrapper, entry);

        for i in 0..trailing.len() {
            args.push(self.module.func(wrapper).param_value(i));
        }
        let wf = self.module.func_mut(wrapper);
        wf.emit_call(wctx.block, callee_value, args);
        wf.emit_ret(wctx.block, None);
        Ok(wrapper)
    }

    /// Lowers a node in value (argument) position. `formal` is the receiving
    /// parameter's type, used for the callback-shape check on function
    /// values.
    fn handle_value(&mut self, ctx: &mut Context, node: &Node, formal: Option<&Ty>) -> Result<Value> {
        match &node.kind {
            NodeKind::Function(func) => {
                let fid = self.handle_function(ctx, None, func)?;
                let value = self.module.func(fid).as_value();
                self.check_callback_shape(formal, &value)?;
                Ok(value)
            }
            NodeKind::Apply(apply) => {
                if apply.args.is_empty() {
                    if let Callee::Name(name) = &apply.callee {
                        let binding = self.resolve_binding(ctx, name, Some(apply), node.span)?;
                        return self.binding_value(&binding, name);
                    }
                }
                let fid = self.handle_apply(ctx, None, apply, node.span)?;
                let value = self.module.func(fid).as_value();
                self.check_callback_shape(formal, &value)?;
                Ok(value)
            }
            NodeKind::Int(v) => Ok(Value::Int(*v)),
            NodeKind::Str(s) => {
                let (global, len) = self.module.add_string_global(None, s);
                Ok(Value::StrPtr { global, len })
            }
            NodeKind::Type(_) => Err(LowerError::NotAValue {
                name: node.label().to_string(),
            }),
        }
    }

    /// A function value handed to a callback-shaped parameter must not take
    /// more parameters than the callback declares.
    fn check_callback_shape(&self, formal: Option<&Ty>, value: &Value) -> Result<()> {
        if let Some(formal) = formal {
            if let (Some(fsig), Some(vsig)) = (formal.fn_sig(), value.ty().fn_sig()) {
                if vsig.params.len() > fsig.params.len() {
                    return Err(LowerError::CallbackArity {
                        expected: fsig.params.len(),
                        got: vsig.params.len(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Inner scope, outer snapshot, then the builtin table.
    fn resolve_binding(
        &mut self,
        ctx: &mut Context,
        name: &str,
        apply: Option<&Apply>,
        span: Span,
    ) -> Result<Binding> {
        if let Some(binding) = ctx.get(name).cloned() {
            return Ok(binding);
        }
        if name.starts_with('@') {
            if let Some(binding) = self.handle_builtin(ctx, name, apply)? {
                return Ok(binding);
            }
        }
        Err(LowerError::UnknownName {
            name: name.to_string(),
            pos: span.start,
        })
    }

    /// The binding as a value operand.
    fn binding_value(&self, binding: &Binding, name: &str) -> Result<Value> {
        match binding {
            Binding::Int(v) => Ok(Value::Int(*v)),
            Binding::Str { global, len } => Ok(Value::StrPtr {
                global: global.clone(),
                len: *len,
            }),
            Binding::Func(fid) => Ok(self.module.func(*fid).as_value()),
            Binding::Param { name, ty } => Ok(Value::Param {
                name: name.clone(),
                ty: ty.clone(),
            }),
            Binding::Load { ty, name, .. } => Ok(Value::Local {
                name: LocalName::Named(name.clone()),
                ty: ty.clone(),
            }),
            Binding::Ty(_) => Err(LowerError::NotAValue {
                name: name.to_string(),
            }),
        }
    }

    /// The binding as something a call instruction can target.
    fn binding_callable(&self, binding: &Binding, name: &str) -> Result<Value> {
        let value = match binding {
            Binding::Ty(_) => {
                return Err(LowerError::NotCallable {
                    name: name.to_string(),
                })
            }
            other => self.binding_value(other, name)?,
        };
        if value.ty().fn_sig().is_none() {
            return Err(LowerError::NotCallable {
                name: name.to_string(),
            });
        }
        Ok(value)
    }

    /// Synthesizes one IR parameter from a parameter-list type expression.
    fn handle_param(&mut self, ctx: &mut Context, ty: &TypeExpr) -> Result<Param> {
        let name = match ty.name.as_deref() {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => {
                return Err(LowerError::UnnamedParameter {
                    pos: ty.span.start,
                })
            }
        };
        let lowered = match &ty.value {
            Some(value) => self.resolve_type_name(ctx, value, ty.span)?,
            None => self.handle_type_expr(ctx, ty, None)?,
        };
        Ok(Param::new(name, lowered))
    }

    /// Lowers a type expression. A parenthesized type is a pointer to a
    /// `void` function over its child types; `self_name` stands for the type
    /// being declared and lowers to an opaque pointer, which breaks recursive
    /// type cycles.
    fn handle_type_expr(
        &mut self,
        ctx: &mut Context,
        ty: &TypeExpr,
        self_name: Option<&str>,
    ) -> Result<Ty> {
        if let Some(value) = &ty.value {
            if self_name == Some(value.as_str()) {
                return Ok(Ty::Ptr);
            }
            return self.resolve_type_name(ctx, value, ty.span);
        }
        let mut params = Vec::with_capacity(ty.values.len());
        for (i, child) in ty.values.iter().enumerate() {
            params.push(
                self.handle_type_expr(ctx, child, self_name)
                    .map_err(LowerError::in_parameter(i))?,
            );
        }
        Ok(Ty::FnPtr(rillc_ir::FnSig::callback(params)))
    }

    /// A type-position leaf: builtin primitive or a user-declared type name.
    fn resolve_type_name(&mut self, ctx: &mut Context, name: &str, span: Span) -> Result<Ty> {
        if let Some(binding) = ctx.get(name).cloned() {
            return match binding {
                Binding::Ty(ty) => Ok(ty),
                _ => Err(LowerError::NotAType {
                    name: name.to_string(),
                }),
            };
        }
        if name.starts_with('@') {
            if let Some(binding) = self.handle_builtin(ctx, name, None)? {
                return match binding {
                    Binding::Ty(ty) => Ok(ty),
                    _ => Err(LowerError::NotAType {
                        name: name.to_string(),
                    }),
                };
            }
        }
        Err(LowerError::UnknownName {
            name: name.to_string(),
            pos: span.start,
        })
    }
}

fn expect_function(node: &Node) -> &FnNode {
    match &node.kind {
        NodeKind::Function(func) => func,
        other => panic!("apply callee is not a function literal: {:?}", other),
    }
}
