//! Built-in functions.
//!
//! A memoizing table maps a specialization id to an emitted IR entity. Plain
//! builtins key on their source name; `@printf` and `@prompt` mix in
//! compile-time argument fingerprints (standard base64 for strings, decimal
//! for integers) so distinct specializations never collide. First use emits,
//! later uses reuse.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use rillc_ir::{FnSig, FuncId, Param, Pred, Ty, Value};
use rillc_par::{Apply, NodeKind};
use rillc_util::{parse_printf_format, Position};

use crate::context::{Binding, Context};
use crate::error::{LowerError, Result};
use crate::lower::Lowerer;

impl Lowerer {
    /// Resolves `name` in the builtin table, emitting it on first use.
    /// Returns `None` for names that are not builtins. `apply` supplies the
    /// compile-time arguments specialization-capable builtins key on.
    pub(crate) fn handle_builtin(
        &mut self,
        ctx: &mut Context,
        name: &str,
        apply: Option<&Apply>,
    ) -> Result<Option<Binding>> {
        let mut id = name.to_string();
        let mut fmt = None;
        let mut limit = None;

        match name {
            "@printf" => {
                let first = apply.and_then(|a| a.args.first());
                let text = match first.map(|n| &n.kind) {
                    Some(NodeKind::Str(s)) => s.clone(),
                    _ => {
                        return Err(LowerError::PrintfFormat {
                            pos: first.map(|n| n.span.start).unwrap_or_default(),
                        })
                    }
                };
                let specs = parse_printf_format(&text);
                let joined: String = specs.iter().map(|s| s.original.as_str()).collect();
                id.push('$');
                id.push_str(&BASE64.encode(joined.as_bytes()));
                fmt = Some(text);
            }
            "@prompt" => {
                let args = apply.map(|a| a.args.as_slice()).unwrap_or(&[]);
                match args.first().map(|n| &n.kind) {
                    Some(NodeKind::Int(v)) => limit = Some(*v),
                    _ => {
                        return Err(LowerError::PromptLimit {
                            pos: args
                                .first()
                                .map(|n| n.span.start)
                                .unwrap_or(Position::START),
                        })
                    }
                }
                for arg in args {
                    match &arg.kind {
                        NodeKind::Int(v) => {
                            id.push('$');
                            id.push_str(&v.to_string());
                        }
                        NodeKind::Str(s) => {
                            id.push('$');
                            id.push_str(&BASE64.encode(s.as_bytes()));
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }

        if let Some(binding) = self.builtins.get(&id).cloned() {
            if name == "@std" {
                self.bind_std_aliases(ctx);
            }
            return Ok(Some(binding));
        }

        let binding = match name {
            "@int" => Some(Binding::Ty(Ty::I32)),
            "@str" => Some(Binding::Ty(Ty::I8Ptr)),
            "@float" => Some(Binding::Ty(Ty::Float)),
            "@add" | "@mul" => Some(self.emit_arith(name)),
            "@ieq" | "@igt" => Some(self.emit_compare(name)),
            "@printf" => {
                let fmt = fmt.expect("format captured above");
                Some(
                    self.emit_printf(&id, &fmt)
                        .map_err(LowerError::in_builtin(name))?,
                )
            }
            "@prompt" => {
                let limit = limit.expect("limit captured above");
                Some(self.emit_prompt(&id, limit))
            }
            "@std" => {
                self.bind_std_aliases(ctx);
                Some(Binding::Func(self.emit_std()))
            }
            "@unsafe.libc.printf" => Some(Binding::Func(self.ensure_libc_printf())),
            "@unsafe.libc.scanf" => Some(Binding::Func(self.ensure_libc_scanf())),
            "@unsafe.libc.puts" => Some(self.emit_libc_puts()),
            "@unsafe.libc.atoi" => Some(self.emit_libc_atoi()),
            "@unsafe.libc.getchar" => Some(self.emit_libc_getchar()),
            "@unsafe.libc.fgets" => Some(self.emit_libc_fgets()),
            _ => None,
        };
        if let Some(binding) = &binding {
            self.builtins.insert(id, binding.clone());
        }
        Ok(binding)
    }

    /// `@std` introduces the primitive aliases into the current scope on
    /// every application; names the user already declared win.
    fn bind_std_aliases(&mut self, ctx: &mut Context) {
        for (name, ty) in [
            ("int", Ty::I32),
            ("str", Ty::I8Ptr),
            ("string", Ty::I8Ptr),
            ("float", Ty::Float),
        ] {
            if ctx.get(name).is_none() {
                let _ = ctx.add(name, Binding::Ty(ty));
            }
        }
    }

    fn emit_std(&mut self) -> FuncId {
        let fid = self.module.add_func("std", Ty::Void, vec![], false);
        let f = self.module.func_mut(fid);
        let entry = f.add_block("entry");
        f.emit_ret(entry, None);
        fid
    }

    /// `@add` / `@mul`: compute, then hand the result to the `ok` callback.
    fn emit_arith(&mut self, name: &str) -> Binding {
        let ok_ty = Ty::FnPtr(FnSig::callback(vec![Ty::I32]));
        let fid = self.module.add_func(
            format!("builtin.{}", &name[1..]),
            Ty::Void,
            vec![
                Param::new("x", Ty::I32),
                Param::new("y", Ty::I32),
                Param::new("ok", ok_ty),
            ],
            false,
        );
        let f = self.module.func_mut(fid);
        let entry = f.add_block("entry");
        let x = f.param_value(0);
        let y = f.param_value(1);
        let ok = f.param_value(2);
        let res = if name == "@add" {
            f.emit_add(entry, x, y)
        } else {
            f.emit_mul(entry, x, y)
        };
        f.emit_call(entry, ok, vec![res]);
        f.emit_ret(entry, None);
        Binding::Func(fid)
    }

    /// `@ieq` / `@igt`: compare and branch to the matching callback.
    fn emit_compare(&mut self, name: &str) -> Binding {
        let cb_ty = Ty::FnPtr(FnSig::callback(vec![]));
        let fid = self.module.add_func(
            format!("builtin.{}", &name[1..]),
            Ty::Void,
            vec![
                Param::new("x", Ty::I32),
                Param::new("y", Ty::I32),
                Param::new("true", cb_ty.clone()),
                Param::new("false", cb_ty),
            ],
            false,
        );
        let pred = if name == "@ieq" { Pred::Eq } else { Pred::Sgt };
        let f = self.module.func_mut(fid);
        let entry = f.add_block("entry");
        let iftrue = f.add_block("iftrue");
        let iffalse = f.add_block("iffalse");
        let x = f.param_value(0);
        let y = f.param_value(1);
        let cb_true = f.param_value(2);
        let cb_false = f.param_value(3);
        let cmp = f.emit_icmp(entry, pred, x, y);
        f.emit_cond_br(entry, cmp, "iftrue", "iffalse");
        f.emit_call(iftrue, cb_true, vec![]);
        f.emit_ret(iftrue, None);
        f.emit_call(iffalse, cb_false, vec![]);
        f.emit_ret(iffalse, None);
        Binding::Func(fid)
    }

    /// A `@printf` specialization: one typed parameter per format specifier,
    /// forwarding to the variadic libc `printf`.
    fn emit_printf(&mut self, id: &str, fmt: &str) -> Result<Binding> {
        let specs = parse_printf_format(fmt);
        let mut params = vec![Param::new("fmt", Ty::I8Ptr)];
        for (i, spec) in specs.iter().enumerate() {
            let ty = match spec.conversion {
                'd' | 'i' => Ty::I32,
                's' => Ty::I8Ptr,
                _ => {
                    return Err(LowerError::PrintfSpecifier {
                        spec: spec.original.clone(),
                    })
                }
            };
            params.push(Param::new(format!("p{}", i), ty));
        }

        let fid = self
            .module
            .add_func(&id[1..], Ty::Void, params.clone(), false);
        let printf = self.ensure_libc_printf();
        let printf_value = self.module.func(printf).as_value();
        let f = self.module.func_mut(fid);
        let entry = f.add_block("entry");
        let args: Vec<Value> = (0..params.len()).map(|i| f.param_value(i)).collect();
        f.emit_call(entry, printf_value, args);
        f.emit_ret(entry, None);
        Ok(Binding::Func(fid))
    }

    /// A `@prompt` specialization for a fixed limit: stack buffer of
    /// `limit + 1` bytes, a `%<limit>s` scanf, then the `ok` callback with
    /// the buffer.
    fn emit_prompt(&mut self, id: &str, limit: i64) -> Binding {
        let scanf = self.ensure_libc_scanf();
        let scanf_value = self.module.func(scanf).as_value();

        let ok_ty = Ty::FnPtr(FnSig::callback(vec![Ty::I8Ptr]));
        let fid = self.module.add_func(
            format!("builtin.{}", &id[1..]),
            Ty::Void,
            vec![Param::new("limit", Ty::I32), Param::new("ok", ok_ty)],
            false,
        );
        let len = limit as u64 + 1;
        let (fmt_global, fmt_len) = self.module.add_string_global(
            Some(format!("builtin.prompt${}.format", limit)),
            &format!("%{}s", limit),
        );
        let f = self.module.func_mut(fid);
        let entry = f.add_block("entry");
        let buf = f.emit_alloca(entry, len);
        let buf_ptr = f.emit_gep(entry, len, buf);
        f.emit_call(
            entry,
            scanf_value,
            vec![
                Value::StrPtr {
                    global: fmt_global,
                    len: fmt_len,
                },
                buf_ptr.clone(),
            ],
        );
        let ok = f.param_value(1);
        f.emit_call(entry, ok, vec![buf_ptr]);
        f.emit_ret(entry, None);
        Binding::Func(fid)
    }

    fn ensure_libc_printf(&mut self) -> FuncId {
        if let Some(Binding::Func(fid)) = self.builtins.get("@unsafe.libc.printf") {
            return *fid;
        }
        let fid = self
            .module
            .add_func("printf", Ty::I32, vec![Param::new("fmt", Ty::I8Ptr)], true);
        self.builtins
            .insert("@unsafe.libc.printf".into(), Binding::Func(fid));
        fid
    }

    fn ensure_libc_scanf(&mut self) -> FuncId {
        if let Some(Binding::Func(fid)) = self.builtins.get("@unsafe.libc.scanf") {
            return *fid;
        }
        let fid = self.module.add_func(
            "__isoc99_scanf",
            Ty::I32,
            vec![Param::new("fmt", Ty::I8Ptr)],
            true,
        );
        self.builtins
            .insert("@unsafe.libc.scanf".into(), Binding::Func(fid));
        fid
    }

    fn emit_libc_puts(&mut self) -> Binding {
        let ok_ty = Ty::FnPtr(FnSig::callback(vec![Ty::I32]));
        let fid = self.module.add_func(
            "unsafe.libc.puts",
            Ty::Void,
            vec![Param::new("str", Ty::I8Ptr), Param::new("ok", ok_ty)],
            false,
        );
        let decl = self
            .module
            .add_func("puts", Ty::I32, vec![Param::new("str", Ty::I8Ptr)], false);
        let decl_value = self.module.func(decl).as_value();
        let f = self.module.func_mut(fid);
        let entry = f.add_block("entry");
        let s = f.param_value(0);
        let ok = f.param_value(1);
        let code = f
            .emit_call(entry, decl_value, vec![s])
            .expect("puts returns i32");
        f.emit_call(entry, ok, vec![code]);
        f.emit_ret(entry, None);
        Binding::Func(fid)
    }

    fn emit_libc_atoi(&mut self) -> Binding {
        let ok_ty = Ty::FnPtr(FnSig::callback(vec![Ty::I32]));
        let fid = self.module.add_func(
            "unsafe.libc.atoi",
            Ty::Void,
            vec![Param::new("in", Ty::I8Ptr), Param::new("ok", ok_ty)],
            false,
        );
        let decl = self
            .module
            .add_func("atoi", Ty::I32, vec![Param::new("in", Ty::I8Ptr)], false);
        let decl_value = self.module.func(decl).as_value();
        let f = self.module.func_mut(fid);
        let entry = f.add_block("entry");
        let input = f.param_value(0);
        let ok = f.param_value(1);
        let res = f
            .emit_call(entry, decl_value, vec![input])
            .expect("atoi returns i32");
        f.emit_call(entry, ok, vec![res]);
        f.emit_ret(entry, None);
        Binding::Func(fid)
    }

    fn emit_libc_getchar(&mut self) -> Binding {
        let ok_ty = Ty::FnPtr(FnSig::callback(vec![Ty::I32]));
        let fid = self.module.add_func(
            "unsafe.libc.getchar",
            Ty::Void,
            vec![Param::new("ok", ok_ty)],
            false,
        );
        let decl = self.module.add_func("getchar", Ty::I32, vec![], false);
        let decl_value = self.module.func(decl).as_value();
        let f = self.module.func_mut(fid);
        let entry = f.add_block("entry");
        let ok = f.param_value(0);
        let res = f
            .emit_call(entry, decl_value, vec![])
            .expect("getchar returns i32");
        f.emit_call(entry, ok, vec![res]);
        f.emit_ret(entry, None);
        Binding::Func(fid)
    }

    fn emit_libc_fgets(&mut self) -> Binding {
        let ok_ty = Ty::FnPtr(FnSig::callback(vec![Ty::I8Ptr]));
        let fid = self.module.add_func(
            "unsafe.libc.fgets",
            Ty::Void,
            vec![
                Param::new("s", Ty::I8Ptr),
                Param::new("n", Ty::I32),
                Param::new("stream", Ty::I8Ptr),
                Param::new("ok", ok_ty),
            ],
            false,
        );
        let decl = self.module.add_func(
            "fgets",
            Ty::I8Ptr,
            vec![
                Param::new("s", Ty::I8Ptr),
                Param::new("n", Ty::I32),
                Param::new("stream", Ty::I8Ptr),
            ],
            false,
        );
        let decl_value = self.module.func(decl).as_value();
        let f = self.module.func_mut(fid);
        let entry = f.add_block("entry");
        let s = f.param_value(0);
        let n = f.param_value(1);
        let stream = f.param_value(2);
        let ok = f.param_value(3);
        let line = f
            .emit_call(entry, decl_value, vec![s, n, stream])
            .expect("fgets returns i8*");
        f.emit_call(entry, ok, vec![line]);
        f.emit_ret(entry, None);
        Binding::Func(fid)
    }
}
