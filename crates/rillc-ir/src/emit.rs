//! Textual emission of the IR.
//!
//! `Display` on [`Module`] produces the dialect a downstream assembler
//! accepts: globals first in creation order, then declarations and function
//! definitions, entities separated by blank lines, instructions indented with
//! a tab.

use std::fmt::{self, Write};

use crate::module::{Block, Function, Global, GlobalInit, Inst, LocalName, Module, Pred, Value};
use crate::ty::Ty;

/// Quotes an identifier when it falls outside the bare-name alphabet
/// (`[-a-zA-Z$._][-a-zA-Z$._0-9]*`).
fn mangle(name: &str) -> String {
    let bare_start =
        |c: char| c.is_ascii_alphabetic() || matches!(c, '-' | '$' | '.' | '_');
    let bare = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '$' | '.' | '_');
    let mut chars = name.chars();
    let ok = match chars.next() {
        Some(first) => bare_start(first) && chars.all(bare),
        None => false,
    };
    if ok {
        name.to_string()
    } else {
        format!("\"{}\"", name)
    }
}

fn global_ref(name: &str) -> String {
    format!("@{}", mangle(name))
}

fn local_ref(name: &LocalName) -> String {
    match name {
        LocalName::Num(n) => format!("%{}", n),
        LocalName::Named(s) => format!("%{}", mangle(s)),
    }
}

/// The value as an operand, without its type.
fn operand(value: &Value) -> String {
    match value {
        Value::Int(n) => n.to_string(),
        Value::Param { name, .. } => format!("%{}", mangle(name)),
        Value::Local { name, .. } => local_ref(name),
        Value::Func { name, .. } => global_ref(name),
        Value::StrPtr { global, len } => format!(
            "getelementptr ([{len} x i8], [{len} x i8]* {}, i32 0, i32 0)",
            global_ref(global),
            len = len
        ),
    }
}

/// The value as a call argument or store operand: `<type> <operand>`.
fn typed_operand(value: &Value) -> String {
    format!("{} {}", value.ty(), operand(value))
}

/// Escapes string data for a `c"..."` constant: printable ASCII except the
/// quote and backslash stays literal, everything else becomes `\XX`.
fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::new();
    for &b in bytes {
        if (0x20..=0x7e).contains(&b) && b != b'"' && b != b'\\' {
            out.push(b as char);
        } else {
            write!(out, "\\{:02X}", b).expect("writing to a String cannot fail");
        }
    }
    out
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chunks: Vec<String> = Vec::new();
        if !self.globals.is_empty() {
            let lines: Vec<String> = self.globals.iter().map(Global::render).collect();
            chunks.push(lines.join("\n"));
        }
        for func in &self.funcs {
            chunks.push(func.render());
        }
        writeln!(f, "{}", chunks.join("\n\n"))
    }
}

impl Global {
    fn render(&self) -> String {
        match &self.init {
            GlobalInit::Bytes(bytes) => format!(
                "{} = private unnamed_addr constant [{} x i8] c\"{}\"",
                global_ref(&self.name),
                bytes.len(),
                escape_bytes(bytes)
            ),
            GlobalInit::Slot(ty) => {
                let init = if ty.is_pointer() {
                    "ptr null".to_string()
                } else {
                    match ty {
                        Ty::Float => "float 0.000000e+00".to_string(),
                        other => format!("{} 0", other),
                    }
                };
                format!("{} = global {}", global_ref(&self.name), init)
            }
        }
    }
}

impl Function {
    fn render(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{} %{}", p.ty, mangle(&p.name)))
            .collect();
        let mut params = params.join(", ");
        if self.variadic {
            if !params.is_empty() {
                params.push_str(", ");
            }
            params.push_str("...");
        }
        let head = format!("{} {}({})", self.ret, global_ref(&self.name), params);

        if self.is_declaration() {
            return format!("declare {}", head);
        }
        let blocks: Vec<String> = self.blocks.iter().map(Block::render).collect();
        format!("define {} {{\n{}\n}}", head, blocks.join("\n\n"))
    }
}

impl Block {
    fn render(&self) -> String {
        let mut out = format!("{}:", self.label);
        for inst in &self.insts {
            out.push_str("\n\t");
            out.push_str(&inst.render());
        }
        out
    }
}

impl Inst {
    fn render(&self) -> String {
        match self {
            Inst::Add { dst, lhs, rhs } => {
                format!("%{} = add i32 {}, {}", dst, operand(lhs), operand(rhs))
            }
            Inst::Mul { dst, lhs, rhs } => {
                format!("%{} = mul i32 {}, {}", dst, operand(lhs), operand(rhs))
            }
            Inst::ICmp { dst, pred, lhs, rhs } => {
                let pred = match pred {
                    Pred::Eq => "eq",
                    Pred::Sgt => "sgt",
                };
                format!(
                    "%{} = icmp {} i32 {}, {}",
                    dst,
                    pred,
                    operand(lhs),
                    operand(rhs)
                )
            }
            Inst::Alloca { dst, len } => format!("%{} = alloca [{} x i8]", dst, len),
            Inst::Gep { dst, len, base } => format!(
                "%{dst} = getelementptr [{len} x i8], {base}, i32 0, i32 0",
                dst = dst,
                len = len,
                base = typed_operand(base)
            ),
            Inst::Load { dst, ty, slot } => {
                format!("%{} = load {}, ptr {}", mangle(dst), ty, global_ref(slot))
            }
            Inst::Store { value, slot } => {
                format!("store {}, ptr {}", typed_operand(value), global_ref(slot))
            }
            Inst::Call { dst, callee, args } => {
                let sig = callee
                    .ty()
                    .fn_sig()
                    .cloned()
                    .expect("call instruction with a non-function callee");
                let prefix = match dst {
                    Some(n) => format!("%{} = ", n),
                    None => String::new(),
                };
                // Variadic callees spell the whole function type.
                let callee_ty = if sig.variadic {
                    format!("{}", sig)
                } else {
                    format!("{}", sig.ret)
                };
                let args: Vec<String> = args.iter().map(typed_operand).collect();
                format!(
                    "{}call {} {}({})",
                    prefix,
                    callee_ty,
                    operand(callee),
                    args.join(", ")
                )
            }
            Inst::CondBr {
                cond,
                then_label,
                else_label,
            } => format!(
                "br i1 {}, label %{}, label %{}",
                operand(cond),
                then_label,
                else_label
            ),
            Inst::Ret(None) => "ret void".to_string(),
            Inst::Ret(Some(value)) => format!("ret {}", typed_operand(value)),
        }
    }
}
