//! The IR module model and its builder surface.
//!
//! A [`Module`] owns globals and functions in creation order; printing
//! preserves that order, so anonymous globals can take their sequential
//! numeric names at creation time. Unnamed instruction results number
//! `%0, %1, ...` per function; loads produced by capture promotion carry the
//! captured name instead and do not consume a number.

use crate::ty::{FnSig, Ty};

/// Index of a function inside its module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FuncId(pub usize);

/// An ordered collection of globals, declarations, and function definitions.
#[derive(Debug, Default)]
pub struct Module {
    pub globals: Vec<Global>,
    pub funcs: Vec<Function>,
    anon_globals: u32,
}

/// A module-level global.
#[derive(Debug)]
pub struct Global {
    pub name: String,
    pub init: GlobalInit,
}

#[derive(Debug)]
pub enum GlobalInit {
    /// Immutable NUL-terminated string data
    /// (`private unnamed_addr constant [N x i8] c"..."`).
    Bytes(Vec<u8>),
    /// Zero-initialized capture slot of the given value type.
    Slot(Ty),
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a string constant; the data gets a trailing NUL. Anonymous
    /// globals receive the next sequential numeric name, as does a requested
    /// name that is already taken (the same label declared in two sibling
    /// scopes). Returns the global's name and the full array length.
    pub fn add_string_global(&mut self, name: Option<String>, text: &str) -> (String, u64) {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        let len = bytes.len() as u64;
        let name = name
            .filter(|n| self.globals.iter().all(|g| g.name != *n))
            .unwrap_or_else(|| self.next_anon_global());
        self.globals.push(Global {
            name: name.clone(),
            init: GlobalInit::Bytes(bytes),
        });
        (name, len)
    }

    /// Adds an anonymous zero-initialized capture slot and returns its name.
    pub fn add_slot_global(&mut self, ty: Ty) -> String {
        let name = self.next_anon_global();
        self.globals.push(Global {
            name: name.clone(),
            init: GlobalInit::Slot(ty),
        });
        name
    }

    fn next_anon_global(&mut self) -> String {
        let name = self.anon_globals.to_string();
        self.anon_globals += 1;
        name
    }

    /// Adds a function (a definition once blocks are added, a declaration
    /// otherwise).
    pub fn add_func(
        &mut self,
        name: impl Into<String>,
        ret: Ty,
        params: Vec<Param>,
        variadic: bool,
    ) -> FuncId {
        let id = FuncId(self.funcs.len());
        self.funcs.push(Function {
            name: name.into(),
            ret,
            params,
            variadic,
            blocks: Vec::new(),
            next_local: 0,
        });
        id
    }

    pub fn func(&self, id: FuncId) -> &Function {
        &self.funcs[id.0]
    }

    pub fn func_mut(&mut self, id: FuncId) -> &mut Function {
        &mut self.funcs[id.0]
    }
}

/// A function definition or declaration.
#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub ret: Ty,
    pub params: Vec<Param>,
    pub variadic: bool,
    /// Empty for external declarations.
    pub blocks: Vec<Block>,
    next_local: u32,
}

/// A named, typed function parameter.
#[derive(Clone, Debug)]
pub struct Param {
    pub name: String,
    pub ty: Ty,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: Ty) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "IR parameter with an empty name");
        Self { name, ty }
    }
}

/// A basic block: a label and its instructions, the last being a terminator.
#[derive(Debug)]
pub struct Block {
    pub label: String,
    pub insts: Vec<Inst>,
}

impl Function {
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The signature of this function.
    pub fn sig(&self) -> FnSig {
        FnSig {
            ret: Box::new(self.ret.clone()),
            params: self.params.iter().map(|p| p.ty.clone()).collect(),
            variadic: self.variadic,
        }
    }

    /// A value referring to this function (a function pointer).
    pub fn as_value(&self) -> Value {
        Value::Func {
            name: self.name.clone(),
            sig: self.sig(),
        }
    }

    /// The parameter as a value usable inside this function's blocks.
    pub fn param_value(&self, index: usize) -> Value {
        let p = &self.params[index];
        Value::Param {
            name: p.name.clone(),
            ty: p.ty.clone(),
        }
    }

    /// Appends an empty block and returns its index.
    pub fn add_block(&mut self, label: impl Into<String>) -> usize {
        self.blocks.push(Block {
            label: label.into(),
            insts: Vec::new(),
        });
        self.blocks.len() - 1
    }

    fn next_local(&mut self) -> u32 {
        let n = self.next_local;
        self.next_local += 1;
        n
    }

    pub fn emit_add(&mut self, block: usize, lhs: Value, rhs: Value) -> Value {
        let dst = self.next_local();
        self.blocks[block].insts.push(Inst::Add { dst, lhs, rhs });
        Value::Local {
            name: LocalName::Num(dst),
            ty: Ty::I32,
        }
    }

    pub fn emit_mul(&mut self, block: usize, lhs: Value, rhs: Value) -> Value {
        let dst = self.next_local();
        self.blocks[block].insts.push(Inst::Mul { dst, lhs, rhs });
        Value::Local {
            name: LocalName::Num(dst),
            ty: Ty::I32,
        }
    }

    pub fn emit_icmp(&mut self, block: usize, pred: Pred, lhs: Value, rhs: Value) -> Value {
        let dst = self.next_local();
        self.blocks[block]
            .insts
            .push(Inst::ICmp { dst, pred, lhs, rhs });
        Value::Local {
            name: LocalName::Num(dst),
            ty: Ty::I1,
        }
    }

    pub fn emit_alloca(&mut self, block: usize, len: u64) -> Value {
        let dst = self.next_local();
        self.blocks[block].insts.push(Inst::Alloca { dst, len });
        Value::Local {
            name: LocalName::Num(dst),
            ty: Ty::ByteArrayPtr(len),
        }
    }

    pub fn emit_gep(&mut self, block: usize, len: u64, base: Value) -> Value {
        let dst = self.next_local();
        self.blocks[block].insts.push(Inst::Gep { dst, len, base });
        Value::Local {
            name: LocalName::Num(dst),
            ty: Ty::I8Ptr,
        }
    }

    /// A named load from a capture slot; the result keeps the captured name.
    pub fn emit_load(&mut self, block: usize, ty: Ty, slot: &str, name: &str) -> Value {
        self.blocks[block].insts.push(Inst::Load {
            dst: name.to_string(),
            ty: ty.clone(),
            slot: slot.to_string(),
        });
        Value::Local {
            name: LocalName::Named(name.to_string()),
            ty,
        }
    }

    pub fn emit_store(&mut self, block: usize, value: Value, slot: &str) {
        self.blocks[block].insts.push(Inst::Store {
            value,
            slot: slot.to_string(),
        });
    }

    /// Emits a call. A non-void callee result always takes the next local
    /// number, used or not.
    pub fn emit_call(&mut self, block: usize, callee: Value, args: Vec<Value>) -> Option<Value> {
        let sig = callee
            .ty()
            .fn_sig()
            .cloned()
            .unwrap_or_else(|| panic!("call through a non-function value: {:?}", callee));
        let dst = if *sig.ret == Ty::Void {
            None
        } else {
            Some(self.next_local())
        };
        self.blocks[block].insts.push(Inst::Call { dst, callee, args });
        dst.map(|n| Value::Local {
            name: LocalName::Num(n),
            ty: (*sig.ret).clone(),
        })
    }

    pub fn emit_cond_br(&mut self, block: usize, cond: Value, then_label: &str, else_label: &str) {
        self.blocks[block].insts.push(Inst::CondBr {
            cond,
            then_label: then_label.to_string(),
            else_label: else_label.to_string(),
        });
    }

    pub fn emit_ret(&mut self, block: usize, value: Option<Value>) {
        self.blocks[block].insts.push(Inst::Ret(value));
    }
}

/// The name of an SSA value local to a function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LocalName {
    Num(u32),
    Named(String),
}

/// A value usable as an instruction operand.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// An `i32` immediate.
    Int(i64),
    /// A parameter of the enclosing function.
    Param { name: String, ty: Ty },
    /// An instruction result.
    Local { name: LocalName, ty: Ty },
    /// A module function, as a function pointer.
    Func { name: String, sig: FnSig },
    /// A `getelementptr` constant expression into a string global.
    StrPtr { global: String, len: u64 },
}

impl Value {
    pub fn ty(&self) -> Ty {
        match self {
            Value::Int(_) => Ty::I32,
            Value::Param { ty, .. } | Value::Local { ty, .. } => ty.clone(),
            Value::Func { sig, .. } => Ty::FnPtr(sig.clone()),
            Value::StrPtr { .. } => Ty::I8Ptr,
        }
    }
}

/// Comparison predicates the compiler emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pred {
    Eq,
    Sgt,
}

/// One instruction. The final instruction of a block must be `CondBr` or
/// `Ret`.
#[derive(Clone, Debug, PartialEq)]
pub enum Inst {
    Add { dst: u32, lhs: Value, rhs: Value },
    Mul { dst: u32, lhs: Value, rhs: Value },
    ICmp { dst: u32, pred: Pred, lhs: Value, rhs: Value },
    Alloca { dst: u32, len: u64 },
    Gep { dst: u32, len: u64, base: Value },
    Load { dst: String, ty: Ty, slot: String },
    Store { value: Value, slot: String },
    Call { dst: Option<u32>, callee: Value, args: Vec<Value> },
    CondBr { cond: Value, then_label: String, else_label: String },
    Ret(Option<Value>),
}
