// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::{traversal, BinaryOp, Context, Expr, ExprRef, LitInt, StringRef, UnaryOp};
use indexmap::IndexMap;

/// A concrete value that an expression can evaluate to.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Value {
    Int(LitInt),
    Bool(bool),
}

impl Value {
    /// integers are interpreted as true iff they are non-zero
    pub fn is_true(self) -> bool {
        match self {
            Value::Int(value) => value != 0,
            Value::Bool(value) => value,
        }
    }

    /// booleans are treated as 0 / 1 in arithmetic
    pub fn to_int(self) -> LitInt {
        match self {
            Value::Int(value) => value,
            Value::Bool(value) => value as LitInt,
        }
    }

    pub fn to_expr(self, ctx: &mut Context) -> ExprRef {
        match self {
            Value::Int(value) => ctx.int(value),
            Value::Bool(value) => ctx.bool(value),
        }
    }

    pub fn from_expr(expr: &Expr) -> Option<Self> {
        match expr {
            Expr::Int(value) => Some(Value::Int(*value)),
            Expr::Bool(value) => Some(Value::Bool(*value)),
            _ => None,
        }
    }
}

/// Returns a value for a symbol if it is available.
pub trait GetSymbolValue {
    fn get_value(&self, name: StringRef) -> Option<Value>;
}

impl GetSymbolValue for IndexMap<StringRef, Value> {
    fn get_value(&self, name: StringRef) -> Option<Value> {
        self.get(&name).copied()
    }
}

impl GetSymbolValue for [(StringRef, Value)] {
    fn get_value(&self, name: StringRef) -> Option<Value> {
        self.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }
}

/// Symbols are never bound.
impl GetSymbolValue for () {
    fn get_value(&self, _name: StringRef) -> Option<Value> {
        None
    }
}

/// Evaluates an expression. Returns `None` if a symbol has no value or if an operation is
/// undefined (division by zero, overflow, out of range shift).
pub fn eval(
    ctx: &Context,
    symbols: &(impl GetSymbolValue + ?Sized),
    expr: ExprRef,
) -> Option<Value> {
    traversal::bottom_up(ctx, expr, |_ctx, expr, children: &[Option<Value>]| match expr {
        Expr::Symbol(name) => symbols.get_value(*name),
        Expr::Int(value) => Some(Value::Int(*value)),
        Expr::Bool(value) => Some(Value::Bool(*value)),
        Expr::Unary(op, _) => eval_unary(*op, children[0]?),
        Expr::Binary(op, _, _) => eval_binary(*op, children[0]?, children[1]?),
        Expr::Ite { .. } => {
            if children[0]?.is_true() {
                children[1]
            } else {
                children[2]
            }
        }
    })
}

pub fn eval_unary(op: UnaryOp, e: Value) -> Option<Value> {
    match (op, e) {
        (UnaryOp::Not, e) => Some(Value::Bool(!e.is_true())),
        (UnaryOp::Invert, Value::Bool(b)) => Some(Value::Bool(!b)),
        (UnaryOp::Invert, Value::Int(i)) => Some(Value::Int(!i)),
        (UnaryOp::Negate, e) => e.to_int().checked_neg().map(Value::Int),
    }
}

pub fn eval_binary(op: BinaryOp, a: Value, b: Value) -> Option<Value> {
    // bit-wise operations on two booleans stay boolean
    if let (Value::Bool(a), Value::Bool(b)) = (a, b) {
        match op {
            BinaryOp::And => return Some(Value::Bool(a & b)),
            BinaryOp::Or => return Some(Value::Bool(a | b)),
            BinaryOp::Xor => return Some(Value::Bool(a ^ b)),
            _ => {}
        }
    }
    let (x, y) = (a.to_int(), b.to_int());
    let res = match op {
        BinaryOp::Add => Value::Int(x.checked_add(y)?),
        BinaryOp::Sub => Value::Int(x.checked_sub(y)?),
        BinaryOp::Mul => Value::Int(x.checked_mul(y)?),
        BinaryOp::Div => Value::Int(x.checked_div_euclid(y)?),
        BinaryOp::Mod => Value::Int(x.checked_rem_euclid(y)?),
        BinaryOp::And => Value::Int(x & y),
        BinaryOp::Or => Value::Int(x | y),
        BinaryOp::Xor => Value::Int(x ^ y),
        BinaryOp::ShiftLeft => Value::Int(x.checked_shl(shift_amount(y)?)?),
        BinaryOp::ShiftRight => Value::Int(x.checked_shr(shift_amount(y)?)?),
        BinaryOp::LogicAnd => Value::Bool(a.is_true() && b.is_true()),
        BinaryOp::LogicOr => Value::Bool(a.is_true() || b.is_true()),
        BinaryOp::Equal => Value::Bool(x == y),
        BinaryOp::NotEqual => Value::Bool(x != y),
        BinaryOp::Less => Value::Bool(x < y),
        BinaryOp::LessEqual => Value::Bool(x <= y),
        BinaryOp::Greater => Value::Bool(x > y),
        BinaryOp::GreaterEqual => Value::Bool(x >= y),
    };
    Some(res)
}

#[inline]
fn shift_amount(by: LitInt) -> Option<u32> {
    u32::try_from(by).ok()
}
