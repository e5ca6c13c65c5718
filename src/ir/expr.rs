// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::{ExprRef, StringRef};

/// This type restricts the maximum width that a register is allowed to have.
pub type WidthInt = u32;

/// This restricts the maximum value that an integer literal can carry.
pub type LitInt = i64;

/// Number of bits required to represent all values in `0..=value`. Always at least one.
pub fn bits_required(value: u64) -> WidthInt {
    (u64::BITS - value.leading_zeros()).max(1)
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum UnaryOp {
    /// logical negation
    Not,
    /// bit-wise inversion
    Invert,
    Negate,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum BinaryOp {
    // arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // bit-wise
    And,
    Or,
    Xor,
    ShiftLeft,
    ShiftRight,
    // logic
    LogicAnd,
    LogicOr,
    // comparison
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
            BinaryOp::LogicAnd => "and",
            BinaryOp::LogicOr => "or",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
/// Represents an expression inside of a process description.
pub enum Expr {
    // nullary
    Symbol(StringRef),
    Int(LitInt),
    Bool(bool),
    // unary
    Unary(UnaryOp, ExprRef),
    // binary
    Binary(BinaryOp, ExprRef, ExprRef),
    // ternary
    Ite {
        cond: ExprRef,
        tru: ExprRef,
        fals: ExprRef,
    },
}

impl Expr {
    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Int(_) | Expr::Bool(_))
    }

    /// Truth value of a literal, integers are true iff they are non-zero.
    pub fn truth_value(&self) -> Option<bool> {
        match self {
            Expr::Bool(value) => Some(*value),
            Expr::Int(value) => Some(*value != 0),
            _ => None,
        }
    }

    pub fn num_children(&self) -> usize {
        match self {
            Expr::Symbol(_) | Expr::Int(_) | Expr::Bool(_) => 0,
            Expr::Unary(..) => 1,
            Expr::Binary(..) => 2,
            Expr::Ite { .. } => 3,
        }
    }
}

pub trait ForEachChild<T: Clone> {
    fn for_each_child(&self, visitor: impl FnMut(&T));
    fn collect_children(&self, children: &mut Vec<T>) {
        self.for_each_child(|c: &T| {
            children.push(c.clone());
        });
    }
}

impl ForEachChild<ExprRef> for Expr {
    fn for_each_child(&self, mut visitor: impl FnMut(&ExprRef)) {
        match self {
            Expr::Symbol(_) | Expr::Int(_) | Expr::Bool(_) => {} // no children
            Expr::Unary(_, e) => {
                (visitor)(e);
            }
            Expr::Binary(_, a, b) => {
                (visitor)(a);
                (visitor)(b);
            }
            Expr::Ite { cond, tru, fals } => {
                (visitor)(cond);
                (visitor)(tru);
                (visitor)(fals);
            }
        }
    }
}
