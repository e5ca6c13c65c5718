// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::expr::*;
use std::fmt::{Debug, Formatter};
use std::num::NonZeroU32;

#[derive(PartialEq, Eq, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct StringRef(NonZeroU32);

impl Debug for StringRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "StringRef({})", self.index())
    }
}

impl StringRef {
    fn from_index(index: usize) -> Self {
        Self(NonZeroU32::new((index + 1) as u32).unwrap())
    }

    fn index(&self) -> usize {
        (self.0.get() - 1) as usize
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct ExprRef(NonZeroU32);

impl Debug for ExprRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // we need a custom implementation in order to show the zero based index
        write!(f, "ExprRef({})", self.index())
    }
}

impl ExprRef {
    pub(crate) fn from_index(index: usize) -> Self {
        ExprRef(NonZeroU32::new((index + 1) as u32).unwrap())
    }

    pub(crate) fn index(&self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Context which is used to create all names and expressions of a process. Expressions are
/// interned such that reference equivalence implies structural equivalence.
#[derive(Clone, Default)]
pub struct Context {
    strings: indexmap::IndexSet<String>,
    exprs: indexmap::IndexSet<Expr>,
}

/// Adding and removing nodes.
impl Context {
    pub fn get(&self, reference: ExprRef) -> &Expr {
        self.exprs
            .get_index(reference.index())
            .expect("Invalid ExprRef!")
    }

    pub(crate) fn add_expr(&mut self, value: Expr) -> ExprRef {
        let (index, _) = self.exprs.insert_full(value);
        ExprRef::from_index(index)
    }

    pub fn get_str(&self, reference: StringRef) -> &str {
        self.strings
            .get_index(reference.index())
            .expect("Invalid StringRef!")
    }

    pub fn string(&mut self, value: std::borrow::Cow<str>) -> StringRef {
        if let Some(index) = self.strings.get_index_of(value.as_ref()) {
            StringRef::from_index(index)
        } else {
            let (index, _) = self.strings.insert_full(value.into_owned());
            StringRef::from_index(index)
        }
    }

    /// Looks up a name without interning it.
    pub fn lookup_str(&self, value: &str) -> Option<StringRef> {
        self.strings.get_index_of(value).map(StringRef::from_index)
    }
}

/// Convenience methods to construct IR nodes.
impl Context {
    pub fn symbol(&mut self, name: &str) -> ExprRef {
        let name_ref = self.string(name.into());
        self.add_expr(Expr::Symbol(name_ref))
    }
    pub fn symbol_ref(&mut self, name: StringRef) -> ExprRef {
        self.add_expr(Expr::Symbol(name))
    }
    pub fn int(&mut self, value: LitInt) -> ExprRef {
        self.add_expr(Expr::Int(value))
    }
    pub fn bool(&mut self, value: bool) -> ExprRef {
        self.add_expr(Expr::Bool(value))
    }
    pub fn tru(&mut self) -> ExprRef {
        self.bool(true)
    }
    pub fn fals(&mut self) -> ExprRef {
        self.bool(false)
    }
    pub fn unary(&mut self, op: UnaryOp, e: ExprRef) -> ExprRef {
        self.add_expr(Expr::Unary(op, e))
    }
    pub fn binary(&mut self, op: BinaryOp, a: ExprRef, b: ExprRef) -> ExprRef {
        self.add_expr(Expr::Binary(op, a, b))
    }
    pub fn not(&mut self, e: ExprRef) -> ExprRef {
        self.unary(UnaryOp::Not, e)
    }
    pub fn invert(&mut self, e: ExprRef) -> ExprRef {
        self.unary(UnaryOp::Invert, e)
    }
    pub fn add(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(BinaryOp::Add, a, b)
    }
    pub fn sub(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(BinaryOp::Sub, a, b)
    }
    pub fn mul(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(BinaryOp::Mul, a, b)
    }
    pub fn and(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(BinaryOp::LogicAnd, a, b)
    }
    pub fn or(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(BinaryOp::LogicOr, a, b)
    }
    pub fn equal(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(BinaryOp::Equal, a, b)
    }
    pub fn less(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(BinaryOp::Less, a, b)
    }
    pub fn greater(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(BinaryOp::Greater, a, b)
    }
    pub fn ite(&mut self, cond: ExprRef, tru: ExprRef, fals: ExprRef) -> ExprRef {
        self.add_expr(Expr::Ite { cond, tru, fals })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ir_type_size() {
        assert_eq!(std::mem::size_of::<StringRef>(), 4);
        assert_eq!(std::mem::size_of::<ExprRef>(), 4);
    }

    #[test]
    fn reference_ids() {
        let mut ctx = Context::default();
        let str_id0 = ctx.string("a".into());
        let id0 = ctx.add_expr(Expr::Symbol(str_id0));
        assert_eq!(id0.0.get(), 1, "ids start at one");
        let id0_b = ctx.add_expr(Expr::Symbol(str_id0));
        assert_eq!(id0.0, id0_b.0, "ids should be interned!");
        let id1 = ctx.int(1);
        assert_eq!(id0.0.get() + 1, id1.0.get(), "ids should increment!");
    }

    #[test]
    fn lookup_strings() {
        let mut ctx = Context::default();
        let a = ctx.string("a".into());
        assert_eq!(ctx.string("a".into()), a);
        assert_eq!(ctx.lookup_str("a"), Some(a));
        assert_eq!(ctx.lookup_str("b"), None);
    }

    #[test]
    fn many_strings() {
        let mut ctx = Context::default();
        let names: Vec<_> = (0..70_000)
            .map(|i| ctx.string(format!("n{i}").into()))
            .collect();
        assert_eq!(ctx.get_str(names[69_999]), "n69999");
        assert_ne!(names[0], names[65_536]);
    }
}
