// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! Substitutes known values along a path and folds the resulting expressions.
//!
//! All expressions produced here refer to the values of variables at the clock edge that
//! started the path. An assignment `x = e` thus records the folded `e` as the new value of `x`
//! and every later use of `x` on the same path is replaced by it.

use crate::cfg::{Path, PathNode};
use crate::ir::*;

/// Rewrites a single straight line statement under `table` and records its effect.
/// Augmented assignments are turned into simple assignments.
pub fn propagate_stmt(ctx: &mut Context, stmt: &Stmt, table: &mut SymbolTable) -> Stmt {
    match stmt {
        Stmt::Assign { targets, value } => {
            let value = substitute_and_fold(ctx, *value, table);
            for target in targets.iter() {
                table.insert(*target, value);
            }
            Stmt::Assign {
                targets: targets.clone(),
                value,
            }
        }
        Stmt::AugAssign { target, op, value } => {
            let current = ctx.symbol_ref(*target);
            let update = ctx.binary(*op, current, *value);
            let value = substitute_and_fold(ctx, update, table);
            table.insert(*target, value);
            Stmt::assign(*target, value)
        }
        Stmt::Expr(e) => Stmt::Expr(substitute_and_fold(ctx, *e, table)),
        other => {
            debug_assert!(!other.is_straight_line());
            other.clone()
        }
    }
}

/// Propagates values along the path. Running it a second time does not change the path.
///
/// Only the flag stored in `path` makes this idempotent: the rewritten statements refer to
/// values at the start of the path, so a new `Path` built from already propagated nodes
/// would substitute self-referencing updates like `x = x + 1` a second time.
pub fn propagate(ctx: &mut Context, path: &mut Path) {
    if path.propagated {
        return;
    }
    let mut table = SymbolTable::new();
    for node in path.nodes_mut() {
        match node {
            PathNode::Block(stmts) => {
                for stmt in stmts.iter_mut() {
                    *stmt = propagate_stmt(ctx, stmt, &mut table);
                }
            }
            PathNode::Branch { cond, .. } => {
                *cond = substitute_and_fold(ctx, *cond, &table);
            }
            PathNode::Head | PathNode::Suspend(_) => {}
        }
    }
    path.propagated = true;
}

/// Values that are known to be literals after executing `stmts` from an unknown state.
pub fn constant_assignments(ctx: &mut Context, stmts: &[Stmt]) -> SymbolTable {
    let mut table = SymbolTable::new();
    for stmt in stmts.iter() {
        propagate_stmt(ctx, stmt, &mut table);
    }
    table.retain(|_, value| ctx.get(*value).is_literal());
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_refer_to_the_clock_edge() {
        let mut ctx = Context::default();
        let x = ctx.string("x".into());
        let y = ctx.string("y".into());
        let x_sym = ctx.symbol_ref(x);
        let one = ctx.int(1);
        let two = ctx.int(2);
        let x_plus_one = ctx.add(x_sym, one);
        let stmts = vec![
            Stmt::assign(x, x_plus_one),
            Stmt::AugAssign {
                target: x,
                op: BinaryOp::Mul,
                value: two,
            },
            Stmt::assign(y, x_sym),
        ];
        let y_sym = ctx.symbol_ref(y);
        let cond = ctx.greater(y_sym, two);
        let mut path = Path::new(vec![
            PathNode::Head,
            PathNode::Block(stmts),
            PathNode::Branch { cond, taken: true },
            PathNode::Suspend(1),
        ]);
        propagate(&mut ctx, &mut path);
        assert_eq!(
            path.serialize_to_str(&ctx),
            "head -> [x = x + 1; x = (x + 1) * 2; y = (x + 1) * 2] -> T(((x + 1) * 2) > 2) -> suspend 1"
        );
        assert!(path.is_propagated());

        // running again must not substitute `x` a second time
        let before = path.clone();
        propagate(&mut ctx, &mut path);
        assert_eq!(path, before);

        // a path rebuilt from the rewritten nodes starts out unpropagated
        let rebuilt = Path::new(path.nodes().to_vec());
        assert!(!rebuilt.is_propagated());
        assert_eq!(rebuilt.nodes(), path.nodes());
    }

    #[test]
    fn literals_fold() {
        let mut ctx = Context::default();
        let a = ctx.string("a".into());
        let a_sym = ctx.symbol_ref(a);
        let five = ctx.int(5);
        let three = ctx.int(3);
        let cond = ctx.greater(a_sym, three);
        let mut path = Path::new(vec![
            PathNode::Suspend(2),
            PathNode::Block(vec![Stmt::assign(a, five)]),
            PathNode::Branch { cond, taken: false },
            PathNode::Suspend(1),
        ]);
        propagate(&mut ctx, &mut path);
        let tru = ctx.tru();
        assert_eq!(path.branches().collect::<Vec<_>>(), [(tru, false)]);
    }

    #[test]
    fn only_literals_are_constant() {
        let mut ctx = Context::default();
        let a = ctx.string("a".into());
        let b = ctx.string("b".into());
        let c = ctx.string("c".into());
        let input = ctx.symbol("input");
        let one = ctx.int(1);
        let b_sym = ctx.symbol_ref(b);
        let b_plus_one = ctx.add(b_sym, one);
        let stmts = vec![
            Stmt::assign(a, one),
            Stmt::assign(b, one),
            Stmt::assign(c, b_plus_one),
            // overwrites the earlier literal
            Stmt::assign(a, input),
        ];
        let table = constant_assignments(&mut ctx, &stmts);
        let two = ctx.int(2);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&b), Some(&one));
        assert_eq!(table.get(&c), Some(&two));
        assert!(!table.contains_key(&a));
    }
}
