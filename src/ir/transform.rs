// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::eval::{eval_binary, eval_unary, Value};
use crate::ir::{traversal, BinaryOp, Context, Expr, ExprRef, StringRef, UnaryOp};
use indexmap::IndexMap;

/// Maps a variable to the last known expression assigned to it.
pub type SymbolTable = IndexMap<StringRef, ExprRef>;

/// Replaces every symbol that has an entry in `table` with that entry. Replacements are not
/// substituted again.
pub fn substitute(ctx: &mut Context, expr: ExprRef, table: &SymbolTable) -> ExprRef {
    if table.is_empty() {
        return expr;
    }
    traversal::bottom_up_mut(ctx, expr, |ctx, e, expr, children: &[ExprRef]| match expr {
        Expr::Symbol(name) => table.get(name).copied().unwrap_or(e),
        other => update_children(ctx, e, other, children),
    })
}

/// Evaluates every sub-expression whose operands are all literals and applies a couple of
/// boolean identities.
pub fn fold(ctx: &mut Context, expr: ExprRef) -> ExprRef {
    traversal::bottom_up_mut(ctx, expr, |ctx, e, expr, children: &[ExprRef]| {
        let e = update_children(ctx, e, expr, children);
        let expr = ctx.get(e).clone();
        fold_node(ctx, &expr).unwrap_or(e)
    })
}

/// Substitutes and then folds.
pub fn substitute_and_fold(ctx: &mut Context, expr: ExprRef, table: &SymbolTable) -> ExprRef {
    let substituted = substitute(ctx, expr, table);
    fold(ctx, substituted)
}

/// Re-creates `expr` if any of its children changed.
fn update_children(ctx: &mut Context, e: ExprRef, expr: &Expr, children: &[ExprRef]) -> ExprRef {
    let updated = match *expr {
        Expr::Symbol(_) | Expr::Int(_) | Expr::Bool(_) => return e,
        Expr::Unary(op, old) => {
            if old == children[0] {
                return e;
            }
            Expr::Unary(op, children[0])
        }
        Expr::Binary(op, a, b) => {
            if a == children[0] && b == children[1] {
                return e;
            }
            Expr::Binary(op, children[0], children[1])
        }
        Expr::Ite { cond, tru, fals } => {
            if cond == children[0] && tru == children[1] && fals == children[2] {
                return e;
            }
            Expr::Ite {
                cond: children[0],
                tru: children[1],
                fals: children[2],
            }
        }
    };
    ctx.add_expr(updated)
}

/// Tries to simplify a single node whose children have already been folded.
fn fold_node(ctx: &mut Context, expr: &Expr) -> Option<ExprRef> {
    match *expr {
        Expr::Unary(op, e) => {
            if let Some(value) = Value::from_expr(ctx.get(e)) {
                return eval_unary(op, value).map(|v| v.to_expr(ctx));
            }
            // not(not(a)) -> a
            match (op, ctx.get(e)) {
                (UnaryOp::Not, Expr::Unary(UnaryOp::Not, inner)) => Some(*inner),
                _ => None,
            }
        }
        Expr::Binary(op, a, b) => {
            let (va, vb) = (Value::from_expr(ctx.get(a)), Value::from_expr(ctx.get(b)));
            if let (Some(va), Some(vb)) = (va, vb) {
                return eval_binary(op, va, vb).map(|v| v.to_expr(ctx));
            }
            fold_logic(ctx, op, a, va, b, vb)
        }
        Expr::Ite { cond, tru, fals } => {
            if tru == fals {
                return Some(tru);
            }
            let value = Value::from_expr(ctx.get(cond))?;
            Some(if value.is_true() { tru } else { fals })
        }
        Expr::Symbol(_) | Expr::Int(_) | Expr::Bool(_) => None,
    }
}

/// Short circuits `and` and `or` when one of the operands is known.
fn fold_logic(
    ctx: &mut Context,
    op: BinaryOp,
    a: ExprRef,
    va: Option<Value>,
    b: ExprRef,
    vb: Option<Value>,
) -> Option<ExprRef> {
    let (known, other) = match (va, vb) {
        (Some(v), None) => (v.is_true(), b),
        (None, Some(v)) => (v.is_true(), a),
        _ => return None,
    };
    match (op, known) {
        (BinaryOp::LogicAnd, true) | (BinaryOp::LogicOr, false) => Some(other),
        (BinaryOp::LogicAnd, false) => Some(ctx.fals()),
        (BinaryOp::LogicOr, true) => Some(ctx.tru()),
        _ => None,
    }
}
