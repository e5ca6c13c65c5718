// Copyright 2023 The Regents of the University of California
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@berkeley.edu>

use crate::ir::{Context, Expr, ExprRef, ForEachChild, Process, Stmt, StringRef};
use indexmap::IndexSet;

/// Collects all symbols that `root` depends on, in the order in which they are first
/// encountered (left to right).
pub fn free_symbols(ctx: &Context, root: ExprRef) -> IndexSet<StringRef> {
    let mut out = IndexSet::new();
    collect_free_symbols(ctx, root, &mut out);
    out
}

/// Adds all symbols of `root` to `out`.
pub fn collect_free_symbols(ctx: &Context, root: ExprRef, out: &mut IndexSet<StringRef>) {
    let mut todo = vec![root];
    let mut visited = IndexSet::new();

    while let Some(expr_ref) = todo.pop() {
        if !visited.insert(expr_ref) {
            continue;
        }
        let expr = ctx.get(expr_ref);
        if let Expr::Symbol(name) = expr {
            out.insert(*name);
        }
        // push in reverse to visit children left to right
        let mut children: Vec<ExprRef> = Vec::with_capacity(3);
        expr.collect_children(&mut children);
        todo.extend(children.into_iter().rev());
    }
}

/// Collects every name that `process` declares, assigns or reads, starting with its ports.
pub fn used_names(ctx: &Context, process: &Process) -> IndexSet<StringRef> {
    let mut out: IndexSet<StringRef> = process.ports.keys().copied().collect();
    let mut todo: Vec<&Stmt> = process.body.iter().rev().collect();
    while let Some(stmt) = todo.pop() {
        match stmt {
            Stmt::Register { name, .. } | Stmt::AugAssign { target: name, .. } => {
                out.insert(*name);
            }
            Stmt::Assign { targets, .. } => out.extend(targets.iter().copied()),
            Stmt::If { then, els, .. } => {
                todo.extend(els.iter().rev());
                todo.extend(then.iter().rev());
            }
            Stmt::While { body, .. } => todo.extend(body.iter().rev()),
            Stmt::Expr(_) | Stmt::Suspend | Stmt::SuspendRepeat { .. } => {}
        }
        stmt.for_each_expr(|e| collect_free_symbols(ctx, e, &mut out));
    }
    out
}
