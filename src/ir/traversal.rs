// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::{Context, Expr, ExprRef, ForEachChild};
use smallvec::SmallVec;

/// Visits expression nodes bottom up while propagating values
pub fn bottom_up<R>(
    ctx: &Context,
    expr: ExprRef,
    mut f: impl FnMut(&Context, &Expr, &[R]) -> R,
) -> R {
    let mut todo: SmallVec<[(ExprRef, bool); 8]> = smallvec::smallvec![(expr, false)];
    let mut stack = Vec::with_capacity(4);

    while let Some((e, bottom_up)) = todo.pop() {
        let expr = ctx.get(e);

        // Check if there are children that we need to compute first.
        if !bottom_up && push_children(&mut todo, e, expr) {
            continue;
        }

        // Otherwise, all arguments are available on the stack for us to use.
        let num_children = expr.num_children();
        let values = &stack[stack.len() - num_children..];
        let result = f(ctx, expr, values);
        stack.truncate(stack.len() - num_children);
        stack.push(result);
    }

    debug_assert_eq!(stack.len(), 1);
    stack.pop().unwrap()
}

/// Same as [`bottom_up`], but allows the visitor to create new expressions.
pub fn bottom_up_mut<R>(
    ctx: &mut Context,
    expr: ExprRef,
    mut f: impl FnMut(&mut Context, ExprRef, &Expr, &[R]) -> R,
) -> R {
    let mut todo: SmallVec<[(ExprRef, bool); 8]> = smallvec::smallvec![(expr, false)];
    let mut stack = Vec::with_capacity(4);

    while let Some((e, bottom_up)) = todo.pop() {
        let expr = ctx.get(e).clone();

        if !bottom_up && push_children(&mut todo, e, &expr) {
            continue;
        }

        let num_children = expr.num_children();
        let values = &stack[stack.len() - num_children..];
        let result = f(ctx, e, &expr, values);
        stack.truncate(stack.len() - num_children);
        stack.push(result);
    }

    debug_assert_eq!(stack.len(), 1);
    stack.pop().unwrap()
}

/// Schedules `e` to be revisited after all of its children. Returns false for leaf nodes.
#[inline]
fn push_children(todo: &mut SmallVec<[(ExprRef, bool); 8]>, e: ExprRef, expr: &Expr) -> bool {
    // children are pushed in reverse so that they get evaluated left to right
    let mut children: SmallVec<[ExprRef; 3]> = SmallVec::new();
    expr.for_each_child(|c| children.push(*c));
    if children.is_empty() {
        return false;
    }
    todo.push((e, true));
    for c in children.into_iter().rev() {
        todo.push((c, false));
    }
    true
}
