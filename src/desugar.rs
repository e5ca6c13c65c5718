// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! Lowers `suspend(n)` into an explicit counting loop.

use crate::error::{CompileError, Result};
use crate::ir::*;
use indexmap::IndexSet;

/// Registers introduced while desugaring, in creation order.
pub type InductionVars = Vec<(StringRef, WidthInt)>;

/// Replaces every `suspend(n)` in the body of `process` with a loop that suspends `n` times:
///
/// ```text
/// i = 0
/// while i < n - 1:
///   suspend
///   i = i + 1
/// suspend
/// ```
///
/// The induction register `i` only needs to represent `0..n` which is why the last suspension
/// lives outside of the loop. Its name only avoids the names used by `process`, so the result
/// does not depend on what else has been interned in `ctx`.
pub fn desugar_suspend_repeat(
    ctx: &mut Context,
    process: &Process,
) -> Result<(Vec<Stmt>, InductionVars)> {
    let taken = used_names(ctx, process);
    let mut desugarer = Desugarer {
        ctx,
        taken,
        count: 0,
        induction_vars: Vec::new(),
    };
    let body = desugarer.stmts(process.body.clone())?;
    Ok((body, desugarer.induction_vars))
}

struct Desugarer<'a> {
    ctx: &'a mut Context,
    /// names of the process and all induction registers created so far
    taken: IndexSet<StringRef>,
    /// number of candidate names tried so far
    count: usize,
    induction_vars: InductionVars,
}

impl<'a> Desugarer<'a> {
    fn stmts(&mut self, stmts: Vec<Stmt>) -> Result<Vec<Stmt>> {
        let mut out = Vec::with_capacity(stmts.len());
        for stmt in stmts.into_iter() {
            match stmt {
                Stmt::SuspendRepeat { count } => self.suspend_repeat(count, &mut out)?,
                Stmt::If { cond, then, els } => out.push(Stmt::If {
                    cond,
                    then: self.stmts(then)?,
                    els: self.stmts(els)?,
                }),
                Stmt::While { cond, body } => out.push(Stmt::While {
                    cond,
                    body: self.stmts(body)?,
                }),
                other => out.push(other),
            }
        }
        Ok(out)
    }

    fn suspend_repeat(&mut self, count: ExprRef, out: &mut Vec<Stmt>) -> Result<()> {
        let n = match self.ctx.get(count) {
            Expr::Int(n) if *n >= 0 => *n,
            _ => {
                return Err(CompileError::Unsupported(format!(
                    "the number of suspensions needs to be a non-negative integer literal, not `{}`",
                    count.serialize_to_str(self.ctx)
                )))
            }
        };
        match n {
            0 => {}
            1 => out.push(Stmt::Suspend),
            _ => {
                let last = n - 1;
                let width = bits_required(last as u64);
                let name = self.fresh_name(width);
                let var = self.ctx.symbol_ref(name);
                let zero = self.ctx.int(0);
                let one = self.ctx.int(1);
                let bound = self.ctx.int(last);
                let cond = self.ctx.less(var, bound);
                let increment = self.ctx.add(var, one);
                out.push(Stmt::assign(name, zero));
                out.push(Stmt::While {
                    cond,
                    body: vec![Stmt::Suspend, Stmt::assign(name, increment)],
                });
                out.push(Stmt::Suspend);
            }
        }
        Ok(())
    }

    fn fresh_name(&mut self, width: WidthInt) -> StringRef {
        let name = loop {
            let candidate = self.ctx.string(format!("__repeat{}", self.count).into());
            self.count += 1;
            if self.taken.insert(candidate) {
                break candidate;
            }
        };
        self.induction_vars.push((name, width));
        name
    }
}
