// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! Synthesized state machines. Every path between two suspension points becomes one state.

mod dot;

pub use dot::paths_to_dot;

use crate::cfg::{Path, SuspendId};
use crate::dataflow::propagate;
use crate::ir::*;
use indexmap::IndexMap;
use std::io::Write;

/// One transition of the state machine. It fires when the state variable matches `from` and
/// all guards hold.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct State {
    /// suspension id that the state is active in, `0` for the reset state
    pub from: SuspendId,
    /// `state_var == from`
    pub activation: ExprRef,
    /// must all be true, in the order in which they were encountered
    pub guards: Vec<ExprRef>,
    pub effects: Vec<Stmt>,
    /// suspension id to move to
    pub next: SuspendId,
    /// `state_var = next`
    pub transition: Stmt,
}

impl State {
    /// Conjunction of the activation predicate and all guards.
    pub fn condition(&self, ctx: &mut Context) -> ExprRef {
        self.guards
            .iter()
            .fold(self.activation, |acc, guard| ctx.and(acc, *guard))
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct StateMachine {
    pub name: String,
    /// holds the id of the suspension point that the process is waiting in
    pub state_var: StringRef,
    pub states: Vec<State>,
    /// every variable that needs to keep its value from one cycle to the next
    pub state_vars: IndexMap<StringRef, WidthInt>,
    pub suspend_count: SuspendId,
}

impl StateMachine {
    pub fn states_from(&self, id: SuspendId) -> impl Iterator<Item = &State> + '_ {
        self.states.iter().filter(move |s| s.from == id)
    }
}

/// Builds one state per path. Paths that have not been propagated yet are propagated first.
/// `registers` lists the declared registers, `induction_vars` the registers created by the
/// desugaring pass.
pub fn synthesize(
    ctx: &mut Context,
    process: &Process,
    registers: &[(StringRef, WidthInt)],
    induction_vars: &[(StringRef, WidthInt)],
    suspend_count: SuspendId,
    state_var: StringRef,
    paths: &mut [Path],
) -> StateMachine {
    let state_var_sym = ctx.symbol_ref(state_var);
    let mut states = Vec::with_capacity(paths.len());
    for path in paths.iter_mut() {
        propagate(ctx, path);
        let from = ctx.int(path.start_id() as LitInt);
        let activation = ctx.equal(state_var_sym, from);
        let guards = path
            .branches()
            .map(|(cond, taken)| {
                if taken {
                    cond
                } else {
                    let negated = ctx.not(cond);
                    fold(ctx, negated)
                }
            })
            .collect::<Vec<_>>();
        let effects = path.stmts().cloned().collect::<Vec<_>>();
        let next = ctx.int(path.end_id() as LitInt);
        states.push(State {
            from: path.start_id(),
            activation,
            guards,
            effects,
            next: path.end_id(),
            transition: Stmt::assign(state_var, next),
        });
    }

    let mut state_vars = IndexMap::new();
    state_vars.insert(state_var, bits_required(suspend_count as u64));
    for (name, width) in registers.iter().chain(induction_vars.iter()) {
        state_vars.entry(*name).or_insert(*width);
    }
    let literal_widths = assigned_literal_widths(ctx, &states);
    for state in states.iter() {
        for guard in state.guards.iter() {
            for name in free_symbols(ctx, *guard) {
                if process.is_port(name) || state_vars.contains_key(&name) {
                    continue;
                }
                let width = literal_widths.get(&name).copied().unwrap_or(1);
                log::trace!("promoting `{}` to a register", ctx.get_str(name));
                state_vars.insert(name, width);
            }
        }
    }

    log::debug!(
        "synthesized {} states with {} state variables",
        states.len(),
        state_vars.len()
    );
    StateMachine {
        name: process.name.clone(),
        state_var,
        states,
        state_vars,
        suspend_count,
    }
}

/// Number of bits needed for the largest non-negative integer literal assigned to a variable.
fn assigned_literal_widths(ctx: &Context, states: &[State]) -> IndexMap<StringRef, WidthInt> {
    let mut out: IndexMap<StringRef, WidthInt> = IndexMap::new();
    for stmt in states.iter().flat_map(|s| s.effects.iter()) {
        let Some((target, value)) = stmt.simple_assign() else {
            continue;
        };
        if let Expr::Int(value) = ctx.get(value) {
            if let Ok(value) = u64::try_from(*value) {
                let width = bits_required(value);
                let entry = out.entry(target).or_insert(width);
                *entry = (*entry).max(width);
            }
        }
    }
    out
}

impl SerializableIrNode for State {
    fn serialize<W: Write>(&self, ctx: &Context, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "state {} -> {}:", self.from, self.next)?;
        write!(writer, "  when ")?;
        self.activation.serialize(ctx, writer)?;
        for guard in self.guards.iter() {
            write!(writer, "\n  guard ")?;
            guard.serialize(ctx, writer)?;
        }
        for stmt in self.effects.iter().chain(std::iter::once(&self.transition)) {
            write!(writer, "\n  ")?;
            stmt.serialize(ctx, writer)?;
        }
        Ok(())
    }
}

impl SerializableIrNode for StateMachine {
    fn serialize<W: Write>(&self, ctx: &Context, writer: &mut W) -> std::io::Result<()> {
        write!(writer, "fsm {}", self.name)?;
        for (name, width) in self.state_vars.iter() {
            write!(writer, "\nreg {}: bv<{width}>", ctx.get_str(*name))?;
        }
        for state in self.states.iter() {
            writeln!(writer)?;
            state.serialize(ctx, writer)?;
        }
        Ok(())
    }
}
