// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::{init_values, InitKind, SimError, Simulator};
use crate::cfg::SuspendId;
use crate::fsm::{State, StateMachine};
use crate::ir::*;
use indexmap::IndexMap;

/// Executes a synthesized state machine. All effects of a state read the values from before
/// the clock edge.
pub struct FsmInterpreter<'a> {
    ctx: &'a Context,
    fsm: &'a StateMachine,
    values: IndexMap<StringRef, Value>,
    step_count: u64,
}

impl<'a> FsmInterpreter<'a> {
    pub fn new(ctx: &'a Context, fsm: &'a StateMachine) -> Self {
        Self {
            ctx,
            fsm,
            values: IndexMap::new(),
            step_count: 0,
        }
    }

    fn eval(&self, expr: ExprRef) -> Result<Value, SimError> {
        eval(self.ctx, &self.values, expr)
            .ok_or_else(|| SimError::Eval(expr.serialize_to_str(self.ctx)))
    }

    fn is_enabled(&self, state: &State) -> Result<bool, SimError> {
        if !self.eval(state.activation)?.is_true() {
            return Ok(false);
        }
        for guard in state.guards.iter() {
            if !self.eval(*guard)?.is_true() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn current(&self) -> SuspendId {
        self.values
            .get(&self.fsm.state_var)
            .map(|v| v.to_int() as SuspendId)
            .unwrap_or(0)
    }
}

impl<'a> Simulator for FsmInterpreter<'a> {
    fn init(&mut self, kind: InitKind) {
        self.values = init_values(self.fsm.state_vars.iter(), kind)
            .into_iter()
            .collect();
        // the process always starts from the top
        self.values.insert(self.fsm.state_var, Value::Int(0));
        self.step_count = 0;
    }

    fn step(&mut self) -> Result<SuspendId, SimError> {
        let fsm = self.fsm;
        let mut enabled = Vec::with_capacity(1);
        for state in fsm.states.iter() {
            if self.is_enabled(state)? {
                enabled.push(state);
            }
        }
        let state = match enabled.as_slice() {
            [state] => *state,
            [] => return Err(SimError::Stuck(self.current())),
            more => return Err(SimError::NotDeterministic(more.len(), self.current())),
        };

        let mut updates = Vec::with_capacity(state.effects.len() + 1);
        for stmt in state.effects.iter().chain(std::iter::once(&state.transition)) {
            // propagated effects only contain simple assignments and expressions
            if let Stmt::Assign { targets, value } = stmt {
                let value = self.eval(*value)?;
                updates.extend(targets.iter().map(|t| (*t, value)));
            }
        }
        // later assignments overwrite earlier ones
        for (name, value) in updates {
            self.values.insert(name, value);
        }
        self.step_count += 1;
        Ok(state.next)
    }

    fn set(&mut self, name: StringRef, value: Value) {
        self.values.insert(name, value);
    }

    fn get(&self, name: StringRef) -> Option<Value> {
        self.values.get(&name).copied()
    }

    fn step_count(&self) -> u64 {
        self.step_count
    }
}
