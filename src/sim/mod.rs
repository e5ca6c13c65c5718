// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! Cycle based interpreters for control flow graphs and synthesized state machines.

mod cfg_interpreter;
mod fsm_interpreter;

pub use cfg_interpreter::CfgInterpreter;
pub use fsm_interpreter::FsmInterpreter;

use crate::cfg::SuspendId;
use crate::ir::{LitInt, StringRef, Value, WidthInt};
use rand::{Rng, SeedableRng};

/// Specifies how to initialize registers.
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum InitKind {
    Zero,
    /// random values derived from the seed
    Random(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    #[error("cannot evaluate `{0}`, is a variable undefined?")]
    Eval(String),
    #[error("no suspension point reached after visiting {0} nodes")]
    NoSuspension(usize),
    #[error("control reached the end of the process")]
    EndOfProcess,
    #[error("{0} states are enabled in state {1}")]
    NotDeterministic(usize, SuspendId),
    #[error("no state is enabled in state {0}")]
    Stuck(SuspendId),
}

pub trait Simulator {
    /// Load the initial register values and return to the start of the process.
    fn init(&mut self, kind: InitKind);

    /// Advance to the next suspension point and return its id.
    fn step(&mut self) -> Result<SuspendId, SimError>;

    /// Change the value of an input or register.
    fn set(&mut self, name: StringRef, value: Value);

    fn get(&self, name: StringRef) -> Option<Value>;

    fn step_count(&self) -> u64;
}

/// Creates initial values for all registers.
fn init_values<'a>(
    registers: impl Iterator<Item = (&'a StringRef, &'a WidthInt)>,
    kind: InitKind,
) -> Vec<(StringRef, Value)> {
    let mut rng = match kind {
        InitKind::Zero => None,
        InitKind::Random(seed) => Some(rand_xoshiro::Xoshiro256PlusPlus::seed_from_u64(seed)),
    };
    registers
        .map(|(name, width)| {
            let value = match rng.as_mut() {
                None => 0,
                Some(rng) => (rng.gen::<u64>() & mask(*width)) as LitInt,
            };
            (*name, Value::Int(value))
        })
        .collect()
}

/// Masks values to the register width. Values never exceed 63 bits to fit a literal.
fn mask(width: WidthInt) -> u64 {
    if width >= 63 {
        i64::MAX as u64
    } else {
        (1u64 << width) - 1
    }
}
