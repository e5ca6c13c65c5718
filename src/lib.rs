// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! Compiles processes that wait for the clock with explicit suspension points into
//! synchronous state machines.

pub mod cfg;
mod compile;
pub mod dataflow;
pub mod desugar;
mod error;
pub mod fsm;
pub mod ir;
pub mod sim;

pub use compile::{compile, CompileOptions};
pub use error::{CompileError, Result};
