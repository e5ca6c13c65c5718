// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::cfg;
use crate::desugar::desugar_suspend_repeat;
use crate::error::{CompileError, Result};
use crate::fsm::{synthesize, StateMachine};
use crate::ir::*;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// name of the register that holds the current suspension id
    pub state_var: String,
    /// maximum number of nodes on a path between two suspension points
    pub max_path_depth: usize,
    /// where to save the control flow graph when it contains a loop without suspension
    pub dot_on_error: Option<PathBuf>,
    /// resolve branch conditions that are constant after the preceding block
    pub bypass_constant_branches: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            state_var: "yield_state".to_string(),
            max_path_depth: 1024,
            dot_on_error: None,
            bypass_constant_branches: true,
        }
    }
}

/// Translates a process into a state machine.
pub fn compile(
    ctx: &mut Context,
    process: &Process,
    options: &CompileOptions,
) -> Result<StateMachine> {
    log::debug!("compiling process {}", process.name);
    let (body, induction_vars) = desugar_suspend_repeat(ctx, process)?;
    let mut graph = cfg::build(ctx, &body)?;

    let state_var = ctx.string(options.state_var.as_str().into());
    let collides = process.is_port(state_var)
        || graph
            .registers()
            .iter()
            .chain(induction_vars.iter())
            .any(|(name, _)| *name == state_var);
    if collides {
        return Err(CompileError::Structural(format!(
            "the state variable `{}` is already used by the process",
            options.state_var
        )));
    }

    cfg::simplify(ctx, &mut graph, options.bypass_constant_branches);
    let mut paths = match cfg::enumerate_paths(&graph, options.max_path_depth) {
        Ok(paths) => paths,
        Err(e @ CompileError::InfiniteGraph { .. }) => {
            if let Some(filename) = &options.dot_on_error {
                if let Err(io) = std::fs::write(filename, cfg::to_dot(ctx, &graph)) {
                    log::warn!("failed to write {}: {io}", filename.display());
                }
            }
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    Ok(synthesize(
        ctx,
        process,
        graph.registers(),
        &induction_vars,
        graph.suspend_count(),
        state_var,
        &mut paths,
    ))
}
