// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::{Cfg, Node, NodeRef};
use crate::dataflow::constant_assignments;
use crate::ir::*;

/// Runs all structural simplifications once.
pub fn simplify(ctx: &mut Context, cfg: &mut Cfg, bypass: bool) {
    let before = cfg.len();
    remove_empty_blocks(cfg);
    if bypass {
        bypass_constant_branches(ctx, cfg);
    }
    remove_literal_branches(ctx, cfg);
    log::debug!("simplified cfg from {before} to {} nodes", cfg.len());
}

/// Removes blocks without statements and connects their predecessors to their successor.
/// Returns the number of blocks that were removed.
pub fn remove_empty_blocks(cfg: &mut Cfg) -> usize {
    let mut removed = 0;
    for node in cfg.node_refs() {
        let current = cfg.get(node);
        if !current.is_empty_block() {
            continue;
        }
        let next = current.successors()[0].1;
        // an empty block that jumps to itself cannot be spliced out
        if next != Some(node) {
            cfg.splice_out(node, next);
            removed += 1;
        }
    }
    removed
}

/// Looks at every block that is directly followed by a branch. If the branch condition folds to
/// a literal under the values assigned in the block, the block is connected directly to the
/// branch target. Other predecessors of the branch are not affected.
/// Returns the number of edges that were rewired.
pub fn bypass_constant_branches(ctx: &mut Context, cfg: &mut Cfg) -> usize {
    let mut rewired = 0;
    for node in cfg.node_refs() {
        let Node::Block {
            stmts,
            next: Some(branch),
        } = cfg.get(node)
        else {
            continue;
        };
        let branch = *branch;
        let Node::Branch { cond, tru, fals } = cfg.get(branch) else {
            continue;
        };
        let (cond, tru, fals) = (*cond, *tru, *fals);
        let constants = constant_assignments(ctx, stmts);
        let folded = substitute_and_fold(ctx, cond, &constants);
        let Some(taken) = ctx.get(folded).truth_value() else {
            log::trace!(
                "cannot resolve `{}` after {node:?}",
                cond.serialize_to_str(ctx)
            );
            continue;
        };
        log::trace!(
            "`{}` is always {taken} after {node:?}",
            cond.serialize_to_str(ctx)
        );
        if let Node::Block { next, .. } = cfg.get_mut(node) {
            *next = if taken { tru } else { fals };
        }
        rewired += 1;
    }
    rewired
}

/// Removes every branch whose condition is a literal and connects its predecessors to the
/// target of the edge that is always taken. Returns the number of branches that were removed.
pub fn remove_literal_branches(ctx: &Context, cfg: &mut Cfg) -> usize {
    let mut removed = 0;
    for node in cfg.node_refs() {
        let Node::Branch { cond, tru, fals } = cfg.get(node) else {
            continue;
        };
        let Some(taken) = ctx.get(*cond).truth_value() else {
            continue;
        };
        let target: Option<NodeRef> = if taken { *tru } else { *fals };
        // a branch that loops onto itself has to stay to make the cycle visible
        if target != Some(node) {
            cfg.splice_out(node, target);
            removed += 1;
        }
    }
    removed
}
