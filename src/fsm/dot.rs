// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::StateMachine;
use crate::cfg::{escape_dot, Path, PathNode};
use crate::ir::{Context, SerializableIrNode};
use std::fmt::Write;

/// Renders every path as a chain of nodes that ends in the state it was turned into.
/// `paths` and the states of `fsm` need to be in the same order.
pub fn paths_to_dot(ctx: &Context, fsm: &StateMachine, paths: &[Path]) -> String {
    debug_assert_eq!(paths.len(), fsm.states.len());
    let mut dot = String::from("digraph paths {\n");
    dot.push_str("  node [fontname=\"Courier\"];\n");
    for (ii, (path, state)) in paths.iter().zip(fsm.states.iter()).enumerate() {
        let _ = writeln!(dot, "  subgraph cluster_{ii} {{");
        for (jj, node) in path.nodes().iter().enumerate() {
            let (shape, label) = match node {
                PathNode::Head => ("doublecircle", "head".to_string()),
                PathNode::Block(stmts) => (
                    "box",
                    stmts
                        .iter()
                        .map(|s| escape_dot(&s.serialize_to_str(ctx)) + "\\l")
                        .collect::<String>(),
                ),
                PathNode::Branch { cond, taken } => (
                    "invhouse",
                    format!(
                        "{} {}",
                        if *taken { "T" } else { "F" },
                        escape_dot(&cond.serialize_to_str(ctx))
                    ),
                ),
                PathNode::Suspend(id) => ("oval", format!("suspend {id}")),
            };
            let _ = writeln!(dot, "    p{ii}_{jj} [shape={shape}, label=\"{label}\"];");
            if jj > 0 {
                let _ = writeln!(dot, "    p{ii}_{} -> p{ii}_{jj};", jj - 1);
            }
        }
        let label = escape_dot(&state.serialize_to_str(ctx)).replace('\n', "\\l");
        let _ = writeln!(
            dot,
            "    s{ii} [shape=doubleoctagon, label=\"{label}\\l\"];"
        );
        let _ = writeln!(dot, "    p{ii}_{} -> s{ii} [style=dashed];", path.nodes().len() - 1);
        dot.push_str("  }\n");
    }
    dot.push_str("}\n");
    dot
}
