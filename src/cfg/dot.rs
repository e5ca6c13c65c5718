// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::{Cfg, EdgeLabel, Node};
use crate::ir::{Context, SerializableIrNode};
use std::fmt::Write;

/// Renders the control flow graph in the graphviz dot format.
pub fn to_dot(ctx: &Context, cfg: &Cfg) -> String {
    let mut dot = String::from("digraph cfg {\n");
    dot.push_str("  node [fontname=\"Courier\"];\n");
    for (r, node) in cfg.nodes() {
        let (shape, label) = match node {
            Node::Head { .. } => ("doublecircle", "head".to_string()),
            Node::Block { stmts, .. } => {
                let mut label = String::new();
                for stmt in stmts.iter() {
                    label.push_str(&escape(&stmt.serialize_to_str(ctx)));
                    label.push_str("\\l");
                }
                ("box", label)
            }
            Node::Branch { cond, .. } => (
                "invhouse",
                format!("if {}", escape(&cond.serialize_to_str(ctx))),
            ),
            Node::Suspend { id, .. } => ("oval", format!("suspend {id}")),
        };
        let _ = writeln!(dot, "  n{} [shape={shape}, label=\"{label}\"];", r.index());
    }
    for (r, node) in cfg.nodes() {
        for (label, next) in node.successors() {
            let Some(next) = next else { continue };
            let _ = write!(dot, "  n{} -> n{}", r.index(), next.index());
            match label {
                EdgeLabel::Next => dot.push_str(";\n"),
                EdgeLabel::True => dot.push_str(" [label=\"T\"];\n"),
                EdgeLabel::False => dot.push_str(" [label=\"F\"];\n"),
            }
        }
    }
    dot.push_str("}\n");
    dot
}

pub(crate) fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
