// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::{Cfg, Node, NodeRef, SuspendId};
use crate::error::{CompileError, Result};
use crate::ir::{Context, ExprRef, SerializableIrNode, Stmt};
use std::io::Write;

/// Owned copy of a control flow node on a path. Branches remember which edge was taken.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum PathNode {
    Head,
    Block(Vec<Stmt>),
    Branch { cond: ExprRef, taken: bool },
    Suspend(SuspendId),
}

/// Walk from the head or a suspension point to the next suspension point.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Path {
    nodes: Vec<PathNode>,
    /// set once the dataflow propagator has rewritten the path
    pub(crate) propagated: bool,
}

impl Path {
    /// Creates a path that has not been propagated yet, even if `nodes` were taken from a
    /// propagated path.
    pub fn new(nodes: Vec<PathNode>) -> Self {
        debug_assert!(matches!(
            nodes.first(),
            Some(PathNode::Head | PathNode::Suspend(_))
        ));
        debug_assert!(matches!(nodes.last(), Some(PathNode::Suspend(_))));
        Self {
            nodes,
            propagated: false,
        }
    }

    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [PathNode] {
        &mut self.nodes
    }

    /// Suspension id that the path starts at, `0` for the head.
    pub fn start_id(&self) -> SuspendId {
        match self.nodes.first() {
            Some(PathNode::Suspend(id)) => *id,
            _ => 0,
        }
    }

    /// Suspension id that the path ends at.
    pub fn end_id(&self) -> SuspendId {
        match self.nodes.last() {
            Some(PathNode::Suspend(id)) => *id,
            _ => 0,
        }
    }

    pub fn is_propagated(&self) -> bool {
        self.propagated
    }

    /// Conditions along the path together with the edge that was taken.
    pub fn branches(&self) -> impl Iterator<Item = (ExprRef, bool)> + '_ {
        self.nodes.iter().filter_map(|n| match n {
            PathNode::Branch { cond, taken } => Some((*cond, *taken)),
            _ => None,
        })
    }

    /// All statements along the path in execution order.
    pub fn stmts(&self) -> impl Iterator<Item = &Stmt> + '_ {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                PathNode::Block(stmts) => Some(stmts),
                _ => None,
            })
            .flatten()
    }
}

impl SerializableIrNode for Path {
    fn serialize<W: Write>(&self, ctx: &Context, writer: &mut W) -> std::io::Result<()> {
        for (ii, node) in self.nodes.iter().enumerate() {
            if ii > 0 {
                write!(writer, " -> ")?;
            }
            match node {
                PathNode::Head => write!(writer, "head")?,
                PathNode::Block(stmts) => {
                    write!(writer, "[")?;
                    for (jj, stmt) in stmts.iter().enumerate() {
                        if jj > 0 {
                            write!(writer, "; ")?;
                        }
                        stmt.serialize(ctx, writer)?;
                    }
                    write!(writer, "]")?;
                }
                PathNode::Branch { cond, taken } => {
                    write!(writer, "{}(", if *taken { "T" } else { "F" })?;
                    cond.serialize(ctx, writer)?;
                    write!(writer, ")")?;
                }
                PathNode::Suspend(id) => write!(writer, "suspend {id}")?,
            }
        }
        Ok(())
    }
}

/// Enumerates every path from the head and from each suspension point to the next suspension
/// point. Paths from the head come first, followed by the paths from each suspension point in
/// the order of their ids. At every branch the paths through the true edge precede the ones
/// through the false edge.
///
/// `max_depth` bounds the number of nodes on a single path and is exceeded when the graph
/// contains a cycle without a suspension point.
pub fn enumerate_paths(cfg: &Cfg, max_depth: usize) -> Result<Vec<Path>> {
    let mut starts = vec![(cfg.head(), PathNode::Head, "head".to_string())];
    for (node, id) in cfg.suspensions() {
        starts.push((node, PathNode::Suspend(id), format!("suspension {id}")));
    }

    let mut out = Vec::new();
    for (start, start_node, label) in starts {
        let next = single_successor(cfg, start);
        let enumerator = Enumerator {
            cfg,
            max_depth,
            start: &label,
        };
        for mut suffix in enumerator.explore(next, 1)? {
            suffix.push(start_node.clone());
            suffix.reverse();
            out.push(Path::new(suffix));
        }
    }
    log::debug!("enumerated {} paths", out.len());
    Ok(out)
}

fn single_successor(cfg: &Cfg, node: NodeRef) -> Option<NodeRef> {
    match cfg.get(node) {
        Node::Head { next } | Node::Block { next, .. } | Node::Suspend { next, .. } => *next,
        Node::Branch { .. } => unreachable!("not a start node"),
    }
}

struct Enumerator<'a> {
    cfg: &'a Cfg,
    max_depth: usize,
    start: &'a str,
}

impl<'a> Enumerator<'a> {
    /// Returns all path suffixes starting at `node`. Suffixes are built in reverse order so that
    /// nodes can be pushed while returning from the recursion.
    fn explore(&self, node: Option<NodeRef>, depth: usize) -> Result<Vec<Vec<PathNode>>> {
        if depth > self.max_depth {
            return Err(CompileError::InfiniteGraph {
                depth: self.max_depth,
                start: self.start.to_string(),
            });
        }
        let Some(node) = node else {
            return Err(CompileError::Structural(format!(
                "control reaches the end of the process without a suspension, starting at {}",
                self.start
            )));
        };
        let out = match self.cfg.get(node) {
            Node::Suspend { id, .. } => vec![vec![PathNode::Suspend(*id)]],
            Node::Block { stmts, next } => {
                let mut suffixes = self.explore(*next, depth + 1)?;
                for suffix in suffixes.iter_mut() {
                    suffix.push(PathNode::Block(stmts.clone()));
                }
                suffixes
            }
            Node::Branch { cond, tru, fals } => {
                let mut suffixes = Vec::new();
                for (taken, target) in [(true, *tru), (false, *fals)] {
                    for mut suffix in self.explore(target, depth + 1)? {
                        suffix.push(PathNode::Branch {
                            cond: *cond,
                            taken,
                        });
                        suffixes.push(suffix);
                    }
                }
                suffixes
            }
            Node::Head { .. } => {
                return Err(CompileError::Structural(
                    "an edge points back to the head of the process".to_string(),
                ))
            }
        };
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::{build, simplify};
    use crate::ir::*;

    #[test]
    fn paths_of_a_branch() {
        let mut ctx = Context::default();
        let ready = ctx.symbol("ready");
        let tru = ctx.tru();
        let counter = ctx.string("counter".into());
        let counter_sym = ctx.symbol_ref(counter);
        let one = ctx.int(1);
        let inc = ctx.add(counter_sym, one);
        let body = vec![Stmt::While {
            cond: tru,
            body: vec![
                Stmt::If {
                    cond: ready,
                    then: vec![Stmt::Suspend],
                    els: vec![Stmt::assign(counter, inc)],
                },
                Stmt::Suspend,
            ],
        }];
        let mut cfg = build(&ctx, &body).unwrap();
        simplify(&mut ctx, &mut cfg, true);
        let paths = enumerate_paths(&cfg, 64).unwrap();
        let serialized: Vec<_> = paths.iter().map(|p| p.serialize_to_str(&ctx)).collect();
        assert_eq!(
            serialized,
            [
                "head -> T(ready) -> suspend 1",
                "head -> F(ready) -> [counter = counter + 1] -> suspend 2",
                "suspend 1 -> suspend 2",
                "suspend 2 -> T(ready) -> suspend 1",
                "suspend 2 -> F(ready) -> [counter = counter + 1] -> suspend 2",
            ]
        );
        assert_eq!(paths[1].start_id(), 0);
        assert_eq!(paths[1].end_id(), 2);
        assert_eq!(paths[1].branches().collect::<Vec<_>>(), [(ready, false)]);
    }

    #[test]
    fn loop_without_suspension() {
        let mut ctx = Context::default();
        let tru = ctx.tru();
        let x = ctx.string("x".into());
        let one = ctx.int(1);
        let body = vec![Stmt::While {
            cond: tru,
            body: vec![Stmt::assign(x, one)],
        }];
        let mut cfg = build(&ctx, &body).unwrap();
        simplify(&mut ctx, &mut cfg, true);
        let err = enumerate_paths(&cfg, 32).unwrap_err();
        assert_eq!(
            err,
            CompileError::InfiniteGraph {
                depth: 32,
                start: "head".to_string()
            }
        );
    }

    #[test]
    fn falling_off_the_end() {
        let mut ctx = Context::default();
        let tru = ctx.tru();
        let body = vec![Stmt::While {
            cond: tru,
            body: vec![Stmt::Suspend],
        }];
        // without simplification the exit of the main loop is still reachable
        let cfg = build(&ctx, &body).unwrap();
        assert!(matches!(
            enumerate_paths(&cfg, 64),
            Err(CompileError::Structural(_))
        ));
    }
}
