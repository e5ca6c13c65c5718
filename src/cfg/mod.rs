// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! Control flow graph of a process. Nodes live in an arena and are addressed through
//! [`NodeRef`]s that stay valid while other nodes are removed.

mod build;
mod dot;
mod paths;
mod simplify;

pub use build::build;
pub(crate) use dot::escape as escape_dot;
pub use dot::to_dot;
pub use paths::{enumerate_paths, Path, PathNode};
pub use simplify::{
    bypass_constant_branches, remove_empty_blocks, remove_literal_branches, simplify,
};

use crate::ir::{ExprRef, Stmt, StringRef, WidthInt};
use smallvec::SmallVec;
use std::fmt::{Debug, Formatter};
use std::num::NonZeroU32;

/// Identifies a suspension point. `0` is reserved for the entry of the process.
pub type SuspendId = u32;

#[derive(PartialEq, Eq, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct NodeRef(NonZeroU32);

impl Debug for NodeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeRef({})", self.index())
    }
}

impl NodeRef {
    fn from_index(index: usize) -> Self {
        NodeRef(NonZeroU32::new((index + 1) as u32).unwrap())
    }

    pub fn index(&self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Label of a control flow edge.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum EdgeLabel {
    Next,
    True,
    False,
}

/// A node of the control flow graph. Outgoing edges are stored inside the node and are the
/// only source of truth for the graph structure. `None` marks an edge that leaves the process.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Node {
    Head {
        next: Option<NodeRef>,
    },
    Block {
        stmts: Vec<Stmt>,
        next: Option<NodeRef>,
    },
    Branch {
        cond: ExprRef,
        tru: Option<NodeRef>,
        fals: Option<NodeRef>,
    },
    Suspend {
        id: SuspendId,
        next: Option<NodeRef>,
    },
}

impl Node {
    pub fn successors(&self) -> SmallVec<[(EdgeLabel, Option<NodeRef>); 2]> {
        match self {
            Node::Head { next } | Node::Block { next, .. } | Node::Suspend { next, .. } => {
                smallvec::smallvec![(EdgeLabel::Next, *next)]
            }
            Node::Branch { tru, fals, .. } => {
                smallvec::smallvec![(EdgeLabel::True, *tru), (EdgeLabel::False, *fals)]
            }
        }
    }

    fn successors_mut(&mut self) -> SmallVec<[&mut Option<NodeRef>; 2]> {
        match self {
            Node::Head { next } | Node::Block { next, .. } | Node::Suspend { next, .. } => {
                smallvec::smallvec![next]
            }
            Node::Branch { tru, fals, .. } => smallvec::smallvec![tru, fals],
        }
    }

    pub fn is_empty_block(&self) -> bool {
        matches!(self, Node::Block { stmts, .. } if stmts.is_empty())
    }
}

/// Control flow graph of the main loop of a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cfg {
    /// removed nodes are replaced with `None` to keep references stable
    nodes: Vec<Option<Node>>,
    head: NodeRef,
    suspend_count: SuspendId,
    /// registers declared in the preamble
    registers: Vec<(StringRef, WidthInt)>,
}

impl Cfg {
    fn new() -> Self {
        let mut cfg = Cfg {
            nodes: Vec::default(),
            head: NodeRef::from_index(0),
            suspend_count: 0,
            registers: Vec::default(),
        };
        cfg.head = cfg.add_node(Node::Head { next: None });
        cfg
    }

    fn add_node(&mut self, node: Node) -> NodeRef {
        let id = NodeRef::from_index(self.nodes.len());
        self.nodes.push(Some(node));
        id
    }

    pub fn head(&self) -> NodeRef {
        self.head
    }

    /// Number of suspension points. Their ids are `1..=suspend_count`.
    pub fn suspend_count(&self) -> SuspendId {
        self.suspend_count
    }

    pub fn registers(&self) -> &[(StringRef, WidthInt)] {
        &self.registers
    }

    pub fn get(&self, reference: NodeRef) -> &Node {
        self.nodes[reference.index()]
            .as_ref()
            .expect("Node was removed!")
    }

    fn get_mut(&mut self, reference: NodeRef) -> &mut Node {
        self.nodes[reference.index()]
            .as_mut()
            .expect("Node was removed!")
    }

    pub fn contains(&self, reference: NodeRef) -> bool {
        matches!(self.nodes.get(reference.index()), Some(Some(_)))
    }

    /// Iterates over all nodes that have not been removed in the order in which they were created.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeRef, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .flat_map(|(ii, n)| n.as_ref().map(|n| (NodeRef::from_index(ii), n)))
    }

    pub fn node_refs(&self) -> Vec<NodeRef> {
        self.nodes().map(|(r, _)| r).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Suspension nodes in the order of their ids.
    pub fn suspensions(&self) -> impl Iterator<Item = (NodeRef, SuspendId)> + '_ {
        self.nodes().filter_map(|(r, n)| match n {
            Node::Suspend { id, .. } => Some((r, *id)),
            _ => None,
        })
    }

    /// All edges that point to `target`.
    pub fn predecessors(&self, target: NodeRef) -> Vec<(NodeRef, EdgeLabel)> {
        let mut out = vec![];
        for (r, node) in self.nodes() {
            for (label, next) in node.successors() {
                if next == Some(target) {
                    out.push((r, label));
                }
            }
        }
        out
    }

    /// Sets the unlabelled outgoing edge of a head, block or suspension node.
    fn connect(&mut self, from: NodeRef, to: NodeRef) {
        match self.get_mut(from) {
            Node::Head { next } | Node::Block { next, .. } | Node::Suspend { next, .. } => {
                debug_assert!(next.is_none(), "{from:?} is already connected");
                *next = Some(to);
            }
            Node::Branch { .. } => unreachable!("branch edges need to be labelled"),
        }
    }

    /// Redirects all edges that point to `node` to `target` and then removes `node`.
    fn splice_out(&mut self, node: NodeRef, target: Option<NodeRef>) {
        debug_assert_ne!(Some(node), target, "cannot splice out a self loop");
        debug_assert_ne!(node, self.head, "cannot remove the head");
        for slot in self.nodes.iter_mut().flatten() {
            for next in slot.successors_mut() {
                if *next == Some(node) {
                    *next = target;
                }
            }
        }
        self.nodes[node.index()] = None;
    }
}
