// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::{BinaryOp, ExprRef, StringRef};
use indexmap::IndexMap;
use smallvec::SmallVec;

/// Statements of a process as produced by the front end.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum Stmt {
    /// `name = Register(width)`, only allowed before the main loop
    Register { name: StringRef, width: ExprRef },
    /// `a = b = value`, we only support a single target
    Assign {
        targets: SmallVec<[StringRef; 1]>,
        value: ExprRef,
    },
    /// `target op= value`
    AugAssign {
        target: StringRef,
        op: BinaryOp,
        value: ExprRef,
    },
    /// an expression that is evaluated for its side effect
    Expr(ExprRef),
    If {
        cond: ExprRef,
        then: Vec<Stmt>,
        els: Vec<Stmt>,
    },
    While { cond: ExprRef, body: Vec<Stmt> },
    /// wait for the next clock edge
    Suspend,
    /// wait for `count` clock edges
    SuspendRepeat { count: ExprRef },
}

impl Stmt {
    pub fn assign(target: StringRef, value: ExprRef) -> Self {
        Stmt::Assign {
            targets: smallvec::smallvec![target],
            value,
        }
    }

    /// Returns the target of a simple assignment to a single name.
    pub fn simple_assign(&self) -> Option<(StringRef, ExprRef)> {
        match self {
            Stmt::Assign { targets, value } if targets.len() == 1 => Some((targets[0], *value)),
            _ => None,
        }
    }

    /// Statements that may appear inside a basic block.
    pub fn is_straight_line(&self) -> bool {
        matches!(
            self,
            Stmt::Assign { .. } | Stmt::AugAssign { .. } | Stmt::Expr(_)
        )
    }

    /// Visits all expressions directly referenced by this statement (not the ones nested in
    /// a sub-statement).
    pub fn for_each_expr(&self, mut visitor: impl FnMut(ExprRef)) {
        match self {
            Stmt::Register { width, .. } => visitor(*width),
            Stmt::Assign { value, .. } => visitor(*value),
            Stmt::AugAssign { value, .. } => visitor(*value),
            Stmt::Expr(e) => visitor(*e),
            Stmt::If { cond, .. } => visitor(*cond),
            Stmt::While { cond, .. } => visitor(*cond),
            Stmt::Suspend => {}
            Stmt::SuspendRepeat { count } => visitor(*count),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Direction {
    Input,
    Output,
}

/// A process: a list of register declarations followed by a single infinite loop.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Process {
    pub name: String,
    pub ports: IndexMap<StringRef, Direction>,
    pub body: Vec<Stmt>,
}

impl Process {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ports: IndexMap::default(),
            body: Vec::default(),
        }
    }

    pub fn add_input(&mut self, name: StringRef) {
        self.ports.insert(name, Direction::Input);
    }

    pub fn add_output(&mut self, name: StringRef) {
        self.ports.insert(name, Direction::Output);
    }

    pub fn is_port(&self, name: StringRef) -> bool {
        self.ports.contains_key(&name)
    }

    pub fn inputs(&self) -> impl Iterator<Item = StringRef> + '_ {
        self.ports
            .iter()
            .filter(|(_, d)| **d == Direction::Input)
            .map(|(n, _)| *n)
    }

    pub fn outputs(&self) -> impl Iterator<Item = StringRef> + '_ {
        self.ports
            .iter()
            .filter(|(_, d)| **d == Direction::Output)
            .map(|(n, _)| *n)
    }
}
