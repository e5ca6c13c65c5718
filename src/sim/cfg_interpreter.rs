// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::{init_values, InitKind, SimError, Simulator};
use crate::cfg::{Cfg, Node, NodeRef, SuspendId};
use crate::ir::eval::eval_binary;
use crate::ir::*;
use indexmap::IndexMap;

/// Executes the statements of a control flow graph one after the other.
pub struct CfgInterpreter<'a> {
    ctx: &'a Context,
    cfg: &'a Cfg,
    values: IndexMap<StringRef, Value>,
    /// the head or the suspension we are waiting in
    position: NodeRef,
    /// maximum number of nodes visited in a single step
    max_nodes: usize,
    step_count: u64,
}

impl<'a> CfgInterpreter<'a> {
    pub fn new(ctx: &'a Context, cfg: &'a Cfg) -> Self {
        Self {
            ctx,
            cfg,
            values: IndexMap::new(),
            position: cfg.head(),
            max_nodes: 100_000,
            step_count: 0,
        }
    }

    fn eval(&self, expr: ExprRef) -> Result<Value, SimError> {
        eval(self.ctx, &self.values, expr)
            .ok_or_else(|| SimError::Eval(expr.serialize_to_str(self.ctx)))
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<(), SimError> {
        match stmt {
            Stmt::Assign { targets, value } => {
                let value = self.eval(*value)?;
                for target in targets.iter() {
                    self.values.insert(*target, value);
                }
            }
            Stmt::AugAssign { target, op, value } => {
                let current = self
                    .values
                    .get(target)
                    .copied()
                    .ok_or_else(|| SimError::Eval(self.ctx.get_str(*target).to_string()))?;
                let value = self.eval(*value)?;
                let updated = eval_binary(*op, current, value)
                    .ok_or_else(|| SimError::Eval(stmt.serialize_to_str(self.ctx)))?;
                self.values.insert(*target, updated);
            }
            // expressions do not have an effect on the registers
            Stmt::Expr(_) => {}
            other => debug_assert!(!other.is_straight_line()),
        }
        Ok(())
    }
}

impl<'a> Simulator for CfgInterpreter<'a> {
    fn init(&mut self, kind: InitKind) {
        let registers = self.cfg.registers().iter().map(|(n, w)| (n, w));
        self.values = init_values(registers, kind).into_iter().collect();
        self.position = self.cfg.head();
        self.step_count = 0;
    }

    fn step(&mut self) -> Result<SuspendId, SimError> {
        let cfg = self.cfg;
        let mut node = cfg.get(self.position).successors()[0].1;
        for _ in 0..self.max_nodes {
            let current = node.ok_or(SimError::EndOfProcess)?;
            match cfg.get(current) {
                Node::Head { next } => node = *next,
                Node::Block { stmts, next } => {
                    for stmt in stmts.iter() {
                        self.exec(stmt)?;
                    }
                    node = *next;
                }
                Node::Branch { cond, tru, fals } => {
                    node = if self.eval(*cond)?.is_true() {
                        *tru
                    } else {
                        *fals
                    };
                }
                Node::Suspend { id, .. } => {
                    self.position = current;
                    self.step_count += 1;
                    return Ok(*id);
                }
            }
        }
        Err(SimError::NoSuspension(self.max_nodes))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::build;

    #[test]
    fn count_up() {
        let mut ctx = Context::default();
        let counter = ctx.string("counter".into());
        let eight = ctx.int(8);
        let one = ctx.int(1);
        let tru = ctx.tru();
        let body = vec![
            Stmt::Register {
                name: counter,
                width: eight,
            },
            Stmt::While {
                cond: tru,
                body: vec![
                    Stmt::AugAssign {
                        target: counter,
                        op: BinaryOp::Add,
                        value: one,
                    },
                    Stmt::Suspend,
                ],
            },
        ];
        let cfg = build(&ctx, &body).unwrap();
        let mut sim = CfgInterpreter::new(&ctx, &cfg);
        sim.init(InitKind::Zero);
        assert_eq!(sim.get(counter), Some(Value::Int(0)));
        for ii in 1..=3 {
            assert_eq!(sim.step(), Ok(1));
            assert_eq!(sim.get(counter), Some(Value::Int(ii)));
        }
        assert_eq!(sim.step_count(), 3);
    }

    #[test]
    fn undefined_input() {
        let mut ctx = Context::default();
        let ready = ctx.symbol("ready");
        let tru = ctx.tru();
        let body = vec![Stmt::While {
            cond: tru,
            body: vec![Stmt::If {
                cond: ready,
                then: vec![Stmt::Suspend],
                els: vec![Stmt::Suspend],
            }],
        }];
        let cfg = build(&ctx, &body).unwrap();
        let ready_name = ctx.lookup_str("ready").unwrap();
        let mut sim = CfgInterpreter::new(&ctx, &cfg);
        sim.init(InitKind::Zero);
        assert_eq!(sim.step(), Err(SimError::Eval("ready".to_string())));
        sim.set(ready_name, Value::Bool(false));
        assert_eq!(sim.step(), Ok(2));
    }
}
