// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::{Cfg, Node, NodeRef, SuspendId};
use crate::error::{CompileError, Result};
use crate::ir::*;

/// Builds the control flow graph for a process body that consists of register declarations
/// followed by a single infinite loop. Suspension points receive ids `1, 2, ...` in the order in
/// which they appear in the source.
pub fn build(ctx: &Context, body: &[Stmt]) -> Result<Cfg> {
    let (main_loop, preamble) = body.split_last().ok_or_else(|| {
        CompileError::Structural("process body is empty, expected an infinite loop".to_string())
    })?;
    if !is_infinite_loop(ctx, main_loop) {
        return Err(CompileError::Structural(format!(
            "process body needs to end in an infinite loop, not:\n{}",
            main_loop.serialize_to_str(ctx)
        )));
    }

    let mut builder = Builder::new(ctx);
    for stmt in preamble.iter() {
        builder.declare_register(stmt)?;
    }
    builder.stmt(main_loop)?;
    log::debug!(
        "built cfg with {} nodes and {} suspension points",
        builder.cfg.len(),
        builder.cfg.suspend_count
    );
    Ok(builder.cfg)
}

fn is_infinite_loop(ctx: &Context, stmt: &Stmt) -> bool {
    match stmt {
        Stmt::While { cond, .. } => eval(ctx, &(), *cond).is_some_and(|v| v.is_true()),
        _ => false,
    }
}

struct Builder<'a> {
    ctx: &'a Context,
    cfg: Cfg,
    /// the basic block that straight line statements are appended to
    current: NodeRef,
}

impl<'a> Builder<'a> {
    fn new(ctx: &'a Context) -> Self {
        let mut cfg = Cfg::new();
        let current = cfg.add_node(Node::Block {
            stmts: vec![],
            next: None,
        });
        cfg.connect(cfg.head, current);
        Self { ctx, cfg, current }
    }

    fn declare_register(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Register { name, width } => match self.ctx.get(*width) {
                Expr::Int(w) if *w > 0 && *w <= WidthInt::MAX as LitInt => {
                    self.cfg.registers.push((*name, *w as WidthInt));
                    Ok(())
                }
                _ => Err(CompileError::Unsupported(format!(
                    "register `{}` needs a positive integer literal as width, not `{}`",
                    self.ctx.get_str(*name),
                    width.serialize_to_str(self.ctx)
                ))),
            },
            other => Err(CompileError::Unsupported(format!(
                "only register declarations may appear before the main loop, not `{}`",
                other.serialize_to_str(self.ctx)
            ))),
        }
    }

    fn new_block(&mut self) -> NodeRef {
        self.cfg.add_node(Node::Block {
            stmts: vec![],
            next: None,
        })
    }

    /// Terminates the current block with a branch and starts a new block on the true edge.
    fn add_branch(&mut self, cond: ExprRef) -> NodeRef {
        let branch = self.cfg.add_node(Node::Branch {
            cond,
            tru: None,
            fals: None,
        });
        self.cfg.connect(self.current, branch);
        self.current = self.new_block();
        self.set_branch_target(branch, true, self.current);
        branch
    }

    fn set_branch_target(&mut self, branch: NodeRef, edge: bool, target: NodeRef) {
        match self.cfg.get_mut(branch) {
            Node::Branch { tru, fals, .. } => {
                let slot = if edge { tru } else { fals };
                debug_assert!(slot.is_none());
                *slot = Some(target);
            }
            other => unreachable!("not a branch: {other:?}"),
        }
    }

    fn add_suspend(&mut self) {
        self.cfg.suspend_count += 1;
        let id: SuspendId = self.cfg.suspend_count;
        let suspend = self.cfg.add_node(Node::Suspend { id, next: None });
        self.cfg.connect(self.current, suspend);
        self.current = self.new_block();
        self.cfg.connect(suspend, self.current);
    }

    fn append(&mut self, stmt: &Stmt) {
        match self.cfg.get_mut(self.current) {
            Node::Block { stmts, .. } => stmts.push(stmt.clone()),
            other => unreachable!("current node needs to be a block, not {other:?}"),
        }
    }

    fn stmts(&mut self, stmts: &[Stmt]) -> Result<()> {
        for stmt in stmts.iter() {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::While { cond, body } => {
                let branch = self.add_branch(*cond);
                self.stmts(body)?;
                // jump back to the loop condition
                self.cfg.connect(self.current, branch);
                self.current = self.new_block();
                self.set_branch_target(branch, false, self.current);
            }
            Stmt::If { cond, then, els } => {
                let branch = self.add_branch(*cond);
                self.stmts(then)?;
                let end_of_then = self.current;
                let end_of_else = if els.is_empty() {
                    None
                } else {
                    self.current = self.new_block();
                    self.set_branch_target(branch, false, self.current);
                    self.stmts(els)?;
                    Some(self.current)
                };
                let join = self.new_block();
                self.cfg.connect(end_of_then, join);
                match end_of_else {
                    Some(end_of_else) => self.cfg.connect(end_of_else, join),
                    None => self.set_branch_target(branch, false, join),
                }
                self.current = join;
            }
            Stmt::Suspend => self.add_suspend(),
            Stmt::Assign { targets, .. } if targets.len() != 1 => {
                return Err(CompileError::Unsupported(format!(
                    "assignments need exactly one target: `{}`",
                    stmt.serialize_to_str(self.ctx)
                )));
            }
            Stmt::Assign { .. } | Stmt::AugAssign { .. } | Stmt::Expr(_) => self.append(stmt),
            Stmt::SuspendRepeat { .. } => {
                return Err(CompileError::Unsupported(format!(
                    "`{}` needs to be desugared into a loop first",
                    stmt.serialize_to_str(self.ctx)
                )));
            }
            Stmt::Register { name, .. } => {
                return Err(CompileError::Unsupported(format!(
                    "register `{}` needs to be declared before the main loop",
                    self.ctx.get_str(*name)
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::EdgeLabel;

    fn main_loop(ctx: &mut Context, body: Vec<Stmt>) -> Stmt {
        Stmt::While {
            cond: ctx.tru(),
            body,
        }
    }

    #[test]
    fn suspension_ids_in_source_order() {
        let mut ctx = Context::default();
        let c = ctx.symbol("c");
        let body = vec![
            Stmt::Suspend,
            Stmt::If {
                cond: c,
                then: vec![Stmt::Suspend],
                els: vec![Stmt::Suspend],
            },
            Stmt::Suspend,
        ];
        let process = vec![main_loop(&mut ctx, body)];
        let cfg = build(&ctx, &process).unwrap();
        assert_eq!(cfg.suspend_count(), 4);
        let ids: Vec<_> = cfg.suspensions().map(|(_, id)| id).collect();
        assert_eq!(ids, [1, 2, 3, 4]);
    }

    #[test]
    fn if_without_else_joins_on_false_edge() {
        let mut ctx = Context::default();
        let c = ctx.symbol("c");
        let x = ctx.string("x".into());
        let one = ctx.int(1);
        let body = vec![Stmt::If {
            cond: c,
            then: vec![Stmt::assign(x, one)],
            els: vec![],
        }];
        let process = vec![main_loop(&mut ctx, body)];
        let cfg = build(&ctx, &process).unwrap();
        let (branch, _) = cfg
            .nodes()
            .find(|(_, n)| matches!(n, Node::Branch { cond, .. } if *cond == c))
            .unwrap();
        let (tru, fals) = match cfg.get(branch) {
            Node::Branch { tru, fals, .. } => (tru.unwrap(), fals.unwrap()),
            _ => unreachable!(),
        };
        // the true edge goes through the assignment and then joins the false edge
        assert_eq!(
            cfg.get(tru),
            &Node::Block {
                stmts: vec![Stmt::assign(x, one)],
                next: Some(fals)
            }
        );
        assert_eq!(
            cfg.predecessors(fals),
            [(branch, EdgeLabel::False), (tru, EdgeLabel::Next)]
        );
    }

    #[test]
    fn registers_in_preamble() {
        let mut ctx = Context::default();
        let counter = ctx.string("counter".into());
        let eight = ctx.int(8);
        let process = vec![
            Stmt::Register {
                name: counter,
                width: eight,
            },
            main_loop(&mut ctx, vec![Stmt::Suspend]),
        ];
        let cfg = build(&ctx, &process).unwrap();
        assert_eq!(cfg.registers(), [(counter, 8)]);
    }

    #[test]
    fn structural_errors() {
        let mut ctx = Context::default();
        let c = ctx.symbol("c");
        let not_infinite = vec![Stmt::While {
            cond: c,
            body: vec![Stmt::Suspend],
        }];
        assert!(matches!(
            build(&ctx, &not_infinite),
            Err(CompileError::Structural(_))
        ));
        assert!(matches!(build(&ctx, &[]), Err(CompileError::Structural(_))));
    }

    #[test]
    fn unsupported_constructs() {
        let mut ctx = Context::default();
        let x = ctx.string("x".into());
        let y = ctx.string("y".into());
        let one = ctx.int(1);
        let n = ctx.symbol("n");

        // assignment in the preamble
        let process = vec![
            Stmt::assign(x, one),
            main_loop(&mut ctx, vec![Stmt::Suspend]),
        ];
        assert!(matches!(
            build(&ctx, &process),
            Err(CompileError::Unsupported(_))
        ));

        // register with a symbolic width
        let process = vec![
            Stmt::Register { name: x, width: n },
            main_loop(&mut ctx, vec![Stmt::Suspend]),
        ];
        assert!(matches!(
            build(&ctx, &process),
            Err(CompileError::Unsupported(_))
        ));

        // multiple targets
        let multi = Stmt::Assign {
            targets: smallvec::smallvec![x, y],
            value: one,
        };
        let process = vec![main_loop(&mut ctx, vec![multi, Stmt::Suspend])];
        assert!(matches!(
            build(&ctx, &process),
            Err(CompileError::Unsupported(_))
        ));

        // repeated suspension that was not desugared
        let process = vec![main_loop(&mut ctx, vec![Stmt::SuspendRepeat { count: one }])];
        assert!(matches!(
            build(&ctx, &process),
            Err(CompileError::Unsupported(_))
        ));
    }
}
