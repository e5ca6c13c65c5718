// Copyright 2023 The Regents of the University of California
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@berkeley.edu>

use super::{Context, Expr, ExprRef, Process, Stmt, UnaryOp};
use std::io::Write;

pub trait SerializableIrNode {
    fn serialize<W: Write>(&self, ctx: &Context, writer: &mut W) -> std::io::Result<()>;
    fn serialize_to_str(&self, ctx: &Context) -> String {
        let mut buf = Vec::new();
        self.serialize(ctx, &mut buf)
            .expect("Failed to write to string!");
        String::from_utf8(buf).expect("Failed to read string we wrote!")
    }
}

impl SerializableIrNode for Expr {
    fn serialize<W: Write>(&self, ctx: &Context, writer: &mut W) -> std::io::Result<()> {
        serialize_expr(self, ctx, writer)
    }
}

impl SerializableIrNode for ExprRef {
    fn serialize<W: Write>(&self, ctx: &Context, writer: &mut W) -> std::io::Result<()> {
        ctx.get(*self).serialize(ctx, writer)
    }
}

fn serialize_expr<W: Write>(expr: &Expr, ctx: &Context, writer: &mut W) -> std::io::Result<()> {
    match expr {
        Expr::Symbol(name) => write!(writer, "{}", ctx.get_str(*name)),
        Expr::Int(value) => write!(writer, "{value}"),
        Expr::Bool(value) => write!(writer, "{value}"),
        Expr::Unary(op, e) => {
            match op {
                UnaryOp::Not => write!(writer, "not ")?,
                UnaryOp::Invert => write!(writer, "~")?,
                UnaryOp::Negate => write!(writer, "-")?,
            }
            serialize_operand(*e, ctx, writer)
        }
        Expr::Binary(op, a, b) => {
            serialize_operand(*a, ctx, writer)?;
            write!(writer, " {} ", op.symbol())?;
            serialize_operand(*b, ctx, writer)
        }
        Expr::Ite { cond, tru, fals } => {
            serialize_operand(*tru, ctx, writer)?;
            write!(writer, " if ")?;
            serialize_operand(*cond, ctx, writer)?;
            write!(writer, " else ")?;
            serialize_operand(*fals, ctx, writer)
        }
    }
}

/// Compound operands are wrapped in parenthesis.
fn serialize_operand<W: Write>(e: ExprRef, ctx: &Context, writer: &mut W) -> std::io::Result<()> {
    let expr = ctx.get(e);
    if matches!(expr, Expr::Binary(..) | Expr::Ite { .. }) {
        write!(writer, "(")?;
        serialize_expr(expr, ctx, writer)?;
        write!(writer, ")")
    } else {
        serialize_expr(expr, ctx, writer)
    }
}

impl SerializableIrNode for Stmt {
    fn serialize<W: Write>(&self, ctx: &Context, writer: &mut W) -> std::io::Result<()> {
        serialize_stmt(self, ctx, writer, 0)
    }
}

impl SerializableIrNode for [Stmt] {
    fn serialize<W: Write>(&self, ctx: &Context, writer: &mut W) -> std::io::Result<()> {
        serialize_stmts(self, ctx, writer, 0)
    }
}

fn serialize_stmts<W: Write>(
    stmts: &[Stmt],
    ctx: &Context,
    writer: &mut W,
    indent: usize,
) -> std::io::Result<()> {
    for (ii, stmt) in stmts.iter().enumerate() {
        if ii > 0 {
            writeln!(writer)?;
        }
        serialize_stmt(stmt, ctx, writer, indent)?;
    }
    Ok(())
}

fn serialize_body<W: Write>(
    stmts: &[Stmt],
    ctx: &Context,
    writer: &mut W,
    indent: usize,
) -> std::io::Result<()> {
    writeln!(writer)?;
    if stmts.is_empty() {
        write!(writer, "{}pass", "  ".repeat(indent))
    } else {
        serialize_stmts(stmts, ctx, writer, indent)
    }
}

fn serialize_stmt<W: Write>(
    stmt: &Stmt,
    ctx: &Context,
    writer: &mut W,
    indent: usize,
) -> std::io::Result<()> {
    write!(writer, "{}", "  ".repeat(indent))?;
    match stmt {
        Stmt::Register { name, width } => {
            write!(writer, "reg {}: bv<", ctx.get_str(*name))?;
            width.serialize(ctx, writer)?;
            write!(writer, ">")
        }
        Stmt::Assign { targets, value } => {
            for target in targets.iter() {
                write!(writer, "{} = ", ctx.get_str(*target))?;
            }
            value.serialize(ctx, writer)
        }
        Stmt::AugAssign { target, op, value } => {
            write!(writer, "{} {}= ", ctx.get_str(*target), op.symbol())?;
            value.serialize(ctx, writer)
        }
        Stmt::Expr(e) => e.serialize(ctx, writer),
        Stmt::If { cond, then, els } => {
            write!(writer, "if ")?;
            cond.serialize(ctx, writer)?;
            write!(writer, ":")?;
            serialize_body(then, ctx, writer, indent + 1)?;
            if !els.is_empty() {
                writeln!(writer)?;
                write!(writer, "{}else:", "  ".repeat(indent))?;
                serialize_body(els, ctx, writer, indent + 1)?;
            }
            Ok(())
        }
        Stmt::While { cond, body } => {
            write!(writer, "while ")?;
            cond.serialize(ctx, writer)?;
            write!(writer, ":")?;
            serialize_body(body, ctx, writer, indent + 1)
        }
        Stmt::Suspend => write!(writer, "suspend"),
        Stmt::SuspendRepeat { count } => {
            write!(writer, "suspend(")?;
            count.serialize(ctx, writer)?;
            write!(writer, ")")
        }
    }
}

impl SerializableIrNode for Process {
    fn serialize<W: Write>(&self, ctx: &Context, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "process {}", self.name)?;
        for (name, direction) in self.ports.iter() {
            writeln!(
                writer,
                "{} {}",
                format!("{direction:?}").to_lowercase(),
                ctx.get_str(*name)
            )?;
        }
        serialize_stmts(&self.body, ctx, writer, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_nested_expressions() {
        let mut ctx = Context::default();
        let a = ctx.symbol("a");
        let one = ctx.int(1);
        let three = ctx.int(3);
        let sum = ctx.add(a, one);
        let cmp = ctx.greater(sum, three);
        assert_eq!(cmp.serialize_to_str(&ctx), "(a + 1) > 3");
        let not_cmp = ctx.not(cmp);
        assert_eq!(not_cmp.serialize_to_str(&ctx), "not ((a + 1) > 3)");
        let ready = ctx.symbol("ready");
        let not_ready = ctx.not(ready);
        assert_eq!(not_ready.serialize_to_str(&ctx), "not ready");
    }

    #[test]
    fn serialize_statements() {
        let mut ctx = Context::default();
        let x = ctx.string("x".into());
        let ready = ctx.symbol("ready");
        let one = ctx.int(1);
        let tru = ctx.tru();
        let body = vec![Stmt::While {
            cond: tru,
            body: vec![
                Stmt::Suspend,
                Stmt::If {
                    cond: ready,
                    then: vec![Stmt::assign(x, one)],
                    els: vec![],
                },
            ],
        }];
        assert_eq!(
            body.serialize_to_str(&ctx),
            "while true:\n  suspend\n  if ready:\n    x = 1"
        );
    }
}
