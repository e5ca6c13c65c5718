// Copyright 2023 The Regents of the University of California
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@berkeley.edu>
mod analysis;
mod context;
pub mod eval;
mod expr;
mod serialize;
mod stmt;
mod transform;
pub mod traversal;

pub use analysis::{collect_free_symbols, free_symbols, used_names};
pub use context::{Context, ExprRef, StringRef};
pub use eval::{eval, GetSymbolValue, Value};
pub use expr::{bits_required, BinaryOp, Expr, ForEachChild, LitInt, UnaryOp, WidthInt};
pub use serialize::SerializableIrNode;
pub use stmt::{Direction, Process, Stmt};
pub use transform::{fold, substitute, substitute_and_fold, SymbolTable};
