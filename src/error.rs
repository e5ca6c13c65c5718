// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

/// Reasons for which a process cannot be compiled into a state machine. All of them abort the
/// compilation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// The process does not have the expected shape.
    #[error("malformed process: {0}")]
    Structural(String),
    /// A statement or expression that we do not know how to translate.
    #[error("unsupported construct: {0}")]
    Unsupported(String),
    /// Path enumeration exceeded its bound, most likely because of a loop without a suspension.
    #[error(
        "path starting at {start} is longer than {depth} nodes, the process probably contains a loop without a suspension point"
    )]
    InfiniteGraph { depth: usize, start: String },
}

pub type Result<T> = std::result::Result<T, CompileError>;
