//! This crate provides a small interpreter for a circular-tape Turing machine.
//! Program text is tokenized by the lexer, validated into commands, assembled into an
//! `Algorithm` of states, and executed by a `Machine` until it halts.

pub mod builder;
pub mod encoder;
pub mod lexer;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod types;

/// Re-exports the `Rule` enum from the lexer module, used by the `pest` grammar.
pub use crate::lexer::Rule;
/// Re-exports the command building functions from the builder module.
pub use builder::{build_command, compile_command};
/// Re-exports the encoding functions from the encoder module.
pub use encoder::{decode, encode};
/// Re-exports the `tokenize` function from the lexer module.
pub use lexer::tokenize;
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the execution engine from the machine module.
pub use machine::{run, Halt, Machine, Step};
/// Re-exports the `parse` function and `AlgorithmBuilder` from the parser module.
pub use parser::{parse, AlgorithmBuilder};
/// Re-exports `Program`, `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{Program, ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the data model and error types from the types module.
pub use types::{
    Algorithm, Command, CommandError, Instruction, Location, SanaeError, State, Symbol,
    SyntaxError, SyntaxReason, Tape, Token, Transition, MAX_PROGRAM_SIZE,
};
