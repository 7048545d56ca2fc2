//! This module defines the core data structures and types used throughout the interpreter,
//! including tokens, instructions, commands, states, the compiled algorithm, and error types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// A single cell value on the tape. Also used as the dispatch key of a state.
pub type Symbol = i64;
/// The circular tape of a machine.
pub type Tape = Vec<Symbol>;

/// Number of cells a `mover`/`movel` without an operand moves the head.
pub const DEFAULT_MOVE_STEPS: usize = 1;
/// The maximum allowed size for a program source in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// File extension of program sources.
pub const PROGRAM_EXTENSION: &str = "sasm";

/// A lexical token of the instruction language.
///
/// Operands are folded into the keyword token that owns them, e.g. `write 9`
/// becomes `Token::Write(9)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    Erase,
    Write(Symbol),
    MoveRight(usize),
    MoveLeft(usize),
    Halt,
    /// Condition of a command: the symbol it fires on.
    If(Symbol),
    /// Terminator of a command: the index of the next state.
    Goto(usize),
    /// A bare integer with no keyword to attach to.
    Operand(i64),
}

impl Token {
    /// Returns the executable instruction for this token, if it is one.
    pub fn instruction(self) -> Option<Instruction> {
        match self {
            Token::Erase => Some(Instruction::Erase),
            Token::Write(value) => Some(Instruction::Write(value)),
            Token::MoveRight(steps) => Some(Instruction::MoveRight(steps)),
            Token::MoveLeft(steps) => Some(Instruction::MoveLeft(steps)),
            Token::Halt => Some(Instruction::Halt),
            Token::If(_) | Token::Goto(_) | Token::Operand(_) => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::If(value) => write!(f, "if {value}"),
            Token::Goto(state) => write!(f, "goto {state}"),
            Token::Operand(value) => write!(f, "{value}"),
            Token::Erase => write!(f, "erase"),
            Token::Write(value) => write!(f, "write {value}"),
            Token::MoveRight(steps) => write!(f, "mover {steps}"),
            Token::MoveLeft(steps) => write!(f, "movel {steps}"),
            Token::Halt => write!(f, "halt"),
        }
    }
}

/// An instruction executed by the machine when a command fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Set the cell under the head to 0.
    Erase,
    /// Set the cell under the head to the given symbol.
    Write(Symbol),
    /// Move the head right, wrapping around the end of the tape.
    MoveRight(usize),
    /// Move the head left, wrapping around the start of the tape.
    MoveLeft(usize),
    /// Stop the machine immediately.
    Halt,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Erase => write!(f, "erase"),
            Instruction::Write(value) => write!(f, "write {value}"),
            Instruction::MoveRight(steps) => write!(f, "mover {steps}"),
            Instruction::MoveLeft(steps) => write!(f, "movel {steps}"),
            Instruction::Halt => write!(f, "halt"),
        }
    }
}

/// What happens after a command's instructions have run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    /// Continue in the state with this index. An index past the last state halts the machine.
    Continue(usize),
    /// Stop the machine.
    Halt,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Continue(state) => write!(f, "goto {state}"),
            Transition::Halt => write!(f, "halt"),
        }
    }
}

/// The rule that fires when a state reads its condition symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// The symbol under the head that selects this command.
    pub condition: Symbol,
    /// Instructions executed in order when the command fires.
    pub instructions: Vec<Instruction>,
    /// The state to continue in once the instructions have run.
    pub transition: Transition,
}

impl fmt::Display for Command {
    /// Formats the command in source form, e.g. `if 3 write 9 goto 2`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "if {}", self.condition)?;
        for instruction in &self.instructions {
            write!(f, " {instruction}")?;
        }
        match self.transition {
            // A halting command already lists its `halt` among the instructions.
            Transition::Halt if self.instructions.contains(&Instruction::Halt) => Ok(()),
            transition => write!(f, " {transition}"),
        }
    }
}

/// A group of commands keyed by their condition symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    commands: HashMap<Symbol, Command>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a command, replacing any command with the same condition.
    ///
    /// Returns the replaced command, if there was one.
    pub fn insert(&mut self, command: Command) -> Option<Command> {
        self.commands.insert(command.condition, command)
    }

    /// Returns the command that fires on `symbol`.
    pub fn command(&self, symbol: Symbol) -> Option<&Command> {
        self.commands.get(&symbol)
    }

    /// Returns the commands of this state ordered by condition.
    pub fn commands(&self) -> Vec<&Command> {
        let mut commands: Vec<&Command> = self.commands.values().collect();
        commands.sort_by_key(|command| command.condition);
        commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl FromIterator<Command> for State {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        let mut state = State::new();
        for command in iter {
            state.insert(command);
        }
        state
    }
}

/// A compiled program: an ordered list of states, where a state's index is its identifier.
///
/// An `Algorithm` cannot be modified once built and can be shared by any number of
/// machine runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Algorithm {
    states: Vec<State>,
}

impl Algorithm {
    pub fn new(states: Vec<State>) -> Self {
        Self { states }
    }

    /// Returns the state with the given index.
    pub fn state(&self, index: usize) -> Option<&State> {
        self.states.get(index)
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Returns the number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Returns the total number of commands across all states.
    pub fn command_count(&self) -> usize {
        self.states.iter().map(State::len).sum()
    }
}

/// Where in the source text a word was found (both 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Why a word was rejected by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyntaxReason {
    #[error("is not an instruction")]
    UnknownWord,
    #[error("requires an operand")]
    MissingOperand,
    #[error("is a misplaced operand")]
    MisplacedOperand,
    #[error("cannot take a negative operand")]
    NegativeOperand,
    #[error("is out of the supported operand range")]
    OperandOutOfRange,
}

/// A word of the source text that does not fit the instruction language.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{word}' {reason} at {location}")]
pub struct SyntaxError {
    pub word: String,
    pub reason: SyntaxReason,
    pub location: Location,
}

/// Why a token sequence does not form a valid command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("missing 'if' condition")]
    MissingCondition,
    #[error("more than one condition: 'if {0}' and 'if {1}'")]
    DuplicateCondition(Symbol, Symbol),
    #[error("missing 'goto' or 'halt' terminator")]
    MissingTerminator,
    #[error("more than one terminator: '{0}' and '{1}'")]
    DuplicateTerminator(Transition, Transition),
    #[error("operand {0} does not belong to any instruction")]
    StrayOperand(i64),
    #[error("'{0}' is not allowed in inline instruction text")]
    UnexpectedControl(Token),
}

/// Represents the errors that can occur while compiling or running a program.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SanaeError {
    /// A word could not be tokenized.
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    /// A line tokenized cleanly but is not a well-formed command.
    #[error("Invalid command on line {line}: {source}")]
    InvalidCommand { line: usize, source: CommandError },
    /// A machine was given a tape with no cells.
    #[error("Tape is empty: the head has no cell to read")]
    EmptyTape,
    /// The grammar rejected the input.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// A program source exceeded `MAX_PROGRAM_SIZE`.
    #[error("Program is too large: {0} bytes (limit is {})", MAX_PROGRAM_SIZE)]
    ProgramTooLarge(usize),
    /// Reading program files failed.
    #[error("File error: {0}")]
    FileError(String),
    /// No embedded program matches the requested name or index.
    #[error("Unknown program: {0}")]
    UnknownProgram(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(condition: Symbol, transition: Transition) -> Command {
        Command {
            condition,
            instructions: vec![Instruction::Write(condition + 1)],
            transition,
        }
    }

    #[test]
    fn test_instruction_serialization() {
        let write = Instruction::Write(-3);
        let json = serde_json::to_string(&write).unwrap();
        assert_eq!(json, "{\"Write\":-3}");

        let halt_json = serde_json::to_string(&Instruction::Halt).unwrap();
        assert_eq!(halt_json, "\"Halt\"");

        let deserialized: Instruction = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, write);
    }

    #[test]
    fn test_algorithm_json_preserves_states() {
        let algorithm = Algorithm::new(vec![
            [command(1, Transition::Continue(1))].into_iter().collect(),
            [command(-2, Transition::Halt)].into_iter().collect(),
        ]);

        let json = serde_json::to_string(&algorithm).unwrap();
        let restored: Algorithm = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, algorithm);
    }

    #[test]
    fn test_state_last_write_wins() {
        let mut state = State::new();
        assert!(state.insert(command(1, Transition::Continue(0))).is_none());

        let replaced = state.insert(command(1, Transition::Halt));

        assert_eq!(replaced.unwrap().transition, Transition::Continue(0));
        assert_eq!(state.len(), 1);
        assert_eq!(state.command(1).unwrap().transition, Transition::Halt);
    }

    #[test]
    fn test_state_commands_are_sorted() {
        let state: State = [
            command(5, Transition::Halt),
            command(-1, Transition::Halt),
            command(2, Transition::Halt),
        ]
        .into_iter()
        .collect();

        let conditions: Vec<Symbol> = state.commands().iter().map(|c| c.condition).collect();
        assert_eq!(conditions, vec![-1, 2, 5]);
    }

    #[test]
    fn test_command_display() {
        let command = Command {
            condition: 3,
            instructions: vec![Instruction::Write(9), Instruction::MoveLeft(2)],
            transition: Transition::Continue(2),
        };
        assert_eq!(command.to_string(), "if 3 write 9 movel 2 goto 2");

        let halting = Command {
            condition: 0,
            instructions: vec![Instruction::Erase, Instruction::Halt],
            transition: Transition::Halt,
        };
        assert_eq!(halting.to_string(), "if 0 erase halt");
    }

    #[test]
    fn test_token_instruction() {
        assert_eq!(Token::Write(4).instruction(), Some(Instruction::Write(4)));
        assert_eq!(Token::Halt.instruction(), Some(Instruction::Halt));
        assert_eq!(Token::If(4).instruction(), None);
        assert_eq!(Token::Goto(1).instruction(), None);
        assert_eq!(Token::Operand(7).instruction(), None);
    }

    #[test]
    fn test_error_display() {
        let error = SanaeError::from(SyntaxError {
            word: "jump".to_string(),
            reason: SyntaxReason::UnknownWord,
            location: Location { line: 2, column: 7 },
        });

        let error_msg = format!("{}", error);
        assert_eq!(
            error_msg,
            "Syntax error: 'jump' is not an instruction at line 2, column 7"
        );

        let error = SanaeError::InvalidCommand {
            line: 4,
            source: CommandError::MissingTerminator,
        };
        assert!(error.to_string().contains("line 4"));
        assert!(error.to_string().contains("'goto' or 'halt'"));
    }
}
