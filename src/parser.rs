//! This module assembles program source into an `Algorithm`.
//!
//! Each non-blank line of the source is one command. A blank line closes the current
//! state and starts the next one, so the first block of commands is state 0, the
//! second block state 1, and so on.

use crate::builder::compile_line;
use crate::types::{Algorithm, Command, SanaeError, State};
use tracing::debug;

/// Parses the given program source into an `Algorithm`.
///
/// Every blank line begins a new state, so two blank lines in a row leave an empty
/// state in between. `goto` targets are not checked against the number of states:
/// jumping past the last state halts the machine at run time.
///
/// # Arguments
///
/// * `input` - A string slice containing the program source.
///
/// # Returns
///
/// * `Ok(Algorithm)` if every line is a valid command.
/// * `Err(SanaeError::Syntax)` if a line contains a word outside the language.
/// * `Err(SanaeError::InvalidCommand)` if a line lacks exactly one condition or terminator.
pub fn parse(input: &str) -> Result<Algorithm, SanaeError> {
    let mut builder = AlgorithmBuilder::new();

    for (index, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            builder.next_state();
            continue;
        }

        builder.command(compile_line(line, index + 1)?);
    }

    let algorithm = builder.build();
    debug!(
        states = algorithm.len(),
        commands = algorithm.command_count(),
        "algorithm assembled"
    );

    Ok(algorithm)
}

/// Collects commands into states and states into an `Algorithm`.
///
/// ```
/// use sanae::parser::AlgorithmBuilder;
/// use sanae::types::{Command, Transition};
///
/// let mut builder = AlgorithmBuilder::new();
/// builder
///     .command(Command::inline(1, "write 2 mover", Transition::Continue(1)).unwrap())
///     .next_state()
///     .command(Command::inline(2, "write 4", Transition::Halt).unwrap());
///
/// let algorithm = builder.build();
/// assert_eq!(algorithm.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct AlgorithmBuilder {
    states: Vec<State>,
    current: State,
}

impl AlgorithmBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a command to the current state. A command with the same condition
    /// already in the state is replaced.
    pub fn command(&mut self, command: Command) -> &mut Self {
        let state = self.states.len();
        if let Some(replaced) = self.current.insert(command) {
            debug!(state, condition = replaced.condition, "command replaced");
        }
        self
    }

    /// Closes the current state and starts a new, empty one.
    pub fn next_state(&mut self) -> &mut Self {
        let finished = std::mem::take(&mut self.current);
        self.states.push(finished);
        self
    }

    /// Closes the current state and returns the finished algorithm.
    pub fn build(mut self) -> Algorithm {
        self.states.push(self.current);
        Algorithm::new(self.states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CommandError, Instruction, SyntaxReason, Transition};

    #[test]
    fn test_parse_simple_program() {
        let input = "if 1 write 2 mover 1 goto 1\n\nif 2 write 4 mover 1 goto 0\n";

        let algorithm = parse(input).unwrap();

        assert_eq!(algorithm.len(), 2);
        let first = algorithm.state(0).unwrap().command(1).unwrap();
        assert_eq!(
            first.instructions,
            vec![Instruction::Write(2), Instruction::MoveRight(1)]
        );
        assert_eq!(first.transition, Transition::Continue(1));

        let second = algorithm.state(1).unwrap().command(2).unwrap();
        assert_eq!(second.transition, Transition::Continue(0));
    }

    #[test]
    fn test_parse_groups_lines_into_states() {
        let input = r#"if 1 write 2 goto 1
if 2 write 4 goto 1

if 2 write 4 halt
if 4 write 8 halt"#;

        let algorithm = parse(input).unwrap();

        assert_eq!(algorithm.len(), 2);
        assert_eq!(algorithm.state(0).unwrap().len(), 2);
        assert_eq!(algorithm.state(1).unwrap().len(), 2);
        assert_eq!(algorithm.command_count(), 4);
    }

    #[test]
    fn test_whitespace_only_line_separates_states() {
        let algorithm = parse("if 1 halt\n   \t\nif 2 halt").unwrap();
        assert_eq!(algorithm.len(), 2);
    }

    #[test]
    fn test_consecutive_blank_lines_leave_empty_states() {
        let algorithm = parse("if 1 goto 2\n\n\nif 2 halt").unwrap();

        assert_eq!(algorithm.len(), 3);
        assert!(algorithm.state(1).unwrap().is_empty());
        assert!(algorithm.state(2).unwrap().command(2).is_some());
    }

    #[test]
    fn test_trailing_newline_does_not_add_a_state() {
        assert_eq!(parse("if 1 halt\n").unwrap().len(), 1);
        assert_eq!(parse("if 1 halt\r\n").unwrap().len(), 1);
    }

    #[test]
    fn test_parse_empty_source() {
        let algorithm = parse("").unwrap();
        assert_eq!(algorithm.len(), 1);
        assert_eq!(algorithm.command_count(), 0);
    }

    #[test]
    fn test_parse_last_write_wins() {
        let algorithm = parse("if 1 write 5 halt\nif 1 write 6 goto 0").unwrap();
        let state = algorithm.state(0).unwrap();

        assert_eq!(state.len(), 1);
        assert_eq!(
            state.command(1).unwrap().instructions,
            vec![Instruction::Write(6)]
        );
    }

    #[test]
    fn test_goto_past_last_state_is_accepted() {
        let algorithm = parse("if 1 goto 42").unwrap();
        assert_eq!(
            algorithm.state(0).unwrap().command(1).unwrap().transition,
            Transition::Continue(42)
        );
    }

    #[test]
    fn test_parse_invalid_command_reports_line() {
        let error = parse("if 1 halt\n\nwrite 3 mover").unwrap_err();
        assert_eq!(
            error,
            SanaeError::InvalidCommand {
                line: 3,
                source: CommandError::MissingCondition,
            }
        );
        assert_eq!(
            error.to_string(),
            "Invalid command on line 3: missing 'if' condition"
        );
    }

    #[test]
    fn test_parse_syntax_error_reports_location() {
        let error = parse("if 1 halt\nif 2 write").unwrap_err();
        match error {
            SanaeError::Syntax(error) => {
                assert_eq!(error.word, "write");
                assert_eq!(error.reason, SyntaxReason::MissingOperand);
                assert_eq!(error.location.line, 2);
                assert_eq!(error.location.column, 6);
            }
            other => panic!("Expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_builder_matches_parser() {
        let mut builder = AlgorithmBuilder::new();
        builder
            .command(Command::inline(1, "write 2 mover 1", Transition::Continue(1)).unwrap())
            .next_state()
            .command(Command::inline(2, "write 4 mover 1", Transition::Continue(0)).unwrap());

        let parsed = parse("if 1 write 2 mover 1 goto 1\n\nif 2 write 4 mover 1 goto 0").unwrap();
        assert_eq!(builder.build(), parsed);
    }
}
