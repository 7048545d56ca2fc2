//! This module turns the tokens of one command into a validated `Command`.

use crate::lexer::{tokenize, tokenize_line};
use crate::types::{Command, CommandError, Instruction, SanaeError, Symbol, Token, Transition};

/// Builds a command from the tokens of one source line.
///
/// The tokens must contain exactly one `if` condition and exactly one terminator,
/// either `goto` or `halt`. Every other token becomes an instruction, in source order.
/// A `halt` terminator is kept among the instructions too, so anything written after
/// it never runs.
///
/// # Returns
///
/// * `Ok(Command)` if the tokens form a valid command.
/// * `Err(CommandError)` describing the missing or repeated part otherwise.
pub fn build_command(tokens: &[Token]) -> Result<Command, CommandError> {
    let mut condition: Option<Symbol> = None;
    let mut transition: Option<Transition> = None;
    let mut instructions = Vec::with_capacity(tokens.len());

    for &token in tokens {
        match token {
            Token::If(value) => match condition {
                Some(first) => return Err(CommandError::DuplicateCondition(first, value)),
                None => condition = Some(value),
            },
            Token::Goto(_) | Token::Halt => {
                let terminator = match token {
                    Token::Goto(state) => Transition::Continue(state),
                    _ => Transition::Halt,
                };
                if let Some(first) = transition {
                    return Err(CommandError::DuplicateTerminator(first, terminator));
                }
                transition = Some(terminator);
                if token == Token::Halt {
                    instructions.push(Instruction::Halt);
                }
            }
            Token::Operand(value) => return Err(CommandError::StrayOperand(value)),
            other => instructions.extend(other.instruction()),
        }
    }

    Ok(Command {
        condition: condition.ok_or(CommandError::MissingCondition)?,
        instructions,
        transition: transition.ok_or(CommandError::MissingTerminator)?,
    })
}

/// Tokenizes and builds a single command, reporting errors on source line 1.
pub fn compile_command(text: &str) -> Result<Command, SanaeError> {
    compile_line(text, 1)
}

/// Tokenizes and builds the command written on source line `line`.
pub(crate) fn compile_line(text: &str, line: usize) -> Result<Command, SanaeError> {
    let tokens = tokenize_line(text, line)?;
    build_command(&tokens).map_err(|source| SanaeError::InvalidCommand { line, source })
}

impl Command {
    /// Creates a command from bare instruction text and an externally chosen
    /// condition and transition.
    ///
    /// The text may contain any instructions, including `halt`, but no `if` or `goto`.
    pub fn inline(
        condition: Symbol,
        text: &str,
        transition: Transition,
    ) -> Result<Command, SanaeError> {
        let instructions = tokenize(text)?
            .into_iter()
            .map(|token| {
                token.instruction().ok_or_else(|| SanaeError::InvalidCommand {
                    line: 1,
                    source: match token {
                        Token::Operand(value) => CommandError::StrayOperand(value),
                        control => CommandError::UnexpectedControl(control),
                    },
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Command {
            condition,
            instructions,
            transition,
        })
    }
}
