//! This module defines the `Machine` struct, which runs a compiled `Algorithm` against a
//! circular tape. It handles the head position, state fallthrough, instruction side
//! effects, and termination.

use crate::types::{Algorithm, Command, Instruction, SanaeError, Symbol, Tape, Transition};
use tracing::{debug, instrument, trace};

/// Represents the outcome of a machine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A command fired and the machine can keep going.
    Continue,
    /// The machine has stopped.
    Halt(Halt),
}

/// Why a machine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    /// A `halt` instruction was executed.
    Instruction,
    /// A command with a `halt` terminator finished its instructions.
    Transition,
    /// No state from the current one onwards has a command for the symbol under the
    /// head, or a `goto` pointed past the last state.
    Exhausted,
    /// `run` reached its step limit. The machine itself is not halted and can be resumed.
    StepLimit,
}

/// A single-tape machine executing an `Algorithm`.
///
/// The machine owns its tape and borrows the algorithm, so one algorithm can drive any
/// number of machines.
#[derive(Debug)]
pub struct Machine<'a> {
    algorithm: &'a Algorithm,
    tape: Tape,
    position: usize,
    state: usize,
    step_count: usize,
    halted: Option<Halt>,
}

impl<'a> Machine<'a> {
    /// Creates a new machine with the head on cell 0 and state 0 active.
    ///
    /// # Returns
    ///
    /// * `Ok(Machine)` ready to run.
    /// * `Err(SanaeError::EmptyTape)` if `tape` has no cells.
    pub fn new(tape: Tape, algorithm: &'a Algorithm) -> Result<Self, SanaeError> {
        if tape.is_empty() {
            return Err(SanaeError::EmptyTape);
        }

        Ok(Self {
            algorithm,
            tape,
            position: 0,
            state: 0,
            step_count: 0,
            halted: None,
        })
    }

    /// Fires at most one command.
    ///
    /// Starting at the current state, states without a command for the symbol under the
    /// head are skipped in program order. The first matching command runs its
    /// instructions and then moves the machine to its transition's state.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a command fired and the machine has somewhere to go.
    /// * `Step::Halt(_)` once the machine has stopped. Further calls return the same halt.
    pub fn step(&mut self) -> Step {
        if let Some(halt) = self.halted {
            return Step::Halt(halt);
        }

        let algorithm = self.algorithm;
        let Some(command) = self.find_command(algorithm) else {
            return self.halt(Halt::Exhausted);
        };

        trace!(
            state = self.state,
            position = self.position,
            symbol = command.condition,
            "command fired"
        );
        self.step_count += 1;

        for instruction in &command.instructions {
            if !self.apply(*instruction) {
                return self.halt(Halt::Instruction);
            }
        }

        match command.transition {
            Transition::Halt => self.halt(Halt::Transition),
            Transition::Continue(next) if next >= algorithm.len() => {
                self.state = next;
                self.halt(Halt::Exhausted)
            }
            Transition::Continue(next) => {
                self.state = next;
                Step::Continue
            }
        }
    }

    /// Runs the machine until it halts or `step_limit` commands have fired in total.
    ///
    /// Without a step limit the machine runs for as long as the algorithm does, which
    /// may be forever. A machine at its limit with no command left to fire reports
    /// `Halt::Exhausted`, since the fallthrough lookup does not count as a step.
    #[instrument(level = "debug", skip(self), fields(tape_len = self.tape.len()))]
    pub fn run(&mut self, step_limit: Option<usize>) -> Halt {
        loop {
            if self.halted.is_none() && step_limit.is_some_and(|limit| self.step_count >= limit) {
                let algorithm = self.algorithm;
                if self.find_command(algorithm).is_none() {
                    self.halt(Halt::Exhausted);
                    return Halt::Exhausted;
                }
                debug!(steps = self.step_count, "step limit reached");
                return Halt::StepLimit;
            }

            if let Step::Halt(halt) = self.step() {
                return halt;
            }
        }
    }

    /// Looks up the command for the symbol under the head, falling through to later
    /// states when the current one has none. Leaves `state` on the matching state.
    fn find_command(&mut self, algorithm: &'a Algorithm) -> Option<&'a Command> {
        let symbol = self.symbol();

        while let Some(state) = algorithm.state(self.state) {
            if let Some(command) = state.command(symbol) {
                return Some(command);
            }
            self.state += 1;
        }

        None
    }

    /// Applies a single instruction. Returns `false` when the instruction halts the machine.
    fn apply(&mut self, instruction: Instruction) -> bool {
        let len = self.tape.len();

        match instruction {
            Instruction::Erase => self.tape[self.position] = 0,
            Instruction::Write(value) => self.tape[self.position] = value,
            Instruction::MoveRight(steps) => {
                self.position = (self.position + steps % len) % len;
            }
            Instruction::MoveLeft(steps) => {
                self.position = (self.position + len - steps % len) % len;
            }
            Instruction::Halt => return false,
        }

        true
    }

    fn halt(&mut self, halt: Halt) -> Step {
        debug!(
            ?halt,
            state = self.state,
            position = self.position,
            steps = self.step_count,
            "machine halted"
        );
        self.halted = Some(halt);
        Step::Halt(halt)
    }

    /// Returns the symbol under the head.
    pub fn symbol(&self) -> Symbol {
        self.tape[self.position]
    }

    /// Returns the index of the current state.
    pub fn state(&self) -> usize {
        self.state
    }

    /// Returns the head position, always in `[0, tape length)`.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn tape(&self) -> &[Symbol] {
        &self.tape
    }

    /// Consumes the machine and returns its tape.
    pub fn into_tape(self) -> Tape {
        self.tape
    }

    /// Returns the number of commands fired so far.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    pub fn algorithm(&self) -> &'a Algorithm {
        self.algorithm
    }
}

/// Runs `algorithm` against `tape` and returns the final tape contents.
///
/// The tape is consumed and returned rather than modified in place. Reaching
/// `step_limit` is not an error: the tape is returned as it stands at that point.
///
/// # Returns
///
/// * `Ok(Tape)` with the final tape.
/// * `Err(SanaeError::EmptyTape)` if `tape` has no cells. Nothing is executed in that case.
pub fn run(
    tape: Tape,
    algorithm: &Algorithm,
    step_limit: Option<usize>,
) -> Result<Tape, SanaeError> {
    let mut machine = Machine::new(tape, algorithm)?;
    machine.run(step_limit);
    Ok(machine.into_tape())
}
