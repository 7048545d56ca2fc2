//! This module holds the sample programs shipped with the crate, each paired with a tape
//! it is meant to run on.

use crate::parser::parse;
use crate::types::{Algorithm, SanaeError, Symbol, Tape};
use lazy_static::lazy_static;
use tracing::warn;

/// Source of an embedded program.
struct Embedded {
    name: &'static str,
    text: &'static str,
    tape: &'static [Symbol],
}

// Default embedded programs
const PROGRAM_TEXTS: [Embedded; 5] = [
    Embedded {
        name: "Binary increment",
        text: include_str!("../programs/binary-increment.sasm"),
        tape: &[1, 1, 0, 1, 0],
    },
    Embedded {
        name: "Erase run",
        text: include_str!("../programs/erase-run.sasm"),
        tape: &[5, 5, 5, 7],
    },
    Embedded {
        name: "Double scan",
        text: include_str!("../programs/double-scan.sasm"),
        tape: &[1, 2, 3, 4, 5, 6, 7],
    },
    Embedded {
        name: "Ping pong",
        text: include_str!("../programs/ping-pong.sasm"),
        tape: &[1, 2, 3, 4, 5, 6, 7],
    },
    Embedded {
        name: "Wrap around",
        text: include_str!("../programs/wrap-around.sasm"),
        tape: &[1, 2, 3, 4, 5, 6, 7],
    },
];

/// A named, compiled program together with its sample tape.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: String,
    pub text: &'static str,
    pub tape: Tape,
    pub algorithm: Algorithm,
}

lazy_static! {
    pub static ref PROGRAMS: Vec<Program> = PROGRAM_TEXTS
        .iter()
        .filter_map(|embedded| match parse(embedded.text) {
            Ok(algorithm) => Some(Program {
                name: embedded.name.to_string(),
                text: embedded.text,
                tape: embedded.tape.to_vec(),
                algorithm,
            }),
            Err(e) => {
                warn!(name = embedded.name, error = %e, "failed to parse embedded program");
                None
            }
        })
        .collect();
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<&'static Program, SanaeError> {
        PROGRAMS
            .get(index)
            .ok_or_else(|| SanaeError::UnknownProgram(format!("index {} out of range", index)))
    }

    /// Get a program by its name, ignoring case
    pub fn get_program_by_name(name: &str) -> Result<&'static Program, SanaeError> {
        PROGRAMS
            .iter()
            .find(|program| program.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| SanaeError::UnknownProgram(format!("'{}' not found", name)))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        PROGRAMS.iter().map(|program| program.name.clone()).collect()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, SanaeError> {
        let program = Self::get_program_by_index(index)?;

        Ok(ProgramInfo {
            index,
            name: program.name.clone(),
            tape: program.tape.clone(),
            state_count: program.algorithm.len(),
            command_count: program.algorithm.command_count(),
        })
    }

    /// Search for programs by name
    pub fn search_programs(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        PROGRAMS
            .iter()
            .enumerate()
            .filter(|(_, program)| program.name.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub tape: Tape,
    pub state_count: usize,
    pub command_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{Halt, Machine};

    const STEP_LIMIT: usize = 1_000;

    fn run_sample(name: &str) -> (Halt, Tape) {
        let program = ProgramManager::get_program_by_name(name).unwrap();
        let mut machine = Machine::new(program.tape.clone(), &program.algorithm).unwrap();
        let halt = machine.run(Some(STEP_LIMIT));
        (halt, machine.into_tape())
    }

    #[test]
    fn test_all_programs_are_valid() {
        assert_eq!(ProgramManager::get_program_count(), PROGRAM_TEXTS.len());
    }

    #[test]
    fn test_all_programs_halt() {
        for program in PROGRAMS.iter() {
            let mut machine = Machine::new(program.tape.clone(), &program.algorithm).unwrap();
            assert_ne!(
                machine.run(Some(STEP_LIMIT)),
                Halt::StepLimit,
                "Program '{}' did not halt",
                program.name
            );
        }
    }

    #[test]
    fn test_binary_increment() {
        // Least significant bit first: 11 + 1 = 12
        assert_eq!(
            run_sample("Binary increment"),
            (Halt::Instruction, vec![0, 0, 1, 1, 0])
        );
    }

    #[test]
    fn test_sample_outputs() {
        assert_eq!(run_sample("Erase run"), (Halt::Exhausted, vec![0, 0, 0, 7]));
        assert_eq!(
            run_sample("Double scan"),
            (Halt::Instruction, vec![2, 4, 3, 4, 5, 6, 7])
        );
        assert_eq!(
            run_sample("Ping pong"),
            (Halt::Exhausted, vec![2, 4, 3, 4, 5, 6, 7])
        );
        assert_eq!(
            run_sample("Wrap around"),
            (Halt::Instruction, vec![9, 2, 3, 4, 5, 0, 7])
        );
    }

    #[test]
    fn test_program_manager_get_program_by_index() {
        assert!(ProgramManager::get_program_by_index(0).is_ok());

        let result = ProgramManager::get_program_by_index(999);
        assert!(matches!(result, Err(SanaeError::UnknownProgram(_))));
    }

    #[test]
    fn test_program_manager_get_program_by_name() {
        let program = ProgramManager::get_program_by_name("erase RUN").unwrap();
        assert_eq!(program.tape, vec![5, 5, 5, 7]);

        let result = ProgramManager::get_program_by_name("Nonexistent");
        assert!(result.is_err());
    }

    #[test]
    fn test_program_manager_list_program_names() {
        let names = ProgramManager::list_program_names();
        assert_eq!(names.len(), PROGRAM_TEXTS.len());
        assert!(names.contains(&"Binary increment".to_string()));
        assert!(names.contains(&"Wrap around".to_string()));
    }

    #[test]
    fn test_program_manager_get_program_info() {
        let index = ProgramManager::search_programs("double")[0];
        let info = ProgramManager::get_program_info(index).unwrap();

        assert_eq!(info.index, index);
        assert_eq!(info.name, "Double scan");
        assert_eq!(info.state_count, 2);
        assert_eq!(info.command_count, 4);

        assert!(ProgramManager::get_program_info(999).is_err());
    }

    #[test]
    fn test_program_manager_search_programs() {
        assert_eq!(ProgramManager::search_programs("RUN").len(), 1);
        assert_eq!(ProgramManager::search_programs("a").len(), 4);
        assert!(ProgramManager::search_programs("nonexistent").is_empty());
    }
}
