//! This module renders a compiled `Algorithm` back into program source.
//!
//! The output is canonical: commands within a state are ordered by condition, every
//! instruction carries an explicit operand, and each state boundary is a single blank
//! line. Parsing the output of an algorithm that was itself parsed from source yields
//! an equal algorithm; commands built with `Command::inline` come back behaving the same.
//! An algorithm with no states at all encodes to empty source, which parses to a single
//! empty state.

use crate::parser::parse;
use crate::types::{Algorithm, SanaeError, State};

/// Encodes an algorithm as line-oriented program source.
///
/// # Arguments
///
/// * `algorithm` - The `Algorithm` to encode.
///
/// # Returns
///
/// * `String` - The program source, one command per line.
pub fn encode(algorithm: &Algorithm) -> String {
    let mut lines = Vec::with_capacity(algorithm.command_count() + algorithm.len());

    for (index, state) in algorithm.states().iter().enumerate() {
        if index > 0 {
            lines.push(String::new());
        }
        lines.extend(state.commands().iter().map(|command| command.to_string()));
    }

    // A trailing empty state needs its blank line kept past the final newline.
    if algorithm.len() > 1 && algorithm.states().last().is_some_and(State::is_empty) {
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Decodes program source produced by `encode` (or written by hand).
pub fn decode(source: &str) -> Result<Algorithm, SanaeError> {
    parse(source)
}
