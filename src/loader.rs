//! This module provides the `ProgramLoader` struct, responsible for loading programs
//! from various sources, including files and strings.

use crate::parser::parse;
use crate::types::{Algorithm, SanaeError, MAX_PROGRAM_SIZE, PROGRAM_EXTENSION};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `ProgramLoader` is a utility struct for loading programs.
/// It provides methods to load programs from individual files, from string content,
/// and to discover and load all `.sasm` files within a specified directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single program from the specified file path.
    ///
    /// # Arguments
    ///
    /// * `path` - A reference to the `Path` of the `.sasm` file to load.
    ///
    /// # Returns
    ///
    /// * `Ok(Algorithm)` if the file is successfully read and parsed.
    /// * `Err(SanaeError::FileError)` if the file cannot be read.
    /// * `Err(SanaeError::ProgramTooLarge)` if the file exceeds `MAX_PROGRAM_SIZE`.
    /// * `Err(SanaeError::Syntax)` or `Err(SanaeError::InvalidCommand)` if the content is not
    ///   a valid program.
    pub fn load_program(path: &Path) -> Result<Algorithm, SanaeError> {
        let content = fs::read_to_string(path).map_err(|e| {
            SanaeError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), bytes = content.len(), "program read");
        Self::load_program_from_string(&content)
    }

    /// Loads a single program from the provided string content.
    ///
    /// This is useful for parsing programs that are not stored in files, e.g., from user input.
    pub fn load_program_from_string(content: &str) -> Result<Algorithm, SanaeError> {
        if content.len() > MAX_PROGRAM_SIZE {
            return Err(SanaeError::ProgramTooLarge(content.len()));
        }

        parse(content)
    }

    /// Loads all program files (`.sasm` extension) from a given directory.
    ///
    /// Directories and files with other extensions are skipped. Each remaining file
    /// yields one result, so a single broken program does not hide the others.
    ///
    /// # Returns
    ///
    /// * `Vec<Result<(PathBuf, Algorithm), SanaeError>>` - One entry per `.sasm` file, or a
    ///   single error if the directory itself cannot be read.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Algorithm), SanaeError>> {
        if !directory.exists() {
            return vec![Err(SanaeError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(SanaeError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(SanaeError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                if path.is_dir() || path.extension().is_none_or(|ext| ext != PROGRAM_EXTENSION) {
                    return None;
                }

                Some(Self::load_program(&path).map(|algorithm| (path, algorithm)))
            })
            .collect()
    }
}
