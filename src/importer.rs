//! Import of a matched episode file into the media library
//!
//! The actual tagging and moving of the file is done by an external program,
//! usually an AppleScript run through `osascript`. It is invoked as
//!
//! ```text
//! <program> [leading args...] <file> <show> <season> <episode> <display title> <title card>
//! ```
//!
//! and exit code 0 means success.

use crate::tvdb::Episode;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

/// Name of the AppleScript that adds an episode to the library
pub const DEFAULT_IMPORT_SCRIPT: &str = "add_to_library_and_tag_tv_show.scpt";

/// Program the import script is run with by default
pub const DEFAULT_IMPORT_PROGRAM: &str = "osascript";

/// Errors that can occur while importing an episode
#[derive(Debug, Error)]
pub enum ImportError {
    /// The import program could not be started
    #[error("Failed to spawn import program {program}: {source}")]
    Spawn { program: PathBuf, source: io::Error },

    /// The import program exited unsuccessfully
    #[error(
        "Error adding {path} to library. rc: {code:?}, stdout: {stdout}, stderr: {stderr}"
    )]
    Failed {
        path: PathBuf,
        /// Exit code, `None` if the program was killed by a signal
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

/// Adds a matched episode file to the media library.
pub trait LibraryImporter {
    /// Imports `file` as `episode`, using `title_card` as artwork
    ///
    /// # Errors
    ///
    /// Returns an error if the import did not succeed. The caller treats this
    /// as fatal.
    fn import(&self, file: &Path, episode: &Episode, title_card: &Path)
    -> Result<(), ImportError>;
}

/// Positional arguments handed to the import program
pub fn import_arguments(file: &Path, episode: &Episode, title_card: &Path) -> Vec<OsString> {
    vec![
        file.as_os_str().to_os_string(),
        OsString::from(&episode.show_name),
        OsString::from(episode.season_number.to_string()),
        OsString::from(episode.episode_number.to_string()),
        OsString::from(episode.to_string()),
        title_card.as_os_str().to_os_string(),
    ]
}

/// Runs an external program for every import.
#[derive(Debug, Clone)]
pub struct ScriptImporter {
    program: PathBuf,
    /// Arguments placed before the episode arguments, e.g. the script path
    leading_args: Vec<OsString>,
}

impl ScriptImporter {
    /// Creates an importer running `program` with `leading_args` first
    pub fn new(program: impl Into<PathBuf>, leading_args: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            leading_args,
        }
    }

    /// The full command line for an import, program first
    pub fn command_line(&self, file: &Path, episode: &Episode, title_card: &Path) -> Vec<OsString> {
        let mut line = vec![self.program.as_os_str().to_os_string()];
        line.extend(self.leading_args.iter().cloned());
        line.extend(import_arguments(file, episode, title_card));
        line
    }
}

impl LibraryImporter for ScriptImporter {
    fn import(
        &self,
        file: &Path,
        episode: &Episode,
        title_card: &Path,
    ) -> Result<(), ImportError> {
        tracing::debug!(
            "running {:?}",
            self.command_line(file, episode, title_card)
        );

        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .args(import_arguments(file, episode, title_card))
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ImportError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ImportError::Failed {
                path: file.to_path_buf(),
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

/// Logs the command it would run and reports success.
#[derive(Debug, Clone)]
pub struct DryRunImporter {
    inner: ScriptImporter,
}

impl DryRunImporter {
    pub fn new(inner: ScriptImporter) -> Self {
        Self { inner }
    }
}

impl LibraryImporter for DryRunImporter {
    fn import(
        &self,
        file: &Path,
        episode: &Episode,
        title_card: &Path,
    ) -> Result<(), ImportError> {
        tracing::info!(
            "dry run, would run {:?}",
            self.inner.command_line(file, episode, title_card)
        );
        Ok(())
    }
}
