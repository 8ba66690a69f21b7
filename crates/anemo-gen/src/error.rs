//! Environment errors from the build tail of the pipeline.

use std::io;
use thiserror::Error;

/// A failure while turning emitted assembly into an executable.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The child process could not be spawned at all.
    #[error("cannot run '{command}'")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The system assembler exited unsuccessfully.
    #[error("assembler failed: {command}")]
    AssemblerFailed { command: String },

    /// The system linker exited unsuccessfully.
    #[error("linker failed: {command}")]
    LinkerFailed { command: String },
}
