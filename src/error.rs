//! # Error types used by the pid1 supervisor.
//!
//! This module defines two main error enums:
//!
//! - [`BootError`] errors raised before or while bringing the process tree up.
//! - [`SpawnError`] classified process launch failures.
//!
//! Both types provide an `exit_code` method mapping the error onto the
//! process exit status the supervisor reports for it.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// # Errors produced while booting the supervisor.
///
/// Every boot error short-circuits the run: either nothing has been launched
/// yet, or (for a primary launch failure) the launch itself failed.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BootError {
    /// No primary command was given on the command line.
    #[error("no command provided")]
    NoCommand,

    /// The services config file named by the environment could not be read.
    #[error("failed to load services config '{}': {source}", .path.display())]
    ConfigRead {
        /// Path taken from the environment variable.
        path: PathBuf,
        source: io::Error,
    },

    /// The services config file is not valid TOML for the expected schema.
    #[error("failed to parse services config '{}': {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A critical service may not also be restartable.
    #[error("critical service '{name}' cannot have an auto_restart policy")]
    BadCriticalPolicy {
        /// The offending service name.
        name: String,
    },

    /// A declared service command does not resolve to an executable.
    #[error("service '{name}' command '{command}' is not executable")]
    ServiceNotExecutable { name: String, command: String },

    /// The platform refused to mark this process as child subreaper.
    #[error("failed to register as child subreaper: {0}")]
    Subreaper(nix::errno::Errno),

    /// The runtime could not register the SIGCHLD listener the reaper needs.
    #[error("failed to subscribe to SIGCHLD: {0}")]
    Signals(io::Error),

    /// Launching the primary command failed.
    #[error("failed to spawn main process: {0}")]
    Spawn(#[from] SpawnError),
}

impl BootError {
    /// Returns the process exit code the supervisor reports for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            BootError::Spawn(e) => e.exit_code(),
            _ => 1,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            BootError::NoCommand => "boot_no_command",
            BootError::ConfigRead { .. } => "boot_config_read",
            BootError::ConfigParse { .. } => "boot_config_parse",
            BootError::BadCriticalPolicy { .. } => "boot_bad_critical_policy",
            BootError::ServiceNotExecutable { .. } => "boot_service_not_executable",
            BootError::Subreaper(_) => "boot_subreaper",
            BootError::Signals(_) => "boot_signals",
            BootError::Spawn(_) => "boot_spawn",
        }
    }
}

/// # Classified process launch failures.
///
/// The first two variants map onto the conventional shell exit code 127
/// (command not runnable); everything else is reported as 1.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SpawnError {
    /// The executable does not exist.
    #[error("failed to exec '{command}': {source}")]
    NotFound { command: String, source: io::Error },

    /// The file exists but is not executable.
    #[error("failed to exec '{command}': {source}")]
    PermissionDenied { command: String, source: io::Error },

    /// Any other launch failure.
    #[error("failed to exec '{command}': {source}")]
    Other { command: String, source: io::Error },
}

impl SpawnError {
    /// Classifies an [`io::Error`] returned by a spawn attempt.
    pub fn classify(command: &str, source: io::Error) -> Self {
        let command = command.to_string();
        match source.kind() {
            io::ErrorKind::NotFound => SpawnError::NotFound { command, source },
            io::ErrorKind::PermissionDenied => SpawnError::PermissionDenied { command, source },
            _ => SpawnError::Other { command, source },
        }
    }

    /// Returns the process exit code the supervisor reports for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            SpawnError::NotFound { .. } | SpawnError::PermissionDenied { .. } => 127,
            SpawnError::Other { .. } => 1,
        }
    }
}
