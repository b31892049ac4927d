//! # Auxiliary service declarations.
//!
//! Services run alongside the primary command, inside the primary's process
//! group, each governed by its own policy flags. They are declared in a TOML
//! file named by the `PID1_ADITIONAL_SERVICES` environment variable:
//!
//! ```toml
//! version = 1
//!
//! [[service]]
//! name = "metrics"
//! command = "sh"
//! args = ["-c", "exec metrics-agent --port 9100"]
//! auto_restart = true
//! capture_output = true
//! capture_prefix = true
//! ```
//!
//! [`validate`] runs before anything is launched: a critical service may not
//! be restartable, and every command must resolve to an executable. Either
//! violation aborts boot with nothing spawned.

use std::env;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::BootError;

/// Environment variable naming the services config file.
///
/// The spelling is historical and part of the deployment contract.
pub const SERVICES_ENV: &str = "PID1_ADITIONAL_SERVICES";

/// The full declared service set, as loaded from disk.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ServicesConfig {
    /// Config format version. Preserved for tooling; not interpreted here.
    #[serde(default)]
    pub version: i64,
    /// Declared services, in file order.
    #[serde(default, rename = "service")]
    pub services: Vec<ServiceSpec>,
}

/// One declared auxiliary service. Immutable once loaded.
#[derive(Clone, Debug, Deserialize)]
pub struct ServiceSpec {
    /// Human-readable identifier; doubles as the output prefix.
    pub name: String,
    /// Executable path, or a bare name resolved against `PATH`.
    pub command: String,
    /// Arguments passed to the command.
    #[serde(default)]
    pub args: Vec<String>,
    /// Relaunch the service whenever it exits.
    #[serde(default)]
    pub auto_restart: bool,
    /// Termination of this service shuts the whole supervisor down.
    #[serde(default)]
    pub critical: bool,
    /// Redirect the service's stdout/stderr into the supervisor's sinks.
    #[serde(default)]
    pub capture_output: bool,
    /// Prefix each captured line with `[name] `.
    #[serde(default)]
    pub capture_prefix: bool,
}

impl ServiceSpec {
    /// Full argv for the launcher.
    pub(crate) fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(1 + self.args.len());
        argv.push(self.command.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }
}

/// Loads the service set named by [`SERVICES_ENV`].
///
/// Returns the default (empty) set when the variable is unset or empty.
pub fn load_from_env() -> Result<ServicesConfig, BootError> {
    match env::var(SERVICES_ENV) {
        Ok(path) if !path.is_empty() => load_file(Path::new(&path)),
        _ => Ok(ServicesConfig::default()),
    }
}

/// Loads and parses a service set from the given path.
pub fn load_file(path: &Path) -> Result<ServicesConfig, BootError> {
    let raw = fs::read_to_string(path).map_err(|source| BootError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&raw).map_err(|source| BootError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Boot-time validation, in configuration order.
///
/// Runs before any process is launched so that a rejected configuration
/// leaves nothing behind to clean up.
pub(crate) fn validate(services: &[ServiceSpec]) -> Result<(), BootError> {
    for svc in services {
        if svc.critical && svc.auto_restart {
            return Err(BootError::BadCriticalPolicy {
                name: svc.name.clone(),
            });
        }
        if resolve_executable(&svc.command).is_none() {
            return Err(BootError::ServiceNotExecutable {
                name: svc.name.clone(),
                command: svc.command.clone(),
            });
        }
    }
    Ok(())
}

/// Resolves a command the way the launcher will: a name containing a path
/// separator is taken as-is, anything else is searched on `PATH`. Returns
/// the path only if it names an existing non-directory file with at least
/// one executable bit set.
pub(crate) fn resolve_executable(command: &str) -> Option<PathBuf> {
    if command.contains('/') {
        let path = PathBuf::from(command);
        return is_executable(&path).then_some(path);
    }

    let search = env::var_os("PATH")?;
    env::split_paths(&search)
        .map(|dir| dir.join(command))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) => !meta.is_dir() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}
