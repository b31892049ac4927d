//! # Process launcher.
//!
//! Spawns a command into a chosen process group with chosen standard I/O,
//! and classifies launch failures. The launcher never waits on the child:
//! harvesting termination statuses is the reaper's monopoly, and a dropped
//! [`std::process::Child`] neither kills nor reaps.

use std::process::{Child, Command, Stdio};

use nix::unistd::Pid;

use crate::error::SpawnError;

/// Where the child lands in the process-group topology.
#[derive(Debug, Clone, Copy)]
pub enum ProcessGroup {
    /// A fresh group whose id equals the child's pid.
    New,
    /// Join an existing group (the primary's, for services).
    Join(Pid),
}

/// The three standard streams handed to the child.
pub struct ChildIo {
    pub stdin: Stdio,
    pub stdout: Stdio,
    pub stderr: Stdio,
}

impl ChildIo {
    /// Share the supervisor's own streams. Used for the primary command.
    pub fn inherit() -> Self {
        Self {
            stdin: Stdio::inherit(),
            stdout: Stdio::inherit(),
            stderr: Stdio::inherit(),
        }
    }

    /// Discard everything. Used for services without output capture.
    pub fn null() -> Self {
        Self {
            stdin: Stdio::null(),
            stdout: Stdio::null(),
            stderr: Stdio::null(),
        }
    }

    /// Pipe stdout/stderr back to the supervisor. Used for captured services.
    pub fn capture() -> Self {
        Self {
            stdin: Stdio::null(),
            stdout: Stdio::piped(),
            stderr: Stdio::piped(),
        }
    }
}

/// Launches `argv` into the requested process group.
///
/// On success the caller owns the [`Child`] only to read its pid and take
/// any capture pipes; the status is left for the wait-any reaper.
pub fn spawn(argv: &[String], group: ProcessGroup, io: ChildIo) -> Result<Child, SpawnError> {
    use std::os::unix::process::CommandExt;

    let mut cmd = Command::new(&argv[0]);
    cmd.args(&argv[1..])
        .process_group(match group {
            ProcessGroup::New => 0,
            ProcessGroup::Join(pgid) => pgid.as_raw(),
        })
        .stdin(io.stdin)
        .stdout(io.stdout)
        .stderr(io.stderr);

    cmd.spawn().map_err(|e| SpawnError::classify(&argv[0], e))
}

/// The pid of a freshly spawned child.
pub(crate) fn child_pid(child: &Child) -> Pid {
    Pid::from_raw(child.id() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    use nix::sys::wait::{waitpid, WaitStatus};
    use nix::unistd::getpgid;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn spawn_creates_own_group() {
        let child = spawn(&args(&["sleep", "0.2"]), ProcessGroup::New, ChildIo::null()).unwrap();
        let pid = child_pid(&child);

        assert_eq!(getpgid(Some(pid)).unwrap(), pid);
        assert_eq!(waitpid(pid, None).unwrap(), WaitStatus::Exited(pid, 0));
    }

    #[test]
    fn spawn_joins_existing_group() {
        let leader = spawn(&args(&["sleep", "0.3"]), ProcessGroup::New, ChildIo::null()).unwrap();
        let leader_pid = child_pid(&leader);

        let member = spawn(
            &args(&["sleep", "0.1"]),
            ProcessGroup::Join(leader_pid),
            ChildIo::null(),
        )
        .unwrap();
        let member_pid = child_pid(&member);

        assert_eq!(getpgid(Some(member_pid)).unwrap(), leader_pid);

        waitpid(member_pid, None).unwrap();
        waitpid(leader_pid, None).unwrap();
    }

    #[test]
    fn missing_binary_is_not_found() {
        let err = spawn(
            &args(&["/no/such/binary"]),
            ProcessGroup::New,
            ChildIo::null(),
        )
        .unwrap_err();
        assert!(matches!(err, SpawnError::NotFound { .. }));
        assert_eq!(err.exit_code(), 127);
    }
}
