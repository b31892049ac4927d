//! # Reaper and exit coordinator.
//!
//! The reaper is the sole authority on harvesting child terminations: the
//! primary, the services, and any orphan the subreaper adopted are all
//! collected here, which is what keeps the process table free of zombies.
//! It also owns the supervisor's exit code.
//!
//! The loop is driven by a SIGCHLD stream (registered before the primary is
//! spawned, so no death can be missed) and drains `waitpid(-1, WNOHANG)` on
//! every wakeup. A shutdown request interleaves the two-phase teardown:
//! SIGTERM to the primary group, the grace period, SIGKILL, and then a
//! final drain until no children remain.

use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use tokio::select;
use tokio::signal::unix::Signal as SignalStream;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::{
    bus::Bus,
    config::OrphanPolicy,
    event::{Event, EventKind},
    exits::ExitTable,
};

/// What one WNOHANG drain pass concluded.
#[derive(PartialEq)]
enum Drain {
    /// Children remain; keep waiting for the next SIGCHLD.
    More,
    /// `ECHILD`: nothing left to wait for.
    NoChildren,
}

pub(crate) struct Reaper {
    pub primary: Pid,
    pub policy: OrphanPolicy,
    pub grace: Duration,
    pub bus: Bus,
    pub exits: ExitTable,
    pub shutdown: CancellationToken,
}

impl Reaper {
    /// Runs until no children remain, returning the supervisor exit code:
    /// the primary's status when it was observed, 1 otherwise.
    pub async fn run(self, mut sigchld: SignalStream) -> i32 {
        let mut primary_exited = false;
        let mut exit_code = 0;
        let mut shutdown_armed = true;

        loop {
            select! {
                biased;

                _ = self.shutdown.cancelled(), if shutdown_armed => {
                    shutdown_armed = false;
                    let _ = killpg(self.primary, Signal::SIGTERM);
                    time::sleep(self.grace).await;
                    self.bus.publish(Event::now(EventKind::GraceExpired));
                    let _ = killpg(self.primary, Signal::SIGKILL);
                    // Fall through: keep draining until ECHILD so the
                    // primary's status (and every zombie) is collected.
                }

                _ = sigchld.recv() => {}
            }

            if self.drain(&mut primary_exited, &mut exit_code).await == Drain::NoChildren {
                break;
            }
        }

        if primary_exited {
            exit_code
        } else {
            1
        }
    }

    /// Harvests every already-terminated child without blocking.
    async fn drain(&self, primary_exited: &mut bool, exit_code: &mut i32) -> Drain {
        loop {
            match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => return Drain::More,
                Ok(status) => {
                    let Some((pid, code)) = status_code(&status) else {
                        continue;
                    };
                    self.reaped(pid, code, primary_exited, exit_code).await;
                }
                Err(Errno::ECHILD) => return Drain::NoChildren,
                Err(Errno::EINTR) => continue,
                Err(_) => return Drain::More,
            }
        }
    }

    async fn reaped(&self, pid: Pid, code: i32, primary_exited: &mut bool, exit_code: &mut i32) {
        self.bus.publish(
            Event::now(EventKind::ProcessReaped)
                .with_pid(pid.as_raw())
                .with_code(code),
        );
        self.exits.notify(pid.as_raw()).await;

        if pid != self.primary || *primary_exited {
            // Services, adopted orphans, reparented grandchildren: reaped to
            // prevent zombies, status dropped.
            return;
        }

        *primary_exited = true;
        *exit_code = code;
        self.bus.publish(
            Event::now(EventKind::PrimaryExited)
                .with_pid(pid.as_raw())
                .with_code(code),
        );

        if self.policy == OrphanPolicy::Kill {
            // Cascade: bring down the rest of the cohort now that the
            // primary is gone.
            let _ = killpg(self.primary, Signal::SIGTERM);
        }
    }
}

/// Maps a wait status onto (pid, supervisor exit code): the plain status for
/// a normal exit, `128 + signal` for a signal death. Other states (stopped,
/// continued, ptrace) carry no termination and yield nothing.
fn status_code(status: &WaitStatus) -> Option<(Pid, i32)> {
    match *status {
        WaitStatus::Exited(pid, code) => Some((pid, code)),
        WaitStatus::Signaled(pid, sig, _) => Some((pid, 128 + sig as i32)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_exit_passes_through() {
        let status = WaitStatus::Exited(Pid::from_raw(9), 32);
        assert_eq!(status_code(&status), Some((Pid::from_raw(9), 32)));
    }

    #[test]
    fn signal_death_maps_to_128_plus_signo() {
        let status = WaitStatus::Signaled(Pid::from_raw(9), Signal::SIGTERM, false);
        assert_eq!(status_code(&status), Some((Pid::from_raw(9), 143)));

        let status = WaitStatus::Signaled(Pid::from_raw(9), Signal::SIGKILL, false);
        assert_eq!(status_code(&status), Some((Pid::from_raw(9), 137)));
    }

    #[test]
    fn non_terminal_states_yield_nothing() {
        let status = WaitStatus::StillAlive;
        assert_eq!(status_code(&status), None);
    }
}
