use std::io::Read;
use std::process::Child;

use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::Pid;
use tokio::select;
use tokio::task::{self, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    bus::Bus,
    event::{Event, EventKind},
    exits::ExitTable,
    services::ServiceSpec,
    sink::{PrefixWriter, SharedSink, SinkWriter, Sinks},
    spawn::{child_pid, spawn, ChildIo, ProcessGroup},
};

/// Runs one auxiliary service for the lifetime of its policy.
///
/// The actor launches the service into the primary's process group, waits
/// for the reaper to observe its death, then applies the service policy:
/// critical services take the whole supervisor down, restartable services
/// relaunch, everything else simply ends the loop.
pub(crate) struct ServiceActor {
    pub spec: ServiceSpec,
    pub primary: Pid,
    pub bus: Bus,
    pub exits: ExitTable,
    pub sinks: Sinks,
    pub shutdown: CancellationToken,
}

impl ServiceActor {
    pub async fn run(self, token: CancellationToken) {
        let mut attempt: u64 = 0;
        let argv = self.spec.argv();

        loop {
            if token.is_cancelled() {
                break;
            }

            attempt += 1;
            self.bus.publish(
                Event::now(EventKind::ServiceStarting)
                    .with_service(&self.spec.name)
                    .with_attempt(attempt),
            );

            let io = if self.spec.capture_output {
                ChildIo::capture()
            } else {
                ChildIo::null()
            };

            let mut child = match spawn(&argv, ProcessGroup::Join(self.primary), io) {
                Ok(child) => child,
                Err(e) => {
                    self.bus.publish(
                        Event::now(EventKind::ServiceSpawnFailed)
                            .with_service(&self.spec.name)
                            .with_attempt(attempt)
                            .with_error(e.to_string()),
                    );
                    // Launch failure follows the same policy as an exit.
                    if self.apply_exit_policy() {
                        break;
                    }
                    // Relaunch is immediate (backoff is out of scope); keep
                    // the worker fair while the spawn keeps failing.
                    task::yield_now().await;
                    continue;
                }
            };

            let pid = child_pid(&child);
            let pumps = self.start_pumps(&mut child);
            drop(child);

            let exited = select! {
                _ = token.cancelled() => false,
                _ = self.exits.wait(pid.as_raw()) => true,
            };

            // Pipes hit EOF once the process is gone, so the pumps finish on
            // both branches: either the exit was observed, or shutdown has
            // already killed the group.
            for pump in pumps {
                let _ = pump.await;
            }

            if !exited {
                break;
            }

            self.bus.publish(
                Event::now(EventKind::ServiceExited)
                    .with_service(&self.spec.name)
                    .with_pid(pid.as_raw()),
            );

            if self.apply_exit_policy() {
                break;
            }
        }
    }

    /// Applies the critical/auto_restart policy after an exit (or a failed
    /// launch). Returns true when the loop should end.
    fn apply_exit_policy(&self) -> bool {
        if self.spec.critical {
            self.trigger_shutdown();
            return true;
        }
        !self.spec.auto_restart
    }

    /// A critical service died: signal the primary and its group, then flip
    /// the single-shot shutdown flag so the reaper starts the two-phase
    /// teardown.
    fn trigger_shutdown(&self) {
        self.bus
            .publish(Event::now(EventKind::ShutdownRequested).with_service(&self.spec.name));

        let _ = kill(self.primary, Signal::SIGTERM);
        let _ = killpg(self.primary, Signal::SIGTERM);
        self.shutdown.cancel();
    }

    fn start_pumps(&self, child: &mut Child) -> Vec<JoinHandle<()>> {
        let mut pumps = Vec::new();
        if !self.spec.capture_output {
            return pumps;
        }

        if let Some(stdout) = child.stdout.take() {
            pumps.push(pump(
                stdout,
                self.sinks.stdout.clone(),
                self.spec.capture_prefix.then(|| self.spec.name.clone()),
            ));
        }
        if let Some(stderr) = child.stderr.take() {
            pumps.push(pump(
                stderr,
                self.sinks.stderr.clone(),
                self.spec.capture_prefix.then(|| self.spec.name.clone()),
            ));
        }
        pumps
    }
}

/// Copies a capture pipe into a sink on the blocking pool, prefixing lines
/// when a service name is given. Sink errors end the pump; the service
/// itself is unaffected.
fn pump(reader: impl Read + Send + 'static, sink: SharedSink, prefix: Option<String>) -> JoinHandle<()> {
    task::spawn_blocking(move || {
        let mut reader = reader;
        match prefix {
            Some(name) => {
                let mut w = PrefixWriter::new(&name, SinkWriter(sink));
                let _ = std::io::copy(&mut reader, &mut w);
                let _ = std::io::Write::flush(&mut w);
            }
            None => {
                let mut w = SinkWriter(sink);
                let _ = std::io::copy(&mut reader, &mut w);
            }
        }
    })
}
