use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::{
    actor::ServiceActor,
    bus::Bus,
    config::Config,
    error::BootError,
    event::{Event, EventKind},
    exits::ExitTable,
    observer::Observer,
    reaper::Reaper,
    signals::{self, SignalRx},
    sink::Sinks,
    spawn::{child_pid, spawn, ChildIo, ProcessGroup},
    subreaper,
};

/// The process-1 supervisor.
///
/// One instance runs one primary command to completion, together with the
/// declared auxiliary services, and yields the exit code the surrounding
/// process should report.
pub struct Supervisor<O: Observer + Send + Sync + 'static> {
    pub cfg: Config,
    pub sinks: Sinks,
    pub obs: Arc<O>,
    pub bus: Bus,
}

impl<O: Observer + Send + Sync + 'static> Supervisor<O> {
    pub fn new(cfg: Config, sinks: Sinks, observer: O) -> Self {
        Self {
            bus: Bus::new(cfg.bus_capacity),
            obs: Arc::new(observer),
            sinks,
            cfg,
        }
    }

    /// Runs `command` under supervision, feeding it every signal arriving on
    /// `signals`, until the whole descendant tree is gone.
    ///
    /// Boot failures return an error before anything was launched (except a
    /// failed primary launch itself); once the primary is up, the result is
    /// always its exit code.
    pub async fn run(&self, command: &[String], signals: SignalRx) -> Result<i32, BootError> {
        if command.is_empty() {
            return Err(BootError::NoCommand);
        }
        crate::services::validate(&self.cfg.services.services)?;

        subreaper::register()?;
        self.observer_listener();

        // Subscribed before the primary exists so no death can be missed.
        let sigchld = signal(SignalKind::child()).map_err(BootError::Signals)?;

        let child = spawn(command, ProcessGroup::New, ChildIo::inherit())?;
        let primary = child_pid(&child);
        drop(child);
        self.bus
            .publish(Event::now(EventKind::PrimarySpawned).with_pid(primary.as_raw()));

        let shutdown = CancellationToken::new();
        let exits = ExitTable::new();

        let mut actors = JoinSet::new();
        for spec in self.cfg.services.services.clone() {
            let actor = ServiceActor {
                spec,
                primary,
                bus: self.bus.clone(),
                exits: exits.clone(),
                sinks: self.sinks.clone(),
                shutdown: shutdown.clone(),
            };
            actors.spawn(actor.run(shutdown.child_token()));
        }

        tokio::spawn(signals::forward(signals, primary, self.sinks.stderr.clone()));

        let reaper = Reaper {
            primary,
            policy: self.cfg.orphan_policy,
            grace: self.cfg.grace,
            bus: self.bus.clone(),
            exits,
            shutdown: shutdown.clone(),
        };
        let code = reaper.run(sigchld).await;

        // Unblock any actor still waiting on an exit, then let the pumps
        // finish so captured output is complete before we report the code.
        shutdown.cancel();
        while actors.join_next().await.is_some() {}

        Ok(code)
    }

    fn observer_listener(&self) {
        let mut rx = self.bus.subscribe();
        let obs = self.obs.clone();

        tokio::spawn(async move {
            while let Ok(ev) = rx.recv().await {
                obs.on_event(&ev).await;
            }
        });
    }
}
