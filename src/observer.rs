use crate::event::{Event, EventKind};
use async_trait::async_trait;

/// Hook into supervision lifecycle events.
#[async_trait]
pub trait Observer {
    async fn on_event(&self, event: &Event);
}

/// Base observer that writes events to stderr.
///
/// Diagnostics are off by default; the binary enables them behind its
/// `--debug` flag so container logs stay clean.
pub struct LogWriter {
    enabled: bool,
}

impl LogWriter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl Observer for LogWriter {
    async fn on_event(&self, e: &Event) {
        if !self.enabled {
            return;
        }
        match e.kind {
            EventKind::PrimarySpawned => {
                eprintln!("[primary-spawned] pid={:?}", e.pid);
            }
            EventKind::PrimaryExited => {
                eprintln!("[primary-exited] pid={:?} code={:?}", e.pid, e.code);
            }
            EventKind::ProcessReaped => {
                eprintln!("[reaped] pid={:?} code={:?}", e.pid, e.code);
            }
            EventKind::ServiceStarting => {
                if let (Some(svc), Some(att)) = (&e.service, e.attempt) {
                    eprintln!("[starting] service={svc} attempt={att}");
                }
            }
            EventKind::ServiceSpawnFailed => {
                eprintln!(
                    "[spawn-failed] service={:?} err={:?} attempt={:?}",
                    e.service, e.error, e.attempt
                );
            }
            EventKind::ServiceExited => {
                eprintln!("[exited] service={:?} pid={:?}", e.service, e.pid);
            }
            EventKind::ShutdownRequested => {
                eprintln!("[shutdown-requested] service={:?}", e.service);
            }
            EventKind::GraceExpired => {
                eprintln!("[grace-expired]");
            }
        }
    }
}
