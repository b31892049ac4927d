use std::time::SystemTime;

/// Lifecycle moments published on the [`Bus`](crate::bus::Bus).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The primary command was launched.
    PrimarySpawned,
    /// The primary's termination status was harvested.
    PrimaryExited,
    /// Any descendant's termination status was harvested.
    ProcessReaped,
    /// A service (re)launch attempt is starting.
    ServiceStarting,
    /// A service launch attempt failed.
    ServiceSpawnFailed,
    /// A service process was observed to have exited.
    ServiceExited,
    /// Supervisor shutdown was requested.
    ShutdownRequested,
    /// The shutdown grace period elapsed; the group is being killed.
    GraceExpired,
}

/// A single supervision event with optional context fields.
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub at: SystemTime,
    pub service: Option<String>,
    pub pid: Option<i32>,
    pub attempt: Option<u64>,
    pub code: Option<i32>,
    pub error: Option<String>,
}

impl Event {
    pub fn now(kind: EventKind) -> Self {
        Self {
            kind,
            at: SystemTime::now(),
            service: None,
            pid: None,
            attempt: None,
            code: None,
            error: None,
        }
    }

    pub fn with_service(mut self, name: impl Into<String>) -> Self {
        self.service = Some(name.into());
        self
    }

    pub fn with_pid(mut self, pid: i32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn with_attempt(mut self, n: u64) -> Self {
        self.attempt = Some(n);
        self
    }

    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_error(mut self, msg: impl Into<String>) -> Self {
        self.error = Some(msg.into());
        self
    }
}
