//! # pid1
//!
//! **pid1** is a minimal init for containers.
//!
//! It runs a user-supplied primary command as the root of a supervised
//! process tree: it registers itself as child subreaper, forwards every
//! catchable signal to the primary's process group, optionally runs a set
//! of declared auxiliary services alongside the primary, and reaps every
//! descendant so no zombie survives. When the primary terminates, the
//! supervisor exits with a matching status.
//!
//! ## Areas
//!
//! | Area               | Description                                                       | Key types                                   |
//! |--------------------|-------------------------------------------------------------------|---------------------------------------------|
//! | **Supervision**    | Run the primary, the services, and the reaper to completion.      | [`Supervisor`]                              |
//! | **Services**       | Declare auxiliary processes with restart/critical/capture policy. | [`ServiceSpec`], [`ServicesConfig`]         |
//! | **Signals**        | Subscribe to the catchable set and forward to the primary group.  | [`subscribe_all`]                           |
//! | **Output capture** | Route service output into shared sinks, line-prefixed.            | [`Sinks`], [`PrefixWriter`]                 |
//! | **Observer API**   | Hook into supervision lifecycle events.                           | [`Observer`], [`Event`], [`EventKind`]      |
//! | **Errors**         | Typed boot and launch errors carrying their process exit codes.   | [`BootError`], [`SpawnError`]               |
//! | **Configuration**  | Centralize runtime settings.                                      | [`Config`], [`OrphanPolicy`]                |
//!
//! ## Exit codes
//!
//! - `0..=255`: the primary's normal exit status
//! - `128 + N`: the primary was terminated by signal `N`
//! - `127`: the primary executable was missing or not executable
//! - `1`: option error, config error, subreaper failure, or abnormal shutdown
//!
//! ```no_run
//! use pid1::{Config, LogWriter, Sinks, Supervisor, subscribe_all};
//!
//! #[tokio::main]
//! async fn main() {
//!     let supervisor = Supervisor::new(Config::default(), Sinks::stdio(), LogWriter::new(false));
//!     let signals = subscribe_all().expect("signal subscription");
//!
//!     let command = vec!["sh".to_string(), "-c".to_string(), "exit 32".to_string()];
//!     let code = match supervisor.run(&command, signals).await {
//!         Ok(code) => code,
//!         Err(e) => {
//!             eprintln!("{e}");
//!             e.exit_code()
//!         }
//!     };
//!     std::process::exit(code);
//! }
//! ```

mod actor;
mod bus;
pub mod cli;
mod config;
mod error;
mod event;
mod exits;
mod observer;
mod reaper;
mod services;
mod signals;
mod sink;
mod spawn;
mod subreaper;
mod supervisor;

// ---- Public re-exports ----

/// The OS signal type flowing through [`SignalRx`].
pub use nix::sys::signal::Signal;

pub use config::{Config, OrphanPolicy};
pub use error::{BootError, SpawnError};
pub use event::{Event, EventKind};
pub use observer::{LogWriter, Observer};
pub use services::{load_from_env, ServiceSpec, ServicesConfig, SERVICES_ENV};
pub use signals::{subscribe_all, SignalRx};
pub use sink::{PrefixWriter, SharedSink, Sinks};
pub use spawn::{spawn, ChildIo, ProcessGroup};
pub use supervisor::Supervisor;
