//! # OS signal subscription and forwarding.
//!
//! The supervisor subscribes to every signal it can catch and relays each
//! one to the primary command's process group, so from the outside the tree
//! behaves as if signals were delivered to the primary directly.
//!
//! Not subscribed:
//! - **SIGKILL** / **SIGSTOP**: cannot be caught.
//! - **SIGCHLD**: owned by the reaper; forwarding it to a process group
//!   carries no meaning, so it is dropped.
//! - Signals the runtime refuses to register (SIGILL, SIGFPE, SIGSEGV) are
//!   skipped at subscription time.
//!
//! The subscription side and the forwarding side meet over a plain mpsc
//! channel, which is also the seam tests use to inject signals without
//! raising them against the whole test process.

use std::io;

use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;

use crate::sink::{SharedSink, SinkWriter};

/// Receiving half of the signal feed consumed by the forwarder.
pub type SignalRx = mpsc::UnboundedReceiver<Signal>;

/// Subscribes to the full catchable signal set.
///
/// Each delivered signal is pushed onto the returned channel in arrival
/// order. The listeners live for the rest of the process.
pub fn subscribe_all() -> io::Result<SignalRx> {
    let (tx, rx) = mpsc::unbounded_channel();

    for sig in Signal::iterator() {
        if matches!(sig, Signal::SIGKILL | Signal::SIGSTOP | Signal::SIGCHLD) {
            continue;
        }
        let mut stream = match signal(SignalKind::from_raw(sig as i32)) {
            Ok(stream) => stream,
            Err(_) => continue,
        };

        let tx = tx.clone();
        tokio::spawn(async move {
            while stream.recv().await.is_some() {
                if tx.send(sig).is_err() {
                    break;
                }
            }
        });
    }

    Ok(rx)
}

/// Relays every received signal to the primary's process group.
///
/// A vanished group (`ESRCH`) is expected near the end of life and ignored;
/// any other send failure is reported on the supervisor's error sink. The
/// loop ends when the subscription side closes.
pub(crate) async fn forward(mut rx: SignalRx, primary: Pid, stderr: SharedSink) {
    use std::io::Write;

    while let Some(sig) = rx.recv().await {
        match killpg(primary, sig) {
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(e) => {
                let mut w = SinkWriter(stderr.clone());
                let _ = writeln!(w, "failed to forward signal {sig}: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use crate::spawn::{child_pid, spawn, ChildIo, ProcessGroup};
    use nix::sys::wait::{waitpid, WaitStatus};

    #[tokio::test]
    async fn forward_terminates_the_group() {
        let argv = vec!["sleep".to_string(), "5".to_string()];
        let child = spawn(&argv, ProcessGroup::New, ChildIo::null()).unwrap();
        let pid = child_pid(&child);

        let (tx, rx) = mpsc::unbounded_channel();
        let stderr: SharedSink = Arc::new(Mutex::new(Vec::<u8>::new()));
        let task = tokio::spawn(forward(rx, pid, stderr));

        tx.send(Signal::SIGTERM).unwrap();
        let status = tokio::task::spawn_blocking(move || waitpid(pid, None).unwrap())
            .await
            .unwrap();
        assert_eq!(status, WaitStatus::Signaled(pid, Signal::SIGTERM, false));

        drop(tx);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn vanished_group_is_tolerated() {
        let buf = Arc::new(Mutex::new(Vec::<u8>::new()));
        let stderr: SharedSink = buf.clone();

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(Signal::SIGTERM).unwrap();
        drop(tx);

        // A process group that does not exist: killpg returns ESRCH, which
        // must not reach the error sink.
        forward(rx, Pid::from_raw(0x3ffffe), stderr).await;
        assert!(buf.lock().unwrap().is_empty());
    }
}
