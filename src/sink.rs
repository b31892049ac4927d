//! # Output sinks and line-prefixed capture.
//!
//! Captured service output lands in the supervisor's shared byte sinks,
//! optionally wrapped in a [`PrefixWriter`] that tags every line with the
//! service name. Multiple pumps may write concurrently; each complete line
//! is written in a single call, so interleaving stays at line granularity.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// A byte sink shared between the supervisor and its output pumps.
pub type SharedSink = Arc<Mutex<dyn Write + Send>>;

/// The supervisor's stdout/stderr sinks.
#[derive(Clone)]
pub struct Sinks {
    pub stdout: SharedSink,
    pub stderr: SharedSink,
}

impl Sinks {
    /// The process's own standard streams.
    pub fn stdio() -> Self {
        Self {
            stdout: Arc::new(Mutex::new(io::stdout())),
            stderr: Arc::new(Mutex::new(io::stderr())),
        }
    }
}

/// `Write` adapter that locks a [`SharedSink`] per call.
pub(crate) struct SinkWriter(pub SharedSink);

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.lock().unwrap().flush()
    }
}

/// A writer that emits `"[" + name + "] " + line + "\n"` per complete line.
///
/// Input is buffered until a newline arrives; a trailing partial line is
/// held until the next write or emitted (with its prefix) at flush, so no
/// line ever reaches the wrapped sink unprefixed.
pub struct PrefixWriter<W: Write> {
    prefix: String,
    inner: W,
    carry: Vec<u8>,
}

impl<W: Write> PrefixWriter<W> {
    pub fn new(name: &str, inner: W) -> Self {
        Self {
            prefix: format!("[{name}] "),
            inner,
            carry: Vec::new(),
        }
    }

    fn emit(&mut self, line: &[u8]) -> io::Result<()> {
        let mut out = Vec::with_capacity(self.prefix.len() + line.len() + 1);
        out.extend_from_slice(self.prefix.as_bytes());
        out.extend_from_slice(line);
        out.push(b'\n');
        // One call per line keeps concurrent writers line-atomic.
        self.inner.write_all(&out)
    }
}

impl<W: Write> Write for PrefixWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.carry.extend_from_slice(buf);

        while let Some(pos) = self.carry.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.carry.drain(..=pos).collect();
            self.emit(&line[..line.len() - 1])?;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.carry.is_empty() {
            let line = std::mem::take(&mut self.carry);
            self.emit(&line)?;
        }
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(writes: &[&str]) -> String {
        let mut out = Vec::new();
        let mut w = PrefixWriter::new("svc", &mut out);
        for chunk in writes {
            assert_eq!(w.write(chunk.as_bytes()).unwrap(), chunk.len());
        }
        w.flush().unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn prefixes_complete_lines() {
        assert_eq!(collect(&["hello\nworld\n"]), "[svc] hello\n[svc] world\n");
    }

    #[test]
    fn carries_partial_lines_across_writes() {
        assert_eq!(collect(&["hel", "lo\nwo", "rld\n"]), "[svc] hello\n[svc] world\n");
    }

    #[test]
    fn trailing_partial_is_flushed_with_prefix() {
        assert_eq!(collect(&["no newline"]), "[svc] no newline\n");
    }

    #[test]
    fn empty_lines_keep_their_prefix() {
        assert_eq!(collect(&["\n\n"]), "[svc] \n[svc] \n");
    }

    #[test]
    fn nothing_written_without_input() {
        assert_eq!(collect(&[]), "");
    }

    #[test]
    fn deferred_partial_not_emitted_before_flush() {
        let buf = Arc::new(Mutex::new(Vec::<u8>::new()));
        let sink: SharedSink = buf.clone();
        let mut w = PrefixWriter::new("svc", SinkWriter(sink));

        w.write(b"partial").unwrap();
        assert!(buf.lock().unwrap().is_empty());

        w.write(b" line\n").unwrap();
        assert_eq!(buf.lock().unwrap().as_slice(), &b"[svc] partial line\n"[..]);
    }
}
