//! Shared helpers for the end-to-end supervisor tests.

use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::sync::{Arc, Mutex, MutexGuard};

use tempfile::TempDir;

use pid1::{SharedSink, Sinks};

/// The reaper's wait-any call must be the only harvester in the process, so
/// every test that runs a supervisor serializes on this lock.
static E2E_LOCK: Mutex<()> = Mutex::new(());

pub fn serial() -> MutexGuard<'static, ()> {
    E2E_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// A temp directory of executable fixture scripts.
pub struct Fixtures {
    dir: TempDir,
}

impl Fixtures {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("fixture dir"),
        }
    }

    /// Writes an executable shell script and returns its absolute path.
    pub fn script(&self, name: &str, body: &str) -> String {
        self.file(name, body, 0o755)
    }

    /// Writes a file with the given mode and returns its absolute path.
    pub fn file(&self, name: &str, body: &str, mode: u32) -> String {
        let path = self.dir.path().join(name);
        let mut f = fs::File::create(&path).expect("fixture file");
        f.write_all(body.as_bytes()).expect("fixture body");
        drop(f);
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).expect("fixture mode");
        path.to_str().expect("utf-8 path").to_string()
    }
}

/// Sinks backed by in-memory buffers, plus handles to read them back.
#[allow(dead_code)]
pub fn capture_sinks() -> (Sinks, Arc<Mutex<Vec<u8>>>, Arc<Mutex<Vec<u8>>>) {
    let out = Arc::new(Mutex::new(Vec::<u8>::new()));
    let err = Arc::new(Mutex::new(Vec::<u8>::new()));
    let stdout: SharedSink = out.clone();
    let stderr: SharedSink = err.clone();
    (Sinks { stdout, stderr }, out, err)
}

pub fn cmd(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// Scans `/proc` for a live process whose command line contains `needle`.
#[allow(dead_code)]
pub fn proc_running(needle: &str) -> bool {
    let entries = match fs::read_dir("/proc") {
        Ok(entries) => entries,
        Err(_) => return false,
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(pid) = name.to_str().filter(|n| n.chars().all(|c| c.is_ascii_digit())) else {
            continue;
        };
        let Ok(raw) = fs::read(format!("/proc/{pid}/cmdline")) else {
            continue;
        };
        let cmdline: Vec<u8> = raw
            .iter()
            .map(|&b| if b == 0 { b' ' } else { b })
            .collect();
        if String::from_utf8_lossy(&cmdline).contains(needle) {
            return true;
        }
    }

    false
}
