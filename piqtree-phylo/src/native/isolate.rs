//! Process-level guard around native calls.
//!
//! IQ-TREE writes progress to the console and report files to the working
//! directory, and keeps global state. [`isolate`] holds a process-wide lock
//! for the duration of a call, points stdout/stderr at the null device and
//! optionally moves into a scratch directory. Everything is undone in `Drop`,
//! so the guard is released on success, on error and on unwind.

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use piqtree_core::{PiqtreeError, Result};
use tempfile::TempDir;
use tracing::{debug, warn};

static NATIVE_LOCK: Mutex<()> = Mutex::new(());

#[cfg(test)]
thread_local! {
    static SILENCED: std::cell::Cell<bool> = const { std::cell::Cell::new(false) };
}

/// Run `f` with the native library isolated from the host process.
///
/// `call` names the native function for logging and the scratch directory
/// prefix (`piqtree_<call>`). With `hide_files` the call runs inside a fresh
/// temporary directory that is removed afterwards.
pub fn isolate<T, F>(call: &str, hide_files: bool, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    // Logged only once the streams are restored.
    let (result, elapsed_ms) = {
        // A panic in an earlier call leaves nothing to repair.
        let _lock = NATIVE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let _streams = SilencedStreams::new()?;
        #[cfg(test)]
        SILENCED.with(|s| s.set(true));
        let _scratch = if hide_files {
            Some(ScratchDir::enter(call)?)
        } else {
            None
        };

        let start = Instant::now();
        let result = f();
        (result, start.elapsed().as_millis() as u64)
    };

    match &result {
        Ok(_) => debug!(call, elapsed_ms, "native call finished"),
        Err(PiqtreeError::NativeEngineFailure(msg)) => {
            warn!(call, elapsed_ms, error = %msg, "native call failed")
        }
        Err(e) => debug!(call, elapsed_ms, error = %e, "native call returned an error"),
    }
    result
}

fn flush_all() {
    let _ = std::io::stdout().flush();
    let _ = std::io::stderr().flush();
    flush_c_streams();
}

#[cfg(unix)]
fn flush_c_streams() {
    // SAFETY: fflush(NULL) flushes every open C stream and takes no pointers.
    unsafe {
        libc::fflush(std::ptr::null_mut());
    }
}

#[cfg(not(unix))]
fn flush_c_streams() {}

/// stdout and stderr redirected to `/dev/null` until dropped.
struct SilencedStreams {
    #[cfg(unix)]
    saved: Vec<(libc::c_int, libc::c_int)>,
}

impl SilencedStreams {
    #[cfg(unix)]
    fn new() -> Result<Self> {
        use std::os::unix::io::AsRawFd;

        flush_all();
        let devnull = std::fs::OpenOptions::new().write(true).open("/dev/null")?;
        let mut guard = Self { saved: Vec::with_capacity(2) };
        for fd in [libc::STDOUT_FILENO, libc::STDERR_FILENO] {
            // SAFETY: dup/dup2 on the standard descriptors and a file we own.
            let copy = unsafe { libc::dup(fd) };
            if copy < 0 {
                return Err(std::io::Error::last_os_error().into());
            }
            guard.saved.push((fd, copy));
            if unsafe { libc::dup2(devnull.as_raw_fd(), fd) } < 0 {
                return Err(std::io::Error::last_os_error().into());
            }
        }
        Ok(guard)
    }

    #[cfg(not(unix))]
    fn new() -> Result<Self> {
        flush_all();
        Ok(Self {})
    }
}

impl Drop for SilencedStreams {
    fn drop(&mut self) {
        flush_all();
        self.restore();
        #[cfg(test)]
        SILENCED.with(|s| s.set(false));
    }
}

impl SilencedStreams {
    #[cfg(unix)]
    fn restore(&mut self) {
        for (fd, copy) in self.saved.drain(..).rev() {
            // SAFETY: `copy` was returned by dup and is closed exactly once.
            unsafe {
                libc::dup2(copy, fd);
                libc::close(copy);
            }
        }
    }

    #[cfg(not(unix))]
    fn restore(&mut self) {}
}

/// Temporary working directory; the previous one is restored on drop before
/// the directory is removed.
struct ScratchDir {
    original: PathBuf,
    _dir: TempDir,
}

impl ScratchDir {
    fn enter(call: &str) -> Result<Self> {
        let original = std::env::current_dir()?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("piqtree_{call}"))
            .tempdir()?;
        std::env::set_current_dir(dir.path())?;
        Ok(Self {
            original,
            _dir: dir,
        })
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}
