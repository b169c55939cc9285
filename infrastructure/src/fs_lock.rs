//! Advisory file locks shared by the file-backed adapters
//!
//! Several processes may point at the same weights file or cache directory.
//! Each adapter takes a lock on a sibling lock file around every
//! read-modify-write, and writes through a temp file plus rename so readers
//! never see a torn file.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const LOCK_TIMEOUT: Duration = Duration::from_secs(10);
const LOCK_RETRY: Duration = Duration::from_millis(10);

/// Held lock; released on drop
pub(crate) struct FileLock {
    file: File,
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl FileLock {
    /// Block the calling thread until the lock at `path` is held
    ///
    /// Run this off the async executor (`spawn_blocking`).
    pub(crate) fn acquire(path: &Path, exclusive: bool) -> io::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let start = Instant::now();
        loop {
            let result = if exclusive {
                FileExt::try_lock_exclusive(&file)
            } else {
                FileExt::try_lock_shared(&file)
            };
            match result {
                Ok(()) => return Ok(Self { file }),
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    if start.elapsed() >= LOCK_TIMEOUT {
                        return Err(io::Error::new(
                            ErrorKind::TimedOut,
                            format!(
                                "timed out waiting for {} ({}s)",
                                path.display(),
                                LOCK_TIMEOUT.as_secs()
                            ),
                        ));
                    }
                    std::thread::sleep(LOCK_RETRY);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// `<path>.lock`, the lock file guarding `path`
pub(crate) fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "state".into());
    name.push(".lock");
    path.with_file_name(name)
}

/// Replace `path` with `content` via a temp file in the same directory
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)
}

/// Contents of `path`, `None` when it does not exist
pub(crate) fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
