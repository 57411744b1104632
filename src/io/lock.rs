use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Name of the lock file inside `.goalpost/`
pub const LOCK_FILE: &str = ".lock";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Exclusive advisory lock held for one load-modify-save of ledger.json.
///
/// Concurrent `gp` processes queue on it; readers do not take it. The lock
/// is released when the value is dropped.
pub struct LedgerLock {
    file: File,
    path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("ledger at {path} is busy (waited {waited:?}); another gp process may be writing")]
    Busy { path: PathBuf, waited: Duration },
}

impl LedgerLock {
    /// Lock the ledger directory `dir`, polling until `timeout` runs out.
    pub fn acquire(dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::Open {
                path: path.clone(),
                source,
            })?;

        let started = Instant::now();
        while let Err(e) = flock(&file, Op::TryExclusive) {
            let waited = started.elapsed();
            if waited >= timeout {
                tracing::warn!(path = %path.display(), error = %e, "gave up waiting for ledger lock");
                return Err(LockError::Busy { path, waited });
            }
            std::thread::sleep(POLL_INTERVAL);
        }
        tracing::trace!(path = %path.display(), waited = ?started.elapsed(), "ledger locked");
        Ok(LedgerLock { file, path })
    }

    pub fn acquire_default(dir: &Path) -> Result<Self, LockError> {
        Self::acquire(dir, DEFAULT_TIMEOUT)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        // The file itself stays: waiters must keep locking the same inode
        if let Err(e) = flock(&self.file, Op::Unlock) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release ledger lock");
        }
    }
}

enum Op {
    TryExclusive,
    Unlock,
}

#[cfg(unix)]
fn flock(file: &File, op: Op) -> std::io::Result<()> {
    use std::os::unix::io::AsRawFd;
    let flags = match op {
        Op::TryExclusive => libc::LOCK_EX | libc::LOCK_NB,
        Op::Unlock => libc::LOCK_UN,
    };
    // SAFETY: the descriptor is owned by `file` and open for the whole call
    let rc = unsafe { libc::flock(file.as_raw_fd(), flags) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn flock(_file: &File, _op: Op) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn ledger_dir(tmp: &TempDir) -> PathBuf {
        let dir = tmp.path().join(".goalpost");
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_relock_after_drop() {
        let tmp = TempDir::new().unwrap();
        let dir = ledger_dir(&tmp);

        let lock = LedgerLock::acquire_default(&dir).unwrap();
        assert_eq!(lock.path(), dir.join(LOCK_FILE));
        drop(lock);

        assert!(LedgerLock::acquire(&dir, Duration::ZERO).is_ok());
    }

    #[test]
    fn test_second_holder_is_busy() {
        let tmp = TempDir::new().unwrap();
        let dir = ledger_dir(&tmp);

        let _held = LedgerLock::acquire_default(&dir).unwrap();
        let second = LedgerLock::acquire(&dir, Duration::from_millis(50));
        assert!(matches!(second, Err(LockError::Busy { .. })));
    }

    #[test]
    fn test_lock_file_survives_release() {
        let tmp = TempDir::new().unwrap();
        let dir = ledger_dir(&tmp);
        drop(LedgerLock::acquire_default(&dir).unwrap());
        assert!(dir.join(LOCK_FILE).exists());
    }

    #[test]
    fn test_missing_dir_fails_to_open() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            LedgerLock::acquire_default(&tmp.path().join("nope")),
            Err(LockError::Open { .. })
        ));
    }
}
