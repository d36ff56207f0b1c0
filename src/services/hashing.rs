//! Content hashing for mod binaries.
//!
//! Streams the file through blake3, so digests stay stable across runs for
//! unchanged bytes. Transient I/O failures (an antivirus or editor briefly
//! holding the file) are retried with backoff up to a bound, then surfaced as
//! `HashUnavailable`.

use std::fs::File;
use std::io::{self, ErrorKind};
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::types::{CoreError, CoreResult};

const MAX_ATTEMPTS: u32 = 5;
const BASE_DELAY: Duration = Duration::from_millis(10);

/// Compute the hex blake3 digest of a file's bytes.
///
/// Retries transient errors `MAX_ATTEMPTS` times with exponential backoff;
/// non-transient errors propagate immediately.
pub fn hash_file(path: &Path) -> CoreResult<String> {
    let mut attempt: u32 = 0;
    loop {
        match try_hash(path) {
            Ok(digest) => return Ok(digest),
            Err(e) if is_transient(&e) => {
                attempt += 1;
                if attempt >= MAX_ATTEMPTS {
                    return Err(CoreError::HashUnavailable {
                        attempts: attempt,
                        source: e,
                    });
                }
                let delay = BASE_DELAY * 2u32.pow(attempt - 1);
                log::warn!(
                    "Transient I/O error hashing {} (attempt {attempt}/{MAX_ATTEMPTS}), retrying in {delay:?}: {e}",
                    path.display()
                );
                thread::sleep(delay);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn try_hash(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize().to_hex().to_string())
}

/// Error kinds that indicate lock contention or interruption rather than a
/// genuinely broken file.
fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        ErrorKind::Interrupted
            | ErrorKind::WouldBlock
            | ErrorKind::TimedOut
            | ErrorKind::PermissionDenied
    )
}
