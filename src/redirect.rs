//! Stderr redirection into the intercepted log file.

use std::path::Path;

use crate::error::LintError;

/// Redirect this process's stderr to append to `path`.
///
/// Everything the process (and its libraries) writes to stderr from here
/// on lands in the watched file. Irreversible for the process lifetime.
#[cfg(unix)]
pub fn redirect_stderr(path: &Path) -> Result<(), LintError> {
    use std::os::fd::AsRawFd;

    let file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| LintError::CreateLogFile {
            path: path.to_path_buf(),
            source: e,
        })?;

    // dup2 leaves `file`'s own descriptor untouched; it can close normally
    // once stderr aliases the log file.
    let ret = unsafe { libc::dup2(file.as_raw_fd(), libc::STDERR_FILENO) };
    if ret == -1 {
        return Err(LintError::Redirect {
            reason: std::io::Error::last_os_error().to_string(),
        });
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn redirect_stderr(_path: &Path) -> Result<(), LintError> {
    Err(LintError::Redirect {
        reason: "stderr redirection is only supported on unix".to_string(),
    })
}
