use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use hudpack_core::{Error, Result};

use crate::fetch::Fetcher;

/// Downloads a new installer binary and swaps it in at `executable`.
///
/// The download lands next to the executable first, so a failed transfer
/// leaves the running binary untouched. The old binary is moved aside before
/// the swap and restored if the swap fails.
pub fn replace_executable(fetcher: &impl Fetcher, url: &str, executable: &Path) -> Result<u64> {
    let staged = sibling_path(executable, "download");
    let backup = sibling_path(executable, "old");

    let bytes = fetcher.fetch_to_file(url, &staged)?;
    copy_permissions(executable, &staged)
        .map_err(|err| Error::fetch("failed to mark installer executable", url, &staged, err))?;

    if let Err(err) = remove_if_exists(&backup) {
        tracing::warn!(path = %backup.display(), error = %err, "stale installer backup remains");
    }

    let had_current = executable.exists();
    if had_current {
        fs::rename(executable, &backup).map_err(|err| {
            let _ = fs::remove_file(&staged);
            Error::fetch("failed to move current installer aside", url, executable, err)
        })?;
    }

    if let Err(err) = fs::rename(&staged, executable) {
        if had_current {
            if let Err(restore_err) = fs::rename(&backup, executable) {
                tracing::error!(
                    backup = %backup.display(),
                    error = %restore_err,
                    "failed to restore previous installer"
                );
            }
        }
        let _ = fs::remove_file(&staged);
        return Err(Error::fetch(
            "failed to replace installer executable",
            url,
            executable,
            err,
        ));
    }

    // A running executable cannot be deleted on every platform; the backup is
    // cleared on the next self-update in that case.
    if let Err(err) = remove_if_exists(&backup) {
        tracing::debug!(path = %backup.display(), error = %err, "installer backup kept");
    }

    tracing::info!(path = %executable.display(), bytes, "installer replaced");
    Ok(bytes)
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("hudpack"));
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

#[cfg(unix)]
fn copy_permissions(from: &Path, to: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = match fs::metadata(from) {
        Ok(metadata) => metadata.permissions().mode(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => 0o755,
        Err(err) => return Err(err),
    };
    fs::set_permissions(to, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn copy_permissions(_from: &Path, _to: &Path) -> io::Result<()> {
    Ok(())
}
