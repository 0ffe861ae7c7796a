use std::fs;
use std::io;
use std::path::Path;

use hudpack_core::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeploySummary {
    pub directories: usize,
    pub files: usize,
}

/// Copies everything under `src` into `dst`, overwriting files that already
/// exist. Files in `dst` without a counterpart in `src` are left alone.
pub fn deploy_dir(src: &Path, dst: &Path) -> Result<DeploySummary> {
    if !src.is_dir() {
        return Err(Error::deploy(
            "deploy source is missing",
            src,
            io::Error::new(io::ErrorKind::NotFound, "source directory does not exist"),
        ));
    }

    tracing::info!(
        source = %src.display(),
        destination = %dst.display(),
        "deploying package files"
    );
    let mut summary = DeploySummary::default();
    copy_dir_recursive(src, dst, &mut summary)?;
    Ok(summary)
}

fn copy_dir_recursive(src: &Path, dst: &Path, summary: &mut DeploySummary) -> Result<()> {
    fs::create_dir_all(dst).map_err(|err| Error::deploy("failed to create directory", dst, err))?;
    let entries =
        fs::read_dir(src).map_err(|err| Error::deploy("failed to read directory", src, err))?;
    for entry in entries {
        let entry = entry.map_err(|err| Error::deploy("failed to read directory", src, err))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        let metadata = fs::metadata(&src_path)
            .map_err(|err| Error::deploy("failed to stat", &src_path, err))?;
        if metadata.is_dir() {
            copy_dir_recursive(&src_path, &dst_path, summary)?;
            summary.directories += 1;
            continue;
        }

        fs::copy(&src_path, &dst_path)
            .map_err(|err| Error::deploy("failed to copy package file", &dst_path, err))?;
        tracing::trace!(file = %dst_path.display(), "deployed");
        summary.files += 1;
    }
    Ok(())
}
