use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use hudpack_core::{Error, Result};
use zip::ZipArchive;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub directories: usize,
    pub files: usize,
}

/// Extracts every entry of the zip at `archive_path` under `dest_dir`, in the
/// order the archive lists them. The first failure aborts the remaining
/// entries; whatever was written before it stays on disk.
///
/// Entry names are not checked for `..` segments. Such entries are written
/// where they point and logged, so callers must only feed trusted archives.
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<ExtractSummary> {
    ensure_dest_dir(dest_dir)?;

    let file = File::open(archive_path)
        .map_err(|err| Error::archive("failed to open archive", archive_path, err))?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .map_err(|err| Error::archive("malformed archive", archive_path, err))?;

    tracing::info!(
        archive = %archive_path.display(),
        destination = %dest_dir.display(),
        entries = archive.len(),
        "extracting archive"
    );

    let mut summary = ExtractSummary::default();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|err| Error::archive("malformed archive entry", archive_path, err))?;
        let name = entry.name().to_string();
        if name.split('/').any(|segment| segment == "..") {
            tracing::warn!(entry = %name, "archive entry points outside the destination");
        }
        let out_path = entry_destination(dest_dir, &name);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)
                .map_err(|err| Error::archive("failed to create directory", &out_path, err))?;
            summary.directories += 1;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| Error::archive("failed to create directory", parent, err))?;
        }
        let output = File::create(&out_path)
            .map_err(|err| Error::archive("failed to create file", &out_path, err))?;
        let mut writer = BufWriter::new(output);
        io::copy(&mut entry, &mut writer)
            .map_err(|err| Error::archive("failed to extract entry", &out_path, err))?;
        writer
            .flush()
            .map_err(|err| Error::archive("failed to write file", &out_path, err))?;
        tracing::trace!(entry = %name, "extracted");
        summary.files += 1;
    }

    Ok(summary)
}

fn ensure_dest_dir(dest_dir: &Path) -> Result<()> {
    match fs::create_dir(dest_dir) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists && dest_dir.is_dir() => Ok(()),
        Err(err) => Err(Error::archive(
            "failed to create extraction directory",
            dest_dir,
            err,
        )),
    }
}

/// Joins an archive entry name under `dest_dir` one `/` segment at a time, so
/// a leading slash stays inside the destination.
pub(crate) fn entry_destination(dest_dir: &Path, name: &str) -> PathBuf {
    let mut path = dest_dir.to_path_buf();
    for segment in name.split('/').filter(|segment| !segment.is_empty()) {
        path.push(segment);
    }
    path
}
