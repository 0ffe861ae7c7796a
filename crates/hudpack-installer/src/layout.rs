use std::path::{Path, PathBuf};

use hudpack_core::PackageConfig;

const ARCHIVE_FILE_NAME: &str = "dl.zip";
const STAGING_DIR_NAME: &str = "temp";

/// Every path a workflow touches, derived from the resolved install directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    install_path: PathBuf,
    package_name: String,
    marker_file: String,
    archive_subtree: String,
}

impl InstallLayout {
    pub fn new(install_path: impl Into<PathBuf>, package: &PackageConfig) -> Self {
        Self {
            install_path: install_path.into(),
            package_name: package.name.clone(),
            marker_file: package.marker_file.clone(),
            archive_subtree: package.archive_subtree.clone(),
        }
    }

    pub fn install_path(&self) -> &Path {
        &self.install_path
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn package_dir(&self) -> PathBuf {
        self.install_path.join(&self.package_name)
    }

    pub fn marker_path(&self) -> PathBuf {
        self.package_dir().join(&self.marker_file)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.install_path.join(ARCHIVE_FILE_NAME)
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.install_path.join(STAGING_DIR_NAME)
    }

    /// Directory inside the extracted archive whose contents mirror the
    /// install directory.
    pub fn deploy_source_dir(&self) -> PathBuf {
        let mut dir = self.staging_dir();
        for segment in self
            .archive_subtree
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty() && *segment != ".")
        {
            dir.push(segment);
        }
        dir
    }
}
