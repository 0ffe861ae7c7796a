use std::path::{Path, PathBuf};

use hudpack_core::{Error, Result};

/// Returns the first candidate that is an existing directory. Order is
/// significant; later candidates are not inspected once one matches.
pub fn locate(host: &str, candidates: &[PathBuf]) -> Result<PathBuf> {
    for candidate in candidates {
        if candidate.is_dir() {
            tracing::debug!(path = %candidate.display(), "host install directory found");
            return Ok(candidate.clone());
        }
        tracing::trace!(path = %candidate.display(), "host candidate missing");
    }

    Err(Error::EnvironmentNotFound {
        host: host.to_string(),
        candidates: candidates.to_vec(),
    })
}

/// The install directory resolved for one session. It is created once by the
/// locator and only ever read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSession {
    install_path: PathBuf,
}

impl InstallSession {
    pub fn resolve(host: &str, candidates: &[PathBuf]) -> Result<Self> {
        let install_path = locate(host, candidates)?;
        tracing::info!(path = %install_path.display(), "using install directory");
        Ok(Self { install_path })
    }

    pub fn install_path(&self) -> &Path {
        &self.install_path
    }
}
