use std::fs;
use std::io;

use hudpack_core::{Error, Result, VersionLabel};

use crate::fetch::Fetcher;
use crate::layout::InstallLayout;
use crate::types::InstallState;

/// Derived from the marker file on every call; never cached.
pub fn install_state(layout: &InstallLayout) -> InstallState {
    if layout.marker_path().exists() {
        InstallState::Installed
    } else {
        InstallState::NotInstalled
    }
}

pub fn fetch_local_version(layout: &InstallLayout) -> Result<VersionLabel> {
    let marker = layout.marker_path();
    let content = match fs::read_to_string(&marker) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(Error::NotInstalled {
                package: layout.package_name().to_string(),
            });
        }
        Err(err) => {
            return Err(Error::version_format(
                &marker.display().to_string(),
                format!("marker file could not be read: {err}"),
            ));
        }
    };
    VersionLabel::from_first_token(&content)
}

pub fn fetch_remote_version(fetcher: &impl Fetcher, url: &str) -> Result<VersionLabel> {
    let body = fetcher.read_text(url)?;
    let label = VersionLabel::from_first_token(&body)?;
    tracing::debug!(url, version = %label, "remote version read");
    Ok(label)
}
