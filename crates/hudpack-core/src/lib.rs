mod config;
mod error;
mod version;

pub use config::{
    default_config_path, default_host_candidates, expand_home, home_dir, HostConfig,
    HudpackConfig, InstallerConfig, NetworkConfig, PackageConfig, DEFAULT_ARCHIVE_SUBTREE,
    DEFAULT_HOST_NAME, DEFAULT_MARKER_FILE, DEFAULT_PACKAGE_NAME,
};
pub use error::{BoxError, Error, ErrorKind, Result};
pub use version::{
    compare, UpdateDecision, UpdateDirection, VersionLabel, VersionNumber, INSTALLER_VERSION,
};
