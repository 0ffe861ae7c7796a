use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PACKAGE_NAME: &str = "RebelHud";
pub const DEFAULT_HOST_NAME: &str = "Team Fortress 2";
pub const DEFAULT_MARKER_FILE: &str = "version.txt";
pub const DEFAULT_ARCHIVE_SUBTREE: &str = "RebelHud-master/custom";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HudpackConfig {
    pub package: PackageConfig,
    #[serde(default)]
    pub host: HostConfig,
    pub installer: Option<InstallerConfig>,
    #[serde(default)]
    pub network: NetworkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageConfig {
    #[serde(default = "default_package_name")]
    pub name: String,
    pub archive_url: String,
    pub version_url: String,
    #[serde(default = "default_archive_subtree")]
    pub archive_subtree: String,
    #[serde(default = "default_marker_file")]
    pub marker_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostConfig {
    #[serde(default = "default_host_name")]
    pub name: String,
    #[serde(default)]
    pub candidates: Vec<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            name: default_host_name(),
            candidates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallerConfig {
    pub download_url: String,
    pub version_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_version_timeout_secs")]
    pub version_timeout_secs: u64,
    pub download_timeout_secs: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            version_timeout_secs: default_version_timeout_secs(),
            download_timeout_secs: None,
        }
    }
}

impl NetworkConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn version_timeout(&self) -> Duration {
        Duration::from_secs(self.version_timeout_secs)
    }

    pub fn download_timeout(&self) -> Option<Duration> {
        self.download_timeout_secs.map(Duration::from_secs)
    }
}

impl HudpackConfig {
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse hudpack config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid config: {}", path.display()))
    }

    fn validate(&self) -> anyhow::Result<()> {
        let name = self.package.name.trim();
        if name.is_empty() {
            return Err(anyhow!("package.name must not be empty"));
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(anyhow!(
                "package.name must be a single directory name: {name}"
            ));
        }
        if self.package.marker_file.trim().is_empty() {
            return Err(anyhow!("package.marker_file must not be empty"));
        }
        if self
            .package
            .archive_subtree
            .split(['/', '\\'])
            .any(|segment| segment == "..")
        {
            return Err(anyhow!(
                "package.archive_subtree must not contain '..': {}",
                self.package.archive_subtree
            ));
        }

        require_url("package.archive_url", &self.package.archive_url)?;
        require_url("package.version_url", &self.package.version_url)?;
        if let Some(installer) = &self.installer {
            require_url("installer.download_url", &installer.download_url)?;
            require_url("installer.version_url", &installer.version_url)?;
        }

        if self.network.connect_timeout_secs == 0 || self.network.version_timeout_secs == 0 {
            return Err(anyhow!("network timeouts must be greater than zero"));
        }
        Ok(())
    }

    /// Ordered host directories to probe. Configured candidates win; otherwise
    /// the per-platform Steam locations are used.
    pub fn host_candidates(&self, home: Option<&Path>) -> Vec<PathBuf> {
        if self.host.candidates.is_empty() {
            return default_host_candidates(home);
        }
        self.host
            .candidates
            .iter()
            .map(|candidate| expand_home(candidate, home))
            .collect()
    }
}

fn require_url(field: &str, value: &str) -> anyhow::Result<()> {
    if value.trim().is_empty() {
        return Err(anyhow!("{field} must not be empty"));
    }
    Ok(())
}

pub fn expand_home(raw: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(raw);
    };
    if raw == "~" {
        return home.to_path_buf();
    }
    match raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        Some(rest) => home.join(rest),
        None => PathBuf::from(raw),
    }
}

pub fn default_host_candidates(home: Option<&Path>) -> Vec<PathBuf> {
    const TF2_CUSTOM: &str = "steamapps/common/Team Fortress 2/tf/custom";

    let mut candidates = Vec::new();
    if cfg!(windows) {
        candidates.push(PathBuf::from(format!(
            "C:/Program Files (x86)/Steam/{TF2_CUSTOM}"
        )));
        candidates.push(PathBuf::from(format!("C:/Program Files/Steam/{TF2_CUSTOM}")));
        return candidates;
    }

    let Some(home) = home else {
        return candidates;
    };
    if cfg!(target_os = "macos") {
        candidates.push(home.join("Library/Application Support/Steam").join(TF2_CUSTOM));
    } else {
        candidates.push(home.join(".steam/steam").join(TF2_CUSTOM));
        candidates.push(home.join(".local/share/Steam").join(TF2_CUSTOM));
        candidates.push(
            home.join(".var/app/com.valvesoftware.Steam/data/Steam")
                .join(TF2_CUSTOM),
        );
    }
    candidates
}

pub fn home_dir() -> Option<PathBuf> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    std::env::var_os(var)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    if cfg!(windows) {
        let app_data = std::env::var("LOCALAPPDATA")
            .context("LOCALAPPDATA is not set; cannot resolve Windows config path")?;
        return Ok(PathBuf::from(app_data).join("Hudpack").join("config.toml"));
    }

    let home = std::env::var("HOME").context("HOME is not set; cannot resolve config path")?;
    Ok(PathBuf::from(home).join(".hudpack").join("config.toml"))
}

fn default_package_name() -> String {
    DEFAULT_PACKAGE_NAME.to_string()
}

fn default_host_name() -> String {
    DEFAULT_HOST_NAME.to_string()
}

fn default_marker_file() -> String {
    DEFAULT_MARKER_FILE.to_string()
}

fn default_archive_subtree() -> String {
    DEFAULT_ARCHIVE_SUBTREE.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_version_timeout_secs() -> u64 {
    15
}
