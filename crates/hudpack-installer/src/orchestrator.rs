use std::path::{Path, PathBuf};

use hudpack_core::{
    Error, HudpackConfig, InstallerConfig, Result, UpdateDecision, VersionLabel,
    INSTALLER_VERSION,
};

use crate::archive::extract_zip;
use crate::cleaner::{remove_path, CleanReport};
use crate::deploy::deploy_dir;
use crate::fetch::Fetcher;
use crate::layout::InstallLayout;
use crate::locator::InstallSession;
use crate::oracle::{fetch_local_version, fetch_remote_version, install_state};
use crate::self_update::replace_executable;
use crate::types::{
    DecisionProvider, InstallReport, InstallState, InstallerUpdateOutcome, PackageUpdateOutcome,
};

/// Drives the install, update, removal and self-update workflows for one
/// package against one host.
///
/// The host directory is resolved on first use and reused for the rest of the
/// session. No workflow cleans up after itself when a step fails: temporary
/// artifacts stay until the next successful run or an explicit
/// [`InstallOrchestrator::clean_up`].
#[derive(Debug)]
pub struct InstallOrchestrator<F> {
    config: HudpackConfig,
    candidates: Vec<PathBuf>,
    fetcher: F,
    layout: Option<InstallLayout>,
}

impl<F: Fetcher> InstallOrchestrator<F> {
    pub fn new(config: HudpackConfig, candidates: Vec<PathBuf>, fetcher: F) -> Self {
        Self {
            config,
            candidates,
            fetcher,
            layout: None,
        }
    }

    pub fn config(&self) -> &HudpackConfig {
        &self.config
    }

    pub fn layout(&mut self) -> Result<&InstallLayout> {
        let layout = match self.layout.take() {
            Some(layout) => layout,
            None => {
                let session = InstallSession::resolve(&self.config.host.name, &self.candidates)?;
                InstallLayout::new(session.install_path(), &self.config.package)
            }
        };
        let layout: &InstallLayout = self.layout.insert(layout);
        Ok(layout)
    }

    pub fn state(&mut self) -> Result<InstallState> {
        Ok(install_state(self.layout()?))
    }

    pub fn installed_version(&mut self) -> Result<VersionLabel> {
        fetch_local_version(self.layout()?)
    }

    pub fn install(&mut self) -> Result<InstallReport> {
        let layout = self.layout()?.clone();
        if install_state(&layout) == InstallState::Installed {
            return Err(Error::AlreadyInstalled {
                package: layout.package_name().to_string(),
            });
        }
        tracing::info!(package = layout.package_name(), "installing");
        self.run_install_sequence(&layout)
    }

    /// Same sequence as [`Self::install`] without the installed check; reached
    /// after an update was confirmed.
    pub fn install_while_updating(&mut self) -> Result<InstallReport> {
        let layout = self.layout()?.clone();
        tracing::info!(package = layout.package_name(), "updating");
        self.run_install_sequence(&layout)
    }

    pub fn check_for_package_update(&mut self) -> Result<UpdateDecision> {
        let layout = self.layout()?.clone();
        if install_state(&layout) == InstallState::NotInstalled {
            return Err(Error::NotInstalled {
                package: layout.package_name().to_string(),
            });
        }

        let latest = fetch_remote_version(&self.fetcher, &self.config.package.version_url)?;
        let current = fetch_local_version(&layout)?;
        let decision = UpdateDecision::new(current, latest);
        tracing::info!(
            current = %decision.current,
            latest = %decision.latest,
            newer = decision.remote_is_newer,
            "package version checked"
        );
        Ok(decision)
    }

    pub fn update_package(
        &mut self,
        decider: &impl DecisionProvider,
    ) -> Result<PackageUpdateOutcome> {
        let decision = self.check_for_package_update()?;
        if !decision.remote_is_newer {
            return Ok(PackageUpdateOutcome::UpToDate(decision));
        }
        if !decider.confirm(&decision) {
            tracing::info!("package update declined");
            return Ok(PackageUpdateOutcome::Declined(decision));
        }
        let report = self.install_while_updating()?;
        Ok(PackageUpdateOutcome::Updated { decision, report })
    }

    pub fn remove(&mut self) -> Result<CleanReport> {
        let layout = self.layout()?.clone();
        if install_state(&layout) == InstallState::NotInstalled {
            return Err(Error::NotInstalled {
                package: layout.package_name().to_string(),
            });
        }
        let package_dir = layout.package_dir();
        tracing::info!(path = %package_dir.display(), "removing package");
        Ok(remove_path(&package_dir))
    }

    /// Deletes the staging directory and the downloaded archive. Safe to call
    /// in any state and any number of times.
    pub fn clean_up(&mut self) -> Result<CleanReport> {
        let layout = self.layout()?;
        Ok(clean_temp_artifacts(layout))
    }

    pub fn check_for_installer_update(
        &self,
        endpoints: &InstallerConfig,
    ) -> Result<UpdateDecision> {
        let latest = fetch_remote_version(&self.fetcher, &endpoints.version_url)?;
        let current = VersionLabel::parse(INSTALLER_VERSION)?;
        let decision = UpdateDecision::new(current, latest);
        tracing::info!(
            current = %decision.current,
            latest = %decision.latest,
            newer = decision.remote_is_newer,
            "installer version checked"
        );
        Ok(decision)
    }

    /// Replaces the binary at `executable` when a newer installer is published
    /// and the decision provider agrees.
    pub fn update_installer(
        &self,
        endpoints: &InstallerConfig,
        decider: &impl DecisionProvider,
        executable: &Path,
    ) -> Result<InstallerUpdateOutcome> {
        let decision = self.check_for_installer_update(endpoints)?;
        if !decision.remote_is_newer {
            return Ok(InstallerUpdateOutcome::UpToDate(decision));
        }
        if !decider.confirm(&decision) {
            tracing::info!("installer update declined");
            return Ok(InstallerUpdateOutcome::Declined(decision));
        }
        let bytes = replace_executable(&self.fetcher, &endpoints.download_url, executable)?;
        Ok(InstallerUpdateOutcome::Replaced {
            decision,
            executable: executable.to_path_buf(),
            bytes,
        })
    }

    fn run_install_sequence(&self, layout: &InstallLayout) -> Result<InstallReport> {
        let archive_path = layout.archive_path();
        let downloaded_bytes = self
            .fetcher
            .fetch_to_file(&self.config.package.archive_url, &archive_path)?;
        tracing::info!(bytes = downloaded_bytes, "package archive downloaded");

        let extracted = extract_zip(&archive_path, &layout.staging_dir())?;
        let deployed = deploy_dir(&layout.deploy_source_dir(), layout.install_path())?;
        let cleanup = clean_temp_artifacts(layout);

        tracing::info!(
            files = deployed.files,
            directories = deployed.directories,
            "package files deployed"
        );
        Ok(InstallReport {
            install_path: layout.install_path().to_path_buf(),
            downloaded_bytes,
            extracted,
            deployed,
            cleanup,
        })
    }
}

fn clean_temp_artifacts(layout: &InstallLayout) -> CleanReport {
    let mut report = remove_path(&layout.staging_dir());
    report.merge(remove_path(&layout.archive_path()));
    report
}
