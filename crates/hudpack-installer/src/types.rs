use std::path::PathBuf;

use hudpack_core::UpdateDecision;

use crate::archive::ExtractSummary;
use crate::cleaner::CleanReport;
use crate::deploy::DeploySummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    NotInstalled,
    Installed,
}

impl InstallState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotInstalled => "not-installed",
            Self::Installed => "installed",
        }
    }
}

/// What one fetch/extract/deploy/cleanup run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub install_path: PathBuf,
    pub downloaded_bytes: u64,
    pub extracted: ExtractSummary,
    pub deployed: DeploySummary,
    pub cleanup: CleanReport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageUpdateOutcome {
    UpToDate(UpdateDecision),
    Declined(UpdateDecision),
    Updated {
        decision: UpdateDecision,
        report: InstallReport,
    },
}

impl PackageUpdateOutcome {
    pub fn decision(&self) -> &UpdateDecision {
        match self {
            Self::UpToDate(decision) | Self::Declined(decision) => decision,
            Self::Updated { decision, .. } => decision,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallerUpdateOutcome {
    UpToDate(UpdateDecision),
    Declined(UpdateDecision),
    Replaced {
        decision: UpdateDecision,
        executable: PathBuf,
        bytes: u64,
    },
}

impl InstallerUpdateOutcome {
    pub fn decision(&self) -> &UpdateDecision {
        match self {
            Self::UpToDate(decision) | Self::Declined(decision) => decision,
            Self::Replaced { decision, .. } => decision,
        }
    }
}

/// Answers the yes/no question asked before an update is applied.
pub trait DecisionProvider {
    fn confirm(&self, decision: &UpdateDecision) -> bool;
}

impl<F> DecisionProvider for F
where
    F: Fn(&UpdateDecision) -> bool,
{
    fn confirm(&self, decision: &UpdateDecision) -> bool {
        self(decision)
    }
}
