mod archive;
mod cleaner;
mod deploy;
mod fetch;
mod layout;
mod locator;
mod oracle;
mod orchestrator;
mod self_update;
mod types;

pub use archive::{extract_zip, ExtractSummary};
pub use cleaner::{remove_path, CleanReport};
pub use deploy::{deploy_dir, DeploySummary};
pub use fetch::{Fetcher, HttpFetcher};
pub use layout::InstallLayout;
pub use locator::{locate, InstallSession};
pub use oracle::{fetch_local_version, fetch_remote_version, install_state};
pub use orchestrator::InstallOrchestrator;
pub use self_update::replace_executable;
pub use types::{
    DecisionProvider, InstallReport, InstallState, InstallerUpdateOutcome, PackageUpdateOutcome,
};

#[cfg(test)]
mod tests;
