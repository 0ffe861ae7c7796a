use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use hudpack_core::{default_config_path, home_dir, HudpackConfig, UpdateDecision, VersionLabel};
use hudpack_installer::{
    HttpFetcher, InstallOrchestrator, InstallState, InstallerUpdateOutcome, PackageUpdateOutcome,
};
use serde::Serialize;

use crate::completion::write_completions;
use crate::prompt::confirm_on_terminal;
use crate::render::{
    current_output_style, format_decision_lines, format_install_report_lines,
    format_leftover_lines, format_status_lines, TerminalRenderer,
};
use crate::{Cli, Commands};

pub(crate) const CONFIG_ENV: &str = "HUDPACK_CONFIG";

#[derive(Debug, Serialize)]
pub(crate) struct StatusReport {
    pub(crate) package: String,
    pub(crate) install_path: PathBuf,
    pub(crate) state: &'static str,
    pub(crate) version: Option<VersionLabel>,
}

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        return write_completions(shell, &mut std::io::stdout());
    }

    let renderer = TerminalRenderer::from_style(current_output_style(cli.no_color));
    let config_path = resolve_config_path(
        cli.config.as_deref(),
        std::env::var_os(CONFIG_ENV),
        default_config_path,
    )?;
    let config = HudpackConfig::load(&config_path)?;
    tracing::debug!(path = %config_path.display(), "config loaded");

    let candidates = build_candidates(&config, cli.install_dir.as_deref(), home_dir().as_deref());
    let fetcher = HttpFetcher::new(&config.network)?;
    let package = config.package.name.clone();
    let mut orchestrator = InstallOrchestrator::new(config, candidates, fetcher);

    match cli.command {
        Commands::Install => {
            let progress = renderer.start_progress("install");
            match orchestrator.install() {
                Ok(report) => {
                    progress.finish_success();
                    renderer.print_status("ok", &format!("installed {package}"));
                    renderer.print_lines(&format_install_report_lines(&report));
                }
                Err(err) => {
                    progress.finish_abandon();
                    return Err(err.into());
                }
            }
        }
        Commands::Update { yes } => {
            let progress = renderer.start_progress("update");
            let decider = |decision: &UpdateDecision| {
                progress.suspend(|| confirm_on_terminal(&package, yes, decision))
            };
            let outcome = match orchestrator.update_package(&decider) {
                Ok(outcome) => outcome,
                Err(err) => {
                    progress.finish_abandon();
                    return Err(err.into());
                }
            };
            match outcome {
                PackageUpdateOutcome::UpToDate(decision) => {
                    progress.finish_abandon();
                    renderer.print_status(
                        "ok",
                        &format!("{package} is up to date ({})", decision.current),
                    );
                }
                PackageUpdateOutcome::Declined(decision) => {
                    progress.finish_abandon();
                    renderer.print_status(
                        "warn",
                        &format!("update to {} declined", decision.latest),
                    );
                }
                PackageUpdateOutcome::Updated { decision, report } => {
                    progress.finish_success();
                    renderer.print_status(
                        "ok",
                        &format!("updated {package} to {}", decision.latest),
                    );
                    renderer.print_lines(&format_install_report_lines(&report));
                }
            }
        }
        Commands::Check { json } => {
            let decision = orchestrator.check_for_package_update()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&decision)?);
            } else {
                renderer.print_lines(&format_decision_lines(&package, &decision));
            }
        }
        Commands::Remove => {
            let report = orchestrator.remove()?;
            if report.is_clean() {
                renderer.print_status("ok", &format!("removed {package}"));
            } else {
                renderer.print_status("warn", &format!("{package} was only partly removed"));
                renderer.print_lines(&format_leftover_lines(&report));
            }
        }
        Commands::Status { json } => {
            let report = build_status_report(&mut orchestrator, &package)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                renderer.print_lines(&format_status_lines(
                    &report.package,
                    &report.install_path,
                    report.state,
                    report.version.as_ref(),
                ));
            }
        }
        Commands::Clean => {
            let report = orchestrator.clean_up()?;
            if report.is_clean() {
                renderer.print_status(
                    "ok",
                    &format!("removed {} temporary entries", report.removed),
                );
            } else {
                renderer.print_status("warn", "some temporary entries could not be removed");
                renderer.print_lines(&format_leftover_lines(&report));
            }
        }
        Commands::SelfUpdate { yes } => {
            let endpoints = orchestrator.config().installer.clone().ok_or_else(|| {
                anyhow!(
                    "self-update needs an [installer] section in {}",
                    config_path.display()
                )
            })?;
            let executable =
                std::env::current_exe().context("failed to resolve the running executable")?;
            let progress = renderer.start_progress("self-update");
            let decider = |decision: &UpdateDecision| {
                progress.suspend(|| confirm_on_terminal("hudpack", yes, decision))
            };
            let outcome = match orchestrator.update_installer(&endpoints, &decider, &executable) {
                Ok(outcome) => outcome,
                Err(err) => {
                    progress.finish_abandon();
                    return Err(err.into());
                }
            };
            match outcome {
                InstallerUpdateOutcome::UpToDate(decision) => {
                    progress.finish_abandon();
                    renderer.print_status(
                        "ok",
                        &format!("hudpack is up to date ({})", decision.current),
                    );
                }
                InstallerUpdateOutcome::Declined(decision) => {
                    progress.finish_abandon();
                    renderer.print_status(
                        "warn",
                        &format!("installer update to {} declined", decision.latest),
                    );
                }
                InstallerUpdateOutcome::Replaced {
                    decision,
                    executable,
                    bytes,
                } => {
                    progress.finish_success();
                    renderer.print_status(
                        "ok",
                        &format!(
                            "replaced {} with {} ({bytes} bytes); restart hudpack to use it",
                            executable.display(),
                            decision.latest
                        ),
                    );
                }
            }
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// `--config` wins, then `$HUDPACK_CONFIG`, then the per-user default.
pub(crate) fn resolve_config_path(
    flag: Option<&Path>,
    env_value: Option<OsString>,
    default_path: impl FnOnce() -> Result<PathBuf>,
) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    if let Some(value) = env_value.filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(value));
    }
    default_path()
}

pub(crate) fn build_candidates(
    config: &HudpackConfig,
    install_dir: Option<&Path>,
    home: Option<&Path>,
) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = install_dir {
        candidates.push(dir.to_path_buf());
    }
    candidates.extend(config.host_candidates(home));
    candidates
}

fn build_status_report(
    orchestrator: &mut InstallOrchestrator<HttpFetcher>,
    package: &str,
) -> Result<StatusReport> {
    let install_path = orchestrator.layout()?.install_path().to_path_buf();
    let state = orchestrator.state()?;
    let version = match state {
        InstallState::Installed => Some(orchestrator.installed_version()?),
        InstallState::NotInstalled => None,
    };
    Ok(StatusReport {
        package: package.to_string(),
        install_path,
        state: state.as_str(),
        version,
    })
}
