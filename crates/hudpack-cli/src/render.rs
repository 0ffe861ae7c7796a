use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use anstyle::{AnsiColor, Effects, Style};
use hudpack_core::{UpdateDecision, VersionLabel};
use hudpack_installer::{CleanReport, InstallReport};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct TerminalRenderer {
    style: OutputStyle,
}

pub(crate) struct TerminalProgress {
    style: OutputStyle,
    label: String,
    progress_bar: Option<ProgressBar>,
    started_at: Instant,
}

impl TerminalRenderer {
    pub(crate) fn from_style(style: OutputStyle) -> Self {
        Self { style }
    }

    pub(crate) fn print_status(self, status: &str, message: &str) {
        let line = render_status_line(self.style, status, message);
        match self.style {
            OutputStyle::Plain => println!("{line}"),
            OutputStyle::Rich => {
                let badge = status_badge(status);
                let rest = line.strip_prefix(badge).unwrap_or(&line);
                println!("{}{rest}", colorize(badge_style(status), badge));
            }
        }
    }

    pub(crate) fn print_lines(self, lines: &[String]) {
        for line in lines {
            println!("{line}");
        }
    }

    pub(crate) fn start_progress(self, label: &str) -> TerminalProgress {
        let progress_bar = if self.style == OutputStyle::Rich {
            let progress_bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan.bold} {msg} {elapsed}")
            {
                progress_bar.set_style(style.tick_chars(progress_tick_chars(label)));
            }
            progress_bar.set_message(label.to_string());
            progress_bar.enable_steady_tick(Duration::from_millis(80));
            Some(progress_bar)
        } else {
            None
        };

        TerminalProgress {
            style: self.style,
            label: label.to_string(),
            progress_bar,
            started_at: Instant::now(),
        }
    }
}

impl TerminalProgress {
    /// Hides the spinner while `f` talks to the terminal.
    pub(crate) fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        match &self.progress_bar {
            Some(progress_bar) => progress_bar.suspend(f),
            None => f(),
        }
    }

    pub(crate) fn finish_success(mut self) {
        let Some(progress_bar) = self.progress_bar.take() else {
            return;
        };
        progress_bar.finish_and_clear();
        if self.style == OutputStyle::Rich {
            eprintln!(
                "{} complete in {}",
                colorize(progress_label_style(), &self.label),
                format_elapsed(self.started_at.elapsed())
            );
        }
    }

    pub(crate) fn finish_abandon(mut self) {
        if let Some(progress_bar) = self.progress_bar.take() {
            progress_bar.finish_and_clear();
        }
    }
}

pub(crate) fn current_output_style(no_color_flag: bool) -> OutputStyle {
    let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty());
    resolve_output_style(std::io::stdout().is_terminal(), no_color_flag || no_color_env)
}

pub(crate) fn resolve_output_style(stdout_is_tty: bool, no_color: bool) -> OutputStyle {
    if stdout_is_tty && !no_color {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => format!("{} {message}", status_badge(status)),
    }
}

fn status_badge(status: &str) -> &'static str {
    match status {
        "ok" => "[OK]",
        "warn" => "[WARN]",
        "err" => "[ERR]",
        _ => "[..]",
    }
}

fn badge_style(status: &str) -> Style {
    let color = match status {
        "ok" => AnsiColor::BrightGreen,
        "warn" => AnsiColor::BrightYellow,
        "err" => AnsiColor::BrightRed,
        _ => AnsiColor::BrightBlue,
    };
    Style::new()
        .fg_color(Some(color.into()))
        .effects(Effects::BOLD)
}

fn progress_label_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightCyan.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}

fn progress_tick_chars(label: &str) -> &'static str {
    match label {
        "install" => ".oO@* ",
        "update" => "<^>v ",
        "self-update" => ".:;* ",
        _ => "|/-\\ ",
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let millis = elapsed.subsec_millis();
    format!("{secs}.{millis:03}s")
}

pub(crate) fn format_decision_lines(subject: &str, decision: &UpdateDecision) -> Vec<String> {
    let verdict = if decision.remote_is_newer {
        "update available"
    } else {
        "up to date"
    };
    vec![
        format!("{subject}: {verdict}"),
        format!("current: {}", decision.current),
        format!("latest: {}", decision.latest),
    ]
}

pub(crate) fn format_install_report_lines(report: &InstallReport) -> Vec<String> {
    let mut lines = vec![
        format!("install path: {}", report.install_path.display()),
        format!("downloaded: {} bytes", report.downloaded_bytes),
        format!(
            "extracted: {} files, {} directories",
            report.extracted.files, report.extracted.directories
        ),
        format!(
            "deployed: {} files, {} directories",
            report.deployed.files, report.deployed.directories
        ),
    ];
    lines.extend(format_leftover_lines(&report.cleanup));
    lines
}

pub(crate) fn format_leftover_lines(report: &CleanReport) -> Vec<String> {
    report
        .failed
        .iter()
        .map(|path| format!("could not remove: {}", path.display()))
        .collect()
}

pub(crate) fn format_status_lines(
    package: &str,
    install_path: &Path,
    state: &str,
    version: Option<&VersionLabel>,
) -> Vec<String> {
    let mut lines = vec![
        format!("package: {package}"),
        format!("install path: {}", install_path.display()),
        format!("state: {state}"),
    ];
    if let Some(version) = version {
        lines.push(format!("version: {version}"));
    }
    lines
}

pub(crate) fn format_error_lines(err: &anyhow::Error) -> Vec<String> {
    let head = match err.downcast_ref::<hudpack_core::Error>() {
        Some(domain) => format!("error[{}]: {err}", domain.kind()),
        None => format!("error: {err}"),
    };
    let mut lines = vec![head];
    lines.extend(err.chain().skip(1).map(|cause| format!("  caused by: {cause}")));
    lines
}
