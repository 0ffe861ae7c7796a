use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::Error;

/// Version of the running installer, compared against the remote installer
/// version during self-update checks.
pub const INSTALLER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A version token collapsed onto a single decimal number.
///
/// Only the first dot is a decimal separator; every later dot is dropped, so
/// `1.2.3` and `1.23` are the same version. Published version files depend on
/// this ordering, which is why it is kept even though `1.10 < 1.9` under it.
#[derive(Debug, Clone, Copy)]
pub struct VersionNumber(f64);

impl VersionNumber {
    pub fn parse(token: &str) -> Result<Self, Error> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(Error::version_format(token, "version token is empty"));
        }

        let normalized = normalize_token(trimmed);
        let value = normalized.parse::<f64>().map_err(|err| {
            Error::version_format(token, format!("'{normalized}' is not numeric: {err}"))
        })?;
        if !value.is_finite() {
            return Err(Error::version_format(
                token,
                format!("'{normalized}' is not a finite number"),
            ));
        }

        // -0.0 and 0.0 must compare equal under total_cmp.
        Ok(Self(if value == 0.0 { 0.0 } else { value }))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

fn normalize_token(token: &str) -> String {
    match token.split_once('.') {
        Some((whole, fraction)) => format!("{whole}.{}", fraction.replace('.', "")),
        None => token.to_string(),
    }
}

impl PartialEq for VersionNumber {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionNumber {}

impl PartialOrd for VersionNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A version token as it was read, kept next to its parsed number so it can be
/// shown to users verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLabel {
    label: String,
    number: VersionNumber,
}

impl VersionLabel {
    pub fn parse(token: &str) -> Result<Self, Error> {
        let number = VersionNumber::parse(token)?;
        Ok(Self {
            label: token.trim().to_string(),
            number,
        })
    }

    /// Parses the first whitespace-delimited token of `text`.
    pub fn from_first_token(text: &str) -> Result<Self, Error> {
        let token = text.split_whitespace().next().unwrap_or("");
        Self::parse(token)
    }

    pub fn as_str(&self) -> &str {
        &self.label
    }

    pub fn number(&self) -> VersionNumber {
        self.number
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl Serialize for VersionLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}

/// Where the remote version sits relative to the local one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateDirection {
    Newer,
    Same,
    Older,
}

impl UpdateDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Newer => "newer",
            Self::Same => "same",
            Self::Older => "older",
        }
    }
}

pub fn compare(local: VersionNumber, remote: VersionNumber) -> UpdateDirection {
    match remote.cmp(&local) {
        Ordering::Greater => UpdateDirection::Newer,
        Ordering::Equal => UpdateDirection::Same,
        Ordering::Less => UpdateDirection::Older,
    }
}

/// The question put to the decision provider before an update is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateDecision {
    pub current: VersionLabel,
    pub latest: VersionLabel,
    pub remote_is_newer: bool,
}

impl UpdateDecision {
    pub fn new(current: VersionLabel, latest: VersionLabel) -> Self {
        let remote_is_newer = compare(current.number(), latest.number()) == UpdateDirection::Newer;
        Self {
            current,
            latest,
            remote_is_newer,
        }
    }

    pub fn direction(&self) -> UpdateDirection {
        compare(self.current.number(), self.latest.number())
    }
}
