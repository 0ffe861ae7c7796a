use std::fmt;
use std::path::PathBuf;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EnvironmentNotFound,
    AlreadyInstalled,
    NotInstalled,
    Fetch,
    Archive,
    Deploy,
    VersionFormat,
    Network,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnvironmentNotFound => "environment-not-found",
            Self::AlreadyInstalled => "already-installed",
            Self::NotInstalled => "not-installed",
            Self::Fetch => "fetch",
            Self::Archive => "archive",
            Self::Deploy => "deploy",
            Self::VersionFormat => "version-format",
            Self::Network => "network",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures surfaced by the install workflows. Every variant is recoverable by
/// fixing the underlying condition and running the workflow again.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{host} could not be found; checked {}", display_candidates(.candidates))]
    EnvironmentNotFound {
        host: String,
        candidates: Vec<PathBuf>,
    },

    #[error("{package} is already installed")]
    AlreadyInstalled { package: String },

    #[error("{package} is not currently installed")]
    NotInstalled { package: String },

    #[error("{message}: {url} -> {}", .destination.display())]
    Fetch {
        message: String,
        url: String,
        destination: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("{message}: {}", .path.display())]
    Archive {
        message: String,
        path: PathBuf,
        #[source]
        source: Option<BoxError>,
    },

    #[error("{message}: {}", .path.display())]
    Deploy {
        message: String,
        path: PathBuf,
        #[source]
        source: Option<BoxError>,
    },

    #[error("invalid version '{token}': {message}")]
    VersionFormat { token: String, message: String },

    #[error("{message}: {location}")]
    Network {
        message: String,
        location: String,
        #[source]
        source: BoxError,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EnvironmentNotFound { .. } => ErrorKind::EnvironmentNotFound,
            Self::AlreadyInstalled { .. } => ErrorKind::AlreadyInstalled,
            Self::NotInstalled { .. } => ErrorKind::NotInstalled,
            Self::Fetch { .. } => ErrorKind::Fetch,
            Self::Archive { .. } => ErrorKind::Archive,
            Self::Deploy { .. } => ErrorKind::Deploy,
            Self::VersionFormat { .. } => ErrorKind::VersionFormat,
            Self::Network { .. } => ErrorKind::Network,
        }
    }

    pub fn fetch(
        message: impl Into<String>,
        url: &str,
        destination: impl Into<PathBuf>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Fetch {
            message: message.into(),
            url: url.to_string(),
            destination: destination.into(),
            source: source.into(),
        }
    }

    pub fn archive(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Archive {
            message: message.into(),
            path: path.into(),
            source: Some(source.into()),
        }
    }

    pub fn deploy(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Deploy {
            message: message.into(),
            path: path.into(),
            source: Some(source.into()),
        }
    }

    pub fn version_format(token: &str, message: impl Into<String>) -> Self {
        Self::VersionFormat {
            token: token.to_string(),
            message: message.into(),
        }
    }

    pub fn network(
        message: impl Into<String>,
        location: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Network {
            message: message.into(),
            location: location.into(),
            source: source.into(),
        }
    }
}

fn display_candidates(candidates: &[PathBuf]) -> String {
    if candidates.is_empty() {
        return "no candidate directories".to_string();
    }
    candidates
        .iter()
        .map(|candidate| candidate.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
