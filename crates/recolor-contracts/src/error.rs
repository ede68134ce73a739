use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Input,
    Network,
    Protocol,
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Config => "config",
            ErrorKind::Input => "input",
            ErrorKind::Network => "network",
            ErrorKind::Protocol => "protocol",
            ErrorKind::Io => "io",
        }
    }
}

/// Failure of a single colorize invocation.
///
/// Every pipeline stage reports through this type; an invocation either
/// returns an output image or exactly one of these.
#[derive(Debug, thiserror::Error)]
pub enum ColorizeError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("input image unavailable ({}): {reason}", path.display())]
    Input { path: PathBuf, reason: String },

    #[error("{message}")]
    Network {
        status: Option<u16>,
        body: Option<String>,
        message: String,
    },

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("failed writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ColorizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ColorizeError::Config(_) => ErrorKind::Config,
            ColorizeError::Input { .. } => ErrorKind::Input,
            ColorizeError::Network { .. } => ErrorKind::Network,
            ColorizeError::Protocol(_) => ErrorKind::Protocol,
            ColorizeError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Non-2xx reply. The body is kept verbatim: providers put their
    /// diagnostic there.
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        ColorizeError::Network {
            status: Some(status),
            message: format!("request failed ({status}): {body}"),
            body: Some(body),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        ColorizeError::Network {
            status: None,
            body: None,
            message: format!("request failed: {}", detail.into()),
        }
    }

    pub fn input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ColorizeError::Input {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ColorizeError::Network { status, .. } => *status,
            _ => None,
        }
    }
}
