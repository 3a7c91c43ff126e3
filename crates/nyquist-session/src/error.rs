//! Request-level failures.

use std::fmt;

/// Why an `analyze` or `resample` request failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The request itself is unusable: missing audio, a non-positive rate,
    /// or a value over a configured limit.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The uploaded bytes are not audio the decoders understand.
    #[error("could not decode audio: {0}")]
    Decode(String),

    /// No live session carries this id.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// Anything else, such as failing to build the playback container.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error class without its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`ServiceError::InvalidInput`].
    InvalidInput,
    /// See [`ServiceError::Decode`].
    Decode,
    /// See [`ServiceError::SessionNotFound`].
    SessionNotFound,
    /// See [`ServiceError::Internal`].
    Internal,
}

impl ErrorKind {
    /// Stable snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Decode => "decode",
            ErrorKind::SessionNotFound => "session_not_found",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ServiceError {
    /// Class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::InvalidInput(_) => ErrorKind::InvalidInput,
            ServiceError::Decode(_) => ErrorKind::Decode,
            ServiceError::SessionNotFound(_) => ErrorKind::SessionNotFound,
            ServiceError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ServiceError::InvalidInput(msg.into())
    }
}

impl From<nyquist_io::Error> for ServiceError {
    fn from(err: nyquist_io::Error) -> Self {
        use nyquist_io::Error;
        match err {
            Error::Empty | Error::TooLong { .. } => ServiceError::InvalidInput(err.to_string()),
            Error::DataUri(_) | Error::Base64(_) => ServiceError::InvalidInput(err.to_string()),
            Error::Wav(_) | Error::Decode(_) => ServiceError::Decode(err.to_string()),
            Error::Io(_) => ServiceError::Internal(err.to_string()),
        }
    }
}

impl From<nyquist_analysis::AnalysisError> for ServiceError {
    fn from(err: nyquist_analysis::AnalysisError) -> Self {
        match err {
            nyquist_analysis::AnalysisError::InvalidInput(msg) => ServiceError::InvalidInput(msg),
        }
    }
}
