use thiserror::Error;

/// Errors that can occur while setting up or running a capture.
///
/// Everything here is surfaced synchronously during setup; once the run
/// loop is entered the only remaining termination paths are a completed
/// bounded capture and an external interrupt, neither of which is an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to start camera hub: {0}")]
    HubStartFailed(String),

    #[error("no camera matches '{0}'")]
    DeviceNotFound(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("streaming failed: {0}")]
    StreamingFailed(String),
}
