use thiserror::Error;

/// Failures raised while talking to the remote agent or the upload store.
///
/// These never cross the [`AgentClient`](crate::AgentClient) or
/// [`UploadAdapter`](crate::UploadAdapter) boundary; they are folded into the
/// envelope or upload outcome so every flow handles them uniformly.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Agent API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode agent payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Interaction-layer rejections. A rejected trigger leaves the flow untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("A request is already in flight for this flow")]
    Busy,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Question cannot be empty")]
    EmptyQuestion,

    #[error("Unknown {kind} filter value: {value}")]
    InvalidFilter { kind: &'static str, value: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
}

pub type Result<T> = std::result::Result<T, AgentError>;
