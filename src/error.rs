//! Typed errors for game-agent.
//!
//! The CLI layer works in [`anyhow::Result`]; these enums name the failures
//! that callers match on or that surface as distinct user-facing messages.

/// Failures of the console session itself.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No knowledge base id was available and the prompt was abandoned.
    #[error("Knowledge base id is required ({reason})")]
    ConfigurationMissing { reason: String },

    /// Every decoding strategy rejected the input line.
    #[error("Could not decode input ({attempts} strategies tried)")]
    InputDecoding { attempts: usize },

    #[error("Console I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the knowledge base retrieval tool.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeBaseError {
    #[error("No knowledge base id configured")]
    MissingId,

    #[error("Retrieve failed for knowledge base {kb_id}: {message}")]
    Retrieve { kb_id: String, message: String },
}

/// Failures of the http_request tool before a response is received.
#[derive(Debug, thiserror::Error)]
pub enum HttpToolError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported URL scheme '{0}' (only http and https are allowed)")]
    UnsupportedScheme(String),

    #[error("Unsupported HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("Invalid header '{0}'")]
    InvalidHeader(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}
