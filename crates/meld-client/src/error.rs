//! Error types

use meld_dom::DomError;

/// Runtime error
#[derive(Debug, thiserror::Error)]
pub enum MeldError {
    #[error("No component root found for id {0:?}")]
    RootNotFound(String),

    #[error("Malformed component data: {0}")]
    MalformedData(#[source] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[source] serde_json::Error),

    #[error("Invalid redirect URL {url:?}: {source}")]
    Redirect {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Transport failure
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Transport closed")]
    Closed,

    #[error("Failed to encode {event} payload: {source}")]
    Encode {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Transport error: {0}")]
    Other(String),
}

/// DOM reconciliation failure
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("Cannot patch fragment: {0}")]
    Fragment(String),

    #[error(transparent)]
    Dom(#[from] DomError),
}
