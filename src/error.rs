use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Failed to read template {path:?}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to render template {path:?}: {reason}")]
    TemplateRender { path: PathBuf, reason: String },

    #[error("Failed to open attachment {path:?}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read attachment {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode attachment {path:?}")]
    Encode {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid email address {address:?}")]
    InvalidAddress {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("Failed to build SMTP envelope")]
    Envelope(#[source] lettre::error::Error),

    #[error("Failed to set up SMTP transport for {host:?}")]
    Transport {
        host: String,
        #[source]
        source: lettre::transport::smtp::Error,
    },

    #[error("Failed to transmit message")]
    Transmission(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl MailError {
    /// Only failures talking to the server might succeed on another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transmission(_))
    }
}
