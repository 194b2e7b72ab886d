//! Error types for the egress and storage services
//!
//! `ProviderError` describes what went wrong talking to an external provider
//! (LiveKit or S3). `Error` names the operation that failed and keeps the
//! provider error as its source.

use thiserror::Error;

/// Failure reported by (or while talking to) an external provider
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request failed")]
    Http(#[from] reqwest::Error),

    #[error("provider rejected request ({status} {code}): {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },

    #[error("failed to decode provider response: {0}")]
    Decode(String),

    #[error("failed to sign request: {0}")]
    Signing(String),

    #[error("missing credentials: {0}")]
    MissingCredentials(String),
}

/// Provider error codes that mean the configured credentials were refused
const CREDENTIAL_CODES: &[&str] = &[
    // LiveKit (Twirp)
    "unauthenticated",
    "permission_denied",
    // S3
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "InvalidToken",
    "ExpiredToken",
];

impl ProviderError {
    /// Whether the provider refused (or never received) usable credentials
    pub fn is_credentials(&self) -> bool {
        match self {
            ProviderError::MissingCredentials(_) => true,
            ProviderError::Rejected { status, code, .. } => {
                *status == 401 || CREDENTIAL_CODES.contains(&code.as_str())
            }
            _ => false,
        }
    }

    /// Whether the provider reported that the target does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            ProviderError::Rejected { status, code, .. } => {
                *status == 404 || code == "not_found" || code == "NoSuchKey"
            }
            _ => false,
        }
    }
}

/// Service-level error
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid file key: {0}")]
    InvalidKey(String),

    #[error("credentials rejected while trying to {operation}")]
    Credentials {
        operation: &'static str,
        #[source]
        source: ProviderError,
    },

    #[error("failed to start egress for room {room_name}")]
    EgressStart {
        room_name: String,
        #[source]
        source: ProviderError,
    },

    #[error("failed to stop egress {egress_id}")]
    EgressStop {
        egress_id: String,
        #[source]
        source: ProviderError,
    },

    #[error("failed to list egresses")]
    EgressList {
        #[source]
        source: ProviderError,
    },

    #[error("failed to list files under {prefix}")]
    Listing {
        prefix: String,
        #[source]
        source: ProviderError,
    },

    #[error("failed to generate URL for {key}")]
    UrlGeneration {
        key: String,
        #[source]
        source: ProviderError,
    },

    #[error("egress session is closed")]
    Closed,
}

impl Error {
    /// Route a provider failure to `Credentials` or to the operation's own variant
    pub(crate) fn from_provider(
        operation: &'static str,
        source: ProviderError,
        otherwise: impl FnOnce(ProviderError) -> Error,
    ) -> Error {
        if source.is_credentials() {
            Error::Credentials { operation, source }
        } else {
            otherwise(source)
        }
    }

    /// The error message followed by every cause in its source chain
    pub fn detail(&self) -> String {
        let mut detail = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            detail.push_str(": ");
            detail.push_str(&cause.to_string());
            source = cause.source();
        }
        detail
    }
}

pub type Result<T> = std::result::Result<T, Error>;
