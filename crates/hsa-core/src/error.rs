//! Error types for hsa-core

use thiserror::Error;

/// Main error type for hsa-core
#[derive(Error, Debug)]
pub enum Error {
    /// Required configuration is missing. Never recovered within the process.
    #[error("{0}")]
    Config(String),

    /// Backend client construction failed. Cached for the service lifetime.
    #[error("Error creating AI client: {0}")]
    ClientInit(String),

    /// The remote call itself failed (transport error or non-success status).
    #[error("Error sending message: {0}")]
    Backend(String),

    /// The backend answered but without a usable text candidate.
    #[error("no valid candidates found in response")]
    NoCandidates,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for hsa-core
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn is_per_request(err: &Error) -> bool {
        match err {
            Error::Config(_) | Error::Backend(_) | Error::NoCandidates => true,
            Error::ClientInit(_) | Error::Http(_) => false,
        }
    }

    #[test]
    fn test_display_messages() {
        let err = Error::ClientInit("bad key".to_string());
        assert_eq!(err.to_string(), "Error creating AI client: bad key");
        assert!(!is_per_request(&err));

        let err = Error::Backend("503".to_string());
        assert_eq!(err.to_string(), "Error sending message: 503");
        assert!(is_per_request(&err));
    }
}
