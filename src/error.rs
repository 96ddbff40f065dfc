// Error kinds surfaced by the client library. The binary wraps these with
// `anyhow` context before printing them.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("endpoint connection validation failed: {0}")]
    EndpointConnectionValidationFailed(String),
    #[error("more than one endpoint is named \"{0}\", use the endpoint ID instead")]
    NoUniqueEndpointNameMatch(String),
    #[error("no endpoint found with name or ID \"{0}\"")]
    EndpointIdNotFound(String),
    #[error("server responded with {status}: {message}")]
    Http { status: u16, message: String },
    #[error("failed to send request")]
    Request(#[source] reqwest::Error),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
    #[error("unable to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status code of the failed call, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            Error::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
