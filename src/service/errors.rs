use thiserror::Error;

use super::protocol::Endpoint;

/// Failures talking to the dialogue service. None of them are fatal: the
/// caller reports them and the workflow stays where it was.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service answered with something other than `200 OK`.
    #[error("Failed to {action} to the dialogue service. Status code: {code}", action = .endpoint.action())]
    Status { endpoint: Endpoint, code: u16 },

    /// The request never got an answer (refused, DNS, timeout, ...).
    #[error("Failed to connect to the dialogue service at {url}. Make sure the service is running. ({reason})")]
    Connectivity { url: String, reason: String },

    /// A `200 OK` whose body is not the JSON object the endpoint promises.
    #[error("Unexpected response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: Endpoint, reason: String },
}

impl ServiceError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ServiceError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, ServiceError::Connectivity { .. })
    }
}
