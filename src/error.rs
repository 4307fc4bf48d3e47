// Request execution error types
use thiserror::Error;

/// Why a request did not succeed.
///
/// These never leave a request's execute methods; they are folded into a
/// [`crate::request::RequestOutcome`] and logged at the severity of their kind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Expected outcome: the requester lacks the capability
    #[error("The current user {username} does not have permission to delete the {target}")]
    AuthorizationDenied { username: String, target: &'static str },

    /// The server context or its root URL is missing, or the endpoint is unusable
    #[error("{0}")]
    PreconditionFailure(String),

    /// Job deletion or HTTP transport failed; carries the collaborator's description
    #[error("{0}")]
    CollaboratorFailure(String),

    /// The server answered with something other than success
    #[error("Delete Job call has failed for {project} : {status}")]
    RemoteRejection { project: String, status: String },
}

impl RequestError {
    pub fn denied(username: impl Into<String>, target: &'static str) -> Self {
        RequestError::AuthorizationDenied {
            username: username.into(),
            target,
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        RequestError::PreconditionFailure(message.into())
    }

    pub fn collaborator(message: impl Into<String>) -> Self {
        RequestError::CollaboratorFailure(message.into())
    }

    pub fn rejected(project: impl Into<String>, status: impl Into<String>) -> Self {
        RequestError::RemoteRejection {
            project: project.into(),
            status: status.into(),
        }
    }

    /// Stable code for machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::AuthorizationDenied { .. } => "AUTHORIZATION_DENIED",
            RequestError::PreconditionFailure(_) => "PRECONDITION_FAILURE",
            RequestError::CollaboratorFailure(_) => "COLLABORATOR_FAILURE",
            RequestError::RemoteRejection { .. } => "REMOTE_REJECTION",
        }
    }

    pub fn is_denial(&self) -> bool {
        matches!(self, RequestError::AuthorizationDenied { .. })
    }
}
