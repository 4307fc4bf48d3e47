pub mod delete_job;
pub mod path;

pub use delete_job::DeleteJobRequest;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::RequestError;

/// Request type tag used for delete-job requests
pub const DELETE_JOB: &str = "deleteJob";

/// Identifying fields shared by every user request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub request_type: String,
    pub username: String,
    pub project: String,
    pub project_full_name: String,
    pub build_number: String,
}

impl Request {
    pub fn new(
        request_type: impl Into<String>,
        username: impl Into<String>,
        project: impl Into<String>,
        project_full_name: impl Into<String>,
        build_number: impl Into<String>,
    ) -> Self {
        Self {
            request_type: request_type.into(),
            username: username.into(),
            project: project.into(),
            project_full_name: project_full_name.into(),
            build_number: build_number.into(),
        }
    }

    /// `full/name:build` as used in failure logs
    pub fn target(&self) -> String {
        format!("{}:{}", self.project_full_name, self.build_number)
    }
}

/// Terminal state of an execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Denied,
    Succeeded,
    Failed,
}

/// What one execute call produced: a terminal state and its message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOutcome {
    pub status: OutcomeStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl RequestOutcome {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Succeeded,
            message: message.into(),
            error_code: None,
        }
    }

    /// Fold an error into an outcome, logging it at the severity of its kind
    pub fn from_error(request: &Request, err: RequestError) -> Self {
        match &err {
            RequestError::AuthorizationDenied { .. } => {
                debug!(
                    username = %request.username,
                    "The current user does not have the DELETE permission"
                );
            }
            RequestError::PreconditionFailure(msg) | RequestError::CollaboratorFailure(msg) => {
                error!(
                    username = %request.username,
                    "Unable to delete the job {}: {}",
                    request.target(),
                    msg
                );
            }
            RequestError::RemoteRejection { project, status } => {
                info!("Delete Job call has failed: {} : {}", project, status);
            }
        }

        let status = if err.is_denial() {
            OutcomeStatus::Denied
        } else {
            OutcomeStatus::Failed
        };

        Self {
            status,
            message: err.to_string(),
            error_code: Some(err.error_code().to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Succeeded
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
