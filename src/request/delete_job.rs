use tracing::{debug, info};

use crate::auth::{AuthorizationContext, Permission};
use crate::error::RequestError;
use crate::http::{HttpPoster, PostStatus};
use crate::job::JobHandle;
use crate::request::path;
use crate::request::{Request, RequestOutcome};

const NO_INSTANCE: &str = "Automation server instance is unavailable";
const NO_ROOT_URL: &str = "Automation server root URL is not configured";

/// A user's request to delete a job, executed either against an in-process
/// job handle or through the server's `doDelete` endpoint.
///
/// Which strategy runs is the caller's choice. Every call ends in exactly one
/// of denied / succeeded / failed and never returns an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteJobRequest {
    request: Request,
}

impl DeleteJobRequest {
    pub fn new(
        request_type: impl Into<String>,
        username: impl Into<String>,
        project: impl Into<String>,
        project_full_name: impl Into<String>,
        build_number: impl Into<String>,
    ) -> Self {
        Self {
            request: Request::new(request_type, username, project, project_full_name, build_number),
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Description of the pending action
    pub fn message(&self) -> String {
        format!("Delete the job {}", self.request.project)
    }

    /// Delete `job` in process. The handle stays with the caller.
    pub async fn execute_local(
        &self,
        ctx: Option<&dyn AuthorizationContext>,
        job: &dyn JobHandle,
    ) -> RequestOutcome {
        match self.delete_local(ctx, job).await {
            Ok(message) => RequestOutcome::succeeded(message),
            Err(e) => RequestOutcome::from_error(&self.request, e),
        }
    }

    /// Ask the server to delete the job over HTTP; at most one POST is issued
    pub async fn execute_remote(
        &self,
        ctx: Option<&dyn AuthorizationContext>,
        http: &dyn HttpPoster,
    ) -> RequestOutcome {
        match self.delete_remote(ctx, http).await {
            Ok(message) => RequestOutcome::succeeded(message),
            Err(e) => RequestOutcome::from_error(&self.request, e),
        }
    }

    async fn delete_local(
        &self,
        ctx: Option<&dyn AuthorizationContext>,
        job: &dyn JobHandle,
    ) -> Result<String, RequestError> {
        let ctx = ctx.ok_or_else(|| RequestError::precondition(NO_INSTANCE))?;

        if !ctx.has_permission(Permission::ItemDelete) {
            return Err(RequestError::denied(&self.request.username, "job"));
        }

        let full_name = job.full_name();
        job.delete()
            .await
            .map_err(|e| RequestError::collaborator(e.to_string()))?;

        info!("The job {} has been properly deleted", full_name);
        Ok(format!("The Job {} has been properly Deleted", full_name))
    }

    async fn delete_remote(
        &self,
        ctx: Option<&dyn AuthorizationContext>,
        http: &dyn HttpPoster,
    ) -> Result<String, RequestError> {
        let ctx = ctx.ok_or_else(|| RequestError::precondition(NO_INSTANCE))?;

        if !ctx.has_permission(Permission::JobDelete) {
            return Err(RequestError::denied(&self.request.username, "Job"));
        }

        let root_url = ctx.root_url().ok_or_else(|| RequestError::precondition(NO_ROOT_URL))?;
        let full_name = &self.request.project_full_name;
        let target = path::delete_url(&root_url, full_name);

        url::Url::parse(&target)
            .map_err(|e| {
                RequestError::precondition(format!("Invalid delete endpoint {}: {}", target, e))
            })?;
        debug!(url = %target, "Posting job deletion");

        let status = http
            .post(&root_url, &target)
            .await
            .map_err(|e| RequestError::collaborator(e.to_string()))?;

        match status {
            PostStatus::Success => {
                info!("Job {} has been properly Deleted", full_name);
                Ok(format!("Job : {} has been properly Deleted", full_name))
            }
            PostStatus::Rejected(raw) => Err(RequestError::rejected(full_name, raw)),
        }
    }
}
