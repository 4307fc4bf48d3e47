use clap::Args;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::auth::ConfiguredAuthorization;
use crate::cli::config::{self, ServerInfo};
use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;
use crate::http::{Credentials, RequestsClient};
use crate::job::FsJob;
use crate::request::{DeleteJobRequest, RequestOutcome, DELETE_JOB};

#[derive(Args)]
pub struct DeleteArgs {
    #[arg(help = "Full job name, folders separated by '/'")]
    pub full_name: String,

    #[arg(long, help = "Short display name (defaults to the last path segment)")]
    pub project: Option<String>,

    #[arg(long, default_value = "", help = "Build number the request refers to")]
    pub build: String,

    #[arg(long, help = "Requesting user (defaults to the server profile user)")]
    pub user: Option<String>,

    #[arg(long, help = "Server profile to use (defaults to the current server)")]
    pub server: Option<String>,

    #[arg(
        long,
        help = "Delete the job directory in process instead of calling the server"
    )]
    pub local: bool,

    #[arg(long, help = "Jobs directory for --local (defaults to JENKINS_JOBS_DIR)")]
    pub jobs_dir: Option<PathBuf>,
}

/// Short name shown to users: last segment, folder markers ignored
pub fn project_name(full_name: &str) -> String {
    full_name
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(full_name)
        .to_string()
}

fn requester(args: &DeleteArgs, profile: Option<&ServerInfo>, app: &AppConfig) -> String {
    args.user
        .clone()
        .or_else(|| profile.and_then(|p| p.username.clone()))
        .or_else(|| app.server.username.clone())
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "anonymous".to_string())
}

fn credentials(profile: Option<&ServerInfo>, app: &AppConfig) -> Option<Credentials> {
    let (username, token) = match profile {
        Some(p) => (p.username.clone(), p.api_token.clone()),
        None => (app.server.username.clone(), app.server.api_token.clone()),
    };
    Some(Credentials {
        username: username?,
        api_token: token?,
    })
}

/// Returns whether the job was deleted
pub async fn handle(args: DeleteArgs, output_format: OutputFormat) -> anyhow::Result<bool> {
    let config_dir = config::get_config_dir()?;
    handle_with(args, output_format, crate::config::config(), &config_dir).await
}

/// Same as [`handle`], against an explicit application config and profile directory
pub async fn handle_with(
    args: DeleteArgs,
    output_format: OutputFormat,
    app: &AppConfig,
    config_dir: &Path,
) -> anyhow::Result<bool> {
    let profile = config::resolve_server_in(config_dir, args.server.as_deref())?
        .map(|(_, info)| info);

    let request = DeleteJobRequest::new(
        DELETE_JOB,
        requester(&args, profile.as_ref(), app),
        args.project.clone().unwrap_or_else(|| project_name(&args.full_name)),
        args.full_name.clone(),
        args.build.clone(),
    );
    info!("{} (requested by {})", request.message(), request.request().username);

    let auth =
        ConfiguredAuthorization::from_config(app, profile.as_ref().map(ServerInfo::root_url));

    let outcome = if args.local {
        let jobs_dir = args
            .jobs_dir
            .clone()
            .or_else(|| app.local.jobs_dir.clone())
            .ok_or_else(|| anyhow::anyhow!("--local needs --jobs-dir or JENKINS_JOBS_DIR"))?;
        let job = FsJob::new(jobs_dir, &args.full_name);
        request.execute_local(Some(&auth), &job).await
    } else {
        let client = RequestsClient::new(&app.http, credentials(profile.as_ref(), app))?;
        request.execute_remote(Some(&auth), &client).await
    };

    if app.security.enable_audit_logging {
        info!(
            target: "audit",
            username = %request.request().username,
            job = %request.request().project_full_name,
            granted = ?auth.granted(),
            status = ?outcome.status,
            "delete job request"
        );
    }

    report(&output_format, &request, &outcome)?;
    Ok(outcome.is_success())
}

fn report(
    output_format: &OutputFormat,
    request: &DeleteJobRequest,
    outcome: &RequestOutcome,
) -> anyhow::Result<()> {
    if outcome.is_success() {
        utils::output_success(
            output_format,
            outcome.message(),
            Some(json!({
                "job": request.request().project_full_name,
                "status": outcome.status,
            })),
        )
    } else {
        utils::output_error(output_format, outcome.message(), outcome.error_code.as_deref())
    }
}
