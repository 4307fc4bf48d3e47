//! Outbound HTTP to the automation server.
//!
//! The server's coarse `"success"` token is converted into a [`PostStatus`]
//! here, so request logic only ever matches on the enum.

use async_trait::async_trait;
use reqwest::{header, redirect, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::HttpConfig;

/// Status token the server side reports for an accepted call
pub const SUCCESS_TOKEN: &str = "success";

/// Result of a POST that reached the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostStatus {
    Success,
    /// Any other answer, with the raw status as reported
    Rejected(String),
}

impl PostStatus {
    pub fn from_token(token: &str) -> Self {
        if token == SUCCESS_TOKEN {
            PostStatus::Success
        } else {
            PostStatus::Rejected(token.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

/// Issues a POST against the server and reports a coarse status
#[async_trait]
pub trait HttpPoster: Send + Sync {
    async fn post(&self, base_url: &str, target_url: &str) -> Result<PostStatus, TransportError>;
}

/// Credentials sent as HTTP basic auth (user + API token)
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub api_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Crumb {
    crumb: String,
    crumb_request_field: String,
}

/// reqwest-backed [`HttpPoster`]
pub struct RequestsClient {
    client: Client,
    credentials: Option<Credentials>,
    fetch_crumb: bool,
}

impl RequestsClient {
    pub fn new(
        config: &HttpConfig,
        credentials: Option<Credentials>,
    ) -> Result<Self, TransportError> {
        // doDelete answers with a redirect to the parent; that is the success signal
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(redirect::Policy::none())
            .cookie_store(true)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            credentials,
            fetch_crumb: config.fetch_crumb,
        })
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some(creds) => builder.basic_auth(&creds.username, Some(&creds.api_token)),
            None => builder,
        }
    }

    /// CSRF crumb for servers that require one; `None` when the issuer is disabled
    async fn crumb(&self, base_url: &str) -> Result<Option<Crumb>, TransportError> {
        let url = join(base_url, "crumbIssuer/api/json")?;
        let response = self.with_auth(self.client.get(url)).send().await?;

        if !response.status().is_success() {
            debug!("No crumb issued ({}), posting without one", response.status());
            return Ok(None);
        }

        match response.json::<Crumb>().await {
            Ok(crumb) => Ok(Some(crumb)),
            Err(e) => {
                warn!("Unreadable crumb response: {}", e);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl HttpPoster for RequestsClient {
    async fn post(&self, base_url: &str, target_url: &str) -> Result<PostStatus, TransportError> {
        let target =
            url::Url::parse(target_url).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        let crumb = if self.fetch_crumb {
            self.crumb(base_url).await?
        } else {
            None
        };

        let mut builder = self.with_auth(self.client.post(target));
        if let Some(crumb) = crumb {
            builder = builder.header(crumb.crumb_request_field.as_str(), crumb.crumb);
        }

        let response = builder.send().await?;
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok());
        if let Some(location) = location {
            debug!(status = %response.status(), location, "Delete call redirected");
        }
        Ok(status_of(response.status(), location))
    }
}

/// `doDelete` redirects to the parent on success; a redirect to a login
/// page means the session was never authenticated
fn status_of(status: StatusCode, location: Option<&str>) -> PostStatus {
    let to_login = status.is_redirection() && location.is_some_and(is_login_page);
    if (status.is_success() || status.is_redirection()) && !to_login {
        return PostStatus::from_token(SUCCESS_TOKEN);
    }

    let reason = status.canonical_reason().unwrap_or("Unknown");
    match location {
        Some(location) if to_login => PostStatus::Rejected(format!(
            "{} {} (redirected to {})",
            status.as_u16(),
            reason,
            location
        )),
        _ => PostStatus::Rejected(format!("{} {}", status.as_u16(), reason)),
    }
}

/// Jenkins sends `/login?from=...`; SSO realms use `securityRealm/commenceLogin`
fn is_login_page(location: &str) -> bool {
    let path = match url::Url::parse(location) {
        Ok(url) => url.path().to_ascii_lowercase(),
        Err(_) => location
            .split(['?', '#'])
            .next()
            .unwrap_or(location)
            .to_ascii_lowercase(),
    };
    let last = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    last == "login" || last == "commencelogin" || path.contains("/securityrealm/")
}

fn join(base_url: &str, path: &str) -> Result<url::Url, TransportError> {
    let mut base = base_url.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    url::Url::parse(&base)
        .and_then(|b| b.join(path))
        .map_err(|e| TransportError::InvalidUrl(e.to_string()))
}
