use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;

pub const CRUMB_FIELD: &str = "Jenkins-Crumb";
pub const CRUMB: &str = "4f2b8c1d";

/// Jobs known to the fake server, keyed by their `a/job/b` address
#[derive(Default)]
pub struct FakeJenkins {
    pub jobs: HashSet<String>,
    pub locked: HashSet<String>,
    pub deletes: Vec<String>,
    pub saw_auth: bool,
    /// Answer every delete with a redirect to the login page
    pub require_login: bool,
}

pub type Shared = Arc<Mutex<FakeJenkins>>;

pub struct TestServer {
    pub base_url: String,
    pub state: Shared,
}

impl TestServer {
    pub fn root_url(&self) -> String {
        format!("{}/", self.base_url)
    }

    pub fn has_job(&self, address: &str) -> bool {
        self.state.lock().unwrap().jobs.contains(address)
    }

    pub fn deletes(&self) -> Vec<String> {
        self.state.lock().unwrap().deletes.clone()
    }

    pub fn saw_auth(&self) -> bool {
        self.state.lock().unwrap().saw_auth
    }

    pub fn require_login(&self) {
        self.state.lock().unwrap().require_login = true;
    }
}

/// Start a fake automation server on a free port for the current test runtime
pub async fn spawn_server(jobs: &[&str], locked: &[&str]) -> Result<TestServer> {
    let state: Shared = Arc::new(Mutex::new(FakeJenkins {
        jobs: jobs.iter().map(|j| j.to_string()).collect(),
        locked: locked.iter().map(|j| j.to_string()).collect(),
        ..FakeJenkins::default()
    }));

    let app = Router::new()
        .route("/api/json", get(api_root))
        .route("/crumbIssuer/api/json", get(crumb))
        .route("/job/*rest", post(do_delete))
        .with_state(state.clone());

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind fake server")?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        state,
    })
}

/// Address nobody listens on
pub fn dead_url() -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    Ok(format!("http://127.0.0.1:{}/", port))
}

async fn crumb() -> Json<serde_json::Value> {
    Json(json!({
        "_class": "hudson.security.csrf.DefaultCrumbIssuer",
        "crumb": CRUMB,
        "crumbRequestField": CRUMB_FIELD,
    }))
}

async fn api_root() -> Json<serde_json::Value> {
    Json(json!({
        "_class": "hudson.model.Hudson",
        "mode": "NORMAL",
        "jobs": [],
    }))
}

async fn do_delete(
    State(state): State<Shared>,
    Path(rest): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(address) = rest.strip_suffix("/doDelete") else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if headers.get(CRUMB_FIELD).and_then(|v| v.to_str().ok()) != Some(CRUMB) {
        return StatusCode::FORBIDDEN.into_response();
    }

    let mut fake = state.lock().unwrap();
    if fake.require_login {
        let location = format!("/login?from=%2Fjob%2F{}", rest.replace('/', "%2F"));
        return (StatusCode::FOUND, [(header::LOCATION, location)]).into_response();
    }
    if headers.contains_key(header::AUTHORIZATION) {
        fake.saw_auth = true;
    }
    if !fake.jobs.contains(address) {
        return StatusCode::NOT_FOUND.into_response();
    }
    if fake.locked.contains(address) {
        return StatusCode::CONFLICT.into_response();
    }

    fake.jobs.remove(address);
    fake.deletes.push(address.to_string());
    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}
