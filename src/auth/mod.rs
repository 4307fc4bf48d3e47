use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::AppConfig;

/// Capabilities checked before a mutating action on a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// Generic "delete item" grant, checked by the local strategy
    #[serde(rename = "item.delete")]
    ItemDelete,
    /// Job-specific delete grant, checked by the remote strategy
    #[serde(rename = "job.delete")]
    JobDelete,
}

impl Permission {
    pub const ALL: [Permission; 2] = [Permission::ItemDelete, Permission::JobDelete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ItemDelete => "item.delete",
            Permission::JobDelete => "job.delete",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "item.delete" => Ok(Permission::ItemDelete),
            "job.delete" => Ok(Permission::JobDelete),
            other => Err(format!("Unknown permission: {}", other)),
        }
    }
}

/// Live automation-server context a request is evaluated against.
///
/// Requests never look this up themselves; callers pass `Some(ctx)` when a
/// server instance is available and `None` when it is not.
pub trait AuthorizationContext: Send + Sync {
    /// Whether the current principal holds `permission`
    fn has_permission(&self, permission: Permission) -> bool;

    /// Root URL of the server, if one is configured
    fn root_url(&self) -> Option<String>;
}

/// Authorization context assembled from configuration and the selected server
#[derive(Debug, Clone)]
pub struct ConfiguredAuthorization {
    granted: Vec<Permission>,
    root_url: Option<String>,
}

impl ConfiguredAuthorization {
    pub fn new(granted: Vec<Permission>, root_url: Option<String>) -> Self {
        Self { granted, root_url }
    }

    /// Grants from `SECURITY_GRANTED_PERMISSIONS` (or the environment default);
    /// `root_url` falls back to `JENKINS_URL`
    pub fn from_config(app: &AppConfig, root_url: Option<String>) -> Self {
        let granted = app.security.granted_permissions.clone();
        Self::new(granted, root_url.or_else(|| app.server.root_url.clone()))
    }

    pub fn granted(&self) -> &[Permission] {
        &self.granted
    }
}

impl AuthorizationContext for ConfiguredAuthorization {
    fn has_permission(&self, permission: Permission) -> bool {
        self.granted.contains(&permission)
    }

    fn root_url(&self) -> Option<String> {
        self.root_url.clone().filter(|url| !url.trim().is_empty())
    }
}
