use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::auth::Permission;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerSettings,
    pub http: HttpConfig,
    pub security: SecurityConfig,
    pub local: LocalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Default automation server, used when no CLI profile is selected
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSettings {
    pub root_url: Option<String>,
    pub username: Option<String>,
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub fetch_crumb: bool,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub granted_permissions: Vec<Permission>,
    pub enable_audit_logging: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalConfig {
    pub jobs_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("JENKINS_URL") {
            self.server.root_url = Some(v);
        }
        if let Ok(v) = env::var("JENKINS_USER") {
            self.server.username = Some(v);
        }
        if let Ok(v) = env::var("JENKINS_API_TOKEN") {
            self.server.api_token = Some(v);
        }

        // HTTP overrides
        if let Ok(v) = env::var("HTTP_TIMEOUT_SECS") {
            self.http.timeout_secs = v.parse().unwrap_or(self.http.timeout_secs);
        }
        if let Ok(v) = env::var("HTTP_FETCH_CRUMB") {
            self.http.fetch_crumb = v.parse().unwrap_or(self.http.fetch_crumb);
        }
        if let Ok(v) = env::var("HTTP_USER_AGENT") {
            self.http.user_agent = v;
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_GRANTED_PERMISSIONS") {
            self.security.granted_permissions = parse_permissions(&v);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_AUDIT_LOGGING") {
            self.security.enable_audit_logging =
                v.parse().unwrap_or(self.security.enable_audit_logging);
        }

        // Local overrides
        if let Ok(v) = env::var("JENKINS_JOBS_DIR") {
            self.local.jobs_dir = Some(PathBuf::from(v));
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerSettings::default(),
            http: HttpConfig {
                timeout_secs: 30,
                fetch_crumb: true,
                user_agent: default_user_agent(),
            },
            security: SecurityConfig {
                granted_permissions: Permission::ALL.to_vec(),
                enable_audit_logging: false,
            },
            local: LocalConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerSettings::default(),
            http: HttpConfig {
                timeout_secs: 15,
                fetch_crumb: true,
                user_agent: default_user_agent(),
            },
            security: SecurityConfig {
                granted_permissions: Vec::new(),
                enable_audit_logging: true,
            },
            local: LocalConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerSettings::default(),
            http: HttpConfig {
                timeout_secs: 10,
                fetch_crumb: true,
                user_agent: default_user_agent(),
            },
            security: SecurityConfig {
                granted_permissions: Vec::new(),
                enable_audit_logging: true,
            },
            local: LocalConfig::default(),
        }
    }
}

fn default_user_agent() -> String {
    format!("jobreq/{}", env!("CARGO_PKG_VERSION"))
}

/// Parse a comma-separated permission list, skipping unknown entries
pub fn parse_permissions(raw: &str) -> Vec<Permission> {
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .filter_map(|s| match s.parse::<Permission>() {
            Ok(permission) => Some(permission),
            Err(e) => {
                tracing::warn!("Ignoring granted permission entry: {}", e);
                None
            }
        })
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
