use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub url: String,
    pub username: Option<String>,
    pub api_token: Option<String>,
    pub description: String,
    pub added_at: DateTime<Utc>,
    pub last_ping: Option<DateTime<Utc>>,
    pub status: ServerStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Up,
    Down,
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub servers: HashMap<String, ServerInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub current_server: Option<String>,
}

impl ServerInfo {
    pub fn new(
        url: String,
        username: Option<String>,
        api_token: Option<String>,
        description: String,
    ) -> Self {
        Self {
            url,
            username,
            api_token,
            description,
            added_at: Utc::now(),
            last_ping: None,
            status: ServerStatus::Unknown,
        }
    }

    /// Root URL with the trailing slash the server's own links carry
    pub fn root_url(&self) -> String {
        if self.url.ends_with('/') {
            self.url.clone()
        } else {
            format!("{}/", self.url)
        }
    }

    pub fn update_ping(&mut self, status: ServerStatus) {
        self.last_ping = Some(Utc::now());
        self.status = status;
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("JOBREQ_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME")
            .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("jobreq")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

fn load_json<T: Default + for<'de> Deserialize<'de>>(file: &Path) -> anyhow::Result<T> {
    if !file.exists() {
        return Ok(T::default());
    }

    let content = fs::read_to_string(file)?;
    Ok(serde_json::from_str(&content)?)
}

fn save_json<T: Serialize>(file: &Path, value: &T) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(file, content)?;
    Ok(())
}

pub fn load_server_config_in(dir: &Path) -> anyhow::Result<ServerConfig> {
    load_json(&dir.join("server.json"))
}

pub fn save_server_config_in(dir: &Path, config: &ServerConfig) -> anyhow::Result<()> {
    save_json(&dir.join("server.json"), config)
}

pub fn load_environment_config_in(dir: &Path) -> anyhow::Result<EnvironmentConfig> {
    load_json(&dir.join("env.json"))
}

pub fn save_environment_config_in(dir: &Path, config: &EnvironmentConfig) -> anyhow::Result<()> {
    save_json(&dir.join("env.json"), config)
}

/// Named server, or the current one when `name` is `None`
pub fn resolve_server_in(
    dir: &Path,
    name: Option<&str>,
) -> anyhow::Result<Option<(String, ServerInfo)>> {
    let name = match name {
        Some(name) => name.to_string(),
        None => match load_environment_config_in(dir)?.current_server {
            Some(current) => current,
            None => return Ok(None),
        },
    };

    let servers = load_server_config_in(dir)?;
    match servers.servers.get(&name) {
        Some(info) => Ok(Some((name, info.clone()))),
        None => Err(anyhow::anyhow!("Server '{}' not found", name)),
    }
}

pub async fn ping_server(server_info: &ServerInfo) -> ServerStatus {
    let client = reqwest::Client::new();
    let url = format!("{}api/json", server_info.root_url());

    let mut request = client.get(&url).timeout(std::time::Duration::from_secs(5));
    if let (Some(user), Some(token)) = (&server_info.username, &server_info.api_token) {
        request = request.basic_auth(user, Some(token));
    }

    match request.send().await {
        Ok(response) if response.status().is_success() => ServerStatus::Up,
        _ => ServerStatus::Down,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_root_url_has_trailing_slash() {
        let info = ServerInfo::new("http://ci:8080".to_string(), None, None, String::new());
        assert_eq!(info.root_url(), "http://ci:8080/");

        let info =
            ServerInfo::new("http://ci:8080/jenkins/".to_string(), None, None, String::new());
        assert_eq!(info.root_url(), "http://ci:8080/jenkins/");
    }

    #[test]
    fn test_server_config_round_trip_on_disk() {
        let dir = std::env::temp_dir().join(format!("jobreq_cfg_{}", Uuid::new_v4().simple()));
        fs::create_dir_all(&dir).unwrap();

        assert!(load_server_config_in(&dir).unwrap().servers.is_empty());

        let mut config = ServerConfig::default();
        config.servers.insert(
            "ci".to_string(),
            ServerInfo::new(
                "http://ci:8080".to_string(),
                Some("alice".to_string()),
                None,
                "main".to_string(),
            ),
        );
        save_server_config_in(&dir, &config).unwrap();

        let loaded = load_server_config_in(&dir).unwrap();
        let info = &loaded.servers["ci"];
        assert_eq!(info.username.as_deref(), Some("alice"));
        assert_eq!(info.status, ServerStatus::Unknown);

        assert!(resolve_server_in(&dir, None).unwrap().is_none());
        let (name, _) = resolve_server_in(&dir, Some("ci")).unwrap().unwrap();
        assert_eq!(name, "ci");
        assert!(resolve_server_in(&dir, Some("other")).is_err());

        fs::remove_dir_all(dir).unwrap();
    }
}
