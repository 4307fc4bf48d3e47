use clap::Subcommand;
use serde_json::json;
use std::path::Path;

use crate::cli::config::{self, ServerInfo};
use crate::cli::{utils, OutputFormat};

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Register an automation server")]
    Add {
        #[arg(help = "Server name")]
        name: String,
        #[arg(help = "Server root URL")]
        url: String,
        #[arg(long, help = "User to authenticate as")]
        user: Option<String>,
        #[arg(long, help = "API token for the user")]
        token: Option<String>,
        #[arg(long, default_value = "", help = "Free-form description")]
        description: String,
    },

    #[command(about = "List registered servers")]
    List,

    #[command(about = "Show currently selected server")]
    Current,

    #[command(about = "Switch to server (persistent selection)")]
    Use {
        #[arg(help = "Server name to switch to")]
        name: String,
    },

    #[command(about = "Remove server from registry")]
    Delete {
        #[arg(help = "Server name to delete")]
        name: String,
    },

    #[command(about = "Health check specific server (defaults to current server)")]
    Ping {
        #[arg(help = "Server name to ping")]
        name: Option<String>,
    },
}

/// Returns `false` when the command ran but reported a failure
pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<bool> {
    handle_in(&config::get_config_dir()?, cmd, output_format).await
}

/// Same as [`handle`], with profiles read from and written to `dir`
pub async fn handle_in(
    dir: &Path,
    cmd: ServerCommands,
    output_format: OutputFormat,
) -> anyhow::Result<bool> {
    match cmd {
        ServerCommands::Add { name, url, user, token, description } => {
            url::Url::parse(&url)
                .map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {}", url, e))?;

            let mut servers = config::load_server_config_in(dir)?;
            if servers.servers.contains_key(&name) {
                return Err(anyhow::anyhow!("Server '{}' already exists", name));
            }
            let info = ServerInfo::new(url.clone(), user, token, description);
            servers.servers.insert(name.clone(), info);
            config::save_server_config_in(dir, &servers)?;

            // First server becomes the current one
            let mut env = config::load_environment_config_in(dir)?;
            if env.current_server.is_none() {
                env.current_server = Some(name.clone());
                config::save_environment_config_in(dir, &env)?;
            }

            utils::output_success(
                &output_format,
                &format!("Server '{}' added ({})", name, url),
                Some(json!({ "server": name, "url": url })),
            )?;
            Ok(true)
        }
        ServerCommands::List => {
            let servers = config::load_server_config_in(dir)?;
            if servers.servers.is_empty() {
                utils::output_empty_collection(&output_format, "servers", "No servers registered")?;
                return Ok(true);
            }

            let current = config::load_environment_config_in(dir)?.current_server;
            let mut names: Vec<&String> = servers.servers.keys().collect();
            names.sort();

            match output_format {
                OutputFormat::Json => {
                    let list: Vec<_> = names
                        .iter()
                        .map(|name| {
                            let info = &servers.servers[*name];
                            json!({
                                "name": name,
                                "url": info.url,
                                "username": info.username,
                                "status": info.status,
                                "current": current.as_deref() == Some(name.as_str()),
                            })
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&json!({ "servers": list }))?);
                }
                OutputFormat::Text => {
                    for name in names {
                        let info = &servers.servers[name];
                        let marker = if current.as_deref() == Some(name.as_str()) {
                            "*"
                        } else {
                            " "
                        };
                        println!("{} {:<16} {:<40} {:?}", marker, name, info.url, info.status);
                    }
                }
            }
            Ok(true)
        }
        ServerCommands::Current => match config::resolve_server_in(dir, None)? {
            Some((name, info)) => utils::output_current_item(
                &output_format,
                "server",
                &name,
                json!({
                    "name": name,
                    "url": info.url,
                    "username": info.username,
                    "description": info.description,
                }),
            ),
            None => utils::output_no_current_item(&output_format, "server"),
        }
        .map(|()| true),
        ServerCommands::Use { name } => utils::switch_current_item(
            &name,
            "server",
            |n| Ok(config::load_server_config_in(dir)?.servers.contains_key(n)),
            |n| {
                let mut env = config::load_environment_config_in(dir)?;
                env.current_server = Some(n.to_string());
                config::save_environment_config_in(dir, &env)
            },
            &output_format,
        )
        .map(|()| true),
        ServerCommands::Delete { name } => utils::delete_item_with_current_check(
            &name,
            "server",
            |n| Ok(config::load_server_config_in(dir)?.servers.contains_key(n)),
            |n| {
                let mut servers = config::load_server_config_in(dir)?;
                servers.servers.remove(n);
                config::save_server_config_in(dir, &servers)
            },
            |n| {
                let mut env = config::load_environment_config_in(dir)?;
                if env.current_server.as_deref() == Some(n) {
                    env.current_server = None;
                    config::save_environment_config_in(dir, &env)?;
                }
                Ok(())
            },
            &output_format,
        )
        .map(|()| true),
        ServerCommands::Ping { name } => ping(dir, name, &output_format).await,
    }
}

async fn ping(
    dir: &Path,
    name: Option<String>,
    output_format: &OutputFormat,
) -> anyhow::Result<bool> {
    let (name, info) = config::resolve_server_in(dir, name.as_deref())?
        .ok_or_else(|| anyhow::anyhow!("No current server set"))?;

    let status = config::ping_server(&info).await;

    let mut servers = config::load_server_config_in(dir)?;
    if let Some(entry) = servers.servers.get_mut(&name) {
        entry.update_ping(status);
        config::save_server_config_in(dir, &servers)?;
    }

    if status == config::ServerStatus::Up {
        utils::output_success(
            output_format,
            &format!("Server '{}' is up", name),
            Some(json!({ "server": name, "status": status })),
        )?;
        Ok(true)
    } else {
        utils::output_error(
            output_format,
            &format!("Server '{}' is unreachable", name),
            Some("SERVER_DOWN"),
        )?;
        Ok(false)
    }
}
