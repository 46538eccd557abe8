use crate::app::echo::EchoProcessor;
use crate::cli::commands::{Cli, Commands, ConfigCommands};
use anyhow::{Context, Result};
use cognitive_gatekeeper::Config;
use cognitive_gatekeeper::core::gatekeeper::Gatekeeper;
use cognitive_gatekeeper::security::crisis;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_init()?,
    };
    Ok(config)
}

/// `config` is whatever `main` already loaded; commands that need one and
/// did not get it load it here.
pub async fn dispatch(cli: Cli, config: Option<Result<Config>>) -> Result<()> {
    let config_path = cli.config_path().map(Path::to_path_buf);
    let config = move || config.unwrap_or_else(|| load_config(config_path.as_deref()));

    match cli.command {
        Commands::Assess { text } => {
            let assessment = crisis::assess(&text);
            println!("{}", serde_json::to_string_pretty(&assessment)?);
            Ok(())
        }
        Commands::Chat { user, fail_every } => run_chat(config()?, &user, fail_every).await,
        Commands::Config { config_command } => match config_command {
            ConfigCommands::Show => {
                let config = config()?;
                println!(
                    "{}",
                    toml::to_string_pretty(&config).context("Failed to serialize config")?
                );
                Ok(())
            }
            ConfigCommands::Validate { .. } => match config() {
                Ok(config) => {
                    println!("config ok: {}", config.config_path.display());
                    Ok(())
                }
                Err(err) => {
                    println!("config invalid: {err:#}");
                    Err(err)
                }
            },
        },
    }
}

async fn run_chat(config: Config, user: &str, fail_every: Option<u32>) -> Result<()> {
    let processor = Arc::new(EchoProcessor::new(fail_every));
    let gatekeeper = Gatekeeper::from_config(&config, processor)?;
    tracing::info!(user_id = %user, "Chat session started; one message per line, EOF to stop");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let result = gatekeeper.handle(user, &line).await?;
        println!("{}", result.response);
        println!(
            "  [route={} actions={} load={:.2} {}ms]",
            result.route.as_str(),
            result.actions_taken.join(","),
            result.cognitive_load,
            result.processing_time_ms
        );
    }

    println!("{}", serde_json::to_string_pretty(&gatekeeper.get_stats())?);
    let audit_events = gatekeeper.recent_audit_events();
    if !audit_events.is_empty() {
        println!("{}", serde_json::to_string_pretty(&audit_events)?);
    }
    Ok(())
}
