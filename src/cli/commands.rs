use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// `cognitive-gatekeeper` - safety-gated request router.
#[derive(Parser, Debug)]
#[command(name = "cognitive-gatekeeper")]
#[command(version = "0.1.0")]
#[command(about = "Crisis-first, circuit-breaking message router.", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.cognitive-gatekeeper/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the crisis detector on a piece of text and print the assessment
    Assess {
        /// Text to assess
        text: String,
    },

    /// Route stdin lines through the gatekeeper with a local echo processor
    Chat {
        /// User id the messages are attributed to
        #[arg(short, long, default_value = "local")]
        user: String,

        /// Make every Nth processor call fail, to exercise the breaker
        #[arg(long)]
        fail_every: Option<u32>,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        config_command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective config as TOML
    Show,
    /// Check the config against its bounds
    Validate {
        /// Config file to check; defaults to the global --config or home path
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

impl Cli {
    /// Config file this invocation should read, if one was named.
    pub fn config_path(&self) -> Option<&Path> {
        match &self.command {
            Commands::Config {
                config_command: ConfigCommands::Validate { path: Some(path) },
            } => Some(path),
            _ => self.config.as_deref(),
        }
    }
}

impl Commands {
    /// `assess` runs on the built-in patterns alone and never touches config.
    pub fn uses_config(&self) -> bool {
        !matches!(self, Self::Assess { .. })
    }
}
