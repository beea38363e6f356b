pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use crate::config::toml_config::TomlConfig;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "medibot")]
#[command(about = "Find medical centers by service and chat with an AI assistant")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// CSV table of medical centers (overrides catalog.path)
    #[arg(long)]
    pub data: Option<String>,

    /// Minimum similarity (0-1) for spelling corrections
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Assistant API base URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Assistant model name
    #[arg(long)]
    pub model: Option<String>,

    /// Assistant request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Instruction sent to the assistant ahead of every conversation
    #[arg(long)]
    pub system_prompt: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List every known service
    Services,
    /// Find centers offering a service
    Lookup {
        #[arg(required = true, num_args = 1..)]
        keyword: Vec<String>,

        /// Print the resolution as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask the assistant a single question
    Ask {
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
    /// Interactive session (/service <name>, /reset, /quit)
    Chat,
}

#[cfg(feature = "cli")]
impl Command {
    pub fn needs_assistant(&self) -> bool {
        matches!(self, Command::Ask { .. } | Command::Chat)
    }
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Builds the effective settings: TOML file (if any), then flag overrides,
    /// then the API key from the environment when none was configured.
    pub fn settings(&self) -> Result<TomlConfig> {
        let mut settings = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(data) = &self.data {
            settings.catalog.path = data.clone();
        }
        if let Some(threshold) = self.threshold {
            settings.resolver.similarity_threshold = threshold;
        }
        if let Some(endpoint) = &self.endpoint {
            settings.assistant.endpoint = endpoint.clone();
        }
        if let Some(model) = &self.model {
            settings.assistant.model = model.clone();
        }
        if let Some(timeout) = self.timeout {
            settings.assistant.timeout_seconds = timeout;
        }
        if let Some(system_prompt) = &self.system_prompt {
            settings.assistant.system_prompt = Some(system_prompt.clone());
        }
        if settings.assistant.api_key.is_none() {
            settings.assistant.api_key = std::env::var(API_KEY_ENV).ok();
        }
        if self.command.needs_assistant() {
            settings.assistant.enabled = true;
        }

        Ok(settings)
    }
}
