pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::app::medibot::{AssistantAnswer, MediBot, ServiceAnswer};
pub use crate::config::{cli::LocalStorage, toml_config::TomlConfig};
pub use crate::core::{assistant::GeminiAssistant, catalog::CenterCatalog, resolver::QueryResolver};
pub use crate::domain::model::{AssistantReply, ChatSession, FacilityRecord, Resolution};
pub use crate::utils::error::{MediBotError, Result};
