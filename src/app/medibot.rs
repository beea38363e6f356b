use crate::app::render;
use crate::core::assistant::GeminiAssistant;
use crate::core::catalog::CenterCatalog;
use crate::core::resolver::QueryResolver;
use crate::domain::model::{ChatSession, Resolution};
use crate::domain::ports::{Assistant, ConfigProvider, Storage};
use crate::utils::error::{MediBotError, Result};

pub const REFUSAL_FALLBACK: &str = "I apologize, but I encountered an issue while generating a response. Could you please rephrase your question or try a different query?";
pub const PARSE_FALLBACK: &str =
    "I'm sorry, but I couldn't process the response correctly. Could you please try again?";
pub const UNEXPECTED_FALLBACK: &str = "An unexpected error occurred. Please try again.";
pub const ASSISTANT_DISABLED: &str =
    "The assistant is not configured. Service lookups are still available.";

/// Result of a service query, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceAnswer {
    pub notice: Option<String>,
    pub listing: String,
}

/// Result of one assistant turn, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantAnswer {
    pub text: String,
    pub quit: bool,
}

/// Application facade: answers service queries from the catalog and relays
/// free-text prompts to the assistant.
pub struct MediBot<A: Assistant> {
    catalog: CenterCatalog,
    resolver: QueryResolver,
    assistant: Option<A>,
}

impl MediBot<GeminiAssistant> {
    /// Loads the catalog and, when enabled, builds the Gemini client.
    pub async fn bootstrap<C: ConfigProvider, S: Storage>(config: &C, storage: &S) -> Result<Self> {
        let catalog = load_catalog(storage, config.catalog_path()).await?;
        let resolver = QueryResolver::new(config.similarity_threshold());
        let assistant = if config.assistant_enabled() {
            Some(GeminiAssistant::from_settings(config.assistant())?)
        } else {
            None
        };
        Ok(Self::new(catalog, resolver, assistant))
    }
}

impl<A: Assistant> MediBot<A> {
    pub fn new(catalog: CenterCatalog, resolver: QueryResolver, assistant: Option<A>) -> Self {
        Self {
            catalog,
            resolver,
            assistant,
        }
    }

    pub fn catalog(&self) -> &CenterCatalog {
        &self.catalog
    }

    pub fn service_tags(&self) -> Vec<&str> {
        self.catalog.all_service_tags().into_iter().collect()
    }

    pub fn resolve(&self, raw_keyword: &str) -> Resolution<'_> {
        self.resolver.resolve(&self.catalog, raw_keyword)
    }

    pub fn answer_service_query(&self, raw_keyword: &str) -> ServiceAnswer {
        let resolution = self.resolve(raw_keyword);
        ServiceAnswer {
            notice: render::resolution_notice(&resolution),
            listing: render::render_listing(resolution.matches()),
        }
    }

    /// Relays `prompt` to the assistant. Failures become fixed apology strings
    /// and leave the session untouched.
    pub async fn answer_prompt(&self, session: &mut ChatSession, prompt: &str) -> AssistantAnswer {
        let Some(assistant) = &self.assistant else {
            return AssistantAnswer {
                text: ASSISTANT_DISABLED.to_string(),
                quit: false,
            };
        };

        match assistant.send(session, prompt).await {
            Ok((raw, reply)) => {
                session.record_exchange(prompt, &raw);
                if reply.quit {
                    tracing::info!("Assistant ended the conversation");
                    session.end();
                }
                AssistantAnswer {
                    text: reply.response,
                    quit: reply.quit,
                }
            }
            Err(e) => {
                tracing::warn!("Assistant request failed: {} (Category: {:?})", e, e.category());
                AssistantAnswer {
                    text: fallback_for(&e).to_string(),
                    quit: false,
                }
            }
        }
    }
}

pub async fn load_catalog<S: Storage>(storage: &S, path: &str) -> Result<CenterCatalog> {
    tracing::debug!("Reading service table from: {}", path);
    let data = storage.read_file(path).await?;
    let catalog = CenterCatalog::load(&data)?;
    tracing::debug!(
        "Catalog holds {} records and {} service tags",
        catalog.len(),
        catalog.all_service_tags().len()
    );
    Ok(catalog)
}

fn fallback_for(error: &MediBotError) -> &'static str {
    match error {
        MediBotError::AssistantRefused { .. } => REFUSAL_FALLBACK,
        MediBotError::MalformedReply { .. } | MediBotError::SerializationError(_) => PARSE_FALLBACK,
        _ => UNEXPECTED_FALLBACK,
    }
}
