use crate::domain::model::{AssistantReply, ChatSession};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// Settings for the generative-language collaborator.
pub trait AssistantSettings: Send + Sync {
    fn endpoint(&self) -> &str;
    fn model(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn timeout_seconds(&self) -> u64;
    fn system_prompt(&self) -> Option<&str>;
}

pub trait ConfigProvider: Send + Sync {
    fn catalog_path(&self) -> &str;
    fn similarity_threshold(&self) -> f64;
    fn assistant_enabled(&self) -> bool;
    fn assistant(&self) -> &dyn AssistantSettings;
}

/// Remote generative-language service reached through a single request/response call.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Sends `prompt` in the context of `session` and returns the raw reply text
    /// alongside its parsed envelope. Never retries.
    async fn send(&self, session: &ChatSession, prompt: &str) -> Result<(String, AssistantReply)>;
}
