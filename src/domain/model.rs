use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the service table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub name: String,
    /// Lower-cased, trimmed tags in source order, without duplicates.
    pub services: Vec<String>,
    pub address: String,
    pub phone: String,
    pub hours: String,
    pub rating: String,
    pub fee: f64,
}

impl FacilityRecord {
    /// True if `keyword` occurs inside any of the record's tags.
    pub fn offers(&self, keyword: &str) -> bool {
        self.services.iter().any(|service| service.contains(keyword))
    }
}

/// Outcome of resolving a raw service keyword against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution<'a> {
    ExactOrSubstring {
        matches: Vec<&'a FacilityRecord>,
    },
    Corrected {
        suggested_tag: String,
        matches: Vec<&'a FacilityRecord>,
    },
    NoMatch,
}

impl<'a> Resolution<'a> {
    pub fn matches(&self) -> &[&'a FacilityRecord] {
        match self {
            Resolution::ExactOrSubstring { matches } | Resolution::Corrected { matches, .. } => {
                matches
            }
            Resolution::NoMatch => &[],
        }
    }
}

/// Structured envelope the assistant is asked to answer with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssistantReply {
    pub response: String,
    pub quit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Conversation state for one user. Owned by the caller and passed into each turn.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    history: Vec<ChatTurn>,
    ended: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// Records a completed exchange. Failed exchanges are never recorded.
    pub fn record_exchange(&mut self, prompt: &str, raw_reply: &str) {
        let now = Utc::now();
        self.history.push(ChatTurn {
            role: Role::User,
            text: prompt.to_string(),
            at: now,
        });
        self.history.push(ChatTurn {
            role: Role::Model,
            text: raw_reply.to_string(),
            at: now,
        });
    }

    pub fn end(&mut self) {
        self.ended = true;
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.ended = false;
    }
}
