//! Language model capability.
//!
//! The pipeline only ever needs "send these messages, get text back"; prompt
//! wording and model choice are configuration, not structure.

mod openai;
pub mod response;

pub use openai::{OpenAiCompatibleModel, DEFAULT_API_BASE};

use serde::Serialize;

use crate::error::LlmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A chat-completion backend. Implementations must be callable from
/// several threads at once; chunk queries run in parallel.
pub trait LanguageModel: Send + Sync {
    fn complete(&self, messages: &[Message], model: &str, temperature: f32)
        -> Result<String, LlmError>;
}
