//! In-memory stand-ins for the network-backed capabilities.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use templatewiz_lib::error::{FaviconError, FetchError, LlmError};
use templatewiz_lib::favicon::FaviconSource;
use templatewiz_lib::llm::{LanguageModel, Message};
use templatewiz_lib::net::{FetchResponse, HttpFetcher};
use templatewiz_lib::tokenizer::Tokenizer;
use url::Url;

/// Which pipeline stage a request comes from, judged by its trailing
/// instruction message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LocateCta,
    SelectStylesheets,
    CtaColor,
    FullPalette,
    Rewrite,
}

pub fn stage_of(messages: &[Message]) -> Stage {
    let last = messages.last().map(|m| m.content.as_str()).unwrap_or_default();
    if last.contains("call to action carrying") {
        Stage::LocateCta
    } else if last.contains("stylesheet URLs") {
        Stage::SelectStylesheets
    } else if last.contains("primary color of that element") {
        Stage::CtaColor
    } else if last.contains("brand colors and fonts") {
        Stage::FullPalette
    } else {
        Stage::Rewrite
    }
}

type Responder = dyn Fn(Stage, &[Message]) -> Result<String, LlmError> + Send + Sync;

/// Answers through a closure and records every request.
pub struct ScriptedModel {
    respond: Box<Responder>,
    calls: Mutex<Vec<(Stage, Vec<String>)>>,
}

impl ScriptedModel {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(Stage, &[Message]) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        ScriptedModel {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(Stage, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.calls().into_iter().map(|(stage, _)| stage).collect()
    }
}

impl LanguageModel for ScriptedModel {
    fn complete(&self, messages: &[Message], _model: &str, _temperature: f32) -> Result<String, LlmError> {
        let stage = stage_of(messages);
        let contents = messages.iter().map(|m| m.content.clone()).collect();
        self.calls.lock().unwrap().push((stage, contents));
        (self.respond)(stage, messages)
    }
}

/// Serves fixed responses by exact URL. Unknown URLs fail to connect.
#[derive(Default)]
pub struct StaticSite {
    pages: HashMap<String, FetchResponse>,
    requests: Mutex<Vec<String>>,
}

impl StaticSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, status: u16, body: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            FetchResponse {
                status,
                body: body.as_bytes().to_vec(),
            },
        );
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpFetcher for StaticSite {
    fn get(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchError::Connect {
                url: url.clone(),
                message: "connection refused".to_string(),
            })
    }
}

/// One token per whitespace-separated word.
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }

    fn truncate(&self, text: &str, max_tokens: usize) -> String {
        text.split_whitespace()
            .take(max_tokens)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Always reports the same colors and records which icons were asked for.
pub struct FixedFavicon {
    colors: Vec<(String, f64)>,
    icons: Mutex<Vec<String>>,
}

impl FixedFavicon {
    pub fn new(colors: &[(&str, f64)]) -> Self {
        FixedFavicon {
            colors: colors.iter().map(|(hex, pct)| (hex.to_string(), *pct)).collect(),
            icons: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.icons.lock().unwrap().len()
    }

    pub fn icons(&self) -> Vec<String> {
        self.icons.lock().unwrap().clone()
    }
}

impl FaviconSource for FixedFavicon {
    fn top_k_colors(&self, icon_url: &Url, k: usize) -> Result<Vec<(String, f64)>, FaviconError> {
        self.icons.lock().unwrap().push(icon_url.to_string());
        Ok(self.colors.iter().take(k).cloned().collect())
    }
}
