//! Token counting for context-budget enforcement.

use tiktoken_rs::CoreBPE;

use crate::error::ConfigError;

/// Counts and truncates text in model tokens. Must match the model the
/// language model client talks to, or budgets will drift.
pub trait Tokenizer: Send + Sync {
    fn count(&self, text: &str) -> usize;

    /// Keeps at most `max_tokens` tokens of `text`. May cut mid-structure.
    fn truncate(&self, text: &str, max_tokens: usize) -> String;
}

/// BPE tokenizer from `tiktoken-rs`.
pub struct TiktokenTokenizer {
    bpe: CoreBPE,
}

impl TiktokenTokenizer {
    /// Tokenizer for `model`, falling back to `cl100k_base` for model names
    /// tiktoken does not know (proxied or self-hosted models).
    pub fn for_model(model: &str) -> Result<Self, ConfigError> {
        let bpe = match tiktoken_rs::get_bpe_from_model(model) {
            Ok(bpe) => bpe,
            Err(_) => {
                log::debug!("no tokenizer registered for {model}, using cl100k_base");
                tiktoken_rs::cl100k_base().map_err(|e| ConfigError::Tokenizer(e.to_string()))?
            }
        };
        Ok(TiktokenTokenizer { bpe })
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    fn truncate(&self, text: &str, max_tokens: usize) -> String {
        let tokens = self.bpe.encode_with_special_tokens(text);
        if tokens.len() <= max_tokens {
            return text.to_string();
        }
        // A token boundary can split a multi-byte character; back off until
        // the prefix decodes.
        let mut end = max_tokens;
        while end > 0 {
            if let Ok(prefix) = self.bpe.decode(tokens[..end].to_vec()) {
                return prefix;
            }
            end -= 1;
        }
        String::new()
    }
}
