use url::Url;

use crate::llm::response::parse_string_list;
use crate::llm::{LanguageModel, Message};

const SELECT_PROMPT: &str = "Above are the stylesheet URLs of a website. Return only the site's own main stylesheets, not vendor or library ones, as a list of URLs in list format without any additional text.";

/// Asks the model which of `urls` are the site's authored stylesheets.
///
/// Anything other than a list of absolute URLs (scheme and host) in the
/// answer is discarded; a non-list answer or a failed call yields nothing.
pub fn select_stylesheets(
    model: &dyn LanguageModel,
    model_name: &str,
    temperature: f32,
    urls: &[Url],
) -> Vec<Url> {
    if urls.is_empty() {
        return Vec::new();
    }

    let listing: Vec<&str> = urls.iter().map(Url::as_str).collect();
    let listing = serde_json::to_string(&listing).unwrap_or_default();
    let messages = [Message::user(listing), Message::user(SELECT_PROMPT)];

    let answer = match model.complete(&messages, model_name, temperature) {
        Ok(answer) => answer,
        Err(e) => {
            log::warn!("stylesheet selection failed: {e}");
            return Vec::new();
        }
    };

    let Some(items) = parse_string_list(&answer) else {
        log::warn!("stylesheet selection answer is not a list: {answer:?}");
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match Url::parse(item.trim()) {
            Ok(url) if url.has_host() && !url.scheme().is_empty() => Some(url),
            _ => {
                log::debug!("dropping invalid stylesheet URL {item:?}");
                None
            }
        })
        .collect()
}
