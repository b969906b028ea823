use url::Url;

use crate::error::LlmError;
use crate::llm::{LanguageModel, Message};
use crate::net::HttpFetcher;
use crate::parser::page::Page;

fn rewrite_prompt(reference_text: &str) -> String {
    format!(
        "Read the above email and rewrite it in the writing style of the article below.\n\
         Rules:\n\
         - Only return the rewritten email, no explanations\n\
         - Keep the main content of the original email\n\
         - Only change the writing style, do not make up information\n\
         - ONLY APPLY THE WRITING STYLE, DO NOT LEARN ANYTHING ELSE FROM THE ARTICLE BELOW.\n\
         ```\n{reference_text}\n```"
    )
}

/// Readable text of the article at `url`, or an empty string when it
/// cannot be retrieved.
pub fn reference_text(fetcher: &dyn HttpFetcher, url: &Url) -> String {
    match fetcher.get(url) {
        Ok(response) if response.is_ok() => Page::parse(&response.text(), url.clone()).readable_text(),
        Ok(response) => {
            log::warn!("reference article {url} returned HTTP {}", response.status);
            String::new()
        }
        Err(e) => {
            log::warn!("could not fetch reference article: {e}");
            String::new()
        }
    }
}

/// Rewrites `original_content` in the style of the article at
/// `reference_url`. A reference that cannot be fetched leaves the model
/// with an empty article.
pub fn apply_writing_style(
    fetcher: &dyn HttpFetcher,
    model: &dyn LanguageModel,
    model_name: &str,
    temperature: f32,
    original_content: &str,
    reference_url: &Url,
) -> Result<String, LlmError> {
    let text = reference_text(fetcher, reference_url);
    log::info!(
        "rewriting email against {} characters of reference text",
        text.chars().count()
    );
    let messages = [
        Message::user(original_content),
        Message::user(rewrite_prompt(&text)),
    ];
    let rewritten = model.complete(&messages, model_name, temperature)?;
    Ok(rewritten.trim().to_string())
}
