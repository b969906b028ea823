use rayon::prelude::*;

use crate::config::ExtractorConfig;
use crate::extract::cta::CtaElements;
use crate::llm::response::parse_json_object;
use crate::llm::{LanguageModel, Message};
use crate::palette::{PaletteAttribute, PartialPalette};

const CTA_COLOR_PROMPT: &str = r#"Above are the call-to-action element and part of the site's CSS. What is the primary color of that element? Answer in the format {"primary_color": ""}. If it is not in the CSS, return {}."#;

const FULL_PALETTE_PROMPT: &str = "Given this part of the site's CSS, what are the brand colors and fonts of the whole website? Answer as a JSON object with the keys main_call_to_action_button_color, primary_color, secondary_color, background_color, text_color, link_color, primary_font, secondary_font. Colors are hex codes. Only include the keys you can find in the given CSS.";

enum CtaOutcome {
    Found(PartialPalette),
    /// Every chunk answered cleanly, none named a color.
    Exhausted,
    /// An answer could not be decoded.
    Aborted,
}

/// Queries the model once per chunk and collects what each answer says.
///
/// With a primary call-to-action selector, chunks are asked only for that
/// element's color, in order, stopping at the first chunk that names one.
/// An undecodable answer in this mode ends extraction with no results. If
/// every chunk answers without naming a color, extraction continues in
/// full-palette mode.
///
/// In full-palette mode every chunk is asked for the whole attribute set,
/// in parallel on at most `config.workers` threads. Undecodable answers are
/// skipped. Results keep chunk order.
pub fn extract_palettes(
    model: &dyn LanguageModel,
    config: &ExtractorConfig,
    chunks: &[String],
    cta: &CtaElements,
) -> Vec<PartialPalette> {
    if let Some(description) = cta.primary.describe() {
        match extract_cta_color(model, config, chunks, &description) {
            CtaOutcome::Found(partial) => return vec![partial],
            CtaOutcome::Aborted => return Vec::new(),
            CtaOutcome::Exhausted => {
                log::info!("no chunk names a color for {description}, asking for the full palette");
            }
        }
    }
    extract_full_palettes(model, config, chunks)
}

fn extract_cta_color(
    model: &dyn LanguageModel,
    config: &ExtractorConfig,
    chunks: &[String],
    description: &str,
) -> CtaOutcome {
    for (index, chunk) in chunks.iter().enumerate() {
        let messages = [
            Message::user(chunk.as_str()),
            Message::user(format!("CTA {description}")),
            Message::user(CTA_COLOR_PROMPT),
        ];
        let answer = match model.complete(&messages, &config.model, config.temperature) {
            Ok(answer) => answer,
            Err(e) => {
                log::warn!("call-to-action color query failed on chunk {index}: {e}");
                return CtaOutcome::Aborted;
            }
        };
        let Some(map) = parse_json_object(&answer) else {
            log::warn!("call-to-action color answer for chunk {index} is not JSON: {answer:?}");
            return CtaOutcome::Aborted;
        };
        let partial = PartialPalette::from_json(&map);
        if let Some(color) = partial.get(PaletteAttribute::PrimaryColor) {
            log::debug!("chunk {index} names call-to-action color {color}");
            return CtaOutcome::Found(
                PartialPalette::new().with(PaletteAttribute::PrimaryColor, color),
            );
        }
    }
    CtaOutcome::Exhausted
}

fn extract_full_palettes(
    model: &dyn LanguageModel,
    config: &ExtractorConfig,
    chunks: &[String],
) -> Vec<PartialPalette> {
    let query = |(index, chunk): (usize, &String)| -> Option<PartialPalette> {
        let messages = [Message::user(chunk.as_str()), Message::user(FULL_PALETTE_PROMPT)];
        match model.complete(&messages, &config.model, config.temperature) {
            Ok(answer) => match parse_json_object(&answer) {
                Some(map) => Some(PartialPalette::from_json(&map)),
                None => {
                    log::debug!("skipping chunk {index}: answer is not JSON");
                    None
                }
            },
            Err(e) => {
                log::warn!("skipping chunk {index}: {e}");
                None
            }
        }
    };

    match rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers.max(1))
        .build()
    {
        Ok(pool) => pool.install(|| chunks.par_iter().enumerate().filter_map(query).collect()),
        Err(e) => {
            log::warn!("could not start worker pool ({e}), querying chunks sequentially");
            chunks.iter().enumerate().filter_map(query).collect()
        }
    }
}
