use serde_json::{Map, Value};

use crate::llm::response::parse_json_object;
use crate::llm::{LanguageModel, Message};

const LOCATE_PROMPT: &str = r#"Look at this HTML. Which element is the main call to action carrying the primary color, and which carries the secondary color? Answer in the format {"primary_color_element": {"id": "", "class": ""}, "secondary_color_element": {"id": "", "class": ""}} and leave the fields blank if not found."#;

/// Identifies one DOM element by id and/or class. Both absent means
/// nothing was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CtaSelector {
    pub id: Option<String>,
    pub class: Option<String>,
}

impl CtaSelector {
    /// How the element is named to the model. An id is more specific than
    /// a class, so it wins when both are known.
    pub fn describe(&self) -> Option<String> {
        match (&self.id, &self.class) {
            (Some(id), _) => Some(format!("id: {id}")),
            (None, Some(class)) => Some(format!("class: {class}")),
            (None, None) => None,
        }
    }

    fn from_json(value: Option<&Value>) -> Self {
        let Some(Value::Object(map)) = value else {
            return CtaSelector::default();
        };
        CtaSelector {
            id: selector_part(map, "id"),
            class: selector_part(map, "class"),
        }
    }
}

/// The call-to-action elements the model found on a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CtaElements {
    pub primary: CtaSelector,
    pub secondary: CtaSelector,
}

/// Accepts a string, or a list of class names as some models return.
fn selector_part(map: &Map<String, Value>, key: &str) -> Option<String> {
    let text = match map.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Asks the model which element of `html_snippet` is the call to action.
///
/// The snippet must already fit the model's context. A failed call or an
/// answer that is not a JSON object yields empty selectors.
pub fn locate_cta(
    model: &dyn LanguageModel,
    model_name: &str,
    temperature: f32,
    html_snippet: &str,
) -> CtaElements {
    let messages = [Message::user(html_snippet), Message::user(LOCATE_PROMPT)];
    let answer = match model.complete(&messages, model_name, temperature) {
        Ok(answer) => answer,
        Err(e) => {
            log::warn!("call-to-action lookup failed: {e}");
            return CtaElements::default();
        }
    };

    match parse_json_object(&answer) {
        Some(map) => CtaElements {
            primary: CtaSelector::from_json(map.get("primary_color_element")),
            secondary: CtaSelector::from_json(map.get("secondary_color_element")),
        },
        None => {
            log::debug!("call-to-action answer is not JSON: {answer:?}");
            CtaElements::default()
        }
    }
}
