//! Palette attributes, partial results, and merging.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::llm::response::string_field;

/// The brand attributes a palette can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteAttribute {
    MainCallToActionButtonColor,
    PrimaryColor,
    SecondaryColor,
    BackgroundColor,
    TextColor,
    LinkColor,
    PrimaryFont,
    SecondaryFont,
}

impl PaletteAttribute {
    pub const ALL: [PaletteAttribute; 8] = [
        PaletteAttribute::MainCallToActionButtonColor,
        PaletteAttribute::PrimaryColor,
        PaletteAttribute::SecondaryColor,
        PaletteAttribute::BackgroundColor,
        PaletteAttribute::TextColor,
        PaletteAttribute::LinkColor,
        PaletteAttribute::PrimaryFont,
        PaletteAttribute::SecondaryFont,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PaletteAttribute::MainCallToActionButtonColor => "main_call_to_action_button_color",
            PaletteAttribute::PrimaryColor => "primary_color",
            PaletteAttribute::SecondaryColor => "secondary_color",
            PaletteAttribute::BackgroundColor => "background_color",
            PaletteAttribute::TextColor => "text_color",
            PaletteAttribute::LinkColor => "link_color",
            PaletteAttribute::PrimaryFont => "primary_font",
            PaletteAttribute::SecondaryFont => "secondary_font",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.key() == key)
    }
}

impl fmt::Display for PaletteAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// What one model answer said: at most one value per attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialPalette {
    values: BTreeMap<PaletteAttribute, String>,
}

impl PartialPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a partial from a decoded JSON object. Unknown keys, non-string
    /// values and blank strings are ignored.
    pub fn from_json(map: &Map<String, Value>) -> Self {
        let mut partial = PartialPalette::new();
        for key in map.keys() {
            match PaletteAttribute::from_key(key) {
                Some(attr) => {
                    if let Some(value) = string_field(map, key) {
                        partial.values.insert(attr, value);
                    }
                }
                None => log::debug!("ignoring unknown palette key {key:?}"),
            }
        }
        partial
    }

    pub fn with(mut self, attr: PaletteAttribute, value: impl Into<String>) -> Self {
        self.values.insert(attr, value.into());
        self
    }

    pub fn get(&self, attr: PaletteAttribute) -> Option<&str> {
        self.values.get(&attr).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PaletteAttribute, &str)> {
        self.values.iter().map(|(attr, v)| (*attr, v.as_str()))
    }
}

/// The merged result: every distinct (lower-cased) value seen per attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Palette {
    values: BTreeMap<PaletteAttribute, BTreeSet<String>>,
}

impl Palette {
    pub fn get(&self, attr: PaletteAttribute) -> Option<&BTreeSet<String>> {
        self.values.get(&attr)
    }

    pub fn contains(&self, attr: PaletteAttribute) -> bool {
        self.values.get(&attr).is_some_and(|set| !set.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PaletteAttribute, &BTreeSet<String>)> {
        self.values.iter().map(|(attr, set)| (*attr, set))
    }

    fn insert(&mut self, attr: PaletteAttribute, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        self.values
            .entry(attr)
            .or_default()
            .insert(value.to_lowercase());
    }
}

/// Folds partial answers into one palette. Values are case-folded and
/// deduplicated; blank values never appear. The result does not depend on
/// the order of `partials`.
pub fn merge<'a, I>(partials: I) -> Palette
where
    I: IntoIterator<Item = &'a PartialPalette>,
{
    let mut palette = Palette::default();
    for partial in partials {
        for (attr, value) in partial.iter() {
            palette.insert(attr, value);
        }
    }
    palette
}

/// Fills `primary_color` from the favicon when no answer supplied one.
///
/// `favicon_colors` is only called when needed; its top-ranked color is
/// used. If it fails or returns nothing, the palette is left as is.
pub fn apply_favicon_fallback<F, E>(palette: &mut Palette, favicon_colors: F)
where
    F: FnOnce() -> Result<Vec<(String, f64)>, E>,
    E: fmt::Display,
{
    if palette.contains(PaletteAttribute::PrimaryColor) {
        return;
    }
    match favicon_colors() {
        Ok(colors) => match colors.into_iter().next() {
            Some((hex, share)) => {
                log::info!("no primary color in stylesheets, using favicon color {hex} ({share:.1}%)");
                palette.insert(PaletteAttribute::PrimaryColor, &hex);
            }
            None => log::warn!("favicon produced no colors"),
        },
        Err(e) => log::warn!("favicon fallback failed: {e}"),
    }
}
