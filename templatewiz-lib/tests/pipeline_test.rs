mod common;

use std::sync::Arc;

use common::{FixedFavicon, ScriptedModel, Stage, StaticSite, WordTokenizer};
use pretty_assertions::assert_eq;
use templatewiz_lib::retry::RetryConfig;
use templatewiz_lib::{ExtractError, ExtractionPipeline, ExtractorConfig, Palette, PaletteAttribute};

const PAGE: &str = "https://example.com/";

const HOME: &str = r#"<!DOCTYPE html>
<html>
<head>
  <link rel="stylesheet" href="/css/site.css">
  <link rel="icon" href="/static/icon.png">
  <link rel="stylesheet" href="/css/missing.css">
  <link rel="stylesheet" href="https://cdn.vendor.net/bootstrap.css">
  <style>body { color: #222222; margin: 0 } .layout { width: 100% }</style>
</head>
<body>
  <nav><a href="/">Home</a></nav>
  <button class="btn-primary">Start free trial</button>
</body>
</html>"#;

const SITE_CSS: &str = ".brand { background-color: #FF5500; padding: 4px } h1 { font-family: Inter, sans-serif }";

struct Harness {
    site: Arc<StaticSite>,
    model: Arc<ScriptedModel>,
    favicon: Arc<FixedFavicon>,
    pipeline: ExtractionPipeline,
}

fn harness(site: StaticSite, model: ScriptedModel) -> Harness {
    let site = Arc::new(site);
    let model = Arc::new(model);
    let favicon = Arc::new(FixedFavicon::new(&[("#123456", 61.0), ("#ffffff", 39.0)]));
    let config = ExtractorConfig {
        max_tokens: 200,
        workers: 2,
        retry: RetryConfig::none(),
        ..ExtractorConfig::default()
    };
    let pipeline = ExtractionPipeline::new(
        config,
        site.clone(),
        model.clone(),
        Arc::new(WordTokenizer),
        favicon.clone(),
    );
    Harness {
        site,
        model,
        favicon,
        pipeline,
    }
}

fn home_site() -> StaticSite {
    StaticSite::new()
        .with(PAGE, 200, HOME)
        .with("https://example.com/css/site.css", 200, SITE_CSS)
        .with("https://example.com/css/missing.css", 500, "oops")
}

const ALL_SHEETS: &str = r#"["https://example.com/css/site.css", "https://example.com/css/missing.css"]"#;

fn values(palette: &Palette, attr: PaletteAttribute) -> Vec<String> {
    palette
        .get(attr)
        .map(|set| set.iter().cloned().collect())
        .unwrap_or_default()
}

#[test]
fn page_error_stops_before_any_other_call() {
    let h = harness(
        StaticSite::new().with(PAGE, 404, "not here"),
        ScriptedModel::new(|_, _| Ok("{}".to_string())),
    );

    let err = h.pipeline.fetch_colors_from_url(PAGE).unwrap_err();
    assert!(matches!(err, ExtractError::PageStatus { status: 404, .. }));
    assert_eq!(h.site.requests(), vec![PAGE.to_string()]);
    assert!(h.model.calls().is_empty());
    assert_eq!(h.favicon.calls(), 0);
}

#[test]
fn invalid_url_is_rejected_without_fetching() {
    let h = harness(StaticSite::new(), ScriptedModel::new(|_, _| Ok("{}".to_string())));
    let err = h.pipeline.fetch_colors_from_url("not a url").unwrap_err();
    assert!(matches!(err, ExtractError::InvalidUrl { .. }));
    assert!(h.site.requests().is_empty());
}

#[test]
fn full_palette_from_inline_and_linked_css() {
    let h = harness(
        home_site(),
        ScriptedModel::new(|stage, messages| match stage {
            Stage::LocateCta => Ok("{}".to_string()),
            Stage::SelectStylesheets => Ok(ALL_SHEETS.to_string()),
            Stage::FullPalette => {
                assert!(messages[0].content.contains(".brand"));
                Ok(r##"```json
{"primary_color": "#FF5500", "text_color": "#222222", "primary_font": "Inter"}
```"##
                    .to_string())
            }
            other => panic!("unexpected {other:?} request"),
        }),
    );

    let palette = h.pipeline.fetch_colors_from_url(PAGE).unwrap();
    assert_eq!(values(&palette, PaletteAttribute::PrimaryColor), vec!["#ff5500"]);
    assert_eq!(values(&palette, PaletteAttribute::TextColor), vec!["#222222"]);
    assert_eq!(values(&palette, PaletteAttribute::PrimaryFont), vec!["inter"]);
    assert_eq!(h.favicon.calls(), 0);

    assert_eq!(
        h.model.stages(),
        vec![Stage::LocateCta, Stage::SelectStylesheets, Stage::FullPalette]
    );
}

#[test]
fn only_same_origin_links_are_offered_and_fetched() {
    let h = harness(
        home_site(),
        ScriptedModel::new(|stage, _| match stage {
            Stage::SelectStylesheets => Ok(ALL_SHEETS.to_string()),
            _ => Ok("{}".to_string()),
        }),
    );

    h.pipeline.fetch_colors_from_url(PAGE).unwrap();

    let calls = h.model.calls();
    let (_, selection) = calls
        .iter()
        .find(|(stage, _)| *stage == Stage::SelectStylesheets)
        .unwrap();
    assert!(selection[0].contains("https://example.com/css/site.css"));
    assert!(!selection[0].contains("cdn.vendor.net"));
    assert!(!h.site.requests().iter().any(|url| url.contains("cdn.vendor.net")));
}

#[test]
fn failing_stylesheet_is_skipped() {
    let h = harness(
        home_site(),
        ScriptedModel::new(|stage, messages| match stage {
            Stage::SelectStylesheets => Ok(ALL_SHEETS.to_string()),
            Stage::FullPalette if messages[0].content.contains(".brand") => {
                Ok(r##"{"primary_color": "#ff5500"}"##.to_string())
            }
            _ => Ok("{}".to_string()),
        }),
    );

    let palette = h.pipeline.fetch_colors_from_url(PAGE).unwrap();
    assert!(h
        .site
        .requests()
        .contains(&"https://example.com/css/missing.css".to_string()));
    assert_eq!(values(&palette, PaletteAttribute::PrimaryColor), vec!["#ff5500"]);
}

#[test]
fn favicon_supplies_missing_primary_color() {
    let h = harness(
        home_site(),
        ScriptedModel::new(|stage, _| match stage {
            Stage::SelectStylesheets => Ok("not a list".to_string()),
            Stage::FullPalette => Ok(r##"{"text_color": "#222222"}"##.to_string()),
            _ => Ok("{}".to_string()),
        }),
    );

    let palette = h.pipeline.fetch_colors_from_url(PAGE).unwrap();
    assert_eq!(values(&palette, PaletteAttribute::PrimaryColor), vec!["#123456"]);
    assert_eq!(values(&palette, PaletteAttribute::TextColor), vec!["#222222"]);
    assert_eq!(h.favicon.icons(), vec!["https://example.com/static/icon.png".to_string()]);
    // No stylesheet was selected, and the icon comes from the parsed page,
    // so the page was fetched exactly once.
    assert_eq!(h.site.requests(), vec![PAGE.to_string()]);
}

#[test]
fn call_to_action_color_wins() {
    let h = harness(
        home_site(),
        ScriptedModel::new(|stage, messages| match stage {
            Stage::LocateCta => {
                assert!(messages[0].content.contains("btn-primary"));
                Ok(r#"{"primary_color_element": {"id": "", "class": "btn-primary"},
                       "secondary_color_element": {"id": "", "class": ""}}"#
                    .to_string())
            }
            Stage::SelectStylesheets => Ok(ALL_SHEETS.to_string()),
            Stage::CtaColor => {
                assert_eq!(messages[1].content, "CTA class: btn-primary");
                Ok(r##"{"primary_color": "#FF5500"}"##.to_string())
            }
            other => panic!("unexpected {other:?} request"),
        }),
    );

    let palette = h.pipeline.fetch_colors_from_url(PAGE).unwrap();
    assert_eq!(values(&palette, PaletteAttribute::PrimaryColor), vec!["#ff5500"]);
    assert_eq!(palette.iter().count(), 1);
    assert_eq!(h.favicon.calls(), 0);
}
