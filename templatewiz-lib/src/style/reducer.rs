use crate::style::owned_css::{OwnedDeclaration, StyleRule};
use lightningcss::printer::PrinterOptions;
use lightningcss::properties::{Property, PropertyId};
use lightningcss::rules::{style::StyleRule as LightningStyleRule, CssRule, CssRuleList};
use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use lightningcss::traits::ToCss;
use lightningcss::vendor_prefix::VendorPrefix;

/// Parses raw CSS and flattens it into owned style rules.
///
/// Only style rules survive. Grouping rules (`@media`, `@supports`,
/// `@layer` blocks, `@container`) contribute the style rules directly inside
/// them, with the grouping condition dropped. Everything else (`@font-face`,
/// `@keyframes`, `@import`, ...) is discarded.
///
/// Malformed CSS never errors: invalid rules are skipped by the parser's
/// error recovery, and if the sheet as a whole cannot be parsed the result
/// is empty.
pub fn reduce(raw_css: &str) -> Vec<StyleRule> {
    let options = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };
    let sheet = match StyleSheet::parse(raw_css, options) {
        Ok(sheet) => sheet,
        Err(e) => {
            log::warn!("discarding unparsable stylesheet: {e}");
            return Vec::new();
        }
    };

    let mut rules = Vec::new();
    for rule in &sheet.rules.0 {
        match rule {
            CssRule::Style(style_rule) => rules.push(convert_style_rule(style_rule)),
            CssRule::Media(media) => flatten_group(&media.rules, &mut rules),
            CssRule::Supports(supports) => flatten_group(&supports.rules, &mut rules),
            CssRule::LayerBlock(layer) => flatten_group(&layer.rules, &mut rules),
            CssRule::Container(container) => flatten_group(&container.rules, &mut rules),
            _ => {}
        }
    }
    rules
}

/// One level only: grouping rules nested inside a group are not entered.
fn flatten_group(group: &CssRuleList<'_>, rules: &mut Vec<StyleRule>) {
    for inner in &group.0 {
        if let CssRule::Style(style_rule) = inner {
            rules.push(convert_style_rule(style_rule));
        }
    }
}

fn convert_style_rule(style_rule: &LightningStyleRule<'_>) -> StyleRule {
    let selectors: Vec<String> = style_rule
        .selectors
        .0
        .iter()
        .filter_map(|selector| selector.to_css_string(PrinterOptions::default()).ok())
        .collect();

    let block = &style_rule.declarations;
    let declarations = block
        .declarations
        .iter()
        .chain(block.important_declarations.iter())
        .filter_map(convert_property)
        .collect();

    StyleRule::new(selectors.join(", "), declarations)
}

fn convert_property(property: &Property<'_>) -> Option<OwnedDeclaration> {
    let name = declared_name(&property.property_id());
    match property.value_to_css_string(PrinterOptions::default()) {
        Ok(value) => Some(OwnedDeclaration::new(name, value)),
        Err(e) => {
            log::debug!("dropping declaration {name}: {e}");
            None
        }
    }
}

/// Property name as written, vendor prefix included.
fn declared_name(id: &PropertyId<'_>) -> String {
    let prefix = id.prefix();
    let vendor = if prefix.contains(VendorPrefix::WebKit) {
        "-webkit-"
    } else if prefix.contains(VendorPrefix::Moz) {
        "-moz-"
    } else if prefix.contains(VendorPrefix::Ms) {
        "-ms-"
    } else if prefix.contains(VendorPrefix::O) {
        "-o-"
    } else {
        ""
    };
    format!("{vendor}{}", id.name())
}
