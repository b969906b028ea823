use crate::style::owned_css::StyleRule;

/// Properties that carry color or typography information, in output order.
pub const COLOR_PROPERTIES: &[&str] = &[
    "background-color",
    "background",
    "border",
    "border-color",
    "border-top-color",
    "border-right-color",
    "border-bottom-color",
    "border-left-color",
    "box-shadow",
    "caret-color",
    "color",
    "column-rule",
    "column-rule-color",
    "filter",
    "opacity",
    "outline",
    "outline-color",
    "text-decoration",
    "text-decoration-color",
    "text-shadow",
    "font",
    "font-family",
    "font-weight",
];

/// Reduces each rule to its color/typography declarations and renders it as
/// `selector { prop: value; ... }`.
///
/// A `:root` rule is passed through whole so that custom properties other
/// rules reference stay visible. Any other rule without a matching property
/// is dropped.
pub fn filter(rules: &[StyleRule]) -> Vec<String> {
    rules.iter().filter_map(filter_rule).collect()
}

fn filter_rule(rule: &StyleRule) -> Option<String> {
    if rule.is_root() {
        return Some(rule.to_string());
    }

    let kept: Vec<String> = COLOR_PROPERTIES
        .iter()
        .filter_map(|prop| rule.value_of(prop).map(|value| format!("{prop}: {value};")))
        .collect();

    if kept.is_empty() {
        None
    } else {
        Some(format!("{} {{ {} }}", rule.selector, kept.join(" ")))
    }
}
