// Fully-owned style rules, detached from the lightningcss parse lifetime.
use std::fmt;

/// One style rule: the selector text and its declarations in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    /// e.g. "div", ".nav a", ":root", "h1, h2"
    pub selector: String,
    pub declarations: Vec<OwnedDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedDeclaration {
    pub property: String,
    pub value: String,
}

impl OwnedDeclaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        OwnedDeclaration {
            property: property.into(),
            value: value.into(),
        }
    }
}

impl StyleRule {
    pub fn new(selector: impl Into<String>, declarations: Vec<OwnedDeclaration>) -> Self {
        StyleRule {
            selector: selector.into(),
            declarations,
        }
    }

    /// Value of `property` in this rule. When declared more than once the
    /// last declaration wins, as it would in the cascade.
    pub fn value_of(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .rev()
            .find(|d| d.property.eq_ignore_ascii_case(property))
            .map(|d| d.value.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn is_root(&self) -> bool {
        self.selector.trim() == ":root"
    }
}

/// Renders `selector { prop: value; ... }`.
impl fmt::Display for StyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.selector)?;
        for decl in &self.declarations {
            write!(f, " {}: {};", decl.property, decl.value)?;
        }
        write!(f, " }}")
    }
}
