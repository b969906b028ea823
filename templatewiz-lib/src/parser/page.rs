//! Read-only queries over a parsed page: inline styles, linked stylesheets,
//! favicon, and the `<body>` subtree.

use std::collections::HashMap;
use std::fmt::Write as _;

use url::Url;

use crate::dom::dom_tree::{Document, Handle, NodeKind};
use crate::parser::html::parse_html;

/// Void elements never get a closing tag when serialized.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose contents are not prose.
const NON_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "svg", "head"];

/// A parsed HTML page together with the URL it was loaded from.
pub struct Page {
    document: Document,
    base_url: Url,
    /// Lowercase tag name to every element with that tag, in document order.
    tag_map: HashMap<String, Vec<Handle>>,
}

impl Page {
    pub fn parse(html: &str, base_url: Url) -> Self {
        let document = parse_html(html);
        let mut tag_map = HashMap::new();
        index_tags(&document.root, &mut tag_map);
        Page {
            document,
            base_url,
            tag_map,
        }
    }

    fn elements(&self, tag: &str) -> &[Handle] {
        self.tag_map.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Text content of every `<style>` element, in document order.
    /// Empty style elements are skipped.
    pub fn inline_styles(&self) -> Vec<String> {
        self.elements("style")
            .iter()
            .map(text_content)
            .filter(|css| !css.trim().is_empty())
            .collect()
    }

    /// Absolute URLs of every `<link rel="stylesheet" href=...>`.
    pub fn stylesheet_links(&self) -> Vec<Url> {
        self.link_hrefs("stylesheet")
    }

    /// The first `<link rel~="icon">` href, or `/favicon.ico` on the page's origin.
    pub fn favicon_url(&self) -> Option<Url> {
        self.link_hrefs("icon")
            .into_iter()
            .next()
            .or_else(|| self.base_url.join("/favicon.ico").ok())
    }

    fn link_hrefs(&self, rel: &str) -> Vec<Url> {
        self.elements("link")
            .iter()
            .filter_map(|node| {
                let node = node.borrow();
                let elem = node.as_element()?;
                if !elem.has_rel(rel) {
                    return None;
                }
                let href = elem.attr("href")?.trim();
                if href.is_empty() {
                    return None;
                }
                match self.base_url.join(href) {
                    Ok(url) => Some(url),
                    Err(e) => {
                        log::debug!("skipping unresolvable link href {href:?}: {e}");
                        None
                    }
                }
            })
            .collect()
    }

    /// The `<body>` element serialized back to HTML, one node per line with
    /// two-space indentation. Empty when the document has no body.
    pub fn body_html(&self) -> String {
        let mut out = String::new();
        if let Some(body) = self.elements("body").first() {
            write_pretty(body, 0, &mut out);
        }
        out
    }

    /// Human-readable text of the page, one block of text per line.
    pub fn readable_text(&self) -> String {
        let mut lines = Vec::new();
        collect_text(&self.document.root, &mut lines);
        lines.join("\n")
    }
}

fn index_tags(node: &Handle, tag_map: &mut HashMap<String, Vec<Handle>>) {
    let node_ref = node.borrow();
    if let Some(elem) = node_ref.as_element() {
        tag_map
            .entry(elem.tag.to_ascii_lowercase())
            .or_default()
            .push(node.clone());
    }
    for child in &node_ref.children {
        index_tags(child, tag_map);
    }
}

fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    for child in &node.borrow().children {
        match &child.borrow().kind {
            NodeKind::Text(t) => text.push_str(t),
            NodeKind::Element(_) => text.push_str(&text_content(child)),
            _ => {}
        }
    }
    text
}

fn collect_text(node: &Handle, lines: &mut Vec<String>) {
    let node_ref = node.borrow();
    match &node_ref.kind {
        NodeKind::Text(text) => {
            let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if !collapsed.is_empty() {
                lines.push(collapsed);
            }
        }
        NodeKind::Element(elem) if NON_TEXT_ELEMENTS.contains(&elem.tag.as_str()) => {}
        NodeKind::Comment(_) => {}
        _ => {
            for child in &node_ref.children {
                collect_text(child, lines);
            }
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

fn write_pretty(node: &Handle, indent: usize, out: &mut String) {
    let indentation = "  ".repeat(indent);
    let node_ref = node.borrow();
    match &node_ref.kind {
        NodeKind::DocumentRoot => {
            for child in &node_ref.children {
                write_pretty(child, indent, out);
            }
        }
        NodeKind::Text(text) => {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                let _ = writeln!(out, "{indentation}{}", escape_text(trimmed));
            }
        }
        NodeKind::Comment(text) => {
            let _ = writeln!(out, "{indentation}<!--{text}-->");
        }
        NodeKind::Element(elem) => {
            let _ = write!(out, "{indentation}<{}", elem.tag);
            for (k, v) in &elem.attributes {
                let _ = write!(out, " {k}=\"{}\"", escape_attr(v));
            }
            out.push_str(">\n");
            if VOID_ELEMENTS.contains(&elem.tag.as_str()) {
                return;
            }
            for child in &node_ref.children {
                write_pretty(child, indent + 1, out);
            }
            let _ = writeln!(out, "{indentation}</{}>", elem.tag);
        }
    }
}
