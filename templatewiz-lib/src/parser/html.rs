//! Parses HTML into the owned tree from `crate::dom::dom_tree`.
//!
//! html5ever does the tokenizing and tree construction; this module only
//! supplies the `TreeSink` that records the result.

use crate::dom::dom_tree::{self, ElementNode, Handle, Node, NodeKind};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{
    interface::{ElemName, ElementFlags, NodeOrText, QuirksMode, TreeSink},
    Attribute, LocalName, Namespace, QualName,
};
use std::borrow::Cow;
use std::cell::Cell;
use std::rc::Rc;

/// Parses a full HTML document. Never fails: html5ever recovers from any
/// malformed input the way a browser would.
pub fn parse_html(html_content: &str) -> dom_tree::Document {
    let sink = TreeBuilderSink::new();
    html5ever::parse_document(sink, Default::default()).one(html_content)
}

/// Tree sink that builds a `dom_tree::Document`.
pub struct TreeBuilderSink {
    document: dom_tree::Document,
    quirks_mode: Cell<QuirksMode>,
    parse_errors: Cell<usize>,
}

impl TreeBuilderSink {
    pub fn new() -> Self {
        Self {
            document: dom_tree::new_document(),
            quirks_mode: Cell::new(QuirksMode::NoQuirks),
            parse_errors: Cell::new(0),
        }
    }
}

impl Default for TreeBuilderSink {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct OwnedElemName {
    ns: Namespace,
    local: LocalName,
}

impl ElemName for OwnedElemName {
    fn ns(&self) -> &Namespace {
        &self.ns
    }

    fn local_name(&self) -> &LocalName {
        &self.local
    }
}

fn to_handle(child: NodeOrText<Handle>) -> Handle {
    match child {
        NodeOrText::AppendNode(node) => node,
        NodeOrText::AppendText(text) => Node::new(NodeKind::Text(text.to_string())),
    }
}

impl TreeSink for TreeBuilderSink {
    type Handle = Handle;
    type Output = dom_tree::Document;
    type ElemName<'a>
        = OwnedElemName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        if self.parse_errors.get() > 0 {
            log::debug!("html parser recovered from {} errors", self.parse_errors.get());
        }
        log::trace!("document parsed in {:?} mode", self.quirks_mode.get());
        self.document
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        self.parse_errors.set(self.parse_errors.get() + 1);
        log::trace!("html parse error: {msg}");
    }

    fn get_document(&self) -> Self::Handle {
        self.document.root.clone()
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        match target.borrow().as_element() {
            Some(elem) => OwnedElemName {
                ns: elem.qual_name.ns.clone(),
                local: elem.qual_name.local.clone(),
            },
            // html5ever only asks for names of nodes it created as elements.
            None => OwnedElemName {
                ns: Namespace::from(""),
                local: LocalName::from(""),
            },
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let attributes = attrs
            .into_iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect();
        Node::new(NodeKind::Element(ElementNode::new(name, attributes)))
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        Node::new(NodeKind::Comment(text.to_string()))
    }

    fn create_pi(&self, _target: StrTendril, data: StrTendril) -> Self::Handle {
        Node::new(NodeKind::Comment(data.to_string()))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        dom_tree::append_child(parent, to_handle(child));
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let has_parent = element.borrow().parent.is_some();
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        *self.document.doctype.borrow_mut() = Some(dom_tree::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        });
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        target.clone()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        self.quirks_mode.set(mode);
    }

    fn append_before_sibling(&self, sibling: &Self::Handle, child: NodeOrText<Self::Handle>) {
        dom_tree::insert_before(sibling, to_handle(child));
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>) {
        let mut target_node = target.borrow_mut();
        if let NodeKind::Element(elem) = &mut target_node.kind {
            for attr in attrs {
                let key = attr.name.local.to_string();
                if !elem.attributes.iter().any(|(k, _)| *k == key) {
                    elem.attributes.push((key, attr.value.to_string()));
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        dom_tree::detach(target);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        dom_tree::reparent_children(node, new_parent);
    }
}
