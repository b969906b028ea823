use html5ever::QualName;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub mod dom_tree {
    use super::*;

    /// Shared handle to a node in the tree.
    pub type Handle = Rc<RefCell<Node>>;

    #[derive(Debug)]
    pub struct Node {
        pub kind: NodeKind,
        pub parent: Option<Weak<RefCell<Node>>>,
        pub children: Vec<Handle>,
    }

    #[derive(Debug, Clone)]
    pub enum NodeKind {
        DocumentRoot,
        Element(ElementNode),
        Text(String),
        Comment(String),
    }

    #[derive(Debug, Clone)]
    pub struct ElementNode {
        pub tag: String,
        pub qual_name: QualName,
        /// Attributes in source order, keyed by local name.
        pub attributes: Vec<(String, String)>,
    }

    #[derive(Debug)]
    pub struct Document {
        pub root: Handle,
        pub doctype: RefCell<Option<Doctype>>,
    }

    #[derive(Debug)]
    pub struct Doctype {
        pub name: String,
        pub public_id: String,
        pub system_id: String,
    }

    impl Node {
        pub fn new(kind: NodeKind) -> Handle {
            Rc::new(RefCell::new(Node {
                kind,
                parent: None,
                children: Vec::new(),
            }))
        }

        pub fn as_element(&self) -> Option<&ElementNode> {
            match &self.kind {
                NodeKind::Element(elem) => Some(elem),
                _ => None,
            }
        }
    }

    impl ElementNode {
        pub fn new(qual_name: QualName, attributes: Vec<(String, String)>) -> Self {
            ElementNode {
                tag: qual_name.local.to_string(),
                qual_name,
                attributes,
            }
        }

        /// Value of the first attribute named `name` (ASCII case-insensitive).
        pub fn attr(&self, name: &str) -> Option<&str> {
            self.attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }

        /// True if the whitespace-separated `rel` attribute contains `token`.
        pub fn has_rel(&self, token: &str) -> bool {
            self.attr("rel").is_some_and(|rel| {
                rel.split_ascii_whitespace()
                    .any(|t| t.eq_ignore_ascii_case(token))
            })
        }
    }

    pub fn new_document() -> Document {
        Document {
            root: Node::new(NodeKind::DocumentRoot),
            doctype: RefCell::new(None),
        }
    }

    /// Appends `child` to `parent`, detaching it from any previous parent first.
    ///
    /// Adjacent text nodes are coalesced, so raw-text elements like `<style>`
    /// end up with a single text child.
    pub fn append_child(parent: &Handle, child: Handle) {
        detach(&child);
        let text = match &child.borrow().kind {
            NodeKind::Text(text) => Some(text.clone()),
            _ => None,
        };
        if let Some(text) = text {
            if let Some(last) = parent.borrow().children.last() {
                if let NodeKind::Text(existing) = &mut last.borrow_mut().kind {
                    existing.push_str(&text);
                    return;
                }
            }
        }
        child.borrow_mut().parent = Some(Rc::downgrade(parent));
        parent.borrow_mut().children.push(child);
    }

    /// Inserts `child` immediately before `sibling` under the sibling's parent.
    pub fn insert_before(sibling: &Handle, child: Handle) {
        let Some(parent) = sibling.borrow().parent.as_ref().and_then(Weak::upgrade) else {
            return;
        };
        detach(&child);
        let mut parent_mut = parent.borrow_mut();
        let index = parent_mut
            .children
            .iter()
            .position(|c| Rc::ptr_eq(c, sibling))
            .unwrap_or(parent_mut.children.len());
        child.borrow_mut().parent = Some(Rc::downgrade(&parent));
        parent_mut.children.insert(index, child);
    }

    /// Removes `node` from its parent's child list, if it has a parent.
    pub fn detach(node: &Handle) {
        let parent = node.borrow_mut().parent.take().and_then(|w| w.upgrade());
        if let Some(parent) = parent {
            parent
                .borrow_mut()
                .children
                .retain(|c| !Rc::ptr_eq(c, node));
        }
    }

    /// Moves every child of `from` to the end of `to`.
    pub fn reparent_children(from: &Handle, to: &Handle) {
        let children = std::mem::take(&mut from.borrow_mut().children);
        for child in children {
            child.borrow_mut().parent = None;
            append_child(to, child);
        }
    }
}
