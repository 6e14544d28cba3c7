//! # Element Tree
//!
//! Rendered blocks become a tree of HTML elements stored in an arena
//! ([`ElementTree`]). Nodes refer to their parent by [`ElementId`] so the
//! tree can be walked upward without parent/child ownership cycles.
//!
//! ## Node kinds
//!
//! - **[`Element`]**: one tag with attributes, styles, classes and children
//! - **[`Elements`]**: a collection of sibling elements; mutations fan out to
//!   every member and reads are unsupported
//!
//! ## Caching
//!
//! [`ElementTree::generate`] stores each node's HTML the first time it runs
//! and returns the stored value from then on. Mutating a node after it has
//! been generated does not invalidate the cache: render once, then read.

mod collection;
mod element;

pub use collection::Elements;
pub use element::Element;

use crate::html::{Html, escape};

/// Index of a node in its [`ElementTree`].
pub type ElementId = usize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ElementError {
    /// The operation has no meaning for an element collection.
    #[error("{op}() is not supported on an element collection")]
    Unsupported { op: &'static str },
    /// Collections hold elements only, never text or raw HTML.
    #[error("only elements can be added to an element collection")]
    InvalidOperand,
    #[error("no element with id {0}")]
    NoSuchElement(ElementId),
}

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Element(ElementId),
    /// Plain text, escaped on output.
    Text(String),
    Html(Html),
}

/// Capabilities shared by elements and collections.
pub trait Markup {
    fn element_type(&self) -> &str;
    fn has_attr(&self, name: &str) -> bool;
    fn attr(&self, name: &str) -> Result<Option<&str>, ElementError>;
    fn bool_attr(&self, name: &str) -> Result<bool, ElementError>;
    fn has_style(&self, name: &str) -> Result<bool, ElementError>;
    fn style(&self, name: &str) -> Result<Option<&str>, ElementError>;
    fn meta(&self, name: &str) -> bool;
    fn set_meta(&mut self, name: &str, value: bool);
    fn parent(&self) -> Option<ElementId>;
    fn set_parent(&mut self, parent: Option<ElementId>);
    /// HTML stored by a previous [`ElementTree::generate`].
    fn cached_html(&self) -> Option<&Html>;
}

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Elements(Elements),
}

impl Node {
    pub fn markup(&self) -> &dyn Markup {
        match self {
            Node::Element(el) => el,
            Node::Elements(els) => els,
        }
    }

    fn markup_mut(&mut self) -> &mut dyn Markup {
        match self {
            Node::Element(el) => el,
            Node::Elements(els) => els,
        }
    }
}

/// Arena owning every element of one rendered page.
#[derive(Debug, Clone, Default)]
pub struct ElementTree {
    nodes: Vec<Node>,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// The shared capability view of a node.
    pub fn markup(&self, id: ElementId) -> Result<&dyn Markup, ElementError> {
        self.nodes
            .get(id)
            .map(Node::markup)
            .ok_or(ElementError::NoSuchElement(id))
    }

    fn markup_mut(&mut self, id: ElementId) -> Result<&mut dyn Markup, ElementError> {
        self.nodes
            .get_mut(id)
            .map(Node::markup_mut)
            .ok_or(ElementError::NoSuchElement(id))
    }

    pub fn create(&mut self, tag: &str, element_type: &str) -> ElementId {
        self.nodes
            .push(Node::Element(Element::new(tag, element_type)));
        self.nodes.len() - 1
    }

    pub fn create_collection(&mut self) -> ElementId {
        self.nodes.push(Node::Elements(Elements::new()));
        self.nodes.len() - 1
    }

    /// Mutable access to a single element. Collections yield `Unsupported`.
    pub fn element_mut(&mut self, id: ElementId) -> Result<&mut Element, ElementError> {
        match self.nodes.get_mut(id) {
            Some(Node::Element(el)) => Ok(el),
            Some(Node::Elements(_)) => Err(ElementError::Unsupported { op: "element_mut" }),
            None => Err(ElementError::NoSuchElement(id)),
        }
    }

    /// Member ids of a collection, or the element itself.
    fn targets(&self, id: ElementId) -> Result<Vec<ElementId>, ElementError> {
        match self.nodes.get(id) {
            Some(Node::Element(_)) => Ok(vec![id]),
            Some(Node::Elements(els)) => Ok(els.members.clone()),
            None => Err(ElementError::NoSuchElement(id)),
        }
    }

    /// Applies `f` to the element, or to every member of a collection
    /// (recursively through nested collections).
    fn fan_out(
        &mut self,
        id: ElementId,
        f: &mut dyn FnMut(&mut Element) -> bool,
    ) -> Result<bool, ElementError> {
        let mut any = false;
        for target in self.targets(id)? {
            let hit = match self.nodes.get_mut(target) {
                Some(Node::Element(el)) => f(el),
                Some(Node::Elements(_)) => self.fan_out(target, f)?,
                None => return Err(ElementError::NoSuchElement(target)),
            };
            any |= hit;
        }
        Ok(any)
    }

    /// The element's tag; for a collection, its first member's tag or `""`.
    pub fn tag(&self, id: ElementId) -> &str {
        match self.nodes.get(id) {
            Some(Node::Element(el)) => &el.tag,
            Some(Node::Elements(els)) => els.members.first().map_or("", |&m| self.tag(m)),
            None => "",
        }
    }

    pub fn set_tag(&mut self, id: ElementId, tag: &str) -> Result<(), ElementError> {
        self.fan_out(id, &mut |el| {
            el.tag = tag.to_string();
            true
        })
        .map(|_| ())
    }

    pub fn attr(&self, id: ElementId, name: &str) -> Result<Option<&str>, ElementError> {
        self.markup(id)?.attr(name)
    }

    pub fn style(&self, id: ElementId, name: &str) -> Result<Option<&str>, ElementError> {
        self.markup(id)?.style(name)
    }

    pub fn set_attr(&mut self, id: ElementId, name: &str, value: &str) -> Result<(), ElementError> {
        self.fan_out(id, &mut |el| {
            el.set_attr(name, value);
            true
        })
        .map(|_| ())
    }

    pub fn set_bool_attr(
        &mut self,
        id: ElementId,
        name: &str,
        value: bool,
    ) -> Result<(), ElementError> {
        self.fan_out(id, &mut |el| {
            el.set_bool_attr(name, value);
            true
        })
        .map(|_| ())
    }

    pub fn set_style(&mut self, id: ElementId, name: &str, value: &str) -> Result<(), ElementError> {
        self.fan_out(id, &mut |el| {
            el.set_style(name, value);
            true
        })
        .map(|_| ())
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) -> Result<(), ElementError> {
        self.fan_out(id, &mut |el| {
            el.add_class(class);
            true
        })
        .map(|_| ())
    }

    pub fn add_classes(&mut self, id: ElementId, classes: &[&str]) -> Result<(), ElementError> {
        classes
            .iter()
            .try_for_each(|class| self.add_class(id, class))
    }

    /// Removes a class; true if any element had it.
    pub fn remove_class(&mut self, id: ElementId, class: &str) -> Result<bool, ElementError> {
        self.fan_out(id, &mut |el| el.remove_class(class))
    }

    pub fn meta(&self, id: ElementId, name: &str) -> Result<bool, ElementError> {
        Ok(self.markup(id)?.meta(name))
    }

    pub fn set_meta(&mut self, id: ElementId, name: &str, value: bool) -> Result<(), ElementError> {
        self.markup_mut(id)?.set_meta(name, value);
        Ok(())
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(id).and_then(|n| n.markup().parent())
    }

    /// Adds content to an element. Collections accept elements only.
    pub fn add(&mut self, id: ElementId, content: Content) -> Result<(), ElementError> {
        if let Content::Element(child) = content {
            self.markup_mut(child)?.set_parent(Some(id));
        }
        match self.nodes.get_mut(id) {
            Some(Node::Element(el)) => {
                el.children.push(content);
                Ok(())
            }
            Some(Node::Elements(els)) => match content {
                Content::Element(child) => {
                    els.members.push(child);
                    Ok(())
                }
                _ => Err(ElementError::InvalidOperand),
            },
            None => Err(ElementError::NoSuchElement(id)),
        }
    }

    pub fn add_child(&mut self, id: ElementId, child: ElementId) -> Result<(), ElementError> {
        self.add(id, Content::Element(child))
    }

    /// Adds escaped text. Collections reject it with `InvalidOperand`.
    pub fn add_text(&mut self, id: ElementId, text: impl Into<String>) -> Result<(), ElementError> {
        self.add(id, Content::Text(text.into()))
    }

    /// Adds raw HTML. Collections reject it with `InvalidOperand`.
    pub fn add_html(&mut self, id: ElementId, html: Html) -> Result<(), ElementError> {
        self.add(id, Content::Html(html))
    }

    /// Creates an element and adds it as a child of `id`.
    pub fn create_child(
        &mut self,
        id: ElementId,
        tag: &str,
        element_type: &str,
    ) -> Result<ElementId, ElementError> {
        let child = self.create(tag, element_type);
        self.add_child(id, child)?;
        Ok(child)
    }

    /// Generates HTML for a node and its descendants, caching the result.
    ///
    /// Later calls return the cached HTML unchanged.
    pub fn generate(&mut self, id: ElementId) -> Result<Html, ElementError> {
        let node = self.nodes.get(id).ok_or(ElementError::NoSuchElement(id))?;
        if let Some(cached) = node.markup().cached_html() {
            return Ok(cached.clone());
        }

        let html = match node {
            Node::Element(el) => {
                let open = el.open_tag();
                let close = el.close_tag();
                let children = el.children.clone();
                let mut html = Html::new(open);
                if !close.is_empty() {
                    for child in &children {
                        match child {
                            Content::Element(child) => html.push_html(&self.generate(*child)?),
                            Content::Text(text) => html.push_html(&Html::new(escape(text))),
                            Content::Html(raw) => html.push_html(raw),
                        }
                    }
                }
                html.push_html(&Html::new(close));
                html
            }
            Node::Elements(els) => {
                let members = els.members.clone();
                let mut html = Html::default();
                for member in members {
                    html.push_html(&self.generate(member)?);
                }
                html
            }
        };

        match &mut self.nodes[id] {
            Node::Element(el) => el.cached = Some(html.clone()),
            Node::Elements(els) => els.cached = Some(html.clone()),
        }
        log::trace!("generated element {id}: {} bytes", html.as_str().len());
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn list_with_items(tree: &mut ElementTree, n: usize) -> (ElementId, ElementId) {
        let ul = tree.create("ul", "list");
        let items = tree.create_collection();
        for i in 0..n {
            let li = tree.create("li", "list-item");
            tree.add_text(li, format!("item {i}")).unwrap();
            tree.add_child(items, li).unwrap();
        }
        tree.add_child(ul, items).unwrap();
        (ul, items)
    }

    #[test]
    fn generate_nested_elements() {
        let mut tree = ElementTree::new();
        let div = tree.create("div", "main");
        let p = tree.create_child(div, "p", "p").unwrap();
        tree.add_text(p, "a < b").unwrap();
        tree.add_html(p, Html::from("<br />")).unwrap();

        assert_eq!(
            tree.generate(div).unwrap().as_str(),
            r#"<div class="q-main"><p class="q-p">a &lt; b<br /></p></div>"#
        );
        assert_eq!(tree.parent(p), Some(div));
    }

    #[test]
    fn generate_is_cached_even_after_mutation() {
        let mut tree = ElementTree::new();
        let (ul, items) = list_with_items(&mut tree, 2);

        let first = tree.generate(ul).unwrap();
        assert!(tree.markup(ul).unwrap().cached_html().is_some());
        assert!(tree.markup(items).unwrap().cached_html().is_some());

        tree.add_class(items, "late").unwrap();
        let second = tree.generate(ul).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn collection_reads_are_unsupported() {
        let mut tree = ElementTree::new();
        let (_, items) = list_with_items(&mut tree, 1);

        assert_eq!(
            tree.attr(items, "href"),
            Err(ElementError::Unsupported { op: "attr" })
        );
        assert_eq!(
            tree.style(items, "color"),
            Err(ElementError::Unsupported { op: "style" })
        );
        assert!(!tree.markup(items).unwrap().has_attr("href"));
    }

    #[test]
    fn collection_rejects_text_and_html() {
        let mut tree = ElementTree::new();
        let items = tree.create_collection();
        assert_eq!(
            tree.add(items, Content::Text("x".into())),
            Err(ElementError::InvalidOperand)
        );
        assert_eq!(
            tree.add_text(items, "x"),
            Err(ElementError::InvalidOperand)
        );
        assert_eq!(
            tree.add_html(items, Html::from("<b>")),
            Err(ElementError::InvalidOperand)
        );
        assert_eq!(tree.generate(items).unwrap().as_str(), "");
    }

    #[test]
    fn collection_fans_out_mutations() {
        let mut tree = ElementTree::new();
        let (_, items) = list_with_items(&mut tree, 3);

        tree.add_class(items, "wide").unwrap();
        tree.set_attr(items, "data-n", "1").unwrap();
        tree.set_style(items, "color", "red").unwrap();

        let members = match tree.node(items) {
            Some(Node::Elements(els)) => els.members().to_vec(),
            _ => panic!("expected collection"),
        };
        for member in members {
            let Some(Node::Element(el)) = tree.node(member) else {
                panic!("expected element");
            };
            assert_eq!(el.classes(), ["wide"]);
            assert_eq!(tree.attr(member, "data-n").unwrap(), Some("1"));
            assert_eq!(tree.style(member, "color").unwrap(), Some("red"));
            assert_eq!(tree.parent(member), Some(items));
        }
        assert!(tree.remove_class(items, "wide").unwrap());
        assert!(!tree.remove_class(items, "wide").unwrap());
    }

    #[test]
    fn collection_tag_is_first_member_tag() {
        let mut tree = ElementTree::new();
        let empty = tree.create_collection();
        assert_eq!(tree.tag(empty), "");

        let (_, items) = list_with_items(&mut tree, 2);
        assert_eq!(tree.tag(items), "li");

        tree.set_tag(items, "p").unwrap();
        assert_eq!(tree.tag(items), "p");
    }

    #[test]
    fn collection_generates_concatenation() {
        let mut tree = ElementTree::new();
        let (_, items) = list_with_items(&mut tree, 2);
        assert_eq!(
            tree.generate(items).unwrap().as_str(),
            r#"<li class="q-list-item">item 0</li><li class="q-list-item">item 1</li>"#
        );
    }

    #[test]
    fn metas_live_on_the_node() {
        let mut tree = ElementTree::new();
        let items = tree.create_collection();
        tree.set_meta(items, "sealed", true).unwrap();
        assert!(tree.meta(items, "sealed").unwrap());
        tree.set_meta(items, "sealed", false).unwrap();
        assert!(!tree.meta(items, "sealed").unwrap());
    }
}
