use std::collections::{BTreeMap, BTreeSet};

use crate::html::{Html, escape};

use super::{Content, ElementError, ElementId, Markup};

/// Tags written as `<tag ... />` with no children.
const VOID_TAGS: [&str; 6] = ["br", "hr", "img", "input", "link", "meta"];

/// A single tag-bearing node.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub(super) tag: String,
    element_type: String,
    id: Option<String>,
    attrs: BTreeMap<String, String>,
    bool_attrs: BTreeSet<String>,
    /// Style declarations in insertion order.
    styles: Vec<(String, String)>,
    classes: Vec<String>,
    pub(super) children: Vec<Content>,
    metas: BTreeSet<String>,
    parent: Option<ElementId>,
    pub(super) cached: Option<Html>,
}

impl Element {
    /// An element with the given tag. A non-empty `element_type` adds the
    /// class `q-<type>`.
    pub fn new(tag: impl Into<String>, element_type: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            element_type: element_type.into(),
            ..Default::default()
        }
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub(super) fn set_attr(&mut self, name: &str, value: &str) {
        self.attrs.insert(name.to_string(), value.to_string());
    }

    pub(super) fn set_bool_attr(&mut self, name: &str, value: bool) {
        if value {
            self.bool_attrs.insert(name.to_string());
        } else {
            self.bool_attrs.remove(name);
        }
    }

    pub(super) fn set_style(&mut self, name: &str, value: &str) {
        match self.styles.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.styles.push((name.to_string(), value.to_string())),
        }
    }

    pub(super) fn add_class(&mut self, class: &str) {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
        }
    }

    pub(super) fn remove_class(&mut self, class: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c != class);
        self.classes.len() != before
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn children(&self) -> &[Content] {
        &self.children
    }

    fn is_void(&self) -> bool {
        VOID_TAGS.contains(&self.tag.as_str())
    }

    /// Renders the opening tag.
    pub(super) fn open_tag(&self) -> String {
        let mut html = format!("<{}", self.tag);

        let mut classes = Vec::with_capacity(self.classes.len() + 1);
        if !self.element_type.is_empty() {
            classes.push(format!("q-{}", self.element_type));
        }
        classes.extend(self.classes.iter().cloned());
        if !classes.is_empty() {
            html.push_str(&format!(r#" class="{}""#, escape(&classes.join(" "))));
        }

        if let Some(id) = &self.id {
            html.push_str(&format!(r#" id="{}""#, escape(id)));
        }
        for (name, value) in &self.attrs {
            html.push_str(&format!(r#" {name}="{}""#, escape(value)));
        }
        for name in &self.bool_attrs {
            html.push(' ');
            html.push_str(name);
        }
        if !self.styles.is_empty() {
            let style = self
                .styles
                .iter()
                .map(|(n, v)| format!("{n}: {v};"))
                .collect::<Vec<_>>()
                .join(" ");
            html.push_str(&format!(r#" style="{}""#, escape(&style)));
        }

        html.push_str(if self.is_void() { " />" } else { ">" });
        html
    }

    pub(super) fn close_tag(&self) -> String {
        if self.is_void() {
            String::new()
        } else {
            format!("</{}>", self.tag)
        }
    }
}

impl Markup for Element {
    fn element_type(&self) -> &str {
        &self.element_type
    }

    fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name) || self.bool_attrs.contains(name)
    }

    fn attr(&self, name: &str) -> Result<Option<&str>, ElementError> {
        Ok(self.attrs.get(name).map(String::as_str))
    }

    fn bool_attr(&self, name: &str) -> Result<bool, ElementError> {
        Ok(self.bool_attrs.contains(name))
    }

    fn has_style(&self, name: &str) -> Result<bool, ElementError> {
        Ok(self.styles.iter().any(|(n, _)| n == name))
    }

    fn style(&self, name: &str) -> Result<Option<&str>, ElementError> {
        Ok(self
            .styles
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str()))
    }

    fn meta(&self, name: &str) -> bool {
        self.metas.contains(name)
    }

    fn set_meta(&mut self, name: &str, value: bool) {
        if value {
            self.metas.insert(name.to_string());
        } else {
            self.metas.remove(name);
        }
    }

    fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<ElementId>) {
        self.parent = parent;
    }

    fn cached_html(&self) -> Option<&Html> {
        self.cached.as_ref()
    }
}
