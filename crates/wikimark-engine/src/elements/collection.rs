use std::collections::BTreeSet;

use crate::html::Html;

use super::{ElementError, ElementId, Markup};

/// A group of sibling elements handled as one.
///
/// A collection has no attributes or styles of its own: mutations fan out
/// to every member (done by [`ElementTree`](super::ElementTree)) and reads
/// fail with [`ElementError::Unsupported`].
#[derive(Debug, Clone, Default)]
pub struct Elements {
    pub(super) members: Vec<ElementId>,
    metas: BTreeSet<String>,
    parent: Option<ElementId>,
    pub(super) cached: Option<Html>,
}

impl Elements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn members(&self) -> &[ElementId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Markup for Elements {
    fn element_type(&self) -> &str {
        "elements"
    }

    // a collection never has attributes of its own
    fn has_attr(&self, _name: &str) -> bool {
        false
    }

    fn attr(&self, _name: &str) -> Result<Option<&str>, ElementError> {
        Err(ElementError::Unsupported { op: "attr" })
    }

    fn bool_attr(&self, _name: &str) -> Result<bool, ElementError> {
        Err(ElementError::Unsupported { op: "bool_attr" })
    }

    fn has_style(&self, _name: &str) -> Result<bool, ElementError> {
        Err(ElementError::Unsupported { op: "has_style" })
    }

    fn style(&self, _name: &str) -> Result<Option<&str>, ElementError> {
        Err(ElementError::Unsupported { op: "style" })
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
