//! The element view a streaming document source hands to the ingestion pipeline.

use std::rc::Rc;

/// A streamed element: its tag, its attributes, and its structural parent's attributes.
pub trait SvgElement {
    fn tag_name(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<&str>;

    /// Attribute lookup on the nearest structural parent element.
    fn parent_attribute(&self, name: &str) -> Option<&str>;
}

impl<'a, 'input: 'a> SvgElement for roxmltree::Node<'a, 'input> {
    fn tag_name(&self) -> &str {
        roxmltree::Node::tag_name(self).name()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        roxmltree::Node::attribute(self, name)
    }

    fn parent_attribute(&self, name: &str) -> Option<&str> {
        self.parent_element().and_then(|p| p.attribute(name))
    }
}

/// An owned element, for sources that do not keep a parsed document around.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub parent: Option<Rc<Element>>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_parent(mut self, parent: Rc<Element>) -> Self {
        self.parent = Some(parent);
        self
    }
}

impl SvgElement for Element {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn parent_attribute(&self, name: &str) -> Option<&str> {
        self.parent.as_deref().and_then(|p| p.attribute(name))
    }
}
