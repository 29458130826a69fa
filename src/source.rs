//! Named value sources harvested from parsed documents.
//!
//! A document is a tree of [`Node`]s. Attributes become scalar sources and
//! child elements become structured sources; both are looked up by name when
//! binding constructor parameters and fields.
use crate::utils::names_match;
use serde_json::Value as Json;

/// One element of a parsed document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
    pub text: Option<String>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Attribute lookup, exact case first.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attribute_index(name).map(|i| self.attributes[i].1.as_str())
    }

    /// Position of the attribute `name`; an exact-case match beats the
    /// first case-insensitive one.
    fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes
            .iter()
            .position(|(n, _)| n == name)
            .or_else(|| self.attributes.iter().position(|(n, _)| names_match(n, name)))
    }

    /// Inline content, for element-like sources targeting a scalar.
    pub fn inner_text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Adapts a JSON document: scalars become attributes, objects become
    /// children, arrays become repeated children and a bare scalar becomes
    /// the node text. Nulls are dropped.
    pub fn from_json(name: impl Into<String>, json: &Json) -> Self {
        let mut node = Node::new(name);
        match json {
            Json::Object(map) => {
                for (key, value) in map {
                    node.push_json(key, value);
                }
            }
            Json::Null => {}
            other => node.text = json_scalar(other),
        }
        node
    }

    fn push_json(&mut self, key: &str, value: &Json) {
        match value {
            Json::Null => {}
            Json::Object(_) => self.children.push(Node::from_json(key, value)),
            Json::Array(items) => {
                for item in items {
                    self.children.push(Node::from_json(key, item));
                }
            }
            scalar => {
                if let Some(text) = json_scalar(scalar) {
                    self.attributes.push((key.to_string(), text));
                }
            }
        }
    }
}

fn json_scalar(value: &Json) -> Option<String> {
    match value {
        Json::String(s) => Some(s.clone()),
        Json::Bool(b) => Some(b.to_string()),
        Json::Number(n) => Some(n.to_string()),
        Json::Null | Json::Array(_) | Json::Object(_) => None,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SourceValue {
    /// Attribute-like text.
    Scalar(String),
    /// Element-like nested node.
    Structured(Node),
}

#[derive(Clone, Debug, PartialEq)]
pub struct NamedValueSource {
    pub name: String,
    pub value: SourceValue,
}

impl NamedValueSource {
    pub fn scalar(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: SourceValue::Scalar(text.into()),
        }
    }

    pub fn structured(node: Node) -> Self {
        Self {
            name: node.name.clone(),
            value: SourceValue::Structured(node),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self.value, SourceValue::Structured(_))
    }
}

#[derive(Clone, Debug, Default)]
pub struct SourceBag {
    sources: Vec<NamedValueSource>,
}

impl SourceBag {
    pub fn new(sources: Vec<NamedValueSource>) -> Self {
        Self { sources }
    }

    /// Harvests the attributes and children of `node`. The attribute named
    /// `type_indicator` is withheld from the bag and returned separately.
    pub fn from_node(node: &Node, type_indicator: &str) -> (Self, Option<String>) {
        let withheld = node.attribute_index(type_indicator);
        let indicator = withheld.map(|i| node.attributes[i].1.clone());
        let mut sources = vec![];
        for (i, (name, value)) in node.attributes.iter().enumerate() {
            if Some(i) != withheld {
                sources.push(NamedValueSource::scalar(name, value));
            }
        }
        for child in &node.children {
            sources.push(NamedValueSource::structured(child.clone()));
        }
        (Self { sources }, indicator)
    }

    pub fn push(&mut self, source: NamedValueSource) {
        self.sources.push(source);
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedValueSource> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.iter().any(|s| names_match(&s.name, name))
    }

    /// Best source for `name`: names match ignoring case; element-like
    /// sources beat attribute-like ones; then an exact-case name wins; then
    /// document order.
    pub fn find(&self, name: &str) -> Option<&NamedValueSource> {
        self.sources
            .iter()
            .enumerate()
            .filter(|(_, s)| names_match(&s.name, name))
            .min_by_key(|(i, s)| (!s.is_structured(), s.name != name, *i))
            .map(|(_, s)| s)
    }
}
