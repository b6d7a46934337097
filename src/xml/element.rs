use quick_xml::escape::escape;
use serde_json::Value;
use std::fmt::{self, Write};

/// An XML element with ordered children.
///
/// Elements hold either text or children, never both; the service schema
/// has no mixed content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    content: Content,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Content {
    Empty,
    Text(String),
    Children(Vec<Element>),
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            content: Content::Empty,
        }
    }

    /// Creates a leaf element holding `text`.
    pub fn text(name: impl Into<String>, text: impl ToString) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            content: Content::Text(text.to_string()),
        }
    }

    /// Leaf element for optional values; `None` produces no element.
    pub fn opt_text<T: ToString>(name: &str, text: Option<T>) -> Option<Self> {
        text.map(|t| Self::text(name, t))
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Appends a child. Replaces any text content.
    pub fn child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    pub fn child_opt(mut self, child: Option<Element>) -> Self {
        if let Some(child) = child {
            self.push(child);
        }
        self
    }

    pub fn children_from(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        for child in children {
            self.push(child);
        }
        self
    }

    pub fn push(&mut self, child: Element) {
        match &mut self.content {
            Content::Children(children) => children.push(child),
            content => *content = Content::Children(vec![child]),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn children(&self) -> &[Element] {
        match &self.content {
            Content::Children(children) => children,
            _ => &[],
        }
    }

    /// First direct child with the given name.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children().iter().find(|c| c.name == name)
    }

    /// Follows a path of direct-child names.
    pub fn find_path(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |el, name| el.find(name))
    }

    pub fn text_content(&self) -> Option<&str> {
        match &self.content {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Builds an element from a structured value.
    ///
    /// Object keys are converted from `snake_case` to `UpperCamelCase`,
    /// arrays repeat the element once per item, scalars become text and
    /// nulls are skipped.
    pub fn from_value(name: &str, value: &Value) -> Vec<Element> {
        match value {
            Value::Null => Vec::new(),
            Value::Array(items) => items
                .iter()
                .flat_map(|item| Element::from_value(name, item))
                .collect(),
            Value::Object(map) => {
                let el = map.iter().fold(Element::new(name), |el, (key, v)| {
                    el.children_from(Element::from_value(&camelize(key), v))
                });
                vec![el]
            }
            Value::String(s) => vec![Element::text(name, s)],
            other => vec![Element::text(name, other)],
        }
    }

    /// Renders the element as a compact XML string.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) -> fmt::Result {
        write!(out, "<{}", self.name)?;
        for (key, value) in &self.attributes {
            write!(out, " {}=\"{}\"", key, escape(value.as_str()))?;
        }
        match &self.content {
            Content::Empty => out.write_str("/>"),
            Content::Text(text) => {
                write!(out, ">{}</{}>", escape(text.as_str()), self.name)
            }
            Content::Children(children) => {
                out.write_char('>')?;
                for child in children {
                    child.write_to(out)?;
                }
                write!(out, "</{}>", self.name)
            }
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml())
    }
}

/// `export_compliance` -> `ExportCompliance`. Keys already in camel case
/// keep their inner capitals.
fn camelize(key: &str) -> String {
    key.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
