use anyhow::{Context, Result, bail};
use log::debug;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde_json::{Map, Value};

/// Element being assembled while its end tag has not been seen yet.
struct OpenNode {
    name: String,
    text: String,
    children: Map<String, Value>,
}

impl OpenNode {
    fn new(name: String) -> Self {
        Self {
            name,
            text: String::new(),
            children: Map::new(),
        }
    }

    fn into_value(self) -> Value {
        if self.children.is_empty() {
            Value::String(self.text)
        } else {
            Value::Object(self.children)
        }
    }
}

/// Parses an XML document into a value tree keyed by element local name.
///
/// Namespace prefixes are dropped (`v13:RateReply` becomes `RateReply`),
/// repeated siblings collapse into an array, leaf elements become strings
/// and attributes are ignored. The returned object has a single key, the
/// root element's name.
pub fn parse_document(xml: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<OpenNode> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader
            .read_event()
            .with_context(|| format!("Malformed XML at byte {}", reader.buffer_position()))?
        {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                stack.push(OpenNode::new(name));
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                let node = OpenNode::new(name);
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(t) => {
                if let Some(node) = stack.last_mut() {
                    let text = t.unescape().context("Invalid escape in XML text")?;
                    node.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(_) => {
                let node = stack.pop().context("Unbalanced closing tag in XML")?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        bail!("Unexpected end of XML: {} element(s) left open", stack.len());
    }

    let (name, value) = root.context("XML document has no root element")?;
    debug!("Parsed XML document with root <{}>", name);

    let mut doc = Map::new();
    doc.insert(name, value);
    Ok(Value::Object(doc))
}

fn attach(
    stack: &mut [OpenNode],
    root: &mut Option<(String, Value)>,
    node: OpenNode,
) -> Result<()> {
    let name = node.name.clone();
    let value = node.into_value();

    match stack.last_mut() {
        Some(parent) => {
            insert_child(&mut parent.children, name, value);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some((name, value));
            Ok(())
        }
        None => bail!("XML document has more than one root element"),
    }
}

fn insert_child(children: &mut Map<String, Value>, name: String, value: Value) {
    match children.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            children.insert(name, value);
        }
    }
}

/// Treats a bare value as a one-element sequence.
///
/// The reply format does not distinguish a single repeated element from a
/// lone one, so lookups of repeating elements go through this first.
/// `Null` yields an empty sequence.
pub fn one_or_many(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}
