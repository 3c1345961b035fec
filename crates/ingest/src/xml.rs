// ABOUTME: Folds an XML document into a JSON value tree with quick-xml.
// ABOUTME: Attributes become `@name`, mixed text becomes `#text`, repeated children become arrays.

use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::error::IngestError;

/// Element nesting allowed before a document is rejected. Matches serde_json's recursion limit.
pub const MAX_DEPTH: usize = 128;

struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self, IngestError> {
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            children: attributes(start)?,
            text: String::new(),
        })
    }

    fn close(self) -> (String, Value) {
        let text = self.text.trim();
        let value = if self.children.is_empty() {
            if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.to_string())
            }
        } else {
            let mut children = self.children;
            if !text.is_empty() {
                children.insert("#text".to_string(), Value::String(text.to_string()));
            }
            Value::Object(children)
        };
        (self.name, value)
    }
}

fn attributes(start: &BytesStart<'_>) -> Result<Map<String, Value>, IngestError> {
    let mut map = Map::new();
    for attr in start.attributes() {
        let attr = attr.map_err(IngestError::parse)?;
        let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw).map_err(IngestError::parse)?;
        map.insert(key, Value::String(value.into_owned()));
    }
    Ok(map)
}

/// Adds a child, turning the entry into an array when the name repeats.
fn insert_child(map: &mut Map<String, Value>, name: String, value: Value) {
    match map.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(name, value);
        }
    }
}

fn finish(
    stack: &mut Vec<Frame>,
    root: &mut Option<Value>,
    name: String,
    value: Value,
) -> Result<(), IngestError> {
    match stack.last_mut() {
        Some(parent) => insert_child(&mut parent.children, name, value),
        None => {
            if root.is_some() {
                return Err(IngestError::parse(anyhow::anyhow!(
                    "more than one root element"
                )));
            }
            let mut doc = Map::new();
            doc.insert(name, value);
            *root = Some(Value::Object(doc));
        }
    }
    Ok(())
}

/// Parses `raw` into `{root_name: ...}`.
///
/// Documents declaring entities in their DOCTYPE are rejected.
pub fn xml_to_value(raw: &str) -> Result<Value, IngestError> {
    let mut reader = Reader::from_str(raw);
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        match reader.read_event().map_err(IngestError::parse)? {
            Event::Start(start) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(IngestError::parse(anyhow::anyhow!(
                        "document nested deeper than {} levels",
                        MAX_DEPTH
                    )));
                }
                stack.push(Frame::open(&start)?);
            }
            Event::Empty(start) => {
                let frame = Frame::open(&start)?;
                let (name, value) = frame.close();
                finish(&mut stack, &mut root, name, value)?;
            }
            Event::End(_) => {
                if let Some(frame) = stack.pop() {
                    let (name, value) = frame.close();
                    finish(&mut stack, &mut root, name, value)?;
                }
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text.decode().map_err(IngestError::parse)?);
                }
            }
            Event::CData(cdata) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&cdata.decode().map_err(IngestError::parse)?);
                }
            }
            Event::GeneralRef(reference) => {
                let Some(frame) = stack.last_mut() else {
                    continue;
                };
                if let Some(ch) = reference.resolve_char_ref().map_err(IngestError::parse)? {
                    frame.text.push(ch);
                } else {
                    let name = reference.decode().map_err(IngestError::parse)?;
                    match resolve_predefined_entity(&name) {
                        Some(resolved) => frame.text.push_str(resolved),
                        None => {
                            return Err(IngestError::parse(anyhow::anyhow!(
                                "unknown entity &{};",
                                name
                            )))
                        }
                    }
                }
            }
            Event::DocType(doctype) => {
                if String::from_utf8_lossy(&doctype).contains("<!ENTITY") {
                    return Err(IngestError::unsafe_xml("DOCTYPE declares entities"));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(IngestError::parse(anyhow::anyhow!(
            "unexpected end of document inside <{}>",
            stack.last().map(|f| f.name.as_str()).unwrap_or_default()
        )));
    }
    root.ok_or_else(|| IngestError::parse(anyhow::anyhow!("no root element")))
}
