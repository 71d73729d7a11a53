//! XML → generic JSON tree conversion.
//!
//! The upstream service answers every operation with a small XML document.
//! We do not bind those documents to fixed types here; instead they become a
//! [`serde_json::Value`] tree with these rules:
//! - an element becomes an object, its attributes merged in as properties
//! - repeated child elements with the same name collapse into an array
//! - an element with only text becomes a (trimmed) string
//! - an element with attributes or children *and* text keeps it under `"#text"`
//! - an empty element becomes `""`
//!
//! Scalars are always strings: no numeric inference, so `"0123"` stays `"0123"`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde_json::{Map, Value};

use civis_shared::{CivisError, Result, XML_TEXT_KEY};

/// An element being built while its end tag has not been seen yet.
struct Frame {
    name: String,
    map: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut map = Map::new();

        for attr in start.attributes() {
            let attr =
                attr.map_err(|e| CivisError::parse(format!("<{name}>: bad attribute: {e}")))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| CivisError::parse(format!("<{name}> @{key}: {e}")))?;
            insert_child(&mut map, key, Value::String(value.into_owned()));
        }

        Ok(Self {
            name,
            map,
            text: String::new(),
        })
    }

    fn into_value(self) -> Value {
        let text = self.text.trim();
        if self.map.is_empty() {
            return Value::String(text.to_string());
        }

        let mut map = self.map;
        if !text.is_empty() {
            map.insert(XML_TEXT_KEY.to_string(), Value::String(text.to_string()));
        }
        Value::Object(map)
    }
}

/// Parse an XML document into a generic tree rooted at an object holding the
/// document element, e.g. `{"proposicao": {...}}`.
pub fn parse_xml(xml: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root = Map::new();
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            CivisError::parse(format!(
                "malformed XML at byte {}: {e}",
                reader.error_position()
            ))
        })?;

        match event {
            Event::Start(start) => stack.push(Frame::open(&start)?),
            Event::Empty(start) => {
                let frame = Frame::open(&start)?;
                let name = frame.name.clone();
                let parent = stack.last_mut().map_or(&mut root, |f| &mut f.map);
                insert_child(parent, name, frame.into_value());
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    let unescaped = text
                        .unescape()
                        .map_err(|e| CivisError::parse(format!("<{}>: {e}", frame.name)))?;
                    frame.text.push_str(&unescaped);
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| CivisError::parse("closing tag without an open element"))?;
                let name = frame.name.clone();
                let parent = stack.last_mut().map_or(&mut root, |f| &mut f.map);
                insert_child(parent, name, frame.into_value());
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(CivisError::parse(format!(
            "unexpected end of document inside <{}>",
            open.name
        )));
    }
    if root.is_empty() {
        return Err(CivisError::parse("document has no root element"));
    }

    Ok(Value::Object(root))
}

/// Insert `value` under `name`, turning repeated names into an array.
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
