// src/services/feed.rs
//! Parser for the Treasury interest-rate XML feed.
//!
//! The feed is an Atom document whose `entry` elements each carry an OData
//! `m:properties` block:
//!
//! ```xml
//! <feed xmlns="http://www.w3.org/2005/Atom" ...>
//!   <entry>
//!     <content type="application/xml">
//!       <m:properties>
//!         <d:INDEX_DATE m:type="Edm.DateTime">2024-01-02T00:00:00</d:INDEX_DATE>
//!         <d:ROUND_B1_YIELD_4WK_2 m:type="Edm.Double">5.41</d:ROUND_B1_YIELD_4WK_2>
//!       </m:properties>
//!     </content>
//!   </entry>
//! </feed>
//! ```
//!
//! Namespace prefixes are dropped, so `d:INDEX_DATE` is stored as `INDEX_DATE`.

use std::collections::{BTreeMap, HashMap};
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attribute(#[from] AttrError),

    #[error("document has no root element")]
    Empty,

    #[error("document ended inside <{0}>")]
    Unclosed(String),

    #[error("content outside the root element")]
    StrayContent,
}

/// A property value as it appears in the feed. Elements carrying attributes
/// (`m:type`, `m:null`) come through wrapped; bare elements are plain text.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedValue {
    Scalar(String),
    TextWrapped {
        text: Option<String>,
        attributes: BTreeMap<String, String>,
    },
}

impl FeedValue {
    pub fn text(&self) -> Option<&str> {
        match self {
            FeedValue::Scalar(s) => Some(s.as_str()),
            FeedValue::TextWrapped { text, .. } => text.as_deref(),
        }
    }
}

/// The property bag of one feed `entry`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntry {
    properties: HashMap<String, FeedValue>,
}

impl RawEntry {
    pub fn get(&self, name: &str) -> Option<&FeedValue> {
        self.properties.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FeedValue) {
        self.properties.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, FeedValue)> for RawEntry {
    fn from_iter<I: IntoIterator<Item = (K, FeedValue)>>(iter: I) -> Self {
        RawEntry {
            properties: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

struct PendingProperty {
    name: String,
    attributes: BTreeMap<String, String>,
    text: String,
}

impl PendingProperty {
    fn finish(self) -> (String, FeedValue) {
        let value = if self.attributes.is_empty() && !self.text.is_empty() {
            FeedValue::Scalar(self.text)
        } else {
            FeedValue::TextWrapped {
                text: (!self.text.is_empty()).then_some(self.text),
                attributes: self.attributes,
            }
        };
        (self.name, value)
    }
}

/// Parses a feed document into one `RawEntry` per `entry` element, in
/// document order. A well-formed document with no entries gives an empty Vec.
pub fn parse_feed(xml: &str) -> Result<Vec<RawEntry>, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut root_seen = false;
    let mut entry: Option<RawEntry> = None;
    // stack depth of the children of the open `properties` element
    let mut props_depth: Option<usize> = None;
    let mut pending: Option<PendingProperty> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = local_name(&e);
                if stack.is_empty() {
                    if root_seen {
                        return Err(ParseError::StrayContent);
                    }
                    root_seen = true;
                }

                if is_entry(&stack, &name) {
                    entry = Some(RawEntry::default());
                } else if entry.is_some() && props_depth.is_none() && name == "properties" && is_entry_body(&stack) {
                    props_depth = Some(stack.len() + 1);
                } else if props_depth == Some(stack.len()) {
                    pending = Some(PendingProperty {
                        name: name.clone(),
                        attributes: read_attributes(&e)?,
                        text: String::new(),
                    });
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                let name = local_name(&e);
                if stack.is_empty() {
                    if root_seen {
                        return Err(ParseError::StrayContent);
                    }
                    root_seen = true;
                }

                if is_entry(&stack, &name) {
                    entries.push(RawEntry::default());
                } else if props_depth == Some(stack.len()) {
                    if let Some(current) = entry.as_mut() {
                        let (name, value) = PendingProperty {
                            name,
                            attributes: read_attributes(&e)?,
                            text: String::new(),
                        }
                        .finish();
                        current.insert(name, value);
                    }
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                if stack.is_empty() {
                    if !text.trim().is_empty() {
                        return Err(ParseError::StrayContent);
                    }
                } else if props_depth.map(|d| d + 1) == Some(stack.len()) {
                    if let Some(p) = pending.as_mut() {
                        p.text.push_str(&text);
                    }
                }
            }
            Event::CData(c) => {
                if stack.is_empty() {
                    return Err(ParseError::StrayContent);
                }
                if props_depth.map(|d| d + 1) == Some(stack.len()) {
                    if let Some(p) = pending.as_mut() {
                        p.text.push_str(&String::from_utf8_lossy(&c));
                    }
                }
            }
            Event::End(_) => {
                if stack.pop().is_none() {
                    return Err(ParseError::StrayContent);
                }

                match props_depth {
                    Some(d) if stack.len() == d => {
                        if let (Some(p), Some(current)) = (pending.take(), entry.as_mut()) {
                            let (name, value) = p.finish();
                            current.insert(name, value);
                        }
                    }
                    Some(d) if stack.len() + 1 == d => props_depth = None,
                    _ => {}
                }

                if stack.len() == 1 {
                    if let Some(done) = entry.take() {
                        entries.push(done);
                        props_depth = None;
                    }
                }
            }
            Event::Eof => {
                if let Some(open) = stack.pop() {
                    return Err(ParseError::Unclosed(open));
                }
                if !root_seen {
                    return Err(ParseError::Empty);
                }
                break;
            }
            _ => {}
        }
    }

    Ok(entries)
}

fn is_entry(stack: &[String], name: &str) -> bool {
    name == "entry" && stack.len() == 1 && stack[0] == "feed"
}

/// `properties` counts only as `entry/properties` or `entry/content/properties`,
/// never inside inline expansions nested deeper in the entry.
fn is_entry_body(stack: &[String]) -> bool {
    match stack.len() {
        2 => true,
        3 => stack[2] == "content",
        _ => false,
    }
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn read_attributes(e: &BytesStart) -> Result<BTreeMap<String, String>, ParseError> {
    let mut attributes = BTreeMap::new();
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.insert(key, value);
    }
    Ok(attributes)
}
