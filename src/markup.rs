//! Element tree for QRZ XML responses.
//!
//! Responses are small, so the whole body is read into a tree once and the
//! decoder walks it by local name. Namespace prefixes are resolved and
//! stripped; an element is considered part of the QRZ schema when it is in
//! the QRZ namespace or in no namespace at all.

use crate::error::{QrzError, Result};
use crate::XML_NAMESPACE;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::str::FromStr;

/// Root element of every QRZ XML response
pub const ROOT_ELEMENT: &str = "QRZDatabase";

/// One element with its trimmed text and child elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    namespace: Option<String>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Local name, without any prefix
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved namespace URI, if the element is bound to one
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Text content directly inside this element, trimmed
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// In the QRZ namespace, or in none
    pub fn in_schema(&self) -> bool {
        self.namespace
            .as_deref()
            .map_or(true, |ns| ns == XML_NAMESPACE)
    }

    /// Check if this is the QRZ element `local`
    pub fn is(&self, local: &str) -> bool {
        self.name == local && self.in_schema()
    }

    /// First direct child that is the QRZ element `local`
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is(local))
    }

    /// Every element below this one, depth first, in document order
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }
}

/// Iterator returned by [`Element::descendants`]
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

/// A parsed QRZ XML response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Parse a response body. The root must be `QRZDatabase`.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = NsReader::from_str(xml);
        let mut open: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let (resolved, event) = reader
                .read_resolved_event()
                .map_err(|e| QrzError::structural(format!("invalid XML: {e}")))?;

            match event {
                Event::Start(start) => open.push(element_for(&resolved, &start)),
                Event::Empty(start) => {
                    let element = element_for(&resolved, &start);
                    attach(&mut open, &mut root, element)?;
                }
                Event::End(_) => {
                    let mut element = open
                        .pop()
                        .ok_or_else(|| QrzError::structural("unbalanced closing tag"))?;
                    element.text = element.text.trim().to_string();
                    attach(&mut open, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(current) = open.last_mut() {
                        let unescaped = text
                            .unescape()
                            .map_err(|e| QrzError::structural(format!("invalid XML text: {e}")))?;
                        current.text.push_str(&unescaped);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = open.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(QrzError::structural(format!(
                "unclosed <{}> element",
                unclosed.name
            )));
        }

        let root = root.ok_or_else(|| QrzError::structural("empty response document"))?;
        if !root.is(ROOT_ELEMENT) {
            return Err(QrzError::structural(format!(
                "unexpected root element <{}>",
                root.name
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Top-level section such as `Session`, `Callsign` or `DXCC`
    pub fn section(&self, local: &str) -> Option<&Element> {
        self.root.child(local)
    }
}

impl FromStr for Document {
    type Err = QrzError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn element_for(resolved: &ResolveResult<'_>, start: &BytesStart<'_>) -> Element {
    let namespace = match resolved {
        ResolveResult::Bound(Namespace(ns)) => Some(String::from_utf8_lossy(ns).into_owned()),
        _ => None,
    };
    Element {
        name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        namespace,
        text: String::new(),
        children: Vec::new(),
    }
}

fn attach(open: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(QrzError::structural("more than one root element")),
    }
    Ok(())
}
