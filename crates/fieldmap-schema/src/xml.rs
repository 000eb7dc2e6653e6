//! Minimal element tree for schema documents.
//!
//! XSD and WSDL are read into a small owned tree first; the schema walkers
//! need random access (named type lookup, references) that a streaming
//! reader does not give.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use fieldmap_model::{NamespaceBinding, XmlNamespace};

use crate::error::{Result, SchemaParseError};

pub(crate) const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct XmlElement {
    pub prefix: Option<String>,
    /// Local name.
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: String,
}

impl XmlElement {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is(&self, local: &str) -> bool {
        self.name == local
    }

    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.is(local))
    }

    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.is(local))
    }

    /// Text of `annotation/documentation`, if present.
    pub fn documentation(&self) -> Option<&str> {
        self.child("annotation")
            .and_then(|a| a.child("documentation"))
            .map(|d| d.text.trim())
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct XmlDocument {
    pub root: XmlElement,
    /// Every `xmlns` declaration in document order; the first binding of a
    /// prefix wins.
    pub bindings: Vec<NamespaceBinding>,
}

impl XmlDocument {
    pub fn uri_for(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.prefix == prefix)
            .map(|b| b.uri.as_str())
    }

    /// True when a (possibly prefixed) name lives in the XML Schema namespace.
    pub fn is_xsd_name(&self, qname: &str) -> bool {
        let (prefix, _) = split_qname(qname);
        self.uri_for(prefix.unwrap_or_default()) == Some(XSD_NAMESPACE)
    }

    pub fn namespace(&self) -> XmlNamespace {
        XmlNamespace {
            target_namespace: self.root.attr("targetNamespace").map(str::to_string),
            bindings: self.bindings.clone(),
        }
    }
}

/// Split `prefix:local` into its parts.
pub(crate) fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    }
}

pub(crate) fn parse(text: &str) -> Result<XmlDocument> {
    let text = text.trim_start_matches('\u{feff}');
    if text.trim().is_empty() {
        return Err(SchemaParseError::empty("XML input is empty"));
    }

    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root = None;
    let mut bindings = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(element_from(&start, &mut bindings)?),
            Event::Empty(start) => {
                let element = element_from(&start, &mut bindings)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| SchemaParseError::invalid_xml("unexpected closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(content) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&String::from_utf8_lossy(&content));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(SchemaParseError::invalid_xml(format!(
            "element <{}> is not closed",
            open.name
        )));
    }
    let root = root.ok_or_else(|| SchemaParseError::invalid_xml("document has no root element"))?;
    Ok(XmlDocument { root, bindings })
}

fn element_from(start: &BytesStart<'_>, bindings: &mut Vec<NamespaceBinding>) -> Result<XmlElement> {
    let qname = start.name();
    let mut element = XmlElement {
        prefix: qname.prefix().map(|p| lossy(p.as_ref()).into_owned()),
        name: lossy(qname.local_name().as_ref()).into_owned(),
        ..XmlElement::default()
    };

    for attr in start.attributes() {
        let attr = attr?;
        let key = lossy(attr.key.as_ref()).into_owned();
        let raw = lossy(&attr.value);
        let value = quick_xml::escape::unescape(&raw)
            .map_err(|e| SchemaParseError::invalid_xml(e.to_string()))?
            .into_owned();

        let prefix = match key.as_str() {
            "xmlns" => Some(String::new()),
            other => other.strip_prefix("xmlns:").map(str::to_string),
        };
        if let Some(prefix) = prefix
            && !bindings.iter().any(|b: &NamespaceBinding| b.prefix == prefix)
        {
            bindings.push(NamespaceBinding {
                prefix,
                uri: value.clone(),
            });
        }
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_some() {
        return Err(SchemaParseError::invalid_xml("document has more than one root element"));
    } else {
        *root = Some(element);
    }
    Ok(())
}

fn lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseReason;

    #[test]
    fn builds_element_tree() {
        let doc = parse(
            r#"<?xml version="1.0"?>
            <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:orders">
              <xs:element name="Order"><xs:annotation><xs:documentation>An order</xs:documentation></xs:annotation></xs:element>
              <xs:element name="Empty"/>
            </xs:schema>"#,
        )
        .unwrap();
        assert!(doc.root.is("schema"));
        assert_eq!(doc.root.prefix.as_deref(), Some("xs"));
        assert_eq!(doc.root.children.len(), 2);
        assert_eq!(doc.root.children[0].documentation(), Some("An order"));
        assert!(doc.is_xsd_name("xs:string"));
        assert!(!doc.is_xsd_name("tns:Order"));
        assert_eq!(doc.namespace().target_namespace.as_deref(), Some("urn:orders"));
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert_eq!(parse("<a><b></a>").unwrap_err().reason, ParseReason::InvalidXml);
        assert_eq!(parse("<a>").unwrap_err().reason, ParseReason::InvalidXml);
        assert_eq!(parse("").unwrap_err().reason, ParseReason::EmptyStructure);
    }
}
