//! WSDL normalization.
//!
//! Schemas under `types` are merged into one declaration index. Each
//! `message` becomes an object field whose parts resolve to the referenced
//! element or type. Documents without messages (WSDL 2.0 style) fall back
//! to the global elements of the embedded schemas.

use fieldmap_model::{FieldSpec, FieldTree};

use crate::error::{Result, SchemaParseError};
use crate::input::NormalizeOptions;
use crate::normalizer::NormalizedSchema;
use crate::xml::{self, XmlElement};
use crate::xsd::{Expander, SchemaIndex};

pub(crate) fn normalize_text(text: &str, options: &NormalizeOptions) -> Result<NormalizedSchema> {
    let doc = xml::parse(text)?;
    if !(doc.root.is("definitions") || doc.root.is("description")) {
        return Err(SchemaParseError::invalid_xml(format!(
            "expected a wsdl:definitions root element, found <{}>",
            doc.root.name
        )));
    }

    let schemas: Vec<&XmlElement> = doc
        .root
        .children_named("types")
        .flat_map(|types| types.children_named("schema"))
        .collect();
    let index = SchemaIndex::build(&doc, schemas.iter().copied());
    let mut expander = Expander::new(&index, options.max_depth);

    let messages: Vec<&XmlElement> = doc.root.children_named("message").collect();
    let fields = if messages.is_empty() {
        expander.top_level()
    } else {
        let mut fields = Vec::with_capacity(messages.len());
        for message in messages {
            fields.push(message_field(&mut expander, message));
        }
        expander.merge_fields(fields)
    };
    tracing::debug!(
        schemas = schemas.len(),
        fields = fields.len(),
        "WSDL types resolved"
    );
    if fields.is_empty() {
        return Err(SchemaParseError::empty(
            "WSDL declares no messages and its types declare no elements",
        ));
    }

    Ok(NormalizedSchema {
        tree: FieldTree::from_specs(options.root_name.clone(), fields)?,
        namespace: Some(doc.namespace()),
        unparsed: expander.unparsed,
    })
}

fn message_field<'a>(expander: &mut Expander<'a>, message: &'a XmlElement) -> FieldSpec {
    let name = message.attr("name").unwrap_or("message");
    let mut parts = Vec::new();
    for part in message.children_named("part") {
        let part_name = part.attr("name").unwrap_or("part");
        let spec = match (part.attr("element"), part.attr("type")) {
            (Some(element), _) => expander.element_ref(element, 1),
            (None, Some(ty)) => expander.typed(part_name, ty, 1),
            (None, None) => expander.opaque(part_name, "part without element or type".to_string()),
        };
        parts.push(spec);
    }
    FieldSpec::object(name, expander.merge_fields(parts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmap_model::FieldKind;

    const WSDL: &str = r#"<?xml version="1.0"?>
<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
                  xmlns:xs="http://www.w3.org/2001/XMLSchema"
                  xmlns:tns="urn:orders" targetNamespace="urn:orders">
  <wsdl:types>
    <xs:schema targetNamespace="urn:orders">
      <xs:element name="GetOrder">
        <xs:complexType><xs:sequence>
          <xs:element name="orderId" type="xs:string"/>
        </xs:sequence></xs:complexType>
      </xs:element>
      <xs:complexType name="Status">
        <xs:sequence><xs:element name="code" type="xs:int"/></xs:sequence>
      </xs:complexType>
    </xs:schema>
  </wsdl:types>
  <wsdl:message name="GetOrderRequest">
    <wsdl:part name="parameters" element="tns:GetOrder"/>
  </wsdl:message>
  <wsdl:message name="GetOrderResponse">
    <wsdl:part name="status" type="tns:Status"/>
    <wsdl:part name="raw" element="tns:Unknown"/>
  </wsdl:message>
</wsdl:definitions>"#;

    #[test]
    fn messages_resolve_parts() {
        let schema = normalize_text(WSDL, &NormalizeOptions::default()).unwrap();
        let tree = &schema.tree;
        assert_eq!(
            tree.find_by_path_str("/GetOrderRequest/GetOrder/orderId").unwrap().kind,
            FieldKind::String
        );
        assert_eq!(
            tree.find_by_path_str("/GetOrderResponse/status/code").unwrap().kind,
            FieldKind::Number
        );
        assert!(tree.find_by_path_str("/GetOrderResponse/Unknown").unwrap().unparsed);
        assert_eq!(schema.unparsed, 1);
        assert_eq!(
            schema.namespace.unwrap().target_namespace.as_deref(),
            Some("urn:orders")
        );
    }

    #[test]
    fn falls_back_to_schema_elements() {
        let text = WSDL
            .lines()
            .filter(|line| !line.contains("message") && !line.contains("part"))
            .collect::<Vec<_>>()
            .join("\n");
        let schema = normalize_text(&text, &NormalizeOptions::default()).unwrap();
        assert!(schema.tree.find_by_path_str("/GetOrder/orderId").is_some());
    }

    #[test]
    fn conflicting_global_declarations_are_opaque() {
        let text = r#"<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
                  xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:tns="urn:orders">
  <wsdl:types>
    <xs:schema>
      <xs:element name="Order"><xs:complexType><xs:sequence>
        <xs:element name="id" type="xs:string"/>
      </xs:sequence></xs:complexType></xs:element>
      <xs:element name="Ack" type="xs:string"/>
    </xs:schema>
    <xs:schema>
      <xs:element name="Order"><xs:complexType><xs:sequence>
        <xs:element name="number" type="xs:int"/>
      </xs:sequence></xs:complexType></xs:element>
      <xs:element name="Ack" type="xs:string"/>
    </xs:schema>
  </wsdl:types>
  <wsdl:message name="Submit">
    <wsdl:part name="body" element="tns:Order"/>
    <wsdl:part name="ack" element="tns:Ack"/>
  </wsdl:message>
</wsdl:definitions>"#;
        let schema = normalize_text(text, &NormalizeOptions::default()).unwrap();
        let tree = &schema.tree;
        assert!(tree.find_by_path_str("/Submit/Order").unwrap().unparsed);
        assert!(tree.find_by_path_str("/Submit/Order/id").is_none());
        assert!(!tree.find_by_path_str("/Submit/Ack").unwrap().unparsed);
        assert_eq!(schema.unparsed, 1);
    }
}
