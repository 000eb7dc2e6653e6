//! XML Schema normalization.
//!
//! Global elements become top-level fields. Named and inline complex types
//! are expanded in place, attributes become `@name` leaves, and simple types
//! resolve to the scalar kind of their base. Constructs that cannot be
//! expanded (unresolved references, wildcards, recursive types) are kept as
//! opaque leaves so the rest of the schema stays usable.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use fieldmap_model::{FieldKind, FieldSpec, FieldTree, MaxOccurs};

use crate::error::{Result, SchemaParseError};
use crate::input::NormalizeOptions;
use crate::normalizer::NormalizedSchema;
use crate::xml::{self, XmlDocument, XmlElement, split_qname};

/// Name of the leaf carrying the character content of a simple-content type.
pub const TEXT_FIELD: &str = "#text";

pub(crate) fn normalize_text(text: &str, options: &NormalizeOptions) -> Result<NormalizedSchema> {
    let doc = xml::parse(text)?;
    if !doc.root.is("schema") {
        return Err(SchemaParseError::invalid_xml(format!(
            "expected an xs:schema root element, found <{}>",
            doc.root.name
        )));
    }

    let index = SchemaIndex::build(&doc, [&doc.root]);
    let mut expander = Expander::new(&index, options.max_depth);
    let fields = expander.top_level();
    if fields.is_empty() {
        return Err(SchemaParseError::empty(
            "schema declares no global elements or complex types",
        ));
    }

    Ok(NormalizedSchema {
        tree: FieldTree::from_specs(options.root_name.clone(), fields)?,
        namespace: Some(doc.namespace()),
        unparsed: expander.unparsed,
    })
}

/// Global declarations of one or more schema documents, by local name.
pub(crate) struct SchemaIndex<'a> {
    doc: &'a XmlDocument,
    elements: HashMap<&'a str, &'a XmlElement>,
    element_order: Vec<&'a XmlElement>,
    complex_types: HashMap<&'a str, &'a XmlElement>,
    complex_order: Vec<&'a XmlElement>,
    simple_types: HashMap<&'a str, &'a XmlElement>,
    groups: HashMap<&'a str, &'a XmlElement>,
    attribute_groups: HashMap<&'a str, &'a XmlElement>,
    attributes: HashMap<&'a str, &'a XmlElement>,
    /// Global elements declared more than once with different content.
    conflicting_elements: HashSet<&'a str>,
    /// Named complex types declared more than once with different content.
    conflicting_types: HashSet<&'a str>,
}

impl<'a> SchemaIndex<'a> {
    pub fn build(doc: &'a XmlDocument, schemas: impl IntoIterator<Item = &'a XmlElement>) -> Self {
        let mut index = Self {
            doc,
            elements: HashMap::new(),
            element_order: Vec::new(),
            complex_types: HashMap::new(),
            complex_order: Vec::new(),
            simple_types: HashMap::new(),
            groups: HashMap::new(),
            attribute_groups: HashMap::new(),
            attributes: HashMap::new(),
            conflicting_elements: HashSet::new(),
            conflicting_types: HashSet::new(),
        };

        for schema in schemas {
            for decl in &schema.children {
                if matches!(decl.name.as_str(), "import" | "include" | "redefine") {
                    tracing::debug!(
                        construct = %decl.name,
                        location = decl.attr("schemaLocation").unwrap_or_default(),
                        "external schema not followed"
                    );
                    continue;
                }
                let Some(name) = decl.attr("name") else {
                    continue;
                };
                match decl.name.as_str() {
                    "element" => match index.elements.entry(name) {
                        Entry::Vacant(slot) => {
                            slot.insert(decl);
                            index.element_order.push(decl);
                        }
                        Entry::Occupied(slot) => {
                            if *slot.get() != decl {
                                tracing::warn!(element = name, "global element declared twice with different content");
                                index.conflicting_elements.insert(name);
                            }
                        }
                    },
                    "complexType" => match index.complex_types.entry(name) {
                        Entry::Vacant(slot) => {
                            slot.insert(decl);
                            index.complex_order.push(decl);
                        }
                        Entry::Occupied(slot) => {
                            if *slot.get() != decl {
                                tracing::warn!(complex_type = name, "complex type declared twice with different content");
                                index.conflicting_types.insert(name);
                            }
                        }
                    },
                    "simpleType" => {
                        index.simple_types.insert(name, decl);
                    }
                    "group" => {
                        index.groups.insert(name, decl);
                    }
                    "attributeGroup" => {
                        index.attribute_groups.insert(name, decl);
                    }
                    "attribute" => {
                        index.attributes.insert(name, decl);
                    }
                    _ => {}
                }
            }
        }
        index
    }

    pub fn element(&self, qname: &str) -> Option<&'a XmlElement> {
        self.elements.get(split_qname(qname).1).copied()
    }
}

/// Occurrence flags a model group passes down to its particles.
#[derive(Debug, Clone, Copy, Default)]
struct GroupFlags {
    optional: bool,
    many: bool,
}

impl GroupFlags {
    fn nested(self, group: &XmlElement, choice: bool) -> Self {
        let (min, max) = occurs(group);
        Self {
            optional: self.optional || choice || min == 0,
            many: self.many || max.is_many(),
        }
    }

    fn apply(self, mut spec: FieldSpec) -> FieldSpec {
        if self.optional {
            spec = spec.optional();
        }
        if self.many {
            spec = spec.with_max(MaxOccurs::Unbounded);
        }
        spec
    }
}

/// A named declaration on the expansion stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decl<'a> {
    Element(&'a str),
    Type(&'a str),
    Group(&'a str),
}

/// Expands declarations into field specs.
pub(crate) struct Expander<'a> {
    index: &'a SchemaIndex<'a>,
    max_depth: usize,
    /// Global elements, named types and groups currently being expanded.
    active: Vec<Decl<'a>>,
    /// Opaque leaves emitted so far.
    pub unparsed: usize,
}

impl<'a> Expander<'a> {
    pub fn new(index: &'a SchemaIndex<'a>, max_depth: usize) -> Self {
        Self {
            index,
            max_depth,
            active: Vec::new(),
            unparsed: 0,
        }
    }

    /// Global elements, or named complex types when the schema declares no
    /// global element.
    pub fn top_level(&mut self) -> Vec<FieldSpec> {
        let index = self.index;
        let fields = if index.element_order.is_empty() {
            index
                .complex_order
                .iter()
                .copied()
                .filter_map(|ct| Some((ct.attr("name")?, ct)))
                .map(|(name, ct)| self.named_complex(name, name, ct, 0))
                .collect()
        } else {
            index
                .element_order
                .iter()
                .copied()
                .map(|el| self.global_element(el, 0))
                .collect()
        };
        self.merge_fields(fields)
    }

    pub fn opaque(&mut self, name: &str, reason: String) -> FieldSpec {
        tracing::debug!(field = name, reason = %reason, "emitting opaque leaf");
        self.unparsed += 1;
        FieldSpec::opaque(name, reason)
    }

    /// A global element by qualified name.
    pub fn element_ref(&mut self, qname: &str, depth: usize) -> FieldSpec {
        match self.index.element(qname) {
            Some(el) => self.global_element(el, depth),
            None => {
                let local = split_qname(qname).1;
                self.opaque(local, format!("unresolved element reference {qname}"))
            }
        }
    }

    /// A global element declaration; re-entering one that is being expanded
    /// yields an opaque leaf.
    fn global_element(&mut self, el: &'a XmlElement, depth: usize) -> FieldSpec {
        let Some(name) = el.attr("name") else {
            return self.declared_element(el, depth);
        };
        if self.index.conflicting_elements.contains(name) {
            return self.opaque(name, format!("conflicting declarations of element {name}"));
        }
        let decl = Decl::Element(name);
        if self.active.contains(&decl) {
            return self.opaque(name, format!("recursive element {name}"));
        }
        self.active.push(decl);
        let spec = self.declared_element(el, depth);
        self.active.pop();
        spec
    }

    /// A local element particle or element reference, with its occurrence.
    pub fn element(&mut self, el: &'a XmlElement, depth: usize) -> FieldSpec {
        let (min, max) = occurs(el);
        let spec = if let Some(reference) = el.attr("ref") {
            self.element_ref(reference, depth)
        } else {
            self.declared_element(el, depth)
        };
        spec.with_occurs(min, max)
    }

    /// Element content, ignoring the element's own occurrence.
    pub fn declared_element(&mut self, el: &'a XmlElement, depth: usize) -> FieldSpec {
        let Some(name) = el.attr("name") else {
            return self.opaque("element", "element without name".to_string());
        };
        if depth > self.max_depth {
            return self.opaque(name, "nesting exceeds depth limit".to_string());
        }

        let spec = if let Some(ty) = el.attr("type") {
            self.typed(name, ty, depth)
        } else if let Some(ct) = el.child("complexType") {
            self.complex(name, ct, depth)
        } else if let Some(st) = el.child("simpleType") {
            FieldSpec::new(name, self.simple_kind(st, depth))
        } else {
            FieldSpec::new(name, FieldKind::String)
        };
        match el.documentation() {
            Some(doc) if spec.description.is_none() => spec.with_description(doc),
            _ => spec,
        }
    }

    /// Field named `name` of the (possibly prefixed) type `qname`.
    pub fn typed(&mut self, name: &str, qname: &'a str, depth: usize) -> FieldSpec {
        let local = split_qname(qname).1;
        if self.index.doc.is_xsd_name(qname) {
            return FieldSpec::new(name, builtin_kind(local));
        }
        if let Some(ct) = self.index.complex_types.get(local).copied() {
            return self.named_complex(name, qname, ct, depth);
        }
        if let Some(st) = self.index.simple_types.get(local).copied() {
            return FieldSpec::new(name, self.simple_kind(st, depth));
        }
        self.opaque(name, format!("unresolved type {qname}"))
    }

    fn named_complex(&mut self, name: &str, qname: &'a str, ct: &'a XmlElement, depth: usize) -> FieldSpec {
        let local = split_qname(qname).1;
        if self.index.conflicting_types.contains(local) {
            return self.opaque(name, format!("conflicting declarations of type {qname}"));
        }
        let decl = Decl::Type(local);
        if self.active.contains(&decl) {
            return self.opaque(name, format!("recursive type {qname}"));
        }
        self.active.push(decl);
        let spec = self.complex(name, ct, depth);
        self.active.pop();
        spec
    }

    fn complex(&mut self, name: &str, ct: &'a XmlElement, depth: usize) -> FieldSpec {
        let mut children = Vec::new();
        self.content(ct, depth + 1, &mut children);
        let spec = FieldSpec::object(name, self.merge_fields(children));
        match ct.documentation() {
            Some(doc) => spec.with_description(doc),
            None => spec,
        }
    }

    /// Content model of a complex type or derivation.
    fn content(&mut self, container: &'a XmlElement, depth: usize, out: &mut Vec<FieldSpec>) {
        if depth > self.max_depth {
            out.push(self.opaque("content", "nesting exceeds depth limit".to_string()));
            return;
        }
        for child in &container.children {
            match child.name.as_str() {
                "sequence" | "all" => {
                    self.particles(child, depth, GroupFlags::default().nested(child, false), out);
                }
                "choice" => {
                    self.particles(child, depth, GroupFlags::default().nested(child, true), out);
                }
                "group" => self.group_ref(child, depth, GroupFlags::default().nested(child, false), out),
                "attribute" => out.push(self.attribute(child, depth)),
                "attributeGroup" => self.attribute_group(child, depth, out),
                "complexContent" => self.complex_content(child, depth, out),
                "simpleContent" => self.simple_content(child, depth, out),
                "annotation" | "anyAttribute" | "assert" | "openContent" => {}
                other => {
                    let spec = self.opaque(other, format!("unsupported construct {other}"));
                    out.push(spec);
                }
            }
        }
    }

    /// Particles of a model group. Alternatives of a choice that share a
    /// name are merged into one field without widening it.
    fn particles(&mut self, group: &'a XmlElement, depth: usize, flags: GroupFlags, out: &mut Vec<FieldSpec>) {
        if group.is("choice") {
            let mut branches = Vec::new();
            self.particle_list(group, depth, flags, &mut branches);
            let merged = self.fold(branches, false);
            out.extend(merged);
        } else {
            self.particle_list(group, depth, flags, out);
        }
    }

    fn particle_list(&mut self, group: &'a XmlElement, depth: usize, flags: GroupFlags, out: &mut Vec<FieldSpec>) {
        for particle in &group.children {
            match particle.name.as_str() {
                "element" => {
                    let spec = self.element(particle, depth);
                    out.push(flags.apply(spec));
                }
                "sequence" | "all" => {
                    self.particles(particle, depth, flags.nested(particle, false), out);
                }
                "choice" => self.particles(particle, depth, flags.nested(particle, true), out),
                "group" => self.group_ref(particle, depth, flags.nested(particle, false), out),
                "any" => {
                    let spec = self.opaque("any", "wildcard xs:any".to_string());
                    out.push(flags.apply(spec.optional()));
                }
                "annotation" => {}
                other => {
                    let spec = self.opaque(other, format!("unsupported particle {other}"));
                    out.push(spec);
                }
            }
        }
    }

    fn group_ref(&mut self, el: &'a XmlElement, depth: usize, flags: GroupFlags, out: &mut Vec<FieldSpec>) {
        let Some(reference) = el.attr("ref") else {
            return;
        };
        let local = split_qname(reference).1;
        let Some(group) = self.index.groups.get(local).copied() else {
            out.push(self.opaque(local, format!("unresolved group {reference}")));
            return;
        };
        if depth > self.max_depth {
            out.push(self.opaque(local, "nesting exceeds depth limit".to_string()));
            return;
        }
        let decl = Decl::Group(local);
        if self.active.contains(&decl) {
            out.push(self.opaque(local, format!("recursive group {reference}")));
            return;
        }
        self.active.push(decl);
        for model in &group.children {
            match model.name.as_str() {
                "sequence" | "all" => self.particles(model, depth + 1, flags.nested(model, false), out),
                "choice" => self.particles(model, depth + 1, flags.nested(model, true), out),
                _ => {}
            }
        }
        self.active.pop();
    }

    fn attribute(&mut self, attr: &'a XmlElement, depth: usize) -> FieldSpec {
        let (decl, name) = match attr.attr("ref") {
            Some(reference) => {
                let local = split_qname(reference).1;
                match self.index.attributes.get(local).copied() {
                    Some(decl) => (decl, local),
                    None => {
                        return self.opaque(
                            &format!("@{local}"),
                            format!("unresolved attribute reference {reference}"),
                        );
                    }
                }
            }
            None => match attr.attr("name") {
                Some(name) => (attr, name),
                None => return self.opaque("@attribute", "attribute without name".to_string()),
            },
        };

        let kind = match (decl.attr("type"), decl.child("simpleType")) {
            (Some(ty), _) => self.simple_kind_of(ty, depth),
            (None, Some(st)) => self.simple_kind(st, depth),
            (None, None) => FieldKind::String,
        };
        let spec = FieldSpec::new(format!("@{name}"), kind);
        if attr.attr("use") == Some("required") {
            spec
        } else {
            spec.optional()
        }
    }

    fn attribute_group(&mut self, el: &'a XmlElement, depth: usize, out: &mut Vec<FieldSpec>) {
        let Some(reference) = el.attr("ref") else {
            return;
        };
        let local = split_qname(reference).1;
        let Some(group) = self.index.attribute_groups.get(local).copied() else {
            out.push(self.opaque(local, format!("unresolved attribute group {reference}")));
            return;
        };
        if depth > self.max_depth {
            return;
        }
        for child in &group.children {
            match child.name.as_str() {
                "attribute" => out.push(self.attribute(child, depth)),
                "attributeGroup" => self.attribute_group(child, depth + 1, out),
                _ => {}
            }
        }
    }

    fn complex_content(&mut self, cc: &'a XmlElement, depth: usize, out: &mut Vec<FieldSpec>) {
        for derivation in &cc.children {
            match derivation.name.as_str() {
                "extension" => {
                    if let Some(base) = derivation.attr("base") {
                        self.base_content(base, depth, out);
                    }
                    self.content(derivation, depth, out);
                }
                "restriction" => self.content(derivation, depth, out),
                _ => {}
            }
        }
    }

    /// Inherited content of an extension base.
    fn base_content(&mut self, base: &'a str, depth: usize, out: &mut Vec<FieldSpec>) {
        if self.index.doc.is_xsd_name(base) {
            return;
        }
        let local = split_qname(base).1;
        let Some(ct) = self.index.complex_types.get(local).copied() else {
            out.push(self.opaque(local, format!("unresolved base type {base}")));
            return;
        };
        if self.index.conflicting_types.contains(local) {
            out.push(self.opaque(local, format!("conflicting declarations of type {base}")));
            return;
        }
        let decl = Decl::Type(local);
        if self.active.contains(&decl) {
            out.push(self.opaque(local, format!("recursive base type {base}")));
            return;
        }
        self.active.push(decl);
        self.content(ct, depth + 1, out);
        self.active.pop();
    }

    fn simple_content(&mut self, sc: &'a XmlElement, depth: usize, out: &mut Vec<FieldSpec>) {
        for derivation in &sc.children {
            if !matches!(derivation.name.as_str(), "extension" | "restriction") {
                continue;
            }
            let kind = derivation
                .attr("base")
                .map_or(FieldKind::String, |base| self.simple_kind_of(base, depth));
            out.push(FieldSpec::new(TEXT_FIELD, kind));
            for child in &derivation.children {
                match child.name.as_str() {
                    "attribute" => out.push(self.attribute(child, depth)),
                    "attributeGroup" => self.attribute_group(child, depth, out),
                    _ => {}
                }
            }
        }
    }

    /// Fold fields that share a name. A repeated name widens the field to
    /// many occurrences.
    pub fn merge_fields(&mut self, fields: Vec<FieldSpec>) -> Vec<FieldSpec> {
        self.fold(fields, true)
    }

    fn fold(&mut self, fields: Vec<FieldSpec>, widen: bool) -> Vec<FieldSpec> {
        let mut out: Vec<FieldSpec> = Vec::with_capacity(fields.len());
        for field in fields {
            match out.iter().position(|f| f.name == field.name) {
                Some(pos) => {
                    tracing::debug!(field = %field.name, widen, "repeated particle name merged");
                    let merged = self.merge(out[pos].clone(), field);
                    out[pos] = if widen {
                        merged.with_max(MaxOccurs::Unbounded)
                    } else {
                        merged
                    };
                }
                None => out.push(field),
            }
        }
        out
    }

    /// Merge two declarations of one field. Containers of the same kind get
    /// the union of their children; children missing on one side become
    /// optional. Any other difference yields an opaque leaf.
    fn merge(&mut self, first: FieldSpec, second: FieldSpec) -> FieldSpec {
        let min = first.min_occurs.min(second.min_occurs);
        let max = if first.max_occurs.is_many() {
            first.max_occurs
        } else {
            second.max_occurs
        };
        if same_content(&first, &second) {
            return first.with_occurs(min, max);
        }
        let mergeable = first.kind == second.kind
            && first.kind.is_container()
            && first.item_kind == second.item_kind
            && !first.unparsed
            && !second.unparsed;
        if !mergeable {
            tracing::warn!(
                field = %first.name,
                first = %first.kind,
                second = %second.kind,
                "conflicting declarations of one field"
            );
            let reason = format!(
                "conflicting declarations of {}: {} and {}",
                first.name, first.kind, second.kind
            );
            return self.opaque(&first.name, reason).with_occurs(min, max);
        }

        let mut children: Vec<FieldSpec> = first
            .children
            .iter()
            .map(|child| {
                if second.children.iter().any(|c| c.name == child.name) {
                    child.clone()
                } else {
                    child.clone().optional()
                }
            })
            .collect();
        for child in second.children.iter().cloned() {
            match children.iter().position(|c| c.name == child.name) {
                Some(pos) => children[pos] = self.merge(children[pos].clone(), child),
                None => children.push(child.optional()),
            }
        }
        let description = first.description.clone().or(second.description);
        let mut merged = first.with_children(children).with_occurs(min, max);
        merged.description = description;
        merged
    }

    /// Scalar kind of a named simple or built-in type. Complex or unknown
    /// types read as strings.
    fn simple_kind_of(&self, qname: &str, depth: usize) -> FieldKind {
        if self.index.doc.is_xsd_name(qname) {
            return builtin_kind(split_qname(qname).1);
        }
        match self.index.simple_types.get(split_qname(qname).1) {
            Some(st) => self.simple_kind(st, depth + 1),
            None => FieldKind::String,
        }
    }

    fn simple_kind(&self, st: &XmlElement, depth: usize) -> FieldKind {
        if depth > self.max_depth {
            return FieldKind::String;
        }
        let Some(restriction) = st.child("restriction") else {
            // list and union
            return FieldKind::String;
        };
        match (restriction.attr("base"), restriction.child("simpleType")) {
            (Some(base), _) => self.simple_kind_of(base, depth),
            (None, Some(inner)) => self.simple_kind(inner, depth + 1),
            (None, None) => FieldKind::String,
        }
    }
}

/// `minOccurs`/`maxOccurs` of a particle, defaulting to `(1,1)`.
fn occurs(el: &XmlElement) -> (u32, MaxOccurs) {
    let min = el
        .attr("minOccurs")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(1);
    let max = el
        .attr("maxOccurs")
        .and_then(MaxOccurs::parse)
        .unwrap_or(MaxOccurs::ONE);
    (min, max)
}

fn builtin_kind(local: &str) -> FieldKind {
    match local {
        "boolean" => FieldKind::Boolean,
        "date" => FieldKind::Date,
        "dateTime" | "dateTimeStamp" => FieldKind::Datetime,
        "decimal" | "float" | "double" | "integer" | "int" | "long" | "short" | "byte"
        | "nonNegativeInteger" | "positiveInteger" | "nonPositiveInteger" | "negativeInteger"
        | "unsignedLong" | "unsignedInt" | "unsignedShort" | "unsignedByte" => FieldKind::Number,
        _ => FieldKind::String,
    }
}

/// Equal shape, ignoring occurrence and documentation.
fn same_content(a: &FieldSpec, b: &FieldSpec) -> bool {
    a.kind == b.kind
        && a.item_kind == b.item_kind
        && a.unparsed == b.unparsed
        && a.children.len() == b.children.len()
        && a.children
            .iter()
            .zip(&b.children)
            .all(|(x, y)| {
                x.name == y.name
                    && x.required == y.required
                    && x.min_occurs == y.min_occurs
                    && x.max_occurs == y.max_occurs
                    && same_content(x, y)
            })
}

#[cfg(test)]
mod tests {
    use super::*;

    const XS: &str = r#"xmlns:xs="http://www.w3.org/2001/XMLSchema""#;

    fn normalize(body: &str) -> NormalizedSchema {
        let text = format!(r#"<xs:schema {XS} targetNamespace="urn:t" xmlns:t="urn:t">{body}</xs:schema>"#);
        normalize_text(&text, &NormalizeOptions::default()).unwrap()
    }

    #[test]
    fn occurrence_bounds_are_kept() {
        let schema = normalize(
            r#"<xs:element name="Order">
                 <xs:complexType><xs:sequence>
                   <xs:element name="id" type="xs:string"/>
                   <xs:element name="note" type="xs:string" minOccurs="0"/>
                   <xs:element name="line" maxOccurs="unbounded">
                     <xs:complexType><xs:sequence>
                       <xs:element name="qty" type="xs:int"/>
                     </xs:sequence></xs:complexType>
                   </xs:element>
                 </xs:sequence></xs:complexType>
               </xs:element>"#,
        );
        let tree = &schema.tree;
        assert!(tree.find_by_path_str("/Order/id").unwrap().required);
        let note = tree.find_by_path_str("/Order/note").unwrap();
        assert!(!note.required);
        assert_eq!(note.min_occurs, 0);
        let line = tree.find_by_path_str("/Order/line").unwrap();
        assert_eq!(line.max_occurs, MaxOccurs::Unbounded);
        let qty = tree.find_by_path_str("/Order/line/qty").unwrap();
        assert_eq!(qty.kind, FieldKind::Number);
        assert!(tree.is_repeated(qty.id()));
        assert_eq!(schema.unparsed, 0);
    }

    #[test]
    fn named_types_extensions_and_attributes() {
        let schema = normalize(
            r#"<xs:complexType name="Party">
                 <xs:sequence><xs:element name="name" type="xs:string"/></xs:sequence>
                 <xs:attribute name="id" type="xs:string" use="required"/>
               </xs:complexType>
               <xs:complexType name="Customer">
                 <xs:complexContent><xs:extension base="t:Party">
                   <xs:sequence><xs:element name="since" type="xs:date"/></xs:sequence>
                 </xs:extension></xs:complexContent>
               </xs:complexType>
               <xs:complexType name="Money">
                 <xs:simpleContent><xs:extension base="xs:decimal">
                   <xs:attribute name="currency" type="xs:string"/>
                 </xs:extension></xs:simpleContent>
               </xs:complexType>
               <xs:element name="Invoice">
                 <xs:complexType><xs:sequence>
                   <xs:element name="buyer" type="t:Customer"/>
                   <xs:element name="total" type="t:Money"/>
                 </xs:sequence></xs:complexType>
               </xs:element>"#,
        );
        let tree = &schema.tree;
        assert!(tree.find_by_path_str("/Invoice/buyer/name").is_some());
        assert!(tree.find_by_path_str("/Invoice/buyer/@id").unwrap().required);
        assert_eq!(
            tree.find_by_path_str("/Invoice/buyer/since").unwrap().kind,
            FieldKind::Date
        );
        assert_eq!(
            tree.find_by_path_str("/Invoice/total/#text").unwrap().kind,
            FieldKind::Number
        );
        assert!(!tree.find_by_path_str("/Invoice/total/@currency").unwrap().required);
    }

    #[test]
    fn choice_members_are_optional() {
        let schema = normalize(
            r#"<xs:element name="Payment"><xs:complexType><xs:choice>
                 <xs:element name="card" type="xs:string"/>
                 <xs:element name="iban" type="xs:string"/>
               </xs:choice></xs:complexType></xs:element>"#,
        );
        assert!(!schema.tree.find_by_path_str("/Payment/card").unwrap().required);
        assert!(!schema.tree.find_by_path_str("/Payment/iban").unwrap().required);
    }

    #[test]
    fn unsupported_constructs_become_opaque_leaves() {
        let schema = normalize(
            r#"<xs:complexType name="Node">
                 <xs:sequence><xs:element name="child" type="t:Node" minOccurs="0"/></xs:sequence>
               </xs:complexType>
               <xs:element name="Doc"><xs:complexType><xs:sequence>
                 <xs:element name="root" type="t:Node"/>
                 <xs:element name="ext" type="t:Missing"/>
                 <xs:any/>
               </xs:sequence></xs:complexType></xs:element>"#,
        );
        let tree = &schema.tree;
        assert!(tree.find_by_path_str("/Doc/root/child").unwrap().unparsed);
        assert!(tree.find_by_path_str("/Doc/ext").unwrap().unparsed);
        assert!(tree.find_by_path_str("/Doc/any").unwrap().unparsed);
        assert_eq!(schema.unparsed, 3);
    }

    #[test]
    fn namespace_is_captured_once() {
        let schema = normalize(r#"<xs:element name="A" type="xs:string"/>"#);
        let namespace = schema.namespace.unwrap();
        assert_eq!(namespace.target_namespace.as_deref(), Some("urn:t"));
        assert_eq!(namespace.uri_for("t"), Some("urn:t"));
    }

    #[test]
    fn non_schema_root_is_invalid() {
        let err = normalize_text("<Order/>", &NormalizeOptions::default()).unwrap_err();
        assert_eq!(err.reason, crate::error::ParseReason::InvalidXml);
        let err = normalize_text(&format!("<xs:schema {XS}/>"), &NormalizeOptions::default())
            .unwrap_err();
        assert_eq!(err.reason, crate::error::ParseReason::EmptyStructure);
    }

    #[test]
    fn mutually_recursive_elements_become_opaque() {
        let schema = normalize(
            r#"<xs:element name="and"><xs:complexType><xs:sequence>
                 <xs:element ref="t:and" minOccurs="0"/>
                 <xs:element ref="t:or" minOccurs="0"/>
               </xs:sequence></xs:complexType></xs:element>
               <xs:element name="or"><xs:complexType><xs:sequence>
                 <xs:element ref="t:and" minOccurs="0"/>
                 <xs:element ref="t:or" minOccurs="0"/>
               </xs:sequence></xs:complexType></xs:element>"#,
        );
        let tree = &schema.tree;
        assert!(tree.find_by_path_str("/and/and").unwrap().unparsed);
        assert!(tree.find_by_path_str("/and/or/and").unwrap().unparsed);
        assert!(tree.find_by_path_str("/and/or/or").unwrap().unparsed);
        assert!(tree.find_by_path_str("/or/and/or").unwrap().unparsed);
        assert_eq!(schema.unparsed, 6);
        assert!(tree.len() < 20);
    }

    #[test]
    fn recursive_group_becomes_opaque() {
        let schema = normalize(
            r#"<xs:group name="Expr"><xs:sequence>
                 <xs:element name="op" type="xs:string"/>
                 <xs:element name="nested" minOccurs="0">
                   <xs:complexType><xs:sequence><xs:group ref="t:Expr"/></xs:sequence></xs:complexType>
                 </xs:element>
               </xs:sequence></xs:group>
               <xs:element name="Query"><xs:complexType><xs:sequence>
                 <xs:group ref="t:Expr"/>
               </xs:sequence></xs:complexType></xs:element>"#,
        );
        let tree = &schema.tree;
        assert!(tree.find_by_path_str("/Query/op").is_some());
        assert!(tree.find_by_path_str("/Query/nested/Expr").unwrap().unparsed);
        assert_eq!(schema.unparsed, 1);
    }

    #[test]
    fn choice_alternatives_with_one_name_are_merged() {
        let schema = normalize(
            r#"<xs:element name="Msg"><xs:complexType><xs:choice>
                 <xs:element name="party"><xs:complexType><xs:sequence>
                   <xs:element name="personName" type="xs:string"/>
                 </xs:sequence></xs:complexType></xs:element>
                 <xs:element name="party"><xs:complexType><xs:sequence>
                   <xs:element name="orgName" type="xs:string"/>
                 </xs:sequence></xs:complexType></xs:element>
               </xs:choice></xs:complexType></xs:element>"#,
        );
        let tree = &schema.tree;
        let leaves: Vec<_> = tree.leaf_paths().iter().map(ToString::to_string).collect();
        assert_eq!(leaves, vec!["/Msg/party/personName", "/Msg/party/orgName"]);
        assert!(!tree.find_by_path_str("/Msg/party/personName").unwrap().required);
        assert!(!tree.find_by_path_str("/Msg/party/orgName").unwrap().required);
        assert_eq!(tree.find_by_path_str("/Msg/party").unwrap().max_occurs, MaxOccurs::ONE);
        assert_eq!(schema.unparsed, 0);
    }

    #[test]
    fn repeated_particle_widens_and_clashing_kinds_are_opaque() {
        let schema = normalize(
            r#"<xs:element name="Doc"><xs:complexType><xs:sequence>
                 <xs:element name="note" type="xs:string"/>
                 <xs:element name="code" type="xs:string"/>
                 <xs:element name="note" type="xs:string"/>
                 <xs:element name="code"><xs:complexType><xs:sequence>
                   <xs:element name="value" type="xs:string"/>
                 </xs:sequence></xs:complexType></xs:element>
               </xs:sequence></xs:complexType></xs:element>"#,
        );
        let tree = &schema.tree;
        let note = tree.find_by_path_str("/Doc/note").unwrap();
        assert!(!note.unparsed);
        assert_eq!(note.max_occurs, MaxOccurs::Unbounded);
        let code = tree.find_by_path_str("/Doc/code").unwrap();
        assert!(code.unparsed);
        assert!(code.description.as_deref().unwrap().contains("conflicting"));
        assert_eq!(schema.unparsed, 1);
    }
}
