//! Custom field-builder definitions.

use std::collections::HashSet;

use fieldmap_model::{FieldPath, FieldSpec, FieldTree, MaxOccurs, validate_field_name};

use crate::error::{Result, SchemaParseError};
use crate::input::NormalizeOptions;

pub(crate) fn normalize_fields(fields: &[FieldSpec], options: &NormalizeOptions) -> Result<FieldTree> {
    if fields.is_empty() {
        return Err(SchemaParseError::empty("custom structure has no fields"));
    }
    check_siblings(fields, &FieldPath::root())?;
    Ok(FieldTree::from_specs(options.root_name.clone(), fields.to_vec())?)
}

fn check_siblings(fields: &[FieldSpec], parent: &FieldPath) -> Result<()> {
    let mut seen = HashSet::new();
    for field in fields {
        if validate_field_name(&field.name).is_err() {
            return Err(SchemaParseError::invalid_field(format!(
                "invalid field name {:?} under {parent}",
                field.name
            )));
        }
        let path = parent.child(&field.name);
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaParseError::invalid_field(format!("duplicate field {path}")));
        }
        if !field.children.is_empty() && !field.kind.is_container() {
            return Err(SchemaParseError::invalid_field(format!(
                "{path}: a {} field cannot have children",
                field.kind
            )));
        }
        if let MaxOccurs::Bounded(max) = field.max_occurs
            && max < field.min_occurs
        {
            return Err(SchemaParseError::invalid_field(format!(
                "{path}: maxOccurs {max} is below minOccurs {}",
                field.min_occurs
            )));
        }
        check_siblings(&field.children, &path)?;
    }
    Ok(())
}
