//! Duplicate target bindings in persisted sets.

use std::collections::BTreeMap;

use fieldmap_model::{FieldPath, MappingId, MappingSet};

use crate::issue::Issue;

pub(crate) fn check(set: &MappingSet) -> Vec<Issue> {
    let mut by_target: BTreeMap<&FieldPath, Vec<MappingId>> = BTreeMap::new();
    for mapping in &set.mappings {
        by_target
            .entry(&mapping.target_path)
            .or_default()
            .push(mapping.id.clone());
    }

    by_target
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(path, mapping_ids)| Issue::DuplicateTargetBinding {
            path: path.clone(),
            mapping_ids,
        })
        .collect()
}
