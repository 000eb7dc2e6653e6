//! CRUD over the mappings of one [`MappingSet`].
//!
//! Every operation takes the set by reference and returns a new set; the
//! input is never modified. A target path is bound by at most one mapping.

use fieldmap_model::{FieldMapping, FieldPath, MappingId, MappingSet, Transform};

use crate::error::{MappingError, Result};

/// How [`MappingStore::add_mapping`] treats an already-bound target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindMode {
    /// Fail with [`MappingError::TargetAlreadyBound`].
    #[default]
    Reject,
    /// Drop the existing mapping (and its transform) and bind the new one in
    /// its place.
    Replace,
}

pub trait MappingStore: Sized {
    /// Bind `sources` to `target`.
    fn add_mapping(&self, sources: Vec<FieldPath>, target: FieldPath, mode: BindMode) -> Result<Self>;

    /// Remove a mapping; unknown ids are ignored.
    fn remove_mapping(&self, id: &MappingId) -> Self;

    /// Remove every mapping.
    fn clear_all(&self) -> Self;

    /// Set custom transform code on a mapping.
    fn attach_transform(&self, id: &MappingId, code: &str) -> Result<Self>;

    /// Drop a mapping's transform, restoring the identity copy.
    fn detach_transform(&self, id: &MappingId) -> Result<Self>;

    /// Add one more source to a mapping (many-to-one aggregation).
    fn add_source_path(&self, id: &MappingId, source: FieldPath) -> Result<Self>;

    /// Remove a source; removing the last source removes the mapping.
    fn remove_source_path(&self, id: &MappingId, source: &FieldPath) -> Result<Self>;

    fn mapping_for_target(&self, target: &FieldPath) -> Option<&FieldMapping>;

    fn mappings_for_source(&self, source: &FieldPath) -> Vec<&FieldMapping>;
}

impl MappingStore for MappingSet {
    fn add_mapping(&self, sources: Vec<FieldPath>, target: FieldPath, mode: BindMode) -> Result<Self> {
        let sources = dedup_sources(sources);
        if sources.is_empty() {
            return Err(MappingError::EmptySourcePaths { target });
        }

        let existing = self.mappings.iter().position(|m| m.target_path == target);
        if let (Some(idx), BindMode::Reject) = (existing, mode) {
            return Err(MappingError::TargetAlreadyBound {
                target,
                mapping_id: self.mappings[idx].id.clone(),
            });
        }

        tracing::debug!(
            target_path = %target,
            sources = sources.len(),
            replaced = existing.is_some(),
            "mapping added"
        );

        let mapping = FieldMapping::new(sources, target);
        let mut next = self.clone();
        match existing {
            Some(idx) => {
                // Replace in place, and drop any further (corrupt) bindings of
                // the same target.
                let target = mapping.target_path.clone();
                next.mappings[idx] = mapping;
                let mut seen = false;
                next.mappings.retain(|m| {
                    if m.target_path != target {
                        return true;
                    }
                    !std::mem::replace(&mut seen, true)
                });
            }
            None => next.mappings.push(mapping),
        }
        Ok(next)
    }

    fn remove_mapping(&self, id: &MappingId) -> Self {
        let mut next = self.clone();
        next.mappings.retain(|m| &m.id != id);
        if next.mappings.len() != self.mappings.len() {
            tracing::debug!(mapping = %id, "mapping removed");
        }
        next
    }

    fn clear_all(&self) -> Self {
        tracing::debug!(removed = self.mappings.len(), "all mappings cleared");
        Self {
            mappings: Vec::new(),
            ..self.clone()
        }
    }

    fn attach_transform(&self, id: &MappingId, code: &str) -> Result<Self> {
        tracing::debug!(mapping = %id, code_len = code.len(), "transform attached");
        self.update(id, |mapping| {
            mapping.transform = Some(Transform::Custom {
                code: code.to_string(),
            });
        })
    }

    fn detach_transform(&self, id: &MappingId) -> Result<Self> {
        self.update(id, |mapping| mapping.transform = None)
    }

    fn add_source_path(&self, id: &MappingId, source: FieldPath) -> Result<Self> {
        self.update(id, |mapping| {
            if !mapping.source_paths.contains(&source) {
                mapping.source_paths.push(source);
            }
        })
    }

    fn remove_source_path(&self, id: &MappingId, source: &FieldPath) -> Result<Self> {
        let next = self.update(id, |mapping| mapping.source_paths.retain(|p| p != source))?;
        let emptied = next
            .get(id)
            .is_some_and(|mapping| mapping.source_paths.is_empty());
        Ok(if emptied { next.remove_mapping(id) } else { next })
    }

    fn mapping_for_target(&self, target: &FieldPath) -> Option<&FieldMapping> {
        self.for_target(target)
    }

    fn mappings_for_source(&self, source: &FieldPath) -> Vec<&FieldMapping> {
        self.for_source(source).collect()
    }
}

trait UpdateMapping: Sized {
    fn update(&self, id: &MappingId, edit: impl FnOnce(&mut FieldMapping)) -> Result<Self>;
}

impl UpdateMapping for MappingSet {
    fn update(&self, id: &MappingId, edit: impl FnOnce(&mut FieldMapping)) -> Result<Self> {
        let mut next = self.clone();
        let mapping = next
            .mappings
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| MappingError::MappingNotFound(id.clone()))?;
        edit(mapping);
        Ok(next)
    }
}

fn dedup_sources(sources: Vec<FieldPath>) -> Vec<FieldPath> {
    let mut out: Vec<FieldPath> = Vec::with_capacity(sources.len());
    for source in sources {
        if !out.contains(&source) {
            out.push(source);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmap_model::StructureId;

    fn path(p: &str) -> FieldPath {
        FieldPath::parse(p).unwrap()
    }

    fn empty_set() -> MappingSet {
        MappingSet::new(
            "orders",
            StructureId::new("src").unwrap(),
            StructureId::new("dst").unwrap(),
        )
    }

    #[test]
    fn reject_mode_refuses_bound_target() {
        let set = empty_set()
            .add_mapping(vec![path("/a")], path("/x"), BindMode::Reject)
            .unwrap();
        let err = set
            .add_mapping(vec![path("/b")], path("/x"), BindMode::Reject)
            .unwrap_err();
        assert!(matches!(err, MappingError::TargetAlreadyBound { .. }));
    }

    #[test]
    fn replace_mode_discards_prior_transform() {
        let set = empty_set()
            .add_mapping(vec![path("/a")], path("/x"), BindMode::Reject)
            .unwrap();
        let id = set.mappings[0].id.clone();
        let set = set.attach_transform(&id, "return a;").unwrap();
        let set = set
            .add_mapping(vec![path("/b")], path("/x"), BindMode::Replace)
            .unwrap();

        assert_eq!(set.len(), 1);
        let mapping = set.mapping_for_target(&path("/x")).unwrap();
        assert_eq!(mapping.source_paths, vec![path("/b")]);
        assert!(mapping.transform.is_none());
        assert_ne!(mapping.id, id);
    }

    #[test]
    fn operations_do_not_touch_input() {
        let set = empty_set()
            .add_mapping(vec![path("/a")], path("/x"), BindMode::Reject)
            .unwrap();
        let cleared = set.clear_all();
        assert!(cleared.is_empty());
        assert_eq!(set.len(), 1);
        assert_eq!(cleared.source_structure_id, set.source_structure_id);
    }

    #[test]
    fn remove_is_idempotent() {
        let set = empty_set()
            .add_mapping(vec![path("/a")], path("/x"), BindMode::Reject)
            .unwrap();
        let unknown = MappingId::new("nope").unwrap();
        assert_eq!(set.remove_mapping(&unknown), set);
        let id = set.mappings[0].id.clone();
        let removed = set.remove_mapping(&id);
        assert!(removed.is_empty());
        assert_eq!(removed.remove_mapping(&id), removed);
    }

    #[test]
    fn missing_mapping_is_reported() {
        let unknown = MappingId::new("nope").unwrap();
        let err = empty_set().attach_transform(&unknown, "x").unwrap_err();
        assert_eq!(err, MappingError::MappingNotFound(unknown));
    }

    #[test]
    fn source_paths_grow_and_shrink() {
        let set = empty_set()
            .add_mapping(vec![path("/a"), path("/a")], path("/x"), BindMode::Reject)
            .unwrap();
        let id = set.mappings[0].id.clone();
        assert_eq!(set.mappings[0].source_paths.len(), 1);

        let set = set.add_source_path(&id, path("/b")).unwrap();
        assert!(set.get(&id).unwrap().is_aggregation());
        assert_eq!(set.mappings_for_source(&path("/b")).len(), 1);

        let set = set.remove_source_path(&id, &path("/a")).unwrap();
        assert_eq!(set.get(&id).unwrap().source_paths, vec![path("/b")]);
        let set = set.remove_source_path(&id, &path("/b")).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn empty_sources_are_rejected() {
        let err = empty_set()
            .add_mapping(Vec::new(), path("/x"), BindMode::Replace)
            .unwrap_err();
        assert!(matches!(err, MappingError::EmptySourcePaths { .. }));
    }

    #[test]
    fn detach_restores_identity() {
        let set = empty_set()
            .add_mapping(vec![path("/a")], path("/x"), BindMode::Reject)
            .unwrap();
        let id = set.mappings[0].id.clone();
        let set = set.attach_transform(&id, "x").unwrap();
        assert!(set.get(&id).unwrap().has_custom_transform());
        let set = set.detach_transform(&id).unwrap();
        assert!(set.get(&id).unwrap().transform.is_none());
    }
}
