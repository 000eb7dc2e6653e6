//! Dangling and non-leaf path checks.

use fieldmap_model::{FieldNode, FieldPath, FieldTree, MappingId, MappingSet};

use super::ResolvedMapping;
use crate::issue::{Issue, PathSide};

/// Report unresolvable paths; return the mappings that fully resolved.
pub(crate) fn check<'a>(
    set: &'a MappingSet,
    source: &'a FieldTree,
    target: &'a FieldTree,
    issues: &mut Vec<Issue>,
) -> Vec<ResolvedMapping<'a>> {
    let mut resolved = Vec::new();

    for mapping in &set.mappings {
        if mapping.source_paths.is_empty() {
            issues.push(Issue::EmptySourcePaths {
                mapping_id: mapping.id.clone(),
                target: mapping.target_path.clone(),
            });
        }

        let sources: Vec<Option<&FieldNode>> = mapping
            .source_paths
            .iter()
            .map(|path| resolve(source, path, PathSide::Source, &mapping.id, issues))
            .collect();
        let bound = resolve(target, &mapping.target_path, PathSide::Target, &mapping.id, issues);

        if let (Some(target), Some(sources)) = (bound, sources.into_iter().collect::<Option<Vec<_>>>())
            && !sources.is_empty()
        {
            resolved.push(ResolvedMapping {
                mapping,
                sources,
                target,
            });
        }
    }

    resolved
}

fn resolve<'a>(
    tree: &'a FieldTree,
    path: &FieldPath,
    side: PathSide,
    mapping_id: &MappingId,
    issues: &mut Vec<Issue>,
) -> Option<&'a FieldNode> {
    let Some(node) = tree.find_by_path(path) else {
        issues.push(match side {
            PathSide::Source => Issue::DanglingSourcePath {
                mapping_id: mapping_id.clone(),
                path: path.clone(),
            },
            PathSide::Target => Issue::DanglingTargetPath {
                mapping_id: mapping_id.clone(),
                path: path.clone(),
            },
        });
        return None;
    };
    if !node.is_leaf() {
        issues.push(Issue::NonLeafBinding {
            mapping_id: mapping_id.clone(),
            side,
            path: path.clone(),
        });
        return None;
    }
    Some(node)
}
