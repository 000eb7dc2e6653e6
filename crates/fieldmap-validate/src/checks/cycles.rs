//! Mapping cycles within one structure.
//!
//! When source and target are the same structure, each mapping is an edge
//! from every source path to the target path. A cycle is reported once,
//! rotated so that its smallest path comes first.

use std::collections::{BTreeMap, BTreeSet};

use fieldmap_model::{FieldPath, MappingSet};

use crate::issue::Issue;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Active,
    Done,
}

pub(crate) fn check(set: &MappingSet) -> Vec<Issue> {
    let mut edges: BTreeMap<&FieldPath, BTreeSet<&FieldPath>> = BTreeMap::new();
    for mapping in &set.mappings {
        for source in &mapping.source_paths {
            edges.entry(source).or_default().insert(&mapping.target_path);
        }
    }

    let mut marks: BTreeMap<&FieldPath, Mark> = BTreeMap::new();
    let mut cycles: BTreeSet<Vec<FieldPath>> = BTreeSet::new();
    for start in edges.keys() {
        if !marks.contains_key(start) {
            let mut stack = Vec::new();
            visit(*start, &edges, &mut marks, &mut stack, &mut cycles);
        }
    }

    cycles
        .into_iter()
        .map(|paths| Issue::MappingCycle { paths })
        .collect()
}

fn visit<'a>(
    node: &'a FieldPath,
    edges: &BTreeMap<&'a FieldPath, BTreeSet<&'a FieldPath>>,
    marks: &mut BTreeMap<&'a FieldPath, Mark>,
    stack: &mut Vec<&'a FieldPath>,
    cycles: &mut BTreeSet<Vec<FieldPath>>,
) {
    marks.insert(node, Mark::Active);
    stack.push(node);

    for next in edges.get(node).into_iter().flatten() {
        match marks.get(next) {
            Some(Mark::Active) => {
                if let Some(pos) = stack.iter().position(|p| p == next) {
                    cycles.insert(canonical(&stack[pos..]));
                }
            }
            Some(Mark::Done) => {}
            None => visit(*next, edges, marks, stack, cycles),
        }
    }

    stack.pop();
    marks.insert(node, Mark::Done);
}

fn canonical(cycle: &[&FieldPath]) -> Vec<FieldPath> {
    let start = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| **p)
        .map_or(0, |(i, _)| i);
    cycle[start..]
        .iter()
        .chain(&cycle[..start])
        .map(|p| (*p).clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmap_model::{FieldMapping, StructureId};

    fn path(p: &str) -> FieldPath {
        FieldPath::parse(p).unwrap()
    }

    fn self_set(edges: &[(&str, &str)]) -> MappingSet {
        let id = StructureId::new("customer").unwrap();
        let mut set = MappingSet::new("self", id.clone(), id);
        for (s, t) in edges {
            set.mappings.push(FieldMapping::new(vec![path(s)], path(t)));
        }
        set
    }

    #[test]
    fn detects_two_step_cycle_once() {
        let issues = check(&self_set(&[("/b", "/a"), ("/a", "/b"), ("/a", "/c")]));
        assert_eq!(
            issues,
            vec![Issue::MappingCycle {
                paths: vec![path("/a"), path("/b")]
            }]
        );
    }

    #[test]
    fn self_loop_is_a_cycle() {
        assert_eq!(check(&self_set(&[("/a", "/a")])).len(), 1);
    }

    #[test]
    fn chains_are_not_cycles() {
        assert!(check(&self_set(&[("/a", "/b"), ("/b", "/c")])).is_empty());
    }
}
