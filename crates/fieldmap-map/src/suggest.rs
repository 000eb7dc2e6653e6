//! Fuzzy matching and scoring for source-leaf to target-leaf suggestions.
//!
//! Uses Jaro-Winkler similarity on leaf names as the base algorithm with
//! adjustments for parent context, kind compatibility and cardinality.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use rapidfuzz::distance::jaro_winkler;
use serde::{Deserialize, Serialize};

use fieldmap_model::{FieldNode, FieldPath, FieldTree, MappingSet};

use crate::error::Result;
use crate::store::{BindMode, MappingStore};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuggestOptions {
    /// Candidates scoring below this are dropped.
    pub min_confidence: f32,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            min_confidence: 0.75,
        }
    }
}

/// A component contributing to the final score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponent {
    /// Component name (e.g., "Name similarity").
    pub name: &'static str,
    /// Component value (negative for penalties).
    pub value: f32,
    pub description: String,
}

/// Score for a single source/target leaf pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchScore {
    /// Final confidence (0.0 to 1.0, may slightly exceed 1.0 with boosts).
    pub score: f32,
    /// Breakdown of score components for explainability.
    pub explanation: Vec<ScoreComponent>,
}

impl MatchScore {
    /// Human-readable explanation of the score.
    pub fn explain(&self) -> String {
        self.explanation
            .iter()
            .map(|c| format!("{}: {:.0}%", c.name, c.value * 100.0))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub source_path: FieldPath,
    pub target_path: FieldPath,
    pub score: MatchScore,
}

/// Scores leaves of a source tree against leaves of a target tree.
///
/// Opaque (`unparsed`) leaves never take part.
#[derive(Debug, Clone, Copy)]
pub struct ScoringEngine<'a> {
    source: &'a FieldTree,
    target: &'a FieldTree,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(source: &'a FieldTree, target: &'a FieldTree) -> Self {
        Self { source, target }
    }

    /// Score one pair of leaves.
    ///
    /// Returns `None` if either path is not a mappable leaf.
    pub fn score(&self, source: &FieldPath, target: &FieldPath) -> Option<MatchScore> {
        let source = mappable(self.source.find_by_path(source)?)?;
        let target = mappable(self.target.find_by_path(target)?)?;
        Some(self.compute_score(source, target))
    }

    /// Score every source leaf against one target leaf, highest first.
    pub fn score_all_for_target(&self, target: &FieldPath) -> Vec<(FieldPath, MatchScore)> {
        let Some(target) = self
            .target
            .find_by_path(target)
            .and_then(mappable)
        else {
            return Vec::new();
        };

        let mut scores: Vec<_> = self
            .source_leaves()
            .filter_map(|leaf| {
                let path = self.source.path(leaf.id())?.clone();
                Some((path, self.compute_score(leaf, target)))
            })
            .collect();
        scores.sort_by(|a, b| b.1.score.partial_cmp(&a.1.score).unwrap_or(Ordering::Equal));
        scores
    }

    /// Suggest best one-to-one bindings for all target leaves.
    ///
    /// Greedy assignment by descending score. Each source and target leaf is
    /// used at most once.
    pub fn suggest_all(&self, min_confidence: f32) -> Vec<Suggestion> {
        let mut candidates = Vec::new();
        for target in self.target_leaves() {
            for source in self.source_leaves() {
                let score = self.compute_score(source, target);
                if score.score >= min_confidence {
                    candidates.push((source, target, score));
                }
            }
        }

        candidates.sort_by(|a, b| b.2.score.partial_cmp(&a.2.score).unwrap_or(Ordering::Equal));

        let mut used_sources = BTreeSet::new();
        let mut used_targets = BTreeSet::new();
        let mut suggestions = Vec::new();
        for (source, target, score) in candidates {
            if used_sources.contains(&source.id()) || used_targets.contains(&target.id()) {
                continue;
            }
            let (Some(source_path), Some(target_path)) =
                (self.source.path(source.id()), self.target.path(target.id()))
            else {
                continue;
            };
            used_sources.insert(source.id());
            used_targets.insert(target.id());
            suggestions.push(Suggestion {
                source_path: source_path.clone(),
                target_path: target_path.clone(),
                score,
            });
        }
        suggestions
    }

    fn source_leaves(&self) -> impl Iterator<Item = &'a FieldNode> {
        self.source.leaves().filter(|leaf| mappable(leaf).is_some())
    }

    fn target_leaves(&self) -> impl Iterator<Item = &'a FieldNode> {
        self.target.leaves().filter(|leaf| mappable(leaf).is_some())
    }

    fn compute_score(&self, source: &FieldNode, target: &FieldNode) -> MatchScore {
        let mut components = Vec::new();

        // 1. Base: Jaro-Winkler similarity on normalized names
        let base = similarity(&source.name, &target.name);
        components.push(ScoreComponent {
            name: "Name similarity",
            value: base,
            description: format!("'{}' vs '{}'", source.name, target.name),
        });
        let mut score = base;

        // 2. Parent context boost (+5%)
        let source_parent = self.source.parent(source.id()).filter(|p| p.parent().is_some());
        let target_parent = self.target.parent(target.id()).filter(|p| p.parent().is_some());
        if let (Some(sp), Some(tp)) = (source_parent, target_parent) {
            let context = similarity(&sp.name, &tp.name);
            if context > 0.85 {
                score *= 1.05;
                components.push(ScoreComponent {
                    name: "Parent match",
                    value: 0.05,
                    description: format!("'{}' vs '{}'", sp.name, tp.name),
                });
            }
        }

        // 3. Kind mismatch penalty (-15%)
        if !source.kind.converts_to(target.kind) {
            score *= 0.85;
            components.push(ScoreComponent {
                name: "Kind mismatch",
                value: -0.15,
                description: format!("{} does not convert to {}", source.kind, target.kind),
            });
        }

        // 4. Cardinality penalty (-10%)
        if self.source.is_repeated(source.id()) && !self.target.is_repeated(target.id()) {
            score *= 0.9;
            components.push(ScoreComponent {
                name: "Cardinality",
                value: -0.10,
                description: "Repeated source into single-valued target".into(),
            });
        }

        MatchScore {
            score,
            explanation: components,
        }
    }
}

/// Suggest one-to-one bindings between the leaves of two trees.
pub fn suggest_mappings(
    source: &FieldTree,
    target: &FieldTree,
    options: &SuggestOptions,
) -> Vec<Suggestion> {
    let suggestions = ScoringEngine::new(source, target).suggest_all(options.min_confidence);
    tracing::debug!(
        count = suggestions.len(),
        min_confidence = options.min_confidence,
        "mapping suggestions computed"
    );
    suggestions
}

/// Bind every suggestion whose target is still unbound.
pub fn apply_suggestions(set: &MappingSet, suggestions: &[Suggestion]) -> Result<MappingSet> {
    let mut next = set.clone();
    for suggestion in suggestions {
        if next.mapping_for_target(&suggestion.target_path).is_some() {
            continue;
        }
        next = next.add_mapping(
            vec![suggestion.source_path.clone()],
            suggestion.target_path.clone(),
            BindMode::Reject,
        )?;
    }
    Ok(next)
}

fn mappable(node: &FieldNode) -> Option<&FieldNode> {
    (node.is_leaf() && !node.unparsed && node.parent().is_some()).then_some(node)
}

fn similarity(a: &str, b: &str) -> f32 {
    jaro_winkler::similarity(normalize(a).chars(), normalize(b).chars()) as f32
}

/// Normalize a field name for comparison.
///
/// Splits camelCase, drops attribute markers and treats `_ - .` as spaces.
fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for c in s.trim().trim_start_matches(['@', '#']).chars() {
        if c.is_uppercase() && prev_lower {
            out.push(' ');
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        out.extend(c.to_lowercase());
    }
    out.replace(['_', '-', '.'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
