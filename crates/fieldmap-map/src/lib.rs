//! Mapping operations for the field-mapping engine.
//!
//! - [`MappingStore`]: immutable CRUD over a [`MappingSet`](fieldmap_model::MappingSet)
//! - [`MappingEditor`]: drag-connect interaction state machine
//! - [`suggest_mappings`]: fuzzy name matching between two trees
//! - [`StructureRepository`] / [`MappingSetRepository`]: persistence
//! - [`ScopeRule`]: customer scoping of structures

pub mod editor;
pub mod error;
pub mod repository;
pub mod scope;
pub mod store;
pub mod suggest;

pub use editor::{
    EditorEvent, EditorOutcome, EditorState, LeafRef, MappingEditor, NodeHit, Side, Transition,
};
pub use error::{MappingError, RepositoryError, RepositoryResult, Result};
pub use repository::{
    InMemoryStructureRepository, JsonStructureRepository, MappingSetMetadata,
    MappingSetRepository, StoredMappingSet, StructureRepository,
};
pub use scope::ScopeRule;
pub use store::{BindMode, MappingStore};
pub use suggest::{
    MatchScore, ScoreComponent, ScoringEngine, SuggestOptions, Suggestion, apply_suggestions,
    suggest_mappings,
};
