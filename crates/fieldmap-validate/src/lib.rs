//! Mapping-set validation.
//!
//! Checks a [`MappingSet`] against the source and target trees it binds:
//!
//! - **Reference**: dangling source/target paths, bindings on non-leaves
//! - **Coverage**: required target leaves without a mapping
//! - **Integrity**: duplicate target bindings, empty sources, cycles
//! - **Cardinality**: single/multi-valued mismatches, divergent arrays
//! - **Type**: source kinds that do not convert to the target kind
//!
//! Every check runs on every call, so one result lists every problem.
//! Problems are data ([`Finding`]s), never errors.
//!
//! # Example
//!
//! ```ignore
//! use fieldmap_validate::{ValidationConfig, validate_with_config};
//!
//! let result = validate_with_config(&set, &source, &target, &ValidationConfig::draft());
//! for finding in result.sorted_by_severity() {
//!     println!("[{}] {}", finding.severity, finding.message);
//! }
//! ```

mod checks;
pub mod config;
pub mod error;
mod issue;
mod report;
pub mod rules;

use fieldmap_model::{FieldTree, MappingSet};

pub use config::{Profile, ValidationConfig};
pub use error::{ConfigError, Result};
pub use issue::{Issue, PathSide, Severity};
pub use report::{Finding, ValidationResult};
pub use rules::Category;

/// Validate with the [`ValidationConfig::deploy`] severities.
pub fn validate(set: &MappingSet, source: &FieldTree, target: &FieldTree) -> ValidationResult {
    validate_with_config(set, source, target, &ValidationConfig::deploy())
}

pub fn validate_with_config(
    set: &MappingSet,
    source: &FieldTree,
    target: &FieldTree,
    config: &ValidationConfig,
) -> ValidationResult {
    let issues = checks::run_all(set, source, target);
    let result = ValidationResult::from_issues(issues, config);
    tracing::info!(
        set_id = %set.id,
        mappings = set.len(),
        errors = result.error_count(),
        warnings = result.warning_count(),
        ok = result.ok,
        "mapping set validated"
    );
    result
}
