//! Command implementations over the library crates.
//!
//! Each command reads its inputs from files and returns a value; printing and
//! exit codes belong to the binary.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, info_span};

use fieldmap_map::{SuggestOptions, Suggestion, apply_suggestions, suggest_mappings};
use fieldmap_model::{DataStructure, MappingSet, StructureFormat, TreeDiff, diff};
use fieldmap_schema::{Normalizer, RawSchemaInput, StructureRequest};
use fieldmap_validate::{Profile, ValidationConfig, ValidationResult, validate_with_config};

/// Inputs of `fieldmap normalize`.
#[derive(Debug, Clone)]
pub struct NormalizeRequest {
    pub file: PathBuf,
    /// Detected from the extension, then the content, when not given.
    pub format: Option<StructureFormat>,
    /// Defaults to the file stem.
    pub name: Option<String>,
}

impl NormalizeRequest {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            format: None,
            name: None,
        }
    }
}

pub fn run_normalize(request: &NormalizeRequest) -> Result<DataStructure> {
    let span = info_span!("normalize", file = %request.file.display());
    let _guard = span.enter();

    let text = read_text(&request.file)?;
    let input = match request.format.or_else(|| format_from_extension(&request.file)) {
        Some(format) => RawSchemaInput::from_text(format, text)?,
        None => RawSchemaInput::detect(text),
    };
    let name = request
        .name
        .clone()
        .unwrap_or_else(|| file_stem(&request.file));
    let structure = Normalizer::default()
        .normalize_structure(&input, &StructureRequest::named(name))
        .with_context(|| format!("normalize {}", request.file.display()))?;
    Ok(structure)
}

/// Load a saved structure, or normalize a raw schema file.
pub fn load_structure(path: &Path) -> Result<DataStructure> {
    let text = read_text(path)?;
    if let Ok(structure) = serde_json::from_str::<DataStructure>(&text) {
        debug!(path = %path.display(), structure_id = %structure.id, "loaded saved structure");
        return Ok(structure);
    }
    run_normalize(&NormalizeRequest::new(path))
}

/// Load a mapping set; repository documents with metadata are accepted too.
pub fn load_mapping_set(path: &Path) -> Result<MappingSet> {
    let text = read_text(path)?;
    serde_json::from_str(&text).with_context(|| format!("parse mapping set {}", path.display()))
}

/// `--config` wins over `--profile`; keys missing from the file use deploy.
pub fn resolve_validation_config(
    profile: Profile,
    config_file: Option<&Path>,
) -> Result<ValidationConfig> {
    match config_file {
        Some(path) => Ok(ValidationConfig::load(path)?),
        None => Ok(profile.config()),
    }
}

pub fn run_validate(
    source: &Path,
    target: &Path,
    mappings: &Path,
    config: &ValidationConfig,
) -> Result<ValidationResult> {
    let source = load_structure(source)?;
    let target = load_structure(target)?;
    let set = load_mapping_set(mappings)?;
    check_structure_ids(&set, &source, &target);
    Ok(validate_with_config(&set, &source.tree, &target.tree, config))
}

/// Suggestions plus, when requested, the mapping set they produce.
#[derive(Debug, Clone)]
pub struct SuggestOutcome {
    pub suggestions: Vec<Suggestion>,
    pub set: MappingSet,
}

pub fn run_suggest(source: &Path, target: &Path, min_confidence: f32) -> Result<SuggestOutcome> {
    if !(0.0..=1.0).contains(&min_confidence) {
        bail!("--min-confidence must be between 0 and 1, got {min_confidence}");
    }
    let source = load_structure(source)?;
    let target = load_structure(target)?;
    let options = SuggestOptions { min_confidence };
    let suggestions = suggest_mappings(&source.tree, &target.tree, &options);
    let empty = MappingSet::new(
        format!("{} to {}", source.name, target.name),
        source.id.clone(),
        target.id.clone(),
    );
    let set = apply_suggestions(&empty, &suggestions).context("apply suggestions")?;
    Ok(SuggestOutcome { suggestions, set })
}

pub fn run_diff(old: &Path, new: &Path) -> Result<TreeDiff> {
    let old = load_structure(old)?;
    let new = load_structure(new)?;
    Ok(diff(&old.tree, &new.tree))
}

/// Write pretty JSON to `path`.
pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))
}

fn check_structure_ids(set: &MappingSet, source: &DataStructure, target: &DataStructure) {
    if set.source_structure_id != source.id || set.target_structure_id != target.id {
        tracing::warn!(
            set_source = %set.source_structure_id,
            set_target = %set.target_structure_id,
            source = %source.id,
            target_structure = %target.id,
            "mapping set was created for different structures"
        );
    }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

fn format_from_extension(path: &Path) -> Option<StructureFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "json" => Some(StructureFormat::Json),
        "xsd" => Some(StructureFormat::Xsd),
        "wsdl" => Some(StructureFormat::Wsdl),
        _ => None,
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("structure")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_detection() {
        assert_eq!(format_from_extension(Path::new("a.XSD")), Some(StructureFormat::Xsd));
        assert_eq!(format_from_extension(Path::new("svc.wsdl")), Some(StructureFormat::Wsdl));
        assert_eq!(format_from_extension(Path::new("schema.txt")), None);
        assert_eq!(file_stem(Path::new("/tmp/order.json")), "order");
    }

    #[test]
    fn min_confidence_is_range_checked() {
        let err = run_suggest(Path::new("a.json"), Path::new("b.json"), 1.5).unwrap_err();
        assert!(err.to_string().contains("between 0 and 1"));
    }
}
