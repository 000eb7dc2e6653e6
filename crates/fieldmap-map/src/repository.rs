//! Persistence for structures and mapping sets.
//!
//! Structures are immutable once saved: [`StructureRepository::save_structure`]
//! rejects an id that already exists, and edits are saved as clones
//! ([`DataStructure::clone_as`]).
//!
//! # Storage Format
//!
//! The file-backed repositories store one pretty-printed JSON document per
//! record, named after its id: `{id}.json`. Ids are used verbatim, so only
//! ASCII letters, digits, `-` and `_` are accepted; anything else fails with
//! [`RepositoryError::InvalidId`] rather than being rewritten into a name
//! another id could share.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use fieldmap_model::{DataStructure, MappingSet, StructureId};

use crate::error::{RepositoryError, RepositoryResult};
use crate::scope::ScopeRule;

/// Lookup and persistence of [`DataStructure`]s.
pub trait StructureRepository {
    /// Fails with [`RepositoryError::StructureNotFound`] for unknown ids.
    fn get_structure(&self, id: &StructureId) -> RepositoryResult<DataStructure>;

    /// Persist a new structure. Existing ids are rejected.
    fn save_structure(&mut self, structure: DataStructure) -> RepositoryResult<()>;

    /// Every stored structure, ordered by id.
    fn list_structures(&self) -> RepositoryResult<Vec<DataStructure>>;

    /// Structures owned by `customer_id` plus shared ones.
    fn structures_for_customer(&self, customer_id: &str) -> RepositoryResult<Vec<DataStructure>> {
        self.structures_for_scope(&[ScopeRule::customer(customer_id)])
    }

    /// Structures matched by any of `rules`.
    fn structures_for_scope(&self, rules: &[ScopeRule]) -> RepositoryResult<Vec<DataStructure>> {
        Ok(self
            .list_structures()?
            .into_iter()
            .filter(|s| rules.iter().any(|rule| rule.matches(s)))
            .collect())
    }
}

/// Process-local repository, used by tests and the CLI.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStructureRepository {
    structures: BTreeMap<StructureId, DataStructure>,
}

impl InMemoryStructureRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }
}

impl StructureRepository for InMemoryStructureRepository {
    fn get_structure(&self, id: &StructureId) -> RepositoryResult<DataStructure> {
        self.structures
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::StructureNotFound(id.clone()))
    }

    fn save_structure(&mut self, structure: DataStructure) -> RepositoryResult<()> {
        if self.structures.contains_key(&structure.id) {
            return Err(RepositoryError::StructureExists(structure.id));
        }
        tracing::debug!(structure_id = %structure.id, name = %structure.name, "structure saved");
        self.structures.insert(structure.id.clone(), structure);
        Ok(())
    }

    fn list_structures(&self) -> RepositoryResult<Vec<DataStructure>> {
        Ok(self.structures.values().cloned().collect())
    }
}

/// Directory of `{id}.json` structure documents.
#[derive(Debug, Clone)]
pub struct JsonStructureRepository {
    base_dir: PathBuf,
}

impl JsonStructureRepository {
    /// Open a repository, creating the directory if it doesn't exist.
    pub fn new(base_dir: impl Into<PathBuf>) -> RepositoryResult<Self> {
        let base_dir = create_dir(base_dir.into())?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_for(&self, id: &StructureId) -> RepositoryResult<PathBuf> {
        file_in(&self.base_dir, id.as_str())
    }
}

impl StructureRepository for JsonStructureRepository {
    fn get_structure(&self, id: &StructureId) -> RepositoryResult<DataStructure> {
        let path = self.file_for(id)?;
        match read_json::<DataStructure>(&path)? {
            Some(structure) if &structure.id == id => Ok(structure),
            _ => Err(RepositoryError::StructureNotFound(id.clone())),
        }
    }

    fn save_structure(&mut self, structure: DataStructure) -> RepositoryResult<()> {
        let path = self.file_for(&structure.id)?;
        if path.exists() {
            return Err(RepositoryError::StructureExists(structure.id));
        }
        write_json(&path, &structure, structure.id.as_str())?;
        tracing::debug!(
            structure_id = %structure.id,
            path = %path.display(),
            "structure saved"
        );
        Ok(())
    }

    fn list_structures(&self) -> RepositoryResult<Vec<DataStructure>> {
        let mut structures: Vec<DataStructure> = json_files(&self.base_dir)?
            .iter()
            .filter_map(|path| read_listed(path))
            .collect();
        structures.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(structures)
    }
}

/// Metadata about a stored mapping set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSetMetadata {
    pub id: String,
    pub name: String,
    pub source_structure_id: StructureId,
    pub target_structure_id: StructureId,
    pub file_path: PathBuf,
    pub mapping_count: usize,
    pub saved_at: DateTime<Utc>,
}

/// Mapping set with repository metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMappingSet {
    #[serde(flatten)]
    pub set: MappingSet,
    pub saved_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Version of the stored format.
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl StoredMappingSet {
    pub fn new(set: MappingSet) -> Self {
        Self {
            set,
            saved_at: Utc::now(),
            description: None,
            version: default_version(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Directory of mapping-set documents keyed by set id.
#[derive(Debug, Clone)]
pub struct MappingSetRepository {
    base_dir: PathBuf,
}

impl MappingSetRepository {
    /// Open a repository, creating the directory if it doesn't exist.
    pub fn new(base_dir: impl Into<PathBuf>) -> RepositoryResult<Self> {
        let base_dir = create_dir(base_dir.into())?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Save (or overwrite) a mapping set.
    pub fn save(&self, set: &MappingSet) -> RepositoryResult<PathBuf> {
        self.save_stored(&StoredMappingSet::new(set.clone()))
    }

    pub fn save_stored(&self, stored: &StoredMappingSet) -> RepositoryResult<PathBuf> {
        let path = self.file_for(&stored.set.id)?;
        write_json(&path, stored, &stored.set.id)?;
        tracing::debug!(
            set_id = %stored.set.id,
            mappings = stored.set.len(),
            path = %path.display(),
            "mapping set saved"
        );
        Ok(path)
    }

    /// Returns `None` if no set with this id is stored.
    pub fn load(&self, id: &str) -> RepositoryResult<Option<MappingSet>> {
        Ok(self.load_stored(id)?.map(|s| s.set))
    }

    pub fn load_stored(&self, id: &str) -> RepositoryResult<Option<StoredMappingSet>> {
        read_json(&self.file_for(id)?)
    }

    /// Sets mapping `source` onto `target`, ordered by id.
    pub fn load_for_structures(
        &self,
        source: &StructureId,
        target: &StructureId,
    ) -> RepositoryResult<Vec<MappingSet>> {
        let mut sets: Vec<MappingSet> = json_files(&self.base_dir)?
            .iter()
            .filter_map(|path| read_listed::<StoredMappingSet>(path))
            .map(|stored| stored.set)
            .filter(|set| &set.source_structure_id == source && &set.target_structure_id == target)
            .collect();
        sets.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(sets)
    }

    /// List all stored sets, ordered by name then id.
    pub fn list(&self) -> RepositoryResult<Vec<MappingSetMetadata>> {
        let mut metadata: Vec<MappingSetMetadata> = json_files(&self.base_dir)?
            .into_iter()
            .filter_map(|path| {
                let stored = read_listed::<StoredMappingSet>(&path)?;
                Some(MappingSetMetadata {
                    mapping_count: stored.set.len(),
                    id: stored.set.id,
                    name: stored.set.name,
                    source_structure_id: stored.set.source_structure_id,
                    target_structure_id: stored.set.target_structure_id,
                    file_path: path,
                    saved_at: stored.saved_at,
                })
            })
            .collect();
        metadata.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(metadata)
    }

    /// Returns whether a file was removed.
    pub fn delete(&self, id: &str) -> RepositoryResult<bool> {
        let path = self.file_for(id)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|source| RepositoryError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(true)
    }

    /// False for ids that could never be stored.
    pub fn exists(&self, id: &str) -> bool {
        self.file_for(id).is_ok_and(|path| path.exists())
    }

    fn file_for(&self, id: &str) -> RepositoryResult<PathBuf> {
        file_in(&self.base_dir, id)
    }
}

/// `{id}.json` under `dir`. The id is the file stem unchanged, so distinct
/// ids never share a file.
fn file_in(dir: &Path, id: &str) -> RepositoryResult<PathBuf> {
    if !is_file_safe_id(id) {
        return Err(RepositoryError::InvalidId(id.to_string()));
    }
    Ok(dir.join(format!("{id}.json")))
}

fn is_file_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn create_dir(path: PathBuf) -> RepositoryResult<PathBuf> {
    fs::create_dir_all(&path).map_err(|source| RepositoryError::CreateDir {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn json_files(dir: &Path) -> RepositoryResult<Vec<PathBuf>> {
    let read_err = |source| RepositoryError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    Ok(files)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> RepositoryResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).map_err(|source| RepositoryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&contents).map_err(|source| RepositoryError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(value))
}

/// Listing skips unreadable documents instead of failing the whole scan.
fn read_listed<T: DeserializeOwned>(path: &Path) -> Option<T> {
    match read_json(path) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "skipping unreadable document");
            None
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T, what: &str) -> RepositoryResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|source| RepositoryError::Serialize {
        what: what.to_string(),
        source,
    })?;
    fs::write(path, json).map_err(|source| RepositoryError::Write {
        path: path.to_path_buf(),
        source,
    })
}
