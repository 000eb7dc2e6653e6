//! File-backed repository tests.

use fieldmap_map::{
    BindMode, JsonStructureRepository, MappingSetRepository, MappingStore, RepositoryError,
    ScopeRule, StructureRepository,
};
use fieldmap_model::{
    DataStructure, FieldKind, FieldPath, FieldSpec, FieldTree, MappingSet, StructureFormat,
    StructureId,
};
use tempfile::TempDir;

fn structure(name: &str, customer: Option<&str>) -> DataStructure {
    let tree = FieldTree::from_specs(
        "root",
        vec![
            FieldSpec::new("id", FieldKind::String),
            FieldSpec::new("total", FieldKind::Number).optional(),
        ],
    )
    .unwrap();
    DataStructure::new(name, StructureFormat::Custom, tree)
        .with_scope(customer.map(String::from), None)
}

#[test]
fn structures_round_trip_and_stay_immutable() {
    let dir = TempDir::new().unwrap();
    let mut repo = JsonStructureRepository::new(dir.path().join("structures")).unwrap();
    let original = structure("Order", None);

    repo.save_structure(original.clone()).unwrap();
    let loaded = repo.get_structure(&original.id).unwrap();
    assert_eq!(loaded.id, original.id);
    assert!(loaded.tree.same_shape(&original.tree));

    let err = repo.save_structure(original.clone()).unwrap_err();
    assert!(matches!(err, RepositoryError::StructureExists(_)));

    let edited = original.clone_as("Order v2");
    repo.save_structure(edited).unwrap();
    assert_eq!(repo.list_structures().unwrap().len(), 2);
}

#[test]
fn unknown_structure_is_not_found() {
    let dir = TempDir::new().unwrap();
    let repo = JsonStructureRepository::new(dir.path()).unwrap();
    let missing = structure("Missing", None);
    let err = repo.get_structure(&missing.id).unwrap_err();
    assert!(matches!(err, RepositoryError::StructureNotFound(_)));
}

#[test]
fn customer_lookup_includes_shared_structures() {
    let dir = TempDir::new().unwrap();
    let mut repo = JsonStructureRepository::new(dir.path()).unwrap();
    repo.save_structure(structure("Shared", None)).unwrap();
    repo.save_structure(structure("Acme", Some("acme"))).unwrap();
    repo.save_structure(structure("Globex", Some("globex"))).unwrap();

    let mut names: Vec<_> = repo
        .structures_for_customer("acme")
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["Acme", "Shared"]);

    let both = repo
        .structures_for_scope(&[ScopeRule::customer("acme"), ScopeRule::customer("globex")])
        .unwrap();
    assert_eq!(both.len(), 3);
}

#[test]
fn mapping_sets_round_trip() {
    let dir = TempDir::new().unwrap();
    let repo = MappingSetRepository::new(dir.path()).unwrap();
    let source = structure("Source", None);
    let target = structure("Target", None);
    let set = MappingSet::new("orders", source.id.clone(), target.id.clone())
        .add_mapping(
            vec![FieldPath::parse("/id").unwrap()],
            FieldPath::parse("/id").unwrap(),
            BindMode::Reject,
        )
        .unwrap();

    let path = repo.save(&set).unwrap();
    assert!(path.exists());
    assert!(repo.exists(&set.id));
    assert_eq!(repo.load(&set.id).unwrap(), Some(set.clone()));
    assert_eq!(
        repo.load_for_structures(&source.id, &target.id).unwrap(),
        vec![set.clone()]
    );

    let listed = repo.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].mapping_count, 1);

    assert!(repo.delete(&set.id).unwrap());
    assert!(!repo.delete(&set.id).unwrap());
    assert_eq!(repo.load(&set.id).unwrap(), None);
}

#[test]
fn stored_sets_use_the_flat_wire_form() {
    let dir = TempDir::new().unwrap();
    let repo = MappingSetRepository::new(dir.path()).unwrap();
    let set = MappingSet::new(
        "orders",
        structure("S", None).id,
        structure("T", None).id,
    );
    let path = repo.save(&set).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["name"], "orders");
    assert!(json["mappings"].as_array().unwrap().is_empty());
    assert!(json.get("savedAt").is_some());
    assert_eq!(json["version"], "1.0");
}

#[test]
fn ids_that_are_not_file_safe_are_rejected() {
    let dir = TempDir::new().unwrap();
    let sets = MappingSetRepository::new(dir.path().join("sets")).unwrap();
    let source = structure("Source", None);
    let target = structure("Target", None);

    let mut slashed = MappingSet::new("slashed", source.id.clone(), target.id.clone());
    slashed.id = "a/b".to_string();
    let mut underscored = MappingSet::new("underscored", source.id.clone(), target.id.clone());
    underscored.id = "a_b".to_string();

    let err = sets.save(&slashed).unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidId(ref id) if id == "a/b"));
    sets.save(&underscored).unwrap();
    assert!(!sets.exists("a/b"));
    assert!(matches!(sets.load("a/b"), Err(RepositoryError::InvalidId(_))));
    assert_eq!(sets.load("a_b").unwrap(), Some(underscored));

    let mut structures = JsonStructureRepository::new(dir.path().join("structures")).unwrap();
    let mut plain = structure("Plain", None);
    plain.id = StructureId::new("a_b").unwrap();
    let mut slashed = structure("Slashed", None);
    slashed.id = StructureId::new("a/b").unwrap();
    structures.save_structure(plain).unwrap();
    let err = structures.save_structure(slashed.clone()).unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidId(_)));
    assert!(matches!(
        structures.get_structure(&slashed.id),
        Err(RepositoryError::InvalidId(_))
    ));
}
