//! Prune command tests with in-memory storage

use std::io::ErrorKind;
use std::sync::Arc;
use test_utils::*;

fn enforcer(storage: &MockStorage) -> RetentionEnforcer {
    RetentionEnforcer::new(
        Arc::new(storage.clone()),
        "/backups",
        NamingConvention::default(),
    )
}

#[test]
fn test_prune_deletes_beyond_keep_count() {
    let storage = MockStorage::new("/backups")
        .with_file("backup-1.sql", 100, 10)
        .with_file("backup-2.sql", 200, 10)
        .with_file("backup-3.sql", 300, 10)
        .with_file("backup-4.sql", 400, 10);

    let report = enforcer(&storage)
        .enforce(RetentionPolicy::new(2).unwrap())
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(report.kept, 2);
    assert_eq!(report.deleted, 2);
    assert_eq!(storage.file_names(), vec!["backup-3.sql", "backup-4.sql"]);
}

#[test]
fn test_prune_continues_after_failed_removal() {
    let storage = MockStorage::new("/backups")
        .with_file("backup-1.sql", 100, 10)
        .with_file("backup-2.sql", 200, 10)
        .with_file("backup-3.sql", 300, 10)
        .with_failing_removal("backup-2.sql", ErrorKind::PermissionDenied);

    let report = enforcer(&storage)
        .enforce(RetentionPolicy::new(1).unwrap())
        .unwrap();

    assert!(!report.is_clean());
    assert_eq!(report.deleted, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].file.ends_with("backup-2.sql"));
    assert_eq!(storage.file_names(), vec!["backup-2.sql", "backup-3.sql"]);
}

#[test]
fn test_prune_ignores_foreign_entries() {
    let storage = MockStorage::new("/backups")
        .with_file("backup-1.sql", 100, 10)
        .with_file("backup-2.sql", 200, 10)
        .with_file("README.md", 1, 10)
        .with_subdirectory("backup-old.sql");

    let report = enforcer(&storage)
        .enforce(RetentionPolicy::new(1).unwrap())
        .unwrap();

    assert_eq!(report.deleted_files, vec!["backup-1.sql"]);
    assert!(storage.file_names().contains(&"README.md".to_string()));
}

#[test]
fn test_prune_missing_directory_removes_nothing() {
    let storage = MockStorage::missing();

    let report = enforcer(&storage)
        .enforce(RetentionPolicy::new(1).unwrap())
        .unwrap();

    assert_eq!(report.kept, 0);
    assert_eq!(report.deleted, 0);
    assert_eq!(storage.removal_count(), 0);
}

#[test]
fn test_prune_unreadable_directory_errors() {
    let storage = MockStorage::new("/backups").with_read_dir_error(ErrorKind::PermissionDenied);

    let result = enforcer(&storage).enforce(RetentionPolicy::new(1).unwrap());

    assert!(matches!(
        result,
        Err(LifecycleError::PermissionDenied { .. })
    ));
}

#[test]
fn test_report_serializes_failures() {
    let storage = MockStorage::new("/backups")
        .with_file("backup-1.sql", 100, 10)
        .with_file("backup-2.sql", 200, 10)
        .with_failing_removal("backup-1.sql", ErrorKind::NotFound);

    let report = enforcer(&storage)
        .enforce(RetentionPolicy::new(1).unwrap())
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["kept"], 1);
    assert_eq!(json["errors"][0]["cause"]["kind"], "not_found");
}
