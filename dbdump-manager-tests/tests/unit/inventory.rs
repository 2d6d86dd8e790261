//! Inventory listing over a real filesystem

use test_utils::{list_backups, FsStorage, NamingConvention, TestContext};

#[test]
fn test_nonexistent_directory_is_empty() {
    let ctx = TestContext::new();
    let inventory =
        list_backups(&FsStorage::new(), &ctx.missing_dir(), &NamingConvention::default()).unwrap();
    assert!(inventory.is_empty());
}

#[test]
fn test_listing_orders_by_modification_time() {
    let ctx = TestContext::new();
    // Names deliberately disagree with the ages
    ctx.create_backup("backup-c.sql", 300);
    ctx.create_backup("backup-a.sql", 100);
    ctx.create_backup("backup-b.sql", 200);

    let inventory =
        list_backups(&FsStorage::new(), &ctx.backup_dir(), &NamingConvention::default()).unwrap();
    let names: Vec<_> = inventory.files().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["backup-a.sql", "backup-b.sql", "backup-c.sql"]);
    assert!(inventory.files()[0].path.starts_with(ctx.backup_dir()));
    assert!(inventory.files()[0].size_bytes > 0);
}

#[test]
fn test_foreign_files_ignored() {
    let ctx = TestContext::new();
    ctx.create_backup("backup-1.sql", 10);
    ctx.create_foreign_file("cron.log");
    ctx.create_foreign_file("backup-1.sql.partial");
    std::fs::create_dir(ctx.backup_dir().join("backup-dir.sql")).unwrap();

    let inventory =
        list_backups(&FsStorage::new(), &ctx.backup_dir(), &NamingConvention::default()).unwrap();
    assert_eq!(inventory.len(), 1);
    assert_eq!(inventory.files()[0].name, "backup-1.sql");
}

#[test]
fn test_custom_naming_convention() {
    let ctx = TestContext::new();
    ctx.create_backup("pos_2024-01-01.dump", 10);
    ctx.create_backup("backup-1.sql", 20);

    let inventory = list_backups(
        &FsStorage::new(),
        &ctx.backup_dir(),
        &NamingConvention::new("pos_", ".dump"),
    )
    .unwrap();
    assert_eq!(inventory.len(), 1);
    assert_eq!(inventory.files()[0].name, "pos_2024-01-01.dump");
}
