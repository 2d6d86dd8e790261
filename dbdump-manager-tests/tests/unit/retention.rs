//! Retention over a real filesystem

use rstest::rstest;
use std::sync::Arc;
use test_utils::{
    sample_dump, FsStorage, NamingConvention, RetentionEnforcer, RetentionPolicy, TestContext,
    TestResult,
};

fn enforcer(ctx: &TestContext) -> RetentionEnforcer {
    RetentionEnforcer::new(
        Arc::new(FsStorage::new()),
        ctx.backup_dir(),
        NamingConvention::default(),
    )
}

#[test]
fn test_keeps_two_most_recent() -> TestResult {
    let ctx = TestContext::new();
    ctx.create_backup("backup-f1.sql", 30);
    ctx.create_backup("backup-f2.sql", 20);
    ctx.create_backup("backup-f3.sql", 10);

    let report = enforcer(&ctx)
        .enforce(RetentionPolicy::new(2).unwrap())
        .unwrap();

    assert_eq!(report.kept_files, vec!["backup-f3.sql", "backup-f2.sql"]);
    assert_eq!(report.deleted_files, vec!["backup-f1.sql"]);
    assert_eq!(ctx.remaining(), vec!["backup-f2.sql", "backup-f3.sql"]);
    assert_eq!(ctx.read_backup("backup-f3.sql")?, sample_dump());
    Ok(())
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(7)]
fn test_rerun_is_idempotent(#[case] keep: usize) {
    let ctx = TestContext::new();
    for i in 0..5u64 {
        ctx.create_backup(&format!("backup-{}.sql", i), 100 - i * 10);
    }
    let policy = RetentionPolicy::new(keep).unwrap();

    let first = enforcer(&ctx).enforce(policy).unwrap();
    assert_eq!(first.deleted, 5usize.saturating_sub(keep));
    assert_eq!(ctx.remaining().len(), keep.min(5));

    let second = enforcer(&ctx).enforce(policy).unwrap();
    assert_eq!(second.deleted, 0);
    assert!(second.errors.is_empty());
}

#[test]
fn test_foreign_files_survive() {
    let ctx = TestContext::new();
    ctx.create_backup("backup-1.sql", 20);
    ctx.create_backup("backup-2.sql", 10);
    ctx.create_foreign_file("notes.txt");

    enforcer(&ctx)
        .enforce(RetentionPolicy::new(1).unwrap())
        .unwrap();

    assert_eq!(ctx.remaining(), vec!["backup-2.sql", "notes.txt"]);
}

#[test]
fn test_missing_directory_not_created() {
    let ctx = TestContext::new();
    let missing = ctx.missing_dir();
    let enforcer = RetentionEnforcer::new(
        Arc::new(FsStorage::new()),
        missing.clone(),
        NamingConvention::default(),
    );

    let report = enforcer.enforce(RetentionPolicy::default()).unwrap();

    assert_eq!(report.kept, 0);
    assert_eq!(report.deleted, 0);
    assert!(!missing.exists());
}

#[test]
fn test_dry_run_keeps_files() {
    let ctx = TestContext::new();
    ctx.create_backup("backup-1.sql", 20);
    ctx.create_backup("backup-2.sql", 10);

    let report = enforcer(&ctx)
        .plan(RetentionPolicy::new(1).unwrap())
        .unwrap();

    assert_eq!(report.deleted_files, vec!["backup-1.sql"]);
    assert_eq!(ctx.remaining().len(), 2);
}
