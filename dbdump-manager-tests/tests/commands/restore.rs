//! Restore command tests with a mocked database client

use std::sync::Arc;
use test_utils::*;

struct Harness {
    ctx: TestContext,
    executor: MockExecutor,
    prompter: ScriptedPrompter,
}

impl Harness {
    fn new(prompter: ScriptedPrompter) -> Self {
        Self::with_response(prompter, MockResponse::success())
    }

    fn with_response(prompter: ScriptedPrompter, response: MockResponse) -> Self {
        let ctx = TestContext::new();
        ctx.create_backup(&dump_name("1"), 300);
        ctx.create_backup(&dump_name("2"), 200);
        ctx.create_backup(&dump_name("3"), 100);
        Self {
            ctx,
            executor: MockExecutor::new().with_response(response),
            prompter,
        }
    }

    fn run(&self, connection_string: Option<&str>) -> RestoreReport {
        let ops = RealRestoreOps::with_executor(Arc::new(self.executor.clone()), None);
        RestoreOrchestrator::new(
            Arc::new(FsStorage::new()),
            Arc::new(ops),
            Arc::new(self.prompter.clone()),
            restore_settings(&self.ctx.backup_dir(), connection_string),
        )
        .run()
    }
}

#[test]
fn test_restore_second_newest_postgres() {
    let harness = Harness::new(ScriptedPrompter::new("2", "y"));

    let report = harness.run(Some(postgres_url()));

    assert_eq!(report.status, RestoreStatus::Done);
    assert_eq!(report.exit_code, Some(0));
    assert_eq!(report.selected.as_ref().unwrap().name, dump_name("2"));

    let calls = harness.executor.get_calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.program, "psql");
    assert!(call.args.contains(&"restaurant".to_string()));
    assert!(call.args.last().unwrap().ends_with("backup-2.sql"));
    assert!(call.envs.contains(&("PGPASSWORD".to_string(), "s3cret".to_string())));
    assert!(!call.args.iter().any(|a| a.contains("s3cret")));
    assert!(call.stdin_file.is_none());
}

#[test]
fn test_restore_mysql_streams_dump_on_stdin() {
    let harness = Harness::new(ScriptedPrompter::new("1", "y"));

    let report = harness.run(Some(mysql_url()));

    assert_eq!(report.status, RestoreStatus::Done);
    let calls = harness.executor.get_calls();
    assert_eq!(calls[0].program, "mysql");
    assert!(calls[0]
        .stdin_file
        .as_deref()
        .unwrap()
        .ends_with("backup-3.sql"));
    assert!(calls[0]
        .envs
        .contains(&("MYSQL_PWD".to_string(), "s3cret".to_string())));
}

#[test]
fn test_restore_lists_newest_first() {
    let harness = Harness::new(ScriptedPrompter::new("1", "n"));

    harness.run(Some(postgres_url()));

    let shown = harness.prompter.shown.lock().unwrap().clone();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].len(), 3);
    assert!(shown[0][0].contains("backup-3.sql"));
    assert!(shown[0][2].contains("backup-1.sql"));
}

#[test]
fn test_declined_confirmation_never_runs_client() {
    for answer in ["n", "Y", "yes", ""] {
        let harness = Harness::new(ScriptedPrompter::new("2", answer));

        let report = harness.run(Some(postgres_url()));

        assert_eq!(report.status, RestoreStatus::Cancelled, "answer {:?}", answer);
        assert!(!report.confirmed);
        assert_eq!(harness.executor.get_calls().len(), 0);
    }
}

#[test]
fn test_unanswered_confirmation_cancels() {
    let harness = Harness::new(ScriptedPrompter::unanswered("2"));

    let report = harness.run(Some(postgres_url()));

    assert_eq!(report.status, RestoreStatus::Cancelled);
    assert_eq!(report.status.exit_code(), 2);
    assert_eq!(harness.executor.get_calls().len(), 0);
}

#[test]
fn test_invalid_selection_fails_without_confirming() {
    for input in ["0", "4", "abc", "-1"] {
        let harness = Harness::new(ScriptedPrompter::new(input, "y"));

        let report = harness.run(Some(postgres_url()));

        assert_eq!(report.status, RestoreStatus::Failed, "input {:?}", input);
        assert!(matches!(
            report.failure,
            Some(LifecycleError::InvalidSelection { .. })
        ));
        assert_eq!(harness.prompter.confirm_count(), 0);
        assert_eq!(harness.executor.get_calls().len(), 0);
    }
}

#[test]
fn test_empty_directory_fails_before_prompting() {
    let ctx = TestContext::new();
    let executor = MockExecutor::new();
    let prompter = ScriptedPrompter::new("1", "y");

    let report = RestoreOrchestrator::new(
        Arc::new(FsStorage::new()),
        Arc::new(RealRestoreOps::with_executor(Arc::new(executor.clone()), None)),
        Arc::new(prompter.clone()),
        restore_settings(&ctx.missing_dir(), Some(postgres_url())),
    )
    .run();

    assert_eq!(report.status, RestoreStatus::Failed);
    assert!(matches!(report.failure, Some(LifecycleError::NotFound(_))));
    assert_eq!(prompter.select_count(), 0);
    assert_eq!(executor.get_calls().len(), 0);
}

#[test]
fn test_missing_connection_string_fails_before_prompting() {
    let harness = Harness::new(ScriptedPrompter::new("1", "y"));

    let report = harness.run(None);

    assert_eq!(report.status, RestoreStatus::Failed);
    assert!(matches!(
        report.failure,
        Some(LifecycleError::ConfigurationMissing(_))
    ));
    assert_eq!(harness.prompter.select_count(), 0);
}

#[test]
fn test_client_failure_reports_diagnostics() -> TestResult {
    let harness = Harness::with_response(
        ScriptedPrompter::new("1", "y"),
        MockResponse::Exit {
            exit_code: 3,
            stdout: String::new(),
            stderr: "ERROR:  relation \"orders\" already exists\n".to_string(),
        },
    );

    let report = harness.run(Some(postgres_url()));

    assert_eq!(report.status, RestoreStatus::Failed);
    assert!(report.confirmed);
    assert_eq!(report.exit_code, Some(3));
    assert!(report
        .diagnostics
        .as_deref()
        .unwrap()
        .contains("already exists"));
    assert!(matches!(
        report.failure,
        Some(LifecycleError::ExternalToolFailure { .. })
    ));
    // Dumps are never touched by a failed restore
    assert_eq!(harness.ctx.remaining().len(), 3);
    assert_eq!(harness.ctx.read_backup(&dump_name("3"))?, sample_dump());
    Ok(())
}

#[test]
fn test_client_not_installed() {
    let harness = Harness::with_response(
        ScriptedPrompter::new("1", "y"),
        MockResponse::SpawnError("No such file or directory".to_string()),
    );

    let report = harness.run(Some(postgres_url()));

    assert_eq!(report.status, RestoreStatus::Failed);
    assert!(matches!(
        report.failure,
        Some(LifecycleError::ExternalToolFailure { .. })
    ));
}

#[test]
fn test_successful_restore_with_warnings() {
    let harness = Harness::with_response(
        ScriptedPrompter::new("1", "y"),
        MockResponse::Exit {
            exit_code: 0,
            stdout: String::new(),
            stderr: "NOTICE:  table does not exist, skipping".to_string(),
        },
    );

    let report = harness.run(Some(postgres_url()));

    assert_eq!(report.status, RestoreStatus::Done);
    assert!(report.diagnostics.is_some());
}
