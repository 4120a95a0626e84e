use aiupdate::config::Config;
use aiupdate::registry::ToolSpec;
use aiupdate::render::{detail_cell, summary_line};
use aiupdate::runner::{self, FailureKind, Status};
use std::time::Duration;
use tempfile::TempDir;

fn test_config() -> Config {
    let mut config = Config::default();
    config.version_timeout = Duration::from_secs(5);
    config.update_timeout = Duration::from_secs(5);
    config
}

fn sh_spec(name: &str, version_script: &str, update_script: &str) -> ToolSpec {
    ToolSpec::new(
        name,
        &["sh", "-c", version_script],
        &["sh", "-c", update_script],
    )
}

#[tokio::test]
async fn empty_list_yields_empty_result() {
    let states = runner::run(Vec::new(), &test_config()).await;
    assert!(states.is_empty());
    assert_eq!(summary_line(&states), "0 tools updated.");
}

#[tokio::test]
async fn success_and_failure_are_isolated() {
    let specs = vec![
        sh_spec("a", "echo 1.0", "true"),
        sh_spec("b", "echo 1.0", "echo boom >&2; exit 1"),
    ];
    let states = runner::run(specs, &test_config()).await;

    assert_eq!(states.len(), 2);
    assert_eq!(states[0].name, "a");
    assert_eq!(states[0].status, Status::Done);
    assert_eq!(states[0].version_before.as_deref(), Some("1.0"));
    assert_eq!(states[0].version_after.as_deref(), Some("1.0"));
    assert_eq!(detail_cell(&states[0]), "1.0 (unchanged)");

    assert_eq!(states[1].name, "b");
    assert_eq!(states[1].status, Status::Failed);
    let failure = states[1].failure.as_ref().expect("failure recorded");
    assert_eq!(failure.kind, FailureKind::UpdateFailed);
    assert!(failure.detail.contains("boom"));

    assert_eq!(summary_line(&states), "1 succeeded, 1 failed.");
}

#[tokio::test]
async fn results_preserve_input_order() {
    let specs = vec![
        sh_spec("zeta", "echo 1", "true"),
        sh_spec("alpha", "echo 2", "true"),
        sh_spec("mid", "echo 3", "true"),
    ];
    let states = runner::run(specs, &test_config()).await;
    let names: Vec<_> = states.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    assert!(states.iter().all(|s| s.status == Status::Done));
}

#[tokio::test]
async fn version_check_failure_never_blocks_the_update() {
    let specs = vec![sh_spec("quiet", "exit 7", "true")];
    let states = runner::run(specs, &test_config()).await;

    assert_eq!(states[0].status, Status::Done);
    assert_eq!(states[0].version_before, None);
    assert_eq!(states[0].version_after, None);
    assert_eq!(detail_cell(&states[0]), "version unknown");
}

#[tokio::test]
async fn missing_update_command_fails_only_that_tool() {
    let specs = vec![
        ToolSpec::new(
            "ghost",
            &["sh", "-c", "echo 1.0"],
            &["aiup-test-no-such-command"],
        ),
        sh_spec("ok", "echo 1.0", "true"),
    ];
    let states = runner::run(specs, &test_config()).await;

    assert_eq!(states[0].status, Status::Failed);
    let failure = states[0].failure.as_ref().expect("failure recorded");
    assert_eq!(failure.kind, FailureKind::NotInvocable);
    assert!(failure.detail.contains("command not found"));

    assert_eq!(states[1].status, Status::Done);
}

#[tokio::test]
async fn update_timeout_fails_and_kills_the_subprocess() {
    let temp = TempDir::new().expect("temp dir");
    let marker = temp.path().join("marker");
    let update = format!("sleep 1; echo alive > {}", marker.display());

    let mut config = test_config();
    config.update_timeout = Duration::from_millis(100);

    let specs = vec![sh_spec("slowpoke", "echo 1.0", &update)];
    let states = runner::run(specs, &config).await;

    assert_eq!(states[0].status, Status::Failed);
    let failure = states[0].failure.as_ref().expect("failure recorded");
    assert_eq!(failure.kind, FailureKind::TimedOut);
    assert!(failure.detail.contains("timed out"));

    // The shell was killed before the sleep finished, so the marker must
    // never appear even after the original deadline would have passed.
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(!marker.exists(), "timed-out subprocess kept running");
}

#[tokio::test]
async fn status_transitions_are_strictly_forward() {
    let specs = vec![sh_spec("steady", "echo 1.0", "sleep 0.2")];
    let handle = runner::start(specs, &test_config());

    let mut rx = handle.receivers().remove(0);
    let observer = tokio::spawn(async move {
        let mut seen = vec![rx.borrow_and_update().status];
        while rx.changed().await.is_ok() {
            seen.push(rx.borrow_and_update().status);
        }
        seen
    });

    let states = handle.join().await;
    let seen = observer.await.expect("observer task");

    assert_eq!(states[0].status, Status::Done);
    assert!(
        seen.windows(2).all(|pair| pair[0] < pair[1]),
        "observed a backwards or repeated transition: {seen:?}"
    );
    assert!(seen.last().expect("at least one status").is_terminal());
}

#[tokio::test]
async fn post_update_version_is_reported() {
    let temp = TempDir::new().expect("temp dir");
    let version_file = temp.path().join("version");
    std::fs::write(&version_file, "1.0\n").expect("seed version");

    // The update bumps the recorded version, so before/after must differ.
    let version = format!("cat {}", version_file.display());
    let update = format!("echo 2.0 > {}", version_file.display());
    let specs = vec![sh_spec("bumped", &version, &update)];
    let states = runner::run(specs, &test_config()).await;

    assert_eq!(states[0].status, Status::Done);
    assert_eq!(states[0].version_before.as_deref(), Some("1.0"));
    assert_eq!(states[0].version_after.as_deref(), Some("2.0"));
    assert_eq!(detail_cell(&states[0]), "1.0 -> 2.0");
}
