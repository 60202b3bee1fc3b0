//! End-to-end tests of the poll cycle against real temporary workspaces.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use filetime::{FileTime, set_file_mtime};
use lookout_config::{AgentConfig, LookoutConfig, ModelTable};
use lookout_core::{AgentState, EventKind, Severity};
use lookout_engine::{DashboardState, Scheduler};
use tempfile::TempDir;

const NOW: i64 = 1_772_150_400;

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

fn agent(id: &str, name: &str, patterns: &[&str]) -> AgentConfig {
    AgentConfig {
        id: id.to_string(),
        name: name.to_string(),
        role: "Tester".to_string(),
        emoji: "🧪".to_string(),
        workspace_patterns: patterns.iter().map(|p| p.to_string()).collect(),
    }
}

fn config(base: &Path) -> LookoutConfig {
    LookoutConfig {
        base_dir: base.to_path_buf(),
        agents: vec![
            agent("dev", "Charlie", &["workspace-dev"]),
            agent("pm", "Dennis", &["workspace-pm"]),
        ],
        ..LookoutConfig::default()
    }
}

fn scheduler(config: &LookoutConfig) -> Scheduler {
    let state = Arc::new(DashboardState::new(
        config.roster(),
        config.activity_log_capacity,
    ));
    Scheduler::new(
        config,
        ModelTable::with_default(config.default_model.clone()),
        state,
    )
}

fn write(path: &Path, content: &str, mtime: i64) -> PathBuf {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
    set_file_mtime(path, FileTime::from_unix_time(mtime, 0)).unwrap();
    path.to_path_buf()
}

#[test]
fn test_empty_workspace_is_idle() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join("workspace-dev")).unwrap();
    let scheduler = scheduler(&config(temp_dir.path()));

    scheduler.prime();
    let report = scheduler.poll_once(at(NOW));

    assert_eq!(report.agents, 2);
    assert_eq!(report.events, 0);
    assert_eq!(report.failures, 0);

    let dev = scheduler.state().status("dev").unwrap();
    assert_eq!(dev.status, AgentState::Idle);
    assert_eq!(dev.last_seen, None);
    assert_eq!(dev.last_task, None);
    assert!(dev.workspace_path.is_some());

    let pm = scheduler.state().status("pm").unwrap();
    assert_eq!(pm.workspace_path, None);
}

#[test]
fn test_created_updated_then_idle() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("workspace-dev");
    fs::create_dir(&workspace).unwrap();
    let scheduler = scheduler(&config(temp_dir.path()));
    scheduler.prime();

    // New file, saved ten seconds ago
    let note = write(
        &workspace.join("memory/2026-02-27.md"),
        "- Writing the integration suite\n",
        NOW - 10,
    );
    scheduler.poll_once(at(NOW));

    let dev = scheduler.state().status("dev").unwrap();
    assert_eq!(dev.status, AgentState::Active);
    assert_eq!(dev.last_task.as_deref(), Some("Writing the integration suite"));
    assert_eq!(dev.event_count, 1);

    let activity = scheduler.state().activity();
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].kind, EventKind::Task);
    assert_eq!(activity[0].detail, "Created memory/2026-02-27.md");

    // Same file re-saved with three more lines
    write(
        &note,
        "- Writing the integration suite\n- one\n- two\n- three\n",
        NOW + 5,
    );
    scheduler.poll_once(at(NOW + 5));

    let activity = scheduler.state().activity();
    assert_eq!(activity.len(), 2);
    assert_eq!(activity[0].kind, EventKind::Updated);
    assert!(activity[0].detail.contains("+3 lines"));
    assert_eq!(activity[0].snippet, "- Writing the integration suite · - one · - two · - three");

    // Quiet until the idle threshold passes
    scheduler.poll_once(at(NOW + 604));
    assert_eq!(scheduler.state().activity().len(), 2);

    scheduler.poll_once(at(NOW + 605));
    let activity = scheduler.state().activity();
    assert_eq!(activity.len(), 3);
    assert_eq!(activity[0].kind, EventKind::Idle);
    assert_eq!(activity[0].severity, Severity::Idle);
    assert_eq!(activity[0].detail, "Charlie has been idle for 10+ min");

    scheduler.poll_once(at(NOW + 1200));
    assert_eq!(scheduler.state().activity().len(), 3);
    assert_eq!(
        scheduler.state().status("dev").unwrap().status,
        AgentState::Idle
    );
}

#[test]
fn test_priming_suppresses_existing_files() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("workspace-pm");
    for i in 0..10 {
        write(&workspace.join(format!("note-{i}.md")), "existing\n", NOW - 60);
    }
    let scheduler = scheduler(&config(temp_dir.path()));

    assert_eq!(scheduler.prime(), 10);
    assert_eq!(scheduler.state().snapshot_count(), 10);
    assert!(scheduler.state().activity().is_empty());

    let report = scheduler.poll_once(at(NOW));
    assert_eq!(report.events, 0);
    assert!(scheduler.state().activity().is_empty());
}

#[test]
fn test_repeated_polls_are_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("workspace-dev");
    write(&workspace.join("a.md"), "a\n", NOW - 30);
    write(&workspace.join("b.md"), "b\n", NOW - 30);
    let scheduler = scheduler(&config(temp_dir.path()));

    assert_eq!(scheduler.poll_once(at(NOW)).events, 2);
    assert_eq!(scheduler.poll_once(at(NOW + 5)).events, 0);
    assert_eq!(scheduler.poll_once(at(NOW + 10)).events, 0);
}

#[test]
fn test_backward_mtime_never_reports() {
    let temp_dir = TempDir::new().unwrap();
    let note = write(
        &temp_dir.path().join("workspace-dev/notes.md"),
        "a\nb\nc\n",
        NOW,
    );
    let scheduler = scheduler(&config(temp_dir.path()));
    scheduler.prime();

    write(&note, "a\n", NOW - 3600);
    assert_eq!(scheduler.poll_once(at(NOW + 5)).events, 0);
    assert!(scheduler.state().activity().is_empty());
}

#[test]
fn test_activity_log_keeps_newest_events() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("workspace-dev");
    fs::create_dir(&workspace).unwrap();
    let mut config = config(temp_dir.path());
    config.activity_log_capacity = 3;
    let scheduler = scheduler(&config);
    scheduler.prime();

    for i in 0..5 {
        write(&workspace.join(format!("note-{i}.md")), "x\n", NOW + i);
        scheduler.poll_once(at(NOW + i));
    }

    let details: Vec<String> = scheduler
        .state()
        .activity()
        .into_iter()
        .map(|e| e.detail)
        .collect();
    assert_eq!(
        details,
        vec!["Created note-4.md", "Created note-3.md", "Created note-2.md"]
    );
    assert_eq!(scheduler.state().health().activity_events, 3);
}

#[test]
fn test_announce_publishes_boot_events() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join("workspace-dev")).unwrap();
    let scheduler = scheduler(&config(temp_dir.path()));

    assert_eq!(scheduler.prime(), 0);
    scheduler.announce(at(NOW));

    let activity = scheduler.state().activity();
    assert_eq!(activity.len(), 2);
    // Newest first, so roster order is reversed
    assert_eq!(activity[0].detail, "Dennis agent online · workspace not found");
    assert_eq!(activity[1].detail, "Charlie agent online · workspace found");
    assert!(activity.iter().all(|e| e.kind == EventKind::Boot));
    assert!(activity.iter().all(|e| e.severity == Severity::Info));
    assert!(activity.iter().all(|e| e.file_changed.is_empty()));

    let ids: Vec<String> = scheduler
        .state()
        .statuses()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec!["dev", "pm"]);
}

#[test]
fn test_workspace_appearing_later_is_picked_up() {
    let temp_dir = TempDir::new().unwrap();
    let scheduler = scheduler(&config(temp_dir.path()));
    scheduler.prime();
    scheduler.poll_once(at(NOW));
    assert_eq!(scheduler.state().status("pm").unwrap().workspace_path, None);

    write(
        &temp_dir.path().join("workspace-pm/AGENTS.md"),
        "roadmap\n",
        NOW + 1,
    );
    let report = scheduler.poll_once(at(NOW + 2));

    assert_eq!(report.events, 1);
    let pm = scheduler.state().status("pm").unwrap();
    assert!(pm.workspace_path.is_some());
    assert_eq!(pm.workspace_bytes, 8);
}

#[test]
fn test_event_serialises_wire_names() {
    let temp_dir = TempDir::new().unwrap();
    write(
        &temp_dir.path().join("workspace-dev/notes.md"),
        "hello\n",
        NOW,
    );
    let scheduler = scheduler(&config(temp_dir.path()));
    scheduler.poll_once(at(NOW + 1));

    let json = serde_json::to_value(&scheduler.state().activity()[0]).unwrap();
    assert_eq!(json["agent"], "dev");
    assert_eq!(json["event_type"], "task");
    assert_eq!(json["event_detail"], "Created notes.md");
    assert_eq!(json["severity"], "task");
    assert_eq!(json["size_delta"], 6);
    assert_eq!(json["timestamp"], "2026-02-27T00:00:00Z");
}

#[tokio::test]
async fn test_start_publishes_before_first_tick() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join("workspace-dev")).unwrap();
    let config = config(temp_dir.path());
    let scheduler = scheduler(&config);
    let state = Arc::clone(scheduler.state());

    let handle = scheduler.start().await;

    assert_eq!(state.statuses().len(), 2);
    assert_eq!(state.activity().len(), 2);
    handle.abort();
}

#[test]
fn test_unrepresentable_mtime_does_not_stop_the_cycle() {
    let shm = Path::new("/dev/shm");
    let temp_dir = if shm.is_dir() {
        tempfile::Builder::new().tempdir_in(shm).unwrap()
    } else {
        TempDir::new().unwrap()
    };
    let scheduler = scheduler(&config(temp_dir.path()));
    fs::create_dir(temp_dir.path().join("workspace-pm")).unwrap();
    scheduler.prime();

    let far_future = temp_dir.path().join("workspace-dev/notes.md");
    fs::create_dir_all(far_future.parent().unwrap()).unwrap();
    fs::write(&far_future, "- from the far future\n").unwrap();
    // Best effort: some filesystems reject or clamp this
    let _ = set_file_mtime(&far_future, FileTime::from_unix_time(10_000_000_000_000, 0));
    write(
        &temp_dir.path().join("workspace-pm/a.md"),
        "- Planning the sprint\n",
        NOW - 10,
    );

    let report = scheduler.poll_once(at(NOW));

    assert_eq!(report.failures, 0);
    assert_eq!(report.agents, 2);
    assert_eq!(scheduler.state().statuses().len(), 2);

    let pm = scheduler.state().status("pm").unwrap();
    assert_eq!(pm.status, AgentState::Active);
    assert!(
        scheduler
            .state()
            .activity()
            .iter()
            .any(|e| e.agent_id == "pm" && e.detail == "Created a.md")
    );
}
