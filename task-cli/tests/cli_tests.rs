use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn task_cli(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("task-cli").expect("Failed to find task-cli binary");
    cmd.current_dir(dir.path());
    cmd
}

#[test]
fn add_then_list_prints_description() {
    let dir = TempDir::new().unwrap();

    task_cli(&dir)
        .args(["add", "buy milk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task added successfully (ID: 1)"));

    task_cli(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Here are your tasks:\n- buy milk\n"));

    dir.child("tasks.json")
        .assert(predicate::str::contains(r#""status": "todo""#));
}

#[test]
fn mark_commands_move_task_between_lists() {
    let dir = TempDir::new().unwrap();
    task_cli(&dir).args(["add", "write report"]).assert().success();

    task_cli(&dir)
        .args(["mark-in-progress", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task 1 marked as in-progress."));
    task_cli(&dir)
        .args(["list", "in-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- write report"));

    task_cli(&dir)
        .args(["mark-done", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task 1 marked as done."));
    task_cli(&dir)
        .args(["list", "in-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks found."));
}

#[test]
fn update_and_delete_report_missing_ids() {
    let dir = TempDir::new().unwrap();
    task_cli(&dir).args(["add", "a"]).assert().success();

    task_cli(&dir)
        .args(["update", "99", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No task with ID 99 present"));

    task_cli(&dir)
        .args(["delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task 1 deleted."));
    task_cli(&dir)
        .args(["delete", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No task with ID 1 present"));
}

#[test]
fn list_without_task_file_degrades_gracefully() {
    let dir = TempDir::new().unwrap();

    task_cli(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks found."))
        .stderr(predicate::str::contains("not found"));

    dir.child("tasks.json").assert(predicate::path::missing());
}

#[test]
fn list_with_invalid_filter_fails() {
    let dir = TempDir::new().unwrap();
    task_cli(&dir).args(["add", "a"]).assert().success();

    task_cli(&dir)
        .args(["list", "blocked"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid filter 'blocked'"));
}

#[test]
fn long_listing_shows_ids_and_status() {
    let dir = TempDir::new().unwrap();
    task_cli(&dir).args(["add", "a"]).assert().success();
    task_cli(&dir).args(["add", "b"]).assert().success();
    task_cli(&dir).args(["mark-done", "2"]).assert().success();

    task_cli(&dir)
        .args(["list", "--long"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- [1] todo a (created "))
        .stdout(predicate::str::contains("- [2] done b (created "));
}

#[test]
fn file_flag_selects_another_task_file() {
    let dir = TempDir::new().unwrap();

    task_cli(&dir)
        .args(["--file", "work.json", "add", "ship it"])
        .assert()
        .success();

    dir.child("work.json")
        .assert(predicate::str::contains("ship it"));
    dir.child("tasks.json").assert(predicate::path::missing());
}

#[test]
fn config_file_sets_task_file_and_locking() {
    let dir = TempDir::new().unwrap();
    dir.child("task-cli.toml")
        .write_str("file = \"home.json\"\nlock = false\n")
        .unwrap();

    task_cli(&dir).args(["add", "mow lawn"]).assert().success();

    dir.child("home.json")
        .assert(predicate::str::contains("mow lawn"));
    dir.child("home.json.lock")
        .assert(predicate::path::missing());
}

#[test]
fn malformed_task_file_is_reported() {
    let dir = TempDir::new().unwrap();
    dir.child("tasks.json").write_str("not json").unwrap();

    task_cli(&dir)
        .args(["add", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot parse task file"));

    dir.child("tasks.json").assert("not json");
}

#[test]
fn list_on_malformed_task_file_reports_and_shows_empty_list() {
    let dir = TempDir::new().unwrap();
    dir.child("tasks.json").write_str("[{").unwrap();

    task_cli(&dir)
        .arg("list")
        .assert()
        .failure()
        .stdout(predicate::str::contains("No tasks found."))
        .stderr(predicate::str::contains("Cannot parse task file"));

    dir.child("tasks.json").assert("[{");
}

#[test]
fn unknown_command_is_rejected_by_parser() {
    let dir = TempDir::new().unwrap();

    task_cli(&dir)
        .arg("archive")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}
