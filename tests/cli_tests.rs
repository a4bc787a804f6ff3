#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::{NamedTempFile, tempdir};

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env_remove("SEMESTER_GRID_CONFIG")
        .env("SEMESTER_GRID_STORAGE_BACKEND", "memory")
        .write_stdin(script.to_string())
        .assert()
}

#[test]
fn cli_blocks_a_week_and_shows_it() {
    run_cli("block add 2 3 holiday HUT RI\nshow\nquit\n")
        .success()
        .stdout(str_contains("Blocked week (2, 3) as block 1."))
        .stdout(str_contains("HUT RI"));
}

#[test]
fn cli_rejects_duplicate_blocks() {
    run_cli("block add 2 3 holiday HUT RI\nblock add 2 3 exam PTS\nquit\n")
        .success()
        .stdout(str_contains("Error: week (2, 3) is already blocked"));
}

#[test]
fn cli_plots_entry_and_lists_it() {
    run_cli("entry add 3,2 Bilangan bulat\nplot 1 2 1\nplot 1 2 2\nplot 1 2 3\nentries\nquit\n")
        .success()
        .stdout(str_contains("Created entry 1 (P1/P2)."))
        .stdout(str_contains("Plotted week (2, 3) for entry 1."))
        .stdout(str_contains("Bilangan bulat"));
}

#[test]
fn cli_reports_blocked_plot_as_no_change() {
    run_cli("block add 1 1 exam PTS\nentry add 2 Bab 1\nplot 1 1 1\nquit\n")
        .success()
        .stdout(str_contains("Week (1, 1) is blocked; nothing changed."));
}

#[test]
fn cli_suggests_following_week() {
    run_cli("entry add 2 Bab 1\nsuggest\nquit\n")
        .success()
        .stdout(str_contains("Next meeting: P2"))
        .stdout(str_contains("Suggested dates: 2025-07-08 to 2025-07-12"));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().to_string();
    let script = format!(
        "entry add 2 Persisted chapter\nsave json {path}\nentry add 2 Temporary chapter\nload json {path}\nentries\nquit\n"
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Plan loaded from"));
    let after_reload = output.split("Plan loaded from").last().unwrap_or_default();
    assert!(after_reload.contains("Persisted chapter"));
    assert!(
        !after_reload.contains("Temporary chapter"),
        "temporary entry should not appear after reload:\n{after_reload}"
    );
}

#[test]
fn cli_exports_csv_and_html() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("grid.csv");
    let html_path = dir.path().join("grid.html");
    let script = format!(
        "block add 1 2 religious Maulid\nexport csv {}\nexport html {}\nquit\n",
        csv_path.display(),
        html_path.display()
    );
    run_cli(&script).success();
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("Meeting,Chapter,Topic,JP,Dates,Juli"));
    assert!(csv.contains("Maulid"));
    let html = std::fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("Maulid"));
}

#[test]
fn cli_exports_sheet_with_merges() {
    let dir = tempdir().unwrap();
    let sheet_path = dir.path().join("grid.json");
    let script = format!(
        "block add 1 2 exam PTS\nblock add 1 3 exam PTS\nexport sheet {}\nquit\n",
        sheet_path.display()
    );
    run_cli(&script)
        .success()
        .stdout(str_contains("Grid exported to"));
    let sheet: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&sheet_path).unwrap()).unwrap();
    let merges = sheet["merges"].as_array().unwrap();
    assert!(merges.iter().any(|range| range["firstCol"] == 6 && range["lastCol"] == 7));
}

#[test]
fn cli_unknown_command_hints_help() {
    run_cli("frobnicate\nquit\n")
        .success()
        .stdout(str_contains("Unknown command. Type 'help'."));
}
