use std::path::Path;
use std::process::{Command, Output};
use std::str;

use serial_test::serial;

mod common;
use common::{Workspace, workspace, write_engagement_csv};

const ENV_VARS: [&str; 4] = [
    "ADOPTION_WINDOW_DAYS",
    "ADOPTION_THRESHOLD",
    "ADOPTION_COUNT_MODE",
    "RUST_LOG",
];

fn run(args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_user-adoption"));
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    let output = cmd.args(args).output().expect("spawn user-adoption");
    if !output.status.success() {
        eprintln!("stderr: {}", String::from_utf8_lossy(&output.stderr));
    }
    output
}

fn arg(p: &Path) -> &str {
    p.to_str().expect("utf-8 temp path")
}

fn engagement(ws: &Workspace) -> std::path::PathBuf {
    write_engagement_csv(
        ws,
        "engagement.csv",
        &[
            ("2014-04-01 09:15:00", "a"),
            ("2014-04-02 09:15:00", "a"),
            ("2014-04-03 09:15:00", "a"),
            ("2014-04-01 09:15:00", "b"),
            ("2014-04-20 09:15:00", "b"),
            ("2014-04-21 09:15:00", "b"),
        ],
    )
}

#[test]
#[serial]
fn adopt_dry_run_prints_summary_and_writes_nothing() {
    let ws = workspace();
    let input = engagement(&ws);
    let output = ws.path("adoption.csv");

    let out = run(&[
        "adopt",
        "--input",
        arg(&input),
        "--output",
        arg(&output),
        "--dry-run",
    ]);
    assert!(out.status.success(), "binary did not exit successfully");

    let stdout = str::from_utf8(&out.stdout).unwrap();
    assert!(stdout.starts_with("Adoption run"), "stdout: {stdout}");
    assert!(stdout.contains("users            2"), "stdout: {stdout}");
    assert!(stdout.contains("adopted users    1"), "stdout: {stdout}");
    assert!(!output.exists());
}

#[test]
#[serial]
fn visits_then_resolve_matches_adopt() {
    let ws = workspace();
    let input = engagement(&ws);
    let direct = ws.path("direct.csv");
    let visits = ws.path("out/visits.csv");
    let resolved = ws.path("out/resolved.csv");

    let out = run(&["adopt", "--input", arg(&input), "--output", arg(&direct)]);
    assert!(out.status.success());

    let out = run(&["visits", "--input", arg(&input), "--output", arg(&visits)]);
    assert!(out.status.success());
    let out = run(&["resolve", "--input", arg(&visits), "--output", arg(&resolved)]);
    assert!(out.status.success());

    let direct = std::fs::read_to_string(&direct).unwrap();
    assert_eq!(std::fs::read_to_string(&resolved).unwrap(), direct);
    assert_eq!(
        direct.lines().collect::<Vec<_>>(),
        ["user_id,date,previous_week_visits", "a,2014-04-03,3"]
    );
}

#[test]
#[serial]
fn threshold_flag_beats_config_file() {
    let ws = workspace();
    let input = engagement(&ws);
    let config = ws.path("adoption.toml");
    std::fs::write(&config, "adoption_threshold = 10\n").unwrap();

    let strict = ws.path("strict.csv");
    let out = run(&[
        "adopt",
        "--config",
        arg(&config),
        "--input",
        arg(&input),
        "--output",
        arg(&strict),
    ]);
    assert!(out.status.success());
    assert_eq!(
        std::fs::read_to_string(&strict).unwrap().trim_end(),
        "user_id,date,previous_week_visits"
    );

    let flagged = ws.path("flagged.csv");
    let out = run(&[
        "adopt",
        "--config",
        arg(&config),
        "--input",
        arg(&input),
        "--output",
        arg(&flagged),
        "--threshold",
        "2",
    ]);
    assert!(out.status.success());
    let lines: Vec<String> = std::fs::read_to_string(&flagged)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    assert_eq!(
        lines,
        [
            "user_id,date,previous_week_visits",
            "a,2014-04-02,2",
            "b,2014-04-21,2",
        ]
    );
}

#[test]
#[serial]
fn missing_input_fails() {
    let ws = workspace();
    let out = run(&["adopt", "--output", arg(&ws.path("adoption.csv"))]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("--input"));
}
