//! CLI integration tests for the comparison and sweep modes.

use std::process::Command;

fn run(args: &[&str]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_squarepool");
    Command::new(bin)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run squarepool binary")
}

#[test]
fn compare_cli_reports_both_phases_in_order() {
    let output = run(&["--delay-ms", "20", "--tasks", "6"]);
    assert!(
        output.status.success(),
        "compare exited with non-zero status: {:?}",
        output.status
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    for label in ["sequential", "parallel"] {
        let lines: Vec<&str> = stdout
            .lines()
            .filter(|line| line.starts_with(&format!("{label}: ")))
            .collect();
        let expected: Vec<String> = (1..=6)
            .map(|x| format!("{label}: {x} squared is {}", x * x))
            .collect();
        assert_eq!(lines, expected, "{label} lines out of order or wrong");

        let elapsed = stdout
            .lines()
            .find(|line| line.starts_with(&format!("{label} elapsed: ")))
            .expect("elapsed line missing");
        assert!(elapsed.ends_with(" seconds"));
    }
    assert!(stdout.lines().any(|line| line.starts_with("speedup: ")));
}

#[test]
fn parallel_cli_finishes_with_completion_line() {
    let output = run(&["parallel", "--delay-ms", "10", "--tasks", "3"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().last(), Some("processing completed"));
}

#[test]
fn sweep_cli_prints_one_row_per_pool_size() {
    let output = run(&["sweep", "--pool-sizes", "1,2", "--delay-ms", "5", "--tasks", "4"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    assert!(lines.next().expect("header").starts_with("pool_size,tasks"));
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].starts_with("1,4,5,"));
    assert!(rows[1].starts_with("2,4,5,"));
}

#[test]
fn zero_pool_size_is_rejected() {
    let output = run(&["--pool-size", "0"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("pool_size must be > 0"));
}
