//! Integration tests for the linkstation binary.
//!
//! Spawns the binary with command-line flags, feeds stdin, and checks the
//! stdout lines and exit status.

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};

use linkstation::protocol::request::Response;

/// Runs the binary with `args`, writes `input` to stdin, and returns the
/// exit code and stdout lines.
fn run_binary(args: &[&str], input: impl AsRef<[u8]>) -> (i32, Vec<String>) {
    let exe = env!("CARGO_BIN_EXE_linkstation");
    let mut child = Command::new(exe)
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start linkstation");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    stdin.write_all(input.as_ref()).unwrap();
    stdin.flush().unwrap();
    drop(stdin);

    let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
    let status = child.wait().expect("failed to wait on child");
    (status.code().unwrap_or(-1), lines)
}

fn assert_sample_report(lines: &[String]) {
    assert_eq!(lines.len(), 4, "unexpected report: {:?}", lines);
    assert_eq!(lines[0], "Best link station for point 0,0 is 0,0 with power 100");
    assert_eq!(lines[1], "No link station within reach for point 100,100");
    assert!(
        lines[2].starts_with("Best link station for point 15,10 is 10,0 with power 0.67"),
        "{}",
        lines[2]
    );
    assert!(
        lines[3].starts_with("Best link station for point 18,18 is 20,20 with power 4.71"),
        "{}",
        lines[3]
    );
}

#[test]
fn sample_flag_prints_report() {
    let (code, lines) = run_binary(&["--sample"], "");
    assert_eq!(code, 0);
    assert_sample_report(&lines);
}

#[test]
fn interactive_sample() {
    let (code, lines) = run_binary(&[], "y\n");
    assert_eq!(code, 0);
    assert_sample_report(&lines);
}

#[test]
fn interactive_explicit_input() {
    let (code, lines) = run_binary(
        &[],
        "n\n[(0, 0, 10), (20, 20, 5), (10, 0, 12)]\n[(0, 0), (100, 100), (15, 10), (18, 18)]\n",
    );
    assert_eq!(code, 0);
    assert_sample_report(&lines);
}

#[test]
fn interactive_retries_malformed_input() {
    let (code, lines) = run_binary(&[], "n\n[(0, 0)]\nnot a list\n[(0, 0, 10)]\n[()]\n[(3, 4)]\n");
    assert_eq!(code, 0);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("Best link station for point 3,4 is 0,0 with power 25"));
}

#[test]
fn interactive_max_attempts_fails() {
    let (code, lines) = run_binary(&["--max-attempts", "1"], "n\n[(0, 0)]\n[(0, 0, 10)]\n");
    assert_eq!(code, 1);
    assert!(lines.is_empty());
}

#[test]
fn interactive_closed_input_fails() {
    let (code, lines) = run_binary(&[], "n\n");
    assert_eq!(code, 1);
    assert!(lines.is_empty());
}

#[test]
fn batch_flags() {
    let (code, lines) = run_binary(
        &["--stations", "[(0, 0, 10)]", "--devices", "[(0, 0), (10, 0), (100, 100)]"],
        "",
    );
    assert_eq!(code, 0);
    assert_eq!(
        lines,
        vec![
            "Best link station for point 0,0 is 0,0 with power 100",
            "No link station within reach for point 10,0",
            "No link station within reach for point 100,100",
        ]
    );
}

#[test]
fn batch_json_output() {
    let (code, lines) = run_binary(&["--sample", "--json"], "");
    assert_eq!(code, 0);
    assert_eq!(lines.len(), 1);

    let results: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 4);
    assert_eq!(results[0]["power"], 100.0);
    assert_eq!(results[0]["station"]["reach"], 10.0);
    assert!(results[1]["station"].is_null());
}

#[test]
fn parallel_evaluation_matches_sequential() {
    let args = [
        "--stations",
        "[(0, 0, 10), (20, 20, 5), (10, 0, 12)]",
        "--devices",
        "[(0, 0), (100, 100), (15, 10), (18, 18)]",
    ];
    let (_, sequential) = run_binary(&args, "");

    let mut parallel_args = args.to_vec();
    parallel_args.extend(["--threads", "4", "--parallel-threshold", "1"]);
    let (code, parallel) = run_binary(&parallel_args, "");

    assert_eq!(code, 0);
    assert_eq!(parallel, sequential);
}

#[test]
fn serve_mode_answers_requests() {
    let input = concat!(
        "{\"sample\": true}\n",
        "\n",
        "{\"link-stations\": [{\"x\": 0, \"y\": 0, \"reach\": 10}], \"devices\": [{\"x\": 1, \"y\": 0}]}\n",
        "{\"devices\": []}\n",
        "{\"link-stations\": [{\"x\": 0, \"y\": 0}], \"devices\": []}\n",
    );
    let (code, lines) = run_binary(&["--serve"], input);
    assert_eq!(code, 0);
    assert_eq!(lines.len(), 4);

    let responses: Vec<Response> = lines
        .iter()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(responses[0].status_code(), 200);
    assert_eq!(responses[0].results().unwrap().len(), 4);

    let results = responses[1].results().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].power, 81.0);

    assert_eq!(responses[2].status_code(), 400);
    assert_eq!(responses[3].status_code(), 400);
}

#[test]
fn serve_mode_survives_undecodable_lines() {
    let (code, lines) = run_binary(&["--serve"], b"\xff\xfe\n{\"sample\": true}\n");
    assert_eq!(code, 0);
    assert_eq!(lines.len(), 2, "{:?}", lines);
    let first: Response = serde_json::from_str(&lines[0]).unwrap();
    let second: Response = serde_json::from_str(&lines[1]).unwrap();
    assert_eq!(first.status_code(), 400);
    assert_eq!(second.status_code(), 200);
}

#[test]
fn deeply_nested_flag_value_is_a_usage_error() {
    let stations = "[".repeat(100_000);
    let (code, lines) = run_binary(&["--stations", &stations, "--devices", "[]"], "");
    assert_eq!(code, 2);
    assert!(lines.is_empty());
}

#[test]
fn help_prints_usage() {
    let (code, lines) = run_binary(&["--help"], "");
    assert_eq!(code, 0);
    assert!(lines[0].starts_with("Usage: linkstation"));
}

#[test]
fn bad_flags_exit_with_usage_error() {
    let (code, lines) = run_binary(&["--bogus"], "");
    assert_eq!(code, 2);
    assert!(lines.is_empty());

    let (code, _) = run_binary(&["--stations", "[(1, 2)]", "--devices", "[]"], "");
    assert_eq!(code, 2);

    let (code, _) = run_binary(&["--sample", "--serve"], "");
    assert_eq!(code, 2);
}
