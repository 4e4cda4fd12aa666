use std::io::Write;
use std::process::Command;

use tempfile::NamedTempFile;

const SAMPLE: &[u8] = b"127.0.0.1\n192.168.0.1\n10.0.0.1\n172.16.0.1\n127.0.0.1\n";

fn fixture(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content).expect("Failed to write temp file");
    file.flush().expect("Failed to flush temp file");
    file
}

fn run_json(args: &[&str]) -> serde_json::Value {
    let output = Command::new(env!("CARGO_BIN_EXE_ipuniq"))
        .args(args)
        .arg("--json")
        .output()
        .expect("Failed to execute ipuniq");

    assert!(
        output.status.success(),
        "ipuniq should exit successfully, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("Invalid UTF-8 output");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_distinct_count_default_dense() {
    let file = fixture(SAMPLE);
    let path = file.path().to_str().unwrap();

    let json = run_json(&["--file", path]);

    assert_eq!(json["results"]["distinct_ips"].as_u64(), Some(4));
    assert_eq!(json["results"]["total_lines"].as_u64(), Some(5));
    assert_eq!(json["config"]["set"].as_str(), Some("dense"));
    assert_eq!(json["config"]["workers"].as_u64(), Some(20));
}

#[test]
fn test_set_and_hash_combinations_agree() {
    let file = fixture(SAMPLE);
    let path = file.path().to_str().unwrap();

    for set in ["sparse", "locked"] {
        for hash in ["default", "fxhash", "ahash"] {
            let json = run_json(&["-f", path, "-w", "2", "-s", set, "-H", hash]);
            let distinct = json["results"]["distinct_ips"]
                .as_u64()
                .expect("distinct_ips should be a number");
            assert_eq!(distinct, 4, "set {} hash {}", set, hash);
        }
    }
}

#[test]
fn test_invalid_lines_are_reported_not_counted() {
    let file = fixture(b"10.0.0.1\n::1\n2001:db8::ff00:42:8329\n999.1.1.1\nhello\n10.0.0.1\n");
    let path = file.path().to_str().unwrap();

    let json = run_json(&["-f", path, "-w", "3", "-s", "sparse"]);

    assert_eq!(json["results"]["distinct_ips"].as_u64(), Some(1));
    assert_eq!(json["results"]["invalid_lines"].as_u64(), Some(4));
    assert_eq!(json["results"]["failed_workers"].as_u64(), Some(0));
}

#[test]
fn test_oversized_line_is_contained() {
    let mut content = b"1.1.1.1\n".to_vec();
    content.extend(std::iter::repeat(b'9').take(200));
    content.extend_from_slice(b"\n2.2.2.2\n");
    let file = fixture(&content);
    let path = file.path().to_str().unwrap();

    let json = run_json(&["-f", path, "-w", "1", "-s", "sparse", "--buffer-size", "64"]);

    assert_eq!(json["results"]["failed_workers"].as_u64(), Some(1));
    assert_eq!(json["results"]["distinct_ips"].as_u64(), Some(1));
}

#[test]
fn test_missing_file_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_ipuniq"))
        .args(["--file", "/no/such/ipuniq/input.txt"])
        .output()
        .expect("Failed to execute ipuniq");

    assert!(!output.status.success());
}

#[test]
fn test_file_flag_is_required() {
    let output = Command::new(env!("CARGO_BIN_EXE_ipuniq"))
        .output()
        .expect("Failed to execute ipuniq");

    assert!(!output.status.success());
}
