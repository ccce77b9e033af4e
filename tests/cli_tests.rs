use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to create an ipasn command
fn ipasn_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ipasn"));
    cmd.env_remove("IPASN_DATABASE").env_remove("RUST_LOG");
    cmd
}

const DB_ROWS: &str = "\
1.0.0.0,1.0.0.255,13335,US,CLOUDFLARENET
1.0.1.0,1.0.3.255,0,None
8.8.8.0,8.8.8.255,15169,US,GOOGLE
2001:4860::,2001:4860:ffff:ffff:ffff:ffff:ffff:ffff,15169,US,GOOGLE
broken,row
";

fn write_db(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("ip2asn.csv");
    fs::write(&path, DB_ROWS).unwrap();
    path
}

#[test]
fn test_help() {
    ipasn_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Offline IP address to ASN"));
}

#[test]
fn test_version() {
    ipasn_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ipasn"));
}

#[test]
fn test_lookup_help() {
    ipasn_cmd()
        .args(["lookup", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Look up a file of IP addresses"));
}

#[test]
fn test_lookup_csv_output() {
    let dir = TempDir::new().unwrap();
    let db = write_db(&dir);
    let input = dir.path().join("ips.txt");
    let output = dir.path().join("out.csv");
    fs::write(&input, "8.8.8.8\n\n1.0.2.2\n9.9.9.9\nnot-an-ip\n2001:4860::8888\n").unwrap();

    ipasn_cmd()
        .arg("lookup")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("-d")
        .arg(&db)
        .assert()
        .success();

    let csv = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "IP,ASN,Country,Organization",
            "8.8.8.8,15169,US,GOOGLE",
            "1.0.2.2,N/A,N/A,Not routed",
            "9.9.9.9,N/A,N/A,Not found",
            "not-an-ip,N/A,N/A,Not found",
            "2001:4860::8888,15169,US,GOOGLE",
        ]
    );
}

#[test]
fn test_lookup_stdin_to_stdout_json() {
    let dir = TempDir::new().unwrap();
    let db = write_db(&dir);

    ipasn_cmd()
        .args(["lookup", "-", "--format", "json", "-j", "2", "-d"])
        .arg(&db)
        .write_stdin("1.0.0.1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"ip":"1.0.0.1","asn":"13335","country":"US","org":"CLOUDFLARENET"}"#,
        ));
}

#[test]
fn test_lookup_database_from_env() {
    let dir = TempDir::new().unwrap();
    let db = write_db(&dir);

    ipasn_cmd()
        .env("IPASN_DATABASE", &db)
        .args(["lookup", "-"])
        .write_stdin("8.8.8.8\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("8.8.8.8,15169,US,GOOGLE"));
}

#[test]
fn test_lookup_stats() {
    let dir = TempDir::new().unwrap();
    let db = write_db(&dir);

    ipasn_cmd()
        .args(["lookup", "-", "--stats", "-d"])
        .arg(&db)
        .write_stdin("8.8.8.8\n9.9.9.9\nbad\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Lines processed: 3"))
        .stderr(predicate::str::contains("1 rows dropped"));
}

#[test]
fn test_lookup_missing_database_fails() {
    let dir = TempDir::new().unwrap();

    ipasn_cmd()
        .args(["lookup", "-", "-d"])
        .arg(dir.path().join("nope.csv"))
        .write_stdin("8.8.8.8\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load database"));
}

#[test]
fn test_lookup_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let db = write_db(&dir);

    ipasn_cmd()
        .args(["lookup", "-", "--format", "xml", "-d"])
        .arg(&db)
        .write_stdin("8.8.8.8\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown format"));
}

#[test]
fn test_resolve_ip_literals() {
    let dir = TempDir::new().unwrap();
    let db = write_db(&dir);

    // IP literals resolve to themselves without touching the network
    ipasn_cmd()
        .args(["resolve", "-", "-d"])
        .arg(&db)
        .write_stdin("8.8.8.8\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("FQDN,Resolved IP,ASN,Country,Org"))
        .stdout(predicate::str::contains("8.8.8.8,8.8.8.8,15169,US,GOOGLE"));
}

#[test]
fn test_query_hit() {
    let dir = TempDir::new().unwrap();
    let db = write_db(&dir);

    ipasn_cmd()
        .args(["query", "1.0.0.77", "-d"])
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"asn\": \"13335\""))
        .stdout(predicate::str::contains("\"start\": \"1.0.0.0\""))
        .stdout(predicate::str::contains("\"end\": \"1.0.0.255\""));
}

#[test]
fn test_query_miss_exit_code() {
    let dir = TempDir::new().unwrap();
    let db = write_db(&dir);

    ipasn_cmd()
        .args(["query", "9.9.9.9", "-d"])
        .arg(&db)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"org\": \"Not found\""));

    ipasn_cmd()
        .args(["query", "9.9.9.9", "--quiet", "-d"])
        .arg(&db)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_inspect_json() {
    let dir = TempDir::new().unwrap();
    let db = write_db(&dir);

    let assert = ipasn_cmd()
        .args(["inspect", "--json", "-d"])
        .arg(&db)
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(report["ranges"], 4);
    assert_eq!(report["stats"]["ipv4_ranges"], 3);
    assert_eq!(report["stats"]["ipv6_ranges"], 1);
    assert_eq!(report["stats"]["dropped_too_few_fields"], 1);
    assert_eq!(report["stats"]["overlaps"], 0);
}

#[test]
fn test_inspect_strict_rejects_overlaps() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("overlap.csv");
    fs::write(&db, "10.0.0.0,10.0.255.255,1\n10.0.1.0,10.0.1.255,2\n").unwrap();

    ipasn_cmd()
        .args(["inspect", "--overlaps", "5", "-d"])
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("Overlapping pairs: 1"))
        .stdout(predicate::str::contains("10.0.1.0 - 10.0.1.255 (AS 2) overlaps"));

    ipasn_cmd()
        .args(["inspect", "--strict", "-d"])
        .arg(&db)
        .assert()
        .failure()
        .stderr(predicate::str::contains("overlapping"));
}
