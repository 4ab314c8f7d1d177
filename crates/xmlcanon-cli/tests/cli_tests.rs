use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_converts_stdin_to_stdout() {
    Command::cargo_bin("xmlcanon")
        .unwrap()
        .write_stdin("<Root><City>SF</City></Root>")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"Root":[{"City":"SF"}]}"#));
}

#[test]
fn test_converts_file_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.xml");
    let output = dir.path().join("out.json");
    std::fs::write(&input, "<Root></Root>").unwrap();

    Command::cargo_bin("xmlcanon")
        .unwrap()
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "{\"Root\":\"\"}\n"
    );
}

#[test]
fn test_rejects_malformed_xml() {
    Command::cargo_bin("xmlcanon")
        .unwrap()
        .write_stdin("<Root><A></Root>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to convert XML"));
}

#[test]
fn test_depth_limit_flag() {
    Command::cargo_bin("xmlcanon")
        .unwrap()
        .arg("--max-depth")
        .arg("2")
        .write_stdin("<a><b><c><d>x</d></c></b></a>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("max depth exceeded"));
}
