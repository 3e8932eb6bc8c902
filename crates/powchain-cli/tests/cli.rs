use assert_cmd::Command;
use predicates::prelude::*;

fn powchain() -> Command {
    Command::cargo_bin("powchain").expect("binary should build")
}

#[test]
fn demo_mines_and_validates() {
    powchain()
        .args(["demo", "--difficulty", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"blocks\""))
        // hex of "Savy" inside the encoded payload
        .stdout(predicate::str::contains("53617679"))
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn demo_reports_tampering() {
    powchain()
        .args(["demo", "--difficulty", "1", "--tamper"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "tampered: block 1 hash does not match its contents",
        ));
}

#[test]
fn mine_requires_data() {
    powchain().args(["mine"]).assert().failure();
}

#[test]
fn mined_chain_verifies_from_stdin() {
    let output = powchain()
        .args(["mine", "--difficulty", "2", "--data", "hello", "--data", "world"])
        .output()
        .expect("run mine");
    assert!(output.status.success());

    let chain: serde_json::Value = serde_json::from_slice(&output.stdout).expect("chain JSON");
    let blocks = chain["blocks"].as_array().expect("blocks array");
    assert_eq!(blocks.len(), 3);
    assert!(blocks[1]["hash"].as_str().unwrap().starts_with("00"));

    powchain()
        .arg("verify")
        .write_stdin(output.stdout)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid (3 blocks)"));
}

#[test]
fn verify_rejects_broken_link() {
    let output = powchain()
        .args(["mine", "--difficulty", "0", "--data", "a", "--data", "b"])
        .output()
        .expect("run mine");
    let mut chain: serde_json::Value = serde_json::from_slice(&output.stdout).expect("chain JSON");
    chain["blocks"][2]["previous_hash"] = serde_json::Value::from("bogus");

    powchain()
        .arg("verify")
        .write_stdin(chain.to_string())
        .assert()
        .failure()
        .stderr(predicate::str::contains("block 2 does not link"));
}
