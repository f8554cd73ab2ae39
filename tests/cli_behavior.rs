//! Integration tests for the soap-walk binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn soap_walk_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_soap-walk"))
}

fn documents_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/documents")
}

#[test]
fn prints_sample_envelope_untrimmed() {
    soap_walk_cmd()
        .assert()
        .success()
        .stdout(predicate::str::starts_with("172.21.40.99\nkey\n 22 \nkey\n 2 3 \n"))
        .stdout(predicate::str::contains("key=== 22 \nkey=== 2 3 \n"))
        .stdout(predicate::str::contains("key22=== 24 \n"));
}

#[test]
fn prints_sample_envelope_trimmed() {
    let expected = "\
172.21.40.99
key
22
key
2 3
key22
24
key
55
Body===
GetNewDataResponse===
GetNewDataResult===
RtnValue===
ClientState===
GenaralInfo===
key===22
key===2 3
GenaralInfo===
key22===24
GenaralInfo===
key===55
";
    soap_walk_cmd()
        .arg("--trim")
        .assert()
        .success()
        .stdout(predicate::eq(expected));
}

#[test]
fn walks_plain_document() {
    soap_walk_cmd()
        .arg("--no-decl")
        .arg("--trim")
        .arg(documents_dir().join("plain.xml"))
        .assert()
        .success()
        .stdout(predicate::eq(
            "book===\ntitle===Dune\nauthor===Frank Herbert\nbook===\ntitle===Solaris\n",
        ));
}

#[test]
fn rejects_document_without_decl() {
    soap_walk_cmd()
        .arg(documents_dir().join("plain.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed XML"));
}

#[test]
fn fails_on_missing_file() {
    soap_walk_cmd()
        .arg(documents_dir().join("missing.xml"))
        .assert()
        .failure();
}

#[test]
fn shows_help_with_flag() {
    soap_walk_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}
