//! CLI tests for the `hypart` startup sequence.
//!
//! Spawns the binary and checks exit codes and diagnostics for the
//! auxiliary-file layout, plus one full partitioning run.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use hypart::exit_codes;
use hypart::test_support::{SAMPLE_HGR, write_file};

fn hypart(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hypart"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("run hypart")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn full_run_writes_partition_and_exits_ok() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_file(temp.path(), "edge.txt", "1.0 2.0 3.0 4.0");
    write_file(temp.path(), "idx.txt", "0 0 0 1 1 1 1");
    write_file(temp.path(), "graph.hgr", SAMPLE_HGR);

    let output = hypart(
        temp.path(),
        &[
            "edge.txt",
            "idx.txt",
            "-k",
            "2",
            "--seed",
            "3",
            "-w",
            "--partition-file",
            "graph.part",
            "graph.hgr",
        ],
    );

    assert_eq!(output.status.code(), Some(exit_codes::OK), "{}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("result: objective=km1"), "{stdout}");
    let partition = fs::read_to_string(temp.path().join("graph.part")).expect("partition file");
    assert_eq!(partition.lines().count(), 7);
    assert!(!temp.path().join("graph.hgr.part2.checkpoint.json").exists());
}

#[test]
fn quiet_run_prints_nothing() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_file(temp.path(), "edge.txt", "");
    write_file(temp.path(), "idx.txt", "");
    write_file(temp.path(), "graph.hgr", SAMPLE_HGR);

    let output = hypart(
        temp.path(),
        &["edge.txt", "idx.txt", "-q", "-h", "graph.hgr", "-k", "2"],
    );
    assert_eq!(output.status.code(), Some(exit_codes::OK), "{}", stderr(&output));
    assert!(output.stdout.is_empty());
}

#[test]
fn missing_element_file_exits_one_and_names_er() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_file(temp.path(), "idx.txt", "0 1 0");

    let output = hypart(temp.path(), &["edge.txt", "idx.txt", "-k", "2", "graph.hgr"]);
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    let err = stderr(&output);
    assert!(err.contains("unable to open ER file"), "{err}");
    assert!(!err.contains("idx file"), "{err}");
}

#[test]
fn missing_community_file_exits_one_and_names_idx() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_file(temp.path(), "edge.txt", "1.0 2.0 3.0");

    let output = hypart(temp.path(), &["edge.txt", "idx.txt", "-k", "2", "graph.hgr"]);
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert!(stderr(&output).contains("unable to open idx file"));
}

#[test]
fn malformed_auxiliary_value_exits_one() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_file(temp.path(), "edge.txt", "1.0 two 3.0");
    write_file(temp.path(), "idx.txt", "0 1 0");

    let output = hypart(temp.path(), &["edge.txt", "idx.txt", "-k", "2", "graph.hgr"]);
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert!(stderr(&output).contains("malformed value \"two\""));
}

#[test]
fn too_few_arguments_exits_with_usage() {
    let temp = tempfile::tempdir().expect("tempdir");
    for args in [&[][..], &["edge.txt"][..]] {
        let output = hypart(temp.path(), args);
        assert_eq!(output.status.code(), Some(exit_codes::USAGE));
        assert!(stderr(&output).contains("expected two auxiliary files"));
    }
}

#[test]
fn delegate_parser_owns_its_usage_errors() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_file(temp.path(), "edge.txt", "");
    write_file(temp.path(), "idx.txt", "");

    let output = hypart(temp.path(), &["edge.txt", "idx.txt", "graph.hgr"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("--blocks"));

    let help = hypart(temp.path(), &["edge.txt", "idx.txt", "--help"]);
    assert_eq!(help.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&help.stdout).contains("--hypergraph"));
}

#[test]
fn unreadable_hypergraph_exits_one() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_file(temp.path(), "edge.txt", "");
    write_file(temp.path(), "idx.txt", "");

    let output = hypart(temp.path(), &["edge.txt", "idx.txt", "-k", "2", "missing.hgr"]);
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert!(stderr(&output).contains("missing.hgr"));
}

#[test]
fn oversized_hypergraph_header_exits_one() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_file(temp.path(), "edge.txt", "");
    write_file(temp.path(), "idx.txt", "");
    write_file(temp.path(), "bad.hgr", "18446744073709551615 1\n");

    let output = hypart(temp.path(), &["edge.txt", "idx.txt", "-k", "2", "bad.hgr"]);
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE), "{}", stderr(&output));
    assert!(stderr(&output).contains("at most"));
}

#[test]
fn more_blocks_than_nodes_exits_one() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_file(temp.path(), "edge.txt", "");
    write_file(temp.path(), "idx.txt", "");
    write_file(temp.path(), "graph.hgr", SAMPLE_HGR);

    let output = hypart(
        temp.path(),
        &["edge.txt", "idx.txt", "-k", "18446744073709551615", "graph.hgr"],
    );
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE), "{}", stderr(&output));
    assert!(stderr(&output).contains("cannot split 7 nodes"));
}
