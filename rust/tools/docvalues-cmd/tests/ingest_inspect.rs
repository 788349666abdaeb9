use std::process::Command;

fn docvalues_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_docvalues-cmd"))
}

#[test]
fn test_ingest_then_inspect() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.json");
    std::fs::write(
        &input,
        r#"{
            "segment": "_0",
            "max_doc": 6,
            "fields": [
                { "id": 0, "type": "numeric", "skip_index": true, "values": [[0, 10], [4, 30], [2, 20]] },
                { "id": 1, "type": "binary", "values": [[1, "abc"], [5, ""]] },
                { "id": 2, "type": "sorted", "values": [[0, "x"], [1, "y"]] },
                { "id": 3, "type": "sorted_numeric", "values": [[3, [9, 1, 5]]] },
                { "id": 4, "type": "sorted_set", "values": [[2, ["b", "a"]], [3, ["c"]]] }
            ]
        }"#,
    )
    .unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{ "skip_index_interval_size": 2 }"#).unwrap();
    let segment_dir = dir.path().join("segment");

    let status = docvalues_cmd()
        .arg("ingest")
        .arg("--input")
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .arg(&segment_dir)
        .status()
        .unwrap();
    assert!(status.success());
    assert!(segment_dir.join("_0.dvd").exists());
    assert!(segment_dir.join("_0.dvm").exists());
    assert!(segment_dir.join("_0.si.json").exists());

    let output = docvalues_cmd()
        .arg("inspect")
        .arg("-v")
        .arg(&segment_dir)
        .arg("_0")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("5 fields"));
    assert!(stdout.contains("scheme="));
    assert!(stdout.contains("terms=3"));
    assert!(stdout.contains("    3: [1, 5, 9]"));
    assert!(stdout.contains("    1: \"abc\""));
}

#[test]
fn test_ingest_rejects_invalid_docs() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.json");
    std::fs::write(
        &input,
        r#"{ "segment": "_1", "max_doc": 2, "fields": [
            { "id": 0, "type": "numeric", "values": [[5, 1]] }
        ] }"#,
    )
    .unwrap();
    let status = docvalues_cmd()
        .arg("ingest")
        .arg("--input")
        .arg(&input)
        .arg(dir.path().join("out"))
        .status()
        .unwrap();
    assert!(!status.success());
}
