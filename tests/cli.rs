use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

mod common;

fn potholekit() -> Command {
    Command::cargo_bin("potholekit").unwrap()
}

#[test]
fn runs() {
    potholekit().assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = potholekit();
    cmd.arg("-V");
    cmd.assert().success().stdout("potholekit 0.1.0\n");
}

// analyze

#[test]
fn analyze_voc_dataset_prints_statistics() {
    let temp = tempfile::tempdir().expect("create temp dir");
    common::create_voc_dataset(temp.path());

    potholekit()
        .arg("analyze")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Dataset Analysis:"))
        .stdout(predicate::str::contains("Average annotations per image: 1.50"))
        .stdout(predicate::str::contains("pothole"));
}

#[test]
fn analyze_json_output_format() {
    let temp = tempfile::tempdir().expect("create temp dir");
    common::create_voc_dataset(temp.path());

    let output = potholekit()
        .arg("analyze")
        .arg(temp.path())
        .args(["--output", "json"])
        .output()
        .expect("run analyze");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["total_images"], 2);
    assert_eq!(json["total_annotations"], 3);
    assert_eq!(json["class_counts"]["pothole"], 3);
    // 50x50 = 2500, 60x80 = 4800, 40x60 = 2400
    assert_eq!(json["size_distribution"]["medium"], 3);
}

#[test]
fn analyze_without_annotations_fails() {
    let temp = tempfile::tempdir().expect("create temp dir");
    fs::create_dir_all(temp.path().join("images")).expect("create images dir");

    potholekit()
        .arg("analyze")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No annotations found"));
}

#[test]
fn analyze_reads_unified_json_file() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let path = temp.path().join("annotations.json");
    fs::write(
        &path,
        r#"{"x.jpg": [{"class": "Pothole", "bbox": {"xmin": 0, "ymin": 0, "xmax": 100, "ymax": 100}}]}"#,
    )
    .expect("write json");

    potholekit()
        .arg("analyze")
        .arg(temp.path())
        .arg("--annotations")
        .arg(&path)
        .args(["--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"large\": 1"));
}

#[test]
fn analyze_rejects_unknown_output_format() {
    potholekit()
        .args(["analyze", ".", "--output", "yaml"])
        .assert()
        .failure();
}

// build

#[test]
fn build_writes_corpus_and_report() {
    let temp = tempfile::tempdir().expect("create temp dir");
    common::create_voc_dataset(temp.path());

    potholekit()
        .arg("build")
        .arg(temp.path())
        .args(["--size", "32x32", "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created classification dataset:"))
        .stdout(predicate::str::contains("Pothole images: 3"));

    let corpus = temp.path().join("processed/classification");
    assert_eq!(common::count_files(&corpus.join("pothole")), 3);
    assert!(common::count_files(&corpus.join("no_pothole")) <= 6);
}

#[test]
fn build_json_report_with_output_dir() {
    let temp = tempfile::tempdir().expect("create temp dir");
    common::create_voc_dataset(temp.path());
    let out = temp.path().join("corpus");

    let output = potholekit()
        .arg("build")
        .arg(temp.path())
        .args(["--size", "16x16", "--seed", "3", "--output", "json"])
        .arg("--output-dir")
        .arg(&out)
        .output()
        .expect("run build");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["positives"], 3);
    assert_eq!(json["negatives_requested"], 6);
    assert_eq!(json["images_processed"], 2);
    assert!(out.join("pothole").is_dir());
    assert!(out.join("no_pothole").is_dir());
}

#[test]
fn build_reads_config_file() {
    let temp = tempfile::tempdir().expect("create temp dir");
    common::create_voc_dataset(temp.path());
    let out = temp.path().join("from-config");
    let config = temp.path().join("potholekit.yaml");
    fs::write(
        &config,
        format!(
            "output_size: [20, 10]\nseed: 9\noutput_dir: {}\n",
            out.display()
        ),
    )
    .expect("write config");

    potholekit()
        .arg("build")
        .arg(temp.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    let first = common::file_names(&out.join("pothole"))[0].clone();
    let image = image::open(out.join("pothole").join(first)).expect("open crop");
    assert_eq!((image.width(), image.height()), (20, 10));
}

#[test]
fn build_without_images_dir_fails() {
    let temp = tempfile::tempdir().expect("create temp dir");
    common::write_voc_xml(
        &temp.path().join("annotations/a.xml"),
        "a.png",
        10,
        10,
        &[("pothole", (1, 1, 5, 5))],
    );

    potholekit()
        .arg("build")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Images directory not found"));
}

#[test]
fn build_rejects_malformed_size() {
    potholekit()
        .args(["build", ".", "--size", "224"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("WIDTHxHEIGHT"));
}

#[test]
fn build_rejects_oversized_output() {
    potholekit()
        .args(["build", ".", "--size", "3000000000x10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at most 16384"));
}

#[test]
fn build_rejects_threshold_out_of_range() {
    potholekit()
        .args(["build", ".", "--threshold", "1.5"])
        .assert()
        .failure();
}

// export

#[test]
fn export_writes_unified_json() {
    let temp = tempfile::tempdir().expect("create temp dir");
    common::create_voc_dataset(temp.path());
    let out = temp.path().join("export/annotations.json");

    potholekit()
        .arg("export")
        .arg(temp.path())
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 3 annotations for 2 images"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).expect("read export")).expect("valid json");
    assert_eq!(json["road_a.png"][1]["bbox"]["xmin"], 200);
    assert_eq!(json["road_b.png"][0]["class"], "pothole");
}

// run

#[test]
fn run_without_images_prints_download_instructions() {
    let temp = tempfile::tempdir().expect("create temp dir");

    potholekit()
        .arg("run")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Dataset not found!"))
        .stdout(predicate::str::contains(
            "kaggle datasets download -d chitholian/annotated-potholes-dataset",
        ));
}

#[test]
fn run_analyzes_and_builds() {
    let temp = tempfile::tempdir().expect("create temp dir");
    common::create_voc_dataset(temp.path());

    potholekit()
        .arg("run")
        .arg(temp.path())
        .args(["--size", "24x24", "--seed", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dataset Analysis:"))
        .stdout(predicate::str::contains("Pothole images: 3"));

    assert_eq!(
        common::count_files(&temp.path().join("processed/classification/pothole")),
        3
    );
}
