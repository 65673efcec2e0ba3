//! End-to-end corpus builds through the library API.

use std::fs;

use potholekit::build::{build_dataset_seeded, BuildOptions, NEGATIVE_CLASS, POSITIVE_CLASS};
use potholekit::ir::{read_annotations, Annotation, AnnotationMap, BoundingBox, DatasetLayout};
use potholekit::sample::MAX_ATTEMPTS;

mod common;

#[test]
fn one_positive_per_box_and_at_most_two_negatives() {
    let temp = tempfile::tempdir().expect("create temp dir");
    common::create_voc_dataset(temp.path());
    let layout = DatasetLayout::new(temp.path());
    let map = read_annotations(&layout).expect("parse annotations");

    let out = temp.path().join("corpus");
    let opts = BuildOptions::new(&out, 32, 24);
    let report = build_dataset_seeded(&map, &layout.images_dir, &opts, Some(17)).expect("build");

    assert_eq!(report.positives, 3);
    assert_eq!(report.images_processed, 2);
    assert_eq!(report.negatives_requested, 6);
    assert!(report.negatives_written <= 6);
    assert_eq!(common::count_files(&out.join(POSITIVE_CLASS)), 3);
    assert_eq!(
        common::count_files(&out.join(NEGATIVE_CLASS)),
        report.negatives_written
    );

    for class in [POSITIVE_CLASS, NEGATIVE_CLASS] {
        for name in common::file_names(&out.join(class)) {
            let image = image::open(out.join(class).join(&name)).expect("open output");
            assert_eq!((image.width(), image.height()), (32, 24), "{}", name);
        }
    }
}

#[test]
fn file_names_follow_image_order_and_counters() {
    let temp = tempfile::tempdir().expect("create temp dir");
    common::create_voc_dataset(temp.path());
    let layout = DatasetLayout::new(temp.path());
    let map = read_annotations(&layout).expect("parse annotations");

    let out = temp.path().join("corpus");
    let opts = BuildOptions::new(&out, 16, 16);
    build_dataset_seeded(&map, &layout.images_dir, &opts, Some(2)).expect("build");

    assert_eq!(
        common::file_names(&out.join(POSITIVE_CLASS)),
        vec![
            "pothole_000000_road_a.png",
            "pothole_000001_road_a.png",
            "pothole_000002_road_b.png",
        ]
    );

    // road_a requests negatives 0..4, road_b 4..6, however many were written.
    for name in common::file_names(&out.join(NEGATIVE_CLASS)) {
        let counter: usize = name["no_pothole_".len().."no_pothole_".len() + 6]
            .parse()
            .expect("numeric counter");
        if name.ends_with("road_a.png") {
            assert!(counter < 4, "{}", name);
        } else {
            assert!((4..6).contains(&counter), "{}", name);
        }
    }
}

#[test]
fn same_seed_same_corpus() {
    let temp = tempfile::tempdir().expect("create temp dir");
    common::create_voc_dataset(temp.path());
    let layout = DatasetLayout::new(temp.path());
    let map = read_annotations(&layout).expect("parse annotations");

    let first = temp.path().join("first");
    let second = temp.path().join("second");
    build_dataset_seeded(&map, &layout.images_dir, &BuildOptions::new(&first, 16, 16), Some(42))
        .expect("first build");
    build_dataset_seeded(&map, &layout.images_dir, &BuildOptions::new(&second, 16, 16), Some(42))
        .expect("second build");

    let names = common::file_names(&first.join(NEGATIVE_CLASS));
    assert_eq!(names, common::file_names(&second.join(NEGATIVE_CLASS)));
    for name in names {
        let a = fs::read(first.join(NEGATIVE_CLASS).join(&name)).expect("read first");
        let b = fs::read(second.join(NEGATIVE_CLASS).join(&name)).expect("read second");
        assert_eq!(a, b, "{}", name);
    }
}

#[test]
fn rebuilding_into_existing_directories_succeeds() {
    let temp = tempfile::tempdir().expect("create temp dir");
    common::create_voc_dataset(temp.path());
    let layout = DatasetLayout::new(temp.path());
    let map = read_annotations(&layout).expect("parse annotations");
    let opts = BuildOptions::new(layout.classification_dir(), 16, 16);

    build_dataset_seeded(&map, &layout.images_dir, &opts, Some(1)).expect("first build");
    let report = build_dataset_seeded(&map, &layout.images_dir, &opts, Some(1)).expect("second build");

    assert_eq!(report.positives, 3);
    assert_eq!(
        common::count_files(&layout.classification_dir().join(POSITIVE_CLASS)),
        3
    );
}

#[test]
fn missing_images_and_empty_crops_are_reported_not_fatal() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let images = temp.path().join("images");
    common::write_image(&images.join("present.png"), 120, 90);

    let mut map = AnnotationMap::new();
    map.push("absent.png", Annotation::new("pothole", BoundingBox::new(0, 0, 10, 10)));
    map.push("present.png", Annotation::new("pothole", BoundingBox::new(10, 10, 40, 40)));
    map.push("present.png", Annotation::new("pothole", BoundingBox::new(50, 50, 50, 80)));
    map.push("present.png", Annotation::new("pothole", BoundingBox::new(500, 500, 600, 600)));

    let out = temp.path().join("corpus");
    let report = build_dataset_seeded(&map, &images, &BuildOptions::new(&out, 8, 8), Some(4))
        .expect("build");

    assert_eq!(report.images_processed, 1);
    assert_eq!(report.positives, 1);
    assert_eq!(report.skipped_images.len(), 1);
    assert_eq!(report.skipped_images[0].file_name, "absent.png");
    assert_eq!(report.skipped_crops.len(), 2);
    assert_eq!(
        report.skipped_crops.iter().map(|c| c.index).collect::<Vec<_>>(),
        vec![1, 2]
    );
    // Negatives are still requested for all three boxes of present.png.
    assert_eq!(report.negatives_requested, 6);
    assert!(report.has_issues());
}

#[test]
fn crowded_image_under_produces_and_is_reported() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let images = temp.path().join("images");
    common::write_image(&images.join("crowded.png"), 100, 100);

    let mut map = AnnotationMap::new();
    map.push("crowded.png", Annotation::new("pothole", BoundingBox::new(0, 0, 100, 100)));

    let out = temp.path().join("corpus");
    let report = build_dataset_seeded(&map, &images, &BuildOptions::new(&out, 10, 10), Some(8))
        .expect("build");

    assert_eq!(report.positives, 1);
    assert_eq!(report.negatives_written, 0);
    assert_eq!(report.negative_shortfall(), 2);
    assert_eq!(report.under_produced.len(), 1);
    assert_eq!(report.under_produced[0].attempts, MAX_ATTEMPTS);
    assert_eq!(common::count_files(&out.join(NEGATIVE_CLASS)), 0);
}
