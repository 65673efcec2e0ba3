#![allow(dead_code)]

use potholekit::ir::BoundingBox;
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// A well-formed box (positive width and height) inside `width × height`.
pub fn arb_bbox_within(width: u32, height: u32) -> BoxedStrategy<BoundingBox> {
    let w = width as i64;
    let h = height as i64;
    (0..w - 1, 0..h - 1)
        .prop_flat_map(move |(xmin, ymin)| {
            (Just(xmin), Just(ymin), (xmin + 1)..=w, (ymin + 1)..=h)
        })
        .prop_map(|(xmin, ymin, xmax, ymax)| BoundingBox::new(xmin, ymin, xmax, ymax))
        .boxed()
}

/// Any box, including inverted, degenerate and out-of-range ones.
pub fn arb_bbox_any() -> BoxedStrategy<BoundingBox> {
    (-500i64..2000, -500i64..2000, -500i64..2000, -500i64..2000)
        .prop_map(|(xmin, ymin, xmax, ymax)| BoundingBox::new(xmin, ymin, xmax, ymax))
        .boxed()
}

/// Image size, box list inside it and an output size.
pub fn arb_sampling_case() -> BoxedStrategy<((u32, u32), Vec<BoundingBox>, (u32, u32))> {
    (16u32..400, 16u32..400)
        .prop_flat_map(|(width, height)| {
            (
                Just((width, height)),
                prop::collection::vec(arb_bbox_within(width, height), 0..6),
                (1u32..64, 1u32..64),
            )
        })
        .boxed()
}
