//! Background (negative) sample generation.
//!
//! Negatives are drawn by rejection sampling: pick a random region twice the
//! output size, reject it if a foreground box covers too much of it, keep it
//! otherwise. The number of draws per image is capped, so an image crowded
//! with potholes simply yields fewer negatives.

use image::imageops::FilterType;
use image::DynamicImage;
use log::warn;
use rand::{Rng, RngExt};

use crate::ir::{overlaps, BoundingBox, DEFAULT_OVERLAP_THRESHOLD};

/// Maximum number of random draws per image.
pub const MAX_ATTEMPTS: usize = 50;

/// Negatives requested per foreground box.
pub const NEGATIVES_PER_BOX: usize = 2;

/// Filter used when scaling crops to the output size.
///
/// `Triangle` widens its support with the scale factor when downscaling, so
/// every source pixel contributes (area-style averaging).
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Negative sampling options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NegativeSampleOptions {
    pub output_width: u32,
    pub output_height: u32,
    pub overlap_threshold: f64,
}

impl NegativeSampleOptions {
    pub fn new(output_width: u32, output_height: u32) -> Self {
        Self {
            output_width,
            output_height,
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
        }
    }

    /// Size of the region drawn from the source image before resizing, or
    /// `None` when twice the output size does not fit in `u32`.
    pub fn region_size(&self) -> Option<(u32, u32)> {
        Some((
            self.output_width.checked_mul(2)?,
            self.output_height.checked_mul(2)?,
        ))
    }
}

/// One accepted background region.
#[derive(Clone, Debug)]
pub struct NegativeSample {
    /// The candidate region in source-image pixels (before clipping).
    pub region: BoundingBox,
    /// The clipped crop, resized to the output size.
    pub image: DynamicImage,
}

/// Result of sampling one image.
#[derive(Clone, Debug)]
pub struct NegativeSampling {
    /// How many negatives were asked for.
    pub target: usize,
    /// How many random draws were made.
    pub attempts: usize,
    pub samples: Vec<NegativeSample>,
}

impl NegativeSampling {
    /// True when the attempt cap ran out before the target was reached.
    pub fn is_under_produced(&self) -> bool {
        self.samples.len() < self.target
    }
}

/// Number of negatives requested for an image with `box_count` foreground boxes.
pub fn target_negative_count(box_count: usize) -> usize {
    box_count * NEGATIVES_PER_BOX
}

/// Draw up to `2 × boxes.len()` background crops from `image`.
///
/// Region origins are uniform over `0..max(1, dimension - region_size)` on
/// each axis. When the image is smaller than the region on an axis that
/// range is the single offset 0, and the crop is whatever part of the
/// region lies inside the image; it is still resized to the output size.
pub fn sample_negatives<R: Rng + ?Sized>(
    image: &DynamicImage,
    boxes: &[BoundingBox],
    opts: &NegativeSampleOptions,
    rng: &mut R,
) -> NegativeSampling {
    let target = target_negative_count(boxes.len());
    let mut samples = Vec::with_capacity(target);
    let mut attempts = 0;

    let Some((region_w, region_h)) = opts.region_size() else {
        warn!(
            "output size {}x{} is too large to sample negatives",
            opts.output_width, opts.output_height
        );
        return NegativeSampling {
            target,
            attempts,
            samples,
        };
    };

    for _ in 0..MAX_ATTEMPTS {
        if samples.len() >= target {
            break;
        }
        attempts += 1;

        let x = draw_origin(rng, image.width(), region_w);
        let y = draw_origin(rng, image.height(), region_h);
        let region = BoundingBox::new(
            x as i64,
            y as i64,
            x as i64 + region_w as i64,
            y as i64 + region_h as i64,
        );

        if overlaps(&region, boxes, opts.overlap_threshold) {
            continue;
        }

        let crop = image.crop_imm(x, y, region_w, region_h);
        if crop.width() == 0 || crop.height() == 0 {
            continue;
        }

        samples.push(NegativeSample {
            region,
            image: resize_to_output(&crop, opts.output_width, opts.output_height),
        });
    }

    NegativeSampling {
        target,
        attempts,
        samples,
    }
}

/// Uniform origin in `0..max(1, image_dim - region_dim)`.
fn draw_origin<R: Rng + ?Sized>(rng: &mut R, image_dim: u32, region_dim: u32) -> u32 {
    let upper = (image_dim as i64 - region_dim as i64).max(1);
    rng.random_range(0..upper) as u32
}

/// Resize a crop to exactly `width × height` (aspect ratio is not kept).
pub fn resize_to_output(crop: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    crop.resize_exact(width, height, RESIZE_FILTER)
}
