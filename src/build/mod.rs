//! Classification corpus builder.
//!
//! Turns an [`AnnotationMap`] plus its source images into
//!
//! ```text
//! <output>/pothole/pothole_000000_<image>        one per annotation
//! <output>/no_pothole/no_pothole_000000_<image>  up to two per annotation
//! ```
//!
//! every file resized to the configured output size. Images are processed
//! one at a time in file-name order and dropped before the next is loaded.
//!
//! Errors follow two policies: a missing or undecodable source image and an
//! annotation whose crop is empty are recorded on the [`BuildReport`] and
//! skipped; failing to create or write an output file aborts the build.

mod report;

pub use report::{BuildReport, SkippedCrop, SkippedImage, UnderProducedImage};

use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::PotholeError;
use crate::ir::{bounding_boxes, Annotation, AnnotationMap, BoundingBox, DEFAULT_OVERLAP_THRESHOLD};
use crate::sample::{resize_to_output, sample_negatives, NegativeSampleOptions};

/// Directory and file-name prefix of positive samples.
pub const POSITIVE_CLASS: &str = "pothole";
/// Directory and file-name prefix of negative samples.
pub const NEGATIVE_CLASS: &str = "no_pothole";

/// Options for a corpus build.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildOptions {
    /// Directory receiving `pothole/` and `no_pothole/`.
    pub output_dir: PathBuf,
    pub output_width: u32,
    pub output_height: u32,
    pub overlap_threshold: f64,
}

impl BuildOptions {
    pub fn new(output_dir: impl Into<PathBuf>, output_width: u32, output_height: u32) -> Self {
        Self {
            output_dir: output_dir.into(),
            output_width,
            output_height,
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
        }
    }

    fn sample_options(&self) -> NegativeSampleOptions {
        NegativeSampleOptions {
            output_width: self.output_width,
            output_height: self.output_height,
            overlap_threshold: self.overlap_threshold,
        }
    }
}

/// Sequential output counters, one per class.
///
/// The negative counter advances by the *requested* count of each image, so
/// an image's negative file names do not depend on how many the sampler
/// managed to produce for earlier images.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SampleCounters {
    pub positive: usize,
    pub negative: usize,
}

/// Output file name `{class}_{6-digit counter}_{source file name}`.
///
/// Path separators in the source name are flattened so every sample lands
/// directly in its class directory.
pub fn sample_file_name(class: &str, counter: usize, source_file_name: &str) -> String {
    let flat = source_file_name.replace(['/', '\\'], "_");
    format!("{class}_{counter:06}_{flat}")
}

/// Build the corpus, seeding the sampler from `seed` when given.
pub fn build_dataset_seeded(
    map: &AnnotationMap,
    images_dir: &Path,
    opts: &BuildOptions,
    seed: Option<u64>,
) -> Result<BuildReport, PotholeError> {
    if let Some(seed) = seed {
        let mut rng = StdRng::seed_from_u64(seed);
        build_dataset(map, images_dir, opts, &mut rng)
    } else {
        let mut rng = rand::rng();
        build_dataset(map, images_dir, opts, &mut rng)
    }
}

/// Build the classification corpus for every image of `map` found in `images_dir`.
pub fn build_dataset<R: Rng + ?Sized>(
    map: &AnnotationMap,
    images_dir: &Path,
    opts: &BuildOptions,
    rng: &mut R,
) -> Result<BuildReport, PotholeError> {
    let positive_dir = opts.output_dir.join(POSITIVE_CLASS);
    let negative_dir = opts.output_dir.join(NEGATIVE_CLASS);
    fs::create_dir_all(&positive_dir).map_err(PotholeError::Io)?;
    fs::create_dir_all(&negative_dir).map_err(PotholeError::Io)?;

    let mut report = BuildReport::new(&opts.output_dir);
    let mut counters = SampleCounters::default();
    let sample_opts = opts.sample_options();

    for (file_name, annotations) in map {
        let image_path = images_dir.join(file_name);
        let image = match load_image(&image_path) {
            Ok(image) => image,
            Err(err) if err.is_recoverable() => {
                warn!("skipping {}: {}", file_name, err);
                report.skipped_images.push(SkippedImage {
                    file_name: file_name.to_string(),
                    reason: err.to_string(),
                });
                continue;
            }
            Err(err) => return Err(err),
        };
        report.images_processed += 1;

        write_positives(
            &image,
            file_name,
            annotations,
            &positive_dir,
            opts,
            &mut counters,
            &mut report,
        )?;

        let boxes = bounding_boxes(annotations);
        let sampling = sample_negatives(&image, &boxes, &sample_opts, rng);
        for (offset, sample) in sampling.samples.iter().enumerate() {
            let name = sample_file_name(NEGATIVE_CLASS, counters.negative + offset, file_name);
            save_image(&sample.image, &negative_dir.join(name))?;
        }

        if sampling.is_under_produced() {
            warn!(
                "{}: produced {} of {} negative samples after {} attempts",
                file_name,
                sampling.samples.len(),
                sampling.target,
                sampling.attempts
            );
            report.under_produced.push(UnderProducedImage {
                file_name: file_name.to_string(),
                requested: sampling.target,
                written: sampling.samples.len(),
                attempts: sampling.attempts,
            });
        }

        counters.negative += sampling.target;
        report.negatives_requested += sampling.target;
        report.negatives_written += sampling.samples.len();
    }

    report.positives = counters.positive;
    info!(
        "built corpus in {}: {} positive, {} of {} negative sample(s)",
        opts.output_dir.display(),
        report.positives,
        report.negatives_written,
        report.negatives_requested
    );
    Ok(report)
}

fn write_positives(
    image: &DynamicImage,
    file_name: &str,
    annotations: &[Annotation],
    positive_dir: &Path,
    opts: &BuildOptions,
    counters: &mut SampleCounters,
    report: &mut BuildReport,
) -> Result<(), PotholeError> {
    for (index, annotation) in annotations.iter().enumerate() {
        let crop = match crop_box(image, &annotation.bbox, file_name, index) {
            Ok(crop) => crop,
            Err(err) => {
                debug!("{}", err);
                report.skipped_crops.push(SkippedCrop {
                    file_name: file_name.to_string(),
                    index,
                    bbox: annotation.bbox,
                });
                continue;
            }
        };

        let resized = resize_to_output(&crop, opts.output_width, opts.output_height);
        let name = sample_file_name(POSITIVE_CLASS, counters.positive, file_name);
        save_image(&resized, &positive_dir.join(name))?;
        counters.positive += 1;
    }
    Ok(())
}

/// Crop a bounding box out of `image`.
///
/// The box is taken as-is, without padding; the part outside the image is
/// cut off. Negative starts are clamped to 0 rather than wrapping around.
/// A box with nothing of positive area inside the image is an
/// [`PotholeError::EmptyCrop`].
pub fn crop_box(
    image: &DynamicImage,
    bbox: &BoundingBox,
    file_name: &str,
    index: usize,
) -> Result<DynamicImage, PotholeError> {
    let region = bbox
        .clip_to(image.width(), image.height())
        .ok_or_else(|| PotholeError::EmptyCrop {
            file_name: file_name.to_string(),
            index,
        })?;

    Ok(image.crop_imm(
        region.xmin as u32,
        region.ymin as u32,
        region.width() as u32,
        region.height() as u32,
    ))
}

/// Load a source image as 8-bit RGB.
///
/// A missing file and a decode failure are both reported as
/// [`PotholeError::ImageRead`].
pub fn load_image(path: &Path) -> Result<DynamicImage, PotholeError> {
    let image = image::open(path).map_err(|source| PotholeError::ImageRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
}

fn save_image(image: &DynamicImage, path: &Path) -> Result<(), PotholeError> {
    image.save(path).map_err(|source| PotholeError::ImageWrite {
        path: path.to_path_buf(),
        source,
    })
}
