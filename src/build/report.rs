//! Build report types.
//!
//! The report is the single place where recoverable problems of a build
//! (unreadable images, empty crops, short negative yields) end up, so the
//! caller can see exactly what the corpus is missing.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::ir::BoundingBox;

/// Summary of one classification-corpus build.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BuildReport {
    /// Directory holding the `pothole/` and `no_pothole/` subdirectories.
    pub classification_dir: PathBuf,
    /// Images that were loaded and processed.
    pub images_processed: usize,
    /// Positive crops written.
    pub positives: usize,
    /// Negatives asked of the sampler (two per foreground box).
    pub negatives_requested: usize,
    /// Negatives actually written.
    pub negatives_written: usize,
    /// Images skipped because they were missing or unreadable.
    pub skipped_images: Vec<SkippedImage>,
    /// Annotations skipped because their crop had no area.
    pub skipped_crops: Vec<SkippedCrop>,
    /// Images where the sampler hit its attempt cap before the target.
    pub under_produced: Vec<UnderProducedImage>,
}

/// An image the builder could not use.
#[derive(Clone, Debug, Serialize)]
pub struct SkippedImage {
    pub file_name: String,
    pub reason: String,
}

/// An annotation whose crop came out empty.
#[derive(Clone, Debug, Serialize)]
pub struct SkippedCrop {
    pub file_name: String,
    /// Position of the annotation within its image's list.
    pub index: usize,
    pub bbox: BoundingBox,
}

/// An image that produced fewer negatives than requested.
#[derive(Clone, Debug, Serialize)]
pub struct UnderProducedImage {
    pub file_name: String,
    pub requested: usize,
    pub written: usize,
    pub attempts: usize,
}

impl BuildReport {
    pub fn new(classification_dir: impl Into<PathBuf>) -> Self {
        Self {
            classification_dir: classification_dir.into(),
            ..Default::default()
        }
    }

    /// Negatives requested but not produced, summed over all images.
    pub fn negative_shortfall(&self) -> usize {
        self.negatives_requested
            .saturating_sub(self.negatives_written)
    }

    /// True if anything was skipped or fell short.
    pub fn has_issues(&self) -> bool {
        !self.skipped_images.is_empty()
            || !self.skipped_crops.is_empty()
            || !self.under_produced.is_empty()
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created classification dataset:")?;
        writeln!(f, "  Pothole images: {}", self.positives)?;
        writeln!(
            f,
            "  No pothole images: {} (requested {})",
            self.negatives_written, self.negatives_requested
        )?;
        writeln!(f, "  Source images processed: {}", self.images_processed)?;
        writeln!(f, "  Output: {}", self.classification_dir.display())?;

        if !self.skipped_images.is_empty() {
            writeln!(f)?;
            writeln!(f, "Skipped images ({}):", self.skipped_images.len())?;
            for skipped in &self.skipped_images {
                writeln!(f, "  - {}: {}", skipped.file_name, skipped.reason)?;
            }
        }

        if !self.skipped_crops.is_empty() {
            writeln!(f)?;
            writeln!(f, "Empty crops ({}):", self.skipped_crops.len())?;
            for crop in &self.skipped_crops {
                let b = crop.bbox;
                writeln!(
                    f,
                    "  - {} #{}: ({}, {}, {}, {})",
                    crop.file_name, crop.index, b.xmin, b.ymin, b.xmax, b.ymax
                )?;
            }
        }

        if !self.under_produced.is_empty() {
            writeln!(f)?;
            writeln!(
                f,
                "Negative sampling fell short on {} image(s) ({} missing):",
                self.under_produced.len(),
                self.negative_shortfall()
            )?;
            for image in &self.under_produced {
                writeln!(
                    f,
                    "  - {}: {} of {} after {} attempts",
                    image.file_name, image.written, image.requested, image.attempts
                )?;
            }
        }

        Ok(())
    }
}
