//! COCO JSON reader.
//!
//! COCO bounding boxes use `[x, y, width, height]` with `(x, y)` the top-left
//! corner in absolute pixels; they are converted to XYXY on read.
//!
//! # Category lookup
//!
//! The category name of an annotation is taken **by position**:
//! `categories[category_id - 1].name`. This matches the dataset this crate
//! was built for, where ids are dense and 1-based. Sparse or 0-based id sets
//! silently resolve to the wrong name (e.g. ids `[0, 1]` map id `1` to the
//! first entry). A warning is logged when the category ids are not exactly
//! `1..=n`, and an id with no entry at that position is an error.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::warn;
use serde::Deserialize;

use super::model::{Annotation, AnnotationMap};
use super::BoundingBox;
use crate::error::PotholeError;

// ============================================================================
// COCO Schema Types (internal to this module)
// ============================================================================

/// Top-level COCO structure.
///
/// `images` and `annotations` are optional only so that non-COCO JSON files
/// can be recognised and skipped instead of rejected.
#[derive(Debug, Deserialize)]
struct CocoFile {
    #[serde(default)]
    images: Option<Vec<CocoImage>>,

    #[serde(default)]
    annotations: Option<Vec<CocoAnnotation>>,

    #[serde(default)]
    categories: Option<Vec<CocoCategory>>,
}

#[derive(Debug, Deserialize)]
struct CocoImage {
    id: u64,
    file_name: String,
}

#[derive(Debug, Deserialize)]
struct CocoCategory {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CocoAnnotation {
    image_id: u64,
    category_id: i64,

    /// COCO bbox format: [x, y, width, height] with (x,y) as top-left corner
    bbox: [f64; 4],
}

// ============================================================================
// Public API
// ============================================================================

/// Reads a COCO JSON file.
///
/// Returns `Ok(None)` for JSON that is not COCO-shaped (no top-level
/// `images` or `annotations`).
///
/// # Errors
/// Returns an error if the file cannot be read, is not valid JSON, or is
/// COCO-shaped but lacks `categories` or references unknown images or
/// category positions.
pub fn read_coco_json(path: &Path) -> Result<Option<AnnotationMap>, PotholeError> {
    let file = File::open(path).map_err(PotholeError::Io)?;
    let reader = BufReader::new(file);

    let coco: CocoFile =
        serde_json::from_reader(reader).map_err(|source| PotholeError::CocoJsonParse {
            path: path.to_path_buf(),
            source,
        })?;

    coco_to_map(coco, path)
}

/// Reads a COCO JSON string.
///
/// Useful for testing without file I/O.
pub fn from_coco_str(json: &str) -> Result<Option<AnnotationMap>, PotholeError> {
    let path = Path::new("<memory>");
    let coco: CocoFile =
        serde_json::from_str(json).map_err(|source| PotholeError::CocoJsonParse {
            path: path.to_path_buf(),
            source,
        })?;
    coco_to_map(coco, path)
}

/// Reads a COCO JSON byte slice.
///
/// Useful for fuzzing and processing raw bytes without UTF-8 validation overhead.
pub fn from_coco_slice(bytes: &[u8]) -> Result<Option<AnnotationMap>, PotholeError> {
    let path = Path::new("<bytes>");
    let coco: CocoFile =
        serde_json::from_slice(bytes).map_err(|source| PotholeError::CocoJsonParse {
            path: path.to_path_buf(),
            source,
        })?;
    coco_to_map(coco, path)
}

// ============================================================================
// Conversion: COCO -> AnnotationMap
// ============================================================================

fn coco_to_map(coco: CocoFile, path: &Path) -> Result<Option<AnnotationMap>, PotholeError> {
    let (Some(images), Some(annotations)) = (coco.images, coco.annotations) else {
        warn!(
            "{} has no top-level 'images'/'annotations'; not a COCO file, skipping",
            path.display()
        );
        return Ok(None);
    };

    let categories = coco.categories.ok_or_else(|| PotholeError::CocoJsonInvalid {
        path: path.to_path_buf(),
        message: "missing top-level 'categories'".to_string(),
    })?;

    if !categories_are_dense_one_based(&categories) {
        warn!(
            "{}: category ids are not 1..={}; names are looked up by position and may be mislabeled",
            path.display(),
            categories.len()
        );
    }

    let file_name_by_id: HashMap<u64, String> = images
        .into_iter()
        .map(|img| (img.id, img.file_name))
        .collect();

    let mut map = AnnotationMap::new();
    for (index, ann) in annotations.into_iter().enumerate() {
        let file_name =
            file_name_by_id
                .get(&ann.image_id)
                .ok_or_else(|| PotholeError::CocoJsonInvalid {
                    path: path.to_path_buf(),
                    message: format!(
                        "annotation {} references unknown image_id {}",
                        index, ann.image_id
                    ),
                })?;

        let category = category_by_position(&categories, ann.category_id).ok_or_else(|| {
            PotholeError::CocoJsonInvalid {
                path: path.to_path_buf(),
                message: format!(
                    "annotation {} has category_id {} but only {} categories are listed",
                    index,
                    ann.category_id,
                    categories.len()
                ),
            }
        })?;

        let [x, y, w, h] = ann.bbox;
        map.push(
            file_name.clone(),
            Annotation::new(category.name.clone(), BoundingBox::from_xywh(x, y, w, h)),
        );
    }

    Ok(Some(map))
}

fn category_by_position(categories: &[CocoCategory], category_id: i64) -> Option<&CocoCategory> {
    let index = usize::try_from(category_id.checked_sub(1)?).ok()?;
    categories.get(index)
}

fn categories_are_dense_one_based(categories: &[CocoCategory]) -> bool {
    categories
        .iter()
        .enumerate()
        .all(|(index, category)| category.id == index as i64 + 1)
}
