//! Unified annotation schema in JSON.
//!
//! The schema is the serialized [`AnnotationMap`]:
//!
//! ```json
//! {"road001.jpg": [{"class": "pothole", "bbox": {"xmin": 1, "ymin": 2, "xmax": 30, "ymax": 40}}]}
//! ```
//!
//! It is what a downstream training job reads when it wants boxes instead of
//! the cropped classification corpus.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::model::AnnotationMap;
use crate::error::PotholeError;

/// Reads an annotation map from a unified-schema JSON file.
pub fn read_annotation_json(path: &Path) -> Result<AnnotationMap, PotholeError> {
    let file = File::open(path).map_err(PotholeError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| PotholeError::AnnotationJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes an annotation map as pretty-printed unified-schema JSON.
///
/// Keys come out in file-name order, so the output is deterministic.
pub fn write_annotation_json(path: &Path, map: &AnnotationMap) -> Result<(), PotholeError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(PotholeError::Io)?;
    }

    let file = File::create(path).map_err(PotholeError::Io)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, map).map_err(|source| PotholeError::JsonWrite {
        path: path.to_path_buf(),
        source,
    })?;
    writer.write_all(b"\n").map_err(PotholeError::Io)?;
    writer.flush().map_err(PotholeError::Io)
}
