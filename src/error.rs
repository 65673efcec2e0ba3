use std::path::PathBuf;
use thiserror::Error;

/// The main error type for potholekit operations.
///
/// Parse-time variants abort a run. [`PotholeError::ImageRead`] and
/// [`PotholeError::EmptyCrop`] are recoverable: the dataset builder records
/// them on its report and moves on to the next image or annotation.
#[derive(Debug, Error)]
pub enum PotholeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- not found -------------------------------------------------------
    #[error("No annotations found (searched {})", format_paths(.searched))]
    NoAnnotations { searched: Vec<PathBuf> },

    #[error("Images directory not found: {path}")]
    ImagesDirMissing { path: PathBuf },

    // --- format ----------------------------------------------------------
    #[error("Failed to parse VOC XML {path}: {message}")]
    VocXmlParse { path: PathBuf, message: String },

    #[error("Failed to parse COCO JSON from {path}: {source}")]
    CocoJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid COCO JSON {path}: {message}")]
    CocoJsonInvalid { path: PathBuf, message: String },

    #[error("Failed to parse CSV from {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid CSV {path} (row {row}): {message}")]
    CsvInvalid {
        path: PathBuf,
        row: usize,
        message: String,
    },

    #[error("Failed to parse YOLO label file {path}:{line}: {message}")]
    YoloLabelParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Invalid YOLO classes file {path}: {message}")]
    YoloClassesInvalid { path: PathBuf, message: String },

    #[error("No image found for YOLO label file {label_path}")]
    YoloImageNotFound { label_path: PathBuf },

    #[error("Failed to parse annotation JSON from {path}: {source}")]
    AnnotationJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read image dimensions from {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    // --- per-image, recoverable ------------------------------------------
    #[error("Failed to read image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Annotation {index} of '{file_name}' produces an empty crop")]
    EmptyCrop { file_name: String, index: usize },

    // --- analysis --------------------------------------------------------
    #[error("Annotation map is empty; per-image statistics are undefined")]
    EmptyAnnotationMap,

    // --- output / configuration ------------------------------------------
    #[error("Failed to write image {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write JSON to {path}: {source}")]
    JsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PotholeError {
    /// Returns true for errors the dataset builder skips instead of aborting on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PotholeError::ImageRead { .. } | PotholeError::EmptyCrop { .. }
        )
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
