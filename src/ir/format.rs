//! Dataset layout discovery and annotation format dispatch.
//!
//! A dataset root looks like:
//!
//! ```text
//! <root>/
//! ├── images/          source photos
//! ├── annotations/     *.xml (VOC), *.json (COCO), *.txt (YOLO)
//! └── *.csv            fallback when annotations/ holds nothing usable
//! ```
//!
//! Annotation files are searched by extension in priority order XML, JSON,
//! TXT; only if none exist are root-level CSV files considered. Every file
//! found is parsed and merged, later files winning on duplicate image names.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use super::io_yolo_txt::{YoloClassMap, CLASSES_FILE_NAME};
use super::model::AnnotationMap;
use super::{io_coco_json, io_csv, io_voc_xml, io_yolo_txt};
use crate::error::PotholeError;

/// The on-disk annotation formats understood by the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnnotationFormat {
    /// Pascal VOC, one XML file per image.
    VocXml,
    /// COCO JSON, one file covering many images.
    CocoJson,
    /// YOLO label file, one per image.
    YoloTxt,
    /// Flat CSV, one row per annotation.
    Csv,
}

impl AnnotationFormat {
    /// Formats looked for inside `annotations/`, highest priority first.
    pub const ANNOTATION_DIR_PRIORITY: [AnnotationFormat; 3] = [
        AnnotationFormat::VocXml,
        AnnotationFormat::CocoJson,
        AnnotationFormat::YoloTxt,
    ];

    /// File extension (without the dot) that selects this format.
    pub fn extension(self) -> &'static str {
        match self {
            AnnotationFormat::VocXml => "xml",
            AnnotationFormat::CocoJson => "json",
            AnnotationFormat::YoloTxt => "txt",
            AnnotationFormat::Csv => "csv",
        }
    }

    /// Detects the format of a file from its extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        [
            AnnotationFormat::VocXml,
            AnnotationFormat::CocoJson,
            AnnotationFormat::YoloTxt,
            AnnotationFormat::Csv,
        ]
        .into_iter()
        .find(|format| ext.eq_ignore_ascii_case(format.extension()))
    }

    /// Parses one file of this format.
    ///
    /// Returns `Ok(None)` for files that are recognised by extension but
    /// carry no annotation data of this format (non-COCO JSON).
    pub fn parse(
        self,
        path: &Path,
        layout: &DatasetLayout,
        classes: &YoloClassMap,
    ) -> Result<Option<AnnotationMap>, PotholeError> {
        match self {
            AnnotationFormat::VocXml => io_voc_xml::read_voc_file(path).map(Some),
            AnnotationFormat::CocoJson => io_coco_json::read_coco_json(path),
            AnnotationFormat::YoloTxt => {
                io_yolo_txt::read_yolo_label_file(path, &layout.images_dir, classes).map(Some)
            }
            AnnotationFormat::Csv => io_csv::read_csv(path).map(Some),
        }
    }
}

impl fmt::Display for AnnotationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnnotationFormat::VocXml => "voc-xml",
            AnnotationFormat::CocoJson => "coco-json",
            AnnotationFormat::YoloTxt => "yolo-txt",
            AnnotationFormat::Csv => "csv",
        };
        f.write_str(name)
    }
}

/// Well-known directories of a dataset root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetLayout {
    pub root: PathBuf,
    pub images_dir: PathBuf,
    pub annotations_dir: PathBuf,
    pub processed_dir: PathBuf,
}

impl DatasetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            images_dir: root.join("images"),
            annotations_dir: root.join("annotations"),
            processed_dir: root.join("processed"),
            root,
        }
    }

    /// Default output directory of the classification corpus.
    pub fn classification_dir(&self) -> PathBuf {
        self.processed_dir.join("classification")
    }
}

/// One annotation file selected for parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationSource {
    pub format: AnnotationFormat,
    pub path: PathBuf,
}

/// Finds every annotation file of a dataset, in parse order.
///
/// # Errors
/// Returns [`PotholeError::NoAnnotations`] when neither `annotations/` nor
/// the root holds a recognised file.
pub fn discover_sources(layout: &DatasetLayout) -> Result<Vec<AnnotationSource>, PotholeError> {
    let mut sources = Vec::new();

    if layout.annotations_dir.is_dir() {
        for format in AnnotationFormat::ANNOTATION_DIR_PRIORITY {
            let files = collect_files(&layout.annotations_dir, format)?;
            debug!(
                "found {} {} file(s) in {}",
                files.len(),
                format,
                layout.annotations_dir.display()
            );
            sources.extend(files.into_iter().map(|path| AnnotationSource { format, path }));
        }
    }

    if sources.is_empty() {
        info!(
            "no annotation files in {}; checking for CSV files in {}",
            layout.annotations_dir.display(),
            layout.root.display()
        );
        if layout.root.is_dir() {
            sources.extend(
                collect_files(&layout.root, AnnotationFormat::Csv)?
                    .into_iter()
                    .map(|path| AnnotationSource {
                        format: AnnotationFormat::Csv,
                        path,
                    }),
            );
        }
    }

    if sources.is_empty() {
        return Err(PotholeError::NoAnnotations {
            searched: vec![layout.annotations_dir.clone(), layout.root.clone()],
        });
    }

    Ok(sources)
}

/// Parses and merges every annotation file of a dataset.
///
/// Any format error aborts the whole parse.
pub fn read_annotations(layout: &DatasetLayout) -> Result<AnnotationMap, PotholeError> {
    let sources = discover_sources(layout)?;
    let classes = YoloClassMap::load(&layout.annotations_dir)?;

    let mut merged = AnnotationMap::new();
    for source in &sources {
        debug!("parsing {} as {}", source.path.display(), source.format);
        if let Some(map) = source.format.parse(&source.path, layout, &classes)? {
            merged.merge(map);
        }
    }

    info!(
        "parsed {} annotation file(s): {} image(s), {} annotation(s)",
        sources.len(),
        merged.image_count(),
        merged.annotation_count()
    );
    Ok(merged)
}

/// Files of one format directly inside `dir`, sorted by file name.
///
/// The scan is flat; nested files are reported and skipped.
fn collect_files(dir: &Path, format: AnnotationFormat) -> Result<Vec<PathBuf>, PotholeError> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir).map_err(PotholeError::Io)? {
        let entry = entry.map_err(PotholeError::Io)?;
        let path = entry.path();
        if path.is_file()
            && AnnotationFormat::from_path(&path) == Some(format)
            && !is_classes_file(&path)
        {
            files.push(path);
        }
    }

    files.sort_by_cached_key(|path| {
        path.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    });

    let nested: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .min_depth(2)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| {
            entry.file_type().is_file()
                && AnnotationFormat::from_path(entry.path()) == Some(format)
        })
        .map(|entry| entry.into_path())
        .collect();

    if let Some(sample) = nested.first() {
        warn!(
            "annotation scan of {} is flat (non-recursive); skipping {} nested .{} file(s), e.g. {}",
            dir.display(),
            nested.len(),
            format.extension(),
            sample.display()
        );
    }

    Ok(files)
}

fn is_classes_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.eq_ignore_ascii_case(CLASSES_FILE_NAME))
        .unwrap_or(false)
}
