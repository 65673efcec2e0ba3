//! YOLO-style `.txt` label reader.
//!
//! One label file per image, one `class_id cx cy w h` row per box, all
//! values normalized to the image size. The image is found next door under
//! `images/` by file stem, and its pixel size is read from the header only.
//! Class names come from `classes.txt` in the annotations directory when
//! present (line N names class N), otherwise `class_<id>`.

use std::fs;
use std::path::{Path, PathBuf};

use super::model::{Annotation, AnnotationMap};
use super::BoundingBox;
use crate::error::PotholeError;

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "png", "jpeg", "bmp", "webp"];

/// File name of the class list that may sit beside the label files.
pub const CLASSES_FILE_NAME: &str = "classes.txt";

#[derive(Debug, PartialEq)]
struct YoloLabelRow {
    class_id: usize,
    cx: f64,
    cy: f64,
    w: f64,
    h: f64,
}

/// Class names indexed by YOLO class id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct YoloClassMap {
    names: Vec<String>,
}

impl YoloClassMap {
    /// Reads `classes.txt` from `annotations_dir` if it exists.
    pub fn load(annotations_dir: &Path) -> Result<Self, PotholeError> {
        let path = annotations_dir.join(CLASSES_FILE_NAME);
        if !path.is_file() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(PotholeError::Io)?;
        let mut names = Vec::new();

        // Line N names class N, so a blank line would shift every later id.
        for (line_idx, line) in content.trim_end().lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return Err(PotholeError::YoloClassesInvalid {
                    path: path.clone(),
                    message: format!("line {} is empty", line_idx + 1),
                });
            }
            names.push(trimmed.to_string());
        }

        Ok(Self { names })
    }

    /// Name for a class id: listed name if any, otherwise `class_<id>`.
    pub fn name(&self, class_id: usize) -> String {
        self.names
            .get(class_id)
            .cloned()
            .unwrap_or_else(|| format!("class_{class_id}"))
    }
}

/// Reads one YOLO label file into a single-image annotation map.
///
/// The map key is the matching image's file name relative to `images_dir`.
pub fn read_yolo_label_file(
    label_path: &Path,
    images_dir: &Path,
    classes: &YoloClassMap,
) -> Result<AnnotationMap, PotholeError> {
    let image_path =
        find_image_for_label(images_dir, label_path).ok_or_else(|| {
            PotholeError::YoloImageNotFound {
                label_path: label_path.to_path_buf(),
            }
        })?;
    let (width, height) = read_image_dimensions(&image_path)?;

    let content = fs::read_to_string(label_path).map_err(PotholeError::Io)?;
    let mut annotations = Vec::new();
    for (line_idx, line) in content.lines().enumerate() {
        let Some(row) = parse_label_line(line, label_path, line_idx + 1)? else {
            continue;
        };
        annotations.push(Annotation::new(
            classes.name(row.class_id),
            BoundingBox::from_normalized_cxcywh(row.cx, row.cy, row.w, row.h, width, height),
        ));
    }

    let image_name = image_path
        .strip_prefix(images_dir)
        .unwrap_or(&image_path)
        .to_string_lossy()
        .replace('\\', "/");

    let mut map = AnnotationMap::new();
    map.insert(image_name, annotations);
    Ok(map)
}

fn read_image_dimensions(path: &Path) -> Result<(u32, u32), PotholeError> {
    let size = imagesize::size(path).map_err(|source| PotholeError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    let width: u32 = size
        .width
        .try_into()
        .map_err(|_| PotholeError::YoloLabelParse {
            path: path.to_path_buf(),
            line: 0,
            message: format!("image width {} does not fit in u32", size.width),
        })?;

    let height: u32 = size
        .height
        .try_into()
        .map_err(|_| PotholeError::YoloLabelParse {
            path: path.to_path_buf(),
            line: 0,
            message: format!("image height {} does not fit in u32", size.height),
        })?;

    Ok((width, height))
}

fn find_image_for_label(images_dir: &Path, label_path: &Path) -> Option<PathBuf> {
    let stem = label_path.file_stem()?;
    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| {
            // Not `with_extension`: stems may themselves contain dots.
            let mut name = stem.to_os_string();
            name.push(".");
            name.push(ext);
            images_dir.join(name)
        })
        .find(|candidate| candidate.is_file())
}

fn parse_label_line(
    line: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<Option<YoloLabelRow>, PotholeError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // Take at most 6 tokens so pathological inputs do not allocate unbounded memory.
    let tokens: Vec<&str> = trimmed.split_whitespace().take(6).collect();

    if tokens.len() != 5 {
        return Err(PotholeError::YoloLabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!(
                "expected 5 tokens (class_id cx cy w h), found {}{}",
                tokens.len(),
                if tokens.len() > 5 { "+" } else { "" }
            ),
        });
    }

    let class_id = tokens[0]
        .parse::<usize>()
        .map_err(|_| PotholeError::YoloLabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!(
                "invalid class_id '{}'; expected non-negative integer",
                tokens[0]
            ),
        })?;

    Ok(Some(YoloLabelRow {
        class_id,
        cx: parse_f64_token(tokens[1], "x_center", file_path, line_num)?,
        cy: parse_f64_token(tokens[2], "y_center", file_path, line_num)?,
        w: parse_f64_token(tokens[3], "width", file_path, line_num)?,
        h: parse_f64_token(tokens[4], "height", file_path, line_num)?,
    }))
}

/// Fuzz-only entrypoint for YOLO single-line parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_label_line(input: &str) -> Result<(), PotholeError> {
    let _ = parse_label_line(input, Path::new("<fuzz>"), 1)?;
    Ok(())
}

fn parse_f64_token(
    raw: &str,
    field_name: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<f64, PotholeError> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(PotholeError::YoloLabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!("invalid {field_name} '{raw}'; expected floating-point number"),
        }),
    }
}
