//! Unified annotation representation for potholekit.
//!
//! Every supported source format (Pascal VOC XML, COCO JSON, YOLO TXT,
//! flat CSV) is parsed into one [`AnnotationMap`]: image file name to an
//! ordered list of `{class, bbox}` annotations in pixel-space XYXY.
//!
//! # Design Principles
//!
//! 1. **One capability, several variants**: [`AnnotationFormat`] selects a
//!    reader by file extension; callers only ever see an `AnnotationMap`.
//!
//! 2. **Fail loudly at parse time**: a required field missing from a
//!    recognised file is an error for the whole run, never a guessed value.
//!
//! 3. **Permissive boxes**: boxes are stored as written, even when
//!    `xmin >= xmax`; the dataset builder skips crops that come out empty.
//!
//! # Example
//!
//! ```
//! use potholekit::ir::{Annotation, AnnotationMap, BoundingBox};
//!
//! let mut map = AnnotationMap::new();
//! map.push("road.jpg", Annotation::new("pothole", BoundingBox::new(10, 20, 100, 200)));
//! assert_eq!(map.annotation_count(), 1);
//! ```

mod bbox;
mod format;
pub mod io_coco_json;
pub mod io_csv;
pub mod io_json;
pub mod io_voc_xml;
pub mod io_yolo_txt;
mod model;
pub mod overlap;

// Re-export core types for convenient access
pub use bbox::BoundingBox;
pub use format::{
    discover_sources, read_annotations, AnnotationFormat, AnnotationSource, DatasetLayout,
};
pub use model::{bounding_boxes, Annotation, AnnotationMap};
pub use overlap::{overlaps, DEFAULT_OVERLAP_THRESHOLD};
