//! Unified annotation model.
//!
//! Every reader converts its source format into an [`AnnotationMap`], and
//! every downstream stage (dataset builder, analyzer, JSON export) consumes
//! only this representation.

use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

use super::bbox::BoundingBox;

/// One labeled region within one image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Class label exactly as written in the source file.
    ///
    /// Case is preserved here; the analyzer lower-cases for aggregation.
    #[serde(rename = "class")]
    pub class_label: String,

    /// Pixel-space bounding box.
    pub bbox: BoundingBox,
}

impl Annotation {
    /// Creates a new annotation.
    pub fn new(class_label: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            class_label: class_label.into(),
            bbox,
        }
    }
}

/// Mapping from image file name to its annotations, in source-file order.
///
/// Keys are kept sorted so that iteration (and therefore output file
/// numbering) is deterministic regardless of which reader produced the map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationMap {
    images: BTreeMap<String, Vec<Annotation>>,
}

impl AnnotationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an annotation to an image, creating the entry if needed.
    pub fn push(&mut self, file_name: impl Into<String>, annotation: Annotation) {
        self.images
            .entry(file_name.into())
            .or_default()
            .push(annotation);
    }

    /// Sets the full annotation list of an image, replacing any previous one.
    pub fn insert(&mut self, file_name: impl Into<String>, annotations: Vec<Annotation>) {
        self.images.insert(file_name.into(), annotations);
    }

    /// Merges `other` into `self`. Entries from `other` win on duplicate
    /// file names (the whole list is replaced, not concatenated).
    pub fn merge(&mut self, other: AnnotationMap) {
        self.images.extend(other.images);
    }

    /// Annotations of one image, if present.
    pub fn get(&self, file_name: &str) -> Option<&[Annotation]> {
        self.images.get(file_name).map(Vec::as_slice)
    }

    /// Number of images (keys).
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Total number of annotations across all images.
    pub fn annotation_count(&self) -> usize {
        self.images.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Iterates `(file_name, annotations)` pairs in file-name order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.images.iter(),
        }
    }
}

/// Iterator over the entries of an [`AnnotationMap`].
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, String, Vec<Annotation>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a [Annotation]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(name, anns)| (name.as_str(), anns.as_slice()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a AnnotationMap {
    type Item = (&'a str, &'a [Annotation]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The foreground boxes of one image, used as the exclusion set when
/// sampling background regions.
pub fn bounding_boxes(annotations: &[Annotation]) -> Vec<BoundingBox> {
    annotations.iter().map(|ann| ann.bbox).collect()
}
