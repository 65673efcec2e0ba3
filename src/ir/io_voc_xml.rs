//! Pascal VOC XML reader.
//!
//! Each XML file describes exactly one image. Only the fields the corpus
//! builder needs are read: `<filename>` and, per `<object>`, `<name>` plus
//! the four `<bndbox>` corners. Any of those missing is a hard error for the
//! file; other VOC fields (`<size>`, `<pose>`, `<difficult>` ...) are ignored.

use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::Node;

use super::model::{Annotation, AnnotationMap};
use super::BoundingBox;
use crate::error::PotholeError;

/// Read one VOC XML file into a single-image annotation map.
pub fn read_voc_file(path: &Path) -> Result<AnnotationMap, PotholeError> {
    let xml = fs::read_to_string(path).map_err(PotholeError::Io)?;
    parse_voc_xml_str(&xml, path)
}

/// Parse VOC XML from a UTF-8 string.
///
/// This helper is primarily useful for testing/fuzzing parse behavior in-memory.
pub fn from_voc_xml_str(xml: &str) -> Result<AnnotationMap, PotholeError> {
    parse_voc_xml_str(xml, Path::new("<memory>"))
}

/// Parse VOC XML from bytes.
///
/// The input must be valid UTF-8.
pub fn from_voc_xml_slice(bytes: &[u8]) -> Result<AnnotationMap, PotholeError> {
    let xml = std::str::from_utf8(bytes).map_err(|source| PotholeError::VocXmlParse {
        path: PathBuf::from("<memory>"),
        message: format!("input is not valid UTF-8: {source}"),
    })?;
    from_voc_xml_str(xml)
}

fn parse_voc_xml_str(xml: &str, path: &Path) -> Result<AnnotationMap, PotholeError> {
    let document =
        roxmltree::Document::parse(xml).map_err(|source| PotholeError::VocXmlParse {
            path: path.to_path_buf(),
            message: source.to_string(),
        })?;

    let root = document.root_element();
    let filename = required_child_text(root, "filename", path, "<annotation>")?;

    let mut annotations = Vec::new();
    for object in root
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == "object")
    {
        let name = required_child_text(object, "name", path, "<object>")?;
        let bndbox = required_child_element(object, "bndbox", path, "<object>")?;

        let xmin = parse_required_i64(bndbox, "xmin", path)?;
        let ymin = parse_required_i64(bndbox, "ymin", path)?;
        let xmax = parse_required_i64(bndbox, "xmax", path)?;
        let ymax = parse_required_i64(bndbox, "ymax", path)?;

        annotations.push(Annotation::new(
            name,
            BoundingBox::new(xmin, ymin, xmax, ymax),
        ));
    }

    let mut map = AnnotationMap::new();
    map.insert(filename, annotations);
    Ok(map)
}

fn required_child_element<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<Node<'a, 'input>, PotholeError> {
    child_element(node, tag).ok_or_else(|| PotholeError::VocXmlParse {
        path: path.to_path_buf(),
        message: format!("missing <{tag}> in {context}"),
    })
}

fn required_child_text(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<String, PotholeError> {
    optional_child_text(node, tag).ok_or_else(|| PotholeError::VocXmlParse {
        path: path.to_path_buf(),
        message: format!("missing <{tag}> in {context}"),
    })
}

/// Box corners must be integer-valued; `"12"` and `"12.0"` are accepted,
/// `"12.5"` is rejected rather than rounded.
fn parse_required_i64(node: Node<'_, '_>, tag: &str, path: &Path) -> Result<i64, PotholeError> {
    let raw = required_child_text(node, tag, path, "<bndbox>")?;
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(value);
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => Ok(value as i64),
        _ => Err(PotholeError::VocXmlParse {
            path: path.to_path_buf(),
            message: format!("invalid <{tag}> value '{raw}' in <bndbox>; expected integer"),
        }),
    }
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == tag)
}

fn optional_child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    child_element(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}
