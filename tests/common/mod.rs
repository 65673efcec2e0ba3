#![allow(dead_code)]

use std::fs;
use std::path::Path;

use image::{Rgb, RgbImage};

/// A box in pixel corners, as written into fixtures.
pub type Corners = (i64, i64, i64, i64);

/// Write a gradient RGB image; the format follows the file extension.
pub fn write_image(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    image.save(path).expect("write image file");
}

pub fn voc_xml(file_name: &str, width: u32, height: u32, objects: &[(&str, Corners)]) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<annotation>\n  <folder>images</folder>\n  <filename>{file_name}</filename>\n  <size>\n    <width>{width}</width>\n    <height>{height}</height>\n    <depth>3</depth>\n  </size>\n"
    );
    for (name, (xmin, ymin, xmax, ymax)) in objects {
        xml.push_str(&format!(
            "  <object>\n    <name>{name}</name>\n    <difficult>0</difficult>\n    <bndbox>\n      <xmin>{xmin}</xmin>\n      <ymin>{ymin}</ymin>\n      <xmax>{xmax}</xmax>\n      <ymax>{ymax}</ymax>\n    </bndbox>\n  </object>\n"
        ));
    }
    xml.push_str("</annotation>\n");
    xml
}

pub fn write_voc_xml(path: &Path, file_name: &str, width: u32, height: u32, objects: &[(&str, Corners)]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, voc_xml(file_name, width, height, objects)).expect("write xml file");
}

/// Two annotated images in VOC layout:
///
/// - `road_a.png` (320x240) with two potholes
/// - `road_b.png` (200x160) with one pothole
pub fn create_voc_dataset(root: &Path) {
    write_image(&root.join("images/road_a.png"), 320, 240);
    write_image(&root.join("images/road_b.png"), 200, 160);

    write_voc_xml(
        &root.join("annotations/road_a.xml"),
        "road_a.png",
        320,
        240,
        &[("pothole", (10, 20, 60, 70)), ("pothole", (200, 150, 260, 230))],
    );
    write_voc_xml(
        &root.join("annotations/road_b.xml"),
        "road_b.png",
        200,
        160,
        &[("pothole", (50, 40, 90, 100))],
    );
}

/// Number of files directly inside `dir`.
pub fn count_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .expect("read dir")
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .count()
}

/// Sorted file names directly inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
