//! Flat CSV reader.
//!
//! One row per annotation. Columns are located by header name:
//! - `xmin`, `ymin`, `xmax`, `ymax`: required, absolute pixel coordinates
//! - `filename`, or `image_name` when `filename` is absent: required
//! - `class`: optional; every row is labeled `pothole` when the column is absent
//!
//! Any other columns (`width`, `height`, ...) are ignored. Coordinates may be
//! written as floats and are truncated toward zero.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::StringRecord;

use super::model::{Annotation, AnnotationMap};
use super::BoundingBox;
use crate::error::PotholeError;

/// Class label used when the CSV carries no `class` column.
pub const DEFAULT_CLASS_LABEL: &str = "pothole";

/// Resolved column positions for one CSV header.
#[derive(Debug)]
struct CsvColumns {
    filename: usize,
    class: Option<usize>,
    xmin: usize,
    ymin: usize,
    xmax: usize,
    ymax: usize,
}

/// Reads an annotation CSV file.
///
/// # Errors
/// Returns an error if the file cannot be read, a required column is
/// missing, or a coordinate cell is not numeric.
pub fn read_csv(path: &Path) -> Result<AnnotationMap, PotholeError> {
    let file = File::open(path).map_err(PotholeError::Io)?;
    read_csv_from(BufReader::new(file), path)
}

/// Reads annotations from a CSV string.
///
/// Useful for testing without file I/O.
pub fn from_csv_str(csv_str: &str) -> Result<AnnotationMap, PotholeError> {
    from_csv_slice(csv_str.as_bytes())
}

/// Reads annotations from CSV bytes.
///
/// Useful for fuzzing and processing raw bytes without requiring UTF-8 upfront.
pub fn from_csv_slice(bytes: &[u8]) -> Result<AnnotationMap, PotholeError> {
    read_csv_from(bytes, Path::new("<bytes>"))
}

fn read_csv_from<R: Read>(reader: R, path: &Path) -> Result<AnnotationMap, PotholeError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|source| PotholeError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let columns = resolve_columns(&headers, path)?;

    let mut map = AnnotationMap::new();
    for (index, result) in csv_reader.records().enumerate() {
        // Row numbers are 1-based and count the header line.
        let row = index + 2;
        let record = result.map_err(|source| PotholeError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;

        let filename = cell(&record, columns.filename, "filename", path, row)?;
        let class_label = match columns.class {
            Some(col) => cell(&record, col, "class", path, row)?.to_string(),
            None => DEFAULT_CLASS_LABEL.to_string(),
        };

        let bbox = BoundingBox::new(
            parse_coord(&record, columns.xmin, "xmin", path, row)?,
            parse_coord(&record, columns.ymin, "ymin", path, row)?,
            parse_coord(&record, columns.xmax, "xmax", path, row)?,
            parse_coord(&record, columns.ymax, "ymax", path, row)?,
        );

        map.push(filename, Annotation::new(class_label, bbox));
    }

    Ok(map)
}

fn resolve_columns(headers: &StringRecord, path: &Path) -> Result<CsvColumns, PotholeError> {
    let find = |name: &str| headers.iter().position(|h| h.trim() == name);
    let require = |name: &str| {
        find(name).ok_or_else(|| PotholeError::CsvInvalid {
            path: path.to_path_buf(),
            row: 1,
            message: format!("missing required column '{name}'"),
        })
    };

    let filename = find("filename").or_else(|| find("image_name")).ok_or_else(|| {
        PotholeError::CsvInvalid {
            path: path.to_path_buf(),
            row: 1,
            message: "missing required column 'filename' (or 'image_name')".to_string(),
        }
    })?;

    Ok(CsvColumns {
        filename,
        class: find("class"),
        xmin: require("xmin")?,
        ymin: require("ymin")?,
        xmax: require("xmax")?,
        ymax: require("ymax")?,
    })
}

fn cell<'r>(
    record: &'r StringRecord,
    col: usize,
    name: &str,
    path: &Path,
    row: usize,
) -> Result<&'r str, PotholeError> {
    record.get(col).ok_or_else(|| PotholeError::CsvInvalid {
        path: path.to_path_buf(),
        row,
        message: format!("row has no '{name}' cell"),
    })
}

fn parse_coord(
    record: &StringRecord,
    col: usize,
    name: &str,
    path: &Path,
    row: usize,
) -> Result<i64, PotholeError> {
    let raw = cell(record, col, name, path, row)?.trim();
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value as i64),
        _ => Err(PotholeError::CsvInvalid {
            path: path.to_path_buf(),
            row,
            message: format!("invalid {name} '{raw}'; expected a number"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_grouped_by_filename() {
        let csv = "filename,width,height,class,xmin,ymin,xmax,ymax
a.jpg,640,480,pothole,10,20,110,90
b.jpg,640,480,Pothole,1,2,3,4
a.jpg,640,480,pothole,200,200,260,250
";
        let map = from_csv_str(csv).expect("parse csv");

        assert_eq!(map.image_count(), 2);
        let a = map.get("a.jpg").expect("a.jpg");
        assert_eq!(a.len(), 2);
        assert_eq!(a[0].bbox, BoundingBox::new(10, 20, 110, 90));
        assert_eq!(a[1].bbox, BoundingBox::new(200, 200, 260, 250));
        assert_eq!(map.get("b.jpg").expect("b.jpg")[0].class_label, "Pothole");
    }

    #[test]
    fn image_name_column_and_default_class() {
        let csv = "image_name,xmin,ymin,xmax,ymax\nroad.png,5,6,50.9,60\n";
        let map = from_csv_str(csv).expect("parse csv");

        let anns = map.get("road.png").expect("road.png");
        assert_eq!(anns[0].class_label, DEFAULT_CLASS_LABEL);
        assert_eq!(anns[0].bbox, BoundingBox::new(5, 6, 50, 60));
    }

    #[test]
    fn filename_column_wins_over_image_name() {
        let csv = "image_name,filename,xmin,ymin,xmax,ymax\nwrong.png,right.png,0,0,1,1\n";
        let map = from_csv_str(csv).expect("parse csv");
        assert!(map.get("right.png").is_some());
        assert!(map.get("wrong.png").is_none());
    }

    #[test]
    fn missing_coordinate_column_is_an_error() {
        let csv = "filename,xmin,ymin,xmax\na.jpg,1,2,3\n";
        let err = from_csv_str(csv).unwrap_err();
        assert!(err.to_string().contains("missing required column 'ymax'"));
    }

    #[test]
    fn missing_filename_column_is_an_error() {
        let csv = "class,xmin,ymin,xmax,ymax\npothole,1,2,3,4\n";
        let err = from_csv_str(csv).unwrap_err();
        assert!(matches!(err, PotholeError::CsvInvalid { row: 1, .. }));
    }

    #[test]
    fn non_numeric_coordinate_reports_row() {
        let csv = "filename,xmin,ymin,xmax,ymax\na.jpg,1,2,3,4\nb.jpg,1,two,3,4\n";
        let err = from_csv_str(csv).unwrap_err();
        assert!(matches!(err, PotholeError::CsvInvalid { row: 3, .. }));
    }
}
