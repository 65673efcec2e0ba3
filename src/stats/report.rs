//! Statistics report types and terminal formatting.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Aggregate statistics of an annotation map.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DatasetStatistics {
    /// Number of images (annotation map keys).
    pub total_images: usize,
    /// Number of annotations over all images.
    pub total_annotations: usize,
    /// `total_annotations / total_images`.
    pub average_annotations_per_image: f64,
    /// Annotation count per lower-cased class label.
    pub class_counts: BTreeMap<String, usize>,
    /// Box-area histogram.
    pub size_distribution: SizeDistribution,
}

/// Three-bucket box-area histogram.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SizeDistribution {
    /// Area below 1 000 px².
    pub small: usize,
    /// Area from 1 000 up to (not including) 5 000 px².
    pub medium: usize,
    /// Area of 5 000 px² or more.
    pub large: usize,
}

impl fmt::Display for DatasetStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset Analysis:")?;
        writeln!(f, "  Total images:      {:>8}", format_number(self.total_images))?;
        writeln!(
            f,
            "  Total annotations: {:>8}",
            format_number(self.total_annotations)
        )?;
        writeln!(
            f,
            "  Average annotations per image: {:.2}",
            self.average_annotations_per_image
        )?;

        writeln!(f)?;
        writeln!(f, "  Class distribution:")?;
        let label_width = self
            .class_counts
            .keys()
            .map(|label| label.chars().count())
            .max()
            .unwrap_or(0);
        for (label, count) in &self.class_counts {
            writeln!(
                f,
                "    {:<width$}  {:>8}  {:>5.1}%",
                label,
                format_number(*count),
                percent(*count, self.total_annotations),
                width = label_width
            )?;
        }

        writeln!(f)?;
        writeln!(f, "  Size distribution:")?;
        let s = &self.size_distribution;
        for (name, count) in [
            ("small  (<1000 px²)", s.small),
            ("medium (<5000 px²)", s.medium),
            ("large  (≥5000 px²)", s.large),
        ] {
            writeln!(
                f,
                "    {}  {:>8}  {:>5.1}%",
                name,
                format_number(count),
                percent(count, self.total_annotations)
            )?;
        }

        Ok(())
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Format a number with thousands separators.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}
