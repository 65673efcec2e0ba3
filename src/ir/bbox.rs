//! Bounding box type in pixel-space XYXY format.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box `(xmin, ymin, xmax, ymax)` in integer pixels.
///
/// Note: This type does NOT enforce that min < max in the constructor,
/// allowing "malformed" boxes to exist in the annotation map. Readers keep
/// whatever the source file says; the dataset builder is the one place that
/// rejects boxes producing an empty crop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: i64,
    pub ymin: i64,
    pub xmax: i64,
    pub ymax: i64,
}

impl BoundingBox {
    /// Creates a new bounding box from explicit coordinates.
    #[inline]
    pub fn new(xmin: i64, ymin: i64, xmax: i64, ymax: i64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Creates a box from a top-left corner and a size (COCO-style XYWH).
    ///
    /// Coordinates are summed in floating point and then truncated toward
    /// zero, so `x = 10.6, width = 20.6` yields `xmin = 10, xmax = 31`.
    #[inline]
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            xmin: x as i64,
            ymin: y as i64,
            xmax: (x + width) as i64,
            ymax: (y + height) as i64,
        }
    }

    /// Creates a box from normalized center/size values (YOLO-style).
    pub fn from_normalized_cxcywh(
        cx: f64,
        cy: f64,
        w: f64,
        h: f64,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        let iw = image_width as f64;
        let ih = image_height as f64;
        Self {
            xmin: ((cx - w / 2.0) * iw) as i64,
            ymin: ((cy - h / 2.0) * ih) as i64,
            xmax: ((cx + w / 2.0) * iw) as i64,
            ymax: ((cy + h / 2.0) * ih) as i64,
        }
    }

    /// Returns the width of the bounding box.
    ///
    /// May be negative if the box is malformed (xmax < xmin). Saturates at
    /// the `i64` range.
    #[inline]
    pub fn width(&self) -> i64 {
        self.xmax.saturating_sub(self.xmin)
    }

    /// Returns the height of the bounding box.
    ///
    /// May be negative if the box is malformed (ymax < ymin). Saturates at
    /// the `i64` range.
    #[inline]
    pub fn height(&self) -> i64 {
        self.ymax.saturating_sub(self.ymin)
    }

    /// Returns the signed area of the bounding box.
    ///
    /// Two negative extents multiply to a positive area; use
    /// [`BoundingBox::is_ordered`] to tell those apart. Areas beyond the
    /// `i64` range saturate, keeping their sign.
    #[inline]
    pub fn area(&self) -> i64 {
        let area = self.width() as i128 * self.height() as i128;
        area.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    /// Returns true if the box is properly ordered (min < max on both axes).
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.xmin < self.xmax && self.ymin < self.ymax
    }

    /// Area shared with `other`, or 0 when the boxes do not overlap with
    /// positive width and height. Saturates like [`BoundingBox::area`].
    pub fn intersection_area(&self, other: &BoundingBox) -> i64 {
        let x1 = self.xmin.max(other.xmin);
        let y1 = self.ymin.max(other.ymin);
        let x2 = self.xmax.min(other.xmax);
        let y2 = self.ymax.min(other.ymax);

        if x2 > x1 && y2 > y1 {
            x2.saturating_sub(x1).saturating_mul(y2.saturating_sub(y1))
        } else {
            0
        }
    }

    /// Clips the box to an image of the given size.
    ///
    /// Returns `None` when nothing of positive area remains.
    pub fn clip_to(&self, image_width: u32, image_height: u32) -> Option<BoundingBox> {
        let clipped = BoundingBox {
            xmin: self.xmin.clamp(0, image_width as i64),
            ymin: self.ymin.clamp(0, image_height as i64),
            xmax: self.xmax.clamp(0, image_width as i64),
            ymax: self.ymax.clamp(0, image_height as i64),
        };
        clipped.is_ordered().then_some(clipped)
    }
}
