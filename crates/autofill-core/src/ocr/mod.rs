//! Optical character recognition over rendered page images.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Recognizes the text on one page image.
pub trait PageRecognizer: Send + Sync {
    /// Recognize text in `image`. `language` is an ISO 639-2 hint such as `eng`.
    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<String, OcrError>;
}

/// A recognized text box with its quadrilateral and score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Corner coordinates (x1, y1, x2, y2, x3, y3, x4, y4).
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Axis-aligned bounding rectangle as (min_x, min_y, max_x, max_y).
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        (
            xs.iter().copied().fold(f32::INFINITY, f32::min),
            ys.iter().copied().fold(f32::INFINITY, f32::min),
            xs.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            ys.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        )
    }
}

/// Result of OCR on one image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrResult {
    /// Boxes in reading order.
    pub boxes: Vec<TextBox>,

    /// Box texts joined into lines.
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl OcrResult {
    /// Build a result from unordered boxes: sort into reading order and join
    /// boxes on the same row with spaces, rows with newlines.
    ///
    /// Boxes are taken top to bottom. A box joins the current row when its
    /// vertical extent overlaps the row's, or when its centre lies less than
    /// half its own height from the row's centre.
    pub fn from_boxes(mut boxes: Vec<TextBox>, processing_time_ms: u64) -> Self {
        boxes.sort_by(|a, b| {
            let (ax, ay, _, _) = a.rect();
            let (bx, by, _, _) = b.rect();
            ay.total_cmp(&by).then_with(|| ax.total_cmp(&bx))
        });

        let mut rows: Vec<Row> = Vec::new();
        for text_box in boxes {
            let (_, top, _, bottom) = text_box.rect();
            match rows.last_mut() {
                Some(row) if row.takes(top, bottom) => row.push(text_box, top, bottom),
                _ => rows.push(Row {
                    top,
                    bottom,
                    boxes: vec![text_box],
                }),
            }
        }

        let mut ordered = Vec::new();
        let mut lines = Vec::with_capacity(rows.len());
        for mut row in rows {
            row.boxes.sort_by(|a, b| a.rect().0.total_cmp(&b.rect().0));
            lines.push(
                row.boxes
                    .iter()
                    .map(|b| b.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
            );
            ordered.extend(row.boxes);
        }

        Self {
            boxes: ordered,
            text: lines.join("\n"),
            processing_time_ms,
        }
    }
}

/// Boxes read as one line, with the union of their vertical extents.
struct Row {
    top: f32,
    bottom: f32,
    boxes: Vec<TextBox>,
}

impl Row {
    fn takes(&self, top: f32, bottom: f32) -> bool {
        let overlaps = top < self.bottom && bottom > self.top;
        let centre_gap = ((top + bottom) - (self.top + self.bottom)).abs() / 2.0;
        overlaps || centre_gap < (bottom - top) / 2.0
    }

    fn push(&mut self, text_box: TextBox, top: f32, bottom: f32) {
        self.top = self.top.min(top);
        self.bottom = self.bottom.max(bottom);
        self.boxes.push(text_box);
    }
}
