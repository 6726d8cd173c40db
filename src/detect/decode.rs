//! Conversion of raw model output tensors into `Detection`s.
//!
//! Two output conventions are understood:
//!
//! - SSD post-processed: four tensors `boxes [1,N,4]` (normalized
//!   `ymin, xmin, ymax, xmax`), `classes [1,N]`, `scores [1,N]` and
//!   `count [1]`.
//! - Row output: a single `[1,N,6]` tensor of normalized
//!   `xmin, ymin, xmax, ymax, score, class` rows.
//!
//! Class ids are named through the caller's `LabelMap`. Coordinates are
//! clamped to the unit square and scaled to the source image, so boxes are
//! reported in the pixels of the image the caller passed in, not the resized
//! model input.

use crate::error::{BenchError, Result};

use super::labels::LabelMap;
use super::result::{BoundingBox, Category, Detection};

pub const ROW_WIDTH: usize = 6;

/// Decode SSD post-processed outputs.
pub fn decode_ssd(
    boxes: &[f32],
    classes: &[f32],
    scores: &[f32],
    count: usize,
    image_width: u32,
    image_height: u32,
    labels: LabelMap,
) -> Result<Vec<Detection>> {
    let count = count.min(scores.len());
    if classes.len() < count || boxes.len() < count * 4 {
        return Err(BenchError::Inference(format!(
            "output tensors disagree: {} boxes, {} classes, {} scores for count {}",
            boxes.len() / 4,
            classes.len(),
            scores.len(),
            count
        )));
    }

    let detections = (0..count)
        .map(|i| {
            let b = &boxes[i * 4..i * 4 + 4];
            detection(
                [b[1], b[0], b[3], b[2]],
                classes[i],
                scores[i],
                image_width,
                image_height,
                labels,
            )
        })
        .collect();
    Ok(detections)
}

/// Decode a flat `[N * 6]` row tensor.
pub fn decode_rows(
    rows: &[f32],
    image_width: u32,
    image_height: u32,
    labels: LabelMap,
) -> Result<Vec<Detection>> {
    if rows.len() % ROW_WIDTH != 0 {
        return Err(BenchError::Inference(format!(
            "row output length {} is not a multiple of {}",
            rows.len(),
            ROW_WIDTH
        )));
    }
    let detections = rows
        .chunks_exact(ROW_WIDTH)
        .map(|row| {
            detection(
                [row[0], row[1], row[2], row[3]],
                row[5],
                row[4],
                image_width,
                image_height,
                labels,
            )
        })
        .collect();
    Ok(detections)
}

fn detection(
    xyxy: [f32; 4],
    class: f32,
    score: f32,
    width: u32,
    height: u32,
    labels: LabelMap,
) -> Detection {
    let index = class.round() as i32;
    Detection {
        bounding_box: to_pixels(xyxy, width, height),
        categories: vec![Category {
            index,
            score,
            category_name: Some(labels.label(index).to_string()),
            display_name: None,
        }],
    }
}

fn to_pixels([x1, y1, x2, y2]: [f32; 4], width: u32, height: u32) -> BoundingBox {
    let clamp = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
    let (xmin, xmax) = (clamp(x1.min(x2)), clamp(x1.max(x2)));
    let (ymin, ymax) = (clamp(y1.min(y2)), clamp(y1.max(y2)));
    let (w, h) = (width as f32, height as f32);
    BoundingBox {
        origin_x: (xmin * w).round() as i32,
        origin_y: (ymin * h).round() as i32,
        width: ((xmax - xmin) * w).round() as i32,
        height: ((ymax - ymin) * h).round() as i32,
    }
}
