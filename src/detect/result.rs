use serde::Serialize;

/// Axis-aligned box in source-image pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub origin_x: i32,
    pub origin_y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Category {
    pub index: i32,
    pub score: f32,
    pub category_name: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Detection {
    pub bounding_box: BoundingBox,
    /// Candidate labels for the box, best first.
    pub categories: Vec<Category>,
}

impl Detection {
    /// Score of the best category, or zero when none survived filtering.
    pub fn top_score(&self) -> f32 {
        self.categories.first().map(|c| c.score).unwrap_or(0.0)
    }
}

/// Output of a single `detect` call.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DetectionResult {
    pub detections: Vec<Detection>,
}
