//! COCO class names, indexed by the class id a detection model emits.
//!
//! Detection exports disagree on the id space. TF Object Detection and
//! EfficientDet-Lite models emit ids from the 90-entry COCO map, which keeps
//! holes for the categories dropped from the 2017 release (cat is 16). YOLO
//! style exports use the contiguous 80-class list (cat is 15).

use serde::{Deserialize, Serialize};

use crate::error::BenchError;

pub const UNKNOWN_LABEL: &str = "???";

/// Class id space of a model's output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelMap {
    /// 90 ids with `???` holes; the map EfficientDet-Lite0 ships with.
    #[default]
    Coco90,
    /// Contiguous 80 classes.
    Coco80,
}

impl LabelMap {
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            LabelMap::Coco90 => &COCO_90,
            LabelMap::Coco80 => &COCO_80,
        }
    }

    /// Label for a class id, or `UNKNOWN_LABEL` when out of range.
    pub fn label(self, index: i32) -> &'static str {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.labels().get(i).copied())
            .unwrap_or(UNKNOWN_LABEL)
    }

    /// Class id of a category name.
    pub fn index_of(self, name: &str) -> Option<i32> {
        if name == UNKNOWN_LABEL {
            return None;
        }
        self.labels()
            .iter()
            .position(|label| *label == name)
            .and_then(|i| i32::try_from(i).ok())
    }
}

impl std::str::FromStr for LabelMap {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coco90" => Ok(LabelMap::Coco90),
            "coco80" => Ok(LabelMap::Coco80),
            other => Err(BenchError::Config(format!(
                "unknown label map '{other}' (expected coco90 or coco80)"
            ))),
        }
    }
}

/// Display name of a category in `locale`.
///
/// Only English names are bundled, so any `en` locale (`en`, `en-US`,
/// `en_GB`) gets the category name and every other locale gets `None`.
pub fn display_name(category_name: &str, locale: &str) -> Option<String> {
    let language = locale.split(['-', '_']).next().unwrap_or_default();
    if !language.eq_ignore_ascii_case("en") || category_name == UNKNOWN_LABEL {
        return None;
    }
    Some(category_name.to_string())
}

static COCO_90: [&str; 90] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    UNKNOWN_LABEL,
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    UNKNOWN_LABEL,
    "backpack",
    "umbrella",
    UNKNOWN_LABEL,
    UNKNOWN_LABEL,
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    UNKNOWN_LABEL,
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    UNKNOWN_LABEL,
    "dining table",
    UNKNOWN_LABEL,
    UNKNOWN_LABEL,
    "toilet",
    UNKNOWN_LABEL,
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    UNKNOWN_LABEL,
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

static COCO_80: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];
