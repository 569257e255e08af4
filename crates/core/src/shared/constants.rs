pub const DETECTOR_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const DETECTOR_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const EMBEDDING_MODEL_NAME: &str = "w600k_r50.onnx";
pub const EMBEDDING_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/w600k_r50.onnx";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Cosine distance below which a face counts as the reference person.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.5;

/// Minimum detector score for a candidate face box.
pub const DEFAULT_DETECTOR_CONFIDENCE: f64 = 0.5;

pub const DEFAULT_CONCURRENCY: usize = 1;

/// Per-item classification deadline; a hung model call fails the item
/// instead of holding its slot forever.
pub const DEFAULT_ITEM_TIMEOUT_SECS: u64 = 120;
