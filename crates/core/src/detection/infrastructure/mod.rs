pub mod arcface_embedder;
pub mod math;
pub mod onnx_face_analyzer;
pub mod onnx_yolo_detector;
pub mod session_factory;
