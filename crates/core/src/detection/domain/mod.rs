pub mod detected_face;
pub mod face_analyzer;
pub mod face_descriptor;
