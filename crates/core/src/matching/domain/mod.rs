pub mod classification;
pub mod matcher;
