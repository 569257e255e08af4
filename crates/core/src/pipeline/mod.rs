pub mod classification_scheduler;
pub mod classification_stage;
pub mod dispatch_pipeline;
pub mod errors;
pub mod infrastructure;
pub mod pipeline_config;
pub mod progress_reporter;
pub mod run_summary;
pub mod sort_faces_use_case;
pub mod sorter_settings;

#[cfg(test)]
pub(crate) mod test_support;
