/// Error returned by external capabilities (decoding, detection) that run
/// on worker threads.
pub type CapabilityError = Box<dyn std::error::Error + Send + Sync>;
