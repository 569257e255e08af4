use std::path::Path;

/// Domain interface for enumerating the items of a run.
///
/// Returns bare file names, not paths.
pub trait DirectoryLister {
    fn list(&self, dir: &Path) -> std::io::Result<Vec<String>>;
}
