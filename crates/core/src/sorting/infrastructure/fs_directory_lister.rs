use std::fs;
use std::io;
use std::path::Path;

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::sorting::domain::directory_lister::DirectoryLister;

/// Lists regular files in a single directory (no recursion).
///
/// Names are sorted so runs are reproducible across platforms. Names that
/// are not valid UTF-8 are skipped with a warning.
pub struct FsDirectoryLister {
    extensions: Option<Vec<String>>,
}

impl FsDirectoryLister {
    /// Accept only files whose extension is in `extensions` (case-insensitive).
    pub fn with_extensions<S: AsRef<str>>(extensions: &[S]) -> Self {
        Self {
            extensions: Some(
                extensions
                    .iter()
                    .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                    .collect(),
            ),
        }
    }

    /// Accept common still-image formats.
    pub fn images() -> Self {
        Self::with_extensions(IMAGE_EXTENSIONS)
    }

    /// Accept every regular file.
    pub fn all_files() -> Self {
        Self { extensions: None }
    }

    fn accepts(&self, name: &str) -> bool {
        let Some(allowed) = &self.extensions else {
            return true;
        };
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

impl Default for FsDirectoryLister {
    fn default() -> Self {
        Self::images()
    }
}

impl DirectoryLister for FsDirectoryLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    log::warn!("Skipping non UTF-8 file name {raw:?}");
                    continue;
                }
            };
            if self.accepts(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}
