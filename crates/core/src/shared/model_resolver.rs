use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("model {name} not found in {weights_dir} or the model cache (enable model download to fetch it)")]
    Missing { name: String, weights_dir: PathBuf },
    #[error("failed to create weights directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// A named model file and the URL it can be fetched from.
pub struct ModelSource<'a> {
    pub name: &'a str,
    pub url: &'a str,
}

/// Resolve a model file by name.
///
/// Resolution order:
/// 1. The configured weights directory
/// 2. User cache directory (platform-specific), if one exists
/// 3. Download from URL into the weights directory, only when `download`
///    is set
pub fn resolve(
    source: &ModelSource<'_>,
    weights_dir: &Path,
    download: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let local = weights_dir.join(source.name);
    if local.is_file() {
        return Ok(local);
    }

    if let Some(cache_dir) = model_cache_dir() {
        let cached = cache_dir.join(source.name);
        if cached.is_file() {
            return Ok(cached);
        }
    }

    let Some(progress) = download else {
        return Err(ModelResolveError::Missing {
            name: source.name.to_string(),
            weights_dir: weights_dir.to_path_buf(),
        });
    };

    fs::create_dir_all(weights_dir).map_err(|e| ModelResolveError::CreateDir {
        path: weights_dir.to_path_buf(),
        source: e,
    })?;
    log::info!("Downloading {} from {}", source.name, source.url);
    fetch(source.url, &local, Some(progress))?;
    Ok(local)
}

/// Platform-specific model cache directory shared with other installs.
///
/// - macOS: `~/Library/Application Support/FaceSort/models/`
/// - Linux: `$XDG_CACHE_HOME/FaceSort/models/` or `~/.cache/FaceSort/models/`
/// - Windows: `%LOCALAPPDATA%/FaceSort/models/`
pub fn model_cache_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir().map(|d| d.join("FaceSort").join("models"))
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir().map(|d| d.join("FaceSort").join("models"))
    }
}

fn fetch(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let temp_path = dest.with_extension("part");

    let result = fetch_inner(url, dest, &temp_path, progress);

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn fetch_inner(
    url: &str,
    dest: &Path,
    temp_path: &Path,
    progress: Option<ProgressFn>,
) -> Result<(), ModelResolveError> {
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let total = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;
    let mut file = fs::File::create(temp_path).map_err(write_error(temp_path))?;

    // Stream in 1MB chunks; recognition models are 100MB+.
    let mut buf = vec![0u8; 1024 * 1024];
    loop {
        let n = response.read(&mut buf).map_err(write_error(temp_path))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(write_error(temp_path))?;
        downloaded += n as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }

    file.flush().map_err(write_error(temp_path))?;
    drop(file);

    fs::rename(temp_path, dest).map_err(write_error(dest))?;
    Ok(())
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> ModelResolveError {
    let path = path.to_path_buf();
    move |source| ModelResolveError::Write { path, source }
}
