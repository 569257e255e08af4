use std::fs;
use std::io;
use std::path::Path;

use crate::sorting::domain::dispatch_pair::DispatchPair;
use crate::sorting::domain::file_action::{ActionMode, ActionOutcome, FileAction};

/// Copies or moves files on the local filesystem.
#[derive(Debug, Clone, Copy)]
pub struct FsFileAction {
    mode: ActionMode,
}

impl FsFileAction {
    pub fn new(mode: ActionMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ActionMode {
        self.mode
    }
}

impl FileAction for FsFileAction {
    fn execute(&self, pair: &DispatchPair) -> io::Result<ActionOutcome> {
        let destination = match &pair.destination {
            Some(d) if pair.is_actionable() => d,
            _ => return Ok(ActionOutcome::Skipped),
        };

        match self.mode {
            ActionMode::Copy => fs::copy(&pair.source, destination).map(|_| ()),
            ActionMode::Move => move_file(&pair.source, destination),
        }?;
        Ok(ActionOutcome::Performed)
    }
}

/// Rename, falling back to copy + delete when source and destination are on
/// different filesystems. The source is only removed once the copy has the
/// same size.
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    if fs::rename(source, destination).is_ok() {
        return Ok(());
    }

    let source_size = fs::metadata(source)?.len();
    fs::copy(source, destination)?;

    let dest_size = fs::metadata(destination)?.len();
    if dest_size != source_size {
        let _ = fs::remove_file(destination);
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("copy verification failed: source {source_size} bytes, destination {dest_size} bytes"),
        ));
    }

    fs::remove_file(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        source: PathBuf,
        out_dir: PathBuf,
    }

    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.jpg");
        fs::write(&source, b"jpeg bytes").unwrap();
        let out_dir = tmp.path().join("out");
        fs::create_dir(&out_dir).unwrap();
        Fixture {
            source,
            out_dir,
            _tmp: tmp,
        }
    }

    fn pair(f: &Fixture) -> DispatchPair {
        DispatchPair {
            source: f.source.clone(),
            destination: Some(f.out_dir.join("a.jpg")),
        }
    }

    #[test]
    fn test_copy_keeps_source() {
        let f = fixture();
        let outcome = FsFileAction::new(ActionMode::Copy).execute(&pair(&f)).unwrap();

        assert_eq!(outcome, ActionOutcome::Performed);
        assert!(f.source.exists());
        assert_eq!(fs::read(f.out_dir.join("a.jpg")).unwrap(), b"jpeg bytes");
    }

    #[test]
    fn test_copy_twice_yields_same_content() {
        let f = fixture();
        let action = FsFileAction::new(ActionMode::Copy);

        action.execute(&pair(&f)).unwrap();
        let first = fs::read(f.out_dir.join("a.jpg")).unwrap();
        action.execute(&pair(&f)).unwrap();
        let second = fs::read(f.out_dir.join("a.jpg")).unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read(&f.source).unwrap(), b"jpeg bytes");
    }

    #[test]
    fn test_move_removes_source() {
        let f = fixture();
        FsFileAction::new(ActionMode::Move).execute(&pair(&f)).unwrap();

        assert!(!f.source.exists());
        assert_eq!(fs::read(f.out_dir.join("a.jpg")).unwrap(), b"jpeg bytes");
    }

    #[test]
    fn test_missing_destination_dir_is_error() {
        let f = fixture();
        let p = DispatchPair {
            source: f.source.clone(),
            destination: Some(f.out_dir.join("missing").join("a.jpg")),
        };

        let result = FsFileAction::new(ActionMode::Copy).execute(&p);

        assert!(result.is_err());
        assert!(!f.out_dir.join("missing").exists());
    }

    #[test]
    fn test_pair_without_destination_is_skipped() {
        let f = fixture();
        let p = DispatchPair {
            source: f.source.clone(),
            destination: None,
        };

        let outcome = FsFileAction::new(ActionMode::Move).execute(&p).unwrap();

        assert_eq!(outcome, ActionOutcome::Skipped);
        assert!(f.source.exists());
    }

    #[test]
    fn test_missing_source_is_error() {
        let f = fixture();
        let p = DispatchPair {
            source: f.out_dir.join("ghost.jpg"),
            destination: Some(f.out_dir.join("ghost-copy.jpg")),
        };

        assert!(FsFileAction::new(ActionMode::Copy).execute(&p).is_err());
        assert!(FsFileAction::new(ActionMode::Move).execute(&p).is_err());
    }
}
