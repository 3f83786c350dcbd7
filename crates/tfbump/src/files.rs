//! reading and writing terraform files
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum FileError {
    #[error("{}: not a file", .path.display())]
    NotAFile { path: PathBuf },
    #[error("{}: IO error", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: unable to parse file", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: hcl_edit::parser::Error,
    },
}

impl FileError {
    pub fn path(&self) -> &Path {
        match self {
            FileError::NotAFile { path } | FileError::Io { path, .. } | FileError::Parse { path, .. } => {
                path
            }
        }
    }

    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> FileError + '_ {
        move |source| FileError::Io {
            path: path.to_owned(),
            source,
        }
    }
}

pub fn read(path: &Path) -> Result<String, FileError> {
    let metadata = std::fs::metadata(path).map_err(FileError::io(path))?;
    if !metadata.is_file() {
        return Err(FileError::NotAFile {
            path: path.to_owned(),
        });
    }

    tracing::info!(path = %path.display(), "loading file");
    std::fs::read_to_string(path).map_err(FileError::io(path))
}

/// Overwrites `path` with `contents`, keeping the permission bits the file had before
pub fn write_preserving_permissions(path: &Path, contents: &str) -> Result<(), FileError> {
    let permissions = std::fs::metadata(path)
        .map_err(FileError::io(path))?
        .permissions();

    tracing::info!(path = %path.display(), "writing file");
    std::fs::write(path, contents).map_err(FileError::io(path))?;
    std::fs::set_permissions(path, permissions).map_err(FileError::io(path))
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let error = read(&dir.path().join("missing.tf")).unwrap_err();
        assert!(matches!(error, FileError::Io { .. }));
    }

    #[test]
    fn read_directory() {
        let dir = tempfile::tempdir().unwrap();
        let error = read(dir.path()).unwrap_err();
        assert!(matches!(error, FileError::NotAFile { .. }));
        assert_eq!(error.path(), dir.path());
    }

    #[test]
    fn write_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.tf");
        std::fs::write(&path, "a = 1\n").unwrap();

        write_preserving_permissions(&path, "a = 2\n").unwrap();
        assert_eq!(read(&path).unwrap(), "a = 2\n");
    }

    #[cfg(unix)]
    #[test]
    fn write_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.tf");
        std::fs::write(&path, "a = 1\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        write_preserving_permissions(&path, "a = 2\n").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}
