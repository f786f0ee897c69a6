//! File access collaborator.
//!
//! Rule bodies never touch `std::fs` directly; they go through [`FileAccess`]
//! so the bag source can be swapped (local directory, extracted archive,
//! test fixture).

use std::io::Read;
use std::path::{Path, PathBuf};

/// File access errors.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    fn from_io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            FsError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            FsError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Read-only view on the files of a bag.
pub trait FileAccess: Send + Sync {
    fn is_directory(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    /// True when `path` itself is a symbolic link; the link is not followed.
    fn is_symlink(&self, path: &Path) -> bool;

    /// All regular files below `path`, sorted. Symbolic links are not followed.
    fn list_files_recursively(&self, path: &Path) -> Result<Vec<PathBuf>, FsError>;

    /// All symbolic links below `path`, sorted.
    fn list_symlinks_recursively(&self, path: &Path) -> Result<Vec<PathBuf>, FsError>;

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, FsError>;

    /// Open a file for streaming reads.
    fn open(&self, path: &Path) -> Result<Box<dyn Read + Send + '_>, FsError>;

    /// Read a file as UTF-8 text (lossy).
    fn read_string(&self, path: &Path) -> Result<String, FsError> {
        let bytes = self.read_bytes(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// [`FileAccess`] on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileAccess;

impl LocalFileAccess {
    /// Regular files and symbolic links below `path`, each sorted.
    fn walk(&self, path: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>), FsError> {
        let mut files = Vec::new();
        let mut links = Vec::new();
        let mut pending = vec![path.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let entries = std::fs::read_dir(&dir).map_err(|e| FsError::from_io(&dir, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| FsError::from_io(&dir, e))?;
                let file_type = entry
                    .file_type()
                    .map_err(|e| FsError::from_io(&entry.path(), e))?;
                if file_type.is_symlink() {
                    links.push(entry.path());
                } else if file_type.is_dir() {
                    pending.push(entry.path());
                } else if file_type.is_file() {
                    files.push(entry.path());
                }
            }
        }

        files.sort();
        links.sort();
        Ok((files, links))
    }
}

impl FileAccess for LocalFileAccess {
    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        path.symlink_metadata()
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }

    fn list_files_recursively(&self, path: &Path) -> Result<Vec<PathBuf>, FsError> {
        Ok(self.walk(path)?.0)
    }

    fn list_symlinks_recursively(&self, path: &Path) -> Result<Vec<PathBuf>, FsError> {
        Ok(self.walk(path)?.1)
    }

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        std::fs::read(path).map_err(|e| FsError::from_io(path, e))
    }

    fn open(&self, path: &Path) -> Result<Box<dyn Read + Send + '_>, FsError> {
        let file = std::fs::File::open(path).map_err(|e| FsError::from_io(path, e))?;
        Ok(Box::new(std::io::BufReader::new(file)))
    }
}
