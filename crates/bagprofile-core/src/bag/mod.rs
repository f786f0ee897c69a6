//! BagIt container access.
//!
//! A bag is a directory holding:
//! - `bagit.txt`: version and tag file encoding declaration
//! - `bag-info.txt`: `Label: value` metadata
//! - `manifest-<alg>.txt`: payload checksums
//! - `data/`: the payload
//! - `metadata/`: profile-specific metadata documents
//!
//! # Modules
//!
//! - [`tag_file`]: parse `bagit.txt` / `bag-info.txt`
//! - [`manifest`]: parse payload manifests
//! - [`verify`]: BagIt validity (checksums, completeness)

pub mod manifest;
pub mod tag_file;
pub mod verify;

pub use manifest::{ChecksumAlgorithm, ManifestEntry, PayloadManifest};
pub use tag_file::{TagFile, TagFileError};
pub use verify::verify_bag;

use crate::fs::{FileAccess, FsError};
use std::path::{Path, PathBuf};

pub const BAGIT_TXT: &str = "bagit.txt";
pub const BAG_INFO_TXT: &str = "bag-info.txt";
pub const PAYLOAD_DIR: &str = "data";
pub const METADATA_DIR: &str = "metadata";

/// Path of `rel` (slash separated) inside `bag_dir`.
pub fn bag_path(bag_dir: &Path, rel: &str) -> PathBuf {
    rel.split('/')
        .filter(|c| !c.is_empty())
        .fold(bag_dir.to_path_buf(), |acc, c| acc.join(c))
}

/// Slash separated path of `path` relative to `bag_dir`.
pub fn relative_path(bag_dir: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(bag_dir).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// All payload files, as slash separated paths relative to the bag root.
pub fn payload_files(files: &dyn FileAccess, bag_dir: &Path) -> Result<Vec<String>, FsError> {
    let data_dir = bag_dir.join(PAYLOAD_DIR);
    if !files.is_directory(&data_dir) {
        return Ok(Vec::new());
    }
    Ok(files
        .list_files_recursively(&data_dir)?
        .iter()
        .map(|p| relative_path(bag_dir, p))
        .collect())
}

/// Read and parse `bag-info.txt`.
pub fn read_bag_info(files: &dyn FileAccess, bag_dir: &Path) -> anyhow::Result<TagFile> {
    let text = files.read_string(&bag_dir.join(BAG_INFO_TXT))?;
    Ok(TagFile::parse(&text)?)
}
