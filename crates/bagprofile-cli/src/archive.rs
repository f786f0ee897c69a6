//! Archive input: unpack a `.tar.gz` holding one bag into a temporary directory.

use anyhow::{bail, Context};
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Resource limits for archive extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractLimits {
    pub max_archive_bytes: u64,
    pub max_unpacked_bytes: u64,
    pub max_entries: usize,
    pub max_path_len: usize,
}

impl Default for ExtractLimits {
    fn default() -> Self {
        Self {
            max_archive_bytes: 16 * 1024 * 1024 * 1024,  // 16 GB compressed
            max_unpacked_bytes: 64 * 1024 * 1024 * 1024, // 64 GB uncompressed
            max_entries: 100_000,
            max_path_len: 1024,
        }
    }
}

/// Partial overrides for [`ExtractLimits`], as read from the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractLimitsOverrides {
    pub max_archive_bytes: Option<u64>,
    pub max_unpacked_bytes: Option<u64>,
    pub max_entries: Option<usize>,
    pub max_path_len: Option<usize>,
}

impl ExtractLimits {
    /// Apply overrides onto these limits. Only `Some` values override.
    pub fn apply(self, overrides: ExtractLimitsOverrides) -> Self {
        Self {
            max_archive_bytes: overrides.max_archive_bytes.unwrap_or(self.max_archive_bytes),
            max_unpacked_bytes: overrides
                .max_unpacked_bytes
                .unwrap_or(self.max_unpacked_bytes),
            max_entries: overrides.max_entries.unwrap_or(self.max_entries),
            max_path_len: overrides.max_path_len.unwrap_or(self.max_path_len),
        }
    }
}

/// A reader that fails once more than `limit` bytes have been read.
struct LimitReader<R> {
    inner: R,
    limit: u64,
    read: u64,
    what: &'static str,
}

impl<R: Read> LimitReader<R> {
    fn new(inner: R, limit: u64, what: &'static str) -> Self {
        Self {
            inner,
            limit,
            read: 0,
            what,
        }
    }
}

impl<R: Read> Read for LimitReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.read >= self.limit {
            // One probe byte tells a stream that ends exactly at the limit from one that goes on.
            let mut probe = [0u8; 1];
            if self.inner.read(&mut probe)? == 0 {
                return Ok(0);
            }
            return Err(std::io::Error::other(format!(
                "{} exceeds limit of {} bytes",
                self.what, self.limit
            )));
        }

        let max_to_read = (self.limit - self.read).min(buf.len() as u64) as usize;
        let n = self.inner.read(&mut buf[..max_to_read])?;
        self.read += n as u64;
        Ok(n)
    }
}

/// An unpacked bag. The directory is removed when this value is dropped or closed.
pub struct ExtractedBag {
    dir: TempDir,
    pub bag_dir: PathBuf,
}

impl ExtractedBag {
    /// Remove the extraction directory, reporting failures.
    pub fn close(self) -> std::io::Result<()> {
        self.dir.close()
    }
}

pub fn is_archive(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    path.is_file() && (name.ends_with(".tar.gz") || name.ends_with(".tgz"))
}

/// Unpack `archive`; it must contain exactly one top-level directory and only
/// regular files and directories.
pub fn extract_with_limits(archive: &Path, limits: ExtractLimits) -> anyhow::Result<ExtractedBag> {
    let dir = tempfile::tempdir().context("failed to create temporary directory")?;
    let file = File::open(archive)
        .with_context(|| format!("failed to open archive {}", archive.display()))?;

    let compressed = LimitReader::new(file, limits.max_archive_bytes, "archive");
    let decoder = GzDecoder::new(compressed);
    let unpacked = LimitReader::new(decoder, limits.max_unpacked_bytes, "unpacked archive");
    let mut tar = tar::Archive::new(unpacked);

    let mut declared_bytes: u64 = 0;
    for (i, entry) in tar
        .entries()
        .with_context(|| format!("failed to read archive {}", archive.display()))?
        .enumerate()
    {
        let mut entry = entry.with_context(|| format!("corrupt archive entry #{}", i))?;
        if i >= limits.max_entries {
            bail!("archive has more than {} entries", limits.max_entries);
        }

        let path = entry.path()?.into_owned();
        let path_len = path.as_os_str().len();
        if path_len > limits.max_path_len {
            bail!(
                "archive entry path length {} exceeds limit {}: {}",
                path_len,
                limits.max_path_len,
                path.display()
            );
        }

        match entry.header().entry_type() {
            tar::EntryType::Regular | tar::EntryType::Directory => {}
            tar::EntryType::XGlobalHeader => continue,
            other => bail!(
                "archive entry {} has unsupported type {:?}; only files and directories are allowed",
                path.display(),
                other
            ),
        }

        declared_bytes = declared_bytes.saturating_add(entry.header().size()?);
        if declared_bytes > limits.max_unpacked_bytes {
            bail!(
                "archive content exceeds limit of {} bytes at {}",
                limits.max_unpacked_bytes,
                path.display()
            );
        }

        // unpack_in refuses paths that would escape the target directory
        if !entry.unpack_in(dir.path())? {
            bail!(
                "archive entry escapes the extraction directory: {}",
                path.display()
            );
        }
    }

    let top_level: Vec<PathBuf> = std::fs::read_dir(dir.path())?
        .map(|e| e.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    let bag_dir = match top_level.as_slice() {
        [single] if single.is_dir() => single.clone(),
        _ => bail!(
            "archive {} must contain exactly one top-level directory, found {} entries",
            archive.display(),
            top_level.len()
        ),
    };

    tracing::debug!(archive = %archive.display(), bag = %bag_dir.display(), "extracted archive");
    Ok(ExtractedBag { dir, bag_dir })
}
