//! Payload manifests (`manifest-<alg>.txt`).

use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::io::Read;

const DIGEST_CHUNK: usize = 64 * 1024;

/// Checksum algorithms accepted in payload manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChecksumAlgorithm {
    Sha1,
    Sha256,
    Sha512,
}

impl ChecksumAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            ChecksumAlgorithm::Sha1 => "sha1",
            ChecksumAlgorithm::Sha256 => "sha256",
            ChecksumAlgorithm::Sha512 => "sha512",
        }
    }

    /// Algorithm named by a payload manifest file name, e.g. `manifest-sha1.txt`.
    pub fn from_manifest_name(file_name: &str) -> Option<Self> {
        let alg = file_name.strip_prefix("manifest-")?.strip_suffix(".txt")?;
        match alg {
            "sha1" => Some(ChecksumAlgorithm::Sha1),
            "sha256" => Some(ChecksumAlgorithm::Sha256),
            "sha512" => Some(ChecksumAlgorithm::Sha512),
            _ => None,
        }
    }

    pub fn manifest_name(&self) -> String {
        format!("manifest-{}.txt", self.name())
    }

    /// Lowercase hex digest of everything `reader` yields, read in bounded chunks.
    pub fn digest_reader(&self, reader: &mut dyn Read) -> std::io::Result<String> {
        match self {
            ChecksumAlgorithm::Sha1 => stream_digest(Sha1::new(), reader),
            ChecksumAlgorithm::Sha256 => stream_digest(Sha256::new(), reader),
            ChecksumAlgorithm::Sha512 => stream_digest(Sha512::new(), reader),
        }
    }
}

fn stream_digest<D: Digest>(mut hasher: D, reader: &mut dyn Read) -> std::io::Result<String> {
    let mut buf = vec![0u8; DIGEST_CHUNK];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

impl std::fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One `checksum path` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub checksum: String,
    /// Slash separated, percent-decoded, relative to the bag root.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadManifest {
    pub algorithm: ChecksumAlgorithm,
    pub entries: Vec<ManifestEntry>,
}

impl PayloadManifest {
    /// Parse manifest text. Returns the 1-indexed numbers of malformed lines as `Err`.
    pub fn parse(algorithm: ChecksumAlgorithm, text: &str) -> Result<Self, Vec<usize>> {
        let mut entries = Vec::new();
        let mut malformed = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match line.trim_end().split_once(char::is_whitespace) {
                Some((checksum, path)) if !path.trim().is_empty() => entries.push(ManifestEntry {
                    checksum: checksum.to_ascii_lowercase(),
                    path: decode_path(path.trim_start()),
                }),
                _ => malformed.push(idx + 1),
            }
        }

        if malformed.is_empty() {
            Ok(Self { algorithm, entries })
        } else {
            Err(malformed)
        }
    }
}

/// Undo the BagIt percent-encoding of CR, LF and `%` in manifest paths.
fn decode_path(path: &str) -> String {
    path.replace("%0A", "\n")
        .replace("%0a", "\n")
        .replace("%0D", "\r")
        .replace("%0d", "\r")
        .replace("%25", "%")
}
