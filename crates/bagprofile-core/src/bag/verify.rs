//! BagIt validity: declaration, manifest integrity and payload completeness.

use super::manifest::{ChecksumAlgorithm, PayloadManifest};
use super::tag_file::TagFile;
use super::{bag_path, payload_files, relative_path, BAGIT_TXT, PAYLOAD_DIR};
use crate::fs::{FileAccess, FsError};
use std::collections::BTreeSet;
use std::path::Path;

const REQUIRED_DECLARATIONS: &[&str] = &["BagIt-Version", "Tag-File-Character-Encoding"];

/// Verify a bag directory. Returns the list of problems; empty means valid.
///
/// Problems in the bag are reported as messages; only failures to read the
/// bag at all surface as `Err`.
pub fn verify_bag(files: &dyn FileAccess, bag_dir: &Path) -> Result<Vec<String>, FsError> {
    let mut problems = Vec::new();

    let bagit_txt = bag_dir.join(BAGIT_TXT);
    if !files.is_file(&bagit_txt) {
        problems.push(format!("{} is missing", BAGIT_TXT));
    } else {
        match TagFile::parse(&files.read_string(&bagit_txt)?) {
            Ok(declaration) => {
                for label in REQUIRED_DECLARATIONS {
                    if declaration.first(label).is_none() {
                        problems.push(format!("{} does not declare {}", BAGIT_TXT, label));
                    }
                }
            }
            Err(e) => problems.push(format!("{} is malformed: {}", BAGIT_TXT, e)),
        }
    }

    if !files.is_directory(&bag_dir.join(PAYLOAD_DIR)) {
        problems.push(format!("payload directory '{}' is missing", PAYLOAD_DIR));
    }

    let data_dir = bag_dir.join(PAYLOAD_DIR);
    if files.is_directory(&data_dir) {
        for link in files.list_symlinks_recursively(&data_dir)? {
            problems.push(format!(
                "payload contains a symbolic link: {}",
                relative_path(bag_dir, &link)
            ));
        }
    }

    let manifests = find_payload_manifests(files, bag_dir)?;
    if manifests.is_empty() {
        problems.push("no payload manifest found".to_string());
        return Ok(problems);
    }

    let payload: BTreeSet<String> = payload_files(files, bag_dir)?.into_iter().collect();

    for algorithm in manifests {
        let name = algorithm.manifest_name();
        let text = files.read_string(&bag_dir.join(&name))?;
        let manifest = match PayloadManifest::parse(algorithm, &text) {
            Ok(m) => m,
            Err(lines) => {
                problems.push(format!("{} has malformed lines: {:?}", name, lines));
                continue;
            }
        };
        problems.extend(check_manifest(files, bag_dir, &name, &manifest, &payload)?);
    }

    Ok(problems)
}

/// Payload manifests present in the bag root, sorted by algorithm.
pub fn find_payload_manifests(
    files: &dyn FileAccess,
    bag_dir: &Path,
) -> Result<Vec<ChecksumAlgorithm>, FsError> {
    let mut found: Vec<ChecksumAlgorithm> = files
        .list_files_recursively(bag_dir)?
        .iter()
        .filter(|p| p.parent() == Some(bag_dir))
        .filter_map(|p| p.file_name())
        .filter_map(|n| ChecksumAlgorithm::from_manifest_name(&n.to_string_lossy()))
        .collect();
    found.sort();
    Ok(found)
}

fn check_manifest(
    files: &dyn FileAccess,
    bag_dir: &Path,
    name: &str,
    manifest: &PayloadManifest,
    payload: &BTreeSet<String>,
) -> Result<Vec<String>, FsError> {
    let mut problems = Vec::new();
    let mut listed = BTreeSet::new();

    for entry in &manifest.entries {
        if entry.path.split('/').any(|c| c == "..") || entry.path.starts_with('/') {
            problems.push(format!("{}: path escapes the bag: {}", name, entry.path));
            continue;
        }
        if !entry.path.starts_with(&format!("{}/", PAYLOAD_DIR)) {
            problems.push(format!("{}: not a payload path: {}", name, entry.path));
            continue;
        }

        if through_symlink(files, bag_dir, &entry.path) {
            problems.push(format!("{}: listed path is a symbolic link: {}", name, entry.path));
            continue;
        }

        let path = bag_path(bag_dir, &entry.path);
        if !files.is_file(&path) {
            problems.push(format!("{}: listed file does not exist: {}", name, entry.path));
            continue;
        }
        listed.insert(relative_path(bag_dir, &path));

        let mut reader = files.open(&path)?;
        let actual = manifest
            .algorithm
            .digest_reader(&mut reader)
            .map_err(|source| FsError::Io {
                path: path.clone(),
                source,
            })?;
        if actual != entry.checksum {
            problems.push(format!(
                "{}: checksum mismatch for {}: expected {}, got {}",
                name, entry.path, entry.checksum, actual
            ));
        }
    }

    for missing in payload.difference(&listed) {
        problems.push(format!("{}: payload file not listed: {}", name, missing));
    }

    Ok(problems)
}

/// True when `rel` or one of its ancestors inside the bag is a symbolic link.
fn through_symlink(files: &dyn FileAccess, bag_dir: &Path, rel: &str) -> bool {
    let mut current = bag_dir.to_path_buf();
    rel.split('/').filter(|c| !c.is_empty()).any(|component| {
        current.push(component);
        files.is_symlink(&current)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::LocalFileAccess;
    use std::fs;

    fn write_bag(dir: &Path, manifest: &str) {
        fs::create_dir_all(dir.join("data")).unwrap();
        fs::write(
            dir.join("bagit.txt"),
            "BagIt-Version: 0.97\nTag-File-Character-Encoding: UTF-8\n",
        )
        .unwrap();
        fs::write(dir.join("data/a.txt"), "abc").unwrap();
        fs::write(dir.join("manifest-sha1.txt"), manifest).unwrap();
    }

    #[test]
    fn valid_bag_has_no_problems() {
        let dir = tempfile::tempdir().unwrap();
        write_bag(dir.path(), "a9993e364706816aba3e25717850c26c9cd0d89d  data/a.txt\n");
        let problems = verify_bag(&LocalFileAccess, dir.path()).unwrap();
        assert!(problems.is_empty(), "{:?}", problems);
    }

    #[test]
    fn checksum_mismatch_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_bag(dir.path(), "0000000000000000000000000000000000000000  data/a.txt\n");
        let problems = verify_bag(&LocalFileAccess, dir.path()).unwrap();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("checksum mismatch"));
    }

    #[test]
    fn unlisted_payload_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_bag(dir.path(), "a9993e364706816aba3e25717850c26c9cd0d89d  data/a.txt\n");
        fs::write(dir.path().join("data/b.txt"), "b").unwrap();
        let problems = verify_bag(&LocalFileAccess, dir.path()).unwrap();
        assert_eq!(problems, vec!["manifest-sha1.txt: payload file not listed: data/b.txt"]);
    }

    #[test]
    fn traversal_paths_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_bag(
            dir.path(),
            "a9993e364706816aba3e25717850c26c9cd0d89d  data/a.txt\nabc  data/../bagit.txt\n",
        );
        let problems = verify_bag(&LocalFileAccess, dir.path()).unwrap();
        assert!(problems.iter().any(|p| p.contains("escapes the bag")));
    }

    #[test]
    fn missing_manifest_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        fs::write(
            dir.path().join("bagit.txt"),
            "BagIt-Version: 1.0\nTag-File-Character-Encoding: UTF-8\n",
        )
        .unwrap();
        let problems = verify_bag(&LocalFileAccess, dir.path()).unwrap();
        assert_eq!(problems, vec!["no payload manifest found"]);
    }

    #[cfg(unix)]
    #[test]
    fn payload_symlinks_are_reported_and_never_hashed() {
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("secret.txt"), "abc").unwrap();

        let dir = tempfile::tempdir().unwrap();
        write_bag(
            dir.path(),
            "a9993e364706816aba3e25717850c26c9cd0d89d  data/a.txt\n\
             0000000000000000000000000000000000000000  data/leak\n\
             0000000000000000000000000000000000000000  data/linked/secret.txt\n",
        );
        std::os::unix::fs::symlink(outside.path().join("secret.txt"), dir.path().join("data/leak"))
            .unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("data/linked")).unwrap();

        let problems = verify_bag(&LocalFileAccess, dir.path()).unwrap();
        assert_eq!(
            problems,
            vec![
                "payload contains a symbolic link: data/leak",
                "payload contains a symbolic link: data/linked",
                "manifest-sha1.txt: listed path is a symbolic link: data/leak",
                "manifest-sha1.txt: listed path is a symbolic link: data/linked/secret.txt",
            ]
        );
        assert!(problems
            .iter()
            .all(|p| !p.contains("a9993e364706816aba3e25717850c26c9cd0d89d")));
    }
}
