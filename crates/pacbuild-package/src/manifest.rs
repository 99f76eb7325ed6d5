//! `manifest` sidecar: an mtree-shaped file listing, sorted lexicographically
//! by its full entry line so two runs over identical file trees produce a
//! byte-identical manifest.
//!
//! The entry digest field is spelled `md5digest` for installer
//! compatibility even though the digest written here is SHA-256 — the field
//! name is a wire-format constant, not a claim about the algorithm.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::Result;

const HEADER: &str = "#mtree\n/set type=file uid=0 gid=0 mode=644\n";

fn digest_file(path: &Path) -> std::io::Result<String> {
    let bytes = fs_err::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Walk `package_directory` and render the `manifest` sidecar text. Sidecar
/// files themselves (`package-info`, `manifest`) and any path beginning
/// with `.` are excluded.
pub fn render(package_directory: &Path) -> Result<String> {
    let mut entries = Vec::new();
    walk(package_directory, package_directory, &mut entries)?;
    entries.sort();

    let mut out = String::from(HEADER);
    for entry in entries {
        out.push_str(&entry);
    }
    Ok(out)
}

fn walk(root: &Path, dir: &Path, entries: &mut Vec<String>) -> Result<()> {
    for item in fs_err::read_dir(dir)? {
        let item = item?;
        let path = item.path();
        let file_type = item.file_type()?;

        if file_type.is_dir() {
            walk(root, &path, entries)?;
            continue;
        }
        if !file_type.is_file() {
            continue;
        }

        let relative = path.strip_prefix(root).expect("path is under root");
        let relative_str = relative.to_string_lossy().replace('\\', "/");

        if relative_str == "package-info" || relative_str == "manifest" {
            continue;
        }
        if relative_str.starts_with('.') {
            continue;
        }

        let size = item.metadata()?.len();
        let digest = digest_file(&path)?;
        entries.push(format!("./{relative_str} size={size} md5digest={digest}\n"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn manifest_is_byte_identical_across_two_runs_over_the_same_tree() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();

        for dir in [a.path(), b.path()] {
            fs::create_dir_all(dir.join("usr/bin")).unwrap();
            fs::write(dir.join("usr/bin/hello"), b"binary contents").unwrap();
            fs::create_dir_all(dir.join("usr/share/doc")).unwrap();
            fs::write(dir.join("usr/share/doc/readme"), b"read me").unwrap();
        }

        let manifest_a = render(a.path()).unwrap();
        let manifest_b = render(b.path()).unwrap();
        assert_eq!(manifest_a, manifest_b);
    }

    #[test]
    fn entries_are_sorted_lexicographically_by_full_line() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("usr/bin")).unwrap();
        fs::write(dir.path().join("usr/bin/zzz"), b"z").unwrap();
        fs::write(dir.path().join("usr/bin/aaa"), b"a").unwrap();

        let manifest = render(dir.path()).unwrap();
        let aaa_pos = manifest.find("aaa").unwrap();
        let zzz_pos = manifest.find("zzz").unwrap();
        assert!(aaa_pos < zzz_pos);
    }

    #[test]
    fn excludes_sidecars_and_dotfiles() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package-info"), b"name = hello\n").unwrap();
        fs::write(dir.path().join("manifest"), b"#mtree\n").unwrap();
        fs::write(dir.path().join(".hidden"), b"secret").unwrap();
        fs::write(dir.path().join("real"), b"contents").unwrap();

        let manifest = render(dir.path()).unwrap();
        assert!(!manifest.contains("package-info"));
        assert!(manifest.contains("./real"));
        assert!(!manifest.contains(".hidden"));
    }
}
