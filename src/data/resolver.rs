use std::io;
use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

// ---------------------------------------------------------------------------
// NFC/NFD-insensitive file lookup
// ---------------------------------------------------------------------------
//
// The growth workbook is referred to by one human-readable Korean name, but
// filesystems disagree on how that name is encoded: macOS volumes store
// decomposed (NFD) Hangul, most others store precomposed (NFC). Comparing
// raw bytes therefore misses the file depending on where the data directory
// was produced.

/// Canonical composed form. School ids, header names, and resolver targets
/// all go through this so Korean text compares equal across filesystems.
pub(crate) fn nfc(s: &str) -> String {
    s.nfc().collect()
}

fn nfd(s: &str) -> String {
    s.nfd().collect()
}

/// Find a regular file in `dir` whose name matches `target_name` under
/// Unicode canonical equivalence (NFC or NFD form of either side).
///
/// Only direct children are considered, never subdirectories. Entries are
/// scanned in sorted order, so if several names match the lexicographically
/// smallest one wins regardless of the storage backend's listing order.
pub fn find_file_by_name(dir: &Path, target_name: &str) -> io::Result<Option<PathBuf>> {
    let target_nfc = nfc(target_name);
    let target_nfd = nfd(target_name);

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    for path in paths {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if nfc(name) == target_nfc || nfd(name) == target_nfd {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const WORKBOOK: &str = "4개교_생육결과데이터.xlsx";

    #[test]
    fn finds_decomposed_file_by_composed_name() {
        let dir = tempfile::tempdir().unwrap();
        let on_disk = dir.path().join(nfd(WORKBOOK));
        fs::write(&on_disk, b"xlsx").unwrap();

        let found = find_file_by_name(dir.path(), WORKBOOK).unwrap();
        assert_eq!(found, Some(on_disk));
    }

    #[test]
    fn finds_composed_file_by_decomposed_name() {
        let dir = tempfile::tempdir().unwrap();
        let on_disk = dir.path().join(nfc(WORKBOOK));
        fs::write(&on_disk, b"xlsx").unwrap();

        let target = nfd(WORKBOOK);
        let found = find_file_by_name(dir.path(), &target).unwrap();
        assert_eq!(found, Some(on_disk));
    }

    #[test]
    fn ignores_directories_with_matching_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(WORKBOOK)).unwrap();

        let found = find_file_by_name(dir.path(), WORKBOOK).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn returns_none_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let found = find_file_by_name(dir.path(), WORKBOOK).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn ties_resolve_to_lexicographically_smallest_name() {
        // On byte-preserving filesystems the NFC and NFD spellings are two
        // distinct directory entries that both match the logical name.
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join(nfc(WORKBOOK));
        let b = dir.path().join(nfd(WORKBOOK));
        fs::write(&a, b"nfc").unwrap();
        fs::write(&b, b"nfd").unwrap();

        let expected = std::cmp::min(a, b);
        let found = find_file_by_name(dir.path(), WORKBOOK).unwrap();
        assert_eq!(found, Some(expected));
    }
}
