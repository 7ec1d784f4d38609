//! Incremental scanning: cache reuse, pruning, duplicates and checkpoints

use super::test_utils::{scan, tree, write_file};
use mirror_move::error::ScanError;
use mirror_move::map::hasher::compute_content_hash;
use mirror_move::map::{ContentMap, HashAlgorithm, MapFile, ScanOptions, Scanner};
use std::fs;

#[test]
fn test_rescan_reuses_unchanged_files() {
    let dir = tree(&[("a.txt", b"alpha"), ("b.txt", b"beta"), ("c/d.txt", b"delta")]);
    let first = scan(dir.path());

    // Different size so the change is visible within the same second.
    write_file(dir.path(), "b.txt", b"beta, edited");

    let outcome = Scanner::new(dir.path().to_path_buf()).scan(&first).unwrap();
    assert_eq!(outcome.stats.files_seen, 3);
    assert_eq!(outcome.stats.hashed, 1);
    assert_eq!(outcome.stats.reused, 2);

    let edited = compute_content_hash(b"beta, edited", HashAlgorithm::Blake3);
    assert_eq!(outcome.map.get(&edited).unwrap().path, "b.txt");
    assert!(!outcome
        .map
        .contains(&compute_content_hash(b"beta", HashAlgorithm::Blake3)));
}

#[test]
fn test_force_rehashes_everything() {
    let dir = tree(&[("a.txt", b"alpha"), ("b.txt", b"beta")]);
    let first = scan(dir.path());

    let options = ScanOptions {
        force: true,
        ..ScanOptions::default()
    };
    let outcome = Scanner::with_options(dir.path().to_path_buf(), options)
        .scan(&first)
        .unwrap();
    assert_eq!(outcome.stats.hashed, 2);
    assert_eq!(outcome.stats.reused, 0);
    assert_eq!(outcome.map, first);
}

#[test]
fn test_deleted_files_are_pruned() {
    let dir = tree(&[("keep.txt", b"keep"), ("drop.txt", b"drop")]);
    let first = scan(dir.path());
    fs::remove_file(dir.path().join("drop.txt")).unwrap();

    let outcome = Scanner::new(dir.path().to_path_buf()).scan(&first).unwrap();
    assert_eq!(outcome.stats.pruned, 1);
    assert_eq!(outcome.map.len(), 1);
    assert_eq!(outcome.map.iter().next().unwrap().path, "keep.txt");
}

#[test]
fn test_duplicate_content_keeps_smallest_path() {
    let dir = tree(&[("z/copy.txt", b"same"), ("a/orig.txt", b"same"), ("m.txt", b"same")]);
    let outcome = Scanner::new(dir.path().to_path_buf())
        .scan(&ContentMap::new())
        .unwrap();

    assert_eq!(outcome.map.len(), 1);
    assert_eq!(outcome.map.iter().next().unwrap().path, "a/orig.txt");
    assert_eq!(outcome.stats.duplicates, 2);
}

#[test]
fn test_duplicate_losers_are_rehashed_on_rescan() {
    let dir = tree(&[("a.txt", b"same"), ("b.txt", b"same"), ("c.txt", b"other")]);
    let first = scan(dir.path());
    assert_eq!(first.len(), 2);

    let outcome = Scanner::new(dir.path().to_path_buf()).scan(&first).unwrap();
    assert_eq!(outcome.stats.reused, 2);
    assert_eq!(outcome.stats.hashed, 1, "b.txt has no cache entry of its own");
    assert_eq!(outcome.stats.duplicates, 1);
    assert_eq!(outcome.map, first);
}

#[test]
fn test_output_file_inside_root_is_not_mapped() {
    let dir = tree(&[("a.txt", b"alpha"), ("b.txt", b"beta"), ("c.txt", b"gamma")]);
    let output = MapFile::new(dir.path().join("hashes.json"));
    let options = ScanOptions {
        checkpoint_every: 1,
        ..ScanOptions::default()
    };

    let outcome = Scanner::with_options(dir.path().to_path_buf(), options)
        .with_checkpoint(output.clone())
        .scan(&ContentMap::new())
        .unwrap();
    output.save(&outcome.map).unwrap();

    assert_eq!(outcome.stats.checkpoints, 3);
    assert_eq!(outcome.map.len(), 3);
    assert!(outcome.map.iter().all(|e| e.path != "hashes.json"));

    // Rescanning with the saved map picks up nothing new.
    let again = Scanner::new(dir.path().to_path_buf())
        .with_checkpoint(output.clone())
        .scan(&output.load().unwrap())
        .unwrap();
    assert_eq!(again.stats.reused, 3);
    assert_eq!(again.map, outcome.map);
}

#[test]
fn test_sha256_map_differs_from_blake3() {
    let dir = tree(&[("a.txt", b"alpha")]);
    let options = ScanOptions {
        algorithm: HashAlgorithm::Sha256,
        ..ScanOptions::default()
    };
    let outcome = Scanner::with_options(dir.path().to_path_buf(), options)
        .scan(&ContentMap::new())
        .unwrap();
    let entry = outcome.map.iter().next().unwrap();
    assert_eq!(entry.hash, compute_content_hash(b"alpha", HashAlgorithm::Sha256));
    assert_eq!(entry.hash.as_str().len(), 64);
}

#[test]
fn test_missing_root_is_an_error() {
    let dir = tree(&[]);
    let err = Scanner::new(dir.path().join("nope"))
        .scan(&ContentMap::new())
        .unwrap_err();
    assert!(matches!(err, ScanError::RootNotFound(_)));
}
