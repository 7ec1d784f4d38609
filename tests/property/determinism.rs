//! Property-based tests for determinism guarantees

use mirror_move::map::hasher::{compute_content_hash, hash_reader};
use mirror_move::map::{ContentMap, HashAlgorithm, HashEntry};
use mirror_move::reconcile::MovePlan;
use proptest::prelude::*;

proptest! {
    /// Streaming in any chunk size gives the one-shot digest
    #[test]
    fn test_chunked_hash_matches_one_shot(content in any::<Vec<u8>>(), chunk in 1usize..512) {
        for algorithm in [HashAlgorithm::Blake3, HashAlgorithm::Sha256] {
            let streamed = hash_reader(&content[..], algorithm, chunk).unwrap();
            prop_assert_eq!(streamed, compute_content_hash(&content, algorithm));
        }
    }

    /// Insertion order never changes the resulting map
    #[test]
    fn test_merge_order_independent(paths in proptest::collection::vec("[a-c]{1,3}(/[a-c]{1,3})?", 1..12)) {
        let entries: Vec<HashEntry> = paths
            .iter()
            .enumerate()
            .map(|(i, p)| HashEntry::new(format!("h{}", i % 3), p.clone(), 0))
            .collect();

        let mut forward = ContentMap::new();
        for e in entries.iter().cloned() {
            forward.merge_entry(e);
        }
        let mut backward = ContentMap::new();
        for e in entries.iter().rev().cloned() {
            backward.merge_entry(e);
        }
        prop_assert_eq!(forward, backward);
    }

    /// Same maps, same plan
    #[test]
    fn test_plan_is_deterministic(pairs in proptest::collection::btree_map("[0-9a-f]{4}", ("[a-d]{1,2}/[a-d]{1,2}", "[a-d]{1,2}/[a-d]{1,2}"), 0..16)) {
        let current: ContentMap = pairs.iter().map(|(h, (c, _))| HashEntry::new(h.as_str(), c.clone(), 0)).collect();
        let target: ContentMap = pairs.iter().map(|(h, (_, t))| HashEntry::new(h.as_str(), t.clone(), 0)).collect();
        prop_assert_eq!(MovePlan::compute(&current, &target), MovePlan::compute(&current, &target));
    }
}
