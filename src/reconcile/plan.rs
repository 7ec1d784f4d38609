//! Pure diff of two content maps into pending moves, missing and extra files

use crate::map::ContentMap;
use crate::reconcile::report::{Move, Unmatched};
use crate::types::ContentHash;
use std::collections::HashSet;

/// The move-set between a current and a target map, before touching disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovePlan {
    /// Pending moves in target path order
    pub moves: Vec<Move>,
    pub missing: Vec<Unmatched>,
    pub extra: Vec<Unmatched>,
    /// Hashes already at their target path
    pub in_place: usize,
}

/// Invert a map to (path, hash) pairs sorted by path, then hash.
///
/// A stale map can list one path under two hashes; both pairs are kept.
pub fn path_view(map: &ContentMap) -> Vec<(&str, &ContentHash)> {
    let mut view: Vec<_> = map
        .iter()
        .map(|entry| (entry.path.as_str(), &entry.hash))
        .collect();
    view.sort();
    view
}

impl MovePlan {
    pub fn compute(current: &ContentMap, target: &ContentMap) -> Self {
        let mut plan = MovePlan::default();
        let mut accounted: HashSet<&ContentHash> = HashSet::new();

        for (target_path, hash) in path_view(target) {
            match current.get(hash) {
                Some(entry) => {
                    if entry.path != target_path {
                        plan.moves.push(Move {
                            source: entry.path.clone(),
                            destination: target_path.to_string(),
                            hash: hash.clone(),
                        });
                    } else {
                        plan.in_place += 1;
                    }
                    accounted.insert(hash);
                }
                None => plan.missing.push(Unmatched {
                    path: target_path.to_string(),
                    hash: hash.clone(),
                }),
            }
        }

        plan.extra = path_view(current)
            .into_iter()
            .filter(|(_, hash)| !accounted.contains(hash))
            .map(|(path, hash)| Unmatched {
                path: path.to_string(),
                hash: hash.clone(),
            })
            .collect();

        plan
    }
}
