//! Reference model of the four synchronization modes.
//!
//! Works on keyed rows in plain collections so property tests can compare
//! the engine's effect on a table against the intended one.

use bulkmerge_core::SyncMode;
use std::collections::BTreeMap;

/// Applies `mode` to `target` given `records`, both as `(key, row)` pairs.
///
/// Keys in `records` must be unique. The result is ordered by key.
pub fn apply<K, R>(mode: SyncMode, target: &[(K, R)], records: &[(K, R)]) -> Vec<(K, R)>
where
    K: Ord + Clone,
    R: Clone,
{
    let mut table: BTreeMap<K, R> = target.iter().cloned().collect();
    match mode {
        SyncMode::ReplaceAll => {
            table = records.iter().cloned().collect();
        }
        SyncMode::UpsertNoDelete => {
            table.extend(records.iter().cloned());
        }
        SyncMode::UpsertWithDelete => {
            let keep: BTreeMap<K, R> = records.iter().cloned().collect();
            table = keep;
        }
        SyncMode::DeleteMatching => {
            for (key, _) in records {
                table.remove(key);
            }
        }
    }
    table.into_iter().collect()
}
