//! Property-based test generators using proptest.
//!
//! Provides strategies for record sets that keep the invariants the engine
//! relies on, such as unique primary keys.

use crate::fixtures::{Enrollment, Item};
use bulkmerge_core::SyncMode;
use proptest::prelude::*;

/// Strategy for generating any synchronization mode.
pub fn mode_strategy() -> impl Strategy<Value = SyncMode> {
    prop::sample::select(SyncMode::ALL.to_vec())
}

/// Strategy for generating valid item names (fit `NVARCHAR(50)`).
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z][A-Za-z0-9 ']{0,19}").expect("Invalid regex")
}

/// Strategy for generating items with keys in `1..=max_id`.
pub fn item_strategy(max_id: i32) -> impl Strategy<Value = Item> {
    (1..=max_id, name_strategy()).prop_map(|(id, name)| Item::new(id, name))
}

/// Strategy for generating item sets with unique keys, in random order.
///
/// Keys are drawn from `1..=max_id` so that two independent sets overlap.
pub fn item_set_strategy(max_id: i32, max_len: usize) -> impl Strategy<Value = Vec<Item>> {
    prop::collection::btree_map(1..=max_id, name_strategy(), 0..=max_len)
        .prop_map(|entries| {
            entries
                .into_iter()
                .map(|(id, name)| Item::new(id, name))
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}

/// Strategy for generating enrollment sets with unique composite keys.
pub fn enrollment_set_strategy(max_len: usize) -> impl Strategy<Value = Vec<Enrollment>> {
    prop::collection::btree_map(
        (1..=8i32, 1..=8i32),
        prop::option::of(0..=100i16),
        0..=max_len,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|((student, course), grade)| Enrollment::new(student, course, grade))
            .collect()
    })
}
