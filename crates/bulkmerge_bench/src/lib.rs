//! Benchmark utilities.

use bulkmerge_core::{
    resolve, Column, EntityMapping, MemoryDatabase, Record, SqlType, TableDefinition,
};
use rand::distributions::Alphanumeric;
use rand::Rng;

/// A row with a handful of typical column types.
#[derive(Debug, Clone)]
pub struct BenchRow {
    /// Primary key.
    pub id: i64,
    /// Short text.
    pub name: String,
    /// Floating point payload.
    pub score: f64,
    /// Optional integer.
    pub rank: Option<i32>,
}

impl Record for BenchRow {
    fn mapping() -> EntityMapping<Self> {
        EntityMapping::new("BenchRows")
            .column(Column::new("ID", SqlType::BigInt, |r: &BenchRow| r.id.into()).primary_key())
            .column(Column::new("Name", SqlType::NVarChar(Some(32)), |r: &BenchRow| {
                r.name.as_str().into()
            }))
            .column(Column::new("Score", SqlType::Float, |r: &BenchRow| r.score.into()))
            .column(Column::new("Rank", SqlType::Int, |r: &BenchRow| r.rank.into()).nullable())
    }
}

/// Generate a random alphanumeric string of the given length.
pub fn random_name(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate `count` rows with keys starting at `first_id`.
pub fn generate_rows(first_id: i64, count: usize) -> Vec<BenchRow> {
    let mut rng = rand::thread_rng();
    (0..count as i64)
        .map(|i| BenchRow {
            id: first_id + i,
            name: random_name(rng.gen_range(4..=32)),
            score: rng.gen(),
            rank: rng.gen_bool(0.8).then(|| rng.gen_range(1..=1000)),
        })
        .collect()
}

/// Create a database holding the bench table with `existing` rows.
pub fn database_with_rows(existing: usize) -> MemoryDatabase {
    let db = MemoryDatabase::new();
    let schema = resolve::<BenchRow>().expect("Failed to resolve bench schema");
    db.create_table(TableDefinition::from_schema(schema.table_schema()))
        .expect("Failed to create bench table");
    let rows = generate_rows(1, existing)
        .into_iter()
        .map(|r| vec![r.id.into(), r.name.into(), r.score.into(), r.rank.into()])
        .collect();
    db.insert_rows("BenchRows", rows)
        .expect("Failed to seed bench table");
    db
}
