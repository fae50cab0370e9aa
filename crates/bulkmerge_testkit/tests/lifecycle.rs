//! Statement sequences, staging cleanup and failure handling.

use bulkmerge_core::{
    DbError, FailPoint, LogEntry, SqlType, StatementKind, SyncConfig, SyncEngine, SyncErrorKind,
    SyncFailure, SyncMode, SyncPhase,
};
use bulkmerge_testkit::prelude::*;
use std::sync::Arc;
use std::thread;

const DROP_STAGING: &str = "IF OBJECT_ID('Items_temp','U') IS NOT NULL DROP TABLE Items_temp";
const COPY_STAGING: &str = "SELECT TOP(0) * INTO Items_temp FROM Items";

fn statement(sql: &str) -> LogEntry {
    LogEntry::Statement(sql.to_owned())
}

fn staging_write(rows: usize) -> LogEntry {
    LogEntry::BulkWrite {
        destination: "Items_temp".into(),
        rows,
    }
}

#[test]
fn upsert_no_delete_statement_sequence() {
    with_seeded_db(&scenarios::example_target(), |db| {
        SyncEngine::default()
            .sync(&mut db.connect(), &scenarios::example_records(), SyncMode::UpsertNoDelete)
            .unwrap();

        assert_eq!(
            db.log(),
            [
                statement(DROP_STAGING),
                statement(COPY_STAGING),
                staging_write(2),
                statement(
                    "MERGE Items AS TARGET USING Items_temp AS SOURCE ON TARGET.[ID]=SOURCE.[ID]\n\
                     WHEN NOT MATCHED BY TARGET THEN INSERT ([ID],[Name]) VALUES ([ID],[Name])\n\
                     WHEN MATCHED THEN UPDATE SET TARGET.[Name]=SOURCE.[Name];"
                ),
                statement(DROP_STAGING),
            ]
        );
    });
}

#[test]
fn upsert_with_delete_statement_sequence() {
    with_seeded_db(&scenarios::example_target(), |db| {
        SyncEngine::default()
            .sync(&mut db.connect(), &scenarios::example_records(), SyncMode::UpsertWithDelete)
            .unwrap();

        assert_eq!(
            db.statement_log()[2],
            "MERGE Items AS TARGET USING Items_temp AS SOURCE ON TARGET.[ID]=SOURCE.[ID]\n\
             WHEN NOT MATCHED BY TARGET THEN INSERT ([ID],[Name]) VALUES ([ID],[Name])\n\
             WHEN MATCHED THEN UPDATE SET TARGET.[Name]=SOURCE.[Name]\n\
             WHEN NOT MATCHED BY SOURCE THEN DELETE;"
        );
    });
}

#[test]
fn replace_all_statement_sequence() {
    with_seeded_db(&scenarios::example_target(), |db| {
        SyncEngine::default()
            .sync(&mut db.connect(), &scenarios::example_records(), SyncMode::ReplaceAll)
            .unwrap();

        let log: Vec<String> = db.log().iter().map(ToString::to_string).collect();
        assert_eq!(
            log,
            [
                "BEGIN TRANSACTION",
                "DELETE FROM Items",
                "-- bulk write 2 rows into Items",
                "COMMIT TRANSACTION",
            ]
        );
    });
}

#[test]
fn preview_matches_executed_statements() {
    for mode in SyncMode::ALL {
        with_seeded_db(&scenarios::example_target(), |db| {
            let engine = SyncEngine::default();
            let planned: Vec<String> = engine
                .preview::<Item>(mode)
                .unwrap()
                .iter()
                .map(ToString::to_string)
                .collect();
            engine
                .sync(&mut db.connect(), &scenarios::example_records(), mode)
                .unwrap();
            assert_eq!(db.statement_log(), planned, "{mode}");
        });
    }
}

#[test]
fn identity_columns_stay_out_of_the_insert_list() {
    let db = TestDatabase::new();
    db.create::<Tag>();
    SyncEngine::default()
        .sync(&mut db.connect(), &[Tag::new(0, "x")], SyncMode::UpsertNoDelete)
        .unwrap();

    let merge = &db.statement_log()[2];
    assert!(merge.contains("INSERT ([Label]) VALUES ([Label])"), "{merge}");
    assert!(merge.contains("UPDATE SET TARGET.[Label]=SOURCE.[Label]"), "{merge}");
}

#[test]
fn staging_is_dropped_when_a_step_fails() {
    let failures = [
        FailPoint::Statement(StatementKind::CopyStructure),
        FailPoint::BulkWrite,
        FailPoint::Statement(StatementKind::Merge),
    ];
    for point in failures {
        for mode in [
            SyncMode::UpsertNoDelete,
            SyncMode::UpsertWithDelete,
            SyncMode::DeleteMatching,
        ] {
            with_seeded_db(&scenarios::example_target(), |db| {
                db.fail_next(point, DbError::connectivity("connection reset"));

                let err = SyncEngine::default()
                    .sync(&mut db.connect(), &scenarios::example_records(), mode)
                    .unwrap_err();

                assert_eq!(err.mode(), mode);
                assert_eq!(err.table(), Some("Items"));
                assert_eq!(db.table_names(), ["Items"], "{point:?} {mode}");
                assert_eq!(db.statement_log().last().map(String::as_str), Some(DROP_STAGING));
                assert_eq!(
                    db.rows_of::<Item>(),
                    [Item::new(2, "Old").row(), Item::new(3, "C").row()]
                );
            });
        }
    }
}

#[test]
fn failing_step_is_reported_with_its_phase() {
    let cases = [
        (
            FailPoint::Statement(StatementKind::DropTableIfExists),
            SyncPhase::Staging,
            SyncErrorKind::Database,
        ),
        (
            FailPoint::Statement(StatementKind::CopyStructure),
            SyncPhase::Staging,
            SyncErrorKind::Database,
        ),
        (FailPoint::BulkWrite, SyncPhase::Transferring, SyncErrorKind::Transfer),
        (FailPoint::Statement(StatementKind::Merge), SyncPhase::Merging, SyncErrorKind::Database),
    ];
    for (point, phase, kind) in cases {
        with_seeded_db(&scenarios::example_target(), |db| {
            db.fail_next(point, DbError::timeout("statement timed out"));
            let engine = SyncEngine::default();

            let err = engine
                .sync(&mut db.connect(), &scenarios::example_records(), SyncMode::UpsertNoDelete)
                .unwrap_err();

            assert_eq!(err.phase(), phase, "{point:?}");
            assert_eq!(err.kind(), kind, "{point:?}");
            assert_eq!(engine.phase(), SyncPhase::Failed);
            assert!(!db.table_exists("Items_temp"));
        });
    }
}

#[test]
fn staging_left_by_an_earlier_crash_is_replaced() {
    with_seeded_db(&scenarios::example_target(), |db| {
        db.create_table(
            bulkmerge_core::TableDefinition::new("Items_temp")
                .column(bulkmerge_core::MemoryColumn::new("Stale", SqlType::Int)),
        )
        .unwrap();

        SyncEngine::default()
            .sync(&mut db.connect(), &scenarios::example_records(), SyncMode::UpsertNoDelete)
            .unwrap();

        assert_eq!(db.table_names(), ["Items"]);
    });
}

#[test]
fn replace_all_failure_leaves_target_untouched() {
    let failures = [
        FailPoint::Statement(StatementKind::DeleteAll),
        FailPoint::BulkWrite,
        FailPoint::Commit,
    ];
    for point in failures {
        with_seeded_db(&scenarios::example_target(), |db| {
            db.fail_next(point, DbError::connectivity("connection reset"));

            let err = SyncEngine::default()
                .sync(&mut db.connect(), &scenarios::example_records(), SyncMode::ReplaceAll)
                .unwrap_err();

            assert_eq!(err.phase(), SyncPhase::Transferring, "{point:?}");
            assert_eq!(
                db.rows_of::<Item>(),
                [Item::new(2, "Old").row(), Item::new(3, "C").row()],
                "{point:?}"
            );
        });
    }
}

#[test]
fn constraint_violation_in_replace_all_rolls_back() {
    with_seeded_db(&scenarios::example_target(), |db| {
        let err = SyncEngine::default()
            .sync(
                &mut db.connect(),
                &[Item::new(1, "A"), Item::new(1, "again")],
                SyncMode::ReplaceAll,
            )
            .unwrap_err();

        assert_eq!(err.kind(), SyncErrorKind::Transfer);
        assert_eq!(db.row_count("Items"), Some(2));
        assert_eq!(db.log().last(), Some(&LogEntry::Rollback));
    });
}

#[test]
fn duplicate_keys_fail_the_merge() {
    with_seeded_db(&scenarios::example_target(), |db| {
        let err = SyncEngine::default()
            .sync(
                &mut db.connect(),
                &[Item::new(2, "x"), Item::new(2, "y")],
                SyncMode::UpsertNoDelete,
            )
            .unwrap_err();

        assert_eq!(err.phase(), SyncPhase::Merging);
        assert!(!db.table_exists("Items_temp"));
        assert_eq!(db.row_count("Items"), Some(2));
    });
}

#[test]
fn schema_errors_happen_before_any_database_call() {
    with_seeded_db(&scenarios::example_target(), |db| {
        let engine = SyncEngine::default();

        let err = engine
            .sync(
                &mut db.connect(),
                &[Keyless { note: "n".into() }],
                SyncMode::UpsertNoDelete,
            )
            .unwrap_err();
        assert_eq!(err.kind(), SyncErrorKind::SchemaResolution);
        assert_eq!(err.phase(), SyncPhase::Resolving);
        assert_eq!(err.table(), None);

        let err = engine
            .sync(&mut db.connect(), &[Untabled { id: 1 }], SyncMode::ReplaceAll)
            .unwrap_err();
        assert_eq!(err.kind(), SyncErrorKind::SchemaResolution);

        assert!(db.log().is_empty());
        assert_eq!(engine.resolver().cached_types(), 0);
        assert_eq!(engine.stats().calls_failed, 2);
    });
}

#[test]
fn materialization_errors_happen_before_any_database_call() {
    let db = TestDatabase::new();
    db.create::<Item>();
    let too_long = "x".repeat(51);

    let err = SyncEngine::default()
        .sync(&mut db.connect(), &[Item::new(1, too_long)], SyncMode::UpsertNoDelete)
        .unwrap_err();

    assert_eq!(err.kind(), SyncErrorKind::Materialization);
    assert_eq!(err.phase(), SyncPhase::Materializing);
    assert_eq!(err.table(), Some("Items"));
    assert!(db.log().is_empty());
}

#[test]
fn rollback_failure_keeps_the_original_cause() {
    with_seeded_db(&scenarios::example_target(), |db| {
        db.fail_next(FailPoint::BulkWrite, DbError::connectivity("reset"));
        db.fail_next(FailPoint::Rollback, DbError::connectivity("gone"));

        let err = SyncEngine::default()
            .sync(&mut db.connect(), &scenarios::example_records(), SyncMode::ReplaceAll)
            .unwrap_err();

        assert_eq!(err.kind(), SyncErrorKind::Transaction);
        let SyncFailure::Rollback { cause, .. } = err.into_failure() else {
            panic!("expected a rollback failure");
        };
        assert!(matches!(*cause, SyncFailure::Transfer(_)));
        assert_eq!(db.row_count("Items"), Some(2));
    });
}

#[test]
fn unique_staging_names_allow_parallel_calls() {
    let db = TestDatabase::new();
    db.create::<Item>();
    let engine = Arc::new(SyncEngine::new(
        SyncConfig::new()
            .with_unique_staging_names(true)
            .with_serialize_per_table(false),
    ));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let engine = Arc::clone(&engine);
            let db = db.db.clone();
            thread::spawn(move || {
                let records: Vec<Item> = (0..25).map(|i| Item::new(t * 100 + i, "x")).collect();
                engine
                    .sync(&mut db.connect(), &records, SyncMode::UpsertNoDelete)
                    .unwrap()
            })
        })
        .collect();

    let mut staging: Vec<String> = handles
        .into_iter()
        .map(|h| h.join().unwrap().staging_table.unwrap())
        .collect();
    staging.sort();
    staging.dedup();

    assert_eq!(staging.len(), 4);
    assert_eq!(db.row_count("Items"), Some(100));
    assert_eq!(db.table_names(), ["Items"]);
    assert_eq!(engine.stats().calls_succeeded, 4);
}

#[test]
fn calls_on_one_table_are_serialized() {
    let db = TestDatabase::new();
    db.create::<Item>();
    let engine = Arc::new(SyncEngine::default());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let engine = Arc::clone(&engine);
            let db = db.db.clone();
            thread::spawn(move || {
                let records = vec![Item::new(t, "x"), Item::new(t + 10, "y")];
                engine.sync(&mut db.connect(), &records, SyncMode::UpsertNoDelete)
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }
    assert_eq!(db.row_count("Items"), Some(8));
    assert_eq!(db.table_names(), ["Items"]);
}

#[test]
fn delete_matching_reports_deleted_rows() {
    with_seeded_db(&scenarios::example_target(), |db| {
        let report = SyncEngine::default()
            .sync(&mut db.connect(), &scenarios::example_records(), SyncMode::DeleteMatching)
            .unwrap();
        assert_eq!(report.rows_affected, 1);
        assert_eq!(report.rows_transferred, 2);
        assert_eq!(report.staging_table.as_deref(), Some("Items_temp"));
    });
}
