//! Record materialization.

use crate::buffer::TransferBuffer;
use crate::error::{MaterializationError, MaterializeResult};
use crate::schema::{ColumnAccessor, Record, ResolvedSchema};
use crate::value::Value;

/// Builds a transfer buffer from `records`.
///
/// Rows keep the input order and columns follow the schema. A foreign-key
/// column holds the related record's primary-key value; an empty navigation
/// becomes `NULL` when the column is nullable and is an error otherwise.
/// Every value is checked against its column type.
pub fn materialize<T: Record>(
    records: &[T],
    schema: &ResolvedSchema<T>,
) -> MaterializeResult<TransferBuffer> {
    let columns = schema.table_schema().columns();
    let mut buffer =
        TransferBuffer::with_capacity(schema.table_schema().column_names(), records.len());

    for (row, record) in records.iter().enumerate() {
        let mut values = Vec::with_capacity(columns.len());

        for (column, accessor) in columns.iter().zip(&schema.accessors) {
            let value = match accessor.read(record) {
                Some(value) => {
                    if let ColumnAccessor::ForeignKey { property, .. } = accessor {
                        if value.is_null() {
                            return Err(MaterializationError::NullReferencedKey {
                                row,
                                property: property.clone(),
                            });
                        }
                    }
                    value
                }
                None if column.is_nullable => Value::Null,
                None => {
                    let property = match accessor {
                        ColumnAccessor::ForeignKey { property, .. } => property.clone(),
                        ColumnAccessor::Scalar(_) => column.name.clone(),
                    };
                    return Err(MaterializationError::MissingReference {
                        row,
                        property,
                        column: column.name.clone(),
                    });
                }
            };

            if !value.is_compatible_with(column.sql_type) {
                return Err(MaterializationError::TypeMismatch {
                    row,
                    column: column.name.clone(),
                    sql_type: column.sql_type.to_string(),
                    value_type: value.type_name(),
                });
            }
            values.push(value);
        }

        buffer.push_row(values);
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{resolve, Column, EntityMapping, Reference};
    use crate::value::SqlType;

    struct Team {
        id: Option<i32>,
    }

    impl Record for Team {
        fn mapping() -> EntityMapping<Self> {
            EntityMapping::new("Teams")
                .column(Column::new("ID", SqlType::Int, |t: &Team| t.id.into()).primary_key())
        }
    }

    struct Player {
        id: i32,
        name: String,
        nickname: Option<String>,
        team: Option<Team>,
        coach: Option<Team>,
    }

    impl Record for Player {
        fn mapping() -> EntityMapping<Self> {
            EntityMapping::new("Players")
                .column(Column::new("ID", SqlType::Int, |p: &Player| p.id.into()).primary_key())
                .column(Column::new("Name", SqlType::NVarChar(Some(5)), |p: &Player| {
                    p.name.as_str().into()
                }))
                .column(
                    Column::new("Nickname", SqlType::NVarChar(None), |p: &Player| {
                        p.nickname.clone().into()
                    })
                    .nullable(),
                )
                .reference(Reference::foreign_key::<Team>("Team", "TeamID", |p: &Player| {
                    p.team.as_ref()
                }))
                .reference(
                    Reference::foreign_key::<Team>("Coach", "CoachTeamID", |p: &Player| {
                        p.coach.as_ref()
                    })
                    .nullable(),
                )
        }
    }

    fn player(id: i32, name: &str, team: Option<i32>) -> Player {
        Player {
            id,
            name: name.into(),
            nickname: None,
            team: team.map(|id| Team { id: Some(id) }),
            coach: None,
        }
    }

    #[test]
    fn rows_follow_input_and_schema_order() {
        let schema = resolve::<Player>().unwrap();
        let records = vec![player(2, "B", Some(10)), player(1, "A", Some(20))];

        let buffer = materialize(&records, &schema).unwrap();

        assert_eq!(buffer.columns(), ["ID", "Name", "Nickname", "TeamID", "CoachTeamID"]);
        assert_eq!(
            buffer.rows()[0],
            [Value::Int(2), Value::from("B"), Value::Null, Value::Int(10), Value::Null]
        );
        assert_eq!(buffer.get(1, "TeamID"), Some(&Value::Int(20)));
    }

    #[test]
    fn empty_input_gives_empty_buffer() {
        let schema = resolve::<Player>().unwrap();
        let buffer = materialize(&[], &schema).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.columns().len(), 5);
    }

    #[test]
    fn required_navigation_must_be_present() {
        let schema = resolve::<Player>().unwrap();
        let records = vec![player(1, "A", Some(1)), player(2, "B", None)];

        let err = materialize(&records, &schema).unwrap_err();
        assert_eq!(
            err,
            MaterializationError::MissingReference {
                row: 1,
                property: "Team".into(),
                column: "TeamID".into(),
            }
        );
    }

    #[test]
    fn referenced_key_must_not_be_null() {
        let schema = resolve::<Player>().unwrap();
        let mut record = player(1, "A", None);
        record.team = Some(Team { id: None });

        let err = materialize(&[record], &schema).unwrap_err();
        assert!(matches!(
            err,
            MaterializationError::NullReferencedKey { row: 0, ref property } if property == "Team"
        ));
    }

    #[test]
    fn values_are_checked_against_column_type() {
        let schema = resolve::<Player>().unwrap();
        let records = vec![player(1, "too long", Some(1))];

        let err = materialize(&records, &schema).unwrap_err();
        assert!(matches!(
            err,
            MaterializationError::TypeMismatch { row: 0, ref column, .. } if column == "Name"
        ));
        assert!(err.to_string().contains("NVARCHAR(5)"));
    }

    #[test]
    fn records_are_not_modified() {
        let schema = resolve::<Player>().unwrap();
        let records = vec![player(1, "A", Some(3))];
        let first = materialize(&records, &schema).unwrap();
        let second = materialize(&records, &schema).unwrap();
        assert_eq!(first, second);
        assert_eq!(records[0].name, "A");
    }
}
