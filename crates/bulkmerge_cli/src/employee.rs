//! The demo record type.

use bulkmerge_core::{Column, EntityMapping, Record, SqlType};
use chrono::NaiveDate;

/// A row of the demo `Employees` table.
#[derive(Debug, Clone)]
pub struct Employee {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
}

impl Record for Employee {
    fn mapping() -> EntityMapping<Self> {
        EntityMapping::new("Employees")
            .column(Column::new("ID", SqlType::Int, |e: &Employee| e.id.into()).primary_key())
            .column(Column::new("FirstName", SqlType::NVarChar(Some(50)), |e: &Employee| {
                e.first_name.as_str().into()
            }))
            .column(Column::new("LastName", SqlType::NVarChar(Some(50)), |e: &Employee| {
                e.last_name.as_str().into()
            }))
            .column(Column::new("DOB", SqlType::Date, |e: &Employee| e.dob.into()))
    }
}

/// Generates `count` employees numbered from `first_id`.
///
/// `generation` goes into the names so a later run visibly updates rows.
pub fn generate(first_id: i32, count: usize, generation: &str) -> Vec<Employee> {
    let dob = NaiveDate::from_ymd_opt(1980, 4, 3).unwrap_or_default();
    (0..count as i32)
        .map(|i| {
            let id = first_id + i;
            Employee {
                id,
                first_name: format!("{generation}First{id}"),
                last_name: format!("{generation}Last{id}"),
                dob,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulkmerge_core::resolve;

    #[test]
    fn test_generated_ids_are_contiguous() {
        let employees = generate(10, 3, "");
        let ids: Vec<i32> = employees.iter().map(|e| e.id).collect();
        assert_eq!(ids, [10, 11, 12]);
        assert_eq!(employees[0].first_name, "First10");
    }

    #[test]
    fn test_mapping_resolves() {
        let schema = resolve::<Employee>().unwrap();
        assert_eq!(
            schema.table_schema().column_names(),
            ["ID", "FirstName", "LastName", "DOB"]
        );
    }
}
