//! Test fixtures and database helpers.
//!
//! Provides record types covering every mapping feature and an in-memory
//! database wrapper that creates and seeds their tables.

use bulkmerge_core::{
    materialize, resolve, Column, EntityMapping, MemoryDatabase, Record, Reference, SqlType,
    TableDefinition, Value,
};
use chrono::NaiveDate;
use std::cmp::Ordering;

/// The plain `{ID, Name}` record used throughout the tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Primary key.
    pub id: i32,
    /// Display name.
    pub name: String,
}

impl Item {
    /// Creates an item.
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// The row this item occupies in the `Items` table.
    pub fn row(&self) -> Vec<Value> {
        vec![Value::from(self.id), Value::from(&self.name)]
    }
}

impl Record for Item {
    fn mapping() -> EntityMapping<Self> {
        EntityMapping::new("Items")
            .column(Column::new("ID", SqlType::Int, |i: &Item| i.id.into()).primary_key())
            .column(Column::new("Name", SqlType::NVarChar(Some(50)), |i: &Item| {
                i.name.as_str().into()
            }))
    }
}

/// Referenced side of [`Employee::department`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    /// Primary key.
    pub id: i32,
    /// Department name.
    pub name: String,
}

impl Department {
    /// Creates a department.
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Record for Department {
    fn mapping() -> EntityMapping<Self> {
        EntityMapping::new("Departments")
            .column(Column::new("ID", SqlType::Int, |d: &Department| d.id.into()).primary_key())
            .column(Column::new("Name", SqlType::NVarChar(Some(100)), |d: &Department| {
                d.name.as_str().into()
            }))
    }
}

/// A record with a foreign-key navigation and a navigation without one.
#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    /// Primary key.
    pub id: i32,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Date of birth.
    pub dob: NaiveDate,
    /// Stored as `DepartmentID`.
    pub department: Option<Department>,
    /// Not stored.
    pub mentor: Option<Box<Employee>>,
}

impl Employee {
    /// Creates an employee without department or mentor.
    pub fn new(id: i32, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            dob: default_dob(),
            department: None,
            mentor: None,
        }
    }

    /// Sets the department.
    #[must_use]
    pub fn in_department(mut self, department: Department) -> Self {
        self.department = Some(department);
        self
    }

    /// Sets the mentor.
    #[must_use]
    pub fn mentored_by(mut self, mentor: Employee) -> Self {
        self.mentor = Some(Box::new(mentor));
        self
    }
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
            .reference(
                Reference::foreign_key::<Department>("Department", "DepartmentID", |e: &Employee| {
                    e.department.as_ref()
                })
                .nullable(),
            )
            .reference(Reference::navigation::<Employee>("Mentor", |e: &Employee| {
                e.mentor.as_deref()
            }))
    }
}

/// A record whose key is an identity column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Identity key; `0` for tags the database has not numbered yet.
    pub id: i32,
    /// Label text.
    pub label: String,
}

impl Tag {
    /// Creates a tag.
    pub fn new(id: i32, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

impl Record for Tag {
    fn mapping() -> EntityMapping<Self> {
        EntityMapping::new("Tags")
            .column(
                Column::new("ID", SqlType::Int, |t: &Tag| t.id.into())
                    .primary_key()
                    .identity(),
            )
            .column(Column::new("Label", SqlType::NVarChar(Some(30)), |t: &Tag| {
                t.label.as_str().into()
            }))
    }
}

/// A record with a two-column key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    /// First key column.
    pub student_id: i32,
    /// Second key column.
    pub course_id: i32,
    /// Optional grade.
    pub grade: Option<i16>,
}

impl Enrollment {
    /// Creates an enrollment.
    pub fn new(student_id: i32, course_id: i32, grade: Option<i16>) -> Self {
        Self {
            student_id,
            course_id,
            grade,
        }
    }
}

impl Record for Enrollment {
    fn mapping() -> EntityMapping<Self> {
        EntityMapping::new("Enrollments")
            .column(
                Column::new("StudentID", SqlType::Int, |e: &Enrollment| e.student_id.into())
                    .primary_key(),
            )
            .column(
                Column::new("CourseID", SqlType::Int, |e: &Enrollment| e.course_id.into())
                    .primary_key(),
            )
            .column(
                Column::new("Grade", SqlType::SmallInt, |e: &Enrollment| e.grade.into())
                    .nullable(),
            )
    }
}

/// A record without a primary key.
#[derive(Debug, Clone)]
pub struct Keyless {
    /// Free text.
    pub note: String,
}

impl Record for Keyless {
    fn mapping() -> EntityMapping<Self> {
        EntityMapping::new("Notes").column(Column::new(
            "Note",
            SqlType::NVarChar(None),
            |k: &Keyless| k.note.as_str().into(),
        ))
    }
}

/// A record that is not mapped to any table.
#[derive(Debug, Clone)]
pub struct Untabled {
    /// Primary key.
    pub id: i32,
}

impl Record for Untabled {
    fn mapping() -> EntityMapping<Self> {
        EntityMapping::new("")
            .column(Column::new("ID", SqlType::Int, |u: &Untabled| u.id.into()).primary_key())
    }
}

/// Date of birth used by the demo employees.
pub fn default_dob() -> NaiveDate {
    NaiveDate::from_ymd_opt(1980, 4, 3).unwrap_or_default()
}

/// An in-memory database with typed table helpers.
#[derive(Debug, Clone, Default)]
pub struct TestDatabase {
    /// The database handle.
    pub db: MemoryDatabase,
}

impl TestDatabase {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the table `T` maps to, with its primary key.
    pub fn create<T: Record>(&self) -> &Self {
        let schema = resolve::<T>().expect("Failed to resolve fixture schema");
        self.db
            .create_table(TableDefinition::from_schema(schema.table_schema()))
            .expect("Failed to create table");
        self
    }

    /// Inserts `records` directly, without logging.
    pub fn seed<T: Record>(&self, records: &[T]) -> &Self {
        let schema = resolve::<T>().expect("Failed to resolve fixture schema");
        let buffer = materialize(records, &schema).expect("Failed to materialize seed rows");
        self.db
            .insert_rows(schema.table_schema().table_name(), buffer.rows().to_vec())
            .expect("Failed to seed table");
        self
    }

    /// Rows of the table `T` maps to, ordered by primary key.
    pub fn rows_of<T: Record>(&self) -> Vec<Vec<Value>> {
        let schema = resolve::<T>().expect("Failed to resolve fixture schema");
        let table = schema.table_schema();
        let keys: Vec<usize> = table
            .primary_key_columns()
            .filter_map(|key| table.columns().iter().position(|c| c.name == key.name))
            .collect();
        let mut rows = self.db.rows(table.table_name()).expect("Table does not exist");
        rows.sort_by(|a, b| compare_keys(a, b, &keys));
        rows
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = MemoryDatabase;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Runs `f` against a database whose `T` table holds `seed`.
pub fn with_seeded_db<T, F, R>(seed: &[T], f: F) -> R
where
    T: Record,
    F: FnOnce(&TestDatabase) -> R,
{
    let db = TestDatabase::new();
    db.create::<T>().seed(seed);
    db.clear_log();
    f(&db)
}

/// Orders rows by the values at `keys`.
pub fn compare_keys(a: &[Value], b: &[Value], keys: &[usize]) -> Ordering {
    keys.iter()
        .map(|&i| compare_values(&a[i], &b[i]))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// A total order over values good enough for sorting test rows.
///
/// `NULL` sorts first; values of different kinds fall back to their SQL
/// literal text.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Float(x), Value::Float(y)) => x.total_cmp(y),
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        (Value::Date(x), Value::Date(y)) => x.cmp(y),
        (Value::DateTime(x), Value::DateTime(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// The records of the documented upsert example.
    pub fn example_records() -> Vec<Item> {
        vec![Item::new(1, "A"), Item::new(2, "B")]
    }

    /// The target contents of the documented upsert example.
    pub fn example_target() -> Vec<Item> {
        vec![Item::new(2, "Old"), Item::new(3, "C")]
    }

    /// `count` items numbered from 1.
    pub fn items(count: usize) -> Vec<Item> {
        (1..=count as i32).map(|i| Item::new(i, format!("Item {i}"))).collect()
    }

    /// `count` employees split over two departments.
    pub fn staff(count: usize) -> (Vec<Department>, Vec<Employee>) {
        let departments = vec![Department::new(10, "Engineering"), Department::new(20, "Sales")];
        let employees = (1..=count as i32)
            .map(|i| {
                let department = departments[i as usize % departments.len()].clone();
                Employee::new(i, format!("First{i}"), format!("Last{i}")).in_department(department)
            })
            .collect();
        (departments, employees)
    }
}
