//! Storage layer for abroad.
//!
//! This module provides the `SQLite`-backed storage session that owns both
//! record tables. Statement text is generated from the ordered column tables
//! in [`crate::record::columns`], so inserts, updates and reads always agree
//! on column order.
//!
//! A [`Storage`] is owned by exactly one session and is not shared; every
//! mutation goes through `&self`/`&mut self` on that single owner.

pub mod schema;

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::backup::Backup;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info, trace};

use crate::error::{Error, Result};
use crate::record::columns::{Column, ColumnKind, INTERNSHIP_COLUMNS, STUDY_COLUMNS};
use crate::record::lenient::sql_text;
use crate::record::{InternshipRecord, StudyRecord, Table};

/// Pages copied per step when running the online backup.
const BACKUP_PAGES_PER_STEP: i32 = 256;

/// Path reported for in-memory sessions.
const MEMORY_PATH: &str = ":memory:";

/// A record type that lives in one of the two tables.
pub trait Stored: Default + 'static {
    /// The table holding records of this type.
    const TABLE: Table;

    /// The ordered column table.
    fn columns() -> &'static [Column<Self>];

    /// Record the row id assigned by storage.
    fn set_id(&mut self, id: i64);
}

impl Stored for StudyRecord {
    const TABLE: Table = Table::Study;

    fn columns() -> &'static [Column<Self>] {
        STUDY_COLUMNS
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

impl Stored for InternshipRecord {
    const TABLE: Table = Table::Internship;

    fn columns() -> &'static [Column<Self>] {
        INTERNSHIP_COLUMNS
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

/// Storage session for both record tables.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file, or `:memory:`.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the database file if it doesn't exist, then creates any
    /// missing tables. The parent directory must already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        schema::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage session.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(MEMORY_PATH),
            source,
        })?;

        schema::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(MEMORY_PATH),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this session keeps its data in memory only.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == MEMORY_PATH
    }

    /// Insert a record and return its assigned id.
    ///
    /// A missing submission date is left out of the statement so the column
    /// default applies.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert<R: Stored>(&self, record: &R) -> Result<i64> {
        let (names, values): (Vec<&str>, Vec<Value>) = R::columns()
            .iter()
            .map(|column| (column.name, (column.get)(record)))
            .filter(|(name, value)| !(is_defaulted::<R>(name) && *value == Value::Null))
            .unzip();

        let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            R::TABLE.name(),
            names.join(", "),
            placeholders.join(", ")
        );
        trace!("{}", sql);

        self.conn.execute(&sql, params_from_iter(values.iter()))?;
        let id = self.conn.last_insert_rowid();
        debug!("Inserted {} row with id {}", R::TABLE.name(), id);
        Ok(id)
    }

    /// Overwrite every column of the study record with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] if no row has that id, or an error
    /// if the database operation fails.
    pub fn update_study(&self, id: i64, record: &StudyRecord) -> Result<()> {
        let columns = StudyRecord::columns();
        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column.name, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            Table::Study.name(),
            assignments.join(", "),
            columns.len() + 1
        );
        trace!("{}", sql);

        let mut values: Vec<Value> = columns.iter().map(|c| (c.get)(record)).collect();
        values.push(Value::Integer(id));

        let affected = self.conn.execute(&sql, params_from_iter(values.iter()))?;
        if affected == 0 {
            return Err(Error::RecordNotFound { id });
        }
        debug!("Updated study_abroad row {}", id);
        Ok(())
    }

    /// Get a record by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get<R: Stored>(&self, id: i64) -> Result<Option<R>> {
        let sql = format!("{} WHERE id = ?1", select_sql::<R>());
        let record = self
            .conn
            .query_row(&sql, [id], decode_row::<R>)
            .optional()?;
        Ok(record)
    }

    /// Select records matching a predicate.
    ///
    /// `predicate` and `order_by` are trusted SQL fragments built by the
    /// query engine; user input only ever arrives through `params`.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails, e.g. because the table is missing.
    pub fn select<R: Stored>(
        &self,
        predicate: &str,
        params: &[Value],
        order_by: &str,
    ) -> Result<Vec<R>> {
        let sql = format!(
            "{} WHERE {} ORDER BY {}",
            select_sql::<R>(),
            predicate,
            order_by
        );
        trace!("{}", sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(params.iter()), decode_row::<R>)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Distinct non-empty values of one column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] for a column outside the table's
    /// column set, or an error if the query fails.
    pub fn distinct_values(&self, table: Table, column: &str, sorted: bool) -> Result<Vec<String>> {
        let column = table.column(column).ok_or_else(|| Error::UnknownColumn {
            table: table.name(),
            column: column.to_string(),
        })?;

        let mut sql = format!(
            "SELECT DISTINCT {column} FROM {} WHERE {column} IS NOT NULL AND {column} != ''",
            table.name()
        );
        if sorted {
            sql.push_str(&format!(" ORDER BY {column}"));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let values = stmt
            .query_map([], |row| row.get::<_, Value>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut seen = Vec::with_capacity(values.len());
        for value in values.into_iter().filter_map(sql_text) {
            if !seen.contains(&value) {
                seen.push(value);
            }
        }
        Ok(seen)
    }

    /// Count the rows of a table.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self, table: Table) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.name()),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Execute a script of SQL statements against the current contents.
    ///
    /// Statements before a failing one stay applied.
    ///
    /// # Errors
    ///
    /// Returns the first statement error.
    pub fn execute_script(&self, sql: &str) -> std::result::Result<(), rusqlite::Error> {
        self.conn.execute_batch(sql)
    }

    /// Replace the entire database with the contents of a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not a database.
    pub fn restore_from(&mut self, snapshot: &Path) -> std::result::Result<(), rusqlite::Error> {
        let source = Connection::open_with_flags(snapshot, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let backup = Backup::new(&source, &mut self.conn)?;
        backup.run_to_completion(BACKUP_PAGES_PER_STEP, Duration::ZERO, None)?;
        info!("Restored database from {}", snapshot.display());
        Ok(())
    }

    /// Write the entire database to a snapshot file, replacing its contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be written.
    pub fn backup_to(&self, destination: &Path) -> Result<()> {
        let mut target = Connection::open(destination).map_err(|source| Error::DatabaseOpen {
            path: destination.to_path_buf(),
            source,
        })?;
        {
            let backup = Backup::new(&self.conn, &mut target)?;
            backup.run_to_completion(BACKUP_PAGES_PER_STEP, Duration::ZERO, None)?;
        }
        info!("Wrote snapshot to {}", destination.display());
        Ok(())
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let study_records = self.count(Table::Study)?;
        let internship_records = self.count(Table::Internship)?;

        let db_size_bytes = if self.is_in_memory() {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            study_records,
            internship_records,
            db_size_bytes,
        })
    }
}

/// Whether a column is left to its schema default when no value is given.
fn is_defaulted<R: Stored>(name: &str) -> bool {
    R::columns()
        .iter()
        .any(|c| c.name == name && c.kind == ColumnKind::Date)
}

fn select_sql<R: Stored>() -> String {
    let names: Vec<&str> = R::columns().iter().map(|c| c.name).collect();
    format!("SELECT id, {} FROM {}", names.join(", "), R::TABLE.name())
}

/// Convert a row selected with [`select_sql`] into a record.
fn decode_row<R: Stored>(row: &rusqlite::Row<'_>) -> rusqlite::Result<R> {
    let mut record = R::default();
    // The id goes first so that column decoders can report it.
    record.set_id(row.get(0)?);
    for (i, column) in R::columns().iter().enumerate() {
        let value: Value = row.get(i + 1)?;
        (column.set)(&mut record, value);
    }
    Ok(record)
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StorageStats {
    /// Rows in `study_abroad`.
    pub study_records: i64,
    /// Rows in `internship_abroad`.
    pub internship_records: i64,
    /// Size of the database file in bytes, 0 for in-memory sessions.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Course;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    fn study(country: &str, continent: &str, university: &str) -> StudyRecord {
        StudyRecord {
            stud_first_name: "Ana".to_string(),
            stud_last_name: "Lopez".to_string(),
            stud_email: "ana@example.org".to_string(),
            stud_class_year: "2022".to_string(),
            country: country.to_string(),
            city: "Capital".to_string(),
            university: university.to_string(),
            duration: "WS 2024/25".to_string(),
            continent: continent.to_string(),
            housing_type: Some("Dormitory".to_string()),
            courses: vec![Course::titled("Econ 101")],
            ..StudyRecord::default()
        }
    }

    fn internship(company: &str) -> InternshipRecord {
        InternshipRecord {
            name: "Ben".to_string(),
            contact_email: "ben@example.org".to_string(),
            country: "Japan".to_string(),
            city: "Osaka".to_string(),
            company_organization: company.to_string(),
            duration: "6 months".to_string(),
            overall_experience: 4,
            ..InternshipRecord::default()
        }
    }

    #[test]
    fn test_open_in_memory() {
        let storage = create_test_storage();
        assert!(storage.is_in_memory());
        assert_eq!(storage.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_insert_and_get_study() {
        let storage = create_test_storage();
        let mut record = study("Spain", "Europe", "Universidad de Sevilla");
        record.housing_quality = Some(4);
        record.visa_needed = true;
        record.housing_cost = Some("350".to_string());

        let id = storage.insert(&record).unwrap();
        let stored: StudyRecord = storage.get(id).unwrap().unwrap();

        record.id = Some(id);
        assert_eq!(stored, record);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let storage = create_test_storage();
        let first = storage.insert(&study("Spain", "Europe", "A")).unwrap();
        storage
            .conn
            .execute("DELETE FROM study_abroad WHERE id = ?1", [first])
            .unwrap();
        let second = storage.insert(&study("Spain", "Europe", "B")).unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_get_nonexistent() {
        let storage = create_test_storage();
        let result: Option<StudyRecord> = storage.get(99_999).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_update_study_overwrites_row() {
        let storage = create_test_storage();
        let mut record = study("Spain", "Europe", "A");
        record.general_comments = Some("Great".to_string());
        let id = storage.insert(&record).unwrap();

        record.city = "Sevilla".to_string();
        record.general_comments = None;
        storage.update_study(id, &record).unwrap();

        let stored: StudyRecord = storage.get(id).unwrap().unwrap();
        assert_eq!(stored.city, "Sevilla");
        assert_eq!(stored.general_comments, None);
        assert_eq!(stored.country, "Spain");
    }

    #[test]
    fn test_update_missing_id() {
        let storage = create_test_storage();
        let err = storage
            .update_study(42, &study("Spain", "Europe", "A"))
            .unwrap_err();
        assert!(matches!(err, Error::RecordNotFound { id: 42 }));
    }

    #[test]
    fn test_internship_submission_date_default() {
        let storage = create_test_storage();
        let id = storage.insert(&internship("Acme")).unwrap();

        let stored: InternshipRecord = storage.get(id).unwrap().unwrap();
        assert!(stored.submission_date.is_some());
        assert_eq!(stored.company_organization, "Acme");
    }

    #[test]
    fn test_internship_explicit_date() {
        let storage = create_test_storage();
        let mut record = internship("Acme");
        record.submission_date = chrono::NaiveDate::from_ymd_opt(2023, 9, 1);
        let id = storage.insert(&record).unwrap();

        let stored: InternshipRecord = storage.get(id).unwrap().unwrap();
        assert_eq!(stored.submission_date, record.submission_date);
    }

    #[test]
    fn test_select_with_predicate() {
        let storage = create_test_storage();
        storage.insert(&study("Spain", "Europe", "A")).unwrap();
        storage.insert(&study("Japan", "Asia", "B")).unwrap();

        let rows: Vec<StudyRecord> = storage
            .select(
                "continent = ?1",
                &[Value::Text("Asia".to_string())],
                "id DESC",
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].country, "Japan");
    }

    #[test]
    fn test_malformed_courses_do_not_fail_the_query() {
        crate::logging::init_test_logging();
        let storage = create_test_storage();
        let good = storage.insert(&study("Spain", "Europe", "A")).unwrap();
        let bad = storage.insert(&study("Spain", "Europe", "B")).unwrap();
        storage
            .conn
            .execute(
                "UPDATE study_abroad SET courses_json = '{oops' WHERE id = ?1",
                [bad],
            )
            .unwrap();

        let rows: Vec<StudyRecord> = storage.select("1=1", &[], "id ASC").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, Some(good));
        assert_eq!(rows[0].courses.len(), 1);
        assert!(rows[1].courses.is_empty());
    }

    #[test]
    fn test_distinct_values() {
        let storage = create_test_storage();
        storage.insert(&study("Spain", "Europe", "A")).unwrap();
        storage.insert(&study("Spain", "Europe", "A")).unwrap();
        storage.insert(&study("Chile", "Südamerika", "B")).unwrap();

        let mut universities = storage
            .distinct_values(Table::Study, "university", false)
            .unwrap();
        universities.sort();
        assert_eq!(universities, ["A", "B"]);

        let continents = storage
            .distinct_values(Table::Study, "continent", true)
            .unwrap();
        assert_eq!(continents, ["Europe", "Südamerika"]);
    }

    #[test]
    fn test_distinct_values_skips_empty() {
        let storage = create_test_storage();
        storage.insert(&study("Spain", "", "A")).unwrap();
        let continents = storage
            .distinct_values(Table::Study, "continent", true)
            .unwrap();
        assert!(continents.is_empty());
    }

    #[test]
    fn test_distinct_values_unknown_column() {
        let storage = create_test_storage();
        let err = storage
            .distinct_values(Table::Internship, "university", false)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownColumn { .. }));
    }

    #[test]
    fn test_count_and_stats() {
        let storage = create_test_storage();
        storage.insert(&study("Spain", "Europe", "A")).unwrap();
        storage.insert(&internship("Acme")).unwrap();
        storage.insert(&internship("Globex")).unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.study_records, 1);
        assert_eq!(stats.internship_records, 2);
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_execute_script_is_additive() {
        let storage = create_test_storage();
        storage.insert(&study("Spain", "Europe", "A")).unwrap();
        storage
            .execute_script(
                "INSERT INTO internship_abroad (name, contact_email, country, city, \
                 company_organization, duration, overall_experience) \
                 VALUES ('C', 'c@x', 'France', 'Lyon', 'Initech', '3 months', 5);",
            )
            .unwrap();

        assert_eq!(storage.count(Table::Study).unwrap(), 1);
        assert_eq!(storage.count(Table::Internship).unwrap(), 1);
    }

    #[test]
    fn test_backup_and_restore() {
        let path = std::env::temp_dir().join(format!(
            "abroad_storage_backup_{}.sqlite",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let source = create_test_storage();
        source.insert(&study("Spain", "Europe", "A")).unwrap();
        source.insert(&internship("Acme")).unwrap();
        source.backup_to(&path).unwrap();

        let mut target = create_test_storage();
        target.insert(&study("Japan", "Asia", "B")).unwrap();
        target.insert(&study("Japan", "Asia", "C")).unwrap();
        target.restore_from(&path).unwrap();

        let rows: Vec<StudyRecord> = target.select("1=1", &[], "id").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].country, "Spain");
        assert_eq!(target.count(Table::Internship).unwrap(), 1);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_open_file_based() {
        let dir = std::env::temp_dir().join(format!("abroad_storage_test_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let db_path = dir.join("nested").join("data.sqlite");
        assert!(matches!(
            Storage::open(&db_path),
            Err(Error::DatabaseOpen { .. })
        ));

        std::fs::create_dir_all(db_path.parent().unwrap()).unwrap();
        let storage = Storage::open(&db_path).unwrap();
        storage.insert(&study("Spain", "Europe", "A")).unwrap();
        assert!(db_path.exists());
        assert!(!storage.is_in_memory());
        assert!(storage.stats().unwrap().db_size_bytes > 0);

        drop(storage);
        let reopened = Storage::open(&db_path).unwrap();
        assert_eq!(reopened.count(Table::Study).unwrap(), 1);

        drop(reopened);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
