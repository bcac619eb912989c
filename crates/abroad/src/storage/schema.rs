//! `SQLite` schema definitions for abroad.
//!
//! Snapshots are exchanged with other tools, so the table definitions are
//! fixed text and must not drift.

use rusqlite::Connection;

use crate::error::Result;

/// SQL statement to create the study-abroad table.
pub const CREATE_STUDY_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS study_abroad (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    stud_first_name TEXT NOT NULL,
    stud_last_name TEXT NOT NULL,
    stud_email TEXT NOT NULL,
    stud_phone TEXT,
    stud_class_year TEXT NOT NULL,
    country TEXT NOT NULL,
    city TEXT NOT NULL,
    university TEXT NOT NULL,
    duration TEXT NOT NULL,
    continent TEXT NOT NULL,
    plz TEXT,
    website TEXT,
    department_website TEXT,
    study_fees BOOLEAN,
    tuition_cost TEXT,
    financing_methods TEXT,
    courses_json TEXT,
    housing_type TEXT,
    housing_link TEXT,
    housing_quality INTEGER,
    housing_comments TEXT,
    housing_cost REAL,
    visa_needed BOOLEAN,
    visa_cost REAL,
    visa_embassy TEXT,
    visa_embassy_location TEXT,
    visa_application_time TEXT,
    visa_comments TEXT,
    visa_embassy_website TEXT,
    visa_embassy_email TEXT,
    visa_embassy_phone TEXT,
    vaccinations_json TEXT,
    application_tips TEXT,
    general_comments TEXT,
    financial_aid_amount TEXT
)
";

/// SQL statement to create the internship-abroad table.
pub const CREATE_INTERNSHIP_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS internship_abroad (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    contact_email TEXT NOT NULL,
    country TEXT NOT NULL,
    city TEXT NOT NULL,
    company_organization TEXT NOT NULL,
    duration TEXT NOT NULL,
    stipend_amount TEXT,
    financing_methods TEXT,
    work_description TEXT,
    skills_learned TEXT,
    application_tips TEXT,
    general_comments TEXT,
    overall_experience INTEGER NOT NULL,
    submission_date DATE DEFAULT CURRENT_DATE
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_STUDY_TABLE, CREATE_INTERNSHIP_TABLE];

/// Create both tables if they don't exist yet.
///
/// # Errors
///
/// Returns an error if a statement fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }
    Ok(())
}
