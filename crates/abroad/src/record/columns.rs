//! Ordered column tables for both record types.
//!
//! The position of a column in [`STUDY_COLUMNS`] or [`INTERNSHIP_COLUMNS`]
//! fixes its position in every generated `INSERT`, `UPDATE` and `SELECT`.
//! `id` is not listed; storage reads it separately and never writes it.

use rusqlite::types::Value;

use super::internship::{parse_date, DATE_FORMAT};
use super::lenient::{opt_text, sql_flag, sql_int, sql_text};
use super::study::{courses_to_json, decode_list, vaccinations_to_json};
use super::{FormSection, InternshipRecord, StudyRecord};

/// How a column's value is stored and submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Free text.
    Text,
    /// An integer such as a rating.
    Integer,
    /// An amount of money; submitted as text and left to column affinity.
    Real,
    /// A checkbox, stored as 1 or 0.
    Boolean,
    /// A JSON list built from repeated form groups, never submitted by name.
    Json,
    /// A `YYYY-MM-DD` date.
    Date,
}

/// Description of one stored column of record type `R`.
#[derive(Debug)]
pub struct Column<R: 'static> {
    /// Column name; also the form field name.
    pub name: &'static str,
    /// Storage kind.
    pub kind: ColumnKind,
    /// Whether the schema allows NULL.
    pub nullable: bool,
    /// Whether the entry form insists on a value.
    pub required: bool,
    /// Form tab the field is shown on.
    pub section: FormSection,
    /// Read the column value out of a record.
    pub get: fn(&R) -> Value,
    /// Assign a stored or submitted value to a record.
    pub set: fn(&mut R, Value),
}

impl<R: 'static> Column<R> {
    /// Convert submitted form text into the value this column stores.
    ///
    /// Empty text is NULL. Booleans always produce 1 or 0.
    #[must_use]
    pub fn form_value(&self, text: Option<&str>) -> Value {
        let text = text.filter(|s| !s.is_empty());
        match self.kind {
            ColumnKind::Boolean => Value::Integer(i64::from(
                text.is_some_and(super::lenient::text_flag),
            )),
            ColumnKind::Integer => text
                .and_then(|s| s.trim().parse::<i64>().ok())
                .map_or(Value::Null, Value::Integer),
            ColumnKind::Text | ColumnKind::Real | ColumnKind::Date | ColumnKind::Json => {
                text.map_or(Value::Null, |s| Value::Text(s.to_string()))
            }
        }
    }
}

/// The two tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// `study_abroad`
    Study,
    /// `internship_abroad`
    Internship,
}

impl Table {
    /// SQL table name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Study => "study_abroad",
            Self::Internship => "internship_abroad",
        }
    }

    /// Names of all stored columns except `id`, in order.
    #[must_use]
    pub fn column_names(self) -> Vec<&'static str> {
        match self {
            Self::Study => STUDY_COLUMNS.iter().map(|c| c.name).collect(),
            Self::Internship => INTERNSHIP_COLUMNS.iter().map(|c| c.name).collect(),
        }
    }

    /// Look up a column name, returning the static name on success.
    #[must_use]
    pub fn column(self, name: &str) -> Option<&'static str> {
        self.column_names().into_iter().find(|c| *c == name)
    }
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn required(value: Value) -> String {
    sql_text(value).unwrap_or_default()
}

fn opt_int(value: Option<i64>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}

fn flag(value: bool) -> Value {
    Value::Integer(i64::from(value))
}

/// Columns of `study_abroad`, in schema order.
pub static STUDY_COLUMNS: &[Column<StudyRecord>] = &[
    Column {
        name: "stud_first_name",
        kind: ColumnKind::Text,
        nullable: false,
        required: true,
        section: FormSection::Student,
        get: |r| text(&r.stud_first_name),
        set: |r, v| r.stud_first_name = required(v),
    },
    Column {
        name: "stud_last_name",
        kind: ColumnKind::Text,
        nullable: false,
        required: true,
        section: FormSection::Student,
        get: |r| text(&r.stud_last_name),
        set: |r, v| r.stud_last_name = required(v),
    },
    Column {
        name: "stud_email",
        kind: ColumnKind::Text,
        nullable: false,
        required: true,
        section: FormSection::Student,
        get: |r| text(&r.stud_email),
        set: |r, v| r.stud_email = required(v),
    },
    Column {
        name: "stud_phone",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Student,
        get: |r| opt_text(r.stud_phone.as_ref()),
        set: |r, v| r.stud_phone = sql_text(v),
    },
    Column {
        name: "stud_class_year",
        kind: ColumnKind::Text,
        nullable: false,
        required: true,
        section: FormSection::Student,
        get: |r| text(&r.stud_class_year),
        set: |r, v| r.stud_class_year = required(v),
    },
    Column {
        name: "country",
        kind: ColumnKind::Text,
        nullable: false,
        required: true,
        section: FormSection::Destination,
        get: |r| text(&r.country),
        set: |r, v| r.country = required(v),
    },
    Column {
        name: "city",
        kind: ColumnKind::Text,
        nullable: false,
        required: true,
        section: FormSection::Destination,
        get: |r| text(&r.city),
        set: |r, v| r.city = required(v),
    },
    Column {
        name: "university",
        kind: ColumnKind::Text,
        nullable: false,
        required: true,
        section: FormSection::Destination,
        get: |r| text(&r.university),
        set: |r, v| r.university = required(v),
    },
    Column {
        name: "duration",
        kind: ColumnKind::Text,
        nullable: false,
        required: true,
        section: FormSection::Destination,
        get: |r| text(&r.duration),
        set: |r, v| r.duration = required(v),
    },
    Column {
        name: "continent",
        kind: ColumnKind::Text,
        nullable: false,
        required: true,
        section: FormSection::Destination,
        get: |r| text(&r.continent),
        set: |r, v| r.continent = required(v),
    },
    Column {
        name: "plz",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Destination,
        get: |r| opt_text(r.plz.as_ref()),
        set: |r, v| r.plz = sql_text(v),
    },
    Column {
        name: "website",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Destination,
        get: |r| opt_text(r.website.as_ref()),
        set: |r, v| r.website = sql_text(v),
    },
    Column {
        name: "department_website",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Destination,
        get: |r| opt_text(r.department_website.as_ref()),
        set: |r, v| r.department_website = sql_text(v),
    },
    Column {
        name: "study_fees",
        kind: ColumnKind::Boolean,
        nullable: true,
        required: false,
        section: FormSection::Finances,
        get: |r| flag(r.study_fees),
        set: |r, v| r.study_fees = sql_flag(&v),
    },
    Column {
        name: "tuition_cost",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Finances,
        get: |r| opt_text(r.tuition_cost.as_ref()),
        set: |r, v| r.tuition_cost = sql_text(v),
    },
    Column {
        name: "financing_methods",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Finances,
        get: |r| opt_text(r.financing_methods.as_ref()),
        set: |r, v| r.financing_methods = sql_text(v),
    },
    Column {
        name: "courses_json",
        kind: ColumnKind::Json,
        nullable: true,
        required: false,
        section: FormSection::Courses,
        get: |r| Value::Text(courses_to_json(&r.courses)),
        set: |r, v| r.courses = decode_list(r.id, "courses_json", sql_text(v).as_deref()),
    },
    Column {
        name: "housing_type",
        kind: ColumnKind::Text,
        nullable: true,
        required: true,
        section: FormSection::Housing,
        get: |r| opt_text(r.housing_type.as_ref()),
        set: |r, v| r.housing_type = sql_text(v),
    },
    Column {
        name: "housing_link",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Housing,
        get: |r| opt_text(r.housing_link.as_ref()),
        set: |r, v| r.housing_link = sql_text(v),
    },
    Column {
        name: "housing_quality",
        kind: ColumnKind::Integer,
        nullable: true,
        required: false,
        section: FormSection::Housing,
        get: |r| opt_int(r.housing_quality),
        set: |r, v| r.housing_quality = sql_int(v),
    },
    Column {
        name: "housing_comments",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Housing,
        get: |r| opt_text(r.housing_comments.as_ref()),
        set: |r, v| r.housing_comments = sql_text(v),
    },
    Column {
        name: "housing_cost",
        kind: ColumnKind::Real,
        nullable: true,
        required: false,
        section: FormSection::Housing,
        get: |r| opt_text(r.housing_cost.as_ref()),
        set: |r, v| r.housing_cost = sql_text(v),
    },
    Column {
        name: "visa_needed",
        kind: ColumnKind::Boolean,
        nullable: true,
        required: false,
        section: FormSection::Visa,
        get: |r| flag(r.visa_needed),
        set: |r, v| r.visa_needed = sql_flag(&v),
    },
    Column {
        name: "visa_cost",
        kind: ColumnKind::Real,
        nullable: true,
        required: false,
        section: FormSection::Visa,
        get: |r| opt_text(r.visa_cost.as_ref()),
        set: |r, v| r.visa_cost = sql_text(v),
    },
    Column {
        name: "visa_embassy",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Visa,
        get: |r| opt_text(r.visa_embassy.as_ref()),
        set: |r, v| r.visa_embassy = sql_text(v),
    },
    Column {
        name: "visa_embassy_location",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Visa,
        get: |r| opt_text(r.visa_embassy_location.as_ref()),
        set: |r, v| r.visa_embassy_location = sql_text(v),
    },
    Column {
        name: "visa_application_time",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Visa,
        get: |r| opt_text(r.visa_application_time.as_ref()),
        set: |r, v| r.visa_application_time = sql_text(v),
    },
    Column {
        name: "visa_comments",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Visa,
        get: |r| opt_text(r.visa_comments.as_ref()),
        set: |r, v| r.visa_comments = sql_text(v),
    },
    Column {
        name: "visa_embassy_website",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Visa,
        get: |r| opt_text(r.visa_embassy_website.as_ref()),
        set: |r, v| r.visa_embassy_website = sql_text(v),
    },
    Column {
        name: "visa_embassy_email",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Visa,
        get: |r| opt_text(r.visa_embassy_email.as_ref()),
        set: |r, v| r.visa_embassy_email = sql_text(v),
    },
    Column {
        name: "visa_embassy_phone",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Visa,
        get: |r| opt_text(r.visa_embassy_phone.as_ref()),
        set: |r, v| r.visa_embassy_phone = sql_text(v),
    },
    Column {
        name: "vaccinations_json",
        kind: ColumnKind::Json,
        nullable: true,
        required: false,
        section: FormSection::Visa,
        get: |r| Value::Text(vaccinations_to_json(&r.vaccinations)),
        set: |r, v| {
            r.vaccinations = decode_list(r.id, "vaccinations_json", sql_text(v).as_deref());
        },
    },
    Column {
        name: "application_tips",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Remarks,
        get: |r| opt_text(r.application_tips.as_ref()),
        set: |r, v| r.application_tips = sql_text(v),
    },
    Column {
        name: "general_comments",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Remarks,
        get: |r| opt_text(r.general_comments.as_ref()),
        set: |r, v| r.general_comments = sql_text(v),
    },
    Column {
        name: "financial_aid_amount",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Finances,
        get: |r| opt_text(r.financial_aid_amount.as_ref()),
        set: |r, v| r.financial_aid_amount = sql_text(v),
    },
];

/// Columns of `internship_abroad`, in schema order.
pub static INTERNSHIP_COLUMNS: &[Column<InternshipRecord>] = &[
    Column {
        name: "name",
        kind: ColumnKind::Text,
        nullable: false,
        required: true,
        section: FormSection::Internship,
        get: |r| text(&r.name),
        set: |r, v| r.name = required(v),
    },
    Column {
        name: "contact_email",
        kind: ColumnKind::Text,
        nullable: false,
        required: true,
        section: FormSection::Internship,
        get: |r| text(&r.contact_email),
        set: |r, v| r.contact_email = required(v),
    },
    Column {
        name: "country",
        kind: ColumnKind::Text,
        nullable: false,
        required: true,
        section: FormSection::Internship,
        get: |r| text(&r.country),
        set: |r, v| r.country = required(v),
    },
    Column {
        name: "city",
        kind: ColumnKind::Text,
        nullable: false,
        required: true,
        section: FormSection::Internship,
        get: |r| text(&r.city),
        set: |r, v| r.city = required(v),
    },
    Column {
        name: "company_organization",
        kind: ColumnKind::Text,
        nullable: false,
        required: true,
        section: FormSection::Internship,
        get: |r| text(&r.company_organization),
        set: |r, v| r.company_organization = required(v),
    },
    Column {
        name: "duration",
        kind: ColumnKind::Text,
        nullable: false,
        required: true,
        section: FormSection::Internship,
        get: |r| text(&r.duration),
        set: |r, v| r.duration = required(v),
    },
    Column {
        name: "stipend_amount",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Internship,
        get: |r| opt_text(r.stipend_amount.as_ref()),
        set: |r, v| r.stipend_amount = sql_text(v),
    },
    Column {
        name: "financing_methods",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Internship,
        get: |r| opt_text(r.financing_methods.as_ref()),
        set: |r, v| r.financing_methods = sql_text(v),
    },
    Column {
        name: "work_description",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Internship,
        get: |r| opt_text(r.work_description.as_ref()),
        set: |r, v| r.work_description = sql_text(v),
    },
    Column {
        name: "skills_learned",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Internship,
        get: |r| opt_text(r.skills_learned.as_ref()),
        set: |r, v| r.skills_learned = sql_text(v),
    },
    Column {
        name: "application_tips",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Internship,
        get: |r| opt_text(r.application_tips.as_ref()),
        set: |r, v| r.application_tips = sql_text(v),
    },
    Column {
        name: "general_comments",
        kind: ColumnKind::Text,
        nullable: true,
        required: false,
        section: FormSection::Internship,
        get: |r| opt_text(r.general_comments.as_ref()),
        set: |r, v| r.general_comments = sql_text(v),
    },
    Column {
        name: "overall_experience",
        kind: ColumnKind::Integer,
        nullable: false,
        required: true,
        section: FormSection::Internship,
        get: |r| Value::Integer(r.overall_experience),
        set: |r, v| r.overall_experience = sql_int(v).unwrap_or_default(),
    },
    Column {
        name: "submission_date",
        kind: ColumnKind::Date,
        nullable: true,
        required: false,
        section: FormSection::Internship,
        get: |r| {
            r.submission_date
                .map_or(Value::Null, |d| Value::Text(d.format(DATE_FORMAT).to_string()))
        },
        set: |r, v| r.submission_date = sql_text(v).as_deref().and_then(parse_date),
    },
];
