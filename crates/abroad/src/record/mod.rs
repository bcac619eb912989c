//! Record types stored by abroad.
//!
//! Two independent tables are kept: study-abroad reports with nested course
//! and vaccination lists, and internship-abroad reports. Each record type has
//! an ordered column table in [`columns`] that drives SQL generation, row
//! decoding and form serialization.

pub mod columns;
mod internship;
pub(crate) mod lenient;
mod study;

use serde::Serialize;

pub use columns::{Column, ColumnKind, Table};
pub use internship::InternshipRecord;
pub(crate) use internship::DATE_FORMAT;
pub use study::{
    courses_to_json, parse_list, vaccinations_to_json, Course, StudyRecord, Vaccination,
};

/// The tab of the entry form a field lives on.
///
/// When validation fails the section of the first invalid field is the one
/// the form should switch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormSection {
    /// Name and contact details of the student.
    Student,
    /// Country, city and university.
    Destination,
    /// The repeated course entries.
    Courses,
    /// Fees and financing.
    Finances,
    /// Accommodation.
    Housing,
    /// Visa and vaccinations.
    Visa,
    /// Application tips and general comments.
    Remarks,
    /// The single-page internship form.
    Internship,
}

impl FormSection {
    /// The identifier of the tab in the rendered form.
    #[must_use]
    pub fn tab_id(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Destination => "destination",
            Self::Courses => "courses",
            Self::Finances => "finances",
            Self::Housing => "housing",
            Self::Visa => "visa",
            Self::Remarks => "remarks",
            Self::Internship => "internship",
        }
    }
}

impl std::fmt::Display for FormSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tab_id())
    }
}
