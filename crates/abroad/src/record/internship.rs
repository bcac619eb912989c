//! Internship-abroad records.

use chrono::NaiveDate;
use serde::Serialize;

/// Format of the `submission_date` column (`CURRENT_DATE`).
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// An internship-abroad experience report (`internship_abroad` table).
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InternshipRecord {
    /// Row id, `None` until inserted.
    pub id: Option<i64>,
    pub name: String,
    pub contact_email: String,
    pub country: String,
    pub city: String,
    pub company_organization: String,
    pub duration: String,
    /// Monthly stipend.
    pub stipend_amount: Option<String>,
    pub financing_methods: Option<String>,
    pub work_description: Option<String>,
    pub skills_learned: Option<String>,
    pub application_tips: Option<String>,
    pub general_comments: Option<String>,
    /// Overall rating of the internship.
    pub overall_experience: i64,
    /// Defaults to the insert date when not supplied.
    pub submission_date: Option<NaiveDate>,
}

/// Parse a stored submission date.
pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}
