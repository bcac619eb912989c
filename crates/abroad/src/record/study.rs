//! Study-abroad records and their nested course and vaccination lists.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::lenient;

/// One course taken abroad, stored as an element of `courses_json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Course title. Entries without a title are never stored.
    #[serde(default, deserialize_with = "lenient::text_or_empty")]
    pub title: String,
    /// Lecturer or coordinator.
    #[serde(default, deserialize_with = "lenient::text")]
    pub responsible_person: Option<String>,
    /// Link to the course page.
    #[serde(default, deserialize_with = "lenient::text")]
    pub link: Option<String>,
    /// Kind of exam.
    #[serde(default, deserialize_with = "lenient::text")]
    pub exam_type: Option<String>,
    /// Difficulty from 1 (very easy) to 5 (very hard).
    #[serde(default, deserialize_with = "lenient::rating")]
    pub difficulty: Option<i64>,
    /// Free-form notes.
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    /// Contact address of the responsible person.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    /// Credit points.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub ects: Option<String>,
}

impl Course {
    /// Create a course with only a title set.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Whether this entry would be stored.
    #[must_use]
    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }
}

/// One vaccination, stored as an element of `vaccinations_json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vaccination {
    /// Which vaccination. Entries without it are never stored.
    #[serde(default, deserialize_with = "lenient::text_or_empty")]
    pub which: String,
    /// What it cost.
    #[serde(rename = "costs", default, deserialize_with = "lenient::text")]
    pub cost: Option<String>,
    /// Notes, e.g. whether health insurance paid for it.
    #[serde(default, deserialize_with = "lenient::text")]
    pub comments: Option<String>,
}

impl Vaccination {
    /// Whether this entry would be stored.
    #[must_use]
    pub fn has_name(&self) -> bool {
        !self.which.is_empty()
    }
}

/// A study-abroad experience report (`study_abroad` table).
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudyRecord {
    /// Row id, `None` until inserted.
    pub id: Option<i64>,
    pub stud_first_name: String,
    pub stud_last_name: String,
    pub stud_email: String,
    pub stud_phone: Option<String>,
    pub stud_class_year: String,
    pub country: String,
    pub city: String,
    pub university: String,
    pub duration: String,
    pub continent: String,
    /// Postal code of the university.
    pub plz: Option<String>,
    pub website: Option<String>,
    pub department_website: Option<String>,
    /// Whether the university charges study fees.
    pub study_fees: bool,
    pub tuition_cost: Option<String>,
    pub financing_methods: Option<String>,
    pub financial_aid_amount: Option<String>,
    pub courses: Vec<Course>,
    pub housing_type: Option<String>,
    pub housing_link: Option<String>,
    /// Housing quality from 1 (not recommended) to 5 (highly recommended).
    pub housing_quality: Option<i64>,
    pub housing_comments: Option<String>,
    pub housing_cost: Option<String>,
    pub visa_needed: bool,
    pub visa_cost: Option<String>,
    pub visa_embassy: Option<String>,
    pub visa_embassy_location: Option<String>,
    pub visa_application_time: Option<String>,
    pub visa_comments: Option<String>,
    pub visa_embassy_website: Option<String>,
    pub visa_embassy_email: Option<String>,
    pub visa_embassy_phone: Option<String>,
    pub vaccinations: Vec<Vaccination>,
    pub application_tips: Option<String>,
    pub general_comments: Option<String>,
}

impl StudyRecord {
    /// Full name of the student.
    #[must_use]
    pub fn student_name(&self) -> String {
        format!("{} {}", self.stud_first_name, self.stud_last_name)
            .trim()
            .to_string()
    }

    /// Whether the record satisfies the entry workflow's course requirement.
    #[must_use]
    pub fn has_course(&self) -> bool {
        self.courses.iter().any(Course::has_title)
    }
}

/// Serialize a course list into its stored JSON text.
#[must_use]
pub fn courses_to_json(courses: &[Course]) -> String {
    list_to_json(courses)
}

/// Serialize a vaccination list into its stored JSON text.
#[must_use]
pub fn vaccinations_to_json(vaccinations: &[Vaccination]) -> String {
    list_to_json(vaccinations)
}

fn list_to_json<T: Serialize>(items: &[T]) -> String {
    // Plain structs of strings and integers always serialize.
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Parse stored JSON list text.
///
/// Absent, blank and `null` content reads as an empty list.
///
/// # Errors
///
/// Returns an error if the text is not a JSON array of objects.
pub fn parse_list<T>(text: Option<&str>) -> serde_json::Result<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
{
    match text.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(text) => Ok(serde_json::from_str::<Option<Vec<T>>>(text)?.unwrap_or_default()),
    }
}

/// Parse stored JSON list text, substituting an empty list for malformed
/// content so that one bad row never breaks a listing.
pub(crate) fn decode_list<T>(id: Option<i64>, column: &str, text: Option<&str>) -> Vec<T>
where
    T: for<'de> Deserialize<'de>,
{
    parse_list(text).unwrap_or_else(|e| {
        warn!(
            "Ignoring malformed {} in study record {}: {}",
            column,
            id.map_or_else(|| "(new)".to_string(), |id| id.to_string()),
            e
        );
        Vec::new()
    })
}
