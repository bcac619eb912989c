//! Entry forms for both record types.
//!
//! A submission arrives as flat [`FormData`]: field name to text, the way a
//! browser posts a form. [`StudyForm::from_form_data`] is the only place that
//! knows about the numbered `course_<key>_<i>` and `vaccination_<key>_<i>`
//! field groups; from there on courses and vaccinations travel as typed
//! lists. Validation and serialization into a row are driven by the column
//! tables in [`crate::record::columns`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value as Json;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::record::columns::{Column, ColumnKind, INTERNSHIP_COLUMNS, STUDY_COLUMNS};
use crate::record::lenient::sql_text;
use crate::record::{Course, FormSection, InternshipRecord, StudyRecord, Vaccination};

/// Hidden field carrying the id of the record being edited.
pub const ENTRY_ID_FIELD: &str = "entry_id";

/// Value a checked checkbox submits.
const CHECKED: &str = "on";

const COURSE_PREFIX: &str = "course_";
const COURSE_KEYS: &[&str] = &[
    "title",
    "ects",
    "responsible_person",
    "link",
    "exam_type",
    "difficulty",
    "description",
    "email",
];

const VACCINATION_PREFIX: &str = "vaccination_";
const VACCINATION_KEYS: &[&str] = &["which", "costs", "comments"];

/// Field reported when no course has a title.
const FIRST_COURSE_TITLE: &str = "course_title_0";

/// Flat form submission: field names to text, in submission order.
///
/// A name may occur more than once; lookups return the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, String)>,
}

impl FormData {
    /// Create an empty submission.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replace the first value submitted under `name`, or append it.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value.into(),
            None => self.entries.push((name, value.into())),
        }
    }

    /// Get the first value submitted under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether a field was submitted under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over the submitted field names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Iterate over the submitted fields.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of submitted fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse `name=value` arguments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FormInput`] for an argument without `=`.
    pub fn parse_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self> {
        let mut data = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| Error::form_input(format!("expected name=value, got '{pair}'")))?;
            data.append(name.trim(), value);
        }
        Ok(data)
    }

    /// Parse a JSON object of scalar fields.
    ///
    /// `true` submits a checked checkbox. `false` and `null` submit an empty
    /// value, which unchecks a box and clears a field when editing.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON object of scalars.
    pub fn from_json(text: &str) -> Result<Self> {
        let Json::Object(object) = serde_json::from_str::<Json>(text)? else {
            return Err(Error::form_input("form JSON must be an object"));
        };

        let mut data = Self::new();
        for (name, value) in object {
            match value {
                Json::String(s) => data.append(name, s),
                Json::Number(n) => data.append(name, n.to_string()),
                Json::Bool(true) => data.append(name, CHECKED),
                Json::Bool(false) | Json::Null => data.append(name, ""),
                Json::Array(_) | Json::Object(_) => {
                    return Err(Error::form_input(format!(
                        "field '{name}' must be a string, number or boolean"
                    )));
                }
            }
        }
        Ok(data)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = Self::new();
        for (name, value) in iter {
            data.append(name, value);
        }
        data
    }
}

/// A submission that failed validation. Nothing was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    /// Every offending field, in form order.
    pub invalid_fields: Vec<String>,
    /// The tab holding the first offending field.
    pub section: FormSection,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Please fill out all required fields: {} (see the {} tab).",
            self.invalid_fields.join(", "),
            self.section
        )
    }
}

/// Scalar field values keyed by column name.
type Fields = BTreeMap<&'static str, String>;

/// Collect the known scalar columns out of a submission.
fn scalar_fields<R: 'static>(columns: &'static [Column<R>], data: &FormData) -> Fields {
    columns
        .iter()
        .filter(|c| c.kind != ColumnKind::Json)
        .filter_map(|c| data.get(c.name).map(|value| (c.name, value.to_string())))
        .collect()
}

fn field_is_empty(fields: &Fields, name: &str) -> bool {
    fields.get(name).is_none_or(String::is_empty)
}

/// Required columns that are missing or empty, in column order.
fn missing_required<R: 'static>(
    columns: &'static [Column<R>],
    fields: &Fields,
) -> Vec<(String, FormSection)> {
    columns
        .iter()
        .filter(|c| c.required && field_is_empty(fields, c.name))
        .map(|c| (c.name.to_string(), c.section))
        .collect()
}

/// Build a row from scalar fields; JSON columns are left to the caller.
fn fields_to_record<R: Default + 'static>(columns: &'static [Column<R>], fields: &Fields) -> R {
    let mut record = R::default();
    for column in columns.iter().filter(|c| c.kind != ColumnKind::Json) {
        let value = column.form_value(fields.get(column.name).map(String::as_str));
        (column.set)(&mut record, value);
    }
    record
}

/// Inverse of [`fields_to_record`]: the text each field would show.
fn record_to_fields<R: 'static>(columns: &'static [Column<R>], record: &R) -> Fields {
    columns
        .iter()
        .filter(|c| c.kind != ColumnKind::Json)
        .filter_map(|column| {
            let value = (column.get)(record);
            let text = match column.kind {
                ColumnKind::Boolean => {
                    crate::record::lenient::sql_flag(&value).then(|| CHECKED.to_string())
                }
                _ => sql_text(value),
            };
            text.map(|t| (column.name, t))
        })
        .collect()
}

/// Whether `name` is `<prefix><key>_<index>` for one of `keys`.
fn is_group_field(name: &str, prefix: &str, keys: &[&str]) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.rsplit_once('_'))
        .is_some_and(|(key, index)| keys.contains(&key) && index.parse::<usize>().is_ok())
}

/// Scan numbered field groups 0, 1, 2, … until a group has no field at all.
fn scan_groups<T>(
    data: &FormData,
    prefix: &str,
    keys: &[&str],
    build: impl Fn(&dyn Fn(&str) -> Option<String>) -> T,
) -> Vec<T> {
    let mut items = Vec::new();
    for index in 0.. {
        let field = |key: &str| data.get(&format!("{prefix}{key}_{index}")).map(str::to_string);
        if keys.iter().all(|key| field(key).is_none()) {
            break;
        }
        items.push(build(&field));
    }
    items
}

fn is_integer(value: &str) -> bool {
    value.trim().parse::<i64>().is_ok()
}

fn is_date(value: &str) -> bool {
    chrono::NaiveDate::parse_from_str(value.trim(), crate::record::DATE_FORMAT).is_ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn warn_unknown(data: &FormData, known: impl Fn(&str) -> bool, form: &str) {
    for name in data.names().filter(|name| !known(name)) {
        warn!("Ignoring unknown field '{}' in {} form", name, form);
    }
}

/// The study-abroad entry form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudyForm {
    /// Set when editing an existing record.
    pub entry_id: Option<i64>,
    fields: Fields,
    /// Course entries, including untitled ones still being filled in.
    pub courses: Vec<Course>,
    /// Vaccination entries, including unnamed ones.
    pub vaccinations: Vec<Vaccination>,
}

impl Default for StudyForm {
    fn default() -> Self {
        Self::pristine()
    }
}

impl StudyForm {
    /// A blank form with one empty course and one empty vaccination entry.
    #[must_use]
    pub fn pristine() -> Self {
        Self {
            entry_id: None,
            fields: Fields::new(),
            courses: vec![Course::default()],
            vaccinations: vec![Vaccination::default()],
        }
    }

    /// Read a flat submission.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FormInput`] if `entry_id` is present but not an integer.
    pub fn from_form_data(data: &FormData) -> Result<Self> {
        let entry_id = match data.get(ENTRY_ID_FIELD).map(str::trim) {
            None | Some("") => None,
            Some(id) => Some(
                id.parse::<i64>()
                    .map_err(|_| Error::form_input(format!("invalid entry id '{id}'")))?,
            ),
        };

        let courses = scan_groups(data, COURSE_PREFIX, COURSE_KEYS, |field| Course {
            title: field("title").unwrap_or_default(),
            responsible_person: non_empty(field("responsible_person")),
            link: non_empty(field("link")),
            exam_type: non_empty(field("exam_type")),
            difficulty: field("difficulty").and_then(|d| d.trim().parse().ok()),
            description: non_empty(field("description")),
            email: non_empty(field("email")),
            ects: non_empty(field("ects")),
        });

        let vaccinations = scan_groups(data, VACCINATION_PREFIX, VACCINATION_KEYS, |field| {
            Vaccination {
                which: field("which").unwrap_or_default(),
                cost: non_empty(field("costs")),
                comments: non_empty(field("comments")),
            }
        });

        warn_unknown(
            data,
            |name| {
                name == ENTRY_ID_FIELD
                    || STUDY_COLUMNS
                        .iter()
                        .any(|c| c.name == name && c.kind != ColumnKind::Json)
                    || is_group_field(name, COURSE_PREFIX, COURSE_KEYS)
                    || is_group_field(name, VACCINATION_PREFIX, VACCINATION_KEYS)
            },
            "study",
        );

        Ok(Self {
            entry_id,
            fields: scalar_fields(STUDY_COLUMNS, data),
            courses,
            vaccinations,
        })
    }

    /// Load a stored record for editing.
    ///
    /// The draft always has at least one course and one vaccination entry.
    #[must_use]
    pub fn from_record(record: &StudyRecord) -> Self {
        let mut courses = record.courses.clone();
        if courses.is_empty() {
            courses.push(Course::default());
        }
        let mut vaccinations = record.vaccinations.clone();
        if vaccinations.is_empty() {
            vaccinations.push(Vaccination::default());
        }

        Self {
            entry_id: record.id,
            fields: record_to_fields(STUDY_COLUMNS, record),
            courses,
            vaccinations,
        }
    }

    /// Value of a scalar field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Set a scalar field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] if `name` is not a scalar study column.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let column = STUDY_COLUMNS
            .iter()
            .find(|c| c.name == name && c.kind != ColumnKind::Json)
            .ok_or_else(|| Error::UnknownColumn {
                table: crate::record::Table::Study.name(),
                column: name.to_string(),
            })?;
        self.fields.insert(column.name, value.into());
        Ok(())
    }

    /// Overlay a submission on this draft.
    ///
    /// Scalar fields present in `data` replace the draft's values. The course
    /// and vaccination lists are replaced only when `data` starts a new group 0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FormInput`] if `entry_id` is present but not an integer.
    pub fn apply(&mut self, data: &FormData) -> Result<()> {
        let update = Self::from_form_data(data)?;
        if update.entry_id.is_some() {
            self.entry_id = update.entry_id;
        }
        self.fields.extend(update.fields);
        if !update.courses.is_empty() {
            self.courses = update.courses;
        }
        if !update.vaccinations.is_empty() {
            self.vaccinations = update.vaccinations;
        }
        Ok(())
    }

    /// Whether this draft edits an existing record.
    #[must_use]
    pub fn is_edit(&self) -> bool {
        self.entry_id.is_some()
    }

    /// Check required fields and the course requirement.
    ///
    /// # Errors
    ///
    /// Returns every offending field and the tab of the first one.
    pub fn validate(&self) -> std::result::Result<(), ValidationFailure> {
        let mut invalid = missing_required(STUDY_COLUMNS, &self.fields);
        if !self.courses.iter().any(Course::has_title) {
            invalid.push((FIRST_COURSE_TITLE.to_string(), FormSection::Courses));
        }

        match invalid.first() {
            None => Ok(()),
            Some(&(_, section)) => {
                debug!("Study form rejected: {} invalid fields", invalid.len());
                Err(ValidationFailure {
                    section,
                    invalid_fields: invalid.into_iter().map(|(name, _)| name).collect(),
                })
            }
        }
    }

    /// Serialize into a row. Untitled courses and unnamed vaccinations are dropped.
    #[must_use]
    pub fn to_record(&self) -> StudyRecord {
        let mut record: StudyRecord = fields_to_record(STUDY_COLUMNS, &self.fields);
        record.id = self.entry_id;
        record.courses = self
            .courses
            .iter()
            .filter(|c| c.has_title())
            .cloned()
            .collect();
        record.vaccinations = self
            .vaccinations
            .iter()
            .filter(|v| v.has_name())
            .cloned()
            .collect();
        record
    }
}

/// The internship-abroad entry form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InternshipForm {
    fields: Fields,
}

impl InternshipForm {
    /// Read a flat submission. Unknown fields are ignored.
    #[must_use]
    pub fn from_form_data(data: &FormData) -> Self {
        warn_unknown(
            data,
            |name| INTERNSHIP_COLUMNS.iter().any(|c| c.name == name),
            "internship",
        );
        Self {
            fields: scalar_fields(INTERNSHIP_COLUMNS, data),
        }
    }

    /// Value of a field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Check required fields. The overall rating must be a whole number and
    /// a submission date, when given, must be `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns every offending field.
    pub fn validate(&self) -> std::result::Result<(), ValidationFailure> {
        let mut invalid = missing_required(INTERNSHIP_COLUMNS, &self.fields);
        let malformed = [
            ("overall_experience", is_integer as fn(&str) -> bool),
            ("submission_date", is_date),
        ];
        for (name, well_formed) in malformed {
            let given = self.field(name).filter(|v| !v.is_empty());
            if given.is_some_and(|v| !well_formed(v)) {
                invalid.push((name.to_string(), FormSection::Internship));
            }
        }

        if invalid.is_empty() {
            Ok(())
        } else {
            debug!("Internship form rejected: {} invalid fields", invalid.len());
            Err(ValidationFailure {
                invalid_fields: invalid.into_iter().map(|(name, _)| name).collect(),
                section: FormSection::Internship,
            })
        }
    }

    /// Serialize into a row.
    #[must_use]
    pub fn to_record(&self) -> InternshipRecord {
        fields_to_record(INTERNSHIP_COLUMNS, &self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_study_data() -> FormData {
        [
            ("stud_first_name", "Ana"),
            ("stud_last_name", "Lopez"),
            ("stud_email", "ana@example.org"),
            ("stud_class_year", "2022"),
            ("country", "Spain"),
            ("city", "Sevilla"),
            ("university", "Universidad de Sevilla"),
            ("duration", "WS 2024/25"),
            ("continent", "Europe"),
            ("housing_type", "Dormitory"),
            ("course_title_0", "Econ 101"),
            ("course_difficulty_0", "3"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_parse_pairs() {
        let data = FormData::parse_pairs(&["city=Sevilla", "plz=", "tips=a=b"]).unwrap();
        assert_eq!(data.get("city"), Some("Sevilla"));
        assert_eq!(data.get("plz"), Some(""));
        assert_eq!(data.get("tips"), Some("a=b"));
        assert!(FormData::parse_pairs(&["nonsense"]).is_err());
    }

    #[test]
    fn test_set_replaces_first_value() {
        let mut data = FormData::parse_pairs(&["city=Sevilla", "city=Cadiz"]).unwrap();
        data.set("city", "Granada");
        data.set("plz", "18001");
        assert_eq!(data.get("city"), Some("Granada"));
        assert_eq!(data.len(), 3);
        assert_eq!(data.iter().last(), Some(("plz", "18001")));
    }

    #[test]
    fn test_from_json() {
        let data = FormData::from_json(
            r#"{"city": "Lyon", "visa_needed": true, "study_fees": false,
                "housing_quality": 4, "plz": null}"#,
        )
        .unwrap();
        assert_eq!(data.get("city"), Some("Lyon"));
        assert_eq!(data.get("visa_needed"), Some("on"));
        assert_eq!(data.get("study_fees"), Some(""));
        assert_eq!(data.get("housing_quality"), Some("4"));
        assert_eq!(data.get("plz"), Some(""));

        assert!(FormData::from_json("[1, 2]").is_err());
        assert!(FormData::from_json(r#"{"courses": []}"#).is_err());
    }

    #[test]
    fn test_course_groups_scanned_until_gap() {
        let mut data = complete_study_data();
        data.append("course_title_1", "Spanish B1");
        data.append("course_ects_1", "6");
        data.append("course_description_2", "untitled");
        data.append("course_title_4", "after the gap");

        let form = StudyForm::from_form_data(&data).unwrap();
        let titles: Vec<&str> = form.courses.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Econ 101", "Spanish B1", ""]);
        assert_eq!(form.courses[0].difficulty, Some(3));
        assert_eq!(form.courses[1].ects.as_deref(), Some("6"));

        let record = form.to_record();
        assert_eq!(record.courses.len(), 2);
    }

    #[test]
    fn test_vaccinations_skip_unnamed() {
        let mut data = complete_study_data();
        data.append("vaccination_which_0", "");
        data.append("vaccination_costs_0", "20");
        data.append("vaccination_which_1", "Yellow fever");
        data.append("vaccination_costs_1", "60");

        let record = StudyForm::from_form_data(&data).unwrap().to_record();
        assert_eq!(record.vaccinations.len(), 1);
        assert_eq!(record.vaccinations[0].which, "Yellow fever");
        assert_eq!(record.vaccinations[0].cost.as_deref(), Some("60"));
    }

    #[test]
    fn test_validate_complete_form() {
        let form = StudyForm::from_form_data(&complete_study_data()).unwrap();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_every_field_and_first_section() {
        let data: FormData = [("stud_first_name", ""), ("country", "Spain")]
            .into_iter()
            .collect();
        let failure = StudyForm::from_form_data(&data)
            .unwrap()
            .validate()
            .unwrap_err();

        assert_eq!(failure.section, FormSection::Student);
        assert_eq!(failure.invalid_fields[0], "stud_first_name");
        assert!(failure.invalid_fields.contains(&"housing_type".to_string()));
        assert!(failure.invalid_fields.contains(&"course_title_0".to_string()));
        assert!(!failure.invalid_fields.contains(&"country".to_string()));
    }

    #[test]
    fn test_validate_missing_course_names_courses_tab() {
        let mut form = StudyForm::from_form_data(&complete_study_data()).unwrap();
        form.courses = vec![Course::default()];
        let failure = form.validate().unwrap_err();
        assert_eq!(failure.invalid_fields, ["course_title_0"]);
        assert_eq!(failure.section, FormSection::Courses);
    }

    #[test]
    fn test_validate_housing_type_names_housing_tab() {
        let mut data = FormData::new();
        for (name, value) in complete_study_data().entries {
            if name != "housing_type" {
                data.append(name, value);
            }
        }
        let failure = StudyForm::from_form_data(&data)
            .unwrap()
            .validate()
            .unwrap_err();
        assert_eq!(failure.invalid_fields, ["housing_type"]);
        assert_eq!(failure.section, FormSection::Housing);
    }

    #[test]
    fn test_to_record_checkboxes_and_empty_values() {
        let mut data = complete_study_data();
        data.append("visa_needed", "on");
        data.append("plz", "");
        data.append("housing_quality", "4");

        let record = StudyForm::from_form_data(&data).unwrap().to_record();
        assert!(record.visa_needed);
        assert!(!record.study_fees);
        assert_eq!(record.plz, None);
        assert_eq!(record.housing_quality, Some(4));
        assert_eq!(record.country, "Spain");
        assert_eq!(record.id, None);
    }

    #[test]
    fn test_entry_id() {
        let mut data = complete_study_data();
        data.append(ENTRY_ID_FIELD, "12");
        let form = StudyForm::from_form_data(&data).unwrap();
        assert_eq!(form.entry_id, Some(12));
        assert!(form.is_edit());
        assert_eq!(form.to_record().id, Some(12));

        let data: FormData = [(ENTRY_ID_FIELD, "twelve")].into_iter().collect();
        assert!(StudyForm::from_form_data(&data).is_err());

        let data: FormData = [(ENTRY_ID_FIELD, "")].into_iter().collect();
        assert!(!StudyForm::from_form_data(&data).unwrap().is_edit());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        crate::logging::init_test_logging();
        let mut data = complete_study_data();
        data.append("courses_json", "[]");
        data.append("password", "hunter2");
        let form = StudyForm::from_form_data(&data).unwrap();
        assert_eq!(form.field("password"), None);
        assert_eq!(form.field("courses_json"), None);
    }

    #[test]
    fn test_group_field_names() {
        assert!(is_group_field("course_title_0", COURSE_PREFIX, COURSE_KEYS));
        assert!(is_group_field(
            "course_responsible_person_12",
            COURSE_PREFIX,
            COURSE_KEYS
        ));
        assert!(!is_group_field("course_grade_0", COURSE_PREFIX, COURSE_KEYS));
        assert!(!is_group_field("course_title_x", COURSE_PREFIX, COURSE_KEYS));
        assert!(is_group_field(
            "vaccination_costs_1",
            VACCINATION_PREFIX,
            VACCINATION_KEYS
        ));
    }

    #[test]
    fn test_pristine() {
        let form = StudyForm::pristine();
        assert_eq!(form.courses, [Course::default()]);
        assert_eq!(form.vaccinations, [Vaccination::default()]);
        assert!(!form.is_edit());
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_from_record_round_trip() {
        let mut data = complete_study_data();
        data.append("visa_needed", "on");
        data.append("housing_cost", "350");
        let record = StudyForm::from_form_data(&data).unwrap().to_record();

        let mut stored = record.clone();
        stored.id = Some(5);
        let draft = StudyForm::from_record(&stored);
        assert_eq!(draft.entry_id, Some(5));
        assert_eq!(draft.field("visa_needed"), Some("on"));
        assert_eq!(draft.field("study_fees"), None);
        assert_eq!(draft.field("housing_cost"), Some("350"));
        assert_eq!(draft.vaccinations, [Vaccination::default()]);
        assert_eq!(draft.to_record(), stored);
    }

    #[test]
    fn test_set_field() {
        let mut form = StudyForm::pristine();
        form.set_field("city", "Granada").unwrap();
        assert_eq!(form.field("city"), Some("Granada"));
        assert!(form.set_field("courses_json", "[]").is_err());
        assert!(form.set_field("nope", "x").is_err());
    }

    #[test]
    fn test_apply_overlays_draft() {
        let mut stored = StudyForm::from_form_data(&complete_study_data())
            .unwrap()
            .to_record();
        stored.id = Some(2);
        let mut draft = StudyForm::from_record(&stored);

        let update = FormData::parse_pairs(&["city=Granada"]).unwrap();
        draft.apply(&update).unwrap();
        assert_eq!(draft.entry_id, Some(2));
        assert_eq!(draft.field("city"), Some("Granada"));
        assert_eq!(draft.field("country"), Some("Spain"));
        assert_eq!(draft.courses[0].title, "Econ 101");

        let courses = FormData::parse_pairs(&["course_title_0=Stats"]).unwrap();
        draft.apply(&courses).unwrap();
        assert_eq!(draft.courses.len(), 1);
        assert_eq!(draft.courses[0].title, "Stats");
    }

    #[test]
    fn test_apply_json_false_unchecks() {
        let mut data = complete_study_data();
        data.append("visa_needed", "on");
        data.append("study_fees", "on");
        let mut stored = StudyForm::from_form_data(&data).unwrap().to_record();
        stored.id = Some(7);
        assert!(stored.visa_needed);

        let mut draft = StudyForm::from_record(&stored);
        let update = FormData::from_json(r#"{"visa_needed": false}"#).unwrap();
        draft.apply(&update).unwrap();

        let record = draft.to_record();
        assert!(!record.visa_needed);
        assert!(record.study_fees);
        assert_eq!(record.city, "Sevilla");
    }

    fn complete_internship_data() -> FormData {
        [
            ("name", "Ben"),
            ("contact_email", "ben@example.org"),
            ("country", "Japan"),
            ("city", "Osaka"),
            ("company_organization", "Acme"),
            ("duration", "6 months"),
            ("overall_experience", "4"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_internship_form() {
        let mut data = complete_internship_data();
        data.append("stipend_amount", "800");
        data.append("id", "99");
        let form = InternshipForm::from_form_data(&data);
        assert!(form.validate().is_ok());

        let record = form.to_record();
        assert_eq!(record.id, None);
        assert_eq!(record.overall_experience, 4);
        assert_eq!(record.stipend_amount.as_deref(), Some("800"));
        assert_eq!(record.submission_date, None);
    }

    #[test]
    fn test_internship_validation() {
        let data: FormData = [("name", "Ben"), ("overall_experience", "great")]
            .into_iter()
            .collect();
        let failure = InternshipForm::from_form_data(&data)
            .validate()
            .unwrap_err();
        assert_eq!(failure.section, FormSection::Internship);
        assert!(failure.invalid_fields.contains(&"overall_experience".to_string()));
        assert!(failure.invalid_fields.contains(&"company_organization".to_string()));
        assert!(!failure.invalid_fields.contains(&"name".to_string()));
    }

    #[test]
    fn test_internship_submission_date_format() {
        let mut data = complete_internship_data();
        data.append("submission_date", "02.05.2024");
        let failure = InternshipForm::from_form_data(&data)
            .validate()
            .unwrap_err();
        assert_eq!(failure.invalid_fields, ["submission_date"]);

        data.set("submission_date", "2024-05-02");
        let form = InternshipForm::from_form_data(&data);
        assert!(form.validate().is_ok());
        assert_eq!(
            form.to_record().submission_date,
            chrono::NaiveDate::from_ymd_opt(2024, 5, 2)
        );
    }

    #[test]
    fn test_failure_display() {
        let failure = ValidationFailure {
            invalid_fields: vec!["city".to_string()],
            section: FormSection::Destination,
        };
        assert_eq!(
            failure.to_string(),
            "Please fill out all required fields: city (see the destination tab)."
        );
    }
}
