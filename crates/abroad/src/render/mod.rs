//! Display views for stored experiences.
//!
//! Records are first mapped into serializable view structs; [`html`] and
//! [`plain`] turn those views into markup or terminal text. Building a view
//! has no side effects, so rendering the same rows twice gives the same
//! output.

pub mod html;
pub mod plain;

use serde::Serialize;

use crate::query::{QueryOutcome, StudyFilter};
use crate::record::{Course, InternshipRecord, StudyRecord, Vaccination};

/// Shown when a query ran but matched nothing.
pub const EMPTY_MESSAGE: &str = "No experiences found. Try adjusting your filters.";

/// Shown when no query could run.
pub const UNAVAILABLE_MESSAGE: &str = "No data available yet. Please load a database file.";

const FILLED_GLYPH: char = '★';
const EMPTY_GLYPH: char = '☆';
const SCALE_MAX: i64 = 5;

const DIFFICULTY_LABELS: [&str; 5] = ["sehr leicht", "leicht", "mittel", "schwer", "sehr schwer"];
const DIFFICULTY_MARKERS: [&str; 5] = ["🟢", "🟢", "🟡", "🔴", "🔴"];
const HOUSING_LABELS: [&str; 5] = [
    "nicht empfehlenswert",
    "gerade noch ertragbar",
    "mittelmäßig",
    "gut",
    "Sehr empfehlenswert",
];

/// Which fixed vocabulary a rating is labelled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingScale {
    /// Course difficulty, 1 is very easy.
    Difficulty,
    /// Housing quality, 1 is not recommended.
    HousingQuality,
    /// Overall internship experience; glyphs only.
    Experience,
}

/// A rating shown as a label and a five-glyph scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingView {
    /// The stored rating.
    pub value: Option<i64>,
    /// Number of filled glyphs, 0 to 5.
    pub filled: u8,
    /// Filled glyphs followed by empty ones, always five in total.
    pub glyphs: String,
    /// Vocabulary label for ratings 1 to 5.
    pub label: Option<&'static str>,
    /// Traffic-light marker, difficulty only.
    pub marker: Option<&'static str>,
}

impl RatingView {
    /// Map a stored rating onto `scale`.
    #[must_use]
    pub fn new(scale: RatingScale, value: Option<i64>) -> Self {
        let clamped = value.unwrap_or(0).clamp(0, SCALE_MAX);
        let filled = u8::try_from(clamped).unwrap_or(0);
        let glyphs = std::iter::repeat(FILLED_GLYPH)
            .take(usize::from(filled))
            .chain(std::iter::repeat(EMPTY_GLYPH).take(usize::from(5 - filled)))
            .collect();

        // Labels exist for exact ratings only; out-of-range values keep glyphs.
        let index = value
            .filter(|v| (1..=SCALE_MAX).contains(v))
            .and_then(|v| usize::try_from(v - 1).ok());
        let (label, marker) = match (scale, index) {
            (RatingScale::Difficulty, Some(i)) => {
                (Some(DIFFICULTY_LABELS[i]), Some(DIFFICULTY_MARKERS[i]))
            }
            (RatingScale::HousingQuality, Some(i)) => (Some(HOUSING_LABELS[i]), None),
            _ => (None, None),
        };

        Self {
            value,
            filled,
            glyphs,
            label,
            marker,
        }
    }

    /// Whether a rating was given at all.
    #[must_use]
    pub fn is_rated(&self) -> bool {
        self.value.is_some_and(|v| v != 0)
    }
}

/// Treat empty text like an absent value.
fn present(value: Option<&String>) -> Option<String> {
    value.filter(|s| !s.is_empty()).cloned()
}

/// One course as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseView {
    /// Course title.
    pub title: String,
    /// Difficulty rating.
    pub difficulty: RatingView,
    /// Lecturer or coordinator.
    pub responsible_person: Option<String>,
    /// Contact address of the responsible person.
    pub email: Option<String>,
    /// Kind of exam.
    pub exam_type: Option<String>,
    /// Link to the course page.
    pub link: Option<String>,
    /// Credit points.
    pub ects: Option<String>,
    /// Free-form notes.
    pub description: Option<String>,
}

impl From<&Course> for CourseView {
    fn from(course: &Course) -> Self {
        Self {
            title: course.title.clone(),
            difficulty: RatingView::new(RatingScale::Difficulty, course.difficulty),
            responsible_person: present(course.responsible_person.as_ref()),
            email: present(course.email.as_ref()),
            exam_type: present(course.exam_type.as_ref()),
            link: present(course.link.as_ref()),
            ects: present(course.ects.as_ref()),
            description: present(course.description.as_ref()),
        }
    }
}

/// The always-visible part of a study card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudySummary {
    /// `University - City, Country`.
    pub title: String,
    /// Student's full name.
    pub contact_name: String,
    /// Student's email address.
    pub contact_email: String,
    /// Student's phone number.
    pub contact_phone: Option<String>,
    /// Class year of the student.
    pub class_year: String,
    /// How long the stay lasted.
    pub duration: String,
    /// Tuition cost.
    pub tuition: Option<String>,
    /// University website.
    pub website: Option<String>,
    /// Department website.
    pub department_website: Option<String>,
    /// Courses in entry order.
    pub courses: Vec<CourseView>,
}

/// Financing sub-section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinancingView {
    /// How the stay was financed.
    pub methods: Option<String>,
    /// Amount of financial aid received.
    pub aid_amount: Option<String>,
}

/// Housing sub-section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HousingView {
    /// Kind of accommodation.
    pub housing_type: String,
    /// Quality rating.
    pub quality: RatingView,
    /// Monthly cost.
    pub cost: Option<String>,
    /// Link to the accommodation.
    pub link: Option<String>,
    /// Free-form notes.
    pub comments: Option<String>,
}

/// Visa sub-section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisaView {
    /// What the visa cost.
    pub cost: Option<String>,
    /// Embassy that issued it.
    pub embassy: Option<String>,
    /// Where the embassy is.
    pub embassy_location: Option<String>,
    /// How long the application took.
    pub application_time: Option<String>,
    /// Embassy website.
    pub website: Option<String>,
    /// Embassy email address.
    pub email: Option<String>,
    /// Embassy phone number.
    pub phone: Option<String>,
    /// Free-form notes.
    pub comments: Option<String>,
}

/// The collapsible part of a study card.
///
/// Sub-sections whose governing field is absent are `None` or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudyDetails {
    /// Present when financing methods or an aid amount are given.
    pub financing: Option<FinancingView>,
    /// Present when a housing type is given.
    pub housing: Option<HousingView>,
    /// Present when a visa was needed.
    pub visa: Option<VisaView>,
    /// Vaccinations in entry order.
    pub vaccinations: Vec<Vaccination>,
    /// Application tips.
    pub application_tips: Option<String>,
    /// General comments.
    pub general_comments: Option<String>,
}

impl StudyDetails {
    /// Whether the detail block has anything to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.financing.is_none()
            && self.housing.is_none()
            && self.visa.is_none()
            && self.vaccinations.is_empty()
            && self.application_tips.is_none()
            && self.general_comments.is_none()
    }
}

/// One study experience as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudyCard {
    /// Row id, used by the edit action.
    pub id: Option<i64>,
    /// Always visible.
    pub summary: StudySummary,
    /// Hidden until expanded.
    pub details: StudyDetails,
}

impl From<&StudyRecord> for StudyCard {
    fn from(row: &StudyRecord) -> Self {
        let summary = StudySummary {
            title: format!("{} - {}, {}", row.university, row.city, row.country),
            contact_name: row.student_name(),
            contact_email: row.stud_email.clone(),
            contact_phone: present(row.stud_phone.as_ref()),
            class_year: row.stud_class_year.clone(),
            duration: row.duration.clone(),
            tuition: present(row.tuition_cost.as_ref()),
            website: present(row.website.as_ref()),
            department_website: present(row.department_website.as_ref()),
            courses: row.courses.iter().map(CourseView::from).collect(),
        };

        let methods = present(row.financing_methods.as_ref());
        let aid_amount = present(row.financial_aid_amount.as_ref());
        let financing = (methods.is_some() || aid_amount.is_some())
            .then_some(FinancingView { methods, aid_amount });

        let housing = present(row.housing_type.as_ref()).map(|housing_type| HousingView {
            housing_type,
            quality: RatingView::new(RatingScale::HousingQuality, row.housing_quality),
            cost: present(row.housing_cost.as_ref()),
            link: present(row.housing_link.as_ref()),
            comments: present(row.housing_comments.as_ref()),
        });

        let visa = row.visa_needed.then(|| VisaView {
            cost: present(row.visa_cost.as_ref()),
            embassy: present(row.visa_embassy.as_ref()),
            embassy_location: present(row.visa_embassy_location.as_ref()),
            application_time: present(row.visa_application_time.as_ref()),
            website: present(row.visa_embassy_website.as_ref()),
            email: present(row.visa_embassy_email.as_ref()),
            phone: present(row.visa_embassy_phone.as_ref()),
            comments: present(row.visa_comments.as_ref()),
        });

        let details = StudyDetails {
            financing,
            housing,
            visa,
            vaccinations: row.vaccinations.clone(),
            application_tips: present(row.application_tips.as_ref()),
            general_comments: present(row.general_comments.as_ref()),
        };

        Self {
            id: row.id,
            summary,
            details,
        }
    }
}

/// Consecutive study cards sharing a country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryGroup {
    /// The shared country, shown as the group header.
    pub country: String,
    /// Cards in listing order.
    pub cards: Vec<StudyCard>,
}

/// Split rows into runs of equal country values, keeping their order.
///
/// A new group starts exactly when the country differs from the previous row.
#[must_use]
pub fn group_by_country(rows: &[StudyRecord]) -> Vec<CountryGroup> {
    let mut groups: Vec<CountryGroup> = Vec::new();
    for row in rows {
        match groups.last_mut() {
            Some(group) if group.country == row.country => group.cards.push(row.into()),
            _ => groups.push(CountryGroup {
                country: row.country.clone(),
                cards: vec![row.into()],
            }),
        }
    }
    groups
}

/// The rendered study browse view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudyListing {
    /// Filter summary line; absent when the query could not run.
    pub summary: Option<String>,
    /// Country groups in listing order.
    pub groups: Vec<CountryGroup>,
    /// Empty or unavailable message shown instead of cards.
    pub notice: Option<&'static str>,
}

impl StudyListing {
    /// Build the browse view from a query outcome.
    #[must_use]
    pub fn new(outcome: &QueryOutcome<StudyRecord>, filter: &StudyFilter) -> Self {
        match outcome {
            QueryOutcome::Found(rows) => Self {
                summary: Some(filter.summary(rows.len())),
                groups: group_by_country(rows),
                notice: None,
            },
            QueryOutcome::Empty => Self {
                summary: Some(filter.summary(0)),
                groups: Vec::new(),
                notice: Some(EMPTY_MESSAGE),
            },
            QueryOutcome::Unavailable => Self {
                summary: None,
                groups: Vec::new(),
                notice: Some(UNAVAILABLE_MESSAGE),
            },
        }
    }

    /// Total number of cards.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.groups.iter().map(|g| g.cards.len()).sum()
    }
}

/// One internship experience as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InternshipCard {
    /// Row id.
    pub id: Option<i64>,
    /// `Company - City, Country`.
    pub title: String,
    /// Name of the intern.
    pub contact_name: String,
    /// Email address of the intern.
    pub contact_email: String,
    /// How long the internship lasted.
    pub duration: String,
    /// Monthly stipend.
    pub stipend: Option<String>,
    /// Overall rating.
    pub experience: RatingView,
    /// When the report was submitted, `YYYY-MM-DD`.
    pub submitted: Option<String>,
    /// What the work involved.
    pub work_description: Option<String>,
    /// Skills picked up.
    pub skills_learned: Option<String>,
    /// How the stay was financed.
    pub financing_methods: Option<String>,
    /// Application tips.
    pub application_tips: Option<String>,
    /// General comments.
    pub general_comments: Option<String>,
}

impl From<&InternshipRecord> for InternshipCard {
    fn from(row: &InternshipRecord) -> Self {
        Self {
            id: row.id,
            title: format!(
                "{} - {}, {}",
                row.company_organization, row.city, row.country
            ),
            contact_name: row.name.clone(),
            contact_email: row.contact_email.clone(),
            duration: row.duration.clone(),
            stipend: present(row.stipend_amount.as_ref()),
            experience: RatingView::new(RatingScale::Experience, Some(row.overall_experience)),
            submitted: row
                .submission_date
                .map(|d| d.format(crate::record::DATE_FORMAT).to_string()),
            work_description: present(row.work_description.as_ref()),
            skills_learned: present(row.skills_learned.as_ref()),
            financing_methods: present(row.financing_methods.as_ref()),
            application_tips: present(row.application_tips.as_ref()),
            general_comments: present(row.general_comments.as_ref()),
        }
    }
}

/// The rendered internship browse view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InternshipListing {
    /// `Found N entries.`; absent when the query could not run.
    pub summary: Option<String>,
    /// Cards in listing order.
    pub cards: Vec<InternshipCard>,
    /// Empty or unavailable message shown instead of cards.
    pub notice: Option<&'static str>,
}

impl InternshipListing {
    /// Build the browse view from a query outcome.
    #[must_use]
    pub fn new(outcome: &QueryOutcome<InternshipRecord>) -> Self {
        let summary = outcome
            .is_available()
            .then(|| format!("Found {} entries.", outcome.count()));
        let notice = match outcome {
            QueryOutcome::Found(_) => None,
            QueryOutcome::Empty => Some(EMPTY_MESSAGE),
            QueryOutcome::Unavailable => Some(UNAVAILABLE_MESSAGE),
        };
        Self {
            summary,
            cards: outcome.rows().iter().map(InternshipCard::from).collect(),
            notice,
        }
    }
}
