//! Filtered, ordered scans over both tables.
//!
//! Filters never fail a listing: a missing storage session, a snapshot
//! without our tables or any other statement error yields
//! [`QueryOutcome::Unavailable`], which the renderer shows as "no data".

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::record::{InternshipRecord, StudyRecord};
use crate::storage::{Storage, Stored};

/// Study listing order: grouped by country, newest first within a country.
const STUDY_ORDER: &str = "country ASC, id DESC";

/// Internship listing order: newest first.
const INTERNSHIP_ORDER: &str = "id DESC";

/// Filter inputs of the study browse view.
///
/// Empty strings are treated like absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyFilter {
    /// Exact continent.
    pub continent: Option<String>,
    /// Case-sensitive substring of the country.
    pub country: Option<String>,
    /// Case-sensitive substring of the university.
    pub university: Option<String>,
}

/// Filter inputs of the internship browse view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InternshipFilter {
    /// Case-sensitive substring of the country.
    pub country: Option<String>,
    /// Case-sensitive substring of the company or organization.
    pub company: Option<String>,
}

/// Result of a listing query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome<T> {
    /// At least one row matched, in listing order.
    Found(Vec<T>),
    /// The query ran and matched nothing.
    Empty,
    /// The query could not run at all.
    Unavailable,
}

impl<T> QueryOutcome<T> {
    fn from_rows(rows: Vec<T>) -> Self {
        if rows.is_empty() {
            Self::Empty
        } else {
            Self::Found(rows)
        }
    }

    /// Number of matched rows.
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::Found(rows) => rows.len(),
            Self::Empty | Self::Unavailable => 0,
        }
    }

    /// The matched rows, empty unless [`QueryOutcome::Found`].
    #[must_use]
    pub fn rows(&self) -> &[T] {
        match self {
            Self::Found(rows) => rows,
            Self::Empty | Self::Unavailable => &[],
        }
    }

    /// Whether the query could run.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

/// A conjunction of SQL conditions with positional parameters.
#[derive(Debug, Default)]
struct Predicate {
    clauses: Vec<String>,
    params: Vec<Value>,
}

impl Predicate {
    fn equals(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = active(value) {
            self.params.push(Value::Text(value.to_string()));
            self.clauses.push(format!("{column} = ?{}", self.params.len()));
        }
        self
    }

    /// `instr` keeps the match case-sensitive and free of `LIKE` wildcards.
    fn contains(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = active(value) {
            self.params.push(Value::Text(value.to_string()));
            self.clauses
                .push(format!("instr({column}, ?{}) > 0", self.params.len()));
        }
        self
    }

    fn sql(&self) -> String {
        if self.clauses.is_empty() {
            "1=1".to_string()
        } else {
            self.clauses.join(" AND ")
        }
    }
}

fn active(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl StudyFilter {
    /// Create a filter from the three inputs of the browse view.
    #[must_use]
    pub fn new(continent: &str, country: &str, university: &str) -> Self {
        let field = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            continent: field(continent),
            country: field(country),
            university: field(university),
        }
    }

    fn predicate(&self) -> Predicate {
        let mut predicate = Predicate::default();
        predicate
            .equals("continent", self.continent.as_deref())
            .contains("country", self.country.as_deref())
            .contains("university", self.university.as_deref());
        predicate
    }

    /// The line shown above the listing, e.g.
    /// `Found 2 entries. Filtered by Continent: Europe, Country: Spain.`
    #[must_use]
    pub fn summary(&self, count: usize) -> String {
        let filters: Vec<String> = [
            ("Continent", self.continent.as_deref()),
            ("Country", self.country.as_deref()),
            ("University", self.university.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, value)| active(value).map(|v| format!("{label}: {v}")))
        .collect();

        let mut text = format!("Found {count} entries.");
        if !filters.is_empty() {
            text.push_str(&format!(" Filtered by {}.", filters.join(", ")));
        }
        text
    }
}

impl InternshipFilter {
    /// Create a filter from the two inputs of the browse view.
    #[must_use]
    pub fn new(country: &str, company: &str) -> Self {
        let field = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            country: field(country),
            company: field(company),
        }
    }

    fn predicate(&self) -> Predicate {
        let mut predicate = Predicate::default();
        predicate
            .contains("country", self.country.as_deref())
            .contains("company_organization", self.company.as_deref());
        predicate
    }
}

/// List study experiences matching `filter`, ordered by country and then
/// newest first.
#[must_use]
pub fn study_experiences(
    storage: Option<&Storage>,
    filter: &StudyFilter,
) -> QueryOutcome<StudyRecord> {
    run(storage, &filter.predicate(), STUDY_ORDER)
}

/// List internship experiences matching `filter`, newest first.
#[must_use]
pub fn internship_experiences(
    storage: Option<&Storage>,
    filter: &InternshipFilter,
) -> QueryOutcome<InternshipRecord> {
    run(storage, &filter.predicate(), INTERNSHIP_ORDER)
}

fn run<R: Stored>(storage: Option<&Storage>, predicate: &Predicate, order_by: &str) -> QueryOutcome<R> {
    let Some(storage) = storage else {
        debug!("No storage session; listing unavailable");
        return QueryOutcome::Unavailable;
    };

    match storage.select::<R>(&predicate.sql(), &predicate.params, order_by) {
        Ok(rows) => {
            debug!("{} query matched {} rows", R::TABLE.name(), rows.len());
            QueryOutcome::from_rows(rows)
        }
        Err(e) if e.is_missing_data() => {
            debug!("{} has not been loaded yet: {}", R::TABLE.name(), e);
            QueryOutcome::Unavailable
        }
        Err(e) => {
            warn!("Failed to query {}: {}", R::TABLE.name(), e);
            QueryOutcome::Unavailable
        }
    }
}
