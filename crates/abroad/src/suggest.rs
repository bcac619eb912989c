//! Suggestion lists derived from stored data.
//!
//! The entry forms offer previously used cities, universities and companies;
//! the study browse view offers every stored continent.

use serde::Serialize;
use tracing::debug;

use crate::record::Table;
use crate::storage::Storage;

/// Distinct values offered while filling in forms and filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Suggestions {
    /// Cities of study experiences.
    pub study_cities: Vec<String>,
    /// Universities of study experiences.
    pub universities: Vec<String>,
    /// Continents, sorted ascending.
    pub continents: Vec<String>,
    /// Cities of internship experiences.
    pub internship_cities: Vec<String>,
    /// Companies and organizations of internship experiences.
    pub companies: Vec<String>,
}

impl Suggestions {
    /// Collect every list from `storage`.
    ///
    /// Each list is queried on its own; a list whose table or column is
    /// missing comes back empty without affecting the others.
    #[must_use]
    pub fn collect(storage: &Storage) -> Self {
        Self {
            study_cities: distinct(storage, Table::Study, "city", false),
            universities: distinct(storage, Table::Study, "university", false),
            continents: distinct(storage, Table::Study, "continent", true),
            internship_cities: distinct(storage, Table::Internship, "city", false),
            companies: distinct(storage, Table::Internship, "company_organization", false),
        }
    }

    /// Recompute the lists, leaving them empty when there is no storage.
    pub fn refresh(&mut self, storage: Option<&Storage>) {
        *self = storage.map(Self::collect).unwrap_or_default();
    }

    /// Whether every list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.study_cities.is_empty()
            && self.universities.is_empty()
            && self.continents.is_empty()
            && self.internship_cities.is_empty()
            && self.companies.is_empty()
    }
}

fn distinct(storage: &Storage, table: Table, column: &str, sorted: bool) -> Vec<String> {
    storage
        .distinct_values(table, column, sorted)
        .unwrap_or_else(|e| {
            debug!("No {}.{} suggestions: {}", table.name(), column, e);
            Vec::new()
        })
}
