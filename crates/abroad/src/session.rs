//! The browsing and entry session.
//!
//! A [`Session`] owns the only [`Storage`] together with the state a user
//! sees: which database file is loaded, the last status line, the study
//! draft, the suggestion lists and the active view. Every mutation goes
//! through `&mut Session`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::form::{InternshipForm, StudyForm, ValidationFailure};
use crate::query::{self, InternshipFilter, StudyFilter};
use crate::record::StudyRecord;
use crate::render::{InternshipListing, StudyListing};
use crate::storage::{Storage, StorageStats};
use crate::suggest::Suggestions;
use crate::transfer::{self, ImportKind, LoadStatus, Upload};

/// Database name shown before any file is loaded.
pub const NO_DATABASE: &str = "No database loaded.";

const ADDED_MESSAGE: &str = "Experience added successfully!";
const UPDATED_MESSAGE: &str = "Experience updated successfully!";

/// The top-level views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Study listing with filters.
    #[default]
    BrowseStudy,
    /// Internship listing with filters.
    BrowseInternships,
    /// Study entry form.
    AddStudy,
    /// Internship entry form.
    AddInternship,
}

/// A view change that should happen after a delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewSwitch {
    /// The view to show.
    pub view: View,
    /// How long to wait first.
    pub after: Duration,
}

/// Whether a submission created or replaced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitAction {
    /// A new row was appended.
    Added,
    /// An existing study row was overwritten.
    Updated,
}

/// Confirmation of a stored submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    /// Id of the stored row.
    pub id: i64,
    /// What happened.
    pub action: SubmitAction,
    /// Success message for the user.
    pub message: &'static str,
    /// How long the message stays visible.
    pub message_for: Duration,
    /// Where the session goes next.
    pub next: ViewSwitch,
}

/// Result of submitting a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// The record was written.
    Saved(Receipt),
    /// Validation failed and nothing was written.
    Rejected(ValidationFailure),
}

/// A browsing and entry session over one storage instance.
#[derive(Debug)]
pub struct Session {
    config: Config,
    storage: Option<Storage>,
    database_name: String,
    status: Option<String>,
    study_draft: StudyForm,
    suggestions: Suggestions,
    view: View,
}

impl Session {
    /// Create a session without storage; every listing is unavailable until
    /// a file is loaded.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            storage: None,
            database_name: NO_DATABASE.to_string(),
            status: None,
            study_draft: StudyForm::pristine(),
            suggestions: Suggestions::default(),
            view: View::default(),
        }
    }

    /// Create a session over an already opened storage.
    #[must_use]
    pub fn with_storage(config: Config, storage: Storage) -> Self {
        let mut session = Self::new(config);
        session.suggestions.refresh(Some(&storage));
        session.storage = Some(storage);
        session
    }

    /// Open the configured storage and start a session over it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub async fn start(config: Config) -> Result<Self> {
        let storage = if config.storage.in_memory {
            Storage::open_in_memory()?
        } else {
            let path = config.database_path();
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| Error::DirectoryCreate {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
            Storage::open(&path)?
        };
        debug!("Session started on {}", storage.path().display());
        Ok(Self::with_storage(config, storage))
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The storage, if one is open.
    #[must_use]
    pub fn storage(&self) -> Option<&Storage> {
        self.storage.as_ref()
    }

    fn storage_required(&self) -> Result<&Storage> {
        self.storage.as_ref().ok_or(Error::StorageUnavailable)
    }

    /// Name of the last loaded file.
    #[must_use]
    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// The last status line.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// The current suggestion lists.
    #[must_use]
    pub fn suggestions(&self) -> &Suggestions {
        &self.suggestions
    }

    /// The active view.
    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    /// The study form draft.
    #[must_use]
    pub fn study_draft(&self) -> &StudyForm {
        &self.study_draft
    }

    /// Show the study listing for `filter`.
    pub fn browse_study(&mut self, filter: &StudyFilter) -> StudyListing {
        self.view = View::BrowseStudy;
        let outcome = query::study_experiences(self.storage.as_ref(), filter);
        StudyListing::new(&outcome, filter)
    }

    /// Show the internship listing for `filter`.
    pub fn browse_internships(&mut self, filter: &InternshipFilter) -> InternshipListing {
        self.view = View::BrowseInternships;
        let outcome = query::internship_experiences(self.storage.as_ref(), filter);
        InternshipListing::new(&outcome)
    }

    /// Look up a stored study record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] if no row has that id.
    pub fn study_record(&self, id: i64) -> Result<StudyRecord> {
        self.storage_required()?
            .get::<StudyRecord>(id)?
            .ok_or(Error::RecordNotFound { id })
    }

    /// Load a stored study record into the draft and switch to the form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] if no row has that id.
    pub fn begin_edit(&mut self, id: i64) -> Result<&StudyForm> {
        let record = self.study_record(id)?;
        self.study_draft = StudyForm::from_record(&record);
        self.view = View::AddStudy;
        Ok(&self.study_draft)
    }

    /// Validate and store a study submission.
    ///
    /// A rejected form is kept as the draft. A stored one resets the draft.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no storage, the edited record no longer
    /// exists, or the write fails.
    pub fn submit_study(&mut self, form: StudyForm) -> Result<SubmitOutcome> {
        if let Err(failure) = form.validate() {
            self.study_draft = form;
            self.view = View::AddStudy;
            return Ok(SubmitOutcome::Rejected(failure));
        }

        let record = form.to_record();
        let storage = self.storage_required()?;
        let (id, action) = match form.entry_id {
            Some(id) => {
                storage.update_study(id, &record)?;
                (id, SubmitAction::Updated)
            }
            None => (storage.insert(&record)?, SubmitAction::Added),
        };
        info!("Study record {} {:?}", id, action);

        self.study_draft = StudyForm::pristine();
        Ok(SubmitOutcome::Saved(self.saved(id, action, View::BrowseStudy)))
    }

    /// Validate and store an internship submission.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no storage or the write fails.
    pub fn submit_internship(&mut self, form: &InternshipForm) -> Result<SubmitOutcome> {
        if let Err(failure) = form.validate() {
            self.view = View::AddInternship;
            return Ok(SubmitOutcome::Rejected(failure));
        }

        let id = self.storage_required()?.insert(&form.to_record())?;
        info!("Internship record {} added", id);
        Ok(SubmitOutcome::Saved(self.saved(
            id,
            SubmitAction::Added,
            View::BrowseInternships,
        )))
    }

    fn saved(&mut self, id: i64, action: SubmitAction, next: View) -> Receipt {
        self.suggestions.refresh(self.storage.as_ref());
        let message = match action {
            SubmitAction::Added => ADDED_MESSAGE,
            SubmitAction::Updated => UPDATED_MESSAGE,
        };
        self.status = Some(message.to_string());
        Receipt {
            id,
            action,
            message,
            message_for: self.config.status_display(),
            next: ViewSwitch {
                view: next,
                after: self.config.redirect_delay(),
            },
        }
    }

    /// Read a file and apply it to the storage.
    ///
    /// The database name changes to the file name even if loading fails.
    ///
    /// # Errors
    ///
    /// Returns an error only if a fresh in-memory storage cannot be created.
    pub async fn load_file(&mut self, path: &Path) -> Result<LoadStatus> {
        let file_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        self.database_name.clone_from(&file_name);

        let storage = match self.storage.take() {
            Some(storage) => storage,
            None => Storage::open_in_memory()?,
        };
        let storage = self.storage.insert(storage);

        let status = match Upload::read(path, &self.config).await {
            Ok(upload) => transfer::load(storage, &upload),
            Err(e) => LoadStatus::Failed {
                kind: ImportKind::of(&file_name, &self.config),
                file_name,
                message: e.to_string(),
            },
        };

        self.suggestions.refresh(self.storage.as_ref());
        self.status = Some(status.status_line());
        Ok(status)
    }

    /// Export the whole storage as a snapshot.
    ///
    /// `target` may be a directory, which receives the configured file name.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no storage or the file cannot be written.
    pub fn export(&self, target: Option<&Path>) -> Result<PathBuf> {
        let destination = transfer::export_destination(target, &self.config);
        transfer::export(self.storage_required()?, &destination)?;
        Ok(destination)
    }

    /// Record counts of the open storage.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no storage or a table is missing.
    pub fn stats(&self) -> Result<StorageStats> {
        self.storage_required()?.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormData;
    use crate::record::Table;
    use crate::render::html::Html;
    use crate::render::UNAVAILABLE_MESSAGE;

    fn session() -> Session {
        Session::with_storage(Config::default(), Storage::open_in_memory().unwrap())
    }

    fn study_form(pairs: &[(&str, &str)]) -> StudyForm {
        let mut data: FormData = [
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
        ]
        .into_iter()
        .filter(|(name, _)| !pairs.iter().any(|(n, _)| n == name))
        .collect();
        for (name, value) in pairs {
            data.append(*name, *value);
        }
        StudyForm::from_form_data(&data).unwrap()
    }

    fn saved(outcome: SubmitOutcome) -> Receipt {
        match outcome {
            SubmitOutcome::Saved(receipt) => receipt,
            SubmitOutcome::Rejected(failure) => panic!("rejected: {failure}"),
        }
    }

    #[test]
    fn test_new_session_has_no_database() {
        let mut session = Session::new(Config::default());
        assert_eq!(session.database_name(), NO_DATABASE);
        assert!(session.status().is_none());
        assert_eq!(session.view(), View::BrowseStudy);

        let listing = session.browse_study(&StudyFilter::default());
        assert_eq!(listing.notice, Some(UNAVAILABLE_MESSAGE));
        assert!(matches!(
            session.submit_study(study_form(&[])),
            Err(Error::StorageUnavailable)
        ));
    }

    #[test]
    fn test_submitted_study_is_listed_under_its_country() {
        let mut session = session();
        let receipt = saved(session.submit_study(study_form(&[])).unwrap());

        assert_eq!(receipt.action, SubmitAction::Added);
        assert_eq!(receipt.message, "Experience added successfully!");
        assert_eq!(receipt.next.view, View::BrowseStudy);
        assert_eq!(receipt.next.after, Duration::from_millis(1500));
        assert_eq!(receipt.message_for, Duration::from_secs(3));

        let listing = session.browse_study(&StudyFilter::new("Europe", "", ""));
        assert_eq!(listing.groups.len(), 1);
        assert_eq!(listing.groups[0].country, "Spain");
        assert_eq!(listing.card_count(), 1);
        assert_eq!(listing.groups[0].cards[0].summary.courses[0].title, "Econ 101");
        assert!(Html(&listing).to_string().contains(r#"<h2 class="country-heading">Spain</h2>"#));
    }

    #[test]
    fn test_save_resets_draft_and_refreshes_suggestions() {
        let mut session = session();
        assert!(session.suggestions().continents.is_empty());
        saved(session.submit_study(study_form(&[])).unwrap());

        assert_eq!(session.suggestions().continents, ["Europe"]);
        assert_eq!(session.suggestions().study_cities, ["Sevilla"]);
        assert_eq!(session.study_draft(), &StudyForm::pristine());
        assert_eq!(session.status(), Some("Experience added successfully!"));
    }

    #[test]
    fn test_empty_first_name_is_rejected_without_writing() {
        let mut session = session();
        let outcome = session
            .submit_study(study_form(&[("stud_first_name", "")]))
            .unwrap();

        let SubmitOutcome::Rejected(failure) = outcome else {
            panic!("expected rejection");
        };
        assert!(failure.invalid_fields.contains(&"stud_first_name".to_string()));
        assert_eq!(failure.section, crate::record::FormSection::Student);
        assert_eq!(session.storage().unwrap().count(Table::Study).unwrap(), 0);
        assert_eq!(session.view(), View::AddStudy);
        assert_eq!(session.study_draft().field("country"), Some("Spain"));
    }

    #[test]
    fn test_edit_changes_only_city() {
        let mut session = session();
        let id = saved(session.submit_study(study_form(&[])).unwrap()).id;
        let before = session.study_record(id).unwrap();

        let mut draft = session.begin_edit(id).unwrap().clone();
        assert_eq!(session.view(), View::AddStudy);
        assert_eq!(draft.entry_id, Some(id));
        draft.set_field("city", "Granada").unwrap();

        let receipt = saved(session.submit_study(draft).unwrap());
        assert_eq!(receipt.action, SubmitAction::Updated);
        assert_eq!(receipt.message, "Experience updated successfully!");
        assert_eq!(receipt.id, id);

        let after = session.study_record(id).unwrap();
        assert_eq!(after.city, "Granada");
        assert_eq!(
            StudyRecord {
                city: before.city.clone(),
                ..after
            },
            before
        );
        assert_eq!(session.storage().unwrap().count(Table::Study).unwrap(), 1);
    }

    #[test]
    fn test_edit_missing_record() {
        let mut session = session();
        assert!(matches!(
            session.begin_edit(404),
            Err(Error::RecordNotFound { id: 404 })
        ));

        let mut form = study_form(&[]);
        form.entry_id = Some(404);
        assert!(matches!(
            session.submit_study(form),
            Err(Error::RecordNotFound { id: 404 })
        ));
    }

    #[test]
    fn test_submit_internship() {
        let mut session = session();
        let data: FormData = [
            ("name", "Ben"),
            ("contact_email", "ben@example.org"),
            ("country", "Japan"),
            ("city", "Osaka"),
            ("company_organization", "Acme"),
            ("duration", "6 months"),
            ("overall_experience", "5"),
        ]
        .into_iter()
        .collect();
        let receipt = saved(
            session
                .submit_internship(&InternshipForm::from_form_data(&data))
                .unwrap(),
        );
        assert_eq!(receipt.next.view, View::BrowseInternships);
        assert_eq!(session.suggestions().companies, ["Acme"]);

        let listing = session.browse_internships(&InternshipFilter::default());
        assert_eq!(listing.cards.len(), 1);
        assert!(listing.cards[0].submitted.is_some());
        assert_eq!(session.view(), View::BrowseInternships);
    }

    #[test]
    fn test_rejected_internship() {
        let mut session = session();
        let outcome = session
            .submit_internship(&InternshipForm::from_form_data(&FormData::new()))
            .unwrap();
        assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
        assert_eq!(
            session.storage().unwrap().count(Table::Internship).unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_export_then_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("abroad_session_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut first = session();
        saved(first.submit_study(study_form(&[])).unwrap());
        saved(first.submit_study(study_form(&[("country", "Chile")])).unwrap());
        let exported = first.export(Some(dir.as_path())).unwrap();
        assert_eq!(exported, dir.join("abroad_experiences.sqlite"));

        let mut second = Session::new(Config::default());
        let status = second.load_file(&exported).await.unwrap();
        assert!(status.is_loaded());
        assert_eq!(second.database_name(), "abroad_experiences.sqlite");
        assert_eq!(
            second.status(),
            Some("✅ SQLite database loaded successfully!")
        );
        assert_eq!(second.suggestions().continents, ["Europe"]);

        let filter = StudyFilter::default();
        let ours: Vec<StudyRecord> = query::study_experiences(first.storage(), &filter)
            .rows()
            .to_vec();
        let theirs: Vec<StudyRecord> = query::study_experiences(second.storage(), &filter)
            .rows()
            .to_vec();
        assert_eq!(ours, theirs);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_study_only_snapshot_keeps_study_suggestions() {
        let dir = std::env::temp_dir().join(format!("abroad_study_only_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("migrated.sqlite");
        {
            let storage = Storage::open(&path).unwrap();
            let form = study_form(&[("continent", "Südamerika"), ("country", "Chile")]);
            storage.insert(&form.to_record()).unwrap();
            storage.execute_script("DROP TABLE internship_abroad;").unwrap();
        }

        let mut session = Session::new(Config::default());
        let status = session.load_file(&path).await.unwrap();
        assert!(status.is_loaded());
        assert_eq!(
            session.browse_study(&StudyFilter::default()).card_count(),
            1
        );
        assert_eq!(session.suggestions().continents, ["Südamerika"]);
        assert_eq!(session.suggestions().universities, ["Universidad de Sevilla"]);
        assert!(session.suggestions().companies.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_load_missing_file_sets_name_and_status() {
        let mut session = session();
        let status = session
            .load_file(Path::new("/nonexistent/dump.sql"))
            .await
            .unwrap();
        assert!(!status.is_loaded());
        assert_eq!(session.database_name(), "dump.sql");
        assert!(session
            .status()
            .unwrap()
            .starts_with("❌ Error loading SQL file:"));
    }

    #[tokio::test]
    async fn test_start_creates_data_directory() {
        let dir = std::env::temp_dir().join(format!("abroad_start_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let mut config = Config::default();
        config.storage.database_path = Some(dir.join("data").join("experiences.sqlite"));

        let session = Session::start(config).await.unwrap();
        assert!(dir.join("data").is_dir());
        assert!(!session.storage().unwrap().is_in_memory());

        drop(session);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_start_in_memory() {
        let mut config = Config::default();
        config.storage.in_memory = true;
        let session = Session::start(config).await.unwrap();
        assert!(session.storage().unwrap().is_in_memory());
        assert_eq!(session.stats().unwrap().study_records, 0);
    }
}
