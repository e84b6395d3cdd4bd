//! Selection controller
//!
//! Owns the filter context (day and department), the active tab, the selected
//! patient and the session, and orchestrates every fetch and write against the
//! [`RemoteGateway`]. Results are folded into the [`PatientStore`] only when
//! their scope token is still current.
//!
//! Writes are two-phase: the store is edited optimistically, the gateway call
//! confirms or rolls back the pending operation, and a full resync follows
//! either way. A failed create drops its placeholder; failed updates and
//! deletes are not undone by inverse edits, the resync restores the server's
//! view instead.

use super::persisted::PersistedState;
use super::scope::{ScopeRequest, ScopeToken, ScopeTracker};
use crate::adapters::api::RemoteGateway;
use crate::adapters::storage::KeyValueStore;
use crate::config::SecretString;
use crate::core::clock::DateProvider;
use crate::core::projection::{project, visits_for_display};
use crate::core::store::{OperationId, PatientStore};
use crate::domain::patient::DEFAULT_PATIENT_LABEL;
use crate::domain::validation::validate_note_text;
use crate::domain::{
    DailyReport, DepartmentFilter, FavoriteAuthors, FilterContext, NationalId, Patient,
    PatientId, PatientSummary, Result, RoundsError, ScopeItem, Session, Visit, VisitDraft,
    VisitId, VisitPatch,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::sync::Arc;

/// Top-level view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Home,
    Note,
    Report,
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tab::Home => "home",
            Tab::Note => "note",
            Tab::Report => "report",
        };
        write!(f, "{name}")
    }
}

/// User-visible message raised by a failed write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub at: NaiveDateTime,
    pub message: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }
}

pub struct SelectionController {
    gateway: Arc<dyn RemoteGateway>,
    clock: Arc<dyn DateProvider>,
    persisted: PersistedState,
    store: PatientStore,
    scope: ScopeTracker,
    day: NaiveDate,
    department: DepartmentFilter,
    tab: Tab,
    selected: Option<PatientId>,
    auto_date: bool,
    session: Option<Session>,
    report: Option<DailyReport>,
    favorites: FavoriteAuthors,
    notices: Vec<Notice>,
}

impl SelectionController {
    /// Controller on today's date with auto-date enabled and nothing loaded
    ///
    /// Call [`startup`](Self::startup) to restore persisted state.
    pub fn new(
        gateway: Arc<dyn RemoteGateway>,
        clock: Arc<dyn DateProvider>,
        storage: Arc<dyn KeyValueStore>,
        department: DepartmentFilter,
    ) -> Self {
        let day = clock.today();
        Self {
            gateway,
            clock,
            persisted: PersistedState::new(storage),
            store: PatientStore::new(),
            scope: ScopeTracker::new(),
            day,
            department,
            tab: Tab::Home,
            selected: None,
            auto_date: true,
            session: None,
            report: None,
            favorites: FavoriteAuthors::default(),
            notices: Vec::new(),
        }
    }

    /// Restore the session, day, auto-date flag, favourites and patient cache
    ///
    /// The cached patients are only a placeholder until the next refresh. With
    /// auto-date on, the day is moved to today.
    pub fn startup(&mut self) {
        self.favorites = self.persisted.favorite_authors();
        if let Some(auto_date) = self.persisted.auto_date() {
            self.auto_date = auto_date;
        }

        let today = self.clock.today();
        self.day = match self.persisted.day() {
            Some(day) if !self.auto_date => day,
            _ => today,
        };
        if self.auto_date {
            warn_on_storage_error(self.persisted.save_day(self.day), "day");
        }

        if let Some(patients) = self.persisted.patients() {
            self.store.init(patients);
        }
        self.session = self.persisted.session();

        tracing::info!(
            day = %self.day,
            auto_date = self.auto_date,
            signed_in = self.session.is_some(),
            cached_patients = self.store.len(),
            "Client state restored"
        );
    }

    /// Sign in, jump to today with auto-date on and load the patient list
    ///
    /// Only a rejected sign-in is an error; a failed first refresh leaves the
    /// session in place with whatever the cache holds.
    pub async fn login(&mut self, username: &str, password: &SecretString) -> Result<()> {
        let session = self.gateway.login(username, password).await?;
        tracing::info!(
            username = %session.username,
            role = session.role.as_str(),
            "Signed in"
        );
        warn_on_storage_error(self.persisted.save_session(&session), "session");
        self.session = Some(session);

        self.day = self.clock.today();
        self.auto_date = true;
        warn_on_storage_error(self.persisted.save_day(self.day), "day");
        warn_on_storage_error(self.persisted.save_auto_date(true), "auto_date");

        self.advance_scope();
        if let Err(e) = self.refresh(false).await {
            tracing::warn!(error = %e, "Initial refresh after sign-in failed");
        }
        Ok(())
    }

    /// Forget the session, the selection, the cache and the report
    pub fn logout(&mut self) -> Result<()> {
        if let Some(session) = self.session.take() {
            tracing::info!(username = %session.username, "Signed out");
        }
        self.selected = None;
        self.tab = Tab::Home;
        self.store.teardown();
        self.report = None;
        self.notices.clear();
        self.scope.advance();
        self.persisted.clear_session()
    }

    /// Pick a day by hand; turns auto-date off
    pub async fn set_day(&mut self, day: NaiveDate) -> Result<()> {
        self.auto_date = false;
        warn_on_storage_error(self.persisted.save_auto_date(false), "auto_date");
        self.day = day;
        warn_on_storage_error(self.persisted.save_day(day), "day");
        self.advance_scope();
        self.refresh(true).await
    }

    pub async fn set_department(&mut self, department: DepartmentFilter) -> Result<()> {
        self.department = department;
        self.advance_scope();
        self.refresh(true).await
    }

    pub fn set_auto_date(&mut self, enabled: bool) {
        self.auto_date = enabled;
        warn_on_storage_error(self.persisted.save_auto_date(enabled), "auto_date");
    }

    pub async fn set_tab(&mut self, tab: Tab) -> Result<()> {
        self.tab = tab;
        self.refresh(true).await
    }

    /// Follow the calendar when auto-date is on
    ///
    /// Returns whether the day moved.
    pub async fn tick(&mut self) -> Result<bool> {
        let today = self.clock.today();
        if !self.auto_date || self.day == today {
            return Ok(false);
        }

        tracing::info!(from = %self.day, to = %today, "Day rolled over");
        self.day = today;
        warn_on_storage_error(self.persisted.save_day(today), "day");
        self.advance_scope();
        if self.session.is_some() {
            self.refresh(true).await?;
        }
        Ok(true)
    }

    pub async fn on_visibility_regained(&mut self) -> Result<bool> {
        self.tick().await
    }

    /// Select a patient and load its visits for the current day
    pub async fn select_patient(&mut self, patient_id: PatientId) -> Result<()> {
        tracing::debug!(patient_id = %patient_id, "Patient selected");
        self.selected = Some(patient_id);
        self.refresh_detail().await
    }

    /// Reload the patient list, the report when on the report tab, and the
    /// selected patient's visits
    ///
    /// A failed list fetch falls back to cached patients matching the scope
    /// and the error is returned. Results for a replaced scope are dropped.
    pub async fn refresh(&mut self, keep_selection: bool) -> Result<()> {
        let include_report = self.tab == Tab::Report;
        self.refresh_scope(keep_selection, include_report).await
    }

    async fn refresh_scope(&mut self, keep_selection: bool, include_report: bool) -> Result<()> {
        let session = self.require_session()?.clone();
        if !keep_selection {
            self.selected = None;
        }

        let request = self.begin_scope_refresh();
        let gateway = Arc::clone(&self.gateway);
        let day = request.filter.day;
        let department = request.filter.department.clone();

        let list = gateway.list_patients(&session, day, &department);
        let list_result = if include_report {
            let report = gateway.fetch_daily_report(&session, day, &department);
            let (list_result, report_result) = futures::join!(list, report);
            self.complete_report_refresh(&request, report_result);
            list_result
        } else {
            list.await
        };

        let mut outcome = match self.complete_scope_refresh(request, list_result) {
            Err(e) if e.is_stale_scope() => return Ok(()),
            other => other,
        };

        if let Err(e) = self.refresh_detail().await {
            if outcome.is_ok() {
                outcome = Err(e);
            }
        }
        self.persist_patients();
        outcome
    }

    /// Tag a list fetch with the current scope token
    pub fn begin_scope_refresh(&self) -> ScopeRequest {
        self.scope.issue(self.filter())
    }

    /// Fold a list fetch into the store
    ///
    /// # Errors
    ///
    /// [`RoundsError::StaleScope`] when the scope changed since `request` was
    /// issued; the result is discarded. A failed fetch applies the
    /// empty-result fallback and returns the fetch error.
    pub fn complete_scope_refresh(
        &mut self,
        request: ScopeRequest,
        result: Result<Vec<ScopeItem>>,
    ) -> Result<()> {
        if let Err(stale) = self.scope.ensure_current(request.token) {
            tracing::debug!(scope = %request.filter, error = %stale, "Discarding stale patient list");
            return Err(stale);
        }

        match result {
            Ok(items) => {
                self.store
                    .replace_for_scope(&request.filter, items, self.selected.as_ref());
                Ok(())
            }
            Err(e) => {
                tracing::warn!(scope = %request.filter, error = %e, "Patient list unavailable, using cached visits");
                self.store
                    .replace_for_scope(&request.filter, Vec::new(), self.selected.as_ref());
                Err(e)
            }
        }
    }

    fn complete_report_refresh(&mut self, request: &ScopeRequest, result: Result<DailyReport>) {
        if self.scope.ensure_current(request.token).is_err() {
            tracing::debug!(scope = %request.filter, "Discarding stale report");
            return;
        }
        match result {
            Ok(report) => self.report = Some(report),
            Err(e) => tracing::warn!(scope = %request.filter, error = %e, "Report unavailable"),
        }
    }

    async fn refresh_detail(&mut self) -> Result<()> {
        let Some(patient_id) = self.selected.clone() else {
            return Ok(());
        };
        let session = self.require_session()?.clone();
        let token = self.scope.current();

        let result = self
            .gateway
            .fetch_patient_visits(&session, &patient_id, self.day)
            .await;

        if self.scope.ensure_current(token).is_err() {
            tracing::debug!(patient_id = %patient_id, "Discarding stale patient detail");
            return Ok(());
        }

        match result {
            Ok(detail) => {
                self.store.merge_detail(detail);
                self.persist_patients();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(patient_id = %patient_id, error = %e, "Patient detail unavailable, keeping local visits");
                Err(e)
            }
        }
    }

    /// Find or create the patient for a national ID, select it and open the
    /// note tab
    pub async fn open_patient(&mut self, national_id: &str, label: &str) -> Result<PatientId> {
        let national_id = NationalId::parse(national_id)?;
        let session = self.require_session()?.clone();
        let label = match label.trim() {
            "" => DEFAULT_PATIENT_LABEL,
            trimmed => trimmed,
        };

        let patient_id = self
            .gateway
            .derive_and_create_patient(&session, &national_id, label)
            .await?;
        tracing::info!(patient_id = %patient_id, "Patient opened");

        self.store.ensure_patient(&patient_id, label);
        self.selected = Some(patient_id.clone());
        self.tab = Tab::Note;
        if let Err(e) = self.refresh_detail().await {
            tracing::warn!(patient_id = %patient_id, error = %e, "Opened patient without visits");
        }
        self.persist_patients();
        Ok(patient_id)
    }

    /// Add a note to the selected patient
    ///
    /// Without an explicit department the visit is recorded under the filter's
    /// department, or the emergency department when every department is shown.
    pub async fn add_visit(&mut self, draft: VisitDraft) -> Result<VisitId> {
        let text = validate_note_text(&draft.text)?;
        let patient_id = self
            .selected
            .clone()
            .ok_or_else(|| RoundsError::Validation("Select a patient first".to_string()))?;
        let session = self.require_session()?.clone();
        let department = draft
            .department
            .unwrap_or_else(|| self.department.default_visit_department());

        let visit = Visit::new(
            VisitId::placeholder(),
            self.clock.now(),
            session.display_name.clone(),
            text.clone(),
            department.clone(),
            draft.ops,
        );
        let op = self.store.apply_optimistic_create(&patient_id, visit);

        let result = self
            .gateway
            .create_visit(&session, &patient_id, &text, draft.ops, &department)
            .await;

        match result {
            Ok(visit_id) => {
                self.store.confirm_create(op, visit_id)?;
                tracing::info!(operation = %op, visit_id = %visit_id, "Visit created");
                self.resync().await;
                Ok(visit_id)
            }
            Err(e) => Err(self.fail_write(op, "create_visit", e).await),
        }
    }

    /// Edit one of the signed-in user's saved visits
    pub async fn update_visit(&mut self, visit_id: VisitId, mut patch: VisitPatch) -> Result<()> {
        let session = self.require_session()?.clone();
        let server_id = self.owned_server_id(&visit_id, &session)?;
        if patch.is_empty() {
            return Err(RoundsError::Validation("Nothing to update".to_string()));
        }
        if let Some(text) = patch.text.take() {
            patch.text = Some(validate_note_text(&text)?);
        }

        let op = self
            .store
            .apply_optimistic_update(&visit_id, &patch, self.clock.now())?;
        let result = self.gateway.update_visit(&session, server_id, &patch).await;
        self.finish_write(op, "update_visit", result).await
    }

    /// Delete one of the signed-in user's saved visits
    pub async fn delete_visit(&mut self, visit_id: VisitId) -> Result<()> {
        let session = self.require_session()?.clone();
        let server_id = self.owned_server_id(&visit_id, &session)?;

        let op = self.store.apply_optimistic_delete(&visit_id)?;
        let result = self.gateway.delete_visit(&session, server_id).await;
        self.finish_write(op, "delete_visit", result).await
    }

    /// Only confirmed visits written by the signed-in user may change
    fn owned_server_id(&self, visit_id: &VisitId, session: &Session) -> Result<i64> {
        let server_id = visit_id.server_id().ok_or_else(|| {
            RoundsError::Validation(format!("Visit {visit_id} has not been saved yet"))
        })?;
        let (_, visit) = self
            .store
            .find_visit(visit_id)
            .ok_or_else(|| RoundsError::Validation(format!("Visit {visit_id} is not loaded")))?;
        if !visit.is_authored_by(&session.display_name) {
            return Err(RoundsError::Validation(format!(
                "Visit {visit_id} was written by {}; only its author can change it",
                visit.author
            )));
        }
        Ok(server_id)
    }

    async fn finish_write(
        &mut self,
        op: OperationId,
        operation: &'static str,
        result: Result<()>,
    ) -> Result<()> {
        match result {
            Ok(()) => {
                self.store.confirm(op)?;
                tracing::info!(operation = %op, kind = operation, "Write confirmed");
                self.resync().await;
                Ok(())
            }
            Err(e) => Err(self.fail_write(op, operation, e).await),
        }
    }

    async fn fail_write(
        &mut self,
        op: OperationId,
        operation: &'static str,
        error: RoundsError,
    ) -> RoundsError {
        if let Err(state) = self.store.roll_back(op) {
            tracing::error!(operation = %op, error = %state, "Could not roll back operation");
        }
        crate::log_resync!(operation, error);
        self.push_notice(format!("Changes were not saved: {error}"));
        self.resync().await;
        error
    }

    /// Reload list, report and detail regardless of the active tab
    async fn resync(&mut self) {
        self.store.prune_resolved();
        if let Err(e) = self.refresh_scope(true, true).await {
            tracing::warn!(error = %e, "Resync incomplete");
        }
    }

    pub async fn download_report_pdf(&self) -> Result<Vec<u8>> {
        let session = self.require_session()?;
        self.gateway
            .download_report_pdf(session, self.day, &self.department)
            .await
    }

    /// Pin or unpin an author in the directory; returns whether it is now pinned
    pub fn toggle_favorite_author(&mut self, name: &str) -> bool {
        let pinned = self.favorites.toggle(name);
        warn_on_storage_error(
            self.persisted.save_favorite_authors(&self.favorites),
            "favorite_authors",
        );
        pinned
    }

    pub fn favorite_authors(&self) -> &FavoriteAuthors {
        &self.favorites
    }

    /// Authors in the current report matching `query`
    pub fn author_directory(&self, query: &str) -> Vec<String> {
        self.report
            .as_ref()
            .map(|report| report.author_directory(query, &self.favorites))
            .unwrap_or_default()
    }

    pub fn patient_list(&self) -> Vec<PatientSummary> {
        project(self.store.patients(), self.day, &self.department)
    }

    pub fn selected_patient(&self) -> Option<&Patient> {
        self.selected.as_ref().and_then(|id| self.store.get(id))
    }

    /// Selected patient's visits, newest first
    pub fn selected_visits(&self) -> Vec<&Visit> {
        self.selected_patient()
            .map(visits_for_display)
            .unwrap_or_default()
    }

    pub fn report(&self) -> Option<&DailyReport> {
        self.report.as_ref()
    }

    /// The report narrowed to what the signed-in user may see
    pub fn visible_report(&self, author: Option<&str>) -> Option<DailyReport> {
        let session = self.session.as_ref()?;
        self.report
            .as_ref()
            .map(|report| report.visible_to(session, author))
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn filter(&self) -> FilterContext {
        FilterContext::new(self.day, self.department.clone())
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn department(&self) -> &DepartmentFilter {
        &self.department
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn auto_date(&self) -> bool {
        self.auto_date
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn selected_patient_id(&self) -> Option<&PatientId> {
        self.selected.as_ref()
    }

    pub fn scope_token(&self) -> ScopeToken {
        self.scope.current()
    }

    pub fn store(&self) -> &PatientStore {
        &self.store
    }

    pub fn pending_count(&self) -> usize {
        self.store.pending_count()
    }

    fn require_session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(RoundsError::NotSignedIn)
    }

    fn advance_scope(&mut self) {
        let token = self.scope.advance();
        crate::log_scope_change!(token.value(), self.filter());
    }

    fn push_notice(&mut self, message: String) {
        self.notices.push(Notice {
            at: self.clock.now(),
            message,
        });
    }

    fn persist_patients(&self) {
        warn_on_storage_error(self.persisted.save_patients(self.store.patients()), "patients");
    }
}

fn warn_on_storage_error(result: Result<()>, key: &str) {
    if let Err(e) = result {
        tracing::warn!(key, error = %e, "Could not persist client state");
    }
}
