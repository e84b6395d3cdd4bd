//! Remote gateway trait definition
//!
//! Every network call the client makes goes through [`RemoteGateway`]. The
//! selection controller only ever sees this trait, so tests can swap the
//! HTTP implementation for an in-memory one.

use crate::config::SecretString;
use crate::domain::{
    DailyReport, Department, DepartmentFilter, NationalId, PatientDetail, PatientId, Result,
    ScopeItem, Session, VisitId, VisitOps, VisitPatch,
};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Trait over the Rounds API
///
/// All calls except [`login`](RemoteGateway::login) are authenticated by the
/// bearer token of the given session.
///
/// # Example
///
/// ```no_run
/// use rounds::adapters::api::{HttpGateway, RemoteGateway};
/// use rounds::config::{secret_string, ApiConfig};
/// use rounds::domain::DepartmentFilter;
/// use chrono::NaiveDate;
///
/// # async fn example() -> rounds::domain::Result<()> {
/// let gateway = HttpGateway::new(&ApiConfig::default(), 200)?;
/// let session = gateway
///     .login("esude", &secret_string("password".to_string()))
///     .await?;
///
/// let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
/// let items = gateway
///     .list_patients(&session, day, &DepartmentFilter::All)
///     .await?;
/// println!("{} patients seen", items.len());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Exchange credentials for a session
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Unauthorized`](crate::domain::NetworkError::Unauthorized)
    /// when the server rejects the credentials.
    async fn login(&self, username: &str, password: &SecretString) -> Result<Session>;

    /// Patients with visits on `day` under `department`, newest first
    async fn list_patients(
        &self,
        session: &Session,
        day: NaiveDate,
        department: &DepartmentFilter,
    ) -> Result<Vec<ScopeItem>>;

    /// A patient's visits on `day` across every department, oldest first
    async fn fetch_patient_visits(
        &self,
        session: &Session,
        patient_id: &PatientId,
        day: NaiveDate,
    ) -> Result<PatientDetail>;

    /// Record a visit and return its server id
    async fn create_visit(
        &self,
        session: &Session,
        patient_id: &PatientId,
        text: &str,
        ops: VisitOps,
        department: &Department,
    ) -> Result<VisitId>;

    /// Apply a partial update to a confirmed visit
    async fn update_visit(&self, session: &Session, visit_id: i64, patch: &VisitPatch)
        -> Result<()>;

    /// Delete a confirmed visit
    async fn delete_visit(&self, session: &Session, visit_id: i64) -> Result<()>;

    /// Derive the patient id for a national id number and create the patient
    /// if it does not exist yet
    ///
    /// Creating an existing patient returns it unchanged; the label is only
    /// used for new patients.
    async fn derive_and_create_patient(
        &self,
        session: &Session,
        national_id: &NationalId,
        label: &str,
    ) -> Result<PatientId>;

    /// Aggregate report and department feed for a scope
    async fn fetch_daily_report(
        &self,
        session: &Session,
        day: NaiveDate,
        department: &DepartmentFilter,
    ) -> Result<DailyReport>;

    /// Rendered PDF rollup for a scope
    async fn download_report_pdf(
        &self,
        session: &Session,
        day: NaiveDate,
        department: &DepartmentFilter,
    ) -> Result<Vec<u8>>;
}
