//! Request and response bodies of the Rounds API

use crate::domain::{
    AuthorCounts, DailyReport, FeedVisit, PatientId, ReportTotals, Role, ScopeItem,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of `POST /auth/login`
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub username: String,
    pub display_name: String,
    #[serde(default)]
    pub role: Role,
}

/// Body of `GET /patients/list`
#[derive(Debug, Deserialize)]
pub struct PatientListResponse {
    #[serde(default)]
    pub items: Vec<ScopeItem>,
}

#[derive(Debug, Serialize)]
pub struct DeriveRequest<'a> {
    pub tc: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct DeriveResponse {
    pub patient_id: PatientId,
}

#[derive(Debug, Serialize)]
pub struct PatientCreateRequest<'a> {
    pub patient_id: &'a PatientId,
    pub label: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct PatientOut {
    pub patient_id: PatientId,
}

/// Body of `POST /visits`
#[derive(Debug, Serialize)]
pub struct VisitCreateRequest<'a> {
    pub patient_id: &'a PatientId,
    pub text: &'a str,
    pub ops_drug: bool,
    pub ops_test: bool,
    pub ops_consult: bool,
    pub ops_critical: bool,
    pub department: &'a str,
}

/// The parts of the created visit the client reads back
#[derive(Debug, Deserialize)]
pub struct VisitCreatedResponse {
    pub id: i64,
}

/// Body of `GET /reports/daily`
#[derive(Debug, Default, Deserialize)]
pub struct DailyReportResponse {
    #[serde(default)]
    pub patients_seen: u32,
    #[serde(default)]
    pub totals: ReportTotals,
    #[serde(default)]
    pub by_author_detail: BTreeMap<String, AuthorCounts>,
    #[serde(default)]
    pub lines: Vec<String>,
}

/// Body of `GET /visits/by_department`
#[derive(Debug, Default, Deserialize)]
pub struct DepartmentFeedResponse {
    #[serde(default)]
    pub by_author: BTreeMap<String, Vec<FeedVisit>>,
}

impl DailyReportResponse {
    /// Combine the report with the department feed
    ///
    /// Feed entries carry no author field; it is filled from the key they
    /// are grouped under.
    pub fn with_feed(self, feed: DepartmentFeedResponse) -> DailyReport {
        let by_author = feed
            .by_author
            .into_iter()
            .map(|(author, mut visits)| {
                for entry in &mut visits {
                    if entry.visit.author.is_empty() {
                        entry.visit.author = author.clone();
                    }
                }
                (author, visits)
            })
            .collect();

        DailyReport {
            patients_seen: self.patients_seen,
            totals: self.totals,
            lines: self.lines,
            by_author_detail: self.by_author_detail,
            by_author,
        }
    }
}
