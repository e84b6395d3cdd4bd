//! Patient records as held by the client cache

use super::filter::FilterContext;
use super::ids::{PatientId, VisitId};
use super::nullable;
use super::timestamp;
use super::visit::Visit;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Label given to patients created without one
pub const DEFAULT_PATIENT_LABEL: &str = "Etiket eklenmedi";

/// A patient and whatever visits the client has loaded for it
///
/// `visits` may be partial or empty. `count_today` and `last_visit_ts` are the
/// server's figures for the scope the record was last listed under; they stand
/// in for the visit list until one has been fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,

    #[serde(default, deserialize_with = "nullable::or_default")]
    pub label: String,

    /// Visits in storage (insertion) order
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub visits: Vec<Visit>,

    #[serde(default)]
    pub count_today: u32,

    #[serde(default, with = "timestamp::optional")]
    pub last_visit_ts: Option<NaiveDateTime>,
}

impl Patient {
    /// An empty record with no visits and zero counters
    pub fn new(id: PatientId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            visits: Vec::new(),
            count_today: 0,
            last_visit_ts: None,
        }
    }

    pub fn find_visit(&self, visit_id: &VisitId) -> Option<&Visit> {
        self.visits.iter().find(|v| &v.id == visit_id)
    }

    pub fn find_visit_mut(&mut self, visit_id: &VisitId) -> Option<&mut Visit> {
        self.visits.iter_mut().find(|v| &v.id == visit_id)
    }

    /// Loaded visits that pass the filter, in storage order
    pub fn matching_visits<'a>(
        &'a self,
        filter: &'a FilterContext,
    ) -> impl Iterator<Item = &'a Visit> + 'a {
        self.visits.iter().filter(move |v| filter.matches(v))
    }
}

/// One row of the server's patient list for a day/department scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeItem {
    pub patient_id: PatientId,

    #[serde(default, deserialize_with = "nullable::or_default")]
    pub label: String,

    #[serde(default)]
    pub count_today: u32,

    #[serde(default, with = "timestamp::optional")]
    pub last_visit_ts: Option<NaiveDateTime>,
}

/// A patient's visits for one day, department-agnostic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDetail {
    pub patient_id: PatientId,

    #[serde(default, deserialize_with = "nullable::or_default")]
    pub label: String,

    #[serde(default, deserialize_with = "nullable::or_default")]
    pub visits: Vec<Visit>,
}

/// A row of the projected patient list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientSummary {
    pub id: PatientId,
    pub label: String,
    pub count: u32,
    pub last_visit_ts: Option<NaiveDateTime>,
}
