//! Visit notes and the edits applied to them

use super::filter::Department;
use super::ids::{PatientId, VisitId};
use super::nullable;
use super::timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Procedure flags recorded with a visit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitOps {
    #[serde(default)]
    pub drug: bool,
    #[serde(default)]
    pub test: bool,
    #[serde(default)]
    pub consult: bool,
    #[serde(default)]
    pub critical: bool,
}

/// A dated, departmental note attached to one patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: VisitId,

    #[serde(with = "timestamp::required")]
    pub ts: NaiveDateTime,

    /// Display name of the author
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub author: String,

    #[serde(default, deserialize_with = "nullable::or_default")]
    pub text: String,

    #[serde(default, deserialize_with = "nullable::or_default")]
    pub department: Department,

    #[serde(default, deserialize_with = "nullable::or_default")]
    pub ops: VisitOps,

    #[serde(default, with = "timestamp::optional")]
    pub edited_at: Option<NaiveDateTime>,
}

impl Visit {
    /// Create an unedited visit
    pub fn new(
        id: VisitId,
        ts: NaiveDateTime,
        author: impl Into<String>,
        text: impl Into<String>,
        department: Department,
        ops: VisitOps,
    ) -> Self {
        Self {
            id,
            ts,
            author: author.into(),
            text: text.into(),
            department,
            ops,
            edited_at: None,
        }
    }

    /// Whether `display_name` wrote this visit
    pub fn is_authored_by(&self, display_name: &str) -> bool {
        self.author == display_name
    }
}

/// Partial update of a visit's mutable fields
///
/// Only the note text and the procedure flags can change after creation;
/// a visit's department is fixed. Serialises to the body the API expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ops_drug: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ops_test: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ops_consult: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ops_critical: Option<bool>,
}

impl VisitPatch {
    /// Patch replacing the text and every flag
    pub fn full(text: impl Into<String>, ops: VisitOps) -> Self {
        Self {
            text: Some(text.into()),
            ops_drug: Some(ops.drug),
            ops_test: Some(ops.test),
            ops_consult: Some(ops.consult),
            ops_critical: Some(ops.critical),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.ops_drug.is_none()
            && self.ops_test.is_none()
            && self.ops_consult.is_none()
            && self.ops_critical.is_none()
    }

    /// Rewrite the visit in place and stamp the edit time
    pub fn apply_to(&self, visit: &mut Visit, edited_at: NaiveDateTime) {
        if let Some(text) = &self.text {
            visit.text = text.clone();
        }
        if let Some(drug) = self.ops_drug {
            visit.ops.drug = drug;
        }
        if let Some(test) = self.ops_test {
            visit.ops.test = test;
        }
        if let Some(consult) = self.ops_consult {
            visit.ops.consult = consult;
        }
        if let Some(critical) = self.ops_critical {
            visit.ops.critical = critical;
        }
        visit.edited_at = Some(edited_at);
    }
}

/// A note being written, before it has an id or timestamp
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitDraft {
    pub text: String,
    pub ops: VisitOps,
    /// Department to record under; `None` uses the current filter's default
    pub department: Option<Department>,
}

impl VisitDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_ops(mut self, ops: VisitOps) -> Self {
        self.ops = ops;
        self
    }

    pub fn with_department(mut self, department: Department) -> Self {
        self.department = Some(department);
        self
    }
}

/// A visit as listed in the department feed, tagged with its patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedVisit {
    pub patient_id: PatientId,
    #[serde(flatten)]
    pub visit: Visit,
}
