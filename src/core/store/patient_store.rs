//! Client-side patient cache and its reconciliation rules
//!
//! The store is the single owner of patient records. Server lists replace it
//! wholesale, per-patient detail merges into it, and optimistic writes edit it
//! in place while the [`PendingLedger`] tracks their fate.

use super::pending::{OperationId, OperationKind, PendingLedger, PendingOperation};
use crate::domain::{
    FilterContext, Patient, PatientDetail, PatientId, Result, RoundsError, ScopeItem, Visit,
    VisitId, VisitPatch,
};
use chrono::NaiveDateTime;
use std::collections::HashSet;

/// In-memory patient cache with optimistic write tracking
#[derive(Debug, Default)]
pub struct PatientStore {
    patients: Vec<Patient>,
    ledger: PendingLedger,
}

impl PatientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated from a persisted snapshot
    pub fn from_snapshot(patients: Vec<Patient>) -> Self {
        let mut store = Self::new();
        store.init(patients);
        store
    }

    /// Replace the contents with a persisted snapshot and forget pending writes
    ///
    /// The snapshot is never authoritative; the next server list replaces it.
    pub fn init(&mut self, snapshot: Vec<Patient>) {
        let mut seen = HashSet::new();
        self.patients = snapshot
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();
        self.ledger.clear();
        tracing::debug!(patients = self.patients.len(), "Patient store initialised");
    }

    /// Drop every patient and pending operation
    pub fn teardown(&mut self) {
        self.patients.clear();
        self.ledger.clear();
        tracing::debug!("Patient store torn down");
    }

    /// Patients in storage order, for persistence
    pub fn snapshot(&self) -> Vec<Patient> {
        self.patients.clone()
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn get(&self, id: &PatientId) -> Option<&Patient> {
        self.patients.iter().find(|p| &p.id == id)
    }

    fn get_mut(&mut self, id: &PatientId) -> Option<&mut Patient> {
        self.patients.iter_mut().find(|p| &p.id == id)
    }

    pub fn contains(&self, id: &PatientId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    /// Make sure a record exists for `id`
    ///
    /// An existing record keeps its visits; its label is only overwritten by a
    /// non-empty one.
    pub fn ensure_patient(&mut self, id: &PatientId, label: &str) -> &Patient {
        let label = label.trim();
        let index = match self.patients.iter().position(|p| &p.id == id) {
            Some(index) => {
                if !label.is_empty() {
                    self.patients[index].label = label.to_string();
                }
                index
            }
            None => {
                self.patients.push(Patient::new(id.clone(), label));
                self.patients.len() - 1
            }
        };
        &self.patients[index]
    }

    /// Replace the cache with the server's list for `scope`
    ///
    /// Loaded visits of listed patients are carried forward. An empty list
    /// falls back to previously cached patients with visits matching the new
    /// scope, so a transient failure does not blank the view. A selected
    /// patient missing from the result keeps its previous record.
    pub fn replace_for_scope(
        &mut self,
        scope: &FilterContext,
        items: Vec<ScopeItem>,
        selected: Option<&PatientId>,
    ) {
        let previous = &self.patients;
        let mut next: Vec<Patient> = Vec::with_capacity(items.len());
        let mut seen = HashSet::new();
        let from_server = !items.is_empty();

        for item in items {
            if !seen.insert(item.patient_id.clone()) {
                continue;
            }
            let prior = previous.iter().find(|p| p.id == item.patient_id);
            let label = if item.label.trim().is_empty() {
                prior.map(|p| p.label.clone()).unwrap_or_default()
            } else {
                item.label
            };
            next.push(Patient {
                id: item.patient_id,
                label,
                visits: prior.map(|p| p.visits.clone()).unwrap_or_default(),
                count_today: item.count_today,
                last_visit_ts: item.last_visit_ts,
            });
        }

        if !from_server {
            for patient in previous {
                let mut count = 0u32;
                let mut last = None;
                for visit in patient.matching_visits(scope) {
                    count += 1;
                    last = Some(visit.ts);
                }
                if count > 0 && seen.insert(patient.id.clone()) {
                    next.push(Patient {
                        count_today: count,
                        last_visit_ts: last,
                        ..patient.clone()
                    });
                }
            }
        }

        if let Some(id) = selected {
            if !seen.contains(id) {
                if let Some(kept) = previous.iter().find(|p| &p.id == id) {
                    next.push(kept.clone());
                }
            }
        }

        tracing::debug!(
            scope = %scope,
            from_server,
            patients = next.len(),
            "Replaced patient list"
        );
        self.patients = next;
    }

    /// Merge one patient's authoritative visit list for a day
    ///
    /// The list counters of an existing entry are cleared: they describe the
    /// scope the entry was last listed under, and the loaded visits now speak
    /// for the patient. Returns `false` when the merge was skipped because an
    /// empty payload would have wiped locally loaded visits.
    pub fn merge_detail(&mut self, detail: PatientDetail) -> bool {
        let PatientDetail {
            patient_id,
            label,
            visits,
        } = detail;

        let mut seen = HashSet::new();
        let visits: Vec<Visit> = visits
            .into_iter()
            .filter(|v| seen.insert(v.id))
            .collect();

        match self.get_mut(&patient_id) {
            Some(existing) => {
                if visits.is_empty() && !existing.visits.is_empty() {
                    tracing::debug!(patient_id = %patient_id, "Ignoring empty detail payload");
                    return false;
                }
                existing.visits = visits;
                existing.count_today = 0;
                existing.last_visit_ts = None;
                if !label.trim().is_empty() {
                    existing.label = label;
                }
            }
            None => {
                let mut patient = Patient::new(patient_id.clone(), label);
                patient.visits = visits;
                self.patients.push(patient);
            }
        }

        tracing::debug!(patient_id = %patient_id, "Merged patient detail");
        true
    }

    /// Locate a visit and its patient
    pub fn find_visit(&self, visit_id: &VisitId) -> Option<(&Patient, &Visit)> {
        self.patients
            .iter()
            .find_map(|p| p.find_visit(visit_id).map(|v| (p, v)))
    }

    /// Append a not-yet-confirmed visit, creating the patient if needed
    pub fn apply_optimistic_create(&mut self, patient_id: &PatientId, visit: Visit) -> OperationId {
        let visit_id = visit.id;
        self.ensure_patient(patient_id, "");
        if let Some(patient) = self.get_mut(patient_id) {
            match patient.find_visit_mut(&visit_id) {
                Some(slot) => *slot = visit,
                None => patient.visits.push(visit),
            }
        }

        let op = self.ledger.begin(OperationKind::Create {
            patient_id: patient_id.clone(),
            visit_id,
        });
        tracing::debug!(operation = %op, patient_id = %patient_id, visit_id = %visit_id, "Optimistic create");
        op
    }

    /// Rewrite a cached visit's text and flags
    pub fn apply_optimistic_update(
        &mut self,
        visit_id: &VisitId,
        patch: &VisitPatch,
        now: NaiveDateTime,
    ) -> Result<OperationId> {
        let visit = self
            .patients
            .iter_mut()
            .find_map(|p| p.find_visit_mut(visit_id))
            .ok_or_else(|| missing_visit(visit_id))?;
        patch.apply_to(visit, now);

        let op = self.ledger.begin(OperationKind::Update {
            visit_id: *visit_id,
        });
        tracing::debug!(operation = %op, visit_id = %visit_id, "Optimistic update");
        Ok(op)
    }

    /// Remove a cached visit
    pub fn apply_optimistic_delete(&mut self, visit_id: &VisitId) -> Result<OperationId> {
        let patient = self
            .patients
            .iter_mut()
            .find(|p| p.find_visit(visit_id).is_some())
            .ok_or_else(|| missing_visit(visit_id))?;
        patient.visits.retain(|v| &v.id != visit_id);

        let op = self.ledger.begin(OperationKind::Delete {
            visit_id: *visit_id,
        });
        tracing::debug!(operation = %op, visit_id = %visit_id, "Optimistic delete");
        Ok(op)
    }

    /// Mark an operation as accepted by the server
    pub fn confirm(&mut self, op: OperationId) -> Result<&PendingOperation> {
        self.ledger.confirm(op)
    }

    /// Confirm a create and swap its placeholder for the server's id
    pub fn confirm_create(&mut self, op: OperationId, server_id: VisitId) -> Result<()> {
        let (patient_id, placeholder) = match self.ledger.get(op).map(|o| &o.kind) {
            Some(OperationKind::Create {
                patient_id,
                visit_id,
            }) => (patient_id.clone(), *visit_id),
            Some(other) => {
                return Err(RoundsError::State(format!(
                    "Operation {op} is a {}, not a create",
                    other.name()
                )))
            }
            None => return Err(RoundsError::State(format!("Unknown operation {op}"))),
        };

        self.ledger.confirm(op)?;

        if let Some(patient) = self.get_mut(&patient_id) {
            if patient.find_visit(&server_id).is_some() {
                patient.visits.retain(|v| v.id != placeholder);
            } else if let Some(visit) = patient.find_visit_mut(&placeholder) {
                visit.id = server_id;
            }
        }
        Ok(())
    }

    /// Mark an operation as failed
    ///
    /// A failed create drops its placeholder visit, which the server never
    /// saw. Updates and deletes are repaired by the next resync.
    pub fn roll_back(&mut self, op: OperationId) -> Result<&PendingOperation> {
        if let Some(OperationKind::Create {
            patient_id,
            visit_id,
        }) = self.ledger.get(op).map(|o| o.kind.clone())
        {
            if !visit_id.is_confirmed() {
                if let Some(patient) = self.get_mut(&patient_id) {
                    patient.visits.retain(|v| v.id != visit_id);
                }
            }
        }
        self.ledger.roll_back(op)
    }

    pub fn operation(&self, op: OperationId) -> Option<&PendingOperation> {
        self.ledger.get(op)
    }

    pub fn pending_count(&self) -> usize {
        self.ledger.pending_count()
    }

    /// Forget confirmed and rolled-back operations
    pub fn prune_resolved(&mut self) {
        self.ledger.prune_resolved();
    }
}

fn missing_visit(visit_id: &VisitId) -> RoundsError {
    RoundsError::State(format!("Visit {visit_id} is not in the local cache"))
}
