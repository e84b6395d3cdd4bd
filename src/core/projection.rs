//! Patient list projection
//!
//! Pure functions turning the cached patients into the rows the list view
//! shows for a day and department.

use crate::domain::{DepartmentFilter, FilterContext, Patient, PatientSummary, Visit};
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Project cached patients onto the list for `day` and `department`
///
/// A patient's count is the number of loaded visits matching the filter, or
/// the server's `count_today` when none match. Patients with a zero count are
/// left out. Rows are ordered by last visit time, newest first, with patients
/// lacking a timestamp last; ties keep storage order.
///
/// # Examples
///
/// ```
/// use rounds::core::projection::project;
/// use rounds::domain::{DepartmentFilter, Patient, PatientId};
/// use chrono::NaiveDate;
///
/// let mut listed = Patient::new(PatientId::new("PX-1").unwrap(), "Yatak 3");
/// listed.count_today = 2;
/// let idle = Patient::new(PatientId::new("PX-2").unwrap(), "Yatak 4");
///
/// let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
/// let rows = project(&[listed, idle], day, &DepartmentFilter::All);
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].count, 2);
/// ```
pub fn project(
    patients: &[Patient],
    day: NaiveDate,
    department: &DepartmentFilter,
) -> Vec<PatientSummary> {
    let filter = FilterContext::new(day, department.clone());

    let mut rows: Vec<PatientSummary> = patients
        .iter()
        .filter_map(|patient| summarize(patient, &filter))
        .collect();

    // Stable: equal timestamps keep storage order
    rows.sort_by(|a, b| match (a.last_visit_ts, b.last_visit_ts) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    rows
}

fn summarize(patient: &Patient, filter: &FilterContext) -> Option<PatientSummary> {
    let mut matches = 0u32;
    let mut last = None;
    for visit in patient.matching_visits(filter) {
        matches += 1;
        last = Some(visit.ts);
    }

    let count = if matches > 0 {
        matches
    } else {
        patient.count_today
    };
    if count == 0 {
        return None;
    }

    Some(PatientSummary {
        id: patient.id.clone(),
        label: patient.label.clone(),
        count,
        last_visit_ts: last.or(patient.last_visit_ts),
    })
}

/// A patient's loaded visits, newest first
pub fn visits_for_display(patient: &Patient) -> Vec<&Visit> {
    let mut visits: Vec<&Visit> = patient.visits.iter().collect();
    visits.sort_by(|a, b| b.ts.cmp(&a.ts));
    visits
}
