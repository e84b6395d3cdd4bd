//! Day/department filter context
//!
//! The filter context decides which visits are "active" for the patient list
//! and the daily report.

use super::visit::Visit;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Department a visit is recorded under when none was given
pub const GENERAL_DEPARTMENT: &str = "GENEL";

/// Department a new visit falls back to when the filter shows all departments
pub const EMERGENCY_DEPARTMENT: &str = "ACIL";

/// Wire form of the "every department" filter
pub const ALL_DEPARTMENTS: &str = "ALL";

/// Departments offered by the hospital's ward list
pub const KNOWN_DEPARTMENTS: [&str; 8] = [
    "GENEL",
    "DAHILIYE",
    "KBB",
    "KARDIYOLOJI",
    "GOZ",
    "NOROLOJI",
    "CERRAHI",
    "ACIL",
];

/// Upper-cased department name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Department(String);

impl Department {
    /// Normalise a department name; blank input means [`GENERAL_DEPARTMENT`]
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim();
        if name.is_empty() {
            Self::general()
        } else {
            Self(name.to_uppercase())
        }
    }

    /// The general ward
    pub fn general() -> Self {
        Self(GENERAL_DEPARTMENT.to_string())
    }

    /// The emergency department
    pub fn emergency() -> Self {
        Self(EMERGENCY_DEPARTMENT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name is on the hospital's ward list
    pub fn is_known(&self) -> bool {
        KNOWN_DEPARTMENTS.contains(&self.0.as_str())
    }
}

impl Default for Department {
    fn default() -> Self {
        Self::general()
    }
}

impl From<String> for Department {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<Department> for String {
    fn from(value: Department) -> Self {
        value.0
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Department part of the filter context
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DepartmentFilter {
    /// Every department
    #[default]
    All,
    /// A single department
    Only(Department),
}

impl DepartmentFilter {
    /// Whether a visit recorded under `department` passes this filter
    pub fn admits(&self, department: &Department) -> bool {
        match self {
            DepartmentFilter::All => true,
            DepartmentFilter::Only(wanted) => wanted == department,
        }
    }

    /// Department a new visit is recorded under when the author picked none
    pub fn default_visit_department(&self) -> Department {
        match self {
            DepartmentFilter::All => Department::emergency(),
            DepartmentFilter::Only(department) => department.clone(),
        }
    }

    /// Query-string form understood by the API
    pub fn as_query_value(&self) -> &str {
        match self {
            DepartmentFilter::All => ALL_DEPARTMENTS,
            DepartmentFilter::Only(department) => department.as_str(),
        }
    }
}

impl From<String> for DepartmentFilter {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_DEPARTMENTS) {
            DepartmentFilter::All
        } else {
            DepartmentFilter::Only(Department::new(trimmed))
        }
    }
}

impl From<DepartmentFilter> for String {
    fn from(value: DepartmentFilter) -> Self {
        value.as_query_value().to_string()
    }
}

impl FromStr for DepartmentFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(DepartmentFilter::from(s.to_string()))
    }
}

impl fmt::Display for DepartmentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_query_value())
    }
}

/// Process-wide view filter: the selected day and department
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterContext {
    pub day: NaiveDate,
    pub department: DepartmentFilter,
}

impl FilterContext {
    pub fn new(day: NaiveDate, department: DepartmentFilter) -> Self {
        Self { day, department }
    }

    /// Whether a visit falls on the selected day and passes the department filter
    pub fn matches(&self, visit: &Visit) -> bool {
        visit.ts.date() == self.day && self.department.admits(&visit.department)
    }
}

impl fmt::Display for FilterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.day, self.department)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_department_normalises_case() {
        assert_eq!(Department::new("acil"), Department::emergency());
        assert_eq!(Department::new("  Kbb "), Department::new("KBB"));
    }

    #[test]
    fn test_blank_department_is_general() {
        assert_eq!(Department::new(""), Department::general());
        assert_eq!(Department::default().as_str(), "GENEL");
    }

    #[test]
    fn test_filter_parses_all_case_insensitively() {
        assert_eq!("all".parse::<DepartmentFilter>().unwrap(), DepartmentFilter::All);
        assert_eq!("".parse::<DepartmentFilter>().unwrap(), DepartmentFilter::All);
        assert_eq!(
            "cerrahi".parse::<DepartmentFilter>().unwrap(),
            DepartmentFilter::Only(Department::new("CERRAHI"))
        );
    }

    #[test]
    fn test_filter_admits() {
        let acil = DepartmentFilter::Only(Department::emergency());
        assert!(acil.admits(&Department::new("acil")));
        assert!(!acil.admits(&Department::general()));
        assert!(DepartmentFilter::All.admits(&Department::general()));
    }

    #[test]
    fn test_default_visit_department() {
        assert_eq!(
            DepartmentFilter::All.default_visit_department(),
            Department::emergency()
        );
        let kbb = DepartmentFilter::Only(Department::new("KBB"));
        assert_eq!(kbb.default_visit_department().as_str(), "KBB");
    }

    #[test]
    fn test_filter_serde_uses_wire_form() {
        let json = serde_json::to_string(&DepartmentFilter::All).unwrap();
        assert_eq!(json, "\"ALL\"");
        let back: DepartmentFilter = serde_json::from_str("\"goz\"").unwrap();
        assert_eq!(back.to_string(), "GOZ");
    }

    #[test]
    fn test_known_departments() {
        assert!(Department::new("noroloji").is_known());
        assert!(!Department::new("ONKOLOJI").is_known());
    }
}
