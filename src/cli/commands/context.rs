//! Shared command bootstrap and output helpers

use crate::adapters::api::HttpGateway;
use crate::adapters::storage::FileStore;
use crate::config::{load_config, RoundsConfig};
use crate::core::clock::SystemClock;
use crate::core::selection::SelectionController;
use crate::domain::{DepartmentFilter, NetworkError, PatientSummary, RoundsError, Visit};
use chrono::NaiveDate;
use clap::Args;
use std::sync::Arc;

/// Exit codes shared by every command
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const CONFIGURATION: i32 = 2;
    pub const REJECTED: i32 = 3;
    pub const CONNECTION: i32 = 4;
    pub const FATAL: i32 = 5;
}

/// Day and department options accepted by list-style commands
#[derive(Args, Debug, Clone, Default)]
pub struct ScopeArgs {
    /// Day to show (YYYY-MM-DD); turns auto-date off
    #[arg(long)]
    pub day: Option<NaiveDate>,

    /// Department filter (ALL or a department name)
    #[arg(long)]
    pub department: Option<DepartmentFilter>,
}

/// Loaded configuration plus a controller restored from persisted state
pub struct ClientContext {
    pub config: RoundsConfig,
    pub controller: SelectionController,
}

impl ClientContext {
    /// Load and validate the configuration, then restore the controller
    ///
    /// On failure the problem has already been printed and the exit code is
    /// returned as the error.
    pub fn open(config_path: &str) -> Result<Self, i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Err(exit_code::CONFIGURATION);
            }
        };
        if let Err(e) = config.validate() {
            println!("❌ Configuration validation failed");
            println!("   Error: {e}");
            return Err(exit_code::CONFIGURATION);
        }

        let gateway = match HttpGateway::new(&config.api, config.client.feed_limit) {
            Ok(g) => g,
            Err(e) => {
                println!("❌ Failed to create API client");
                println!("   Error: {e}");
                return Err(exit_code::CONFIGURATION);
            }
        };
        let storage = match FileStore::open(&config.storage.path) {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to open local state");
                println!("   Error: {e}");
                return Err(exit_code::FATAL);
            }
        };

        let mut controller = SelectionController::new(
            Arc::new(gateway),
            Arc::new(SystemClock),
            Arc::new(storage),
            config.client.default_department.clone(),
        );
        controller.startup();

        Ok(Self { config, controller })
    }

    /// Require a stored session
    pub fn ensure_signed_in(&self) -> Result<(), i32> {
        if self.controller.session().is_some() {
            Ok(())
        } else {
            println!("❌ Not signed in. Run 'rounds login' first.");
            Err(exit_code::REJECTED)
        }
    }

    /// Apply `--day` / `--department`, refreshing once either way
    pub async fn apply_scope(&mut self, scope: &ScopeArgs) -> crate::domain::Result<()> {
        match (&scope.department, scope.day) {
            (None, None) => self.controller.refresh(true).await,
            (Some(department), None) => self.controller.set_department(department.clone()).await,
            (None, Some(day)) => self.controller.set_day(day).await,
            (Some(department), Some(day)) => {
                // The department refresh is superseded by the day refresh
                let _ = self.controller.set_department(department.clone()).await;
                self.controller.set_day(day).await
            }
        }
    }
}

/// Print an error and map it to an exit code
pub fn report_failure(action: &str, error: &RoundsError) -> i32 {
    println!("❌ {action} failed");
    println!("   Error: {error}");
    exit_code_for(error)
}

pub fn exit_code_for(error: &RoundsError) -> i32 {
    match error {
        RoundsError::Configuration(_) => exit_code::CONFIGURATION,
        RoundsError::Validation(_) | RoundsError::NotSignedIn => exit_code::REJECTED,
        RoundsError::Network(NetworkError::Unauthorized { .. })
        | RoundsError::Network(NetworkError::Forbidden(_)) => exit_code::REJECTED,
        RoundsError::Network(_) => exit_code::CONNECTION,
        _ => exit_code::FATAL,
    }
}

pub fn print_patient_rows(rows: &[PatientSummary]) {
    if rows.is_empty() {
        println!("No patients for this day and department.");
        return;
    }
    println!("{:<16} {:<30} {:>6}  {:<19}", "Patient", "Label", "Visits", "Last Visit");
    println!("{}", "-".repeat(76));
    for row in rows {
        let last = row
            .last_visit_ts
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<16} {:<30} {:>6}  {:<19}",
            row.id.as_str(),
            row.label,
            row.count,
            last
        );
    }
}

pub fn print_visits(visits: &[&Visit]) {
    if visits.is_empty() {
        println!("No visits recorded for this day.");
        return;
    }
    for visit in visits {
        let mut flags = Vec::new();
        if visit.ops.drug {
            flags.push("drug");
        }
        if visit.ops.test {
            flags.push("test");
        }
        if visit.ops.consult {
            flags.push("consult");
        }
        if visit.ops.critical {
            flags.push("CRITICAL");
        }
        let edited = if visit.edited_at.is_some() { " (edited)" } else { "" };
        println!(
            "#{} {} [{}] {}{}",
            visit.id,
            visit.ts.format("%H:%M"),
            visit.department,
            visit.author,
            edited
        );
        if !flags.is_empty() {
            println!("   {}", flags.join(", "));
        }
        println!("   {}", visit.text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            exit_code_for(&RoundsError::Validation("short".into())),
            exit_code::REJECTED
        );
        assert_eq!(exit_code_for(&RoundsError::NotSignedIn), exit_code::REJECTED);
        assert_eq!(
            exit_code_for(&RoundsError::Network(NetworkError::Timeout(
                "slow".into()
            ))),
            exit_code::CONNECTION
        );
        assert_eq!(
            exit_code_for(&RoundsError::State("x".into())),
            exit_code::FATAL
        );
    }
}
