//! Patient list and patient intake commands

use super::context::{
    exit_code, print_patient_rows, print_visits, report_failure, ClientContext, ScopeArgs,
};
use crate::domain::PatientId;
use clap::Args;

/// Arguments for the patients command
#[derive(Args, Debug)]
pub struct PatientsArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Also show the visits of this patient for the day
    #[arg(long)]
    pub show: Option<PatientId>,
}

impl PatientsArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut ctx = match ClientContext::open(config_path) {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };
        if let Err(code) = ctx.ensure_signed_in() {
            return Ok(code);
        }

        let refreshed = ctx.apply_scope(&self.scope).await;

        println!("🩺 Patients for {}", ctx.controller.filter());
        println!();
        print_patient_rows(&ctx.controller.patient_list());

        if let Err(e) = refreshed {
            println!();
            println!("⚠️  Showing cached visits; the server list is unavailable: {e}");
        }

        if let Some(patient_id) = &self.show {
            println!();
            if let Err(e) = ctx.controller.select_patient(patient_id.clone()).await {
                println!("⚠️  Visits may be out of date: {e}");
            }
            match ctx.controller.selected_patient() {
                Some(patient) => println!("📋 {} ({})", patient.label, patient.id),
                None => {
                    println!("❌ Unknown patient: {patient_id}");
                    return Ok(exit_code::REJECTED);
                }
            }
            print_visits(&ctx.controller.selected_visits());
        }

        Ok(exit_code::SUCCESS)
    }
}

/// Arguments for the open command
#[derive(Args, Debug)]
pub struct OpenArgs {
    /// National identity number (11 digits; spaces and dashes are ignored)
    pub national_id: String,

    /// Bed or room label shown in the patient list
    #[arg(short, long, default_value = "")]
    pub label: String,
}

impl OpenArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut ctx = match ClientContext::open(config_path) {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };
        if let Err(code) = ctx.ensure_signed_in() {
            return Ok(code);
        }

        let patient_id = match ctx
            .controller
            .open_patient(&self.national_id, &self.label)
            .await
        {
            Ok(id) => id,
            Err(e) => return Ok(report_failure("Opening the patient", &e)),
        };

        let label = ctx
            .controller
            .selected_patient()
            .map(|p| p.label.clone())
            .unwrap_or_default();
        println!("✅ Patient {patient_id} ({label})");
        println!();
        print_visits(&ctx.controller.selected_visits());
        println!();
        println!("Add a note with: rounds note --patient {patient_id} \"...\"");
        Ok(exit_code::SUCCESS)
    }
}
