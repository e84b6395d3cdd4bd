//! Visit note commands: add, edit and delete

use super::context::{exit_code, print_visits, report_failure, ClientContext, ScopeArgs};
use crate::domain::{Department, PatientId, VisitDraft, VisitId, VisitOps, VisitPatch};
use clap::Args;

/// Arguments for the note command
#[derive(Args, Debug)]
pub struct NoteArgs {
    /// Patient the note belongs to
    #[arg(short, long)]
    pub patient: PatientId,

    /// Note text (at least 20 characters)
    pub text: String,

    /// Department to record under (defaults to the current filter, or ACIL)
    #[arg(long)]
    pub department: Option<String>,

    #[arg(long)]
    pub drug: bool,

    #[arg(long)]
    pub test: bool,

    #[arg(long)]
    pub consult: bool,

    #[arg(long)]
    pub critical: bool,
}

impl NoteArgs {
    fn draft(&self) -> VisitDraft {
        let draft = VisitDraft::new(self.text.clone()).with_ops(VisitOps {
            drug: self.drug,
            test: self.test,
            consult: self.consult,
            critical: self.critical,
        });
        match &self.department {
            Some(name) => draft.with_department(Department::new(name)),
            None => draft,
        }
    }

    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut ctx = match open_for_patient(config_path, &self.patient, None).await {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };

        match ctx.controller.add_visit(self.draft()).await {
            Ok(visit_id) => {
                println!("✅ Visit #{visit_id} saved");
                println!();
                print_visits(&ctx.controller.selected_visits());
                Ok(exit_code::SUCCESS)
            }
            Err(e) => Ok(report_write_failure(&mut ctx, "Saving the note", &e)),
        }
    }
}

/// Arguments for the edit command
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Visit to edit
    pub visit_id: VisitId,

    /// Patient the visit belongs to
    #[arg(short, long)]
    pub patient: PatientId,

    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Replacement note text
    #[arg(long)]
    pub text: Option<String>,

    #[arg(long)]
    pub drug: Option<bool>,

    #[arg(long)]
    pub test: Option<bool>,

    #[arg(long)]
    pub consult: Option<bool>,

    #[arg(long)]
    pub critical: Option<bool>,
}

impl EditArgs {
    fn patch(&self) -> VisitPatch {
        VisitPatch {
            text: self.text.clone(),
            ops_drug: self.drug,
            ops_test: self.test,
            ops_consult: self.consult,
            ops_critical: self.critical,
        }
    }

    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut ctx = match open_for_patient(config_path, &self.patient, Some(&self.scope)).await {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };

        match ctx.controller.update_visit(self.visit_id, self.patch()).await {
            Ok(()) => {
                println!("✅ Visit #{} updated", self.visit_id);
                println!();
                print_visits(&ctx.controller.selected_visits());
                Ok(exit_code::SUCCESS)
            }
            Err(e) => Ok(report_write_failure(&mut ctx, "Updating the visit", &e)),
        }
    }
}

/// Arguments for the delete command
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Visit to delete
    pub visit_id: VisitId,

    /// Patient the visit belongs to
    #[arg(short, long)]
    pub patient: PatientId,

    #[command(flatten)]
    pub scope: ScopeArgs,
}

impl DeleteArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut ctx = match open_for_patient(config_path, &self.patient, Some(&self.scope)).await {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };

        match ctx.controller.delete_visit(self.visit_id).await {
            Ok(()) => {
                println!("🗑️  Visit #{} deleted", self.visit_id);
                Ok(exit_code::SUCCESS)
            }
            Err(e) => Ok(report_write_failure(&mut ctx, "Deleting the visit", &e)),
        }
    }
}

/// Restore the controller, apply the scope and select `patient`
async fn open_for_patient(
    config_path: &str,
    patient: &PatientId,
    scope: Option<&ScopeArgs>,
) -> Result<ClientContext, i32> {
    let mut ctx = ClientContext::open(config_path)?;
    ctx.ensure_signed_in()?;

    if let Some(scope) = scope.filter(|s| s.day.is_some() || s.department.is_some()) {
        if let Err(e) = ctx.apply_scope(scope).await {
            tracing::warn!(error = %e, "Patient list unavailable");
        }
    }
    if let Err(e) = ctx.controller.select_patient(patient.clone()).await {
        println!("⚠️  Could not load visits for {patient}: {e}");
    }
    Ok(ctx)
}

fn report_write_failure(
    ctx: &mut ClientContext,
    action: &str,
    error: &crate::domain::RoundsError,
) -> i32 {
    let code = report_failure(action, error);
    for notice in ctx.controller.take_notices() {
        println!("   {notice}");
    }
    code
}
