//! Daily report command

use super::context::{exit_code, report_failure, ClientContext, ScopeArgs};
use crate::core::selection::Tab;
use crate::domain::DailyReport;
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for the report command
#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Narrow the per-author sections to one author (supervisors and admins)
    #[arg(long)]
    pub author: Option<String>,

    /// List authors matching this text instead of printing the report
    #[arg(long)]
    pub authors: Option<String>,

    /// Pin or unpin an author at the top of the author list
    #[arg(long)]
    pub toggle_favorite: Option<String>,

    /// Download the server-rendered PDF to this path
    #[arg(long)]
    pub pdf: Option<PathBuf>,
}

impl ReportArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut ctx = match ClientContext::open(config_path) {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };
        if let Err(code) = ctx.ensure_signed_in() {
            return Ok(code);
        }

        if let Some(name) = &self.toggle_favorite {
            if ctx.controller.toggle_favorite_author(name) {
                println!("⭐ {name} pinned");
            } else {
                println!("   {name} unpinned");
            }
        }

        if self.scope.day.is_some() || self.scope.department.is_some() {
            if let Err(e) = ctx.apply_scope(&self.scope).await {
                tracing::warn!(error = %e, "Patient list unavailable");
            }
        }
        if let Err(e) = ctx.controller.set_tab(Tab::Report).await {
            tracing::warn!(error = %e, "Refresh on report tab incomplete");
        }

        if let Some(path) = &self.pdf {
            return Ok(self.download_pdf(&ctx, path).await);
        }

        if let Some(query) = &self.authors {
            let favorites = ctx.controller.favorite_authors();
            for name in ctx.controller.author_directory(query) {
                let marker = if favorites.contains(&name) { "⭐" } else { "  " };
                println!("{marker} {name}");
            }
            return Ok(exit_code::SUCCESS);
        }

        match ctx.controller.visible_report(self.author.as_deref()) {
            Some(report) => {
                println!("📊 Daily report for {}", ctx.controller.filter());
                println!();
                print_report(&report);
                Ok(exit_code::SUCCESS)
            }
            None => {
                println!("❌ The report could not be loaded");
                Ok(exit_code::CONNECTION)
            }
        }
    }

    async fn download_pdf(&self, ctx: &ClientContext, path: &Path) -> i32 {
        let bytes = match ctx.controller.download_report_pdf().await {
            Ok(bytes) => bytes,
            Err(e) => return report_failure("Downloading the PDF", &e),
        };
        match fs::write(path, &bytes) {
            Ok(()) => {
                println!("✅ Report saved to {} ({} bytes)", path.display(), bytes.len());
                exit_code::SUCCESS
            }
            Err(e) => {
                println!("❌ Failed to write {}", path.display());
                println!("   Error: {e}");
                exit_code::FATAL
            }
        }
    }
}

fn print_report(report: &DailyReport) {
    println!("  Patients seen: {}", report.patients_seen);
    println!(
        "  Critical: {}  Drugs: {}  Tests: {}  Consults: {}",
        report.totals.critical, report.totals.drugs, report.totals.tests, report.totals.consults
    );

    if !report.lines.is_empty() {
        println!();
        for line in &report.lines {
            println!("  {line}");
        }
    }

    if !report.by_author_detail.is_empty() {
        println!();
        println!("{:<30} {:>8} {:>8} {:>8}", "Author", "Patients", "Visits", "Critical");
        println!("{}", "-".repeat(57));
        for (author, counts) in &report.by_author_detail {
            println!(
                "{:<30} {:>8} {:>8} {:>8}",
                author, counts.patients, counts.visits, counts.critical
            );
        }
    }

    for (author, visits) in &report.by_author {
        println!();
        println!("✍️  {author}");
        for entry in visits {
            let visit = &entry.visit;
            println!(
                "   {} {} [{}] {}",
                visit.ts.format("%H:%M"),
                entry.patient_id,
                visit.department,
                visit.text
            );
        }
    }
}
