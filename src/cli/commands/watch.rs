//! Watch command implementation
//!
//! Keeps the patient list on today's date: checks the calendar on a fixed
//! interval and reloads the list whenever the day rolls over, until Ctrl+C.

use super::context::{exit_code, print_patient_rows, ClientContext};
use clap::Args;
use std::time::Duration;
use tokio::sync::watch;

/// Arguments for the watch command
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Seconds between calendar checks (defaults to client.auto_date_interval_seconds)
    #[arg(long)]
    pub interval: Option<u64>,

    /// Also reload the patient list on every check
    #[arg(long)]
    pub refresh_every_tick: bool,
}

impl WatchArgs {
    pub async fn execute(
        &self,
        config_path: &str,
        mut shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let mut ctx = match ClientContext::open(config_path) {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };
        if let Err(code) = ctx.ensure_signed_in() {
            return Ok(code);
        }

        let seconds = self
            .interval
            .unwrap_or(ctx.config.client.auto_date_interval_seconds)
            .max(1);
        ctx.controller.set_auto_date(true);

        tracing::info!(interval_seconds = seconds, "Watching for day changes");
        println!("👀 Watching patients (checking every {seconds}s, Ctrl+C to stop)");

        // The first tick fires immediately and loads the list
        let mut first = true;
        let mut interval = tokio::time::interval(Duration::from_secs(seconds));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let moved = match ctx.controller.tick().await {
                        Ok(moved) => moved,
                        Err(e) => {
                            tracing::warn!(error = %e, "Day change refresh failed");
                            true
                        }
                    };
                    if first || (!moved && self.refresh_every_tick) {
                        if let Err(e) = ctx.controller.refresh(true).await {
                            tracing::warn!(error = %e, "Refresh failed");
                        }
                    }
                    if first || moved || self.refresh_every_tick {
                        println!();
                        println!("🩺 Patients for {}", ctx.controller.filter());
                        print_patient_rows(&ctx.controller.patient_list());
                    }
                    first = false;
                }
                changed = shutdown_signal.changed() => {
                    if changed.is_err() || *shutdown_signal.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Watch stopped");
        println!("Stopped.");
        Ok(exit_code::SUCCESS)
    }
}
