//! Login and logout commands

use super::context::{exit_code, print_patient_rows, report_failure, ClientContext};
use crate::config::secret_string;
use clap::Args;

/// Arguments for the login command
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Username (defaults to api.username)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Password (defaults to api.password)
    #[arg(long, env = "ROUNDS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl LoginArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut ctx = match ClientContext::open(config_path) {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };

        let Some(username) = self
            .username
            .clone()
            .or_else(|| ctx.config.api.username.clone())
        else {
            println!("❌ No username given. Pass --username or set api.username");
            return Ok(exit_code::CONFIGURATION);
        };
        let password = match (&self.password, &ctx.config.api.password) {
            (Some(password), _) => secret_string(password.clone()),
            (None, Some(password)) => password.clone(),
            (None, None) => {
                println!("❌ No password given. Pass --password, set ROUNDS_PASSWORD or api.password");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        println!("🔐 Signing in to {}", ctx.config.api.base_url);

        if let Err(e) = ctx.controller.login(&username, &password).await {
            return Ok(report_failure("Sign-in", &e));
        }

        if let Some(session) = ctx.controller.session() {
            println!(
                "✅ Signed in as {} ({})",
                session.display_name,
                session.role.as_str()
            );
        }
        println!("   Day: {} (auto-date on)", ctx.controller.day());
        println!();
        print_patient_rows(&ctx.controller.patient_list());
        Ok(exit_code::SUCCESS)
    }
}

/// Arguments for the logout command
#[derive(Args, Debug)]
pub struct LogoutArgs {}

impl LogoutArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut ctx = match ClientContext::open(config_path) {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };

        let was_signed_in = ctx.controller.session().is_some();
        if let Err(e) = ctx.controller.logout() {
            return Ok(report_failure("Sign-out", &e));
        }

        if was_signed_in {
            println!("👋 Signed out; local patient cache cleared");
        } else {
            println!("Not signed in.");
        }
        Ok(exit_code::SUCCESS)
    }
}
