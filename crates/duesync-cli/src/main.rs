//! duesync - assignment due-date aggregator
//!
//! The `duesync` command logs into one (or every configured) platform,
//! fetches the assignment schedule, and prints a JSON envelope:
//! `{"status": "success", "data": [...]}` on success,
//! `{"status": "error", "message": "..."}` otherwise. Credentials come
//! from flags or environment variables and are never stored.
//!
//! ## Commands
//!
//! - `grading`: grading-site assignments for one role's courses
//! - `lms`: LMS calendar events (upcoming and past due)
//! - `judge`: online-judge homework (note: its `submitted` flag is a
//!   time heuristic, not an authoritative submission check)
//! - `all`: every platform configured in the environment, in parallel

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::Level;

use duesync_core::{
    Assignment, AssignmentSource, Credentials, GradingConfig, GradingSite, JudgeConfig, Lms,
    LmsConfig, OnlineJudge, Role,
};

#[derive(Parser)]
#[command(name = "duesync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Aggregate assignment due dates from campus platforms", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines (the result envelope is always JSON)
    #[arg(long, global = true)]
    json_logs: bool,

    /// Per-request deadline in seconds
    #[arg(long, global = true, default_value = "15")]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    Student,
    Instructor,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Student => Role::Student,
            RoleArg::Instructor => Role::Instructor,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch assignments for every course on the grading site
    Grading {
        /// Login email
        #[arg(long, env = "DUESYNC_GRADING_EMAIL")]
        email: String,

        /// Login password
        #[arg(long, env = "DUESYNC_GRADING_PASSWORD", hide_env_values = true)]
        password: String,

        /// Dashboard role whose courses to aggregate
        #[arg(long, value_enum, default_value = "student")]
        role: RoleArg,
    },

    /// Fetch upcoming and past-due LMS calendar events
    Lms {
        /// Student id
        #[arg(long, env = "DUESYNC_LMS_USERNAME")]
        username: String,

        /// Password (encrypted client-side for the SSO form)
        #[arg(long, env = "DUESYNC_LMS_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Fetch the online judge's homework calendar
    Judge {
        /// Account name
        #[arg(long, env = "DUESYNC_JUDGE_USERNAME")]
        username: String,

        /// Password
        #[arg(long, env = "DUESYNC_JUDGE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Run every platform configured via environment variables
    All,
}

/// Response envelope the front door always answers with.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Envelope {
    Success { data: Vec<Assignment> },
    Error { message: String },
}

impl Envelope {
    fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    duesync_core::telemetry::init_tracing(cli.json_logs, level);

    let timeout = Duration::from_secs(cli.timeout_secs);
    match cli.command {
        Commands::Grading {
            email,
            password,
            role,
        } => {
            let source = grading_source(role.into(), timeout);
            finish_one(run_source(&source, &Credentials::new(email, password)).await)
        }
        Commands::Lms { username, password } => {
            let source = lms_source(timeout);
            finish_one(run_source(&source, &Credentials::new(username, password)).await)
        }
        Commands::Judge { username, password } => {
            let source = judge_source(timeout);
            finish_one(run_source(&source, &Credentials::new(username, password)).await)
        }
        Commands::All => cmd_all(timeout).await,
    }
}

fn grading_source(role: Role, timeout: Duration) -> GradingSite {
    let mut config = GradingConfig {
        role,
        ..GradingConfig::default()
    };
    config.transport.timeout = timeout;
    GradingSite::new(config)
}

fn lms_source(timeout: Duration) -> Lms {
    let mut config = LmsConfig::default();
    config.transport.timeout = timeout;
    Lms::new(config)
}

fn judge_source(timeout: Duration) -> OnlineJudge {
    let mut config = JudgeConfig::default();
    config.transport.timeout = timeout;
    OnlineJudge::new(config)
}

/// Collect one platform into an envelope. Failures become a structured
/// error message, never a raw backtrace.
async fn run_source(source: &dyn AssignmentSource, credentials: &Credentials) -> Envelope {
    match source.collect(credentials, Utc::now()).await {
        Ok(data) => Envelope::Success { data },
        Err(err) => {
            tracing::error!(platform = %source.platform(), error = %err, "collection failed");
            Envelope::Error {
                message: err.to_string(),
            }
        }
    }
}

/// Print a single-platform envelope and set the exit code.
fn finish_one(envelope: Envelope) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    if !envelope.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

/// Credentials for one platform, pulled from the environment; `None`
/// when the platform is not configured.
fn env_credentials(identity_var: &str, secret_var: &str) -> Option<Credentials> {
    let identity = std::env::var(identity_var).ok()?;
    let secret = std::env::var(secret_var).ok()?;
    Some(Credentials::new(identity, secret))
}

/// Aggregate every configured platform on parallel tasks. The platforms
/// share no mutable state; each task owns its adapter and session.
async fn cmd_all(timeout: Duration) -> Result<()> {
    let mut set: JoinSet<(&'static str, Envelope)> = JoinSet::new();

    if let Some(creds) = env_credentials("DUESYNC_GRADING_EMAIL", "DUESYNC_GRADING_PASSWORD") {
        set.spawn(async move {
            let source = grading_source(Role::Student, timeout);
            ("grading_site", run_source(&source, &creds).await)
        });
    }
    if let Some(creds) = env_credentials("DUESYNC_LMS_USERNAME", "DUESYNC_LMS_PASSWORD") {
        set.spawn(async move {
            let source = lms_source(timeout);
            ("lms", run_source(&source, &creds).await)
        });
    }
    if let Some(creds) = env_credentials("DUESYNC_JUDGE_USERNAME", "DUESYNC_JUDGE_PASSWORD") {
        set.spawn(async move {
            let source = judge_source(timeout);
            ("online_judge", run_source(&source, &creds).await)
        });
    }

    if set.is_empty() {
        anyhow::bail!(
            "no platform is configured; set DUESYNC_GRADING_EMAIL/PASSWORD, \
             DUESYNC_LMS_USERNAME/PASSWORD or DUESYNC_JUDGE_USERNAME/PASSWORD"
        );
    }

    let mut results: BTreeMap<&'static str, Envelope> = BTreeMap::new();
    while let Some(joined) = set.join_next().await {
        let (platform, envelope) = joined?;
        results.insert(platform, envelope);
    }
    println!("{}", serde_json::to_string_pretty(&results)?);

    if results.values().all(|e| !e.is_success()) {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_wire_shape() {
        let ok = Envelope::Success { data: Vec::new() };
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["status"], "success");
        assert!(json["data"].as_array().unwrap().is_empty());

        let err = Envelope::Error {
            message: "authentication failed".to_string(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "authentication failed");
    }

    #[test]
    fn test_role_arg_maps_to_role() {
        assert_eq!(Role::from(RoleArg::Student), Role::Student);
        assert_eq!(Role::from(RoleArg::Instructor), Role::Instructor);
    }
}
