//! The seam between the front door and the platform adapters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Assignment, Credentials, Platform, Result};

/// One platform's full authenticate → fetch → normalize sequence.
///
/// Implementations own their configuration; each `collect` call opens a
/// fresh session, uses it for the duration of the call, and drops it —
/// sessions are never reused across calls. Independent sources share no
/// mutable state, so a front door may run them on parallel tasks.
#[async_trait]
pub trait AssignmentSource: Send + Sync {
    /// Platform tag this source produces.
    fn platform(&self) -> Platform;

    /// Authenticate with `credentials` and return the platform's
    /// normalized assignments. `now` anchors time-relative behavior
    /// (calendar windows, the judge's submitted heuristic).
    async fn collect(
        &self,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<Vec<Assignment>>;
}
