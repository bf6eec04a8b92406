//! Mapping raw platform records into the canonical [`Assignment`] shape.

use chrono::{DateTime, Utc};

use crate::domain::{
    AdapterError, Assignment, GradingRow, JudgeItem, LmsEvent, Platform, RawBatch, Result,
};

/// Status cell text the grading site renders for an untouched assignment.
const NO_SUBMISSION: &str = "No Submission";

/// Normalize one fetched batch.
///
/// Consumes the tagged union exhaustively; per-platform `submitted` rules:
/// status-text inequality for the grading site (authoritative), explicit
/// `false` for the LMS, and a `due < now` heuristic for the online judge
/// (an approximation, see [`JudgeItem`]). An already-normalized batch
/// passes through unchanged, so normalization is idempotent.
pub fn normalize(batch: RawBatch, now: DateTime<Utc>) -> Result<Vec<Assignment>> {
    match batch {
        RawBatch::Grading(rows) => rows.into_iter().map(normalize_grading).collect(),
        RawBatch::Lms(events) => Ok(events.into_iter().map(normalize_lms).collect()),
        RawBatch::Judge(items) => Ok(items
            .into_iter()
            .map(|item| normalize_judge(item, now))
            .collect()),
        RawBatch::Normalized(assignments) => Ok(assignments),
    }
}

fn normalize_grading(row: GradingRow) -> Result<Assignment> {
    let mut dates = row.due_dates.iter().copied();
    let first = dates.next().ok_or_else(|| {
        AdapterError::MalformedUpstreamData(format!(
            "assignment {:?} has no due date",
            row.title
        ))
    })?;

    // Document order is regular-then-late, but the invariant is
    // late_due > due; resolve ordering here and collapse equal pairs.
    let (due, late_due) = match dates.next() {
        Some(second) if second > first => (first, Some(second)),
        Some(second) if second < first => (second, Some(first)),
        _ => (first, None),
    };

    let submitted = row.status != NO_SUBMISSION;
    Ok(Assignment {
        title: row.title,
        course: row.course,
        url: row.url,
        due,
        late_due,
        status: row.status,
        submitted,
        platform: Platform::GradingSite,
    })
}

fn normalize_lms(event: LmsEvent) -> Assignment {
    let status = if event.attemptable {
        "Attemptable"
    } else {
        "Unattemptable"
    };
    Assignment {
        title: event.title,
        course: event.course,
        url: event.url,
        due: event.due,
        late_due: None,
        status: status.to_string(),
        // The calendar feed does not expose submission state.
        submitted: false,
        platform: Platform::Lms,
    }
}

fn normalize_judge(item: JudgeItem, now: DateTime<Utc>) -> Assignment {
    Assignment {
        title: item.title,
        course: item.course,
        url: item.url,
        due: item.due,
        late_due: None,
        status: "Live".to_string(),
        // Heuristic: a closed homework window counts as submitted. The
        // judge does not expose a per-user submission check here.
        submitted: item.due < now.timestamp(),
        platform: Platform::OnlineJudge,
    }
}
