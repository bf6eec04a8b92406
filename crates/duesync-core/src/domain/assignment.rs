//! Raw per-platform assignment records and the normalized output shape.

use serde::{Deserialize, Serialize};

/// Source platform tag carried on every normalized assignment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    GradingSite,
    Lms,
    OnlineJudge,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::GradingSite => write!(f, "grading_site"),
            Platform::Lms => write!(f, "lms"),
            Platform::OnlineJudge => write!(f, "online_judge"),
        }
    }
}

/// One row of a grading-site assignment table, as extracted.
///
/// `due_dates` holds the row's `time[datetime]` values in document order:
/// the first is the regular due date, the second (when present) the
/// late/hard due date. Ordering is resolved by the normalizer, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingRow {
    pub title: String,
    /// Short name of the course the row belongs to.
    pub course: String,
    /// Course page URL the row was scraped from.
    pub url: String,
    /// Verbatim status cell text (e.g. `"No Submission"`, `"Submitted"`).
    pub status: String,
    /// Release timestamp, when the row renders one.
    pub release_date: Option<i64>,
    /// Due timestamps in document order (regular, then late when present).
    pub due_dates: Vec<i64>,
    /// Text of the late-status badge, when rendered.
    pub late_status: Option<String>,
    /// Text of the time-remaining badge, when rendered.
    pub remaining: Option<String>,
}

/// One LMS calendar event, timestamps already resolved by the adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct LmsEvent {
    pub title: String,
    /// Calendar (course) name the event belongs to.
    pub course: String,
    /// Due instant as a Unix timestamp.
    pub due: i64,
    /// Whether the gradable item still accepts attempts.
    pub attemptable: bool,
    /// Deep link to the gradable item.
    pub url: String,
}

/// One online-judge homework calendar item.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgeItem {
    pub title: String,
    /// Contest rule tag the judge attaches to the item (e.g. `"homework"`).
    pub rule: String,
    /// First assignment group the item belongs to.
    pub course: String,
    /// End-of-window instant as a Unix timestamp.
    pub due: i64,
    /// Homework detail page URL.
    pub url: String,
}

/// A fetched batch of raw records, tagged by source platform.
///
/// The normalizer consumes this exhaustively, so a platform cannot drift
/// its field names without the compiler noticing. The `Normalized` arm
/// carries already-normalized assignments straight through, which makes
/// normalization idempotent.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBatch {
    Grading(Vec<GradingRow>),
    Lms(Vec<LmsEvent>),
    Judge(Vec<JudgeItem>),
    Normalized(Vec<Assignment>),
}

/// The canonical normalized assignment.
///
/// `due` is always present and is a UTC instant. `submitted` is derived
/// per-platform and never null; for the online judge it is a time
/// heuristic, not an authoritative submission check. `late_due`, when
/// present, is strictly after `due`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub title: String,
    pub course: String,
    pub url: String,
    /// Due instant, Unix seconds.
    pub due: i64,
    /// Late/hard due instant, Unix seconds; strictly after `due`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub late_due: Option<i64>,
    /// Platform-native status text.
    pub status: String,
    pub submitted: bool,
    /// Source platform the record came from.
    pub platform: Platform,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_serializes_camel_case() {
        let a = Assignment {
            title: "HW 1".to_string(),
            course: "CS 101".to_string(),
            url: "https://grades.example.edu/courses/1234".to_string(),
            due: 1_700_000_000,
            late_due: Some(1_700_086_400),
            status: "Submitted".to_string(),
            submitted: true,
            platform: Platform::GradingSite,
        };
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["lateDue"], 1_700_086_400);
        assert_eq!(json["platform"], "grading_site");
    }

    #[test]
    fn test_absent_late_due_is_omitted() {
        let a = Assignment {
            title: "HW 2".to_string(),
            course: "CS 101".to_string(),
            url: "https://grades.example.edu/courses/1234".to_string(),
            due: 1_700_000_000,
            late_due: None,
            status: "No Submission".to_string(),
            submitted: false,
            platform: Platform::GradingSite,
        };
        let json = serde_json::to_value(&a).unwrap();
        assert!(json.get("lateDue").is_none());
    }
}
