//! Structured extraction from grading-site HTML.
//!
//! The only module that knows the site's markup: heading labels, class
//! names, sibling layout. Everything is expressed through a typed query
//! surface over a parsed document tree — find by tag, find by selector,
//! next structural sibling — so markup drift is contained here.

use chrono::DateTime;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::domain::{AdapterError, Course, GradingRow, Result, Role};

/// `time[datetime]` format used by the site's submission-time charts.
const DUE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// A parsed grading-site page.
pub struct Document {
    html: Html,
}

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Concatenated, trimmed text content of an element.
fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Next structural sibling element carrying `class`.
fn next_sibling_with_class<'a>(el: ElementRef<'a>, class: &str) -> Option<ElementRef<'a>> {
    el.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().classes().any(|c| c == class))
}

/// Keep only ASCII digits and parse base-10.
///
/// Lenient on purpose: course ids arrive embedded in decorated hrefs and
/// occasionally pick up stray text, so everything non-numeric is dropped
/// before parsing. Returns `None` when no digits remain.
pub fn parse_digits(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

impl Document {
    pub fn parse(text: &str) -> Self {
        Self {
            html: Html::parse_document(text),
        }
    }

    /// Anti-forgery token the login form must echo back.
    ///
    /// Absence is an absence marker, not an error: the caller logs it and
    /// lets the login attempt proceed (and most likely fail downstream).
    pub fn login_token(&self) -> Option<String> {
        self.html
            .select(&sel(r#"input[name="authenticity_token"]"#))
            .next()
            .and_then(|input| input.value().attr("value"))
            .map(str::to_string)
    }

    /// Course tiles listed on the dashboard under `role`'s heading.
    ///
    /// The heading is matched by exact text, falling back to the generic
    /// `h1.pageHeading`. A dashboard without a usable heading is a known
    /// degraded case: it yields an empty list and a warning, never an
    /// error.
    pub fn dashboard_courses(&self, role: Role) -> Vec<Course> {
        let heading = self
            .html
            .select(&sel("h1"))
            .find(|h| text_of(*h) == role.heading_label())
            .or_else(|| self.html.select(&sel("h1.pageHeading")).next());

        let Some(heading) = heading else {
            warn!(role = ?role, "no dashboard heading for role; returning no courses");
            return Vec::new();
        };
        let Some(course_list) = next_sibling_with_class(heading, "courseList") else {
            warn!(role = ?role, "dashboard heading has no adjacent course list");
            return Vec::new();
        };

        let mut courses = Vec::new();
        for term in course_list.select(&sel(".courseList--term")) {
            let term_name = text_of(term);
            let Some(container) = next_sibling_with_class(term, "courseList--coursesForTerm")
            else {
                continue;
            };
            for tile in container.select(&sel("a.courseBox")) {
                let href = tile.value().attr("href").unwrap_or_default();
                let Some(id) = parse_digits(href.rsplit('/').next().unwrap_or_default()) else {
                    warn!(href, "course tile href has no numeric id; skipping");
                    continue;
                };
                let short_name = tile
                    .select(&sel(".courseBox--shortname"))
                    .next()
                    .map(text_of)
                    .unwrap_or_default();
                let full_name = tile
                    .select(&sel(".courseBox--name"))
                    .next()
                    .map(text_of)
                    .unwrap_or_default();
                courses.push(Course {
                    id,
                    url: href.to_string(),
                    role,
                    term: term_name.clone(),
                    short_name,
                    full_name,
                });
            }
        }
        courses
    }

    /// Assignment rows of a course page's first table.
    ///
    /// A page without a table yields no rows (courses can be empty); a row
    /// that breaks the cell contract is malformed and surfaces as an
    /// error rather than a half-filled record.
    pub fn assignment_rows(&self, course: &str, course_url: &str) -> Result<Vec<GradingRow>> {
        let Some(table) = self.html.select(&sel("table")).next() else {
            debug!(course, "course page has no assignment table");
            return Ok(Vec::new());
        };

        let mut rows = Vec::new();
        for row in table.select(&sel("tbody tr")) {
            let title = row
                .select(&sel("th"))
                .next()
                .map(text_of)
                .ok_or_else(|| {
                    AdapterError::MalformedUpstreamData(format!(
                        "assignment row in {course} is missing its header cell"
                    ))
                })?;
            let cells: Vec<ElementRef<'_>> = row.select(&sel("td")).collect();
            let status = cells.first().map(|c| text_of(*c)).ok_or_else(|| {
                AdapterError::MalformedUpstreamData(format!(
                    "assignment row {title:?} has no status cell"
                ))
            })?;

            let mut release_date = None;
            let mut due_dates = Vec::new();
            let mut late_status = None;
            let mut remaining = None;
            if let Some(chart) = cells.get(1) {
                late_status = chart
                    .select(&sel("span.submissionTimeChart--lateStatus"))
                    .next()
                    .map(text_of);
                remaining = chart
                    .select(&sel("span.submissionTimeChart--timeRemaining"))
                    .next()
                    .map(text_of);
                release_date = chart
                    .select(&sel("time.submissionTimeChart--releaseDate"))
                    .next()
                    .and_then(|t| t.value().attr("datetime"))
                    .and_then(|raw| DateTime::parse_from_str(raw, DUE_DATE_FORMAT).ok())
                    .map(|dt| dt.timestamp());
                for time in chart.select(&sel("time.submissionTimeChart--dueDate")) {
                    let raw = time.value().attr("datetime").ok_or_else(|| {
                        AdapterError::MalformedUpstreamData(format!(
                            "due date element of {title:?} has no datetime attribute"
                        ))
                    })?;
                    let due = DateTime::parse_from_str(raw, DUE_DATE_FORMAT)
                        .map_err(|e| {
                            AdapterError::MalformedUpstreamData(format!(
                                "unparseable due date {raw:?} on {title:?}: {e}"
                            ))
                        })?
                        .timestamp();
                    due_dates.push(due);
                }
            }

            rows.push(GradingRow {
                title,
                course: course.to_string(),
                url: course_url.to_string(),
                status,
                release_date,
                due_dates,
                late_status,
                remaining,
            });
        }
        Ok(rows)
    }
}
