//! Grading-site courses and the role that scopes them.

use serde::{Deserialize, Serialize};

/// Role under which courses appear on the grading-site dashboard.
///
/// Each role maps to the exact heading text the dashboard renders above
/// that role's course list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Instructor,
}

impl Role {
    /// Heading label the dashboard uses for this role's section.
    pub fn heading_label(&self) -> &'static str {
        match self {
            Role::Student => "Student Courses",
            Role::Instructor => "Instructor Courses",
        }
    }
}

/// A course tile scraped from the grading-site dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    /// Platform-native numeric id, parsed from the tile's href.
    pub id: u64,

    /// Site-relative course URL (e.g. `/courses/1234`).
    pub url: String,

    /// Role the course was listed under.
    pub role: Role,

    /// Academic term group the tile appeared in (e.g. `"Fall 2025"`).
    pub term: String,

    /// Short course code (e.g. `"CS 101"`).
    pub short_name: String,

    /// Full course title.
    pub full_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_heading_labels() {
        assert_eq!(Role::Student.heading_label(), "Student Courses");
        assert_eq!(Role::Instructor.heading_label(), "Instructor Courses");
    }
}
