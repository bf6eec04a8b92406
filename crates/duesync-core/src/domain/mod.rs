//! Domain models for duesync.
//!
//! Canonical definitions for the entities flowing through an aggregation
//! request:
//! - `Credentials`: one platform login, discarded after the request
//! - `Course`: a grading-site course tile
//! - raw records (`GradingRow`, `LmsEvent`, `JudgeItem`): platform-native
//!   pre-normalization shapes, grouped into a tagged [`RawBatch`]
//! - `Assignment`: the normalized output unit

pub mod assignment;
pub mod course;
pub mod credentials;
pub mod error;

// Re-export main types and errors
pub use assignment::{Assignment, GradingRow, JudgeItem, LmsEvent, Platform, RawBatch};
pub use course::{Course, Role};
pub use credentials::Credentials;
pub use error::{AdapterError, Result};
