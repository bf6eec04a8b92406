//! duesync core library
//!
//! Platform adapters that pull assignment due dates out of three external
//! services — a grading site (HTML scraping), an LMS behind an encrypted
//! single-sign-on flow, and an online judge — and normalize them into one
//! canonical assignment shape.
//!
//! Credentials live for one request; each adapter opens its own
//! cookie-scoped session, fetches raw platform records, and the
//! normalizer maps them into [`Assignment`]s.

pub mod adapters;
pub mod cipher;
pub mod domain;
pub mod markup;
pub mod normalize;
pub mod source;
pub mod telemetry;
pub mod transport;

pub use adapters::grading::{GradingConfig, GradingSession, GradingSite};
pub use adapters::judge::{JudgeConfig, JudgeSession, OnlineJudge};
pub use adapters::lms::{Lms, LmsConfig, LmsSession};
pub use cipher::encrypt_password;
pub use domain::{
    AdapterError, Assignment, Course, Credentials, GradingRow, JudgeItem, LmsEvent, Platform,
    RawBatch, Result, Role,
};
pub use markup::Document;
pub use normalize::normalize;
pub use source::AssignmentSource;
pub use transport::{SessionTransport, TransportConfig};
