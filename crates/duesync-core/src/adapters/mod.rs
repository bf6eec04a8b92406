//! Platform adapters.
//!
//! One module per external platform, each composing the session transport
//! (plus the credential cipher or the markup extractor where the
//! platform's protocol needs it) into `authenticate` / `fetch_*`
//! operations that yield raw records for the normalizer.

pub mod grading;
pub mod judge;
pub mod lms;
