//! Aggregation Engine
//! Mission: Derived statistics - GPA roll-ups and per-category summaries

pub mod gpa;
pub mod summary;

pub use summary::{profile_statistics, role_statistics, users_summary, SummaryCategory};
