//! Mawaheb Backend Library
//!
//! Student records & education tracking API: accounts, owner-scoped
//! record CRUD, GPA aggregation, and admin reporting.

pub mod aggregation;
pub mod api;
pub mod auth;
pub mod config;
pub mod mailer;
pub mod middleware;
pub mod store;
