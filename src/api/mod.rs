//! HTTP API
//! Mission: REST surface for the education tracking backend

pub mod auth;
pub mod error;
pub mod records;
pub mod reports;
pub mod routes;
pub mod scholarship;
pub mod semesters;
pub mod stats;
pub mod tickets;
pub mod users;

pub use error::ApiError;
pub use routes::{create_router, AppState};
