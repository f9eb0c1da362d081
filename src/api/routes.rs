//! Router Assembly
//! Mission: Wire every endpoint to its handler behind the auth middleware

use crate::api::{auth, records, reports, scholarship, semesters, stats, tickets, users};
use crate::auth::user_store::UserStore;
use crate::auth::{auth_middleware, JwtHandler};
use crate::mailer::Mailer;
use crate::middleware::request_logging;
use crate::store::records::{RecordKind, RecordStore};
use crate::store::reports::ReportStore;
use crate::store::scholarship::ScholarshipStore;
use crate::store::semesters::{SemesterStore, UniversityStore};
use crate::store::tickets::TicketStore;
use axum::routing::{get, post, put};
use axum::{middleware, Extension, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserStore>,
    pub records: Arc<RecordStore>,
    pub semesters: Arc<SemesterStore>,
    pub universities: Arc<UniversityStore>,
    pub scholarships: Arc<ScholarshipStore>,
    pub tickets: Arc<TicketStore>,
    pub reports: Arc<ReportStore>,
    pub jwt: Arc<JwtHandler>,
    pub mailer: Arc<dyn Mailer>,
    pub reset_link_base: String,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health_check))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password/:token", post(auth::reset_password));

    let user_routes = Router::new()
        .route("/user/profile", get(users::get_profile))
        .route("/user/update-profile", put(users::update_profile))
        .route("/user/role", get(users::get_role))
        .route("/user/users", get(users::list_users))
        .route(
            "/user/users/:id",
            get(users::get_user_by_id).delete(users::delete_user),
        )
        .route("/user/summary", get(users::get_summary))
        .route("/admin/users", get(users::list_users_page))
        .route("/stats/general", get(stats::general_stats))
        .route("/stats/admin", get(stats::admin_stats));

    let record_routes = RecordKind::ALL
        .iter()
        .fold(Router::new(), |router, &kind| {
            router.merge(record_router(kind))
        });

    let semester_routes = Router::new()
        .route(
            "/semester",
            post(semesters::create_semester).get(semesters::list_semesters),
        )
        .route(
            "/semester/:id",
            get(semesters::get_semester)
                .put(semesters::update_semester)
                .delete(semesters::delete_semester),
        )
        .route(
            "/university",
            post(semesters::create_university).get(semesters::list_universities),
        )
        .route(
            "/university/:id/semesters/:semester_id",
            post(semesters::attach_semester),
        );

    let scholarship_routes = Router::new()
        .route(
            "/scholarship-student",
            post(scholarship::create_profile).get(scholarship::list_profiles),
        )
        .route(
            "/scholarship-student/:id",
            get(scholarship::get_profile)
                .put(scholarship::update_profile)
                .delete(scholarship::delete_profile),
        );

    let ticket_routes = Router::new()
        .route(
            "/ticket",
            post(tickets::create_ticket).get(tickets::list_tickets),
        )
        .route(
            "/ticket/:id",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        );

    let report_routes = Router::new()
        .route(
            "/report",
            post(reports::create_report).get(reports::list_reports),
        )
        .route("/report/options", get(reports::report_options))
        .route("/report/all", get(reports::list_all_reports))
        .route(
            "/report/:id",
            get(reports::get_report)
                .put(reports::update_report)
                .delete(reports::delete_report),
        );

    let protected = user_routes
        .merge(record_routes)
        .merge(semester_routes)
        .merge(scholarship_routes)
        .merge(ticket_routes)
        .merge(report_routes)
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// CRUD sub-router for one record kind. The kind rides along as an
/// `Extension` so the handlers stay generic.
fn record_router(kind: RecordKind) -> Router<AppState> {
    let prefix = route_prefix(kind);
    Router::new()
        .route(
            prefix,
            post(records::create_record).get(records::list_records),
        )
        .route(
            &format!("{prefix}/:id"),
            get(records::get_record)
                .put(records::update_record)
                .delete(records::delete_record),
        )
        .layer(Extension(kind))
}

fn route_prefix(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Course => "/course",
        RecordKind::Note => "/note",
        RecordKind::Difficulty => "/difficulty",
        RecordKind::Achievement => "/achievement",
        RecordKind::Event => "/event",
        RecordKind::Certificate => "/certificate",
        RecordKind::FinancialReport => "/financial-report",
    }
}

/// Health check endpoint
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
