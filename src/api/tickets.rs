//! Ticket Endpoints
//! Mission: Owner-scoped support ticket CRUD

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::auth::Claims;
use crate::store::tickets::{CreateTicketRequest, Ticket, UpdateTicketRequest};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::{json, Value};
use uuid::Uuid;

pub async fn create_ticket(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    if req.title.trim().is_empty() || req.description.trim().is_empty() {
        return Err(ApiError::Validation("Title and description are required".into()));
    }

    let ticket = state.tickets.create(&claims.user_id()?, &req)?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn list_tickets(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    let tickets = state.tickets.list(&claims.user_id()?)?;
    Ok(Json(tickets))
}

pub async fn get_ticket(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    let id = parse_id(&id)?;

    state
        .tickets
        .get(&id, &claims.user_id()?)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Ticket not found".into()))
}

pub async fn update_ticket(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTicketRequest>,
) -> Result<Json<Ticket>, ApiError> {
    let id = parse_id(&id)?;

    state
        .tickets
        .update(&id, &claims.user_id()?, &req)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Ticket not found".into()))
}

pub async fn delete_ticket(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;

    if !state.tickets.delete(&id, &claims.user_id()?)? {
        return Err(ApiError::NotFound("Ticket not found".into()));
    }

    Ok(Json(json!({ "message": "Ticket deleted" })))
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid id".into()))
}
