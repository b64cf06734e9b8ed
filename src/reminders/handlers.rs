use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{dto::ReminderBody, repo_types::Reminder};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppJson},
    response::Data,
    state::AppState,
};

pub fn reminder_routes() -> Router<AppState> {
    Router::new()
        .route("/reminders", get(list_reminders).post(create_reminder))
        .route(
            "/reminders/:id",
            get(get_reminder)
                .patch(update_reminder)
                .delete(delete_reminder),
        )
}

fn not_found() -> AppError {
    AppError::NotFound("Reminder not found".into())
}

/// A malformed id cannot name any reminder, so it is a 404 like any other miss.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| not_found())
}

#[instrument(skip(state))]
pub async fn list_reminders(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Data<Vec<Reminder>>>, AppError> {
    let rows = state.reminders.list_for_owner(user_id).await?;
    Ok(Json(Data::new(rows)))
}

#[instrument(skip(state))]
pub async fn get_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Data<Reminder>>, AppError> {
    let id = parse_id(&id)?;
    let reminder = state
        .reminders
        .get_for_owner(user_id, id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(Data::new(reminder)))
}

#[instrument(skip(state, body))]
pub async fn create_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(body): AppJson<ReminderBody>,
) -> Result<(StatusCode, Json<Data<Reminder>>), AppError> {
    let fields = body.validate()?;
    let reminder = state.reminders.insert(user_id, fields).await?;
    info!(%user_id, reminder_id = %reminder.id, "reminder created");
    Ok((StatusCode::CREATED, Json(Data::new(reminder))))
}

#[instrument(skip(state, body))]
pub async fn update_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    AppJson(body): AppJson<ReminderBody>,
) -> Result<Json<Data<Reminder>>, AppError> {
    let id = parse_id(&id)?;
    let fields = body.validate()?;
    let reminder = state
        .reminders
        .update_for_owner(user_id, id, fields)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(Data::new(reminder)))
}

#[instrument(skip(state))]
pub async fn delete_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    if !state.reminders.delete_for_owner(user_id, id).await? {
        return Err(not_found());
    }
    info!(%user_id, reminder_id = %id, "reminder deleted");
    Ok(StatusCode::NO_CONTENT)
}
