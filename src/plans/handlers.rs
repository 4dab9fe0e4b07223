use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    session::{SLOT_DISPLAY, SLOT_DOWNLOAD, SLOT_SAVE},
    state::AppState,
};

use super::dto::{GenerateRequest, SavePlanRequest, SavedPlanItem, StatusResponse};
use super::format;
use super::model::{self, DayPlan};
use super::repo::SavedPlan;
use super::services;

pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/plans/generate", post(generate_plan))
        .route("/plans", get(show_plan))
        .route("/plans/download/:name", get(download_plan))
        .route("/plans/ingredients/:name", get(download_ingredient_list))
}

pub fn saved_routes() -> Router<AppState> {
    Router::new()
        .route("/plans/saved", post(save_plan).get(list_saved_plans))
        .route("/plans/saved/:name/download", get(download_saved_plan))
        .route("/plans/saved/:id", delete(delete_saved_plan))
}

#[instrument(skip(state, payload))]
async fn generate_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let request = payload.validate()?;
    services::generate_plan(
        state.generation.as_ref(),
        &state.sessions,
        &state.config.generation.model,
        user_id,
        &request,
    )
    .await?;
    Ok(Json(StatusResponse { success: true }))
}

#[instrument(skip(state))]
async fn show_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<DayPlan>>, ApiError> {
    let staged = state
        .sessions
        .get(user_id, SLOT_DISPLAY)
        .await
        .unwrap_or_default();
    let plans = model::parse_collection(&staged)?;
    Ok(Json(plans))
}

#[instrument(skip(state))]
async fn download_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(name): Path<String>,
) -> Result<(HeaderMap, String), ApiError> {
    let staged = staged_plan(&state, user_id, SLOT_DOWNLOAD).await?;
    let plans = model::parse_collection(&staged)?;
    text_attachment(&format!("{name}.txt"), format::transcript(&plans))
}

#[instrument(skip(state))]
async fn download_ingredient_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(name): Path<String>,
) -> Result<(HeaderMap, String), ApiError> {
    let staged = staged_plan(&state, user_id, SLOT_DOWNLOAD).await?;
    let plans = model::parse_collection(&staged)?;
    text_attachment(
        &format!("{name}_ingredients.txt"),
        format::shopping_list(&plans),
    )
}

#[instrument(skip(state, payload))]
async fn save_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SavePlanRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Validation(
            "please provide a name for the meal plan".into(),
        ));
    }
    if SavedPlan::exists(&state.db, user_id, &name).await? {
        return Err(ApiError::DuplicateName);
    }

    let staged = state
        .sessions
        .get(user_id, SLOT_SAVE)
        .await
        .filter(|plan| !plan.is_empty())
        .ok_or_else(|| ApiError::NotFound("no meal plan available for saving".into()))?;

    let plans = model::parse_collection(&staged)?;
    let document = serde_json::to_string(&plans)?;
    SavedPlan::insert(&state.db, user_id, &name, &document).await?;

    info!(%user_id, name = %name, days = plans.len(), "meal plan saved");
    Ok(Json(StatusResponse { success: true }))
}

#[instrument(skip(state))]
async fn list_saved_plans(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<SavedPlanItem>>, ApiError> {
    let names = SavedPlan::list_names(&state.db, user_id).await?;
    let items = names
        .into_iter()
        .map(|name| SavedPlanItem {
            id: name.clone(),
            name,
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
async fn download_saved_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(name): Path<String>,
) -> Result<(HeaderMap, String), ApiError> {
    let document = SavedPlan::fetch_plan(&state.db, user_id, &name)
        .await?
        .ok_or_else(|| ApiError::NotFound("no meal plan found with that name".into()))?;
    let plans: Vec<DayPlan> = serde_json::from_str(&document)?;
    text_attachment(&format!("{name}.txt"), format::transcript(&plans))
}

#[instrument(skip(state))]
async fn delete_saved_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    SavedPlan::delete(&state.db, user_id, &id).await?;
    info!(%user_id, name = %id, "meal plan deleted");
    Ok(Json(StatusResponse { success: true }))
}

async fn staged_plan(
    state: &AppState,
    user_id: Uuid,
    slot: &str,
) -> Result<Vec<String>, ApiError> {
    state
        .sessions
        .get(user_id, slot)
        .await
        .filter(|plan| !plan.is_empty())
        .ok_or_else(|| ApiError::NotFound("no meal plan available for download".into()))
}

fn text_attachment(filename: &str, body: String) -> Result<(HeaderMap, String), ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename={filename}"))
            .map_err(|_| ApiError::Validation("Invalid plan name".into()))?,
    );
    Ok((headers, body))
}
