use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use crate::api_error::{ApiError, ApiResult};
use crate::app_state::AppState;
use crate::models::{provided_text, required_text, Animal, NewShelter, Shelter, UpdateShelter};

pub async fn list_shelters(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let shelters = sqlx::query_as::<_, Shelter>(
        "SELECT id, name, city, state, address FROM shelters ORDER BY id",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(json!({ "success": true, "shelters": shelters })))
}

pub async fn shelter_animals(
    State(state): State<AppState>,
    Path(shelter_id): Path<i32>,
) -> ApiResult<Json<Value>> {
    let shelter = sqlx::query_as::<_, Shelter>(
        "SELECT id, name, city, state, address FROM shelters WHERE id = $1",
    )
    .bind(shelter_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;

    let animals = sqlx::query_as::<_, Animal>(
        "SELECT id, name, gender, age, species, breed, shelter_id
         FROM animals WHERE shelter_id = $1 ORDER BY id",
    )
    .bind(shelter_id)
    .fetch_all(&state.db)
    .await?;

    if animals.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(json!({
        "success": true,
        "animals": animals,
        "total_animals": animals.len(),
        "shelters": shelter,
        "current_shelter": shelter_id,
    })))
}

pub async fn create_shelter(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    // Authorization runs before the body is even parsed; an unauthenticated
    // request gets the auth verdict no matter what it carries.
    state.gate.authorize(&headers, "post:shelters").await?;

    let payload: NewShelter =
        serde_json::from_slice(&body).map_err(|_| ApiError::Unprocessable)?;
    let name = required_text(payload.name).ok_or(ApiError::Unprocessable)?;
    let city = required_text(payload.city).ok_or(ApiError::Unprocessable)?;
    let shelter_state = required_text(payload.state).ok_or(ApiError::Unprocessable)?;
    let address = required_text(payload.address).ok_or(ApiError::Unprocessable)?;

    let shelter = sqlx::query_as::<_, Shelter>(
        "INSERT INTO shelters (name, city, state, address)
         VALUES ($1, $2, $3, $4)
         RETURNING id, name, city, state, address",
    )
    .bind(&name)
    .bind(&city)
    .bind(&shelter_state)
    .bind(&address)
    .fetch_one(&state.db)
    .await?;

    info!(shelter_id = shelter.id, "shelter created");
    Ok(Json(json!({ "success": true, "shelters": [shelter] })))
}

pub async fn update_shelter(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(shelter_id): Path<i32>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    state.gate.authorize(&headers, "patch:shelters").await?;

    let payload: UpdateShelter =
        serde_json::from_slice(&body).map_err(|_| ApiError::Unprocessable)?;
    let mut shelter = sqlx::query_as::<_, Shelter>(
        "SELECT id, name, city, state, address FROM shelters WHERE id = $1",
    )
    .bind(shelter_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;

    if let Some(name) = provided_text(payload.name) {
        shelter.name = name;
    }
    if let Some(city) = provided_text(payload.city) {
        shelter.city = city;
    }
    if let Some(state_value) = provided_text(payload.state) {
        shelter.state = state_value;
    }
    if let Some(address) = provided_text(payload.address) {
        shelter.address = address;
    }

    let shelter = sqlx::query_as::<_, Shelter>(
        "UPDATE shelters SET name = $1, city = $2, state = $3, address = $4
         WHERE id = $5
         RETURNING id, name, city, state, address",
    )
    .bind(&shelter.name)
    .bind(&shelter.city)
    .bind(&shelter.state)
    .bind(&shelter.address)
    .bind(shelter_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(json!({ "success": true, "shelters": [shelter] })))
}

pub async fn delete_shelter(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(shelter_id): Path<i32>,
) -> ApiResult<Json<Value>> {
    state.gate.authorize(&headers, "delete:shelters").await?;

    let result = sqlx::query("DELETE FROM shelters WHERE id = $1")
        .bind(shelter_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::BadRequest);
    }

    info!(shelter_id, "shelter deleted");
    Ok(Json(json!({
        "success": true,
        "message": "Shelter deleted",
        "deleted": shelter_id,
    })))
}
