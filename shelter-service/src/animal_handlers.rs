use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use crate::api_error::{ApiError, ApiResult};
use crate::app_state::AppState;
use crate::models::{provided_text, required_text, Animal, NewAnimal, UpdateAnimal};

pub async fn list_animals(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let animals = sqlx::query_as::<_, Animal>(
        "SELECT id, name, gender, age, species, breed, shelter_id FROM animals ORDER BY id",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(json!({ "success": true, "animals": animals })))
}

pub async fn create_animal(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    // Authorization first, body parsing second.
    state.gate.authorize(&headers, "post:animals").await?;

    let payload: NewAnimal =
        serde_json::from_slice(&body).map_err(|_| ApiError::Unprocessable)?;
    let name = required_text(payload.name).ok_or(ApiError::Unprocessable)?;
    let species = required_text(payload.species).ok_or(ApiError::Unprocessable)?;
    let breed = required_text(payload.breed).ok_or(ApiError::Unprocessable)?;

    let animal = sqlx::query_as::<_, Animal>(
        "INSERT INTO animals (name, gender, age, species, breed, shelter_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id, name, gender, age, species, breed, shelter_id",
    )
    .bind(&name)
    .bind(provided_text(payload.gender))
    .bind(payload.age)
    .bind(&species)
    .bind(&breed)
    .bind(payload.shelter_id)
    .fetch_one(&state.db)
    .await?;

    info!(animal_id = animal.id, "animal created");
    Ok(Json(json!({ "success": true, "animals": [animal] })))
}

pub async fn update_animal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(animal_id): Path<i32>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    state.gate.authorize(&headers, "patch:animals").await?;

    let payload: UpdateAnimal =
        serde_json::from_slice(&body).map_err(|_| ApiError::Unprocessable)?;
    let mut animal = sqlx::query_as::<_, Animal>(
        "SELECT id, name, gender, age, species, breed, shelter_id FROM animals WHERE id = $1",
    )
    .bind(animal_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound)?;

    if let Some(name) = provided_text(payload.name) {
        animal.name = name;
    }
    if let Some(gender) = provided_text(payload.gender) {
        animal.gender = Some(gender);
    }
    if let Some(age) = payload.age {
        animal.age = Some(age);
    }
    if let Some(species) = provided_text(payload.species) {
        animal.species = species;
    }
    if let Some(breed) = provided_text(payload.breed) {
        animal.breed = breed;
    }
    if let Some(shelter_id) = payload.shelter_id {
        animal.shelter_id = Some(shelter_id);
    }

    let animal = sqlx::query_as::<_, Animal>(
        "UPDATE animals
         SET name = $1, gender = $2, age = $3, species = $4, breed = $5, shelter_id = $6
         WHERE id = $7
         RETURNING id, name, gender, age, species, breed, shelter_id",
    )
    .bind(&animal.name)
    .bind(&animal.gender)
    .bind(animal.age)
    .bind(&animal.species)
    .bind(&animal.breed)
    .bind(animal.shelter_id)
    .bind(animal_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(json!({ "success": true, "animals": [animal] })))
}

pub async fn delete_animal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(animal_id): Path<i32>,
) -> ApiResult<Json<Value>> {
    state.gate.authorize(&headers, "delete:animals").await?;

    let result = sqlx::query("DELETE FROM animals WHERE id = $1")
        .bind(animal_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::BadRequest);
    }

    info!(animal_id, "animal deleted");
    Ok(Json(json!({
        "success": true,
        "message": "Animal deleted",
        "deleted": animal_id,
    })))
}
