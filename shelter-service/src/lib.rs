use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

pub mod animal_handlers;
pub mod api_error;
pub mod app_state;
pub mod models;
pub mod shelter_handlers;

pub use api_error::{ApiError, ApiResult};
pub use app_state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "health": "Running!" }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route(
            "/shelters",
            get(shelter_handlers::list_shelters).post(shelter_handlers::create_shelter),
        )
        .route(
            "/shelters/:shelter_id",
            axum::routing::patch(shelter_handlers::update_shelter)
                .delete(shelter_handlers::delete_shelter),
        )
        .route(
            "/shelters/:shelter_id/animals",
            get(shelter_handlers::shelter_animals),
        )
        .route(
            "/animals",
            get(animal_handlers::list_animals).post(animal_handlers::create_animal),
        )
        .route(
            "/animals/:animal_id",
            axum::routing::patch(animal_handlers::update_animal)
                .delete(animal_handlers::delete_animal),
        )
        .with_state(state)
}
