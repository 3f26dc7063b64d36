use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{Category, CategoryCreate};
use crate::responses::Created;
use crate::state::AppState;
use crate::validation;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.categories().list().await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Created<Category>> {
    validation::category_create()
        .check(&body)
        .map_err(Error::Rules)?;
    let payload: CategoryCreate =
        serde_json::from_value(body).map_err(|err| Error::Validation(err.to_string()))?;

    let category = state.categories().create(payload).await?;
    let location = format!("/api/v1/categories/{}", category.id);
    Ok(Created::new(category).with_location(location))
}
