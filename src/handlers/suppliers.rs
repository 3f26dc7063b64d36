use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{Supplier, SupplierCreate, SupplierUpdate};
use crate::responses::{Created, NoContent};
use crate::state::AppState;
use crate::validation;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Supplier>>> {
    Ok(Json(state.suppliers().list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Supplier>> {
    state
        .suppliers()
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(Error::not_found)
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Created<Supplier>> {
    validation::supplier_create()
        .check(&body)
        .map_err(Error::Rules)?;
    let payload: SupplierCreate =
        serde_json::from_value(body).map_err(|err| Error::Validation(err.to_string()))?;

    let supplier = state.suppliers().create(payload).await?;
    let location = format!("/api/v1/suppliers/{}", supplier.id);
    Ok(Created::new(supplier).with_location(location))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Supplier>> {
    validation::supplier_update()
        .check(&body)
        .map_err(Error::Rules)?;
    let payload: SupplierUpdate =
        serde_json::from_value(body).map_err(|err| Error::Validation(err.to_string()))?;

    state
        .suppliers()
        .update(&id, payload)
        .await?
        .map(Json)
        .ok_or_else(Error::not_found)
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> Result<NoContent> {
    if state.suppliers().delete(&id).await? {
        Ok(NoContent)
    } else {
        Err(Error::not_found())
    }
}
