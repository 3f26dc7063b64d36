//! Product routes: listing with filter/sort/pagination, CRUD and the CSV
//! export. All of them sit behind bearer auth.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Serialize;
use serde_json::Value;

use crate::auth::Claims;
use crate::error::{Error, Result};
use crate::models::{self, Product, ProductCreate, ProductRecord, ProductUpdate};
use crate::query::{ProductQuery, RawListParams};
use crate::responses::{Created, NoContent};
use crate::state::AppState;
use crate::validation::{self, FieldError};

/// List envelope: `{data, page, limit, total, pages}`.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub data: Vec<Product>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<RawListParams>,
) -> Result<Json<ProductListResponse>> {
    let query = ProductQuery::from_params(params)?;
    let page = state.products().list(&query).await?;
    Ok(Json(ProductListResponse {
        pages: page.total.div_ceil(u64::from(query.limit)),
        data: page.items,
        page: query.page,
        limit: query.limit,
        total: page.total,
    }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    state
        .products()
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(Error::not_found)
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<Value>,
) -> Result<Created<Product>> {
    validation::product_create()
        .check(&body)
        .map_err(Error::Rules)?;
    let payload: ProductCreate =
        serde_json::from_value(body).map_err(|err| Error::Validation(err.to_string()))?;

    let product = state.products().create(payload).await?;
    tracing::info!(user = %claims.sub, product = %product.id, "product created");
    let location = format!("/api/v1/products/{}", product.id);
    Ok(Created::new(product).with_location(location))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Product>> {
    if !models::is_entity_id(&id) {
        return Err(Error::Rules(FieldError::new("id", "ID no válido")));
    }
    validation::product_update()
        .check(&body)
        .map_err(Error::Rules)?;
    let payload: ProductUpdate =
        serde_json::from_value(body).map_err(|err| Error::Validation(err.to_string()))?;

    let updated = state
        .products()
        .update(&id, payload)
        .await?
        .ok_or_else(Error::not_found)?;
    tracing::info!(user = %claims.sub, product = %id, "product updated");
    Ok(Json(updated))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<NoContent> {
    if state.products().delete(&id).await? {
        tracing::info!(user = %claims.sub, product = %id, "product deleted");
        Ok(NoContent)
    } else {
        Err(Error::not_found())
    }
}

/// `GET /products/export.csv`: every product as `name,sku,price,stock,active`.
pub async fn export_csv(State(state): State<AppState>) -> Result<Response> {
    let records = state.products().all().await?;
    let csv = render_csv(&records);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"products.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

fn render_csv(records: &[ProductRecord]) -> String {
    let mut lines = vec!["name,sku,price,stock,active".to_string()];
    lines.extend(records.iter().map(|record| {
        format!(
            "{},{},{},{},{}",
            csv_field(&record.name),
            csv_field(record.sku.as_deref().unwrap_or("")),
            record.price,
            record.stock,
            record.active
        )
    }));
    lines.join("\n")
}

/// Quotes a field when it contains the delimiter, quotes or line breaks;
/// embedded quotes are doubled.
fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') || raw.contains('\r') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_pass_through() {
        assert_eq!(csv_field("Tassa"), "Tassa");
        assert_eq!(csv_field(""), "");
    }

    #[test]
    fn delimiters_force_quoting() {
        assert_eq!(csv_field("Taza, grande"), "\"Taza, grande\"");
        assert_eq!(csv_field("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        assert_eq!(csv_field("5\" mug"), "\"5\"\" mug\"");
    }

    #[test]
    fn csv_has_header_and_one_line_per_product() {
        let now = chrono::Utc::now();
        let records = vec![ProductRecord {
            id: surrealdb::RecordId::from_table_key("product", "a".repeat(32)),
            name: "Taza, grande".into(),
            sku: Some("TAZ-1".into()),
            price: 9.5,
            stock: 3,
            active: true,
            category_id: None,
            supplier_id: None,
            created_at: now,
            updated_at: now,
        }];
        let csv = render_csv(&records);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("name,sku,price,stock,active"));
        assert_eq!(lines.next(), Some("\"Taza, grande\",TAZ-1,9.5,3,true"));
        assert_eq!(lines.next(), None);
    }
}
