//! Product persistence: filtered/sorted/paginated listing, reference
//! population and CRUD with sku uniqueness.

use std::collections::{HashMap, HashSet};

use chrono::Utc;

use crate::db::Db;
use crate::models::{
    self, CategoryRecord, CategoryRef, Product, ProductContent, ProductCreate, ProductRecord,
    ProductUpdate, SupplierRecord, SupplierRef,
};
use crate::query::{ProductFilter, ProductQuery, SortKey};
use crate::validation::SKU_PATTERN;

use super::error::{RepositoryError, RepositoryResult};

const TABLE: &str = "product";

/// Sort fields allowed into an ORDER BY clause. Field names cannot be bound
/// as parameters, so anything else is dropped.
const SORTABLE_FIELDS: &[&str] = &[
    "name",
    "sku",
    "price",
    "stock",
    "active",
    "createdAt",
    "updatedAt",
];

/// One page of populated products plus the filtered total.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: u64,
}

#[derive(Clone)]
pub struct ProductRepository {
    db: Db,
}

#[derive(serde::Deserialize)]
struct CountRow {
    total: u64,
}

impl ProductRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Runs the count and the page in one request so both see the same
    /// filter bindings.
    pub async fn list(&self, query: &ProductQuery) -> RepositoryResult<ProductPage> {
        let where_sql = where_clause(&query.filter);
        let count_sql = format!("SELECT count() AS total FROM {TABLE}{where_sql} GROUP ALL");
        let page_sql = format!(
            "SELECT * FROM {TABLE}{where_sql}{} LIMIT $limit START $start",
            order_clause(&query.sort)
        );

        let mut request = self
            .db
            .query(count_sql)
            .query(page_sql)
            .bind(("limit", i64::from(query.limit)))
            .bind(("start", query.skip() as i64));
        if let Some(search) = &query.filter.search {
            request = request.bind(("q", search.clone()));
        }
        if let Some(active) = query.filter.active {
            request = request.bind(("active", active));
        }
        if let Some(min_price) = query.filter.min_price {
            request = request.bind(("min_price", min_price));
        }
        if let Some(max_price) = query.filter.max_price {
            request = request.bind(("max_price", max_price));
        }
        if let Some(category) = &query.filter.category {
            request = request.bind(("category", category.clone()));
        }

        let mut response = request.await?;
        let counts: Vec<CountRow> = response.take(0)?;
        let records: Vec<ProductRecord> = response.take(1)?;

        Ok(ProductPage {
            total: counts.first().map(|row| row.total).unwrap_or(0),
            items: self.populate(records).await?,
        })
    }

    pub async fn get(&self, id: &str) -> RepositoryResult<Option<Product>> {
        let record: Option<ProductRecord> = self.db.select((TABLE, id)).await?;
        match record {
            Some(record) => Ok(self.populate(vec![record]).await?.pop()),
            None => Ok(None),
        }
    }

    pub async fn create(&self, payload: ProductCreate) -> RepositoryResult<Product> {
        let now = Utc::now();
        let content = ProductContent {
            name: payload.name.trim().to_string(),
            sku: payload.sku.map(|sku| sku.trim().to_string()),
            price: payload.price,
            stock: payload.stock,
            active: payload.active,
            category_id: payload.category_id,
            supplier_id: payload.supplier_id,
            created_at: now,
            updated_at: now,
        };
        validate_content(&content)?;

        let id = models::new_entity_id();
        let created: Option<ProductRecord> = match content.sku.clone() {
            Some(sku) => {
                // sku check and insert share one transaction
                self.db
                    .query(format!(
                        "BEGIN TRANSACTION;
                         LET $clash = (SELECT VALUE id FROM {TABLE} WHERE sku = $sku);
                         IF array::len($clash) > 0 {{ THROW 'SKU duplicat' }};
                         CREATE type::thing('{TABLE}', $key) CONTENT $content;
                         COMMIT TRANSACTION;"
                    ))
                    .bind(("sku", sku))
                    .bind(("key", id.clone()))
                    .bind(("content", content))
                    .await
                    .map_err(map_sku_error)?
                    .check()
                    .map_err(map_sku_error)?;
                self.db.select((TABLE, id.as_str())).await?
            }
            None => self.db.create((TABLE, id.as_str())).content(content).await?,
        };

        let record =
            created.ok_or_else(|| RepositoryError::database("create returned no record"))?;
        self.populate(vec![record])
            .await?
            .pop()
            .ok_or_else(|| RepositoryError::database("created record vanished"))
    }

    /// Merge-style update: provided fields replace stored ones, then the
    /// merged document is re-validated before the write. `Ok(None)` when the
    /// product does not exist.
    pub async fn update(
        &self,
        id: &str,
        patch: ProductUpdate,
    ) -> RepositoryResult<Option<Product>> {
        let existing: Option<ProductRecord> = self.db.select((TABLE, id)).await?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut content = existing.to_content();
        if let Some(name) = patch.name {
            content.name = name.trim().to_string();
        }
        if let Some(sku) = patch.sku {
            content.sku = Some(sku.trim().to_string());
        }
        if let Some(price) = patch.price {
            content.price = price;
        }
        if let Some(stock) = patch.stock {
            content.stock = stock;
        }
        if let Some(active) = patch.active {
            content.active = active;
        }
        if let Some(category_id) = patch.category_id {
            content.category_id = Some(category_id);
        }
        if let Some(supplier_id) = patch.supplier_id {
            content.supplier_id = Some(supplier_id);
        }
        content.updated_at = Utc::now();

        validate_content(&content)?;

        let updated: Option<ProductRecord> = match content.sku.clone() {
            Some(sku) => {
                // the clash lookup excludes the record being written
                self.db
                    .query(format!(
                        "BEGIN TRANSACTION;
                         LET $own = type::thing('{TABLE}', $key);
                         LET $clash = (SELECT VALUE id FROM {TABLE} WHERE sku = $sku AND id != $own);
                         IF array::len($clash) > 0 {{ THROW 'SKU duplicat' }};
                         UPDATE $own CONTENT $content;
                         COMMIT TRANSACTION;"
                    ))
                    .bind(("sku", sku))
                    .bind(("key", id.to_string()))
                    .bind(("content", content))
                    .await
                    .map_err(map_sku_error)?
                    .check()
                    .map_err(map_sku_error)?;
                self.db.select((TABLE, id)).await?
            }
            None => self.db.update((TABLE, id)).content(content).await?,
        };
        match updated {
            Some(record) => Ok(self.populate(vec![record]).await?.pop()),
            None => Ok(None),
        }
    }

    /// `Ok(false)` when there was nothing to delete.
    pub async fn delete(&self, id: &str) -> RepositoryResult<bool> {
        let deleted: Option<ProductRecord> = self.db.delete((TABLE, id)).await?;
        Ok(deleted.is_some())
    }

    /// Every product, unpopulated, for the CSV export.
    pub async fn all(&self) -> RepositoryResult<Vec<ProductRecord>> {
        Ok(self.db.select(TABLE).await?)
    }

    /// Expands `categoryId`/`supplierId` into embedded summaries. One lookup
    /// per distinct referenced id; a dangling reference becomes `None`, same
    /// as a reference that was never set.
    async fn populate(&self, records: Vec<ProductRecord>) -> RepositoryResult<Vec<Product>> {
        let category_ids: HashSet<String> = records
            .iter()
            .filter_map(|record| record.category_id.clone())
            .collect();
        let supplier_ids: HashSet<String> = records
            .iter()
            .filter_map(|record| record.supplier_id.clone())
            .collect();

        let mut categories: HashMap<String, CategoryRecord> = HashMap::new();
        for id in category_ids {
            let found: Option<CategoryRecord> = self.db.select(("category", id.as_str())).await?;
            if let Some(found) = found {
                categories.insert(id, found);
            }
        }
        let mut suppliers: HashMap<String, SupplierRecord> = HashMap::new();
        for id in supplier_ids {
            let found: Option<SupplierRecord> = self.db.select(("supplier", id.as_str())).await?;
            if let Some(found) = found {
                suppliers.insert(id, found);
            }
        }

        Ok(records
            .into_iter()
            .map(|record| {
                let category_ref = record.category_id.as_ref().and_then(|id| {
                    categories.get(id).map(|category| CategoryRef {
                        id: id.clone(),
                        name: category.name.clone(),
                    })
                });
                let supplier_ref = record.supplier_id.as_ref().and_then(|id| {
                    suppliers.get(id).map(|supplier| SupplierRef {
                        id: id.clone(),
                        name: supplier.name.clone(),
                        email: supplier.email.clone(),
                        phone: supplier.phone.clone(),
                    })
                });
                Product {
                    id: models::record_key(&record.id),
                    name: record.name,
                    sku: record.sku,
                    price: record.price,
                    stock: record.stock,
                    active: record.active,
                    category_id: category_ref,
                    supplier_id: supplier_ref,
                    created_at: record.created_at,
                    updated_at: record.updated_at,
                }
            })
            .collect())
    }
}

/// A THROW raised by the sku guard surfaces as a query error carrying our
/// own message; anything else is a backend failure.
fn map_sku_error(err: surrealdb::Error) -> RepositoryError {
    if err.to_string().contains("SKU duplicat") {
        RepositoryError::duplicate("SKU duplicat")
    } else {
        RepositoryError::from(err)
    }
}

/// Stored-schema constraints, re-checked on every write.
fn validate_content(content: &ProductContent) -> RepositoryResult<()> {
    if content.name.trim().chars().count() < 2 {
        return Err(RepositoryError::validation(
            "product validation failed: name must have at least 2 characters",
        ));
    }
    if !content.price.is_finite() || content.price < 0.0 {
        return Err(RepositoryError::validation(
            "product validation failed: price must be greater than or equal to 0",
        ));
    }
    if content.stock < 0 {
        return Err(RepositoryError::validation(
            "product validation failed: stock must be greater than or equal to 0",
        ));
    }
    if let Some(sku) = &content.sku {
        if !SKU_PATTERN.is_match(sku) {
            return Err(RepositoryError::validation(
                "product validation failed: sku must be uppercase alphanumerics and dashes",
            ));
        }
    }
    Ok(())
}

/// Builds the WHERE clause for the active constraints. Values travel as
/// bound parameters; the clause only names columns.
fn where_clause(filter: &ProductFilter) -> String {
    let mut conditions: Vec<&str> = Vec::new();
    if filter.search.is_some() {
        conditions.push(
            "(string::lowercase(name) CONTAINS string::lowercase($q) \
             OR string::lowercase(sku ?? '') CONTAINS string::lowercase($q))",
        );
    }
    if filter.active.is_some() {
        conditions.push("active = $active");
    }
    if filter.min_price.is_some() {
        conditions.push("price >= $min_price");
    }
    if filter.max_price.is_some() {
        conditions.push("price <= $max_price");
    }
    if filter.category.is_some() {
        conditions.push("categoryId = $category");
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

/// Builds the ORDER BY clause from whitelisted sort keys, newest first when
/// nothing usable remains.
fn order_clause(sort: &[SortKey]) -> String {
    let keys: Vec<String> = sort
        .iter()
        .filter(|key| SORTABLE_FIELDS.contains(&key.field.as_str()))
        .map(|key| format!("{} {}", key.field, key.order.as_surql()))
        .collect();

    if keys.is_empty() {
        " ORDER BY createdAt DESC".to_string()
    } else {
        format!(" ORDER BY {}", keys.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortKey;

    #[test]
    fn empty_filter_builds_no_where() {
        assert_eq!(where_clause(&ProductFilter::default()), "");
    }

    #[test]
    fn conditions_join_with_and() {
        let filter = ProductFilter {
            search: Some("tassa".into()),
            active: Some(true),
            min_price: Some(1.0),
            max_price: Some(10.0),
            category: Some("c".repeat(32)),
        };
        let clause = where_clause(&filter);
        assert!(clause.starts_with(" WHERE "));
        assert_eq!(clause.matches(" AND ").count(), 4);
        assert!(clause.contains("string::lowercase(name) CONTAINS"));
        assert!(clause.contains("active = $active"));
        assert!(clause.contains("price >= $min_price"));
        assert!(clause.contains("price <= $max_price"));
        assert!(clause.contains("categoryId = $category"));
    }

    #[test]
    fn order_clause_keeps_whitelisted_fields() {
        let clause = order_clause(&[SortKey::desc("price"), SortKey::asc("name")]);
        assert_eq!(clause, " ORDER BY price DESC, name ASC");
    }

    #[test]
    fn order_clause_drops_unknown_fields() {
        let clause = order_clause(&[SortKey::asc("password; DROP TABLE"), SortKey::asc("price")]);
        assert_eq!(clause, " ORDER BY price ASC");
    }

    #[test]
    fn order_clause_falls_back_to_newest_first() {
        assert_eq!(order_clause(&[]), " ORDER BY createdAt DESC");
        assert_eq!(
            order_clause(&[SortKey::asc("nonsense")]),
            " ORDER BY createdAt DESC"
        );
    }

    #[test]
    fn thrown_sku_guard_maps_to_duplicate() {
        use super::super::error::RepositoryErrorKind;

        let thrown = surrealdb::Error::Api(surrealdb::error::Api::Query(
            "An error occurred: SKU duplicat".to_string(),
        ));
        let mapped = map_sku_error(thrown);
        assert_eq!(mapped.kind, RepositoryErrorKind::Duplicate);
        assert_eq!(mapped.message, "SKU duplicat");

        let other = surrealdb::Error::Api(surrealdb::error::Api::Query(
            "some backend failure".to_string(),
        ));
        assert_eq!(map_sku_error(other).kind, RepositoryErrorKind::Database);
    }

    #[test]
    fn content_validation_matches_stored_schema() {
        let base = ProductContent {
            name: "Tassa".into(),
            sku: Some("TAS-001".into()),
            price: 5.0,
            stock: 3,
            active: true,
            category_id: None,
            supplier_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(validate_content(&base).is_ok());

        let mut short_name = base.clone();
        short_name.name = "x".into();
        assert!(validate_content(&short_name).is_err());

        let mut negative_price = base.clone();
        negative_price.price = -0.01;
        assert!(validate_content(&negative_price).is_err());

        let mut negative_stock = base.clone();
        negative_stock.stock = -1;
        assert!(validate_content(&negative_stock).is_err());

        let mut bad_sku = base;
        bad_sku.sku = Some("tas 001".into());
        assert!(validate_content(&bad_sku).is_err());
    }
}
