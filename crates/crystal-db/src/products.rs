//! Database operations for the `products` table.
//!
//! List-valued columns (`sizes`, `images`, `key_features`) are stored as
//! JSON array text. Writes always go through the serializer; reads always
//! go through the normalizer, so historical double-encoded rows are served
//! in canonical form.

use chrono::{DateTime, Utc};
use crystal_core::{
    canonical_images_text, canonical_key_features_text, canonical_sizes_text, column_input,
    normalize_images, normalize_key_features, normalize_sizes, serialize_list, Product,
    ProductFields,
};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `products` table, list columns still encoded.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub finish: String,
    pub description: String,
    pub featured: bool,
    pub images: Option<String>,
    pub sizes: Option<String>,
    pub key_features: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Encoded text for the three list columns of one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListColumns {
    pub sizes: String,
    pub images: String,
    pub key_features: String,
}

impl ListColumns {
    #[must_use]
    pub fn from_fields(fields: &ProductFields) -> Self {
        Self {
            sizes: serialize_list(&fields.sizes),
            images: serialize_list(&fields.images),
            key_features: serialize_list(&fields.key_features),
        }
    }
}

impl ProductRow {
    /// Decodes the row into a [`Product`].
    ///
    /// A column holding text that decodes to nothing is served as an empty
    /// list and logged.
    #[must_use]
    pub fn into_product(self) -> Product {
        let sizes = normalize_sizes(&column_input(self.sizes.as_deref()));
        let images = normalize_images(&column_input(self.images.as_deref()));
        let key_features = normalize_key_features(&column_input(self.key_features.as_deref()));

        warn_if_degraded(self.id, "sizes", self.sizes.as_deref(), sizes.is_empty());
        warn_if_degraded(self.id, "images", self.images.as_deref(), images.is_empty());
        warn_if_degraded(
            self.id,
            "key_features",
            self.key_features.as_deref(),
            key_features.is_empty(),
        );

        Product {
            id: self.id,
            fields: ProductFields {
                name: self.name,
                brand: self.brand,
                finish: self.finish,
                description: self.description,
                featured: self.featured,
                images,
                sizes,
                key_features,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Canonical text for each list column of this row.
    #[must_use]
    pub fn canonical_list_columns(&self) -> ListColumns {
        ListColumns {
            sizes: canonical_sizes_text(self.sizes.as_deref()),
            images: canonical_images_text(self.images.as_deref()),
            key_features: canonical_key_features_text(self.key_features.as_deref()),
        }
    }

    /// Returns `true` when any stored list column differs from its canonical text.
    #[must_use]
    pub fn needs_repair(&self) -> bool {
        let canonical = self.canonical_list_columns();
        self.sizes.as_deref() != Some(canonical.sizes.as_str())
            || self.images.as_deref() != Some(canonical.images.as_str())
            || self.key_features.as_deref() != Some(canonical.key_features.as_str())
    }
}

fn warn_if_degraded(id: i64, column: &str, raw: Option<&str>, decoded_empty: bool) {
    let Some(raw) = raw.map(str::trim) else {
        return;
    };
    if decoded_empty && !raw.is_empty() && raw != "[]" {
        tracing::warn!(
            product_id = id,
            column,
            raw_len = raw.len(),
            "stored list column could not be decoded; serving empty list"
        );
    }
}

const SELECT_COLUMNS: &str = "SELECT id, name, brand, finish, description, featured, \
                              images, sizes, key_features, created_at, updated_at \
                              FROM products";

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Returns all products ordered by `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products(pool: &PgPool) -> Result<Vec<Product>, DbError> {
    Ok(list_product_rows(pool)
        .await?
        .into_iter()
        .map(ProductRow::into_product)
        .collect())
}

/// Returns featured products ordered by `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_featured_products(pool: &PgPool) -> Result<Vec<Product>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "{SELECT_COLUMNS} WHERE featured ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ProductRow::into_product).collect())
}

/// Fetches a single product by `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row matches, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn get_product(pool: &PgPool, id: i64) -> Result<Product, DbError> {
    sqlx::query_as::<_, ProductRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(ProductRow::into_product)
        .ok_or(DbError::NotFound)
}

/// Returns every row with its list columns still encoded.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_product_rows(pool: &PgPool) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!("{SELECT_COLUMNS} ORDER BY id"))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Inserts a product and returns its generated `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_product(pool: &PgPool, fields: &ProductFields) -> Result<i64, DbError> {
    let lists = ListColumns::from_fields(fields);

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO products \
             (name, brand, finish, description, featured, images, sizes, key_features) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING id",
    )
    .bind(&fields.name)
    .bind(&fields.brand)
    .bind(&fields.finish)
    .bind(&fields.description)
    .bind(fields.featured)
    .bind(&lists.images)
    .bind(&lists.sizes)
    .bind(&lists.key_features)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Overwrites every column of an existing product.
///
/// Returns `false` when no row has the given `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_product(
    pool: &PgPool,
    id: i64,
    fields: &ProductFields,
) -> Result<bool, DbError> {
    let lists = ListColumns::from_fields(fields);

    let result = sqlx::query(
        "UPDATE products SET \
             name = $2, brand = $3, finish = $4, description = $5, featured = $6, \
             images = $7, sizes = $8, key_features = $9, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(&fields.name)
    .bind(&fields.brand)
    .bind(&fields.finish)
    .bind(&fields.description)
    .bind(fields.featured)
    .bind(&lists.images)
    .bind(&lists.sizes)
    .bind(&lists.key_features)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Deletes a product. Returns `false` when no row has the given `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_product(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Replaces the encoded list columns of one row without touching `updated_at`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn rewrite_list_columns(
    pool: &PgPool,
    id: i64,
    columns: &ListColumns,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE products SET sizes = $2, images = $3, key_features = $4 WHERE id = $1",
    )
    .bind(id)
    .bind(&columns.sizes)
    .bind(&columns.images)
    .bind(&columns.key_features)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
