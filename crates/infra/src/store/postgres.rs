//! Postgres-backed account and listing stores.
//!
//! Records are stored as JSONB documents next to the columns that carry
//! constraints or indexes (`users.email`, `properties.landlord`). The users
//! table keeps the password hash in its own column because the document form
//! of a [`User`] never contains it.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation on `users.email`) | `23505` | `DuplicateEmail` |
//! | Any other | Any | `Backend` |
//!
//! ## Atomicity
//!
//! `update` runs `SELECT ... FOR UPDATE`, the mutation and the write inside
//! one transaction. `record_view` is a single `UPDATE ... RETURNING`.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use roomshare_auth::User;
use roomshare_auth::user::normalize_email;
use roomshare_core::{PropertyId, UserId};
use roomshare_listings::{
    LandlordStats, ListingFilter, ListingPage, ListingQuery, ListingStats, Pagination, Property, SortField,
    SortOrder, StatusFilter, Visibility,
};

use super::{Mutation, PropertyStore, UserStore};
use crate::StoreError;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        doc JSONB NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS properties (
        id UUID PRIMARY KEY,
        landlord UUID NOT NULL,
        doc JSONB NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS properties_landlord_idx ON properties (landlord)",
    "CREATE INDEX IF NOT EXISTS properties_active_idx ON properties (((doc->>'isActive')::boolean))",
];

/// Create tables and indexes if they are missing.
#[instrument(skip(pool), err)]
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    }
    Ok(())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            StoreError::Backend(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {}", operation)),
        other => StoreError::Backend(format!("{} failed: {}", operation, other)),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

fn decode_error(operation: &str, err: sqlx::Error) -> StoreError {
    StoreError::Backend(format!("failed to decode row in {}: {}", operation, err))
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: Arc<PgPool>,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

fn user_from_row(operation: &str, row: &sqlx::postgres::PgRow) -> Result<User, StoreError> {
    let Json(mut user): Json<User> = row.try_get("doc").map_err(|e| decode_error(operation, e))?;
    user.password_hash = row.try_get("password_hash").map_err(|e| decode_error(operation, e))?;
    Ok(user)
}

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        sqlx::query("INSERT INTO users (id, email, password_hash, doc) VALUES ($1, $2, $3, $4)")
            .bind(user.id.as_uuid())
            .bind(normalize_email(&user.email))
            .bind(&user.password_hash)
            .bind(Json(&user))
            .execute(&*self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateEmail
                } else {
                    map_sqlx_error("insert_user", e)
                }
            })?;
        Ok(user)
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT password_hash, doc FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;
        row.map(|r| user_from_row("get_user", &r)).transpose()
    }

    #[instrument(skip(self, email), err)]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT password_hash, doc FROM users WHERE email = $1")
            .bind(normalize_email(email))
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;
        row.map(|r| user_from_row("find_user_by_email", &r)).transpose()
    }

    #[instrument(skip(self, mutation), err)]
    async fn update(&self, id: UserId, mutation: Mutation<User>) -> Result<User, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = sqlx::query("SELECT password_hash, doc FROM users WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lock_user", e))?
            .ok_or(StoreError::NotFound)?;
        let mut user = user_from_row("lock_user", &row)?;

        // Dropping `tx` on error rolls back and releases the row lock.
        mutation(&mut user)?;

        sqlx::query("UPDATE users SET email = $2, password_hash = $3, doc = $4 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(normalize_email(&user.email))
            .bind(&user.password_hash)
            .bind(Json(&user))
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateEmail
                } else {
                    map_sqlx_error("update_user", e)
                }
            })?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(user)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Listings
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PostgresPropertyStore {
    pool: Arc<PgPool>,
}

impl PostgresPropertyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    async fn load_docs(&self, operation: &str, landlord: Option<UserId>, active_only: bool) -> Result<Vec<Property>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT doc FROM properties
            WHERE ($1::uuid IS NULL OR landlord = $1)
                AND (NOT $2 OR (doc->>'isActive')::boolean)
            "#,
        )
        .bind(landlord.map(|l| *l.as_uuid()))
        .bind(active_only)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(operation, e))?;

        rows.iter().map(|r| property_from_row(operation, r)).collect()
    }
}

fn property_from_row(operation: &str, row: &sqlx::postgres::PgRow) -> Result<Property, StoreError> {
    let Json(property): Json<Property> = row.try_get("doc").map_err(|e| decode_error(operation, e))?;
    Ok(property)
}

/// Escape `LIKE` wildcards and wrap for substring matching.
fn like_pattern(term: &str) -> String {
    let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

fn sort_expression(field: SortField) -> &'static str {
    match field {
        SortField::CreatedAt => "(doc->>'createdAt')::timestamptz",
        SortField::UpdatedAt => "(doc->>'updatedAt')::timestamptz",
        SortField::Rent => "(doc->>'rent')::float8",
        SortField::Deposit => "(doc->>'deposit')::float8",
        SortField::Views => "(doc->>'views')::bigint",
        SortField::AvailableFrom => "(doc->>'availableFrom')::timestamptz",
        SortField::TotalRooms => "(doc->>'totalRooms')::bigint",
        SortField::AvailableRooms => "(doc->>'availableRooms')::bigint",
        SortField::Bathrooms => "(doc->>'bathrooms')::bigint",
        SortField::Title => "(doc->>'title') COLLATE \"C\"",
        SortField::AverageRating => "(doc->>'averageRating')::float8",
    }
}

/// Append the `WHERE` clause for `query` to `qb`.
fn push_conditions(qb: &mut QueryBuilder<'_, Postgres>, query: &ListingQuery) {
    qb.push(" WHERE ");
    match query.visibility {
        Visibility::Public => {
            qb.push("(doc->>'isActive')::boolean AND (doc->>'availableRooms')::bigint > 0");
        }
        Visibility::Landlord(landlord) => {
            qb.push("landlord = ")
                .push_bind(*landlord.as_uuid())
                .push(" AND (doc->>'isActive')::boolean");
        }
        Visibility::Owned { landlord, status } => {
            qb.push("landlord = ").push_bind(*landlord.as_uuid());
            match status {
                StatusFilter::All => {}
                StatusFilter::Active => {
                    qb.push(" AND (doc->>'isActive')::boolean");
                }
                StatusFilter::Inactive => {
                    qb.push(" AND NOT (doc->>'isActive')::boolean");
                }
            }
        }
    }
    push_filter(qb, &query.filter);
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, f: &ListingFilter) {
    if let Some(geo) = f.geo {
        qb.push(" AND jsonb_typeof(doc->'address'->'coordinates') = 'object'");
        qb.push(" AND 2 * 6371.0 * asin(sqrt(power(sin(radians((doc->'address'->'coordinates'->>'lat')::float8 - ")
            .push_bind(geo.coordinates.lat)
            .push(") / 2), 2) + cos(radians(")
            .push_bind(geo.coordinates.lat)
            .push(")) * cos(radians((doc->'address'->'coordinates'->>'lat')::float8)) * power(sin(radians((doc->'address'->'coordinates'->>'lng')::float8 - ")
            .push_bind(geo.coordinates.lng)
            .push(") / 2), 2))) <= ")
            .push_bind(geo.radius);
    } else {
        if let Some(city) = &f.city {
            qb.push(" AND doc->'address'->>'city' ILIKE ").push_bind(like_pattern(city));
        }
        if let Some(state) = &f.state {
            qb.push(" AND doc->'address'->>'state' ILIKE ").push_bind(like_pattern(state));
        }
    }
    if !f.property_types.is_empty() {
        let types: Vec<String> = f.property_types.iter().map(|t| t.as_str().to_string()).collect();
        qb.push(" AND doc->>'propertyType' = ANY(").push_bind(types).push(")");
    }
    if let Some(min) = f.min_rent {
        qb.push(" AND (doc->>'rent')::float8 >= ").push_bind(min);
    }
    if let Some(max) = f.max_rent {
        qb.push(" AND (doc->>'rent')::float8 <= ").push_bind(max);
    }
    if let Some(min) = f.min_bathrooms {
        qb.push(" AND (doc->>'bathrooms')::bigint >= ").push_bind(i64::from(min));
    }
    if let Some(min) = f.min_available_rooms {
        qb.push(" AND (doc->>'availableRooms')::bigint >= ").push_bind(i64::from(min));
    }
    if let Some(min) = f.min_total_rooms {
        qb.push(" AND (doc->>'totalRooms')::bigint >= ").push_bind(i64::from(min));
    }
    if let Some(max) = f.max_total_rooms {
        qb.push(" AND (doc->>'totalRooms')::bigint <= ").push_bind(i64::from(max));
    }
    if !f.amenities.is_empty() {
        let amenities: Vec<String> = f.amenities.iter().map(|a| a.as_str().to_string()).collect();
        qb.push(" AND doc->'amenities' ?| ").push_bind(amenities);
    }
    if let Some(by) = f.available_by {
        qb.push(" AND (doc->>'availableFrom')::timestamptz <= ").push_bind(by);
    }
    if let Some(term) = &f.search {
        let pattern = like_pattern(term);
        qb.push(" AND (doc->>'title' ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR doc->>'description' ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR doc->'address'->>'street' ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR doc->'address'->>'city' ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl PropertyStore for PostgresPropertyStore {
    #[instrument(skip(self, property), fields(property_id = %property.id), err)]
    async fn insert(&self, property: Property) -> Result<Property, StoreError> {
        sqlx::query("INSERT INTO properties (id, landlord, doc) VALUES ($1, $2, $3)")
            .bind(property.id.as_uuid())
            .bind(property.landlord.as_uuid())
            .bind(Json(&property))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_property", e))?;
        Ok(property)
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: PropertyId) -> Result<Option<Property>, StoreError> {
        let row = sqlx::query("SELECT doc FROM properties WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_property", e))?;
        row.map(|r| property_from_row("get_property", &r)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn record_view(&self, id: PropertyId) -> Result<Option<Property>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE properties
            SET doc = jsonb_set(doc, '{views}', to_jsonb((doc->>'views')::bigint + 1))
            WHERE id = $1 AND (doc->>'isActive')::boolean
            RETURNING doc
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("record_view", e))?;
        row.map(|r| property_from_row("record_view", &r)).transpose()
    }

    #[instrument(skip(self, mutation), err)]
    async fn update(&self, id: PropertyId, mutation: Mutation<Property>) -> Result<Property, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = sqlx::query("SELECT doc FROM properties WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lock_property", e))?
            .ok_or(StoreError::NotFound)?;
        let mut property = property_from_row("lock_property", &row)?;

        mutation(&mut property)?;

        sqlx::query("UPDATE properties SET doc = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(Json(&property))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_property", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(property)
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: PropertyId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_property", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, query), err)]
    async fn query(&self, query: &ListingQuery) -> Result<ListingPage, StoreError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) AS total FROM properties");
        push_conditions(&mut count, query);
        let total: i64 = count
            .build()
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_properties", e))?
            .try_get("total")
            .map_err(|e| decode_error("count_properties", e))?;

        let direction = match query.sort.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let mut select = QueryBuilder::<Postgres>::new("SELECT doc FROM properties");
        push_conditions(&mut select, query);
        select
            .push(format!(
                " ORDER BY {} {direction}, id {direction} LIMIT ",
                sort_expression(query.sort.field)
            ))
            .push_bind(i64::from(query.page.limit()))
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.page.offset()).unwrap_or(i64::MAX));

        let rows = select
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("query_properties", e))?;
        let properties = rows
            .iter()
            .map(|r| property_from_row("query_properties", r))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ListingPage {
            properties,
            pagination: Pagination::new(query.page, u64::try_from(total).unwrap_or(0)),
        })
    }

    #[instrument(skip(self), err)]
    async fn listing_stats(&self) -> Result<ListingStats, StoreError> {
        let active = self.load_docs("listing_stats", None, true).await?;
        Ok(ListingStats::summarize(&active))
    }

    #[instrument(skip(self), err)]
    async fn landlord_stats(&self, landlord: UserId) -> Result<LandlordStats, StoreError> {
        let owned = self.load_docs("landlord_stats", Some(landlord), false).await?;
        Ok(LandlordStats::summarize(&owned))
    }
}
