//! The lifecycle engine: generic list / get / create / update / soft-delete /
//! set-status execution against PostgreSQL, shared by all three resources.

use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::model::{ResourceSpec, StatusFilter};
use crate::sql::{self, PgBindValue, QueryBuf};

/// bcrypt work factor for credential secrets.
const HASH_COST: u32 = 10;

pub struct LifecycleService;

impl LifecycleService {
    /// Windowed listing plus the total under the same status predicate.
    pub async fn list(
        pool: &PgPool,
        spec: &ResourceSpec,
        page: u32,
        size: u32,
        filter: StatusFilter,
    ) -> Result<(Vec<Value>, i64), AppError> {
        let status_id = filter.status_id();
        let offset = (page - 1).saturating_mul(size);
        let window = sql::select_window(spec, status_id, size, offset);
        let rows = Self::fetch_all(pool, &window)
            .await
            .map_err(|e| Self::store_failure(spec.err_list(), e))?;
        let total = Self::fetch_count(pool, &sql::count(spec, status_id))
            .await
            .map_err(|e| Self::store_failure(spec.err_list(), e))?;
        Ok((rows, total))
    }

    /// Fetch one row by id; NotFound when no row matches.
    pub async fn get(pool: &PgPool, spec: &ResourceSpec, id: Uuid) -> Result<Value, AppError> {
        let row = Self::fetch_optional(pool, &sql::select_by_id(spec, id))
            .await
            .map_err(|e| Self::store_failure(spec.err_get(), e))?;
        row.ok_or_else(|| {
            tracing::warn!(resource = spec.path_segment, %id, "record not found");
            AppError::NotFound(spec.msg_not_found())
        })
    }

    /// True iff the status id exists in the resource's lookup table.
    pub async fn status_exists(
        pool: &PgPool,
        spec: &ResourceSpec,
        estado_id: i64,
    ) -> Result<bool, AppError> {
        Self::fetch_exists(pool, &sql::status_exists(spec, estado_id))
            .await
            .map_err(|e| Self::store_failure(spec.err_get(), e))
    }

    /// Create: status lookup, natural-key uniqueness, id assignment, secret
    /// hashing, insert. No mutation happens before both checks pass; the DB
    /// unique constraint backstops the check-then-insert window.
    pub async fn create(
        pool: &PgPool,
        spec: &ResourceSpec,
        mut body: HashMap<String, Value>,
    ) -> Result<Value, AppError> {
        let estado_id = requested_status(&body)?;
        let valid = Self::fetch_exists(pool, &sql::status_exists(spec, estado_id))
            .await
            .map_err(|e| Self::store_failure(spec.err_create(), e))?;
        if !valid {
            return Err(AppError::InvalidState);
        }

        let key_value = body.get(spec.natural_key).cloned().unwrap_or(Value::Null);
        let duplicate = Self::fetch_exists(pool, &sql::natural_key_exists(spec, &key_value))
            .await
            .map_err(|e| Self::store_failure(spec.err_create(), e))?;
        if duplicate {
            return Err(AppError::Conflict(spec.msg_duplicate()));
        }

        for col in spec.columns.iter().filter(|c| c.secret) {
            if let Some(Value::String(plain)) = body.get(col.name) {
                let hashed = bcrypt::hash(plain, HASH_COST)
                    .map_err(|e| Self::store_failure(spec.err_create(), sqlx::Error::Protocol(e.to_string())))?;
                body.insert(col.name.to_string(), Value::String(hashed));
            }
        }

        let id = Uuid::new_v4();
        let q = sql::insert(spec, id, &body);
        let row = Self::fetch_optional(pool, &q).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(spec.msg_duplicate())
            } else {
                Self::store_failure(spec.err_create(), e)
            }
        })?;
        row.ok_or_else(|| AppError::Store(spec.err_create()))
    }

    /// Full update: NotFound, then status lookup, then overwrite every
    /// mutable column. The natural key is not re-checked here; the DB unique
    /// constraint turns a duplicate into a Conflict.
    pub async fn update(
        pool: &PgPool,
        spec: &ResourceSpec,
        id: Uuid,
        body: HashMap<String, Value>,
    ) -> Result<Value, AppError> {
        let existing = Self::fetch_optional(pool, &sql::select_by_id(spec, id))
            .await
            .map_err(|e| Self::store_failure(spec.err_update(), e))?;
        if existing.is_none() {
            tracing::warn!(resource = spec.path_segment, %id, "record not found for update");
            return Err(AppError::NotFound(spec.msg_not_found()));
        }

        let estado_id = requested_status(&body)?;
        let valid = Self::fetch_exists(pool, &sql::status_exists(spec, estado_id))
            .await
            .map_err(|e| Self::store_failure(spec.err_update(), e))?;
        if !valid {
            return Err(AppError::InvalidState);
        }

        let q = sql::update_full(spec, id, &body);
        let row = Self::fetch_optional(pool, &q).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(spec.msg_duplicate())
            } else {
                Self::store_failure(spec.err_update(), e)
            }
        })?;
        row.ok_or_else(|| AppError::NotFound(spec.msg_not_found()))
    }

    /// Soft delete: guarded transition to the inactive status. Succeeds at
    /// most once per record; the second call reports the record already
    /// inactive.
    pub async fn soft_delete(
        pool: &PgPool,
        spec: &ResourceSpec,
        id: Uuid,
    ) -> Result<Value, AppError> {
        let q = sql::soft_delete(spec, id);
        let updated = Self::fetch_optional(pool, &q)
            .await
            .map_err(|e| Self::store_failure(spec.err_delete(), e))?;
        match updated {
            Some(row) => Ok(row),
            None => {
                let current = Self::fetch_optional(pool, &sql::select_by_id(spec, id))
                    .await
                    .map_err(|e| Self::store_failure(spec.err_delete(), e))?;
                match current {
                    None => {
                        tracing::warn!(resource = spec.path_segment, %id, "record not found for delete");
                        Err(AppError::NotFound(spec.msg_not_found()))
                    }
                    Some(_) => Err(AppError::Conflict(spec.msg_already_inactive())),
                }
            }
        }
    }

    /// Set status: NotFound, then no-op rejection, then lookup validation,
    /// then the guarded transition. The guard closes the read-then-write
    /// race: of two concurrent identical calls only one can transition.
    pub async fn set_status(
        pool: &PgPool,
        spec: &ResourceSpec,
        id: Uuid,
        estado_id: i64,
    ) -> Result<Value, AppError> {
        let current = Self::fetch_optional(pool, &sql::select_by_id(spec, id))
            .await
            .map_err(|e| Self::store_failure(spec.err_status(), e))?;
        let current = match current {
            Some(row) => row,
            None => {
                tracing::warn!(resource = spec.path_segment, %id, "record not found for status update");
                return Err(AppError::NotFound(spec.msg_not_found()));
            }
        };
        if current.get("estado_id").and_then(Value::as_i64) == Some(estado_id) {
            return Err(AppError::Conflict(spec.msg_same_status()));
        }

        let valid = Self::fetch_exists(pool, &sql::status_exists(spec, estado_id))
            .await
            .map_err(|e| Self::store_failure(spec.err_status(), e))?;
        if !valid {
            return Err(AppError::InvalidState);
        }

        let q = sql::transition(spec, id, estado_id);
        let updated = Self::fetch_optional(pool, &q)
            .await
            .map_err(|e| Self::store_failure(spec.err_status(), e))?;
        match updated {
            Some(row) => Ok(row),
            // A concurrent writer got there first: the row is gone or
            // already in the requested status.
            None => {
                let now = Self::fetch_optional(pool, &sql::select_by_id(spec, id))
                    .await
                    .map_err(|e| Self::store_failure(spec.err_status(), e))?;
                match now {
                    None => Err(AppError::NotFound(spec.msg_not_found())),
                    Some(_) => Err(AppError::Conflict(spec.msg_same_status())),
                }
            }
        }
    }

    fn store_failure(message: String, e: sqlx::Error) -> AppError {
        tracing::error!(error = %e, "store failure");
        AppError::Store(message)
    }

    async fn fetch_all(pool: &PgPool, q: &QueryBuf) -> Result<Vec<Value>, sqlx::Error> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let rows = query.fetch_all(pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn fetch_optional(pool: &PgPool, q: &QueryBuf) -> Result<Option<Value>, sqlx::Error> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let row = query.fetch_optional(pool).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }

    async fn fetch_exists(pool: &PgPool, q: &QueryBuf) -> Result<bool, sqlx::Error> {
        Ok(Self::fetch_optional(pool, q).await?.is_some())
    }

    async fn fetch_count(pool: &PgPool, q: &QueryBuf) -> Result<i64, sqlx::Error> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_scalar::<_, i64>(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        query.fetch_one(pool).await
    }
}

fn requested_status(body: &HashMap<String, Value>) -> Result<i64, AppError> {
    body.get("estado_id")
        .and_then(Value::as_i64)
        .ok_or(AppError::InvalidState)
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn requested_status_reads_the_body_field() {
        let body: HashMap<String, Value> = [("estado_id".to_string(), json!(3))].into();
        assert_eq!(requested_status(&body).unwrap(), 3);
    }

    #[test]
    fn missing_or_non_integer_status_is_invalid_state() {
        let empty: HashMap<String, Value> = HashMap::new();
        assert!(matches!(
            requested_status(&empty),
            Err(AppError::InvalidState)
        ));
        let wrong: HashMap<String, Value> = [("estado_id".to_string(), json!("uno"))].into();
        assert!(matches!(
            requested_status(&wrong),
            Err(AppError::InvalidState)
        ));
    }

    #[test]
    fn offset_arithmetic_matches_page_window() {
        // (page - 1) * size, same formula the list query uses.
        let cases = [(1u32, 10u32, 0u32), (2, 10, 10), (3, 25, 50)];
        for (page, size, expected) in cases {
            assert_eq!((page - 1).saturating_mul(size), expected);
        }
    }

    #[test]
    fn hash_cost_is_fixed() {
        assert_eq!(HASH_COST, 10);
    }
}
