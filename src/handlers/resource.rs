//! Resource handlers: list, get, create, update, soft-delete, set-status.
//! Handlers resolve the resource descriptor from the path segment; unknown
//! segments are a 404.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::model::{ResourceSpec, StatusFilter};
use crate::response::{Envelope, ListMeta};
use crate::service::{LifecycleService, RequestValidator};
use crate::state::AppState;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_SIZE: u32 = 10;

fn resolve<'a>(state: &'a AppState, segment: &str) -> Result<&'a ResourceSpec, AppError> {
    state
        .model
        .by_path(segment)
        .ok_or_else(|| AppError::NotFound("Recurso no encontrado".into()))
}

/// Invalid uuids cannot match any row, so they surface as the resource's
/// not-found message rather than a shape error.
fn parse_id(spec: &ResourceSpec, id_str: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id_str).map_err(|_| AppError::NotFound(spec.msg_not_found()))
}

fn body_to_map(value: Value) -> Result<HashMap<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m.into_iter().collect()),
        _ => Err(AppError::Validation("El cuerpo debe ser un objeto JSON".into())),
    }
}

fn positive_int(params: &HashMap<String, String>, name: &str, default: u32) -> Result<u32, AppError> {
    match params.get(name) {
        None => Ok(default),
        Some(raw) => match raw.parse::<u32>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(AppError::Validation(format!(
                "{} must be a positive integer",
                capitalize_ascii(name)
            ))),
        },
    }
}

fn capitalize_ascii(s: &str) -> String {
    let mut out = s.to_string();
    if let Some(first) = out.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    out
}

pub async fn list(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Envelope, AppError> {
    let spec = resolve(&state, &segment)?;
    let page = positive_int(&params, "page", DEFAULT_PAGE)?;
    let size = positive_int(&params, "size", DEFAULT_SIZE)?;
    let filter = StatusFilter::parse(params.get("estado").map(String::as_str))?;
    tracing::info!(resource = spec.path_segment, page, size, ?filter, "list request");

    let (rows, total) = LifecycleService::list(&state.pool, spec, page, size, filter).await?;
    let message = if rows.is_empty() {
        spec.msg_list_empty()
    } else {
        spec.msg_list_ok()
    };
    Ok(Envelope::ok_list(message, rows, ListMeta { page, size, total }))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path((segment, id_str)): Path<(String, String)>,
) -> Result<Envelope, AppError> {
    let spec = resolve(&state, &segment)?;
    let id = parse_id(spec, &id_str)?;
    tracing::info!(resource = spec.path_segment, %id, "get request");
    let row = LifecycleService::get(&state.pool, spec, id).await?;
    Ok(Envelope::ok(spec.msg_get_ok(), row))
}

pub async fn create(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Json(body): Json<Value>,
) -> Result<Envelope, AppError> {
    let spec = resolve(&state, &segment)?;
    let body = body_to_map(body)?;
    RequestValidator::validate_create(&body, spec)?;
    tracing::info!(resource = spec.path_segment, "create request");
    let row = LifecycleService::create(&state.pool, spec, body).await?;
    Ok(Envelope::ok(spec.msg_created(), row))
}

pub async fn update(
    State(state): State<AppState>,
    Path((segment, id_str)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Envelope, AppError> {
    let spec = resolve(&state, &segment)?;
    let id = parse_id(spec, &id_str)?;
    let body = body_to_map(body)?;
    RequestValidator::validate_update(&body, spec)?;
    tracing::info!(resource = spec.path_segment, %id, "update request");
    let row = LifecycleService::update(&state.pool, spec, id, body).await?;
    Ok(Envelope::ok(spec.msg_updated(), row))
}

pub async fn soft_delete(
    State(state): State<AppState>,
    Path((segment, id_str)): Path<(String, String)>,
) -> Result<Envelope, AppError> {
    let spec = resolve(&state, &segment)?;
    let id = parse_id(spec, &id_str)?;
    tracing::info!(resource = spec.path_segment, %id, "soft delete request");
    let row = LifecycleService::soft_delete(&state.pool, spec, id).await?;
    Ok(Envelope::ok(spec.msg_deleted(), row))
}

pub async fn set_status(
    State(state): State<AppState>,
    Path((segment, id_str)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Envelope, AppError> {
    let spec = resolve(&state, &segment)?;
    let id = parse_id(spec, &id_str)?;
    let estado_id = body
        .get("estado_id")
        .and_then(Value::as_i64)
        .ok_or_else(|| AppError::Validation("estado_id debe ser un entero".into()))?;
    tracing::info!(resource = spec.path_segment, %id, estado_id, "status update request");
    let row = LifecycleService::set_status(&state.pool, spec, id, estado_id).await?;
    Ok(Envelope::ok(spec.msg_status_updated(), row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn page_and_size_default_when_absent() {
        let params = HashMap::new();
        assert_eq!(positive_int(&params, "page", DEFAULT_PAGE).unwrap(), 1);
        assert_eq!(positive_int(&params, "size", DEFAULT_SIZE).unwrap(), 10);
    }

    #[test]
    fn zero_and_garbage_pages_are_rejected() {
        for bad in ["0", "-3", "diez", "1.5"] {
            let params: HashMap<String, String> =
                [("page".to_string(), bad.to_string())].into();
            let err = positive_int(&params, "page", DEFAULT_PAGE).unwrap_err();
            assert!(matches!(err, AppError::Validation(m) if m == "Page must be a positive integer"));
        }
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(body_to_map(serde_json::json!([1, 2])).is_err());
        assert!(body_to_map(serde_json::json!("texto")).is_err());
        assert!(body_to_map(serde_json::json!({"a": 1})).is_ok());
    }

    #[test]
    fn bad_uuid_maps_to_resource_not_found() {
        let model = crate::model::ResourceModel::builtin();
        let spec = model.by_path("clientes").unwrap();
        let err = parse_id(spec, "not-a-uuid").unwrap_err();
        assert!(matches!(err, AppError::NotFound(m) if m == "Cliente no encontrado"));
    }
}
