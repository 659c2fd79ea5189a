//! Standard response envelope helpers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

/// Uniform wrapper returned by every endpoint:
/// `{ statusCode, message, data, metadata }`.
///
/// `data` is `{}` on error (`[]` for an empty list); `metadata` carries
/// `{page, size, total}` on list responses and is `{}` otherwise.
#[derive(Serialize, Debug, ToSchema)]
pub struct Envelope {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
    pub data: Value,
    pub metadata: Value,
}

/// Pagination metadata carried by list responses.
#[derive(Serialize, Debug, ToSchema)]
pub struct ListMeta {
    pub page: u32,
    pub size: u32,
    pub total: i64,
}

impl Envelope {
    pub fn ok(message: impl Into<String>, data: Value) -> Self {
        Envelope {
            status_code: StatusCode::OK.as_u16(),
            message: message.into(),
            data,
            metadata: json!({}),
        }
    }

    pub fn ok_list(message: impl Into<String>, data: Vec<Value>, meta: ListMeta) -> Self {
        Envelope {
            status_code: StatusCode::OK.as_u16(),
            message: message.into(),
            data: Value::Array(data),
            metadata: json!({
                "page": meta.page,
                "size": meta.size,
                "total": meta.total,
            }),
        }
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Envelope {
            status_code: status.as_u16(),
            message: message.into(),
            data: json!({}),
            metadata: json!({}),
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ok_envelope_has_empty_metadata() {
        let env = Envelope::ok("Cliente obtenido con éxito", json!({"id": "x"}));
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["statusCode"], 200);
        assert_eq!(v["message"], "Cliente obtenido con éxito");
        assert_eq!(v["data"]["id"], "x");
        assert_eq!(v["metadata"], json!({}));
    }

    #[test]
    fn list_envelope_carries_page_size_total() {
        let env = Envelope::ok_list(
            "Clientes obtenidos con éxito",
            vec![json!({"id": 1})],
            ListMeta {
                page: 2,
                size: 10,
                total: 15,
            },
        );
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["metadata"], json!({"page": 2, "size": 10, "total": 15}));
        assert_eq!(v["data"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn error_envelope_has_empty_object_data() {
        let env = Envelope::error(StatusCode::NOT_FOUND, "Cliente no encontrado");
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["statusCode"], 404);
        assert_eq!(v["data"], json!({}));
        assert_eq!(v["metadata"], json!({}));
    }
}
