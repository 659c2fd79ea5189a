//! OpenAPI document and interactive documentation routes.

use axum::{
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi, ToSchema,
};

use crate::response::{Envelope, ListMeta};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Back-office API",
        version = env!("CARGO_PKG_VERSION"),
        description = "CRUD REST API for clientes, maquiladores and usuarios with soft delete and status transitions"
    ),
    components(schemas(
        Envelope,
        ListMeta,
        ClienteInput,
        MaquiladorInput,
        UsuarioInput,
        EstadoChange,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "clientes", description = "Gestión de clientes"),
        (name = "maquiladores", description = "Gestión de maquiladores"),
        (name = "usuarios", description = "Gestión de usuarios"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create/update body for a cliente.
#[derive(ToSchema, serde::Serialize, serde::Deserialize)]
pub struct ClienteInput {
    #[schema(example = "Industrias del Norte")]
    pub nombre: String,
    #[schema(example = "Av. Siempre Viva 123")]
    pub direccion: String,
    #[schema(example = "Juan Perez")]
    pub contacto: String,
    #[schema(example = "5512345678")]
    pub telefono: String,
    #[schema(example = "ventas@norte.mx")]
    pub email: String,
    #[schema(example = 1)]
    pub estado_id: i32,
}

/// Create/update body for a maquilador.
#[derive(ToSchema, serde::Serialize, serde::Deserialize)]
pub struct MaquiladorInput {
    #[schema(example = "Planta Sur")]
    pub nombre: String,
    #[schema(example = "Parque Industrial 4")]
    pub direccion: String,
    #[schema(example = 500)]
    pub capacidad: i32,
    #[schema(example = 1)]
    pub estado_id: i32,
}

/// Create body for a usuario; password is accepted on create only.
#[derive(ToSchema, serde::Serialize, serde::Deserialize)]
pub struct UsuarioInput {
    #[schema(example = "Ana Gomez")]
    pub nombre: String,
    #[schema(example = "ana@empresa.mx")]
    pub email: String,
    #[schema(example = "s3creta!")]
    pub password: Option<String>,
    #[schema(example = "admin")]
    pub role: String,
    #[schema(example = 1)]
    pub estado_id: i32,
}

/// PATCH body for the status endpoint.
#[derive(ToSchema, serde::Serialize, serde::Deserialize)]
pub struct EstadoChange {
    #[schema(example = 2)]
    pub estado_id: i32,
}

async fn serve_openapi() -> Json<Value> {
    Json(serde_json::to_value(ApiDoc::openapi()).unwrap_or_default())
}

async fn serve_swagger_ui() -> impl IntoResponse {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Back-office API</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        SwaggerUIBundle({
            url: '/api-docs/openapi.json',
            dom_id: '#swagger-ui',
        });
    </script>
</body>
</html>
"#,
    )
}

/// GET /api-docs/openapi.json and GET /docs. Outside the bearer gate.
pub fn docs_routes() -> Router {
    Router::new()
        .route("/api-docs/openapi.json", get(serve_openapi))
        .route("/docs", get(serve_swagger_ui))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn openapi_document_generates() {
        let doc = ApiDoc::openapi();
        assert_eq!(doc.info.title, "Back-office API");
        assert!(doc.components.is_some());
    }

    #[tokio::test]
    async fn openapi_json_carries_schemas() {
        let Json(v) = serve_openapi().await;
        assert!(v["components"]["schemas"]["Envelope"].is_object());
        assert!(v["components"]["schemas"]["ClienteInput"].is_object());
        assert!(v["components"]["securitySchemes"]["bearer_auth"].is_object());
    }
}
