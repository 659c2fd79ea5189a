//! Bearer-token gate. The verifier is an injected capability on the
//! application state, not ambient configuration: routes receive it through
//! the middleware layer.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use headers::{authorization::Bearer, Authorization, HeaderMapExt};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

/// Issued tokens expire after four hours.
const TOKEN_TTL_HOURS: i64 = 4;

/// Claims carried by an issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated principal id.
    pub id: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 token issuer/verifier over a shared secret.
#[derive(Clone)]
pub struct TokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenVerifier {
    pub fn from_secret(secret: &str) -> Self {
        TokenVerifier {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token for a principal. Not exposed over HTTP; used by
    /// operators and tests.
    pub fn issue(&self, id: &str, email: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            id: id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "token issue failed");
            AppError::Store("Error generando token".into())
        })
    }

    /// Validate a token string; expired or tampered tokens are rejected.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::AuthInvalid)
    }

    /// Authenticate a request from its headers: missing bearer → AuthMissing
    /// (401), present but invalid → AuthInvalid (403).
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, AppError> {
        let bearer = headers
            .typed_get::<Authorization<Bearer>>()
            .ok_or(AppError::AuthMissing)?;
        self.verify(bearer.token())
    }
}

/// Middleware gating every resource route behind the bearer credential.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = state.verifier.authenticate(request.headers())?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
