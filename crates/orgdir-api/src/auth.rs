//! Static API token check.
//!
//! Every request must carry the shared secret in the `X-API-Token` header.
//! Both sides are hashed with SHA-256 before comparison, so the comparison
//! always covers 32 bytes regardless of what was sent.

use std::sync::Arc;

use axum::{
  extract::{Request, State},
  http::HeaderMap,
  middleware::Next,
  response::Response,
};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::ApiError;

/// Header carrying the shared secret.
pub const TOKEN_HEADER: &str = "x-api-token";

/// The configured secret, kept only as its digest.
#[derive(Clone)]
pub struct ApiToken {
  digest: [u8; 32],
}

impl ApiToken {
  pub fn new(secret: &str) -> Self { Self { digest: digest(secret) } }

  pub fn matches(&self, presented: &str) -> bool { digest(presented) == self.digest }
}

impl std::fmt::Debug for ApiToken {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("ApiToken(..)")
  }
}

fn digest(value: &str) -> [u8; 32] { Sha256::digest(value.as_bytes()).into() }

/// Verify the token header directly.
pub fn verify_token(headers: &HeaderMap, token: &ApiToken) -> Result<(), ApiError> {
  let presented = headers
    .get(TOKEN_HEADER)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  if !token.matches(presented) {
    return Err(ApiError::Unauthorized);
  }
  Ok(())
}

/// Middleware rejecting requests without a valid token with 401.
pub async fn require_token(
  State(token): State<Arc<ApiToken>>,
  request: Request,
  next: Next,
) -> Result<Response, ApiError> {
  if let Err(err) = verify_token(request.headers(), &token) {
    warn!(method = %request.method(), uri = %request.uri(), "rejected api token");
    return Err(err);
  }
  Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  #[test]
  fn matching_token_passes() {
    let token = ApiToken::new("s3cret");
    let mut headers = HeaderMap::new();
    headers.insert(TOKEN_HEADER, HeaderValue::from_static("s3cret"));
    assert!(verify_token(&headers, &token).is_ok());
  }

  #[test]
  fn wrong_or_missing_token_fails() {
    let token = ApiToken::new("s3cret");
    assert!(matches!(
      verify_token(&HeaderMap::new(), &token),
      Err(ApiError::Unauthorized)
    ));

    let mut headers = HeaderMap::new();
    headers.insert(TOKEN_HEADER, HeaderValue::from_static("s3cre"));
    assert!(matches!(verify_token(&headers, &token), Err(ApiError::Unauthorized)));
  }
}
