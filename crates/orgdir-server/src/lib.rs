//! HTTP server wiring for the organization directory.
//!
//! Holds the deserialised [`ServerConfig`], the top-level router that mounts
//! [`orgdir_api`] under the configured prefix, and the demo data loader in
//! [`seed`].

pub mod seed;

use std::{io::Write, path::PathBuf};

use axum::Router;
use orgdir_api::ApiToken;
use orgdir_core::{
  geo::RadiusMode,
  index::{EmptyResultPolicy, IndexOptions, OrganizationIndex},
  store::DirectoryStore,
};
use rand_core::{OsRng, RngCore as _};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::warn;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered with
/// `ORGDIR_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  pub store_path:    PathBuf,
  pub api_prefix:    String,
  /// Shared secret for the `X-API-Token` header. A random one is generated
  /// at startup when unset.
  pub api_token:     Option<String>,
  pub radius_mode:   RadiusMode,
  pub empty_results: EmptyResultPolicy,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:          "127.0.0.1".to_string(),
      port:          8000,
      store_path:    PathBuf::from("orgdir.db"),
      api_prefix:    "/api".to_string(),
      api_token:     None,
      radius_mode:   RadiusMode::default(),
      empty_results: EmptyResultPolicy::default(),
    }
  }
}

impl ServerConfig {
  pub fn index_options(&self) -> IndexOptions {
    IndexOptions {
      empty_results: self.empty_results,
      radius_mode:   self.radius_mode,
    }
  }
}

/// A random 32-byte token, hex encoded.
pub fn generate_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

/// The configured API secret, or a freshly generated one.
///
/// A generated secret is written once to `notice` (stderr in the binary) and
/// never to the log.
pub fn api_secret(config: &ServerConfig, notice: &mut impl Write) -> std::io::Result<String> {
  if let Some(token) = &config.api_token {
    return Ok(token.clone());
  }
  let token = generate_token();
  writeln!(notice, "generated api token for this run: {token}")?;
  warn!("no api_token configured; generated one for this run, see stderr");
  Ok(token)
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Mount the API under `prefix` and wrap it in request tracing.
pub fn router<S>(index: OrganizationIndex<S>, token: ApiToken, prefix: &str) -> Router
where
  S: DirectoryStore + 'static,
{
  let api = orgdir_api::api_router(index, token);
  let prefix = prefix.trim_end_matches('/');
  let app = if prefix.is_empty() {
    Router::new().merge(api)
  } else if prefix.starts_with('/') {
    Router::new().nest(prefix, api)
  } else {
    Router::new().nest(&format!("/{prefix}"), api)
  };
  app.layer(TraceLayer::new_for_http())
}
