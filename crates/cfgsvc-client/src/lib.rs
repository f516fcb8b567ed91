//! # cfgsvc-client -- Typed Rust client for the configuration service
//!
//! Fetches, updates, and validates named configuration documents held by a
//! remote configuration service, caches results, and polls for changes.
//!
//! ## Components
//!
//! - **Schema store** ([`ConfigSdk::load_schema`]): schemas keyed by
//!   configuration name, replaced only by explicit loads.
//! - **Validator** ([`ConfigSdk::validate`]): pure check of a document
//!   against a loaded schema. See [`validate`].
//! - **Cache**: last-fetched document per name, written by cached gets and
//!   by every successful update or patch.
//! - **Transport**: reqwest client with a fixed header set and timeout.
//! - **Watchers** ([`ConfigSdk::watch`]): one polling task per name.
//!
//! Cache, schema store, and watcher bookkeeping are independent
//! read/write-locked maps. None is held across an `.await`.
//!
//! ## API Path Convention
//!
//! `{base_url}/{schemas|config|crud}/{name}`, for example
//! `http://localhost:3000/api/config/display`.
//!
//! ## Example
//!
//! ```no_run
//! use cfgsvc_client::{ConfigSdk, GetOptions, SdkOptions, UpdateOptions};
//!
//! # async fn run() -> Result<(), cfgsvc_client::SdkError> {
//! let sdk = ConfigSdk::new(SdkOptions::new("http://localhost:3000/api"))?;
//! sdk.load_schema("display").await?;
//!
//! let mut doc = sdk.get("display", GetOptions::cached().validated()).await?;
//! doc.insert("brightness".into(), serde_json::json!(80));
//! sdk.update("display", &doc, UpdateOptions::validated()).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crud;
pub mod error;
pub mod schema;
pub mod store;
pub mod transport;
pub mod types;
pub mod validate;
pub mod watch;

pub use config::{ConfigError, SdkOptions};
pub use crud::{check_consistency, CrudRules, CrudRuleSet, FieldAccess};
pub use error::SdkError;
pub use schema::{PropertyRule, Schema};
pub use types::{ConfigDocument, GetOptions, UpdateOptions, ValidationResult};
pub use validate::validate_document;
pub use watch::{WatchCallback, WatchHandle, DEFAULT_WATCH_INTERVAL};

use std::sync::Arc;
use std::time::Duration;

use store::Store;
use transport::{Resource, Transport};
use watch::WatchManager;

/// Client SDK for the configuration service.
///
/// All methods take `&self`; share one instance across tasks with `Arc`.
/// Dropping the SDK stops every watcher it started.
#[derive(Debug)]
pub struct ConfigSdk {
    transport: Transport,
    cache: Store<ConfigDocument>,
    schemas: Store<Schema>,
    watchers: WatchManager,
}

impl ConfigSdk {
    /// Create an SDK from options.
    pub fn new(options: SdkOptions) -> Result<Self, SdkError> {
        let transport = Transport::new(&options)?;
        tracing::debug!(?options, "configuration SDK initialised");
        Ok(Self {
            watchers: WatchManager::new(transport.clone()),
            transport,
            cache: Store::new(),
            schemas: Store::new(),
        })
    }

    /// Create an SDK from `CFGSVC_*` environment variables.
    pub fn from_env() -> Result<Self, SdkError> {
        Self::new(SdkOptions::from_env()?)
    }

    /// The service base URL requests are sent to.
    pub fn base_url(&self) -> &url::Url {
        self.transport.base_url()
    }

    // -- Schemas -------------------------------------------------------------

    /// Fetch the schema for `name` and store it, replacing any previous one.
    ///
    /// Calls `GET {base_url}/schemas/{name}`.
    pub async fn load_schema(&self, name: &str) -> Result<Schema, SdkError> {
        let schema: Schema = self.transport.get(Resource::Schemas, name).await?;
        self.schemas.insert(name, schema.clone());
        tracing::info!(
            config = name,
            required = schema.required.len(),
            properties = schema.properties.len(),
            "loaded schema"
        );
        Ok(schema)
    }

    /// The loaded schema for `name`, if any.
    pub fn schema(&self, name: &str) -> Option<Schema> {
        self.schemas.get(name)
    }

    /// Validate `data` against the loaded schema `schema_name`.
    ///
    /// Never fetches: an unloaded schema yields an invalid result naming it.
    pub fn validate(&self, data: &ConfigDocument, schema_name: &str) -> ValidationResult {
        match self.schemas.get(schema_name) {
            Some(schema) => validate::validate_document(data, &schema),
            None => ValidationResult::from_errors(vec![format!("schema {schema_name} not loaded")]),
        }
    }

    // -- Documents -----------------------------------------------------------

    /// Fetch the document for `name`.
    ///
    /// With `use_cache`, a cached entry is returned as-is (no request, no
    /// validation) and a freshly fetched one is stored. With `validate`, a
    /// fetched document that fails its schema is rejected with
    /// [`SdkError::Validation`] and not cached.
    ///
    /// Calls `GET {base_url}/config/{name}`.
    pub async fn get(&self, name: &str, options: GetOptions) -> Result<ConfigDocument, SdkError> {
        if options.use_cache {
            if let Some(doc) = self.cache.get(name) {
                tracing::debug!(config = name, "serving configuration from cache");
                return Ok(doc);
            }
        }

        let doc: ConfigDocument = self.transport.get(Resource::Config, name).await?;

        if options.validate {
            self.validate(&doc, name).into_result(name)?;
        }
        if options.use_cache {
            self.cache.insert(name, doc.clone());
        }
        Ok(doc)
    }

    /// Replace the document for `name` with `data`.
    ///
    /// The cache is overwritten with the server's response, not with `data`.
    ///
    /// Calls `PUT {base_url}/config/{name}`.
    pub async fn update(
        &self,
        name: &str,
        data: &ConfigDocument,
        options: UpdateOptions,
    ) -> Result<ConfigDocument, SdkError> {
        if options.validate {
            self.validate(data, name).into_result(name)?;
        }
        let updated = self.transport.put(name, data).await?;
        self.cache.insert(name, updated.clone());
        Ok(updated)
    }

    /// Apply a partial update to the document for `name`.
    ///
    /// With `validate`, the current document is fetched (uncached) and
    /// `updates` is shallow-merged over it; only that merged view is
    /// validated. The request body is `updates` alone, and the server's
    /// response replaces the cache entry without further validation.
    ///
    /// Calls `PATCH {base_url}/config/{name}`.
    pub async fn patch(
        &self,
        name: &str,
        updates: &ConfigDocument,
        options: UpdateOptions,
    ) -> Result<ConfigDocument, SdkError> {
        if options.validate {
            let current = self.get(name, GetOptions::FRESH).await?;
            let merged = types::shallow_merge(&current, updates);
            self.validate(&merged, name).into_result(name)?;
        }
        let updated = self.transport.patch(name, updates).await?;
        self.cache.insert(name, updated.clone());
        Ok(updated)
    }

    /// Fetch the CRUD rules for `name`. Not cached.
    ///
    /// Calls `GET {base_url}/crud/{name}`.
    pub async fn get_crud(&self, name: &str) -> Result<CrudRules, SdkError> {
        self.transport.get(Resource::Crud, name).await
    }

    // -- Cache ---------------------------------------------------------------

    /// The cached document for `name`, without any network call.
    pub fn cached(&self, name: &str) -> Option<ConfigDocument> {
        self.cache.get(name)
    }

    /// Drop the named cache entries, or the whole cache when `names` is
    /// empty. Unknown names are ignored.
    pub fn clear_cache(&self, names: &[&str]) {
        if names.is_empty() {
            self.cache.clear();
        } else {
            for name in names {
                self.cache.remove(name);
            }
        }
    }

    // -- Watchers ------------------------------------------------------------

    /// Poll `name` every `interval` (zero means [`DEFAULT_WATCH_INTERVAL`])
    /// and report changes to `callback`.
    ///
    /// The first fetch happens immediately. The callback receives the
    /// document on the first successful fetch and then whenever its
    /// canonical JSON changes, and receives every fetch error. Fetches are
    /// uncached and unvalidated. A previous watcher for `name` is stopped.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime, like `tokio::spawn`.
    pub fn watch<F>(&self, name: &str, callback: F, interval: Duration) -> WatchHandle
    where
        F: Fn(Result<ConfigDocument, SdkError>) + Send + Sync + 'static,
    {
        self.watchers.start(name, Arc::new(callback), interval)
    }

    /// Names that currently have a watcher, sorted.
    pub fn watched(&self) -> Vec<String> {
        self.watchers.active()
    }

    // -- Teardown ------------------------------------------------------------

    /// Stop every watcher, then clear the cache and the schema store.
    ///
    /// The instance stays usable and behaves as if freshly constructed.
    pub fn destroy(&self) {
        self.watchers.cancel_all();
        self.cache.clear();
        self.schemas.clear();
        tracing::info!("configuration SDK state torn down");
    }
}
