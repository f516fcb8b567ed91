//! HTTP plumbing for the configuration service.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/schemas/{name}` | Load schema |
//! | GET    | `/config/{name}` | Fetch document |
//! | PUT    | `/config/{name}` | Replace document |
//! | PATCH  | `/config/{name}` | Partial update |
//! | GET    | `/crud/{name}` | Fetch CRUD rules |
//!
//! Paths are relative to the configured base URL. The name is appended as a
//! single percent-encoded path segment, so `a/b` cannot escape its resource.
//! Retries are NOT built in; every failure surfaces to the caller.

use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::SdkOptions;
use crate::error::SdkError;
use crate::types::ConfigDocument;

/// Resource collections exposed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Schemas,
    Config,
    Crud,
}

impl Resource {
    fn segment(self) -> &'static str {
        match self {
            Self::Schemas => "schemas",
            Self::Config => "config",
            Self::Crud => "crud",
        }
    }
}

/// Cloneable HTTP client bound to one service base URL.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    base_url: Url,
}

impl Transport {
    /// Build a client with the options' default headers and timeout.
    pub fn new(options: &SdkOptions) -> Result<Self, SdkError> {
        let base_url = options.parsed_base_url()?;
        let http = reqwest::Client::builder()
            .timeout(options.effective_timeout())
            .default_headers(options.header_map()?)
            .build()
            .map_err(|e| SdkError::Transport {
                endpoint: "client_init".into(),
                source: e,
            })?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET {base}/{resource}/{name}` decoded as `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        resource: Resource,
        name: &str,
    ) -> Result<T, SdkError> {
        self.send(Method::GET, resource, name, None).await
    }

    /// `PUT {base}/config/{name}` with `body`; returns the server's document.
    pub async fn put(&self, name: &str, body: &ConfigDocument) -> Result<ConfigDocument, SdkError> {
        self.send(Method::PUT, Resource::Config, name, Some(body)).await
    }

    /// `PATCH {base}/config/{name}` with `body`; returns the server's document.
    pub async fn patch(
        &self,
        name: &str,
        body: &ConfigDocument,
    ) -> Result<ConfigDocument, SdkError> {
        self.send(Method::PATCH, Resource::Config, name, Some(body)).await
    }

    /// The full URL for `resource`/`name`.
    pub fn url_for(&self, resource: Resource, name: &str) -> Result<Url, SdkError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SdkError::RequestConstruction {
                endpoint: endpoint_label(&Method::GET, resource, name),
                reason: format!("base URL {} cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .push(resource.segment())
            .push(name);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        resource: Resource,
        name: &str,
        body: Option<&ConfigDocument>,
    ) -> Result<T, SdkError> {
        let endpoint = endpoint_label(&method, resource, name);
        if name.is_empty() {
            return Err(SdkError::RequestConstruction {
                endpoint,
                reason: "configuration name is empty".into(),
            });
        }
        let url = self.url_for(resource, name)?;

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            let bytes = serde_json::to_vec(body).map_err(|e| SdkError::RequestConstruction {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;
            request = request.body(bytes);
        }

        tracing::debug!(%endpoint, "sending configuration service request");

        let resp = request.send().await.map_err(|e| SdkError::Transport {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%endpoint, status, "configuration service returned an error status");
            return Err(SdkError::Remote {
                endpoint,
                status,
                body,
            });
        }

        let bytes = resp.bytes().await.map_err(|e| SdkError::Transport {
            endpoint: endpoint.clone(),
            source: e,
        })?;
        serde_json::from_slice(&bytes).map_err(|e| SdkError::Decode { endpoint, source: e })
    }
}

fn endpoint_label(method: &Method, resource: Resource, name: &str) -> String {
    format!("{method} /{}/{name}", resource.segment())
}
