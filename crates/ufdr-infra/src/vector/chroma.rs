//! ChromaClient -- HTTP client for the Chroma vector database.
//!
//! Talks to the Chroma v2 REST API with reqwest. `connect` checks the
//! heartbeat, then makes sure the report collection exists: it is fetched
//! by name and created when the fetch fails. A create that loses the race
//! to another client (409 / "already exists") falls back to fetching again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use ufdr_core::store::StoreClient;
use ufdr_types::config::VectorStoreConfig;
use ufdr_types::error::StoreError;

const STORE: &str = "chroma";

/// Metadata description attached to a newly created collection.
pub const COLLECTION_DESCRIPTION: &str = "UFDR documents and reports";

/// A Chroma collection as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// Client-side settings in effect for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromaSettings {
    pub anonymized_telemetry: bool,
    pub allow_reset: bool,
}

#[derive(Deserialize)]
struct Heartbeat {
    #[serde(rename = "nanosecond heartbeat")]
    nanos: u64,
}

/// Check a collection name against Chroma's naming rules.
///
/// 3 to 512 characters from `[A-Za-z0-9._-]`, starting and ending with an
/// alphanumeric character.
pub fn validate_collection_name(name: &str) -> Result<(), StoreError> {
    let invalid = |reason: &str| {
        StoreError::connection(STORE, format!("invalid collection name '{name}': {reason}"))
    };

    if !(3..=512).contains(&name.len()) {
        return Err(invalid("must be 3 to 512 characters"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(invalid("only letters, digits, '.', '_' and '-' are allowed"));
    }
    let first = name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
    let last = name.chars().last().is_some_and(|c| c.is_ascii_alphanumeric());
    if !first || !last {
        return Err(invalid("must start and end with a letter or digit"));
    }
    Ok(())
}

/// Live handle to a Chroma server with the report collection ensured.
pub struct ChromaClient {
    http: reqwest::Client,
    base_url: String,
    tenant: String,
    database: String,
    timeout: Duration,
    collection: Collection,
    settings: ChromaSettings,
    session_id: Uuid,
    closed: AtomicBool,
}

impl ChromaClient {
    /// Connect to the server described by `config` and get-or-create its
    /// collection.
    ///
    /// Every failure, including an invalid collection name, is reported as
    /// a connection error.
    pub async fn connect(config: &VectorStoreConfig) -> Result<Self, StoreError> {
        validate_collection_name(&config.collection)?;
        if config.anonymized_telemetry {
            tracing::warn!("anonymized_telemetry is always disabled for Chroma; ignoring config value");
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| StoreError::connection(STORE, format!("failed to build HTTP client: {e}")))?;

        let mut client = Self {
            http,
            base_url: config.base_url(),
            tenant: config.tenant.clone(),
            database: config.database.clone(),
            timeout: config.timeout(),
            collection: Collection {
                id: String::new(),
                name: config.collection.clone(),
                metadata: None,
            },
            settings: ChromaSettings {
                anonymized_telemetry: false,
                allow_reset: config.allow_reset,
            },
            session_id: Uuid::now_v7(),
            closed: AtomicBool::new(false),
        };

        client.heartbeat().await?;
        client.collection = client.get_or_create_collection(&config.collection).await?;

        tracing::info!(
            url = %client.base_url,
            collection = %client.collection.name,
            collection_id = %client.collection.id,
            session = %client.session_id,
            "connected to Chroma"
        );
        Ok(client)
    }

    /// The report collection this client was connected with.
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn settings(&self) -> ChromaSettings {
        self.settings
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Server heartbeat in nanoseconds.
    pub async fn heartbeat(&self) -> Result<u64, StoreError> {
        self.ensure_open()?;
        let response = self
            .http
            .get(format!("{}/api/v2/heartbeat", self.base_url))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::connection(
                STORE,
                format!("heartbeat returned {status}"),
            ));
        }

        let beat: Heartbeat = response
            .json()
            .await
            .map_err(|e| StoreError::connection(STORE, format!("invalid heartbeat response: {e}")))?;
        Ok(beat.nanos)
    }

    /// Number of records in the report collection.
    pub async fn count(&self) -> Result<u64, StoreError> {
        self.ensure_open()?;
        let url = format!("{}/{}/count", self.collections_url(), self.collection.id);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Request(format!("count returned {status}: {body}")));
        }

        response
            .json::<u64>()
            .await
            .map_err(|e| StoreError::Request(format!("invalid count response: {e}")))
    }

    /// Wipe the whole server. Refused locally unless `allow_reset` is set.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.ensure_open()?;
        if !self.settings.allow_reset {
            return Err(StoreError::Request(
                "reset is disabled for this client (allow_reset = false)".to_string(),
            ));
        }

        let response = self
            .http
            .post(format!("{}/api/v2/reset", self.base_url))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Request(format!("reset returned {status}: {body}")));
        }

        tracing::warn!(url = %self.base_url, "Chroma server reset");
        Ok(())
    }

    async fn get_or_create_collection(&self, name: &str) -> Result<Collection, StoreError> {
        match self.get_collection(name).await {
            Ok(collection) => {
                tracing::debug!(collection = name, "using existing collection");
                return Ok(collection);
            }
            Err(e) => tracing::debug!(collection = name, "collection fetch failed ({e}), creating"),
        }

        match self.create_collection(name).await? {
            Some(collection) => {
                tracing::info!(collection = name, "created collection");
                Ok(collection)
            }
            None => {
                tracing::debug!(collection = name, "collection created concurrently, fetching");
                self.get_collection(name).await
            }
        }
    }

    async fn get_collection(&self, name: &str) -> Result<Collection, StoreError> {
        let response = self
            .http
            .get(format!("{}/{name}", self.collections_url()))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::connection(
                STORE,
                format!("fetching collection '{name}' returned {status}: {body}"),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::connection(STORE, format!("invalid collection response: {e}")))
    }

    /// `Ok(None)` means the collection already exists.
    async fn create_collection(&self, name: &str) -> Result<Option<Collection>, StoreError> {
        let body = json!({
            "name": name,
            "metadata": { "description": COLLECTION_DESCRIPTION },
            "get_or_create": false,
        });

        let response = self
            .http
            .post(self.collections_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status.is_success() {
            let collection = response
                .json()
                .await
                .map_err(|e| StoreError::connection(STORE, format!("invalid collection response: {e}")))?;
            return Ok(Some(collection));
        }

        let text = response.text().await.unwrap_or_default();
        if status == StatusCode::CONFLICT || text.to_lowercase().contains("already exists") {
            return Ok(None);
        }

        Err(StoreError::connection(
            STORE,
            format!("creating collection '{name}' returned {status}: {text}"),
        ))
    }

    fn collections_url(&self) -> String {
        format!(
            "{}/api/v2/tenants/{}/databases/{}/collections",
            self.base_url, self.tenant, self.database
        )
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.is_closed() {
            return Err(StoreError::connection(STORE, "client is closed"));
        }
        Ok(())
    }

    fn transport_error(&self, err: reqwest::Error) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout {
                store: STORE,
                after: self.timeout,
            }
        } else {
            StoreError::connection(STORE, format!("{} unreachable: {err}", self.base_url))
        }
    }
}

impl StoreClient for ChromaClient {
    fn session_id(&self) -> Uuid {
        self.session_id
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::info!(session = %self.session_id, "Chroma client closed");
        }
    }
}
