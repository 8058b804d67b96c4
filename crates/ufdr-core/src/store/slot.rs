//! ClientSlot -- lazily constructed, process-shared store client.
//!
//! The slot lock is held across construction, so concurrent first callers
//! wait for a single connect attempt and then share its result. A failed
//! construction leaves the slot empty and the next caller tries again.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::client::StoreClient;

/// Holds at most one live client of type `C`.
pub struct ClientSlot<C> {
    name: &'static str,
    inner: Mutex<Option<Arc<C>>>,
}

impl<C: StoreClient> ClientSlot<C> {
    /// Create an empty slot. `name` is used in logs only.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Mutex::new(None),
        }
    }

    /// Return the live client, constructing it with `init` if the slot is empty.
    ///
    /// Construction errors are returned to the caller unchanged; nothing is
    /// stored on failure.
    pub async fn get_or_try_init<F, Fut, E>(&self, init: F) -> Result<Arc<C>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C, E>>,
    {
        let mut guard = self.inner.lock().await;
        if let Some(client) = guard.as_ref() {
            return Ok(Arc::clone(client));
        }

        tracing::debug!(slot = self.name, "constructing client");
        let client = Arc::new(init().await?);
        *guard = Some(Arc::clone(&client));
        Ok(client)
    }

    /// The live client, if one has been constructed.
    pub async fn current(&self) -> Option<Arc<C>> {
        self.inner.lock().await.as_ref().map(Arc::clone)
    }

    /// Close the live client (if any) and empty the slot.
    ///
    /// Returns `true` when a client was closed.
    pub async fn close(&self) -> bool {
        let mut guard = self.inner.lock().await;
        match guard.take() {
            Some(client) => {
                client.close().await;
                tracing::debug!(slot = self.name, session = %client.session_id(), "client closed");
                true
            }
            None => false,
        }
    }
}
