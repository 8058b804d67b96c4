//! Store client port shared by the vector and graph clients.

use uuid::Uuid;

/// A connected store client handed out by a [`ClientSlot`](super::slot::ClientSlot).
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in ufdr-infra.
pub trait StoreClient: Send + Sync {
    /// Identity of this connection; a reconnect yields a new id.
    fn session_id(&self) -> Uuid;

    /// Release the underlying connection. Calling it twice is a no-op.
    fn close(&self) -> impl std::future::Future<Output = ()> + Send;
}
