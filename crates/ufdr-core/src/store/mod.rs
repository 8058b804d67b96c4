//! Store client lifecycle: the client port and the lazy singleton slot.

pub mod client;
pub mod slot;

pub use client::StoreClient;
pub use slot::ClientSlot;
