//! Embedding logic and store-client ports for the UFDR assistant.
//!
//! This crate defines the "ports" (encoder, image resolver, store client)
//! that the infrastructure layer implements, plus the logic that sits on
//! top of them: normalization, the text/image façades and the lazily
//! constructed client slots. It depends only on `ufdr-types` -- never on
//! `ufdr-infra` or any model/database crate.

pub mod embedding;
pub mod store;
