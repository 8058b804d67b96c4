//! Graph store infrastructure.

pub mod neo4j;

pub use neo4j::Neo4jClient;
