// Postgres storage layer with sqlx
//
// This crate provides `TaskStore` implementations:
// - PgTaskStore: durable task records in Postgres
// - InMemoryTaskStore: map-backed store for tests and local runs

pub mod memory;
pub mod models;
pub mod pg;

pub use memory::InMemoryTaskStore;
pub use models::TaskRow;
pub use pg::PgTaskStore;
