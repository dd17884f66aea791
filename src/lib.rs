//! An item tracking web service with axum.
//!
//! Items are created, read, updated and deleted over a JSON REST API under `/api`.
//! Every request runs inside one unit of work against either Postgres or an
//! in-memory store.

pub mod feature;
pub mod infra;
pub mod server;
