// crates/backend-lib/src/handlers/mod.rs

//! HTTP handlers for the `CalBook` backend.

pub mod users;
