//! Core types and trait definitions for the Rollbook enrollment engine.
//!
//! This crate is deliberately free of database and CLI dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod bulk;
pub mod enrollment;
pub mod error;
pub mod grade;
pub mod role;
pub mod space;
pub mod store;
pub mod subject;

pub use error::{Error, Result};
