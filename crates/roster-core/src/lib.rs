//! Core types and trait definitions for the Roster person store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

// We intentionally use native `async fn` in traits.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod face;
pub mod history;
pub mod person;
pub mod store;

pub use error::{Error, Result};
