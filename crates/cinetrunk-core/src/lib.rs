//! Core types and trait definitions for CineTrunk.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod activity;
pub mod error;
pub mod identity;
pub mod list;
pub mod movie;
pub mod review;
pub mod store;

pub use error::{Error, Result};
