//! Disposable backend containers for integration tests.
//!
//! Every fixture needs a running Docker daemon. Tests that use them are
//! marked `#[ignore]` and run with `cargo test -- --ignored`.

pub mod error;
pub mod postgres;
pub mod redis;

pub use error::{Result, TestInfraError};
