//! Cryptographic suite facade for the velo protocol.
//!
//! This crate fixes primitive *roles* and sizes ([`CryptoSuite`]'s
//! associated constants) but keeps the concrete algorithms opaque behind
//! the trait. [`VeloSuiteV1`] is the one suite shipped here; peers
//! negotiate it by name via [`register_velo_v1`].
#![deny(unsafe_code)]

mod error;
mod registry;
mod suite;
mod velo_v1;

pub use error::CryptoError;
pub use registry::{register_velo_v1, suite_by_name};
pub use suite::CryptoSuite;
pub use velo_v1::VeloSuiteV1;
