//! Process-wide suite registration.
//!
//! The protocol identifies a crypto suite by name during the handshake
//! rather than by Rust type, so both ends can confirm they agree on the
//! same primitive bundle before deriving any key material. This module
//! holds the one suite this crate ships and makes it available under
//! that name.

use std::sync::OnceLock;

use crate::velo_v1::VeloSuiteV1;

static VELO_V1: OnceLock<VeloSuiteV1> = OnceLock::new();

/// Register and return the default `velo-suite-v1` crypto suite.
///
/// Idempotent: repeated calls return a reference to the same instance.
pub fn register_velo_v1() -> &'static VeloSuiteV1 {
    VELO_V1.get_or_init(VeloSuiteV1::default)
}

/// Look up a suite implementation by the name it was negotiated under.
///
/// Only `velo-suite-v1` is known to this crate; callers speaking to a
/// peer that named anything else should fail the handshake before
/// calling this.
///
/// Returns the concrete suite type rather than `&dyn CryptoSuite`:
/// `CryptoSuite` carries associated constants, which makes it not
/// object-safe.
pub fn suite_by_name(name: &str) -> Option<&'static VeloSuiteV1> {
    match name {
        VeloSuiteV1::NAME => Some(register_velo_v1()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_name_resolves() {
        assert!(suite_by_name(VeloSuiteV1::NAME).is_some());
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(suite_by_name("not-a-real-suite").is_none());
    }

    #[test]
    fn registration_is_idempotent() {
        let a = register_velo_v1() as *const VeloSuiteV1;
        let b = register_velo_v1() as *const VeloSuiteV1;
        assert_eq!(a, b);
    }
}
