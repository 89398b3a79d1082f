//! Per-message encrypt/MAC on send, MAC-verify/decrypt on receive (§4.5).

use velo_crypto::CryptoSuite;

use crate::errors::VeloError;
use crate::message::MessageKind;

/// Wraps a shared secret and the two directional IV counters it keys.
///
/// `client_iv` advances on every successful [`Self::seal`]; `server_iv`
/// advances on every successful [`Self::open`]. The two counters are
/// never shared across directions.
pub struct SecureEnvelope<'s, S: CryptoSuite> {
    suite: &'s S,
    shared_secret: Vec<u8>,
    client_iv: u64,
    server_iv: u64,
}

impl<'s, S: CryptoSuite> SecureEnvelope<'s, S> {
    /// Build an envelope from a handshake-established shared secret and
    /// the IVs the handshake left the session at (both 1, per §4.4 step 3).
    pub fn new(suite: &'s S, shared_secret: Vec<u8>, client_iv: u64, server_iv: u64) -> Self {
        Self { suite, shared_secret, client_iv, server_iv }
    }

    /// The current client→server IV.
    pub fn client_iv(&self) -> u64 {
        self.client_iv
    }

    /// The current server→client IV.
    pub fn server_iv(&self) -> u64 {
        self.server_iv
    }

    /// Seal `plaintext` into a complete post-handshake wire message:
    /// `u8 type || aead_seal(subkey, client_iv, plaintext)`.
    ///
    /// Advances `client_iv` on success.
    pub fn seal(&mut self, kind: MessageKind, plaintext: &[u8]) -> Result<Vec<u8>, VeloError> {
        let sealed = self.suite.aead_seal(&self.shared_secret, self.client_iv, plaintext)?;
        self.client_iv = self.client_iv.checked_add(1).ok_or(VeloError::IvOverflow)?;

        let mut message = Vec::with_capacity(1 + sealed.len());
        message.push(kind.wire_tag());
        message.extend_from_slice(&sealed);
        Ok(message)
    }

    /// Open a complete post-handshake wire message, returning the wire
    /// tag byte and the decrypted payload.
    ///
    /// Advances `server_iv` on success. A MAC failure is surfaced as
    /// [`VeloError::EnvelopeMacFail`] and must be treated as fatal by the
    /// caller — this method does not itself mark anything failed.
    pub fn open(&mut self, wire_message: &[u8]) -> Result<(u8, Vec<u8>), VeloError> {
        let (tag, sealed) = wire_message
            .split_first()
            .ok_or(VeloError::EnvelopeMacFail)?;
        let plaintext = self.suite.aead_open(&self.shared_secret, self.server_iv, sealed)?;
        self.server_iv = self.server_iv.checked_add(1).ok_or(VeloError::IvOverflow)?;
        Ok((*tag, plaintext))
    }
}

impl<'s, S: CryptoSuite> Drop for SecureEnvelope<'s, S> {
    fn drop(&mut self) {
        self.shared_secret.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use velo_crypto::VeloSuiteV1;

    #[test]
    fn seal_open_roundtrip_advances_ivs() {
        let suite = VeloSuiteV1;
        let shared = vec![3u8; VeloSuiteV1::HASH];
        let mut client_side = SecureEnvelope::new(&suite, shared.clone(), 1, 1);
        let mut server_side = SecureEnvelope::new(&suite, shared, 1, 1);

        let wire = client_side.seal(MessageKind::StatusGet, b"").unwrap();
        assert_eq!(client_side.client_iv(), 2);

        let (tag, plaintext) = server_side.open(&wire).unwrap();
        assert_eq!(tag, MessageKind::StatusGet.wire_tag());
        assert!(plaintext.is_empty());
        assert_eq!(server_side.server_iv(), 2);
    }

    #[test]
    fn tamper_is_caught_as_mac_failure() {
        let suite = VeloSuiteV1;
        let shared = vec![9u8; VeloSuiteV1::HASH];
        let mut sender = SecureEnvelope::new(&suite, shared.clone(), 1, 1);
        let mut receiver = SecureEnvelope::new(&suite, shared, 1, 1);

        let mut wire = sender.seal(MessageKind::Close, b"payload").unwrap();
        let last = wire.len() - 1;
        wire[last] ^= 0x01;

        match receiver.open(&wire) {
            Err(VeloError::EnvelopeMacFail) => {}
            other => panic!("expected EnvelopeMacFail, got {other:?}"),
        }
    }

    #[test]
    fn mismatched_iv_is_caught_as_mac_failure() {
        let suite = VeloSuiteV1;
        let shared = vec![1u8; VeloSuiteV1::HASH];
        let mut sender = SecureEnvelope::new(&suite, shared.clone(), 5, 1);
        let mut receiver = SecureEnvelope::new(&suite, shared, 1, 1);

        let wire = sender.seal(MessageKind::StatusGet, b"x").unwrap();
        assert!(receiver.open(&wire).is_err());
    }
}
