//! The `CryptoSuite` trait: a referentially opaque facade over the
//! primitives the protocol needs. Callers depend only on the trait and
//! the sizes it names; [`crate::VeloSuiteV1`] is one concrete instance,
//! registered under a name so peers can agree on which suite they speak.

use crate::error::CryptoError;

/// A negotiable bundle of primitives: key agreement, AEAD, and signatures.
///
/// Implementors fix concrete algorithms; callers must not assume anything
/// beyond the sizes exposed as associated constants.
pub trait CryptoSuite {
    /// Size in bytes of a handshake nonce.
    const NONCE: usize;
    /// Size in bytes of a derived AEAD key.
    const KEY: usize;
    /// Size in bytes of an AEAD authentication tag.
    const MAC: usize;
    /// Size in bytes of a signing key (public or private).
    const SIGKEY: usize;
    /// Size in bytes of an encryption key used for key agreement.
    const ENCKEY: usize;
    /// Size in bytes of a hash digest.
    const HASH: usize;

    /// Fill `buf` with cryptographically secure random bytes.
    fn prng_fill(&self, buf: &mut [u8]) -> Result<(), CryptoError>;

    /// Generate an encryption keypair used for [`Self::kex`].
    ///
    /// Returns `(private, public)`, each of length [`Self::ENCKEY`] and
    /// [`Self::ENCKEY`] respectively for this suite (a compressed point
    /// may be longer; callers must only rely on `Self::ENCKEY` as the
    /// private scalar size).
    fn generate_enc_keypair(&self) -> Result<(Vec<u8>, Vec<u8>), CryptoError>;

    /// Generate a signing keypair. Returns `(private, public)`.
    fn generate_sig_keypair(&self) -> Result<(Vec<u8>, Vec<u8>), CryptoError>;

    /// Derive a shared secret from our private encryption key, the
    /// peer's public encryption key, and both sides' handshake nonces.
    /// Symmetric in the two nonces: calling this from either side of a
    /// handshake (with `local`/`remote` swapped accordingly) yields the
    /// same output. The output is [`Self::HASH`] bytes.
    fn kex(
        &self,
        local_private: &[u8],
        remote_public: &[u8],
        local_nonce: &[u8],
        remote_nonce: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    /// Seal `plaintext`, deriving a fresh per-message subkey from
    /// `shared_secret` and the monotonic `iv` counter. Returns ciphertext
    /// with the authentication tag appended.
    fn aead_seal(
        &self,
        shared_secret: &[u8],
        iv: u64,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    /// Inverse of [`Self::aead_seal`]. Fails with
    /// [`CryptoError::MacMismatch`] on any tampering, truncation, or
    /// counter mismatch.
    fn aead_open(
        &self,
        shared_secret: &[u8],
        iv: u64,
        sealed: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    /// Sign `message` under `private_sigkey`. Used only by the in-crate
    /// test stub server; real deployments load signatures from a
    /// certificate store instead of signing live.
    fn sign(&self, private_sigkey: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Verify `signature` over `message` under `public_sigkey`.
    fn verify_sig(
        &self,
        public_sigkey: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), CryptoError>;
}
