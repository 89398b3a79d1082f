//! Entity identity: an artifact id plus signing and encryption keys.

use std::fmt;

/// A 128-bit artifact identifier, printed in the usual dashed UUID form.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactId(pub [u8; 16]);

impl fmt::Debug for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArtifactId({self})")
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        write!(
            f,
            "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
            b[8], b[9], b[10], b[11], b[12], b[13], b[14], b[15],
        )
    }
}

/// The public half of an entity's identity: what a peer needs to verify
/// signatures from this entity and to key-agree with it.
#[derive(Clone)]
pub struct PublicEntity {
    pub(crate) artifact_id: ArtifactId,
    pub(crate) sig_pub: Vec<u8>,
    pub(crate) enc_pub: Vec<u8>,
    pub(crate) signature: Vec<u8>,
}

impl PublicEntity {
    /// Build a public entity from its parts, e.g. when issuing a fresh
    /// certificate or constructing a fixture for a test.
    pub fn new(artifact_id: ArtifactId, sig_pub: Vec<u8>, enc_pub: Vec<u8>, signature: Vec<u8>) -> Self {
        Self { artifact_id, sig_pub, enc_pub, signature }
    }

    /// This entity's artifact id.
    pub fn artifact_id(&self) -> ArtifactId {
        self.artifact_id
    }

    /// The public signing key, used to verify messages from this entity.
    pub fn signing_key(&self) -> &[u8] {
        &self.sig_pub
    }

    /// The public encryption key, used as our peer's half of [`velo_crypto::CryptoSuite::kex`].
    pub fn encryption_key(&self) -> &[u8] {
        &self.enc_pub
    }

    /// The opaque signature covering this certificate's fields, as issued
    /// by whatever authority signed it. This crate does not walk a trust
    /// chain; callers that need one verify it themselves.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

impl fmt::Debug for PublicEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicEntity")
            .field("artifact_id", &self.artifact_id)
            .finish_non_exhaustive()
    }
}

/// The private half of an entity's identity: the public certificate plus
/// the matching private keys. Only an entity itself should ever hold one
/// of these.
pub struct PrivateEntity {
    pub(crate) public: PublicEntity,
    pub(crate) sig_priv: Vec<u8>,
    pub(crate) enc_priv: Vec<u8>,
}

impl PrivateEntity {
    /// Build a private entity from a public certificate and the matching
    /// private keys.
    pub fn new(public: PublicEntity, sig_priv: Vec<u8>, enc_priv: Vec<u8>) -> Self {
        Self { public, sig_priv, enc_priv }
    }

    /// The public certificate embedded in this private one.
    pub fn public(&self) -> &PublicEntity {
        &self.public
    }

    /// This entity's artifact id.
    pub fn artifact_id(&self) -> ArtifactId {
        self.public.artifact_id
    }

    /// The private signing key.
    pub fn signing_key(&self) -> &[u8] {
        &self.sig_priv
    }

    /// The private encryption key.
    pub fn encryption_key(&self) -> &[u8] {
        &self.enc_priv
    }
}

impl fmt::Debug for PrivateEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateEntity")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

impl Drop for PrivateEntity {
    fn drop(&mut self) {
        self.sig_priv.fill(0);
        self.enc_priv.fill(0);
    }
}
