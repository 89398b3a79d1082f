//! `VeloSuiteV1`: the concrete suite shipped with this crate.
//!
//! Key agreement and signatures both run over secp256k1; AEAD framing
//! follows the same per-message-subkey shape the Lightning Network
//! Noise handshake uses, built on `chacha20-poly1305-aead`.

use byteorder::{BigEndian, ByteOrder};
use hkdf::Hkdf;
use sha2::Sha256;

use secp256k1::ecdh::SharedSecret;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

use crate::error::CryptoError;
use crate::suite::CryptoSuite;

/// Zero nonce used for AEAD framing: the per-message subkey derived in
/// [`VeloSuiteV1::aead_seal`]/[`VeloSuiteV1::aead_open`] is unique per
/// `iv`, so the cipher nonce itself never needs to vary.
const ZERO_NONCE: [u8; 12] = [0; 12];

/// The default velo crypto suite: secp256k1 ECDH + ECDSA, ChaCha20-Poly1305
/// AEAD with HKDF-SHA256 per-message subkeys.
#[derive(Default, Clone, Copy)]
pub struct VeloSuiteV1;

impl VeloSuiteV1 {
    /// Human readable name under which this suite registers itself.
    pub const NAME: &'static str = "velo-suite-v1";

    fn random_secret_key(&self) -> Result<SecretKey, CryptoError> {
        let mut bytes = [0u8; 32];
        for _ in 0..8 {
            self.prng_fill(&mut bytes)?;
            if let Ok(sk) = SecretKey::from_slice(&bytes) {
                return Ok(sk);
            }
        }
        Err(CryptoError::RngFailure)
    }

    fn subkey(shared_secret: &[u8], iv: u64) -> [u8; 32] {
        let mut iv_bytes = [0u8; 8];
        BigEndian::write_u64(&mut iv_bytes, iv);
        let hkdf = Hkdf::<Sha256>::extract(Some(&iv_bytes), shared_secret);
        let mut out = [0u8; 32];
        hkdf.expand(b"velo-envelope-subkey", &mut out)
            .expect("32 is a valid HKDF-SHA256 output length");
        out
    }
}

impl CryptoSuite for VeloSuiteV1 {
    const NONCE: usize = 12;
    const KEY: usize = 32;
    const MAC: usize = 16;
    const SIGKEY: usize = 32;
    const ENCKEY: usize = 32;
    const HASH: usize = 32;

    fn prng_fill(&self, buf: &mut [u8]) -> Result<(), CryptoError> {
        getrandom::getrandom(buf).map_err(|_| CryptoError::RngFailure)
    }

    fn generate_enc_keypair(&self) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        let sk = self.random_secret_key()?;
        let secp = Secp256k1::new();
        let pk = PublicKey::from_secret_key(&secp, &sk);
        Ok((sk.secret_bytes().to_vec(), pk.serialize().to_vec()))
    }

    fn generate_sig_keypair(&self) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        self.generate_enc_keypair()
    }

    fn kex(
        &self,
        local_private: &[u8],
        remote_public: &[u8],
        local_nonce: &[u8],
        remote_nonce: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let sk = SecretKey::from_slice(local_private)
            .map_err(|_| CryptoError::InvalidKeyMaterial { what: "local private key" })?;
        let pk = PublicKey::from_slice(remote_public)
            .map_err(|_| CryptoError::InvalidKeyMaterial { what: "remote public key" })?;
        let point_secret = SharedSecret::new(&pk, &sk);

        // Nonces are ordered independently of which side is "local", so
        // both ends of a handshake derive the identical salt.
        let (nonce_lo, nonce_hi) = if local_nonce <= remote_nonce {
            (local_nonce, remote_nonce)
        } else {
            (remote_nonce, local_nonce)
        };
        let mut salt = Vec::with_capacity(nonce_lo.len() + nonce_hi.len());
        salt.extend_from_slice(nonce_lo);
        salt.extend_from_slice(nonce_hi);

        let hkdf = Hkdf::<Sha256>::extract(Some(&salt), point_secret.as_ref());
        let mut shared_secret = vec![0u8; Self::HASH];
        hkdf.expand(b"velo-kex", &mut shared_secret)
            .expect("HASH is a valid HKDF-SHA256 output length");
        Ok(shared_secret)
    }

    fn aead_seal(
        &self,
        shared_secret: &[u8],
        iv: u64,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let key = Self::subkey(shared_secret, iv);
        let mut sealed = Vec::with_capacity(plaintext.len() + Self::MAC);
        let tag = chacha20_poly1305_aead::encrypt(&key, &ZERO_NONCE, &[], plaintext, &mut sealed)
            .map_err(|_| CryptoError::SealFailure)?;
        sealed.extend_from_slice(&tag);
        Ok(sealed)
    }

    fn aead_open(
        &self,
        shared_secret: &[u8],
        iv: u64,
        sealed: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        if sealed.len() < Self::MAC {
            return Err(CryptoError::MacMismatch);
        }
        let (ciphertext, tag) = sealed.split_at(sealed.len() - Self::MAC);
        let mut tag_buf = [0u8; 16];
        tag_buf.copy_from_slice(tag);

        let key = Self::subkey(shared_secret, iv);
        let mut plaintext = Vec::with_capacity(ciphertext.len());
        chacha20_poly1305_aead::decrypt(&key, &ZERO_NONCE, &[], ciphertext, &tag_buf, &mut plaintext)
            .map_err(|_| CryptoError::MacMismatch)?;
        Ok(plaintext)
    }

    fn sign(&self, private_sigkey: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let sk = SecretKey::from_slice(private_sigkey)
            .map_err(|_| CryptoError::InvalidKeyMaterial { what: "signing key" })?;
        let digest = sha256(message);
        let msg = Message::from_digest_slice(&digest)
            .map_err(|_| CryptoError::SignFailure)?;
        let secp = Secp256k1::new();
        let sig = secp.sign_ecdsa(&msg, &sk);
        Ok(sig.serialize_compact().to_vec())
    }

    fn verify_sig(
        &self,
        public_sigkey: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), CryptoError> {
        let pk = PublicKey::from_slice(public_sigkey)
            .map_err(|_| CryptoError::InvalidKeyMaterial { what: "verification key" })?;
        let digest = sha256(message);
        let msg = Message::from_digest_slice(&digest)
            .map_err(|_| CryptoError::InvalidSignature)?;
        let sig = secp256k1::ecdsa::Signature::from_compact(signature)
            .map_err(|_| CryptoError::InvalidSignature)?;
        let secp = Secp256k1::new();
        secp.verify_ecdsa(&msg, &sig, &pk)
            .map_err(|_| CryptoError::InvalidSignature)
    }
}

fn sha256(data: &[u8]) -> [u8; 32] {
    use sha2::Digest;
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}
