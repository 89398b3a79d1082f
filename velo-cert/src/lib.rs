//! Entity certificate loading for the velo protocol.
//!
//! A certificate file binds an artifact id to a signing keypair and an
//! encryption keypair; a private certificate additionally carries the
//! private halves. This crate treats the file's signature as opaque
//! bytes — it reads and writes it, but does not itself walk a trust
//! chain to validate it.
#![deny(unsafe_code)]

mod codec;
mod entity;
mod error;
mod store;

pub use entity::{ArtifactId, PrivateEntity, PublicEntity};
pub use error::{CertError, Role};
pub use store::{load_private_cert, load_public_cert, save_private_cert, save_public_cert};
