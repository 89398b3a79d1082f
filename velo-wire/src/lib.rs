//! Frame I/O, handshake, and secure envelope for the velo protocol.
//!
//! This crate owns everything below the higher-level call helpers:
//! length-prefixed framing, the four-step handshake, per-message AEAD
//! sealing keyed by directional IV counters, and the request/response
//! envelope discipline every helper must follow.
#![deny(unsafe_code)]

pub mod envelope;
pub mod errors;
pub mod handshake;
pub mod message;
pub mod serialize;
pub mod session;
pub mod transport;
pub mod util;

pub use envelope::SecureEnvelope;
pub use errors::{HandshakeStage, Stage, VeloError};
pub use handshake::{perform_handshake, HandshakeResult};
pub use message::{MessageKind, RequestHeader, ResponseHeader, HEADER_LEN, REQUEST_HEADER_LEN, STATUS_SUCCESS};
pub use session::Session;
pub use transport::{read_frame, write_frame, DEFAULT_MAX_FRAME_LEN};
