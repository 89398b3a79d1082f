//! The error taxonomy for everything below the higher-level call helpers:
//! transport, handshake, and envelope failures, plus the per-helper
//! protocol-discipline violations from §4.6.

use std::fmt;
use std::io;

use velo_crypto::CryptoError;

use crate::message::MessageKind;

/// Which step of the request/response recipe (§4.6) failed.
///
/// The original implementation assigns a distinct numeric status code to
/// each (helper, stage) pair; here the stage and the offending
/// [`MessageKind`] are carried as fields of one error instead of being
/// fanned out into dozens of near-identical variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Send,
    Recv,
    DecodeHeader,
    WrongRequestId { got: u32, expected: u32 },
    NonZeroStatus { status: u32 },
    OffsetMismatch { got: u32, expected: u32 },
    DecodeBody,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Send => write!(f, "send failed"),
            Self::Recv => write!(f, "recv failed"),
            Self::DecodeHeader => write!(f, "header decode failed"),
            Self::WrongRequestId { got, expected } => {
                write!(f, "wrong request_id: got {got}, expected {expected}")
            }
            Self::NonZeroStatus { status } => write!(f, "non-zero status {status}"),
            Self::OffsetMismatch { got, expected } => {
                write!(f, "offset mismatch: got {got}, expected {expected}")
            }
            Self::DecodeBody => write!(f, "body decode failed"),
        }
    }
}

/// Which step of the four-step handshake (§4.4) failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandshakeStage {
    SendRequest,
    RecvResponse,
    DecodeResponse,
    VerifyMac,
    VerifySignature,
    ServerIdMismatch,
    ServerKeyMismatch,
    SendAck,
    RecvAck,
    DecodeAck,
    AckWrongRequestId,
    AckNonZeroStatus,
}

impl fmt::Display for HandshakeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SendRequest => "send handshake request",
            Self::RecvResponse => "recv handshake response",
            Self::DecodeResponse => "decode handshake response",
            Self::VerifyMac => "verify response MAC",
            Self::VerifySignature => "verify server signature",
            Self::ServerIdMismatch => "server id mismatch",
            Self::ServerKeyMismatch => "server public key mismatch",
            Self::SendAck => "send handshake acknowledgement",
            Self::RecvAck => "recv acknowledgement response",
            Self::DecodeAck => "decode acknowledgement response",
            Self::AckWrongRequestId => "acknowledgement wrong request_id",
            Self::AckNonZeroStatus => "acknowledgement non-zero status",
        };
        write!(f, "{s}")
    }
}

/// The top-level error type for anything below the higher-level helpers.
#[derive(Debug)]
pub enum VeloError {
    /// A transport-level I/O failure (connect, short read/write, EOF).
    Io(io::Error),
    /// Handshake failed at `stage`.
    Handshake { stage: HandshakeStage, detail: Option<String> },
    /// The secure envelope's MAC failed to verify. Fatal: the session
    /// must be treated as a potential active attack and torn down.
    EnvelopeMacFail,
    /// An IV counter would wrap. Treated as unreachable in practice.
    IvOverflow,
    /// A higher-level call violated the request/response envelope
    /// discipline of §4.6.
    Protocol { kind: MessageKind, stage: Stage },
    /// A decrypted payload was too short to carry a header, with no
    /// expected [`MessageKind`] yet known (e.g. an extended-API recv
    /// loop dispatching on `request_id` before it knows what arrived).
    HeaderDecode { len: usize },
    /// The session was already closed or failed and cannot be reused.
    SessionClosed,
}

impl From<io::Error> for VeloError {
    fn from(source: io::Error) -> Self {
        Self::Io(source)
    }
}

impl From<CryptoError> for VeloError {
    fn from(source: CryptoError) -> Self {
        match source {
            CryptoError::MacMismatch => Self::EnvelopeMacFail,
            other => Self::Handshake { stage: HandshakeStage::VerifyMac, detail: Some(other.to_string()) },
        }
    }
}

impl std::error::Error for VeloError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(source) => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for VeloError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(source) => write!(f, "transport error: {source}"),
            Self::Handshake { stage, detail } => match detail {
                Some(detail) => write!(f, "handshake failed at {stage}: {detail}"),
                None => write!(f, "handshake failed at {stage}"),
            },
            Self::EnvelopeMacFail => write!(f, "envelope MAC verification failed"),
            Self::IvOverflow => write!(f, "IV counter overflow"),
            Self::Protocol { kind, stage } => write!(f, "{kind:?}: {stage}"),
            Self::HeaderDecode { len } => write!(f, "response body too short for header: {len} bytes"),
            Self::SessionClosed => write!(f, "session is closed"),
        }
    }
}

/// Shorthand for constructing a [`VeloError::Protocol`].
pub fn protocol_error(kind: MessageKind, stage: Stage) -> VeloError {
    VeloError::Protocol { kind, stage }
}
