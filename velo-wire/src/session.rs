//! Ties frame I/O, the secure envelope, and the handshake together into
//! the single object higher-level call helpers drive.

use std::io::{Read, Write};

use velo_cert::{PrivateEntity, PublicEntity};
use velo_crypto::CryptoSuite;

use crate::envelope::SecureEnvelope;
use crate::errors::{protocol_error, Stage, VeloError};
use crate::handshake::perform_handshake;
use crate::message::{MessageKind, RequestHeader, ResponseHeader, STATUS_SUCCESS};
use crate::transport::{read_frame, write_frame, DEFAULT_MAX_FRAME_LEN};

/// An established, mutually-authenticated session with the agent.
///
/// Not `Send`/`Sync`: per §5, a session is single-threaded and both IV
/// counters are session-local mutable state that would desynchronize
/// the AEAD stream under concurrent use.
pub struct Session<'s, S: CryptoSuite, T> {
    transport: T,
    envelope: SecureEnvelope<'s, S>,
    max_frame_len: u32,
    extended_api_enabled: bool,
    failed: bool,
}

impl<'s, S: CryptoSuite, T: Read + Write> Session<'s, S, T> {
    /// Perform the handshake over `transport` and return an established
    /// session. `expected_server` pins the server's identity and must be
    /// loaded before calling this.
    pub fn establish(
        transport: T,
        suite: &'s S,
        local: &PrivateEntity,
        expected_server: &PublicEntity,
    ) -> Result<Self, VeloError> {
        Self::establish_with_max_frame_len(transport, suite, local, expected_server, DEFAULT_MAX_FRAME_LEN)
    }

    /// Same as [`Self::establish`] but with an explicit frame-size ceiling.
    pub fn establish_with_max_frame_len(
        mut transport: T,
        suite: &'s S,
        local: &PrivateEntity,
        expected_server: &PublicEntity,
        max_frame_len: u32,
    ) -> Result<Self, VeloError> {
        let result = perform_handshake(&mut transport, suite, local, expected_server, max_frame_len)?;
        let envelope = SecureEnvelope::new(suite, result.shared_secret, result.client_iv, result.server_iv);
        Ok(Self { transport, envelope, max_frame_len, extended_api_enabled: false, failed: false })
    }

    /// The current client→server IV.
    pub fn client_iv(&self) -> u64 {
        self.envelope.client_iv()
    }

    /// The current server→client IV.
    pub fn server_iv(&self) -> u64 {
        self.envelope.server_iv()
    }

    /// Whether [`Self::enable_extended_api`] has been called successfully.
    pub fn extended_api_enabled(&self) -> bool {
        self.extended_api_enabled
    }

    /// Marks the session as extended-API-enabled once the
    /// `EXTENDED_API_ENABLE` call has succeeded. Called by the higher-level
    /// client after [`Self::call`] confirms the agent accepted it.
    pub fn mark_extended_api_enabled(&mut self) {
        self.extended_api_enabled = true;
    }

    /// Whether a fatal envelope error (per §8, a MAC verification
    /// failure) has already torn down this session. Once `true`, every
    /// `call`/`send_raw`/`recv_raw` fails fast with
    /// [`VeloError::SessionClosed`] instead of touching the transport.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    fn check_not_failed(&self) -> Result<(), VeloError> {
        if self.failed {
            return Err(VeloError::SessionClosed);
        }
        Ok(())
    }

    /// Run the full §4.6 recipe for one request/response exchange: seal
    /// and send `body` (the kind-specific fields only; the request id and
    /// `sent_offset` are prepended here) tagged as `kind`, receive and
    /// open the response, and validate the `(request_id, offset, status)`
    /// triad against `kind` and `sent_offset` before returning the
    /// remaining response body.
    pub fn call(&mut self, kind: MessageKind, sent_offset: u32, body: &[u8]) -> Result<Vec<u8>, VeloError> {
        self.check_not_failed()?;

        let header = RequestHeader { request_id: kind.request_id(), offset: sent_offset };
        let mut framed = Vec::with_capacity(8 + body.len());
        header.encode(&mut framed).expect("writing to a Vec never fails");
        framed.extend_from_slice(body);

        self.send_raw(kind, &framed).map_err(|_| protocol_error(kind, Stage::Send))?;

        let frame = read_frame(&mut self.transport, self.max_frame_len)
            .map_err(|_| protocol_error(kind, Stage::Recv))?;
        let (_tag, plaintext) = self.envelope.open(&frame).inspect_err(|_| self.failed = true)?;

        let (header, rest) = ResponseHeader::decode(&plaintext)
            .map_err(|_| protocol_error(kind, Stage::DecodeHeader))?;
        if header.request_id != kind.request_id() {
            return Err(protocol_error(
                kind,
                Stage::WrongRequestId { got: header.request_id, expected: kind.request_id() },
            ));
        }
        if header.offset != sent_offset {
            return Err(protocol_error(
                kind,
                Stage::OffsetMismatch { got: header.offset, expected: sent_offset },
            ));
        }
        if header.status != STATUS_SUCCESS {
            return Err(protocol_error(kind, Stage::NonZeroStatus { status: header.status }));
        }
        Ok(rest.to_vec())
    }

    /// Seal and send `body` tagged as `kind` without waiting for or
    /// validating a response. Used by the extended-API pattern (§4.8),
    /// where the recv loop dispatches on `request_id` instead of
    /// correlating replies to a single outstanding send.
    pub fn send_raw(&mut self, kind: MessageKind, body: &[u8]) -> Result<(), VeloError> {
        self.check_not_failed()?;
        let wire = self.envelope.seal(kind, body).inspect_err(|_| self.failed = true)?;
        write_frame(&mut self.transport, &wire)?;
        Ok(())
    }

    /// Receive and open the next message without validating its header
    /// against any expectation. Used by the extended-API pattern, where
    /// a `CLIENTREQ` can arrive unsolicited.
    pub fn recv_raw(&mut self) -> Result<(ResponseHeader, Vec<u8>), VeloError> {
        self.check_not_failed()?;
        let frame = read_frame(&mut self.transport, self.max_frame_len)?;
        let (_tag, plaintext) = self.envelope.open(&frame).inspect_err(|_| self.failed = true)?;
        let (header, rest) = ResponseHeader::decode(&plaintext).map_err(|e| VeloError::HeaderDecode { len: e.len })?;
        Ok((header, rest.to_vec()))
    }
}
