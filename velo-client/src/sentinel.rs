//! The extended-API pattern (§4.8): a Sentinel services verbs for a
//! Caller through the agent once `EXTENDED_API_ENABLE` has been issued.

use std::collections::HashMap;
use std::io::{Read, Write};

use velo_crypto::CryptoSuite;
use velo_wire::errors::{protocol_error, Stage};
use velo_wire::message::MessageKind;
use velo_wire::serialize::{self, ClientreqBody, SendrecvRequest, SendrespRequest};
use velo_wire::VeloError;

use crate::client::{decode_body, VeloClient};

/// ASCII `"PING"`, zero-padded to a 16-byte verb id.
pub const PING_VERB_ID: [u8; 16] = [
    0x50, 0x49, 0x4e, 0x47, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

type Handler = Box<dyn FnMut(Vec<u8>) -> Vec<u8> + Send>;

/// Services `EXTENDED_API_CLIENTREQ` messages as they arrive, dispatching
/// on `verb_id` to a registered handler and replying with `SENDRESP`.
///
/// Per §4.8, once extended API is enabled the recv loop routes on
/// `request_id` rather than the client's own sent offset — a Sentinel
/// never drives the exchange, it only answers what arrives.
pub struct Sentinel<'s, S: CryptoSuite, T> {
    client: VeloClient<'s, S, T>,
    handlers: HashMap<[u8; 16], Handler>,
}

impl<'s, S: CryptoSuite, T: Read + Write> Sentinel<'s, S, T> {
    /// Enables extended API on `client` (if not already enabled) and
    /// returns a Sentinel ready to register handlers.
    pub fn new(mut client: VeloClient<'s, S, T>) -> Result<Self, VeloError> {
        if !client.extended_api_enabled() {
            client.enable_extended_api()?;
        }
        Ok(Self { client, handlers: HashMap::new() })
    }

    /// Registers a handler for `verb_id`. The handler receives the
    /// request payload and returns the response payload.
    pub fn register_handler(&mut self, verb_id: [u8; 16], handler: impl FnMut(Vec<u8>) -> Vec<u8> + Send + 'static) {
        self.handlers.insert(verb_id, Box::new(handler));
    }

    /// Blocks for the next `CLIENTREQ`, dispatches it, and sends the
    /// matching `SENDRESP`. Returns an error (without a reply sent) if
    /// no handler is registered for the request's `verb_id`.
    pub fn serve_one(&mut self) -> Result<(), VeloError> {
        let (header, body) = self.client.session_mut().recv_raw()?;
        if header.request_id != MessageKind::ExtendedApiClientreq.request_id() {
            return Err(protocol_error(
                MessageKind::ExtendedApiClientreq,
                Stage::WrongRequestId {
                    got: header.request_id,
                    expected: MessageKind::ExtendedApiClientreq.request_id(),
                },
            ));
        }

        let request: ClientreqBody =
            decode_body(MessageKind::ExtendedApiClientreq, serialize::decode_clientreq(&body))?;

        let handler = self.handlers.get_mut(&request.verb_id).ok_or_else(|| {
            protocol_error(MessageKind::ExtendedApiClientreq, Stage::DecodeBody)
        })?;
        let response_payload = handler(request.payload);

        let response = serialize::encode_sendresp_request(&SendrespRequest {
            offset: request.offset,
            status: velo_wire::STATUS_SUCCESS,
            payload: response_payload,
        });
        self.client.session_mut().send_raw(MessageKind::ExtendedApiSendresp, &response)
    }

    /// Runs [`Self::serve_one`] in a loop until it returns an error.
    pub fn serve_forever(&mut self) -> Result<(), VeloError> {
        loop {
            self.serve_one()?;
        }
    }
}

/// Sends `SENDRECV` requests that the agent routes to a Sentinel and
/// back, per §4.8. Unlike a Sentinel's recv loop, a Caller still drives
/// every exchange through the ordinary request/response recipe: from
/// its perspective `SENDRECV` is just another helper call.
pub struct Caller<'s, S: CryptoSuite, T> {
    client: VeloClient<'s, S, T>,
}

impl<'s, S: CryptoSuite, T: Read + Write> Caller<'s, S, T> {
    pub fn new(mut client: VeloClient<'s, S, T>) -> Result<Self, VeloError> {
        if !client.extended_api_enabled() {
            client.enable_extended_api()?;
        }
        Ok(Self { client })
    }

    /// Issues `SENDRECV(offset, recipient_id, verb_id, payload)` and
    /// returns the sentinel's response payload.
    pub fn sendrecv(
        &mut self,
        offset: u32,
        recipient_id: [u8; 16],
        verb_id: [u8; 16],
        payload: Vec<u8>,
    ) -> Result<Vec<u8>, VeloError> {
        let request =
            serialize::encode_sendrecv_request(&SendrecvRequest { recipient_id, verb_id, payload });
        let body = self.client.session_mut().call(MessageKind::ExtendedApiSendrecv, offset, &request)?;
        decode_body(MessageKind::ExtendedApiSendrecv, serialize::decode_sendrecv_response(&body))
    }

    /// Convenience wrapper around [`Self::sendrecv`] using [`PING_VERB_ID`].
    pub fn ping(&mut self, offset: u32, sentinel_id: [u8; 16], payload: Vec<u8>) -> Result<Vec<u8>, VeloError> {
        self.sendrecv(offset, sentinel_id, PING_VERB_ID, payload)
    }
}
