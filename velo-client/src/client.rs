//! `VeloClient`: one method per message kind, each running the §4.6
//! recipe through the underlying [`Session`].

use std::io::{Read, Write};

use velo_cert::{PrivateEntity, PublicEntity};
use velo_crypto::CryptoSuite;
use velo_wire::errors::{protocol_error, Stage};
use velo_wire::message::MessageKind;
use velo_wire::serialize::{self, BlockResponse, SubmitTxnRequest, TxnResponse};
use velo_wire::{Session, VeloError};

// Offsets are uncorrelated between helpers; each picks a fixed literal,
// mirroring the reference clients' habit of hard-coding distinct tokens
// per call site for easier packet-capture diagnosis.
const OFFSET_LATEST_BLOCK_ID_GET: u32 = 0x1337;
const OFFSET_BLOCK_ID_BY_HEIGHT_GET: u32 = 0x2337;
const OFFSET_BLOCK_BY_ID_GET: u32 = 0x1234;
const OFFSET_BLOCK_ID_GET_NEXT: u32 = 0x2234;
const OFFSET_BLOCK_ID_GET_PREV: u32 = 0x3234;
const OFFSET_TRANSACTION_SUBMIT: u32 = 0x3133;
const OFFSET_TRANSACTION_BY_ID_GET: u32 = 0x1733;
const OFFSET_TRANSACTION_ID_GET_NEXT: u32 = 0x2733;
const OFFSET_TRANSACTION_ID_GET_PREV: u32 = 0x3733;
const OFFSET_TRANSACTION_ID_GET_BLOCK_ID: u32 = 0x4733;
const OFFSET_ARTIFACT_FIRST_TXN_BY_ID_GET: u32 = 0x1933;
const OFFSET_ARTIFACT_LAST_TXN_BY_ID_GET: u32 = 0x2933;
const OFFSET_STATUS_GET: u32 = 0x1500;
const OFFSET_CLOSE: u32 = 0x1600;
const OFFSET_EXTENDED_API_ENABLE: u32 = 0x1700;

pub(crate) fn decode_body<T>(
    kind: MessageKind,
    result: Result<T, serialize::BodyDecodeError>,
) -> Result<T, VeloError> {
    result.map_err(|_| protocol_error(kind, Stage::DecodeBody))
}

/// A client session speaking the ~18-helper surface described in §4.9.
///
/// Not `Send`/`Sync` — see [`Session`]'s own note on single-threaded use.
pub struct VeloClient<'s, S: CryptoSuite, T> {
    session: Session<'s, S, T>,
}

impl<'s, S: CryptoSuite, T: Read + Write> VeloClient<'s, S, T> {
    /// Perform the handshake over `transport` and return a ready client.
    pub fn establish(
        transport: T,
        suite: &'s S,
        local: &PrivateEntity,
        expected_server: &PublicEntity,
    ) -> Result<Self, VeloError> {
        Ok(Self { session: Session::establish(transport, suite, local, expected_server)? })
    }

    /// The underlying session, for callers that need `enable_extended_api`'s
    /// send/recv primitives directly (see [`crate::sentinel`]).
    pub fn session_mut(&mut self) -> &mut Session<'s, S, T> {
        &mut self.session
    }

    pub fn into_session(self) -> Session<'s, S, T> {
        self.session
    }

    pub fn get_latest_block_id(&mut self) -> Result<[u8; 16], VeloError> {
        let body = self.session.call(MessageKind::LatestBlockIdGet, OFFSET_LATEST_BLOCK_ID_GET, &[])?;
        decode_body(MessageKind::LatestBlockIdGet, serialize::decode_uuid_response(&body))
    }

    pub fn get_block_id_by_height(&mut self, height: u64) -> Result<[u8; 16], VeloError> {
        let request = serialize::encode_block_id_by_height_request(height);
        let body =
            self.session.call(MessageKind::BlockIdByHeightGet, OFFSET_BLOCK_ID_BY_HEIGHT_GET, &request)?;
        decode_body(MessageKind::BlockIdByHeightGet, serialize::decode_uuid_response(&body))
    }

    pub fn get_block(&mut self, block_id: [u8; 16]) -> Result<BlockResponse, VeloError> {
        let request = serialize::encode_uuid_request(block_id);
        let body = self.session.call(MessageKind::BlockByIdGet, OFFSET_BLOCK_BY_ID_GET, &request)?;
        decode_body(MessageKind::BlockByIdGet, serialize::decode_block_response(&body))
    }

    pub fn get_block_id_next(&mut self, block_id: [u8; 16]) -> Result<[u8; 16], VeloError> {
        let request = serialize::encode_uuid_request(block_id);
        let body = self.session.call(MessageKind::BlockIdGetNext, OFFSET_BLOCK_ID_GET_NEXT, &request)?;
        decode_body(MessageKind::BlockIdGetNext, serialize::decode_uuid_response(&body))
    }

    pub fn get_block_id_prev(&mut self, block_id: [u8; 16]) -> Result<[u8; 16], VeloError> {
        let request = serialize::encode_uuid_request(block_id);
        let body = self.session.call(MessageKind::BlockIdGetPrev, OFFSET_BLOCK_ID_GET_PREV, &request)?;
        decode_body(MessageKind::BlockIdGetPrev, serialize::decode_uuid_response(&body))
    }

    /// Submit a transaction. Per §4.9, the agent returns no body on
    /// success; only the header triad is meaningful here.
    pub fn submit_txn(
        &mut self,
        txn_id: [u8; 16],
        artifact_id: [u8; 16],
        cert: Vec<u8>,
    ) -> Result<(), VeloError> {
        let request = serialize::encode_submit_txn_request(&SubmitTxnRequest { txn_id, artifact_id, cert });
        self.session.call(MessageKind::TransactionSubmit, OFFSET_TRANSACTION_SUBMIT, &request)?;
        Ok(())
    }

    pub fn get_txn(&mut self, txn_id: [u8; 16]) -> Result<TxnResponse, VeloError> {
        let request = serialize::encode_uuid_request(txn_id);
        let body =
            self.session.call(MessageKind::TransactionByIdGet, OFFSET_TRANSACTION_BY_ID_GET, &request)?;
        decode_body(MessageKind::TransactionByIdGet, serialize::decode_txn_response(&body))
    }

    pub fn get_txn_id_next(&mut self, txn_id: [u8; 16]) -> Result<[u8; 16], VeloError> {
        let request = serialize::encode_uuid_request(txn_id);
        let body = self
            .session
            .call(MessageKind::TransactionIdGetNext, OFFSET_TRANSACTION_ID_GET_NEXT, &request)?;
        decode_body(MessageKind::TransactionIdGetNext, serialize::decode_uuid_response(&body))
    }

    pub fn get_txn_id_prev(&mut self, txn_id: [u8; 16]) -> Result<[u8; 16], VeloError> {
        let request = serialize::encode_uuid_request(txn_id);
        let body = self
            .session
            .call(MessageKind::TransactionIdGetPrev, OFFSET_TRANSACTION_ID_GET_PREV, &request)?;
        decode_body(MessageKind::TransactionIdGetPrev, serialize::decode_uuid_response(&body))
    }

    pub fn get_txn_block_id(&mut self, txn_id: [u8; 16]) -> Result<[u8; 16], VeloError> {
        let request = serialize::encode_uuid_request(txn_id);
        let body = self.session.call(
            MessageKind::TransactionIdGetBlockId,
            OFFSET_TRANSACTION_ID_GET_BLOCK_ID,
            &request,
        )?;
        decode_body(MessageKind::TransactionIdGetBlockId, serialize::decode_uuid_response(&body))
    }

    pub fn get_artifact_first_txn_id(&mut self, artifact_id: [u8; 16]) -> Result<[u8; 16], VeloError> {
        let request = serialize::encode_uuid_request(artifact_id);
        let body = self.session.call(
            MessageKind::ArtifactFirstTxnByIdGet,
            OFFSET_ARTIFACT_FIRST_TXN_BY_ID_GET,
            &request,
        )?;
        decode_body(MessageKind::ArtifactFirstTxnByIdGet, serialize::decode_uuid_response(&body))
    }

    pub fn get_artifact_last_txn_id(&mut self, artifact_id: [u8; 16]) -> Result<[u8; 16], VeloError> {
        let request = serialize::encode_uuid_request(artifact_id);
        let body = self.session.call(
            MessageKind::ArtifactLastTxnByIdGet,
            OFFSET_ARTIFACT_LAST_TXN_BY_ID_GET,
            &request,
        )?;
        decode_body(MessageKind::ArtifactLastTxnByIdGet, serialize::decode_uuid_response(&body))
    }

    /// `STATUS_GET` carries no response body; the header's `status` field
    /// alone is the answer.
    pub fn get_status(&mut self) -> Result<(), VeloError> {
        self.session.call(MessageKind::StatusGet, OFFSET_STATUS_GET, &[])?;
        Ok(())
    }

    /// Issues `CLOSE`. Does not itself drop the transport — the caller
    /// owns that once this returns.
    pub fn close(&mut self) -> Result<(), VeloError> {
        self.session.call(MessageKind::Close, OFFSET_CLOSE, &[])?;
        Ok(())
    }

    /// Enables the extended-API pattern (§4.8) on this session. After
    /// this returns, the session may receive server-initiated
    /// `EXTENDED_API_CLIENTREQ` messages; drive those with
    /// [`crate::sentinel::Sentinel`] or [`crate::sentinel::Caller`].
    pub fn enable_extended_api(&mut self) -> Result<(), VeloError> {
        self.session.call(MessageKind::ExtendedApiEnable, OFFSET_EXTENDED_API_ENABLE, &[])?;
        self.session.mark_extended_api_enabled();
        Ok(())
    }

    pub fn extended_api_enabled(&self) -> bool {
        self.session.extended_api_enabled()
    }
}

/// Parses a `block_cert`'s tuple-of-transactions field and reports
/// whether `target_txn_cert` byte-matches any entry. Purely local — no
/// wire I/O — per §4.9.
pub fn find_transaction_in_block(block_cert: &[u8], target_txn_cert: &[u8]) -> Result<bool, VeloError> {
    let entries = serialize::decode_txn_tuple(block_cert)
        .map_err(|_| protocol_error(MessageKind::BlockByIdGet, Stage::DecodeBody))?;
    Ok(entries.iter().any(|entry| entry == target_txn_cert))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_transaction_in_block_matches_an_entry() {
        let block_cert = serialize::encode_txn_tuple(&[b"txn-a".to_vec(), b"txn-b".to_vec()]);
        assert!(find_transaction_in_block(&block_cert, b"txn-b").unwrap());
        assert!(!find_transaction_in_block(&block_cert, b"txn-z").unwrap());
    }

    #[test]
    fn find_transaction_in_block_rejects_malformed_cert() {
        assert!(find_transaction_in_block(&[0xff, 0xff], b"txn").is_err());
    }

    #[test]
    fn find_transaction_in_block_empty_tuple_never_matches() {
        let block_cert = serialize::encode_txn_tuple(&[]);
        assert!(!find_transaction_in_block(&block_cert, b"anything").unwrap());
    }
}
