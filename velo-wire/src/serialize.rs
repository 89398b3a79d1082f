//! Compact binary encodings for the ~20 message kinds' request and
//! response bodies (§4.7). All multi-byte integers are big-endian;
//! UUIDs are 16 raw bytes; variable-length fields are a 4-byte
//! big-endian length followed by that many bytes.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::Write;

/// A body was malformed or truncated partway through decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BodyDecodeError;

fn write_var<W: Write>(out: &mut W, field: &[u8]) {
    out.write_u32::<BigEndian>(field.len() as u32).expect("writing to a Vec never fails");
    out.write_all(field).expect("writing to a Vec never fails");
}

fn read_uuid(cursor: &mut &[u8]) -> Result<[u8; 16], BodyDecodeError> {
    if cursor.len() < 16 {
        return Err(BodyDecodeError);
    }
    let mut id = [0u8; 16];
    id.copy_from_slice(&cursor[..16]);
    *cursor = &cursor[16..];
    Ok(id)
}

fn read_var(cursor: &mut &[u8]) -> Result<Vec<u8>, BodyDecodeError> {
    let len = cursor.read_u32::<BigEndian>().map_err(|_| BodyDecodeError)? as usize;
    if cursor.len() < len {
        return Err(BodyDecodeError);
    }
    let field = cursor[..len].to_vec();
    *cursor = &cursor[len..];
    Ok(field)
}

fn expect_empty(cursor: &[u8]) -> Result<(), BodyDecodeError> {
    if cursor.is_empty() {
        Ok(())
    } else {
        Err(BodyDecodeError)
    }
}

// ─── block_id_by_height_get ────────────────────────────────────────────────

pub fn encode_block_id_by_height_request(height: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(8);
    out.write_u64::<BigEndian>(height).unwrap();
    out
}

pub fn decode_block_id_by_height_request(mut body: &[u8]) -> Result<u64, BodyDecodeError> {
    let height = body.read_u64::<BigEndian>().map_err(|_| BodyDecodeError)?;
    expect_empty(body)?;
    Ok(height)
}

// ─── single-uuid request bodies (block_id / txn_id / artifact_id) ─────────

pub fn encode_uuid_request(id: [u8; 16]) -> Vec<u8> {
    id.to_vec()
}

pub fn decode_uuid_request(body: &[u8]) -> Result<[u8; 16], BodyDecodeError> {
    let mut cursor = body;
    let id = read_uuid(&mut cursor)?;
    expect_empty(cursor)?;
    Ok(id)
}

// ─── single-uuid response bodies (block_id / next/prev id / first/last txn id) ─

pub fn encode_uuid_response(id: [u8; 16]) -> Vec<u8> {
    id.to_vec()
}

pub fn decode_uuid_response(body: &[u8]) -> Result<[u8; 16], BodyDecodeError> {
    let mut cursor = body;
    let id = read_uuid(&mut cursor)?;
    expect_empty(cursor)?;
    Ok(id)
}

// ─── block_by_id_get ────────────────────────────────────────────────────────

/// `block_by_id_get` success response: `prev_block_id, next_block_id, block_cert`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockResponse {
    pub prev_block_id: [u8; 16],
    pub next_block_id: [u8; 16],
    pub block_cert: Vec<u8>,
}

pub fn decode_block_response(body: &[u8]) -> Result<BlockResponse, BodyDecodeError> {
    let mut cursor = body;
    let prev_block_id = read_uuid(&mut cursor)?;
    let next_block_id = read_uuid(&mut cursor)?;
    let block_cert = read_var(&mut cursor)?;
    expect_empty(cursor)?;
    Ok(BlockResponse { prev_block_id, next_block_id, block_cert })
}

pub fn encode_block_response(r: &BlockResponse) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&r.prev_block_id);
    out.extend_from_slice(&r.next_block_id);
    write_var(&mut out, &r.block_cert);
    out
}

// ─── transaction_submit ────────────────────────────────────────────────────

/// `transaction_submit` request: `txn_id, artifact_id, cert`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitTxnRequest {
    pub txn_id: [u8; 16],
    pub artifact_id: [u8; 16],
    pub cert: Vec<u8>,
}

pub fn encode_submit_txn_request(r: &SubmitTxnRequest) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&r.txn_id);
    out.extend_from_slice(&r.artifact_id);
    write_var(&mut out, &r.cert);
    out
}

pub fn decode_submit_txn_request(body: &[u8]) -> Result<SubmitTxnRequest, BodyDecodeError> {
    let mut cursor = body;
    let txn_id = read_uuid(&mut cursor)?;
    let artifact_id = read_uuid(&mut cursor)?;
    let cert = read_var(&mut cursor)?;
    expect_empty(cursor)?;
    Ok(SubmitTxnRequest { txn_id, artifact_id, cert })
}

// ─── transaction_by_id_get ──────────────────────────────────────────────────

/// `transaction_by_id_get` success response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxnResponse {
    pub prev_txn_id: [u8; 16],
    pub next_txn_id: [u8; 16],
    pub artifact_id: [u8; 16],
    pub block_id: [u8; 16],
    pub txn_cert: Vec<u8>,
}

pub fn decode_txn_response(body: &[u8]) -> Result<TxnResponse, BodyDecodeError> {
    let mut cursor = body;
    let prev_txn_id = read_uuid(&mut cursor)?;
    let next_txn_id = read_uuid(&mut cursor)?;
    let artifact_id = read_uuid(&mut cursor)?;
    let block_id = read_uuid(&mut cursor)?;
    let txn_cert = read_var(&mut cursor)?;
    expect_empty(cursor)?;
    Ok(TxnResponse { prev_txn_id, next_txn_id, artifact_id, block_id, txn_cert })
}

pub fn encode_txn_response(r: &TxnResponse) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&r.prev_txn_id);
    out.extend_from_slice(&r.next_txn_id);
    out.extend_from_slice(&r.artifact_id);
    out.extend_from_slice(&r.block_id);
    write_var(&mut out, &r.txn_cert);
    out
}

// ─── block certificate transaction tuple ───────────────────────────────────

/// The tuple-of-transactions field embedded in a `block_cert`: a count
/// followed by that many length-prefixed transaction certificates.
/// [`crate::BlockResponse`] carries `block_cert` as an opaque blob; this
/// is the one field within it this crate has any reason to parse, since
/// `find_transaction_in_block` runs entirely locally against it.
pub fn encode_txn_tuple(txn_certs: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u32::<BigEndian>(txn_certs.len() as u32).unwrap();
    for cert in txn_certs {
        write_var(&mut out, cert);
    }
    out
}

pub fn decode_txn_tuple(body: &[u8]) -> Result<Vec<Vec<u8>>, BodyDecodeError> {
    let mut cursor = body;
    let count = cursor.read_u32::<BigEndian>().map_err(|_| BodyDecodeError)? as usize;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(read_var(&mut cursor)?);
    }
    expect_empty(cursor)?;
    Ok(out)
}

// ─── extended API ───────────────────────────────────────────────────────────

/// `extended_api_sendrecv` request: `recipient_id, verb_id, payload`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendrecvRequest {
    pub recipient_id: [u8; 16],
    pub verb_id: [u8; 16],
    pub payload: Vec<u8>,
}

pub fn encode_sendrecv_request(r: &SendrecvRequest) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&r.recipient_id);
    out.extend_from_slice(&r.verb_id);
    write_var(&mut out, &r.payload);
    out
}

pub fn decode_sendrecv_request(body: &[u8]) -> Result<SendrecvRequest, BodyDecodeError> {
    let mut cursor = body;
    let recipient_id = read_uuid(&mut cursor)?;
    let verb_id = read_uuid(&mut cursor)?;
    let payload = read_var(&mut cursor)?;
    expect_empty(cursor)?;
    Ok(SendrecvRequest { recipient_id, verb_id, payload })
}

pub fn decode_sendrecv_response(body: &[u8]) -> Result<Vec<u8>, BodyDecodeError> {
    let mut cursor = body;
    let payload = read_var(&mut cursor)?;
    expect_empty(cursor)?;
    Ok(payload)
}

pub fn encode_sendrecv_response(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    write_var(&mut out, payload);
    out
}

/// `extended_api_clientreq`: server-initiated, a client only ever decodes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientreqBody {
    pub client_id: [u8; 16],
    pub verb_id: [u8; 16],
    pub offset: u64,
    pub payload: Vec<u8>,
}

pub fn decode_clientreq(body: &[u8]) -> Result<ClientreqBody, BodyDecodeError> {
    let mut cursor = body;
    let client_id = read_uuid(&mut cursor)?;
    let verb_id = read_uuid(&mut cursor)?;
    let offset = cursor.read_u64::<BigEndian>().map_err(|_| BodyDecodeError)?;
    let payload = read_var(&mut cursor)?;
    expect_empty(cursor)?;
    Ok(ClientreqBody { client_id, verb_id, offset, payload })
}

pub fn encode_clientreq(r: &ClientreqBody) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&r.client_id);
    out.extend_from_slice(&r.verb_id);
    out.write_u64::<BigEndian>(r.offset).unwrap();
    write_var(&mut out, &r.payload);
    out
}

/// `extended_api_sendresp` request: `offset, status, payload`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendrespRequest {
    pub offset: u64,
    pub status: u32,
    pub payload: Vec<u8>,
}

pub fn encode_sendresp_request(r: &SendrespRequest) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u64::<BigEndian>(r.offset).unwrap();
    out.write_u32::<BigEndian>(r.status).unwrap();
    write_var(&mut out, &r.payload);
    out
}

pub fn decode_sendresp_request(body: &[u8]) -> Result<SendrespRequest, BodyDecodeError> {
    let mut cursor = body;
    let offset = cursor.read_u64::<BigEndian>().map_err(|_| BodyDecodeError)?;
    let status = cursor.read_u32::<BigEndian>().map_err(|_| BodyDecodeError)?;
    let payload = read_var(&mut cursor)?;
    expect_empty(cursor)?;
    Ok(SendrespRequest { offset, status, payload })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_id_by_height_round_trips() {
        let encoded = encode_block_id_by_height_request(42);
        assert_eq!(decode_block_id_by_height_request(&encoded).unwrap(), 42);
    }

    #[test]
    fn uuid_request_round_trips() {
        let id = [7u8; 16];
        let encoded = encode_uuid_request(id);
        assert_eq!(decode_uuid_request(&encoded).unwrap(), id);
    }

    #[test]
    fn block_response_round_trips() {
        let response = BlockResponse {
            prev_block_id: [0; 16],
            next_block_id: [0xff; 16],
            block_cert: b"opaque block cert bytes".to_vec(),
        };
        let encoded = encode_block_response(&response);
        assert_eq!(decode_block_response(&encoded).unwrap(), response);
    }

    #[test]
    fn submit_txn_request_round_trips() {
        let request = SubmitTxnRequest {
            txn_id: [1; 16],
            artifact_id: [2; 16],
            cert: b"txn cert".to_vec(),
        };
        let encoded = encode_submit_txn_request(&request);
        assert_eq!(decode_submit_txn_request(&encoded).unwrap(), request);
    }

    #[test]
    fn txn_response_round_trips() {
        let response = TxnResponse {
            prev_txn_id: [0; 16],
            next_txn_id: [0xff; 16],
            artifact_id: [3; 16],
            block_id: [4; 16],
            txn_cert: b"txn cert bytes".to_vec(),
        };
        let encoded = encode_txn_response(&response);
        assert_eq!(decode_txn_response(&encoded).unwrap(), response);
    }

    #[test]
    fn sendrecv_round_trips() {
        let request = SendrecvRequest { recipient_id: [5; 16], verb_id: [6; 16], payload: vec![9; 3] };
        let encoded = encode_sendrecv_request(&request);
        assert_eq!(decode_sendrecv_request(&encoded).unwrap(), request);

        let response_payload = vec![1, 2, 3, 4];
        let encoded_response = encode_sendrecv_response(&response_payload);
        assert_eq!(decode_sendrecv_response(&encoded_response).unwrap(), response_payload);
    }

    #[test]
    fn clientreq_round_trips() {
        let body = ClientreqBody { client_id: [1; 16], verb_id: [2; 16], offset: 5, payload: vec![1] };
        let encoded = encode_clientreq(&body);
        assert_eq!(decode_clientreq(&encoded).unwrap(), body);
    }

    #[test]
    fn sendresp_request_round_trips() {
        let request = SendrespRequest { offset: 5, status: 0, payload: vec![1] };
        let encoded = encode_sendresp_request(&request);
        assert_eq!(decode_sendresp_request(&encoded).unwrap(), request);
    }

    #[test]
    fn truncated_body_is_rejected() {
        assert!(decode_uuid_request(&[0u8; 4]).is_err());
    }

    #[test]
    fn txn_tuple_round_trips() {
        let certs = vec![b"txn-a".to_vec(), b"txn-b".to_vec(), b"txn-c".to_vec()];
        let encoded = encode_txn_tuple(&certs);
        assert_eq!(decode_txn_tuple(&encoded).unwrap(), certs);
    }

    #[test]
    fn empty_txn_tuple_round_trips() {
        let encoded = encode_txn_tuple(&[]);
        assert!(decode_txn_tuple(&encoded).unwrap().is_empty());
    }
}
