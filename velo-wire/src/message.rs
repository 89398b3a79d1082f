//! The closed enumeration of request/response kinds and the header every
//! decrypted response body carries.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// A message kind, carrying its fixed `request_id`.
///
/// `EXTENDED_API_CLIENTREQ` is server-initiated: a client only ever
/// decodes it, never sends it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MessageKind {
    HandshakeInitiate = 0,
    HandshakeAcknowledge = 1,
    LatestBlockIdGet = 2,
    BlockIdByHeightGet = 3,
    BlockByIdGet = 4,
    BlockIdGetNext = 5,
    BlockIdGetPrev = 6,
    TransactionSubmit = 7,
    TransactionByIdGet = 8,
    TransactionIdGetNext = 9,
    TransactionIdGetPrev = 10,
    TransactionIdGetBlockId = 11,
    ArtifactFirstTxnByIdGet = 12,
    ArtifactLastTxnByIdGet = 13,
    StatusGet = 14,
    Close = 15,
    ExtendedApiEnable = 16,
    ExtendedApiSendrecv = 17,
    ExtendedApiClientreq = 18,
    ExtendedApiSendresp = 19,
}

impl MessageKind {
    /// The wire `request_id` fixed for this kind.
    pub const fn request_id(self) -> u32 {
        self as u32
    }

    /// Recover a kind from a wire `request_id`, if recognized.
    pub fn from_request_id(id: u32) -> Option<Self> {
        use MessageKind::*;
        let kind = match id {
            0 => HandshakeInitiate,
            1 => HandshakeAcknowledge,
            2 => LatestBlockIdGet,
            3 => BlockIdByHeightGet,
            4 => BlockByIdGet,
            5 => BlockIdGetNext,
            6 => BlockIdGetPrev,
            7 => TransactionSubmit,
            8 => TransactionByIdGet,
            9 => TransactionIdGetNext,
            10 => TransactionIdGetPrev,
            11 => TransactionIdGetBlockId,
            12 => ArtifactFirstTxnByIdGet,
            13 => ArtifactLastTxnByIdGet,
            14 => StatusGet,
            15 => Close,
            16 => ExtendedApiEnable,
            17 => ExtendedApiSendrecv,
            18 => ExtendedApiClientreq,
            19 => ExtendedApiSendresp,
            _ => return None,
        };
        Some(kind)
    }

    /// The single byte tagging a post-handshake frame's wire message type.
    /// Identical to the `request_id` truncated to one byte: there are far
    /// fewer than 256 kinds, so no collision is possible.
    pub const fn wire_tag(self) -> u8 {
        self as u32 as u8
    }
}

/// The `(request_id, offset)` pair every request body begins with.
///
/// The request id is already implicit in the outer wire message-type
/// byte; the serializer embeds it again here so the agent can echo it
/// (along with the chosen `offset`) into the response header without
/// needing to remember per-connection state beyond the envelope itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestHeader {
    pub request_id: u32,
    pub offset: u32,
}

/// Size in bytes of an encoded [`RequestHeader`].
pub const REQUEST_HEADER_LEN: usize = 8;

impl RequestHeader {
    pub fn encode<W: Write>(&self, mut out: W) -> io::Result<()> {
        out.write_u32::<BigEndian>(self.request_id)?;
        out.write_u32::<BigEndian>(self.offset)
    }

    pub fn decode(mut input: &[u8]) -> Result<(Self, &[u8]), HeaderDecodeError> {
        if input.len() < REQUEST_HEADER_LEN {
            return Err(HeaderDecodeError { len: input.len() });
        }
        let request_id = input.read_u32::<BigEndian>().unwrap();
        let offset = input.read_u32::<BigEndian>().unwrap();
        Ok((Self { request_id, offset }, input))
    }
}

/// The `(request_id, offset, status)` triad every decrypted response body
/// begins with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResponseHeader {
    pub request_id: u32,
    pub offset: u32,
    pub status: u32,
}

/// Size in bytes of an encoded [`ResponseHeader`].
pub const HEADER_LEN: usize = 12;

/// Status value meaning the agent accepted and fulfilled the request.
pub const STATUS_SUCCESS: u32 = 0;

impl ResponseHeader {
    pub fn encode<W: Write>(&self, mut out: W) -> io::Result<()> {
        out.write_u32::<BigEndian>(self.request_id)?;
        out.write_u32::<BigEndian>(self.offset)?;
        out.write_u32::<BigEndian>(self.status)
    }

    pub fn decode(mut input: &[u8]) -> Result<(Self, &[u8]), HeaderDecodeError> {
        if input.len() < HEADER_LEN {
            return Err(HeaderDecodeError { len: input.len() });
        }
        let request_id = input.read_u32::<BigEndian>().unwrap();
        let offset = input.read_u32::<BigEndian>().unwrap();
        let status = input.read_u32::<BigEndian>().unwrap();
        Ok((Self { request_id, offset, status }, input))
    }
}

/// A response body was shorter than [`HEADER_LEN`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderDecodeError {
    pub len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_request_id() {
        for id in 0..20u32 {
            let kind = MessageKind::from_request_id(id).unwrap();
            assert_eq!(kind.request_id(), id);
        }
        assert!(MessageKind::from_request_id(20).is_none());
    }

    #[test]
    fn header_round_trips() {
        let header = ResponseHeader { request_id: 4, offset: 0x1337, status: 0 };
        let mut buf = Vec::new();
        header.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), HEADER_LEN);
        let (decoded, rest) = ResponseHeader::decode(&buf).unwrap();
        assert_eq!(decoded, header);
        assert!(rest.is_empty());
    }

    #[test]
    fn header_decode_rejects_short_input() {
        let buf = [0u8; HEADER_LEN - 1];
        assert!(ResponseHeader::decode(&buf).is_err());
    }
}
