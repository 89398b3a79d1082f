//! The four-step mutually-authenticated handshake (§4.4).
//!
//! `INITIAL → SENT_REQUEST → GOT_RESPONSE → SENT_ACK → ESTABLISHED`, with
//! `FAILED` reachable from any step. This module runs the steps directly
//! against a blocking byte stream rather than exposing a sans-IO state
//! machine: the protocol has exactly one exchange shape and no
//! alternate transports to stay agnostic to.

use byteorder::{BigEndian, WriteBytesExt};
use std::io::{Read, Write};

use velo_cert::{PrivateEntity, PublicEntity};
use velo_crypto::CryptoSuite;

use crate::errors::{HandshakeStage, VeloError};
use crate::message::{MessageKind, ResponseHeader, STATUS_SUCCESS};
use crate::transport::{read_frame, write_frame};
use crate::util::constant_time_eq;

/// What a successful handshake leaves the session holding.
pub struct HandshakeResult {
    pub shared_secret: Vec<u8>,
    pub client_iv: u64,
    pub server_iv: u64,
}

fn fail(stage: HandshakeStage, detail: impl std::fmt::Display) -> VeloError {
    VeloError::Handshake { stage, detail: Some(detail.to_string()) }
}

fn fail_bare(stage: HandshakeStage) -> VeloError {
    VeloError::Handshake { stage, detail: None }
}

/// Detached-tag authentication under the AEAD: both sides know `data` in
/// the clear, so only the tag needs to travel. The facade exposes no
/// standalone MAC primitive, so this seals `data` and keeps only the
/// trailing authentication tag, discarding the parallel ciphertext.
fn mac_tag<S: CryptoSuite>(suite: &S, key: &[u8], iv: u64, data: &[u8]) -> Result<Vec<u8>, VeloError> {
    let sealed = suite
        .aead_seal(key, iv, data)
        .map_err(|e| fail(HandshakeStage::VerifyMac, e))?;
    Ok(sealed[data.len()..].to_vec())
}

fn read_length_prefixed(input: &[u8]) -> Option<(&[u8], &[u8])> {
    if input.len() < 4 {
        return None;
    }
    let (len_bytes, rest) = input.split_at(4);
    let len = u32::from_be_bytes(len_bytes.try_into().unwrap()) as usize;
    if rest.len() < len {
        return None;
    }
    Some(rest.split_at(len))
}

fn split_fixed(input: &[u8], len: usize) -> Option<(&[u8], &[u8])> {
    if input.len() < len {
        return None;
    }
    Some(input.split_at(len))
}

/// Run the handshake over `stream`, authenticating against `expected_server`
/// and identifying as `local`. On success the returned IVs are both 2, per
/// the post-ack state defined in §4.4 step 3/4.
pub fn perform_handshake<S, T>(
    stream: &mut T,
    suite: &S,
    local: &PrivateEntity,
    expected_server: &PublicEntity,
    max_frame_len: u32,
) -> Result<HandshakeResult, VeloError>
where
    S: CryptoSuite,
    T: Read + Write,
{
    let mut key_nonce = vec![0u8; S::NONCE];
    let mut challenge_nonce = vec![0u8; S::NONCE];
    suite
        .prng_fill(&mut key_nonce)
        .map_err(|e| fail(HandshakeStage::SendRequest, e))?;
    suite
        .prng_fill(&mut challenge_nonce)
        .map_err(|e| fail(HandshakeStage::SendRequest, e))?;

    if let Err(e) = send_request(stream, local, &key_nonce, &challenge_nonce) {
        key_nonce.fill(0);
        challenge_nonce.fill(0);
        return Err(e);
    }

    let response = recv_response(
        stream,
        suite,
        local,
        expected_server,
        &key_nonce,
        &challenge_nonce,
        max_frame_len,
    );
    key_nonce.fill(0);
    challenge_nonce.fill(0);
    let (mut shared_secret, server_challenge_nonce) = response?;

    let client_iv = match send_ack(stream, suite, &shared_secret, &server_challenge_nonce) {
        Ok(iv) => iv,
        Err(e) => {
            shared_secret.fill(0);
            return Err(e);
        }
    };

    let server_iv = match recv_ack_response(stream, suite, &shared_secret, max_frame_len) {
        Ok(iv) => iv,
        Err(e) => {
            shared_secret.fill(0);
            return Err(e);
        }
    };

    Ok(HandshakeResult { shared_secret, client_iv, server_iv })
}

fn send_request<T: Write>(
    stream: &mut T,
    local: &PrivateEntity,
    key_nonce: &[u8],
    challenge_nonce: &[u8],
) -> Result<(), VeloError> {
    let mut body = Vec::new();
    body.write_u32::<BigEndian>(MessageKind::HandshakeInitiate.request_id())
        .map_err(|e| fail(HandshakeStage::SendRequest, e))?;
    body.write_u32::<BigEndian>(0).map_err(|e| fail(HandshakeStage::SendRequest, e))?;
    body.extend_from_slice(&local.artifact_id().0);
    body.extend_from_slice(key_nonce);
    body.extend_from_slice(challenge_nonce);

    write_frame(stream, &body).map_err(|e| fail(HandshakeStage::SendRequest, e))
}

#[allow(clippy::too_many_arguments)]
fn recv_response<S, T>(
    stream: &mut T,
    suite: &S,
    local: &PrivateEntity,
    expected_server: &PublicEntity,
    client_key_nonce: &[u8],
    client_challenge_nonce: &[u8],
    max_frame_len: u32,
) -> Result<(Vec<u8>, Vec<u8>), VeloError>
where
    S: CryptoSuite,
    T: Read,
{
    let frame = read_frame(stream, max_frame_len).map_err(|e| fail(HandshakeStage::RecvResponse, e))?;

    let (header, rest) =
        ResponseHeader::decode(&frame).map_err(|e| fail(HandshakeStage::DecodeResponse, format!("{} bytes", e.len)))?;
    if header.request_id != MessageKind::HandshakeInitiate.request_id() {
        return Err(fail(HandshakeStage::DecodeResponse, format!("unexpected request_id {}", header.request_id)));
    }
    if header.status != STATUS_SUCCESS {
        return Err(fail(HandshakeStage::DecodeResponse, format!("status {}", header.status)));
    }

    let (server_id, rest) =
        split_fixed(rest, 16).ok_or_else(|| fail_bare(HandshakeStage::DecodeResponse))?;
    let (server_pub_enc_key, rest) =
        read_length_prefixed(rest).ok_or_else(|| fail_bare(HandshakeStage::DecodeResponse))?;
    let (server_challenge_nonce, rest) =
        split_fixed(rest, S::NONCE).ok_or_else(|| fail_bare(HandshakeStage::DecodeResponse))?;
    let (server_key_nonce, rest) =
        split_fixed(rest, S::NONCE).ok_or_else(|| fail_bare(HandshakeStage::DecodeResponse))?;
    let (signature, mac) =
        read_length_prefixed(rest).ok_or_else(|| fail_bare(HandshakeStage::DecodeResponse))?;
    if mac.len() != S::MAC {
        return Err(fail_bare(HandshakeStage::DecodeResponse));
    }

    let signed_region = &frame[..frame.len() - mac.len()];

    let shared_secret = suite
        .kex(local.encryption_key(), server_pub_enc_key, client_key_nonce, server_key_nonce)
        .map_err(|e| fail(HandshakeStage::VerifyMac, e))?;

    let expected_mac = mac_tag(suite, &shared_secret, 0, signed_region)?;
    if !constant_time_eq(&expected_mac, mac) {
        return Err(fail_bare(HandshakeStage::VerifyMac));
    }

    let mut signed_message = Vec::new();
    signed_message.extend_from_slice(server_id);
    signed_message.extend_from_slice(&local.artifact_id().0);
    signed_message.extend_from_slice(server_pub_enc_key);
    signed_message.extend_from_slice(server_key_nonce);
    signed_message.extend_from_slice(server_challenge_nonce);
    signed_message.extend_from_slice(client_key_nonce);
    signed_message.extend_from_slice(client_challenge_nonce);
    suite
        .verify_sig(expected_server.signing_key(), &signed_message, signature)
        .map_err(|_| fail_bare(HandshakeStage::VerifySignature))?;

    if !constant_time_eq(server_id, &expected_server.artifact_id().0) {
        return Err(fail_bare(HandshakeStage::ServerIdMismatch));
    }
    if !constant_time_eq(server_pub_enc_key, expected_server.encryption_key()) {
        return Err(fail_bare(HandshakeStage::ServerKeyMismatch));
    }

    Ok((shared_secret, server_challenge_nonce.to_vec()))
}

fn send_ack<S, T>(stream: &mut T, suite: &S, shared_secret: &[u8], server_challenge_nonce: &[u8]) -> Result<u64, VeloError>
where
    S: CryptoSuite,
    T: Write,
{
    let client_iv = 1u64;
    let sealed = suite
        .aead_seal(shared_secret, client_iv, server_challenge_nonce)
        .map_err(|e| fail(HandshakeStage::SendAck, e))?;

    let mut message = Vec::with_capacity(1 + sealed.len());
    message.push(MessageKind::HandshakeAcknowledge.wire_tag());
    message.extend_from_slice(&sealed);

    write_frame(stream, &message).map_err(|e| fail(HandshakeStage::SendAck, e))?;
    Ok(client_iv + 1)
}

fn recv_ack_response<S, T>(stream: &mut T, suite: &S, shared_secret: &[u8], max_frame_len: u32) -> Result<u64, VeloError>
where
    S: CryptoSuite,
    T: Read,
{
    let server_iv = 1u64;
    let frame = read_frame(stream, max_frame_len).map_err(|e| fail(HandshakeStage::RecvAck, e))?;
    let (_tag, sealed) = frame.split_first().ok_or_else(|| fail_bare(HandshakeStage::DecodeAck))?;

    let plaintext = suite
        .aead_open(shared_secret, server_iv, sealed)
        .map_err(|_| fail_bare(HandshakeStage::DecodeAck))?;

    let (header, _) = ResponseHeader::decode(&plaintext).map_err(|_| fail_bare(HandshakeStage::DecodeAck))?;
    if header.request_id != MessageKind::HandshakeAcknowledge.request_id() {
        return Err(fail(HandshakeStage::AckWrongRequestId, header.request_id));
    }
    if header.status != STATUS_SUCCESS {
        return Err(fail(HandshakeStage::AckNonZeroStatus, header.status));
    }

    Ok(server_iv + 1)
}
