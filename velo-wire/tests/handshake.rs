//! End-to-end handshake and session tests against an in-process stub
//! server. The server-side handshake logic here is test scaffolding
//! only: the agent itself is out of scope for this crate.

use std::net::{TcpListener, TcpStream};
use std::thread;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use velo_cert::{ArtifactId, PrivateEntity, PublicEntity};
use velo_crypto::{CryptoSuite, VeloSuiteV1};
use velo_wire::message::{MessageKind, RequestHeader, ResponseHeader, STATUS_SUCCESS};
use velo_wire::{read_frame, write_frame, Session, VeloError};

const MAX_FRAME_LEN: u32 = 1024 * 1024;

fn mint_identity(suite: &VeloSuiteV1, id_byte: u8) -> PrivateEntity {
    let (sig_priv, sig_pub) = suite.generate_sig_keypair().unwrap();
    let (enc_priv, enc_pub) = suite.generate_enc_keypair().unwrap();
    let artifact_id = ArtifactId([id_byte; 16]);
    let public = PublicEntity::new(artifact_id, sig_pub, enc_pub, Vec::new());
    PrivateEntity::new(public, sig_priv, enc_priv)
}

/// What the server learned from the client's plaintext handshake request.
struct ClientRequest {
    key_nonce: Vec<u8>,
    challenge_nonce: Vec<u8>,
}

fn server_read_request(stream: &mut TcpStream) -> ClientRequest {
    let frame = read_frame(stream, MAX_FRAME_LEN).unwrap();
    let mut cursor = &frame[..];
    let request_id = cursor.read_u32::<BigEndian>().unwrap();
    let _offset = cursor.read_u32::<BigEndian>().unwrap();
    assert_eq!(request_id, MessageKind::HandshakeInitiate.request_id());

    cursor = &cursor[16..]; // client_id: the test harness already knows the client's identity
    let key_nonce = cursor[..VeloSuiteV1::NONCE].to_vec();
    cursor = &cursor[VeloSuiteV1::NONCE..];
    let challenge_nonce = cursor[..VeloSuiteV1::NONCE].to_vec();

    ClientRequest { key_nonce, challenge_nonce }
}

/// Builds and sends the signed, MAC'd handshake response, returning the
/// resulting shared secret.
fn server_send_response(
    stream: &mut TcpStream,
    suite: &VeloSuiteV1,
    server: &PrivateEntity,
    client: &PublicEntity,
    request: &ClientRequest,
) -> Vec<u8> {
    let mut server_key_nonce = vec![0u8; VeloSuiteV1::NONCE];
    let mut server_challenge_nonce = vec![0u8; VeloSuiteV1::NONCE];
    suite.prng_fill(&mut server_key_nonce).unwrap();
    suite.prng_fill(&mut server_challenge_nonce).unwrap();

    let shared_secret = suite
        .kex(server.encryption_key(), client.encryption_key(), &server_key_nonce, &request.key_nonce)
        .unwrap();

    let mut body = Vec::new();
    let header = ResponseHeader {
        request_id: MessageKind::HandshakeInitiate.request_id(),
        offset: 0,
        status: STATUS_SUCCESS,
    };
    header.encode(&mut body).unwrap();
    body.extend_from_slice(&server.artifact_id().0);
    body.write_u32::<BigEndian>(server.public().encryption_key().len() as u32).unwrap();
    body.extend_from_slice(server.public().encryption_key());
    body.extend_from_slice(&server_challenge_nonce);
    body.extend_from_slice(&server_key_nonce);

    let mut signed_message = Vec::new();
    signed_message.extend_from_slice(&server.artifact_id().0);
    signed_message.extend_from_slice(&client.artifact_id().0);
    signed_message.extend_from_slice(server.public().encryption_key());
    signed_message.extend_from_slice(&server_key_nonce);
    signed_message.extend_from_slice(&server_challenge_nonce);
    signed_message.extend_from_slice(&request.key_nonce);
    signed_message.extend_from_slice(&request.challenge_nonce);
    let signature = suite.sign(server.signing_key(), &signed_message).unwrap();
    body.write_u32::<BigEndian>(signature.len() as u32).unwrap();
    body.extend_from_slice(&signature);

    let mac = suite.aead_seal(&shared_secret, 0, &body).unwrap();
    let tag = &mac[body.len()..];
    body.extend_from_slice(tag);

    write_frame(stream, &body).unwrap();
    shared_secret
}

fn server_recv_ack(stream: &mut TcpStream, suite: &VeloSuiteV1, shared_secret: &[u8]) {
    let frame = read_frame(stream, MAX_FRAME_LEN).unwrap();
    let (_tag, sealed) = frame.split_first().unwrap();
    suite.aead_open(shared_secret, 1, sealed).unwrap();
}

fn server_send_ack_response(stream: &mut TcpStream, suite: &VeloSuiteV1, shared_secret: &[u8]) {
    let mut body = Vec::new();
    let header =
        ResponseHeader { request_id: MessageKind::HandshakeAcknowledge.request_id(), offset: 0, status: STATUS_SUCCESS };
    header.encode(&mut body).unwrap();
    let sealed = suite.aead_seal(shared_secret, 1, &body).unwrap();
    let mut message = Vec::with_capacity(1 + sealed.len());
    message.push(MessageKind::HandshakeAcknowledge.wire_tag());
    message.extend_from_slice(&sealed);
    write_frame(stream, &message).unwrap();
}

/// Runs the server side of the handshake, then answers exactly one
/// `LatestBlockIdGet` call, letting the caller control the reply's
/// `(offset, status, body)` and whether the final frame gets corrupted
/// after sealing (to simulate on-the-wire tampering).
fn run_stub_agent(
    mut stream: TcpStream,
    server: PrivateEntity,
    client_public: PublicEntity,
    respond: impl FnOnce(u32) -> (u32, u32, Vec<u8>),
    corrupt_reply: bool,
) {
    let suite = VeloSuiteV1;
    let request = server_read_request(&mut stream);
    let shared_secret = server_send_response(&mut stream, &suite, &server, &client_public, &request);
    server_recv_ack(&mut stream, &suite, &shared_secret);
    server_send_ack_response(&mut stream, &suite, &shared_secret);

    // Post-handshake: both IVs are now 2. Answer one call.
    let frame = read_frame(&mut stream, MAX_FRAME_LEN).unwrap();
    let (_tag, sealed) = frame.split_first().unwrap();
    let plaintext = suite.aead_open(&shared_secret, 2, sealed).unwrap();
    let (req_header, _rest) = RequestHeader::decode(&plaintext).unwrap();

    let (offset, status, payload) = respond(req_header.offset);
    let mut response_body = Vec::new();
    let header = ResponseHeader { request_id: MessageKind::LatestBlockIdGet.request_id(), offset, status };
    header.encode(&mut response_body).unwrap();
    response_body.extend_from_slice(&payload);

    let sealed = suite.aead_seal(&shared_secret, 2, &response_body).unwrap();
    let mut message = Vec::with_capacity(1 + sealed.len());
    message.push(MessageKind::LatestBlockIdGet.wire_tag());
    message.extend_from_slice(&sealed);
    if corrupt_reply {
        let last = message.len() - 1;
        message[last] ^= 0x01;
    }
    write_frame(&mut stream, &message).unwrap();
}

fn spawn_stub_agent(
    server: PrivateEntity,
    client_public: PublicEntity,
    respond: impl FnOnce(u32) -> (u32, u32, Vec<u8>) + Send + 'static,
    corrupt_reply: bool,
) -> (std::net::SocketAddr, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        run_stub_agent(stream, server, client_public, respond, corrupt_reply);
    });
    (addr, handle)
}

#[test]
fn handshake_only_establishes_session() {
    let suite = VeloSuiteV1;
    let client = mint_identity(&suite, 0xAA);
    let server = mint_identity(&suite, 0xBB);
    let client_public = client.public().clone();
    let server_public_for_client = server.public().clone();

    let (addr, handle) =
        spawn_stub_agent(server, client_public, |offset| (offset, STATUS_SUCCESS, vec![0u8; 16]), false);

    let stream = TcpStream::connect(addr).unwrap();
    let mut session = Session::establish(stream, &suite, &client, &server_public_for_client).unwrap();

    assert_eq!(session.client_iv(), 2);
    assert_eq!(session.server_iv(), 2);

    let reply = session.call(MessageKind::LatestBlockIdGet, 7, &[]).unwrap();
    assert_eq!(reply, vec![0u8; 16]);

    handle.join().unwrap();
}

#[test]
fn tampered_response_is_caught_as_mac_failure() {
    let suite = VeloSuiteV1;
    let client = mint_identity(&suite, 0x01);
    let server = mint_identity(&suite, 0x02);
    let client_public = client.public().clone();
    let server_public_for_client = server.public().clone();

    let (addr, handle) =
        spawn_stub_agent(server, client_public, |offset| (offset, STATUS_SUCCESS, vec![0u8; 16]), true);

    let stream = TcpStream::connect(addr).unwrap();
    let mut session = Session::establish(stream, &suite, &client, &server_public_for_client).unwrap();

    match session.call(MessageKind::LatestBlockIdGet, 3, &[]) {
        Err(VeloError::EnvelopeMacFail) => {}
        other => panic!("expected EnvelopeMacFail, got {other:?}"),
    }

    handle.join().unwrap();
}

#[test]
fn offset_mismatch_is_rejected() {
    let suite = VeloSuiteV1;
    let client = mint_identity(&suite, 0x11);
    let server = mint_identity(&suite, 0x22);
    let client_public = client.public().clone();
    let server_public_for_client = server.public().clone();

    let (addr, handle) =
        spawn_stub_agent(server, client_public, |_offset| (999, STATUS_SUCCESS, vec![0u8; 16]), false);

    let stream = TcpStream::connect(addr).unwrap();
    let mut session = Session::establish(stream, &suite, &client, &server_public_for_client).unwrap();

    match session.call(MessageKind::LatestBlockIdGet, 7, &[]) {
        Err(VeloError::Protocol { .. }) => {}
        other => panic!("expected a protocol error for the offset mismatch, got {other:?}"),
    }

    handle.join().unwrap();
}
