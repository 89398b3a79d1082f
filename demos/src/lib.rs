//! Shared setup for the example binaries in `src/bin/`: load the local
//! identity, connect to the agent, and establish a session. Each binary
//! is otherwise a thin driver over [`velo_client::VeloClient`].

use std::net::TcpStream;

use velo_cert::{load_private_cert, load_public_cert, CertError, PrivateEntity, PublicEntity};
use velo_client::VeloClient;
use velo_crypto::{register_velo_v1, VeloSuiteV1};

/// Reference agent address used by every demo.
pub const AGENT_ADDR: &str = "127.0.0.1:4931";

const PRIVATE_CERT_PATH: &str = "handshake.priv";
const AGENT_PUBLIC_CERT_PATH: &str = "agentd.pub";

/// Loads this demo's own identity plus the agent's pinned public
/// certificate from the working directory.
pub fn load_identities() -> Result<(PrivateEntity, PublicEntity), CertError> {
    let local = load_private_cert(PRIVATE_CERT_PATH)?;
    let agent = load_public_cert(AGENT_PUBLIC_CERT_PATH)?;
    Ok((local, agent))
}

/// Connects to [`AGENT_ADDR`] and runs the handshake, returning a ready
/// client.
pub fn connect() -> Result<VeloClient<'static, VeloSuiteV1, TcpStream>, Box<dyn std::error::Error>> {
    let (local, agent) = load_identities()?;
    let suite = register_velo_v1();
    let stream = TcpStream::connect(AGENT_ADDR)?;
    let client = VeloClient::establish(stream, suite, &local, &agent)?;
    Ok(client)
}

/// Reads a `size_t`-style payload-size environment variable, defaulting
/// to 1 byte when unset or unparsable.
pub fn payload_size_env(var: &str) -> usize {
    std::env::var(var).ok().and_then(|v| v.parse().ok()).unwrap_or(1)
}

/// Loads a peer's pinned public certificate and returns its artifact id,
/// for demos that address another demo process by id (e.g. a Caller
/// addressing a Sentinel).
pub fn load_peer_id(path: &str) -> Result<[u8; 16], CertError> {
    Ok(load_public_cert(path)?.artifact_id().0)
}

/// Exit codes the example binaries use for assertion failures the agent
/// itself can't be blamed for (topology the client expected but didn't
/// see). Mirrors the semantic-mismatch codes named in the design notes.
#[derive(Debug)]
pub enum TopologyMismatch {
    PrevIdRootIdMismatch,
    Txn1NextIdMismatch,
    BlockIdMismatch,
}

impl std::fmt::Display for TopologyMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PrevIdRootIdMismatch => "PREV_ID_ROOT_ID_MISMATCH",
            Self::Txn1NextIdMismatch => "TXN1_NEXT_ID_MISMATCH",
            Self::BlockIdMismatch => "BLOCK_ID_MISMATCH",
        };
        write!(f, "{s}")
    }
}

impl std::error::Error for TopologyMismatch {}

/// Installs a default `RUST_LOG` if the caller hasn't set one, then
/// initializes the logger. Every demo binary calls this first.
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        // SAFETY: called once at process start, before any other thread exists.
        unsafe { std::env::set_var("RUST_LOG", "velo_client=info,velo_wire=info") };
    }
    env_logger::init();
}
