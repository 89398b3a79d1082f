//! Runs as the Caller half of the extended-API ping demo: sends one
//! `PING` to the sentinel named by `sentinel.pub`, with a request
//! payload sized by `PING_CLIENT_PAYLOAD_SIZE` (defaults to 1 byte).

use velo_client::Caller;

const SENTINEL_CERT_PATH: &str = "sentinel.pub";

fn main() {
    velo_demos::init_logging();
    if let Err(e) = run() {
        eprintln!("\n✗ {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let sentinel_id = velo_demos::load_peer_id(SENTINEL_CERT_PATH)?;
    let client = velo_demos::connect()?;
    println!("✓ handshake established");

    let request_size = velo_demos::payload_size_env("PING_CLIENT_PAYLOAD_SIZE");
    let mut caller = Caller::new(client)?;
    println!("✓ extended API enabled");

    let reply = caller.ping(1, sentinel_id, vec![0u8; request_size])?;
    println!("✓ ping round-trip ok, reply is {} bytes", reply.len());

    Ok(())
}
