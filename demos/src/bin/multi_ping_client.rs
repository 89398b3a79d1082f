//! Like `ping_client`, but issues several `PING`s over the same session
//! to exercise the extended-API offset bookkeeping across repeated
//! round trips.

use velo_client::Caller;

const SENTINEL_CERT_PATH: &str = "sentinel.pub";
const PING_COUNT: u32 = 5;

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

    for offset in 1..=PING_COUNT {
        let reply = caller.ping(offset, sentinel_id, vec![0u8; request_size])?;
        println!("✓ ping {offset}/{PING_COUNT} ok, reply is {} bytes", reply.len());
    }

    Ok(())
}
