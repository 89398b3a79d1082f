//! Runs as the Sentinel half of the extended-API ping demo: enables the
//! extended API and answers `PING` verbs forever with a payload sized by
//! `PING_SENTINEL_PAYLOAD_SIZE` (defaults to 1 byte).

use velo_client::Sentinel;

fn main() {
    velo_demos::init_logging();
    if let Err(e) = run() {
        eprintln!("\n✗ {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let client = velo_demos::connect()?;
    println!("✓ handshake established");

    let reply_size = velo_demos::payload_size_env("PING_SENTINEL_PAYLOAD_SIZE");
    let mut sentinel = Sentinel::new(client)?;
    println!("✓ extended API enabled, serving PING with {reply_size}-byte replies");

    sentinel.register_handler(velo_client::PING_VERB_ID, move |_request| vec![0u8; reply_size]);

    sentinel.serve_forever()?;
    Ok(())
}
