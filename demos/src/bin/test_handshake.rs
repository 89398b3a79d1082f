//! Loads `handshake.priv`, connects to the reference agent, and performs
//! the four-step handshake. Exits 0 on success.

fn main() {
    velo_demos::init_logging();
    if let Err(e) = run() {
        eprintln!("\n✗ {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("connecting to {}...", velo_demos::AGENT_ADDR);
    let _client = velo_demos::connect()?;
    println!("✓ handshake established");
    Ok(())
}
