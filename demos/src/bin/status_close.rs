//! Handshake, then `STATUS_GET` followed by `CLOSE`.

fn main() {
    velo_demos::init_logging();
    if let Err(e) = run() {
        eprintln!("\n✗ {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut client = velo_demos::connect()?;
    println!("✓ handshake established");

    client.get_status()?;
    println!("✓ status ok");

    client.close()?;
    println!("✓ closed");
    Ok(())
}
