//! Handshake, submit a single transaction, wait for it to land in a
//! block, then navigate the resulting topology and verify it.

use std::thread;
use std::time::Duration;

use velo_crypto::{register_velo_v1, CryptoSuite};
use velo_demos::TopologyMismatch;

fn main() {
    velo_demos::init_logging();
    if let Err(e) = run() {
        eprintln!("\n✗ {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let suite = register_velo_v1();
    let mut client = velo_demos::connect()?;
    println!("✓ handshake established");

    let mut txn_id = [0u8; 16];
    let mut artifact_id = [0u8; 16];
    suite.prng_fill(&mut txn_id)?;
    suite.prng_fill(&mut artifact_id)?;
    let cert = b"demo transaction payload".to_vec();

    client.submit_txn(txn_id, artifact_id, cert.clone())?;
    println!("✓ submitted txn {txn_id:02x?}");

    println!("waiting for canonization...");
    thread::sleep(Duration::from_secs(5));

    let txn = client.get_txn(txn_id)?;
    println!("✓ read back txn (prev={:02x?}, next={:02x?})", txn.prev_txn_id, txn.next_txn_id);

    let block_id = client.get_txn_block_id(txn_id)?;
    let block = client.get_block(block_id)?;
    if !velo_client::find_transaction_in_block(&block.block_cert, &txn.txn_cert)? {
        return Err(TopologyMismatch::BlockIdMismatch.into());
    }
    println!("✓ txn found in its reported block");

    Ok(())
}
