//! Submits three transactions in sequence and verifies the chain that
//! comes back: each txn's `next`/`prev` links its neighbors, and all
//! three land in the same block.

use std::thread;
use std::time::Duration;

use velo_crypto::{register_velo_v1, CryptoSuite};
use velo_demos::TopologyMismatch;

fn random_id<S: CryptoSuite>(suite: &S) -> Result<[u8; 16], Box<dyn std::error::Error>> {
    let mut id = [0u8; 16];
    suite.prng_fill(&mut id)?;
    Ok(id)
}

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

    let artifact_id = random_id(suite)?;
    let txn_ids = [random_id(suite)?, random_id(suite)?, random_id(suite)?];

    for (i, txn_id) in txn_ids.iter().enumerate() {
        let cert = format!("demo txn {}", i + 1).into_bytes();
        client.submit_txn(*txn_id, artifact_id, cert)?;
        println!("✓ submitted txn{} {:02x?}", i + 1, txn_id);
    }

    println!("waiting for canonization...");
    thread::sleep(Duration::from_secs(5));

    let txn1 = client.get_txn(txn_ids[0])?;
    let txn2 = client.get_txn(txn_ids[1])?;
    let txn3 = client.get_txn(txn_ids[2])?;

    if txn1.next_txn_id != txn_ids[1] || txn2.prev_txn_id != txn_ids[0] {
        return Err(TopologyMismatch::Txn1NextIdMismatch.into());
    }
    if txn2.next_txn_id != txn_ids[2] || txn3.prev_txn_id != txn_ids[1] {
        return Err(TopologyMismatch::Txn1NextIdMismatch.into());
    }
    println!("✓ forward/back links match submission order");

    if txn1.block_id != txn2.block_id || txn2.block_id != txn3.block_id {
        return Err(TopologyMismatch::BlockIdMismatch.into());
    }
    println!("✓ all three txns share block {:02x?}", txn1.block_id);

    Ok(())
}
