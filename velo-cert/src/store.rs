//! Loading and writing certificate files on disk.

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::codec;
use crate::entity::{PrivateEntity, PublicEntity};
use crate::error::{CertError, Role};

/// Certificate files are small; anything outside this range is treated
/// as corrupt before we even try to allocate a read buffer for it.
const MIN_CERT_FILE_SIZE: u64 = 8;
const MAX_CERT_FILE_SIZE: u64 = 64 * 1024;

fn stat_and_check_size(path: &Path, role: Role) -> Result<u64, CertError> {
    let metadata = fs::metadata(path).map_err(|source| CertError::Stat { role, source })?;
    let len = metadata.len();
    if !(MIN_CERT_FILE_SIZE..=MAX_CERT_FILE_SIZE).contains(&len) {
        return Err(CertError::Alloc { role, len });
    }
    Ok(len)
}

fn open_and_read(path: &Path, len: u64, role: Role) -> Result<Vec<u8>, CertError> {
    let mut file = fs::File::open(path).map_err(|source| CertError::Open { role, source })?;
    let mut buf = Vec::with_capacity(len as usize);
    file.read_to_end(&mut buf).map_err(|source| CertError::Read { role, source })?;
    Ok(buf)
}

/// Load a public certificate from `filename`.
///
/// Follows the stat, allocate, open, read, parse stages in order, so a
/// caller (or log line) can tell exactly which one failed.
pub fn load_public_cert<P: AsRef<Path>>(filename: P) -> Result<PublicEntity, CertError> {
    let path = filename.as_ref();
    let role = Role::Public;
    let len = stat_and_check_size(path, role)?;
    let bytes = open_and_read(path, len, role)?;
    codec::decode_public(&bytes).map_err(|reason| CertError::Parse { role, reason })
}

/// Load a private certificate from `filename`.
pub fn load_private_cert<P: AsRef<Path>>(filename: P) -> Result<PrivateEntity, CertError> {
    let path = filename.as_ref();
    let role = Role::Private;
    let len = stat_and_check_size(path, role)?;
    let bytes = open_and_read(path, len, role)?;
    codec::decode_private(&bytes).map_err(|reason| CertError::Parse { role, reason })
}

/// Write a public certificate to `filename`. Used by tooling that issues
/// certificates and by tests that need a fixture file on disk.
pub fn save_public_cert<P: AsRef<Path>>(filename: P, public: &PublicEntity) -> std::io::Result<()> {
    fs::write(filename, codec::encode_public(public))
}

/// Write a private certificate to `filename`.
pub fn save_private_cert<P: AsRef<Path>>(filename: P, private: &PrivateEntity) -> std::io::Result<()> {
    fs::write(filename, codec::encode_private(private))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ArtifactId, PublicEntity};
    use std::sync::atomic::{AtomicU32, Ordering};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    fn scratch_path(name: &str) -> std::path::PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("velo-cert-test-{name}-{n}-{}.bin", std::process::id()))
    }

    fn sample_private() -> PrivateEntity {
        PrivateEntity {
            public: PublicEntity {
                artifact_id: ArtifactId([9; 16]),
                sig_pub: vec![1; 33],
                enc_pub: vec![2; 33],
                signature: vec![3; 64],
            },
            sig_priv: vec![4; 32],
            enc_priv: vec![5; 32],
        }
    }

    #[test]
    fn round_trips_through_disk() {
        let path = scratch_path("private");
        let original = sample_private();
        save_private_cert(&path, &original).unwrap();

        let loaded = load_private_cert(&path).unwrap();
        assert_eq!(loaded.artifact_id().0, original.public.artifact_id.0);
        assert_eq!(loaded.signing_key(), original.sig_priv.as_slice());

        let loaded_public = load_public_cert(&path).unwrap();
        assert_eq!(loaded_public.signing_key(), original.public.sig_pub.as_slice());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_a_stat_error() {
        let path = scratch_path("missing");
        match load_public_cert(&path) {
            Err(CertError::Stat { role: Role::Public, .. }) => {}
            other => panic!("expected Stat error, got {other:?}"),
        }
    }

    #[test]
    fn truncated_file_is_an_alloc_error() {
        let path = scratch_path("truncated");
        fs::write(&path, b"x").unwrap();
        match load_public_cert(&path) {
            Err(CertError::Alloc { role: Role::Public, .. }) => {}
            other => panic!("expected Alloc error, got {other:?}"),
        }
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn corrupt_contents_are_a_parse_error() {
        let path = scratch_path("corrupt");
        fs::write(&path, vec![0u8; 32]).unwrap();
        match load_public_cert(&path) {
            Err(CertError::Parse { role: Role::Public, .. }) => {}
            other => panic!("expected Parse error, got {other:?}"),
        }
        let _ = fs::remove_file(&path);
    }
}
