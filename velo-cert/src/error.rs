//! Errors produced while loading a certificate file.

use std::fmt;
use std::io;

/// Which half of an entity's identity a load was operating on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// A public-only certificate (verification keys only).
    Public,
    /// A private certificate (adds the matching private keys).
    Private,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Private => write!(f, "private"),
        }
    }
}

/// Errors produced by [`crate::load_public_cert`] / [`crate::load_private_cert`].
///
/// Each failure stage gets its own variant so callers (and logs) can tell
/// a missing file apart from a corrupt one.
#[derive(Debug)]
pub enum CertError {
    /// `stat`-equivalent probe of the file failed.
    Stat { role: Role, source: io::Error },
    /// The file's reported size was zero or implausibly large.
    Alloc { role: Role, len: u64 },
    /// The file could not be opened for reading.
    Open { role: Role, source: io::Error },
    /// Reading the file's contents failed partway through.
    Read { role: Role, source: io::Error },
    /// The bytes read did not form a valid certificate.
    Parse { role: Role, reason: &'static str },
}

impl std::error::Error for CertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Stat { source, .. } | Self::Open { source, .. } | Self::Read { source, .. } => {
                Some(source)
            }
            Self::Alloc { .. } | Self::Parse { .. } => None,
        }
    }
}

impl fmt::Display for CertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stat { role, source } => write!(f, "{role} cert stat failed: {source}"),
            Self::Alloc { role, len } => {
                write!(f, "{role} cert file size {len} is not a plausible certificate size")
            }
            Self::Open { role, source } => write!(f, "{role} cert open failed: {source}"),
            Self::Read { role, source } => write!(f, "{role} cert read failed: {source}"),
            Self::Parse { role, reason } => write!(f, "{role} cert parse failed: {reason}"),
        }
    }
}
