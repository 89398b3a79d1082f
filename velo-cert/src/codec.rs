//! Binary layout of a certificate file.
//!
//! ```text
//! magic      : b"VCRT"
//! version    : u8   = 1
//! kind       : u8   (0 = public, 1 = private)
//! artifact_id: [u8; 16]
//! sig_pub    : u16 length-prefixed
//! enc_pub    : u16 length-prefixed
//! signature  : u16 length-prefixed
//! -- kind == 1 only --
//! sig_priv   : u16 length-prefixed
//! enc_priv   : u16 length-prefixed
//! ```

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Cursor, Read, Write};

use crate::entity::{ArtifactId, PrivateEntity, PublicEntity};

const MAGIC: &[u8; 4] = b"VCRT";
const VERSION: u8 = 1;
const KIND_PUBLIC: u8 = 0;
const KIND_PRIVATE: u8 = 1;

fn write_field(out: &mut Vec<u8>, field: &[u8]) -> io::Result<()> {
    out.write_u16::<BigEndian>(field.len() as u16)?;
    out.write_all(field)
}

fn read_field(cursor: &mut Cursor<&[u8]>) -> Result<Vec<u8>, &'static str> {
    let len = cursor.read_u16::<BigEndian>().map_err(|_| "truncated field length")? as usize;
    let mut buf = vec![0u8; len];
    cursor.read_exact(&mut buf).map_err(|_| "truncated field body")?;
    Ok(buf)
}

/// Serialize a public certificate.
pub fn encode_public(public: &PublicEntity) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    out.push(KIND_PUBLIC);
    out.extend_from_slice(&public.artifact_id.0);
    write_field(&mut out, &public.sig_pub).expect("writing to a Vec never fails");
    write_field(&mut out, &public.enc_pub).expect("writing to a Vec never fails");
    write_field(&mut out, &public.signature).expect("writing to a Vec never fails");
    out
}

/// Serialize a private certificate (the public fields plus both private keys).
pub fn encode_private(private: &PrivateEntity) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    out.push(KIND_PRIVATE);
    out.extend_from_slice(&private.public.artifact_id.0);
    write_field(&mut out, &private.public.sig_pub).expect("writing to a Vec never fails");
    write_field(&mut out, &private.public.enc_pub).expect("writing to a Vec never fails");
    write_field(&mut out, &private.public.signature).expect("writing to a Vec never fails");
    write_field(&mut out, &private.sig_priv).expect("writing to a Vec never fails");
    write_field(&mut out, &private.enc_priv).expect("writing to a Vec never fails");
    out
}

fn read_header(cursor: &mut Cursor<&[u8]>) -> Result<(u8, ArtifactId), &'static str> {
    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic).map_err(|_| "truncated magic")?;
    if &magic != MAGIC {
        return Err("bad magic");
    }
    let version = cursor.read_u8().map_err(|_| "truncated version")?;
    if version != VERSION {
        return Err("unsupported version");
    }
    let kind = cursor.read_u8().map_err(|_| "truncated kind")?;
    let mut id = [0u8; 16];
    cursor.read_exact(&mut id).map_err(|_| "truncated artifact id")?;
    Ok((kind, ArtifactId(id)))
}

/// Parse a public certificate. Accepts either a public-only file or the
/// public prefix of a private one.
pub fn decode_public(bytes: &[u8]) -> Result<PublicEntity, &'static str> {
    let mut cursor = Cursor::new(bytes);
    let (kind, artifact_id) = read_header(&mut cursor)?;
    if kind != KIND_PUBLIC && kind != KIND_PRIVATE {
        return Err("unknown certificate kind");
    }
    let sig_pub = read_field(&mut cursor)?;
    let enc_pub = read_field(&mut cursor)?;
    let signature = read_field(&mut cursor)?;
    Ok(PublicEntity { artifact_id, sig_pub, enc_pub, signature })
}

/// Parse a private certificate.
pub fn decode_private(bytes: &[u8]) -> Result<PrivateEntity, &'static str> {
    let mut cursor = Cursor::new(bytes);
    let (kind, artifact_id) = read_header(&mut cursor)?;
    if kind != KIND_PRIVATE {
        return Err("not a private certificate");
    }
    let sig_pub = read_field(&mut cursor)?;
    let enc_pub = read_field(&mut cursor)?;
    let signature = read_field(&mut cursor)?;
    let sig_priv = read_field(&mut cursor)?;
    let enc_priv = read_field(&mut cursor)?;
    Ok(PrivateEntity {
        public: PublicEntity { artifact_id, sig_pub, enc_pub, signature },
        sig_priv,
        enc_priv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_private() -> PrivateEntity {
        PrivateEntity {
            public: PublicEntity {
                artifact_id: ArtifactId([1; 16]),
                sig_pub: vec![2; 33],
                enc_pub: vec![3; 33],
                signature: vec![4; 64],
            },
            sig_priv: vec![5; 32],
            enc_priv: vec![6; 32],
        }
    }

    #[test]
    fn private_roundtrips() {
        let original = sample_private();
        let bytes = encode_private(&original);
        let decoded = decode_private(&bytes).unwrap();
        assert_eq!(decoded.public.artifact_id.0, original.public.artifact_id.0);
        assert_eq!(decoded.sig_priv, original.sig_priv);
        assert_eq!(decoded.enc_priv, original.enc_priv);
    }

    #[test]
    fn public_prefix_of_private_file_decodes() {
        let original = sample_private();
        let bytes = encode_private(&original);
        let decoded = decode_public(&bytes).unwrap();
        assert_eq!(decoded.sig_pub, original.public.sig_pub);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = encode_public(&sample_private().public);
        bytes[0] = b'X';
        assert!(decode_public(&bytes).is_err());
    }
}
