//! Length-prefixed framing over a reliable, ordered byte stream.
//!
//! This layer is oblivious to encryption: it reads and writes opaque
//! byte segments, nothing more. A `TcpStream` (or anything else
//! implementing [`std::io::Read`] + [`std::io::Write`]) gets framing for
//! free by calling [`write_frame`]/[`read_frame`] directly.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Frames larger than this are assumed to come from a hostile or
/// corrupt peer and rejected before any allocation happens.
pub const DEFAULT_MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

/// Write a 4-byte big-endian length prefix followed by `bytes`.
///
/// Retries on partial writes; a short write from the underlying stream
/// is never silently accepted.
pub fn write_frame<W: Write>(stream: &mut W, bytes: &[u8]) -> io::Result<()> {
    stream.write_u32::<BigEndian>(bytes.len() as u32)?;
    stream.write_all(bytes)
}

/// Read a 4-byte big-endian length prefix `n`, then exactly `n` bytes.
///
/// Fails on EOF or short read. `max_len` bounds `n` to reject corrupt or
/// hostile peers before allocating a buffer for the claimed length.
pub fn read_frame<R: Read>(stream: &mut R, max_len: u32) -> io::Result<Vec<u8>> {
    let len = stream.read_u32::<BigEndian>()?;
    if len > max_len {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame length {len} exceeds max {max_len}"),
        ));
    }
    let mut buf = vec![0u8; len as usize];
    stream.read_exact(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_a_frame() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"hello handshake").unwrap();

        let mut cursor = Cursor::new(buf);
        let frame = read_frame(&mut cursor, DEFAULT_MAX_FRAME_LEN).unwrap();
        assert_eq!(frame, b"hello handshake");
    }

    #[test]
    fn rejects_frame_over_max_len() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &vec![0u8; 64]).unwrap();

        let mut cursor = Cursor::new(buf);
        let err = read_frame(&mut cursor, 16).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn rejects_short_read() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"truncated").unwrap();
        buf.truncate(buf.len() - 2);

        let mut cursor = Cursor::new(buf);
        assert!(read_frame(&mut cursor, DEFAULT_MAX_FRAME_LEN).is_err());
    }

    #[test]
    fn empty_frame_round_trips() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"").unwrap();
        let mut cursor = Cursor::new(buf);
        let frame = read_frame(&mut cursor, DEFAULT_MAX_FRAME_LEN).unwrap();
        assert!(frame.is_empty());
    }
}
