//! Little-endian helpers shared by the on-disk layouts

use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};
use zeroize::Zeroizing;

/// Map a short read inside a table to a format error
pub(crate) fn truncated(context: &str) -> impl Fn(io::Error) -> Error + '_ {
    move |e| match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::invalid_format(format!("{context} is truncated")),
        _ => Error::Io(e),
    }
}

/// Read to the end of a stream without leaving copies of the data behind
///
/// When `buf` runs out of room the bytes move into a larger wiping buffer
/// and the old allocation is cleared, instead of letting `Vec` reallocate.
pub(crate) fn read_to_end_wiping<R: Read>(
    reader: &mut R,
    buf: &mut Zeroizing<Vec<u8>>,
) -> io::Result<usize> {
    let start = buf.len();
    let mut chunk = Zeroizing::new([0u8; 8192]);
    loop {
        let n = match reader.read(&mut chunk[..]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if buf.capacity() - buf.len() < n {
            let mut grown =
                Zeroizing::new(Vec::with_capacity((buf.len() + n).max(buf.capacity() * 2)));
            grown.extend_from_slice(buf);
            std::mem::swap(buf, &mut grown);
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Ok(buf.len() - start)
}

/// Read a `u16`-length-prefixed UTF-8 path
pub(crate) fn read_path<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let len = reader.read_u16::<LittleEndian>()?;
    let mut bytes = vec![0u8; usize::from(len)];
    reader.read_exact(&mut bytes)?;
    Ok(bytes)
}

/// Decode path bytes read by [`read_path`]
pub(crate) fn decode_path(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| Error::invalid_format("path is not valid UTF-8"))
}

/// Write a `u16`-length-prefixed path, returning the bytes written
pub(crate) fn write_path<W: Write>(writer: &mut W, path: &str) -> Result<u64> {
    let len = u16::try_from(path.len())
        .map_err(|_| Error::invalid_format(format!("path too long: {path}")))?;
    writer.write_u16::<LittleEndian>(len)?;
    writer.write_all(path.as_bytes())?;
    Ok(2 + u64::from(len))
}

/// Check the four-byte magic at the start of an index file
pub(crate) fn expect_magic<R: Read>(reader: &mut R, magic: &[u8; 4], what: &str) -> Result<()> {
    let mut found = [0u8; 4];
    reader.read_exact(&mut found).map_err(truncated(what))?;
    if &found != magic {
        return Err(Error::invalid_format(format!("bad {what} magic")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_path_encoding() {
        let mut buf = Vec::new();
        let written = write_path(&mut buf, "art/icon.png").unwrap();
        assert_eq!(written, buf.len() as u64);

        let bytes = read_path(&mut Cursor::new(buf)).unwrap();
        assert_eq!(decode_path(bytes).unwrap(), "art/icon.png");
    }

    #[test]
    fn test_bad_magic() {
        let err = expect_magic(&mut Cursor::new(b"NOPE"), b"BNDL", "bundle").unwrap_err();
        assert_eq!(err.to_string(), "Invalid index format: bad bundle magic");

        let err = expect_magic(&mut Cursor::new(b"BN"), b"BNDL", "bundle").unwrap_err();
        assert!(err.is_corruption());
    }
}
