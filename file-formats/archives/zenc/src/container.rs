//! Container framing reader and writer

use crate::{ContainerHeader, Error, MAGIC, Result, TAG_SIZE};
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;
use zeroize::Zeroizing;

/// Size of the framing before the JSON header: magic plus length field
const PREFIX_SIZE: usize = MAGIC.len() + 4;

/// A parsed container: validated header plus the opaque sealed body
///
/// The body is held in a wiping buffer and is cleared when the container is
/// dropped, whatever the outcome of decryption.
#[derive(Debug)]
pub struct EncryptedContainer {
    header: ContainerHeader,
    cipher_and_tag: Zeroizing<Vec<u8>>,
}

impl EncryptedContainer {
    /// Assemble a container from its parts
    pub fn new(header: ContainerHeader, cipher_and_tag: Vec<u8>) -> Result<Self> {
        if cipher_and_tag.len() < TAG_SIZE {
            return Err(Error::format("ciphertext too short"));
        }
        Ok(Self {
            header,
            cipher_and_tag: Zeroizing::new(cipher_and_tag),
        })
    }

    /// Parse a container from a byte stream, consuming it fully
    pub fn read<R: Read>(reader: R) -> Result<Self> {
        Self::read_sized(reader, 0)
    }

    /// Open and parse a container file
    ///
    /// The body buffer is sized from the file length up front so it is never
    /// reallocated while being filled.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let len = usize::try_from(file.metadata()?.len()).unwrap_or(0);
        Self::read_sized(BufReader::new(file), len)
    }

    /// Parse a container, reserving room for a stream of about `total_len` bytes
    fn read_sized<R: Read>(mut reader: R, total_len: usize) -> Result<Self> {
        let mut magic = [0u8; MAGIC.len()];
        read_fixed(&mut reader, &mut magic)?;
        if magic != MAGIC {
            return Err(Error::format("bad magic"));
        }

        let mut len_bytes = [0u8; 4];
        read_fixed(&mut reader, &mut len_bytes)?;
        let header_len = u32::from_be_bytes(len_bytes);

        // Bounded by what the stream actually holds, not by the declared length
        let mut header_bytes = Vec::new();
        reader
            .by_ref()
            .take(u64::from(header_len))
            .read_to_end(&mut header_bytes)?;
        if header_bytes.len() != header_len as usize {
            return Err(Error::format("truncated header"));
        }

        let header = ContainerHeader::parse(&header_bytes)?;
        log::debug!(
            "Container header: v{} {} with {} iterations",
            header.version,
            header.kdf_algorithm,
            header.iterations
        );

        let expected = total_len.saturating_sub(PREFIX_SIZE + header_bytes.len());
        let mut body = Zeroizing::new(Vec::with_capacity(expected));
        read_to_end_wiping(&mut reader, &mut body)?;
        if body.len() < TAG_SIZE {
            return Err(Error::format("ciphertext too short"));
        }

        Ok(Self {
            header,
            cipher_and_tag: body,
        })
    }

    /// Parse a container held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::read_sized(bytes, bytes.len())
    }

    /// Serialize the container in wire layout
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        let header = self.header.to_bytes()?;
        let header_len = u32::try_from(header.len())
            .map_err(|_| Error::format("header does not fit a 32-bit length"))?;

        writer.write_all(&MAGIC)?;
        writer.write_all(&header_len.to_be_bytes())?;
        writer.write_all(&header)?;
        writer.write_all(&self.cipher_and_tag)?;
        writer.flush()?;
        Ok(())
    }

    /// Serialize the container into a new buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.cipher_and_tag.len() + 128);
        self.write(&mut out)?;
        Ok(out)
    }

    /// Validated header
    pub fn header(&self) -> &ContainerHeader {
        &self.header
    }

    /// Ciphertext without the trailing tag
    pub fn ciphertext(&self) -> &[u8] {
        &self.cipher_and_tag[..self.cipher_and_tag.len() - TAG_SIZE]
    }

    /// Trailing authentication tag
    pub fn tag(&self) -> &[u8] {
        &self.cipher_and_tag[self.cipher_and_tag.len() - TAG_SIZE..]
    }
}

/// Read a stream to its end into a wiping buffer
///
/// Growing a `Vec` in place leaves the old allocation behind unwiped, so when
/// the buffer is full its contents move into a larger `Zeroizing` buffer and
/// the old one is cleared on drop.
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
            let wanted = (buf.len() + n).max(buf.capacity() * 2);
            let mut grown = Zeroizing::new(Vec::with_capacity(wanted));
            grown.extend_from_slice(buf);
            std::mem::swap(buf, &mut grown);
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Ok(buf.len() - start)
}

/// Read an exact fixed-size field, mapping a short read to a format error
fn read_fixed<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::format("truncated header"),
        _ => Error::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed(header: &[u8], declared_len: u32, body: &[u8]) -> Vec<u8> {
        let mut out = MAGIC.to_vec();
        out.extend_from_slice(&declared_len.to_be_bytes());
        out.extend_from_slice(header);
        out.extend_from_slice(body);
        out
    }

    fn valid_header() -> Vec<u8> {
        ContainerHeader::new(10, vec![1; 16], [2; 12]).to_bytes().unwrap()
    }

    #[test]
    fn test_read_splits_ciphertext_and_tag() {
        let header = valid_header();
        let body: Vec<u8> = (0u8..40).collect();
        let container =
            EncryptedContainer::from_bytes(&framed(&header, header.len() as u32, &body)).unwrap();

        assert_eq!(container.ciphertext(), &body[..24]);
        assert_eq!(container.tag(), &body[24..]);
        assert_eq!(container.header().iterations, 10);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = framed(&valid_header(), valid_header().len() as u32, &[0; 16]);
        bytes[0] = b'X';
        let err = EncryptedContainer::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.to_string(), "Invalid container format: bad magic");
    }

    #[test]
    fn test_short_magic_is_truncated() {
        let err = EncryptedContainer::from_bytes(b"ZEN").unwrap_err();
        assert_eq!(err.to_string(), "Invalid container format: truncated header");
    }

    #[test]
    fn test_short_length_field_is_truncated() {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[0, 0]);
        let err = EncryptedContainer::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.to_string(), "Invalid container format: truncated header");
    }

    #[test]
    fn test_header_shorter_than_declared() {
        let header = valid_header();
        let bytes = framed(&header[..10], header.len() as u32, &[]);
        let err = EncryptedContainer::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.to_string(), "Invalid container format: truncated header");
    }

    #[test]
    fn test_body_shorter_than_tag() {
        let header = valid_header();
        let bytes = framed(&header, header.len() as u32, &[0; 15]);
        let err = EncryptedContainer::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.to_string(), "Invalid container format: ciphertext too short");
    }

    #[test]
    fn test_tag_only_body_is_accepted() {
        let header = valid_header();
        let bytes = framed(&header, header.len() as u32, &[0; 16]);
        let container = EncryptedContainer::from_bytes(&bytes).unwrap();
        assert!(container.ciphertext().is_empty());
    }

    /// Hands out at most a few bytes per call
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(self.0.len()).min(3);
            buf[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_wiping_read_grows_past_initial_capacity() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        let mut buf = Zeroizing::new(Vec::with_capacity(4));
        let n = read_to_end_wiping(&mut data.as_slice(), &mut buf).unwrap();
        assert_eq!(n, data.len());
        assert_eq!(buf.as_slice(), data.as_slice());
    }

    #[test]
    fn test_wiping_read_short_reads() {
        let data: Vec<u8> = (0u8..=255).collect();
        let mut buf = Zeroizing::new(vec![9u8]);
        let n = read_to_end_wiping(&mut Trickle(&data), &mut buf).unwrap();
        assert_eq!(n, 256);
        assert_eq!(buf[0], 9);
        assert_eq!(&buf[1..], data.as_slice());
    }

    #[test]
    fn test_streamed_body_larger_than_a_chunk() {
        let header = valid_header();
        let body: Vec<u8> = (0..50_000u32).map(|i| (i % 13) as u8).collect();
        let bytes = framed(&header, header.len() as u32, &body);
        let container = EncryptedContainer::read(Trickle(&bytes)).unwrap();
        assert_eq!(container.ciphertext().len(), body.len() - TAG_SIZE);
        assert_eq!(container.tag(), &body[body.len() - TAG_SIZE..]);
    }

    #[test]
    fn test_from_bytes_body_needs_no_growth() {
        let header = valid_header();
        let body = vec![5u8; 30_000];
        let bytes = framed(&header, header.len() as u32, &body);
        let container = EncryptedContainer::from_bytes(&bytes).unwrap();
        assert_eq!(container.cipher_and_tag.len(), body.len());
        assert!(container.cipher_and_tag.capacity() >= body.len());
        assert!(container.cipher_and_tag.capacity() < body.len() + 8192);
    }

    #[test]
    fn test_write_reproduces_input() {
        let header = valid_header();
        let bytes = framed(&header, header.len() as u32, &[3; 20]);
        let container = EncryptedContainer::from_bytes(&bytes).unwrap();
        assert_eq!(container.to_bytes().unwrap(), bytes);
    }
}
