//! Self-describing binary record codec.
//!
//! A dataset stream is a 4-byte dataset magic, zero or more tagged records,
//! and exactly one terminating end record.
//!
//! ## Stream Layout
//!
//! ```text
//! +----------------------+
//! | dataset magic (4)    |
//! +----------------------+
//! | record header (4)    |  magic (1) | payload size (2, LE i16) | tag (1)
//! | payload (variable)   |  0 bytes for Row/End, 4 for Float, len+1 for String
//! +----------------------+
//! | ...                  |
//! +----------------------+
//! | End record header (4)|
//! +----------------------+
//! ```
//!
//! The codec carries no semantics beyond the four tag kinds and their
//! payload-size conventions; interpreting payloads is the featurizer's job.

use crate::error::{Result, VigilError};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Magic byte at the start of every record header.
pub const RECORD_MAGIC: u8 = 0x46;

/// Magic number at the start of every dataset stream.
pub const DATASET_MAGIC: u32 = 0x0000_0001;

/// Size of a packed record header in bytes.
pub const RECORD_HEADER_SIZE: usize = 4;

/// Size of the dataset magic number in bytes.
pub const DATASET_MAGIC_SIZE: usize = 4;

/// The kind of a record in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordKind {
    /// Marks the beginning of a row.
    Row = 0,
    /// Marks the end of the dataset.
    End = 1,
    /// A 4-byte IEEE-754 float payload.
    Float = 2,
    /// A NUL-terminated string payload.
    String = 3,
}

impl RecordKind {
    fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(RecordKind::Row),
            1 => Ok(RecordKind::End),
            2 => Ok(RecordKind::Float),
            3 => Ok(RecordKind::String),
            other => Err(VigilError::HeaderMismatch(format!(
                "unknown record tag: {other}"
            ))),
        }
    }
}

/// A decoded record header.
#[derive(Debug, Clone, Copy)]
pub struct RecordHeader {
    /// Payload size in bytes.
    pub size: i16,
    /// Record kind tag.
    pub kind: RecordKind,
}

impl RecordHeader {
    fn to_bytes(self) -> [u8; RECORD_HEADER_SIZE] {
        let size = self.size.to_le_bytes();
        [RECORD_MAGIC, size[0], size[1], self.kind as u8]
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes[0] != RECORD_MAGIC {
            return Err(VigilError::HeaderMismatch(format!(
                "record magic mismatch: actual = {:#04x}, expected = {:#04x}",
                bytes[0], RECORD_MAGIC
            )));
        }
        let size = i16::from_le_bytes([bytes[1], bytes[2]]);
        if size < 0 {
            return Err(VigilError::HeaderMismatch(format!(
                "negative record payload size: {size}"
            )));
        }
        Ok(Self {
            size,
            kind: RecordKind::from_byte(bytes[3])?,
        })
    }
}

/// Streaming encoder over a fixed-capacity buffer.
///
/// Appends records sequentially. Capacity checks always reserve room for one
/// more record header, so the terminating end marker can be appended after
/// any successful write; callers must still append it themselves before
/// flushing. Appends are atomic: a failed append writes nothing and leaves
/// the stream well-formed.
#[derive(Debug)]
pub struct Encoder {
    buffer: Vec<u8>,
    bytes_written: usize,
}

impl Encoder {
    /// Creates an encoder with the given buffer capacity and writes the
    /// dataset magic number.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < DATASET_MAGIC_SIZE {
            return Err(VigilError::BufferExhausted {
                needed: DATASET_MAGIC_SIZE,
                available: capacity,
            });
        }

        let mut encoder = Self {
            buffer: vec![0u8; capacity],
            bytes_written: 0,
        };
        encoder.reserve(DATASET_MAGIC_SIZE)?;
        encoder.put(&DATASET_MAGIC.to_le_bytes());
        Ok(encoder)
    }

    /// Checks that `additional` bytes fit, reserving room for a trailing
    /// record header.
    fn reserve(&self, additional: usize) -> Result<()> {
        let needed = self.bytes_written + additional + RECORD_HEADER_SIZE;
        if needed > self.buffer.len() {
            return Err(VigilError::BufferExhausted {
                needed,
                available: self.buffer.len(),
            });
        }
        Ok(())
    }

    /// Appends raw bytes. The caller has already reserved capacity.
    fn put(&mut self, bytes: &[u8]) {
        self.buffer[self.bytes_written..self.bytes_written + bytes.len()].copy_from_slice(bytes);
        self.bytes_written += bytes.len();
    }

    fn put_marker(&mut self, kind: RecordKind) -> Result<()> {
        self.reserve(RECORD_HEADER_SIZE)?;
        self.put(&RecordHeader { size: 0, kind }.to_bytes());
        Ok(())
    }

    /// Appends a row marker (zero payload).
    pub fn write_row_marker(&mut self) -> Result<()> {
        self.put_marker(RecordKind::Row)
    }

    /// Appends the end-of-dataset marker (zero payload).
    pub fn write_end_marker(&mut self) -> Result<()> {
        self.put_marker(RecordKind::End)
    }

    /// Appends a float record.
    pub fn write_float(&mut self, value: f32) -> Result<()> {
        self.reserve(RECORD_HEADER_SIZE + 4)?;
        self.put(
            &RecordHeader {
                size: 4,
                kind: RecordKind::Float,
            }
            .to_bytes(),
        );
        self.put(&value.to_le_bytes());
        Ok(())
    }

    /// Appends a string record. The payload is the string bytes plus a NUL
    /// terminator and must fit the header's 16-bit size field.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        let bytes = value.as_bytes();
        let size = i16::try_from(bytes.len() + 1)
            .map_err(|_| VigilError::PayloadTooLarge(bytes.len() + 1))?;

        self.reserve(RECORD_HEADER_SIZE + bytes.len() + 1)?;
        self.put(
            &RecordHeader {
                size,
                kind: RecordKind::String,
            }
            .to_bytes(),
        );
        self.put(bytes);
        self.put(&[0u8]);
        Ok(())
    }

    /// Returns the number of bytes written so far.
    #[inline]
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Returns the encoded stream as a byte slice, trailing capacity included.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Writes the entire buffer to a file, unused trailing capacity included.
    pub fn flush_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(&path)
            .map_err(|_| VigilError::FileNotFound(path.as_ref().to_path_buf()))?;
        file.write_all(&self.buffer)?;
        Ok(())
    }
}

/// Streaming decoder over an owned buffer.
///
/// Payload slices returned by [`Decoder::next`] are views into the decoder's
/// buffer and live only as long as the decoder.
#[derive(Debug)]
pub struct Decoder {
    buffer: Vec<u8>,
    bytes_read: usize,
}

impl Decoder {
    /// Reads a dataset file into memory and validates the dataset magic.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let buffer = std::fs::read(&path)
            .map_err(|_| VigilError::FileNotFound(path.as_ref().to_path_buf()))?;
        Self::from_bytes(buffer)
    }

    /// Wraps an in-memory dataset buffer and validates the dataset magic.
    pub fn from_bytes(buffer: Vec<u8>) -> Result<Self> {
        if buffer.len() < DATASET_MAGIC_SIZE {
            return Err(VigilError::HeaderMismatch(format!(
                "dataset too short for magic number: {} bytes",
                buffer.len()
            )));
        }

        let magic = u32::from_le_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]);
        if magic != DATASET_MAGIC {
            return Err(VigilError::HeaderMismatch(format!(
                "dataset magic mismatch: actual = {magic:#010x}, expected = {DATASET_MAGIC:#010x}"
            )));
        }

        Ok(Self {
            buffer,
            bytes_read: DATASET_MAGIC_SIZE,
        })
    }

    /// Parses the record header at the cursor without advancing.
    fn peek_header(&self) -> Result<RecordHeader> {
        if self.bytes_read + RECORD_HEADER_SIZE > self.buffer.len() {
            return Err(VigilError::HeaderMismatch(format!(
                "record header extends past end of buffer at offset {}",
                self.bytes_read
            )));
        }
        RecordHeader::from_bytes(&self.buffer[self.bytes_read..self.bytes_read + RECORD_HEADER_SIZE])
    }

    /// Returns true once the cursor has reached the end of the buffer or the
    /// record at the cursor is the end marker.
    ///
    /// A magic mismatch at the cursor is reported as a header error, distinct
    /// from normal completion.
    pub fn is_done(&self) -> Result<bool> {
        if self.bytes_read >= self.buffer.len() {
            return Ok(true);
        }
        let header = self.peek_header()?;
        Ok(header.kind == RecordKind::End)
    }

    /// Decodes the record at the cursor and advances past it.
    ///
    /// Returns the header and a view of the payload bytes. The payload is not
    /// copied and is not interpreted.
    pub fn next(&mut self) -> Result<(RecordHeader, &[u8])> {
        let header = self.peek_header()?;
        self.bytes_read += RECORD_HEADER_SIZE;

        let payload_end = self.bytes_read + header.size as usize;
        if payload_end > self.buffer.len() {
            return Err(VigilError::HeaderMismatch(format!(
                "record payload extends past end of buffer at offset {}",
                self.bytes_read
            )));
        }

        let payload = &self.buffer[self.bytes_read..payload_end];
        self.bytes_read = payload_end;
        Ok((header, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_roundtrip_floats_and_strings() {
        let mut encoder = Encoder::new(1024).unwrap();
        encoder.write_row_marker().unwrap();
        encoder.write_float(1.5).unwrap();
        encoder.write_string("/usr/bin/ssh").unwrap();
        encoder.write_row_marker().unwrap();
        encoder.write_float(-2.25).unwrap();
        encoder.write_string("/bin/mv").unwrap();
        encoder.write_end_marker().unwrap();

        let mut decoder = Decoder::from_bytes(encoder.as_bytes().to_vec()).unwrap();

        let (header, _) = decoder.next().unwrap();
        assert_eq!(header.kind, RecordKind::Row);
        assert_eq!(header.size, 0);

        let (header, payload) = decoder.next().unwrap();
        assert_eq!(header.kind, RecordKind::Float);
        assert_eq!(f32::from_le_bytes(payload.try_into().unwrap()), 1.5);

        let (header, payload) = decoder.next().unwrap();
        assert_eq!(header.kind, RecordKind::String);
        assert_eq!(&payload[..payload.len() - 1], b"/usr/bin/ssh");
        assert_eq!(payload[payload.len() - 1], 0);

        let (header, _) = decoder.next().unwrap();
        assert_eq!(header.kind, RecordKind::Row);
        let (_, payload) = decoder.next().unwrap();
        assert_eq!(f32::from_le_bytes(payload.try_into().unwrap()), -2.25);
        let (_, payload) = decoder.next().unwrap();
        assert_eq!(&payload[..payload.len() - 1], b"/bin/mv");

        assert!(decoder.is_done().unwrap());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.dat");

        let mut encoder = Encoder::new(256).unwrap();
        encoder.write_row_marker().unwrap();
        encoder.write_float(3.75).unwrap();
        encoder.write_end_marker().unwrap();
        encoder.flush_to_file(&path).unwrap();

        let mut decoder = Decoder::open(&path).unwrap();
        let (header, _) = decoder.next().unwrap();
        assert_eq!(header.kind, RecordKind::Row);
        let (_, payload) = decoder.next().unwrap();
        assert_eq!(f32::from_le_bytes(payload.try_into().unwrap()), 3.75);
        assert!(decoder.is_done().unwrap());
    }

    #[test]
    fn test_dataset_magic_mismatch() {
        let mut encoder = Encoder::new(64).unwrap();
        encoder.write_end_marker().unwrap();

        let mut bytes = encoder.as_bytes().to_vec();
        bytes[0] ^= 0xFF;

        let result = Decoder::from_bytes(bytes);
        assert!(matches!(result, Err(VigilError::HeaderMismatch(_))));
    }

    #[test]
    fn test_record_magic_mismatch() {
        let mut encoder = Encoder::new(64).unwrap();
        encoder.write_row_marker().unwrap();
        encoder.write_end_marker().unwrap();

        let mut bytes = encoder.as_bytes().to_vec();
        // Corrupt the first record's magic byte, just past the dataset magic.
        bytes[DATASET_MAGIC_SIZE] ^= 0xFF;

        let mut decoder = Decoder::from_bytes(bytes).unwrap();
        assert!(matches!(
            decoder.next(),
            Err(VigilError::HeaderMismatch(_))
        ));
        assert!(matches!(
            decoder.is_done(),
            Err(VigilError::HeaderMismatch(_))
        ));
    }

    #[test]
    fn test_buffer_exhaustion() {
        // Room for the dataset magic and one header, but not two.
        let mut encoder = Encoder::new(12).unwrap();
        encoder.write_row_marker().unwrap();
        assert!(matches!(
            encoder.write_row_marker(),
            Err(VigilError::BufferExhausted { .. })
        ));
    }

    #[test]
    fn test_capacity_too_small_for_magic() {
        assert!(matches!(
            Encoder::new(2),
            Err(VigilError::BufferExhausted { .. })
        ));
    }

    #[test]
    fn test_empty_dataset_is_done() {
        let mut encoder = Encoder::new(64).unwrap();
        encoder.write_end_marker().unwrap();

        let decoder = Decoder::from_bytes(encoder.as_bytes().to_vec()).unwrap();
        assert!(decoder.is_done().unwrap());
    }

    #[test]
    fn test_negative_payload_size_rejected() {
        let mut bytes = DATASET_MAGIC.to_le_bytes().to_vec();
        // A size field of -1 must not be reinterpreted as a huge length.
        bytes.extend_from_slice(&[RECORD_MAGIC, 0xFF, 0xFF, RecordKind::Float as u8]);

        let mut decoder = Decoder::from_bytes(bytes).unwrap();
        assert!(matches!(
            decoder.is_done(),
            Err(VigilError::HeaderMismatch(_))
        ));
        assert!(matches!(
            decoder.next(),
            Err(VigilError::HeaderMismatch(_))
        ));
    }

    #[test]
    fn test_oversized_string_rejected() {
        let mut encoder = Encoder::new(65_536).unwrap();
        // Payload of 40_001 bytes (with the NUL) overflows the i16 size field.
        let result = encoder.write_string(&"a".repeat(40_000));
        assert!(matches!(result, Err(VigilError::PayloadTooLarge(_))));
        assert_eq!(encoder.bytes_written(), DATASET_MAGIC_SIZE);
    }

    #[test]
    fn test_failed_append_leaves_stream_well_formed() {
        // Room for the dataset magic and one header, but not a float record.
        let mut encoder = Encoder::new(15).unwrap();
        assert!(matches!(
            encoder.write_float(1.0),
            Err(VigilError::BufferExhausted { .. })
        ));
        assert_eq!(encoder.bytes_written(), DATASET_MAGIC_SIZE);

        encoder.write_end_marker().unwrap();
        let decoder = Decoder::from_bytes(encoder.as_bytes().to_vec()).unwrap();
        assert!(decoder.is_done().unwrap());
    }

    #[test]
    fn test_truncated_payload() {
        let mut bytes = DATASET_MAGIC.to_le_bytes().to_vec();
        // A float header claiming 4 payload bytes, with none following.
        bytes.extend_from_slice(&[RECORD_MAGIC, 4, 0, RecordKind::Float as u8]);

        let mut decoder = Decoder::from_bytes(bytes).unwrap();
        assert!(matches!(
            decoder.next(),
            Err(VigilError::HeaderMismatch(_))
        ));
    }
}
