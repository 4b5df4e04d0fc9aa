//! # Packet Codec
//!
//! Symmetric reader/writer pair for the wire format.
//!
//! ## Design
//!
//! - Little-endian throughout
//! - Writer appends into a growable buffer that is reused between packets
//! - Reader tracks its position over a borrowed slice; every read is bounds
//!   checked and returns a [`CodecError`] instead of panicking
//! - Strings are u16-length-prefixed UTF-8; raw byte payloads are
//!   u32-length-prefixed

use crate::error::{CodecError, CodecResult};
use crate::types::{Anchor, RenderPriority, WidgetId};
use uuid::Uuid;

/// Writes wire values into a growable byte buffer.
///
/// Reuse one writer across packets with [`PacketWriter::reset`] to keep the
/// allocation.
#[derive(Debug, Default)]
pub struct PacketWriter {
    buffer: Vec<u8>,
}

impl PacketWriter {
    /// Creates an empty writer.
    #[must_use]
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Creates a writer with pre-reserved capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Clears the buffer for reuse, keeping its allocation.
    #[inline]
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Returns the number of bytes written.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if no bytes have been written.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns a slice of the written data.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the writer, returning the buffer.
    #[inline]
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Writes a bool as one byte (0 or 1).
    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.buffer.push(u8::from(value));
    }

    /// Writes a u16 in little-endian format.
    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a u32 in little-endian format.
    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a u64 in little-endian format.
    #[inline]
    pub fn write_u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes an i32 in little-endian format.
    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a 128-bit widget identity as 16 raw bytes.
    #[inline]
    pub fn write_widget_id(&mut self, id: WidgetId) {
        self.buffer.extend_from_slice(id.as_uuid().as_bytes());
    }

    /// Writes an anchor discriminant.
    #[inline]
    pub fn write_anchor(&mut self, anchor: Anchor) {
        self.write_u8(anchor as u8);
    }

    /// Writes a render priority discriminant.
    #[inline]
    pub fn write_priority(&mut self, priority: RenderPriority) {
        self.write_u8(priority as u8);
    }

    /// Writes a u16-length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::StringTooLong`] if the string exceeds the u16
    /// length prefix.
    pub fn write_str(&mut self, value: &str) -> CodecResult<()> {
        let bytes = value.as_bytes();
        let len = u16::try_from(bytes.len()).map_err(|_| CodecError::StringTooLong(bytes.len()))?;
        self.write_u16(len);
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    /// Writes a u32-length-prefixed opaque byte payload.
    pub fn write_bytes(&mut self, value: &[u8]) {
        // Payloads are bounded by MAX_FRAME_SIZE well before u32::MAX.
        #[allow(clippy::cast_possible_truncation)]
        self.write_u32(value.len() as u32);
        self.buffer.extend_from_slice(value);
    }
}

/// Reads wire values from a borrowed byte slice.
#[derive(Debug)]
pub struct PacketReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> PacketReader<'a> {
    /// Creates a reader over a buffer.
    #[must_use]
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Returns the number of bytes not yet consumed.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Returns true if the reader has consumed the whole buffer.
    #[inline]
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, count: usize) -> CodecResult<&'a [u8]> {
        let remaining = self.remaining();
        if count > remaining {
            return Err(CodecError::Truncated {
                needed: count - remaining,
                remaining,
            });
        }
        let slice = &self.buffer[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    /// Reads a single byte.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Truncated`] if the stream is exhausted.
    pub fn read_u8(&mut self) -> CodecResult<u8> {
        Ok(self.take(1)?[0])
    }

    /// Reads a bool encoded as one byte; any nonzero value is true.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Truncated`] if the stream is exhausted.
    pub fn read_bool(&mut self) -> CodecResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Reads a little-endian u16.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Truncated`] if fewer than 2 bytes remain.
    pub fn read_u16(&mut self) -> CodecResult<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Reads a little-endian u32.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Truncated`] if fewer than 4 bytes remain.
    pub fn read_u32(&mut self) -> CodecResult<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a little-endian u64.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Truncated`] if fewer than 8 bytes remain.
    pub fn read_u64(&mut self) -> CodecResult<u64> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(raw))
    }

    /// Reads a little-endian i32.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Truncated`] if fewer than 4 bytes remain.
    pub fn read_i32(&mut self) -> CodecResult<i32> {
        let bytes = self.take(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a 128-bit widget identity.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Truncated`] if fewer than 16 bytes remain.
    pub fn read_widget_id(&mut self) -> CodecResult<WidgetId> {
        let bytes = self.take(16)?;
        let mut raw = [0u8; 16];
        raw.copy_from_slice(bytes);
        Ok(WidgetId::from_uuid(Uuid::from_bytes(raw)))
    }

    /// Reads an anchor discriminant.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Truncated`] or [`CodecError::UnknownAnchor`].
    pub fn read_anchor(&mut self) -> CodecResult<Anchor> {
        Anchor::from_wire(self.read_u8()?)
    }

    /// Reads a render priority discriminant.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Truncated`] or [`CodecError::UnknownPriority`].
    pub fn read_priority(&mut self) -> CodecResult<RenderPriority> {
        RenderPriority::from_wire(self.read_u8()?)
    }

    /// Reads a u16-length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Truncated`] or [`CodecError::InvalidUtf8`].
    pub fn read_str(&mut self) -> CodecResult<String> {
        let len = self.read_u16()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }

    /// Reads a u32-length-prefixed opaque byte payload.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Truncated`] if the prefix overruns the stream.
    pub fn read_bytes(&mut self) -> CodecResult<Vec<u8>> {
        let len = self.read_u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_round_trip() {
        let mut writer = PacketWriter::new();
        writer.write_u8(0xAB);
        writer.write_bool(true);
        writer.write_u16(0xBEEF);
        writer.write_u32(0xDEAD_BEEF);
        writer.write_u64(0x0123_4567_89AB_CDEF);
        writer.write_i32(-42);

        let mut reader = PacketReader::new(writer.as_slice());
        assert_eq!(reader.read_u8().unwrap(), 0xAB);
        assert!(reader.read_bool().unwrap());
        assert_eq!(reader.read_u16().unwrap(), 0xBEEF);
        assert_eq!(reader.read_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(reader.read_u64().unwrap(), 0x0123_4567_89AB_CDEF);
        assert_eq!(reader.read_i32().unwrap(), -42);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn test_string_round_trip() {
        let mut writer = PacketWriter::new();
        writer.write_str("health: 20/20 ♥").unwrap();
        writer.write_str("").unwrap();

        let mut reader = PacketReader::new(writer.as_slice());
        assert_eq!(reader.read_str().unwrap(), "health: 20/20 ♥");
        assert_eq!(reader.read_str().unwrap(), "");
    }

    #[test]
    fn test_string_too_long_rejected() {
        let mut writer = PacketWriter::new();
        let oversized = "x".repeat(usize::from(u16::MAX) + 1);
        assert_eq!(
            writer.write_str(&oversized),
            Err(CodecError::StringTooLong(usize::from(u16::MAX) + 1))
        );
    }

    #[test]
    fn test_widget_id_round_trip() {
        let id = WidgetId::generate();
        let mut writer = PacketWriter::new();
        writer.write_widget_id(id);

        let mut reader = PacketReader::new(writer.as_slice());
        assert_eq!(reader.read_widget_id().unwrap(), id);
    }

    #[test]
    fn test_bytes_round_trip() {
        let payload = vec![1u8, 2, 3, 4, 5];
        let mut writer = PacketWriter::new();
        writer.write_bytes(&payload);

        let mut reader = PacketReader::new(writer.as_slice());
        assert_eq!(reader.read_bytes().unwrap(), payload);
    }

    #[test]
    fn test_truncated_read_reports_shortfall() {
        let mut reader = PacketReader::new(&[0x01, 0x02]);
        assert_eq!(
            reader.read_u32(),
            Err(CodecError::Truncated {
                needed: 2,
                remaining: 2
            })
        );
        // A failed read consumes nothing.
        assert_eq!(reader.remaining(), 2);
    }

    #[test]
    fn test_truncated_string_body() {
        // Length prefix promises 10 bytes, only 3 present.
        let mut writer = PacketWriter::new();
        writer.write_u16(10);
        writer.write_u8(b'a');
        writer.write_u8(b'b');
        writer.write_u8(b'c');

        let mut reader = PacketReader::new(writer.as_slice());
        assert_eq!(
            reader.read_str(),
            Err(CodecError::Truncated {
                needed: 7,
                remaining: 3
            })
        );
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut writer = PacketWriter::new();
        writer.write_u16(2);
        writer.write_u8(0xFF);
        writer.write_u8(0xFE);

        let mut reader = PacketReader::new(writer.as_slice());
        assert_eq!(reader.read_str(), Err(CodecError::InvalidUtf8));
    }

    #[test]
    fn test_writer_reset_keeps_nothing() {
        let mut writer = PacketWriter::new();
        writer.write_u32(7);
        writer.reset();
        assert!(writer.is_empty());
        writer.write_u8(1);
        assert_eq!(writer.as_slice(), &[1]);
    }
}
