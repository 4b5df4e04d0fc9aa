//! # Wire Packets
//!
//! The length-prefixed records the synchronization engine emits.
//!
//! ## Framing
//!
//! Each record is `[u32 body length][u8 packet type][body]`. The length
//! prefix covers the type byte and the body, so a receiver can skip packet
//! kinds it does not understand without decoding them.
//!
//! ## Records
//!
//! - [`WidgetStatePacket`]: pushes one widget's serialized state to a screen
//! - [`WidgetRemovePacket`]: retracts a widget from a screen
//! - [`ProtocolVersionPacket`]: session version handshake

use crate::codec::{PacketReader, PacketWriter};
use crate::error::{CodecError, CodecResult};
use crate::types::{ViewerId, WidgetId, WidgetTypeId};
use crate::MAX_FRAME_SIZE;

/// Packet type discriminants. Wire format, append only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketType {
    /// Widget state push.
    WidgetState = 0,
    /// Widget retraction.
    WidgetRemove = 1,
    /// Session version handshake.
    ProtocolVersion = 2,
}

impl PacketType {
    /// Decodes a packet type from its wire discriminant.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownPacketType`] for values outside the enum.
    pub fn from_wire(value: u8) -> CodecResult<Self> {
        match value {
            0 => Ok(Self::WidgetState),
            1 => Ok(Self::WidgetRemove),
            2 => Ok(Self::ProtocolVersion),
            other => Err(CodecError::UnknownPacketType(other)),
        }
    }
}

/// Pushes one widget's state to the screen it is attached to.
///
/// The payload is the widget's own `write_data` output, opaque at this
/// layer and versioned per kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetStatePacket {
    /// Screen the widget is attached to.
    pub screen_id: WidgetId,
    /// Registry type id of the widget kind.
    pub type_id: WidgetTypeId,
    /// Identity of the widget being pushed.
    pub widget_id: WidgetId,
    /// Payload version the sender encoded at.
    pub version: u16,
    /// Kind-specific serialized state.
    pub payload: Vec<u8>,
}

impl WidgetStatePacket {
    /// Encodes the body (everything after the type byte).
    pub fn encode(&self, writer: &mut PacketWriter) {
        writer.write_widget_id(self.screen_id);
        writer.write_u16(self.type_id.raw());
        writer.write_widget_id(self.widget_id);
        writer.write_u16(self.version);
        writer.write_bytes(&self.payload);
    }

    /// Decodes the body.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if the stream is truncated.
    pub fn decode(reader: &mut PacketReader<'_>) -> CodecResult<Self> {
        Ok(Self {
            screen_id: reader.read_widget_id()?,
            type_id: WidgetTypeId(reader.read_u16()?),
            widget_id: reader.read_widget_id()?,
            version: reader.read_u16()?,
            payload: reader.read_bytes()?,
        })
    }
}

/// Retracts a widget from a screen on the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetRemovePacket {
    /// Identity of the widget being removed.
    pub widget_id: WidgetId,
    /// Screen it is being removed from.
    pub screen_id: WidgetId,
}

impl WidgetRemovePacket {
    /// Encodes the body.
    pub fn encode(&self, writer: &mut PacketWriter) {
        writer.write_widget_id(self.widget_id);
        writer.write_widget_id(self.screen_id);
    }

    /// Decodes the body.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if the stream is truncated.
    pub fn decode(reader: &mut PacketReader<'_>) -> CodecResult<Self> {
        Ok(Self {
            widget_id: reader.read_widget_id()?,
            screen_id: reader.read_widget_id()?,
        })
    }
}

/// Session version handshake, sent once when a viewer connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolVersionPacket {
    /// Protocol revision the sender speaks.
    pub version: u64,
}

impl ProtocolVersionPacket {
    /// Encodes the body.
    pub fn encode(&self, writer: &mut PacketWriter) {
        writer.write_u64(self.version);
    }

    /// Decodes the body.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if the stream is truncated.
    pub fn decode(reader: &mut PacketReader<'_>) -> CodecResult<Self> {
        Ok(Self {
            version: reader.read_u64()?,
        })
    }
}

/// Any packet the core produces or consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    /// Widget state push.
    WidgetState(WidgetStatePacket),
    /// Widget retraction.
    WidgetRemove(WidgetRemovePacket),
    /// Session version handshake.
    ProtocolVersion(ProtocolVersionPacket),
}

impl Packet {
    /// Returns the packet's type discriminant.
    #[must_use]
    pub const fn packet_type(&self) -> PacketType {
        match self {
            Self::WidgetState(_) => PacketType::WidgetState,
            Self::WidgetRemove(_) => PacketType::WidgetRemove,
            Self::ProtocolVersion(_) => PacketType::ProtocolVersion,
        }
    }

    /// Encodes the packet as a framed record.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::FrameTooLarge`] if the encoded record exceeds
    /// [`MAX_FRAME_SIZE`].
    pub fn encode_frame(&self) -> CodecResult<Vec<u8>> {
        let mut body = PacketWriter::new();
        body.write_u8(self.packet_type() as u8);
        match self {
            Self::WidgetState(p) => p.encode(&mut body),
            Self::WidgetRemove(p) => p.encode(&mut body),
            Self::ProtocolVersion(p) => p.encode(&mut body),
        }

        let body_len = body.len();
        if body_len + 4 > MAX_FRAME_SIZE {
            return Err(CodecError::FrameTooLarge(body_len + 4));
        }

        let mut frame = PacketWriter::with_capacity(body_len + 4);
        // Bounded by MAX_FRAME_SIZE, so the cast cannot truncate.
        #[allow(clippy::cast_possible_truncation)]
        frame.write_u32(body_len as u32);
        let mut bytes = frame.into_bytes();
        bytes.extend_from_slice(body.as_slice());
        Ok(bytes)
    }

    /// Decodes one framed record from the front of `buffer`.
    ///
    /// Returns the packet and the number of bytes consumed, so a receiver
    /// can decode back-to-back records from one stream.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] on a truncated, oversized, or unknown-type
    /// frame. A failed decode consumes nothing.
    pub fn decode_frame(buffer: &[u8]) -> CodecResult<(Self, usize)> {
        let mut reader = PacketReader::new(buffer);
        let declared = reader.read_u32()? as usize;
        if declared + 4 > MAX_FRAME_SIZE {
            return Err(CodecError::FrameTooLarge(declared + 4));
        }
        if reader.remaining() < declared {
            return Err(CodecError::Truncated {
                needed: declared - reader.remaining(),
                remaining: reader.remaining(),
            });
        }

        let body = &buffer[4..4 + declared];
        let mut body_reader = PacketReader::new(body);
        let packet_type = PacketType::from_wire(body_reader.read_u8()?)?;
        let packet = match packet_type {
            PacketType::WidgetState => Self::WidgetState(WidgetStatePacket::decode(&mut body_reader)?),
            PacketType::WidgetRemove => Self::WidgetRemove(WidgetRemovePacket::decode(&mut body_reader)?),
            PacketType::ProtocolVersion => {
                Self::ProtocolVersion(ProtocolVersionPacket::decode(&mut body_reader)?)
            }
        };

        if !body_reader.is_exhausted() {
            return Err(CodecError::FrameLengthMismatch {
                declared,
                actual: declared - body_reader.remaining(),
            });
        }

        Ok((packet, 4 + declared))
    }
}

/// A packet addressed to one viewer, ready for the external send path.
///
/// The core guarantees nothing about delivery; the send path must provide
/// reliable, in-order delivery per viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundPacket {
    /// Target renderer.
    pub viewer: ViewerId,
    /// The record to deliver.
    pub packet: Packet,
}
