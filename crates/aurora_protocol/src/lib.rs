//! # AURORA Protocol
//!
//! The binary wire contract between the server-side widget tree and the
//! remote renderer.
//!
//! ## Architecture
//!
//! - **Types**: identity newtypes and wire-stable enums shared by both sides
//! - **Codec**: symmetric reader/writer pair over little-endian byte streams
//! - **Packets**: length-prefixed records pushing and retracting widget state
//!
//! ## Compatibility Model
//!
//! Every widget kind carries its own version number, written into each
//! `WidgetState` record. Evolution is additive: a newer writer may append
//! fields, and a receiver that understands version `n` can decode any stream
//! written at version `<= n`. Decoding a newer stream with an older receiver
//! is out of contract.

pub mod codec;
pub mod error;
pub mod packets;
pub mod types;

pub use codec::{PacketReader, PacketWriter};
pub use error::CodecError;
pub use packets::{
    OutboundPacket, Packet, PacketType, ProtocolVersionPacket, WidgetRemovePacket,
    WidgetStatePacket,
};
pub use types::{Anchor, RenderPriority, ViewerId, WidgetId, WidgetTypeId};

/// Protocol revision advertised during the session handshake.
///
/// Bumped when a new packet kind is added. Widget payload evolution does NOT
/// bump this - payloads are versioned per kind.
pub const PROTOCOL_REVISION: u64 = 1;

/// Hard ceiling on a single framed packet, header included.
///
/// Large enough for any realistic widget payload, small enough to catch a
/// corrupt length prefix before allocating.
pub const MAX_FRAME_SIZE: usize = 64 * 1024;
