//! # Outbound Packet Queue
//!
//! The boundary between the synchronous core and the asynchronous send
//! path: the tick pass enqueues addressed packets here, the transport
//! drains the other end.
//!
//! ## Design
//!
//! - Bounded channel; the tick pass must never block on a slow transport
//! - A full queue drops the packet with a warning: the renderer self-heals
//!   on the next dirty push, which beats stalling every screen

use std::sync::Arc;

use aurora_gui::PacketSink;
use aurora_protocol::OutboundPacket;
use crossbeam_channel::{bounded, Receiver, TrySendError};
use tracing::warn;

/// [`PacketSink`] backed by a bounded crossbeam channel.
pub struct ChannelSink {
    tx: crossbeam_channel::Sender<OutboundPacket>,
}

impl ChannelSink {
    /// Creates a sink with the given capacity, returning the receiver the
    /// transport drains.
    #[must_use]
    pub fn bounded(capacity: usize) -> (Arc<Self>, Receiver<OutboundPacket>) {
        let (tx, rx) = bounded(capacity);
        (Arc::new(Self { tx }), rx)
    }
}

impl PacketSink for ChannelSink {
    fn send(&self, packet: OutboundPacket) {
        match self.tx.try_send(packet) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                warn!(
                    viewer = dropped.viewer.0,
                    "outbound queue full; dropping packet"
                );
            }
            Err(TrySendError::Disconnected(dropped)) => {
                warn!(
                    viewer = dropped.viewer.0,
                    "outbound queue disconnected; dropping packet"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurora_protocol::{Packet, ProtocolVersionPacket, ViewerId};

    fn version_packet(viewer: u32) -> OutboundPacket {
        OutboundPacket {
            viewer: ViewerId(viewer),
            packet: Packet::ProtocolVersion(ProtocolVersionPacket { version: 1 }),
        }
    }

    #[test]
    fn test_packets_arrive_in_order() {
        let (sink, rx) = ChannelSink::bounded(8);
        sink.send(version_packet(1));
        sink.send(version_packet(2));

        assert_eq!(rx.recv().unwrap().viewer, ViewerId(1));
        assert_eq!(rx.recv().unwrap().viewer, ViewerId(2));
    }

    #[test]
    fn test_full_queue_drops_instead_of_blocking() {
        let (sink, rx) = ChannelSink::bounded(1);
        sink.send(version_packet(1));
        sink.send(version_packet(2)); // dropped, not blocked on

        assert_eq!(rx.recv().unwrap().viewer, ViewerId(1));
        assert!(rx.try_recv().is_err());
    }
}
