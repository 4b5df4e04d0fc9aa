//! # Synchronization Engine
//!
//! Drives the per-tick traversal over every live screen.
//!
//! ## Design
//!
//! The engine owns no screens and no transport. It is handed the screens to
//! tick and two boundary contracts:
//!
//! - [`PacketSink`]: accepts addressed packets; the external send path must
//!   deliver them reliably and in order per viewer
//! - [`ViewerRoster`]: answers whether a viewer is currently reachable, so
//!   screens of disconnected viewers are skipped, not torn down
//!
//! Nothing here blocks or performs I/O; a tick is synchronous from start to
//! finish.

use std::sync::Arc;

use aurora_protocol::{OutboundPacket, ViewerId};
use parking_lot::RwLock;

use crate::screen::Screen;

/// Destination for addressed packets produced by the core.
///
/// Implementations must not block: the tick pass calls this inline. Enqueue
/// and return.
pub trait PacketSink: Send + Sync {
    /// Accepts one addressed packet for asynchronous delivery.
    fn send(&self, packet: OutboundPacket);
}

/// Answers whether a viewer can currently receive packets.
pub trait ViewerRoster: Send + Sync {
    /// Returns true if the viewer is connected and reachable.
    fn is_reachable(&self, viewer: ViewerId) -> bool;
}

/// Shared handle to a top-level screen.
pub type SharedScreen = Arc<RwLock<Screen>>;

/// Counters for one engine pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Screens that ran a sync pass.
    pub ticked: usize,
    /// Screens skipped because their viewer was unreachable.
    pub skipped: usize,
}

/// The per-tick traversal over all live screens.
#[derive(Debug, Default)]
pub struct SyncEngine;

impl SyncEngine {
    /// Creates an engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Runs one tick over the given screens.
    ///
    /// Screens whose viewer is unreachable are skipped this tick and
    /// revisited on the next. Screens are independent: a fault isolated
    /// inside one screen's pass never prevents the others from running.
    pub fn tick_screens<I>(&self, screens: I, roster: &dyn ViewerRoster) -> TickSummary
    where
        I: IntoIterator<Item = SharedScreen>,
    {
        let mut summary = TickSummary::default();
        for screen in screens {
            let viewer = screen.read().viewer();
            if !roster.is_reachable(viewer) {
                summary.skipped += 1;
                continue;
            }
            screen.write().run_tick();
            summary.ticked += 1;
        }
        summary
    }
}
