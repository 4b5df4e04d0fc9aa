//! # Screen Service
//!
//! Tracks the root screen of every viewer and drives the synchronization
//! engine across them.
//!
//! ## Design
//!
//! - One root screen per viewer, created on demand when the viewer's
//!   session opens and torn down (with removal notices) when it closes
//! - The viewer table is a concurrent map: session open/close arrives from
//!   transport threads while the tick thread iterates
//! - Screens are independent; there is no cross-screen locking

use std::sync::Arc;

use aurora_gui::{
    PacketSink, Screen, SharedScreen, SyncEngine, TickSummary, ViewerRoster, WidgetRegistry,
};
use aurora_protocol::{OutboundPacket, Packet, ProtocolVersionPacket, ViewerId};
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, info};

/// Roster that treats every open screen as reachable.
///
/// Stand-in until a transport wires in real connection state.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllViewersReachable;

impl ViewerRoster for AllViewersReachable {
    fn is_reachable(&self, _viewer: ViewerId) -> bool {
        true
    }
}

/// Owns every viewer's root screen and runs the tick pass over them.
pub struct ScreenService {
    registry: Arc<WidgetRegistry>,
    sink: Arc<dyn PacketSink>,
    screens: DashMap<ViewerId, SharedScreen>,
    engine: SyncEngine,
    protocol_revision: u64,
}

impl ScreenService {
    /// Creates a service around a registry and an outbound sink.
    #[must_use]
    pub fn new(
        registry: Arc<WidgetRegistry>,
        sink: Arc<dyn PacketSink>,
        protocol_revision: u64,
    ) -> Self {
        Self {
            registry,
            sink,
            screens: DashMap::new(),
            engine: SyncEngine::new(),
            protocol_revision,
        }
    }

    /// Returns the shared registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<WidgetRegistry> {
        &self.registry
    }

    /// Returns the number of open screens.
    #[must_use]
    pub fn screen_count(&self) -> usize {
        self.screens.len()
    }

    /// Opens (or returns) the root screen for a viewer.
    ///
    /// A new session starts with the protocol version handshake so the
    /// renderer can reject a revision it does not speak.
    pub fn open_screen(&self, viewer: ViewerId) -> SharedScreen {
        if let Some(existing) = self.screens.get(&viewer) {
            return existing.value().clone();
        }
        let screen = Arc::new(RwLock::new(Screen::new_root(
            self.registry.clone(),
            self.sink.clone(),
            viewer,
        )));
        self.sink.send(OutboundPacket {
            viewer,
            packet: Packet::ProtocolVersion(ProtocolVersionPacket {
                version: self.protocol_revision,
            }),
        });
        info!(viewer = viewer.0, "screen opened");
        self.screens.entry(viewer).or_insert(screen).value().clone()
    }

    /// Returns the root screen for a viewer, if open.
    #[must_use]
    pub fn screen(&self, viewer: ViewerId) -> Option<SharedScreen> {
        self.screens.get(&viewer).map(|s| s.value().clone())
    }

    /// Closes a viewer's screen, detaching every widget.
    ///
    /// Returns false if no screen was open for the viewer.
    pub fn close_screen(&self, viewer: ViewerId) -> bool {
        let Some((_, screen)) = self.screens.remove(&viewer) else {
            return false;
        };
        screen.read().clear();
        info!(viewer = viewer.0, "screen closed");
        true
    }

    /// Deactivates an extension everywhere: bulk-detaches its widgets from
    /// every open screen. Returns the number of widgets detached.
    pub fn deactivate_extension(&self, owner: aurora_gui::ExtensionId) -> usize {
        let mut detached = 0;
        for entry in &self.screens {
            detached += entry.value().read().detach_all_owned_by(owner);
        }
        if detached > 0 {
            debug!(owner = owner.0, detached, "extension widgets detached");
        }
        detached
    }

    /// Runs one synchronization tick over every open screen.
    pub fn run_tick(&self, roster: &dyn ViewerRoster) -> TickSummary {
        let screens: Vec<SharedScreen> =
            self.screens.iter().map(|e| e.value().clone()).collect();
        self.engine.tick_screens(screens, roster)
    }
}
