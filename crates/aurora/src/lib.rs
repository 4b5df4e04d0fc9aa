//! # AURORA - HUD Synchronization Server
//!
//! Composition root for the AURORA stack: configuration, the widget type
//! registry instance, the outbound packet queue, and the tick loop that
//! drives the synchronization engine.
//!
//! ## Wiring
//!
//! ```text
//! extensions ──attach/detach/mutate──▶ Screen (aurora_gui)
//!                                        │ dirty state
//!                  TickLoop ──tick──▶ ScreenService ──packets──▶ ChannelSink
//!                                                                   │
//!                                                        transport drains (external)
//! ```
//!
//! The transport and the game-event glue are external collaborators; this
//! crate ends at the outbound queue.

pub mod config;
pub mod service;
pub mod sink;
pub mod tick;

pub use config::{ConfigError, HudConfig};
pub use service::{AllViewersReachable, ScreenService};
pub use sink::ChannelSink;
pub use tick::{TickLoop, TickStats};
