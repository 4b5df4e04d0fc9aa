//! # AURORA GUI - Server-Side Widget Tree
//!
//! The synchronization core: a per-viewer tree of HUD widgets kept in sync
//! with a remote renderer by pushing only what changed, each tick.
//!
//! ## Architecture
//!
//! - **Registry**: widget kinds mapped to wire-stable type ids
//! - **Widget**: the dirty-tracked, serializable base contract
//! - **Screen/Container**: concurrent composites owning attached widgets,
//!   tagged by the extension that attached them
//! - **Sync**: the tick traversal that runs hooks, pushes dirty state, and
//!   retracts detached widgets
//!
//! ## Threading Model
//!
//! The tick pass runs on one thread. Extensions may attach, detach, and
//! mutate widgets from any thread at any time, including from inside their
//! own tick hooks via [`widget::TickContext`]. Child collections are
//! concurrent maps; the tick pass iterates snapshots of them. Widget locks
//! are always taken parent before child.
//!
//! ## Example
//!
//! ```rust,ignore
//! use aurora_gui::{shared, ExtensionId, HealthBar, Screen, WidgetRegistry};
//!
//! let registry = Arc::new(WidgetRegistry::new());
//! let screen = Screen::new_root(registry, sink, ViewerId(1));
//! let hp = shared(HealthBar::new(20));
//! screen.attach(ExtensionId(4), &hp)?;
//! // once per tick:
//! engine.tick_screens(screens, &roster);
//! ```

pub mod error;
pub mod registry;
pub mod screen;
pub mod sync;
pub mod widget;

pub use error::{ScreenError, WidgetError};
pub use registry::{WidgetRegistry, WidgetType};
pub use screen::{ChildSet, Screen, MAX_NESTING_DEPTH, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use sync::{PacketSink, SharedScreen, SyncEngine, TickSummary, ViewerRoster};
pub use widget::{
    shared, Button, Container, ExtensionId, HealthBar, Label, Margin, SharedWidget, TickContext,
    Widget, WidgetBase,
};
