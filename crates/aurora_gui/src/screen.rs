//! # Container / Screen Composition
//!
//! A screen is a viewer-bound composite widget: it owns a collection of
//! child widgets, each tagged with the extension that attached it, and it is
//! the unit of network synchronization.
//!
//! ## Design
//!
//! - The child collection is a concurrent map: extensions attach and detach
//!   from arbitrary threads while the tick pass iterates over snapshots
//! - Parent holds strong handles; children refer back by id only, so nested
//!   screens cannot form reference cycles
//! - Removal notices are emitted at detach time, not deferred to the sweep,
//!   so detach-then-reattach within one tick produces a remove followed by a
//!   fresh state push
//!
//! Screens nest (a popup is a child screen), bounded by
//! [`MAX_NESTING_DEPTH`] wherever the tree is walked recursively.

use std::collections::HashSet;
use std::sync::Arc;

use aurora_protocol::{
    Anchor, CodecError, OutboundPacket, Packet, PacketReader, PacketWriter, ViewerId, WidgetId,
    WidgetRemovePacket, WidgetStatePacket, WidgetTypeId,
};
use dashmap::DashMap;
use tracing::{error, warn};

use crate::error::{ScreenError, WidgetError};
use crate::registry::{WidgetRegistry, IN_GAME_SCREEN_TYPE, POPUP_SCREEN_TYPE};
use crate::sync::PacketSink;
use crate::widget::{ExtensionId, SharedWidget, TickContext, Widget, WidgetBase};

/// Width of the HUD coordinate space.
pub const SCREEN_WIDTH: i32 = 427;

/// Height of the HUD coordinate space.
pub const SCREEN_HEIGHT: i32 = 240;

/// Maximum screen nesting depth tolerated by recursive walks.
pub const MAX_NESTING_DEPTH: usize = 8;

struct ChildEntry {
    widget: SharedWidget,
    owner: ExtensionId,
}

/// Concurrent child collection shared by composite widget kinds.
///
/// Supports concurrent insert/remove/iterate without external locking. The
/// tick pass never iterates the live map; it takes a snapshot first, so a
/// hook detaching itself or a sibling cannot invalidate the traversal.
#[derive(Default)]
pub struct ChildSet {
    children: DashMap<WidgetId, ChildEntry>,
}

impl ChildSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the number of attached children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if no children are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns true if a widget with this identity is attached.
    #[must_use]
    pub fn contains(&self, id: WidgetId) -> bool {
        self.children.contains_key(&id)
    }

    /// Returns the widget with this identity, if attached.
    #[must_use]
    pub fn find(&self, id: WidgetId) -> Option<SharedWidget> {
        self.children.get(&id).map(|e| e.widget.clone())
    }

    /// Returns the extension that attached the widget, if attached.
    #[must_use]
    pub fn owner_of(&self, id: WidgetId) -> Option<ExtensionId> {
        self.children.get(&id).map(|e| e.owner)
    }

    /// Copies the current children into a vector.
    ///
    /// The copy is what the tick pass iterates; the live map may change
    /// underneath it at any time.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(WidgetId, ExtensionId, SharedWidget)> {
        self.children
            .iter()
            .map(|e| (*e.key(), e.owner, e.widget.clone()))
            .collect()
    }

    pub(crate) fn insert(&self, id: WidgetId, owner: ExtensionId, widget: SharedWidget) {
        self.children.insert(id, ChildEntry { widget, owner });
    }

    pub(crate) fn remove(&self, id: WidgetId) -> Option<(ExtensionId, SharedWidget)> {
        self.children
            .remove(&id)
            .map(|(_, entry)| (entry.owner, entry.widget))
    }

    /// Swaps in a new widget instance under an existing identity, keeping
    /// the recorded owner. Returns that owner, or `None` if the identity is
    /// not attached.
    pub(crate) fn relink(&self, id: WidgetId, widget: &SharedWidget) -> Option<ExtensionId> {
        let mut entry = self.children.get_mut(&id)?;
        entry.widget = widget.clone();
        Some(entry.owner)
    }
}

/// Marks every attached child dirty, transitively through nested
/// composites.
pub(crate) fn cascade_dirty(set: &ChildSet) {
    for (_, _, widget) in set.snapshot() {
        widget.write().set_dirty(true);
    }
}

/// Flattens a child collection into `out`, recursing into composites up to
/// the nesting bound.
pub(crate) fn collect_from(
    set: &ChildSet,
    recursive: bool,
    depth: usize,
    seen: &mut HashSet<WidgetId>,
    out: &mut Vec<SharedWidget>,
) {
    if depth >= MAX_NESTING_DEPTH {
        warn!(depth, "widget tree exceeds nesting bound; truncating recursive walk");
        return;
    }
    for (id, _, widget) in set.snapshot() {
        if !seen.insert(id) {
            continue;
        }
        out.push(widget.clone());
        if recursive {
            let guard = widget.read();
            if let Some(children) = guard.child_set() {
                collect_from(children, true, depth + 1, seen, out);
            }
        }
    }
}

/// A viewer-bound composite widget, the unit of synchronization.
pub struct Screen {
    base: WidgetBase,
    children: ChildSet,
    viewer: ViewerId,
    background_visible: bool,
    registry: Arc<WidgetRegistry>,
    sink: Arc<dyn PacketSink>,
}

impl Screen {
    /// Current payload version.
    pub const VERSION: u16 = 1;

    /// Creates the root screen for a viewer.
    #[must_use]
    pub fn new_root(
        registry: Arc<WidgetRegistry>,
        sink: Arc<dyn PacketSink>,
        viewer: ViewerId,
    ) -> Self {
        Self::with_type(IN_GAME_SCREEN_TYPE, registry, sink, viewer)
    }

    /// Creates a popup screen, to be attached to another screen.
    #[must_use]
    pub fn popup(
        registry: Arc<WidgetRegistry>,
        sink: Arc<dyn PacketSink>,
        viewer: ViewerId,
    ) -> Self {
        Self::with_type(POPUP_SCREEN_TYPE, registry, sink, viewer)
    }

    fn with_type(
        type_id: WidgetTypeId,
        registry: Arc<WidgetRegistry>,
        sink: Arc<dyn PacketSink>,
        viewer: ViewerId,
    ) -> Self {
        let mut base = WidgetBase::new(type_id);
        base.set_x(0);
        base.set_y(0);
        base.set_width(SCREEN_WIDTH);
        base.set_height(SCREEN_HEIGHT);
        base.set_anchor(Anchor::TopLeft);
        Self {
            base,
            children: ChildSet::new(),
            viewer,
            background_visible: true,
            registry,
            sink,
        }
    }

    /// Returns this screen's identity.
    #[must_use]
    pub fn id(&self) -> WidgetId {
        self.base.id()
    }

    /// Returns the viewer this screen is bound to.
    #[must_use]
    pub const fn viewer(&self) -> ViewerId {
        self.viewer
    }

    /// Returns true if the grey background renders.
    #[must_use]
    pub const fn background_visible(&self) -> bool {
        self.background_visible
    }

    /// Shows or hides the grey background.
    pub fn set_background_visible(&mut self, visible: bool) {
        self.background_visible = visible;
        self.base.set_dirty(true);
    }

    /// Attaches a widget on behalf of an extension.
    ///
    /// Records ownership, sets the widget's screen back-reference, and marks
    /// it dirty so it is pushed on the next sync. Attaching a widget that is
    /// still attached elsewhere is a contract violation: callers must detach
    /// first. This is not enforced here.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::AttachToSelf`] if `widget` is this screen.
    pub fn attach(&self, owner: ExtensionId, widget: &SharedWidget) -> Result<(), ScreenError> {
        let child_id = widget.read().base().id();
        if child_id == self.base.id() {
            return Err(ScreenError::AttachToSelf(child_id));
        }
        {
            let mut guard = widget.write();
            let base = guard.base_mut();
            base.set_owner(owner);
            base.set_screen(Some(self.base.id()));
            base.set_container(None);
            guard.set_dirty(true);
        }
        self.children.insert(child_id, owner, widget.clone());
        Ok(())
    }

    /// Attaches several widgets in one call.
    ///
    /// Per-widget atomic, not transactional: widgets attached before a
    /// failure stay attached, and later widgets are still attempted.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered.
    pub fn attach_many(
        &self,
        owner: ExtensionId,
        widgets: &[SharedWidget],
    ) -> Result<(), ScreenError> {
        let mut first_error = None;
        for widget in widgets {
            if let Err(err) = self.attach(owner, widget) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Detaches a widget by identity.
    ///
    /// If the widget's type is not server-only, a removal notice addressed
    /// to this screen's viewer is emitted immediately. Returns false if the
    /// identity was not attached.
    pub fn detach(&self, id: WidgetId) -> bool {
        let Some((_, widget)) = self.children.remove(id) else {
            return false;
        };
        let type_id = {
            let mut guard = widget.write();
            let type_id = guard.base().type_id();
            guard.base_mut().clear_attachment();
            type_id
        };
        if !self.registry.is_server_only(type_id) {
            self.sink.send(OutboundPacket {
                viewer: self.viewer,
                packet: Packet::WidgetRemove(WidgetRemovePacket {
                    widget_id: id,
                    screen_id: self.base.id(),
                }),
            });
        }
        true
    }

    /// Detaches every widget owned by an extension.
    ///
    /// Core-owned widgets are never touched, so a misbehaving extension's
    /// cleanup cannot tear down built-in chrome. Returns the number of
    /// widgets detached.
    pub fn detach_all_owned_by(&self, owner: ExtensionId) -> usize {
        if owner.is_core() {
            return 0;
        }
        let mut detached = 0;
        for (id, child_owner, _) in self.children.snapshot() {
            if child_owner == owner && self.detach(id) {
                detached += 1;
            }
        }
        detached
    }

    /// Detaches every child. Used on screen teardown.
    pub fn clear(&self) {
        for (id, _, _) in self.children.snapshot() {
            self.detach(id);
        }
    }

    /// Returns true if a widget with this identity is attached.
    #[must_use]
    pub fn contains(&self, id: WidgetId) -> bool {
        self.children.contains(id)
    }

    /// Returns the attached widget with this identity, if any.
    #[must_use]
    pub fn find(&self, id: WidgetId) -> Option<SharedWidget> {
        self.children.find(id)
    }

    /// Returns the extension that attached a widget, if attached.
    #[must_use]
    pub fn owner_of(&self, id: WidgetId) -> Option<ExtensionId> {
        self.children.owner_of(id)
    }

    /// Swaps in a new widget instance under an already-attached identity,
    /// keeping the recorded owner and the widget's place in the sync path.
    ///
    /// Returns false if no widget with that identity is attached.
    pub fn replace(&self, widget: &SharedWidget) -> bool {
        let id = widget.read().base().id();
        let Some(owner) = self.children.relink(id, widget) else {
            return false;
        };
        let mut guard = widget.write();
        let base = guard.base_mut();
        base.set_owner(owner);
        base.set_screen(Some(self.base.id()));
        base.set_container(None);
        true
    }

    /// Flattens this screen's children into one list, optionally recursing
    /// into nested screens. Diagnostics only; the sync path never calls
    /// this.
    #[must_use]
    pub fn collect_all(&self, recursive: bool) -> Vec<SharedWidget> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(self.children.len());
        collect_from(&self.children, recursive, 0, &mut seen, &mut out);
        out
    }

    /// Runs one synchronization tick for this screen.
    ///
    /// 1. Update hooks over a snapshot of the children
    /// 2. Apply detach requests made by hooks (removal notices fire here)
    /// 3. Animate hooks over the live set
    /// 4. Dirty sweep: default-fix geometry, push state, clear flags
    ///
    /// A fault inside one widget never stops the remaining widgets.
    pub fn run_tick(&mut self) {
        // Nested screens are swept by their parent; roots sweep themselves.
        if self.base.screen().is_none() && self.base.is_dirty() {
            self.push_own_state();
            self.base.set_dirty(false);
        }

        let snapshot = self.children.snapshot();
        let mut ctx = TickContext::new();
        for (id, owner, widget) in &snapshot {
            let result = widget.write().on_tick(&mut ctx);
            if let Err(err) = result {
                self.log_hook_failure("update", *id, *owner, widget, &err);
            }
        }

        for id in ctx.take_detach_requests() {
            self.detach(id);
        }

        for (id, owner, widget) in self.children.snapshot() {
            let result = widget.write().on_animate();
            if let Err(err) = result {
                self.log_hook_failure("animate", id, owner, &widget, &err);
            }
        }

        self.sweep_dirty();
    }

    fn sweep_dirty(&self) {
        let mut payload = PacketWriter::with_capacity(256);
        for (id, owner, widget) in self.children.snapshot() {
            let mut guard = widget.write();
            if !guard.base().is_dirty() {
                continue;
            }

            let missing = match (guard.base().has_size(), guard.base().has_position()) {
                (false, false) => Some("size or position"),
                (false, true) => Some("size"),
                (true, false) => Some("position"),
                (true, true) => None,
            };
            if let Some(missing) = missing {
                let base = guard.base_mut();
                if !base.has_size() {
                    base.apply_size_default();
                }
                if !base.has_position() {
                    base.apply_position_default();
                }
                warn!(
                    kind = %self.kind_name(guard.base().type_id()),
                    owner = owner.0,
                    widget = %id,
                    "widget has no explicit {missing}; applying current values as defaults"
                );
            }

            let type_id = guard.base().type_id();
            if !self.registry.is_server_only(type_id) {
                payload.reset();
                match guard.write_data(&mut payload) {
                    Ok(()) => self.sink.send(OutboundPacket {
                        viewer: self.viewer,
                        packet: Packet::WidgetState(WidgetStatePacket {
                            screen_id: self.base.id(),
                            type_id,
                            widget_id: id,
                            version: guard.version(),
                            payload: payload.as_slice().to_vec(),
                        }),
                    }),
                    Err(err) => error!(
                        kind = %self.kind_name(type_id),
                        owner = owner.0,
                        widget = %id,
                        error = %err,
                        "widget state could not be encoded; dropping this update"
                    ),
                }
            }

            // Server-only widgets are tracked but never transmitted; their
            // dirty flag clears all the same.
            guard.set_dirty(false);
        }
    }

    fn push_own_state(&self) {
        let type_id = self.base.type_id();
        if self.registry.is_server_only(type_id) {
            return;
        }
        let mut payload = PacketWriter::with_capacity(64);
        match Widget::write_data(self, &mut payload) {
            Ok(()) => self.sink.send(OutboundPacket {
                viewer: self.viewer,
                packet: Packet::WidgetState(WidgetStatePacket {
                    screen_id: self.base.id(),
                    type_id,
                    widget_id: self.base.id(),
                    version: Widget::version(self),
                    payload: payload.as_slice().to_vec(),
                }),
            }),
            Err(err) => error!(
                screen = %self.base.id(),
                error = %err,
                "screen state could not be encoded; dropping this update"
            ),
        }
    }

    fn log_hook_failure(
        &self,
        hook: &str,
        id: WidgetId,
        owner: ExtensionId,
        widget: &SharedWidget,
        err: &WidgetError,
    ) {
        let type_id = widget.read().base().type_id();
        error!(
            kind = %self.kind_name(type_id),
            owner = owner.0,
            widget = %id,
            error = %err,
            "widget {hook} hook failed; remaining widgets unaffected"
        );
    }

    fn kind_name(&self, type_id: WidgetTypeId) -> Arc<str> {
        self.registry
            .kind_of(type_id)
            .unwrap_or_else(|| Arc::from("unknown"))
    }
}

impl Widget for Screen {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn version(&self) -> u16 {
        Self::VERSION
    }

    fn write_data(&self, writer: &mut PacketWriter) -> Result<(), CodecError> {
        self.base.write_data(writer)?;
        writer.write_bool(self.background_visible);
        Ok(())
    }

    fn read_data(
        &mut self,
        reader: &mut PacketReader<'_>,
        _version: u16,
    ) -> Result<(), CodecError> {
        self.base.read_data(reader)?;
        self.background_visible = reader.read_bool()?;
        Ok(())
    }

    fn on_tick(&mut self, _ctx: &mut TickContext) -> Result<(), WidgetError> {
        // A nested screen's tick is its own sync pass.
        self.run_tick();
        Ok(())
    }

    fn set_dirty(&mut self, dirty: bool) {
        self.base.set_dirty(dirty);
        if dirty {
            cascade_dirty(&self.children);
        }
    }

    fn child_set(&self) -> Option<&ChildSet> {
        Some(&self.children)
    }
}
