//! # Widget Base Contract
//!
//! The addressable, positioned, serializable unit of the HUD tree.
//!
//! ## Design
//!
//! Widget kinds implement the [`Widget`] capability trait over an embedded
//! [`WidgetBase`] that owns the common state: geometry, margins, anchor,
//! priority, visibility, tooltip, dirty flag, and identity-only
//! back-references to the owning screen/container. Parent links are ids,
//! not handles, so the tree has no reference cycles; only parents hold
//! strong references to children.
//!
//! Every mutator marks the widget dirty, including writes of an unchanged
//! value. The dirty flag is what drives synchronization: once per tick the
//! owning screen serializes every dirty widget and clears the flag.
//!
//! Lock ordering: widget locks are always taken parent before child. Do not
//! hold a child's lock while locking its parent.

mod button;
mod container;
mod health_bar;
mod label;

pub use button::Button;
pub use container::Container;
pub use health_bar::HealthBar;
pub use label::Label;

use std::sync::Arc;

use aurora_protocol::{
    Anchor, CodecError, PacketReader, PacketWriter, RenderPriority, WidgetId, WidgetTypeId,
};
use parking_lot::RwLock;

use crate::error::WidgetError;

/// Opaque handle identifying the extension that attached a widget.
///
/// Used for attribution and bulk detach only; the core never looks inside
/// it beyond equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtensionId(pub u32);

impl ExtensionId {
    /// The core framework itself. Widgets owned by the core survive
    /// extension bulk detach.
    pub const CORE: Self = Self(0);

    /// Returns true if this is the core framework.
    #[must_use]
    pub const fn is_core(self) -> bool {
        self.0 == Self::CORE.0
    }
}

/// Four-sided layout margin, not included in the widget's own dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margin {
    /// Top margin.
    pub top: i32,
    /// Right margin.
    pub right: i32,
    /// Bottom margin.
    pub bottom: i32,
    /// Left margin.
    pub left: i32,
}

impl Margin {
    /// No margin on any side.
    pub const ZERO: Self = Self::all(0);

    /// The same margin on all four sides.
    #[must_use]
    pub const fn all(value: i32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// CSS two-value shorthand: vertical (top/bottom), horizontal
    /// (left/right).
    #[must_use]
    pub const fn symmetric(vertical: i32, horizontal: i32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    /// CSS three-value shorthand: top, horizontal (left/right), bottom.
    #[must_use]
    pub const fn asymmetric(top: i32, horizontal: i32, bottom: i32) -> Self {
        Self {
            top,
            right: horizontal,
            bottom,
            left: horizontal,
        }
    }

    /// CSS four-value shorthand: top, right, bottom, left.
    #[must_use]
    pub const fn sides(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

/// Structural changes a widget may request from inside its own tick hook.
///
/// Hooks run while the engine holds the widget's lock, so they cannot call
/// back into the screen directly; requests collected here are applied by the
/// engine right after the update pass, before anything animates or syncs.
#[derive(Debug, Default)]
pub struct TickContext {
    detach_requests: Vec<WidgetId>,
}

impl TickContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that a widget (itself or a sibling) be detached from the
    /// screen once the update pass finishes.
    pub fn request_detach(&mut self, id: WidgetId) {
        self.detach_requests.push(id);
    }

    /// Drains the pending detach requests.
    pub(crate) fn take_detach_requests(&mut self) -> Vec<WidgetId> {
        std::mem::take(&mut self.detach_requests)
    }
}

/// Common state embedded in every widget kind.
#[derive(Debug, Clone)]
pub struct WidgetBase {
    id: WidgetId,
    type_id: WidgetTypeId,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    has_x: bool,
    has_y: bool,
    has_width: bool,
    has_height: bool,
    margin: Margin,
    anchor: Anchor,
    priority: RenderPriority,
    visible: bool,
    fixed: bool,
    tooltip: String,
    dirty: bool,
    screen: Option<WidgetId>,
    container: Option<WidgetId>,
    owner: Option<ExtensionId>,
}

/// Default edge length for widgets created without an explicit size.
const DEFAULT_EXTENT: i32 = 50;

impl WidgetBase {
    /// Creates detached base state for a widget of the given type.
    ///
    /// Every widget is dirty immediately after creation, so it is pushed on
    /// the first sync after it is attached.
    #[must_use]
    pub fn new(type_id: WidgetTypeId) -> Self {
        Self {
            id: WidgetId::generate(),
            type_id,
            x: 0,
            y: 0,
            width: DEFAULT_EXTENT,
            height: DEFAULT_EXTENT,
            has_x: false,
            has_y: false,
            has_width: false,
            has_height: false,
            margin: Margin::ZERO,
            anchor: Anchor::default(),
            priority: RenderPriority::default(),
            visible: true,
            fixed: false,
            tooltip: String::new(),
            dirty: true,
            screen: None,
            container: None,
            owner: None,
        }
    }

    /// Returns the widget's identity.
    #[must_use]
    pub const fn id(&self) -> WidgetId {
        self.id
    }

    /// Returns the widget's registry type id.
    #[must_use]
    pub const fn type_id(&self) -> WidgetTypeId {
        self.type_id
    }

    /// Returns the x coordinate. 0,0 is the top left corner of the screen.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Returns the y coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Sets the x coordinate.
    pub fn set_x(&mut self, x: i32) {
        self.x = x;
        self.has_x = true;
        self.dirty = true;
    }

    /// Sets the y coordinate.
    pub fn set_y(&mut self, y: i32) {
        self.y = y;
        self.has_y = true;
        self.dirty = true;
    }

    /// Shifts the widget the given number of units in the x direction.
    pub fn shift_x(&mut self, dx: i32) {
        self.set_x(self.x + dx);
    }

    /// Shifts the widget the given number of units in the y direction.
    pub fn shift_y(&mut self, dy: i32) {
        self.set_y(self.y + dy);
    }

    /// Returns the width.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Returns the height.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Sets the width.
    pub fn set_width(&mut self, width: i32) {
        self.width = width;
        self.has_width = true;
        self.dirty = true;
    }

    /// Sets the height.
    pub fn set_height(&mut self, height: i32) {
        self.height = height;
        self.has_height = true;
        self.dirty = true;
    }

    /// True once both width and height have been set explicitly.
    #[must_use]
    pub const fn has_size(&self) -> bool {
        self.has_width && self.has_height
    }

    /// True once both coordinates have been set explicitly.
    #[must_use]
    pub const fn has_position(&self) -> bool {
        self.has_x && self.has_y
    }

    /// Returns the margin.
    #[must_use]
    pub const fn margin(&self) -> Margin {
        self.margin
    }

    /// Sets all four margins at once.
    pub fn set_margin(&mut self, margin: Margin) {
        self.margin = margin;
        self.dirty = true;
    }

    /// Sets the top margin.
    pub fn set_margin_top(&mut self, value: i32) {
        self.margin.top = value;
        self.dirty = true;
    }

    /// Sets the right margin.
    pub fn set_margin_right(&mut self, value: i32) {
        self.margin.right = value;
        self.dirty = true;
    }

    /// Sets the bottom margin.
    pub fn set_margin_bottom(&mut self, value: i32) {
        self.margin.bottom = value;
        self.dirty = true;
    }

    /// Sets the left margin.
    pub fn set_margin_left(&mut self, value: i32) {
        self.margin.left = value;
        self.dirty = true;
    }

    /// Returns the anchor point.
    #[must_use]
    pub const fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Sets the anchor point.
    pub fn set_anchor(&mut self, anchor: Anchor) {
        self.anchor = anchor;
        self.dirty = true;
    }

    /// Returns the render priority.
    #[must_use]
    pub const fn priority(&self) -> RenderPriority {
        self.priority
    }

    /// Sets the render priority.
    pub fn set_priority(&mut self, priority: RenderPriority) {
        self.priority = priority;
        self.dirty = true;
    }

    /// Returns true if the widget renders.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Sets visibility.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.dirty = true;
    }

    /// Returns true if the widget keeps its size inside a container.
    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Sets whether the widget keeps its size inside a container.
    pub fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed;
        self.dirty = true;
    }

    /// Returns the tooltip text.
    #[must_use]
    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    /// Sets the tooltip text.
    pub fn set_tooltip(&mut self, tooltip: impl Into<String>) {
        self.tooltip = tooltip.into();
        self.dirty = true;
    }

    /// Returns true if the widget has changed since the last sync.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Sets or clears the dirty flag on this widget alone.
    ///
    /// Composite kinds cascade through [`Widget::set_dirty`] instead.
    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Returns the id of the screen this widget is attached to, if any.
    ///
    /// A widget with no screen is inert: it receives no tick callbacks and
    /// is never serialized.
    #[must_use]
    pub const fn screen(&self) -> Option<WidgetId> {
        self.screen
    }

    /// Returns the id of the container grouping this widget, if any.
    #[must_use]
    pub const fn container(&self) -> Option<WidgetId> {
        self.container
    }

    /// Returns the extension that attached this widget, if any.
    #[must_use]
    pub const fn owner(&self) -> Option<ExtensionId> {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: ExtensionId) {
        self.owner = Some(owner);
    }

    pub(crate) fn set_screen(&mut self, screen: Option<WidgetId>) {
        self.screen = screen;
    }

    pub(crate) fn set_container(&mut self, container: Option<WidgetId>) {
        self.container = container;
    }

    pub(crate) fn clear_attachment(&mut self) {
        self.screen = None;
        self.container = None;
        self.owner = None;
    }

    /// Re-applies the current size through the setters, making it explicit.
    pub(crate) fn apply_size_default(&mut self) {
        self.set_width(self.width);
        self.set_height(self.height);
    }

    /// Re-applies the current position through the setters, making it
    /// explicit.
    pub(crate) fn apply_position_default(&mut self) {
        self.set_x(self.x);
        self.set_y(self.y);
    }

    /// Writes the common fields. Field order is wire format and must not
    /// change; kinds append their own fields after these.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::StringTooLong`] if the tooltip exceeds the
    /// string length prefix.
    pub fn write_data(&self, writer: &mut PacketWriter) -> Result<(), CodecError> {
        writer.write_i32(self.x);
        writer.write_i32(self.y);
        writer.write_i32(self.width);
        writer.write_i32(self.height);
        writer.write_anchor(self.anchor);
        writer.write_priority(self.priority);
        writer.write_bool(self.visible);
        writer.write_bool(self.fixed);
        writer.write_i32(self.margin.top);
        writer.write_i32(self.margin.right);
        writer.write_i32(self.margin.bottom);
        writer.write_i32(self.margin.left);
        writer.write_str(&self.tooltip)?;
        Ok(())
    }

    /// Reads the common fields, the exact inverse of
    /// [`WidgetBase::write_data`].
    ///
    /// Geometry read off the wire counts as explicit: widgets are only
    /// serialized after the sweep has made their geometry explicit.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] on a truncated or malformed stream.
    pub fn read_data(&mut self, reader: &mut PacketReader<'_>) -> Result<(), CodecError> {
        self.x = reader.read_i32()?;
        self.y = reader.read_i32()?;
        self.width = reader.read_i32()?;
        self.height = reader.read_i32()?;
        self.anchor = reader.read_anchor()?;
        self.priority = reader.read_priority()?;
        self.visible = reader.read_bool()?;
        self.fixed = reader.read_bool()?;
        self.margin.top = reader.read_i32()?;
        self.margin.right = reader.read_i32()?;
        self.margin.bottom = reader.read_i32()?;
        self.margin.left = reader.read_i32()?;
        self.tooltip = reader.read_str()?;
        self.has_x = true;
        self.has_y = true;
        self.has_width = true;
        self.has_height = true;
        Ok(())
    }
}

/// The widget capability contract.
///
/// New kinds implement this trait and register their kind name with the
/// [`crate::registry::WidgetRegistry`]; nothing dispatches on concrete
/// types.
pub trait Widget: Send + Sync {
    /// Returns the common state.
    fn base(&self) -> &WidgetBase;

    /// Returns mutable access to the common state.
    fn base_mut(&mut self) -> &mut WidgetBase;

    /// Returns the kind's payload version. Non-decreasing across code
    /// revisions; fields are only ever appended.
    fn version(&self) -> u16;

    /// Serializes instance state: common fields first, kind fields after.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if a field cannot be encoded.
    fn write_data(&self, writer: &mut PacketWriter) -> Result<(), CodecError>;

    /// Restores instance state from a stream written at `version`.
    ///
    /// Must be the exact inverse of [`Widget::write_data`] for the current
    /// version, and must accept streams from any older still-supported
    /// version, substituting defaults for fields that did not exist yet.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] on a truncated or malformed stream.
    fn read_data(
        &mut self,
        reader: &mut PacketReader<'_>,
        version: u16,
    ) -> Result<(), CodecError>;

    /// Per-tick update hook, called once per tick while attached.
    ///
    /// Structural changes (detaching itself or a sibling) go through the
    /// [`TickContext`]; they are applied after the update pass.
    ///
    /// # Errors
    ///
    /// A returned error is logged and isolated to this widget; the rest of
    /// the tick proceeds.
    fn on_tick(&mut self, _ctx: &mut TickContext) -> Result<(), WidgetError> {
        Ok(())
    }

    /// Per-tick animation hook, called after the update pass on widgets
    /// still attached.
    ///
    /// # Errors
    ///
    /// A returned error is logged and isolated to this widget.
    fn on_animate(&mut self) -> Result<(), WidgetError> {
        Ok(())
    }

    /// Sets or clears the dirty flag.
    ///
    /// Composite kinds override this to cascade `set_dirty(true)` to every
    /// attached child, transitively through nested screens.
    fn set_dirty(&mut self, dirty: bool) {
        self.base_mut().set_dirty(dirty);
    }

    /// Returns the child collection for composite kinds, `None` for leaves.
    fn child_set(&self) -> Option<&crate::screen::ChildSet> {
        None
    }
}

/// Shared handle to a widget in the tree.
///
/// Parents hold these; children refer back to parents by id only.
pub type SharedWidget = Arc<RwLock<dyn Widget>>;

/// Wraps a widget kind into a [`SharedWidget`] handle.
pub fn shared<W: Widget + 'static>(widget: W) -> SharedWidget {
    Arc::new(RwLock::new(widget))
}
