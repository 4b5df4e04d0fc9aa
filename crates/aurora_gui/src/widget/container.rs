//! Layout container widget.
//!
//! A container groups widgets so the renderer can lay them out together. It
//! is a server-only kind: the grouping exists in the tree for bookkeeping
//! and cascade invalidation, but is never transmitted. Children that should
//! render must also be attached to the owning screen; grouping alone leaves
//! them inert.

use std::collections::HashSet;

use aurora_protocol::{CodecError, PacketReader, PacketWriter, WidgetId};

use super::{ExtensionId, SharedWidget, Widget, WidgetBase};
use crate::error::ScreenError;
use crate::registry::CONTAINER_TYPE;
use crate::screen::{cascade_dirty, collect_from, ChildSet};

/// A grouping of widgets that participates in layout.
pub struct Container {
    base: WidgetBase,
    children: ChildSet,
}

impl Container {
    /// Current payload version.
    pub const VERSION: u16 = 1;

    /// Creates a detached, empty container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new(CONTAINER_TYPE),
            children: ChildSet::new(),
        }
    }

    /// Returns this container's identity.
    #[must_use]
    pub fn id(&self) -> WidgetId {
        self.base.id()
    }

    /// Groups a widget into this container on behalf of an extension.
    ///
    /// Sets the widget's container back-reference and marks it dirty.
    /// Screen attribution is untouched: attaching to a screen is a separate
    /// step, and grouping a widget into a second container without
    /// detaching it first is a contract violation.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::AttachToSelf`] if `widget` is this container.
    pub fn attach(&self, owner: ExtensionId, widget: &SharedWidget) -> Result<(), ScreenError> {
        let child_id = widget.read().base().id();
        if child_id == self.base.id() {
            return Err(ScreenError::AttachToSelf(child_id));
        }
        {
            let mut guard = widget.write();
            guard.base_mut().set_container(Some(self.base.id()));
            guard.set_dirty(true);
        }
        self.children.insert(child_id, owner, widget.clone());
        Ok(())
    }

    /// Groups several widgets in one call; per-widget atomic, not
    /// transactional.
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

    /// Removes a widget from the grouping, clearing its container
    /// back-reference. No packet is emitted; containers are server-only.
    ///
    /// Returns false if the identity was not grouped here.
    pub fn detach(&self, id: WidgetId) -> bool {
        let Some((_, widget)) = self.children.remove(id) else {
            return false;
        };
        widget.write().base_mut().set_container(None);
        true
    }

    /// Removes every widget grouped by an extension, sparing core-owned
    /// widgets. Returns the number removed.
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

    /// Returns true if a widget with this identity is grouped here.
    #[must_use]
    pub fn contains(&self, id: WidgetId) -> bool {
        self.children.contains(id)
    }

    /// Returns the grouped widget with this identity, if any.
    #[must_use]
    pub fn find(&self, id: WidgetId) -> Option<SharedWidget> {
        self.children.find(id)
    }

    /// Returns the extension that grouped a widget, if grouped.
    #[must_use]
    pub fn owner_of(&self, id: WidgetId) -> Option<ExtensionId> {
        self.children.owner_of(id)
    }

    /// Flattens the grouping, optionally recursing into nested composites.
    #[must_use]
    pub fn collect_all(&self, recursive: bool) -> Vec<SharedWidget> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(self.children.len());
        collect_from(&self.children, recursive, 0, &mut seen, &mut out);
        out
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Container {
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
        self.base.write_data(writer)
    }

    fn read_data(
        &mut self,
        reader: &mut PacketReader<'_>,
        _version: u16,
    ) -> Result<(), CodecError> {
        self.base.read_data(reader)
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
