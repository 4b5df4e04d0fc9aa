//! # Widget Type Registry
//!
//! Maps widget kinds to stable small integer type ids and back, and marks
//! the kinds that exist for server-side bookkeeping only.
//!
//! ## Design
//!
//! - Explicit object owned by the composition root and passed by reference;
//!   there is no ambient global table
//! - Built-in kinds are registered first, at fixed ids, in the order of the
//!   `BUILTIN_TYPES` table; runtime registrations are appended above
//!   [`FIRST_RUNTIME_TYPE_ID`] in registration order
//! - The id/kind mapping is bijective and never reassigned once issued
//! - Runtime ids are ephemeral: they are not persisted, so a custom kind may
//!   receive a different id after a server restart
//!
//! Append-only: concurrent reads are cheap, writes are serialized.

use std::collections::HashMap;
use std::sync::Arc;

use aurora_protocol::WidgetTypeId;
use parking_lot::RwLock;

/// Kind name of the built-in label widget.
pub const LABEL_KIND: &str = "label";
/// Kind name of the built-in health bar widget.
pub const HEALTH_BAR_KIND: &str = "health_bar";
/// Kind name of the built-in popup screen.
pub const POPUP_SCREEN_KIND: &str = "popup_screen";
/// Kind name of the built-in root (in-game) screen.
pub const IN_GAME_SCREEN_KIND: &str = "in_game_screen";
/// Kind name of the built-in button widget.
pub const BUTTON_KIND: &str = "button";
/// Kind name of the built-in layout container. Server-only.
pub const CONTAINER_KIND: &str = "container";

/// Type id of the built-in label widget.
pub const LABEL_TYPE: WidgetTypeId = WidgetTypeId(0);
/// Type id of the built-in health bar widget.
pub const HEALTH_BAR_TYPE: WidgetTypeId = WidgetTypeId(1);
/// Type id of the built-in popup screen.
pub const POPUP_SCREEN_TYPE: WidgetTypeId = WidgetTypeId(7);
/// Type id of the built-in root (in-game) screen.
pub const IN_GAME_SCREEN_TYPE: WidgetTypeId = WidgetTypeId(8);
/// Type id of the built-in button widget.
pub const BUTTON_TYPE: WidgetTypeId = WidgetTypeId(10);
/// Type id of the built-in layout container. Server-only.
pub const CONTAINER_TYPE: WidgetTypeId = WidgetTypeId(14);

/// First id available to runtime registrations.
///
/// Everything below is reserved for the built-in table, including the gaps
/// left by kinds that were retired before release. Reusing a gap would
/// change the meaning of old byte streams, so the gaps stay.
pub const FIRST_RUNTIME_TYPE_ID: u16 = 28;

/// Built-in kinds at their frozen wire ids.
///
/// The ids in this table are wire format. Entries are append only and the
/// table is registered in order at startup.
const BUILTIN_TYPES: &[(&str, u16, bool)] = &[
    (LABEL_KIND, 0, false),
    (HEALTH_BAR_KIND, 1, false),
    ("bubble_bar", 2, false),
    ("chat_bar", 3, false),
    ("chat_text_box", 4, false),
    ("armor_bar", 5, false),
    ("texture", 6, false),
    (POPUP_SCREEN_KIND, 7, false),
    (IN_GAME_SCREEN_KIND, 8, false),
    ("item_widget", 9, false),
    (BUTTON_KIND, 10, false),
    ("slider", 11, false),
    ("text_field", 12, false),
    ("gradient", 13, false),
    (CONTAINER_KIND, 14, true),
    ("entity_widget", 15, false),
    ("overlay_screen", 16, false),
    ("hunger_bar", 17, false),
    ("exp_bar", 18, false),
    ("check_box", 19, false),
    ("radio_button", 20, false),
    ("list_view", 21, false),
    ("combo_box", 25, false),
    ("slot", 27, false),
];

/// One immutable registry entry.
#[derive(Debug, Clone)]
pub struct WidgetType {
    id: WidgetTypeId,
    kind: Arc<str>,
    server_only: bool,
}

impl WidgetType {
    /// Returns the stable type id.
    #[must_use]
    pub const fn id(&self) -> WidgetTypeId {
        self.id
    }

    /// Returns the kind name.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns true if widgets of this kind are never sent over the wire.
    #[must_use]
    pub const fn is_server_only(&self) -> bool {
        self.server_only
    }
}

#[derive(Debug, Default)]
struct Inner {
    by_kind: HashMap<Arc<str>, WidgetTypeId>,
    by_id: HashMap<u16, WidgetType>,
    next_id: u16,
}

/// The widget type registry.
///
/// Built by the composition root; everything that needs a lookup holds an
/// `Arc` to it.
#[derive(Debug)]
pub struct WidgetRegistry {
    inner: RwLock<Inner>,
}

impl WidgetRegistry {
    /// Creates a registry with all built-in kinds pre-registered at their
    /// frozen ids.
    #[must_use]
    pub fn new() -> Self {
        let registry = Self {
            inner: RwLock::new(Inner {
                by_kind: HashMap::with_capacity(BUILTIN_TYPES.len() * 2),
                by_id: HashMap::with_capacity(BUILTIN_TYPES.len() * 2),
                next_id: FIRST_RUNTIME_TYPE_ID,
            }),
        };
        {
            let mut inner = registry.inner.write();
            for &(kind, id, server_only) in BUILTIN_TYPES {
                Self::insert(&mut inner, kind, WidgetTypeId(id), server_only);
            }
        }
        registry
    }

    fn insert(inner: &mut Inner, kind: &str, id: WidgetTypeId, server_only: bool) {
        let kind: Arc<str> = Arc::from(kind);
        inner.by_kind.insert(kind.clone(), id);
        inner.by_id.insert(id.raw(), WidgetType {
            id,
            kind,
            server_only,
        });
    }

    /// Registers a kind, assigning the next free id.
    ///
    /// Never fails: registering an already-known kind returns its existing
    /// id unchanged. Runtime ids are assigned in registration order and are
    /// not stable across restarts.
    pub fn register(&self, kind: &str) -> WidgetTypeId {
        self.register_with(kind, false)
    }

    /// Registers a kind that is tracked in the tree but never transmitted.
    ///
    /// Same contract as [`WidgetRegistry::register`].
    pub fn register_server_only(&self, kind: &str) -> WidgetTypeId {
        self.register_with(kind, true)
    }

    fn register_with(&self, kind: &str, server_only: bool) -> WidgetTypeId {
        let mut inner = self.inner.write();
        if let Some(&id) = inner.by_kind.get(kind) {
            return id;
        }
        let id = WidgetTypeId(inner.next_id);
        inner.next_id += 1;
        Self::insert(&mut inner, kind, id, server_only);
        id
    }

    /// Returns the id registered for a kind, if any.
    #[must_use]
    pub fn id_of(&self, kind: &str) -> Option<WidgetTypeId> {
        self.inner.read().by_kind.get(kind).copied()
    }

    /// Returns the kind name registered at an id, if any.
    #[must_use]
    pub fn kind_of(&self, id: WidgetTypeId) -> Option<Arc<str>> {
        self.inner.read().by_id.get(&id.raw()).map(|t| t.kind.clone())
    }

    /// Returns the full registry entry at an id, if any.
    #[must_use]
    pub fn entry(&self, id: WidgetTypeId) -> Option<WidgetType> {
        self.inner.read().by_id.get(&id.raw()).cloned()
    }

    /// Returns true if the id belongs to a server-only kind.
    ///
    /// Unknown ids are not server-only; an unknown widget is the sender's
    /// bug, and suppressing it would hide the evidence.
    #[must_use]
    pub fn is_server_only(&self, id: WidgetTypeId) -> bool {
        self.inner
            .read()
            .by_id
            .get(&id.raw())
            .is_some_and(WidgetType::is_server_only)
    }

    /// Returns the number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    /// Returns true if no kinds are registered. Cannot happen in practice;
    /// present for API completeness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_are_fixed() {
        let registry = WidgetRegistry::new();
        assert_eq!(registry.id_of(LABEL_KIND), Some(LABEL_TYPE));
        assert_eq!(registry.id_of(HEALTH_BAR_KIND), Some(HEALTH_BAR_TYPE));
        assert_eq!(registry.id_of(BUTTON_KIND), Some(BUTTON_TYPE));
        assert_eq!(registry.id_of(CONTAINER_KIND), Some(CONTAINER_TYPE));
        assert_eq!(registry.id_of("combo_box"), Some(WidgetTypeId(25)));
        assert_eq!(registry.id_of("slot"), Some(WidgetTypeId(27)));

        // Same ids in a second fresh registry.
        let again = WidgetRegistry::new();
        assert_eq!(again.id_of(LABEL_KIND), Some(LABEL_TYPE));
        assert_eq!(again.id_of("slot"), Some(WidgetTypeId(27)));
    }

    #[test]
    fn test_registry_bijection() {
        let registry = WidgetRegistry::new();
        registry.register("minimap");
        for kind in [LABEL_KIND, CONTAINER_KIND, "slot", "minimap"] {
            let id = registry.id_of(kind).unwrap();
            assert_eq!(registry.kind_of(id).as_deref(), Some(kind));
        }
    }

    #[test]
    fn test_runtime_ids_append_after_builtins() {
        let registry = WidgetRegistry::new();
        let first = registry.register("minimap");
        let second = registry.register("quest_tracker");
        assert_eq!(first, WidgetTypeId(FIRST_RUNTIME_TYPE_ID));
        assert_eq!(second, WidgetTypeId(FIRST_RUNTIME_TYPE_ID + 1));
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = WidgetRegistry::new();
        let id = registry.register("minimap");
        assert_eq!(registry.register("minimap"), id);
        assert_eq!(registry.register(LABEL_KIND), LABEL_TYPE);
        // The gap ids stay unused.
        assert!(registry.kind_of(WidgetTypeId(22)).is_none());
    }

    #[test]
    fn test_server_only_flags() {
        let registry = WidgetRegistry::new();
        assert!(registry.is_server_only(CONTAINER_TYPE));
        assert!(!registry.is_server_only(LABEL_TYPE));
        assert!(!registry.is_server_only(WidgetTypeId(999)));

        let id = registry.register_server_only("debug_probe");
        assert!(registry.is_server_only(id));
    }
}
