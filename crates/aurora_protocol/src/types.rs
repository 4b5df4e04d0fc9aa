//! Identity newtypes and wire-stable enums.
//!
//! These types appear inside packets. Their discriminants are part of the
//! wire format and must never change.

use crate::error::CodecError;
use uuid::Uuid;

/// Globally unique widget identity, stable for the widget's lifetime.
///
/// 128 bits so identities are never reused, even across server restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(Uuid);

impl WidgetId {
    /// Generates a fresh identity.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing identity value, e.g. one read off the wire.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying 128-bit value.
    #[must_use]
    pub const fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Stable small integer identifying a widget kind on the wire.
///
/// Built-in kinds occupy a fixed low range; runtime registrations are
/// appended above it and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetTypeId(pub u16);

impl WidgetTypeId {
    /// Returns the raw id value.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

/// Address of one connected renderer.
///
/// Opaque to the core: packets are enqueued against it, the external send
/// path resolves it to a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewerId(pub u32);

/// Anchor point a widget's position is measured from.
///
/// Discriminants are wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Anchor {
    /// Top left corner of the screen.
    TopLeft = 0,
    /// Top edge, horizontally centered.
    TopCenter = 1,
    /// Top right corner.
    TopRight = 2,
    /// Left edge, vertically centered.
    CenterLeft = 3,
    /// Dead center.
    #[default]
    Center = 4,
    /// Right edge, vertically centered.
    CenterRight = 5,
    /// Bottom left corner.
    BottomLeft = 6,
    /// Bottom edge, horizontally centered.
    BottomCenter = 7,
    /// Bottom right corner.
    BottomRight = 8,
    /// Position scales with the screen instead of anchoring to a point.
    Scale = 9,
}

impl Anchor {
    /// Decodes an anchor from its wire discriminant.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownAnchor`] for values outside the enum.
    pub fn from_wire(value: u8) -> Result<Self, CodecError> {
        match value {
            0 => Ok(Self::TopLeft),
            1 => Ok(Self::TopCenter),
            2 => Ok(Self::TopRight),
            3 => Ok(Self::CenterLeft),
            4 => Ok(Self::Center),
            5 => Ok(Self::CenterRight),
            6 => Ok(Self::BottomLeft),
            7 => Ok(Self::BottomCenter),
            8 => Ok(Self::BottomRight),
            9 => Ok(Self::Scale),
            other => Err(CodecError::UnknownAnchor(other)),
        }
    }
}

/// Render ordering for a widget.
///
/// Highest priorities render first (in the background), lowest render last
/// (in the foreground). Discriminants are wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum RenderPriority {
    /// Renders first, behind everything else.
    Highest = 0,
    /// Renders behind normal widgets.
    High = 1,
    /// Default ordering.
    #[default]
    Normal = 2,
    /// Renders in front of normal widgets.
    Low = 3,
    /// Renders last, on top of everything.
    Lowest = 4,
}

impl RenderPriority {
    /// Decodes a priority from its wire discriminant.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownPriority`] for values outside the enum.
    pub fn from_wire(value: u8) -> Result<Self, CodecError> {
        match value {
            0 => Ok(Self::Highest),
            1 => Ok(Self::High),
            2 => Ok(Self::Normal),
            3 => Ok(Self::Low),
            4 => Ok(Self::Lowest),
            other => Err(CodecError::UnknownPriority(other)),
        }
    }
}
