//! Clickable button widget.

use aurora_protocol::{CodecError, PacketReader, PacketWriter};

use super::{Widget, WidgetBase};
use crate::registry::BUTTON_TYPE;

/// A clickable button with a caption.
///
/// Click handling is the renderer's side of the contract; the server only
/// pushes the state that decides how the button draws.
#[derive(Debug, Clone)]
pub struct Button {
    base: WidgetBase,
    caption: String,
    enabled: bool,
}

impl Button {
    /// Current payload version.
    pub const VERSION: u16 = 1;

    /// Creates a detached, enabled button with the given caption.
    #[must_use]
    pub fn new(caption: impl Into<String>) -> Self {
        Self {
            base: WidgetBase::new(BUTTON_TYPE),
            caption: caption.into(),
            enabled: true,
        }
    }

    /// Returns the caption.
    #[must_use]
    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Sets the caption.
    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.caption = caption.into();
        self.base.set_dirty(true);
    }

    /// Returns true if the button accepts clicks.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enables or disables the button.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.base.set_dirty(true);
    }
}

impl Widget for Button {
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
        writer.write_str(&self.caption)?;
        writer.write_bool(self.enabled);
        Ok(())
    }

    fn read_data(
        &mut self,
        reader: &mut PacketReader<'_>,
        _version: u16,
    ) -> Result<(), CodecError> {
        self.base.read_data(reader)?;
        self.caption = reader.read_str()?;
        self.enabled = reader.read_bool()?;
        Ok(())
    }
}
