//! Text label widget.

use aurora_protocol::{CodecError, PacketReader, PacketWriter};

use super::{Widget, WidgetBase};
use crate::registry::LABEL_TYPE;

/// Color used for labels encoded before version 2 carried a color field.
const DEFAULT_COLOR: u32 = 0xFFFF_FFFF;

/// A positioned piece of text.
///
/// Payload version history:
/// - v1: text
/// - v2: text, ARGB color
#[derive(Debug, Clone)]
pub struct Label {
    base: WidgetBase,
    text: String,
    color: u32,
}

impl Label {
    /// Current payload version.
    pub const VERSION: u16 = 2;

    /// Creates a detached label with the given text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            base: WidgetBase::new(LABEL_TYPE),
            text: text.into(),
            color: DEFAULT_COLOR,
        }
    }

    /// Returns the label text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Sets the label text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.base.set_dirty(true);
    }

    /// Returns the ARGB text color.
    #[must_use]
    pub const fn color(&self) -> u32 {
        self.color
    }

    /// Sets the ARGB text color.
    pub fn set_color(&mut self, color: u32) {
        self.color = color;
        self.base.set_dirty(true);
    }
}

impl Widget for Label {
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
        writer.write_str(&self.text)?;
        writer.write_u32(self.color);
        Ok(())
    }

    fn read_data(
        &mut self,
        reader: &mut PacketReader<'_>,
        version: u16,
    ) -> Result<(), CodecError> {
        self.base.read_data(reader)?;
        self.text = reader.read_str()?;
        self.color = if version >= 2 {
            reader.read_u32()?
        } else {
            DEFAULT_COLOR
        };
        Ok(())
    }
}
