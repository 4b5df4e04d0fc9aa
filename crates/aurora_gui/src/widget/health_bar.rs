//! Health bar widget.

use aurora_protocol::{CodecError, PacketReader, PacketWriter};

use super::{Widget, WidgetBase};
use crate::registry::HEALTH_BAR_TYPE;

/// A proportional fill bar showing current/maximum health.
#[derive(Debug, Clone)]
pub struct HealthBar {
    base: WidgetBase,
    value: u32,
    max_value: u32,
}

impl HealthBar {
    /// Current payload version.
    pub const VERSION: u16 = 1;

    /// Creates a detached, full bar with the given maximum.
    #[must_use]
    pub fn new(max_value: u32) -> Self {
        Self {
            base: WidgetBase::new(HEALTH_BAR_TYPE),
            value: max_value,
            max_value,
        }
    }

    /// Returns the current fill value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Sets the current fill value, clamped to the maximum.
    pub fn set_value(&mut self, value: u32) {
        self.value = value.min(self.max_value);
        self.base.set_dirty(true);
    }

    /// Returns the maximum value.
    #[must_use]
    pub const fn max_value(&self) -> u32 {
        self.max_value
    }

    /// Sets the maximum value, clamping the current value into range.
    pub fn set_max_value(&mut self, max_value: u32) {
        self.max_value = max_value;
        self.value = self.value.min(max_value);
        self.base.set_dirty(true);
    }
}

impl Widget for HealthBar {
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
        writer.write_u32(self.value);
        writer.write_u32(self.max_value);
        Ok(())
    }

    fn read_data(
        &mut self,
        reader: &mut PacketReader<'_>,
        _version: u16,
    ) -> Result<(), CodecError> {
        self.base.read_data(reader)?;
        self.value = reader.read_u32()?;
        self.max_value = reader.read_u32()?;
        Ok(())
    }
}
