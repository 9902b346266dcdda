use crate::traits::HalError;
use serde::Deserialize;

/// Number of seven-segment displays on the board (HEX0..HEX5).
pub const DISPLAY_COUNT: usize = 6;

const REGISTER_WIDTH: usize = 4;
const MAX_BUTTONS: usize = 32;

/// Physical address map of the lightweight bridge and its peripherals.
///
/// Missing TOML fields fall back to the DE1-SoC values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BoardMap {
    pub device: String,
    pub bridge_base: u64,
    pub bridge_span: usize,
    pub key_offset: usize,
    pub button_count: usize,
    /// HEX0 first.
    pub hex_offsets: [usize; DISPLAY_COUNT],
}

impl BoardMap {
    pub fn de1_soc() -> Self {
        Self {
            device: "/dev/mem".to_string(),
            bridge_base: 0xFF20_0000,
            bridge_span: 0x5000,
            key_offset: 0x50,
            button_count: 4,
            hex_offsets: [0x60, 0x70, 0x80, 0x90, 0xA0, 0xB0],
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn from_file(path: &str) -> Result<Self, HalError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| HalError::Config(format!("{path}: {e}")))?;
        Self::from_toml(&content).map_err(|e| HalError::Config(format!("{path}: {e}")))
    }

    /// Check that every register is word aligned and lies inside the span.
    pub fn validate(&self) -> Result<(), HalError> {
        if self.bridge_span == 0 {
            return Err(HalError::InvalidBoardMap("bridge span is zero".into()));
        }
        if self.button_count == 0 || self.button_count > MAX_BUTTONS {
            return Err(HalError::InvalidBoardMap(format!(
                "button count {} outside 1..={MAX_BUTTONS}",
                self.button_count
            )));
        }
        for (name, offset) in self.registers() {
            if offset % REGISTER_WIDTH != 0 {
                return Err(HalError::InvalidBoardMap(format!(
                    "{name} offset {offset:#x} is not word aligned"
                )));
            }
            if offset
                .checked_add(REGISTER_WIDTH)
                .is_none_or(|end| end > self.bridge_span)
            {
                return Err(HalError::InvalidBoardMap(format!(
                    "{name} offset {offset:#x} outside span {:#x}",
                    self.bridge_span
                )));
            }
        }
        Ok(())
    }

    fn registers(&self) -> impl Iterator<Item = (String, usize)> + '_ {
        std::iter::once(("KEY".to_string(), self.key_offset)).chain(
            self.hex_offsets
                .iter()
                .enumerate()
                .map(|(i, &offset)| (format!("HEX{i}"), offset)),
        )
    }
}

impl Default for BoardMap {
    fn default() -> Self {
        Self::de1_soc()
    }
}
