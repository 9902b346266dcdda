//! Board orchestrator for fpga_io.
//!
//! Reads a TOML config file, selects the register backend, and opens the
//! register window the controller runs against.
//!
//! Supported modes:
//! - `sim`: SimBackend, no hardware needed
//! - `devmem`: DevMemBackend over the device named in `[board]`

pub mod counter;

use fpga_io_devmem::DevMemBackend;
use fpga_io_hal::config::BoardMap;
use fpga_io_hal::sim::SimBackend;
use fpga_io_hal::traits::{HalError, RegisterBackend};
use fpga_io_hal::window::RegisterWindow;
use serde::Deserialize;

/// Top-level orchestrator config, deserialized from TOML.
#[derive(Debug, Deserialize)]
pub struct OrchestratorConfig {
    pub mode: ModeConfig,
    #[serde(default)]
    pub board: BoardMap,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Deserialize)]
pub struct ModeConfig {
    #[serde(rename = "type")]
    pub mode_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// 0 polls forever.
    #[serde(default)]
    pub max_polls: u64,
}

fn default_poll_interval() -> u64 {
    20
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            max_polls: 0,
        }
    }
}

/// Parsed mode selection.
#[derive(Debug, Clone, PartialEq)]
pub enum HalMode {
    Sim,
    DevMem,
}

impl OrchestratorConfig {
    /// Parse from TOML string.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Parse from TOML file path.
    pub fn from_file(path: &str) -> Result<Self, OrchestratorError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| OrchestratorError::ConfigError(format!("{path}: {e}")))?;
        Self::from_toml(&content).map_err(|e| OrchestratorError::ConfigError(e.to_string()))
    }

    /// Resolve the mode from config.
    pub fn hal_mode(&self) -> Result<HalMode, OrchestratorError> {
        match self.mode.mode_type.as_str() {
            "sim" => Ok(HalMode::Sim),
            "devmem" => Ok(HalMode::DevMem),
            other => Err(OrchestratorError::ConfigError(format!(
                "unknown mode type: {other}"
            ))),
        }
    }
}

/// Create a register backend from orchestrator config.
///
/// The simulated key register starts with every button released.
pub fn create_backend(
    config: &OrchestratorConfig,
) -> Result<Box<dyn RegisterBackend>, OrchestratorError> {
    match config.hal_mode()? {
        HalMode::Sim => {
            let mut sim = SimBackend::new();
            sim.set_register(config.board.key_offset, u32::MAX);
            Ok(Box::new(sim))
        }
        HalMode::DevMem => Ok(Box::new(DevMemBackend::new())),
    }
}

/// Create the configured backend and map the board's register window.
pub fn open_window(
    config: &OrchestratorConfig,
) -> Result<RegisterWindow<Box<dyn RegisterBackend>>, OrchestratorError> {
    let backend = create_backend(config)?;
    Ok(RegisterWindow::open(backend, config.board.clone())?)
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("config error: {0}")]
    ConfigError(String),
    #[error("HAL error: {0}")]
    HalError(#[from] HalError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpga_io_hal::buttons::read_buttons;

    #[test]
    fn parses_sim_config() {
        let toml = r#"
[mode]
type = "sim"

[runtime]
poll_interval_ms = 5
max_polls = 10
"#;
        let config = OrchestratorConfig::from_toml(toml).unwrap();
        assert_eq!(config.hal_mode().unwrap(), HalMode::Sim);
        assert_eq!(config.runtime.poll_interval_ms, 5);
        assert_eq!(config.runtime.max_polls, 10);
        assert_eq!(config.board, BoardMap::de1_soc());
    }

    #[test]
    fn missing_runtime_section_uses_defaults() {
        let toml = r#"
[mode]
type = "devmem"
"#;
        let config = OrchestratorConfig::from_toml(toml).unwrap();
        assert_eq!(config.hal_mode().unwrap(), HalMode::DevMem);
        assert_eq!(config.runtime.poll_interval_ms, 20);
        assert_eq!(config.runtime.max_polls, 0);
    }

    #[test]
    fn board_section_overrides_fields() {
        let toml = r#"
[mode]
type = "devmem"

[board]
device = "/tmp/mem.img"
bridge_base = 0
"#;
        let config = OrchestratorConfig::from_toml(toml).unwrap();
        assert_eq!(config.board.device, "/tmp/mem.img");
        assert_eq!(config.board.bridge_base, 0);
        assert_eq!(config.board.key_offset, 0x50);
    }

    #[test]
    fn rejects_unknown_mode() {
        let toml = r#"
[mode]
type = "quantum"
"#;
        let config = OrchestratorConfig::from_toml(toml).unwrap();
        assert!(config.hal_mode().is_err());
        assert!(matches!(
            open_window(&config),
            Err(OrchestratorError::ConfigError(_))
        ));
    }

    #[test]
    fn sim_window_starts_with_buttons_released() {
        let toml = r#"
[mode]
type = "sim"
"#;
        let config = OrchestratorConfig::from_toml(toml).unwrap();
        let mut window = open_window(&config).unwrap();
        assert!(window.is_active());
        let snapshot = read_buttons(&window, 4).unwrap();
        assert_eq!(snapshot.pressed().count(), 0);
        window.close().unwrap();
    }

    #[test]
    fn devmem_open_failure_surfaces_hal_error() {
        let toml = r#"
[mode]
type = "devmem"

[board]
device = "/nonexistent/fpga_io/mem"
"#;
        let config = OrchestratorConfig::from_toml(toml).unwrap();
        let err = open_window(&config).err().unwrap();
        assert!(matches!(
            err,
            OrchestratorError::HalError(HalError::DeviceOpen { .. })
        ));
    }

    #[test]
    fn parses_sample_config_files() {
        let sim = OrchestratorConfig::from_file("config/counter_sim.toml").unwrap();
        assert_eq!(sim.hal_mode().unwrap(), HalMode::Sim);
        let devmem = OrchestratorConfig::from_file("config/counter_devmem.toml").unwrap();
        assert_eq!(devmem.hal_mode().unwrap(), HalMode::DevMem);
        assert_eq!(devmem.board, BoardMap::de1_soc());
    }
}
