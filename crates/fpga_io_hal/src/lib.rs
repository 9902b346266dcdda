//! Hardware abstraction for the DE1-SoC lightweight HPS-to-FPGA bridge.
//!
//! `RegisterWindow` owns the mapped register span through a
//! `RegisterBackend`; the `buttons` and `display` drivers only go through
//! its named register accessors. `SimBackend` replaces the hardware in tests.

pub mod buttons;
pub mod config;
pub mod display;
pub mod sim;
pub mod traits;
pub mod window;
