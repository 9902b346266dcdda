//! Button-driven counter shown on the seven-segment displays.
//!
//! KEY0 increments, KEY1 decrements (saturating at 0), KEY2 resets and
//! KEY3 quits. Each key acts once per press, on the released-to-pressed edge.

use crate::{OrchestratorError, RuntimeConfig};
use fpga_io_hal::buttons::{ButtonSnapshot, read_buttons};
use fpga_io_hal::display::{MAX_NUMBER, blank_all, show_number};
use fpga_io_hal::traits::RegisterBackend;
use fpga_io_hal::window::RegisterWindow;
use std::time::Duration;

pub const KEY_INCREMENT: usize = 0;
pub const KEY_DECREMENT: usize = 1;
pub const KEY_RESET: usize = 2;
pub const KEY_QUIT: usize = 3;

const KEYS_USED: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Quit,
}

#[derive(Debug, Default)]
pub struct Counter {
    value: u32,
    previous: Vec<bool>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Apply the keys that went down since the previous snapshot.
    pub fn update(&mut self, snapshot: &ButtonSnapshot) -> Step {
        let mut step = Step::Continue;
        for key in snapshot.pressed() {
            if self.previous.get(key).copied().unwrap_or(false) {
                continue;
            }
            match key {
                KEY_INCREMENT => self.value = (self.value + 1).min(MAX_NUMBER),
                KEY_DECREMENT => self.value = self.value.saturating_sub(1),
                KEY_RESET => self.value = 0,
                KEY_QUIT => step = Step::Quit,
                _ => {}
            }
        }
        self.previous = snapshot.as_slice().to_vec();
        step
    }
}

/// Poll the buttons and keep the displays in sync with the counter.
///
/// Stops on KEY3 or after `runtime.max_polls` polls (0 means no limit).
/// The displays are blanked before returning the final count.
pub fn run<B: RegisterBackend>(
    window: &mut RegisterWindow<B>,
    runtime: &RuntimeConfig,
) -> Result<u32, OrchestratorError> {
    let keys = window.board().button_count.min(KEYS_USED);
    let interval = Duration::from_millis(runtime.poll_interval_ms);
    let mut counter = Counter::new();
    show_number(window, counter.value())?;

    let mut polls: u64 = 0;
    loop {
        if runtime.max_polls != 0 && polls >= runtime.max_polls {
            break;
        }
        polls += 1;

        let snapshot = read_buttons(window, keys)?;
        let before = counter.value();
        let step = counter.update(&snapshot);
        if step == Step::Quit {
            log::info!("Quit pressed after {polls} polls");
            break;
        }
        if counter.value() != before {
            log::debug!("Counter {before} -> {}", counter.value());
            show_number(window, counter.value())?;
        }
        std::thread::sleep(interval);
    }

    blank_all(window)?;
    Ok(counter.value())
}
