//! Push-button bank (KEY register).
//!
//! The hardware reports a pressed button as 0, so the raw word is inverted
//! before bit `i` is taken as the state of button `i`.

use crate::traits::{HalError, RegisterBackend};
use crate::window::{Register, RegisterWindow};

/// Pressed state of each requested button, button 0 first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonSnapshot(Vec<bool>);

impl ButtonSnapshot {
    /// Decode `count` buttons from a raw active-low key word. Buttons past
    /// bit 31 read as released.
    pub fn from_raw(raw: u32, count: usize) -> Self {
        let mut pressed = vec![false; count];
        decode_into(raw, &mut pressed);
        Self(pressed)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Buttons past the end of the snapshot read as released.
    pub fn is_pressed(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(false)
    }

    /// Indices of the pressed buttons, ascending.
    pub fn pressed(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &down)| down.then_some(i))
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

fn decode_into(raw: u32, out: &mut [bool]) {
    let active = !raw;
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = active.checked_shr(i as u32).unwrap_or(0) & 1 == 1;
    }
}

/// Read `count` buttons with a single access to the key register.
pub fn read_buttons<B: RegisterBackend>(
    window: &RegisterWindow<B>,
    count: usize,
) -> Result<ButtonSnapshot, HalError> {
    let mut pressed = vec![false; count];
    read_buttons_into(window, &mut pressed)?;
    Ok(ButtonSnapshot(pressed))
}

/// Fill `out` with the pressed state of buttons `0..out.len()`.
pub fn read_buttons_into<B: RegisterBackend>(
    window: &RegisterWindow<B>,
    out: &mut [bool],
) -> Result<(), HalError> {
    let available = window.board().button_count;
    if out.is_empty() || out.len() > available {
        return Err(HalError::InvalidButtonCount {
            requested: out.len(),
            available,
        });
    }

    let raw = window.read_register(Register::Key)?;
    decode_into(raw, out);
    log::debug!("KEY raw {raw:#x} -> {out:?}");
    Ok(())
}
