//! Lifecycle of the mapped lightweight-bridge window.
//!
//! A `RegisterWindow` is either active or closed. Register accessors check
//! the state on every call, so a closed window reports `WindowClosed`
//! instead of touching a stale mapping. Dropping an active window closes it.
//!
//! The backend is owned by the window and only lent out immutably, so its
//! mapping cannot be torn down behind the window's back.

use crate::config::BoardMap;
use crate::display::DisplayPosition;
use crate::traits::{HalError, RegisterBackend};

/// Named peripheral register inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    Key,
    Hex(DisplayPosition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Active,
    /// `close` could not unmap the span. Accessors are rejected and the
    /// next `close` retries the unmap.
    UnmapFailed,
    Closed,
}

pub struct RegisterWindow<B: RegisterBackend> {
    backend: B,
    board: BoardMap,
    state: WindowState,
}

impl<B: RegisterBackend> RegisterWindow<B> {
    /// Open the device and map the bridge span described by `board`.
    ///
    /// A mapping failure releases the device handle before returning.
    pub fn open(mut backend: B, board: BoardMap) -> Result<Self, HalError> {
        board.validate()?;

        if let Err(e) = backend.open_device(&board.device) {
            log::warn!("{e}");
            return Err(e);
        }
        if let Err(e) = backend.map(board.bridge_base, board.bridge_span) {
            log::warn!("{e}");
            backend.close_device();
            return Err(e);
        }

        log::info!(
            "Mapped {:#x} bytes at {:#x} from {}",
            board.bridge_span,
            board.bridge_base,
            board.device
        );
        Ok(Self {
            backend,
            board,
            state: WindowState::Active,
        })
    }

    /// Unmap the span and release the device handle.
    ///
    /// Closing a closed window is a no-op. If unmapping fails the window
    /// stops serving accessors, keeps the handle, and a later `close` (or
    /// drop) tries the unmap again.
    pub fn close(&mut self) -> Result<(), HalError> {
        if self.state == WindowState::Closed {
            return Ok(());
        }

        if let Err(e) = self.backend.unmap() {
            log::warn!("{e}");
            self.state = WindowState::UnmapFailed;
            return Err(e);
        }
        self.state = WindowState::Closed;
        self.backend.close_device();
        log::info!("Unmapped register window at {:#x}", self.board.bridge_base);
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.state == WindowState::Active
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn board(&self) -> &BoardMap {
        &self.board
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn offset_of(&self, register: Register) -> usize {
        match register {
            Register::Key => self.board.key_offset,
            Register::Hex(position) => self.board.hex_offsets[position.index()],
        }
    }

    pub fn read_register(&self, register: Register) -> Result<u32, HalError> {
        self.ensure_active()?;
        Ok(self.backend.read_word(self.offset_of(register)))
    }

    pub fn write_register(&mut self, register: Register, value: u32) -> Result<(), HalError> {
        self.ensure_active()?;
        let offset = self.offset_of(register);
        log::debug!("{register:?} @ {offset:#x} <- {value:#x}");
        self.backend.write_word(offset, value);
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), HalError> {
        match self.state {
            WindowState::Active => Ok(()),
            WindowState::UnmapFailed | WindowState::Closed => Err(HalError::WindowClosed),
        }
    }
}

impl<B: RegisterBackend> Drop for RegisterWindow<B> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("Register window dropped without a clean close: {e}");
        }
    }
}
