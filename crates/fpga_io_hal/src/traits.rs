use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HalError {
    #[error("couldn't open {path}: {source}")]
    DeviceOpen {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("couldn't map {span:#x} bytes at {base:#x}: {source}")]
    Mapping {
        base: u64,
        span: usize,
        #[source]
        source: io::Error,
    },
    #[error("couldn't unmap register window: {0}")]
    Unmap(#[source] io::Error),
    #[error("register window is closed")]
    WindowClosed,
    #[error("invalid display position: {0}")]
    InvalidSelector(usize),
    #[error("requested {requested} buttons, board has {available}")]
    InvalidButtonCount { requested: usize, available: usize },
    #[error("{0} does not fit on the displays")]
    Overflow(u32),
    #[error("invalid board map: {0}")]
    InvalidBoardMap(String),
    #[error("config error: {0}")]
    Config(String),
}

/// Platform capability behind a register window.
///
/// The window drives the lifecycle (`open_device`, `map`, `unmap`,
/// `close_device`) and only calls `read_word`/`write_word` while mapped,
/// with offsets already checked against the board map.
pub trait RegisterBackend: Send {
    /// Acquire a read/write, synchronized handle to the physical-memory device.
    fn open_device(&mut self, device: &str) -> Result<(), HalError>;
    /// Map `span` bytes of physical memory starting at `base`, shared and writable.
    fn map(&mut self, base: u64, span: usize) -> Result<(), HalError>;
    fn unmap(&mut self) -> Result<(), HalError>;
    /// Release the device handle. Calling this with no open handle does nothing.
    fn close_device(&mut self);

    fn read_word(&self, offset: usize) -> u32;
    fn write_word(&mut self, offset: usize, value: u32);
}

impl RegisterBackend for Box<dyn RegisterBackend> {
    fn open_device(&mut self, device: &str) -> Result<(), HalError> {
        (**self).open_device(device)
    }
    fn map(&mut self, base: u64, span: usize) -> Result<(), HalError> {
        (**self).map(base, span)
    }
    fn unmap(&mut self) -> Result<(), HalError> {
        (**self).unmap()
    }
    fn close_device(&mut self) {
        (**self).close_device()
    }
    fn read_word(&self, offset: usize) -> u32 {
        (**self).read_word(offset)
    }
    fn write_word(&mut self, offset: usize, value: u32) {
        (**self).write_word(offset, value)
    }
}
