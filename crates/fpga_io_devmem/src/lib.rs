//! `/dev/mem` register backend for the lightweight HPS-to-FPGA bridge.
//!
//! Implements `RegisterBackend` by opening the physical-memory device with
//! `O_SYNC` and mapping the bridge span `MAP_SHARED`. Register words are
//! accessed with volatile 32-bit reads and writes.

use fpga_io_hal::traits::{HalError, RegisterBackend};
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::ptr::{self, NonNull};

const WORD: usize = 4;

struct Mapping {
    ptr: NonNull<u8>,
    len: usize,
}

/// Memory-mapped register span backed by a physical-memory device.
pub struct DevMemBackend {
    file: Option<File>,
    mapping: Option<Mapping>,
}

// The mapping is only reached through `&self`/`&mut self`, so moving the
// backend to another thread is sound. It is deliberately not `Sync`.
unsafe impl Send for DevMemBackend {}

impl DevMemBackend {
    pub fn new() -> Self {
        Self {
            file: None,
            mapping: None,
        }
    }

    pub fn is_device_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn is_mapped(&self) -> bool {
        self.mapping.is_some()
    }

    fn word_ptr(&self, offset: usize) -> Option<*mut u32> {
        let mapping = self.mapping.as_ref()?;
        if offset % WORD != 0 || offset.checked_add(WORD)? > mapping.len {
            return None;
        }
        // SAFETY: offset + WORD <= len, so the result stays inside the mapping.
        Some(unsafe { mapping.ptr.as_ptr().add(offset) }.cast::<u32>())
    }
}

impl Default for DevMemBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBackend for DevMemBackend {
    fn open_device(&mut self, device: &str) -> Result<(), HalError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(device)
            .map_err(|source| HalError::DeviceOpen {
                path: device.to_string(),
                source,
            })?;
        log::debug!("Opened {device} (fd {})", file.as_raw_fd());
        self.file = Some(file);
        Ok(())
    }

    fn map(&mut self, base: u64, span: usize) -> Result<(), HalError> {
        let mapping_error = |source| HalError::Mapping { base, span, source };
        if self.mapping.is_some() {
            return Err(mapping_error(io::Error::from_raw_os_error(libc::EBUSY)));
        }
        let Some(file) = self.file.as_ref() else {
            return Err(mapping_error(io::Error::from_raw_os_error(libc::EBADF)));
        };

        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                span,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                base as libc::off_t,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(mapping_error(io::Error::last_os_error()));
        }
        let ptr = NonNull::new(ptr.cast::<u8>())
            .ok_or_else(|| mapping_error(io::Error::from_raw_os_error(libc::ENOMEM)))?;

        self.mapping = Some(Mapping { ptr, len: span });
        Ok(())
    }

    fn unmap(&mut self) -> Result<(), HalError> {
        let Some(mapping) = self.mapping.take() else {
            return Ok(());
        };
        // SAFETY: ptr/len are exactly what mmap returned and nothing else
        // holds a reference into the mapping.
        if unsafe { libc::munmap(mapping.ptr.as_ptr().cast(), mapping.len) } != 0 {
            let err = io::Error::last_os_error();
            self.mapping = Some(mapping);
            return Err(HalError::Unmap(err));
        }
        Ok(())
    }

    fn close_device(&mut self) {
        if let Some(file) = self.file.take() {
            log::debug!("Closing fd {}", file.as_raw_fd());
        }
    }

    fn read_word(&self, offset: usize) -> u32 {
        match self.word_ptr(offset) {
            // SAFETY: aligned, in bounds, and the mapping is live.
            Some(word) => unsafe { ptr::read_volatile(word) },
            None => {
                log::warn!("Read at {offset:#x} outside mapped window");
                0
            }
        }
    }

    fn write_word(&mut self, offset: usize, value: u32) {
        match self.word_ptr(offset) {
            // SAFETY: aligned, in bounds, and the mapping is live.
            Some(word) => unsafe { ptr::write_volatile(word, value) },
            None => log::warn!("Write at {offset:#x} outside mapped window dropped"),
        }
    }
}

impl Drop for DevMemBackend {
    fn drop(&mut self) {
        if let Err(e) = self.unmap() {
            log::warn!("{e}");
        }
    }
}
