use crate::traits::{HalError, RegisterBackend};
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Lifecycle step a `SimBackend` can be told to fail. An injected fault
/// fires once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Open,
    Map,
    Unmap,
}

/// In-memory register file standing in for the lightweight bridge.
///
/// Registers read as 0 until written or preset, and only while mapped.
/// Every write while mapped is recorded in order; writes while unmapped are
/// dropped. Open device handles are counted in a shared counter so tests
/// can check for leaks after the backend is gone.
pub struct SimBackend {
    registers: HashMap<usize, u32>,
    writes: Vec<(usize, u32)>,
    device_open: bool,
    mapping: Option<(u64, usize)>,
    fault: Option<Fault>,
    open_handles: Arc<AtomicUsize>,
}

impl SimBackend {
    pub fn new() -> Self {
        Self {
            registers: HashMap::new(),
            writes: Vec::new(),
            device_open: false,
            mapping: None,
            fault: None,
            open_handles: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_fault(fault: Fault) -> Self {
        Self {
            fault: Some(fault),
            ..Self::new()
        }
    }

    /// Preset a register without recording a write, e.g. the raw key word.
    pub fn set_register(&mut self, offset: usize, value: u32) {
        self.registers.insert(offset, value);
    }

    pub fn register(&self, offset: usize) -> Option<u32> {
        self.registers.get(&offset).copied()
    }

    pub fn writes(&self) -> &[(usize, u32)] {
        &self.writes
    }

    pub fn is_device_open(&self) -> bool {
        self.device_open
    }

    pub fn is_mapped(&self) -> bool {
        self.mapping.is_some()
    }

    /// Shared count of device handles currently held.
    pub fn handle_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.open_handles)
    }

    fn injected(&mut self, fault: Fault) -> bool {
        if self.fault == Some(fault) {
            self.fault = None;
            true
        } else {
            false
        }
    }
}

impl Default for SimBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBackend for SimBackend {
    fn open_device(&mut self, device: &str) -> Result<(), HalError> {
        if self.injected(Fault::Open) {
            return Err(HalError::DeviceOpen {
                path: device.to_string(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }
        if !self.device_open {
            self.device_open = true;
            self.open_handles.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn map(&mut self, base: u64, span: usize) -> Result<(), HalError> {
        let refused = if !self.device_open {
            Some(io::ErrorKind::InvalidInput)
        } else if self.mapping.is_some() {
            Some(io::ErrorKind::AlreadyExists)
        } else if self.injected(Fault::Map) {
            Some(io::ErrorKind::InvalidInput)
        } else {
            None
        };
        if let Some(kind) = refused {
            return Err(HalError::Mapping {
                base,
                span,
                source: io::Error::from(kind),
            });
        }
        self.mapping = Some((base, span));
        Ok(())
    }

    fn unmap(&mut self) -> Result<(), HalError> {
        if self.injected(Fault::Unmap) {
            return Err(HalError::Unmap(io::Error::from(io::ErrorKind::InvalidInput)));
        }
        self.mapping = None;
        Ok(())
    }

    fn close_device(&mut self) {
        if self.device_open {
            self.device_open = false;
            self.open_handles.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn read_word(&self, offset: usize) -> u32 {
        if !self.is_mapped() {
            return 0;
        }
        self.registers.get(&offset).copied().unwrap_or(0)
    }

    fn write_word(&mut self, offset: usize, value: u32) {
        if !self.is_mapped() {
            return;
        }
        self.registers.insert(offset, value);
        self.writes.push((offset, value));
    }
}
