use crate::error::StorageError;
use crate::storage::{StorageConfig, StorageDevice, TransferMode};
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

/// In-process emulation of a serial SRAM chip.
///
/// Follows the chip's mode semantics: byte mode accepts single-byte
/// transactions only, page mode wraps inside the addressed page, sequential
/// mode wraps at the end of the device. The chip powers up in sequential mode.
///
/// Faults and per-transaction latency can be injected to exercise callers.
#[derive(Debug)]
pub struct MemoryDevice {
    config: StorageConfig,
    cells: Box<[u8]>,
    mode: TransferMode,
    /// Number of transactions left before an injected bus failure.
    fail_after: Option<u64>,
    latency: Option<Duration>,
    transactions: u64,
}

impl MemoryDevice {
    /// Opens a device with the given geometry.
    pub fn open(config: StorageConfig) -> Result<Self, StorageError> {
        config.validate()?;
        debug!(
            total_bytes = config.total_bytes,
            bytes_per_page = config.bytes_per_page,
            number_of_pages = config.number_of_pages(),
            max_transfer = config.max_transfer,
            clock_speed_hz = config.clock_speed_hz,
            chip_select = config.chip_select,
            "memory device open"
        );

        Ok(Self {
            config,
            cells: vec![0; config.total_bytes as usize].into_boxed_slice(),
            mode: TransferMode::Sequential,
            fail_after: None,
            latency: None,
            transactions: 0,
        })
    }

    /// Adds a fixed delay to every transaction.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes the transaction after the next `n` fail with a bus error.
    ///
    /// `fail_after(0)` fails the very next transaction.
    pub fn fail_after(&mut self, n: u64) {
        self.fail_after = Some(n);
    }

    /// Number of transactions issued so far, failed ones included.
    #[inline]
    pub fn transactions(&self) -> u64 {
        self.transactions
    }

    /// Returns the device configuration.
    #[inline]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn transaction(&mut self, address: u32) -> Result<(), StorageError> {
        self.transactions += 1;

        if let Some(delay) = self.latency {
            thread::sleep(delay);
        }

        match self.fail_after {
            Some(0) => {
                self.fail_after = None;
                return Err(StorageError::Bus { address });
            }
            Some(n) => self.fail_after = Some(n - 1),
            None => {}
        }

        if address >= self.config.total_bytes {
            return Err(StorageError::OutOfRange { address });
        }
        Ok(())
    }

    fn check_length(&self, len: usize) -> Result<(), StorageError> {
        if len > self.config.max_transfer as usize {
            return Err(StorageError::TransferTooLong {
                len,
                max: self.config.max_transfer,
            });
        }
        if self.mode == TransferMode::Byte && len > 1 {
            return Err(StorageError::TransferMode {
                mode: self.mode,
                len,
            });
        }
        Ok(())
    }

    /// Cell index of the `offset`-th byte of a transfer starting at `address`.
    #[inline]
    fn cell(&self, address: u32, offset: usize) -> usize {
        let offset = offset as u32;
        match self.mode {
            TransferMode::Page => {
                let page_mask = self.config.bytes_per_page - 1;
                ((address & !page_mask) | (address.wrapping_add(offset) & page_mask)) as usize
            }
            TransferMode::Byte | TransferMode::Sequential => {
                (address.wrapping_add(offset) & (self.config.total_bytes - 1)) as usize
            }
        }
    }

    fn read_cells(&mut self, address: u32, out: &mut [u8]) -> Result<(), StorageError> {
        self.transaction(address)?;
        self.check_length(out.len())?;
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = self.cells[self.cell(address, i)];
        }
        trace!(address, len = out.len(), mode = ?self.mode, "read");
        Ok(())
    }

    fn write_cells(&mut self, address: u32, data: &[u8]) -> Result<(), StorageError> {
        self.transaction(address)?;
        self.check_length(data.len())?;
        for (i, &byte) in data.iter().enumerate() {
            let idx = self.cell(address, i);
            self.cells[idx] = byte;
        }
        trace!(address, len = data.len(), mode = ?self.mode, "write");
        Ok(())
    }

    fn check_page(&self, len: usize) -> Result<(), StorageError> {
        if len != self.config.bytes_per_page as usize {
            return Err(StorageError::PageSize {
                len,
                page: self.config.bytes_per_page,
            });
        }
        Ok(())
    }
}

impl StorageDevice for MemoryDevice {
    type Error = StorageError;

    #[inline]
    fn capacity(&self) -> u32 {
        self.config.total_bytes
    }

    #[inline]
    fn page_size(&self) -> u32 {
        self.config.bytes_per_page
    }

    #[inline]
    fn max_transfer(&self) -> u32 {
        self.config.max_transfer
    }

    fn read_byte(&mut self, address: u32) -> Result<u8, StorageError> {
        let mut byte = [0u8; 1];
        self.read_cells(address, &mut byte)?;
        Ok(byte[0])
    }

    fn write_byte(&mut self, address: u32, value: u8) -> Result<(), StorageError> {
        self.write_cells(address, &[value])
    }

    fn read_page(&mut self, address: u32, out: &mut [u8]) -> Result<(), StorageError> {
        self.check_page(out.len())?;
        self.read_cells(address, out)
    }

    fn write_page(&mut self, address: u32, data: &[u8]) -> Result<(), StorageError> {
        self.check_page(data.len())?;
        self.write_cells(address, data)
    }

    fn read(&mut self, address: u32, out: &mut [u8]) -> Result<(), StorageError> {
        self.read_cells(address, out)
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<(), StorageError> {
        self.write_cells(address, data)
    }

    fn set_transfer_mode(&mut self, mode: TransferMode) -> Result<(), StorageError> {
        self.transaction(0)?;
        self.mode = mode;
        debug!(mode = ?mode, register = mode.register(), "write mode register");
        Ok(())
    }

    fn transfer_mode(&mut self) -> Result<TransferMode, StorageError> {
        self.transaction(0)?;
        TransferMode::try_from(self.mode.register())
    }

    fn close(self) -> Result<(), StorageError> {
        debug!(transactions = self.transactions, "memory device closed");
        Ok(())
    }
}
