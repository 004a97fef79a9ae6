//! The storage device seam.
//!
//! A storage device is a byte-addressable serial memory chip (23LC1024 and
//! similar) reached over a bus. The ring buffer only needs the sequential
//! transfers and the mode register; byte and page access are part of the
//! interface because the chip offers them and diagnostics use them.

use crate::error::StorageError;

/// Transfer granularity selected through the device's mode register.
///
/// Discriminants are the register encoding of the 23LC1024 (bits 7:6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TransferMode {
    /// One byte per transaction.
    Byte = 0x00,
    /// Transfers wrap inside the addressed page.
    Page = 0x80,
    /// Transfers auto-increment and wrap at the end of the device.
    Sequential = 0x40,
}

impl TransferMode {
    const MODE_BITS: u8 = 0xC0;

    /// Raw mode register value.
    #[inline]
    pub const fn register(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for TransferMode {
    type Error = StorageError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value & Self::MODE_BITS {
            0x00 => Ok(Self::Byte),
            0x80 => Ok(Self::Page),
            0x40 => Ok(Self::Sequential),
            _ => Err(StorageError::UnknownMode(value)),
        }
    }
}

/// A byte-addressable serial memory.
///
/// Every operation is one bus transaction. Implementations report bus
/// failures as errors and never truncate a transfer.
pub trait StorageDevice {
    /// Error reported by a failed transaction.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Size of the address space in bytes.
    fn capacity(&self) -> u32;

    /// Page size in bytes.
    fn page_size(&self) -> u32;

    /// Largest single transfer in bytes.
    fn max_transfer(&self) -> u32;

    /// Reads one byte.
    fn read_byte(&mut self, address: u32) -> Result<u8, Self::Error>;

    /// Writes one byte.
    fn write_byte(&mut self, address: u32, value: u8) -> Result<(), Self::Error>;

    /// Reads one page starting at `address`. `out` must be one page long.
    fn read_page(&mut self, address: u32, out: &mut [u8]) -> Result<(), Self::Error>;

    /// Writes one page starting at `address`. `data` must be one page long.
    fn write_page(&mut self, address: u32, data: &[u8]) -> Result<(), Self::Error>;

    /// Reads `out.len()` bytes starting at `address`.
    ///
    /// In sequential mode the device address wraps at `capacity()`.
    fn read(&mut self, address: u32, out: &mut [u8]) -> Result<(), Self::Error>;

    /// Writes `data` starting at `address`.
    ///
    /// In sequential mode the device address wraps at `capacity()`.
    fn write(&mut self, address: u32, data: &[u8]) -> Result<(), Self::Error>;

    /// Writes the mode register.
    fn set_transfer_mode(&mut self, mode: TransferMode) -> Result<(), Self::Error>;

    /// Reads the mode register.
    fn transfer_mode(&mut self) -> Result<TransferMode, Self::Error>;

    /// Releases the bus connection.
    fn close(self) -> Result<(), Self::Error>
    where
        Self: Sized;
}

/// Connection settings for a serial memory chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageConfig {
    /// Size of the device in bytes. Must be a power of two.
    pub total_bytes: u32,
    /// Page size in bytes. Must be a power of two dividing `total_bytes`.
    pub bytes_per_page: u32,
    /// Largest single transfer in bytes.
    pub max_transfer: u32,
    /// Bus clock.
    pub clock_speed_hz: u32,
    /// Chip-select line.
    pub chip_select: u8,
}

impl StorageConfig {
    /// Number of pages on the device.
    #[inline]
    pub const fn number_of_pages(&self) -> u32 {
        self.total_bytes / self.bytes_per_page
    }

    /// Checks that the geometry is usable.
    pub fn validate(&self) -> Result<(), StorageError> {
        if !self.total_bytes.is_power_of_two() {
            return Err(StorageError::InvalidConfig(
                "total_bytes must be a power of two",
            ));
        }
        if !self.bytes_per_page.is_power_of_two() || self.bytes_per_page > self.total_bytes {
            return Err(StorageError::InvalidConfig(
                "bytes_per_page must be a power of two no larger than total_bytes",
            ));
        }
        if self.max_transfer == 0 {
            return Err(StorageError::InvalidConfig("max_transfer must be non-zero"));
        }
        Ok(())
    }

    /// Sets the device size.
    pub fn with_total_bytes(mut self, total_bytes: u32) -> Self {
        self.total_bytes = total_bytes;
        self
    }

    /// Sets the page size.
    pub fn with_bytes_per_page(mut self, bytes_per_page: u32) -> Self {
        self.bytes_per_page = bytes_per_page;
        self
    }

    /// Sets the transfer limit.
    pub fn with_max_transfer(mut self, max_transfer: u32) -> Self {
        self.max_transfer = max_transfer;
        self
    }

    /// Sets the bus clock.
    pub fn with_clock_speed_hz(mut self, clock_speed_hz: u32) -> Self {
        self.clock_speed_hz = clock_speed_hz;
        self
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            total_bytes: 131072,
            bytes_per_page: 32,
            max_transfer: 2048,
            clock_speed_hz: 20_000_000,
            chip_select: 5,
        }
    }
}
