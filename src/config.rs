use crate::storage::StorageConfig;

/// Configuration for a `RingBuffer` and the storage device behind it.
///
/// The ring capacity and the device size are derived from the same
/// `capacity_bits`, so the buffer's wrap and the device's sequential-mode
/// wrap always agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Storage size as power of 2 (default: 17 = 128 KiB)
    pub capacity_bits: u8,
    /// Page size of the memory chip in bytes
    pub bytes_per_page: u32,
    /// Largest single bus transfer in bytes (DMA limit)
    pub max_transfer: u32,
}

impl Config {
    /// Creates a new configuration with custom settings.
    ///
    /// # Panics
    ///
    /// If `capacity_bits` is 32 or more.
    pub const fn new(capacity_bits: u8, bytes_per_page: u32, max_transfer: u32) -> Self {
        assert!(capacity_bits < 32, "capacity_bits must be below 32");
        Self {
            capacity_bits,
            bytes_per_page,
            max_transfer,
        }
    }

    /// Returns the capacity of the ring buffer in bytes.
    #[inline]
    pub const fn capacity(&self) -> u32 {
        1 << self.capacity_bits
    }

    /// Returns the mask for address wrapping.
    #[inline]
    pub const fn mask(&self) -> u32 {
        self.capacity() - 1
    }

    /// Storage configuration for a device matching this ring.
    pub fn storage(&self) -> StorageConfig {
        StorageConfig::default()
            .with_total_bytes(self.capacity())
            .with_bytes_per_page(self.bytes_per_page)
            .with_max_transfer(self.max_transfer)
    }

    /// Sets the capacity as a power of two.
    ///
    /// # Panics
    ///
    /// If `bits` is 32 or more.
    pub fn with_capacity_bits(mut self, bits: u8) -> Self {
        assert!(bits < 32, "capacity_bits must be below 32");
        self.capacity_bits = bits;
        self
    }

    /// Sets the maximum transfer size.
    pub fn with_max_transfer(mut self, max_transfer: u32) -> Self {
        self.max_transfer = max_transfer;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        SRAM_23LC1024_CONFIG
    }
}

/// 23LC1024: 128 KiB in 32-byte pages, 2048-byte DMA transfers.
pub const SRAM_23LC1024_CONFIG: Config = Config::new(17, 32, 2048);

/// Small ring (256 bytes) for tests and wrap-heavy workloads.
pub const SMALL_CONFIG: Config = Config::new(8, 32, 2048);
