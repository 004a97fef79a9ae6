use crate::storage::TransferMode;
use thiserror::Error;

/// Errors reported by a storage device transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The device did not acknowledge a bus transaction.
    #[error("bus transaction at address {address:#07x} was not acknowledged")]
    Bus {
        /// Start address of the failed transaction.
        address: u32,
    },

    /// The transfer is not valid in the current transfer mode.
    #[error("{len}-byte transfer is not allowed in {mode:?} mode")]
    TransferMode {
        /// Mode the device was in.
        mode: TransferMode,
        /// Requested transfer length.
        len: usize,
    },

    /// The transfer exceeds the largest single bus transfer.
    #[error("transfer of {len} bytes exceeds the {max}-byte transfer limit")]
    TransferTooLong {
        /// Requested transfer length.
        len: usize,
        /// Configured limit.
        max: u32,
    },

    /// Page transfers must cover exactly one page.
    #[error("page transfer of {len} bytes, page size is {page}")]
    PageSize {
        /// Requested transfer length.
        len: usize,
        /// Configured page size.
        page: u32,
    },

    /// The address lies outside the device.
    #[error("address {address:#07x} is outside the device")]
    OutOfRange {
        /// Offending address.
        address: u32,
    },

    /// The device configuration is unusable.
    #[error("invalid storage configuration: {0}")]
    InvalidConfig(&'static str),

    /// The mode register holds a value that maps to no transfer mode.
    #[error("unknown mode register value {0:#04x}")]
    UnknownMode(u8),
}

/// Errors returned by ring buffer operations.
///
/// Contract violations (overrunning the buffer, pulling more than is
/// available, a capacity that is not a power of two) are not errors; they
/// panic.
#[derive(Debug, Error)]
pub enum RingError<E> {
    /// The storage device failed a transaction. The cursor of the failed
    /// operation was not advanced, but the device's internal address pointer
    /// is no longer known; `reset()` before reuse.
    #[error("storage transaction failed: {0}")]
    Storage(#[from] E),
}

impl<E> RingError<E> {
    /// Returns the underlying storage error.
    pub fn into_storage(self) -> E {
        match self {
            Self::Storage(e) => e,
        }
    }
}
