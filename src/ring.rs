use crate::invariants::{
    debug_assert_bounded_count, debug_assert_mask_matches, debug_assert_read_not_past_write,
};
use crate::storage::{StorageDevice, TransferMode};
use crate::{Config, MemoryDevice, Metrics, RingError, StorageError};
use parking_lot::Mutex;
use std::fmt;
use tracing::{debug, trace, warn};

// =============================================================================
// CURSORS & LOCKING STRATEGY
// =============================================================================
//
// ## Cursors (full/empty disambiguation)
//
// We keep unbounded u32 cursors for `write` and `read` instead of wrapped
// addresses:
// - The buffered byte count is always `write.wrapping_sub(read)`, even after
//   the cursors themselves overflow u32
// - A full buffer (count == capacity) and an empty one (count == 0) are
//   distinct without a flag or a reserved slot
// - The storage address is computed as `cursor & mask` only when issuing a
//   bus transaction
//
// ## Two locks
//
// `state` guards cursors and counters. It is held only across cursor
// arithmetic, never across a bus transaction, so `available()`, `free()` and
// `metrics()` never wait on the bus.
//
// `storage` is the bus lock. Producer and consumer transactions are
// serialized on it, as they would be on a shared SPI bus.
//
// **Producer (push):**
// 1. Lock `state`: check `len <= free`, compute `write & mask`; unlock
// 2. Lock `storage`: one sequential write; unlock
// 3. Lock `state`: `write += len`, bump counters; unlock
//
// **Consumer (pull):**
// 1. Lock `state`: check `len <= available`, compute `read & mask`; unlock
// 2. Lock `storage`: one sequential read; unlock
// 3. Lock `state`: `read += len`, bump counters; unlock
//
// A cursor is published only after its transaction completed, so the consumer
// never reads bytes that are still being written, and the producer never
// overwrites bytes that are still being read. Between steps 1 and 3 the other
// side can only move its own cursor in the direction that grows our margin
// (more free space for the producer, more data for the consumer).
//
// ## Single-Producer / Single-Consumer
//
// The protocol above relies on exactly one pusher and one puller. Two
// concurrent pushers would both compute the same start address. The locks do
// not defend against that.
//
// =============================================================================

/// Cursor and counter state guarded by the state lock.
#[derive(Debug, Clone, Copy, Default)]
struct State {
    /// Write cursor (advanced by the producer)
    write: u32,
    /// Read cursor (advanced by the consumer)
    read: u32,
    bytes_pushed: u64,
    bytes_pulled: u64,
    push_operations: u64,
    pull_operations: u64,
}

impl State {
    /// Bytes pushed but not yet pulled.
    #[inline]
    fn available(&self) -> u32 {
        self.write.wrapping_sub(self.read)
    }
}

/// SPSC byte ring buffer over an external storage device.
///
/// A producer pushes byte chunks and a consumer pulls them back in order. The
/// bytes live in the storage device; the buffer only keeps two cursors.
///
/// The storage device must be in sequential mode with an address space of
/// exactly `capacity` bytes: a chunk that runs past the top of the address
/// space is written in one transfer and relies on the device wrapping its own
/// address pointer. `begin()` enforces both.
pub struct RingBuffer<S> {
    capacity: u32,
    mask: u32,
    state: Mutex<State>,
    storage: Mutex<S>,
}

impl<S: StorageDevice> RingBuffer<S> {
    /// Starts a ring buffer over an opened storage device.
    ///
    /// Switches the device to sequential mode.
    ///
    /// # Panics
    ///
    /// If `capacity` is not a power of two, or if it differs from the
    /// device's capacity.
    pub fn begin(mut storage: S, capacity: u32) -> Result<Self, RingError<S::Error>> {
        assert!(
            capacity.is_power_of_two(),
            "ring buffer capacity {} is not a power of two",
            capacity
        );
        assert_eq!(
            storage.capacity(),
            capacity,
            "storage device capacity must equal ring buffer capacity"
        );

        let mask = capacity - 1;
        debug_assert_mask_matches!(mask, capacity);

        storage.set_transfer_mode(TransferMode::Sequential)?;
        let mode = storage.transfer_mode()?;
        debug!(
            capacity,
            page_size = storage.page_size(),
            max_transfer = storage.max_transfer(),
            ?mode,
            "ring buffer begin"
        );

        Ok(Self {
            capacity,
            mask,
            state: Mutex::new(State::default()),
            storage: Mutex::new(storage),
        })
    }

    /// Ends the ring buffer and closes the storage device.
    pub fn end(self) -> Result<(), RingError<S::Error>> {
        let Self { state, storage, .. } = self;
        // Cursors and counters go away with `self`; only the device needs
        // an explicit teardown.
        let state = state.into_inner();
        debug!(
            available = state.available(),
            bytes_pushed = state.bytes_pushed,
            bytes_pulled = state.bytes_pulled,
            "ring buffer end"
        );

        storage.into_inner().close()?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// Returns the ring buffer capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of bytes that can be pulled.
    #[inline]
    pub fn available(&self) -> u32 {
        self.state.lock().available()
    }

    /// Number of bytes that can be pushed.
    #[inline]
    pub fn free(&self) -> u32 {
        self.capacity - self.state.lock().available()
    }

    /// Returns true if nothing is buffered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    /// Returns true if no byte can be pushed.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.available() == self.capacity
    }

    /// Snapshot of the usage counters.
    pub fn metrics(&self) -> Metrics {
        let state = *self.state.lock();
        Metrics {
            bytes_pushed: state.bytes_pushed,
            bytes_pulled: state.bytes_pulled,
            push_operations: state.push_operations,
            pull_operations: state.pull_operations,
            available: state.available(),
            capacity: self.capacity,
        }
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Pushes `data` into the buffer as one storage write.
    ///
    /// Callers cap `data` to the device's `max_transfer()` and to `free()`.
    ///
    /// # Panics
    ///
    /// If `data` is longer than `free()`. Truncating would desynchronize the
    /// cursors from the stored bytes.
    pub fn push(&self, data: &[u8]) -> Result<(), RingError<S::Error>> {
        assert!(
            data.len() <= self.capacity as usize,
            "push of {} bytes exceeds ring buffer capacity {}",
            data.len(),
            self.capacity
        );
        let len = data.len() as u32;

        let address = {
            let state = self.state.lock();
            let free = self.capacity - state.available();
            assert!(
                len <= free,
                "push of {} bytes exceeds free space {}",
                len,
                free
            );
            state.write & self.mask
        };

        if let Err(e) = self.storage.lock().write(address, data) {
            warn!(address, len, error = %e, "ring buffer push failed");
            return Err(RingError::Storage(e));
        }

        let mut state = self.state.lock();
        let write = state.write.wrapping_add(len);
        debug_assert_bounded_count!(write, state.read, self.capacity);
        state.write = write;
        state.bytes_pushed += u64::from(len);
        state.push_operations += 1;
        trace!(address, len, available = state.available(), "push");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Pulls `length` bytes into `out[..length]` as one storage read.
    ///
    /// # Panics
    ///
    /// If `length` exceeds `available()` or `out.len()`.
    pub fn pull(&self, length: u32, out: &mut [u8]) -> Result<(), RingError<S::Error>> {
        assert!(
            length as usize <= out.len(),
            "pull of {} bytes into a {}-byte slice",
            length,
            out.len()
        );

        let address = {
            let state = self.state.lock();
            let available = state.available();
            assert!(
                length <= available,
                "pull of {} bytes exceeds available {}",
                length,
                available
            );
            state.read & self.mask
        };

        if let Err(e) = self
            .storage
            .lock()
            .read(address, &mut out[..length as usize])
        {
            warn!(address, length, error = %e, "ring buffer pull failed");
            return Err(RingError::Storage(e));
        }

        let mut state = self.state.lock();
        let read = state.read.wrapping_add(length);
        debug_assert_read_not_past_write!(read, state.write, self.capacity);
        state.read = read;
        state.bytes_pulled += u64::from(length);
        state.pull_operations += 1;
        trace!(address, length, available = state.available(), "pull");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // LIFECYCLE
    // ---------------------------------------------------------------------

    /// Discards all buffered bytes and zeroes the counters.
    ///
    /// Stored bytes are not erased. Must not race a `push`/`pull` in flight:
    /// quiesce producer and consumer first.
    pub fn reset(&self) {
        *self.state.lock() = State::default();
        debug!(capacity = self.capacity, "ring buffer reset");
    }

    /// Runs `f` with exclusive access to the storage device.
    ///
    /// Holds the bus lock for the duration of `f`. Transactions issued here
    /// bypass the cursors; changing the transfer mode breaks the buffer until
    /// sequential mode is restored.
    pub fn with_storage<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.storage.lock())
    }
}

impl RingBuffer<MemoryDevice> {
    /// Opens an emulated device sized by `config` and starts a ring buffer
    /// of the same capacity on it.
    pub fn open(config: &Config) -> Result<Self, RingError<StorageError>> {
        let device = MemoryDevice::open(config.storage())?;
        Self::begin(device, config.capacity())
    }
}

impl<S> fmt::Debug for RingBuffer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = *self.state.lock();
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity)
            .field("write", &state.write)
            .field("read", &state.read)
            .field("available", &state.available())
            .field("bytes_pushed", &state.bytes_pushed)
            .field("bytes_pulled", &state.bytes_pulled)
            .field("push_operations", &state.push_operations)
            .field("pull_operations", &state.pull_operations)
            .finish_non_exhaustive()
    }
}
