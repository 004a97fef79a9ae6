use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sram_ring::{Backoff, Config, MemoryDevice, RingBuffer, StorageDevice, SMALL_CONFIG};
use std::sync::Arc;
use std::thread;

/// Deterministic pseudo-random byte sequence.
fn sequence(len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(1);
    (0..len).map(|_| rng.gen()).collect()
}

/// Push `data` in chunks no larger than the device's transfer limit.
fn push_chunked(ring: &RingBuffer<MemoryDevice>, data: &[u8]) {
    let max = ring.with_storage(|d| d.max_transfer()) as usize;
    for chunk in data.chunks(max) {
        ring.push(chunk).unwrap();
    }
}

/// Pull `len` bytes in chunks no larger than the device's transfer limit.
fn pull_chunked(ring: &RingBuffer<MemoryDevice>, len: usize) -> Vec<u8> {
    let max = ring.with_storage(|d| d.max_transfer()) as usize;
    let mut out = vec![0u8; len];
    for chunk in out.chunks_mut(max) {
        let n = chunk.len() as u32;
        ring.pull(n, chunk).unwrap();
    }
    out
}

fn assert_sizes(ring: &RingBuffer<MemoryDevice>, available: u32) {
    assert_eq!(ring.available(), available);
    assert_eq!(ring.free(), ring.capacity() - available);
}

#[test]
fn test_full_size_capacity_succeeds() {
    let ring = RingBuffer::open(&Config::default()).unwrap();
    assert_eq!(ring.capacity(), 131072);
    assert_sizes(&ring, 0);
}

#[test]
#[should_panic(expected = "not a power of two")]
fn test_capacity_100_is_fatal() {
    let device = MemoryDevice::open(SMALL_CONFIG.storage()).unwrap();
    let _ = RingBuffer::begin(device, 100);
}

#[test]
fn test_round_trip() {
    let ring = RingBuffer::open(&Config::new(12, 32, 2048)).unwrap();
    let data = sequence(3000);

    push_chunked(&ring, &data);
    assert_sizes(&ring, 3000);

    let out = pull_chunked(&ring, data.len());
    assert_eq!(out, data);
    assert_sizes(&ring, 0);
}

#[test]
fn test_wrap_around() {
    let ring = RingBuffer::open(&Config::new(6, 32, 2048)).unwrap(); // 64 bytes

    let first: Vec<u8> = (0..60).collect();
    ring.push(&first).unwrap();

    let mut out = [0u8; 50];
    ring.pull(50, &mut out).unwrap();
    assert_eq!(&out[..], &first[..50]);

    // Write cursor at 60: this push runs past the top of the address space
    let second: Vec<u8> = (60..110).collect();
    ring.push(&second).unwrap();
    assert_sizes(&ring, 60);

    let mut rest = [0u8; 60];
    ring.pull(60, &mut rest).unwrap();
    let expected: Vec<u8> = (50..110).collect();
    assert_eq!(&rest[..], &expected[..]);
    assert_sizes(&ring, 0);
}

#[test]
fn test_wrapping_push_is_one_transaction() {
    let ring = RingBuffer::open(&Config::new(6, 32, 2048)).unwrap();
    ring.push(&[0u8; 60]).unwrap();
    let mut out = [0u8; 60];
    ring.pull(60, &mut out).unwrap();

    let before = ring.with_storage(|d| d.transactions());
    ring.push(&[1u8; 20]).unwrap();
    let after = ring.with_storage(|d| d.transactions());
    assert_eq!(after - before, 1);
}

#[test]
fn test_push_exactly_free() {
    let ring = RingBuffer::open(&SMALL_CONFIG).unwrap();
    ring.push(&[0u8; 100]).unwrap();

    let free = ring.free() as usize;
    ring.push(&vec![1u8; free]).unwrap();
    assert_eq!(ring.free(), 0);
    assert_eq!(ring.available(), ring.capacity());
}

#[test]
#[should_panic(expected = "exceeds free space")]
fn test_push_free_plus_one_is_fatal() {
    let ring = RingBuffer::open(&SMALL_CONFIG).unwrap();
    ring.push(&[0u8; 100]).unwrap();

    let free = ring.free() as usize;
    let _ = ring.push(&vec![1u8; free + 1]);
}

#[test]
fn test_reset_is_idempotent() {
    let ring = RingBuffer::open(&SMALL_CONFIG).unwrap();
    ring.push(&[5u8; 77]).unwrap();

    ring.reset();
    assert_eq!(ring.available(), 0);
    assert_eq!(ring.capacity(), 256);

    ring.reset();
    assert_eq!(ring.available(), 0);
    assert_eq!(ring.capacity(), 256);
    assert_eq!(ring.free(), 256);
}

#[test]
fn test_push_pull_scenario() {
    let ring = RingBuffer::open(&SMALL_CONFIG).unwrap();
    let capacity = ring.capacity() as usize;
    ring.reset();

    // push 20
    let first = sequence(20);
    push_chunked(&ring, &first);
    assert_sizes(&ring, 20);

    // pull 10: first 10 of the sequence
    let out = pull_chunked(&ring, 10);
    assert_eq!(&out[..], &first[..10]);
    assert_sizes(&ring, 10);

    // push capacity - 15: wraps around the top
    let second = sequence(capacity - 15);
    push_chunked(&ring, &second);
    assert_sizes(&ring, (capacity - 5) as u32);

    // pull the 11th..20th bytes of the first push
    let out = pull_chunked(&ring, 10);
    assert_eq!(&out[..], &first[10..20]);
    assert_sizes(&ring, (capacity - 15) as u32);

    // pull remainder
    let out = pull_chunked(&ring, capacity - 15);
    assert_eq!(out, second);
    assert_sizes(&ring, 0);
}

#[test]
fn test_end_after_use() {
    let ring = RingBuffer::open(&SMALL_CONFIG).unwrap();
    ring.push(&[1u8; 16]).unwrap();
    assert!(ring.end().is_ok());
}

#[test]
fn test_concurrent_producer_consumer() {
    const TOTAL: usize = 200_000;
    const PUSH_CHUNK: usize = 2048;
    const PULL_CHUNK: u32 = 32;

    let ring = Arc::new(RingBuffer::open(&Config::new(10, 32, 2048)).unwrap()); // 1 KiB
    let data: Arc<Vec<u8>> = Arc::new((0..TOTAL).map(|i| (i * 31 + i / 251) as u8).collect());

    let producer = {
        let ring = Arc::clone(&ring);
        let data = Arc::clone(&data);
        thread::spawn(move || {
            let mut backoff = Backoff::new();
            let mut sent = 0;
            while sent < TOTAL {
                let free = ring.free() as usize;
                let n = (TOTAL - sent).min(PUSH_CHUNK).min(free);
                if n == 0 {
                    backoff.snooze();
                    continue;
                }
                ring.push(&data[sent..sent + n]).unwrap();
                sent += n;
                backoff.reset();
            }
        })
    };

    let consumer = {
        let ring = Arc::clone(&ring);
        thread::spawn(move || {
            let mut backoff = Backoff::new();
            let mut received = Vec::with_capacity(TOTAL);
            let mut chunk = [0u8; PULL_CHUNK as usize];
            while received.len() < TOTAL {
                let n = ring.available().min(PULL_CHUNK);
                if n == 0 {
                    backoff.snooze();
                    continue;
                }
                ring.pull(n, &mut chunk).unwrap();
                received.extend_from_slice(&chunk[..n as usize]);
                backoff.reset();

                let available = ring.available();
                assert!(available <= ring.capacity());
            }
            received
        })
    };

    producer.join().unwrap();
    let received = consumer.join().unwrap();

    assert_eq!(received.len(), TOTAL);
    assert!(received == *data, "stream corrupted");

    let m = ring.metrics();
    assert_eq!(m.bytes_pushed, TOTAL as u64);
    assert_eq!(m.bytes_pulled, TOTAL as u64);
    assert_eq!(m.available, 0);
}
