//! Demonstration of the ingest/playback pipeline over an emulated SRAM.
//!
//! Run with: `RUST_LOG=info cargo run -p sram-ring-pump --bin demo`

use anyhow::{ensure, Context, Result};
use sram_ring::{Config, RingBuffer, SRAM_23LC1024_CONFIG, SMALL_CONFIG};
use sram_ring_pump::{
    spawn_pipeline, CollectingDecoder, Ingest, Playback, PumpConfig, ShutdownSignal, StatsSampler,
};
use std::io::Cursor;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_thread_names(true)
        .init();

    println!("=== sram-ring-pump Demo ===\n");

    demo_clip_playback()?;
    demo_backpressure()?;
    demo_looped_stream()?;

    println!("\n=== All demos completed successfully! ===");
    Ok(())
}

/// A synthetic clip with a recognisable pattern.
fn clip(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + i / 251) as u8).collect()
}

/// Demo 1: Stream a clip through a full-size SRAM while sampling statistics.
fn demo_clip_playback() -> Result<()> {
    println!("--- Demo 1: Clip Playback ---");

    let ring = Arc::new(RingBuffer::open(&SRAM_23LC1024_CONFIG).context("opening SRAM")?);
    let data = clip(1024 * 1024);

    let pipeline = spawn_pipeline(
        Arc::clone(&ring),
        Cursor::new(data.clone()),
        CollectingDecoder::new(32),
        PumpConfig::default(),
    )?;

    let mut sampler = StatsSampler::new();
    while !pipeline.is_finished() {
        thread::sleep(Duration::from_millis(100));
        sampler.sample(&ring);
    }

    let report = pipeline.join()?;
    ensure!(report.decoder.bytes() == &data[..], "decoded bytes differ from clip");
    println!(
        "  {} bytes in {} pushes, {} decoder chunks",
        report.pushed,
        report.metrics.push_operations,
        report.decoder.chunks()
    );
    println!("  ✓ Clip playback complete\n");
    Ok(())
}

/// Demo 2: The producer stalls on a full buffer until the consumer catches up.
fn demo_backpressure() -> Result<()> {
    println!("--- Demo 2: Backpressure ---");

    let ring = Arc::new(RingBuffer::open(&SMALL_CONFIG)?);
    let data = clip(64 * 1024);

    let ingest = Ingest::new(Arc::clone(&ring), PumpConfig::default(), ShutdownSignal::new());
    let ingest_finished = ingest.finished();
    let producer = thread::Builder::new()
        .name("ingest".into())
        .spawn(move || ingest.run(Cursor::new(data)))?;

    thread::sleep(Duration::from_millis(20));
    println!("  Buffer full before playback starts: {}", ring.is_full());

    let playback = Playback::new(Arc::clone(&ring), PumpConfig::low_latency(), ingest_finished);
    let consumer = thread::Builder::new().name("playback".into()).spawn(move || {
        let mut decoder = CollectingDecoder::new(32);
        playback.run(&mut decoder).map(|_| decoder)
    })?;

    let pushed = producer.join().map_err(|_| anyhow::anyhow!("ingest panicked"))??;
    let decoder = consumer.join().map_err(|_| anyhow::anyhow!("playback panicked"))??;

    ensure!(decoder.bytes().len() as u64 == pushed, "lost bytes under backpressure");
    println!("  {pushed} bytes through a {}-byte buffer", ring.capacity());
    println!("  ✓ Backpressure complete\n");
    Ok(())
}

/// Demo 3: Loop a short clip until stopped, as a radio stream would.
fn demo_looped_stream() -> Result<()> {
    println!("--- Demo 3: Looped Stream ---");

    let config = Config::default().with_capacity_bits(12);
    let ring = Arc::new(RingBuffer::open(&config)?);
    let data = clip(1500);
    let shutdown = ShutdownSignal::new();

    let ingest = Ingest::new(Arc::clone(&ring), PumpConfig::default(), shutdown.clone());
    let playback = Playback::new(Arc::clone(&ring), PumpConfig::default(), ingest.finished());
    let looped = data.clone();
    let producer = thread::spawn(move || ingest.run_repeat(&looped));

    let consumer = thread::spawn(move || {
        let mut decoder = CollectingDecoder::new(32);
        playback.run(&mut decoder).map(|_| decoder)
    });

    thread::sleep(Duration::from_millis(200));
    shutdown.shutdown();
    let pushed = producer.join().map_err(|_| anyhow::anyhow!("ingest panicked"))??;
    let decoder = consumer.join().map_err(|_| anyhow::anyhow!("playback panicked"))??;

    let in_order = decoder
        .bytes()
        .iter()
        .enumerate()
        .all(|(i, b)| *b == data[i % data.len()]);
    ensure!(in_order, "looped stream out of order");
    println!(
        "  {pushed} bytes ({} passes over the clip)",
        pushed / data.len() as u64
    );
    println!("  ✓ Looped stream complete\n");
    Ok(())
}
