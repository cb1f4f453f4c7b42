//! Bounded lock-free ring buffer for exactly two threads.
//!
//! # Highlights
//! - Lock-free SPSC queue for low-latency handoff (audio, network, telemetry).
//! - One allocation at construction, none on the push/pop path.
//! - Cursors padded to separate cache lines to avoid false sharing.
//!
//! # Quick start
//! ```
//! use ph_ringbuf::RingBuffer;
//!
//! let ring = RingBuffer::<u32>::new(64)?;
//! std::thread::scope(|s| {
//!     let mut producer = ring.producer();
//!     let mut consumer = ring.consumer();
//!
//!     s.spawn(move || {
//!         for v in 0..1000 {
//!             let mut item = v;
//!             while let Err(back) = producer.push(item) {
//!                 item = back;
//!                 std::hint::spin_loop();
//!             }
//!         }
//!     });
//!     s.spawn(move || {
//!         let mut expected = 0;
//!         while expected < 1000 {
//!             if let Some(v) = consumer.pop() {
//!                 assert_eq!(v, expected);
//!                 expected += 1;
//!             }
//!         }
//!     });
//! });
//! # Ok::<(), ph_ringbuf::Error>(())
//! ```
//!
//! # No-std
//! The crate is `#![no_std]` and needs `alloc` for the backing storage. Tests require `std`.
//!
//! # Safety and concurrency
//! This crate is SPSC by design: exactly one producer and one consumer may be active.
//! `producer()`/`consumer()` will panic if called while another handle of the same kind is
//! active; `try_producer()`/`try_consumer()` report it as an error instead.
//! Handles are `Send` but not `Sync`, so each role runs on one thread at a time.
//!
//! # Semantics
//! - `capacity()` is the raw power-of-two slot count; one slot is always kept free, so the ring
//!   holds at most `usable_capacity() == capacity() - 1` values.
//! - `push` hands the value back in `Err` when the ring is full; `pop` returns `None` when empty.
//!   Neither blocks nor retries; back-pressure policy belongs to the caller.
//! - `size_approx` is a diagnostic estimate and never a substitute for checking push/pop results.
//!
//! # Features
//! - `portable-atomic`: use `portable-atomic` types for targets without native atomics.
//! - `tracing`: emit `tracing` events on construction, handle claims and drop.
#![no_std]

extern crate alloc;

pub mod defs;
pub mod error;
pub mod ring_buffer;
mod sync;
mod trace;

pub use defs::{CACHE_LINE_SIZE, MAX_CAPACITY, next_power_of_two};
pub use error::{Error, Result};
pub use ring_buffer::{Consumer, Producer, RingBuffer};

#[cfg(test)]
extern crate std;
