//! Bounded lock-free SPSC ring buffer.
//!
//! # Overview
//! - Single producer, single consumer, fixed capacity chosen at construction.
//! - Producer never overwrites: a push into a full ring is rejected and hands the value back.
//! - Consumer never waits: a pop from an empty ring returns immediately.
//! - Capacity is rounded up to a power of two so cursors wrap with a mask.
//! - One slot is always left free to tell "full" from "empty", so at most
//!   `capacity() - 1` values are held at once.
//!
//! # Memory ordering
//! `head` counts values ever pushed and is written only by the producer; `tail` counts values
//! ever popped and is written only by the consumer. Each side reads its own cursor `Relaxed`
//! and the other side's cursor `Acquire`, then publishes its own cursor `Release` after
//! touching the slot. The consumer therefore never sees a slot before its payload is written,
//! and the producer never reuses a slot before its payload has been moved out.
//!
//! # Notes
//! - Cursors grow without bound and wrap at `usize::MAX`; the power-of-two mask keeps
//!   indexing consistent across the wrap.
//! - Slots are `MaybeUninit`: each value is written once by `push` and read once by `pop`.
//!   Values left in the ring are dropped with it.

use alloc::boxed::Box;
use core::alloc::Layout;
use core::cell::{Cell, UnsafeCell};
use core::fmt;
use core::marker::PhantomData;
use core::mem::MaybeUninit;

use crossbeam_utils::CachePadded;

use crate::defs::{MAX_CAPACITY, next_power_of_two};
use crate::error::{Error, Result};
use crate::sync::{AtomicBool, AtomicUsize, Ordering};
use crate::trace::{debug, trace, warn};

fn uninit_slots<T>(capacity: usize) -> Box<[UnsafeCell<MaybeUninit<T>>]> {
    (0..capacity)
        .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
        .collect()
}

/// Bounded SPSC queue shared by one [`Producer`] and one [`Consumer`].
///
/// The ring is not `Clone`. Handles borrow it, so it cannot move or be dropped
/// while either role is in use; share it across threads by reference
/// (for example with [`std::thread::scope`]).
///
/// [`std::thread::scope`]: https://doc.rust-lang.org/std/thread/fn.scope.html
pub struct RingBuffer<T> {
    head: CachePadded<AtomicUsize>,
    tail: CachePadded<AtomicUsize>,
    mask: usize,
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
    producer_active: AtomicBool,
    consumer_active: AtomicBool,
}

// SAFETY: every slot in `[tail, head)` is touched only by the consumer and every other slot
// only by the producer; the cursor Release/Acquire pairs hand slots between them. Values
// cross threads, hence `T: Send`.
unsafe impl<T: Send> Sync for RingBuffer<T> {}

impl<T> RingBuffer<T> {
    /// Create a ring holding at least `requested - 1` values.
    ///
    /// The slot count is `requested` rounded up to a power of two.
    /// A ring of capacity 1 is valid but can never accept a value.
    ///
    /// # Errors
    /// - [`Error::InvalidCapacity`] if `requested == 0`.
    /// - [`Error::CapacityOverflow`] if no power of two `>= requested` fits in `usize`, or the
    ///   rounded storage would exceed `isize::MAX` bytes.
    ///
    /// Allocation failure is handled by `handle_alloc_error`, as for `Vec`.
    pub fn new(requested: usize) -> Result<Self> {
        if requested == 0 {
            warn!("rejected ring with zero capacity");
            return Err(Error::InvalidCapacity);
        }
        if requested > MAX_CAPACITY {
            warn!(requested, "rejected ring capacity beyond usize range");
            return Err(Error::CapacityOverflow { requested });
        }

        let capacity = next_power_of_two(requested);
        if Layout::array::<UnsafeCell<MaybeUninit<T>>>(capacity).is_err() {
            warn!(requested, capacity, "rejected ring larger than isize::MAX bytes");
            return Err(Error::CapacityOverflow { requested });
        }
        debug!(requested, capacity, "allocated ring");

        Ok(Self {
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            mask: capacity - 1,
            slots: uninit_slots(capacity),
            producer_active: AtomicBool::new(false),
            consumer_active: AtomicBool::new(false),
        })
    }

    /// Raw slot count: the rounded power of two, including the slot kept free.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Most values the ring can hold at once (`capacity() - 1`).
    #[inline]
    pub fn usable_capacity(&self) -> usize {
        self.mask
    }

    /// Occupied slot count, for diagnostics only.
    ///
    /// The two cursors are sampled independently, so under concurrent use the result may
    /// not match the ring at any single instant. It is clamped to `0..=usable_capacity()`.
    /// Never use it to decide whether a push or pop will succeed.
    pub fn size_approx(&self) -> usize {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Relaxed);
        let occupied = head.wrapping_sub(tail);
        // A stale head read behind a fresh tail shows up as a wrapped difference.
        if occupied > usize::MAX / 2 {
            0
        } else {
            occupied.min(self.mask)
        }
    }

    /// Create the producer handle.
    ///
    /// # Panics
    /// If another producer handle for this ring is alive.
    pub fn producer(&self) -> Producer<'_, T> {
        self.try_producer().unwrap_or_else(|e| panic!("{e}"))
    }

    /// Create the producer handle, or fail if one is already alive.
    ///
    /// # Errors
    /// [`Error::ProducerActive`] while another producer handle exists.
    pub fn try_producer(&self) -> Result<Producer<'_, T>> {
        if self
            .producer_active
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(Error::ProducerActive);
        }
        trace!("producer claimed");
        Ok(Producer {
            ring: self,
            _not_sync: PhantomData,
        })
    }

    /// Create the consumer handle.
    ///
    /// # Panics
    /// If another consumer handle for this ring is alive.
    pub fn consumer(&self) -> Consumer<'_, T> {
        self.try_consumer().unwrap_or_else(|e| panic!("{e}"))
    }

    /// Create the consumer handle, or fail if one is already alive.
    ///
    /// # Errors
    /// [`Error::ConsumerActive`] while another consumer handle exists.
    pub fn try_consumer(&self) -> Result<Consumer<'_, T>> {
        if self
            .consumer_active
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(Error::ConsumerActive);
        }
        trace!("consumer claimed");
        Ok(Consumer {
            ring: self,
            _not_sync: PhantomData,
        })
    }

    #[inline(always)]
    fn slot(&self, pos: usize) -> *mut MaybeUninit<T> {
        self.slots[pos & self.mask].get()
    }

    /// Producer side: the current head if a slot is free.
    #[inline]
    fn free_slot(&self) -> Option<usize> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if head.wrapping_sub(tail) == self.mask {
            None
        } else {
            Some(head)
        }
    }

    /// Producer side: write `value` at `head` and publish it.
    #[inline]
    fn publish(&self, head: usize, value: T) {
        // SAFETY: `free_slot` saw `head - tail < mask`, so the slot at `head` was released by
        // the consumer (Acquire on tail) and is invisible to it until the store below.
        unsafe { (*self.slot(head)).write(value) };
        self.head.store(head.wrapping_add(1), Ordering::Release);
    }

    #[inline]
    fn push_inner(&self, value: T) -> core::result::Result<(), T> {
        match self.free_slot() {
            Some(head) => {
                self.publish(head, value);
                Ok(())
            }
            None => Err(value),
        }
    }

    #[inline]
    fn pop_inner(&self) -> Option<T> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        if head == tail {
            return None;
        }

        // SAFETY: `tail != head`, so the slot at `tail` holds a value published by the producer
        // (Acquire on head). The producer will not reuse it until the store below.
        let value = unsafe { (*self.slot(tail)).assume_init_read() };
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        Some(value)
    }

    #[cfg(test)]
    fn with_cursors_at(requested: usize, start: usize) -> Self {
        let ring = Self::new(requested).unwrap();
        ring.head.store(start, Ordering::Relaxed);
        ring.tail.store(start, Ordering::Relaxed);
        ring
    }
}

impl<T> Drop for RingBuffer<T> {
    fn drop(&mut self) {
        let head = *self.head.get_mut();
        let mut tail = *self.tail.get_mut();
        debug!(
            capacity = self.mask + 1,
            remaining = head.wrapping_sub(tail),
            "dropping ring"
        );

        if !core::mem::needs_drop::<T>() {
            return;
        }
        while tail != head {
            let idx = tail & self.mask;
            // SAFETY: slots in `[tail, head)` hold live values and no handle can exist here.
            unsafe { self.slots[idx].get_mut().assume_init_drop() };
            tail = tail.wrapping_add(1);
        }
    }
}

impl<T> fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("size_approx", &self.size_approx())
            .finish()
    }
}

/// Writing half of a [`RingBuffer`]. Only one may be alive per ring.
///
/// `Send` but not `Sync`: move it to the producing thread, do not share it.
///
/// Pushing needs `&mut self`, so the slot reserved by a push stays exclusive until it is
/// published, even while `T::clone` runs inside [`push_cloned`](Producer::push_cloned).
/// A shared reference cannot push:
///
/// ```compile_fail
/// use ph_ringbuf::RingBuffer;
///
/// let ring = RingBuffer::<u32>::new(4).unwrap();
/// let producer = ring.producer();
/// let shared = &producer;
/// shared.push(1).unwrap();
/// ```
pub struct Producer<'a, T> {
    ring: &'a RingBuffer<T>,
    _not_sync: PhantomData<Cell<()>>,
}

impl<T> Producer<'_, T> {
    /// Push `value`, or hand it back in `Err` if the ring is full.
    ///
    /// Never blocks or retries; callers wanting back-pressure poll this result.
    #[inline]
    pub fn push(&mut self, value: T) -> core::result::Result<(), T> {
        self.ring.push_inner(value)
    }

    /// Push a clone of `value`. Returns `false` if the ring is full.
    ///
    /// `value` is only cloned once a free slot is known to exist.
    #[inline]
    pub fn push_cloned(&mut self, value: &T) -> bool
    where
        T: Clone,
    {
        match self.ring.free_slot() {
            Some(head) => {
                self.ring.publish(head, value.clone());
                true
            }
            None => false,
        }
    }

    /// See [`RingBuffer::capacity`].
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// See [`RingBuffer::size_approx`].
    #[inline]
    pub fn size_approx(&self) -> usize {
        self.ring.size_approx()
    }
}

impl<T> Drop for Producer<'_, T> {
    fn drop(&mut self) {
        self.ring.producer_active.store(false, Ordering::Release);
        trace!("producer released");
    }
}

impl<T> fmt::Debug for Producer<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer").field("ring", self.ring).finish()
    }
}

/// Reading half of a [`RingBuffer`]. Only one may be alive per ring.
///
/// `Send` but not `Sync`: move it to the consuming thread, do not share it.
pub struct Consumer<'a, T> {
    ring: &'a RingBuffer<T>,
    _not_sync: PhantomData<Cell<()>>,
}

impl<T> Consumer<'_, T> {
    /// Pop the oldest value, or `None` if the ring is empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.ring.pop_inner()
    }

    /// Pop the oldest value into `out`.
    /// Returns `false` and leaves `out` untouched if the ring is empty.
    #[inline]
    pub fn pop_into(&mut self, out: &mut T) -> bool {
        match self.ring.pop_inner() {
            Some(value) => {
                *out = value;
                true
            }
            None => false,
        }
    }

    /// See [`RingBuffer::capacity`].
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// See [`RingBuffer::size_approx`].
    #[inline]
    pub fn size_approx(&self) -> usize {
        self.ring.size_approx()
    }
}

impl<T> Drop for Consumer<'_, T> {
    fn drop(&mut self) {
        self.ring.consumer_active.store(false, Ordering::Release);
        trace!("consumer released");
    }
}

impl<T> fmt::Debug for Consumer<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer").field("ring", self.ring).finish()
    }
}
