// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Shared-Memory Ring Buffer
//!
//! A lock-free single-producer/single-consumer byte ring that lives inside a
//! caller-supplied memory region. The region starts with a fixed 32-byte
//! header followed by the data area:
//!
//! | Offset | Field        | Description                               |
//! |--------|--------------|-------------------------------------------|
//! | 0x00   | magic        | [`RING_BUFFER_MAGIC`] once initialized    |
//! | 0x04   | read_cursor  | Consumer offset into the data area        |
//! | 0x08   | write_cursor | Producer offset into the data area        |
//! | 0x0C   | flags        | Zero                                      |
//! | 0x10   | buffer_end   | Last valid data offset (== capacity)      |
//! | 0x14   | reserved     | Three zero words                          |
//!
//! The region may outlive a reset (or be read by a debugger), so attaching
//! to a region that already carries the magic keeps its contents instead of
//! clearing them.
//!
//! One data slot always stays unused: the ring is empty when both cursors
//! are equal and full when advancing the write cursor would make them equal.
//!
//! The producer owns `write_cursor` and the consumer owns `read_cursor`.
//! Each side publishes its own cursor with `Release` after copying data and
//! observes the other side's cursor with `Acquire`.

use core::marker::PhantomData;
use core::mem::{align_of, size_of};
use core::ptr::{self, addr_of, addr_of_mut, NonNull};
use core::sync::atomic::{AtomicU32, Ordering};

use crate::err::{Error, Result};

/// Tag stamped in the first header word ("RBUF" in memory order)
pub const RING_BUFFER_MAGIC: u32 = 0x4655_4252;

/// Smallest data area accepted by [`RingBuffer::attach`]
pub const RING_BUFFER_MIN_PAYLOAD: usize = 512;

/// Size of the in-memory header
pub const RING_BUFFER_HEADER_SIZE: usize = size_of::<RingBufferHeader>();

/// Ring buffer header as laid out at the start of the region
#[repr(C)]
#[derive(Debug)]
pub struct RingBufferHeader {
    magic: u32,
    read_cursor: AtomicU32,
    write_cursor: AtomicU32,
    flags: u32,
    buffer_end: u32,
    reserved: [u32; 3],
}

const _: () = assert!(RING_BUFFER_HEADER_SIZE == 32);

/// Cursor arithmetic and copies shared by every handle type
#[derive(Clone, Copy)]
struct RawRing {
    header: NonNull<RingBufferHeader>,
    data: NonNull<u8>,
    end: u32,
}

impl RawRing {
    #[inline]
    fn header(&self) -> &RingBufferHeader {
        // SAFETY: the header was validated at attach time and only the two
        // atomic cursors change afterwards.
        unsafe { self.header.as_ref() }
    }

    /// Number of data slots (capacity plus the reserved one)
    #[inline]
    fn slots(&self) -> u32 {
        self.end + 1
    }

    #[inline]
    fn used(&self, read: u32, write: u32) -> u32 {
        if write >= read {
            write - read
        } else {
            self.slots() - read + write
        }
    }

    fn len(&self) -> usize {
        let header = self.header();
        let read = header.read_cursor.load(Ordering::Acquire);
        let write = header.write_cursor.load(Ordering::Acquire);
        self.used(read, write) as usize
    }

    fn free_space(&self) -> usize {
        self.end as usize - self.len()
    }

    fn not_empty(&self) -> bool {
        let header = self.header();
        header.read_cursor.load(Ordering::Acquire) != header.write_cursor.load(Ordering::Acquire)
    }

    /// # Safety
    ///
    /// The caller must be the only producer of this ring.
    unsafe fn try_push(&self, buf: &[u8]) -> Result<usize> {
        let size = buf.len();
        assert!(
            size < self.end as usize,
            "ring buffer: push of {} bytes does not fit capacity {}",
            size,
            self.end
        );
        if size == 0 {
            return Ok(0);
        }

        let header = self.header();
        let write = header.write_cursor.load(Ordering::Relaxed);
        let read = header.read_cursor.load(Ordering::Acquire);
        if size > (self.end - self.used(read, write)) as usize {
            return Err(Error::WouldBlock);
        }

        let remaining = (self.end - write + 1) as usize;
        let base = self.data.as_ptr();
        let next = if size > remaining {
            let rollback = size - remaining;
            ptr::copy_nonoverlapping(buf.as_ptr(), base.add(write as usize), remaining);
            ptr::copy_nonoverlapping(buf.as_ptr().add(remaining), base, rollback);
            rollback as u32
        } else {
            ptr::copy_nonoverlapping(buf.as_ptr(), base.add(write as usize), size);
            (write + size as u32) % self.slots()
        };

        header.write_cursor.store(next, Ordering::Release);
        Ok(size)
    }

    /// # Safety
    ///
    /// The caller must be the only producer of this ring.
    unsafe fn push_spin(&self, buf: &[u8], mut spins: Option<u32>) -> Result<usize> {
        loop {
            match self.try_push(buf) {
                Err(Error::WouldBlock) => {}
                other => return other,
            }
            if let Some(left) = spins.as_mut() {
                if *left == 0 {
                    return Err(Error::TimedOut);
                }
                *left -= 1;
            }
            core::hint::spin_loop();
        }
    }

    /// # Safety
    ///
    /// The caller must be the only consumer of this ring.
    unsafe fn pop(&self, buf: &mut [u8]) -> usize {
        let header = self.header();
        let read = header.read_cursor.load(Ordering::Relaxed);
        let write = header.write_cursor.load(Ordering::Acquire);
        let max_size = buf.len();
        if read == write || max_size == 0 {
            return 0;
        }

        let base = self.data.as_ptr();
        let (count, next) = if read < write {
            let count = max_size.min((write - read) as usize);
            ptr::copy_nonoverlapping(base.add(read as usize), buf.as_mut_ptr(), count);
            (count, read + count as u32)
        } else {
            let remaining = (self.end - read + 1) as usize;
            if max_size < remaining {
                // Stay on the tail; the head is left for the next call.
                ptr::copy_nonoverlapping(base.add(read as usize), buf.as_mut_ptr(), max_size);
                (max_size, read + max_size as u32)
            } else {
                let data_size = max_size.min(remaining + write as usize);
                let rollback = data_size - remaining;
                ptr::copy_nonoverlapping(base.add(read as usize), buf.as_mut_ptr(), remaining);
                ptr::copy_nonoverlapping(base, buf.as_mut_ptr().add(remaining), rollback);
                (data_size, rollback as u32)
            }
        };

        header.read_cursor.store(next, Ordering::Release);
        count
    }
}

/// Handle to a ring buffer attached to a memory region
///
/// The handle drives both ends of the ring. Use [`RingBuffer::split`] to
/// hand the ends to two execution contexts.
pub struct RingBuffer<'a> {
    raw: RawRing,
    _region: PhantomData<&'a mut [u8]>,
}

// SAFETY: the handle is the unique owner of the region for `'a`.
unsafe impl Send for RingBuffer<'_> {}

impl<'a> RingBuffer<'a> {
    /// Attach to the region `[base, base + size)`
    ///
    /// A region without the magic tag is cleared and initialized. A region
    /// with the tag is reattached as-is when its stored size matches `size`.
    /// Returns `None` for a null or misaligned base, a region too small to
    /// hold the header plus [`RING_BUFFER_MIN_PAYLOAD`] bytes, a size
    /// mismatch against an initialized header, or cursors outside the data
    /// area.
    ///
    /// # Safety
    ///
    /// The region must be valid for reads and writes of `size` bytes for
    /// `'a` and must not be accessed through any other handle meanwhile,
    /// except by external observers that only read it.
    pub unsafe fn attach(base: *mut u8, size: usize) -> Option<Self> {
        if base.is_null() || (base as usize) % align_of::<RingBufferHeader>() != 0 {
            log_error!("ring buffer: bad region base {:p}", base);
            return None;
        }
        if size <= RING_BUFFER_HEADER_SIZE + RING_BUFFER_MIN_PAYLOAD {
            log_error!("ring buffer: region of {} bytes is too small", size);
            return None;
        }
        let end = u32::try_from(size - 1 - RING_BUFFER_HEADER_SIZE).ok()?;

        let header = base as *mut RingBufferHeader;
        if ptr::read_volatile(addr_of!((*header).magic)) != RING_BUFFER_MAGIC {
            ptr::write_bytes(base, 0, size);
            ptr::write_volatile(addr_of_mut!((*header).buffer_end), end);
            ptr::write_volatile(addr_of_mut!((*header).magic), RING_BUFFER_MAGIC);
            log_debug!("ring buffer: initialized {:p}, capacity {}", base, end);
        } else {
            let stored = ptr::read_volatile(addr_of!((*header).buffer_end));
            if stored != end {
                log_error!(
                    "ring buffer: {:p} was initialized with capacity {}, not {}",
                    base,
                    stored,
                    end
                );
                return None;
            }
            let read = (*header).read_cursor.load(Ordering::Acquire);
            let write = (*header).write_cursor.load(Ordering::Acquire);
            if read > end || write > end {
                log_error!("ring buffer: corrupt cursors r={} w={} at {:p}", read, write, base);
                return None;
            }
            log_debug!("ring buffer: reattached {:p}, {} bytes pending", base, {
                if write >= read { write - read } else { end + 1 - read + write }
            });
        }

        Some(Self {
            raw: RawRing {
                header: NonNull::new_unchecked(header),
                data: NonNull::new_unchecked(base.add(RING_BUFFER_HEADER_SIZE)),
                end,
            },
            _region: PhantomData,
        })
    }

    /// Attach to a borrowed memory region
    ///
    /// Same rules as [`RingBuffer::attach`].
    pub fn attach_region(region: &'a mut [u8]) -> Option<Self> {
        // SAFETY: the exclusive borrow covers the whole region for `'a`.
        unsafe { Self::attach(region.as_mut_ptr(), region.len()) }
    }

    /// Usable bytes (one slot less than the data area)
    pub fn capacity(&self) -> usize {
        self.raw.end as usize
    }

    /// Bytes waiting to be popped
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Bytes that can be pushed without waiting
    pub fn free_space(&self) -> usize {
        self.raw.free_space()
    }

    /// Whether at least one byte is waiting
    pub fn not_empty(&self) -> bool {
        self.raw.not_empty()
    }

    /// Whether the ring holds no data
    pub fn is_empty(&self) -> bool {
        !self.raw.not_empty()
    }

    /// Push all of `buf`, spinning until it fits
    ///
    /// There is no timeout. Never call this from the interrupt handler that
    /// also drains the same ring.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is not smaller than [`capacity`](Self::capacity).
    pub fn push(&mut self, buf: &[u8]) -> usize {
        // SAFETY: `&mut self` makes this the only producer.
        match unsafe { self.raw.push_spin(buf, None) } {
            Ok(count) => count,
            Err(_) => unreachable!("unbounded push cannot time out"),
        }
    }

    /// Push all of `buf` or nothing, without waiting
    pub fn try_push(&mut self, buf: &[u8]) -> Result<usize> {
        // SAFETY: `&mut self` makes this the only producer.
        unsafe { self.raw.try_push(buf) }
    }

    /// Push all of `buf`, giving up with [`Error::TimedOut`] after `spins`
    /// failed attempts
    pub fn push_spin(&mut self, buf: &[u8], spins: u32) -> Result<usize> {
        // SAFETY: `&mut self` makes this the only producer.
        unsafe { self.raw.push_spin(buf, Some(spins)) }
    }

    /// Pop up to `buf.len()` bytes; returns 0 when empty
    ///
    /// A single call does not continue past the end of the data area into
    /// its start unless it consumes the whole tail first.
    pub fn pop(&mut self, buf: &mut [u8]) -> usize {
        // SAFETY: `&mut self` makes this the only consumer.
        unsafe { self.raw.pop(buf) }
    }

    /// Split into the producer and consumer ends
    pub fn split(&mut self) -> (Producer<'_>, Consumer<'_>) {
        (
            Producer { raw: self.raw, _ring: PhantomData },
            Consumer { raw: self.raw, _ring: PhantomData },
        )
    }
}

/// Producing end of a split ring
pub struct Producer<'r> {
    raw: RawRing,
    _ring: PhantomData<&'r mut ()>,
}

// SAFETY: only one producer exists per split and it only writes the free
// part of the data area and the write cursor.
unsafe impl Send for Producer<'_> {}

impl Producer<'_> {
    /// Usable bytes of the ring
    pub fn capacity(&self) -> usize {
        self.raw.end as usize
    }

    /// Bytes that can be pushed without waiting
    pub fn free_space(&self) -> usize {
        self.raw.free_space()
    }

    /// See [`RingBuffer::push`]
    pub fn push(&mut self, buf: &[u8]) -> usize {
        // SAFETY: `Producer` is not `Clone`, so this is the only producer.
        match unsafe { self.raw.push_spin(buf, None) } {
            Ok(count) => count,
            Err(_) => unreachable!("unbounded push cannot time out"),
        }
    }

    /// See [`RingBuffer::try_push`]
    pub fn try_push(&mut self, buf: &[u8]) -> Result<usize> {
        // SAFETY: `Producer` is not `Clone`, so this is the only producer.
        unsafe { self.raw.try_push(buf) }
    }

    /// See [`RingBuffer::push_spin`]
    pub fn push_spin(&mut self, buf: &[u8], spins: u32) -> Result<usize> {
        // SAFETY: `Producer` is not `Clone`, so this is the only producer.
        unsafe { self.raw.push_spin(buf, Some(spins)) }
    }
}

/// Consuming end of a split ring
pub struct Consumer<'r> {
    raw: RawRing,
    _ring: PhantomData<&'r mut ()>,
}

// SAFETY: only one consumer exists per split and it only reads the filled
// part of the data area and writes the read cursor.
unsafe impl Send for Consumer<'_> {}

impl Consumer<'_> {
    /// Bytes waiting to be popped
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Whether at least one byte is waiting
    pub fn not_empty(&self) -> bool {
        self.raw.not_empty()
    }

    /// See [`RingBuffer::pop`]
    pub fn pop(&mut self, buf: &mut [u8]) -> usize {
        // SAFETY: `Consumer` is not `Clone`, so this is the only consumer.
        unsafe { self.raw.pop(buf) }
    }
}
