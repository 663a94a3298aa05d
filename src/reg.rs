// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Register Access Module
//!
//! Drivers in this crate never dereference addresses themselves. They talk to
//! a [`RegisterBank`], which on hardware is an [`Mmio`] window and in host
//! tests is a simulated device.

/// A bank of 32-bit registers addressed by byte offset
pub trait RegisterBank {
    /// Read the 32-bit register at `offset`
    fn read32(&self, offset: usize) -> u32;

    /// Write the 32-bit register at `offset`
    fn write32(&self, offset: usize, value: u32);

    /// Read-modify-write helper
    #[inline]
    fn modify32(&self, offset: usize, f: impl FnOnce(u32) -> u32) {
        let value = self.read32(offset);
        self.write32(offset, f(value));
    }
}

impl<R: RegisterBank + ?Sized> RegisterBank for &R {
    #[inline]
    fn read32(&self, offset: usize) -> u32 {
        (**self).read32(offset)
    }

    #[inline]
    fn write32(&self, offset: usize, value: u32) {
        (**self).write32(offset, value)
    }
}

/// Memory-mapped register window
///
/// Accesses are volatile, 32 bits wide and in bus byte order.
#[derive(Debug)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Create a window over the registers at `base`
    ///
    /// # Safety
    ///
    /// `base` must be the mapped, 4-byte aligned address of a device register
    /// block, and the returned window must be the only writer of those
    /// registers for as long as it lives.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Base address of the window
    pub fn base(&self) -> usize {
        self.base
    }
}

impl RegisterBank for Mmio {
    #[inline]
    fn read32(&self, offset: usize) -> u32 {
        // SAFETY: `Mmio::new` requires `base` to map a live register block.
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u32) }
    }

    #[inline]
    fn write32(&self, offset: usize, value: u32) {
        // SAFETY: see `read32`.
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mmio_window_over_ram() {
        let mut regs = [0u32; 4];
        let mmio = unsafe { Mmio::new(regs.as_mut_ptr() as usize) };

        mmio.write32(0x4, 0xDEAD_BEEF);
        mmio.modify32(0x8, |v| v | 0x10);

        assert_eq!(mmio.read32(0x4), 0xDEAD_BEEF);
        assert_eq!(mmio.read32(0x8), 0x10);
        assert_eq!(mmio.read32(0x0), 0);
    }
}
