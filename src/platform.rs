// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Platform Hooks
//!
//! The CPU-level services the interrupt core needs from the board: masking
//! IRQs at the core and stopping the machine on an unrecoverable fault.

/// CPU interrupt masking and the fatal stop path
pub trait Platform {
    /// Unmask IRQs at the executing core
    fn enable_ints(&self);

    /// Mask IRQs at the executing core
    fn disable_ints(&self);

    /// Whether IRQs are currently masked
    fn ints_disabled(&self) -> bool;

    /// Stop the machine; called after the fatal diagnostics were logged
    fn halt(&self) -> !;
}

impl<P: Platform + ?Sized> Platform for &P {
    fn enable_ints(&self) {
        (**self).enable_ints()
    }

    fn disable_ints(&self) {
        (**self).disable_ints()
    }

    fn ints_disabled(&self) -> bool {
        (**self).ints_disabled()
    }

    fn halt(&self) -> ! {
        (**self).halt()
    }
}

/// IRQ-masked critical section
///
/// Masks on creation and unconditionally unmasks on drop. This is a set and
/// clear of the CPU flag, not a save/restore, so guards must not nest.
pub struct IrqGuard<'a, P: Platform + ?Sized> {
    platform: &'a P,
}

impl<'a, P: Platform + ?Sized> IrqGuard<'a, P> {
    /// Mask IRQs until the guard is dropped
    pub fn new(platform: &'a P) -> Self {
        platform.disable_ints();
        Self { platform }
    }
}

impl<P: Platform + ?Sized> Drop for IrqGuard<'_, P> {
    fn drop(&mut self) {
        self.platform.enable_ints();
    }
}
