// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! ARM64 IRQ masking through the DAIF register

use crate::platform::Platform;

/// DAIF.I, the IRQ mask bit
const DAIF_IRQ_BIT: u64 = 1 << 7;

/// Check if IRQ interrupts are disabled
#[inline]
pub fn arch_ints_disabled() -> bool {
    let daif: u64;
    // SAFETY: reading DAIF has no side effects.
    unsafe {
        core::arch::asm!("mrs {}, daif", out(reg) daif, options(nomem, nostack, preserves_flags));
    }
    (daif & DAIF_IRQ_BIT) != 0
}

/// Disable IRQ interrupts
#[inline]
pub fn arch_disable_ints() {
    // SAFETY: masking IRQs at the executing core is always sound.
    unsafe {
        core::arch::asm!("msr daifset, #2", options(nostack, preserves_flags));
    }
}

/// Enable IRQ interrupts
#[inline]
pub fn arch_enable_ints() {
    // SAFETY: the caller has a vector table installed before unmasking.
    unsafe {
        core::arch::asm!("msr daifclr, #2", options(nostack, preserves_flags));
    }
}

/// [`Platform`] backed by the executing AArch64 core
#[derive(Debug, Default, Clone, Copy)]
pub struct Arm64;

impl Platform for Arm64 {
    fn enable_ints(&self) {
        arch_enable_ints();
    }

    fn disable_ints(&self) {
        arch_disable_ints();
    }

    fn ints_disabled(&self) -> bool {
        arch_ints_disabled()
    }

    fn halt(&self) -> ! {
        arch_disable_ints();
        loop {
            aarch64_cpu::asm::wfe();
        }
    }
}
