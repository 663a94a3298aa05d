// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Exception Frames
//!
//! Register state saved by the IRQ vector before it calls into
//! [`Interrupts::dispatch`](crate::kernel::interrupt::Interrupts::dispatch).

/// Saved register frame, laid out the way the vector code stores it
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct IrqFrame {
    pub r: [u64; 30],
    pub lr: u64,
    pub sp: u64,
    pub elr: u64,
    pub spsr: u64,
}

const _: () = assert!(core::mem::size_of::<IrqFrame>() == 34 * 8);

impl IrqFrame {
    /// Log the full frame at error level
    pub fn dump(&self) {
        log_error!("iframe {:p}:", self);
        for (i, regs) in self.r.chunks(4).enumerate() {
            match regs {
                [a, b, c, d] => log_error!(
                    "x{:<2} {:#18x} x{:<2} {:#18x} x{:<2} {:#18x} x{:<2} {:#18x}",
                    i * 4, a, i * 4 + 1, b, i * 4 + 2, c, i * 4 + 3, d
                ),
                [a, b] => log_error!("x{:<2} {:#18x} x{:<2} {:#18x}", i * 4, a, i * 4 + 1, b),
                _ => {}
            }
        }
        log_error!("lr   {:#18x} sp   {:#18x}", self.lr, self.sp);
        log_error!("elr  {:#18x}", self.elr);
        log_error!("spsr {:#18x}", self.spsr);
    }
}
