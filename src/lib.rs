// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Bootloader interrupt and byte-stream core
//!
//! This crate holds the pieces of the boot firmware that run under interrupt
//! context:
//!
//! - [`kernel::lib::ringbuf`] - shared-memory SPSC byte ring used by the
//!   console transport in [`kernel::lib::console`]
//! - [`kernel::dev::interrupt::gicv2`] - ARM GICv2 distributor and CPU
//!   interface driver
//! - [`kernel::interrupt`] - IRQ dispatch table entered from the exception
//!   vector
//!
//! Board code supplies the hardware through the [`reg::RegisterBank`] and
//! [`platform::Platform`] traits and owns every object it constructs; there is
//! no global controller state.

#![cfg_attr(not(test), no_std)]

#[cfg(all(target_os = "none", not(test)))]
use panic_halt as _;

#[macro_use]
pub mod debug;

pub mod err;
pub mod kernel;
pub mod platform;
pub mod reg;

#[cfg(test)]
pub(crate) mod testing;

pub use err::{Error, Result};
pub use kernel::dev::interrupt::gicv2::{GicError, GicV2};
pub use kernel::interrupt::{IrqHandler, Interrupts};
pub use kernel::lib::ringbuf::{Consumer, Producer, RingBuffer};
pub use platform::Platform;
pub use reg::{Mmio, RegisterBank};
