// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! IRQ Dispatch Table
//!
//! Maps interrupt line ids to a handler, its argument and an invocation
//! counter. The IRQ exception vector calls [`Interrupts::dispatch`], which
//! acknowledges the pending id at the controller, runs the handler installed
//! for it and signals end of interrupt.
//!
//! # Line states
//!
//! ```text
//! Unregistered --install--> Registered --free--> Unregistered
//! ```
//!
//! Only a registered line runs a handler. An interrupt arriving on an
//! unregistered line is still signalled as complete, otherwise the
//! controller would never raise that line again.

use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use spin::Mutex;

use crate::err::{Error, Result};
use crate::kernel::dev::interrupt::arm_gic::MAX_INT;
use crate::kernel::dev::interrupt::gicv2::{GicError, GicV2};
use crate::kernel::exception::IrqFrame;
use crate::platform::{IrqGuard, Platform};
use crate::reg::RegisterBank;

/// Interrupt handler function type
pub type IrqHandler = fn(arg: usize);

/// Default number of table entries (every id a GICv2 can report)
pub const NR_IRQS: usize = MAX_INT as usize;

#[derive(Clone, Copy)]
struct IrqAction {
    handler: Option<IrqHandler>,
    arg: usize,
    count: u32,
    /// Install that produced this entry; 0 when empty
    serial: u32,
}

impl IrqAction {
    const EMPTY: Self = Self { handler: None, arg: 0, count: 0, serial: 0 };
}

/// Dispatch totals since [`Interrupts::init`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IrqStats {
    /// Acknowledges that returned a spurious id
    pub spurious: u64,
    /// Interrupts that ran a handler
    pub dispatched: u64,
    /// Valid interrupts with no handler installed
    pub unhandled: u64,
}

/// Interrupt controller plus dispatch table
///
/// Built once by the boot code and passed to the IRQ vector by reference.
pub struct Interrupts<R: RegisterBank, P: Platform, const N: usize = NR_IRQS> {
    gic: GicV2<R>,
    platform: P,
    table: Mutex<[IrqAction; N]>,
    installs: AtomicU32,
    spurious: AtomicU64,
    dispatched: AtomicU64,
    unhandled: AtomicU64,
}

impl<R: RegisterBank, P: Platform, const N: usize> Interrupts<R, P, N> {
    /// Take ownership of an initialized controller with an empty table
    ///
    /// IRQs stay masked at the core until
    /// [`enable_interrupts`](Self::enable_interrupts).
    pub fn init(gic: GicV2<R>, platform: P) -> Self {
        log_debug!("irq: dispatch table with {} entries", N);
        Self {
            gic,
            platform,
            table: Mutex::new([IrqAction::EMPTY; N]),
            installs: AtomicU32::new(0),
            spurious: AtomicU64::new(0),
            dispatched: AtomicU64::new(0),
            unhandled: AtomicU64::new(0),
        }
    }

    /// The controller, for drivers that need direct line control
    pub fn gic(&self) -> &GicV2<R> {
        &self.gic
    }

    /// Unmask IRQs at the core
    pub fn enable_interrupts(&self) {
        self.platform.enable_ints();
    }

    /// Mask IRQs at the core
    pub fn disable_interrupts(&self) {
        self.platform.disable_ints();
    }

    fn check_line(&self, irq: u32) -> Result<usize> {
        let index = irq as usize;
        if index >= N || irq >= self.gic.line_count() {
            log_warn!("irq: line {} out of range", irq);
            return Err(Error::InvalidArgs);
        }
        Ok(index)
    }

    /// Install `handler` for `irq` and enable the line
    ///
    /// Replaces any previous handler and resets the line's counter. IRQs are
    /// unmasked at the core on return.
    pub fn install(&self, irq: u32, handler: IrqHandler, arg: usize) -> Result {
        let index = self.check_line(irq)?;

        let serial = match self.installs.fetch_add(1, Ordering::Relaxed).wrapping_add(1) {
            0 => 1,
            serial => serial,
        };

        let _guard = IrqGuard::new(&self.platform);
        self.table.lock()[index] = IrqAction { handler: Some(handler), arg, count: 0, serial };
        self.gic.enable_irq(irq);

        log_debug!("irq: installed handler for line {}", irq);
        Ok(())
    }

    /// Disable `irq` and remove its handler
    ///
    /// IRQs are unmasked at the core on return.
    pub fn free(&self, irq: u32) -> Result {
        let index = self.check_line(irq)?;

        let _guard = IrqGuard::new(&self.platform);
        self.gic.disable_irq(irq);
        self.table.lock()[index] = IrqAction::EMPTY;

        log_debug!("irq: freed line {}", irq);
        Ok(())
    }

    /// IRQ exception entry
    ///
    /// Spurious acknowledges are counted and ignored. A reserved or
    /// out-of-range id means the controller is in an unknown state: the
    /// frame is dumped and the platform halted.
    pub fn dispatch(&self, frame: &IrqFrame) {
        let id = match self.gic.get_pending_irq_id() {
            Ok(id) => id,
            Err(GicError::Spurious(_)) => {
                self.spurious.fetch_add(1, Ordering::Relaxed);
                return;
            }
            Err(e) => {
                log_error!("irq: controller returned {:?}, halting", e);
                frame.dump();
                self.platform.halt();
            }
        };

        let action = self.table.lock().get(id as usize).copied();
        match action.and_then(|a| a.handler.map(|handler| (handler, a.arg, a.serial))) {
            Some((handler, arg, serial)) => {
                handler(arg);
                // The handler may have replaced or freed its own line.
                if let Some(entry) = self.table.lock().get_mut(id as usize) {
                    if entry.handler.is_some() && entry.serial == serial {
                        entry.count = entry.count.wrapping_add(1);
                    }
                }
                self.dispatched.fetch_add(1, Ordering::Relaxed);
            }
            None => {
                log_warn!("irq: no handler for line {}", id);
                self.unhandled.fetch_add(1, Ordering::Relaxed);
            }
        }

        self.gic.acknowledge(id);
    }

    /// Times the handler installed on `irq` has run
    ///
    /// Takes the table lock with IRQs masked, so `dispatch` can never find
    /// it held. IRQs are unmasked at the core on return.
    pub fn count(&self, irq: u32) -> Option<u32> {
        let _guard = IrqGuard::new(&self.platform);
        self.table.lock().get(irq as usize).filter(|a| a.handler.is_some()).map(|a| a.count)
    }

    /// Whether a handler is installed on `irq`
    ///
    /// Same masking as [`count`](Self::count).
    pub fn is_registered(&self, irq: u32) -> bool {
        self.count(irq).is_some()
    }

    /// Dispatch totals
    pub fn stats(&self) -> IrqStats {
        IrqStats {
            spurious: self.spurious.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            unhandled: self.unhandled.load(Ordering::Relaxed),
        }
    }
}
