// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! ARM GICv2 (Generic Interrupt Controller version 2) Driver
//!
//! The boot firmware owns the controller from reset until it hands the
//! machine to the OS. [`GicV2::init`] puts every line into a known state
//! (disabled, not pending, not active, group 0, one priority, no target) and
//! turns both register banks on. Lines are then enabled one by one as
//! drivers install handlers.
//!
//! # Register Map
//!
//! ## Distributor (GICD) Registers
//! | Offset | Name          | Description                     |
//! |--------|---------------|---------------------------------|
//! | 0x000  | GICD_CTLR     | Distributor Control Register    |
//! | 0x004  | GICD_TYPER    | Distributor Type Register       |
//! | 0x080  | GICD_IGROUPR  | Interrupt Group Registers       |
//! | 0x100  | GICD_ISENABLER| Interrupt Set-Enable Registers  |
//! | 0x180  | GICD_ICENABLER| Interrupt Clear-Enable Registers|
//! | 0x200  | GICD_ISPENDR  | Interrupt Set-Pending Registers |
//! | 0x280  | GICD_ICPENDR  | Interrupt Clear-Pending Regs    |
//! | 0x380  | GICD_ICACTIVER| Interrupt Clear-Active Regs     |
//! | 0x400  | GICD_IPRIORITYR| Interrupt Priority Registers   |
//! | 0x800  | GICD_ITARGETSR| Interrupt Processor Targets     |
//! | 0xC00  | GICD_ICFGR    | Interrupt Configuration Registers|
//! | 0xF00  | GICD_SGIR     | Software Generated Interrupt Reg |
//!
//! ## CPU Interface (GICC) Registers
//! | Offset | Name    | Description                     |
//! |--------|---------|---------------------------------|
//! | 0x0000 | GICC_CTLR| CPU Interface Control Register |
//! | 0x0004 | GICC_PMR | Interrupt Priority Mask Register|
//! | 0x0008 | GICC_BPR | Binary Point Register           |
//! | 0x000C | GICC_IAR | Interrupt Acknowledge Register  |
//! | 0x0010 | GICC_EOIR| End of Interrupt Register      |
//! | 0x0014 | GICC_RPR | Running Priority Register       |

use bitflags::bitflags;

use super::arm_gic::*;
use crate::err::{self, Error};
use crate::reg::RegisterBank;

// ============================================================================
// Register Offsets
// ============================================================================

// Distributor registers
pub const GICD_CTLR: usize = 0x000;
pub const GICD_TYPER: usize = 0x004;
pub const GICD_IGROUPR: usize = 0x080;
pub const GICD_ISENABLER: usize = 0x100;
pub const GICD_ICENABLER: usize = 0x180;
pub const GICD_ISPENDR: usize = 0x200;
pub const GICD_ICPENDR: usize = 0x280;
pub const GICD_ISACTIVER: usize = 0x300;
pub const GICD_ICACTIVER: usize = 0x380;
pub const GICD_IPRIORITYR: usize = 0x400;
pub const GICD_ITARGETSR: usize = 0x800;
pub const GICD_ICFGR: usize = 0xC00;
pub const GICD_SGIR: usize = 0xF00;

// CPU interface registers
pub const GICC_CTLR: usize = 0x0000;
pub const GICC_PMR: usize = 0x0004;
pub const GICC_BPR: usize = 0x0008;
pub const GICC_IAR: usize = 0x000C;
pub const GICC_EOIR: usize = 0x0010;
pub const GICC_RPR: usize = 0x0014;

/// GICD_TYPER.ITLinesNumber
const GICD_TYPER_IT_LINES_MASK: u32 = 0x1F;

/// Interrupt id field of GICC_IAR / GICC_EOIR
const GICC_INT_ID_MASK: u32 = 0x3FF;

/// Priority given to every line at init
pub const GIC_DEFAULT_PRIORITY: u8 = 0xA0;

/// Priority mask: lines with a priority value below this are signalled
pub const GIC_PRIORITY_MASK: u32 = 0xF0;

/// ICFGR value for 16 level-sensitive, 1-of-N lines
const GICD_ICFGR_LEVEL_1_N: u32 = 0x5555_5555;

bitflags! {
    /// GICD_CTLR bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DistributorControl: u32 {
        const ENABLE_GRP0 = 1 << 0;
        const ENABLE_GRP1 = 1 << 1;
    }
}

bitflags! {
    /// GICC_CTLR bits (secure view)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CpuInterfaceControl: u32 {
        const ENABLE_GRP0 = 1 << 0;
        const ENABLE_GRP1 = 1 << 1;
    }
}

/// Outcome of an acknowledge that did not yield a dispatchable id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GicError {
    /// The controller returned an id from the reserved range
    Reserved(u32),
    /// Nothing was really pending; not a fault
    Spurious(u32),
    /// The id lies beyond the lines this controller implements
    OutOfRange(u32),
}

impl GicError {
    /// Convert to a status code
    pub fn to_status(self) -> err::Status {
        Error::from(self).to_status()
    }
}

impl From<GicError> for Error {
    fn from(e: GicError) -> Self {
        match e {
            GicError::Reserved(_) => Error::Internal,
            GicError::Spurious(_) => Error::WouldBlock,
            GicError::OutOfRange(_) => Error::OutOfRange,
        }
    }
}

#[inline]
fn bit_reg(base: usize, id: u32) -> (usize, u32) {
    (base + (id as usize / 32) * 4, 1 << (id % 32))
}

#[inline]
fn byte_reg(base: usize, id: u32) -> (usize, u32) {
    (base + (id as usize & !0x3), (id % 4) * 8)
}

/// Single-owner handle to a GICv2 distributor and CPU interface
pub struct GicV2<R: RegisterBank> {
    distributor: R,
    cpu_interface: R,
    line_count: u32,
    cpu_mask: u8,
}

impl<R: RegisterBank> GicV2<R> {
    /// Bring the controller into its boot configuration
    ///
    /// Must run once, before any line is enabled and before IRQs are
    /// unmasked at the core.
    pub fn init(distributor: R, cpu_interface: R) -> Self {
        let typer = distributor.read32(GICD_TYPER);
        let line_count = 32 * ((typer & GICD_TYPER_IT_LINES_MASK) + 1);

        distributor.write32(GICD_CTLR, 0);
        cpu_interface.write32(GICC_CTLR, 0);

        for id in (0..line_count).step_by(32) {
            let offset = (id as usize / 32) * 4;
            distributor.write32(GICD_ICENABLER + offset, u32::MAX);
            distributor.write32(GICD_ICPENDR + offset, u32::MAX);
            distributor.write32(GICD_ICACTIVER + offset, u32::MAX);
            distributor.write32(GICD_IGROUPR + offset, 0);
        }

        let priority = u32::from_ne_bytes([GIC_DEFAULT_PRIORITY; 4]);
        for id in (0..line_count).step_by(4) {
            distributor.write32(GICD_IPRIORITYR + id as usize, priority);
        }

        // Targets of SGIs and PPIs are read-only.
        for id in (GIC_BASE_SPI..line_count).step_by(4) {
            distributor.write32(GICD_ITARGETSR + id as usize, 0);
        }

        for id in (GIC_BASE_SPI..line_count).step_by(16) {
            distributor.write32(GICD_ICFGR + (id as usize / 16) * 4, GICD_ICFGR_LEVEL_1_N);
        }

        // The banked target registers report the reading core's own bit.
        let cpu_mask = match distributor.read32(GICD_ITARGETSR) as u8 {
            0 => 1,
            mask => mask,
        };

        cpu_interface.write32(GICC_PMR, GIC_PRIORITY_MASK);
        cpu_interface.write32(GICC_BPR, 0);

        distributor.write32(
            GICD_CTLR,
            (DistributorControl::ENABLE_GRP0 | DistributorControl::ENABLE_GRP1).bits(),
        );
        cpu_interface.write32(
            GICC_CTLR,
            (CpuInterfaceControl::ENABLE_GRP0 | CpuInterfaceControl::ENABLE_GRP1).bits(),
        );

        log_info!("GICv2: {} interrupt lines, cpu mask {:#x}", line_count, cpu_mask);

        Self { distributor, cpu_interface, line_count, cpu_mask }
    }

    /// Number of interrupt lines the distributor implements
    pub fn line_count(&self) -> u32 {
        self.line_count
    }

    /// Target bit of the core that ran [`GicV2::init`]
    pub fn cpu_target_mask(&self) -> u8 {
        self.cpu_mask
    }

    /// Enable line `id` and route it to this core
    ///
    /// `id` must be below [`line_count`](Self::line_count).
    pub fn enable_irq(&self, id: u32) {
        let (reg, bit) = bit_reg(GICD_ISENABLER, id);
        self.distributor.write32(reg, bit);

        if id >= GIC_BASE_SPI {
            let (reg, shift) = byte_reg(GICD_ITARGETSR, id);
            let mask = (self.cpu_mask as u32) << shift;
            self.distributor.modify32(reg, |v| v | mask);
        }
    }

    /// Disable line `id` and drop this core from its targets
    ///
    /// `id` must be below [`line_count`](Self::line_count).
    pub fn disable_irq(&self, id: u32) {
        let (reg, bit) = bit_reg(GICD_ICENABLER, id);
        self.distributor.write32(reg, bit);

        if id >= GIC_BASE_SPI {
            let (reg, shift) = byte_reg(GICD_ITARGETSR, id);
            let mask = (self.cpu_mask as u32) << shift;
            self.distributor.modify32(reg, |v| v & !mask);
        }
    }

    /// Acknowledge the highest priority pending interrupt
    ///
    /// A returned id is active until passed to
    /// [`acknowledge`](Self::acknowledge).
    pub fn get_pending_irq_id(&self) -> Result<u32, GicError> {
        let id = self.cpu_interface.read32(GICC_IAR) & GICC_INT_ID_MASK;
        match id {
            GIC_SPURIOUS_GRP1_ID..=GIC_SPURIOUS_ID => {
                log_trace!("GICv2: spurious id {}", id);
                Err(GicError::Spurious(id))
            }
            GIC_RESERVED_ID_FIRST..=GIC_RESERVED_ID_LAST => {
                log_error!("GICv2: reserved interrupt id {}", id);
                Err(GicError::Reserved(id))
            }
            id if id >= self.line_count => {
                log_error!("GICv2: interrupt id {} beyond {} lines", id, self.line_count);
                Err(GicError::OutOfRange(id))
            }
            id => Ok(id),
        }
    }

    /// Signal end of interrupt for `id`
    ///
    /// Exactly once per id returned by
    /// [`get_pending_irq_id`](Self::get_pending_irq_id); the line stays
    /// active (and silent) until then.
    pub fn acknowledge(&self, id: u32) {
        self.cpu_interface.write32(GICC_EOIR, id & GICC_INT_ID_MASK);
    }

    /// Raise SGI `id` on this core
    pub fn trigger_software_interrupt(&self, id: u32) -> err::Result {
        if id >= GIC_NUM_SGI {
            return Err(Error::InvalidArgs);
        }

        let value = (ARM_GIC_SGI_FLAG_TARGET_FILTER_SELF & ARM_GIC_SGI_FLAG_TARGET_FILTER_MASK) | id;
        self.distributor.write32(GICD_SGIR, value);
        Ok(())
    }

    /// Set the priority of line `id` (0 = highest)
    pub fn set_priority(&self, id: u32, priority: u8) -> err::Result {
        if id >= self.line_count {
            return Err(Error::InvalidArgs);
        }

        let (reg, shift) = byte_reg(GICD_IPRIORITYR, id);
        self.distributor
            .modify32(reg, |v| (v & !(0xFF << shift)) | ((priority as u32) << shift));
        Ok(())
    }

    /// Configure the trigger mode of SPI `id`
    pub fn configure_trigger(&self, id: u32, mode: InterruptTriggerMode) -> err::Result {
        if id >= self.line_count || id < GIC_BASE_SPI {
            return Err(Error::InvalidArgs);
        }

        let reg = GICD_ICFGR + (id as usize / 16) * 4;
        let edge = 1 << ((id % 16) * 2 + 1);
        self.distributor.modify32(reg, |v| match mode {
            InterruptTriggerMode::Edge => v | edge,
            InterruptTriggerMode::Level => v & !edge,
        });
        Ok(())
    }

    /// Whether line `id` is enabled at the distributor
    pub fn is_enabled(&self, id: u32) -> bool {
        let (reg, bit) = bit_reg(GICD_ISENABLER, id);
        id < self.line_count && self.distributor.read32(reg) & bit != 0
    }

    /// Whether line `id` is pending at the distributor
    pub fn is_pending(&self, id: u32) -> bool {
        let (reg, bit) = bit_reg(GICD_ISPENDR, id);
        id < self.line_count && self.distributor.read32(reg) & bit != 0
    }

    /// Priority of the interrupt currently being handled (0xFF when idle)
    pub fn running_priority(&self) -> u8 {
        (self.cpu_interface.read32(GICC_RPR) & 0xFF) as u8
    }
}
