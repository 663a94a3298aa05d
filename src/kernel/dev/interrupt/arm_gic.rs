// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! ARM Generic Interrupt Controller (GIC)
//!
//! The GIC is the standard interrupt controller for ARMv8 systems. It handles:
//!
//! - **SGI** (Software Generated Interrupt): IDs 0-15, per-CPU interrupts
//! - **PPI** (Private Peripheral Interrupt): IDs 16-31, per-CPU peripherals
//! - **SPI** (Shared Peripheral Interrupt): IDs 32+, shared devices
//!
//! IDs 1020-1023 are never real interrupts: 1020 and 1021 are reserved and
//! 1022/1023 are the spurious ids returned when nothing is pending.

/// Interrupt trigger mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptTriggerMode {
    /// Edge-triggered interrupt
    Edge = 0,
    /// Level-triggered interrupt
    Level = 1,
}

/// Number of SGI ids
pub const GIC_NUM_SGI: u32 = 16;

/// Base SPI interrupt ID
pub const GIC_BASE_SPI: u32 = 32;

/// Highest id the architecture can describe plus one
pub const MAX_INT: u32 = 1020;

/// First reserved id
pub const GIC_RESERVED_ID_FIRST: u32 = 1020;

/// Last reserved id
pub const GIC_RESERVED_ID_LAST: u32 = 1021;

/// Spurious id reported for a group 1 interrupt acknowledged as group 0
pub const GIC_SPURIOUS_GRP1_ID: u32 = 1022;

/// Spurious id reported when no interrupt is pending
pub const GIC_SPURIOUS_ID: u32 = 1023;

/// SGI target filter flags
pub const ARM_GIC_SGI_FLAG_TARGET_FILTER_MASK: u32 = 0x3 << 24;
pub const ARM_GIC_SGI_FLAG_TARGET_FILTER_SELF: u32 = 0x2 << 24;
