// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Host-side stand-ins for the hardware used by the unit tests

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use spin::Mutex;

use crate::kernel::dev::interrupt::gicv2::*;
use crate::platform::Platform;
use crate::reg::RegisterBank;

/// 8-byte aligned memory region for ring buffer tests
#[repr(C, align(8))]
pub struct Region<const N: usize>([u8; N]);

impl<const N: usize> Region<N> {
    pub fn zeroed() -> Box<Self> {
        Self::filled(0)
    }

    pub fn filled(byte: u8) -> Box<Self> {
        Box::new(Self([byte; N]))
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.0
    }

    /// The eight header words
    pub fn words(&self) -> [u32; 8] {
        let mut words = [0u32; 8];
        for (i, word) in words.iter_mut().enumerate() {
            let bytes = [self.0[i * 4], self.0[i * 4 + 1], self.0[i * 4 + 2], self.0[i * 4 + 3]];
            *word = u32::from_ne_bytes(bytes);
        }
        words
    }

    pub fn set_word(&mut self, index: usize, value: u32) {
        self.0[index * 4..index * 4 + 4].copy_from_slice(&value.to_ne_bytes());
    }
}

/// Simulated CPU interrupt mask; IRQs start masked as after reset
pub struct FakePlatform {
    masked: AtomicBool,
    disables: AtomicUsize,
    enables: AtomicUsize,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            masked: AtomicBool::new(true),
            disables: AtomicUsize::new(0),
            enables: AtomicUsize::new(0),
        }
    }

    pub fn disable_count(&self) -> usize {
        self.disables.load(Ordering::SeqCst)
    }

    pub fn enable_count(&self) -> usize {
        self.enables.load(Ordering::SeqCst)
    }
}

impl Platform for FakePlatform {
    fn enable_ints(&self) {
        self.enables.fetch_add(1, Ordering::SeqCst);
        self.masked.store(false, Ordering::SeqCst);
    }

    fn disable_ints(&self) {
        self.disables.fetch_add(1, Ordering::SeqCst);
        self.masked.store(true, Ordering::SeqCst);
    }

    fn ints_disabled(&self) -> bool {
        self.masked.load(Ordering::SeqCst)
    }

    fn halt(&self) -> ! {
        panic!("platform halt");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Bank {
    Distributor,
    CpuInterface,
}

#[derive(Default)]
struct GicModel {
    regs: BTreeMap<(Bank, usize), u32>,
    pending: VecDeque<u32>,
    eoi: Vec<u32>,
    sgir: Vec<u32>,
    /// Whether IRQs were masked at the core during each ISENABLER write
    enable_writes_masked: Vec<bool>,
}

/// Register-level model of a GICv2 with a single CPU interface
///
/// Set/clear register pairs behave like the hardware, the banked target
/// registers report CPU 0, GICC_IAR pops from a queue of raised ids (1023
/// when empty) and writes to GICD_SGIR loop back into that queue.
pub struct FakeGic<'p> {
    typer: u32,
    model: Mutex<GicModel>,
    platform: Option<&'p FakePlatform>,
}

/// One register bank of a [`FakeGic`]
pub struct FakeBank<'a> {
    gic: &'a FakeGic<'a>,
    bank: Bank,
}

/// Fold a set/clear register offset onto the offset holding its state
fn canonical(offset: usize) -> usize {
    match offset {
        o if (GICD_ICENABLER..GICD_ISPENDR).contains(&o) => o - 0x80,
        o if (GICD_ICPENDR..GICD_ISACTIVER).contains(&o) => o - 0x80,
        o if (GICD_ICACTIVER..GICD_IPRIORITYR).contains(&o) => o - 0x80,
        o => o,
    }
}

fn is_set_reg(offset: usize) -> bool {
    [GICD_ISENABLER, GICD_ISPENDR, GICD_ISACTIVER]
        .iter()
        .any(|&base| (base..base + 0x80).contains(&offset))
}

fn is_clear_reg(offset: usize) -> bool {
    [GICD_ICENABLER, GICD_ICPENDR, GICD_ICACTIVER]
        .iter()
        .any(|&base| (base..base + 0x80).contains(&offset))
}

impl FakeGic<'static> {
    /// Model with GICD_TYPER.ITLinesNumber = `it_lines`
    pub fn new(it_lines: u32) -> Self {
        Self { typer: it_lines, model: Mutex::new(GicModel::default()), platform: None }
    }
}

impl<'p> FakeGic<'p> {
    /// Model that records the core's mask state on every enable write
    pub fn with_platform(it_lines: u32, platform: &'p FakePlatform) -> Self {
        Self { typer: it_lines, model: Mutex::new(GicModel::default()), platform: Some(platform) }
    }

    pub fn distributor(&self) -> FakeBank<'_> {
        FakeBank { gic: self, bank: Bank::Distributor }
    }

    pub fn cpu_interface(&self) -> FakeBank<'_> {
        FakeBank { gic: self, bank: Bank::CpuInterface }
    }

    /// Make `iar` the next value returned by GICC_IAR
    pub fn raise(&self, iar: u32) {
        self.model.lock().pending.push_back(iar);
    }

    pub fn eoi_log(&self) -> Vec<u32> {
        self.model.lock().eoi.clone()
    }

    pub fn sgir_log(&self) -> Vec<u32> {
        self.model.lock().sgir.clone()
    }

    pub fn enable_writes_masked(&self) -> Vec<bool> {
        self.model.lock().enable_writes_masked.clone()
    }

    pub fn dist_write_raw(&self, offset: usize, value: u32) {
        self.model.lock().regs.insert((Bank::Distributor, canonical(offset)), value);
    }

    pub fn dist_read_raw(&self, offset: usize) -> u32 {
        self.read(Bank::Distributor, offset, false)
    }

    pub fn cpu_read_raw(&self, offset: usize) -> u32 {
        self.read(Bank::CpuInterface, offset, false)
    }

    fn read(&self, bank: Bank, offset: usize, side_effects: bool) -> u32 {
        let mut model = self.model.lock();
        match (bank, offset) {
            (Bank::Distributor, GICD_TYPER) => self.typer,
            (Bank::Distributor, o) if (GICD_ITARGETSR..GICD_ITARGETSR + 32).contains(&o) => {
                0x0101_0101
            }
            (Bank::CpuInterface, GICC_IAR) if side_effects => {
                model.pending.pop_front().unwrap_or(1023)
            }
            (bank, o) => model.regs.get(&(bank, canonical(o))).copied().unwrap_or(0),
        }
    }

    fn write(&self, bank: Bank, offset: usize, value: u32) {
        let masked = self.platform.map(|p| p.ints_disabled());
        let mut model = self.model.lock();
        match (bank, offset) {
            (Bank::Distributor, GICD_SGIR) => {
                model.sgir.push(value);
                model.pending.push_back(value & 0xF);
            }
            (Bank::CpuInterface, GICC_EOIR) => model.eoi.push(value),
            (Bank::Distributor, o) if is_set_reg(o) => {
                if (GICD_ISENABLER..GICD_ICENABLER).contains(&o) {
                    if let Some(masked) = masked {
                        model.enable_writes_masked.push(masked);
                    }
                }
                *model.regs.entry((bank, o)).or_insert(0) |= value;
            }
            (Bank::Distributor, o) if is_clear_reg(o) => {
                *model.regs.entry((bank, canonical(o))).or_insert(0) &= !value;
            }
            (bank, o) => {
                model.regs.insert((bank, o), value);
            }
        }
    }
}

impl RegisterBank for FakeBank<'_> {
    fn read32(&self, offset: usize) -> u32 {
        self.gic.read(self.bank, offset, true)
    }

    fn write32(&self, offset: usize, value: u32) {
        self.gic.write(self.bank, offset, value)
    }
}
